mod keys;

pub use keys::*;
