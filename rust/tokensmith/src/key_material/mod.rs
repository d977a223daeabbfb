//! Signing and verification for each family of keys

pub mod ecdsa;
pub mod hmac;
pub mod rsa;
