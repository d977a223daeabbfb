mod fixtures;
mod helpers;
mod signing;
