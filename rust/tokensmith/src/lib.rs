//! Issue and verify compact signed JSON Web Tokens, and exchange the keys
//! that sign them as JWKs and JWK Sets.
//!
//! # Examples
//!
//! A [`config::TokenConfig`] describes the tokens a service hands out: the
//! registered claims to fill in, and the key to sign with. Any
//! [`crypto::Key`] will do; the key decides the signature algorithm.
//!
//! ```rust
//! use std::time::Duration;
//! use serde_json::{json, Value};
//! use tokensmith::{config::TokenConfig, crypto::Key, verify::verify_claims};
//!
//! fn issue_and_verify() -> tokensmith::error::Result<Value> {
//!     let key = Key::secret("top secret");
//!     let config = TokenConfig::default()
//!         .issued_by("http://service.example.com/")
//!         .with_creation_time()
//!         .with_lifetime(Duration::from_secs(3600))
//!         .signed_by(key.clone());
//!
//!     let token = config.token(json!({"sub": "123"}))?;
//!     verify_claims(&token, &key)
//! }
//! # issue_and_verify().unwrap();
//! ```
//!
//! Verification is the mirror image: a [`crypto::KeyResolver`] finds the key
//! for each incoming token, for example by looking up its `kid` header in a
//! published [`jwks::Jwks`].
//!
//! ```rust
//! use serde_json::json;
//! use tokensmith::{
//!     crypto::KeyProvider, generate::ecdsa_key, jwks::Jwks,
//!     key_material::ecdsa::EcCurve, token::encode_with, verify::verify,
//! };
//!
//! fn publish_and_verify() -> tokensmith::error::Result<Vec<u8>> {
//!     let key = ecdsa_key(EcCurve::P256);
//!     let mut jwks = Jwks::new();
//!     jwks.add("2024-01", &key)?;
//!
//!     let published = Jwks::from_json(&jwks.to_json()?)?;
//!     let token = encode_with(&json!({"sub": "123"}), &KeyProvider::identified("2024-01", key))?;
//!     verify(&token, &published)
//! }
//! # publish_and_verify().unwrap();
//! ```
//!
//! When both sides share a single HMAC secret, a [`template::Template`] bound
//! to a [`signer::Signer`] issues and checks tokens in one place.

#[macro_use]
extern crate tracing as extern_tracing;

pub mod claims;
pub mod config;
pub mod crypto;
pub mod error;
pub mod generate;
pub mod header;
pub mod jwk;
pub mod jwks;
pub mod key_material;
pub mod nonce;
pub mod serde;
pub mod signer;
pub mod template;
pub mod time;
pub mod token;
pub mod tracing;
pub mod verify;

#[cfg(test)]
mod tests;
