//! Checking incoming tokens.
//!
//! Verification runs the same fixed sequence for every token and stops at
//! the first failure:
//!
//! 1. the token must have exactly three segments
//! 2. `iat` must not be in the future, `exp` must not be in the past and
//!    `nbf` must not be in the future (absent claims are not checked)
//! 3. the header must decode, and its `typ` (if any) must be `JWT`
//! 4. the signature segment must not be empty
//! 5. a verification key must be found for the header's `alg` and `kid`
//! 6. the header's `alg` must be the algorithm of that key
//! 7. the signature must verify over the original `header.payload` bytes
//!
//! Only then are the decoded payload bytes handed back. Passing
//! [KeyResolver::Unchecked] stops after step 3.

use crate::{
    crypto::{KeyMaterial, KeyResolver},
    error::{JwtError, Result},
    time::now,
    token::{split, TokenParts},
};
use serde::{de::DeserializeOwned, Deserialize};

/// The registered time claims, read from the payload ahead of anything else.
/// Zero is the same as absent.
#[derive(Deserialize, Default)]
struct TimeClaims {
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    nbf: Option<i64>,
}

fn check_times(payload: &[u8], now_time: u64) -> Result<()> {
    let times: TimeClaims = serde_json::from_slice(payload)?;
    let now = i64::try_from(now_time).unwrap_or(i64::MAX);
    let is_set = |time: Option<i64>| time.filter(|seconds| *seconds != 0);

    if matches!(is_set(times.iat), Some(created) if created > now) {
        return Err(JwtError::CreatedAfterNow);
    }
    if matches!(is_set(times.exp), Some(expires) if expires < now) {
        return Err(JwtError::Expired);
    }
    if matches!(is_set(times.nbf), Some(not_before) if not_before > now) {
        return Err(JwtError::NotYetValid);
    }
    Ok(())
}

fn check_signature(parts: &TokenParts, resolver: KeyResolver) -> Result<()> {
    let header = parts.decode_header()?;
    header.check_type()?;

    if let KeyResolver::Unchecked = resolver {
        return Ok(());
    }
    if !parts.is_signed() {
        return Err(JwtError::TokenNotSigned);
    }

    let key = match resolver.resolve(&header)? {
        Some(key) if !key.is_empty() => key,
        _ => return Err(JwtError::EmptySignKey),
    };

    let algorithm = header.algorithm()?;
    if algorithm != key.jwt_algorithm() {
        return Err(JwtError::AlgorithmMismatch {
            expected: key.jwt_algorithm().to_string(),
            found: header.alg,
        });
    }

    let signature = parts.decode_signature()?;
    key.verify(parts.signed_data(), &signature)
}

/// Verify a token against the current time and return its decoded payload
pub fn verify<'a, R>(token: &str, resolver: R) -> Result<Vec<u8>>
where
    R: Into<KeyResolver<'a>>,
{
    verify_at(token, resolver, now())
}

/// Verify a token as of `now_time` (Unix seconds) and return its decoded
/// payload
pub fn verify_at<'a, R>(token: &str, resolver: R, now_time: u64) -> Result<Vec<u8>>
where
    R: Into<KeyResolver<'a>>,
{
    let resolver = resolver.into();
    let result = split(token).and_then(|parts| {
        let payload = parts.decode_payload()?;
        check_times(&payload, now_time)?;
        check_signature(&parts, resolver)?;
        Ok(payload)
    });

    if let Err(error) = &result {
        trace!("Rejected token: {}", error);
    }
    result
}

/// Read a token's payload after checking its structure, header and times,
/// but not its signature
pub fn decode(token: &str) -> Result<Vec<u8>> {
    decode_at(token, now())
}

pub fn decode_at(token: &str, now_time: u64) -> Result<Vec<u8>> {
    verify_at(token, KeyResolver::Unchecked, now_time)
}

/// Verify a token and deserialize its claims into `T`
pub fn verify_claims<'a, T, R>(token: &str, resolver: R) -> Result<T>
where
    T: DeserializeOwned,
    R: Into<KeyResolver<'a>>,
{
    Ok(serde_json::from_slice(&verify(token, resolver)?)?)
}

/// Decode a token without checking its signature and deserialize its claims
/// into `T`
pub fn decode_claims<T>(token: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_slice(&decode(token)?)?)
}
