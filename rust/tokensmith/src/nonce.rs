use crate::{error::Result, serde::base64url_encode};
use anyhow::anyhow;
use rand::{rngs::OsRng, RngCore};

/// Fill a buffer of `size` bytes from the operating system's CSPRNG
pub(crate) fn random_bytes(size: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; size];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|error| anyhow!("Could not gather randomness: {}", error))?;
    Ok(bytes)
}

/// A generator of random base64url strings, `length` characters long (or as
/// close to it as whole bytes allow). Suitable as a `jti` source.
pub fn nonce(length: u8) -> impl Fn() -> Result<String> + Send + Sync + 'static {
    // Bytes that fit into `length` unpadded base64 characters
    let size = usize::from(length) * 6 / 8;
    move || Ok(base64url_encode(random_bytes(size)?))
}
