use crate::error::Result;
use base64::Engine;
use serde::{de::DeserializeOwned, Serialize};

/// Encode raw bytes as unpadded base64url, the encoding used by every token
/// segment and every JWK member
pub fn base64url_encode<T: AsRef<[u8]>>(bytes: T) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode an unpadded base64url string
pub fn base64url_decode<T: AsRef<[u8]>>(encoded: T) -> Result<Vec<u8>> {
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(encoded)?)
}

/// Helper trait to ser/de any serde-implementing value to/from JSON bytes
pub trait Json: Serialize + DeserializeOwned {
    fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn from_json(json_bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json_bytes)?)
    }
}

impl<T> Json for T where T: Serialize + DeserializeOwned {}

/// Helper trait to encode structs as base64 as part of creating a JWT
pub trait Base64Encode: Serialize {
    fn jwt_base64_encode(&self) -> Result<String> {
        Ok(base64url_encode(serde_json::to_vec(self)?))
    }
}

impl<T> Base64Encode for T where T: Serialize + ?Sized {}
