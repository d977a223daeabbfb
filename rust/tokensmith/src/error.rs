use thiserror::Error;

pub type Result<T, E = JwtError> = std::result::Result<T, E>;

/// Every way that producing or checking a token can fail. Callers are
/// expected to treat all of these as authentication failures; the variants
/// exist so that they can tell the failures apart.
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token")]
    InvalidTokenStructure,

    #[error("Could not decode base64url segment: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("Could not process JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad token type: {0}")]
    BadTokenType(String),

    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("bad token sign algorithm: expected {expected}, got {found}")]
    AlgorithmMismatch { expected: String, found: String },

    #[error("hash function for key is not available: {0}")]
    HashUnavailable(String),

    #[error("bad token sign")]
    BadSignature,

    #[error("token not signed")]
    TokenNotSigned,

    #[error("empty token sign key")]
    EmptySignKey,

    #[error("token created after now")]
    CreatedAfterNow,

    #[error("token expired")]
    Expired,

    #[error("token not before now")]
    NotYetValid,

    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("Unsupported claim set shape: {0}")]
    UnsupportedClaimShape(String),

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("bad issuer")]
    BadIssuer,

    #[error("bad subject")]
    BadSubject,

    #[error("{0} not set")]
    MissingClaim(&'static str),

    #[error("{0}")]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for JwtError {
    fn from(error: anyhow::Error) -> Self {
        JwtError::Other(error)
    }
}

impl From<rsa::Error> for JwtError {
    fn from(error: rsa::Error) -> Self {
        JwtError::InvalidKey(error.to_string())
    }
}
