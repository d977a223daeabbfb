use crate::{
    crypto::Key,
    generate::{ecdsa_key, hmac_secret},
    key_material::ecdsa::EcCurve,
    tracing::initialize_tracing,
};
use rsa::{pkcs8::DecodePrivateKey, RsaPrivateKey};

pub const RSA_KEY_PK8: &[u8] = include_bytes!("../../key_material/fixtures/rsa_key.pk8");

/// One private key of every family, labelled with the algorithm it signs with
pub struct Keys {
    pub hmac: Key,
    pub rsa: Key,
    pub p256: Key,
    pub p384: Key,
    pub p521: Key,
}

impl Keys {
    pub fn new() -> Self {
        initialize_tracing();
        Keys {
            hmac: hmac_secret(32).unwrap(),
            rsa: RsaPrivateKey::from_pkcs8_der(RSA_KEY_PK8).unwrap().into(),
            p256: ecdsa_key(EcCurve::P256),
            p384: ecdsa_key(EcCurve::P384),
            p521: ecdsa_key(EcCurve::P521),
        }
    }

    pub fn all(&self) -> Vec<(&'static str, &Key)> {
        vec![
            ("HS256", &self.hmac),
            ("RS256", &self.rsa),
            ("ES256", &self.p256),
            ("ES384", &self.p384),
            ("ES512", &self.p521),
        ]
    }
}
