use crate::{
    crypto::{JwtSignatureAlgorithm, KeyMaterial},
    error::{JwtError, Result},
};
use p256::ecdsa::signature::{Signer, Verifier};
use rand::rngs::OsRng;
use strum_macros::{Display, EnumString};

/// The named curves an ECDSA key may live on
#[derive(Debug, Display, EnumString, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EcCurve {
    #[strum(serialize = "P-256")]
    P256,
    #[strum(serialize = "P-384")]
    P384,
    #[strum(serialize = "P-521")]
    P521,
}

impl EcCurve {
    /// Byte width of a coordinate or scalar on this curve
    pub fn size(&self) -> usize {
        match self {
            EcCurve::P256 => 32,
            EcCurve::P384 => 48,
            EcCurve::P521 => 66,
        }
    }

    pub fn algorithm(&self) -> JwtSignatureAlgorithm {
        match self {
            EcCurve::P256 => JwtSignatureAlgorithm::ES256,
            EcCurve::P384 => JwtSignatureAlgorithm::ES384,
            EcCurve::P521 => JwtSignatureAlgorithm::ES512,
        }
    }
}

/// An ECDSA public key and, when this side signs, its private counterpart
#[derive(Clone)]
pub enum EcdsaKeyMaterial {
    P256(p256::ecdsa::VerifyingKey, Option<p256::ecdsa::SigningKey>),
    P384(p384::ecdsa::VerifyingKey, Option<p384::ecdsa::SigningKey>),
    P521(p521::ecdsa::VerifyingKey, Option<p521::ecdsa::SigningKey>),
}

/// Left-pad a big-endian integer to the fixed width of its curve
fn pad(bytes: &[u8], size: usize) -> Result<Vec<u8>> {
    if bytes.len() > size {
        return Err(JwtError::InvalidKey(format!(
            "{} bytes do not fit a {size} byte curve element",
            bytes.len()
        )));
    }
    let mut padded = vec![0u8; size - bytes.len()];
    padded.extend_from_slice(bytes);
    Ok(padded)
}

fn invalid<E: std::fmt::Display>(error: E) -> JwtError {
    JwtError::InvalidKey(error.to_string())
}

impl EcdsaKeyMaterial {
    /// Generate a fresh private key on the given curve
    pub fn generate(curve: EcCurve) -> Self {
        match curve {
            EcCurve::P256 => p256::ecdsa::SigningKey::random(&mut OsRng).into(),
            EcCurve::P384 => p384::ecdsa::SigningKey::random(&mut OsRng).into(),
            EcCurve::P521 => p521::ecdsa::SigningKey::random(&mut OsRng).into(),
        }
    }

    /// Assemble a key from its affine coordinates and, optionally, its
    /// private scalar. A private scalar must belong to the given point.
    pub fn from_components(
        curve: EcCurve,
        x: &[u8],
        y: &[u8],
        d: Option<&[u8]>,
    ) -> Result<Self> {
        let size = curve.size();
        let sec1 = [&[0x04u8][..], &pad(x, size)?, &pad(y, size)?].concat();
        let scalar = d.map(|d| pad(d, size)).transpose()?;

        let key: EcdsaKeyMaterial = match curve {
            EcCurve::P256 => EcdsaKeyMaterial::P256(
                p256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1).map_err(invalid)?,
                scalar
                    .as_deref()
                    .map(p256::ecdsa::SigningKey::from_slice)
                    .transpose()
                    .map_err(invalid)?,
            ),
            EcCurve::P384 => EcdsaKeyMaterial::P384(
                p384::ecdsa::VerifyingKey::from_sec1_bytes(&sec1).map_err(invalid)?,
                scalar
                    .as_deref()
                    .map(p384::ecdsa::SigningKey::from_slice)
                    .transpose()
                    .map_err(invalid)?,
            ),
            EcCurve::P521 => EcdsaKeyMaterial::P521(
                p521::ecdsa::VerifyingKey::from_sec1_bytes(&sec1).map_err(invalid)?,
                scalar
                    .as_deref()
                    .map(p521::ecdsa::SigningKey::from_slice)
                    .transpose()
                    .map_err(invalid)?,
            ),
        };

        if key.is_private() && !key.public_eq(&key.derived_public()) {
            return Err(JwtError::InvalidKey(
                "private scalar does not match the public point".into(),
            ));
        }
        Ok(key)
    }

    pub fn curve(&self) -> EcCurve {
        match self {
            EcdsaKeyMaterial::P256(..) => EcCurve::P256,
            EcdsaKeyMaterial::P384(..) => EcCurve::P384,
            EcdsaKeyMaterial::P521(..) => EcCurve::P521,
        }
    }

    pub fn is_private(&self) -> bool {
        match self {
            EcdsaKeyMaterial::P256(_, private_key) => private_key.is_some(),
            EcdsaKeyMaterial::P384(_, private_key) => private_key.is_some(),
            EcdsaKeyMaterial::P521(_, private_key) => private_key.is_some(),
        }
    }

    pub fn to_public(&self) -> Self {
        match self {
            EcdsaKeyMaterial::P256(public_key, _) => {
                EcdsaKeyMaterial::P256(public_key.clone(), None)
            }
            EcdsaKeyMaterial::P384(public_key, _) => {
                EcdsaKeyMaterial::P384(public_key.clone(), None)
            }
            EcdsaKeyMaterial::P521(public_key, _) => {
                EcdsaKeyMaterial::P521(public_key.clone(), None)
            }
        }
    }

    /// The public key recomputed from the private scalar, or the stored
    /// public key when there is no private part
    fn derived_public(&self) -> Self {
        match self {
            EcdsaKeyMaterial::P256(_, Some(private_key)) => {
                EcdsaKeyMaterial::P256(private_key.verifying_key().clone(), None)
            }
            EcdsaKeyMaterial::P384(_, Some(private_key)) => {
                EcdsaKeyMaterial::P384(private_key.verifying_key().clone(), None)
            }
            EcdsaKeyMaterial::P521(_, Some(private_key)) => {
                EcdsaKeyMaterial::P521(p521::ecdsa::VerifyingKey::from(private_key), None)
            }
            _ => self.to_public(),
        }
    }

    /// Uncompressed SEC1 encoding of the public point
    fn sec1_point(&self) -> Vec<u8> {
        match self {
            EcdsaKeyMaterial::P256(public_key, _) => {
                public_key.to_encoded_point(false).as_bytes().to_vec()
            }
            EcdsaKeyMaterial::P384(public_key, _) => {
                public_key.to_encoded_point(false).as_bytes().to_vec()
            }
            EcdsaKeyMaterial::P521(public_key, _) => {
                public_key.to_encoded_point(false).as_bytes().to_vec()
            }
        }
    }

    pub fn public_eq(&self, other: &EcdsaKeyMaterial) -> bool {
        self.curve() == other.curve() && self.sec1_point() == other.sec1_point()
    }

    /// The affine `(x, y)` coordinates, each padded to the curve width
    pub fn coordinates(&self) -> (Vec<u8>, Vec<u8>) {
        let size = self.curve().size();
        let point = self.sec1_point();
        // Uncompressed SEC1 points are 0x04 || x || y
        (
            point[1..1 + size].to_vec(),
            point[1 + size..1 + 2 * size].to_vec(),
        )
    }

    /// The private scalar, padded to the curve width
    pub fn private_scalar(&self) -> Option<Vec<u8>> {
        match self {
            EcdsaKeyMaterial::P256(_, private_key) => {
                private_key.as_ref().map(|key| key.to_bytes().to_vec())
            }
            EcdsaKeyMaterial::P384(_, private_key) => {
                private_key.as_ref().map(|key| key.to_bytes().to_vec())
            }
            EcdsaKeyMaterial::P521(_, private_key) => {
                private_key.as_ref().map(|key| key.to_bytes().to_vec())
            }
        }
    }
}

impl KeyMaterial for EcdsaKeyMaterial {
    fn jwt_algorithm(&self) -> JwtSignatureAlgorithm {
        self.curve().algorithm()
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let signature = match self {
            EcdsaKeyMaterial::P256(_, Some(private_key)) => {
                let signature: p256::ecdsa::Signature =
                    private_key.try_sign(payload).map_err(invalid)?;
                signature.to_bytes().to_vec()
            }
            EcdsaKeyMaterial::P384(_, Some(private_key)) => {
                let signature: p384::ecdsa::Signature =
                    private_key.try_sign(payload).map_err(invalid)?;
                signature.to_bytes().to_vec()
            }
            EcdsaKeyMaterial::P521(_, Some(private_key)) => {
                let signature: p521::ecdsa::Signature =
                    private_key.try_sign(payload).map_err(invalid)?;
                signature.to_bytes().to_vec()
            }
            _ => {
                return Err(JwtError::UnsupportedKeyType(format!(
                    "ECDSA {} public key cannot sign",
                    self.curve()
                )))
            }
        };
        Ok(signature)
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<()> {
        // r || s, each half exactly one curve element wide
        if signature.len() != 2 * self.curve().size() {
            return Err(JwtError::BadSignature);
        }

        let verified = match self {
            EcdsaKeyMaterial::P256(public_key, _) => p256::ecdsa::Signature::from_slice(signature)
                .map(|signature| public_key.verify(payload, &signature).is_ok()),
            EcdsaKeyMaterial::P384(public_key, _) => p384::ecdsa::Signature::from_slice(signature)
                .map(|signature| public_key.verify(payload, &signature).is_ok()),
            EcdsaKeyMaterial::P521(public_key, _) => p521::ecdsa::Signature::from_slice(signature)
                .map(|signature| public_key.verify(payload, &signature).is_ok()),
        };

        match verified {
            Ok(true) => Ok(()),
            _ => Err(JwtError::BadSignature),
        }
    }
}

impl From<p256::ecdsa::SigningKey> for EcdsaKeyMaterial {
    fn from(private_key: p256::ecdsa::SigningKey) -> Self {
        EcdsaKeyMaterial::P256(private_key.verifying_key().clone(), Some(private_key))
    }
}

impl From<p256::ecdsa::VerifyingKey> for EcdsaKeyMaterial {
    fn from(public_key: p256::ecdsa::VerifyingKey) -> Self {
        EcdsaKeyMaterial::P256(public_key, None)
    }
}

impl From<p384::ecdsa::SigningKey> for EcdsaKeyMaterial {
    fn from(private_key: p384::ecdsa::SigningKey) -> Self {
        EcdsaKeyMaterial::P384(private_key.verifying_key().clone(), Some(private_key))
    }
}

impl From<p384::ecdsa::VerifyingKey> for EcdsaKeyMaterial {
    fn from(public_key: p384::ecdsa::VerifyingKey) -> Self {
        EcdsaKeyMaterial::P384(public_key, None)
    }
}

impl From<p521::ecdsa::SigningKey> for EcdsaKeyMaterial {
    fn from(private_key: p521::ecdsa::SigningKey) -> Self {
        let public_key = p521::ecdsa::VerifyingKey::from(&private_key);
        EcdsaKeyMaterial::P521(public_key, Some(private_key))
    }
}

impl From<p521::ecdsa::VerifyingKey> for EcdsaKeyMaterial {
    fn from(public_key: p521::ecdsa::VerifyingKey) -> Self {
        EcdsaKeyMaterial::P521(public_key, None)
    }
}

#[cfg(test)]
mod tests {
    use super::{EcCurve, EcdsaKeyMaterial};
    use crate::{
        crypto::{JwtSignatureAlgorithm, KeyMaterial},
        error::JwtError,
    };
    use std::str::FromStr;

    #[test]
    fn it_signs_with_fixed_width_signatures_on_every_curve() {
        for (curve, algorithm, width) in [
            (EcCurve::P256, JwtSignatureAlgorithm::ES256, 64),
            (EcCurve::P384, JwtSignatureAlgorithm::ES384, 96),
            (EcCurve::P521, JwtSignatureAlgorithm::ES512, 132),
        ] {
            let key = EcdsaKeyMaterial::generate(curve);
            let signature = key.sign(b"header.payload").unwrap();

            assert_eq!(key.jwt_algorithm(), algorithm);
            assert_eq!(signature.len(), width);
            key.to_public()
                .verify(b"header.payload", &signature)
                .unwrap();
        }
    }

    #[test]
    fn it_rejects_malformed_signatures() {
        let key = EcdsaKeyMaterial::generate(EcCurve::P256);
        let mut signature = key.sign(b"data").unwrap();

        assert!(matches!(
            key.verify(b"data", &signature[..63]),
            Err(JwtError::BadSignature)
        ));
        assert!(matches!(
            key.verify(b"data", &[0u8; 64]),
            Err(JwtError::BadSignature)
        ));

        signature[10] ^= 0x80;
        assert!(matches!(
            key.verify(b"data", &signature),
            Err(JwtError::BadSignature)
        ));
    }

    #[test]
    fn it_derives_the_public_key_of_a_p521_signing_key() {
        let signing_key = p521::ecdsa::SigningKey::random(&mut rand::rngs::OsRng);
        let expected = p521::ecdsa::VerifyingKey::from(&signing_key);
        let key = EcdsaKeyMaterial::from(signing_key);

        assert!(key.public_eq(&EcdsaKeyMaterial::from(expected)));

        let (x, y) = key.coordinates();
        let d = key.private_scalar().unwrap();
        let rebuilt = EcdsaKeyMaterial::from_components(EcCurve::P521, &x, &y, Some(&d)).unwrap();
        let signature = rebuilt.sign(b"header.payload").unwrap();
        key.to_public()
            .verify(b"header.payload", &signature)
            .unwrap();
    }

    #[test]
    fn it_rebuilds_a_key_from_its_components() {
        let key = EcdsaKeyMaterial::generate(EcCurve::P384);
        let (x, y) = key.coordinates();
        let d = key.private_scalar().unwrap();

        assert_eq!(x.len(), 48);
        assert_eq!(y.len(), 48);
        assert_eq!(d.len(), 48);

        let rebuilt = EcdsaKeyMaterial::from_components(EcCurve::P384, &x, &y, Some(&d)).unwrap();
        assert!(rebuilt.is_private());
        assert!(rebuilt.public_eq(&key));

        let signature = rebuilt.sign(b"data").unwrap();
        key.verify(b"data", &signature).unwrap();
    }

    #[test]
    fn it_refuses_a_private_scalar_for_another_point() {
        let key = EcdsaKeyMaterial::generate(EcCurve::P256);
        let other = EcdsaKeyMaterial::generate(EcCurve::P256);
        let (x, y) = key.coordinates();
        let d = other.private_scalar().unwrap();

        assert!(matches!(
            EcdsaKeyMaterial::from_components(EcCurve::P256, &x, &y, Some(&d)),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn it_names_curves_the_way_jwk_does() {
        assert_eq!(EcCurve::P521.to_string(), "P-521");
        assert_eq!(EcCurve::from_str("P-384").unwrap(), EcCurve::P384);
        assert!(EcCurve::from_str("secp256k1").is_err());
    }

    #[test]
    fn public_keys_cannot_sign() {
        let key = EcdsaKeyMaterial::generate(EcCurve::P521).to_public();

        assert!(!key.is_private());
        assert!(matches!(
            key.sign(b"data"),
            Err(JwtError::UnsupportedKeyType(_))
        ));
    }
}
