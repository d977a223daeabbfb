//! The JSON Web Key form of a [Key].
//!
//! Integers travel as unsigned big-endian base64url strings. Elliptic curve
//! coordinates and scalars are always padded to the full width of their
//! curve, so that `x`, `y` and `d` of a P-521 key are each 66 bytes.

use crate::{
    crypto::{JwtSignatureAlgorithm, Key, KeyMaterial},
    error::{JwtError, Result},
    key_material::{
        ecdsa::{EcCurve, EcdsaKeyMaterial},
        hmac::HmacKeyMaterial,
        rsa::RsaKeyMaterial,
    },
    serde::{base64url_decode, base64url_encode},
};
use num_bigint_dig::{BigInt, BigUint, ModInverse, Sign};
use rsa::{
    traits::{PrivateKeyParts, PublicKeyParts},
    RsaPrivateKey, RsaPublicKey,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const KEY_TYPE_RSA: &str = "RSA";
pub const KEY_TYPE_EC: &str = "EC";
pub const KEY_TYPE_OCT: &str = "oct";

/// The `use` value written on every exported key
pub const SIGNATURE_USE: &str = "sig";

/// One member of an RSA key's `oth` array: a prime beyond the second, its CRT
/// exponent and its CRT coefficient
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherPrime {
    pub r: String,
    pub d: String,
    pub t: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(default)]
    pub kty: String,
    #[serde(rename = "use", default, skip_serializing_if = "String::is_empty")]
    pub usage: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_ops: Vec<String>,
    #[serde(default)]
    pub alg: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kid: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub crv: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub x: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub y: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub n: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub e: String,

    /// The private exponent of an RSA key, or the private scalar of an EC key
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub d: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub p: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub q: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dp: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dq: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub qi: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub oth: Vec<OtherPrime>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub k: String,
}

/// The key families a JWK can describe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyType {
    Rsa,
    Ec,
    Oct,
}

fn encode_uint(value: &BigUint) -> String {
    base64url_encode(value.to_bytes_be())
}

fn decode_uint(encoded: &str) -> Result<BigUint> {
    Ok(BigUint::from_bytes_be(&base64url_decode(encoded)?))
}

/// `d mod (prime - 1)`
fn crt_exponent(d: &BigUint, prime: &BigUint) -> BigUint {
    d % (prime - BigUint::from(1u8))
}

/// The inverse of `product` modulo `prime`, reduced into `[0, prime)`
fn crt_coefficient(product: &BigUint, prime: &BigUint) -> Result<BigUint> {
    let modulus = BigInt::from_biguint(Sign::Plus, prime.clone());
    product
        .clone()
        .mod_inverse(prime)
        .map(|inverse| ((inverse % &modulus) + &modulus) % &modulus)
        .and_then(|inverse| inverse.to_biguint())
        .ok_or_else(|| JwtError::InvalidKey("RSA primes are not coprime".into()))
}

impl Jwk {
    /// Describe a key. Private material is included when the key has it.
    pub fn from_key(key: &Key, key_id: Option<&str>) -> Result<Self> {
        let mut jwk = Jwk {
            usage: SIGNATURE_USE.into(),
            alg: key.jwt_algorithm().to_string(),
            kid: key_id.unwrap_or_default().into(),
            ..Default::default()
        };

        match key {
            Key::Hmac(key) => {
                jwk.kty = KEY_TYPE_OCT.into();
                jwk.k = base64url_encode(key.secret());
            }
            Key::Rsa(RsaKeyMaterial(public_key, private_key)) => {
                jwk.kty = KEY_TYPE_RSA.into();
                jwk.n = encode_uint(public_key.n());
                jwk.e = encode_uint(public_key.e());
                if let Some(private_key) = private_key {
                    jwk.set_rsa_private(private_key)?;
                }
            }
            Key::Ecdsa(key) => {
                let (x, y) = key.coordinates();
                jwk.kty = KEY_TYPE_EC.into();
                jwk.crv = key.curve().to_string();
                jwk.x = base64url_encode(x);
                jwk.y = base64url_encode(y);
                if let Some(d) = key.private_scalar() {
                    jwk.d = base64url_encode(d);
                }
            }
        }

        Ok(jwk)
    }

    fn set_rsa_private(&mut self, private_key: &RsaPrivateKey) -> Result<()> {
        let d = private_key.d();
        let [p, q, others @ ..] = private_key.primes() else {
            return Err(JwtError::InvalidKey("RSA key has fewer than two primes".into()));
        };

        self.d = encode_uint(d);
        self.p = encode_uint(p);
        self.q = encode_uint(q);
        self.dp = encode_uint(&crt_exponent(d, p));
        self.dq = encode_uint(&crt_exponent(d, q));
        self.qi = encode_uint(&crt_coefficient(q, p)?);

        let mut product = p * q;
        for prime in others {
            self.oth.push(OtherPrime {
                r: encode_uint(prime),
                d: encode_uint(&crt_exponent(d, prime)),
                t: encode_uint(&crt_coefficient(&product, prime)?),
            });
            product = product * prime;
        }
        Ok(())
    }

    /// The key family, from `kty` when it is set and otherwise from which
    /// members are present
    pub fn key_type(&self) -> Result<KeyType> {
        match self.kty.as_str() {
            KEY_TYPE_RSA => Ok(KeyType::Rsa),
            KEY_TYPE_EC => Ok(KeyType::Ec),
            KEY_TYPE_OCT => Ok(KeyType::Oct),
            "" if !self.n.is_empty()
                && !self.e.is_empty()
                && (self.alg.is_empty() || self.alg == "RS256") =>
            {
                Ok(KeyType::Rsa)
            }
            "" if !self.crv.is_empty() && !self.x.is_empty() && !self.y.is_empty() => {
                Ok(KeyType::Ec)
            }
            "" if !self.k.is_empty() => Ok(KeyType::Oct),
            "" => Err(JwtError::UnsupportedKeyType("no key type".into())),
            other => Err(JwtError::UnsupportedKeyType(other.into())),
        }
    }

    /// Rebuild the key this JWK describes. A `d` member makes it a private
    /// key, which must be consistent with its public members.
    pub fn to_key(&self) -> Result<Key> {
        match self.key_type()? {
            KeyType::Rsa => self.to_rsa_key(),
            KeyType::Ec => self.to_ecdsa_key(),
            KeyType::Oct => self.to_hmac_key(),
        }
    }

    fn to_rsa_key(&self) -> Result<Key> {
        let n = decode_uint(&self.n)?;
        let e = decode_uint(&self.e)?;
        let public_key = RsaPublicKey::new(n.clone(), e.clone())?;

        if self.d.is_empty() {
            return Ok(Key::Rsa(RsaKeyMaterial(public_key, None)));
        }

        let d = decode_uint(&self.d)?;
        let mut primes = Vec::new();
        if !self.p.is_empty() && !self.q.is_empty() {
            primes.push(decode_uint(&self.p)?);
            primes.push(decode_uint(&self.q)?);
            for other in &self.oth {
                primes.push(decode_uint(&other.r)?);
            }
        }

        // With no primes given they are recovered from the exponents
        let mut private_key = RsaPrivateKey::from_components(n, e, d, primes)?;
        private_key.validate()?;
        private_key.precompute()?;

        Ok(Key::Rsa(RsaKeyMaterial(public_key, Some(private_key))))
    }

    fn to_ecdsa_key(&self) -> Result<Key> {
        let curve = EcCurve::from_str(&self.crv)
            .map_err(|_| JwtError::UnsupportedKeyType(format!("curve {:?}", self.crv)))?;
        let x = base64url_decode(&self.x)?;
        let y = base64url_decode(&self.y)?;
        let d = match self.d.as_str() {
            "" => None,
            d => Some(base64url_decode(d)?),
        };

        Ok(EcdsaKeyMaterial::from_components(curve, &x, &y, d.as_deref())?.into())
    }

    fn to_hmac_key(&self) -> Result<Key> {
        let secret = base64url_decode(&self.k)?;
        let key = match self.alg.as_str() {
            "" => HmacKeyMaterial::new(secret),
            alg => HmacKeyMaterial::with_algorithm(JwtSignatureAlgorithm::parse(alg)?, secret)?,
        };
        Ok(key.into())
    }

    pub fn is_private(&self) -> bool {
        !self.d.is_empty() || !self.k.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Jwk, KeyType, OtherPrime};
    use crate::{
        crypto::{JwtSignatureAlgorithm, Key, KeyMaterial},
        error::JwtError,
        generate::ecdsa_key,
        key_material::{ecdsa::EcCurve, hmac::HmacKeyMaterial},
        serde::{base64url_decode, base64url_encode, Json},
    };
    use num_bigint_dig::BigUint;
    use rsa::{pkcs8::DecodePrivateKey, RsaPrivateKey};
    use serde_json::{json, Value};

    fn rsa_key() -> Key {
        RsaPrivateKey::from_pkcs8_der(include_bytes!("./key_material/fixtures/rsa_key.pk8"))
            .unwrap()
            .into()
    }

    fn hex_uint(hex: &str) -> BigUint {
        BigUint::parse_bytes(hex.as_bytes(), 16).unwrap()
    }

    fn signs_for(signer: &Key, verifier: &Key) {
        let signature = signer.sign(b"payload").unwrap();
        verifier.verify(b"payload", &signature).unwrap();
    }

    #[test]
    fn it_round_trips_an_rsa_key() {
        let key = rsa_key();

        let public = Jwk::from_key(&key.to_public(), Some("rsa-1")).unwrap();
        assert_eq!(public.kty, "RSA");
        assert_eq!(public.alg, "RS256");
        assert_eq!(public.usage, "sig");
        assert_eq!(public.kid, "rsa-1");
        assert_eq!(public.e, "AQAB");
        assert!(!public.is_private());

        let private = Jwk::from_key(&key, Some("rsa-1")).unwrap();
        assert!(private.is_private());
        assert!(private.oth.is_empty());
        assert_eq!((private.n.as_str(), private.e.as_str()), (public.n.as_str(), public.e.as_str()));

        let restored = Jwk::from_json(&private.to_json().unwrap())
            .unwrap()
            .to_key()
            .unwrap();
        assert!(restored.is_private());
        assert!(restored.public_eq(&key));
        signs_for(&restored, &public.to_key().unwrap());
    }

    #[test]
    fn it_recovers_rsa_primes_from_the_exponents() {
        let mut jwk = Jwk::from_key(&rsa_key(), None).unwrap();
        for member in [&mut jwk.p, &mut jwk.q, &mut jwk.dp, &mut jwk.dq, &mut jwk.qi] {
            member.clear();
        }

        let key = jwk.to_key().unwrap();
        signs_for(&key, &rsa_key().to_public());
    }

    #[test]
    fn it_rejects_an_inconsistent_rsa_private_key() {
        let mut jwk = Jwk::from_key(&rsa_key(), None).unwrap();
        jwk.d = base64url_encode([7u8; 32]);

        assert!(matches!(jwk.to_key(), Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn it_writes_additional_rsa_primes() {
        let n = "b27fc4529a122e059d0e7fe6829b44bc2a62779490a4d9884bd322944772248b\
                 4de8abf930ce9debf3ffeee204dbbed28dfc72b7ee7914281b6ac37fe70a260b\
                 5a0d701f2a7d20bb18074b66dbdc3a803e67a38f3b461049f8767fa8c3cbf40d\
                 57a24efeabff605b9a04dae3b66b9977f4b2a779d55b4c0ce755cfd5e96311ed";
        let d = "a7789889a76447299d216d7ea82b6561e5a25cef568654523c51ebaf9318d490\
                 9e981e41be391c91b46bec855747ccfdb3134596234d679e1b7972ea34f45f5a\
                 04e28c54a3aa8bd6b55b88a96ed35bd68af5ae104e13b98957869ff4097d608a\
                 24cd8878936a606c252af8a741c663a6c5bcc0b4c65cc7788e24752a59994c1";
        let primes = [
            "3ba0bc964d6de1f4d9e6a8f5147244fd5c8525d021fe27f7fadb76d554228dc6b39a9841355c0e36e0ec77",
            "1f43f0d9e95edafa10a5ed3a5cd31b4875632853e6e0e0206ac2f70e7a90ce517995709e5990fabfc8a3eb",
            "1882d720ef015fab5aef6e65914b1eebb0a45642b7d2b84f3f88cc53d120aa3fd79b1f8a942af134cf9571",
        ];

        let private_key = RsaPrivateKey::from_components(
            hex_uint(n),
            BigUint::from(65537u32),
            hex_uint(d),
            primes.iter().map(|prime| hex_uint(prime)).collect(),
        )
        .unwrap();
        let key = Key::from(private_key);

        let jwk = Jwk::from_key(&key, Some("three-primes")).unwrap();
        let other = |hex: &str| base64url_encode(hex_uint(hex).to_bytes_be());
        assert_eq!(
            jwk.oth,
            vec![OtherPrime {
                r: other(primes[2]),
                d: other("16cf7ce13b4bedfa8c10128f171defd2ab7ae484068a65d7ea6aa6acc20c422453c41b205e2f7076135121"),
                t: other("8ac314d2ce59f12c0181eb0cb0b8230eba3271d194104a46221b06cdcdba9c2f96752ddbad706de7edfcc"),
            }]
        );

        let restored = jwk.to_key().unwrap();
        signs_for(&restored, &key.to_public());
    }

    #[test]
    fn it_round_trips_ecdsa_keys_on_every_curve() {
        for curve in [EcCurve::P256, EcCurve::P384, EcCurve::P521] {
            let key = ecdsa_key(curve);

            let jwk = Jwk::from_key(&key, Some("ec")).unwrap();
            assert_eq!(jwk.kty, "EC");
            assert_eq!(jwk.crv, curve.to_string());
            assert_eq!(jwk.alg, curve.algorithm().to_string());
            for member in [&jwk.x, &jwk.y, &jwk.d] {
                assert_eq!(base64url_decode(member).unwrap().len(), curve.size());
            }

            let restored = jwk.to_key().unwrap();
            assert!(restored.is_private());
            signs_for(&restored, &key);

            let public = Jwk::from_key(&key.to_public(), None).unwrap();
            assert!(public.d.is_empty());
            signs_for(&key, &public.to_key().unwrap());
        }
    }

    #[test]
    fn it_rejects_an_ec_scalar_for_another_point() {
        let mut jwk = Jwk::from_key(&ecdsa_key(EcCurve::P256), None).unwrap();
        jwk.d = Jwk::from_key(&ecdsa_key(EcCurve::P256), None).unwrap().d;

        assert!(matches!(jwk.to_key(), Err(JwtError::InvalidKey(_))));
    }

    #[test]
    fn it_round_trips_a_secret() {
        let key = Key::secret("top secret");
        let jwk = Jwk::from_key(&key, None).unwrap();
        assert_eq!(
            serde_json::to_value(&jwk).unwrap(),
            json!({"kty": "oct", "use": "sig", "alg": "HS256", "k": "dG9wIHNlY3JldA"})
        );
        assert!(jwk.to_key().unwrap().public_eq(&key));

        let bound: Key = HmacKeyMaterial::with_algorithm(JwtSignatureAlgorithm::HS512, "top secret")
            .unwrap()
            .into();
        let jwk = Jwk::from_key(&bound, None).unwrap();
        assert_eq!(jwk.alg, "HS512");
        assert_eq!(
            jwk.to_key().unwrap().jwt_algorithm(),
            JwtSignatureAlgorithm::HS512
        );
    }

    #[test]
    fn it_infers_missing_key_types() {
        let mut jwk = Jwk::from_key(&rsa_key().to_public(), None).unwrap();
        jwk.kty.clear();
        assert_eq!(jwk.key_type().unwrap(), KeyType::Rsa);

        let mut jwk = Jwk::from_key(&ecdsa_key(EcCurve::P384), None).unwrap();
        jwk.kty.clear();
        assert_eq!(jwk.key_type().unwrap(), KeyType::Ec);

        let jwk: Jwk = serde_json::from_value(json!({"k": "c2VjcmV0"})).unwrap();
        assert_eq!(jwk.key_type().unwrap(), KeyType::Oct);

        let jwk: Jwk = serde_json::from_value(json!({"kty": "OKP", "crv": "Ed25519"})).unwrap();
        assert!(matches!(jwk.to_key(), Err(JwtError::UnsupportedKeyType(kty)) if kty == "OKP"));
    }

    #[test]
    fn it_rejects_unknown_curves_and_bad_encodings() {
        let jwk: Jwk =
            serde_json::from_value(json!({"kty": "EC", "crv": "P-192", "x": "AA", "y": "AA"}))
                .unwrap();
        assert!(matches!(jwk.to_key(), Err(JwtError::UnsupportedKeyType(_))));

        let jwk: Jwk = serde_json::from_value(json!({"kty": "RSA", "n": "+++", "e": "AQAB"})).unwrap();
        assert!(matches!(jwk.to_key(), Err(JwtError::Base64Decode(_))));
    }

    #[test]
    fn it_omits_empty_members() {
        let jwk = Jwk::from_key(&ecdsa_key(EcCurve::P256).to_public(), None).unwrap();
        let value = serde_json::to_value(&jwk).unwrap();

        let Value::Object(members) = value else {
            panic!("a JWK serializes to an object");
        };
        let mut names: Vec<&str> = members.keys().map(String::as_str).collect();
        names.sort();
        assert_eq!(names, vec!["alg", "crv", "kty", "use", "x", "y"]);
    }
}
