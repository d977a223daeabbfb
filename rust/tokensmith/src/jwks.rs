use crate::{
    crypto::{Key, KeyMaterial, KeyResolver},
    error::{JwtError, Result},
    jwk::{Jwk, KeyType},
};
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{btree_map, BTreeMap};

#[derive(Serialize, Deserialize)]
struct JwksDocument {
    #[serde(default)]
    keys: Vec<Jwk>,
}

/// A set of public verification keys, ordered by key id.
///
/// Only usable RSA and EC keys with a `kid` survive an import; anything else
/// in the document is skipped. Private members are never stored, and so are never
/// written back out.
#[derive(Clone, Debug, Default)]
pub struct Jwks {
    keys: BTreeMap<String, Key>,
}

impl Jwks {
    pub fn new() -> Self {
        Jwks::default()
    }

    /// Store the public part of `key` under `key_id`, replacing any key that
    /// was already there. Symmetric keys have no public part and are refused.
    pub fn add<S: Into<String>>(&mut self, key_id: S, key: &Key) -> Result<()> {
        if let Key::Hmac(_) = key {
            return Err(JwtError::UnsupportedKeyType(
                "symmetric keys cannot be published".into(),
            ));
        }
        self.keys.insert(key_id.into(), key.to_public());
        Ok(())
    }

    pub fn remove(&mut self, key_id: &str) -> Option<Key> {
        self.keys.remove(key_id)
    }

    /// The key stored under `key_id`. When `alg` is not empty the key must
    /// also sign with that algorithm.
    pub fn get(&self, alg: &str, key_id: &str) -> Option<Key> {
        let key = self.keys.get(key_id)?;
        if !alg.is_empty() && key.jwt_algorithm().to_string() != alg {
            debug!("Key {} does not sign with {}", key_id, alg);
            return None;
        }
        Some(key.clone())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Key> {
        self.keys.iter()
    }

    /// Verify tokens against the keys in this set, by their `kid` header
    pub fn resolver(&self) -> KeyResolver<'_> {
        KeyResolver::KeySet(self)
    }

    pub fn from_json(json: &[u8]) -> Result<Self> {
        Jwks::from_document(serde_json::from_slice(json)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_document()?)?)
    }

    fn from_document(document: JwksDocument) -> Result<Self> {
        let mut jwks = Jwks::default();

        for jwk in document.keys {
            if jwk.kid.is_empty() {
                debug!("Skipping {:?} key without a key id", jwk.kty);
                continue;
            }
            match jwk.key_type() {
                Ok(KeyType::Rsa) | Ok(KeyType::Ec) => (),
                Ok(KeyType::Oct) => {
                    debug!("Skipping symmetric key {}", jwk.kid);
                    continue;
                }
                Err(error) => {
                    debug!("Skipping key {}: {}", jwk.kid, error);
                    continue;
                }
            }

            let key = match public_members(&jwk).to_key() {
                Ok(key) => key,
                Err(JwtError::UnsupportedKeyType(reason)) => {
                    debug!("Skipping key {}: unsupported {}", jwk.kid, reason);
                    continue;
                }
                Err(JwtError::InvalidKey(reason)) => {
                    debug!("Skipping key {}: {}", jwk.kid, reason);
                    continue;
                }
                Err(error) => return Err(error),
            };
            jwks.keys.insert(jwk.kid, key);
        }

        Ok(jwks)
    }

    fn to_document(&self) -> Result<JwksDocument> {
        let keys = self
            .keys
            .iter()
            .map(|(key_id, key)| Jwk::from_key(&key.to_public(), Some(key_id.as_str())))
            .collect::<Result<Vec<_>>>()?;
        Ok(JwksDocument { keys })
    }
}

/// The JWK without any of its private members
fn public_members(jwk: &Jwk) -> Jwk {
    Jwk {
        d: String::new(),
        p: String::new(),
        q: String::new(),
        dp: String::new(),
        dq: String::new(),
        qi: String::new(),
        oth: Vec::new(),
        k: String::new(),
        ..jwk.clone()
    }
}

impl Serialize for Jwks {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_document()
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Jwks {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Jwks::from_document(JwksDocument::deserialize(deserializer)?).map_err(de::Error::custom)
    }
}
