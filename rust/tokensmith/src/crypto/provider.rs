use super::Key;
use crate::{error::Result, header::JwtHeader, jwks::Jwks};
use std::borrow::Cow;

type KeyFn = dyn Fn() -> Option<Key> + Send + Sync;
type IdentifiedKeyFn = dyn Fn() -> (String, Option<Key>) + Send + Sync;

/// Where the signing key for a new token comes from. Provider functions are
/// invoked once per token, which lets a long-lived template pick up rotated
/// keys.
#[derive(Default)]
pub enum KeyProvider {
    /// Tokens are emitted unsigned, with `alg` set to `none`
    #[default]
    None,
    Key(Key),
    /// A key together with the identifier published in the `kid` header
    Identified(String, Key),
    Provider(Box<KeyFn>),
    IdentifiedProvider(Box<IdentifiedKeyFn>),
}

impl KeyProvider {
    pub fn identified<S: Into<String>, K: Into<Key>>(key_id: S, key: K) -> Self {
        KeyProvider::Identified(key_id.into(), key.into())
    }

    pub fn provider<F>(provider: F) -> Self
    where
        F: Fn() -> Option<Key> + Send + Sync + 'static,
    {
        KeyProvider::Provider(Box::new(provider))
    }

    pub fn identified_provider<F>(provider: F) -> Self
    where
        F: Fn() -> (String, Option<Key>) + Send + Sync + 'static,
    {
        KeyProvider::IdentifiedProvider(Box::new(provider))
    }

    /// Produce the key (and its identifier, if any) to sign the next token with
    pub fn resolve(&self) -> (Option<Cow<'_, str>>, Option<Cow<'_, Key>>) {
        match self {
            KeyProvider::None => (None, None),
            KeyProvider::Key(key) => (None, Some(Cow::Borrowed(key))),
            KeyProvider::Identified(key_id, key) => {
                (Some(Cow::Borrowed(key_id)), Some(Cow::Borrowed(key)))
            }
            KeyProvider::Provider(provider) => (None, provider().map(Cow::Owned)),
            KeyProvider::IdentifiedProvider(provider) => {
                let (key_id, key) = provider();
                (Some(Cow::Owned(key_id)), key.map(Cow::Owned))
            }
        }
    }
}

macro_rules! impl_from_key {
    ($($key:ty),*) => {
        $(
            impl From<$key> for KeyProvider {
                fn from(key: $key) -> Self {
                    KeyProvider::Key(key.into())
                }
            }
        )*
    };
}

impl_from_key!(
    Key,
    &str,
    String,
    Vec<u8>,
    crate::key_material::hmac::HmacKeyMaterial,
    crate::key_material::ecdsa::EcdsaKeyMaterial,
    rsa::RsaPrivateKey,
    rsa::RsaPublicKey
);

/// A lookup from the `(alg, kid)` header pair to a verification key
pub type AlgorithmAndIdResolver<'a> = &'a dyn Fn(&str, &str) -> Result<Option<Key>>;

/// A lookup from the `alg` header value to a verification key
pub type AlgorithmResolver<'a> = &'a dyn Fn(&str) -> Result<Option<Key>>;

/// How the verification key for an incoming token is found
#[derive(Clone, Copy)]
pub enum KeyResolver<'a> {
    /// Skip the signature check entirely. The token's times and header are
    /// still checked. Only for callers that establish trust some other way.
    Unchecked,
    Key(&'a Key),
    ByAlgorithmAndId(AlgorithmAndIdResolver<'a>),
    ByAlgorithm(AlgorithmResolver<'a>),
    KeySet(&'a Jwks),
}

impl<'a> KeyResolver<'a> {
    /// Find the key for a token with the given header. `Ok(None)` means that
    /// no usable key exists, as opposed to a failed lookup.
    pub fn resolve(&self, header: &JwtHeader) -> Result<Option<Cow<'a, Key>>> {
        Ok(match *self {
            KeyResolver::Unchecked => None,
            KeyResolver::Key(key) => Some(Cow::Borrowed(key)),
            KeyResolver::ByAlgorithmAndId(resolver) => {
                resolver(&header.alg, header.key_id())?.map(Cow::Owned)
            }
            KeyResolver::ByAlgorithm(resolver) => resolver(&header.alg)?.map(Cow::Owned),
            KeyResolver::KeySet(jwks) => jwks.get(&header.alg, header.key_id()).map(Cow::Owned),
        })
    }
}

impl<'a> From<&'a Key> for KeyResolver<'a> {
    fn from(key: &'a Key) -> Self {
        KeyResolver::Key(key)
    }
}

impl<'a> From<&'a Jwks> for KeyResolver<'a> {
    fn from(jwks: &'a Jwks) -> Self {
        KeyResolver::KeySet(jwks)
    }
}
