use crate::{
    claims::{materialize, ClaimInput, ClaimMap, ClaimValue},
    crypto::KeyProvider,
    error::Result,
    time::Time,
    token::encode_with,
};
use std::time::Duration;

type UniqueIdFn = dyn Fn() -> Result<String> + Send + Sync;

/// How far `iat` is backdated, so that a verifier whose clock runs slightly
/// behind does not see the token as created in the future
pub const CREATED_BACKDATE: Duration = Duration::from_secs(10);

/// A reusable description of the tokens a service issues. The registered
/// claims it names are filled in on every call to [TokenConfig::token], and
/// the token is signed with whatever its [KeyProvider] yields at that moment.
#[derive(Default)]
pub struct TokenConfig {
    issuer: Option<String>,
    created: bool,
    expires: Option<Duration>,
    not_before: Option<Duration>,
    token_type: Option<String>,
    unique_id: Option<Box<UniqueIdFn>>,
    private: ClaimMap,
    key: KeyProvider,
}

impl TokenConfig {
    /// Sets `iss` on every token
    pub fn issued_by<S: Into<String>>(mut self, issuer: S) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets `iat` on every token, slightly backdated
    pub fn with_creation_time(mut self) -> Self {
        self.created = true;
        self
    }

    /// Sets `exp` to this far past the moment of issue. A zero lifetime sets
    /// no expiry at all.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.expires = Some(lifetime).filter(|lifetime| !lifetime.is_zero());
        self
    }

    /// Sets `nbf` to this far past the moment of issue. A zero delay sets no
    /// `nbf` at all.
    pub fn not_before(mut self, delay: Duration) -> Self {
        self.not_before = Some(delay).filter(|delay| !delay.is_zero());
        self
    }

    /// Sets the `typ` claim (not the header field of the same name)
    pub fn with_type<S: Into<String>>(mut self, token_type: S) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// Sets `jti` on every token to a fresh value from `generator`
    pub fn with_unique_id<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> Result<String> + Send + Sync + 'static,
    {
        self.unique_id = Some(Box::new(generator));
        self
    }

    /// Adds a claim to every token. Registered claims and caller input both
    /// take precedence over it.
    pub fn with_private_claim<N: Into<String>, V: Into<ClaimValue>>(
        mut self,
        name: N,
        value: V,
    ) -> Self {
        self.private.insert(name.into(), value.into());
        self
    }

    /// Sign tokens with a key, or with whatever a provider hands out
    pub fn signed_by<K: Into<KeyProvider>>(mut self, key: K) -> Self {
        self.key = key.into();
        self
    }

    /// The registered claims for a token issued at `now`
    fn registered_claims(&self, now: Time) -> Result<ClaimMap> {
        let mut claims = ClaimMap::new();

        if let Some(issuer) = &self.issuer {
            claims.insert("iss".into(), issuer.as_str().into());
        }
        if self.created {
            claims.insert("iat".into(), (now - CREATED_BACKDATE).into());
        }
        if let Some(lifetime) = self.expires {
            claims.insert("exp".into(), (now + lifetime).into());
        }
        if let Some(delay) = self.not_before {
            claims.insert("nbf".into(), (now + delay).into());
        }
        if let Some(token_type) = &self.token_type {
            claims.insert("typ".into(), token_type.as_str().into());
        }
        if let Some(unique_id) = &self.unique_id {
            claims.insert("jti".into(), unique_id()?.into());
        }

        Ok(claims)
    }

    /// Issue a token carrying `input` on top of the configured claims
    pub fn token<'a, I: Into<ClaimInput<'a>>>(&self, input: I) -> Result<String> {
        self.token_at(input, Time::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn token_at<'a, I: Into<ClaimInput<'a>>>(&self, input: I, now: Time) -> Result<String> {
        let claims = materialize(self.registered_claims(now)?, &self.private, input.into())?;
        encode_with(&claims, &self.key)
    }
}
