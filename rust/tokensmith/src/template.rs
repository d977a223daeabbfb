use crate::{
    claims::{materialize, ClaimInput, ClaimMap, ClaimValue},
    error::{JwtError, Result},
    signer::Signer,
    time::{now, Time},
};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;

/// Tokens issued and checked with one [Signer]. Unlike a
/// [TokenConfig](crate::config::TokenConfig), a template also knows how to
/// parse its own tokens back, and insists that they carry the registered
/// claims it would have written.
#[derive(Clone, Debug)]
pub struct Template {
    issuer: Option<String>,
    subject: Option<String>,
    audience: Vec<String>,
    created: bool,
    expire: Option<Duration>,
    not_before: Option<Duration>,
    signer: Signer,
}

#[derive(Deserialize, Default)]
struct RegisteredClaims {
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    nbf: Option<i64>,
}

impl Template {
    pub fn new(signer: Signer) -> Self {
        Template {
            issuer: None,
            subject: None,
            audience: Vec::new(),
            created: false,
            expire: None,
            not_before: None,
            signer,
        }
    }

    pub fn issued_by<S: Into<String>>(mut self, issuer: S) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn for_subject<S: Into<String>>(mut self, subject: S) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Add an intended audience. A single audience is written as a string,
    /// several as an array.
    pub fn for_audience<S: Into<String>>(mut self, audience: S) -> Self {
        self.audience.push(audience.into());
        self
    }

    /// Sets `iat` to the exact moment of issue
    pub fn with_creation_time(mut self) -> Self {
        self.created = true;
        self
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.expire = Some(lifetime).filter(|lifetime| !lifetime.is_zero());
        self
    }

    pub fn not_before(mut self, delay: Duration) -> Self {
        self.not_before = Some(delay).filter(|delay| !delay.is_zero());
        self
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    fn registered_claims(&self, now: Time) -> ClaimMap {
        let mut claims = ClaimMap::new();

        if let Some(issuer) = &self.issuer {
            claims.insert("iss".into(), issuer.as_str().into());
        }
        if let Some(subject) = &self.subject {
            claims.insert("sub".into(), subject.as_str().into());
        }
        match self.audience.as_slice() {
            [] => (),
            [audience] => {
                claims.insert("aud".into(), audience.as_str().into());
            }
            audience => {
                claims.insert("aud".into(), ClaimValue::from(audience.to_vec()));
            }
        }
        if let Some(lifetime) = self.expire {
            claims.insert("exp".into(), (now + lifetime).into());
        }
        if let Some(delay) = self.not_before {
            claims.insert("nbf".into(), (now + delay).into());
        }
        if self.created {
            claims.insert("iat".into(), now.into());
        }

        claims
    }

    /// Issue a signed token carrying `input` on top of the registered claims
    pub fn token<'a, I: Into<ClaimInput<'a>>>(&self, input: I) -> Result<Vec<u8>> {
        self.token_at(input, Time::now())
    }

    pub fn token_at<'a, I: Into<ClaimInput<'a>>>(&self, input: I, now: Time) -> Result<Vec<u8>> {
        let claims = materialize(self.registered_claims(now), &ClaimMap::new(), input.into())?;
        self.signer.sign(&serde_json::to_vec(&claims)?)
    }

    /// Check a token issued by this template and return its decoded payload
    pub fn parse(&self, token: &[u8]) -> Result<Vec<u8>> {
        self.parse_at(token, now())
    }

    pub fn parse_at(&self, token: &[u8], now_time: u64) -> Result<Vec<u8>> {
        let payload = self.signer.parse(token)?;
        let claims: RegisteredClaims = serde_json::from_slice(&payload)?;
        self.check(&claims, i64::try_from(now_time).unwrap_or(i64::MAX))?;
        Ok(payload)
    }

    /// Check a token issued by this template and deserialize its claims
    pub fn parse_into<T: DeserializeOwned>(&self, token: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(&self.parse(token)?)?)
    }

    fn check(&self, claims: &RegisteredClaims, now: i64) -> Result<()> {
        if let Some(issuer) = &self.issuer {
            if claims.iss.as_ref() != Some(issuer) {
                return Err(JwtError::BadIssuer);
            }
        }
        if let Some(subject) = &self.subject {
            if claims.sub.as_ref() != Some(subject) {
                return Err(JwtError::BadSubject);
            }
        }

        let created = claims.iat.unwrap_or_default();
        let expires = claims.exp.unwrap_or_default();
        let not_before = claims.nbf.unwrap_or_default();

        if self.created && created == 0 {
            return Err(JwtError::MissingClaim("created"));
        }
        if self.expire.is_some() && expires == 0 {
            return Err(JwtError::MissingClaim("expire"));
        }
        if self.not_before.is_some() && not_before == 0 {
            return Err(JwtError::MissingClaim("notBefore"));
        }

        if expires > 0 && expires < now {
            return Err(JwtError::Expired);
        }
        if created > 0 && created > now {
            return Err(JwtError::CreatedAfterNow);
        }
        if not_before > 0 && not_before > now {
            return Err(JwtError::NotYetValid);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Template;
    use crate::{
        claims::{ClaimRecord, RecordField},
        error::JwtError,
        signer::Signer,
        time::Time,
    };
    use serde::Deserialize;
    use serde_json::{json, Value};
    use std::time::Duration;

    const NOW: i64 = 1_700_000_000;

    fn template() -> Template {
        Template::new(Signer::hs256("TOPSECRET").unwrap())
    }

    #[test]
    fn it_writes_a_record_with_registered_claims() {
        let template = template()
            .issued_by("i am")
            .for_audience("test audience")
            .with_lifetime(Duration::from_secs(3600))
            .with_creation_time();

        let record = ClaimRecord::default()
            .with(RecordField::new("GroupId", "group").json("gid"))
            .with(RecordField::new("UserId", "user-id"))
            .with(RecordField::new("EmptyValue", ""))
            .with(RecordField::new("EmptyValue2", "").json(",omitempty"))
            .with(RecordField::new("EmptyValue3", "").raw(",omitempty"))
            .with(RecordField::new("IgnoreValue", "").json("-"))
            .with(RecordField::new("BaseValue", "").raw("base"))
            .with(RecordField::new("Time", Time::zero()).json(",omitempty"))
            .with(RecordField::new("Time2", Time::zero()).json("ddd,"))
            .with(RecordField::new("Bool", false).raw("-"));

        let token = template.token_at(record, Time::from_unix(NOW)).unwrap();
        let claims: Value =
            serde_json::from_slice(&template.parse_at(&token, NOW as u64).unwrap()).unwrap();

        assert_eq!(
            claims,
            json!({
                "iss": "i am",
                "aud": "test audience",
                "exp": NOW + 3600,
                "iat": NOW,
                "gid": "group",
                "userId": "user-id",
                "emptyValue": "",
                "base": "",
            })
        );
    }

    #[test]
    fn it_writes_several_audiences_as_an_array() {
        let template = template().for_audience("one").for_audience("two");
        let token = template.token(json!({})).unwrap();

        #[derive(Deserialize)]
        struct Audience {
            aud: Vec<String>,
        }
        let claims: Audience = template.parse_into(&token).unwrap();
        assert_eq!(claims.aud, vec!["one", "two"]);
    }

    #[test]
    fn it_requires_matching_issuer_and_subject() {
        let issuer = template().issued_by("issuer");
        let token = template().token(json!({"iss": "someone else"})).unwrap();
        assert!(matches!(issuer.parse(&token), Err(JwtError::BadIssuer)));

        let subject = template().for_subject("123");
        let token = template().token(json!({})).unwrap();
        assert!(matches!(subject.parse(&token), Err(JwtError::BadSubject)));

        let token = subject.token(json!({})).unwrap();
        subject.parse(&token).unwrap();
    }

    #[test]
    fn it_requires_the_claims_it_would_write() {
        let bare = template().token(json!({})).unwrap();

        for (template, claim) in [
            (template().with_creation_time(), "created"),
            (template().with_lifetime(Duration::from_secs(60)), "expire"),
            (template().not_before(Duration::from_secs(60)), "notBefore"),
        ] {
            assert!(matches!(
                template.parse(&bare),
                Err(JwtError::MissingClaim(name)) if name == claim
            ));
        }
    }

    #[test]
    fn it_checks_times() {
        let template = template()
            .with_creation_time()
            .with_lifetime(Duration::from_secs(3600))
            .not_before(Duration::from_secs(60));
        let token = template.token_at(json!({}), Time::from_unix(NOW)).unwrap();

        assert!(matches!(
            template.parse_at(&token, (NOW - 1) as u64),
            Err(JwtError::CreatedAfterNow)
        ));
        assert!(matches!(
            template.parse_at(&token, (NOW + 30) as u64),
            Err(JwtError::NotYetValid)
        ));
        template.parse_at(&token, (NOW + 60) as u64).unwrap();
        template.parse_at(&token, (NOW + 3600) as u64).unwrap();
        assert!(matches!(
            template.parse_at(&token, (NOW + 3601) as u64),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn it_rejects_tokens_from_another_secret() {
        let token = template().token(json!({"sub": "123"})).unwrap();
        let other = Template::new(Signer::hs256("another").unwrap());

        assert!(matches!(other.parse(&token), Err(JwtError::BadSignature)));
    }
}
