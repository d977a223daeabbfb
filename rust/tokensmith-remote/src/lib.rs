//! Retrieval of JWK Sets published by token issuers.
//!
//! ```rust,no_run
//! use tokensmith::verify::verify;
//! use tokensmith_remote::JwksClient;
//!
//! async fn check(token: &str) -> anyhow::Result<Vec<u8>> {
//!     let jwks = JwksClient::new("https://issuer.example.com/.well-known/jwks.json")?
//!         .fetch()
//!         .await?;
//!     Ok(verify(token, &jwks)?)
//! }
//! ```

#[macro_use]
extern crate tracing;

use anyhow::{anyhow, Result};
use std::time::Duration;
use tokensmith::jwks::Jwks;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the JWK Set published at a single URL
#[derive(Clone, Debug)]
pub struct JwksClient {
    url: Url,
    client: reqwest::Client,
    timeout: Duration,
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

impl JwksClient {
    /// A client for an `http` or `https` URL
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        match url.scheme() {
            "http" | "https" => (),
            scheme => return Err(anyhow!("Unsupported JWKS URL scheme: {}", scheme)),
        }

        Ok(JwksClient {
            url,
            client: build_client(DEFAULT_TIMEOUT)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Give up on requests that take longer than `timeout`
    pub fn with_timeout(self, timeout: Duration) -> Result<Self> {
        Ok(JwksClient {
            client: build_client(timeout)?,
            timeout,
            ..self
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The raw body of the JWKS document. Any status other than a success
    /// is an error that carries the status line.
    pub async fn fetch_bytes(&self) -> Result<Vec<u8>> {
        debug!("Fetching JWKS from {}", self.url);
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("JWKS request to {} failed: {}", self.url, status);
            return Err(anyhow!("{}", status));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch and parse the JWK Set
    pub async fn fetch(&self) -> Result<Jwks> {
        let jwks = Jwks::from_json(&self.fetch_bytes().await?)?;
        info!("Loaded {} keys from {}", jwks.len(), self.url);
        Ok(jwks)
    }
}
