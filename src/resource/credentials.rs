//! Docker credentials
//!
//! Every call issues a fresh credential on the server: nothing is cached and
//! the request is never retried. The API exposes issuance on the `OPTIONS`
//! verb rather than `POST`; that verb is kept for wire compatibility.

use super::{segment, REGISTRY_PATH};
use crate::client::{Client, NO_BODY};
use crate::error::Result;
use crate::query::{with_query, QueryParams};
use reqwest::Method;
use std::fmt;
use std::str::Utf8Error;

/// Options for credential issuance. Unset options are not sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DockerCredentialsOptions {
    /// Lifetime of the credential; the server default applies when unset
    pub expiry_seconds: Option<u64>,
    /// Grant push access in addition to pull
    pub write_access: Option<bool>,
}

impl DockerCredentialsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expiry_seconds(mut self, seconds: u64) -> Self {
        self.expiry_seconds = Some(seconds);
        self
    }

    pub fn with_write_access(mut self, write: bool) -> Self {
        self.write_access = Some(write);
        self
    }
}

impl QueryParams for DockerCredentialsOptions {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(seconds) = self.expiry_seconds {
            pairs.push(("expiry_seconds", seconds.to_string()));
        }
        if let Some(write) = self.write_access {
            pairs.push(("read_write", write.to_string()));
        }
        pairs
    }
}

/// Credential blob exactly as returned by the API, typically a Docker
/// `config.json` document. The bytes are never transcoded.
#[derive(Clone, PartialEq, Eq)]
pub struct DockerCredentials(Vec<u8>);

impl DockerCredentials {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Borrow the blob as text, failing if it is not UTF-8
    pub fn as_str(&self) -> std::result::Result<&str, Utf8Error> {
        std::str::from_utf8(&self.0)
    }

    /// Parse the blob as JSON
    pub fn to_json(&self) -> Result<serde_json::Value> {
        crate::http::decode_json(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for DockerCredentials {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for DockerCredentials {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Lossy for blobs that are not UTF-8: invalid bytes become U+FFFD.
/// Use [`DockerCredentials::as_bytes`] or [`DockerCredentials::as_str`] for
/// the verbatim body.
impl fmt::Display for DockerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

// Security: the blob holds a secret
impl fmt::Debug for DockerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DockerCredentials(<{} bytes>)", self.0.len())
    }
}

/// Credential issuance for one registry
#[derive(Clone)]
pub struct CredentialsHandler<'a> {
    client: &'a Client,
    registry_id: String,
}

impl<'a> CredentialsHandler<'a> {
    pub fn new(client: &'a Client, registry_id: &str) -> Self {
        Self {
            client,
            registry_id: registry_id.to_string(),
        }
    }

    /// Issue new Docker credentials
    pub async fn create(&self, options: &DockerCredentialsOptions) -> Result<DockerCredentials> {
        let path = format!(
            "{}/{}/docker-credentials",
            REGISTRY_PATH,
            segment(&self.registry_id, "registry id")?
        );
        let path = with_query(&path, options);

        tracing::info!(
            "Issuing docker credentials for registry {} (write access: {:?})",
            self.registry_id,
            options.write_access
        );

        let request = self.client.new_request(Method::OPTIONS, &path, NO_BODY)?;
        let body = self.client.send_raw(request).await?;
        Ok(DockerCredentials(body))
    }
}
