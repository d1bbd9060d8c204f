//! Vultr Client
//!
//! Shared client that builds authenticated requests against the API base URL
//! and executes them through [`HttpClient`]. Resource handlers borrow it.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{decode_json, HttpClient};
use crate::resource::{
    CredentialsHandler, PlanHandler, RegionHandler, RegistryHandler, RepositoryHandler,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Request};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Placeholder for requests without a JSON body
pub const NO_BODY: Option<&()> = None;

/// Main Vultr API client
#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    base_url: Url,
    api_key: Option<String>,
}

impl Client {
    /// Create a new client from a configuration
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {}", config.base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base URL {:?} cannot carry a path",
                config.base_url
            )));
        }

        let http = HttpClient::new(config)?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Create a client from the config file and `VULTR_*` environment variables
    pub fn from_env() -> Result<Self> {
        let config = Config::load().with_env()?;
        Self::new(&config)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path (which may carry a query string) against the base URL
    pub fn url_for(&self, path: &str) -> Result<Url> {
        if !path.starts_with('/') {
            return Err(Error::RequestConstruction(format!(
                "path must be absolute: {:?}",
                path
            )));
        }

        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, path))?)
    }

    /// Build a request for `path`, with an optional JSON body.
    /// The API key, when configured, is attached as a bearer token.
    pub fn new_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Request>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url_for(path)?;

        let mut builder = self
            .http
            .inner()
            .request(method, url)
            .header(ACCEPT, "application/json");

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| Error::RequestConstruction(format!("cannot encode body: {}", e)))?;
            builder = builder.header(CONTENT_TYPE, "application/json").body(bytes);
        }

        builder
            .build()
            .map_err(|e| Error::RequestConstruction(e.to_string()))
    }

    /// Execute a request and decode the JSON response
    pub async fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let body = self.http.execute(request).await?;
        decode_json(&body)
    }

    /// Execute a request whose response body is irrelevant
    pub async fn send_empty(&self, request: Request) -> Result<()> {
        self.http.execute(request).await.map(|_| ())
    }

    /// Execute a request and return the body bytes untouched
    pub async fn send_raw(&self, request: Request) -> Result<Vec<u8>> {
        self.http.execute(request).await
    }

    // =========================================================================
    // Resource handlers
    // =========================================================================

    /// Container registry subscriptions
    pub fn registries(&self) -> RegistryHandler<'_> {
        RegistryHandler::new(self)
    }

    /// Repositories of one registry
    pub fn repositories(&self, registry_id: &str) -> RepositoryHandler<'_> {
        RepositoryHandler::new(self, registry_id)
    }

    /// Docker credential issuance for one registry
    pub fn docker_credentials(&self, registry_id: &str) -> CredentialsHandler<'_> {
        CredentialsHandler::new(self, registry_id)
    }

    /// Regions where registries can be created
    pub fn regions(&self) -> RegionHandler<'_> {
        RegionHandler::new(self)
    }

    /// Registry plans
    pub fn plans(&self) -> PlanHandler<'_> {
        PlanHandler::new(self)
    }
}
