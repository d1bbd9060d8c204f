//! Resource handlers
//!
//! One handler per resource type, each a plain struct borrowing the shared
//! [`Client`]. A handler builds the path, sends exactly one request and
//! decodes the result; transport errors pass through untouched.
//!
//! # Handlers
//!
//! - [`registry`] - registry subscriptions (`/v2/registry`, `/v2/registries`)
//! - [`repository`] - repositories nested under one registry
//! - [`credentials`] - Docker credential issuance
//! - [`region`] - regions offering registries
//! - [`plan`] - registry plans
//!
//! # Example
//!
//! ```no_run
//! use vultr_registry::{Client, ListOptions, ResourceHandler};
//!
//! # async fn example(client: Client) -> vultr_registry::Result<()> {
//! let mut options = ListOptions::new().with_per_page(50);
//! loop {
//!     let page = client.registries().list(Some(&options)).await?;
//!     for registry in &page.items {
//!         println!("{} {}", registry.id, registry.name);
//!     }
//!     match options.next_page(&page.meta) {
//!         Some(next) => options = next,
//!         None => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod plan;
pub mod region;
pub mod registry;
pub mod repository;

pub use credentials::{CredentialsHandler, DockerCredentials, DockerCredentialsOptions};
pub use plan::{Plan, PlanHandler, Plans};
pub use region::{Region, RegionHandler};
pub use registry::{
    CreateRegistryRequest, Registry, RegistryHandler, RegistryStorage, RegistryUser,
    StorageCount, UpdateRegistryRequest,
};
pub use repository::{Repository, RepositoryHandler, UpdateRepositoryRequest};

use crate::client::{Client, NO_BODY};
use crate::error::{Error, Result};
use crate::pagination::Page;
use crate::query::{with_query, ListOptions};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Single-registry paths
pub const REGISTRY_PATH: &str = "/v2/registry";
/// Registry collection path
pub const REGISTRIES_PATH: &str = "/v2/registries";

/// Operations shared by every addressable resource
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Resource returned by the API
    type Item: DeserializeOwned + Send;
    /// Partial update payload; unset fields are not sent
    type Patch: Serialize + Send + Sync;

    /// Fetch one resource. A missing resource surfaces as a 404 API error.
    async fn get(&self, id: &str) -> Result<Self::Item>;

    /// Fetch one page. Following `meta.links.next` is up to the caller.
    async fn list(&self, options: Option<&ListOptions>) -> Result<Page<Self::Item>>;

    async fn update(&self, id: &str, patch: &Self::Patch) -> Result<Self::Item>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// Percent-encode a caller-supplied path segment, rejecting empty ones
pub(crate) fn segment(value: &str, what: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::RequestConstruction(format!(
            "{} must not be empty",
            what
        )));
    }
    Ok(urlencoding::encode(value).into_owned())
}

pub(crate) async fn fetch_one<T: DeserializeOwned>(client: &Client, path: &str) -> Result<T> {
    let request = client.new_request(Method::GET, path, NO_BODY)?;
    client.send(request).await
}

pub(crate) async fn fetch_page<T: DeserializeOwned>(
    client: &Client,
    path: &str,
    collection: &str,
    options: Option<&ListOptions>,
) -> Result<Page<T>> {
    let path = with_query(path, &options);
    let request = client.new_request(Method::GET, &path, NO_BODY)?;
    let body: Value = client.send(request).await?;
    Page::from_envelope(body, collection)
}

pub(crate) async fn send_with_body<T, B>(
    client: &Client,
    method: Method,
    path: &str,
    body: &B,
) -> Result<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    let request = client.new_request(method, path, Some(body))?;
    client.send(request).await
}

pub(crate) async fn remove(client: &Client, path: &str) -> Result<()> {
    let request = client.new_request(Method::DELETE, path, NO_BODY)?;
    client.send_empty(request).await
}
