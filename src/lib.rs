//! Vultr container registry client
//!
//! Async bindings for the container registry endpoints of the Vultr API:
//! registries, their repositories, Docker credential issuance, regions and
//! plans. Each method maps to exactly one HTTP request.
//!
//! # Module Structure
//!
//! - [`client`] - shared client: request construction and execution
//! - [`http`] - transport with status mapping and retry of idempotent requests
//! - [`resource`] - one handler per resource type
//! - [`pagination`] - list envelope decoding into `(items, meta)`
//! - [`query`] - option structs to query strings
//! - [`config`] - layered configuration (defaults, file, environment)
//! - [`error`] - error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use vultr_registry::{Client, Config, ResourceHandler, UpdateRegistryRequest};
//!
//! # async fn example() -> vultr_registry::Result<()> {
//! let client = Client::new(&Config::default().with_api_key("YOUR_API_KEY"))?;
//!
//! let registry = client.registries().get("4dcdc25a-d36e-4d5f-9f4b-4d7e7cd4d6a1").await?;
//! let patch = UpdateRegistryRequest::new().with_public(true);
//! client.registries().update(&registry.id, &patch).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Cancellation follows the caller: dropping a returned future aborts the
//! in-flight request.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pagination;
pub mod query;
pub mod resource;

pub use client::Client;
pub use config::Config;
pub use error::{Error, Result};
pub use http::describe_error;
pub use pagination::{Links, Meta, Page};
pub use query::{encode_query, with_query, ListOptions, QueryParams};
pub use resource::{
    CreateRegistryRequest, CredentialsHandler, DockerCredentials, DockerCredentialsOptions, Plan,
    PlanHandler, Plans, Region, RegionHandler, Registry, RegistryHandler, RegistryStorage,
    RegistryUser, Repository, RepositoryHandler, ResourceHandler, StorageCount,
    UpdateRegistryRequest, UpdateRepositoryRequest,
};
