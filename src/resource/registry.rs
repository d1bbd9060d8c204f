//! Container registries
//!
//! Registry subscriptions: create, fetch, list, update and delete.

use super::{
    fetch_one, fetch_page, remove, segment, send_with_body, CredentialsHandler,
    DockerCredentials, DockerCredentialsOptions, RepositoryHandler, ResourceHandler,
    REGISTRIES_PATH, REGISTRY_PATH,
};
use crate::client::Client;
use crate::error::Result;
use crate::pagination::Page;
use crate::query::ListOptions;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A container registry subscription
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub urn: String,
    #[serde(default)]
    pub storage: RegistryStorage,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub root_user: RegistryUser,
}

/// Storage usage and limit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryStorage {
    #[serde(default)]
    pub used: StorageCount,
    #[serde(default)]
    pub allowed: StorageCount,
}

/// Storage amount in several units
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageCount {
    #[serde(default)]
    pub bytes: f64,
    #[serde(default)]
    pub mb: f64,
    #[serde(default)]
    pub gb: f64,
    #[serde(default)]
    pub tb: f64,
    #[serde(default)]
    pub updated_at: String,
}

/// Root user of a registry
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryUser {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub root: bool,
    #[serde(default)]
    pub added_at: String,
    #[serde(default)]
    pub updated_at: String,
}

// Security: keep the root password out of logs and panic messages
impl fmt::Debug for RegistryUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("root", &self.root)
            .field("added_at", &self.added_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Payload to create a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRegistryRequest {
    pub name: String,
    pub public: bool,
    pub region: String,
    pub plan: String,
}

/// Partial update of a registry; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRegistryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl UpdateRegistryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = Some(public);
        self
    }

    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = Some(plan.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.public.is_none() && self.plan.is_none()
    }
}

/// Registry handler
#[derive(Clone, Copy)]
pub struct RegistryHandler<'a> {
    client: &'a Client,
}

impl<'a> RegistryHandler<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn item_path(id: &str) -> Result<String> {
        Ok(format!("{}/{}", REGISTRY_PATH, segment(id, "registry id")?))
    }

    /// Create a registry. The result carries server-assigned fields.
    pub async fn create(&self, request: &CreateRegistryRequest) -> Result<Registry> {
        tracing::info!(
            "Creating registry {} in {} on plan {}",
            request.name,
            request.region,
            request.plan
        );
        send_with_body(self.client, Method::POST, REGISTRY_PATH, request).await
    }

    /// Handler for the repositories of `registry_id`
    pub fn repositories(&self, registry_id: &str) -> RepositoryHandler<'a> {
        RepositoryHandler::new(self.client, registry_id)
    }

    /// Issue new Docker credentials for `registry_id`
    pub async fn create_docker_credentials(
        &self,
        registry_id: &str,
        options: &DockerCredentialsOptions,
    ) -> Result<DockerCredentials> {
        CredentialsHandler::new(self.client, registry_id)
            .create(options)
            .await
    }
}

#[async_trait]
impl<'a> ResourceHandler for RegistryHandler<'a> {
    type Item = Registry;
    type Patch = UpdateRegistryRequest;

    async fn get(&self, id: &str) -> Result<Registry> {
        fetch_one(self.client, &Self::item_path(id)?).await
    }

    async fn list(&self, options: Option<&ListOptions>) -> Result<Page<Registry>> {
        fetch_page(self.client, REGISTRIES_PATH, "registries", options).await
    }

    async fn update(&self, id: &str, patch: &UpdateRegistryRequest) -> Result<Registry> {
        let path = Self::item_path(id)?;
        tracing::info!("Updating registry {}", id);
        send_with_body(self.client, Method::PUT, &path, patch).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = Self::item_path(id)?;
        tracing::info!("Deleting registry {}", id);
        remove(self.client, &path).await
    }
}
