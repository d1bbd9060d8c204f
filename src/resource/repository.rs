//! Registry repositories
//!
//! Repositories live under a registry, so every path is composed from the
//! registry id and the image name.

use super::{fetch_one, fetch_page, remove, segment, send_with_body, ResourceHandler, REGISTRY_PATH};
use crate::client::Client;
use crate::error::Result;
use crate::pagination::Page;
use crate::query::ListOptions;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// An image repository inside a registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub added_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub pull_count: u64,
    #[serde(default)]
    pub artifact_count: u64,
}

/// Partial update of a repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRepositoryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateRepositoryRequest {
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
        }
    }
}

/// Repository handler scoped to one registry
#[derive(Clone)]
pub struct RepositoryHandler<'a> {
    client: &'a Client,
    registry_id: String,
}

impl<'a> RepositoryHandler<'a> {
    pub fn new(client: &'a Client, registry_id: &str) -> Self {
        Self {
            client,
            registry_id: registry_id.to_string(),
        }
    }

    pub fn registry_id(&self) -> &str {
        &self.registry_id
    }

    fn registry_path(&self) -> Result<String> {
        Ok(format!(
            "{}/{}",
            REGISTRY_PATH,
            segment(&self.registry_id, "registry id")?
        ))
    }

    fn item_path(&self, image: &str) -> Result<String> {
        Ok(format!(
            "{}/repository/{}",
            self.registry_path()?,
            segment(image, "image name")?
        ))
    }
}

#[async_trait]
impl<'a> ResourceHandler for RepositoryHandler<'a> {
    type Item = Repository;
    type Patch = UpdateRepositoryRequest;

    async fn get(&self, image: &str) -> Result<Repository> {
        fetch_one(self.client, &self.item_path(image)?).await
    }

    async fn list(&self, options: Option<&ListOptions>) -> Result<Page<Repository>> {
        let path = format!("{}/repositories", self.registry_path()?);
        fetch_page(self.client, &path, "repositories", options).await
    }

    async fn update(&self, image: &str, patch: &UpdateRepositoryRequest) -> Result<Repository> {
        let path = self.item_path(image)?;
        tracing::info!("Updating repository {} in registry {}", image, self.registry_id);
        send_with_body(self.client, Method::PUT, &path, patch).await
    }

    async fn delete(&self, image: &str) -> Result<()> {
        let path = self.item_path(image)?;
        tracing::info!("Deleting repository {} in registry {}", image, self.registry_id);
        remove(self.client, &path).await
    }
}
