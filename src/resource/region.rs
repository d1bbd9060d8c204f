//! Registry regions

use super::{fetch_page, REGISTRY_PATH};
use crate::client::Client;
use crate::error::Result;
use crate::pagination::Page;
use crate::query::ListOptions;
use serde::{Deserialize, Serialize};

/// A region that can host registries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub urn: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub added_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Clone, Copy)]
pub struct RegionHandler<'a> {
    client: &'a Client,
}

impl<'a> RegionHandler<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List one page of regions
    pub async fn list(&self, options: Option<&ListOptions>) -> Result<Page<Region>> {
        let path = format!("{}/region/list", REGISTRY_PATH);
        fetch_page(self.client, &path, "regions", options).await
    }
}
