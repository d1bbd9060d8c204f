//! Registry plans
//!
//! The plan list is a fixed set of tiers keyed by name, not a paginated
//! collection.

use super::{fetch_one, REGISTRY_PATH};
use crate::client::Client;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Pricing and storage limit of one tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub vanity_name: String,
    #[serde(default)]
    pub max_storage_mb: u64,
    #[serde(default)]
    pub monthly_price: u64,
}

/// All registry tiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plans {
    #[serde(default)]
    pub start_up: Plan,
    #[serde(default)]
    pub business: Plan,
    #[serde(default)]
    pub premium: Plan,
    #[serde(default)]
    pub enterprise: Plan,
}

impl Plans {
    /// Tiers with their API identifiers, cheapest first
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Plan)> {
        [
            ("start_up", &self.start_up),
            ("business", &self.business),
            ("premium", &self.premium),
            ("enterprise", &self.enterprise),
        ]
        .into_iter()
    }
}

#[derive(Deserialize)]
struct PlansEnvelope {
    plans: Plans,
}

#[derive(Clone, Copy)]
pub struct PlanHandler<'a> {
    client: &'a Client,
}

impl<'a> PlanHandler<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetch every plan
    pub async fn list(&self) -> Result<Plans> {
        let path = format!("{}/plan/list", REGISTRY_PATH);
        let envelope: PlansEnvelope = fetch_one(self.client, &path).await?;
        Ok(envelope.plans)
    }
}
