//! Dashboard counters

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError};
use crate::cache::{Params, RequestCache, Resource, TtlTier};

/// Global counters shown on the home dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_concentrateurs: u32,
    /// Count per state (en_stock, pose, a_tester, ...)
    #[serde(default)]
    pub par_etat: BTreeMap<String, u32>,
    /// Count per location (Magasin, Labo, base names)
    #[serde(default)]
    pub par_affectation: BTreeMap<String, u32>,
}

/// Client for the dashboard counters served by the `/stats` router
#[derive(Clone)]
pub struct DashboardService {
    api: ApiClient,
    cache: Arc<RequestCache>,
}

impl DashboardService {
    pub fn new(api: ApiClient, cache: Arc<RequestCache>) -> Self {
        Self { api, cache }
    }

    pub async fn stats(&self) -> Result<DashboardStats, ApiError> {
        let key = Resource::Dashboard.path("stats");
        let params = Params::new();
        self.cache
            .read_through(&key, TtlTier::Medium, || {
                self.api.get("/stats/dashboard", &params)
            })
            .await
    }
}
