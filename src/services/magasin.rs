//! Warehouse (magasin) service

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError};
use crate::cache::{Action, Params, RequestCache, Resource, TtlTier};

/// Warehouse stock counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagasinStats {
    pub total: u32,
    pub en_livraison: u32,
    pub en_stock: u32,
    pub pose: u32,
    pub retour_constructeur: u32,
    pub hs: u32,
}

/// Value/label pair for a selectable option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// A concentrator to register from a received carton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrateurCreate {
    pub numero_serie: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modele: Option<String>,
    pub operateur: String,
    pub numero_carton: String,
}

/// A received carton and its content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reception {
    pub numero_carton: String,
    pub operateur: String,
    pub concentrateurs: Vec<ConcentrateurCreate>,
}

impl Reception {
    /// Builds a reception where every concentrator shares the carton's operator
    pub fn new(
        numero_carton: impl Into<String>,
        operateur: impl Into<String>,
        numeros_serie: &[String],
        modele: Option<&str>,
    ) -> Self {
        let numero_carton = numero_carton.into();
        let operateur = operateur.into();
        let concentrateurs = numeros_serie
            .iter()
            .map(|numero_serie| ConcentrateurCreate {
                numero_serie: numero_serie.clone(),
                modele: modele.map(str::to_string),
                operateur: operateur.clone(),
                numero_carton: numero_carton.clone(),
            })
            .collect();
        Self {
            numero_carton,
            operateur,
            concentrateurs,
        }
    }
}

/// Outcome of a carton reception
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceptionResult {
    /// Number of concentrators registered
    pub created: u32,
    pub carton: String,
    pub operateur: String,
    /// Per-concentrator rejections
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Client for the `/magasin` endpoints
#[derive(Clone)]
pub struct MagasinService {
    api: ApiClient,
    cache: Arc<RequestCache>,
}

impl MagasinService {
    pub fn new(api: ApiClient, cache: Arc<RequestCache>) -> Self {
        Self { api, cache }
    }

    /// Warehouse stock counters
    pub async fn stats(&self) -> Result<MagasinStats, ApiError> {
        let key = Resource::Magasin.path("stats");
        let params = Params::new();
        self.cache
            .read_through(&key, TtlTier::Medium, || {
                self.api.get("/magasin/stats", &params)
            })
            .await
    }

    /// Known concentrator operators
    pub async fn operateurs(&self) -> Result<Vec<SelectOption>, ApiError> {
        let key = Resource::Magasin.path("operateurs");
        let params = Params::new();
        self.cache
            .read_through(&key, TtlTier::Static, || {
                self.api.get("/magasin/operateurs", &params)
            })
            .await
    }

    /// Registers a received carton
    pub async fn reception(&self, reception: &Reception) -> Result<ReceptionResult, ApiError> {
        let result = self.api.post("/magasin/reception", reception).await?;
        self.cache.invalidate_for(Action::MagasinReception);
        Ok(result)
    }
}
