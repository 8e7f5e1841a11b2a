//! Concentrator inventory service

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError};
use crate::cache::{generate_key, Params, RequestCache, Resource, TtlTier};

/// A concentrator as listed by the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concentrateur {
    pub numero_serie: String,
    #[serde(default)]
    pub modele: Option<String>,
    pub operateur: String,
    pub etat: String,
    /// Where it currently is: Magasin, Labo or a base name
    #[serde(default)]
    pub affectation: Option<String>,
    #[serde(default)]
    pub numero_carton: Option<String>,
    #[serde(default)]
    pub date_affectation: Option<String>,
    #[serde(default)]
    pub date_dernier_etat: Option<String>,
    #[serde(default)]
    pub commentaire: Option<String>,
}

/// One page of concentrators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrateurPage {
    pub data: Vec<Concentrateur>,
    pub total: u32,
}

/// An entry in a concentrator's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoriqueAction {
    pub type_action: String,
    pub date_action: String,
    #[serde(default)]
    pub ancien_etat: Option<String>,
    #[serde(default)]
    pub nouvel_etat: Option<String>,
    #[serde(default)]
    pub ancienne_affectation: Option<String>,
    #[serde(default)]
    pub nouvelle_affectation: Option<String>,
    #[serde(default)]
    pub commentaire: Option<String>,
}

/// A concentrator with its full history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrateurDetail {
    #[serde(flatten)]
    pub concentrateur: Concentrateur,
    #[serde(default)]
    pub historique: Vec<HistoriqueAction>,
}

/// Result of looking up a scanned serial number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub exists: bool,
    #[serde(default)]
    pub concentrateur: Option<Concentrateur>,
}

/// Filters for [`ConcentrateursService::list`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConcentrateurFilter {
    pub affectation: Option<String>,
    pub search: Option<String>,
    pub operateur: Option<String>,
    pub etat: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl ConcentrateurFilter {
    fn to_params(&self) -> Params {
        Params::new()
            .opt("affectation", self.affectation.as_deref())
            .opt("search", self.search.as_deref())
            .opt("operateur", self.operateur.as_deref())
            .opt("etat", self.etat.as_deref())
            .opt("skip", self.skip)
            .opt("limit", self.limit)
    }
}

/// Client for the `/concentrateurs` endpoints
#[derive(Clone)]
pub struct ConcentrateursService {
    api: ApiClient,
    cache: Arc<RequestCache>,
}

impl ConcentrateursService {
    pub fn new(api: ApiClient, cache: Arc<RequestCache>) -> Self {
        Self { api, cache }
    }

    /// Lists concentrators matching `filter`
    pub async fn list(&self, filter: &ConcentrateurFilter) -> Result<ConcentrateurPage, ApiError> {
        let params = filter.to_params();
        let key = generate_key(&Resource::Concentrateurs.path("list"), &params);
        self.cache
            .read_through(&key, TtlTier::Medium, || {
                self.api.get("/concentrateurs/", &params)
            })
            .await
    }

    /// Fetches one concentrator with its history
    pub async fn get(&self, numero_serie: &str) -> Result<ConcentrateurDetail, ApiError> {
        let key = Resource::Concentrateurs.path(&format!("detail/{}", numero_serie));
        let path = format!("/concentrateurs/{}", urlencoding::encode(numero_serie));
        let params = Params::new();
        self.cache
            .read_through(&key, TtlTier::Medium, || self.api.get(&path, &params))
            .await
    }

    /// Checks whether a scanned serial number is known
    ///
    /// Never cached: a scan must always reflect the current inventory.
    pub async fn verify(&self, numero_serie: &str) -> Result<Verification, ApiError> {
        let path = format!("/concentrateurs/{}/verify", urlencoding::encode(numero_serie));
        self.api.get(&path, &Params::new()).await
    }
}
