//! Field-base (BO) service
//!
//! Reads go through the request cache; movements (pose, dépose, réception) and
//! transfer requests invalidate the families listed in the action table.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ActionResult;
use crate::api::{ApiClient, ApiError};
use crate::cache::{generate_key, Action, Params, RequestCache, Resource, TtlTier};

/// Profile and counters for the current user's base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoInfo {
    pub nom_bo: String,
    pub utilisateur: String,
    pub role: String,
    pub stats: BoInfoStats,
}

/// Counters embedded in [`BoInfo`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoInfoStats {
    pub total: u32,
    pub en_stock: u32,
    pub poses: u32,
    pub a_tester: u32,
    pub demandes_en_cours: u32,
}

/// Stock counters for one base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoStats {
    pub bo_name: String,
    pub total: u32,
    pub en_stock: u32,
    pub poses: u32,
    pub a_tester: u32,
    pub en_livraison: u32,
}

/// Transfer request sent by a base to the warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandeTransfert {
    pub id_commande: i64,
    pub quantite: u32,
    pub operateur_souhaite: Option<String>,
    pub date_commande: String,
    pub statut: String,
    pub date_validation: Option<String>,
    pub date_livraison: Option<String>,
}

/// Concentrator assigned to a base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrateurBo {
    pub numero_serie: String,
    pub modele: Option<String>,
    pub operateur: String,
    pub etat: String,
    pub date_affectation: Option<String>,
    pub date_pose: Option<String>,
    pub date_dernier_etat: Option<String>,
}

/// Optional details attached to a pose or dépose
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MovementDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentaire: Option<String>,
    /// Photo as a data URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Serialize)]
struct MovementRequest<'a> {
    numero_serie: &'a str,
    #[serde(flatten)]
    details: &'a MovementDetails,
}

#[derive(Debug, Serialize)]
struct DemandeRequest<'a> {
    quantite: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    operateur_souhaite: Option<&'a str>,
}

/// Client for the `/bo` endpoints
#[derive(Clone)]
pub struct BoService {
    api: ApiClient,
    cache: Arc<RequestCache>,
}

impl BoService {
    pub fn new(api: ApiClient, cache: Arc<RequestCache>) -> Self {
        Self { api, cache }
    }

    /// Names of all bases
    pub async fn liste(&self) -> Result<Vec<String>, ApiError> {
        let key = Resource::Bo.path("liste");
        let params = Params::new();
        self.cache
            .read_through(&key, TtlTier::Static, || self.api.get("/bo/liste", &params))
            .await
    }

    /// Stock counters for one base
    pub async fn stats(&self, bo_name: &str) -> Result<BoStats, ApiError> {
        let key = Resource::Bo.path(&format!("stats/{}", bo_name));
        let path = format!("/bo/stats/{}", urlencoding::encode(bo_name));
        let params = Params::new();
        self.cache
            .read_through(&key, TtlTier::Medium, || self.api.get(&path, &params))
            .await
    }

    /// Profile and counters for the current user's base
    pub async fn info(&self) -> Result<BoInfo, ApiError> {
        let key = Resource::Bo.path("info");
        let params = Params::new();
        self.cache
            .read_through(&key, TtlTier::Medium, || self.api.get("/bo/info", &params))
            .await
    }

    /// Transfer requests of the current base
    pub async fn demandes(&self) -> Result<Vec<DemandeTransfert>, ApiError> {
        let key = Resource::Bo.path("demandes");
        let params = Params::new();
        self.cache
            .read_through(&key, TtlTier::Short, || self.api.get("/bo/demandes", &params))
            .await
    }

    /// Concentrators of the current base, optionally filtered by state
    pub async fn concentrateurs(&self, etat: Option<&str>) -> Result<Vec<ConcentrateurBo>, ApiError> {
        let params = Params::new().opt("etat", etat);
        let key = generate_key(&Resource::Bo.path("concentrateurs"), &params);
        self.cache
            .read_through(&key, TtlTier::Medium, || {
                self.api.get("/bo/concentrateurs", &params)
            })
            .await
    }

    /// Records that a concentrator was installed on site
    pub async fn pose(
        &self,
        numero_serie: &str,
        details: &MovementDetails,
    ) -> Result<ActionResult, ApiError> {
        self.movement("/bo/pose", Action::BoPose, numero_serie, details)
            .await
    }

    /// Records that a concentrator was removed from site
    pub async fn depose(
        &self,
        numero_serie: &str,
        details: &MovementDetails,
    ) -> Result<ActionResult, ApiError> {
        self.movement("/bo/depose", Action::BoDepose, numero_serie, details)
            .await
    }

    /// Records that a delivered concentrator arrived at the base
    pub async fn reception(&self, numero_serie: &str) -> Result<ActionResult, ApiError> {
        self.movement(
            "/bo/reception",
            Action::BoReception,
            numero_serie,
            &MovementDetails::default(),
        )
        .await
    }

    /// Asks the warehouse for `quantite` concentrators
    pub async fn creer_demande(
        &self,
        quantite: u32,
        operateur_souhaite: Option<&str>,
    ) -> Result<serde_json::Value, ApiError> {
        let body = DemandeRequest {
            quantite,
            operateur_souhaite,
        };
        let result = self.api.post("/bo/demande-transfert", &body).await?;
        self.cache.invalidate_for(Action::BoCreerDemande);
        Ok(result)
    }

    async fn movement(
        &self,
        path: &str,
        action: Action,
        numero_serie: &str,
        details: &MovementDetails,
    ) -> Result<ActionResult, ApiError> {
        let body = MovementRequest {
            numero_serie,
            details,
        };
        let result = self.api.post(path, &body).await?;
        self.cache.invalidate_for(action);
        Ok(result)
    }
}
