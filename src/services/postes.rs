//! Electrical substation (poste) service
//!
//! Postes feed the map view and are always read fresh from the backend.

use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError};
use crate::cache::Params;

/// A substation with its concentrator counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteElectrique {
    pub id_poste: i64,
    pub code_poste: String,
    #[serde(default)]
    pub nom_poste: Option<String>,
    #[serde(default)]
    pub localisation: Option<String>,
    #[serde(default)]
    pub bo_affectee: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub nb_concentrateurs: u32,
    #[serde(default)]
    pub nb_concentrateurs_pose: u32,
    #[serde(default)]
    pub nb_concentrateurs_a_tester: u32,
}

impl PosteElectrique {
    /// Coordinates as `(latitude, longitude)` when both are known
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Short reference to a substation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteRef {
    pub id_poste: i64,
    pub code_poste: String,
    #[serde(default)]
    pub nom_poste: Option<String>,
}

/// Concentrator installed at a substation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteConcentrateur {
    pub numero_serie: String,
    #[serde(default)]
    pub modele: Option<String>,
    pub operateur: String,
    pub etat: String,
    #[serde(default)]
    pub date_pose: Option<String>,
}

/// Concentrators installed at one substation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteConcentrateurs {
    pub poste: PosteRef,
    pub concentrateurs: Vec<PosteConcentrateur>,
}

/// Filters for [`PostesService::list`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PosteFilter {
    pub bo_affectee: Option<String>,
    /// Only postes that can be placed on a map
    pub with_coords_only: bool,
}

/// Client for the `/postes` endpoints
#[derive(Debug, Clone)]
pub struct PostesService {
    api: ApiClient,
}

impl PostesService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Lists substations
    pub async fn list(&self, filter: &PosteFilter) -> Result<Vec<PosteElectrique>, ApiError> {
        let params = Params::new()
            .opt("bo_affectee", filter.bo_affectee.as_deref())
            .opt("with_coords_only", filter.with_coords_only.then_some(true));
        self.api.get("/postes/", &params).await
    }

    /// Fetches one substation
    pub async fn get(&self, id_poste: i64) -> Result<PosteElectrique, ApiError> {
        self.api
            .get(&format!("/postes/{}", id_poste), &Params::new())
            .await
    }

    /// Lists the concentrators installed at a substation
    pub async fn concentrateurs(&self, id_poste: i64) -> Result<PosteConcentrateurs, ApiError> {
        self.api
            .get(&format!("/postes/{}/concentrateurs", id_poste), &Params::new())
            .await
    }
}
