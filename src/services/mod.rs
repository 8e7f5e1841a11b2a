//! Domain services over the inventory API
//!
//! Each service wraps one family of REST endpoints. Reads go through the shared
//! [`RequestCache`](crate::cache::RequestCache) with the TTL tier of the
//! endpoint; writes invalidate the families registered for their
//! [`Action`](crate::cache::Action) once the backend has accepted them.

pub mod actions;
pub mod auth;
pub mod bo;
pub mod concentrateurs;
pub mod dashboard;
pub mod labo;
pub mod magasin;
pub mod postes;
pub mod transferts;

pub use actions::ActionsService;
pub use auth::AuthService;
pub use bo::BoService;
pub use concentrateurs::ConcentrateursService;
pub use dashboard::DashboardService;
pub use labo::LaboService;
pub use magasin::MagasinService;
pub use postes::PostesService;
pub use transferts::TransfertsService;

use serde::{Deserialize, Serialize};

/// State change reported by a movement endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub message: String,
    pub numero_serie: String,
    pub ancien_etat: String,
    pub nouvel_etat: String,
    #[serde(default)]
    pub date_pose: Option<String>,
    #[serde(default)]
    pub ancienne_affectation: Option<String>,
    #[serde(default)]
    pub nouvelle_affectation: Option<String>,
}
