//! Session module for the logged-in user
//!
//! Holds the user profile returned by the backend and the store that persists
//! it, together with the bearer token, across invocations.

mod store;

pub use store::{CredentialStore, StoredSession};

use serde::{Deserialize, Serialize};

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    #[serde(alias = "id_utilisateur")]
    pub id: i64,
    /// Login email
    pub email: String,
    /// Family name
    #[serde(default)]
    pub nom: Option<String>,
    /// Given name
    #[serde(default)]
    pub prenom: Option<String>,
    /// Role (magasin, bo, labo, admin)
    pub role: String,
    /// Field base the user belongs to, for BO users
    #[serde(default)]
    pub bo_affectee: Option<String>,
}
