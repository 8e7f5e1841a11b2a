//! History of the movements recorded by the logged-in user

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError};
use crate::cache::{generate_key, Params, RequestCache, Resource, TtlTier};

/// Concentrator summary embedded in an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConcentrateur {
    pub numero_serie: String,
    #[serde(default)]
    pub modele: Option<String>,
}

/// One recorded movement (reception, pose, depose, test_labo, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub id_action: i64,
    pub type_action: String,
    pub date_action: String,
    #[serde(default)]
    pub concentrateur_id: Option<String>,
    #[serde(default)]
    pub concentrateur: Option<ActionConcentrateur>,
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

impl ActionEntry {
    /// Serial number of the concentrator, from the embedded summary or the raw id
    pub fn numero_serie(&self) -> Option<&str> {
        self.concentrateur
            .as_ref()
            .map(|c| c.numero_serie.as_str())
            .or(self.concentrateur_id.as_deref())
    }

    /// Case-insensitive match on the action type, serial number or comment
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        let contains = |field: Option<&str>| {
            field.is_some_and(|value| value.to_lowercase().contains(&needle))
        };

        contains(Some(self.type_action.as_str()))
            || contains(self.concentrateur_id.as_deref())
            || contains(self.concentrateur.as_ref().map(|c| c.numero_serie.as_str()))
            || contains(self.commentaire.as_deref())
    }
}

/// One page of the action history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPage {
    pub data: Vec<ActionEntry>,
    #[serde(default)]
    pub total: u32,
}

impl ActionPage {
    /// Keeps only the actions matching `search`
    pub fn filter(mut self, search: &str) -> Self {
        self.data.retain(|action| action.matches(search));
        self
    }
}

/// Client for the `/actions` endpoints
#[derive(Clone)]
pub struct ActionsService {
    api: ApiClient,
    cache: Arc<RequestCache>,
}

impl ActionsService {
    pub fn new(api: ApiClient, cache: Arc<RequestCache>) -> Self {
        Self { api, cache }
    }

    /// Actions recorded by the current user, most recent first
    ///
    /// `page` starts at 1.
    pub async fn mine(&self, page: u32, page_size: u32) -> Result<ActionPage, ApiError> {
        let params = Params::new()
            .with("page", page)
            .with("page_size", page_size);
        let key = generate_key(&Resource::Actions.path("me"), &params);
        self.cache
            .read_through(&key, TtlTier::Short, || self.api.get("/actions/me", &params))
            .await
    }
}
