//! Warehouse-to-base transfer service

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError};
use crate::cache::{generate_key, Action, Params, RequestCache, Resource, TtlTier};

/// A transfer order raised by a base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commande {
    pub id_commande: i64,
    pub bo_demandeur: String,
    pub quantite: u32,
    #[serde(default)]
    pub operateur_souhaite: Option<String>,
    #[serde(default)]
    pub demandeur_nom: Option<String>,
    #[serde(default)]
    pub demandeur_prenom: Option<String>,
    pub date_commande: String,
    /// en_attente, validee or livree
    pub statut_commande: String,
}

impl Commande {
    /// Only pending orders can be fulfilled
    pub fn is_pending(&self) -> bool {
        self.statut_commande == "en_attente"
    }
}

/// A sealed carton ready to ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartonDisponible {
    pub numero_carton: String,
    pub operateur: String,
    pub concentrateurs_disponibles: u32,
}

/// Outcome of fulfilling an order with a carton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    #[serde(default)]
    pub message: Option<String>,
    pub concentrateurs_transferes: u32,
    pub bo_destination: String,
    pub carton: String,
}

#[derive(Debug, Serialize)]
struct ValidationRequest<'a> {
    numero_carton: &'a str,
}

/// Client for the `/transferts` endpoints
#[derive(Clone)]
pub struct TransfertsService {
    api: ApiClient,
    cache: Arc<RequestCache>,
}

impl TransfertsService {
    pub fn new(api: ApiClient, cache: Arc<RequestCache>) -> Self {
        Self { api, cache }
    }

    /// Transfer orders, optionally filtered by status
    pub async fn commandes(&self, statut: Option<&str>) -> Result<Vec<Commande>, ApiError> {
        let params = Params::new().opt("statut", statut);
        let key = generate_key(&Resource::Transferts.path("commandes"), &params);
        self.cache
            .read_through(&key, TtlTier::Short, || {
                self.api.get("/transferts/commandes", &params)
            })
            .await
    }

    /// Cartons that can be shipped
    pub async fn cartons_disponibles(&self) -> Result<Vec<CartonDisponible>, ApiError> {
        let key = Resource::Transferts.path("cartons-disponibles");
        let params = Params::new();
        self.cache
            .read_through(&key, TtlTier::Short, || {
                self.api.get("/transferts/cartons-disponibles", &params)
            })
            .await
    }

    /// Fulfils order `id_commande` by shipping carton `numero_carton`
    pub async fn valider(
        &self,
        id_commande: i64,
        numero_carton: &str,
    ) -> Result<ValidationResult, ApiError> {
        let path = format!("/transferts/commandes/{}/valider", id_commande);
        let result = self
            .api
            .post(&path, &ValidationRequest { numero_carton })
            .await?;
        self.cache.invalidate_for(Action::TransfertValidation);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    const COMMANDES_BODY: &str = r#"[{
        "id_commande": 4,
        "bo_demandeur": "Nord",
        "quantite": 6,
        "date_commande": "2024-05-02T08:00:00",
        "statut_commande": "en_attente"
    }]"#;

    #[test]
    fn test_is_pending() {
        let mut commandes: Vec<Commande> = serde_json::from_str(COMMANDES_BODY).unwrap();
        assert!(commandes[0].is_pending());

        commandes[0].statut_commande = "livree".to_string();
        assert!(!commandes[0].is_pending());
    }

    #[tokio::test]
    async fn test_validation_drops_every_affected_family() {
        let mut server = Server::new_async().await;
        let commandes = server
            .mock("GET", "/transferts/commandes")
            .match_query(Matcher::UrlEncoded("statut".into(), "en_attente".into()))
            .with_status(200)
            .with_body(COMMANDES_BODY)
            .expect(2)
            .create_async()
            .await;
        let _mock = server
            .mock("POST", "/transferts/commandes/4/valider")
            .match_body(Matcher::Json(serde_json::json!({"numero_carton": "CT-9"})))
            .with_status(200)
            .with_body(r#"{"concentrateurs_transferes":6,"bo_destination":"Nord","carton":"CT-9"}"#)
            .create_async()
            .await;
        let cache = Arc::new(RequestCache::default());
        let service = TransfertsService::new(ApiClient::new(server.url(), None), cache.clone());
        cache.set("bo/stats/Nord", 1u32, Duration::from_secs(60));
        cache.set("magasin/stats", 1u32, Duration::from_secs(60));
        cache.set("postes/1", 1u32, Duration::from_secs(60));

        service.commandes(Some("en_attente")).await.unwrap();
        service.commandes(Some("en_attente")).await.unwrap();
        let result = service.valider(4, "CT-9").await.unwrap();
        service.commandes(Some("en_attente")).await.unwrap();

        assert_eq!(result.concentrateurs_transferes, 6);
        assert!(!cache.contains_key("bo/stats/Nord"));
        assert!(!cache.contains_key("magasin/stats"));
        assert!(cache.contains_key("postes/1"));
        commandes.assert_async().await;
    }
}
