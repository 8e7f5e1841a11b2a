//! Lab test service

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, ApiError};
use crate::cache::{Action, RequestCache};

/// Verdict of a lab diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestResultat {
    /// Repairable, sent back to the warehouse
    Reparable,
    /// Out of service, scrapped
    Hs,
}

impl TestResultat {
    pub fn as_str(self) -> &'static str {
        match self {
            TestResultat::Reparable => "reparable",
            TestResultat::Hs => "hs",
        }
    }
}

impl fmt::Display for TestResultat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestResultat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reparable" | "réparable" => Ok(TestResultat::Reparable),
            "hs" => Ok(TestResultat::Hs),
            other => Err(format!(
                "unknown test result '{}'. Valid results: reparable, hs",
                other
            )),
        }
    }
}

#[derive(Debug, Serialize)]
struct TestRequest<'a> {
    numero_serie: &'a str,
    resultat: TestResultat,
    #[serde(skip_serializing_if = "Option::is_none")]
    commentaire: Option<&'a str>,
}

/// Client for the `/labo` endpoints
#[derive(Clone)]
pub struct LaboService {
    api: ApiClient,
    cache: Arc<RequestCache>,
}

impl LaboService {
    pub fn new(api: ApiClient, cache: Arc<RequestCache>) -> Self {
        Self { api, cache }
    }

    /// Records the result of a diagnostic
    pub async fn test(
        &self,
        numero_serie: &str,
        resultat: TestResultat,
        commentaire: Option<&str>,
    ) -> Result<serde_json::Value, ApiError> {
        let body = TestRequest {
            numero_serie,
            resultat,
            commentaire: commentaire.map(str::trim).filter(|c| !c.is_empty()),
        };
        let result = self.api.post("/labo/test", &body).await?;
        self.cache.invalidate_for(Action::LaboTest);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_resultat_parsing() {
        assert_eq!(
            "reparable".parse::<TestResultat>().unwrap(),
            TestResultat::Reparable
        );
        assert_eq!(
            "Réparable".parse::<TestResultat>().unwrap(),
            TestResultat::Reparable
        );
        assert_eq!("HS".parse::<TestResultat>().unwrap(), TestResultat::Hs);
        assert!("ok".parse::<TestResultat>().is_err());
        assert!("retour_constructeur".parse::<TestResultat>().is_err());
    }

    #[test]
    fn test_resultat_serializes_as_backend_values() {
        assert_eq!(
            serde_json::to_string(&TestResultat::Reparable).unwrap(),
            "\"reparable\""
        );
        assert_eq!(serde_json::to_string(&TestResultat::Hs).unwrap(), "\"hs\"");
    }

    #[tokio::test]
    async fn test_blank_comment_is_not_sent() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/labo/test")
            .match_body(Matcher::Json(serde_json::json!({
                "numero_serie": "C-001",
                "resultat": "hs"
            })))
            .with_status(200)
            .with_body(r#"{"message":"ok"}"#)
            .create_async()
            .await;
        let cache = Arc::new(RequestCache::default());
        cache.set("concentrateurs/list", 1u32, std::time::Duration::from_secs(60));
        let service = LaboService::new(ApiClient::new(server.url(), None), cache.clone());

        service.test("C-001", TestResultat::Hs, Some("   ")).await.unwrap();

        assert!(cache.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_reparable_refreshes_warehouse_stats() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/labo/test")
            .match_body(Matcher::Json(serde_json::json!({
                "numero_serie": "C-002",
                "resultat": "reparable",
                "commentaire": "alimentation remplacée"
            })))
            .with_status(200)
            .with_body(r#"{"message":"Concentrateur renvoyé au Magasin"}"#)
            .create_async()
            .await;
        let cache = Arc::new(RequestCache::default());
        let ttl = std::time::Duration::from_secs(60);
        cache.set("magasin/stats", 1u32, ttl);
        cache.set("transferts/cartons-disponibles", 2u32, ttl);
        let service = LaboService::new(ApiClient::new(server.url(), None), cache.clone());

        service
            .test("C-002", TestResultat::Reparable, Some(" alimentation remplacée "))
            .await
            .unwrap();

        assert!(!cache.contains_key("magasin/stats"));
        assert!(cache.contains_key("transferts/cartons-disponibles"));
        mock.assert_async().await;
    }
}
