//! Authenticated HTTP client for the inventory REST API
//!
//! Every request carries the stored bearer token when there is one. A 401 on a
//! request that carried a token means the token is no longer valid: the stored
//! credentials are cleared and the caller gets [`ApiError::SessionExpired`].

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ApiError;
use crate::cache::Params;
use crate::session::CredentialStore;

/// Default base URL for the API
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Client for the inventory API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Option<CredentialStore>,
}

impl ApiClient {
    /// Creates a new ApiClient for `base_url`
    ///
    /// Without a credential store, requests are sent unauthenticated.
    pub fn new(base_url: impl Into<String>, credentials: Option<CredentialStore>) -> Self {
        Self::with_client(Client::new(), base_url, credentials)
    }

    /// Creates a new ApiClient with a custom HTTP client
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        credentials: Option<CredentialStore>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// The base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The credential store backing this client, if any
    pub fn credentials(&self) -> Option<&CredentialStore> {
        self.credentials.as_ref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attaches the stored token, returning whether one was attached
    fn authorize(&self, request: RequestBuilder) -> (RequestBuilder, bool) {
        match self.credentials.as_ref().and_then(CredentialStore::token) {
            Some(token) => (request.bearer_auth(token), true),
            None => (request, false),
        }
    }

    /// Sends a GET request with the given query parameters
    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &Params) -> Result<T, ApiError> {
        debug!(path, "GET");
        let request = self.client.get(self.url(path)).query(&params.pairs());
        let (request, had_token) = self.authorize(request);
        self.send(request, had_token).await
    }

    /// Sends a POST request with a JSON body
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(path, "POST");
        let request = self.client.post(self.url(path)).json(body);
        let (request, had_token) = self.authorize(request);
        self.send(request, had_token).await
    }

    /// Sends an unauthenticated POST request with a form-urlencoded body
    pub async fn post_form<T, F>(&self, path: &str, form: &F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Serialize + ?Sized,
    {
        debug!(path, "POST (form)");
        let request = self.client.post(self.url(path)).form(form);
        self.send(request, false).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        had_token: bool,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let response = self.check_status(response, had_token).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn check_status(&self, response: Response, had_token: bool) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = error_detail(&text, status);

        if status == StatusCode::UNAUTHORIZED {
            if had_token {
                warn!("token invalid or expired, clearing stored credentials");
                if let Some(store) = &self.credentials {
                    if let Err(e) = store.clear() {
                        warn!(error = %e, "failed to clear stored credentials");
                    }
                }
                return Err(ApiError::SessionExpired);
            }
            return Err(ApiError::Unauthorized(detail));
        }

        Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        })
    }
}

/// Extracts a readable message from an error response body
///
/// Uses the backend's `detail` field when present (a string, or a list of
/// validation errors), otherwise the raw body, otherwise the status reason.
fn error_detail(body: &str, status: StatusCode) -> String {
    if let Ok(ErrorBody { detail }) = serde_json::from_str::<ErrorBody>(body) {
        return match detail {
            serde_json::Value::String(message) => message,
            other => other.to_string(),
        };
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        ok: bool,
    }

    fn logged_in_store() -> (CredentialStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CredentialStore::with_dir(temp_dir.path().to_path_buf());
        store.save_token("secret-token").expect("Write should succeed");
        (store, temp_dir)
    }

    #[test]
    fn test_error_detail_prefers_detail_string() {
        let detail = error_detail(r#"{"detail":"Concentrateur introuvable"}"#, StatusCode::NOT_FOUND);
        assert_eq!(detail, "Concentrateur introuvable");
    }

    #[test]
    fn test_error_detail_falls_back_to_body_then_reason() {
        assert_eq!(error_detail("boom", StatusCode::INTERNAL_SERVER_ERROR), "boom");
        assert_eq!(
            error_detail("", StatusCode::INTERNAL_SERVER_ERROR),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://example.test/api/v1/", None);
        assert_eq!(client.url("/bo/info"), "http://example.test/api/v1/bo/info");
        assert_eq!(client.url("postes/"), "http://example.test/api/v1/postes/");
    }

    #[tokio::test]
    async fn test_get_sends_bearer_token_and_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/bo/concentrateurs")
            .match_header("authorization", "Bearer secret-token")
            .match_query(Matcher::UrlEncoded("etat".into(), "pose".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let (store, _temp_dir) = logged_in_store();
        let client = ApiClient::new(server.url(), Some(store));
        let params = Params::new().with("etat", "pose");

        let pong: Pong = client.get("/bo/concentrateurs", &params).await.unwrap();

        assert_eq!(pong, Pong { ok: true });
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_with_token_clears_credentials() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/bo/info")
            .with_status(401)
            .with_body(r#"{"detail":"Could not validate credentials"}"#)
            .create_async()
            .await;

        let (store, _temp_dir) = logged_in_store();
        let client = ApiClient::new(server.url(), Some(store.clone()));

        let result: Result<Pong, _> = client.get("/bo/info", &Params::new()).await;

        assert!(matches!(result, Err(ApiError::SessionExpired)));
        assert!(store.token().is_none(), "stored token should be cleared");
    }

    #[tokio::test]
    async fn test_unauthorized_without_token_keeps_detail() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/login")
            .with_status(401)
            .with_body(r#"{"detail":"Incorrect email or password"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), None);
        let result: Result<Pong, _> = client
            .post_form("/auth/login", &[("username", "a"), ("password", "b")])
            .await;

        match result {
            Err(ApiError::Unauthorized(detail)) => {
                assert_eq!(detail, "Incorrect email or password")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_carries_backend_detail() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/bo/pose")
            .with_status(400)
            .with_body(r#"{"detail":"Concentrateur déjà posé"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url(), None);
        let result: Result<Pong, _> = client
            .post("/bo/pose", &serde_json::json!({"numero_serie": "X1"}))
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("Concentrateur déjà posé"));
    }
}
