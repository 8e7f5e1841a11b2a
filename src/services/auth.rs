//! Login, logout and current-user lookup

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::cache::{Action, Params, RequestCache};
use crate::session::User;

/// Response of the login endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

/// Client for the `/auth` endpoints
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    cache: Arc<RequestCache>,
}

impl AuthService {
    pub fn new(api: ApiClient, cache: Arc<RequestCache>) -> Self {
        Self { api, cache }
    }

    /// Logs in and stores the token and user profile
    ///
    /// The backend expects an OAuth2 password form, so the email is sent as
    /// `username`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let form = [("username", email), ("password", password)];
        let response: LoginResponse = self.api.post_form("/auth/login", &form).await?;

        if let Some(store) = self.api.credentials() {
            store.save_token(&response.access_token)?;
            store.save_user(&response.user)?;
        }
        info!(email, "logged in");
        Ok(response)
    }

    /// Forgets the stored session and every cached response
    ///
    /// The cache is cleared even when deleting the stored session fails.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.cache.invalidate_for(Action::Logout);
        if let Some(store) = self.api.credentials() {
            store.clear()?;
        }
        Ok(())
    }

    /// Fetches the current user and refreshes the stored profile
    pub async fn me(&self) -> Result<User, ApiError> {
        let user: User = self.api.get("/auth/me", &Params::new()).await?;
        if let Some(store) = self.api.credentials() {
            store.save_user(&user)?;
        }
        Ok(user)
    }

    /// Returns true if a token is stored
    pub fn is_authenticated(&self) -> bool {
        self.stored_token().is_some()
    }

    /// The stored bearer token
    pub fn stored_token(&self) -> Option<String> {
        self.api.credentials()?.token()
    }

    /// The stored user profile
    pub fn stored_user(&self) -> Option<User> {
        self.api.credentials()?.user()
    }
}
