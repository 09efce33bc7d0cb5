use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::CredentialStore;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::models::UserRecord;
use crate::session::LogoutNotifier;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "access_token")]
    access: String,
    #[serde(alias = "refresh_token")]
    refresh: String,
    user: UserRecord,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(alias = "access_token")]
    access: String,
    /// Present when the backend rotates refresh tokens
    #[serde(default, alias = "refresh_token")]
    refresh: Option<String>,
}

/// Login, token refresh, profile and logout calls against the auth endpoints
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn store(&self) -> &CredentialStore {
        self.api.store()
    }

    /// Authenticate and persist the tokens.
    ///
    /// `remember_me` selects the persistent backend; otherwise the session one.
    /// Credentials from any earlier login are cleared first so a stale
    /// persistent entry cannot shadow the new session.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<UserRecord, ClientError> {
        let url = self.api.auth_url("login")?;
        let resp = self
            .api
            .request(Method::POST, url, false)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "login rejected");
            return Err(ClientError::from_status(status.as_u16(), &body));
        }

        let login: LoginResponse = ApiClient::decode(resp).await?;

        self.store().clear();
        self.store().save(&login.access, &login.refresh, &login.user, remember_me);
        info!(username = %login.user.username, remember_me, "logged in");

        Ok(login.user)
    }

    /// Exchange the stored refresh token for a new access token
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let refresh_token = self
            .store()
            .refresh_token()
            .ok_or_else(|| ClientError::Unauthenticated("No refresh token stored".to_string()))?;

        let url = self.api.auth_url("refresh")?;
        let resp = self
            .api
            .request(Method::POST, url, false)
            .json(&json!({ "refresh": refresh_token }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status.as_u16(), &body));
        }

        let refreshed: RefreshResponse = ApiClient::decode(resp).await?;
        if let Some(kind) = self
            .store()
            .update_access_token(&refreshed.access, refreshed.refresh.as_deref())
        {
            info!(backend = kind.as_str(), "access token refreshed");
        }
        Ok(())
    }

    /// Fetch the signed-in user and refresh the cached copy
    pub async fn profile(&self) -> Result<UserRecord, ClientError> {
        let url = self.api.auth_url("profile")?;
        let resp = self.api.request(Method::GET, url, true).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status.as_u16(), &body));
        }

        let user: UserRecord = ApiClient::decode(resp).await?;
        self.store().update_user(&user);
        Ok(user)
    }
}

#[async_trait::async_trait]
impl LogoutNotifier for AuthService {
    async fn notify_logout(&self, refresh_token: Option<String>) -> Result<(), ClientError> {
        let url = self.api.auth_url("logout")?;
        let resp = self
            .api
            .request(Method::POST, url, true)
            .json(&json!({ "refresh": refresh_token }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status.as_u16(), &body));
        }
        Ok(())
    }
}
