//! HTTP client for the SafeTNet admin API.
//!
//! [`ApiClient`] owns the shared `reqwest::Client`, the configuration and the
//! credential store. Every resource type gets a [`ResourceClient`] with the
//! same list/get/create/update/delete contract.
//!
//! ```ignore
//! let api = ApiClient::new(ClientConfig::from_env(), CredentialStore::in_memory())?;
//! let alerts = api.alerts().list().await?;
//! ```

mod page;
mod resource;

pub use page::{parse_page, Page};
pub use resource::ResourceClient;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::auth::{self, AuthService, CredentialStore};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{
    Alert, DiscountEmail, Geofence, Incident, Notification, Officer, Organization, Promocode,
    Report, SubAdmin, UserDetail, UserRecord, UserReply, UserRole, ADMIN_ROLES,
};

/// How a resource reacts when the caller's role may not read it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Every non-success status is an error
    Strict,
    /// `list()` turns 403 and 500 into an empty collection
    Degraded,
}

/// A backend collection reachable under the admin prefix
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Path segment under the admin prefix, e.g. `alerts`
    const PATH: &'static str;
    /// Plural name used in empty states and logs
    const LABEL: &'static str;
    const ACCESS: AccessPolicy = AccessPolicy::Strict;
    /// Fields shown in text tables
    const COLUMNS: &'static [&'static str] = &["id"];
    /// Roles that may open the resource's views
    const ROLES: &'static [UserRole] = ADMIN_ROLES;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    store: CredentialStore,
}

impl ApiClient {
    pub fn new(config: ClientConfig, store: CredentialStore) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.api.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            config: Arc::new(config),
            store,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.clone())
    }

    pub fn resource<T: Resource>(&self) -> ResourceClient<T> {
        ResourceClient::new(self.clone())
    }

    pub fn users(&self) -> ResourceClient<UserRecord> {
        self.resource()
    }

    pub fn alerts(&self) -> ResourceClient<Alert> {
        self.resource()
    }

    pub fn geofences(&self) -> ResourceClient<Geofence> {
        self.resource()
    }

    pub fn incidents(&self) -> ResourceClient<Incident> {
        self.resource()
    }

    pub fn organizations(&self) -> ResourceClient<Organization> {
        self.resource()
    }

    pub fn notifications(&self) -> ResourceClient<Notification> {
        self.resource()
    }

    pub fn officers(&self) -> ResourceClient<Officer> {
        self.resource()
    }

    pub fn promocodes(&self) -> ResourceClient<Promocode> {
        self.resource()
    }

    pub fn reports(&self) -> ResourceClient<Report> {
        self.resource()
    }

    pub fn sub_admins(&self) -> ResourceClient<SubAdmin> {
        self.resource()
    }

    pub fn user_details(&self) -> ResourceClient<UserDetail> {
        self.resource()
    }

    pub fn user_replies(&self) -> ResourceClient<UserReply> {
        self.resource()
    }

    pub fn discount_emails(&self) -> ResourceClient<DiscountEmail> {
        self.resource()
    }

    /// `{base}{admin_prefix}/{path}/`
    pub(crate) fn admin_url(&self, path: &str) -> Result<Url, ClientError> {
        let api = &self.config.api;
        Ok(Url::parse(&format!("{}{}/{}/", api.base_url, api.admin_prefix, path))?)
    }

    /// `{base}{auth_prefix}/{endpoint}/`
    pub(crate) fn auth_url(&self, endpoint: &str) -> Result<Url, ClientError> {
        let api = &self.config.api;
        Ok(Url::parse(&format!("{}{}/{}/", api.base_url, api.auth_prefix, endpoint))?)
    }

    /// Start a request with JSON headers, plus the bearer token if `authenticated`
    pub(crate) fn request(
        &self,
        method: Method,
        url: Url,
        authenticated: bool,
    ) -> reqwest::RequestBuilder {
        let headers = if authenticated {
            auth::auth_headers(&self.store, None)
        } else {
            auth::json_headers()
        };
        debug!(%method, %url, authenticated, "request");
        self.http.request(method, url).headers(headers)
    }

    /// Decode a successful response body
    pub(crate) async fn decode<R: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<R, ClientError> {
        let text = resp.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ClientError::Decode(format!("response body: {}", e)))
    }
}
