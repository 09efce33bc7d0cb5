use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Scheme + host (+ port) of the backend, no trailing slash
    pub base_url: String,
    /// Path under which admin resources live, e.g. `/api/auth/admin`
    pub admin_prefix: String,
    /// Path under which login/refresh/logout/profile live
    pub auth_prefix: String,
    /// None means requests may hang indefinitely
    pub request_timeout_secs: Option<u64>,
    /// Upper bound on pages followed by a single `list()`
    pub max_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub login_route: String,
    pub landing_route: String,
    pub public_routes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the persistent ("remember me") credential file
    pub config_dir: Option<PathBuf>,
    /// Directory for the session-scoped credential file
    pub session_dir: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("SAFETNET_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Development defaults pointed at an arbitrary backend; used by tests
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.api.base_url = base_url.into().trim_end_matches('/').to_string();
        config
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("SAFETNET_API_URL") {
            self.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("SAFETNET_ADMIN_PREFIX") {
            self.api.admin_prefix = normalize_prefix(&v);
        }
        if let Ok(v) = env::var("SAFETNET_AUTH_PREFIX") {
            self.api.auth_prefix = normalize_prefix(&v);
        }
        if let Ok(v) = env::var("SAFETNET_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().ok().filter(|secs| *secs > 0);
        }
        if let Ok(v) = env::var("SAFETNET_MAX_PAGES") {
            self.api.max_pages = v.parse().unwrap_or(self.api.max_pages);
        }

        if let Ok(v) = env::var("SAFETNET_LANDING_ROUTE") {
            self.session.landing_route = v;
        }
        if let Ok(v) = env::var("SAFETNET_PUBLIC_ROUTES") {
            self.session.public_routes = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(v) = env::var("SAFETNET_CONFIG_DIR") {
            self.storage.config_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("SAFETNET_SESSION_DIR") {
            self.storage.session_dir = Some(PathBuf::from(v));
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                admin_prefix: "/api/auth/admin".to_string(),
                auth_prefix: "/api/auth".to_string(),
                request_timeout_secs: None,
                max_pages: 1000,
            },
            session: SessionConfig::default(),
            storage: StorageConfig {
                config_dir: None,
                session_dir: None,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.api.base_url = "https://staging-api.safetnet.example".to_string();
        config.api.max_pages = 500;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.api.base_url = "https://api.safetnet.example".to_string();
        config.api.max_pages = 200;
        config
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            login_route: "/login".to_string(),
            landing_route: "/dashboard".to_string(),
            public_routes: vec![
                "/login".to_string(),
                "/register".to_string(),
                "/forgot-password".to_string(),
                "/reset-password".to_string(),
            ],
        }
    }
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

pub fn config() -> &'static ClientConfig {
    &CONFIG
}
