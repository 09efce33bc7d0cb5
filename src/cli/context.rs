use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::auth::CredentialStore;
use crate::cli::utils::output_error;
use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::UserRole;
use crate::query::{NotificationCenter, NotificationLevel, Notifier};
use crate::session::{GuardDecision, RecordingNavigator, SessionContext};

/// An error the user has already been shown; the binary only sets the exit code
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Reported(pub String);

pub const LOGIN_HINT: &str = "Not logged in. Run `safetnet auth login <username>` first.";

/// Everything a command needs: the API client, the session and where
/// notifications go
pub struct CliContext {
    pub config: ClientConfig,
    pub api: ApiClient,
    pub session: SessionContext,
    pub navigator: Arc<RecordingNavigator>,
    pub notifications: Arc<NotificationCenter>,
    pub format: OutputFormat,
}

impl CliContext {
    pub fn new(format: OutputFormat) -> anyhow::Result<Self> {
        let config = ClientConfig::from_env();
        let store = CredentialStore::from_config(&config);
        Self::build(config, store, format)
    }

    pub fn build(
        config: ClientConfig,
        store: CredentialStore,
        format: OutputFormat,
    ) -> anyhow::Result<Self> {
        let api = ApiClient::new(config.clone(), store.clone())?;
        let navigator = Arc::new(RecordingNavigator::new());
        let session = SessionContext::new(store, &config.session, navigator.clone())
            .with_logout_notifier(Arc::new(api.auth()));

        Ok(Self {
            config,
            api,
            session,
            navigator,
            notifications: Arc::new(NotificationCenter::new()),
            format,
        })
    }

    /// Mount the session for `route` and check the caller holds one of
    /// `roles`. Fails with the login hint when the guard sends us to the
    /// login route.
    pub fn enter(&self, route: &str, roles: &[UserRole]) -> anyhow::Result<()> {
        let decision = match self.session.mount(route) {
            GuardDecision::Allow => self.session.require_role(roles),
            decision => decision,
        };

        match decision {
            GuardDecision::Redirect(to) if to == self.config.session.login_route => {
                debug!(route, "guard redirected to login");
                output_error(&self.format, LOGIN_HINT, Some("UNAUTHENTICATED"))?;
                Err(Reported(LOGIN_HINT.to_string()).into())
            }
            GuardDecision::Forbidden => {
                let text = forbidden_text(route, roles);
                output_error(&self.format, &text, Some("FORBIDDEN"))?;
                Err(Reported(text).into())
            }
            decision => {
                debug!(route, ?decision, "route entered");
                Ok(())
            }
        }
    }

    /// Queue the failure as an error notification and hand back an error for `?`
    pub fn fail(&self, error: ClientError) -> anyhow::Error {
        let text = error.notification_text();
        debug!("command failed: {}", error);
        self.notifications.notify(NotificationLevel::Error, &text);
        Reported(text).into()
    }

    /// Print and dismiss every pending notification
    pub fn flush_notifications(&self) -> anyhow::Result<()> {
        for notification in self.notifications.drain() {
            match notification.level {
                NotificationLevel::Error => output_error(&self.format, &notification.text, None)?,
                NotificationLevel::Info | NotificationLevel::Success => {
                    if let OutputFormat::Text = self.format {
                        eprintln!("{}", notification.text);
                    }
                }
            }
        }
        Ok(())
    }
}

fn forbidden_text(route: &str, roles: &[UserRole]) -> String {
    let names: Vec<&str> = roles.iter().map(UserRole::as_str).collect();
    format!("Access denied: {} requires {}", route, names.join(" or "))
}
