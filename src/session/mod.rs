//! Application-wide authentication state and the route guard.
//!
//! [`SessionContext`] is built once at the root and passed by reference. It is
//! the only writer of the in-memory [`Session`]; readers either snapshot it or
//! hold a `watch` receiver from [`SessionContext::subscribe`].

mod navigator;

pub use navigator::{Navigation, Navigator, RecordingNavigator};

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::auth::CredentialStore;
use crate::config::SessionConfig;
use crate::error::ClientError;
use crate::models::{UserRecord, UserRole};

/// In-memory view of who is signed in; derived from the credential store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<UserRecord>,
    pub is_authenticated: bool,
}

impl Session {
    pub fn authenticated(user: UserRecord) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn role(&self) -> Option<&UserRole> {
        self.user.as_ref().map(|u| &u.role)
    }

    pub fn has_role(&self, role: &UserRole) -> bool {
        self.is_authenticated && self.role() == Some(role)
    }

    /// True when signed in with one of `roles`
    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        self.is_authenticated && self.role().is_some_and(|r| roles.contains(r))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    /// Before the first mount
    Unknown,
    Checking,
    Authenticated,
    Unauthenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Stay on the requested route
    Allow,
    /// Session check has not completed yet
    Pending,
    /// Sent elsewhere; the navigator has already been told
    Redirect(String),
    /// Signed in, but the role may not open the view
    Forbidden,
}

/// Tells the backend a session ended
#[async_trait]
pub trait LogoutNotifier: Send + Sync {
    async fn notify_logout(&self, refresh_token: Option<String>) -> Result<(), ClientError>;
}

pub struct SessionContext {
    store: CredentialStore,
    routes: SessionConfig,
    navigator: Arc<dyn Navigator>,
    logout_notifier: Option<Arc<dyn LogoutNotifier>>,
    session: watch::Sender<Session>,
    phase: watch::Sender<GuardPhase>,
}

impl SessionContext {
    pub fn new(
        store: CredentialStore,
        routes: &SessionConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (session, _) = watch::channel(Session::anonymous());
        let (phase, _) = watch::channel(GuardPhase::Unknown);
        Self {
            store,
            routes: routes.clone(),
            navigator,
            logout_notifier: None,
            session,
            phase,
        }
    }

    pub fn with_logout_notifier(mut self, notifier: Arc<dyn LogoutNotifier>) -> Self {
        self.logout_notifier = Some(notifier);
        self
    }

    pub fn phase(&self) -> GuardPhase {
        *self.phase.borrow()
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    pub fn is_public(&self, route: &str) -> bool {
        let route = normalize_route(route);
        self.routes.public_routes.iter().any(|public| {
            let public = normalize_route(public);
            route == public || route.starts_with(&format!("{}/", public))
        })
    }

    /// First render: derive the session from stored credentials, then guard
    /// `current_route`. Later calls only re-run the guard.
    pub fn mount(&self, current_route: &str) -> GuardDecision {
        if self.phase() == GuardPhase::Unknown {
            self.phase.send_replace(GuardPhase::Checking);

            let user = self.store.user().filter(|_| self.store.access_token().is_some());
            match user {
                Some(user) => {
                    debug!(username = %user.username, "stored session found");
                    self.session.send_replace(Session::authenticated(user));
                    self.phase.send_replace(GuardPhase::Authenticated);
                }
                None => {
                    debug!("no stored session");
                    self.session.send_replace(Session::anonymous());
                    self.phase.send_replace(GuardPhase::Unauthenticated);
                }
            }
        }

        self.guard(current_route)
    }

    /// Decide whether `route` may be shown; redirects through the navigator
    pub fn guard(&self, route: &str) -> GuardDecision {
        match self.phase() {
            GuardPhase::Unknown | GuardPhase::Checking => GuardDecision::Pending,
            GuardPhase::Unauthenticated if !self.is_public(route) => {
                self.redirect(&self.routes.login_route)
            }
            GuardPhase::Authenticated if self.is_public(route) => {
                self.redirect(&self.routes.landing_route)
            }
            _ => GuardDecision::Allow,
        }
    }

    /// Role check for a view that only some roles may open. An empty `roles`
    /// admits anyone signed in.
    pub fn require_role(&self, roles: &[UserRole]) -> GuardDecision {
        match self.phase() {
            GuardPhase::Unknown | GuardPhase::Checking => GuardDecision::Pending,
            GuardPhase::Unauthenticated => self.redirect(&self.routes.login_route),
            GuardPhase::Authenticated => {
                let session = self.session.borrow();
                if roles.is_empty() || session.has_any_role(roles) {
                    GuardDecision::Allow
                } else {
                    debug!(role = ?session.role(), ?roles, "role may not open view");
                    GuardDecision::Forbidden
                }
            }
        }
    }

    fn redirect(&self, to: &str) -> GuardDecision {
        self.navigator.navigate(to, Navigation::Replace);
        GuardDecision::Redirect(to.to_string())
    }

    /// Record a successful login. The credential store has already been
    /// written by the auth service.
    pub fn login(&self, user: UserRecord) {
        info!(username = %user.username, "session started");
        self.session.send_replace(Session::authenticated(user));
        self.phase.send_replace(GuardPhase::Authenticated);
    }

    /// End the session locally no matter what the backend says, then reload
    /// onto the login route.
    pub async fn logout(&self) {
        self.session.send_replace(Session::anonymous());
        self.phase.send_replace(GuardPhase::Unauthenticated);

        if let Some(notifier) = &self.logout_notifier {
            if let Err(e) = notifier.notify_logout(self.store.refresh_token()).await {
                warn!("logout notification failed, continuing: {}", e);
            }
        }

        self.store.clear();
        info!("session ended");
        self.navigator.navigate(&self.routes.login_route, Navigation::Reload);
    }
}

fn normalize_route(route: &str) -> &str {
    let path = route.split(['?', '#']).next().unwrap_or(route);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}
