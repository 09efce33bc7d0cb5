//! Per-view data lifecycle: `Idle -> Loading -> Success | Error`.
//!
//! A [`DataQuery`] owns one fetch function. Each trigger (mount, refresh,
//! filter change) runs it again under a new generation number; only the
//! result of the newest generation is applied, so a slow early response can
//! never overwrite a later one. Results arriving after [`DataQuery::unmount`]
//! are dropped.

mod notify;

pub use notify::{Notification, NotificationCenter, NotificationLevel, Notifier};

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    pub phase: Phase,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            data: None,
            error: None,
        }
    }
}

/// What a view should draw for its current state
#[derive(Debug, Clone, PartialEq)]
pub enum ViewRender<T> {
    /// Placeholder while nothing has arrived yet
    Skeleton,
    /// Fetch succeeded with nothing in it
    Empty,
    Error(String),
    Content(T),
}

/// Lets the lifecycle tell an empty result from content
pub trait ViewData {
    fn is_empty_view(&self) -> bool;
}

impl<T> ViewData for Vec<T> {
    fn is_empty_view(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> ViewData for BTreeMap<K, V> {
    fn is_empty_view(&self) -> bool {
        self.is_empty()
    }
}

impl ViewData for serde_json::Value {
    fn is_empty_view(&self) -> bool {
        match self {
            serde_json::Value::Null => true,
            serde_json::Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// Result of one trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer trigger was issued while this one was in flight
    Stale,
    /// The view was not mounted when the trigger fired or resolved
    Unmounted,
}

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ClientError>> + Send + Sync>;

struct Inner<T> {
    state: ViewState<T>,
    generation: u64,
    mounted: bool,
}

pub struct DataQuery<T> {
    inner: Arc<Mutex<Inner<T>>>,
    fetcher: Fetcher<T>,
    notifier: Arc<dyn Notifier>,
}

impl<T> Clone for DataQuery<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            fetcher: self.fetcher.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<T: Send + 'static> DataQuery<T> {
    pub fn new<F, Fut>(fetch: F, notifier: Arc<dyn Notifier>) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: ViewState::default(),
                generation: 0,
                mounted: false,
            })),
            fetcher: Arc::new(move || fetch().boxed()),
            notifier,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the view live and issue its first fetch
    pub async fn mount(&self) -> FetchOutcome {
        self.lock().mounted = true;
        self.refetch().await
    }

    /// Drop whatever is still in flight; the state is frozen from here on
    pub fn unmount(&self) {
        self.lock().mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.lock().mounted
    }

    /// Issue another fetch. Triggers are neither coalesced nor cancelled; the
    /// newest one wins.
    pub async fn refetch(&self) -> FetchOutcome {
        let generation = {
            let mut inner = self.lock();
            if !inner.mounted {
                return FetchOutcome::Unmounted;
            }
            inner.generation += 1;
            inner.state.phase = Phase::Loading;
            inner.generation
        };

        let result = (self.fetcher)().await;

        let failure = {
            let mut inner = self.lock();
            if !inner.mounted {
                debug!(generation, "response arrived after unmount, dropped");
                return FetchOutcome::Unmounted;
            }
            if inner.generation != generation {
                debug!(generation, latest = inner.generation, "stale response dropped");
                return FetchOutcome::Stale;
            }

            match result {
                Ok(data) => {
                    inner.state = ViewState {
                        phase: Phase::Success,
                        data: Some(data),
                        error: None,
                    };
                    None
                }
                Err(e) => {
                    let text = e.notification_text();
                    debug!(generation, "fetch failed: {}", e);
                    inner.state = ViewState {
                        phase: Phase::Error,
                        data: None,
                        error: Some(text.clone()),
                    };
                    Some(text)
                }
            }
        };

        if let Some(text) = failure {
            self.notifier.notify(NotificationLevel::Error, &text);
        }
        FetchOutcome::Applied
    }

    pub fn phase(&self) -> Phase {
        self.lock().state.phase
    }

    pub fn error(&self) -> Option<String> {
        self.lock().state.error.clone()
    }
}

impl<T: Clone + Send + 'static> DataQuery<T> {
    pub fn state(&self) -> ViewState<T> {
        self.lock().state.clone()
    }

    pub fn data(&self) -> Option<T> {
        self.lock().state.data.clone()
    }
}

impl<T: ViewData + Clone + Send + 'static> DataQuery<T> {
    pub fn view(&self) -> ViewRender<T> {
        let inner = self.lock();
        match inner.state.phase {
            Phase::Idle | Phase::Loading => ViewRender::Skeleton,
            Phase::Error => ViewRender::Error(inner.state.error.clone().unwrap_or_default()),
            Phase::Success => match &inner.state.data {
                Some(data) if !data.is_empty_view() => ViewRender::Content(data.clone()),
                _ => ViewRender::Empty,
            },
        }
    }
}
