use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Client-side route change, in-memory state survives
    Replace,
    /// Full reload, in-memory state of every view is discarded
    Reload,
}

/// Performs the redirects the session guard decides on
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str, mode: Navigation);
}

/// Keeps every navigation it is asked to perform
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<(String, Navigation)>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<(String, Navigation)> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<(String, Navigation)> {
        self.history.lock().ok().and_then(|h| h.last().cloned())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str, mode: Navigation) {
        tracing::debug!(route, ?mode, "navigate");
        if let Ok(mut history) = self.history.lock() {
            history.push((route.to_string(), mode));
        }
    }
}
