// Navigation side effects
// Hard redirects triggered by the transport (e.g. to the login route)

use std::sync::Mutex;

/// Default login route
pub const LOGIN_ROUTE: &str = "/users/login";

/// Performs a full navigation to a route, discarding the current view
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Records every navigation
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All routes navigated to, oldest first
    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self) -> usize {
        self.routes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(route.to_string());
    }
}

/// Navigator for non-browser front ends
///
/// Logs the redirect and keeps the latest route so the caller can act on it
/// once the current operation has failed.
#[derive(Debug, Default)]
pub struct LogNavigator {
    pending: Mutex<Option<String>>,
}

impl LogNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending route, if a navigation happened since the last call
    pub fn take_pending(&self) -> Option<String> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        tracing::warn!(route = route, "Navigating away from current view");
        *self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(route.to_string());
    }
}
