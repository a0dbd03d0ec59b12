// Incoming response interception, failure path: redirect on 401

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;

use super::Interceptor;
use crate::error::Result;
use crate::message::ApiResponse;
use crate::navigation::Navigator;
use crate::storage::Credentials;
use crate::transport::DefaultHeaders;

/// Logs every transport error and navigates to the login route on 401
///
/// The error is always re-raised unchanged after the side effect.
pub struct SessionExpiry {
    navigator: Arc<dyn Navigator>,
    login_route: String,
    /// Set when stored credentials should be dropped on 401
    clear: Option<Credentials>,
}

impl SessionExpiry {
    pub fn new(navigator: Arc<dyn Navigator>, login_route: impl Into<String>) -> Self {
        Self {
            navigator,
            login_route: login_route.into(),
            clear: None,
        }
    }

    /// Drop the stored credential pair and the default `Authorization`
    /// header before navigating
    pub fn clearing(mut self, credentials: Credentials) -> Self {
        self.clear = Some(credentials);
        self
    }

    fn clear_session(&self, defaults: &DefaultHeaders) {
        let Some(credentials) = &self.clear else {
            return;
        };
        defaults.remove(&AUTHORIZATION);
        if !credentials.is_available() {
            return;
        }
        match credentials.clear() {
            Ok(()) => tracing::info!("Cleared stored credentials after 401"),
            Err(e) => tracing::warn!(error = %e, "Failed to clear stored credentials"),
        }
    }
}

impl Interceptor for SessionExpiry {
    fn name(&self) -> &'static str {
        "session_expiry"
    }

    fn on_response(
        &self,
        response: Result<ApiResponse>,
        defaults: &DefaultHeaders,
    ) -> Result<ApiResponse> {
        let err = match response {
            Ok(resp) => return Ok(resp),
            Err(err) => err,
        };

        tracing::error!(status = ?err.status(), error = %err, "Request failed");

        if err.is_unauthorized() {
            tracing::warn!(route = %self.login_route, "Session expired or missing, redirecting to login");
            self.clear_session(defaults);
            self.navigator.navigate(&self.login_route);
        }

        Err(err)
    }
}
