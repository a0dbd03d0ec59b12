// Interceptor module
// Ordered request/response hooks layered on the transport

mod bearer;
mod expiry;
mod rotation;

pub use bearer::BearerAuth;
pub use expiry::SessionExpiry;
pub use rotation::{TokenRotation, ACCESS_TOKEN_HEADER, REFRESH_TOKEN_HEADER};

use std::sync::Arc;

use crate::error::Result;
use crate::message::{ApiRequest, ApiResponse};
use crate::navigation::{Navigator, LOGIN_ROUTE};
use crate::storage::{CredentialStorage, Credentials};
use crate::transport::DefaultHeaders;

/// A hook pair over the transport's request/response flow
///
/// Each hook receives the outcome produced by the previous interceptor and
/// returns the outcome handed to the next one. Both default to passing the
/// outcome through untouched.
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    /// `{request | error} -> {request | error}`, before dispatch
    fn on_request(
        &self,
        request: Result<ApiRequest>,
        _defaults: &DefaultHeaders,
    ) -> Result<ApiRequest> {
        request
    }

    /// `{response | error} -> {response | error}`, before the caller sees it
    fn on_response(
        &self,
        response: Result<ApiResponse>,
        _defaults: &DefaultHeaders,
    ) -> Result<ApiResponse> {
        response
    }
}

/// The standard authentication interceptors sharing one storage and navigator
pub struct AuthInterceptors {
    credentials: Credentials,
    navigator: Arc<dyn Navigator>,
    login_route: String,
    clear_on_unauthorized: bool,
}

impl AuthInterceptors {
    pub fn new(storage: Arc<dyn CredentialStorage>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            credentials: Credentials::new(storage),
            navigator,
            login_route: LOGIN_ROUTE.to_string(),
            clear_on_unauthorized: false,
        }
    }

    /// Route navigated to on 401 (default `/users/login`)
    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// Also drop the stored credentials on 401. Off by default: the stale
    /// token stays in storage until the next login overwrites it.
    pub fn clear_on_unauthorized(mut self, enabled: bool) -> Self {
        self.clear_on_unauthorized = enabled;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Bearer, rotation and session-expiry hooks, in that order
    pub fn into_interceptors(self) -> Vec<Arc<dyn Interceptor>> {
        let mut expiry = SessionExpiry::new(self.navigator, self.login_route);
        if self.clear_on_unauthorized {
            expiry = expiry.clearing(self.credentials.clone());
        }

        vec![
            Arc::new(BearerAuth::new(self.credentials.clone())),
            Arc::new(TokenRotation::new(self.credentials)),
            Arc::new(expiry),
        ]
    }
}
