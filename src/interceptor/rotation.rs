// Incoming response interception: capture rotated tokens

use super::Interceptor;
use crate::error::Result;
use crate::message::ApiResponse;
use crate::storage::{token_preview, Credentials};
use crate::transport::DefaultHeaders;

/// Response header carrying a rotated access token
pub const ACCESS_TOKEN_HEADER: &str = "x-jwt-token";

/// Response header carrying a rotated refresh token
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// Persists rotated tokens from successful responses
///
/// A new access token is also written into the transport's default
/// `Authorization` header so the very next request carries it. Empty header
/// values are ignored. Concurrent rotations resolve last-write-wins.
pub struct TokenRotation {
    credentials: Credentials,
}

impl TokenRotation {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    fn capture(&self, response: &ApiResponse, defaults: &DefaultHeaders) {
        if let Some(token) = response.header(ACCESS_TOKEN_HEADER).filter(|t| !t.is_empty()) {
            if let Err(e) = self.credentials.store_access_token(token) {
                tracing::warn!(error = %e, "Failed to persist rotated access token");
            }
            match defaults.set_bearer(token) {
                Ok(()) => tracing::info!(
                    token = %token_preview(token),
                    "Access token rotated"
                ),
                Err(e) => tracing::warn!(error = %e, "Rotated access token rejected"),
            }
        }

        if let Some(token) = response.header(REFRESH_TOKEN_HEADER).filter(|t| !t.is_empty()) {
            match self.credentials.store_refresh_token(token) {
                Ok(()) => tracing::debug!(
                    token = %token_preview(token),
                    "Refresh token rotated"
                ),
                Err(e) => tracing::warn!(error = %e, "Failed to persist rotated refresh token"),
            }
        }
    }
}

impl Interceptor for TokenRotation {
    fn name(&self) -> &'static str {
        "token_rotation"
    }

    fn on_response(
        &self,
        response: Result<ApiResponse>,
        defaults: &DefaultHeaders,
    ) -> Result<ApiResponse> {
        if let Ok(ref resp) = response {
            if self.credentials.is_available() {
                self.capture(resp, defaults);
            } else {
                tracing::debug!("Credential storage unavailable, skipping token capture");
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::storage::{MemoryStorage, Unavailable};
    use bytes::Bytes;
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
    use reqwest::StatusCode;
    use std::sync::Arc;

    fn response(headers: &[(&'static str, &'static str)]) -> ApiResponse {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_static(value),
            );
        }
        ApiResponse::new(StatusCode::OK, map, Bytes::new())
    }

    fn setup() -> (TokenRotation, Credentials, DefaultHeaders) {
        let creds = Credentials::new(Arc::new(MemoryStorage::new()));
        (TokenRotation::new(creds.clone()), creds, DefaultHeaders::new())
    }

    #[test]
    fn test_access_token_persisted_and_defaulted() {
        let (hook, creds, defaults) = setup();
        let resp = hook
            .on_response(Ok(response(&[("x-jwt-token", "xyz")])), &defaults)
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(creds.access_token().unwrap().as_deref(), Some("xyz"));
        assert_eq!(defaults.get(&AUTHORIZATION).unwrap(), "Bearer xyz");
        assert_eq!(creds.refresh_token().unwrap(), None);
    }

    #[test]
    fn test_refresh_token_persisted_without_default_header() {
        let (hook, creds, defaults) = setup();
        hook.on_response(Ok(response(&[("x-refresh-token", "rt-2")])), &defaults)
            .unwrap();

        assert_eq!(creds.refresh_token().unwrap().as_deref(), Some("rt-2"));
        assert!(defaults.get(&AUTHORIZATION).is_none());
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let (hook, creds, defaults) = setup();
        hook.on_response(
            Ok(response(&[("X-JWT-Token", "upper"), ("X-Refresh-Token", "rt")])),
            &defaults,
        )
        .unwrap();

        assert_eq!(creds.access_token().unwrap().as_deref(), Some("upper"));
        assert_eq!(creds.refresh_token().unwrap().as_deref(), Some("rt"));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let (hook, creds, defaults) = setup();
        creds.store_access_token("keep").unwrap();
        hook.on_response(
            Ok(response(&[("x-jwt-token", ""), ("x-refresh-token", "")])),
            &defaults,
        )
        .unwrap();

        assert_eq!(creds.access_token().unwrap().as_deref(), Some("keep"));
        assert!(defaults.get(&AUTHORIZATION).is_none());
    }

    #[test]
    fn test_errors_pass_through_untouched() {
        let (hook, creds, defaults) = setup();
        let err = hook
            .on_response(Err(TransportError::from_status(500, "boom")), &defaults)
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(creds.access_token().unwrap(), None);
    }

    #[test]
    fn test_unavailable_storage_skips_capture() {
        let hook = TokenRotation::new(Credentials::new(Arc::new(Unavailable)));
        let defaults = DefaultHeaders::new();
        let resp = hook
            .on_response(Ok(response(&[("x-jwt-token", "xyz")])), &defaults)
            .unwrap();

        assert_eq!(resp.header("x-jwt-token"), Some("xyz"));
        assert!(defaults.get(&AUTHORIZATION).is_none());
    }
}
