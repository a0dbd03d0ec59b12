// Outgoing request interception: attach the stored access token

use reqwest::header::AUTHORIZATION;

use super::Interceptor;
use crate::error::Result;
use crate::message::ApiRequest;
use crate::storage::{token_preview, Credentials};
use crate::transport::DefaultHeaders;

/// Sets `Authorization: Bearer <token>` from storage on every request
///
/// Requests go out unmodified when storage is unavailable. When no token is
/// stored, a default `Authorization` left over from an earlier rotation is
/// dropped from both the request and the defaults.
pub struct BearerAuth {
    credentials: Credentials,
}

impl BearerAuth {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl Interceptor for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn on_request(
        &self,
        request: Result<ApiRequest>,
        defaults: &DefaultHeaders,
    ) -> Result<ApiRequest> {
        let mut request = match request {
            Ok(request) => request,
            Err(e) => {
                // Logged once by the session-expiry hook
                tracing::debug!(
                    error = %e,
                    "Skipping token attachment, request construction failed"
                );
                return Err(e);
            }
        };

        if !request.attach_token {
            return Ok(request);
        }

        if !self.credentials.is_available() {
            tracing::debug!(
                request_id = %request.request_id,
                "Credential storage unavailable, sending request without token"
            );
            return Ok(request);
        }

        match self.credentials.access_token() {
            Ok(Some(token)) => {
                request.headers.set_bearer(&token)?;
                tracing::debug!(
                    request_id = %request.request_id,
                    token = %token_preview(&token),
                    "Attached bearer token"
                );
            }
            Ok(None) => {
                drop_stale_default(&mut request, defaults);
                tracing::debug!(
                    request_id = %request.request_id,
                    "No stored token, sending unauthenticated request"
                );
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request.request_id,
                    error = %e,
                    "Failed to read stored token, sending unauthenticated request"
                );
            }
        }

        Ok(request)
    }
}

/// Remove the default bearer once storage no longer holds a token
///
/// An `Authorization` the caller set on the request itself is kept.
fn drop_stale_default(request: &mut ApiRequest, defaults: &DefaultHeaders) {
    let Some(stale) = defaults.get(&AUTHORIZATION) else {
        return;
    };
    defaults.remove(&AUTHORIZATION);

    let merged = request.headers.get(AUTHORIZATION.as_str());
    if merged.as_deref().map(str::as_bytes) == Some(stale.as_bytes()) {
        request.headers.remove(AUTHORIZATION.as_str());
        tracing::debug!(
            request_id = %request.request_id,
            "Dropped default authorization, no token stored"
        );
    }
}
