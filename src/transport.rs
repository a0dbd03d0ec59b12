use anyhow::Context;
use dashmap::DashMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::headers::bearer_value;
use crate::interceptor::{AuthInterceptors, Interceptor};
use crate::message::{ApiRequest, ApiResponse};

/// Default API origin
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default headers merged into every outgoing request
///
/// Cloning yields another handle to the same headers.
#[derive(Clone, Default)]
pub struct DefaultHeaders {
    headers: Arc<DashMap<HeaderName, HeaderValue>>,
}

impl DefaultHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Set the default `Authorization: Bearer <token>`
    pub fn set_bearer(&self, token: &str) -> Result<()> {
        let value = HeaderValue::from_str(&bearer_value(token)).map_err(|e| {
            TransportError::InvalidRequest(format!("Token is not a valid header value: {}", e))
        })?;
        self.set(AUTHORIZATION, value);
        Ok(())
    }

    pub fn remove(&self, name: &HeaderName) {
        self.headers.remove(name);
    }

    pub fn get(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.headers.get(name).map(|entry| entry.value().clone())
    }

    /// Copy of the current headers
    pub fn snapshot(&self) -> HeaderMap {
        self.headers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

/// Builder for [`Transport`]
pub struct TransportBuilder {
    base_url: String,
    connect_timeout: u64,
    request_timeout: u64,
    cookie_store: bool,
    defaults: DefaultHeaders,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Default for TransportBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: 30,
            request_timeout: 60,
            cookie_store: true,
            defaults: DefaultHeaders::new(),
            interceptors: Vec::new(),
        }
    }
}

impl TransportBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Connect timeout in seconds
    pub fn connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout = secs;
        self
    }

    /// Whole-request timeout in seconds
    pub fn request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout = secs;
        self
    }

    /// Keep and resend cookies (credentialed requests). Enabled by default.
    pub fn cookie_store(mut self, enabled: bool) -> Self {
        self.cookie_store = enabled;
        self
    }

    pub fn default_header(self, name: HeaderName, value: HeaderValue) -> Self {
        self.defaults.set(name, value);
        self
    }

    /// Append an interceptor; hooks run in registration order
    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Append the bearer, rotation and session-expiry interceptors
    pub fn with_auth(mut self, auth: AuthInterceptors) -> Self {
        self.interceptors.extend(auth.into_interceptors());
        self
    }

    pub fn build(self) -> Result<Transport> {
        let base_url = Url::parse(&self.base_url).map_err(|e| {
            TransportError::InvalidRequest(format!("Invalid base URL {}: {}", self.base_url, e))
        })?;

        let client = Client::builder()
            .cookie_store(self.cookie_store)
            .connect_timeout(Duration::from_secs(self.connect_timeout))
            .timeout(Duration::from_secs(self.request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::debug!(
            base_url = %base_url,
            interceptors = ?self.interceptors.iter().map(|i| i.name()).collect::<Vec<_>>(),
            "Transport initialized"
        );

        Ok(Transport {
            client,
            base_url,
            defaults: self.defaults,
            interceptors: self.interceptors,
        })
    }
}

/// Authenticated HTTP transport for the webook API
///
/// Owns the HTTP client, the default headers and the interceptor chain.
/// Every request goes through `send`:
/// 1. default headers are merged into the request
/// 2. request hooks run in order
/// 3. the request is dispatched (skipped if a hook failed)
/// 4. non-2xx responses become `TransportError::Status`
/// 5. response hooks run in order on the response or the error
pub struct Transport {
    /// Shared HTTP client with connection pooling
    client: Client,

    base_url: Url,

    defaults: DefaultHeaders,

    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Transport {
    pub fn builder() -> TransportBuilder {
        TransportBuilder::default()
    }

    /// Append an interceptor after construction
    pub fn register(&mut self, interceptor: Arc<dyn Interceptor>) {
        tracing::debug!(interceptor = interceptor.name(), "Registering interceptor");
        self.interceptors.push(interceptor);
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Handle to the default headers
    pub fn defaults(&self) -> &DefaultHeaders {
        &self.defaults
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse> {
        self.execute(ApiRequest::post(path).json(body)).await
    }

    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.execute(Ok(request)).await
    }

    /// Run a possibly failed request through the full interceptor chain
    ///
    /// A construction error skips dispatch but still reaches every hook, so
    /// it is observed and re-raised like any transport error.
    pub async fn execute(&self, request: Result<ApiRequest>) -> Result<ApiResponse> {
        let mut outcome = request.and_then(|mut req| {
            req.headers.merge_defaults(&self.defaults.snapshot())?;
            Ok(req)
        });

        for interceptor in &self.interceptors {
            outcome = interceptor.on_request(outcome, &self.defaults);
        }

        let mut outcome = match outcome {
            Ok(req) => self.dispatch(req).await,
            Err(e) => Err(e),
        };

        for interceptor in &self.interceptors {
            outcome = interceptor.on_response(outcome, &self.defaults);
        }

        outcome
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
        let ApiRequest {
            method,
            path,
            headers,
            body,
            request_id,
            ..
        } = request;

        let url = self.base_url.join(&path).map_err(|e| {
            TransportError::InvalidRequest(format!("Invalid request path {}: {}", path, e))
        })?;
        let headers = headers.into_header_map()?;

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            url = %url,
            authenticated = headers.contains_key(AUTHORIZATION),
            "Sending HTTP request"
        );

        let mut builder = self.client.request(method, url.clone()).headers(headers);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connection_failed"
                } else if e.is_request() {
                    "request_error"
                } else if e.is_body() {
                    "body_error"
                } else {
                    "unknown"
                };
                tracing::warn!(
                    request_id = %request_id,
                    error_kind = error_kind,
                    error = %e,
                    url = %url,
                    "HTTP request error"
                );
                return Err(TransportError::Network(e));
            }
        };

        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::debug!(
                request_id = %request_id,
                status = status.as_u16(),
                url = %url,
                "Received error response"
            );
            return Err(TransportError::from_status(status.as_u16(), &error_text));
        }

        let body = response.bytes().await?;
        tracing::debug!(
            request_id = %request_id,
            status = %status,
            bytes = body.len(),
            "Received HTTP response"
        );

        Ok(ApiResponse::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_default_headers_snapshot() {
        let defaults = DefaultHeaders::new();
        defaults.set_bearer("abc").unwrap();
        defaults.set(
            HeaderName::from_static("x-client"),
            HeaderValue::from_static("webook"),
        );

        let snapshot = defaults.snapshot();
        assert_eq!(snapshot.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(snapshot.get("x-client").unwrap(), "webook");

        defaults.remove(&AUTHORIZATION);
        assert!(defaults.get(&AUTHORIZATION).is_none());
    }

    #[test]
    fn test_default_headers_reject_invalid_token() {
        let defaults = DefaultHeaders::new();
        assert!(defaults.set_bearer("bad\ntoken").is_err());
        assert!(defaults.get(&AUTHORIZATION).is_none());
    }

    #[test]
    fn test_builder_rejects_invalid_base_url() {
        let result = Transport::builder().base_url("not a url").build();
        assert!(matches!(result, Err(TransportError::InvalidRequest(_))));
    }

    #[test]
    fn test_builder_defaults() {
        let transport = Transport::builder().build().unwrap();
        assert_eq!(transport.base_url().as_str(), "http://localhost:8080/");
    }

    /// Records the order in which hooks observe the chain
    struct Probe {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Interceptor for Probe {
        fn name(&self) -> &'static str {
            self.name
        }

        fn on_request(
            &self,
            request: Result<ApiRequest>,
            _defaults: &DefaultHeaders,
        ) -> Result<ApiRequest> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:request:{}", self.name, request.is_ok()));
            request
        }

        fn on_response(
            &self,
            response: Result<ApiResponse>,
            _defaults: &DefaultHeaders,
        ) -> Result<ApiResponse> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:response:{}", self.name, response.is_ok()));
            response
        }
    }

    #[tokio::test]
    async fn test_registered_interceptor_runs_after_builder_ones() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut transport = Transport::builder()
            .interceptor(Arc::new(Probe {
                name: "built",
                log: log.clone(),
            }))
            .build()
            .unwrap();
        transport.register(Arc::new(Probe {
            name: "late",
            log: log.clone(),
        }));

        let _ = transport
            .execute(Err(TransportError::InvalidRequest("skip".to_string())))
            .await;

        let log = log.lock().unwrap();
        assert_eq!(log[0], "built:request:false");
        assert_eq!(log[1], "late:request:false");
    }

    #[tokio::test]
    async fn test_construction_error_reaches_every_hook() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let transport = Transport::builder()
            .interceptor(Arc::new(Probe {
                name: "first",
                log: log.clone(),
            }))
            .interceptor(Arc::new(Probe {
                name: "second",
                log: log.clone(),
            }))
            .build()
            .unwrap();

        let err = transport
            .execute(Err(TransportError::InvalidRequest("broken".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(ref m) if m == "broken"));

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "first:request:false",
                "second:request:false",
                "first:response:false",
                "second:response:false",
            ]
        );
    }
}
