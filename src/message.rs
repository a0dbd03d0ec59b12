// Request and response types passed through the interceptor chain

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, TransportError};
use crate::headers::Headers;

/// Outgoing request, relative to the transport's base origin
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: Headers,
    pub body: Option<serde_json::Value>,
    /// Whether the bearer interceptor attaches the stored access token
    pub attach_token: bool,
    /// Short id used to correlate log lines of one request
    pub request_id: String,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::default(),
            body: None,
            attach_token: true,
            request_id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            TransportError::InvalidRequest(format!("Failed to serialize request body: {}", e))
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Replace the header container (and with it the header shape)
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Send without the stored access token, e.g. when the request carries
    /// a different credential
    pub fn without_stored_token(mut self) -> Self {
        self.attach_token = false;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        self.headers.set(name, value)?;
        Ok(self)
    }
}

/// Completed response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text; missing or non-text values yield `None`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TransportError::Decode(format!("Response body is not UTF-8: {}", e)))
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| TransportError::Decode(format!("Invalid JSON response: {}", e)))
    }
}
