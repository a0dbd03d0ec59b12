// Error handling module
// Defines transport and storage error types

use thiserror::Error;

/// Maximum length for response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Errors raised by the authenticated transport
#[derive(Error, Debug)]
pub enum TransportError {
    /// Non-2xx response from the server
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, timeout or body transfer failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request could not be constructed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The webook envelope carried a non-zero code
    #[error("API error {code}: {msg}")]
    Api { code: i32, msg: String },

    /// A credential required by the operation is not stored
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// Credential storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl TransportError {
    /// Build a status error, truncating the body to keep logs readable
    pub fn from_status(status: u16, body: &str) -> Self {
        TransportError::Status {
            status,
            message: truncate_body(body),
        }
    }

    /// HTTP status code, if the error carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for 401 responses
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Errors raised by credential storage
#[derive(Error, Debug)]
pub enum StorageError {
    /// No persistent storage in this environment. Interceptors treat this
    /// as a configuration condition and skip their side effects.
    #[error("Configuration error: persistent storage is unavailable")]
    Unavailable,

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}... (truncated, {} total bytes)",
        &body[..end],
        body.len()
    )
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;
