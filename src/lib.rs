// Webook client - Library root

pub mod api;
pub mod config;
pub mod error;
pub mod headers;
pub mod interceptor;
pub mod message;
pub mod models;
pub mod navigation;
pub mod storage;
pub mod transport;

pub use api::WebookApi;
pub use error::{Result, StorageError, TransportError};
pub use interceptor::{AuthInterceptors, Interceptor};
pub use transport::{Transport, TransportBuilder};
