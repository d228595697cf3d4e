//! Connection to the hosted data and storage backend.
//!
//! The [`Backend`] trait is the only surface the facade talks to. [`RestBackend`] speaks
//! the hosted service's REST and storage endpoints; anything else implementing the trait
//! (an in-process table store in tests, for instance) can stand in for it.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

mod initializer;
pub use initializer::*;

mod query;
pub use query::*;

mod rest;
pub use rest::*;

/// The single client object used to issue every backend query.
pub type BackendHandle = Arc<dyn Backend>;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("invalid backend endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("expected a single row, got {0}")]
    RowCount(usize),
    #[error("backend client unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        BackendError::Rejected { status, message: message.into() }
    }

    /// `true` when the backend answered but found nothing to return.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::RowCount(0) | BackendError::Rejected { status: 404, .. })
    }
}

/// Credentials and storage location used to build a [`BackendHandle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub endpoint: String,
    pub access_key: String,
    pub bucket: String,
}

/// Storage upload knobs forwarded as request headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: Option<String>,
    pub cache_control_secs: Option<u32>,
    pub upsert: bool,
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Rows matching the query, in the order the query asks for.
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError>;

    /// Number of rows matching the query's filters. Ordering and paging are ignored.
    async fn count(&self, query: &Query) -> Result<u64, BackendError>;

    /// Inserts one row and returns it as stored.
    async fn insert(&self, table: Table, row: Value) -> Result<Value, BackendError>;

    /// Applies `patch` to every matching row and returns the updated rows.
    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, BackendError>;

    async fn delete(&self, query: &Query) -> Result<(), BackendError>;

    async fn upload(&self, path: &str, bytes: Vec<u8>, options: &UploadOptions) -> Result<(), BackendError>;

    async fn remove(&self, paths: &[String]) -> Result<(), BackendError>;

    fn public_url(&self, path: &str) -> String;
}

/// Builds a handle from settings. Failure means the client library cannot be used
/// in this environment at all.
pub trait Connector: Send + Sync {
    fn connect(&self, settings: &ClientSettings) -> Result<BackendHandle, BackendError>;
}
