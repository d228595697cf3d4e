//! Record-oriented operations over the `content` and `media` collections.
//!
//! Every operation follows one template: wait for the backend handle, fail with
//! [`ErrorKind::NotReady`] without touching the network when there is none, run the
//! query, and map backend failures into [`FacadeError`]. No results are cached.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::client::{BackendError, BackendHandle};
use crate::SharedInitializer;

pub mod content_db_operations;
pub mod media_db_operations;
pub mod storage_db_operations;

pub const NOT_INITIALIZED: &str = "Backend client not initialized";

pub(crate) const ID: &str = "id";
pub(crate) const TYPE: &str = "type";
pub(crate) const PUBLISHED: &str = "published";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The client library could not be used at all.
    Environment,
    /// No handle became available within the readiness budget.
    NotReady,
    /// The service rejected the query.
    Backend,
    NotFound,
    /// Upload or file removal failed.
    Storage,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FacadeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FacadeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn not_initialized() -> Self {
        Self::new(ErrorKind::NotReady, NOT_INITIALIZED)
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, what)
    }

    pub fn storage(e: BackendError) -> Self {
        Self::new(ErrorKind::Storage, e.to_string())
    }
}

impl From<BackendError> for FacadeError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Unavailable(_) => FacadeError::new(ErrorKind::Environment, e.to_string()),
            BackendError::RowCount(0) => FacadeError::not_found("No matching row found"),
            BackendError::Rejected { status: 404, .. } => FacadeError::new(ErrorKind::NotFound, e.to_string()),
            _ => FacadeError::new(ErrorKind::Backend, e.to_string()),
        }
    }
}

impl From<serde_json::Error> for FacadeError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Decode(e).into()
    }
}

pub type FacadeResult<T> = Result<T, FacadeError>;

/// Entry point for every data operation. Cheap to clone.
#[derive(Clone)]
pub struct ContentFacade {
    initializer: SharedInitializer,
}

impl ContentFacade {
    pub fn new(initializer: SharedInitializer) -> Self {
        Self { initializer }
    }

    pub fn initializer(&self) -> &SharedInitializer {
        &self.initializer
    }

    /// The shared first step of every operation.
    pub(crate) async fn ready(&self) -> FacadeResult<BackendHandle> {
        self.initializer
            .wait_until_ready()
            .await
            .ok_or_else(FacadeError::not_initialized)
    }
}

/// Logs a failed operation under its name, passing the result through.
pub(crate) fn logged<T>(operation: &str, result: FacadeResult<T>) -> FacadeResult<T> {
    if let Err(e) = &result {
        log::error!("Error {}: {}", operation, e);
    }
    result
}

pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> FacadeResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(FacadeError::from))
        .collect()
}

/// Exactly one row, mirroring a `.single()` read.
pub(crate) fn decode_single<T: DeserializeOwned>(mut rows: Vec<Value>, what: &str) -> FacadeResult<T> {
    match rows.len() {
        0 => Err(FacadeError::not_found(format!("{} not found", what))),
        1 => Ok(serde_json::from_value(rows.remove(0))?),
        n => Err(BackendError::RowCount(n).into()),
    }
}

pub(crate) fn to_row<T: Serialize>(value: &T) -> FacadeResult<Value> {
    Ok(serde_json::to_value(value)?)
}
