//! The `{ success, data | stats | pagination, error }` shape page scripts consume.
//!
//! Facade calls return `Result`; this is only the rendering of that result for
//! consumers that branch on `success`. Failures carry the payload's empty default.

use serde::Serialize;

use crate::models::db_operations::FacadeError;
use crate::models::{DashboardStats, Page, UploadedFile};

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Envelope<B> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub body: B,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct DataBody<T> {
    pub data: T,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct StatsBody {
    pub stats: DashboardStats,
}

#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq)]
pub struct EmptyBody {}

impl<B: Default> Envelope<B> {
    fn from_result<T>(result: Result<T, FacadeError>, wrap: impl FnOnce(T) -> B) -> Self {
        match result {
            Ok(value) => Self {
                success: true,
                error: None,
                body: wrap(value),
            },
            Err(e) => Self {
                success: false,
                error: Some(e.message),
                body: B::default(),
            },
        }
    }
}

impl<T: Default> Envelope<DataBody<T>> {
    pub fn data(result: Result<T, FacadeError>) -> Self {
        Self::from_result(result, |data| DataBody { data })
    }
}

impl<T> Envelope<DataBody<Option<T>>> {
    /// Single-row results; failures render `data: null`.
    pub fn record(result: Result<T, FacadeError>) -> Self {
        Self::from_result(result, |data| DataBody { data: Some(data) })
    }
}

impl Envelope<StatsBody> {
    pub fn stats(result: Result<DashboardStats, FacadeError>) -> Self {
        Self::from_result(result, |stats| StatsBody { stats })
    }
}

impl<T> Envelope<Page<T>> {
    pub fn page(result: Result<Page<T>, FacadeError>) -> Self {
        Self::from_result(result, |page| page)
    }
}

impl Envelope<UploadedFile> {
    pub fn upload(result: Result<UploadedFile, FacadeError>) -> Self {
        Self::from_result(result, |uploaded| uploaded)
    }
}

impl Envelope<EmptyBody> {
    pub fn done(result: Result<(), FacadeError>) -> Self {
        Self::from_result(result, |()| EmptyBody {})
    }
}
