use std::sync::Arc;

use client::BackendInitializer;

/// Shared initializer handed to every facade and page loader.
pub type SharedInitializer = Arc<BackendInitializer>;

pub mod client;
pub mod config;
pub mod helper;
pub mod models;
