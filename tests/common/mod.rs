#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use appbase_content::client::{
    Backend, BackendError, BackendHandle, BackendInitializer, ClientSettings, Connector, Query, ReadinessPolicy,
    Table, UploadOptions, CREATED_AT,
};
use appbase_content::models::db_operations::ContentFacade;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// In-process table and file store with failure switches.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    rows: HashMap<Table, Vec<Value>>,
    files: BTreeMap<String, Vec<u8>>,
    uploads: Vec<(String, UploadOptions)>,
    removal_attempts: Vec<String>,
    selects: Vec<Query>,
    fail_removals: bool,
    fail_count_for_type: Option<String>,
    next_id: i64,
}

fn wire_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, query: &Query) -> bool {
    query
        .filters
        .iter()
        .all(|f| row.get(&f.column).map(wire_value).as_deref() == Some(f.value.as_str()))
}

fn created_at(row: &Value) -> Option<DateTime<Utc>> {
    row.get(CREATED_AT)?.as_str()?.parse().ok()
}

impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, table: Table, row: Value) {
        self.state.lock().unwrap().rows.entry(table).or_default().push(row);
    }

    pub fn seed_file(&self, path: &str) {
        self.state.lock().unwrap().files.insert(path.to_string(), b"data".to_vec());
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.state.lock().unwrap().rows.get(&table).cloned().unwrap_or_default()
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.state.lock().unwrap().files.contains_key(path)
    }

    pub fn uploads(&self) -> Vec<(String, UploadOptions)> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub fn removal_attempts(&self) -> Vec<String> {
        self.state.lock().unwrap().removal_attempts.clone()
    }

    pub fn last_select(&self) -> Option<Query> {
        self.state.lock().unwrap().selects.last().cloned()
    }

    pub fn fail_removals(&self) {
        self.state.lock().unwrap().fail_removals = true;
    }

    /// Makes counts filtered on this `type` value fail.
    pub fn fail_count_for_type(&self, kind: &str) {
        self.state.lock().unwrap().fail_count_for_type = Some(kind.to_string());
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.selects.push(query.clone());

        let mut rows: Vec<Value> = state
            .rows
            .get(&query.table)
            .map(|rows| rows.iter().filter(|row| matches(row, query)).cloned().collect())
            .unwrap_or_default();
        if query.newest_first {
            rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
        }
        let rows = match (query.range, query.limit) {
            (Some((from, to)), _) => rows.into_iter().skip(from as usize).take((to - from + 1) as usize).collect(),
            (None, Some(limit)) => rows.into_iter().take(limit as usize).collect(),
            (None, None) => rows,
        };
        Ok(rows)
    }

    async fn count(&self, query: &Query) -> Result<u64, BackendError> {
        let state = self.state.lock().unwrap();
        if let Some(kind) = &state.fail_count_for_type {
            if query.filter_value("type") == Some(kind.as_str()) {
                return Err(BackendError::rejected(500, "count failed"));
            }
        }
        Ok(state
            .rows
            .get(&query.table)
            .map(|rows| rows.iter().filter(|row| matches(row, query)).count() as u64)
            .unwrap_or(0))
    }

    async fn insert(&self, table: Table, mut row: Value) -> Result<Value, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        if let Some(object) = row.as_object_mut() {
            object.entry("id").or_insert(json!(id));
            object.entry(CREATED_AT).or_insert(json!(Utc::now().to_rfc3339()));
        }
        state.rows.entry(table).or_default().push(row.clone());
        Ok(row)
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>, BackendError> {
        let mut state = self.state.lock().unwrap();
        let mut updated = Vec::new();
        for row in state.rows.entry(query.table).or_default().iter_mut() {
            if !matches(row, query) {
                continue;
            }
            if let (Some(target), Some(changes)) = (row.as_object_mut(), patch.as_object()) {
                for (key, value) in changes {
                    target.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, query: &Query) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.rows.entry(query.table).or_default().retain(|row| !matches(row, query));
        Ok(())
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, options: &UploadOptions) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        if state.files.contains_key(path) && !options.upsert {
            return Err(BackendError::rejected(409, "The resource already exists"));
        }
        state.files.insert(path.to_string(), bytes);
        state.uploads.push((path.to_string(), options.clone()));
        Ok(())
    }

    async fn remove(&self, paths: &[String]) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.removal_attempts.extend(paths.iter().cloned());
        if state.fail_removals {
            return Err(BackendError::rejected(500, "storage unavailable"));
        }
        for path in paths {
            state.files.remove(path);
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://storage.test/media/{}", path)
    }
}

/// Hands out the same in-memory backend and counts how often it was asked.
pub struct MemoryConnector {
    backend: Arc<MemoryBackend>,
    pub connects: Arc<AtomicUsize>,
}

impl MemoryConnector {
    pub fn new(backend: Arc<MemoryBackend>) -> Self {
        Self {
            backend,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, _settings: &ClientSettings) -> Result<BackendHandle, BackendError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let handle: BackendHandle = self.backend.clone();
        Ok(handle)
    }
}

/// Simulates a missing client library.
pub struct UnavailableConnector;

impl Connector for UnavailableConnector {
    fn connect(&self, _settings: &ClientSettings) -> Result<BackendHandle, BackendError> {
        Err(BackendError::Unavailable("client library not loaded".to_string()))
    }
}

pub fn settings() -> ClientSettings {
    ClientSettings {
        endpoint: "https://project.supabase.co".to_string(),
        access_key: "anon-key".to_string(),
        bucket: "media".to_string(),
    }
}

pub fn ready_facade(backend: &Arc<MemoryBackend>) -> ContentFacade {
    let initializer = BackendInitializer::new(
        settings(),
        MemoryConnector::new(backend.clone()),
        ReadinessPolicy::default(),
    );
    assert!(initializer.initialize());
    ContentFacade::new(Arc::new(initializer))
}

/// A facade whose backend never becomes available; waits give up after 10 ms.
pub fn unready_facade() -> ContentFacade {
    let initializer = BackendInitializer::new(
        settings(),
        UnavailableConnector,
        ReadinessPolicy::new(Duration::from_millis(1), 10),
    );
    ContentFacade::new(Arc::new(initializer))
}

pub fn content_row(id: i64, kind: &str, published: bool, created_at: &str, title: &str) -> Value {
    json!({
        "id": id,
        "type": kind,
        "published": published,
        "created_at": created_at,
        "title": title,
        "description": format!("About {}", title),
    })
}

pub fn media_row(id: i64, kind: &str, file_path: Option<&str>, created_at: &str) -> Value {
    json!({
        "id": id,
        "type": kind,
        "file_path": file_path,
        "url": file_path.map(|p| format!("https://storage.test/media/{}", p)),
        "created_at": created_at,
    })
}
