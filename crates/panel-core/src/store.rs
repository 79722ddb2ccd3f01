//! Persistence seams
//!
//! - [`TraceStore`]: write-once trace records, retrievable by id
//! - [`RequirementStore`]: idempotent key-value storage of requirement models
//! - [`LibraryProvider`]: read access to the component library

use crate::error::{PipelineError, Result};
use crate::trace::{Trace, TraceId};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use panel_model::{ComponentLibrary, RequirementModel};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Storage for finished traces
#[async_trait]
pub trait TraceStore: Send + Sync {
    /// Persist a trace; a trace id is written at most once
    async fn save(&self, trace: &Trace) -> Result<()>;

    /// Fetch a trace by id
    async fn load(&self, id: TraceId) -> Result<Option<Trace>>;
}

/// In-memory trace store
#[derive(Debug, Default)]
pub struct InMemoryTraceStore {
    traces: DashMap<TraceId, Trace>,
}

impl InMemoryTraceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Ids of stored traces, oldest first
    #[must_use]
    pub fn ids(&self) -> Vec<TraceId> {
        let mut ids: Vec<TraceId> = self.traces.iter().map(|e| *e.key()).collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl TraceStore for InMemoryTraceStore {
    async fn save(&self, trace: &Trace) -> Result<()> {
        match self.traces.entry(trace.id()) {
            Entry::Occupied(_) => Err(PipelineError::Storage(format!(
                "trace {} already stored",
                trace.id()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(trace.clone());
                Ok(())
            }
        }
    }

    async fn load(&self, id: TraceId) -> Result<Option<Trace>> {
        Ok(self.traces.get(&id).map(|t| t.clone()))
    }
}

/// One JSON file per trace under a directory
#[derive(Debug, Clone)]
pub struct FileTraceStore {
    directory: PathBuf,
}

impl FileTraceStore {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, id: TraceId) -> PathBuf {
        self.directory.join(format!("{id}.json"))
    }

    /// Raw JSON document of a trace
    ///
    /// # Errors
    /// `PipelineError::Io` for read failures other than a missing file,
    /// `Serialization` when the file is not JSON.
    pub async fn load_raw(&self, id: TraceId) -> Result<Option<serde_json::Value>> {
        match tokio::fs::read(self.path_for(id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl TraceStore for FileTraceStore {
    async fn save(&self, trace: &Trace) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.path_for(trace.id());
        let bytes = serde_json::to_vec_pretty(trace)?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    PipelineError::Storage(format!("trace {} already stored", trace.id()))
                }
                _ => e.into(),
            })?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        tracing::debug!(trace_id = %trace.id(), path = %path.display(), "trace written");
        Ok(())
    }

    async fn load(&self, id: TraceId) -> Result<Option<Trace>> {
        match self.load_raw(id).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

/// Key-value storage for requirement models
#[async_trait]
pub trait RequirementStore: Send + Sync {
    /// Store under a caller-supplied key, replacing any previous value
    async fn put(&self, key: &str, model: &RequirementModel) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<RequirementModel>>;
}

/// In-memory requirement store
#[derive(Debug, Default)]
pub struct InMemoryRequirementStore {
    models: DashMap<String, RequirementModel>,
}

impl InMemoryRequirementStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequirementStore for InMemoryRequirementStore {
    async fn put(&self, key: &str, model: &RequirementModel) -> Result<()> {
        self.models.insert(key.to_string(), model.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<RequirementModel>> {
        Ok(self.models.get(key).map(|m| m.clone()))
    }
}

/// Read access to a component library
pub trait LibraryProvider: Send + Sync {
    /// Current library, in library order
    ///
    /// # Errors
    /// Provider-specific failures.
    fn library(&self) -> Result<ComponentLibrary>;
}

/// Provider over a fixed library
#[derive(Debug, Clone, Default)]
pub struct StaticLibrary(pub ComponentLibrary);

impl LibraryProvider for StaticLibrary {
    fn library(&self) -> Result<ComponentLibrary> {
        Ok(self.0.clone())
    }
}

/// Provider reading a JSON array of components from disk on every call
#[derive(Debug, Clone)]
pub struct JsonFileLibrary {
    path: PathBuf,
}

impl JsonFileLibrary {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LibraryProvider for JsonFileLibrary {
    fn library(&self) -> Result<ComponentLibrary> {
        let bytes = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
