//! Whole-file JSON database.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use tokio::fs;
use tokio::sync::RwLock;

use crate::observability::metrics;
use crate::store::error::StoreError;
use crate::store::task::{Task, TaskFilter, TaskPatch, TaskUpdate};

/// The full on-disk image: every table in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub tasks: Vec<Task>,
    /// Placeholder table, carried through every rewrite untouched.
    pub users: Vec<serde_json::Value>,
}

/// In-memory document mirrored to a single JSON file.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    document: RwLock<Document>,
}

impl Database {
    /// Load the document at `path`.
    ///
    /// A missing or unreadable file, or one that is not JSON at all, yields
    /// empty tables and the empty document is written out immediately. Valid
    /// JSON whose records do not fit the task shape fails with
    /// [`StoreError::Decode`] and the file is left alone.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        match load_document(&path).await {
            Ok(document) => {
                tracing::info!(
                    path = %path.display(),
                    tasks = document.tasks.len(),
                    "Database loaded"
                );
                Ok(Self {
                    path,
                    document: RwLock::new(document),
                })
            }
            Err(e) if starts_empty(&e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Database file unavailable, starting with empty tables"
                );
                let database = Self {
                    path,
                    document: RwLock::new(Document::default()),
                };
                database.persist(&Document::default()).await?;
                Ok(database)
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Database file holds records of the wrong shape, refusing to overwrite"
                );
                Err(e)
            }
        }
    }

    /// The task repository.
    pub fn tasks(&self) -> Tasks<'_> {
        Tasks { db: self }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A copy of the whole document.
    #[cfg(test)]
    pub(crate) async fn snapshot(&self) -> Document {
        self.document.read().await.clone()
    }

    /// Apply `change` to a copy of the document, rewrite the file, and only
    /// then swap the copy in. The write lock is held throughout.
    ///
    /// A failed or cancelled write leaves the in-memory document untouched.
    async fn write_through<T>(
        &self,
        operation: &'static str,
        change: impl FnOnce(&mut Document) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut document = self.document.write().await;
        let mut next = document.clone();

        let result = match change(&mut next) {
            Ok(value) => match self.persist(&next).await {
                Ok(()) => {
                    *document = next;
                    Ok(value)
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        metrics::record_store_write(operation, result.is_ok());
        result
    }

    async fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(document).map_err(StoreError::Encode)?;
        let persist_error = |source: std::io::Error| StoreError::Persist {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(persist_error)?;
        }

        let staging = staging_path(&self.path);
        fs::write(&staging, &bytes).await.map_err(persist_error)?;
        fs::rename(&staging, &self.path).await.map_err(persist_error)?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Database persisted");
        Ok(())
    }
}

async fn load_document(path: &Path) -> Result<Document, StoreError> {
    let raw = fs::read(path).await.map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| StoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Missing or unreadable files and non-JSON content fall back to empty
/// tables. Shape errors in valid JSON do not.
fn starts_empty(error: &StoreError) -> bool {
    match error {
        StoreError::Read { .. } => true,
        StoreError::Decode { source, .. } => {
            matches!(source.classify(), Category::Syntax | Category::Eof)
        }
        _ => false,
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Repository over the `tasks` table.
#[derive(Debug, Clone, Copy)]
pub struct Tasks<'a> {
    db: &'a Database,
}

impl Tasks<'_> {
    /// Every task in insertion order, or those matching `filter`.
    pub async fn select_all(&self, filter: Option<&TaskFilter>) -> Vec<Task> {
        let document = self.db.document.read().await;
        match filter {
            Some(filter) => document
                .tasks
                .iter()
                .filter(|task| filter.matches(task))
                .cloned()
                .collect(),
            None => document.tasks.clone(),
        }
    }

    /// Append a task. Ids are not checked for uniqueness.
    pub async fn insert(&self, task: Task) -> Result<(), StoreError> {
        self.db
            .write_through("insert", |document| {
                document.tasks.push(task);
                Ok(())
            })
            .await
    }

    /// Replace every mutable field of the task with `id`.
    pub async fn update(&self, id: &str, data: TaskUpdate) -> Result<Task, StoreError> {
        self.merge("update", id, data.into()).await
    }

    /// Override only the fields present in `data`.
    pub async fn partial_update(&self, id: &str, data: TaskPatch) -> Result<Task, StoreError> {
        self.merge("partial_update", id, data).await
    }

    /// Remove the task with `id`, returning it.
    pub async fn delete(&self, id: &str) -> Result<Task, StoreError> {
        self.db
            .write_through("delete", |document| {
                let index = position(&document.tasks, id)?;
                Ok(document.tasks.remove(index))
            })
            .await
    }

    async fn merge(
        &self,
        operation: &'static str,
        id: &str,
        patch: TaskPatch,
    ) -> Result<Task, StoreError> {
        self.db
            .write_through(operation, |document| {
                let index = position(&document.tasks, id)?;
                let task = &mut document.tasks[index];
                task.apply(patch);
                Ok(task.clone())
            })
            .await
    }
}

fn position(tasks: &[Task], id: &str) -> Result<usize, StoreError> {
    tasks
        .iter()
        .position(|task| task.id == id)
        .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
}
