//! Revisioned document storage.
//!
//! A store holds text documents keyed by path. Every read returns the
//! document's current revision (`sha`), and updates must name the revision
//! they replace, so a writer working from an old read is refused instead of
//! silently overwriting newer rows.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ArchiveError;

/// A stored document and the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub sha: String,
}

/// Storage for text documents with optimistic concurrency.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a document. `Ok(None)` when it does not exist.
    async fn read(&self, path: &str) -> Result<Option<Document>, ArchiveError>;

    /// Create a new document. Fails with [`ArchiveError::Conflict`] if the
    /// path is already taken.
    async fn create(&self, path: &str, content: &str, message: &str) -> Result<(), ArchiveError>;

    /// Replace the document at revision `sha`. Fails with
    /// [`ArchiveError::Conflict`] if it has changed since.
    async fn update(
        &self,
        path: &str,
        content: &str,
        sha: &str,
        message: &str,
    ) -> Result<(), ArchiveError>;
}

/// An in-process store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, (String, u64)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document at the first revision.
    pub fn with_document(self, path: &str, content: &str) -> Self {
        self.lock().insert(path.to_string(), (content.to_string(), 1));
        self
    }

    /// Current content at `path`.
    pub fn content(&self, path: &str) -> Option<String> {
        self.lock().get(path).map(|(content, _)| content.clone())
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (String, u64)>> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn sha(revision: u64) -> String {
    format!("{:040x}", revision)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<Option<Document>, ArchiveError> {
        Ok(self.lock().get(path).map(|(content, revision)| Document {
            content: content.clone(),
            sha: sha(*revision),
        }))
    }

    async fn create(&self, path: &str, content: &str, _message: &str) -> Result<(), ArchiveError> {
        let mut documents = self.lock();
        if documents.contains_key(path) {
            return Err(ArchiveError::Conflict(format!("{} already exists", path)));
        }
        documents.insert(path.to_string(), (content.to_string(), 1));
        Ok(())
    }

    async fn update(
        &self,
        path: &str,
        content: &str,
        expected: &str,
        _message: &str,
    ) -> Result<(), ArchiveError> {
        let mut documents = self.lock();
        let Some((stored, revision)) = documents.get_mut(path) else {
            return Err(ArchiveError::NotFound(path.to_string()));
        };
        if sha(*revision) != expected {
            return Err(ArchiveError::Conflict(format!(
                "{} changed since revision {}",
                path, expected
            )));
        }
        *stored = content.to_string();
        *revision += 1;
        Ok(())
    }
}
