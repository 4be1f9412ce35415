//! Whole-document JSON persistence for scoring and learning state.
//!
//! The core owns three documents: scoring weights, per-channel usage
//! history, and the learning state. Each persistence operation is a full
//! read or rewrite of one document; there is no partial-write protocol and
//! no cross-process locking. Callers that run multiple pipeline workers
//! against one channel must serialize access externally (one worker per
//! channel, or a file lock around the content root).

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use std::fs;
use std::io;
use std::path::PathBuf;

/// Persistence errors surfaced by [`StateStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("document serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The documents the core persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Weights,
    UsageHistory,
    LearningState,
}

impl Document {
    /// On-disk file name for this document.
    pub fn file_name(&self) -> &'static str {
        match self {
            Document::Weights => "topic_weights.json",
            Document::UsageHistory => "used_topics.json",
            Document::LearningState => "learning_data.json",
        }
    }
}

/// Abstraction over durable document storage.
///
/// `load` returns the raw JSON text so implementations stay object-safe;
/// typed access goes through [`load_or_default`] and [`save_logged`].
pub trait StateStore: Send {
    /// Load the raw JSON text of a document. `Ok(None)` when absent.
    fn load(&self, doc: Document) -> Result<Option<String>, StoreError>;

    /// Rewrite a document in full.
    fn save(&self, doc: Document, json: &str) -> Result<(), StoreError>;
}

/// Deserialize a document, falling back to `T::default()` when it is
/// missing, unreadable, or corrupt.
///
/// Load failures are never fatal: the fallback is logged and the process
/// continues with in-memory defaults.
pub fn load_or_default<T>(store: &dyn StateStore, doc: Document) -> T
where
    T: DeserializeOwned + Default,
{
    match store.load(doc) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(error) => {
                tracing::error!(
                    %error,
                    document = doc.file_name(),
                    "corrupt document, falling back to defaults"
                );
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(error) => {
            tracing::error!(
                %error,
                document = doc.file_name(),
                "failed to load document, falling back to defaults"
            );
            T::default()
        }
    }
}

/// Serialize and persist a document, logging rather than propagating
/// failures.
///
/// On a failed save the in-memory state stays authoritative for the rest of
/// the process lifetime; the update is lost on restart.
pub fn save_logged<T: Serialize>(store: &dyn StateStore, doc: Document, value: &T) {
    let result = serde_json::to_string_pretty(value)
        .map_err(StoreError::from)
        .and_then(|json| store.save(doc, &json));

    if let Err(error) = result {
        tracing::error!(%error, document = doc.file_name(), "failed to save document");
    }
}

/// Production [`StateStore`] rooted at a content directory.
///
/// Documents live directly under the root; the directory is created on the
/// first save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, doc: Document) -> PathBuf {
        self.root.join(doc.file_name())
    }
}

impl StateStore for JsonFileStore {
    fn load(&self, doc: Document) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(doc)) {
            Ok(json) => Ok(Some(json)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&self, doc: Document, json: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(doc), json)?;
        Ok(())
    }
}
