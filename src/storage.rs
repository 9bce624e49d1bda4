//! File-backed store: the whole collection lives in one JSON document.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{CardDraft, ProgressRecord, ProgressUpdate};
use crate::store::{Collection, ProgressStore};

const COLLECTION_FILE: &str = "collection.json";

/// Persists cards and progress to `<dir>/collection.json`.
///
/// File access runs on tokio's blocking pool, so the store is safe to use
/// from a multi-threaded runtime.
pub struct JsonStore {
    file: Arc<CollectionFile>,
}

struct CollectionFile {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(data_dir: PathBuf) -> anyhow::Result<Self> {
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

        Ok(Self {
            file: Arc::new(CollectionFile {
                path: data_dir.join(COLLECTION_FILE),
                lock: Mutex::new(()),
            }),
        })
    }

    /// Get default storage location.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordcards")
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }

    async fn blocking<T, F>(&self, task: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&CollectionFile) -> Result<T, StorageError> + Send + 'static,
    {
        let file = Arc::clone(&self.file);

        tokio::task::spawn_blocking(move || task(&file))
            .await
            .map_err(|e| StorageError::Unavailable(format!("Storage task failed: {}", e)))?
    }
}

impl CollectionFile {
    fn load(&self) -> Result<Collection, StorageError> {
        if !self.path.exists() {
            return Ok(Collection::default());
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&json)
            .map_err(|e| StorageError::Unavailable(format!("{}: {}", self.path.display(), e)))
    }

    fn save(&self, collection: &Collection) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(collection)
            .map_err(|e| StorageError::Write(e.to_string()))?;

        // Write next to the target and rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| StorageError::Write(format!("{}: {}", self.path.display(), e)))
    }

    fn read(&self) -> Result<Collection, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.load()
    }

    /// Load, apply `change`, save.
    fn modify<T>(&self, change: impl FnOnce(&mut Collection) -> Result<T, StorageError>) -> Result<T, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut collection = self.load()?;
        let result = change(&mut collection)?;
        self.save(&collection)?;
        Ok(result)
    }
}

#[async_trait]
impl ProgressStore for JsonStore {
    async fn fetch_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StorageError> {
        let user_id = user_id.to_string();
        self.blocking(move |file| Ok(file.read()?.records_for(&user_id)))
            .await
    }

    async fn update_progress(&self, progress_id: &str, update: &ProgressUpdate) -> Result<(), StorageError> {
        let progress_id = progress_id.to_string();
        let update = *update;
        self.blocking(move |file| file.modify(|c| c.update_progress(&progress_id, &update)))
            .await
    }

    async fn insert_cards(
        &self,
        user_id: &str,
        drafts: &[CardDraft],
        initial: &ProgressUpdate,
    ) -> Result<Vec<String>, StorageError> {
        let user_id = user_id.to_string();
        let drafts = drafts.to_vec();
        let initial = *initial;
        self.blocking(move |file| file.modify(|c| Ok(c.insert_cards(&user_id, &drafts, &initial))))
            .await
    }

    async fn delete_progress(&self, card_id: &str, user_id: &str) -> Result<(), StorageError> {
        let card_id = card_id.to_string();
        let user_id = user_id.to_string();
        self.blocking(move |file| {
            file.modify(|c| {
                if !c.delete_progress(&card_id, &user_id) {
                    log::debug!("No progress for card {} and user {}", card_id, user_id);
                }
                Ok(())
            })
        })
        .await
    }

    async fn delete_card(&self, card_id: &str) -> Result<(), StorageError> {
        let card_id = card_id.to_string();
        self.blocking(move |file| {
            file.modify(|c| {
                if !c.delete_card(&card_id) {
                    log::debug!("Card {} was already gone", card_id);
                }
                Ok(())
            })
        })
        .await
    }
}
