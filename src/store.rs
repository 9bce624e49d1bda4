//! The storage boundary and an in-memory implementation of it.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::models::{Card, CardDraft, Progress, ProgressRecord, ProgressUpdate};

/// Everything the review core needs from persistence.
///
/// Implementations return all of a user's rows; session filtering happens in
/// [`select_due`](crate::selector::select_due).
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// All progress rows for `user_id`, joined with their cards.
    async fn fetch_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StorageError>;

    /// Overwrite the scheduling fields of one progress row.
    async fn update_progress(&self, progress_id: &str, update: &ProgressUpdate) -> Result<(), StorageError>;

    /// Create a card and a progress row for `user_id` per draft. Returns the
    /// new card ids in draft order.
    async fn insert_cards(
        &self,
        user_id: &str,
        drafts: &[CardDraft],
        initial: &ProgressUpdate,
    ) -> Result<Vec<String>, StorageError>;

    async fn delete_progress(&self, card_id: &str, user_id: &str) -> Result<(), StorageError>;

    async fn delete_card(&self, card_id: &str) -> Result<(), StorageError>;
}

/// Cards and progress rows as one serializable document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub progress: Vec<Progress>,
}

impl Collection {
    pub fn records_for(&self, user_id: &str) -> Vec<ProgressRecord> {
        self.progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| ProgressRecord {
                progress: p.clone(),
                card: self.cards.iter().find(|c| c.id == p.card_id).cloned(),
            })
            .collect()
    }

    pub fn update_progress(&mut self, progress_id: &str, update: &ProgressUpdate) -> Result<(), StorageError> {
        let progress = self
            .progress
            .iter_mut()
            .find(|p| p.id == progress_id)
            .ok_or_else(|| StorageError::Write(format!("no progress row {}", progress_id)))?;
        progress.apply(update);
        Ok(())
    }

    pub fn insert_cards(&mut self, user_id: &str, drafts: &[CardDraft], initial: &ProgressUpdate) -> Vec<String> {
        drafts
            .iter()
            .map(|draft| {
                let card = Card::from_draft(draft);
                let id = card.id.clone();
                self.progress.push(Progress::new(user_id, &id, initial));
                self.cards.push(card);
                id
            })
            .collect()
    }

    /// Returns `false` if there was nothing to delete.
    pub fn delete_progress(&mut self, card_id: &str, user_id: &str) -> bool {
        let before = self.progress.len();
        self.progress
            .retain(|p| !(p.card_id == card_id && p.user_id == user_id));
        self.progress.len() != before
    }

    pub fn delete_card(&mut self, card_id: &str) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.id != card_id);
        self.cards.len() != before
    }
}

/// A process-local store, used by tests and as a scratch backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collection: Mutex<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_collection(collection: Collection) -> Self {
        Self {
            collection: Mutex::new(collection),
        }
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> Collection {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Collection> {
        // Every mutation is a single Vec operation, so a poisoned collection is still whole.
        self.collection.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn fetch_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StorageError> {
        Ok(self.lock().records_for(user_id))
    }

    async fn update_progress(&self, progress_id: &str, update: &ProgressUpdate) -> Result<(), StorageError> {
        self.lock().update_progress(progress_id, update)
    }

    async fn insert_cards(
        &self,
        user_id: &str,
        drafts: &[CardDraft],
        initial: &ProgressUpdate,
    ) -> Result<Vec<String>, StorageError> {
        Ok(self.lock().insert_cards(user_id, drafts, initial))
    }

    async fn delete_progress(&self, card_id: &str, user_id: &str) -> Result<(), StorageError> {
        self.lock().delete_progress(card_id, user_id);
        Ok(())
    }

    async fn delete_card(&self, card_id: &str) -> Result<(), StorageError> {
        self.lock().delete_card(card_id);
        Ok(())
    }
}
