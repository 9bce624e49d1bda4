#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use wordcards::store::Collection;
use wordcards::{
    Card, CardDraft, MemoryStore, Progress, ProgressRecord, ProgressStore, ProgressUpdate, Scheduler,
    StorageError, Study,
};

pub const USER: &str = "u1";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 15).unwrap()
}

pub fn days_from_today(offset: i64) -> NaiveDate {
    if offset >= 0 {
        today() + Days::new(offset as u64)
    } else {
        today() - Days::new(offset.unsigned_abs())
    }
}

pub fn card(id: &str, front: &str, back: &str, category: Option<&str>) -> Card {
    Card {
        id: id.to_string(),
        front: front.to_string(),
        back: back.to_string(),
        category: category.map(str::to_string),
        target_language: None,
        example: None,
    }
}

pub fn progress(card_id: &str, interval_days: u32, due_offset: i64) -> Progress {
    Progress {
        id: format!("p-{}", card_id),
        user_id: USER.to_string(),
        card_id: card_id.to_string(),
        interval_days,
        next_due_date: days_from_today(due_offset),
        mastered: false,
    }
}

/// (card id, front, back, interval, due offset in days)
pub fn collection(rows: &[(&str, &str, &str, u32, i64)]) -> Collection {
    Collection {
        cards: rows
            .iter()
            .map(|(id, front, back, _, _)| card(id, front, back, None))
            .collect(),
        progress: rows
            .iter()
            .map(|(id, _, _, interval, due)| progress(id, *interval, *due))
            .collect(),
    }
}

pub fn study_over(store: Arc<dyn ProgressStore>) -> Study {
    Study::new(store, USER, Scheduler::default()).with_clock(today)
}

/// Wraps a [`MemoryStore`] and fails chosen operations on demand.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_fetch: AtomicBool,
    pub require_auth: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_delete_progress: AtomicBool,
    pub fail_delete_card: AtomicBool,
}

impl FlakyStore {
    pub fn with_collection(collection: Collection) -> Self {
        Self {
            inner: MemoryStore::from_collection(collection),
            ..Default::default()
        }
    }

    pub fn set(flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }
}

fn tripped(flag: &AtomicBool) -> bool {
    flag.load(Ordering::SeqCst)
}

#[async_trait]
impl ProgressStore for FlakyStore {
    async fn fetch_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, StorageError> {
        if tripped(&self.require_auth) {
            return Err(StorageError::AuthRequired);
        }
        if tripped(&self.fail_fetch) {
            return Err(StorageError::Unavailable("connection refused".to_string()));
        }
        self.inner.fetch_progress(user_id).await
    }

    async fn update_progress(&self, progress_id: &str, update: &ProgressUpdate) -> Result<(), StorageError> {
        if tripped(&self.fail_update) {
            return Err(StorageError::Write("update rejected".to_string()));
        }
        self.inner.update_progress(progress_id, update).await
    }

    async fn insert_cards(
        &self,
        user_id: &str,
        drafts: &[CardDraft],
        initial: &ProgressUpdate,
    ) -> Result<Vec<String>, StorageError> {
        self.inner.insert_cards(user_id, drafts, initial).await
    }

    async fn delete_progress(&self, card_id: &str, user_id: &str) -> Result<(), StorageError> {
        if tripped(&self.fail_delete_progress) {
            return Err(StorageError::Write("delete rejected".to_string()));
        }
        self.inner.delete_progress(card_id, user_id).await
    }

    async fn delete_card(&self, card_id: &str) -> Result<(), StorageError> {
        if tripped(&self.fail_delete_card) {
            return Err(StorageError::Write("delete rejected".to_string()));
        }
        self.inner.delete_card(card_id).await
    }
}
