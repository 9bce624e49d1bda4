//! Spaced repetition core for vocabulary flashcards.
//!
//! Cards climb a fixed ladder of review intervals as they are recalled and
//! fall back to the bottom rung when forgotten. A [`Study`] loads the cards
//! due today into a [`ReviewSession`] and writes every grade back through a
//! [`ProgressStore`].

pub mod config;
pub mod error;
pub mod guard;
pub mod intervals;
pub mod models;
pub mod order;
pub mod scheduler;
pub mod selector;
pub mod session;
pub mod storage;
pub mod store;
pub mod study;

pub use error::{Error, Result, StorageError};
pub use intervals::IntervalTable;
pub use models::{Card, CardDraft, InteractionMode, Progress, ProgressRecord, ProgressUpdate, Quality, ReviewItem};
pub use scheduler::Scheduler;
pub use selector::Filters;
pub use session::{Phase, ReviewSession, SessionError};
pub use storage::JsonStore;
pub use store::{MemoryStore, ProgressStore};
pub use study::{AddReport, Study};
