//! Error types for the review core.

use thiserror::Error;

use crate::session::SessionError;

/// Failures reported by a [`ProgressStore`](crate::store::ProgressStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store could not be reached or read.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("authentication required")]
    AuthRequired,

    /// A write was rejected or could not be completed.
    #[error("storage write failed: {0}")]
    Write(String),
}

#[derive(Error, Debug)]
pub enum Error {
    /// Card content rejected before any storage call.
    #[error("invalid card: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The progress row was removed but the card itself was not.
    #[error("card {card_id} only partially deleted, progress removed but card remains: {source}")]
    PartialDelete {
        card_id: String,
        #[source]
        source: StorageError,
    },

    #[error("invalid interval table: {0}")]
    IntervalTable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
