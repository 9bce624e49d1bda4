//! Data models for cards and per-user scheduling progress.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How well the learner recalled a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Fail, // Did not remember
    Pass, // Remembered
    Easy, // Remembered without effort
}

impl Quality {
    pub const ALL: [Quality; 3] = [Quality::Fail, Quality::Pass, Quality::Easy];

    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::Fail),
            '2' => Some(Self::Pass),
            '3' => Some(Self::Easy),
            _ => None,
        }
    }

    pub fn key(&self) -> char {
        match self {
            Self::Fail => '1',
            Self::Pass => '2',
            Self::Easy => '3',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fail => "Fail",
            Self::Pass => "Pass",
            Self::Easy => "Easy",
        }
    }
}

/// How the answer side of a card gets revealed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Explicit reveal, no correctness check.
    #[default]
    Flip,
    /// The learner types the answer and it is checked against the back side.
    Typing,
}

impl InteractionMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flip => "flip",
            Self::Typing => "typing",
        }
    }
}

/// Content of a single flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub front: String,
    pub back: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

impl Card {
    /// Build a card from a validated draft, assigning a fresh id.
    pub fn from_draft(draft: &CardDraft) -> Self {
        Self {
            id: new_id(),
            front: draft.front.trim().to_string(),
            back: draft.back.trim().to_string(),
            category: non_blank(draft.category.as_deref()),
            target_language: non_blank(draft.target_language.as_deref()),
            example: non_blank(draft.example.as_deref()),
        }
    }

    /// Case-insensitive, whitespace-trimmed category comparison.
    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .map_or(false, |c| normalize(c) == normalize(category))
    }
}

/// A user's scheduling state for one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub id: String,
    pub user_id: String,
    pub card_id: String,
    pub interval_days: u32,
    pub next_due_date: NaiveDate,
    #[serde(default)]
    pub mastered: bool,
}

impl Progress {
    pub fn new(user_id: &str, card_id: &str, initial: &ProgressUpdate) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.to_string(),
            card_id: card_id.to_string(),
            interval_days: initial.interval_days,
            next_due_date: initial.next_due_date,
            mastered: initial.mastered,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_due_date <= today
    }

    /// Overwrite the scheduling fields wholesale.
    pub fn apply(&mut self, update: &ProgressUpdate) {
        self.interval_days = update.interval_days;
        self.next_due_date = update.next_due_date;
        self.mastered = update.mastered;
    }
}

/// The scheduling fields written back after a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub interval_days: u32,
    pub next_due_date: NaiveDate,
    pub mastered: bool,
}

/// A progress row joined with its card. `card` is `None` when the card was
/// deleted underneath the progress row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub progress: Progress,
    pub card: Option<Card>,
}

/// A card ready to be presented in a review session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub card: Card,
    pub progress: Progress,
}

/// A prospective card, before it has an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDraft {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
}

impl CardDraft {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Both sides must contain something other than whitespace.
    pub fn validate(&self) -> crate::Result<()> {
        if self.front.trim().is_empty() {
            return Err(crate::Error::Validation("front side is empty".to_string()));
        }
        if self.back.trim().is_empty() {
            return Err(crate::Error::Validation(format!(
                "back side of '{}' is empty",
                self.front.trim()
            )));
        }
        Ok(())
    }
}

/// Normalized form used for every case-insensitive text comparison.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
