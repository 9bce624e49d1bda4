//! Selects which cards go into a review session.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{normalize, ProgressRecord, ReviewItem};

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Filters applied when building a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Only cards due today or earlier; `false` browses the whole collection.
    pub only_due: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            category: None,
            only_due: true,
        }
    }
}

impl Filters {
    pub fn all_cards() -> Self {
        Self {
            category: None,
            only_due: false,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// The category to match, or `None` when filtering is disabled.
    fn active_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
    }
}

/// Filter `records` for a session and order them by due date.
///
/// Records whose card no longer exists are dropped. Equal due dates keep
/// their input order.
pub fn select_due(records: Vec<ProgressRecord>, today: NaiveDate, filters: &Filters) -> Vec<ReviewItem> {
    let category = filters.active_category();

    let mut selected: Vec<ReviewItem> = records
        .into_iter()
        .filter_map(|record| match record.card {
            Some(card) => Some(ReviewItem {
                card,
                progress: record.progress,
            }),
            None => {
                log::warn!(
                    "Skipping progress {} for missing card {}",
                    record.progress.id,
                    record.progress.card_id
                );
                None
            }
        })
        .filter(|item| !filters.only_due || item.progress.is_due(today))
        .filter(|item| category.map_or(true, |c| item.card.in_category(c)))
        .collect();

    selected.sort_by_key(|item| item.progress.next_due_date);
    selected
}

/// Distinct categories in first-seen order, trimmed. Spelling variants that
/// differ only in case collapse into the first one seen.
pub fn categories(records: &[ProgressRecord]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter_map(|r| r.card.as_ref()?.category.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(normalize(c)))
        .map(str::to_string)
        .collect()
}
