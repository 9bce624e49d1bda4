//! Duplicate detection for new cards.
//!
//! Only the front side identifies a card: "Dog" and " dog" are the same word
//! no matter what translation they carry. The check runs before insertion and
//! is best-effort; two writers adding the same word at once can both pass it.

use std::collections::HashSet;

use crate::models::{normalize, CardDraft};

/// Outcome of [`filter_new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filtered {
    pub unique: Vec<CardDraft>,
    pub duplicate_count: usize,
}

/// Drop candidates whose front already exists, or repeats an earlier
/// candidate in the same batch. Order of the survivors is preserved.
pub fn filter_new<'a, I>(candidates: Vec<CardDraft>, existing_fronts: I) -> Filtered
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<String> = existing_fronts.into_iter().map(normalize).collect();
    let mut result = Filtered::default();

    for candidate in candidates {
        if seen.insert(normalize(&candidate.front)) {
            result.unique.push(candidate);
        } else {
            result.duplicate_count += 1;
        }
    }

    result
}
