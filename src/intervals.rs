//! The fixed ladder of review intervals.

use crate::{Error, Result};

/// Canonical spacing ladder, in days.
pub const DEFAULT_INTERVALS: [u32; 9] = [1, 3, 7, 14, 30, 60, 90, 180, 365];

/// An ascending sequence of review intervals in days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTable {
    days: Vec<u32>,
}

impl IntervalTable {
    /// Build a table, checking that it is strictly ascending, positive and
    /// has at least three steps. With two, the mastery threshold would be the
    /// first rung and every failed card would count as mastered.
    pub fn new(days: Vec<u32>) -> Result<Self> {
        if days.len() < 3 {
            return Err(Error::IntervalTable(format!(
                "need at least three intervals, got {}",
                days.len()
            )));
        }
        if days[0] == 0 {
            return Err(Error::IntervalTable("intervals must be positive".to_string()));
        }
        if let Some(pair) = days.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::IntervalTable(format!(
                "intervals must be strictly ascending ({} is followed by {})",
                pair[0], pair[1]
            )));
        }
        Ok(Self { days })
    }

    /// Position of `interval` in the table, if it is one of its values.
    pub fn index_of(&self, interval: u32) -> Option<usize> {
        self.days.iter().position(|&d| d == interval)
    }

    /// Interval at `index`, clamped to the last entry.
    pub fn at(&self, index: usize) -> u32 {
        self.days[index.min(self.days.len() - 1)]
    }

    pub fn first(&self) -> u32 {
        self.days[0]
    }

    pub fn last(&self) -> u32 {
        self.days[self.days.len() - 1]
    }

    /// The second-highest interval; reaching it marks a card as mastered.
    pub fn mastery_threshold(&self) -> u32 {
        self.days[self.days.len() - 2]
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.days
    }
}

impl Default for IntervalTable {
    fn default() -> Self {
        Self {
            days: DEFAULT_INTERVALS.to_vec(),
        }
    }
}
