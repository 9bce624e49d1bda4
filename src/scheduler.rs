//! Interval-ladder scheduling.
//!
//! A card climbs the [`IntervalTable`] one rung per `Pass` and two rungs per
//! `Easy`, and drops back to the bottom rung on `Fail`. The top rung is sticky.

use chrono::{Days, NaiveDate};

use crate::intervals::IntervalTable;
use crate::models::{ProgressUpdate, Quality};

/// Computes the next interval and due date for a graded card.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    table: IntervalTable,
}

impl Scheduler {
    pub fn new(table: IntervalTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &IntervalTable {
        &self.table
    }

    /// Grade a card currently spaced `current_interval` days apart.
    ///
    /// Intervals that are not in the table (seeded from elsewhere, including
    /// zero) are treated as if they sat on the rung below the target, so
    /// `Pass` lands on the second rung and `Easy` on the third.
    pub fn grade(&self, current_interval: u32, quality: Quality, today: NaiveDate) -> ProgressUpdate {
        let interval_days = self.next_interval(current_interval, quality);

        ProgressUpdate {
            interval_days,
            next_due_date: today + Days::new(u64::from(interval_days)),
            mastered: interval_days >= self.table.mastery_threshold(),
        }
    }

    /// Interval each quality would produce, for display next to the prompts.
    pub fn preview(&self, current_interval: u32) -> [(Quality, u32); 3] {
        Quality::ALL.map(|q| (q, self.next_interval(current_interval, q)))
    }

    fn next_interval(&self, current_interval: u32, quality: Quality) -> u32 {
        let steps = match quality {
            Quality::Fail => return self.table.first(),
            Quality::Pass => 1,
            Quality::Easy => 2,
        };

        let next_index = match self.table.index_of(current_interval) {
            Some(index) => index + steps,
            None => steps,
        };
        self.table.at(next_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[test]
    fn seven_days_example() {
        let scheduler = Scheduler::default();

        assert_eq!(scheduler.grade(7, Quality::Pass, today()).interval_days, 14);
        assert_eq!(scheduler.grade(7, Quality::Easy, today()).interval_days, 30);
        assert_eq!(scheduler.grade(7, Quality::Fail, today()).interval_days, 1);
    }

    #[test]
    fn fail_always_resets_to_first_rung() {
        let scheduler = Scheduler::default();
        for &interval in scheduler.table().as_slice() {
            let update = scheduler.grade(interval, Quality::Fail, today());
            assert_eq!(update.interval_days, 1);
            assert!(!update.mastered);
        }
    }

    #[test]
    fn pass_never_moves_backwards() {
        let scheduler = Scheduler::default();
        let top = scheduler.table().last();
        for &interval in scheduler.table().as_slice() {
            let next = scheduler.grade(interval, Quality::Pass, today()).interval_days;
            if interval == top {
                assert_eq!(next, top);
            } else {
                assert!(next > interval, "{} -> {}", interval, next);
            }
        }
    }

    #[test]
    fn easy_rewards_at_least_as_much_as_pass() {
        let scheduler = Scheduler::default();
        for &interval in scheduler.table().as_slice() {
            let pass = scheduler.grade(interval, Quality::Pass, today()).interval_days;
            let easy = scheduler.grade(interval, Quality::Easy, today()).interval_days;
            assert!(easy >= pass, "{}: easy {} < pass {}", interval, easy, pass);
        }
    }

    #[test]
    fn saturates_at_the_top() {
        let scheduler = Scheduler::default();

        assert_eq!(scheduler.grade(180, Quality::Easy, today()).interval_days, 365);
        assert_eq!(scheduler.grade(365, Quality::Pass, today()).interval_days, 365);
        assert_eq!(scheduler.grade(365, Quality::Easy, today()).interval_days, 365);
    }

    #[test]
    fn unknown_interval_starts_from_later_rungs() {
        let scheduler = Scheduler::default();

        assert_eq!(scheduler.grade(5, Quality::Pass, today()).interval_days, 3);
        assert_eq!(scheduler.grade(5, Quality::Easy, today()).interval_days, 7);
        assert_eq!(scheduler.grade(5, Quality::Fail, today()).interval_days, 1);
    }

    #[test]
    fn due_date_is_today_plus_interval() {
        let scheduler = Scheduler::default();
        let update = scheduler.grade(14, Quality::Pass, today());

        assert_eq!(update.interval_days, 30);
        assert_eq!(update.next_due_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn mastery_starts_at_second_to_last_rung() {
        let scheduler = Scheduler::default();

        assert!(!scheduler.grade(60, Quality::Pass, today()).mastered);
        assert!(scheduler.grade(90, Quality::Pass, today()).mastered);
        assert!(scheduler.grade(60, Quality::Easy, today()).mastered);
        assert!(scheduler.grade(365, Quality::Pass, today()).mastered);
    }

    #[test]
    fn preview_lists_every_quality() {
        let scheduler = Scheduler::default();
        assert_eq!(
            scheduler.preview(3),
            [(Quality::Fail, 1), (Quality::Pass, 7), (Quality::Easy, 14)]
        );
    }

    #[test]
    fn custom_table() {
        let scheduler = Scheduler::new(IntervalTable::new(vec![1, 2, 4]).unwrap());
        let update = scheduler.grade(1, Quality::Pass, today());

        assert_eq!(update.interval_days, 2);
        assert!(update.mastered);
    }

    #[test]
    fn zero_interval_counts_as_unknown() {
        let scheduler = Scheduler::default();

        assert_eq!(scheduler.grade(0, Quality::Pass, today()).interval_days, 3);
        assert_eq!(scheduler.grade(0, Quality::Easy, today()).interval_days, 7);
        assert_eq!(scheduler.grade(0, Quality::Fail, today()).interval_days, 1);
        assert_eq!(
            scheduler.preview(0),
            [(Quality::Fail, 1), (Quality::Pass, 3), (Quality::Easy, 7)]
        );
    }

    #[test]
    fn fail_is_never_mastered_on_the_smallest_table() {
        let scheduler = Scheduler::new(IntervalTable::new(vec![1, 3, 7]).unwrap());

        let failed = scheduler.grade(7, Quality::Fail, today());
        assert_eq!(failed.interval_days, 1);
        assert!(!failed.mastered);
        assert!(scheduler.grade(1, Quality::Pass, today()).mastered);
    }
}
