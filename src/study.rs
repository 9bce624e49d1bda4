//! Drives a [`ReviewSession`] against a [`ProgressStore`].

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rand::Rng;

use crate::guard;
use crate::models::{CardDraft, InteractionMode, ProgressUpdate, Quality, ReviewItem};
use crate::order;
use crate::scheduler::Scheduler;
use crate::selector::{self, Filters};
use crate::session::ReviewSession;
use crate::store::ProgressStore;
use crate::Result;

/// Result of adding cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    pub inserted: Vec<String>,
    pub duplicate_count: usize,
}

/// One user's study state: the current session plus the filters and mode it
/// was built with.
pub struct Study {
    store: Arc<dyn ProgressStore>,
    scheduler: Scheduler,
    user_id: String,
    mode: InteractionMode,
    filters: Filters,
    session: ReviewSession,
    clock: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl Study {
    pub fn new(store: Arc<dyn ProgressStore>, user_id: impl Into<String>, scheduler: Scheduler) -> Self {
        let mode = InteractionMode::default();
        Self {
            store,
            scheduler,
            user_id: user_id.into(),
            mode,
            filters: Filters::default(),
            session: ReviewSession::new(mode),
            clock: local_today,
        }
    }

    pub fn with_mode(mut self, mode: InteractionMode) -> Self {
        self.mode = mode;
        self.session = ReviewSession::new(mode);
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Override how "today" is determined.
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn session(&self) -> &ReviewSession {
        &self.session
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    // ══════════════════════════════════════════════════════════════════════
    // Loading
    // ══════════════════════════════════════════════════════════════════════

    /// Replace the session with a fresh one in selector order.
    pub async fn load(&mut self) -> Result<()> {
        let items = self.fetch_session().await?;
        let id = self.session.id();
        self.session.finish_loading(id, items)?;
        Ok(())
    }

    /// Like [`load`](Self::load), but presents the cards shuffled.
    pub async fn load_shuffled<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let items = self.fetch_session().await?;
        let id = self.session.id();
        self.session.finish_loading(id, order::shuffle(&items, rng))?;
        Ok(())
    }

    /// Change filters and reload. Any earlier shuffle is discarded.
    pub async fn set_filters(&mut self, filters: Filters) -> Result<()> {
        self.filters = filters;
        self.load().await
    }

    pub async fn set_mode(&mut self, mode: InteractionMode) -> Result<()> {
        self.mode = mode;
        self.load().await
    }

    /// Data changed elsewhere. The session keeps running; the caller decides
    /// when to reload.
    pub fn invalidate(&mut self) {
        self.session.mark_stale();
    }

    async fn fetch_session(&mut self) -> Result<Vec<ReviewItem>> {
        self.session = ReviewSession::new(self.mode);
        let id = self.session.id();

        match self.store.fetch_progress(&self.user_id).await {
            Ok(records) => Ok(selector::select_due(records, self.today(), &self.filters)),
            Err(e) => {
                log::warn!("Failed to load cards for {}: {}", self.user_id, e);
                self.session.fail_loading(id, e.to_string())?;
                Err(e.into())
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Answering
    // ══════════════════════════════════════════════════════════════════════

    pub fn reveal(&mut self) -> Result<()> {
        Ok(self.session.reveal()?)
    }

    pub fn set_answer(&mut self, text: &str) -> Result<()> {
        Ok(self.session.set_answer(text)?)
    }

    /// Check the typed answer. Returns whether it was right.
    pub fn check(&mut self) -> Result<bool> {
        Ok(self.session.check()?)
    }

    /// Grade the current card and persist the new schedule. The session only
    /// advances once the store has accepted the write.
    pub async fn grade(&mut self, quality: Quality) -> Result<()> {
        let today = self.today();
        let ticket = self.session.begin_grade(quality, &self.scheduler, today)?;

        let saved = self
            .store
            .update_progress(&ticket.progress_id, &ticket.update)
            .await;
        match &saved {
            Ok(()) => log::info!(
                "Graded card {} {}: next review in {} days ({})",
                ticket.card_id,
                ticket.quality.name(),
                ticket.update.interval_days,
                ticket.update.next_due_date
            ),
            Err(e) => log::warn!("Failed to save grade for card {}: {}", ticket.card_id, e),
        }

        self.session.complete_grade(ticket, saved)
    }

    /// Intervals each quality would give the current card.
    pub fn preview(&self) -> Option<[(Quality, u32); 3]> {
        self.session
            .current()
            .map(|item| self.scheduler.preview(item.progress.interval_days))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Navigation
    // ══════════════════════════════════════════════════════════════════════

    pub fn next(&mut self) -> Result<()> {
        Ok(self.session.next()?)
    }

    pub fn previous(&mut self) -> Result<()> {
        Ok(self.session.previous()?)
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        Ok(self.session.shuffle(rng)?)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Collection changes
    // ══════════════════════════════════════════════════════════════════════

    /// Validate and insert new cards, skipping fronts the user already has.
    /// New cards are due today at the first interval.
    pub async fn add_cards(&mut self, drafts: Vec<CardDraft>) -> Result<AddReport> {
        for draft in &drafts {
            draft.validate()?;
        }

        let records = self.store.fetch_progress(&self.user_id).await?;
        let existing = records
            .iter()
            .filter_map(|r| r.card.as_ref())
            .map(|c| c.front.as_str());
        let filtered = guard::filter_new(drafts, existing);

        if filtered.duplicate_count > 0 {
            log::info!("Skipping {} duplicate card(s)", filtered.duplicate_count);
        }
        if filtered.unique.is_empty() {
            return Ok(AddReport {
                inserted: Vec::new(),
                duplicate_count: filtered.duplicate_count,
            });
        }

        let initial = ProgressUpdate {
            interval_days: self.scheduler.table().first(),
            next_due_date: self.today(),
            mastered: false,
        };
        let inserted = self
            .store
            .insert_cards(&self.user_id, &filtered.unique, &initial)
            .await?;
        log::info!("Added {} card(s) for {}", inserted.len(), self.user_id);

        self.session.mark_stale();
        Ok(AddReport {
            inserted,
            duplicate_count: filtered.duplicate_count,
        })
    }

    /// Delete the user's progress for a card, then the card itself.
    ///
    /// If the second step fails the error says so and nothing is retried.
    pub async fn delete_card(&mut self, card_id: &str) -> Result<()> {
        if self.session.phase() == crate::session::Phase::Grading {
            return Err(crate::session::SessionError::GradeInFlight.into());
        }

        self.store.delete_progress(card_id, &self.user_id).await?;
        // Progress is gone, so the card can no longer appear in this session.
        self.session.remove_card(card_id)?;

        if let Err(source) = self.store.delete_card(card_id).await {
            log::warn!("Card {} left behind after its progress was deleted: {}", card_id, source);
            return Err(crate::Error::PartialDelete {
                card_id: card_id.to_string(),
                source,
            });
        }

        log::info!("Deleted card {}", card_id);
        Ok(())
    }

    /// Every card the user has, filtered but not limited to due ones unless
    /// `filters.only_due` says so. Does not touch the session.
    pub async fn browse(&self, filters: &Filters) -> Result<Vec<ReviewItem>> {
        let records = self.store.fetch_progress(&self.user_id).await?;
        Ok(selector::select_due(records, self.today(), filters))
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        let records = self.store.fetch_progress(&self.user_id).await?;
        Ok(selector::categories(&records))
    }
}
