//! Review session state machine.
//!
//! ```text
//! Loading ──► Empty
//!    │
//!    └──► Presenting ──reveal/check──► Revealed ──grade──► Grading
//!             ▲                                             │
//!             └──────────── saved, next card ◄──────────────┘
//! ```
//!
//! A grade is split in two: [`ReviewSession::begin_grade`] computes the new
//! schedule and hands out a [`GradeTicket`], and
//! [`ReviewSession::complete_grade`] applies the result once the store has
//! answered. Only a successful save removes the card; a failed one puts the
//! session back on the same revealed card.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use rand::Rng;
use thiserror::Error;

use crate::error::StorageError;
use crate::models::{normalize, InteractionMode, ProgressUpdate, Quality, ReviewItem};
use crate::order;
use crate::scheduler::Scheduler;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one session instance. Results tagged with an older identity
/// are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Empty,
    Presenting,
    Revealed,
    /// Revealed, with a grade waiting on the store.
    Grading,
}

/// Illegal transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session is still loading")]
    Loading,

    #[error("session has already loaded")]
    AlreadyLoaded,

    #[error("no cards left in this session")]
    Empty,

    #[error("the answer has not been revealed yet")]
    NotRevealed,

    #[error("the answer is already revealed")]
    AlreadyRevealed,

    #[error("a grade is already being saved")]
    GradeInFlight,

    #[error("no grade is being saved")]
    NoGradeInFlight,

    #[error("not available in {0} mode")]
    WrongMode(&'static str),

    #[error("result belongs to a session that has been replaced")]
    Stale,
}

/// A grade waiting to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeTicket {
    session: SessionId,
    pub progress_id: String,
    pub card_id: String,
    pub quality: Quality,
    pub update: ProgressUpdate,
}

#[derive(Debug)]
pub struct ReviewSession {
    id: SessionId,
    mode: InteractionMode,
    phase: Phase,
    items: Vec<ReviewItem>,
    cursor: usize,

    // Per-card state, reset whenever the current card changes
    answer: String,
    verdict: Option<bool>,

    load_error: Option<String>,
    stale: bool,
}

impl ReviewSession {
    pub fn new(mode: InteractionMode) -> Self {
        Self {
            id: SessionId::next(),
            mode,
            phase: Phase::Loading,
            items: Vec::new(),
            cursor: 0,
            answer: String::new(),
            verdict: None,
            load_error: None,
            stale: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Zero-based position of the current card.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&ReviewItem> {
        match self.phase {
            Phase::Presenting | Phase::Revealed | Phase::Grading => self.items.get(self.cursor),
            Phase::Loading | Phase::Empty => None,
        }
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self.phase, Phase::Revealed | Phase::Grading)
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Typing-mode result for the current card, once checked.
    pub fn verdict(&self) -> Option<bool> {
        self.verdict
    }

    /// Message from the last failed fetch; the session stays in `Loading`.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Whether the underlying data changed since this session was built.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }

    // ══════════════════════════════════════════════════════════════════════
    // Loading
    // ══════════════════════════════════════════════════════════════════════

    /// Install the selected and ordered cards.
    pub fn finish_loading(&mut self, id: SessionId, items: Vec<ReviewItem>) -> Result<(), SessionError> {
        self.check_identity(id)?;
        if self.phase != Phase::Loading {
            return Err(SessionError::AlreadyLoaded);
        }

        self.items = items;
        self.cursor = 0;
        self.load_error = None;
        self.reset_card_state();
        self.phase = if self.items.is_empty() {
            Phase::Empty
        } else {
            Phase::Presenting
        };
        log::debug!("Session {:?} loaded {} cards", self.id, self.items.len());
        Ok(())
    }

    /// Record a failed fetch. The session stays in `Loading` so the caller can
    /// retry.
    pub fn fail_loading(&mut self, id: SessionId, message: impl Into<String>) -> Result<(), SessionError> {
        self.check_identity(id)?;
        if self.phase != Phase::Loading {
            return Err(SessionError::AlreadyLoaded);
        }
        self.load_error = Some(message.into());
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Presenting
    // ══════════════════════════════════════════════════════════════════════

    /// Replace the typed answer for the current card.
    pub fn set_answer(&mut self, text: &str) -> Result<(), SessionError> {
        self.require_mode(InteractionMode::Typing)?;
        self.require_presenting()?;
        self.answer = text.to_string();
        Ok(())
    }

    /// Compare the typed answer against the back side and reveal it.
    pub fn check(&mut self) -> Result<bool, SessionError> {
        self.require_mode(InteractionMode::Typing)?;
        self.require_presenting()?;

        let correct = self
            .items
            .get(self.cursor)
            .map_or(false, |item| normalize(&self.answer) == normalize(&item.card.back));
        self.verdict = Some(correct);
        self.phase = Phase::Revealed;
        Ok(correct)
    }

    /// Show the back side without checking anything.
    pub fn reveal(&mut self) -> Result<(), SessionError> {
        self.require_mode(InteractionMode::Flip)?;
        self.require_presenting()?;
        self.phase = Phase::Revealed;
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Grading
    // ══════════════════════════════════════════════════════════════════════

    /// Grade the current card. The session refuses further grades and
    /// navigation until [`complete_grade`](Self::complete_grade) is called.
    pub fn begin_grade(
        &mut self,
        quality: Quality,
        scheduler: &Scheduler,
        today: NaiveDate,
    ) -> Result<GradeTicket, SessionError> {
        match self.phase {
            Phase::Revealed => {}
            Phase::Grading => return Err(SessionError::GradeInFlight),
            Phase::Presenting => return Err(SessionError::NotRevealed),
            Phase::Loading => return Err(SessionError::Loading),
            Phase::Empty => return Err(SessionError::Empty),
        }

        let item = self.items.get(self.cursor).ok_or(SessionError::Empty)?;
        let update = scheduler.grade(item.progress.interval_days, quality, today);
        let ticket = GradeTicket {
            session: self.id,
            progress_id: item.progress.id.clone(),
            card_id: item.card.id.clone(),
            quality,
            update,
        };

        self.phase = Phase::Grading;
        Ok(ticket)
    }

    /// Apply the store's answer to a grade.
    ///
    /// On success the card leaves the session and the next one is shown. On
    /// failure nothing moves and the store error is handed back.
    pub fn complete_grade(
        &mut self,
        ticket: GradeTicket,
        saved: Result<(), StorageError>,
    ) -> crate::Result<()> {
        self.check_identity(ticket.session)?;
        if self.phase != Phase::Grading {
            return Err(SessionError::NoGradeInFlight.into());
        }

        if let Err(e) = saved {
            log::debug!("Grade for card {} not saved, staying on it", ticket.card_id);
            self.phase = Phase::Revealed;
            return Err(e.into());
        }

        self.items.remove(self.cursor);
        self.reset_card_state();
        if self.items.is_empty() {
            self.cursor = 0;
            self.phase = Phase::Empty;
        } else {
            if self.cursor >= self.items.len() {
                self.cursor = 0;
            }
            self.phase = Phase::Presenting;
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Navigation
    // ══════════════════════════════════════════════════════════════════════

    pub fn next(&mut self) -> Result<(), SessionError> {
        self.require_navigable()?;
        self.cursor = (self.cursor + 1) % self.items.len();
        self.show_front();
        Ok(())
    }

    pub fn previous(&mut self) -> Result<(), SessionError> {
        self.require_navigable()?;
        self.cursor = (self.cursor + self.items.len() - 1) % self.items.len();
        self.show_front();
        Ok(())
    }

    /// Shuffle the remaining cards and start again from the first.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SessionError> {
        self.require_navigable()?;
        self.items = order::shuffle(&self.items, rng);
        self.cursor = 0;
        self.show_front();
        Ok(())
    }

    /// Drop a card that was deleted from the collection. Returns whether it
    /// was part of this session.
    pub fn remove_card(&mut self, card_id: &str) -> Result<bool, SessionError> {
        if self.phase == Phase::Grading {
            return Err(SessionError::GradeInFlight);
        }
        let Some(index) = self.items.iter().position(|i| i.card.id == card_id) else {
            return Ok(false);
        };

        self.items.remove(index);
        if self.items.is_empty() {
            self.cursor = 0;
            if self.phase != Phase::Loading {
                self.phase = Phase::Empty;
            }
            self.reset_card_state();
            return Ok(true);
        }

        if index < self.cursor {
            self.cursor -= 1;
        } else if index == self.cursor {
            if self.cursor >= self.items.len() {
                self.cursor = 0;
            }
            self.show_front();
        }
        Ok(true)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Helpers
    // ══════════════════════════════════════════════════════════════════════

    fn check_identity(&self, id: SessionId) -> Result<(), SessionError> {
        if id != self.id {
            log::debug!("Dropping result for {:?}, current session is {:?}", id, self.id);
            return Err(SessionError::Stale);
        }
        Ok(())
    }

    fn require_mode(&self, mode: InteractionMode) -> Result<(), SessionError> {
        if self.mode != mode {
            return Err(SessionError::WrongMode(self.mode.name()));
        }
        Ok(())
    }

    fn require_presenting(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Presenting => Ok(()),
            Phase::Revealed => Err(SessionError::AlreadyRevealed),
            Phase::Grading => Err(SessionError::GradeInFlight),
            Phase::Loading => Err(SessionError::Loading),
            Phase::Empty => Err(SessionError::Empty),
        }
    }

    fn require_navigable(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Presenting | Phase::Revealed => Ok(()),
            Phase::Grading => Err(SessionError::GradeInFlight),
            Phase::Loading => Err(SessionError::Loading),
            Phase::Empty => Err(SessionError::Empty),
        }
    }

    fn show_front(&mut self) {
        self.reset_card_state();
        self.phase = Phase::Presenting;
    }

    fn reset_card_state(&mut self) {
        self.answer.clear();
        self.verdict = None;
    }
}
