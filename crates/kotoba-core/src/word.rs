//! Word — the unit of vocabulary being learned.
//!
//! A word row carries two kinds of state: corpus statistics maintained by the
//! ingestion pipeline (occurrence count, frequency rank) and the scheduling
//! fields owned by [`crate::schedule::next_review`]. The two never interact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Scheduling state ────────────────────────────────────────────────────────

/// The per-word review schedule. Produced only by
/// [`crate::schedule::next_review`]; stores persist it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingState {
  /// `false` until the word has been reviewed at least once.
  pub reviewed:          bool,
  /// SM-2 easiness factor. Stored as `0.0` until the first review.
  pub easiness:          f64,
  /// Consecutive successful-recall streak length.
  pub repetition:        u32,
  /// The interval that produced `next_review_at`, in days.
  pub interval_days:     u32,
  /// Total seconds elapsed between reviews. Reporting only; never an input
  /// to scheduling.
  pub review_secs:       i64,
  pub next_review_at:    Option<DateTime<Utc>>,
  /// Set exactly once, on the first review.
  pub first_reviewed_at: Option<DateTime<Utc>>,
}

impl SchedulingState {
  /// The state of a word that has never been reviewed.
  pub fn unreviewed() -> Self {
    Self {
      reviewed:          false,
      easiness:          0.0,
      repetition:        0,
      interval_days:     0,
      review_secs:       0,
      next_review_at:    None,
      first_reviewed_at: None,
    }
  }

  /// Whether the word's next review falls at or before `horizon`.
  /// Never true for an unreviewed word.
  pub fn is_due(&self, horizon: DateTime<Utc>) -> bool {
    self.next_review_at.is_some_and(|at| at <= horizon)
  }

  /// New or due at `horizon` — eligible for review.
  pub fn needs_review(&self, horizon: DateTime<Utc>) -> bool {
    !self.reviewed || self.is_due(horizon)
  }
}

// ─── Word ────────────────────────────────────────────────────────────────────

/// A vocabulary word (dictionary form) with its corpus statistics and review
/// schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
  pub word_id:     Uuid,
  /// Dictionary form as produced by the tokenizer. Unique across the corpus.
  pub text:        String,
  /// Number of distinct sentences this word appears in.
  pub occurrences: u32,
  /// Zero-based rank on the frequency list; `None` when unlisted.
  pub rank:        Option<u32>,
  pub added_at:    DateTime<Utc>,
  pub scheduling:  SchedulingState,
}

impl Word {
  /// A word that has never been reviewed.
  pub fn is_new(&self) -> bool { !self.scheduling.reviewed }

  pub fn needs_review(&self, horizon: DateTime<Utc>) -> bool {
    self.scheduling.needs_review(horizon)
  }
}

// ─── NewWord ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::VocabStore::link_sentence`]: one distinct token
/// with its frequency rank attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWord {
  pub text: String,
  pub rank: Option<u32>,
}
