//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, which keeps lexicographic and
//! chronological order in agreement; the due-word queries compare them as
//! text. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use kotoba_core::{
  sentence::Sentence,
  word::{SchedulingState, Word},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawWord::from_row`]'s positional reads.
pub const WORD_COLUMNS: &str = "word_id, text, occurrences, rank, added_at, \
   reviewed, easiness, repetition, interval_days, review_secs, \
   next_review_at, first_reviewed_at";

/// [`WORD_COLUMNS`] qualified for joins against `words w`.
pub const WORD_COLUMNS_W: &str = "w.word_id, w.text, w.occurrences, w.rank, \
   w.added_at, w.reviewed, w.easiness, w.repetition, w.interval_days, \
   w.review_secs, w.next_review_at, w.first_reviewed_at";

/// Raw values read directly from a `words` row.
pub struct RawWord {
  pub word_id:           String,
  pub text:              String,
  pub occurrences:       i64,
  pub rank:              Option<i64>,
  pub added_at:          String,
  pub reviewed:          bool,
  pub easiness:          f64,
  pub repetition:        i64,
  pub interval_days:     i64,
  pub review_secs:       i64,
  pub next_review_at:    Option<String>,
  pub first_reviewed_at: Option<String>,
}

impl RawWord {
  /// Reads the columns of [`WORD_COLUMNS`], in order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      word_id:           row.get(0)?,
      text:              row.get(1)?,
      occurrences:       row.get(2)?,
      rank:              row.get(3)?,
      added_at:          row.get(4)?,
      reviewed:          row.get(5)?,
      easiness:          row.get(6)?,
      repetition:        row.get(7)?,
      interval_days:     row.get(8)?,
      review_secs:       row.get(9)?,
      next_review_at:    row.get(10)?,
      first_reviewed_at: row.get(11)?,
    })
  }

  pub fn scheduling_state(&self) -> Result<SchedulingState> {
    Ok(SchedulingState {
      reviewed:          self.reviewed,
      easiness:          self.easiness,
      repetition:        self.repetition as u32,
      interval_days:     self.interval_days as u32,
      review_secs:       self.review_secs,
      next_review_at:    self
        .next_review_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      first_reviewed_at: self
        .first_reviewed_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
    })
  }

  pub fn into_word(self) -> Result<Word> {
    let scheduling = self.scheduling_state()?;
    Ok(Word {
      word_id: decode_uuid(&self.word_id)?,
      text: self.text,
      occurrences: self.occurrences as u32,
      rank: self.rank.map(|r| r as u32),
      added_at: decode_dt(&self.added_at)?,
      scheduling,
    })
  }
}

/// Raw values read directly from a `sentences` row.
pub struct RawSentence {
  pub sentence_id: String,
  pub text:        String,
  pub source:      Option<String>,
  pub added_at:    String,
}

impl RawSentence {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      sentence_id: row.get(0)?,
      text:        row.get(1)?,
      source:      row.get(2)?,
      added_at:    row.get(3)?,
    })
  }

  pub fn into_sentence(self) -> Result<Sentence> {
    Ok(Sentence {
      sentence_id: decode_uuid(&self.sentence_id)?,
      text:        self.text,
      source:      self.source,
      added_at:    decode_dt(&self.added_at)?,
    })
  }
}
