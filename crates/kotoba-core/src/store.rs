//! The `VocabStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `kotoba-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend.
//! Every multi-row mutation is atomic: it either commits completely or leaves
//! the store untouched.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  schedule::Grade,
  sentence::{NewSentence, Sentence, StudySentence},
  word::Word,
};

// ─── Receipts & aggregates ───────────────────────────────────────────────────

/// What [`VocabStore::link_sentence`] did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReceipt {
  pub sentence_id: Uuid,
  /// Ids of the sentence's distinct words, in token order.
  pub word_ids:    Vec<Uuid>,
  /// `false` when the sentence text was already in the store.
  pub created:     bool,
}

/// Input to [`VocabStore::relink_sentences`]: one sentence's freshly
/// recomputed tokens.
#[derive(Debug, Clone)]
pub struct SentenceRelink {
  pub sentence_id: Uuid,
  pub words:       Vec<crate::word::NewWord>,
}

/// Corpus-level counters for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabStats {
  pub words:          u64,
  pub sentences:      u64,
  pub edges:          u64,
  pub reviewed_words: u64,
  pub new_words:      u64,
  /// Reviewed words due at the horizon the caller passed.
  pub due_words:      u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a kotoba storage backend.
///
/// Word and sentence text uniqueness is the backend's responsibility,
/// enforced with atomic upserts — callers never check-then-insert.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait VocabStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Words ───────────────────────────────────────────────────────────────

  /// Retrieve a word by id. Returns `None` if not found.
  fn get_word(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Word>, Self::Error>> + Send + '_;

  /// Retrieve a word by its exact text. Returns `None` if not found.
  fn get_word_by_text<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Option<Word>, Self::Error>> + Send + 'a;

  /// Delete a word; its sentence links go with it. Sentences are untouched.
  fn delete_word(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Words with `next_review_at` at or before `now`, ordered by
  /// `next_review_at` ascending (word id breaks ties). Unreviewed words
  /// never appear.
  fn due_words(
    &self,
    now: DateTime<Utc>,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Word>, Self::Error>> + Send + '_;

  /// Apply one review to one word: read its state, run the scheduler, and
  /// persist the result, all atomically. Returns the updated word.
  fn record_review(
    &self,
    word_id: Uuid,
    grade: Grade,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Word, Self::Error>> + Send + '_;

  // ── Sentences ───────────────────────────────────────────────────────────

  /// Retrieve a sentence by id. Returns `None` if not found.
  fn get_sentence(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Sentence>, Self::Error>> + Send + '_;

  /// All sentences, oldest first.
  fn list_sentences(
    &self,
  ) -> impl Future<Output = Result<Vec<Sentence>, Self::Error>> + Send + '_;

  /// Delete a sentence; its word links go with it. Words and their
  /// occurrence counts are untouched.
  fn delete_sentence(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Index ───────────────────────────────────────────────────────────────

  /// Register one sentence and its words in a single transaction.
  ///
  /// A new sentence upsert-increments every word's occurrence count. A
  /// sentence whose text is already stored leaves existing counts untouched
  /// but still creates any missing words and word links, so re-ingesting is
  /// idempotent.
  fn link_sentence(
    &self,
    input: NewSentence,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<IngestReceipt, Self::Error>> + Send + '_;

  /// The words linked to a sentence. Empty for an unknown sentence id.
  fn words_in_sentence(
    &self,
    sentence_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Word>, Self::Error>> + Send + '_;

  /// The sentences a word appears in. Empty for an unknown word id.
  fn sentences_with_word(
    &self,
    word_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Sentence>, Self::Error>> + Send + '_;

  /// Replace the whole word-sentence index in a single transaction: every
  /// link is dropped, every occurrence count reset, and the given relinks
  /// applied. Scheduling state survives untouched.
  fn relink_sentences(
    &self,
    relinks: Vec<SentenceRelink>,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Study ───────────────────────────────────────────────────────────────

  /// Pick the next sentence to study. Prefers a sentence with no new words
  /// and the most due words; falls back to the sentence introducing the
  /// fewest new words. `None` when the corpus has nothing to offer.
  fn next_study_sentence(
    &self,
    due_before: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<StudySentence>, Self::Error>> + Send + '_;

  /// Apply one grade to every word of the sentence that is new or due at
  /// `due_before`, atomically. Words scheduled further out are skipped.
  /// Returns the words actually updated.
  fn review_sentence(
    &self,
    sentence_id: Uuid,
    grade: Grade,
    due_before: DateTime<Utc>,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Word>, Self::Error>> + Send + '_;

  /// Corpus counters, with due words measured against `due_before`.
  fn stats(
    &self,
    due_before: DateTime<Utc>,
  ) -> impl Future<Output = Result<VocabStats, Self::Error>> + Send + '_;
}
