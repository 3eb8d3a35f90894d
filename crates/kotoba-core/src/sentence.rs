//! Sentence — example text that words are drawn from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::word::{NewWord, Word};

/// An example sentence. Unique by text; deleting one removes its word links
/// but never the words themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
  pub sentence_id: Uuid,
  pub text:        String,
  /// Where the sentence came from (a book title, "manual", ...).
  pub source:      Option<String>,
  pub added_at:    DateTime<Utc>,
}

/// Input to [`crate::store::VocabStore::link_sentence`]: sentence text plus
/// its distinct tokens, built by [`crate::ingest::Ingester`].
#[derive(Debug, Clone)]
pub struct NewSentence {
  pub text:   String,
  pub source: Option<String>,
  pub words:  Vec<NewWord>,
}

/// A sentence selected for study, with its word breakdown. Words that are
/// neither due nor new appear in neither list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySentence {
  pub sentence:  Sentence,
  /// Words whose next review falls within the study horizon.
  pub due_words: Vec<Word>,
  /// Words that have never been reviewed.
  pub new_words: Vec<Word>,
}
