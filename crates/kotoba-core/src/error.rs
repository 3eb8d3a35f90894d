//! Error types for `kotoba-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::tokenize::TokenizeError;

#[derive(Debug, Error)]
pub enum Error {
  /// Grades are quality scores from 0 (blackout) to 5 (perfect recall).
  /// Anything else is rejected before it can touch a word's schedule.
  #[error("grade out of range 0..=5: {0}")]
  GradeOutOfRange(u8),

  #[error("text is empty")]
  EmptyText,

  #[error("word not found: {0}")]
  WordNotFound(String),

  #[error("sentence not found: {0}")]
  SentenceNotFound(Uuid),

  #[error("tokenizer error: {0}")]
  Tokenize(#[from] TokenizeError),

  #[error("store error: {0}")]
  Store(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
