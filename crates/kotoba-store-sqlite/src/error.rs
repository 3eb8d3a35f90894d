//! Error type for `kotoba-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("word not found: {0}")]
  WordNotFound(uuid::Uuid),

  #[error("sentence not found: {0}")]
  SentenceNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
