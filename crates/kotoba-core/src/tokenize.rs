//! The tokenizer collaborator contract.
//!
//! Tokenization is performed by an external morphological analyzer. This
//! module only defines the seam: `kotoba-tokenize` provides the Juman++
//! subprocess implementation, and tests substitute trivial fakes.

use std::future::Future;

use thiserror::Error;

/// Failure modes of a tokenizer backend. Any of these aborts an ingestion
/// before it writes anything.
#[derive(Debug, Error)]
pub enum TokenizeError {
  /// The analyzer could not be started, or exited abnormally.
  #[error("tokenizer unavailable: {0}")]
  Unavailable(String),

  /// The analyzer did not answer within the configured deadline.
  #[error("tokenizer timed out after {0}s")]
  TimedOut(u64),

  /// The analyzer produced output we cannot interpret.
  #[error("malformed tokenizer output: {0}")]
  Malformed(String),
}

/// Splits raw sentence text into an ordered sequence of word tokens in
/// dictionary form. Implementations must not deduplicate — ordering and
/// multiplicity are the pipeline's concern.
pub trait Tokenizer: Send + Sync {
  fn tokenize<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Vec<String>, TokenizeError>> + Send + 'a;
}
