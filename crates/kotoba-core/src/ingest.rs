//! The ingestion pipeline: raw text in, consistent corpus out.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
  Error, Result,
  rank::FrequencyList,
  sentence::NewSentence,
  store::{IngestReceipt, SentenceRelink, VocabStore},
  tokenize::Tokenizer,
  word::NewWord,
};

/// Composes a [`Tokenizer`] and a [`VocabStore`] into the write path for new
/// text. Tokenization happens before any transaction opens, so an analyzer
/// failure leaves the store untouched.
pub struct Ingester<S, T> {
  store:     S,
  tokenizer: T,
  ranks:     FrequencyList,
}

impl<S: VocabStore, T: Tokenizer> Ingester<S, T> {
  pub fn new(store: S, tokenizer: T, ranks: FrequencyList) -> Self {
    Self { store, tokenizer, ranks }
  }

  pub fn store(&self) -> &S { &self.store }

  /// Tokenize `text` and register it as one sentence.
  ///
  /// Rejects empty or whitespace-only text before any side effect. Repeated
  /// tokens within the sentence count once.
  pub async fn ingest_sentence(
    &self,
    text: &str,
    source: Option<&str>,
    now: DateTime<Utc>,
  ) -> Result<IngestReceipt> {
    let text = text.trim();
    if text.is_empty() {
      return Err(Error::EmptyText);
    }

    let tokens = self.tokenizer.tokenize(text).await?;
    let words = self.distinct_words(tokens);
    debug!(words = words.len(), "tokenized sentence");

    let receipt = self
      .store
      .link_sentence(
        NewSentence {
          text:   text.to_owned(),
          source: source.map(str::to_owned),
          words,
        },
        now,
      )
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    info!(
      sentence_id = %receipt.sentence_id,
      words = receipt.word_ids.len(),
      created = receipt.created,
      "ingested sentence"
    );
    Ok(receipt)
  }

  /// Re-derive every sentence's tokens with the current tokenizer, then
  /// swap the whole index in one transaction. Scheduling state survives.
  /// Returns the number of sentences processed.
  pub async fn retokenize(&self, now: DateTime<Utc>) -> Result<usize> {
    let sentences = self
      .store
      .list_sentences()
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    let mut relinks = Vec::with_capacity(sentences.len());
    for sentence in &sentences {
      let tokens = self.tokenizer.tokenize(&sentence.text).await?;
      relinks.push(SentenceRelink {
        sentence_id: sentence.sentence_id,
        words:       self.distinct_words(tokens),
      });
    }

    self
      .store
      .relink_sentences(relinks, now)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    info!(sentences = sentences.len(), "retokenized corpus");
    Ok(sentences.len())
  }

  /// First-seen order, one entry per distinct token, ranks attached.
  /// Empty tokens are dropped; word text is never empty.
  fn distinct_words(&self, tokens: Vec<String>) -> Vec<NewWord> {
    let mut seen = HashSet::new();
    let mut words = Vec::with_capacity(tokens.len());
    for text in tokens {
      if !text.is_empty() && seen.insert(text.clone()) {
        let rank = self.ranks.rank(&text);
        words.push(NewWord { text, rank });
      }
    }
    words
  }
}
