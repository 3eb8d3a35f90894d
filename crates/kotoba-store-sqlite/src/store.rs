//! [`SqliteStore`] — the SQLite implementation of [`VocabStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use kotoba_core::{
  schedule::{self, Grade},
  sentence::{NewSentence, Sentence, StudySentence},
  store::{IngestReceipt, SentenceRelink, VocabStats, VocabStore},
  word::{NewWord, SchedulingState, Word},
};

use crate::{
  encode::{
    decode_uuid, encode_dt, encode_uuid, RawSentence, RawWord, WORD_COLUMNS,
    WORD_COLUMNS_W,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A kotoba vocabulary store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────
//
// These run inside `call` closures, on the connection's thread, so they work
// with plain `rusqlite` types. Passing a `Transaction` works through deref.

/// Wrap a domain decode error so it can cross a `call` closure boundary.
fn other_err(
  e: impl std::error::Error + Send + Sync + 'static,
) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

/// Insert a word or bump its occurrence count, returning the row's id either
/// way. The whole step is one statement, so two ingests of the same new word
/// cannot race into a duplicate.
fn upsert_word_counting(
  conn: &rusqlite::Connection,
  word: &NewWord,
  now_str: &str,
) -> rusqlite::Result<String> {
  let candidate_id = encode_uuid(Uuid::new_v4());
  conn.query_row(
    "INSERT INTO words (word_id, text, occurrences, rank, added_at)
     VALUES (?1, ?2, 1, ?3, ?4)
     ON CONFLICT(text) DO UPDATE SET occurrences = occurrences + 1
     RETURNING word_id",
    rusqlite::params![candidate_id, word.text, word.rank, now_str],
    |row| row.get(0),
  )
}

/// Insert a word only if its text is absent, returning the id either way.
/// Never touches an existing word's occurrence count.
fn insert_word_if_missing(
  conn: &rusqlite::Connection,
  word: &NewWord,
  now_str: &str,
) -> rusqlite::Result<String> {
  let candidate_id = encode_uuid(Uuid::new_v4());
  let inserted: Option<String> = conn
    .query_row(
      "INSERT INTO words (word_id, text, occurrences, rank, added_at)
       VALUES (?1, ?2, 1, ?3, ?4)
       ON CONFLICT(text) DO NOTHING
       RETURNING word_id",
      rusqlite::params![candidate_id, word.text, word.rank, now_str],
      |row| row.get(0),
    )
    .optional()?;

  match inserted {
    Some(id) => Ok(id),
    None => conn.query_row(
      "SELECT word_id FROM words WHERE text = ?1",
      rusqlite::params![word.text],
      |row| row.get(0),
    ),
  }
}

/// Every word linked to a sentence, ordered by text for determinism.
fn words_in_sentence_rows(
  conn: &rusqlite::Connection,
  sentence_id: &str,
) -> rusqlite::Result<Vec<RawWord>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {WORD_COLUMNS_W}
     FROM word_sentence ws
     JOIN words w ON w.word_id = ws.word_id
     WHERE ws.sentence_id = ?1
     ORDER BY w.text ASC"
  ))?;
  stmt
    .query_map(rusqlite::params![sentence_id], RawWord::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

/// Persist a scheduler result onto a word row.
fn write_scheduling(
  conn: &rusqlite::Connection,
  word_id: &str,
  state: &SchedulingState,
) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE words SET
       reviewed          = ?2,
       easiness          = ?3,
       repetition        = ?4,
       interval_days     = ?5,
       review_secs       = ?6,
       next_review_at    = ?7,
       first_reviewed_at = ?8
     WHERE word_id = ?1",
    rusqlite::params![
      word_id,
      state.reviewed,
      state.easiness,
      state.repetition,
      state.interval_days,
      state.review_secs,
      state.next_review_at.map(encode_dt),
      state.first_reviewed_at.map(encode_dt),
    ],
  )?;
  Ok(())
}

// ─── VocabStore impl ─────────────────────────────────────────────────────────

impl VocabStore for SqliteStore {
  type Error = Error;

  // ── Words ───────────────────────────────────────────────────────────────

  async fn get_word(&self, id: Uuid) -> Result<Option<Word>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawWord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {WORD_COLUMNS} FROM words WHERE word_id = ?1"),
              rusqlite::params![id_str],
              RawWord::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawWord::into_word).transpose()
  }

  async fn get_word_by_text(&self, text: &str) -> Result<Option<Word>> {
    let text = text.to_owned();

    let raw: Option<RawWord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {WORD_COLUMNS} FROM words WHERE text = ?1"),
              rusqlite::params![text],
              RawWord::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawWord::into_word).transpose()
  }

  async fn delete_word(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM words WHERE word_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::WordNotFound(id));
    }
    Ok(())
  }

  async fn due_words(
    &self,
    now: DateTime<Utc>,
    limit: Option<usize>,
  ) -> Result<Vec<Word>> {
    let now_str = encode_dt(now);
    let limit_val = limit.map(|l| l as i64).unwrap_or(-1);

    let raws: Vec<RawWord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {WORD_COLUMNS} FROM words
           WHERE next_review_at IS NOT NULL AND next_review_at <= ?1
           ORDER BY next_review_at ASC, word_id ASC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![now_str, limit_val], RawWord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawWord::into_word).collect()
  }

  async fn record_review(
    &self,
    word_id: Uuid,
    grade: Grade,
    now: DateTime<Utc>,
  ) -> Result<Word> {
    let id_str = encode_uuid(word_id);

    let result: Option<(RawWord, SchedulingState)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let raw: Option<RawWord> = tx
          .query_row(
            &format!("SELECT {WORD_COLUMNS} FROM words WHERE word_id = ?1"),
            rusqlite::params![id_str],
            RawWord::from_row,
          )
          .optional()?;

        let Some(raw) = raw else {
          return Ok(None);
        };

        let state = raw.scheduling_state().map_err(other_err)?;
        let next = schedule::next_review(&state, grade, now);
        write_scheduling(&tx, &raw.word_id, &next)?;

        tx.commit()?;
        Ok(Some((raw, next)))
      })
      .await?;

    let (raw, next) = result.ok_or(Error::WordNotFound(word_id))?;
    let mut word = raw.into_word()?;
    word.scheduling = next;
    Ok(word)
  }

  // ── Sentences ───────────────────────────────────────────────────────────

  async fn get_sentence(&self, id: Uuid) -> Result<Option<Sentence>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSentence> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT sentence_id, text, source, added_at
               FROM sentences WHERE sentence_id = ?1",
              rusqlite::params![id_str],
              RawSentence::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSentence::into_sentence).transpose()
  }

  async fn list_sentences(&self) -> Result<Vec<Sentence>> {
    let raws: Vec<RawSentence> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT sentence_id, text, source, added_at
           FROM sentences
           ORDER BY added_at ASC, sentence_id ASC",
        )?;
        let rows = stmt
          .query_map([], RawSentence::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSentence::into_sentence).collect()
  }

  async fn delete_sentence(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sentences WHERE sentence_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::SentenceNotFound(id));
    }
    Ok(())
  }

  // ── Index ───────────────────────────────────────────────────────────────

  async fn link_sentence(
    &self,
    input: NewSentence,
    now: DateTime<Utc>,
  ) -> Result<IngestReceipt> {
    let now_str = encode_dt(now);

    let (sentence_id_str, word_id_strs, created): (String, Vec<String>, bool) =
      self
        .conn
        .call(move |conn| {
          let tx = conn.transaction()?;

          let candidate_id = encode_uuid(Uuid::new_v4());
          let inserted: Option<String> = tx
            .query_row(
              "INSERT INTO sentences (sentence_id, text, source, added_at)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(text) DO NOTHING
               RETURNING sentence_id",
              rusqlite::params![candidate_id, input.text, input.source, now_str],
              |row| row.get(0),
            )
            .optional()?;

          let created = inserted.is_some();
          let sentence_id = match inserted {
            Some(id) => id,
            None => tx.query_row(
              "SELECT sentence_id FROM sentences WHERE text = ?1",
              rusqlite::params![input.text],
              |row| row.get(0),
            )?,
          };

          // A fresh sentence counts toward each word; re-ingesting a known
          // one only fills in whatever words or links are missing.
          let mut word_ids = Vec::with_capacity(input.words.len());
          for word in &input.words {
            let word_id = if created {
              upsert_word_counting(&tx, word, &now_str)?
            } else {
              insert_word_if_missing(&tx, word, &now_str)?
            };
            tx.execute(
              "INSERT OR IGNORE INTO word_sentence (word_id, sentence_id)
               VALUES (?1, ?2)",
              rusqlite::params![word_id, sentence_id],
            )?;
            word_ids.push(word_id);
          }

          tx.commit()?;
          Ok((sentence_id, word_ids, created))
        })
        .await?;

    let word_ids = word_id_strs
      .iter()
      .map(|s| decode_uuid(s))
      .collect::<Result<Vec<_>>>()?;

    Ok(IngestReceipt {
      sentence_id: decode_uuid(&sentence_id_str)?,
      word_ids,
      created,
    })
  }

  async fn words_in_sentence(&self, sentence_id: Uuid) -> Result<Vec<Word>> {
    let id_str = encode_uuid(sentence_id);

    let raws: Vec<RawWord> = self
      .conn
      .call(move |conn| Ok(words_in_sentence_rows(conn, &id_str)?))
      .await?;

    raws.into_iter().map(RawWord::into_word).collect()
  }

  async fn sentences_with_word(&self, word_id: Uuid) -> Result<Vec<Sentence>> {
    let id_str = encode_uuid(word_id);

    let raws: Vec<RawSentence> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT s.sentence_id, s.text, s.source, s.added_at
           FROM word_sentence ws
           JOIN sentences s ON s.sentence_id = ws.sentence_id
           WHERE ws.word_id = ?1
           ORDER BY s.added_at ASC, s.sentence_id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawSentence::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSentence::into_sentence).collect()
  }

  async fn relink_sentences(
    &self,
    relinks: Vec<SentenceRelink>,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let now_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Rebuild from zero: counts come back as the relinks are applied,
        // and words that fell out of the corpus stay at zero.
        tx.execute("DELETE FROM word_sentence", [])?;
        tx.execute("UPDATE words SET occurrences = 0", [])?;

        for relink in &relinks {
          let sentence_id = encode_uuid(relink.sentence_id);
          for word in &relink.words {
            let word_id = upsert_word_counting(&tx, word, &now_str)?;
            tx.execute(
              "INSERT OR IGNORE INTO word_sentence (word_id, sentence_id)
               VALUES (?1, ?2)",
              rusqlite::params![word_id, sentence_id],
            )?;
          }
        }

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Study ───────────────────────────────────────────────────────────────

  async fn next_study_sentence(
    &self,
    due_before: DateTime<Utc>,
  ) -> Result<Option<StudySentence>> {
    let due_str = encode_dt(due_before);

    let picked: Option<(RawSentence, Vec<RawWord>)> = self
      .conn
      .call(move |conn| {
        // First choice: a sentence made entirely of known words, with as
        // many due words as possible.
        let reviewable: Option<String> = conn
          .query_row(
            "SELECT ws.sentence_id,
                    SUM(CASE WHEN w.reviewed = 0 THEN 1 ELSE 0 END)
                      AS new_count,
                    SUM(CASE WHEN w.next_review_at IS NOT NULL
                              AND w.next_review_at <= ?1
                             THEN 1 ELSE 0 END)
                      AS due_count
             FROM word_sentence ws
             JOIN words w ON w.word_id = ws.word_id
             GROUP BY ws.sentence_id
             HAVING new_count = 0 AND due_count > 0
             ORDER BY due_count DESC, random()
             LIMIT 1",
            rusqlite::params![due_str],
            |row| row.get(0),
          )
          .optional()?;

        // Otherwise the sentence introducing the fewest new words, breaking
        // ties toward new words that appear often in the corpus.
        let sentence_id: Option<String> = match reviewable {
          Some(id) => Some(id),
          None => conn
            .query_row(
              "SELECT ws.sentence_id,
                      SUM(CASE WHEN w.reviewed = 0 THEN 1 ELSE 0 END)
                        AS new_count,
                      AVG(CASE WHEN w.reviewed = 0 THEN w.occurrences END)
                        AS new_occurrences
               FROM word_sentence ws
               JOIN words w ON w.word_id = ws.word_id
               GROUP BY ws.sentence_id
               HAVING new_count > 0
               ORDER BY new_count ASC, new_occurrences DESC, random()
               LIMIT 1",
              [],
              |row| row.get(0),
            )
            .optional()?,
        };

        let Some(sentence_id) = sentence_id else {
          return Ok(None);
        };

        let raw_sentence = conn.query_row(
          "SELECT sentence_id, text, source, added_at
           FROM sentences WHERE sentence_id = ?1",
          rusqlite::params![sentence_id],
          RawSentence::from_row,
        )?;
        let raw_words = words_in_sentence_rows(conn, &sentence_id)?;

        Ok(Some((raw_sentence, raw_words)))
      })
      .await?;

    let Some((raw_sentence, raw_words)) = picked else {
      return Ok(None);
    };

    let sentence = raw_sentence.into_sentence()?;
    let mut due_words = Vec::new();
    let mut new_words = Vec::new();
    for raw in raw_words {
      let word = raw.into_word()?;
      if word.is_new() {
        new_words.push(word);
      } else if word.scheduling.is_due(due_before) {
        due_words.push(word);
      }
    }

    Ok(Some(StudySentence { sentence, due_words, new_words }))
  }

  async fn review_sentence(
    &self,
    sentence_id: Uuid,
    grade: Grade,
    due_before: DateTime<Utc>,
    now: DateTime<Utc>,
  ) -> Result<Vec<Word>> {
    let id_str = encode_uuid(sentence_id);

    let updated: Option<Vec<(RawWord, SchedulingState)>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM sentences WHERE sentence_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }

        let raws = words_in_sentence_rows(&tx, &id_str)?;

        let mut updated = Vec::new();
        for raw in raws {
          let state = raw.scheduling_state().map_err(other_err)?;
          if !state.needs_review(due_before) {
            continue;
          }
          let next = schedule::next_review(&state, grade, now);
          write_scheduling(&tx, &raw.word_id, &next)?;
          updated.push((raw, next));
        }

        tx.commit()?;
        Ok(Some(updated))
      })
      .await?;

    let updated = updated.ok_or(Error::SentenceNotFound(sentence_id))?;
    updated
      .into_iter()
      .map(|(raw, next)| {
        let mut word = raw.into_word()?;
        word.scheduling = next;
        Ok(word)
      })
      .collect()
  }

  async fn stats(&self, due_before: DateTime<Utc>) -> Result<VocabStats> {
    let due_str = encode_dt(due_before);

    let stats = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             (SELECT COUNT(*) FROM words),
             (SELECT COUNT(*) FROM sentences),
             (SELECT COUNT(*) FROM word_sentence),
             (SELECT COUNT(*) FROM words WHERE reviewed = 1),
             (SELECT COUNT(*) FROM words WHERE reviewed = 0),
             (SELECT COUNT(*) FROM words
              WHERE next_review_at IS NOT NULL AND next_review_at <= ?1)",
          rusqlite::params![due_str],
          |row| {
            Ok(VocabStats {
              words:          row.get::<_, i64>(0)? as u64,
              sentences:      row.get::<_, i64>(1)? as u64,
              edges:          row.get::<_, i64>(2)? as u64,
              reviewed_words: row.get::<_, i64>(3)? as u64,
              new_words:      row.get::<_, i64>(4)? as u64,
              due_words:      row.get::<_, i64>(5)? as u64,
            })
          },
        )?)
      })
      .await?;

    Ok(stats)
  }
}
