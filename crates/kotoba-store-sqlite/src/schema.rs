//! SQL schema for the kotoba SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `foreign_keys` is per-connection and must stay in this batch: the cascade
/// deletes on `word_sentence` depend on it.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS words (
    word_id           TEXT PRIMARY KEY,
    text              TEXT NOT NULL UNIQUE,  -- dictionary form
    occurrences       INTEGER NOT NULL DEFAULT 0,
    rank              INTEGER,               -- frequency rank; NULL = unlisted
    added_at          TEXT NOT NULL,         -- ISO 8601 UTC
    reviewed          INTEGER NOT NULL DEFAULT 0,
    easiness          REAL    NOT NULL DEFAULT 0,
    repetition        INTEGER NOT NULL DEFAULT 0,
    interval_days     INTEGER NOT NULL DEFAULT 0,
    review_secs       INTEGER NOT NULL DEFAULT 0,
    next_review_at    TEXT,                  -- NULL until the first review
    first_reviewed_at TEXT
);

CREATE TABLE IF NOT EXISTS sentences (
    sentence_id TEXT PRIMARY KEY,
    text        TEXT NOT NULL UNIQUE,
    source      TEXT,
    added_at    TEXT NOT NULL
);

-- Which words appear in which sentences. Deleting either end removes the
-- link; it never removes the other end.
CREATE TABLE IF NOT EXISTS word_sentence (
    word_id     TEXT NOT NULL REFERENCES words(word_id)         ON DELETE CASCADE,
    sentence_id TEXT NOT NULL REFERENCES sentences(sentence_id) ON DELETE CASCADE,
    PRIMARY KEY (word_id, sentence_id)
);

CREATE INDEX IF NOT EXISTS words_next_review_idx      ON words(next_review_at);
CREATE INDEX IF NOT EXISTS word_sentence_sentence_idx ON word_sentence(sentence_id);

PRAGMA user_version = 1;
";
