//! Subcommand implementations for the `kotoba` binary.

use std::{collections::HashSet, path::Path};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use kotoba_core::{
  ingest::Ingester, schedule::Grade, store::VocabStore, word::Word,
};
use kotoba_store_sqlite::SqliteStore;
use kotoba_tokenize::{JumanppTokenizer, segment};
use uuid::Uuid;

/// Everything a subcommand needs.
pub struct App {
  pub ingester: Ingester<SqliteStore, JumanppTokenizer>,
  pub json:     bool,
  /// End of the current study day; words scheduled before it count as due.
  pub horizon:  DateTime<Utc>,
}

impl App {
  fn store(&self) -> &SqliteStore { self.ingester.store() }
}

// ─── Ingestion ───────────────────────────────────────────────────────────────

pub async fn add(
  app: &App,
  file: Option<&Path>,
  source: Option<&str>,
) -> anyhow::Result<()> {
  use std::io::Read as _;

  let text = match file {
    Some(path) => std::fs::read_to_string(path)
      .with_context(|| format!("reading {}", path.display()))?,
    None => {
      let mut buf = String::new();
      std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading stdin")?;
      buf
    }
  };

  let sentences = segment::split_sentences(&text);
  if sentences.is_empty() {
    anyhow::bail!("no sentences found in input");
  }

  let mut created = 0usize;
  let mut known = 0usize;
  let mut word_ids = HashSet::new();
  for sentence in &sentences {
    let receipt = app
      .ingester
      .ingest_sentence(sentence, source, Utc::now())
      .await?;
    if receipt.created {
      created += 1;
    } else {
      known += 1;
    }
    word_ids.extend(receipt.word_ids.iter().copied());
  }

  if app.json {
    println!(
      "{}",
      serde_json::json!({
        "sentences_added": created,
        "sentences_known": known,
        "distinct_words":  word_ids.len(),
      })
    );
  } else {
    println!(
      "added {created} sentences ({known} already known, {} distinct words)",
      word_ids.len()
    );
  }
  Ok(())
}

pub async fn retokenize(app: &App) -> anyhow::Result<()> {
  let sentences = app.ingester.retokenize(Utc::now()).await?;

  if app.json {
    println!("{}", serde_json::json!({ "sentences": sentences }));
  } else {
    println!("retokenized {sentences} sentences");
  }
  Ok(())
}

// ─── Study ───────────────────────────────────────────────────────────────────

pub async fn study(app: &App) -> anyhow::Result<()> {
  let pick = app.store().next_study_sentence(app.horizon).await?;

  let Some(pick) = pick else {
    if app.json {
      println!("null");
    } else {
      println!("nothing to study right now");
    }
    return Ok(());
  };

  if app.json {
    println!("{}", serde_json::to_string_pretty(&pick)?);
    return Ok(());
  }

  println!("{}", pick.sentence.text);
  if let Some(source) = &pick.sentence.source {
    println!("  source: {source}");
  }
  if !pick.due_words.is_empty() {
    println!("  due: {}", word_list(&pick.due_words));
  }
  if !pick.new_words.is_empty() {
    println!("  new: {}", word_list(&pick.new_words));
  }
  let stats = app.store().stats(app.horizon).await?;
  println!();
  println!("{} words still due today", stats.due_words);
  println!("grade it with: kotoba grade {} <0-5>", pick.sentence.sentence_id);
  Ok(())
}

pub async fn grade(
  app: &App,
  sentence_id: Uuid,
  grade: u8,
) -> anyhow::Result<()> {
  let grade = Grade::new(grade)?;
  let updated = app
    .store()
    .review_sentence(sentence_id, grade, app.horizon, Utc::now())
    .await?;

  if app.json {
    println!("{}", serde_json::to_string_pretty(&updated)?);
  } else if updated.is_empty() {
    println!("no words in that sentence needed review");
  } else {
    for word in &updated {
      println!("{}", word_line(word));
    }
  }
  Ok(())
}

pub async fn due(app: &App, limit: Option<usize>) -> anyhow::Result<()> {
  let words = app.store().due_words(Utc::now(), limit).await?;

  if app.json {
    println!("{}", serde_json::to_string_pretty(&words)?);
  } else if words.is_empty() {
    println!("nothing due");
  } else {
    for word in &words {
      println!("{}", word_line(word));
    }
  }
  Ok(())
}

pub async fn review(app: &App, input: &str, grade: u8) -> anyhow::Result<()> {
  let grade = Grade::new(grade)?;
  let target = resolve_word(app, input).await?;
  let updated = app
    .store()
    .record_review(target.word_id, grade, Utc::now())
    .await?;

  if app.json {
    println!("{}", serde_json::to_string_pretty(&updated)?);
  } else {
    println!("{}", word_line(&updated));
  }
  Ok(())
}

// ─── Inspection ──────────────────────────────────────────────────────────────

pub async fn word(app: &App, input: &str) -> anyhow::Result<()> {
  let found = resolve_word(app, input).await?;
  let sentences = app.store().sentences_with_word(found.word_id).await?;

  if app.json {
    println!(
      "{}",
      serde_json::to_string_pretty(&serde_json::json!({
        "word":      found,
        "sentences": sentences,
      }))?
    );
    return Ok(());
  }

  println!("{}  ({})", found.text, found.word_id);
  println!("  occurrences: {}", found.occurrences);
  match found.rank {
    Some(rank) => println!("  frequency rank: {rank}"),
    None => println!("  frequency rank: unlisted"),
  }
  if found.scheduling.reviewed {
    println!(
      "  easiness {:.2}, streak {}, interval {} days",
      found.scheduling.easiness,
      found.scheduling.repetition,
      found.scheduling.interval_days
    );
    if let Some(at) = found.scheduling.next_review_at {
      println!("  next review: {}", at.format("%Y-%m-%d %H:%M"));
    }
  } else {
    println!("  never reviewed");
  }
  for sentence in &sentences {
    println!("  {}", sentence.text);
  }
  Ok(())
}

pub async fn stats(app: &App) -> anyhow::Result<()> {
  let stats = app.store().stats(app.horizon).await?;

  if app.json {
    println!("{}", serde_json::to_string_pretty(&stats)?);
  } else {
    println!("words:     {}", stats.words);
    println!("sentences: {}", stats.sentences);
    println!("links:     {}", stats.edges);
    println!("reviewed:  {}", stats.reviewed_words);
    println!("new:       {}", stats.new_words);
    println!("due today: {}", stats.due_words);
  }
  Ok(())
}

// ─── Deletion ────────────────────────────────────────────────────────────────

pub async fn delete_word(app: &App, input: &str) -> anyhow::Result<()> {
  let target = resolve_word(app, input).await?;
  app.store().delete_word(target.word_id).await?;

  if app.json {
    println!("{}", serde_json::json!({ "deleted": target.word_id }));
  } else {
    println!("deleted {}", target.text);
  }
  Ok(())
}

pub async fn delete_sentence(
  app: &App,
  sentence_id: Uuid,
) -> anyhow::Result<()> {
  app.store().delete_sentence(sentence_id).await?;

  if app.json {
    println!("{}", serde_json::json!({ "deleted": sentence_id }));
  } else {
    println!("deleted sentence {sentence_id}");
  }
  Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Accepts either a word id or the word's exact dictionary form.
async fn resolve_word(app: &App, input: &str) -> anyhow::Result<Word> {
  let found = match Uuid::parse_str(input) {
    Ok(id) => app.store().get_word(id).await?,
    Err(_) => app.store().get_word_by_text(input).await?,
  };
  found.ok_or_else(|| anyhow::anyhow!("no such word: {input}"))
}

fn word_list(words: &[Word]) -> String {
  words
    .iter()
    .map(|w| w.text.as_str())
    .collect::<Vec<_>>()
    .join(" ")
}

fn word_line(word: &Word) -> String {
  let next = word
    .scheduling
    .next_review_at
    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
    .unwrap_or_else(|| "never".to_owned());
  format!(
    "{}  streak {}  next {}",
    word.text, word.scheduling.repetition, next
  )
}
