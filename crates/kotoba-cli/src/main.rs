//! `kotoba` — vocabulary study from real sentences.
//!
//! Text goes in (`add`), gets split into sentences and run through a
//! morphological analyzer, and every token becomes a tracked word. `study`
//! picks the sentence worth reading next, `grade` feeds the result back into
//! the scheduler, and the word comes around again when it is about to fade.

mod commands;
mod settings;

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use chrono::Local;
use clap::{Parser, Subcommand};
use commands::App;
use kotoba_core::{ingest::Ingester, rank::FrequencyList};
use kotoba_store_sqlite::SqliteStore;
use kotoba_tokenize::JumanppTokenizer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "kotoba", version, about = "Vocabulary study from real sentences")]
struct Cli {
  /// Path to the config file.
  #[arg(short, long, default_value = "kotoba.toml")]
  config:  PathBuf,
  /// Print machine-readable JSON instead of text.
  #[arg(long, global = true)]
  json:    bool,
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Ingest text from a file (or stdin) into the corpus.
  Add {
    file:   Option<PathBuf>,
    /// Where the text came from, recorded on each sentence.
    #[arg(short, long)]
    source: Option<String>,
  },
  /// Pick the next sentence to study.
  Study,
  /// Grade a studied sentence, 0 (blackout) to 5 (perfect).
  Grade { sentence_id: Uuid, grade: u8 },
  /// List the words due for review right now.
  Due {
    #[arg(short, long)]
    limit: Option<usize>,
  },
  /// Grade a single word outside any sentence.
  Review { word: String, grade: u8 },
  /// Show a word's counts, schedule, and example sentences.
  Word { word: String },
  /// Corpus-level counters.
  Stats,
  /// Re-run the analyzer over every stored sentence and rebuild the index.
  Retokenize,
  /// Remove a word, keeping the sentences it appeared in.
  DeleteWord { word: String },
  /// Remove a sentence, keeping its words.
  DeleteSentence { sentence_id: Uuid },
}

// ─── Entrypoint ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // logs go to stderr so `--json` output stays parseable
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let config = settings::load(&cli.config)?;

  let store_path = settings::expand_tilde(&config.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let ranks = match &config.frequency_list_path {
    Some(path) => {
      let path = settings::expand_tilde(path);
      let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("reading frequency list {}", path.display()))?;
      FrequencyList::from_lines(&contents)
    }
    None => FrequencyList::empty(),
  };

  let tokenizer = JumanppTokenizer::new(
    &config.analyzer_command,
    config.analyzer_args.clone(),
    Duration::from_secs(config.analyzer_timeout_secs),
  );

  let app = App {
    ingester: Ingester::new(store, tokenizer, ranks),
    json:     cli.json,
    horizon:  settings::review_horizon(config.day_end_hour, Local::now())?,
  };

  match cli.command {
    Command::Add { file, source } => {
      commands::add(&app, file.as_deref(), source.as_deref()).await
    }
    Command::Study => commands::study(&app).await,
    Command::Grade { sentence_id, grade } => {
      commands::grade(&app, sentence_id, grade).await
    }
    Command::Due { limit } => commands::due(&app, limit).await,
    Command::Review { word, grade } => {
      commands::review(&app, &word, grade).await
    }
    Command::Word { word } => commands::word(&app, &word).await,
    Command::Stats => commands::stats(&app).await,
    Command::Retokenize => commands::retokenize(&app).await,
    Command::DeleteWord { word } => commands::delete_word(&app, &word).await,
    Command::DeleteSentence { sentence_id } => {
      commands::delete_sentence(&app, sentence_id).await
    }
  }
}
