//! Configuration loading for the `kotoba` binary.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;

/// Runtime configuration, deserialised from `kotoba.toml` and `KOTOBA_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
  /// SQLite database path. A leading `~` expands to the home directory.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,

  /// Morphological analyzer executable.
  #[serde(default = "default_analyzer_command")]
  pub analyzer_command: String,

  /// Extra arguments passed to the analyzer.
  #[serde(default)]
  pub analyzer_args: Vec<String>,

  /// How long one analyzer run may take, in seconds.
  #[serde(default = "default_analyzer_timeout_secs")]
  pub analyzer_timeout_secs: u64,

  /// Word-frequency list, one word per line, most frequent first.
  #[serde(default)]
  pub frequency_list_path: Option<PathBuf>,

  /// Local hour at which a study day rolls over to the next.
  #[serde(default = "default_day_end_hour")]
  pub day_end_hour: u32,
}

fn default_store_path() -> PathBuf { PathBuf::from("kotoba.sqlite") }
fn default_analyzer_command() -> String { "jumanpp".to_owned() }
fn default_analyzer_timeout_secs() -> u64 { 10 }
fn default_day_end_hour() -> u32 { 4 }

/// Load configuration; a missing file just means defaults plus environment.
pub fn load(path: &Path) -> anyhow::Result<AppConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path.to_owned()).required(false))
    .add_source(config::Environment::with_prefix("KOTOBA"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise configuration")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

/// The end of the current study day: the next occurrence of `day_end_hour`
/// local time, as a UTC instant. A session at 23:00 and one at 01:00 the
/// next morning share a horizon, so they see the same set of due words.
pub fn review_horizon<Tz: TimeZone>(
  day_end_hour: u32,
  now: DateTime<Tz>,
) -> anyhow::Result<DateTime<Utc>> {
  let rollover = now
    .date_naive()
    .and_hms_opt(day_end_hour, 0, 0)
    .ok_or_else(|| {
      anyhow::anyhow!("day_end_hour must be 0-23, got {day_end_hour}")
    })?
    .and_local_timezone(now.timezone())
    .earliest()
    .ok_or_else(|| anyhow::anyhow!("day rollover is not a valid local time"))?;

  let horizon = if rollover <= now {
    rollover + Duration::days(1)
  } else {
    rollover
  };
  Ok(horizon.with_timezone(&Utc))
}
