//! Juman++ subprocess adapter.

use std::{future::Future, process::Stdio, time::Duration};

use kotoba_core::tokenize::{TokenizeError, Tokenizer};
use tokio::{io::AsyncWriteExt as _, process::Command, time};
use tracing::debug;

use crate::parse;

/// Runs the Juman++ morphological analyzer as a one-shot subprocess per
/// sentence: text on stdin, lattice output on stdout, bounded by a deadline.
#[derive(Debug, Clone)]
pub struct JumanppTokenizer {
  command: String,
  args:    Vec<String>,
  timeout: Duration,
}

impl JumanppTokenizer {
  pub fn new(
    command: impl Into<String>,
    args: Vec<String>,
    timeout: Duration,
  ) -> Self {
    Self { command: command.into(), args, timeout }
  }

  async fn run(&self, text: &str) -> Result<String, TokenizeError> {
    let mut child = Command::new(&self.command)
      .args(&self.args)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(|e| {
        TokenizeError::Unavailable(format!("{}: {e}", self.command))
      })?;

    let mut stdin = child.stdin.take().ok_or_else(|| {
      TokenizeError::Unavailable("analyzer stdin not captured".to_owned())
    })?;
    stdin
      .write_all(text.as_bytes())
      .await
      .map_err(|e| TokenizeError::Unavailable(e.to_string()))?;
    // closing stdin signals end of input
    drop(stdin);

    let output = child
      .wait_with_output()
      .await
      .map_err(|e| TokenizeError::Unavailable(e.to_string()))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(TokenizeError::Unavailable(format!(
        "{} exited with {}: {}",
        self.command,
        output.status,
        stderr.trim()
      )));
    }

    String::from_utf8(output.stdout).map_err(|_| {
      TokenizeError::Malformed("analyzer output is not UTF-8".to_owned())
    })
  }
}

impl Tokenizer for JumanppTokenizer {
  fn tokenize<'a>(
    &'a self,
    text: &'a str,
  ) -> impl Future<Output = Result<Vec<String>, TokenizeError>> + Send + 'a {
    async move {
      let raw = time::timeout(self.timeout, self.run(text))
        .await
        .map_err(|_| TokenizeError::TimedOut(self.timeout.as_secs()))??;

      let tokens = parse::lattice_tokens(&raw)?;
      debug!(tokens = tokens.len(), "analyzer produced tokens");
      Ok(tokens)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn missing_command_is_unavailable() {
    let tok = JumanppTokenizer::new(
      "kotoba-no-such-analyzer",
      vec![],
      Duration::from_secs(5),
    );
    let err = tok.tokenize("猫").await.unwrap_err();
    assert!(matches!(err, TokenizeError::Unavailable(_)));
  }

  #[tokio::test]
  async fn failing_command_is_unavailable() {
    let tok = JumanppTokenizer::new("false", vec![], Duration::from_secs(5));
    let err = tok.tokenize("猫").await.unwrap_err();
    assert!(matches!(err, TokenizeError::Unavailable(_)));
  }

  #[tokio::test]
  async fn slow_command_times_out() {
    let tok = JumanppTokenizer::new(
      "sleep",
      vec!["5".to_owned()],
      Duration::from_millis(100),
    );
    let err = tok.tokenize("猫").await.unwrap_err();
    assert!(matches!(err, TokenizeError::TimedOut(_)));
  }

  #[tokio::test]
  async fn non_lattice_output_is_malformed() {
    // echo ignores stdin and prints a bare newline — no EOS line
    let tok = JumanppTokenizer::new("echo", vec![], Duration::from_secs(5));
    let err = tok.tokenize("猫").await.unwrap_err();
    assert!(matches!(err, TokenizeError::Malformed(_)));
  }

  // cat reflects stdin, so feeding it a lattice exercises the whole
  // subprocess path deterministically.
  #[tokio::test]
  async fn extracts_tokens_through_a_real_subprocess() {
    let tok = JumanppTokenizer::new("cat", vec![], Duration::from_secs(5));
    let lattice = "猫 ねこ 猫 名詞 6 普通名詞 1 * 0 * 0 NIL\nEOS\n";
    let tokens = tok.tokenize(lattice).await.unwrap();
    assert_eq!(tokens, vec!["猫"]);
  }
}
