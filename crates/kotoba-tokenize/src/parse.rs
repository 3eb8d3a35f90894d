//! Juman++ lattice-output parsing.
//!
//! Each analysis line carries at least 12 space-separated fields; the third
//! is the dictionary form, which is all we keep. Lines opening with `@` are
//! alternative analyses of the previous token. The final field may be a
//! quoted string containing spaces, hence "at least" 12.
//!
//! Format reference: <https://github.com/ku-nlp/jumanpp/blob/master/docs/output.md>

use kotoba_core::tokenize::TokenizeError;

/// Juman++ writes a half-width space as this escape token.
const SPACE_TOKEN: &str = r"\␣";

/// Extract dictionary-form tokens from raw Juman++ output.
///
/// Output that never reaches an `EOS` line is rejected as malformed — the
/// analyzer terminates every successful analysis with one.
pub fn lattice_tokens(output: &str) -> Result<Vec<String>, TokenizeError> {
  let mut tokens = Vec::new();
  let mut saw_eos = false;

  for line in output.lines() {
    if line == "EOS" {
      saw_eos = true;
      continue;
    }
    // alternative analysis of the previous token
    if line.starts_with('@') {
      continue;
    }

    let fields: Vec<&str> = line.split(' ').collect();
    if fields.len() < 12 {
      continue;
    }

    let dictionary_form = fields[2];
    if dictionary_form == SPACE_TOKEN {
      continue;
    }
    tokens.push(dictionary_form.to_owned());
  }

  if !saw_eos {
    return Err(TokenizeError::Malformed(
      "no EOS line in analyzer output".to_owned(),
    ));
  }
  Ok(tokens)
}

#[cfg(test)]
mod tests {
  use super::*;

  const OUTPUT: &str = "\
猫 ねこ 猫 名詞 6 普通名詞 1 * 0 * 0 \"代表表記:猫/ねこ カテゴリ:動物\"
が が が 助詞 9 格助詞 1 * 0 * 0 NIL
走った はしった 走る 動詞 2 * 0 子音動詞ラ行 10 タ形 10 \"代表表記:走る/はしる\"
EOS
";

  #[test]
  fn takes_the_dictionary_form() {
    let tokens = lattice_tokens(OUTPUT).unwrap();
    assert_eq!(tokens, vec!["猫", "が", "走る"]);
  }

  #[test]
  fn alternative_lines_are_skipped() {
    let output = "\
猫 ねこ 猫 名詞 6 普通名詞 1 * 0 * 0 NIL
@ 猫 ねこ 猫 名詞 6 普通名詞 1 * 0 * 0 \"別解\"
EOS
";
    let tokens = lattice_tokens(output).unwrap();
    assert_eq!(tokens, vec!["猫"]);
  }

  #[test]
  fn space_escape_tokens_are_skipped() {
    let output = "\
猫 ねこ 猫 名詞 6 普通名詞 1 * 0 * 0 NIL
\\␣ \\␣ \\␣ 特殊 1 空白 6 * 0 * 0 NIL
EOS
";
    let tokens = lattice_tokens(output).unwrap();
    assert_eq!(tokens, vec!["猫"]);
  }

  #[test]
  fn short_lines_are_ignored() {
    let output = "garbage line\n猫 ねこ 猫 名詞 6 普通名詞 1 * 0 * 0 NIL\nEOS\n";
    let tokens = lattice_tokens(output).unwrap();
    assert_eq!(tokens, vec!["猫"]);
  }

  #[test]
  fn missing_eos_is_malformed() {
    let err =
      lattice_tokens("猫 ねこ 猫 名詞 6 普通名詞 1 * 0 * 0 NIL\n").unwrap_err();
    assert!(matches!(err, TokenizeError::Malformed(_)));
  }

  #[test]
  fn empty_analysis_yields_no_tokens() {
    assert!(lattice_tokens("EOS\n").unwrap().is_empty());
  }
}
