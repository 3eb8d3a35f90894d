//! Sentence segmentation for Japanese text.

/// Characters that end a sentence when not inside quotes or brackets.
const TERMINATORS: [char; 4] = ['。', '！', '？', '\n'];
const OPEN_QUOTES: [char; 3] = ['「', '『', '（'];
const CLOSE_QUOTES: [char; 3] = ['」', '』', '）'];

/// Split raw text into sentences.
///
/// A terminator inside 「」, 『』, or （） does not split — quoted speech
/// stays attached to the sentence around it. Whitespace-only fragments are
/// dropped; trailing text without a terminator is kept as a final sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
  let mut depth = 0u32;
  let mut current = String::new();
  let mut sentences = Vec::new();

  for c in text.chars() {
    current.push(c);
    if OPEN_QUOTES.contains(&c) {
      depth += 1;
    } else if CLOSE_QUOTES.contains(&c) {
      // a stray close quote must not disable splitting for the rest
      depth = depth.saturating_sub(1);
    } else if depth == 0 && TERMINATORS.contains(&c) {
      flush(&mut current, &mut sentences);
    }
  }
  flush(&mut current, &mut sentences);

  sentences
}

fn flush(current: &mut String, sentences: &mut Vec<String>) {
  let sentence = current.trim();
  if !sentence.is_empty() {
    sentences.push(sentence.to_owned());
  }
  current.clear();
}
