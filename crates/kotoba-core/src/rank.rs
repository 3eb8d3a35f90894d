//! Frequency-rank lookup.
//!
//! A frequency list is plain text, one word per line, most frequent first;
//! a word's rank is its zero-based line number. Words missing from the list
//! have no rank at all.

use std::collections::HashMap;

/// In-memory word-frequency ranking, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct FrequencyList {
  ranks: HashMap<String, u32>,
}

impl FrequencyList {
  /// An empty list: every word ranks as `None`.
  pub fn empty() -> Self { Self::default() }

  /// Parse file contents. Blank lines are skipped; a duplicated word keeps
  /// its first (best) rank.
  pub fn from_lines(contents: &str) -> Self {
    let mut ranks = HashMap::new();
    let mut rank = 0u32;
    for line in contents.lines() {
      let word = line.trim();
      if word.is_empty() {
        continue;
      }
      ranks.entry(word.to_owned()).or_insert(rank);
      rank += 1;
    }
    Self { ranks }
  }

  pub fn rank(&self, word: &str) -> Option<u32> { self.ranks.get(word).copied() }

  pub fn len(&self) -> usize { self.ranks.len() }

  pub fn is_empty(&self) -> bool { self.ranks.is_empty() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ranks_follow_line_order() {
    let list = FrequencyList::from_lines("の\nに\nは\n猫\n");
    assert_eq!(list.rank("の"), Some(0));
    assert_eq!(list.rank("猫"), Some(3));
  }

  #[test]
  fn unlisted_words_have_no_rank() {
    let list = FrequencyList::from_lines("の\nに\n");
    assert_eq!(list.rank("麒麟"), None);
    assert_eq!(FrequencyList::empty().rank("の"), None);
  }

  #[test]
  fn blank_lines_are_skipped_and_duplicates_keep_first_rank() {
    let list = FrequencyList::from_lines("の\n\n  \nに\nの\n猫\n");
    assert_eq!(list.rank("の"), Some(0));
    assert_eq!(list.rank("に"), Some(1));
    // the duplicate consumed rank 2
    assert_eq!(list.rank("猫"), Some(3));
    assert_eq!(list.len(), 3);
  }
}
