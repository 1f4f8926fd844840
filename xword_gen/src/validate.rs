use std::collections::HashSet;

use common::word::Word;
use util::error::{XWordError, XWordResult};

const MIN_TERM_LEN: usize = 2;

/// Rejects batches the generator cannot work with: empty ids, terms that are
/// too short or contain anything but `A`-`Z`, and duplicate ids.
pub fn validate_words(words: &[Word]) -> XWordResult {
  let mut seen = HashSet::new();
  for word in words {
    if word.id.is_empty() {
      return Err(XWordError::Validation(format!("Word \"{}\" has an empty id", word.term)).into());
    }
    if word.len() < MIN_TERM_LEN {
      return Err(
        XWordError::Validation(format!(
          "Term \"{}\" of word {} is shorter than {MIN_TERM_LEN} letters",
          word.term, word.id
        ))
        .into(),
      );
    }
    if let Some(c) = word.letters().find(|c| !c.is_ascii_uppercase()) {
      return Err(
        XWordError::Validation(format!(
          "Term \"{}\" of word {} contains '{c}', expected only A-Z",
          word.term, word.id
        ))
        .into(),
      );
    }
    if !seen.insert(word.id.as_str()) {
      return Err(XWordError::Validation(format!("Duplicate word id {}", word.id)).into());
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use common::word::Word;
  use googletest::prelude::*;

  use super::validate_words;

  #[gtest]
  fn test_valid() {
    expect_that!(validate_words(&[]), ok(anything()));
    expect_that!(
      validate_words(&[Word::new("1", "CAT", "Feline"), Word::new("2", "CAT", "Again")]),
      ok(anything())
    );
  }

  #[gtest]
  fn test_invalid() {
    expect_that!(validate_words(&[Word::new("1", "", "")]), err(anything()));
    expect_that!(validate_words(&[Word::new("1", "A", "")]), err(anything()));
    expect_that!(validate_words(&[Word::new("1", "cat", "")]), err(anything()));
    expect_that!(validate_words(&[Word::new("1", "ICE CREAM", "")]), err(anything()));
    expect_that!(validate_words(&[Word::new("", "CAT", "")]), err(anything()));
    expect_that!(
      validate_words(&[Word::new("1", "CAT", ""), Word::new("1", "DOG", "")]),
      err(anything())
    );
  }
}
