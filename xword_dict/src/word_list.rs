use std::{
  borrow::Borrow,
  fs::File,
  io::{BufRead, BufReader},
  path::Path,
};

use common::word::Word;
use itertools::Itertools;
use util::error::{XWordError, XWordResult};

/// Strips separators a human would type into a vocabulary term ("ice cream",
/// "mother-in-law", "o'clock") and uppercases the rest.
pub fn normalize_term(raw: &str) -> XWordResult<String> {
  raw
    .chars()
    .filter(|c| !(c.is_whitespace() || *c == '-' || *c == '\''))
    .map(|c| -> XWordResult<char> {
      if c.is_ascii_alphabetic() {
        Ok(c.to_ascii_uppercase())
      } else {
        Err(XWordError::Parse(format!("Unsupported character '{c}' in term \"{raw}\"")).into())
      }
    })
    .collect()
}

#[derive(Clone, Debug, Default)]
pub struct WordList {
  words: Vec<Word>,
}

impl WordList {
  fn parse_line(line_number: usize, line: &str) -> XWordResult<Option<Word>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      return Ok(None);
    }

    let items: Vec<_> = line.split('\t').collect();
    if items.len() < 2 {
      return Err(
        XWordError::Parse(format!(
          "line {line_number}: expected id<TAB>term<TAB>clue, found \"{line}\""
        ))
        .into(),
      );
    }

    let term = normalize_term(items[1])
      .map_err(|err| XWordError::Parse(format!("line {line_number}: {err}")))?;
    let clue = items[2..].iter().map(|item| item.trim()).join(" ");
    Ok(Some(Word::new(items[0].trim(), term, clue)))
  }

  pub fn parse<S>(lines: impl IntoIterator<Item = S>) -> XWordResult<Self>
  where
    S: Borrow<String>,
  {
    let words = lines
      .into_iter()
      .enumerate()
      .map(|(idx, line)| Self::parse_line(idx + 1, line.borrow()))
      .filter_map_ok(|word| word)
      .collect::<XWordResult<Vec<_>>>()?;
    Ok(Self { words })
  }

  pub fn read_file(path: impl AsRef<Path>) -> XWordResult<Self> {
    let lines = BufReader::new(File::open(path)?)
      .lines()
      .collect::<Result<Vec<_>, _>>()?;
    Self::parse(lines)
  }

  /// Builds a list from bare terms, with ids `w1`, `w2`, ... and no clues.
  pub fn from_terms<S: AsRef<str>>(terms: impl IntoIterator<Item = S>) -> XWordResult<Self> {
    let words = terms
      .into_iter()
      .enumerate()
      .map(|(idx, term)| -> XWordResult<Word> {
        Ok(Word::new(format!("w{}", idx + 1), normalize_term(term.as_ref())?, ""))
      })
      .collect::<XWordResult<Vec<_>>>()?;
    Ok(Self { words })
  }

  pub fn words(&self) -> &[Word] {
    &self.words
  }

  pub fn into_words(self) -> Vec<Word> {
    self.words
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }
}
