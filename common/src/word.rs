use std::fmt::Display;

use bitcode::{Decode, Encode};

/// A vocabulary entry handed to the generator. `term` is expected to be
/// uppercase ASCII letters only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Encode, Decode)]
pub struct Word {
  pub id: String,
  pub term: String,
  pub clue: String,
}

impl Word {
  pub fn new(id: impl Into<String>, term: impl Into<String>, clue: impl Into<String>) -> Self {
    Self { id: id.into(), term: term.into(), clue: clue.into() }
  }

  pub fn len(&self) -> usize {
    self.term.len()
  }

  pub fn is_empty(&self) -> bool {
    self.term.is_empty()
  }

  pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
    self.term.chars()
  }
}

impl Display for Word {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} ({})", self.term, self.id)
  }
}
