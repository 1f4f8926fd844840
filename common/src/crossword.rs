use std::{collections::HashMap, fmt::Display, iter::once};

use bitcode::{Decode, Encode};
use itertools::Itertools;
use util::{
  error::{XWordError, XWordResult},
  grid::{Grid, Gridlike, MutGridlike},
  pos::{Diff, Pos},
};

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Encode, Decode)]
pub enum Direction {
  Across,
  Down,
}

impl Direction {
  pub const ALL: [Direction; 2] = [Direction::Across, Direction::Down];

  pub const fn step(self) -> Diff {
    match self {
      Direction::Across => Diff::DX,
      Direction::Down => Diff::DY,
    }
  }

  pub const fn other(self) -> Self {
    match self {
      Direction::Across => Direction::Down,
      Direction::Down => Direction::Across,
    }
  }
}

impl Display for Direction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Direction::Across => write!(f, "across"),
      Direction::Down => write!(f, "down"),
    }
  }
}

/// A cell shared with another word. `position` indexes into this word's term,
/// `other_word_position` into the other word's.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct Crossing {
  pub position: u32,
  pub other_word_id: String,
  pub other_word_position: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct PlacedWord {
  pub id: String,
  pub term: String,
  pub clue: String,
  pub x: u32,
  pub y: u32,
  pub direction: Direction,
  pub number: u32,
  pub crossings: Vec<Crossing>,
}

impl PlacedWord {
  pub fn origin(&self) -> Pos {
    Pos::new(self.x as i32, self.y as i32)
  }

  pub fn len(&self) -> usize {
    self.term.len()
  }

  pub fn is_empty(&self) -> bool {
    self.term.is_empty()
  }

  pub fn pos_at(&self, position: u32) -> Pos {
    self.origin() + position as i32 * self.direction.step()
  }

  pub fn letter_positions(&self) -> impl Iterator<Item = (char, Pos)> + '_ {
    self
      .term
      .chars()
      .enumerate()
      .map(move |(idx, c)| (c, self.pos_at(idx as u32)))
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub enum PuzzleTile {
  Letter(char),
  #[default]
  Blocked,
}

impl PuzzleTile {
  pub fn is_blocked(&self) -> bool {
    matches!(self, PuzzleTile::Blocked)
  }
}

impl Display for PuzzleTile {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}",
      match self {
        PuzzleTile::Letter(c) => *c,
        PuzzleTile::Blocked => '#',
      }
    )
  }
}

/// A maximal sequence of consecutive letters in one row or column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LetterRun {
  pub pos: Pos,
  pub direction: Direction,
  pub length: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct Puzzle {
  grid_size: u32,
  grid: Grid<PuzzleTile>,
  placed_words: Vec<PlacedWord>,
}

impl Puzzle {
  /// Renders the placements into a square grid and numbers them in reading
  /// order, across before down when two words start on the same cell.
  pub fn from_placements(grid_size: u32, placed_words: Vec<PlacedWord>) -> XWordResult<Self> {
    let mut grid = Grid::square(grid_size);
    for word in &placed_words {
      for (c, tile_pos) in word.letter_positions() {
        let tile = grid.get_mut(tile_pos).ok_or_else(|| {
          XWordError::Internal(format!(
            "Letter {c} of {} at {tile_pos} is out of bounds",
            word.term
          ))
        })?;
        match tile {
          PuzzleTile::Letter(existing_c) => {
            if c != *existing_c {
              return Err(
                XWordError::Internal(format!(
                  "Conflicting letter assignment at position {tile_pos}: {c} vs {existing_c}"
                ))
                .into(),
              );
            }
          }
          PuzzleTile::Blocked => *tile = PuzzleTile::Letter(c),
        }
      }
    }

    let placed_words = placed_words
      .into_iter()
      .sorted_by_key(|word| (word.y, word.x, word.direction))
      .enumerate()
      .map(|(idx, word)| PlacedWord { number: idx as u32 + 1, ..word })
      .collect();

    Ok(Self { grid_size, grid, placed_words })
  }

  pub fn grid_size(&self) -> u32 {
    self.grid_size
  }

  pub fn grid(&self) -> &Grid<PuzzleTile> {
    &self.grid
  }

  pub fn placed_words(&self) -> &[PlacedWord] {
    &self.placed_words
  }

  pub fn word(&self, id: &str) -> Option<&PlacedWord> {
    self.placed_words.iter().find(|word| word.id == id)
  }

  pub fn clues(&self, direction: Direction) -> impl Iterator<Item = &PlacedWord> {
    self
      .placed_words
      .iter()
      .filter(move |word| word.direction == direction)
  }

  fn board_row_runs<G: Gridlike<PuzzleTile>>(board: G) -> Vec<LetterRun> {
    (0..board.height())
      .flat_map(|y| {
        let mut runs = vec![];
        let mut start = None;
        for (x, tile) in board
          .iter_row(y)
          .chain(once(&PuzzleTile::Blocked))
          .enumerate()
        {
          match (tile.is_blocked(), start) {
            (false, None) => start = Some(x),
            (true, Some(run_start)) => {
              runs.push(LetterRun {
                pos: Pos::new(run_start as i32, y as i32),
                direction: Direction::Across,
                length: (x - run_start) as u32,
              });
              start = None;
            }
            _ => {}
          }
        }
        runs
      })
      .collect()
  }

  /// Every maximal run of letters, including single letters.
  pub fn letter_runs(&self) -> Vec<LetterRun> {
    Self::board_row_runs(&self.grid)
      .into_iter()
      .chain(
        Self::board_row_runs(self.grid.transpose())
          .into_iter()
          .map(|run| LetterRun {
            pos: run.pos.transpose(),
            direction: Direction::Down,
            ..run
          }),
      )
      .collect()
  }

  /// Checks that every run of two or more letters is exactly one placed word,
  /// i.e. no two words touch without crossing.
  pub fn check_layout(&self) -> XWordResult {
    let words: HashMap<_, _> = self
      .placed_words
      .iter()
      .map(|word| ((word.origin(), word.direction), word.len() as u32))
      .collect();

    let runs = self
      .letter_runs()
      .into_iter()
      .filter(|run| run.length >= 2)
      .collect_vec();
    for run in &runs {
      match words.get(&(run.pos, run.direction)) {
        Some(&length) if length == run.length => {}
        _ => {
          return Err(
            XWordError::Internal(format!(
              "Run of {} letters {} at {} is not a placed word",
              run.length, run.direction, run.pos
            ))
            .into(),
          )
        }
      }
    }

    if runs.len() != self.placed_words.len() {
      return Err(
        XWordError::Internal(format!(
          "{} placed words but {} letter runs",
          self.placed_words.len(),
          runs.len()
        ))
        .into(),
      );
    }

    Ok(())
  }
}

impl Display for Puzzle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.grid)
  }
}
