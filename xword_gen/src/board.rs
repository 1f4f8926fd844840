use common::{
  crossword::{Crossing, Direction, PlacedWord, Puzzle},
  word::Word,
};
use util::{
  error::{XWordError, XWordResult},
  grid::{Grid, Gridlike, MutGridlike},
  pos::Pos,
};

#[derive(Clone, Debug, Default)]
struct Cell {
  letter: Option<char>,
  /// Indices into `Board::entries` of the words covering this cell.
  across: Option<usize>,
  down: Option<usize>,
}

impl Cell {
  fn occupant(&self, direction: Direction) -> Option<usize> {
    match direction {
      Direction::Across => self.across,
      Direction::Down => self.down,
    }
  }

  fn set_occupant(&mut self, direction: Direction, entry: usize) {
    match direction {
      Direction::Across => self.across = Some(entry),
      Direction::Down => self.down = Some(entry),
    }
  }
}

fn word_for(words: &[Word], slot: usize) -> XWordResult<&Word> {
  words
    .get(slot)
    .ok_or_else(|| XWordError::Internal(format!("Unknown word slot {slot}")).into())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardCrossing {
  pub position: u32,
  pub other_slot: usize,
  pub other_position: u32,
}

/// A word on the board. `slot` is the caller's index for the word, the
/// position of the word in the batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardEntry {
  pub slot: usize,
  pub pos: Pos,
  pub direction: Direction,
  pub crossings: Vec<BoardCrossing>,
}

/// The square letter grid of one placement attempt.
#[derive(Clone, Debug)]
pub struct Board {
  cells: Grid<Cell>,
  entries: Vec<BoardEntry>,
}

impl Board {
  pub fn new(size: u32) -> Self {
    Self { cells: Grid::square(size), entries: vec![] }
  }

  pub fn size(&self) -> u32 {
    self.cells.width()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn entries(&self) -> &[BoardEntry] {
    &self.entries
  }

  pub fn letter(&self, pos: Pos) -> Option<char> {
    self.cells.get(pos).and_then(|cell| cell.letter)
  }

  /// Off-board positions count as open.
  fn is_open(&self, pos: Pos) -> bool {
    self.cells.get(pos).is_none_or(|cell| cell.letter.is_none())
  }

  /// Number of existing letters `term` would cross if placed at `pos`, or
  /// `None` if the placement is illegal. A legal word stays on the board,
  /// agrees with every letter it covers, never overlaps a word running the
  /// same way, and only touches other words where it crosses them.
  pub fn crossing_count(&self, term: &str, pos: Pos, direction: Direction) -> Option<u32> {
    let step = direction.step();
    let side = step.transpose();
    let len = term.len() as i32;
    if len == 0
      || !self.cells.in_bounds(pos)
      || !self.cells.in_bounds(pos + (len - 1) * step)
      || !self.is_open(pos - step)
      || !self.is_open(pos + len * step)
    {
      return None;
    }

    let mut crossings = 0;
    for (idx, c) in term.chars().enumerate() {
      let cell_pos = pos + idx as i32 * step;
      let cell = self.cells.get(cell_pos)?;
      match cell.letter {
        Some(existing) => {
          if existing != c || cell.occupant(direction).is_some() {
            return None;
          }
          crossings += 1;
        }
        None => {
          if !self.is_open(cell_pos + side) || !self.is_open(cell_pos - side) {
            return None;
          }
        }
      }
    }

    Some(crossings)
  }

  pub fn can_place(&self, term: &str, pos: Pos, direction: Direction) -> bool {
    self.crossing_count(term, pos, direction).is_some()
  }

  /// Writes `term` onto the board, recording the crossings on both words.
  /// Leaves the board untouched if the placement is illegal.
  pub fn place(
    &mut self,
    slot: usize,
    term: &str,
    pos: Pos,
    direction: Direction,
  ) -> XWordResult<&BoardEntry> {
    if !self.can_place(term, pos, direction) {
      return Err(
        XWordError::Internal(format!("Cannot place {term} {direction} at {pos}")).into(),
      );
    }

    let step = direction.step();
    let entry_idx = self.entries.len();
    let mut crossed = vec![];
    for (idx, c) in term.chars().enumerate() {
      let cell_pos = pos + idx as i32 * step;
      let cell = self.cells.get_mut(cell_pos).ok_or_else(|| {
        XWordError::Internal(format!("Position {cell_pos} is out of bounds"))
      })?;
      if let Some(other_entry) = cell.occupant(direction.other()) {
        crossed.push((idx as u32, other_entry, cell_pos));
      }
      cell.letter = Some(c);
      cell.set_occupant(direction, entry_idx);
    }

    let crossings = crossed
      .into_iter()
      .map(|(position, other_entry, cell_pos)| {
        let other = &mut self.entries[other_entry];
        let offset = cell_pos - other.pos;
        let other_position = (offset.x + offset.y) as u32;
        other.crossings.push(BoardCrossing {
          position: other_position,
          other_slot: slot,
          other_position: position,
        });
        BoardCrossing { position, other_slot: other.slot, other_position }
      })
      .collect();

    self.entries.push(BoardEntry { slot, pos, direction, crossings });
    Ok(&self.entries[entry_idx])
  }

  /// Smallest and largest lettered positions, if any letter is placed.
  pub fn bounding_box(&self) -> Option<(Pos, Pos)> {
    self
      .cells
      .positions()
      .filter(|&pos| self.letter(pos).is_some())
      .fold(None, |bounds, pos| match bounds {
        None => Some((pos, pos)),
        Some((min, max)) => Some((
          Pos::new(min.x.min(pos.x), min.y.min(pos.y)),
          Pos::new(max.x.max(pos.x), max.y.max(pos.y)),
        )),
      })
  }

  /// The placed words with their batch metadata, numbered 0.
  pub fn placed_words(&self, words: &[Word]) -> XWordResult<Vec<PlacedWord>> {
    self
      .entries
      .iter()
      .map(|entry| -> XWordResult<PlacedWord> {
        let word = word_for(words, entry.slot)?;
        let crossings = entry
          .crossings
          .iter()
          .map(|crossing| -> XWordResult<Crossing> {
            Ok(Crossing {
              position: crossing.position,
              other_word_id: word_for(words, crossing.other_slot)?.id.clone(),
              other_word_position: crossing.other_position,
            })
          })
          .collect::<XWordResult<Vec<_>>>()?;

        Ok(PlacedWord {
          id: word.id.clone(),
          term: word.term.clone(),
          clue: word.clue.clone(),
          x: entry.pos.x as u32,
          y: entry.pos.y as u32,
          direction: entry.direction,
          number: 0,
          crossings,
        })
      })
      .collect()
  }

  pub fn to_puzzle(&self, words: &[Word]) -> XWordResult<Puzzle> {
    Puzzle::from_placements(self.size(), self.placed_words(words)?)
  }
}
