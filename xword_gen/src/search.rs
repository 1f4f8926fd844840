use std::{cmp::Reverse, time::Instant};

use common::{crossword::Direction, word::Word};
use itertools::Itertools;
use log::trace;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rayon::prelude::*;
use util::pos::Pos;

use crate::{board::Board, config::GeneratorConfig};

const CROSSING_SCORE: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
  pub pos: Pos,
  pub direction: Direction,
  pub crossings: u32,
}

impl Placement {
  pub fn score(&self) -> u32 {
    self.crossings * CROSSING_SCORE
  }
}

/// The board of the best attempt, with the batch slots it did and did not
/// manage to place.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
  pub board: Board,
  pub placed: Vec<usize>,
  pub unplaced: Vec<usize>,
  pub attempts: usize,
}

impl SearchOutcome {
  pub fn coverage(&self) -> f32 {
    let total = self.placed.len() + self.unplaced.len();
    if total == 0 {
      1.0
    } else {
      self.placed.len() as f32 / total as f32
    }
  }
}

/// Where the first word of an attempt goes.
pub fn centered(size: u32, len: usize) -> Pos {
  Pos::new((size.saturating_sub(len as u32) / 2) as i32, (size / 2) as i32)
}

/// Highest scoring legal position for `term`. Once the board holds a word,
/// only positions crossing at least one letter are considered.
pub fn best_placement(board: &Board, term: &str) -> Option<Placement> {
  let size = board.size() as i32;
  let must_cross = !board.is_empty();

  (0..size)
    .flat_map(|y| (0..size).map(move |x| Pos::new(x, y)))
    .flat_map(|pos| Direction::ALL.map(|direction| (pos, direction)))
    .filter_map(|(pos, direction)| {
      board
        .crossing_count(term, pos, direction)
        .filter(|&crossings| !must_cross || crossings > 0)
        .map(|crossings| Placement { pos, direction, crossings })
    })
    .fold(None, |best: Option<Placement>, placement| match best {
      Some(best) if best.score() >= placement.score() => Some(best),
      _ => Some(placement),
    })
}

/// Seed for one attempt, spread so neighbouring attempts and searches don't
/// draw correlated shuffles.
fn attempt_seed(seed: u64, attempt: usize) -> u64 {
  seed ^ (attempt as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

pub struct PlacementSearch<'a> {
  words: &'a [Word],
  members: Vec<usize>,
  grid_size: u32,
  config: &'a GeneratorConfig,
  deadline: Option<Instant>,
}

impl<'a> PlacementSearch<'a> {
  /// Searches for a layout of `members`, indices into `words`.
  pub fn new(
    words: &'a [Word],
    members: Vec<usize>,
    grid_size: u32,
    config: &'a GeneratorConfig,
  ) -> Self {
    Self { words, members, grid_size, config, deadline: None }
  }

  pub fn with_deadline(self, deadline: Option<Instant>) -> Self {
    Self { deadline, ..self }
  }

  pub fn grid_size(&self) -> u32 {
    self.grid_size
  }

  /// Members sorted longest first, keeping batch order between equal lengths.
  pub fn base_order(&self) -> Vec<usize> {
    self
      .members
      .iter()
      .cloned()
      .sorted_by_key(|&slot| Reverse(self.words[slot].len()))
      .collect()
  }

  /// Ordering for attempt `attempt`: longest first for attempt 0, otherwise
  /// the longest word followed by a seeded shuffle of the rest.
  pub fn ordering_for(&self, attempt: usize, seed: u64) -> Vec<usize> {
    let mut order = self.base_order();
    if attempt > 0 && order.len() > 2 {
      let mut rng = StdRng::seed_from_u64(attempt_seed(seed, attempt));
      order[1..].shuffle(&mut rng);
    }
    order
  }

  /// One pass over `ordering` on a fresh board.
  pub fn attempt(&self, ordering: &[usize]) -> SearchOutcome {
    let mut board = Board::new(self.grid_size);
    let mut placed = vec![];
    let mut unplaced = vec![];

    for &slot in ordering {
      let term = &self.words[slot].term;
      let placement = if board.is_empty() {
        let pos = centered(self.grid_size, term.len());
        board
          .can_place(term, pos, Direction::Across)
          .then_some(Placement { pos, direction: Direction::Across, crossings: 0 })
      } else {
        best_placement(&board, term)
      };

      match placement.map(|placement| board.place(slot, term, placement.pos, placement.direction))
      {
        Some(Ok(_)) => placed.push(slot),
        Some(Err(err)) => {
          trace!("{term}: {err}");
          unplaced.push(slot);
        }
        None => unplaced.push(slot),
      }
    }

    SearchOutcome { board, placed, unplaced, attempts: 1 }
  }

  fn out_of_time(&self) -> bool {
    self
      .deadline
      .is_some_and(|deadline| Instant::now() >= deadline)
  }

  fn should_stop(&self, placed: usize, attempts: usize) -> bool {
    let total = self.members.len();
    placed == total
      || (attempts >= self.config.early_stop_min_attempts
        && placed as f32 / total as f32 >= self.config.early_stop_coverage)
  }

  /// Evaluates orderings `0..count` and keeps the first outcome with the most
  /// placed words. With `parallelism > 1` orderings are evaluated in batches on
  /// the rayon pool, then folded in order, so the winner does not depend on the
  /// parallelism.
  fn best_of<F>(&self, count: usize, ordering: F, early_stop: bool) -> SearchOutcome
  where
    F: Fn(usize) -> Vec<usize> + Sync,
  {
    let width = self.config.parallelism.max(1);
    let mut best: Option<SearchOutcome> = None;
    let mut attempts = 0;

    'search: while attempts < count {
      if attempts > 0 && self.out_of_time() {
        trace!("time budget exhausted after {attempts} attempts");
        break;
      }

      let batch = attempts..(attempts + width).min(count);
      let outcomes: Vec<_> = if width == 1 {
        batch.map(|idx| self.attempt(&ordering(idx))).collect()
      } else {
        batch
          .into_par_iter()
          .map(|idx| self.attempt(&ordering(idx)))
          .collect()
      };

      for outcome in outcomes {
        attempts += 1;
        trace!(
          "attempt {attempts}: placed {}/{}",
          outcome.placed.len(),
          self.members.len()
        );
        if best
          .as_ref()
          .is_none_or(|best| outcome.placed.len() > best.placed.len())
        {
          best = Some(outcome);
        }

        let placed = best.as_ref().map_or(0, |best| best.placed.len());
        if placed == self.members.len() || (early_stop && self.should_stop(placed, attempts)) {
          break 'search;
        }
      }
    }

    match best {
      Some(best) => SearchOutcome { attempts, ..best },
      None => SearchOutcome {
        board: Board::new(self.grid_size),
        placed: vec![],
        unplaced: self.base_order(),
        attempts,
      },
    }
  }

  /// Multi-start search: up to `max_attempts` orderings, stopping early once
  /// every word is placed or coverage is good enough.
  pub fn run(&self, seed: u64) -> SearchOutcome {
    self.best_of(
      self.config.max_attempts,
      |attempt| self.ordering_for(attempt, seed),
      true,
    )
  }

  /// Best outcome over caller supplied orderings.
  pub fn run_orderings(&self, orderings: &[Vec<usize>]) -> SearchOutcome {
    self.best_of(orderings.len(), |idx| orderings[idx].clone(), false)
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use common::{crossword::Direction, word::Word};
  use googletest::prelude::*;
  use itertools::Itertools;
  use util::pos::Pos;

  use crate::{board::Board, config::GeneratorConfig, connectivity::is_connected};

  use super::{best_placement, centered, PlacementSearch};

  fn words(terms: &[&str]) -> Vec<Word> {
    terms
      .iter()
      .enumerate()
      .map(|(idx, term)| Word::new(format!("w{idx}"), *term, ""))
      .collect()
  }

  fn config() -> GeneratorConfig {
    GeneratorConfig::default().with_time_budget(None)
  }

  #[gtest]
  fn test_centered() {
    expect_eq!(centered(10, 3), Pos::new(3, 5));
    expect_eq!(centered(11, 11), Pos::new(0, 5));
  }

  #[gtest]
  fn test_best_placement_requires_crossing() {
    let mut board = Board::new(9);
    expect_that!(best_placement(&board, "DOG"), some(anything()));

    board
      .place(0, "CAT", Pos::new(2, 2), Direction::Across)
      .unwrap();
    expect_that!(best_placement(&board, "DOG"), none());
    expect_eq!(best_placement(&board, "TOE").unwrap().crossings, 1);
  }

  #[gtest]
  fn test_best_placement_prefers_more_crossings() {
    let mut board = Board::new(9);
    board
      .place(0, "CAT", Pos::new(2, 2), Direction::Across)
      .unwrap();
    board
      .place(1, "CUP", Pos::new(2, 2), Direction::Down)
      .unwrap();
    board
      .place(2, "TOP", Pos::new(4, 2), Direction::Down)
      .unwrap();

    let placement = best_placement(&board, "PEP").unwrap();
    expect_eq!(placement.pos, Pos::new(2, 4));
    expect_eq!(placement.direction, Direction::Across);
    expect_eq!(placement.crossings, 2);
  }

  #[gtest]
  fn test_single_word() {
    let words = words(&["CAT"]);
    let config = config();
    let outcome = PlacementSearch::new(&words, vec![0], 10, &config).run(7);

    expect_that!(outcome.placed, container_eq([0]));
    expect_true!(outcome.unplaced.is_empty());
    expect_eq!(outcome.attempts, 1);
    expect_eq!(outcome.board.entries()[0].pos, Pos::new(3, 5));
    expect_eq!(outcome.board.entries()[0].direction, Direction::Across);
  }

  #[gtest]
  fn test_too_long_for_grid() {
    let words = words(&["EXTRAORDINARY", "CAT"]);
    let config = config();
    let outcome = PlacementSearch::new(&words, vec![0, 1], 10, &config).run(7);

    expect_that!(outcome.placed, container_eq([1]));
    expect_that!(outcome.unplaced, container_eq([0]));
  }

  #[gtest]
  fn test_no_shared_letters() {
    let words = words(&["CAT", "DOG"]);
    let config = config();
    let outcome = PlacementSearch::new(&words, vec![0, 1], 10, &config).run(7);

    expect_eq!(outcome.placed.len(), 1);
    expect_eq!(outcome.unplaced.len(), 1);
    expect_eq!(outcome.attempts, config.max_attempts);
  }

  #[gtest]
  fn test_early_stop_on_good_coverage() {
    // Each two letter word hangs off its own letter of the long word; ZZ
    // crosses nothing, leaving 6 of 7 placed on every attempt.
    let words = words(&["ABCDEFGHIJKLM", "AQ", "CQ", "EQ", "GQ", "IQ", "KQ", "ZZ"]);
    let config = config();
    let outcome = PlacementSearch::new(&words, (0..8).collect(), 15, &config).run(7);

    expect_eq!(outcome.placed.len(), 7);
    expect_that!(outcome.unplaced, container_eq([7]));
    expect_eq!(outcome.attempts, config.early_stop_min_attempts);
  }

  #[gtest]
  fn test_places_connected_words() {
    let words = words(&["APPLE", "LEMON", "MELON", "PEACH"]);
    let config = config();
    let outcome = PlacementSearch::new(&words, (0..4).collect(), 10, &config).run(11);

    expect_eq!(outcome.placed.len(), 4);
    let puzzle = outcome.board.to_puzzle(&words).unwrap();
    expect_true!(is_connected(puzzle.placed_words()));
    expect_that!(puzzle.check_layout(), ok(anything()));
  }

  #[gtest]
  fn test_orderings() {
    let words = words(&["AB", "ABCDE", "ABC", "ABCD", "ABCDEF"]);
    let config = config();
    let search = PlacementSearch::new(&words, (0..5).collect(), 10, &config);

    expect_that!(search.ordering_for(0, 3), container_eq([4, 1, 3, 2, 0]));
    for attempt in 1..10 {
      let ordering = search.ordering_for(attempt, 3);
      expect_eq!(ordering[0], 4);
      expect_that!(
        ordering.iter().cloned().sorted().collect_vec(),
        container_eq([0, 1, 2, 3, 4])
      );
      expect_eq!(ordering, search.ordering_for(attempt, 3));
    }
  }

  #[gtest]
  fn test_seeded_runs_match() {
    let words = words(&[
      "ALGORITHM", "BUFFER", "CACHE", "DAEMON", "ENCODER", "FIRMWARE", "GATEWAY", "HANDLER",
      "ITERATOR", "JOURNAL", "KERNEL", "LATENCY",
    ]);
    let config = config();
    let search = PlacementSearch::new(&words, (0..12).collect(), 13, &config);

    let first = search.run(42);
    let second = search.run(42);
    expect_eq!(first.placed, second.placed);
    expect_eq!(first.board.entries(), second.board.entries());
  }

  #[gtest]
  fn test_parallel_matches_sequential() {
    let words = words(&[
      "ALGORITHM", "BUFFER", "CACHE", "DAEMON", "ENCODER", "FIRMWARE", "GATEWAY", "HANDLER",
      "ITERATOR", "JOURNAL", "KERNEL", "LATENCY", "MUTEX", "NETWORK",
    ]);
    let sequential = config();
    let parallel = config().with_parallelism(4);

    let a = PlacementSearch::new(&words, (0..14).collect(), 13, &sequential).run(5);
    let b = PlacementSearch::new(&words, (0..14).collect(), 13, &parallel).run(5);
    expect_eq!(a.placed, b.placed);
    expect_eq!(a.attempts, b.attempts);
    expect_eq!(a.board.entries(), b.board.entries());
  }

  #[gtest]
  fn test_run_orderings_keeps_best() {
    let words = words(&["CAT", "DOG", "GOAT"]);
    let config = config();
    let search = PlacementSearch::new(&words, vec![0, 1, 2], 10, &config);

    // CAT then DOG cannot cross; seeding GOAT first lets both cross it.
    let outcome = search.run_orderings(&[vec![0, 1, 2], vec![2, 0, 1]]);
    expect_eq!(outcome.placed.len(), 3);
    expect_eq!(outcome.attempts, 2);
  }
}
