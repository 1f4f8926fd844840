use std::{
  fmt::Display,
  iter,
  time::{Duration, Instant},
};

use common::{crossword::Puzzle, word::Word};
use itertools::Itertools;
use log::{debug, error, trace};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use util::{
  error::{XWordError, XWordResult},
  time::time_fn,
};

use crate::{
  board::Board,
  cluster::{cluster, Cluster, Difficulty},
  compat::CompatMatrix,
  config::GeneratorConfig,
  connectivity::is_connected,
  search::{PlacementSearch, SearchOutcome},
  validate::validate_words,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnplacedReason {
  /// Longer than the largest allowed grid.
  TooLong,
  /// Fits on a grid, but no legal crossing was found for it.
  NoCrossing,
}

impl Display for UnplacedReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      UnplacedReason::TooLong => write!(f, "too long for the largest grid"),
      UnplacedReason::NoCrossing => write!(f, "no legal crossing"),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnplacedWord {
  pub word: Word,
  pub reason: UnplacedReason,
}

/// Diagnostics for one placement pass. Passes past the last cluster are
/// leftover passes.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterStats {
  pub index: usize,
  pub words: usize,
  pub placed: usize,
  pub attempts: usize,
  pub coverage: f32,
  pub avg_compatibility: f64,
  pub difficulty: Difficulty,
  pub backtracked: bool,
  pub elapsed: Duration,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationStats {
  pub clusters: Vec<ClusterStats>,
  pub leftover_passes: usize,
  /// Number of times a failed word was moved to a later cluster.
  pub redistributed: usize,
  pub elapsed: Duration,
  /// Seed the attempt shuffles were drawn from. Passing it back through
  /// `GeneratorConfig::with_seed` reproduces the run.
  pub seed: u64,
}

#[derive(Clone, Debug)]
pub struct GenerationReport {
  pub puzzles: Vec<Puzzle>,
  pub unplaced: Vec<UnplacedWord>,
  pub stats: GenerationStats,
}

impl GenerationReport {
  pub fn placed_count(&self) -> usize {
    self
      .puzzles
      .iter()
      .map(|puzzle| puzzle.placed_words().len())
      .sum()
  }

  /// Fraction of the batch that made it into a puzzle.
  pub fn coverage(&self) -> f32 {
    let placed = self.placed_count();
    let total = placed + self.unplaced.len();
    if total == 0 {
      1.0
    } else {
      placed as f32 / total as f32
    }
  }
}

fn pass_seed(seed: u64, index: usize) -> u64 {
  seed.wrapping_add((index as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9))
}

/// State of a single `Generator::generate` call.
struct GenerationRun<'a> {
  words: &'a [Word],
  config: &'a GeneratorConfig,
  matrix: CompatMatrix,
  seed: u64,
  deadline: Option<Instant>,
  puzzles: Vec<Puzzle>,
  stats: GenerationStats,
}

impl<'a> GenerationRun<'a> {
  fn new(words: &'a [Word], config: &'a GeneratorConfig, seed: u64) -> Self {
    Self {
      words,
      config,
      matrix: CompatMatrix::new(words),
      seed,
      deadline: config.time_budget.map(|budget| Instant::now() + budget),
      puzzles: vec![],
      stats: GenerationStats { seed, ..GenerationStats::default() },
    }
  }

  fn search(&self, members: &[usize]) -> PlacementSearch<'a> {
    let longest = members
      .iter()
      .map(|&slot| self.words[slot].len())
      .max()
      .unwrap_or(0);
    PlacementSearch::new(
      self.words,
      members.to_vec(),
      self.config.grid_size_for(longest),
      self.config,
    )
    .with_deadline(self.deadline)
  }

  /// Turns the board into a puzzle, or `None` if nothing was placed. Boards
  /// that break connectivity or the crossing rules are never returned.
  fn finish(&self, board: &Board) -> XWordResult<Option<Puzzle>> {
    if board.is_empty() {
      return Ok(None);
    }

    let puzzle = board.to_puzzle(self.words)?;
    let connected = is_connected(puzzle.placed_words());
    let layout = puzzle.check_layout();
    debug_assert!(
      connected && layout.is_ok(),
      "invalid puzzle (connected: {connected}, layout: {layout:?}):\n{puzzle}"
    );

    match (connected, layout) {
      (true, Ok(())) => Ok(Some(puzzle)),
      (false, _) => {
        error!("Discarding disconnected puzzle:\n{puzzle}");
        Ok(None)
      }
      (_, Err(err)) => {
        error!("Discarding puzzle with invalid layout: {err}\n{puzzle}");
        Ok(None)
      }
    }
  }

  /// Alternate orderings for a search that left a few words behind: each
  /// failed word first, right after the longest word, and right after its
  /// most compatible placed word, then seeded shuffles with the failed words
  /// in front.
  fn backtrack_orderings(
    &self,
    search: &PlacementSearch,
    outcome: &SearchOutcome,
    seed: u64,
  ) -> Vec<Vec<usize>> {
    let base = search.base_order();
    let failed = &outcome.unplaced;
    let without = |skip: &[usize]| {
      base
        .iter()
        .cloned()
        .filter(|slot| !skip.contains(slot))
        .collect_vec()
    };

    let mut orderings = vec![];
    for &slot in failed {
      orderings.push(iter::once(slot).chain(without(&[slot])).collect_vec());

      if let Some(&longest) = base.iter().find(|&&other| other != slot) {
        orderings.push(
          [longest, slot]
            .into_iter()
            .chain(without(&[longest, slot]))
            .collect_vec(),
        );
      }

      if let Some(partner) = outcome
        .placed
        .iter()
        .cloned()
        .min_by_key(|&placed| std::cmp::Reverse(self.matrix.score(slot, placed)))
      {
        let mut ordering = outcome.placed.clone();
        let at = ordering
          .iter()
          .position(|&placed| placed == partner)
          .map_or(0, |at| at + 1);
        ordering.insert(at, slot);
        ordering.extend(failed.iter().cloned().filter(|&other| other != slot));
        orderings.push(ordering);
      }
    }

    let mut rng = StdRng::seed_from_u64(seed.rotate_left(29));
    let mut front = failed.clone();
    let mut rest = without(failed);
    while orderings.len() < self.config.backtrack_attempts {
      front.shuffle(&mut rng);
      rest.shuffle(&mut rng);
      orderings.push(front.iter().chain(&rest).cloned().collect_vec());
    }

    orderings
      .into_iter()
      .unique()
      .take(self.config.backtrack_attempts)
      .collect()
  }

  /// Retries the search with alternate orderings and keeps the retry only if
  /// it places strictly more words.
  fn backtrack(&self, search: &PlacementSearch, outcome: SearchOutcome, seed: u64) -> SearchOutcome {
    let orderings = self.backtrack_orderings(search, &outcome, seed);
    let retry = search.run_orderings(&orderings);
    let attempts = outcome.attempts + retry.attempts;
    trace!(
      "backtracking placed {} (was {}) over {} orderings",
      retry.placed.len(),
      outcome.placed.len(),
      orderings.len()
    );

    if retry.placed.len() > outcome.placed.len() {
      SearchOutcome { attempts, ..retry }
    } else {
      SearchOutcome { attempts, ..outcome }
    }
  }

  /// Runs one placement pass over `group`, appending its puzzle if anything
  /// was placed. Returns the slots that did not make it into the puzzle.
  fn pass(&mut self, group: &Cluster, index: usize, allow_backtrack: bool) -> XWordResult<Vec<usize>> {
    let search = self.search(group.members());
    let seed = pass_seed(self.seed, index);

    let (elapsed, (outcome, backtracked)) = time_fn(|| {
      let outcome = search.run(seed);
      let failures = outcome.unplaced.len();
      if allow_backtrack && (1..=self.config.backtrack_max_failures).contains(&failures) {
        (self.backtrack(&search, outcome, seed), true)
      } else {
        (outcome, false)
      }
    });

    let SearchOutcome { board, placed, mut unplaced, attempts } = outcome;
    if let Some((min, max)) = board.bounding_box() {
      trace!("pass {index}: letters span {}", max - min);
    }
    let puzzle = self.finish(&board)?;
    let placed = match &puzzle {
      Some(puzzle) => puzzle.placed_words().len(),
      None => {
        unplaced.extend(placed);
        0
      }
    };

    debug!(
      "pass {index}: placed {placed}/{} on a {size}x{size} grid in {attempts} attempts ({}, \
       compatibility {:.1}{}) in {elapsed:?}",
      group.len(),
      group.difficulty(),
      group.avg_compatibility(),
      if backtracked { ", backtracked" } else { "" },
      size = search.grid_size(),
    );

    self.stats.clusters.push(ClusterStats {
      index,
      words: group.len(),
      placed,
      attempts,
      coverage: if group.is_empty() {
        1.0
      } else {
        placed as f32 / group.len() as f32
      },
      avg_compatibility: group.avg_compatibility(),
      difficulty: group.difficulty(),
      backtracked,
      elapsed,
    });
    self.puzzles.extend(puzzle);

    Ok(unplaced)
  }

  /// The later cluster with the highest positive average compatibility with
  /// `slot`, as an offset into `later`. The first one wins ties.
  fn redistribution_target(&self, slot: usize, later: &[Cluster]) -> Option<usize> {
    later
      .iter()
      .enumerate()
      .map(|(offset, cluster)| (offset, self.matrix.average(slot, cluster.members())))
      .filter(|&(_, avg)| avg > 0.0)
      .fold(None, |best, (offset, avg)| match best {
        Some((_, best_avg)) if best_avg >= avg => best,
        _ => Some((offset, avg)),
      })
      .map(|(offset, _)| offset)
  }

  fn unplaced_word(&self, slot: usize) -> UnplacedWord {
    let word = self.words[slot].clone();
    let reason = if word.len() > self.config.max_grid_size as usize {
      UnplacedReason::TooLong
    } else {
      UnplacedReason::NoCrossing
    };
    UnplacedWord { word, reason }
  }

  fn run(mut self) -> XWordResult<GenerationReport> {
    let mut clusters = cluster(
      self.words,
      &self.matrix,
      self.config.target_cluster_size,
      self.config.max_cluster_size,
    );
    debug!(
      "{} words in {} clusters (seed {})",
      self.words.len(),
      clusters.len(),
      self.seed
    );

    let mut leftover = vec![];
    for index in 0..clusters.len() {
      let failed = self.pass(&clusters[index], index, index > 0)?;
      for slot in failed {
        match self.redistribution_target(slot, &clusters[index + 1..]) {
          Some(offset) => {
            let target = index + 1 + offset;
            trace!("moving {} to cluster {target}", self.words[slot].term);
            clusters[target].push(slot, &self.matrix);
            self.stats.redistributed += 1;
          }
          None => leftover.push(slot),
        }
      }
    }

    while !leftover.is_empty() {
      let pool = Cluster::new(std::mem::take(&mut leftover), &self.matrix);
      let index = clusters.len() + self.stats.leftover_passes;
      self.stats.leftover_passes += 1;

      leftover = self.pass(&pool, index, false)?;
      if leftover.len() == pool.len() {
        break;
      }
    }

    let unplaced = leftover
      .into_iter()
      .map(|slot| self.unplaced_word(slot))
      .collect_vec();
    check_coverage(self.words, &self.puzzles, &unplaced)?;

    Ok(GenerationReport { puzzles: self.puzzles, unplaced, stats: self.stats })
  }
}

/// Every word must appear exactly once, either in a puzzle or as unplaced.
fn check_coverage(words: &[Word], puzzles: &[Puzzle], unplaced: &[UnplacedWord]) -> XWordResult {
  let counts = puzzles
    .iter()
    .flat_map(|puzzle| puzzle.placed_words().iter().map(|word| word.id.as_str()))
    .chain(unplaced.iter().map(|unplaced| unplaced.word.id.as_str()))
    .counts();

  if let Some(word) = words
    .iter()
    .find(|word| counts.get(word.id.as_str()) != Some(&1))
  {
    return Err(
      XWordError::Internal(format!(
        "Word {} appears {} times in the result",
        word.id,
        counts.get(word.id.as_str()).unwrap_or(&0)
      ))
      .into(),
    );
  }
  if counts.len() != words.len() {
    return Err(
      XWordError::Internal(format!(
        "Result holds {} distinct words, expected {}",
        counts.len(),
        words.len()
      ))
      .into(),
    );
  }

  Ok(())
}

/// Turns a batch of words into as few connected crossword puzzles as it can
/// manage, reporting any word it could not fit.
#[derive(Clone, Debug, Default)]
pub struct Generator {
  config: GeneratorConfig,
}

impl Generator {
  pub fn new(config: GeneratorConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &GeneratorConfig {
    &self.config
  }

  pub fn generate(&self, words: &[Word]) -> XWordResult<GenerationReport> {
    self.config.validate()?;
    validate_words(words)?;

    let seed = self.config.seed.unwrap_or_else(rand::random);
    let (elapsed, report) = time_fn(|| GenerationRun::new(words, &self.config, seed).run());
    let mut report = report?;
    report.stats.elapsed = elapsed;

    debug!(
      "generated {} puzzles covering {}/{} words in {elapsed:?}",
      report.puzzles.len(),
      report.placed_count(),
      words.len()
    );
    Ok(report)
  }
}
