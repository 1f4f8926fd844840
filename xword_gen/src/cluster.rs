use std::{cmp::Reverse, fmt::Display};

use common::word::Word;
use itertools::Itertools;

use crate::compat::CompatMatrix;

const EASY_THRESHOLD: f64 = 60.0;
const MEDIUM_THRESHOLD: f64 = 30.0;

/// Rough tier of how readily a cluster's words cross each other. Only used
/// for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub fn from_compatibility(avg_compatibility: f64) -> Self {
    if avg_compatibility >= EASY_THRESHOLD {
      Difficulty::Easy
    } else if avg_compatibility >= MEDIUM_THRESHOLD {
      Difficulty::Medium
    } else {
      Difficulty::Hard
    }
  }
}

impl Display for Difficulty {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Difficulty::Easy => write!(f, "easy"),
      Difficulty::Medium => write!(f, "medium"),
      Difficulty::Hard => write!(f, "hard"),
    }
  }
}

/// A group of batch indices meant to become one puzzle.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
  members: Vec<usize>,
  /// Sum of the compatibility of every unordered pair of members.
  pair_total: u64,
  avg_compatibility: f64,
  difficulty: Difficulty,
}

impl Cluster {
  pub fn new(members: Vec<usize>, matrix: &CompatMatrix) -> Self {
    let pair_total = matrix.pair_total(&members);
    let mut cluster = Self {
      members,
      pair_total,
      avg_compatibility: 0.0,
      difficulty: Difficulty::Hard,
    };
    cluster.update_average();
    cluster
  }

  fn update_average(&mut self) {
    let len = self.members.len() as u64;
    let pairs = len * len.saturating_sub(1) / 2;
    self.avg_compatibility = if pairs == 0 {
      0.0
    } else {
      self.pair_total as f64 / pairs as f64
    };
    self.difficulty = Difficulty::from_compatibility(self.avg_compatibility);
  }

  pub fn members(&self) -> &[usize] {
    &self.members
  }

  pub fn len(&self) -> usize {
    self.members.len()
  }

  pub fn is_empty(&self) -> bool {
    self.members.is_empty()
  }

  pub fn avg_compatibility(&self) -> f64 {
    self.avg_compatibility
  }

  pub fn difficulty(&self) -> Difficulty {
    self.difficulty
  }

  /// Adds `idx`, folding its scores against the current members into the
  /// running pair total.
  pub fn push(&mut self, idx: usize, matrix: &CompatMatrix) {
    self.pair_total += matrix.total(idx, &self.members);
    self.members.push(idx);
    self.update_average();
  }
}

/// Partitions `words` into `ceil(n / target_size)` groups of mutually
/// compatible words. Every word lands in exactly one returned cluster.
pub fn cluster(
  words: &[Word],
  matrix: &CompatMatrix,
  target_size: usize,
  max_size: usize,
) -> Vec<Cluster> {
  if words.is_empty() {
    return vec![];
  }
  let target_size = target_size.max(1);
  let max_size = max_size.max(target_size);

  let order = (0..words.len())
    .sorted_by_key(|&idx| Reverse(words[idx].len()))
    .collect_vec();
  let num_groups = words.len().div_ceil(target_size);

  let mut groups = order[..num_groups]
    .iter()
    .map(|&idx| vec![idx])
    .collect_vec();
  let mut remaining = order[num_groups..].to_vec();

  let mut cursor = 0;
  while !remaining.is_empty() {
    let target = (0..groups.len())
      .map(|offset| (cursor + offset) % groups.len())
      .find(|&group| groups[group].len() < max_size)
      .unwrap_or_else(|| {
        groups.push(vec![]);
        groups.len() - 1
      });

    let best = remaining
      .iter()
      .enumerate()
      .map(|(pos, &idx)| (pos, matrix.average(idx, &groups[target])))
      .fold(None, |best, (pos, avg)| match best {
        Some((_, best_avg)) if best_avg >= avg => best,
        _ => Some((pos, avg)),
      });
    let pos = match best {
      Some((pos, avg)) if avg > 0.0 => pos,
      _ => 0,
    };

    groups[target].push(remaining.remove(pos));
    cursor = (target + 1) % groups.len();
  }

  groups
    .into_iter()
    .filter(|group| !group.is_empty())
    .map(|group| Cluster::new(group, matrix))
    .collect()
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use common::word::Word;
  use googletest::prelude::*;
  use itertools::Itertools;

  use crate::compat::CompatMatrix;

  use super::{cluster, Cluster, Difficulty};

  fn words(terms: &[&str]) -> Vec<Word> {
    terms
      .iter()
      .enumerate()
      .map(|(idx, term)| Word::new(format!("w{idx}"), *term, ""))
      .collect()
  }

  fn cluster_terms(words: &[Word], target_size: usize, max_size: usize) -> Vec<Vec<String>> {
    let matrix = CompatMatrix::new(words);
    cluster(words, &matrix, target_size, max_size)
      .iter()
      .map(|cluster| {
        cluster
          .members()
          .iter()
          .map(|&idx| words[idx].term.clone())
          .collect()
      })
      .collect()
  }

  #[gtest]
  fn test_empty() {
    expect_true!(cluster_terms(&[], 12, 15).is_empty());
  }

  #[gtest]
  fn test_groups_compatible_words() {
    let words = words(&["ANANAS", "CHERRY", "BANANA", "BERRY"]);
    expect_that!(
      cluster_terms(&words, 2, 2),
      container_eq([
        vec!["ANANAS".to_owned(), "BANANA".to_owned()],
        vec!["CHERRY".to_owned(), "BERRY".to_owned()],
      ])
    );
  }

  #[gtest]
  fn test_fallback_keeps_every_word() {
    let words = words(&["XYZ", "CAT", "DOG", "QQQ"]);
    let clusters = cluster_terms(&words, 2, 3);
    expect_eq!(clusters.len(), 2);
    expect_that!(
      clusters.into_iter().flatten().sorted().collect_vec(),
      container_eq(["CAT", "DOG", "QQQ", "XYZ"].map(|term| term.to_owned()))
    );
  }

  #[gtest]
  fn test_partition_and_sizes() {
    let words = words(&[
      "ALGORITHM", "BUFFER", "CACHE", "DAEMON", "ENCODER", "FIRMWARE", "GATEWAY", "HANDLER",
      "ITERATOR", "JOURNAL", "KERNEL", "LATENCY", "MUTEX", "NETWORK", "OFFSET", "PACKET",
      "QUEUE", "ROUTER", "SOCKET", "THREAD", "UNICODE", "VECTOR", "WIDGET", "YIELD", "ZIPPER",
      "ARRAY", "BINARY", "COMPILER", "DEBUG", "EXPORT",
    ]);
    let matrix = CompatMatrix::new(&words);
    let clusters = cluster(&words, &matrix, 12, 15);

    expect_eq!(clusters.len(), 3);
    for cluster in &clusters {
      expect_that!(cluster.len(), le(15));
      expect_false!(cluster.is_empty());
    }
    expect_that!(
      clusters
        .iter()
        .flat_map(|cluster| cluster.members().iter().cloned())
        .sorted()
        .collect_vec(),
      container_eq((0..words.len()).collect_vec())
    );
  }

  #[gtest]
  fn test_deterministic() {
    let words = words(&["APPLE", "LEMON", "MELON", "PEACH", "GRAPE", "KIWI", "MANGO"]);
    expect_eq!(cluster_terms(&words, 3, 4), cluster_terms(&words, 3, 4));
  }

  #[gtest]
  fn test_difficulty() {
    expect_eq!(Difficulty::from_compatibility(75.0), Difficulty::Easy);
    expect_eq!(Difficulty::from_compatibility(30.0), Difficulty::Medium);
    expect_eq!(Difficulty::from_compatibility(0.0), Difficulty::Hard);
  }

  #[gtest]
  fn test_push_matches_new() {
    let words = words(&["APPLE", "LEMON", "MELON", "PEACH", "DOG"]);
    let matrix = CompatMatrix::new(&words);

    let mut cluster = Cluster::new(vec![0, 1], &matrix);
    cluster.push(2, &matrix);
    cluster.push(4, &matrix);
    expect_eq!(cluster, Cluster::new(vec![0, 1, 2, 4], &matrix));

    let mut single = Cluster::new(vec![3], &matrix);
    expect_eq!(single.avg_compatibility(), 0.0);
    single.push(0, &matrix);
    expect_eq!(
      single.avg_compatibility(),
      matrix.score(0, 3) as f64
    );
  }
}
