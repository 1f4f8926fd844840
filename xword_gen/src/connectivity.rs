use std::collections::{HashMap, HashSet};

use common::crossword::PlacedWord;

fn adjacency(placed_words: &[PlacedWord]) -> HashMap<&str, HashSet<&str>> {
  let mut graph: HashMap<&str, HashSet<&str>> = placed_words
    .iter()
    .map(|word| (word.id.as_str(), HashSet::new()))
    .collect();

  for word in placed_words {
    for crossing in &word.crossings {
      let other = crossing.other_word_id.as_str();
      if !graph.contains_key(other) {
        continue;
      }
      graph.entry(word.id.as_str()).or_default().insert(other);
      graph.entry(other).or_default().insert(word.id.as_str());
    }
  }

  graph
}

/// Ids reachable from `start` through crossings.
pub fn reachable_from<'a>(placed_words: &'a [PlacedWord], start: &'a str) -> HashSet<&'a str> {
  let graph = adjacency(placed_words);
  let mut visited = HashSet::new();
  if !graph.contains_key(start) {
    return visited;
  }

  let mut stack = vec![start];
  while let Some(id) = stack.pop() {
    if !visited.insert(id) {
      continue;
    }
    if let Some(neighbors) = graph.get(id) {
      stack.extend(
        neighbors
          .iter()
          .filter(|neighbor| !visited.contains(*neighbor)),
      );
    }
  }

  visited
}

/// Whether the crossing graph of `placed_words` is a single component.
pub fn is_connected(placed_words: &[PlacedWord]) -> bool {
  match placed_words.first() {
    None => true,
    Some(first) => {
      let reached = reachable_from(placed_words, &first.id);
      placed_words
        .iter()
        .all(|word| reached.contains(word.id.as_str()))
    }
  }
}

#[cfg(test)]
mod tests {
  use common::crossword::{Crossing, Direction, PlacedWord};
  use googletest::prelude::*;

  use super::{is_connected, reachable_from};

  fn word(id: &str, crosses: &[&str]) -> PlacedWord {
    PlacedWord {
      id: id.to_owned(),
      term: "AB".to_owned(),
      clue: String::new(),
      x: 0,
      y: 0,
      direction: Direction::Across,
      number: 0,
      crossings: crosses
        .iter()
        .map(|other| Crossing {
          position: 0,
          other_word_id: (*other).to_owned(),
          other_word_position: 0,
        })
        .collect(),
    }
  }

  #[gtest]
  fn test_trivial() {
    expect_true!(is_connected(&[]));
    expect_true!(is_connected(&[word("a", &[])]));
  }

  #[gtest]
  fn test_chain() {
    // Crossings only recorded on one side still connect both ways.
    let words = [word("a", &["b"]), word("b", &[]), word("c", &["b"])];
    expect_true!(is_connected(&words));
  }

  #[gtest]
  fn test_disconnected() {
    let words = [
      word("a", &["b"]),
      word("b", &["a"]),
      word("c", &["d"]),
      word("d", &["c"]),
    ];
    expect_false!(is_connected(&words));
    expect_eq!(reachable_from(&words, "c").len(), 2);
  }

  #[gtest]
  fn test_unknown_ids_ignored() {
    let words = [word("a", &["zzz"]), word("b", &[])];
    expect_false!(is_connected(&words));
    expect_true!(reachable_from(&words, "zzz").is_empty());
  }

  #[gtest]
  fn test_long_chain() {
    let ids: Vec<_> = (0..2000).map(|idx| format!("w{idx}")).collect();
    let words: Vec<_> = ids
      .iter()
      .enumerate()
      .map(|(idx, id)| match ids.get(idx + 1) {
        Some(next) => word(id, &[next.as_str()]),
        None => word(id, &[]),
      })
      .collect();
    expect_true!(is_connected(&words));
  }
}
