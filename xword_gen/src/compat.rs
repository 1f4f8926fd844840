use common::word::Word;

const SHARED_LETTER_WEIGHT: u32 = 10;
const CROSSING_WEIGHT: u32 = 5;
const LENGTH_BONUS: u32 = 10;
const LENGTH_BONUS_MAX_DIFF: usize = 2;

type LetterCounts = [u32; 26];

fn letter_counts(term: &str) -> LetterCounts {
  term
    .bytes()
    .filter(u8::is_ascii_uppercase)
    .fold([0; 26], |mut counts, b| {
      counts[(b - b'A') as usize] += 1;
      counts
    })
}

fn score_counts(a: &LetterCounts, a_len: usize, b: &LetterCounts, b_len: usize) -> u32 {
  let shared_letters = a
    .iter()
    .zip(b)
    .filter(|&(&a_count, &b_count)| a_count > 0 && b_count > 0)
    .count() as u32;
  if shared_letters == 0 {
    return 0;
  }

  // Number of (i, j) with a[i] == b[j].
  let crossing_potential: u32 = a.iter().zip(b).map(|(a_count, b_count)| a_count * b_count).sum();
  let length_bonus = if a_len.abs_diff(b_len) <= LENGTH_BONUS_MAX_DIFF {
    LENGTH_BONUS
  } else {
    0
  };

  shared_letters * SHARED_LETTER_WEIGHT + crossing_potential * CROSSING_WEIGHT + length_bonus
}

/// How likely two words are to cross well. Zero exactly when they share no
/// letter.
pub fn compatibility(a: &str, b: &str) -> u32 {
  score_counts(&letter_counts(a), a.len(), &letter_counts(b), b.len())
}

/// Pairwise scores for one batch, indexed by position in the batch.
#[derive(Clone, Debug)]
pub struct CompatMatrix {
  len: usize,
  scores: Vec<u32>,
}

impl CompatMatrix {
  pub fn new(words: &[Word]) -> Self {
    let len = words.len();
    let counts: Vec<_> = words.iter().map(|word| letter_counts(&word.term)).collect();
    let mut scores = vec![0; len * len];
    for i in 0..len {
      for j in (i + 1)..len {
        let score = score_counts(&counts[i], words[i].len(), &counts[j], words[j].len());
        scores[i * len + j] = score;
        scores[j * len + i] = score;
      }
    }
    Self { len, scores }
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn score(&self, i: usize, j: usize) -> u32 {
    self.scores[i * self.len + j]
  }

  /// Sum of the scores of `idx` against the members of `group`, skipping
  /// `idx` itself.
  pub fn total(&self, idx: usize, group: &[usize]) -> u64 {
    group
      .iter()
      .filter(|&&other| other != idx)
      .map(|&other| self.score(idx, other) as u64)
      .sum()
  }

  /// Average score of `idx` against the members of `group`, skipping `idx`
  /// itself.
  pub fn average(&self, idx: usize, group: &[usize]) -> f64 {
    let count = group.iter().filter(|&&other| other != idx).count();
    if count == 0 {
      0.0
    } else {
      self.total(idx, group) as f64 / count as f64
    }
  }

  /// Sum of the scores over all unordered pairs in `group`.
  pub fn pair_total(&self, group: &[usize]) -> u64 {
    group
      .iter()
      .enumerate()
      .flat_map(|(pos, &i)| group[pos + 1..].iter().map(move |&j| (i, j)))
      .map(|(i, j)| self.score(i, j) as u64)
      .sum()
  }
}
