use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use xword_gen::config::GeneratorConfig;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
  /// Render every puzzle with its clues.
  Print,
  /// Per-pass generation statistics.
  Stats,
  /// Write the puzzles to `--out` with bitcode.
  Encode,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
  /// Tab separated `id<TAB>term<TAB>clue` lines.
  #[arg(long)]
  pub words: PathBuf,

  #[arg(long, default_value = "print")]
  pub mode: RunMode,

  #[arg(long)]
  pub seed: Option<u64>,

  #[arg(long)]
  pub max_attempts: Option<usize>,

  #[arg(long)]
  pub min_grid: Option<u32>,

  #[arg(long)]
  pub max_grid: Option<u32>,

  #[arg(long)]
  pub parallelism: Option<usize>,

  #[arg(long, default_value = "puzzles.bin")]
  pub out: PathBuf,

  #[arg(long)]
  pub debug: bool,
}

impl Args {
  /// Defaults from `GeneratorConfig`, overridden by whichever flags were given.
  pub fn generator_config(&self) -> GeneratorConfig {
    let defaults = GeneratorConfig::default();
    let mut config = defaults.clone().with_grid_size(
      self.min_grid.unwrap_or(defaults.min_grid_size),
      self.max_grid.unwrap_or(defaults.max_grid_size),
    );
    if let Some(seed) = self.seed {
      config = config.with_seed(seed);
    }
    if let Some(max_attempts) = self.max_attempts {
      config = config.with_max_attempts(max_attempts);
    }
    if let Some(parallelism) = self.parallelism {
      config = config.with_parallelism(parallelism);
    }
    config
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use clap::Parser;
  use googletest::prelude::*;
  use xword_gen::config::GeneratorConfig;

  use super::{Args, RunMode};

  #[gtest]
  fn test_defaults() {
    let args = Args::try_parse_from(["vocab-xword", "--words", "words.tsv"]).unwrap();
    expect_eq!(args.mode, RunMode::Print);
    expect_eq!(args.generator_config(), GeneratorConfig::default());
  }

  #[gtest]
  fn test_overrides() {
    let args = Args::try_parse_from([
      "vocab-xword",
      "--words",
      "words.tsv",
      "--mode",
      "stats",
      "--seed",
      "7",
      "--max-grid",
      "20",
      "--max-attempts",
      "5",
      "--parallelism",
      "2",
    ])
    .unwrap();
    let config = args.generator_config();

    expect_eq!(args.mode, RunMode::Stats);
    expect_eq!(config.seed, Some(7));
    expect_eq!(config.min_grid_size, GeneratorConfig::default().min_grid_size);
    expect_eq!(config.max_grid_size, 20);
    expect_eq!(config.max_attempts, 5);
    expect_eq!(config.parallelism, 2);
  }
}
