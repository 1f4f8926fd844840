use std::time::Duration;

use util::error::{XWordError, XWordResult};

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
  pub min_grid_size: u32,
  pub max_grid_size: u32,
  /// Preferred number of words per puzzle.
  pub target_cluster_size: usize,
  pub max_cluster_size: usize,
  /// Attempts per placement search.
  pub max_attempts: usize,
  /// The placement search may stop once this many attempts have run and the
  /// best one reached `early_stop_coverage`.
  pub early_stop_min_attempts: usize,
  pub early_stop_coverage: f32,
  /// Clusters that fail to place more than this many words are not backtracked.
  pub backtrack_max_failures: usize,
  pub backtrack_attempts: usize,
  /// Number of attempts evaluated concurrently. 1 runs attempts in a plain loop.
  pub parallelism: usize,
  /// Seed for attempt shuffling. `None` draws one per generation call.
  pub seed: Option<u64>,
  /// Wall-clock cap on one generation call. Searches still run at least one
  /// attempt once it has elapsed.
  pub time_budget: Option<Duration>,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self {
      min_grid_size: 10,
      max_grid_size: 16,
      target_cluster_size: 12,
      max_cluster_size: 15,
      max_attempts: 30,
      early_stop_min_attempts: 10,
      early_stop_coverage: 0.85,
      backtrack_max_failures: 3,
      backtrack_attempts: 12,
      parallelism: 1,
      seed: None,
      time_budget: Some(Duration::from_secs(4)),
    }
  }
}

impl GeneratorConfig {
  pub fn with_seed(self, seed: u64) -> Self {
    Self { seed: Some(seed), ..self }
  }

  pub fn with_grid_size(self, min_grid_size: u32, max_grid_size: u32) -> Self {
    Self { min_grid_size, max_grid_size, ..self }
  }

  pub fn with_cluster_size(self, target_cluster_size: usize, max_cluster_size: usize) -> Self {
    Self { target_cluster_size, max_cluster_size, ..self }
  }

  pub fn with_max_attempts(self, max_attempts: usize) -> Self {
    Self { max_attempts, ..self }
  }

  pub fn with_parallelism(self, parallelism: usize) -> Self {
    Self { parallelism, ..self }
  }

  pub fn with_time_budget(self, time_budget: Option<Duration>) -> Self {
    Self { time_budget, ..self }
  }

  /// Side length for a puzzle whose longest word has `longest` letters.
  pub fn grid_size_for(&self, longest: usize) -> u32 {
    (longest as u32 + 4).clamp(self.min_grid_size, self.max_grid_size)
  }

  pub fn validate(&self) -> XWordResult {
    let fail = |msg: String| -> XWordResult { Err(XWordError::Config(msg).into()) };

    if self.min_grid_size < 2 || self.min_grid_size > self.max_grid_size {
      return fail(format!(
        "grid size range {}..={} must satisfy 2 <= min <= max",
        self.min_grid_size, self.max_grid_size
      ));
    }
    if self.target_cluster_size == 0 || self.target_cluster_size > self.max_cluster_size {
      return fail(format!(
        "cluster size {} (max {}) must satisfy 1 <= target <= max",
        self.target_cluster_size, self.max_cluster_size
      ));
    }
    if self.max_attempts == 0 {
      return fail("max_attempts must be at least 1".to_owned());
    }
    if self.parallelism == 0 {
      return fail("parallelism must be at least 1".to_owned());
    }
    if !(self.early_stop_coverage > 0.0 && self.early_stop_coverage <= 1.0) {
      return fail(format!(
        "early_stop_coverage {} must be in (0, 1]",
        self.early_stop_coverage
      ));
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use googletest::prelude::*;

  use super::GeneratorConfig;

  #[gtest]
  fn test_default_is_valid() {
    expect_that!(GeneratorConfig::default().validate(), ok(anything()));
  }

  #[gtest]
  fn test_grid_size_clamped() {
    let config = GeneratorConfig::default();
    expect_eq!(config.grid_size_for(3), 10);
    expect_eq!(config.grid_size_for(8), 12);
    expect_eq!(config.grid_size_for(20), 16);
  }

  #[gtest]
  fn test_invalid_configs() {
    expect_that!(
      GeneratorConfig::default()
        .with_grid_size(12, 10)
        .validate(),
      err(anything())
    );
    expect_that!(
      GeneratorConfig::default()
        .with_cluster_size(16, 15)
        .validate(),
      err(anything())
    );
    expect_that!(
      GeneratorConfig::default().with_max_attempts(0).validate(),
      err(anything())
    );
    expect_that!(
      GeneratorConfig::default().with_parallelism(0).validate(),
      err(anything())
    );
    expect_that!(
      GeneratorConfig { early_stop_coverage: 1.5, ..GeneratorConfig::default() }.validate(),
      err(anything())
    );
  }
}
