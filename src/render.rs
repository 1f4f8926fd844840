use std::fmt::Write;

use common::crossword::{Direction, Puzzle};
use util::error::XWordResult;
use xword_gen::generator::GenerationReport;

fn heading(direction: Direction) -> &'static str {
  match direction {
    Direction::Across => "Across",
    Direction::Down => "Down",
  }
}

pub fn render_puzzle(index: usize, puzzle: &Puzzle) -> XWordResult<String> {
  let mut out = String::new();
  writeln!(
    out,
    "Puzzle {} ({size}x{size})",
    index + 1,
    size = puzzle.grid_size()
  )?;
  write!(out, "{}", puzzle.grid())?;

  for direction in Direction::ALL {
    writeln!(out, "{}:", heading(direction))?;
    for word in puzzle.clues(direction) {
      let clue = if word.clue.is_empty() {
        &word.term
      } else {
        &word.clue
      };
      writeln!(out, "{:>3}. {clue} ({})", word.number, word.len())?;
    }
  }

  Ok(out)
}

pub fn render_report(report: &GenerationReport) -> XWordResult<String> {
  let mut out = String::new();
  for (index, puzzle) in report.puzzles.iter().enumerate() {
    out += &render_puzzle(index, puzzle)?;
    out.push('\n');
  }

  if !report.unplaced.is_empty() {
    writeln!(out, "Unplaced:")?;
    for unplaced in &report.unplaced {
      writeln!(
        out,
        "  {} ({}): {}",
        unplaced.word.term, unplaced.word.id, unplaced.reason
      )?;
    }
  }

  Ok(out)
}

pub fn render_stats(report: &GenerationReport) -> XWordResult<String> {
  let stats = &report.stats;
  let mut out = String::new();
  writeln!(out, "seed {}", stats.seed)?;

  for pass in &stats.clusters {
    writeln!(
      out,
      "pass {:>2}: {:>2}/{:<2} placed ({:>3.0}%), {:>2} attempts, {} ({:.1}){}, {:?}",
      pass.index,
      pass.placed,
      pass.words,
      pass.coverage * 100.0,
      pass.attempts,
      pass.difficulty,
      pass.avg_compatibility,
      if pass.backtracked { ", backtracked" } else { "" },
      pass.elapsed,
    )?;
  }

  writeln!(
    out,
    "{} puzzles, {} placed, {} unplaced ({:.0}% coverage), {} redistributed, {} leftover passes \
     in {:?}",
    report.puzzles.len(),
    report.placed_count(),
    report.unplaced.len(),
    report.coverage() * 100.0,
    stats.redistributed,
    stats.leftover_passes,
    stats.elapsed,
  )?;

  Ok(out)
}
