#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod args;
mod logging;
mod render;

use std::{fs, process::ExitCode};

use args::{Args, RunMode};
use clap::Parser;
use log::info;
use util::{bitcode, error::XWordResult};
use xword_dict::word_list::WordList;
use xword_gen::generator::Generator;

fn run() -> XWordResult {
  let args = Args::parse();
  logging::init_logger(args.debug);

  let words = WordList::read_file(&args.words)?;
  info!("Loaded {} words from {}", words.len(), args.words.display());
  let report = Generator::new(args.generator_config()).generate(words.words())?;

  match args.mode {
    RunMode::Print => print!("{}", render::render_report(&report)?),
    RunMode::Stats => print!("{}", render::render_stats(&report)?),
    RunMode::Encode => {
      fs::write(&args.out, bitcode::encode(&report.puzzles))?;
      info!(
        "Wrote {} puzzles to {}",
        report.puzzles.len(),
        args.out.display()
      );
    }
  }

  Ok(())
}

fn main() -> ExitCode {
  if let Err(err) = run() {
    eprintln!("Error: {err}");
    ExitCode::FAILURE
  } else {
    ExitCode::SUCCESS
  }
}
