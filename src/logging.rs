use std::env;

use log::LevelFilter;

/// Info level by default, debug with `--debug`. `RUST_LOG` overrides both.
pub fn init_logger(debug: bool) {
  let level = if debug {
    LevelFilter::Debug
  } else {
    LevelFilter::Info
  };

  let mut builder = env_logger::Builder::new();
  builder
    .filter(None, level)
    .format_timestamp(None)
    .format_target(false);
  if let Ok(filters) = env::var("RUST_LOG") {
    builder.parse_filters(&filters);
  }
  builder.init();
}
