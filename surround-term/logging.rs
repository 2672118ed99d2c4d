use std::path::Path;

use anyhow::Result;
use log::LevelFilter;

fn level(verbosity: u8) -> LevelFilter {
  match verbosity {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    2 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  }
}

/// Route log records (and `tracing` events through its `log` feature) to
/// `log_file`, or to stderr without one.
pub fn setup_logging(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
  let base = fern::Dispatch::new().level(level(verbosity));

  let output = match log_file {
    Some(path) => {
      fern::Dispatch::new()
        .format(|out, message, record| {
          out.finish(format_args!(
            "{} [{}] {}",
            record.target(),
            record.level(),
            message
          ))
        })
        .chain(fern::log_file(path)?)
    },
    None => {
      fern::Dispatch::new()
        .format(|out, message, record| {
          out.finish(format_args!("surround: {}: {}", record.level(), message))
        })
        .chain(std::io::stderr())
    },
  };

  base.chain(output).apply()?;
  Ok(())
}
