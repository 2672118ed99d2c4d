//! Command line front end for the surround commands.
//!
//! ```text
//! surround -p 12 notes.md change '(' '['
//! surround -p 4..9 -i notes.md with '<em>'
//! surround -p 3 -p 20 notes.md delete '"'
//! ```
//!
//! The edited text goes to stdout unless `--in-place` is given. Cursors whose
//! pair can't be found are logged as warnings (stderr, or the `--log-file`),
//! and the exit status is non-zero when no cursor was applied.

mod cli;
mod logging;

use std::{
  fs,
  io::{
    self,
    Write,
  },
  path::{
    Path,
    PathBuf,
  },
  process::ExitCode,
};

use anyhow::{
  Context,
  Result,
};
use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};
use ropey::Rope;
use surround_lib::{
  command::{
    CursorFailure,
    Report,
  },
  config::SurroundConfig,
};

use crate::cli::CliOptions;

const CONFIG_FILE: &str = "surround.toml";

fn main() -> Result<ExitCode> {
  let options = CliOptions::parse()?;
  logging::setup_logging(options.verbosity, options.log_file.as_deref())
    .context("failed to initialize logging")?;

  let config = load_config(options.config_file.as_deref())?;

  let text = fs::read_to_string(&options.file)
    .with_context(|| format!("failed to read {}", options.file.display()))?;
  let mut doc = Rope::from(text);
  let selection = options.selection(doc.len_chars())?;

  let report = options
    .command
    .run(&mut doc, &selection, &config)
    .with_context(|| format!("{} failed", options.command.kind()))?;
  log::info!(
    "{}: {} applied, {} failed",
    options.command.kind(),
    report.applied,
    report.failures.len()
  );

  if options.in_place {
    fs::write(&options.file, doc.to_string())
      .with_context(|| format!("failed to write {}", options.file.display()))?;
  } else {
    let mut stdout = io::stdout().lock();
    doc.write_to(&mut stdout)?;
    stdout.flush()?;
  }

  report_failures(&report);
  Ok(if succeeded(&report) {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  })
}

/// An explicit `--config` must exist. Otherwise the global config and a
/// `surround.toml` in the working directory are merged, either may be missing.
fn load_config(config_file: Option<&Path>) -> Result<SurroundConfig> {
  if let Some(path) = config_file {
    return SurroundConfig::load_file(path)
      .with_context(|| format!("failed to load config {}", path.display()));
  }

  SurroundConfig::load(
    read_config(global_config_file()),
    read_config(Ok(PathBuf::from(CONFIG_FILE))),
  )
  .context("failed to load surround config")
}

fn read_config(path: io::Result<PathBuf>) -> surround_lib::config::Result<String> {
  Ok(fs::read_to_string(path?)?)
}

/// `surround.toml` in the platform config directory.
fn global_config_file() -> io::Result<PathBuf> {
  let strategy = choose_base_strategy()
    .map_err(|err| io::Error::new(io::ErrorKind::NotFound, err.to_string()))?;
  let mut path = strategy.config_dir();
  path.push("surround");
  path.push(CONFIG_FILE);
  Ok(path)
}

fn failure_message(failure: &CursorFailure) -> String {
  format!(
    "cursor {} at {}..{}: {}",
    failure.index + 1,
    failure.range.from(),
    failure.range.to(),
    failure.error
  )
}

fn report_failures(report: &Report) {
  for failure in &report.failures {
    log::warn!("{}", failure_message(failure));
  }
}

/// false only when every cursor failed.
fn succeeded(report: &Report) -> bool {
  report.applied > 0 || report.failures.is_empty()
}
