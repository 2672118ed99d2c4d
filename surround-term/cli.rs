use std::path::PathBuf;

use anyhow::{
  Context,
  Result,
  bail,
};
use clap::{
  ArgAction,
  Parser,
  Subcommand,
};
use smallvec::SmallVec;
use surround_lib::{
  command::SurroundCommand,
  selection::{
    Range,
    Selection,
  },
};

#[derive(Clone, Debug)]
pub struct CliOptions {
  pub file:        PathBuf,
  pub in_place:    bool,
  pub verbosity:   u8,
  pub log_file:    Option<PathBuf>,
  pub config_file: Option<PathBuf>,
  /// Cursor ranges in char offsets, as given on the command line.
  pub cursors:     Vec<Range>,
  pub command:     SurroundCommand,
}

impl CliOptions {
  pub fn parse() -> Result<Self> {
    let raw = RawCli::parse();
    raw.try_into()
  }

  /// The selection for `len` chars of text.
  pub fn selection(&self, len: usize) -> Result<Selection> {
    let ranges: SmallVec<[Range; 1]> = if self.cursors.is_empty() {
      SmallVec::from_elem(Range::point(0), 1)
    } else {
      self.cursors.iter().copied().collect()
    };

    let selection = Selection::new(ranges)?;
    selection
      .ensure_within(len)
      .with_context(|| format!("cursor outside of {}", self.file.display()))?;
    Ok(selection)
  }
}

#[derive(Parser, Debug)]
#[command(name = "surround", about, long_about = None)]
struct RawCli {
  /// Cursor position in chars, or a selection as FROM..TO (repeatable)
  #[arg(short = 'p', long = "cursor", value_name = "OFFSET", value_parser = parse_range)]
  cursors: Vec<Range>,

  /// Write the result back to the file instead of printing it
  #[arg(short = 'i', long = "in-place")]
  in_place: bool,

  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = ArgAction::Count)]
  verbosity: u8,

  /// Save logs to a specific file
  #[arg(long = "log", value_name = "FILE")]
  log_file: Option<PathBuf>,

  /// Load pair tables from a specific file
  #[arg(short = 'c', long = "config", value_name = "FILE")]
  config_file: Option<PathBuf>,

  /// File to edit
  #[arg(value_name = "FILE")]
  file: PathBuf,

  #[command(subcommand)]
  command: RawCommand,
}

#[derive(Subcommand, Debug)]
enum RawCommand {
  /// Surround every selection with TOKEN
  With { token: String },
  /// Replace the MATCH pair around every cursor with REPLACEMENT
  Change { target: String, replacement: String },
  /// Delete the MATCH pair around every cursor
  Delete { target: String },
}

impl From<RawCommand> for SurroundCommand {
  fn from(raw: RawCommand) -> Self {
    match raw {
      RawCommand::With { token } => Self::Add { token },
      RawCommand::Change {
        target,
        replacement,
      } => {
        Self::Change {
          target,
          replacement,
        }
      },
      RawCommand::Delete { target } => Self::Delete { target },
    }
  }
}

impl TryFrom<RawCli> for CliOptions {
  type Error = anyhow::Error;

  fn try_from(raw: RawCli) -> Result<Self> {
    if raw.in_place && !raw.file.is_file() {
      bail!("cannot edit '{}' in place: not a file", raw.file.display());
    }

    Ok(Self {
      file:        raw.file,
      in_place:    raw.in_place,
      verbosity:   raw.verbosity,
      log_file:    raw.log_file,
      config_file: raw.config_file,
      cursors:     raw.cursors,
      command:     raw.command.into(),
    })
  }
}

/// `OFFSET` or `ANCHOR..HEAD`.
fn parse_range(value: &str) -> std::result::Result<Range, String> {
  let offset = |s: &str| {
    s.trim()
      .parse::<usize>()
      .map_err(|err| format!("invalid offset '{s}': {err}"))
  };

  match value.split_once("..") {
    Some((anchor, head)) => Ok(Range::new(offset(anchor)?, offset(head)?)),
    None => offset(value).map(Range::point),
  }
}
