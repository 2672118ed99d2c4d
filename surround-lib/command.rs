//! The three surround commands.
//!
//! - `surround-with TOKEN` wraps every selection in the pair for `TOKEN`.
//! - `surround-change MATCH REPLACEMENT` finds the `MATCH` pair enclosing each
//!   cursor and replaces both delimiters with the `REPLACEMENT` pair.
//! - `surround-delete MATCH` is a change with an empty replacement.
//!
//! Every cursor is resolved against the buffer as it was before the command.
//! The edits of all cursors are then collected in one [`Transaction`] and
//! applied in a single pass.
//!
//! Change and delete also take the padding that `surround-with` inserts for
//! the target: after wrapping `x` in `{` to get `{ x }`, deleting `{` gives
//! back `x`. Padding is only taken when it is there on both sides.
//!
//! A cursor whose pair can't be found doesn't stop the others. Its error is
//! logged and returned in the [`Report`], and the buffer is changed only where
//! a pair was found.
//!
//! ```
//! use ropey::Rope;
//! use surround_lib::{
//!   command::SurroundCommand,
//!   config::SurroundConfig,
//!   selection::Selection,
//! };
//!
//! let mut doc = Rope::from("call(x)");
//! let command = SurroundCommand::Change {
//!   target:      "(".into(),
//!   replacement: "[".into(),
//! };
//!
//! let report = command
//!   .run(&mut doc, &Selection::point(5), &SurroundConfig::default())
//!   .unwrap();
//! assert_eq!(doc.to_string(), "call[x]");
//! assert_eq!(report.applied, 1);
//! ```

use std::{
  fmt,
  str::FromStr,
};

use ropey::Rope;
use thiserror::Error;

use crate::{
  Tendril,
  config::SurroundConfig,
  pairs::{
    Pair,
    addition_pair,
    search_spec,
  },
  search::{
    RopeSearch,
    Span,
  },
  selection::{
    Range,
    Selection,
    SelectionError,
  },
  surround::{
    Locator,
    MatchResult,
    SurroundError,
  },
  transaction::{
    Change,
    Transaction,
    TransactionError,
  },
};

pub type Result<T> = std::result::Result<T, CommandError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CommandError {
  #[error("unknown surround command '{0}'")]
  UnknownCommand(String),
  #[error("{command} takes {expected} argument(s), got {got}")]
  WrongArity {
    command:  CommandKind,
    expected: usize,
    got:      usize,
  },
  #[error(transparent)]
  Selection(#[from] SelectionError),
  #[error(transparent)]
  Transaction(#[from] TransactionError),
  #[error(transparent)]
  Surround(#[from] SurroundError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
  With,
  Change,
  Delete,
}

impl CommandKind {
  pub const ALL: [CommandKind; 3] = [Self::With, Self::Change, Self::Delete];

  pub fn name(self) -> &'static str {
    match self {
      Self::With => "surround-with",
      Self::Change => "surround-change",
      Self::Delete => "surround-delete",
    }
  }

  /// Number of string arguments the command reads.
  pub fn arity(self) -> usize {
    match self {
      Self::With | Self::Delete => 1,
      Self::Change => 2,
    }
  }
}

impl fmt::Display for CommandKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for CommandKind {
  type Err = CommandError;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|kind| kind.name() == s)
      .ok_or_else(|| CommandError::UnknownCommand(s.to_string()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurroundCommand {
  Add { token: String },
  Change { target: String, replacement: String },
  Delete { target: String },
}

/// A cursor whose pair could not be changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorFailure {
  /// Index into the selection's ranges.
  pub index: usize,
  pub range: Range,
  pub error: SurroundError,
}

/// Outcome of running a command over a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
  /// Cursors that were surrounded or whose pair was changed.
  pub applied:  usize,
  /// Cursors that were skipped, in selection order.
  pub failures: Vec<CursorFailure>,
}

impl Report {
  pub fn is_complete(&self) -> bool {
    self.failures.is_empty()
  }
}

impl SurroundCommand {
  /// Build the command named `name` from its input strings.
  pub fn from_args<S: AsRef<str>>(name: &str, args: &[S]) -> Result<Self> {
    let kind: CommandKind = name.parse()?;
    if args.len() != kind.arity() {
      return Err(CommandError::WrongArity {
        command:  kind,
        expected: kind.arity(),
        got:      args.len(),
      });
    }

    let arg = |i: usize| args[i].as_ref().to_string();
    Ok(match kind {
      CommandKind::With => Self::Add { token: arg(0) },
      CommandKind::Change => {
        Self::Change {
          target:      arg(0),
          replacement: arg(1),
        }
      },
      CommandKind::Delete => Self::Delete { target: arg(0) },
    })
  }

  pub fn kind(&self) -> CommandKind {
    match self {
      Self::Add { .. } => CommandKind::With,
      Self::Change { .. } => CommandKind::Change,
      Self::Delete { .. } => CommandKind::Delete,
    }
  }

  /// Run on `doc`, editing it in place.
  pub fn run(
    &self,
    doc: &mut Rope,
    selection: &Selection,
    config: &SurroundConfig,
  ) -> Result<Report> {
    let (transaction, report) = self.transaction(doc, selection, config)?;
    transaction.apply(doc)?;
    Ok(report)
  }

  /// The edits this command makes to `doc`, without applying them.
  pub fn transaction(
    &self,
    doc: &Rope,
    selection: &Selection,
    config: &SurroundConfig,
  ) -> Result<(Transaction, Report)> {
    selection.ensure_within(doc.len_chars())?;
    tracing::debug!(command = %self.kind(), cursors = selection.len(), "running surround command");

    match self {
      Self::Add { token } => {
        let pair = addition_pair(token, &config.pairs_for_addition);
        surround_ranges(doc, selection, &pair)
      },
      Self::Change {
        target,
        replacement,
      } => {
        let replacement = addition_pair(replacement, &config.pairs_for_addition);
        replace_surround(doc, selection, target, &replacement, config)
      },
      Self::Delete { target } => replace_surround(doc, selection, target, &Pair::empty(), config),
    }
  }
}

fn text(text: &Tendril) -> Option<Tendril> {
  (!text.is_empty()).then(|| text.clone())
}

fn surround_ranges(
  doc: &Rope,
  selection: &Selection,
  pair: &Pair,
) -> Result<(Transaction, Report)> {
  let mut changes: Vec<Change> = Vec::with_capacity(selection.len() * 2);
  for range in selection {
    if let Some(open) = text(&pair.open) {
      changes.push((range.from(), range.from(), Some(open)));
    }
    if let Some(close) = text(&pair.close) {
      changes.push((range.to(), range.to(), Some(close)));
    }
  }

  let transaction = Transaction::change(doc, changes)?;
  let report = Report {
    applied:  if pair.is_empty() { 0 } else { selection.len() },
    failures: Vec::new(),
  };
  Ok((transaction, report))
}

fn replace_surround(
  doc: &Rope,
  selection: &Selection,
  target: &str,
  replacement: &Pair,
  config: &SurroundConfig,
) -> Result<(Transaction, Report)> {
  let spec = search_spec(target, &config.pairs_for_search);
  let padded = addition_pair(target, &config.pairs_for_addition);
  let search = RopeSearch::new(doc.slice(..));
  let locator = Locator::new(&search, &spec)?;

  let mut accepted: Vec<MatchResult> = Vec::with_capacity(selection.len());
  let mut report = Report::default();

  // Later cursors first, so the last cursor keeps a contested delimiter.
  for (index, range) in selection.iter().enumerate().rev() {
    let found = locator.locate(*range).and_then(|found| {
      let found = with_padding(doc, found, &padded);
      let shared = accepted.iter().find(|other| {
        found.start.overlaps(&other.start)
          || found.start.overlaps(&other.end)
          || found.end.overlaps(&other.start)
          || found.end.overlaps(&other.end)
      });
      match shared {
        Some(other) if *other == found => Ok(None),
        Some(_) => Err(SurroundError::CursorOverlap),
        None => Ok(Some(found)),
      }
    });

    match found {
      Ok(found) => {
        report.applied += 1;
        accepted.extend(found);
      },
      Err(error) => {
        tracing::warn!(index, from = range.from(), to = range.to(), %error, "surround pair not changed");
        report.failures.push(CursorFailure {
          index,
          range: *range,
          error,
        });
      },
    }
  }
  report.failures.reverse();

  let changes = accepted.iter().flat_map(|found| {
    [
      (found.start.begin, found.start.end, text(&replacement.open)),
      (found.end.begin, found.end.end, text(&replacement.close)),
    ]
  });
  let transaction = Transaction::change(doc, changes)?;
  Ok((transaction, report))
}

/// Widen `found` to the inserted form of the pair (`{ `, ` }`) when the
/// buffer holds it around the located delimiters.
fn with_padding(doc: &Rope, found: MatchResult, padded: &Pair) -> MatchResult {
  let open_len = padded.open.chars().count();
  let close_len = padded.close.chars().count();
  if open_len <= found.start.len() && close_len <= found.end.len() {
    return found;
  }

  let start = Span::new(found.start.begin, found.start.begin + open_len);
  let Some(end_begin) = found.end.end.checked_sub(close_len) else {
    return found;
  };
  let end = Span::new(end_begin, found.end.end);

  let holds = |span: Span, text: &Tendril| {
    span.end <= doc.len_chars() && doc.slice(span.begin..span.end).chars().eq(text.chars())
  };
  if start.len() < found.start.len()
    || end.len() < found.end.len()
    || start.end > end.begin
    || !holds(start, &padded.open)
    || !holds(end, &padded.close)
  {
    return found;
  }

  MatchResult { start, end }
}
