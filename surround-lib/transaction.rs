//! Applying surround edits to a document.
//!
//! A [`Transaction`] is a batch of [`Change`]s, each replacing the chars
//! `from..to` with some text (or deleting them when the text is `None`).
//! Offsets of every change refer to the document *before* the batch, which is
//! what the span locator produces for all cursors at once.
//!
//! # Ordering
//!
//! Changes are applied from the highest offset down. An edit never moves text
//! before it, so offsets still waiting to be applied stay valid. Per cursor
//! this means the closing delimiter is rewritten before the opening one.
//!
//! ```
//! use ropey::Rope;
//! use surround_lib::transaction::Transaction;
//!
//! let mut doc = Rope::from("say hi");
//! let tx = Transaction::change(&doc, [
//!   (4, 4, Some("(".into())),
//!   (6, 6, Some(")".into())),
//! ])
//! .unwrap();
//!
//! tx.apply(&mut doc).unwrap();
//! assert_eq!(doc.to_string(), "say (hi)");
//! ```
//!
//! Insertions at the same offset keep the order they were given in.

use ropey::Rope;
use thiserror::Error;

use crate::Tendril;

pub type Result<T> = std::result::Result<T, TransactionError>;

/// (from, to, replacement) in chars.
pub type Change = (usize, usize, Option<Tendril>);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransactionError {
  #[error("invalid change range: start {from} is after end {to}")]
  InvalidRange { from: usize, to: usize },
  #[error("change range {from}..{to} is out of bounds for document length {len}")]
  RangeOutOfBounds { from: usize, to: usize, len: usize },
  #[error("change range {from}..{to} overlaps previous end {prev_end}")]
  OverlappingRange {
    prev_end: usize,
    from:     usize,
    to:       usize,
  },
  #[error("transaction built for length {expected}, document has {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transaction {
  /// Sorted by `from`, non-overlapping.
  changes: Vec<Change>,
  /// The document length the changes were validated against.
  len:     usize,
}

impl Transaction {
  pub fn new(doc: &Rope) -> Self {
    Self {
      changes: Vec::new(),
      len:     doc.len_chars(),
    }
  }

  /// Validate and order `changes` against `doc`.
  pub fn change<I>(doc: &Rope, changes: I) -> Result<Self>
  where
    I: IntoIterator<Item = Change>,
  {
    let len = doc.len_chars();
    let mut changes: Vec<Change> = changes.into_iter().collect();

    for (from, to, _) in &changes {
      if from > to {
        return Err(TransactionError::InvalidRange {
          from: *from,
          to:   *to,
        });
      }
      if *to > len {
        return Err(TransactionError::RangeOutOfBounds {
          from: *from,
          to: *to,
          len,
        });
      }
    }

    // Stable, so same-offset insertions keep their order.
    changes.sort_by_key(|(from, to, _)| (*from, *to));

    let mut prev_end = 0;
    for (from, to, _) in &changes {
      if *from < prev_end {
        return Err(TransactionError::OverlappingRange {
          prev_end,
          from: *from,
          to: *to,
        });
      }
      prev_end = *to;
    }

    Ok(Self { changes, len })
  }

  pub fn changes(&self) -> &[Change] {
    &self.changes
  }

  pub fn is_empty(&self) -> bool {
    self.changes.is_empty()
  }

  /// Apply to `doc`, highest offset first.
  pub fn apply(&self, doc: &mut Rope) -> Result<()> {
    if doc.len_chars() != self.len {
      return Err(TransactionError::LengthMismatch {
        expected: self.len,
        actual:   doc.len_chars(),
      });
    }

    for (from, to, text) in self.changes.iter().rev() {
      if from != to {
        doc.remove(*from..*to);
      }
      if let Some(text) = text {
        doc.insert(*from, text);
      }
    }
    tracing::debug!(changes = self.changes.len(), "applied surround transaction");
    Ok(())
  }

  pub fn apply_to(&self, doc: &Rope) -> Result<Rope> {
    let mut doc = doc.clone();
    self.apply(&mut doc)?;
    Ok(doc)
  }
}
