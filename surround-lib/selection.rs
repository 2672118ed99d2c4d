//! Cursor positions and multi-cursor selections.
//!
//! A [`Range`] has two char offsets, `anchor` and `head`. When they are equal
//! the range is a plain cursor sitting in the gap before `head`:
//!
//! ```text
//! anchor=2, head=7: "he[llo w]orld"  (forward selection)
//! anchor=7, head=2: "he]llo w[orld"  (backward selection)
//! anchor=5, head=5: "hello|world"    (point/cursor)
//! ```
//!
//! A [`Selection`] holds one or more ranges, sorted by `from()`, with
//! overlapping ranges merged. Surround commands walk the ranges from the last
//! one backwards so edits never shift offsets still to be used.

use smallvec::{
  SmallVec,
  smallvec,
};
use thiserror::Error;

use crate::movement::Direction;

pub type Result<T> = std::result::Result<T, SelectionError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
  #[error("selection must contain at least one range")]
  EmptySelection,
  #[error("range {from}..{to} exceeds text length {len}")]
  RangeOutOfBounds { from: usize, to: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
  pub anchor: usize,
  pub head:   usize,
}

impl Range {
  pub fn new(anchor: usize, head: usize) -> Self {
    Self { anchor, head }
  }

  #[inline]
  pub fn point(head: usize) -> Self {
    Self::new(head, head)
  }

  /// Start of the range
  #[inline]
  #[must_use]
  pub fn from(&self) -> usize {
    std::cmp::min(self.anchor, self.head)
  }

  /// End of the range
  #[inline]
  #[must_use]
  pub fn to(&self) -> usize {
    std::cmp::max(self.anchor, self.head)
  }

  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.to() - self.from()
  }

  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.head
  }

  #[inline]
  #[must_use]
  pub fn direction(&self) -> Direction {
    if self.head < self.anchor {
      Direction::Backward
    } else {
      Direction::Forward
    }
  }

  #[inline]
  #[must_use]
  pub fn flip(&self) -> Self {
    Self {
      anchor: self.head,
      head:   self.anchor,
    }
  }

  #[inline]
  #[must_use]
  pub fn with_direction(self, direction: Direction) -> Self {
    if self.direction() == direction {
      self
    } else {
      self.flip()
    }
  }

  /// Check if two `Ranges` overlap
  pub fn overlaps(&self, other: &Self) -> bool {
    self.from() == other.from() || (self.to() > other.from() && other.to() > self.from())
  }

  /// Smallest forward range covering both `self` and `other`.
  #[must_use]
  pub fn merge(&self, other: Self) -> Self {
    let range = Range::new(self.from().min(other.from()), self.to().max(other.to()));
    range.with_direction(self.direction())
  }
}

impl From<(usize, usize)> for Range {
  fn from((anchor, head): (usize, usize)) -> Self {
    Self::new(anchor, head)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
  ranges: SmallVec<[Range; 1]>,
}

impl Selection {
  /// Build a selection from `ranges`, sorting them and merging overlaps.
  pub fn new(ranges: SmallVec<[Range; 1]>) -> Result<Self> {
    if ranges.is_empty() {
      return Err(SelectionError::EmptySelection);
    }
    Ok(Self { ranges }.normalize())
  }

  pub fn point(pos: usize) -> Self {
    Self::single(pos, pos)
  }

  pub fn single(anchor: usize, head: usize) -> Self {
    Self {
      ranges: smallvec![Range::new(anchor, head)],
    }
  }

  pub fn ranges(&self) -> &[Range] {
    &self.ranges
  }

  pub fn len(&self) -> usize {
    self.ranges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ranges.is_empty()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Range> {
    self.ranges.iter()
  }

  /// Fails if any range reaches past `len` chars.
  pub fn ensure_within(&self, len: usize) -> Result<()> {
    match self.ranges.iter().find(|range| range.to() > len) {
      Some(range) => {
        Err(SelectionError::RangeOutOfBounds {
          from: range.from(),
          to: range.to(),
          len,
        })
      },
      None => Ok(()),
    }
  }

  fn normalize(mut self) -> Self {
    if self.ranges.len() < 2 {
      return self;
    }
    self.ranges.sort_by_key(|range| range.from());

    let mut ranges: SmallVec<[Range; 1]> = SmallVec::with_capacity(self.ranges.len());
    for range in self.ranges {
      if let Some(prev_range) = ranges.last_mut() {
        if prev_range.overlaps(&range) {
          *prev_range = prev_range.merge(range);
          continue;
        }
      }
      ranges.push(range);
    }

    self.ranges = ranges;
    self
  }
}

impl<'a> IntoIterator for &'a Selection {
  type Item = &'a Range;
  type IntoIter = std::slice::Iter<'a, Range>;

  fn into_iter(self) -> Self::IntoIter {
    self.ranges.iter()
  }
}
