//! Pattern search over a buffer.
//!
//! The span locator in [`crate::surround`] never touches the text directly. It
//! asks a [`TextSearch`] implementation for matches, so hosts with their own
//! search primitives can plug them in. [`RopeSearch`] is the implementation
//! over a `ropey` slice.
//!
//! # Offsets
//!
//! Every [`Span`] is in char offsets of the searched text, the same unit as
//! [`crate::selection::Range`].
//!
//! # Literal vs pattern
//!
//! Each call carries a `literal` flag. With `literal` set the pattern matches
//! exactly its own characters; otherwise it is a regular expression.
//!
//! ```
//! use ropey::Rope;
//! use surround_lib::search::{RopeSearch, Span, TextSearch};
//!
//! let text = Rope::from("f(a, (b))");
//! let search = RopeSearch::new(text.slice(..));
//!
//! assert_eq!(
//!   search.find_all("(", true).unwrap(),
//!   vec![Span::new(1, 2), Span::new(5, 6)]
//! );
//! assert_eq!(search.find_next(r"\)+", 0, false).unwrap(), Some(Span::new(7, 9)));
//! ```

use std::{
  cell::RefCell,
  collections::HashMap,
};

use ropey::RopeSlice;
use surround_stdx::rope::{
  self,
  Regex,
  RopeSliceExt,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SearchError {
  #[error("invalid search pattern '{pattern}': {message}")]
  InvalidPattern { pattern: String, message: String },
}

/// One match: chars `begin..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
  pub begin: usize,
  pub end:   usize,
}

impl Span {
  pub fn new(begin: usize, end: usize) -> Self {
    debug_assert!(begin <= end, "span begin {begin} after end {end}");
    Self { begin, end }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.end - self.begin
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.begin == self.end
  }

  /// true if the whole span lies inside `from..=to`.
  #[inline]
  pub fn within(&self, from: usize, to: usize) -> bool {
    self.begin >= from && self.end <= to
  }

  #[inline]
  pub fn overlaps(&self, other: &Span) -> bool {
    self.begin < other.end && other.begin < self.end
  }
}

/// Search primitives the span locator needs from a buffer.
pub trait TextSearch {
  /// All non-overlapping matches of `pattern` in the buffer, in ascending
  /// order.
  fn find_all(&self, pattern: &str, literal: bool) -> Result<Vec<Span>>;

  /// The first match of `pattern` starting at or after `from`.
  fn find_next(&self, pattern: &str, from: usize, literal: bool) -> Result<Option<Span>>;
}

/// [`TextSearch`] over a rope slice.
///
/// Compiled patterns are cached, since the locator asks for the same two
/// patterns over and over while it balances nested pairs.
pub struct RopeSearch<'a> {
  text:  RopeSlice<'a>,
  cache: RefCell<HashMap<(String, bool), Regex>>,
}

impl<'a> RopeSearch<'a> {
  pub fn new(text: RopeSlice<'a>) -> Self {
    Self {
      text,
      cache: RefCell::new(HashMap::new()),
    }
  }

  pub fn text(&self) -> RopeSlice<'a> {
    self.text
  }

  fn regex(&self, pattern: &str, literal: bool) -> Result<Regex> {
    let key = (pattern.to_string(), literal);
    if let Some(regex) = self.cache.borrow().get(&key) {
      return Ok(regex.clone());
    }

    let regex = rope::compile(pattern, literal).map_err(|err| {
      SearchError::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
      }
    })?;
    self.cache.borrow_mut().insert(key, regex.clone());
    Ok(regex)
  }

  fn span(&self, start_byte: usize, end_byte: usize) -> Span {
    Span::new(
      self.text.byte_to_char(start_byte),
      self.text.byte_to_char(end_byte),
    )
  }
}

impl TextSearch for RopeSearch<'_> {
  fn find_all(&self, pattern: &str, literal: bool) -> Result<Vec<Span>> {
    let regex = self.regex(pattern, literal)?;
    Ok(
      regex
        .find_iter(self.text.regex_input())
        .map(|m| self.span(m.start(), m.end()))
        .collect(),
    )
  }

  fn find_next(&self, pattern: &str, from: usize, literal: bool) -> Result<Option<Span>> {
    let regex = self.regex(pattern, literal)?;
    if from > self.text.len_chars() {
      return Ok(None);
    }
    Ok(
      regex
        .find(self.text.regex_input_at(from..))
        .map(|m| self.span(m.start(), m.end())),
    )
  }
}
