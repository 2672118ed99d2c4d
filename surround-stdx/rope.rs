//! Regex searching over ropes.
//!
//! `ropey` stores text in chunks, so a regex engine cannot scan a
//! `RopeSlice` as one `&str`. [`RopeSliceExt`] builds a `regex_cursor` input
//! that walks the chunks directly, and [`compile`] builds a [`Regex`] from
//! either a pattern or a literal string.
//!
//! ```
//! use ropey::Rope;
//! use surround_stdx::rope::{self, RopeSliceExt};
//!
//! let text = Rope::from("a::b::c");
//! let regex = rope::compile("::", true).unwrap();
//! let starts: Vec<_> = regex
//!   .find_iter(text.slice(..).regex_input())
//!   .map(|m| m.start())
//!   .collect();
//! assert_eq!(starts, vec![1, 4]);
//! ```

use std::ops::{
  Bound,
  RangeBounds,
};

pub use regex_cursor::engines::meta::Regex;
use regex_cursor::{
  Input as RegexInput,
  RopeyCursor,
};
use ropey::RopeSlice;
use thiserror::Error;

/// A pattern that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BuildError {
  pub message: String,
}

/// Compile `pattern` into a [`Regex`].
///
/// With `literal` set the pattern is escaped first and matches exactly its own
/// characters.
pub fn compile(pattern: &str, literal: bool) -> Result<Regex, BuildError> {
  let result = if literal {
    Regex::new(&regex::escape(pattern))
  } else {
    Regex::new(pattern)
  };
  result.map_err(|err| {
    BuildError {
      message: err.to_string(),
    }
  })
}

pub trait RopeSliceExt<'a>: Sized {
  /// Regex input over the whole slice.
  fn regex_input(self) -> RegexInput<RopeyCursor<'a>>;

  /// Regex input restricted to a byte range of the slice. Match offsets stay
  /// relative to the start of the slice.
  fn regex_input_at_bytes<R: RangeBounds<usize>>(
    self,
    byte_range: R,
  ) -> RegexInput<RopeyCursor<'a>>;

  /// Regex input restricted to a char range of the slice.
  fn regex_input_at<R: RangeBounds<usize>>(self, char_range: R) -> RegexInput<RopeyCursor<'a>>;
}

impl<'a> RopeSliceExt<'a> for RopeSlice<'a> {
  fn regex_input(self) -> RegexInput<RopeyCursor<'a>> {
    RegexInput::new(RopeyCursor::new(self))
  }

  fn regex_input_at_bytes<R: RangeBounds<usize>>(
    self,
    byte_range: R,
  ) -> RegexInput<RopeyCursor<'a>> {
    let input = match byte_range.start_bound() {
      Bound::Included(&pos) | Bound::Excluded(&pos) => {
        RegexInput::new(RopeyCursor::at(self, pos))
      },
      Bound::Unbounded => self.regex_input(),
    };
    input.range(byte_range)
  }

  fn regex_input_at<R: RangeBounds<usize>>(self, char_range: R) -> RegexInput<RopeyCursor<'a>> {
    let start = match char_range.start_bound() {
      Bound::Included(&pos) => Bound::Included(self.char_to_byte(pos)),
      Bound::Excluded(&pos) => Bound::Excluded(self.char_to_byte(pos)),
      Bound::Unbounded => Bound::Unbounded,
    };
    let end = match char_range.end_bound() {
      Bound::Included(&pos) => Bound::Included(self.char_to_byte(pos)),
      Bound::Excluded(&pos) => Bound::Excluded(self.char_to_byte(pos)),
      Bound::Unbounded => Bound::Unbounded,
    };
    self.regex_input_at_bytes((start, end))
  }
}
