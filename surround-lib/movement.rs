//! Direction of a selection.
//!
//! A [`crate::selection::Range`] remembers which end the user extended, so
//! a range built from `(anchor, head)` with `head < anchor` points backward.
//! Surround operations only look at `from()`/`to()`, but hosts hand ranges
//! over with their direction intact and expect it back unchanged.

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
  /// Head at or after the anchor.
  Forward,
  /// Head before the anchor.
  Backward,
}
