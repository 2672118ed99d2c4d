//! Locating the delimiter pair that encloses a cursor.
//!
//! Given a [`PairSpec`] and a cursor range, [`Locator::locate`] finds the
//! innermost opening match before the range and the closing match after it
//! that belong together, stepping over nested pairs of the same kind.
//!
//! # Balancing
//!
//! Nesting is resolved by counting. Between a real enclosing delimiter and the
//! cursor, the same-kind opens and closes balance out. A non-zero residual
//! means the nearest textual match belongs to a nested pair that is already
//! open (or already closed), and the search steps one match further out:
//!
//! - [`Locator::find_end`] takes the next close at or after the cursor and
//!   compares the opens and closes between the cursor and that close. Any
//!   residual: continue after the close.
//! - [`Locator::find_start`] takes the last open before the cursor and
//!   compares the closes and opens between that open and the cursor. Any
//!   residual: continue before the open.
//!
//! For symmetric delimiters (quotes) opens and closes are the same matches, so
//! the nearest delimiter on each side is taken.
//!
//! A match counts as "between" `a` and `b` only when it lies entirely inside
//! `a..=b`, taken from the non-overlapping matches of the whole buffer.
//!
//! Both searches are loops over a window that strictly shrinks on every step,
//! so they terminate for any text and any pattern, including patterns that
//! match the empty string.
//!
//! # Example
//!
//! ```
//! use ropey::Rope;
//! use surround_lib::{
//!   pairs::PairSpec,
//!   search::{RopeSearch, Span},
//!   selection::Range,
//!   surround::Locator,
//! };
//!
//! let text = Rope::from("(a(bc)d)");
//! let search = RopeSearch::new(text.slice(..));
//! let pair = PairSpec::literal("(", ")");
//! let locator = Locator::new(&search, &pair).unwrap();
//!
//! let found = locator.locate(Range::point(4)).unwrap();
//! assert_eq!((found.start, found.end), (Span::new(2, 3), Span::new(5, 6)));
//! ```

use thiserror::Error;

use crate::{
  pairs::PairSpec,
  search::{
    SearchError,
    Span,
    TextSearch,
  },
  selection::Range,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SurroundError {
  #[error("starting pair not found: {pattern}")]
  StartNotFound { pattern: String },
  #[error("ending pair not found: {pattern}")]
  EndNotFound { pattern: String },
  #[error("starting pair {start:?} overlaps ending pair {end:?}")]
  PairOverlap { start: Span, end: Span },
  #[error("surround pair overlaps the pair of another cursor")]
  CursorOverlap,
  #[error("surround delimiters must not be empty")]
  EmptyPattern,
  #[error(transparent)]
  Search(#[from] SearchError),
}

type Result<T> = std::result::Result<T, SurroundError>;

/// The enclosing pair found for one cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
  pub start: Span,
  pub end:   Span,
}

/// Balanced search for one [`PairSpec`] over one buffer.
///
/// All opens and closes are collected once on construction; the per-step
/// counting then works on those sorted lists.
pub struct Locator<'a, S: TextSearch + ?Sized> {
  search: &'a S,
  pair:   &'a PairSpec,
  opens:  Vec<Span>,
  closes: Vec<Span>,
}

impl<'a, S: TextSearch + ?Sized> Locator<'a, S> {
  pub fn new(search: &'a S, pair: &'a PairSpec) -> Result<Self> {
    if pair.open.is_empty() || pair.close.is_empty() {
      return Err(SurroundError::EmptyPattern);
    }

    let opens = search.find_all(&pair.open, pair.literal)?;
    let closes = search.find_all(&pair.close, pair.literal)?;
    tracing::trace!(
      open = %pair.open,
      close = %pair.close,
      opens = opens.len(),
      closes = closes.len(),
      "collected delimiter matches"
    );

    Ok(Self {
      search,
      pair,
      opens,
      closes,
    })
  }

  pub fn pair(&self) -> &PairSpec {
    self.pair
  }

  /// The enclosing pair around `range`: the end is searched from `range.to()`,
  /// the start from `range.from()`.
  pub fn locate(&self, range: Range) -> Result<MatchResult> {
    let end = self.find_end(range.to())?;
    let start = self.find_start(range.from())?;

    // RopeSearch keeps the end at or after the start, but a host TextSearch
    // may return a close that begins before `range.to()`.
    if start.end > end.begin {
      return Err(SurroundError::PairOverlap { start, end });
    }
    Ok(MatchResult { start, end })
  }

  /// The close that balances the cursor at `from`.
  pub fn find_end(&self, from: usize) -> Result<Span> {
    let mut pos = from;

    loop {
      let Some(candidate) = self
        .search
        .find_next(&self.pair.close, pos, self.pair.literal)?
      else {
        return Err(SurroundError::EndNotFound {
          pattern: self.pair.close.clone(),
        });
      };

      let residual = imbalance(&self.opens, &self.closes, from, candidate.begin);
      tracing::trace!(from, ?candidate, residual, "end candidate");
      if residual == 0 {
        return Ok(candidate);
      }

      // Continue past the candidate; an empty match still moves one char.
      pos = candidate.end.max(candidate.begin + 1);
    }
  }

  /// The open that balances the cursor at `to`.
  pub fn find_start(&self, to: usize) -> Result<Span> {
    let mut limit = to;

    loop {
      let Some(&candidate) = between(&self.opens, 0, limit).last() else {
        return Err(SurroundError::StartNotFound {
          pattern: self.pair.open.clone(),
        });
      };

      // Opens and closes trade places when counting backwards.
      let residual = imbalance(&self.closes, &self.opens, candidate.end, to);
      tracing::trace!(to, ?candidate, residual, "start candidate");
      if residual == 0 {
        return Ok(candidate);
      }

      if candidate.begin < limit {
        limit = candidate.begin;
      } else if limit > 0 {
        limit -= 1;
      } else {
        return Err(SurroundError::StartNotFound {
          pattern: self.pair.open.clone(),
        });
      }
    }
  }
}

/// Matches of `spans` lying entirely inside `from..=to`.
///
/// `spans` are sorted and non-overlapping, so both their begins and their
/// ends ascend.
fn between(spans: &[Span], from: usize, to: usize) -> &[Span] {
  let lo = spans.partition_point(|span| span.begin < from);
  let hi = spans.partition_point(|span| span.end <= to);
  if lo < hi { &spans[lo..hi] } else { &[] }
}

/// How many more `unbalanced` than `balancing` matches lie inside `from..=to`.
fn imbalance(unbalanced: &[Span], balancing: &[Span], from: usize, to: usize) -> isize {
  between(unbalanced, from, to).len() as isize - between(balancing, from, to).len() as isize
}

/// Locate the enclosing `pair` around every range of `ranges`, one result per
/// range.
pub fn locate_all<'r, S, I>(
  search: &S,
  pair: &PairSpec,
  ranges: I,
) -> Result<Vec<Result<MatchResult>>>
where
  S: TextSearch + ?Sized,
  I: IntoIterator<Item = &'r Range>,
{
  let locator = Locator::new(search, pair)?;
  Ok(
    ranges
      .into_iter()
      .map(|range| locator.locate(*range))
      .collect(),
  )
}

#[cfg(test)]
mod test {
  use ropey::Rope;
  use smallvec::SmallVec;

  use super::*;
  use crate::{
    pairs::{
      PairTable,
      search_spec,
    },
    search::RopeSearch,
    selection::Selection,
  };

  fn locate_token(text: &Rope, token: &str, range: Range) -> Result<MatchResult> {
    let search = RopeSearch::new(text.slice(..));
    let pair = search_spec(token, &PairTable::default_search());
    Locator::new(&search, &pair)?.locate(range)
  }

  #[test]
  fn test_innermost_pair() {
    #[rustfmt::skip]
    let (doc, selection, expectations) =
      rope_with_selections_and_expectations(
        "(a(b c)d)",
        "  _ ^ _  "
      );

    let found = locate_token(&doc, "(", selection.ranges()[0]).unwrap();
    assert_eq!((found.start.begin, found.end.begin), expectations[0]);
  }

  #[test]
  fn test_skips_closed_nested_pair() {
    #[rustfmt::skip]
    let (doc, selection, expectations) =
      rope_with_selections_and_expectations(
        "(a(b)c(d)e f)",
        "_         ^ _"
      );

    let found = locate_token(&doc, ")", selection.ranges()[0]).unwrap();
    assert_eq!((found.start.begin, found.end.begin), expectations[0]);
  }

  #[test]
  fn test_skips_nested_pair_after_cursor() {
    #[rustfmt::skip]
    let (doc, selection, expectations) =
      rope_with_selections_and_expectations(
        "[x [y] z]",
        "_ ^     _"
      );

    let found = locate_token(&doc, "[", selection.ranges()[0]).unwrap();
    assert_eq!((found.start.begin, found.end.begin), expectations[0]);
  }

  #[test]
  fn test_every_cursor() {
    #[rustfmt::skip]
    let (doc, selection, expectations) =
      rope_with_selections_and_expectations(
        "(some) (chars)\n(newline)",
        "_ ^  _ _ ^   _\n_    ^  _"
      );

    let search = RopeSearch::new(doc.slice(..));
    let pair = PairSpec::literal("(", ")");
    let found: Vec<_> = locate_all(&search, &pair, &selection)
      .unwrap()
      .into_iter()
      .map(|result| {
        let result = result.unwrap();
        (result.start.begin, result.end.begin)
      })
      .collect();
    assert_eq!(found, expectations);
  }

  #[test]
  fn test_quotes() {
    #[rustfmt::skip]
    let (doc, selection, expectations) =
      rope_with_selections_and_expectations(
        "say 'quoted text' and 'more'",
        "    _     ^     _           "
      );

    let found = locate_token(&doc, "'", selection.ranges()[0]).unwrap();
    assert_eq!((found.start.begin, found.end.begin), expectations[0]);
  }

  #[test]
  fn test_multi_char_literal() {
    let doc = Rope::from("a ** b ** c");
    let found = locate_token(&doc, "**", Range::point(5)).unwrap();
    assert_eq!(found.start, Span::new(2, 4));
    assert_eq!(found.end, Span::new(7, 9));
  }

  #[test]
  fn test_selection_range() {
    let doc = Rope::from("{ foo(bar) }");
    let found = locate_token(&doc, "{", Range::new(2, 10)).unwrap();
    assert_eq!(found.start, Span::new(0, 1));
    assert_eq!(found.end, Span::new(11, 12));
  }

  #[test]
  fn test_tag_with_attributes() {
    let doc = Rope::from("<div class=\"a\">text</div>");
    let found = locate_token(&doc, "<div>", Range::point(17)).unwrap();
    assert_eq!(found.start, Span::new(0, 15));
    assert_eq!(found.end, Span::new(19, 25));
  }

  #[test]
  fn test_nested_tags() {
    let doc = Rope::from("<div><div id=1>in</div>out</div>");
    // Cursor after the inner pair.
    let found = locate_token(&doc, "<div>", Range::point(26)).unwrap();
    assert_eq!(found.start, Span::new(0, 5));
    assert_eq!(found.end, Span::new(26, 32));

    // Cursor inside the inner pair.
    let found = locate_token(&doc, "</div>", Range::point(16)).unwrap();
    assert_eq!(found.start, Span::new(5, 15));
    assert_eq!(found.end, Span::new(17, 23));
  }

  #[test]
  fn test_tag_name_is_not_a_prefix() {
    let doc = Rope::from("<b><br>x</b>");
    let found = locate_token(&doc, "<br>", Range::point(7));
    assert_eq!(
      found,
      Err(SurroundError::EndNotFound {
        pattern: "</br>".to_string(),
      })
    );
  }

  #[test]
  fn test_not_found() {
    let doc = Rope::from("no parens here");
    assert_eq!(
      locate_token(&doc, "(", Range::point(3)),
      Err(SurroundError::EndNotFound {
        pattern: ")".to_string(),
      })
    );

    let doc = Rope::from("only close) here");
    assert_eq!(
      locate_token(&doc, "(", Range::point(3)),
      Err(SurroundError::StartNotFound {
        pattern: "(".to_string(),
      })
    );
  }

  #[test]
  fn test_cursor_before_pair() {
    let doc = Rope::from("x (y)");
    assert!(matches!(
      locate_token(&doc, "(", Range::point(1)),
      Err(SurroundError::EndNotFound { .. })
    ));
  }

  #[test]
  fn test_unbalanced_start() {
    let doc = Rope::from("(a) b)");
    // The only open before the cursor is closed already.
    assert!(matches!(
      locate_token(&doc, "(", Range::point(4)),
      Err(SurroundError::StartNotFound { .. })
    ));
  }

  #[test]
  fn test_empty_pattern() {
    let doc = Rope::from("abc");
    let search = RopeSearch::new(doc.slice(..));
    let pair = PairSpec::literal("", "");
    assert_eq!(
      Locator::new(&search, &pair).err(),
      Some(SurroundError::EmptyPattern)
    );
  }

  #[test]
  fn test_invalid_pattern() {
    let doc = Rope::from("abc");
    let search = RopeSearch::new(doc.slice(..));
    let pair = PairSpec::regex("(", ")");
    assert!(matches!(
      Locator::new(&search, &pair),
      Err(SurroundError::Search(SearchError::InvalidPattern { .. }))
    ));
  }

  #[test]
  fn test_empty_matches_terminate() {
    let doc = Rope::from("a(b)c(d)");
    let search = RopeSearch::new(doc.slice(..));
    let pair = PairSpec::regex(r"x*", r"\(*");
    let locator = Locator::new(&search, &pair).unwrap();

    for pos in 0..=doc.len_chars() {
      let _ = locator.locate(Range::point(pos));
    }
  }

  #[test]
  fn test_residual_step_over_siblings() {
    let doc = Rope::from("((a)(b)c)");
    let found = locate_token(&doc, "(", Range::point(8)).unwrap();
    assert_eq!(found.start, Span::new(0, 1));
    assert_eq!(found.end, Span::new(8, 9));

    let found = locate_token(&doc, "(", Range::point(1)).unwrap();
    assert_eq!(found.start, Span::new(0, 1));
    assert_eq!(found.end, Span::new(8, 9));
  }

  #[test]
  fn test_even_nesting_depth() {
    // Two opens between the cursor and the first close: an even count, but
    // that close still belongs to a nested pair.
    let doc = Rope::from("(((a)))");
    let found = locate_token(&doc, "(", Range::point(1)).unwrap();
    assert_eq!((found.start, found.end), (Span::new(0, 1), Span::new(6, 7)));

    // Same on the way back: two closes between the nearest open and the cursor.
    let found = locate_token(&doc, ")", Range::point(6)).unwrap();
    assert_eq!((found.start, found.end), (Span::new(0, 1), Span::new(6, 7)));
  }

  /// Answers every query with the first char, wherever the cursor is.
  struct FirstCharSearch;

  impl TextSearch for FirstCharSearch {
    fn find_all(&self, _pattern: &str, _literal: bool) -> crate::search::Result<Vec<Span>> {
      Ok(vec![Span::new(0, 1)])
    }

    fn find_next(
      &self,
      _pattern: &str,
      _from: usize,
      _literal: bool,
    ) -> crate::search::Result<Option<Span>> {
      Ok(Some(Span::new(0, 1)))
    }
  }

  #[test]
  fn test_pair_overlap_from_host_search() {
    let pair = PairSpec::literal("(", ")");
    let locator = Locator::new(&FirstCharSearch, &pair).unwrap();
    assert_eq!(
      locator.locate(Range::point(2)),
      Err(SurroundError::PairOverlap {
        start: Span::new(0, 1),
        end:   Span::new(0, 1),
      })
    );
  }

  #[test]
  fn test_between_bounds() {
    let spans = [Span::new(0, 1), Span::new(3, 4), Span::new(6, 7)];
    assert_eq!(between(&spans, 0, 7).len(), 3);
    // Begin bound is inclusive.
    assert_eq!(between(&spans, 3, 7), &spans[1..]);
    // End bound compares span ends, so a match ending at `to` counts.
    assert_eq!(between(&spans, 0, 4), &spans[..2]);
    assert!(between(&spans, 4, 6).is_empty());
    assert!(between(&spans, 5, 2).is_empty());
  }

  // A rope plus cursors and expected pairs read from a marker line under the
  // text: `^` is a cursor, each two `_` are the (start.begin, end.begin) of one
  // expected pair. Markers are ASCII, so byte indices are char offsets.
  fn rope_with_selections_and_expectations(
    text: &str,
    marks: &str,
  ) -> (Rope, Selection, Vec<(usize, usize)>) {
    assert_eq!(
      text.len(),
      marks.len(),
      "marker line must be as long as the text"
    );

    let rope = Rope::from(text);

    let selections: SmallVec<[Range; 1]> = marks
      .match_indices('^')
      .map(|(i, _)| Range::point(i))
      .collect();

    let expected_positions: Vec<usize> = marks.match_indices('_').map(|(i, _)| i).collect();
    assert_eq!(
      expected_positions.len() % 2,
      0,
      "expected positions must be provided in pairs"
    );
    let expectations = expected_positions
      .chunks(2)
      .map(|pair| (pair[0], pair[1]))
      .collect();

    (rope, Selection::new(selections).unwrap(), expectations)
  }
}
