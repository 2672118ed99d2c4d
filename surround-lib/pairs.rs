//! Resolving a typed token into a surround pair.
//!
//! A [`PairTable`] maps a trigger character to the strings placed on each
//! side. Both the opening and the closing bracket are triggers for the same
//! pair, so typing `(` or `)` makes no difference. Tokens whose first char is
//! not a trigger surround themselves, which covers quotes and arbitrary text:
//!
//! ```
//! use surround_lib::pairs::PairTable;
//!
//! let table = PairTable::default_search();
//! assert_eq!(table.resolve(")").open.as_str(), "(");
//! assert_eq!(table.resolve("'").close.as_str(), "'");
//! assert_eq!(table.resolve("::").open.as_str(), "::");
//! ```
//!
//! Two tables are kept apart: one for the text *inserted* by a surround and
//! one for the delimiters *searched* when changing or deleting. That way
//! insertion can add padding inside brackets while searching stays exact.
//!
//! [`addition_pair`] and [`search_spec`] run a token through a table and then
//! through the tag compiler in [`crate::tag`].

use std::collections::HashMap;

use crate::{
  Tendril,
  tag::{
    TagMode,
    compile_tag,
  },
};

/// Default pairs for inserting new surrounding text. Braces are padded.
pub const DEFAULT_ADDITION_PAIRS: &[(char, &str, &str)] = &[
  ('(', "(", ")"),
  (')', "(", ")"),
  ('[', "[", "]"),
  (']', "[", "]"),
  ('{', "{ ", " }"),
  ('}', "{ ", " }"),
];

/// Default pairs for matching existing surrounding text.
pub const DEFAULT_SEARCH_PAIRS: &[(char, &str, &str)] = &[
  ('(', "(", ")"),
  (')', "(", ")"),
  ('[', "[", "]"),
  (']', "[", "]"),
  ('{', "{", "}"),
  ('}', "{", "}"),
];

/// Literal text placed on both sides of a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pair {
  pub open:  Tendril,
  pub close: Tendril,
}

impl Pair {
  /// A pair that removes the delimiters it replaces.
  pub fn empty() -> Self {
    Self::default()
  }

  /// true if open == close
  pub fn same(&self) -> bool {
    self.open == self.close
  }

  pub fn is_empty(&self) -> bool {
    self.open.is_empty() && self.close.is_empty()
  }

  fn symmetric(token: &str) -> Self {
    Self::from((token, token))
  }
}

impl From<(&str, &str)> for Pair {
  fn from((open, close): (&str, &str)) -> Self {
    Self {
      open:  Tendril::from(open),
      close: Tendril::from(close),
    }
  }
}

impl From<(String, String)> for Pair {
  fn from((open, close): (String, String)) -> Self {
    Self::from((open.as_str(), close.as_str()))
  }
}

/// Trigger character to pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairTable(HashMap<char, Pair>);

impl PairTable {
  pub fn new<V, P>(pairs: V) -> Self
  where
    V: IntoIterator<Item = (char, P)>,
    P: Into<Pair>,
  {
    Self(
      pairs
        .into_iter()
        .map(|(trigger, pair)| (trigger, pair.into()))
        .collect(),
    )
  }

  pub fn default_addition() -> Self {
    Self::from_entries(DEFAULT_ADDITION_PAIRS)
  }

  pub fn default_search() -> Self {
    Self::from_entries(DEFAULT_SEARCH_PAIRS)
  }

  fn from_entries(entries: &[(char, &str, &str)]) -> Self {
    Self::new(
      entries
        .iter()
        .map(|&(trigger, open, close)| (trigger, (open, close))),
    )
  }

  pub fn get(&self, trigger: char) -> Option<&Pair> {
    self.0.get(&trigger)
  }

  /// Set the pair for `trigger`, returning the one it replaced.
  pub fn insert(&mut self, trigger: char, pair: impl Into<Pair>) -> Option<Pair> {
    self.0.insert(trigger, pair.into())
  }

  /// Override entries of `self` with those of `other`.
  pub fn extend(&mut self, other: PairTable) {
    self.0.extend(other.0);
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// The pair for `token`: the table entry of its first char, or the token on
  /// both sides.
  pub fn resolve(&self, token: &str) -> Pair {
    token
      .chars()
      .next()
      .and_then(|first| self.get(first))
      .cloned()
      .unwrap_or_else(|| Pair::symmetric(token))
  }
}

/// What the span locator searches for.
///
/// `literal` is an explicit flag: it is never inferred from the length of the
/// patterns, so multi-char literal delimiters such as `::` or `**` are matched
/// exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSpec {
  pub open:    String,
  pub close:   String,
  pub literal: bool,
}

impl PairSpec {
  pub fn literal(open: impl Into<String>, close: impl Into<String>) -> Self {
    Self {
      open:    open.into(),
      close:   close.into(),
      literal: true,
    }
  }

  pub fn regex(open: impl Into<String>, close: impl Into<String>) -> Self {
    Self {
      open:    open.into(),
      close:   close.into(),
      literal: false,
    }
  }

  /// The same spec with open and close exchanged.
  #[must_use]
  pub fn swapped(&self) -> Self {
    Self {
      open:    self.close.clone(),
      close:   self.open.clone(),
      literal: self.literal,
    }
  }
}

/// Text to insert around a selection for `token`.
pub fn addition_pair(token: &str, table: &PairTable) -> Pair {
  let pair = table.resolve(token);
  let pair = match compile_tag(&pair.open, TagMode::Insert) {
    Some(tag) => Pair::from(tag),
    None => pair,
  };
  tracing::debug!(token, open = %pair.open, close = %pair.close, "resolved addition pair");
  pair
}

/// Delimiters to search for when changing or deleting the `token` surround.
pub fn search_spec(token: &str, table: &PairTable) -> PairSpec {
  let pair = table.resolve(token);
  let spec = match compile_tag(&pair.open, TagMode::Search) {
    Some((open, close)) => PairSpec::regex(open, close),
    None => PairSpec::literal(pair.open.as_str(), pair.close.as_str()),
  };
  tracing::debug!(token, ?spec, "resolved search pair");
  spec
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_resolve_from_table() {
    let table = PairTable::default_search();
    assert_eq!(table.resolve("("), Pair::from(("(", ")")));
    assert_eq!(table.resolve("}"), Pair::from(("{", "}")));
    // Only the first char is looked up.
    assert_eq!(table.resolve("[x"), Pair::from(("[", "]")));
  }

  #[test]
  fn test_resolve_symmetric_fallback() {
    let table = PairTable::default_addition();
    assert_eq!(table.resolve("\""), Pair::from(("\"", "\"")));
    assert_eq!(table.resolve("**"), Pair::from(("**", "**")));
    assert!(table.resolve("").is_empty());
    assert!(table.resolve("'").same());
  }

  #[test]
  fn test_tables_are_independent() {
    let addition = PairTable::default_addition();
    let search = PairTable::default_search();

    assert_eq!(addition_pair("}", &addition), Pair::from(("{ ", " }")));
    assert_eq!(search_spec("}", &search), PairSpec::literal("{", "}"));

    let mut addition = addition;
    addition.insert('(', ("( ", " )"));
    addition.insert(')', ("( ", " )"));
    assert_eq!(addition_pair("(", &addition), Pair::from(("( ", " )")));
    assert_eq!(addition_pair(")", &addition), Pair::from(("( ", " )")));
    assert_eq!(search_spec(")", &search), PairSpec::literal("(", ")"));
  }

  #[test]
  fn test_open_and_close_trigger_same_spec() {
    let table = PairTable::default_search();
    for (open, close) in [("(", ")"), ("[", "]"), ("{", "}")] {
      assert_eq!(search_spec(open, &table), search_spec(close, &table));
    }
    assert_eq!(
      search_spec("<li>", &table),
      search_spec("</li>", &table)
    );
  }

  #[test]
  fn test_multi_char_literal_stays_literal() {
    let table = PairTable::default_search();
    assert_eq!(search_spec("::", &table), PairSpec::literal("::", "::"));
    assert_eq!(search_spec(".*", &table), PairSpec::literal(".*", ".*"));
  }

  #[test]
  fn test_tags_become_patterns() {
    let table = PairTable::default_search();
    let spec = search_spec("<b>", &table);
    assert!(!spec.literal);
    assert_eq!(spec.close, "</b>");

    let table = PairTable::default_addition();
    assert_eq!(
      addition_pair("<em class=x>", &table),
      Pair::from(("<em class=x>", "</em>"))
    );
  }

  #[test]
  fn test_malformed_tag_is_literal() {
    let table = PairTable::default_search();
    assert_eq!(search_spec("<b", &table), PairSpec::literal("<b", "<b"));
    assert_eq!(
      addition_pair("<b", &PairTable::default_addition()),
      Pair::from(("<b", "<b"))
    );
  }

  #[test]
  fn test_table_trigger_shadows_tag() {
    let mut table = PairTable::default_search();
    table.insert('<', ("<", ">"));
    assert_eq!(search_spec("<div>", &table), PairSpec::literal("<", ">"));
  }

  #[test]
  fn test_swapped() {
    let spec = PairSpec::regex("a+", "b");
    assert_eq!(spec.swapped(), PairSpec::regex("b", "a+"));
  }
}
