//! Markup tag tokens.
//!
//! When the user types something shaped like `<name attrs>` the surround pair
//! is a tag pair rather than the token repeated on both sides. For insertion
//! the typed tag is used verbatim and the closing tag is derived from its
//! name. For searching, both sides become regular expressions, and a tag typed
//! without attributes also matches an existing tag that carries some:
//!
//! ```
//! use surround_lib::tag::{TagMode, compile_tag};
//!
//! let (open, close) = compile_tag("<div class=\"x\">", TagMode::Insert).unwrap();
//! assert_eq!((open.as_str(), close.as_str()), ("<div class=\"x\">", "</div>"));
//!
//! let (open, close) = compile_tag("<div>", TagMode::Search).unwrap();
//! assert_eq!(open, r"<div(?:\s[^>]*)?>");
//! assert_eq!(close, "</div>");
//! ```
//!
//! A closing tag such as `</div>` is accepted too and compiles to the same
//! pair as `<div>`.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
  #[error("malformed tag token '{token}'")]
  InvalidTagToken { token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
  /// Literal text to insert.
  Insert,
  /// Patterns for the span locator.
  Search,
}

/// A parsed tag token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
  pub name:    &'a str,
  /// Everything between the name and `>`, leading whitespace included.
  pub attrs:   &'a str,
  pub closing: bool,
}

impl Tag<'_> {
  pub fn close_tag(&self) -> String {
    format!("</{}>", self.name)
  }

  pub fn open_tag(&self) -> String {
    format!("<{}{}>", self.name, self.attrs)
  }

  /// Pattern for the opening side. Without typed attributes any attributes
  /// are accepted.
  pub fn open_pattern(&self) -> String {
    if self.attrs.is_empty() {
      format!(r"<{}(?:\s[^>]*)?>", regex::escape(self.name))
    } else {
      format!(
        "<{}{}>",
        regex::escape(self.name),
        regex::escape(self.attrs)
      )
    }
  }

  pub fn close_pattern(&self) -> String {
    format!("</{}>", regex::escape(self.name))
  }
}

fn tag_regex() -> &'static Regex {
  static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
  TAG_REGEX.get_or_init(|| {
    Regex::new(r"^<(/)?([^\s<>/]+)(\s[^>]*)?>$").expect("tag regex must compile")
  })
}

/// Parse `token` as a tag.
///
/// Returns `Ok(None)` for tokens that are not tag-like at all, and
/// [`TagError::InvalidTagToken`] for tokens that start like a tag but do not
/// finish as one (`<div`, `<>`, `< div>`).
pub fn parse_tag(token: &str) -> Result<Option<Tag<'_>>, TagError> {
  if !token.starts_with('<') || token.chars().count() < 2 {
    return Ok(None);
  }

  let invalid = || {
    TagError::InvalidTagToken {
      token: token.to_string(),
    }
  };

  let captures = tag_regex().captures(token).ok_or_else(invalid)?;
  let closing = captures.get(1).is_some();
  let name = captures.get(2).ok_or_else(invalid)?.as_str();
  let attrs = captures.get(3).map_or("", |m| m.as_str());

  if closing && !attrs.is_empty() {
    return Err(invalid());
  }

  Ok(Some(Tag {
    name,
    attrs,
    closing,
  }))
}

/// Compile `candidate` into an `(open, close)` pair for `mode`, or `None` when
/// the candidate is not a tag.
///
/// Malformed tags are logged and treated as plain text.
pub fn compile_tag(candidate: &str, mode: TagMode) -> Option<(String, String)> {
  let tag = match parse_tag(candidate) {
    Ok(tag) => tag?,
    Err(err) => {
      tracing::debug!(%err, "falling back to literal surround");
      return None;
    },
  };

  let pair = match mode {
    TagMode::Insert if tag.closing => (tag.open_tag(), tag.close_tag()),
    TagMode::Insert => (candidate.to_string(), tag.close_tag()),
    TagMode::Search => (tag.open_pattern(), tag.close_pattern()),
  };
  tracing::trace!(?mode, open = %pair.0, close = %pair.1, "compiled tag");
  Some(pair)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_parse_tag_shapes() {
    assert_eq!(
      parse_tag("<div>"),
      Ok(Some(Tag {
        name:    "div",
        attrs:   "",
        closing: false,
      }))
    );
    assert_eq!(
      parse_tag("<a href=\"#\" id=x>"),
      Ok(Some(Tag {
        name:    "a",
        attrs:   " href=\"#\" id=x",
        closing: false,
      }))
    );
    assert_eq!(
      parse_tag("</span>"),
      Ok(Some(Tag {
        name:    "span",
        attrs:   "",
        closing: true,
      }))
    );
    assert_eq!(
      parse_tag("<my-elem:x>").unwrap().map(|tag| tag.name),
      Some("my-elem:x")
    );
  }

  #[test]
  fn test_parse_tag_not_a_tag() {
    assert_eq!(parse_tag("("), Ok(None));
    assert_eq!(parse_tag("\""), Ok(None));
    assert_eq!(parse_tag("<"), Ok(None));
    assert_eq!(parse_tag("div>"), Ok(None));
    assert_eq!(parse_tag(""), Ok(None));
  }

  #[test]
  fn test_parse_tag_malformed() {
    for token in ["<div", "<>", "< div>", "</div class=x>", "<a/>", "<div>x"] {
      assert_eq!(
        parse_tag(token),
        Err(TagError::InvalidTagToken {
          token: token.to_string(),
        }),
        "{token}"
      );
    }
  }

  #[test]
  fn test_compile_insert() {
    assert_eq!(
      compile_tag("<p class=\"lead\">", TagMode::Insert),
      Some(("<p class=\"lead\">".to_string(), "</p>".to_string()))
    );
    assert_eq!(
      compile_tag("</p>", TagMode::Insert),
      Some(("<p>".to_string(), "</p>".to_string()))
    );
    assert_eq!(compile_tag("<p", TagMode::Insert), None);
    assert_eq!(compile_tag("*", TagMode::Insert), None);
  }

  #[test]
  fn test_compile_search() {
    assert_eq!(
      compile_tag("<div>", TagMode::Search),
      Some((r"<div(?:\s[^>]*)?>".to_string(), "</div>".to_string()))
    );
    assert_eq!(
      compile_tag("</div>", TagMode::Search),
      compile_tag("<div>", TagMode::Search)
    );
    assert_eq!(
      compile_tag("<a.b id=1>", TagMode::Search),
      Some((r"<a\.b id=1>".to_string(), r"</a\.b>".to_string()))
    );
  }

  #[test]
  fn test_search_patterns_match() {
    let (open, close) = compile_tag("<div>", TagMode::Search).unwrap();
    let open = Regex::new(&open).unwrap();
    let close = Regex::new(&close).unwrap();

    assert!(open.is_match("<div>"));
    assert!(open.is_match("<div class=\"a\">"));
    assert!(!open.is_match("<divider>"));
    assert!(close.is_match("</div>"));
    assert!(!close.is_match("</divider>"));
  }
}
