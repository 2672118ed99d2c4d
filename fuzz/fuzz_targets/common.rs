use ropey::Rope;
use smallvec::SmallVec;
use surround_lib::selection::{
  Range,
  Selection,
};

const MAX_TEXT_BYTES: usize = 4 * 1024;
const MAX_CURSORS: usize = 16;
const MAX_TOKEN_BYTES: usize = 16;

/// Tokens that exercise table lookups, tags and multi-char delimiters.
const TOKENS: &[&str] = &[
  "(", ")", "[", "]", "{", "}", "\"", "'", "`", "**", "::", "<b>", "</b>", "<div class=\"a\">",
  "<", ".*",
];

pub struct Scenario {
  pub text:        Rope,
  pub selection:   Selection,
  pub target:      String,
  pub replacement: String,
  /// Raw delimiters for driving the locator directly.
  pub open:        String,
  pub close:       String,
  pub literal:     bool,
}

pub fn scenario_from_bytes(data: &[u8]) -> Scenario {
  let mut cursor = ByteCursor::new(data);
  let literal = cursor.next_u8() & 1 == 0;
  let target = cursor.next_token();
  let replacement = cursor.next_token();
  let open = cursor.next_string(MAX_TOKEN_BYTES);
  let close = cursor.next_string(MAX_TOKEN_BYTES);

  let cursor_count = cursor.next_usize(MAX_CURSORS).max(1);
  let positions: Vec<(u16, u16)> = (0..cursor_count)
    .map(|_| (cursor.next_u16(), cursor.next_u16()))
    .collect();

  let text_len = cursor.next_usize(MAX_TEXT_BYTES);
  let text = Rope::from_str(&cursor.next_string(text_len));

  let len = text.len_chars();
  let ranges: SmallVec<[Range; 1]> = positions
    .into_iter()
    .map(|(anchor, head)| {
      Range::new(
        anchor as usize % (len + 1),
        head as usize % (len + 1),
      )
    })
    .collect();
  let selection = Selection::new(ranges).unwrap_or_else(|_| Selection::point(0));

  Scenario {
    text,
    selection,
    target,
    replacement,
    open,
    close,
    literal,
  }
}

struct ByteCursor<'a> {
  data: &'a [u8],
  pos:  usize,
}

impl<'a> ByteCursor<'a> {
  fn new(data: &'a [u8]) -> Self {
    Self { data, pos: 0 }
  }

  fn next_u8(&mut self) -> u8 {
    let value = self.data.get(self.pos).copied().unwrap_or(0);
    self.pos = self.pos.saturating_add(1);
    value
  }

  fn next_u16(&mut self) -> u16 {
    let lo = self.next_u8() as u16;
    let hi = self.next_u8() as u16;
    lo | (hi << 8)
  }

  fn next_usize(&mut self, max: usize) -> usize {
    if max == 0 {
      return 0;
    }
    (self.next_u16() as usize) % (max + 1)
  }

  fn next_bytes(&mut self, len: usize) -> &'a [u8] {
    let start = self.pos.min(self.data.len());
    let end = start.saturating_add(len).min(self.data.len());
    self.pos = end;
    &self.data[start..end]
  }

  fn next_string(&mut self, max: usize) -> String {
    let len = self.next_usize(max);
    String::from_utf8_lossy(self.next_bytes(len)).into_owned()
  }

  /// A known token most of the time, arbitrary bytes otherwise.
  fn next_token(&mut self) -> String {
    let pick = self.next_u8() as usize;
    match TOKENS.get(pick % (TOKENS.len() + 4)) {
      Some(token) => token.to_string(),
      None => self.next_string(MAX_TOKEN_BYTES),
    }
  }
}
