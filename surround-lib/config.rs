//! Surround configuration.
//!
//! The two trigger tables are passed explicitly to every command; nothing is
//! read from global state. [`SurroundConfig::default`] carries the built-in
//! tables from [`crate::pairs`], and user TOML only overrides the triggers it
//! names:
//!
//! ```toml
//! [pairs-for-addition]
//! "(" = ["( ", " )"]
//! ")" = ["( ", " )"]
//!
//! [pairs-for-search]
//! "«" = ["«", "»"]
//! ```
//!
//! With `replace-tables = true` a table given in the file replaces the
//! built-in one instead of being merged into it.

use std::{
  collections::HashMap,
  fs,
  path::Path,
};

use serde::Deserialize;
use thiserror::Error;

use crate::pairs::PairTable;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to parse surround config: {0}")]
  BadConfig(#[from] toml::de::Error),
  #[error("failed to read surround config: {0}")]
  Io(#[from] std::io::Error),
  #[error("pair trigger '{trigger}' must be a single character")]
  InvalidTrigger { trigger: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurroundConfig {
  /// Pairs inserted by `surround-with` and used as replacements.
  pub pairs_for_addition: PairTable,
  /// Pairs searched by `surround-change` and `surround-delete`.
  pub pairs_for_search:   PairTable,
}

impl Default for SurroundConfig {
  fn default() -> Self {
    Self {
      pairs_for_addition: PairTable::default_addition(),
      pairs_for_search:   PairTable::default_search(),
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigRaw {
  #[serde(default)]
  replace_tables:     bool,
  pairs_for_addition: Option<HashMap<String, (String, String)>>,
  pairs_for_search:   Option<HashMap<String, (String, String)>>,
}

impl SurroundConfig {
  /// Defaults overridden by the TOML in `text`.
  pub fn from_toml(text: &str) -> Result<Self> {
    let mut config = Self::default();
    config.merge(toml::from_str(text)?)?;
    Ok(config)
  }

  pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
    Self::from_toml(&fs::read_to_string(path)?)
  }

  /// Merge a global and a workspace-local config over the defaults, local
  /// winning per trigger.
  ///
  /// A source that could not be read counts as absent; a source that does not
  /// parse is an error.
  pub fn load(global: Result<String>, local: Result<String>) -> Result<Self> {
    let mut config = Self::default();

    for source in [global, local] {
      match source {
        Ok(text) => config.merge(toml::from_str(&text)?)?,
        Err(ConfigError::Io(err)) => {
          tracing::debug!(%err, "surround config source skipped");
        },
        Err(err) => return Err(err),
      }
    }

    Ok(config)
  }

  fn merge(&mut self, raw: ConfigRaw) -> Result<()> {
    if let Some(pairs) = raw.pairs_for_addition {
      merge_table(&mut self.pairs_for_addition, pairs, raw.replace_tables)?;
    }
    if let Some(pairs) = raw.pairs_for_search {
      merge_table(&mut self.pairs_for_search, pairs, raw.replace_tables)?;
    }
    Ok(())
  }
}

fn merge_table(
  table: &mut PairTable,
  pairs: HashMap<String, (String, String)>,
  replace: bool,
) -> Result<()> {
  let mut parsed = PairTable::default();
  for (trigger, pair) in pairs {
    let mut chars = trigger.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
      return Err(ConfigError::InvalidTrigger { trigger });
    };
    parsed.insert(ch, pair);
  }

  if replace {
    *table = parsed;
  } else {
    table.extend(parsed);
  }
  Ok(())
}
