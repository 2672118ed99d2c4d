use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod command;
pub mod config;
pub mod movement;
pub mod pairs;
pub mod search;
pub mod selection;
pub mod surround;
pub mod tag;
pub mod transaction;

pub type Tendril = SmartString<LazyCompact>;
