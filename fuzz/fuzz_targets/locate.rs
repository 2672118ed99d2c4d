#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;
use surround_lib::{
  pairs::PairSpec,
  search::RopeSearch,
  surround::Locator,
};

use crate::common::scenario_from_bytes;

fuzz_target!(|data: &[u8]| {
  let scenario = scenario_from_bytes(data);
  let search = RopeSearch::new(scenario.text.slice(..));
  let pair = if scenario.literal {
    PairSpec::literal(scenario.open, scenario.close)
  } else {
    PairSpec::regex(scenario.open, scenario.close)
  };

  let Ok(locator) = Locator::new(&search, &pair) else {
    return;
  };

  for range in &scenario.selection {
    if let Ok(found) = locator.locate(*range) {
      assert!(found.start.end <= found.end.begin);
      assert!(found.start.begin <= range.from());
      assert!(found.end.end <= scenario.text.len_chars());
    }
  }
});
