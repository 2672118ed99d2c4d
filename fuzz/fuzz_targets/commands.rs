#![no_main]

mod common;

use libfuzzer_sys::fuzz_target;
use surround_lib::{
  command::SurroundCommand,
  config::SurroundConfig,
};

use crate::common::scenario_from_bytes;

fuzz_target!(|data: &[u8]| {
  let scenario = scenario_from_bytes(data);
  let config = SurroundConfig::default();

  let commands = [
    SurroundCommand::Add {
      token: scenario.target.clone(),
    },
    SurroundCommand::Change {
      target:      scenario.target.clone(),
      replacement: scenario.replacement.clone(),
    },
    SurroundCommand::Delete {
      target: scenario.target,
    },
  ];

  for command in commands {
    let mut text = scenario.text.clone();
    let Ok(report) = command.run(&mut text, &scenario.selection, &config) else {
      // Failed commands never touch the buffer.
      assert_eq!(text, scenario.text);
      continue;
    };
    assert!(report.applied + report.failures.len() <= scenario.selection.len());
    if report.applied == 0 && !matches!(command, SurroundCommand::Add { .. }) {
      assert_eq!(text, scenario.text);
    }
  }
});
