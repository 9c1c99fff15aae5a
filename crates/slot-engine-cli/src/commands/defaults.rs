//! Defaults command implementation.

use anyhow::Result;
use serde::Serialize;
use slot_engine::{DetectionOptions, ObservanceTable};

use super::to_json;

#[derive(Serialize)]
struct Defaults {
    options: DetectionOptions,
    observances: ObservanceTable,
}

/// Prints the default options and observance table.
pub fn run(compact: bool) -> Result<()> {
    let defaults = Defaults {
        options: DetectionOptions::default(),
        observances: ObservanceTable::default(),
    };
    println!("{}", to_json(&defaults, compact)?);
    Ok(())
}
