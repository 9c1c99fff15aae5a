//! Analyze command implementation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use slot_engine::{parse_clock_time, ConflictEngine, DetectionOptions, OptionsPatch, TimeSlot};
use tracing::{debug, info};

use super::to_json;

pub struct AnalyzeArgs {
    pub slots: PathBuf,
    pub options: Option<PathBuf>,
    pub observances: Option<PathBuf>,
    pub timezone: Option<String>,
    pub auto_resolve: bool,
    pub compact: bool,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {what} file: {}", path.display()))
}

/// Runs the analyze command.
pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let slots: Vec<TimeSlot> = read_json(&args.slots, "slots")?;
    info!("Loaded {} slots from {}", slots.len(), args.slots.display());

    let mut patch = match &args.options {
        Some(path) => read_json::<OptionsPatch>(path, "options")?,
        None => OptionsPatch::default(),
    };
    if let Some(tz) = &args.timezone {
        patch.timezone = Some(tz.clone());
    }

    let mut engine = ConflictEngine::new(DetectionOptions::default());
    engine.update_options(&patch);

    if let Some(path) = &args.observances {
        let raw: BTreeMap<String, String> = read_json(path, "observances")?;
        let mut times = Vec::with_capacity(raw.len());
        for (name, clock) in raw {
            let time = parse_clock_time(&clock)
                .with_context(|| format!("Bad time for observance '{name}'"))?;
            times.push((name, time));
        }
        debug!(count = times.len(), "observance times merged");
        engine.update_observance_times(times);
    }

    let conflicts = engine
        .analyze_conflicts(&slots)
        .context("Conflict analysis failed")?;

    let out = if args.auto_resolve {
        to_json(&engine.auto_resolve_conflicts(conflicts), args.compact)?
    } else {
        to_json(&conflicts, args.compact)?
    };
    println!("{out}");
    Ok(())
}
