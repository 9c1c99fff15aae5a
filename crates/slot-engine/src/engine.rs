//! The public facade: analysis over a full slot collection.
//!
//! [`analyze_conflicts`] is a pure function of its inputs. [`ConflictEngine`]
//! bundles options and an observance provider for callers that prefer an
//! object; it offers both in-place updates (`update_*`) and copy-on-write
//! variants (`with_*`) so a host can swap configuration between calls
//! without sharing mutable state with an analysis in flight.

use std::collections::HashSet;

use chrono::NaiveTime;
use tracing::info;

use crate::conflict::{
    detect_buffer_violations, detect_double_bookings, detect_excessive_span,
    detect_observance_conflicts, detect_overlaps, ConflictRecord,
};
use crate::dedup::deduplicate;
use crate::error::{EngineError, Result};
use crate::observance::{ObservanceProvider, ObservanceTable};
use crate::options::{DetectionOptions, OptionsPatch};
use crate::policy::{auto_resolve_conflicts, AutoResolution};
use crate::resolution::suggest;
use crate::slot::TimeSlot;

/// Detect, explain, and deduplicate every conflict in `slots`.
///
/// `slots` need not be sorted and is never modified. Output order follows
/// detection order: overlaps, buffer violations, observance conflicts,
/// double bookings, then the excessive-hours check.
///
/// # Errors
///
/// Returns [`EngineError::InvalidOptions`] or [`EngineError::InvalidTimezone`]
/// for bad options, and [`EngineError::InvalidSlot`] for the first slot that
/// ends at or before its start, has a negative buffer, an out-of-range
/// priority, or reuses another slot's id.
pub fn analyze_conflicts<P: ObservanceProvider + ?Sized>(
    slots: &[TimeSlot],
    options: &DetectionOptions,
    provider: &P,
) -> Result<Vec<ConflictRecord>> {
    let tz = options.validate()?;
    validate_slots(slots)?;

    if slots.is_empty() {
        return Ok(Vec::new());
    }

    let mut sorted = slots.to_vec();
    sorted.sort_by_key(|s| s.start_time);

    let mut conflicts = detect_overlaps(&sorted);
    conflicts.extend(detect_buffer_violations(&sorted, options));
    conflicts.extend(detect_observance_conflicts(&sorted, options, provider, &tz));
    conflicts.extend(detect_double_bookings(&sorted));
    conflicts.extend(detect_excessive_span(&sorted, options));

    let detected = conflicts.len();
    let mut conflicts = deduplicate(conflicts);
    for conflict in &mut conflicts {
        conflict.suggestions = suggest(conflict, options, &tz);
    }

    info!(
        slots = slots.len(),
        detected,
        conflicts = conflicts.len(),
        "conflict analysis complete"
    );
    Ok(conflicts)
}

fn validate_slots(slots: &[TimeSlot]) -> Result<()> {
    let mut ids = HashSet::with_capacity(slots.len());
    for slot in slots {
        slot.validate()?;
        if !ids.insert(slot.id.as_str()) {
            return Err(EngineError::invalid_slot(&slot.id, "duplicate id"));
        }
    }
    Ok(())
}

/// Options plus an observance provider, ready to analyze slot collections.
#[derive(Debug, Clone)]
pub struct ConflictEngine<P = ObservanceTable> {
    options: DetectionOptions,
    observances: P,
}

impl Default for ConflictEngine {
    fn default() -> Self {
        Self::new(DetectionOptions::default())
    }
}

impl ConflictEngine {
    /// Engine with the default five-entry observance table.
    pub fn new(options: DetectionOptions) -> Self {
        Self::with_provider(options, ObservanceTable::default())
    }

    /// Merge clock times into the observance table.
    ///
    /// Entries not named in `entries` are kept.
    pub fn update_observance_times<I, K>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, NaiveTime)>,
        K: Into<String>,
    {
        self.observances.update_times(entries);
    }

    /// Copy of this engine with clock times merged into its table.
    pub fn with_observance_times<I, K>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, NaiveTime)>,
        K: Into<String>,
    {
        let mut next = self.clone();
        next.update_observance_times(entries);
        next
    }

    pub fn observances_mut(&mut self) -> &mut ObservanceTable {
        &mut self.observances
    }
}

impl<P: ObservanceProvider> ConflictEngine<P> {
    /// Engine backed by a custom observance provider.
    pub fn with_provider(options: DetectionOptions, observances: P) -> Self {
        Self {
            options,
            observances,
        }
    }

    pub fn options(&self) -> &DetectionOptions {
        &self.options
    }

    pub fn observances(&self) -> &P {
        &self.observances
    }

    /// Merge `patch` into the held options.
    pub fn update_options(&mut self, patch: &OptionsPatch) {
        self.options.merge(patch);
    }

    /// Copy of this engine with `patch` merged into its options.
    pub fn with_options(&self, patch: &OptionsPatch) -> Self
    where
        P: Clone,
    {
        Self {
            options: self.options.merged(patch),
            observances: self.observances.clone(),
        }
    }

    /// See [`analyze_conflicts`].
    pub fn analyze_conflicts(&self, slots: &[TimeSlot]) -> Result<Vec<ConflictRecord>> {
        analyze_conflicts(slots, &self.options, &self.observances)
    }

    /// See [`auto_resolve_conflicts`].
    pub fn auto_resolve_conflicts<I>(&self, conflicts: I) -> AutoResolution
    where
        I: IntoIterator<Item = ConflictRecord>,
    {
        auto_resolve_conflicts(conflicts)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
