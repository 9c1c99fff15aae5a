//! Conflict records and the detectors that produce them.
//!
//! Every detector takes slots already sorted ascending by start time and
//! returns records without suggestions; the engine attaches suggestions
//! afterwards (see [`crate::resolution`]).
//!
//! # Detectors
//!
//! - [`detect_overlaps`] — every overlapping pair, severity by slot types
//! - [`detect_buffer_violations`] — consecutive services closer than the required gap
//! - [`detect_observance_conflicts`] — slots crossing an observance window
//! - [`detect_double_bookings`] — one record per booked slot with booked peers
//! - [`detect_excessive_span`] — working day longer than `max_working_hours`

use std::fmt;

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::interval::{gap_minutes, intersection, overlaps, Window};
use crate::observance::ObservanceProvider;
use crate::options::DetectionOptions;
use crate::resolution::ResolutionOption;
use crate::slot::{SlotType, TimeSlot};

/// The kind of scheduling problem a conflict describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Overlap,
    BufferViolation,
    ObservanceConflict,
    /// Reserved for break-placement rules; resolved like an overlap.
    BreakConflict,
    DoubleBooking,
    /// The working day spans more than the configured maximum.
    ExcessiveHours,
}

impl ConflictKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictKind::Overlap => "overlap",
            ConflictKind::BufferViolation => "buffer_violation",
            ConflictKind::ObservanceConflict => "observance_conflict",
            ConflictKind::BreakConflict => "break_conflict",
            ConflictKind::DoubleBooking => "double_booking",
            ConflictKind::ExcessiveHours => "excessive_hours",
        }
    }

    /// Kinds that always need a human, whatever the slots' flexibility.
    pub fn never_auto_resolvable(self) -> bool {
        matches!(self, ConflictKind::DoubleBooking | ConflictKind::ExcessiveHours)
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// One detected conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Derived from kind, observance name and sorted participant ids.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub severity: Severity,
    pub conflicting_slots: Vec<TimeSlot>,
    pub affected_time: Window,
    /// Name of the observance involved, for observance conflicts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observance: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<ResolutionOption>,
    pub auto_resolvable: bool,
}

impl ConflictRecord {
    pub fn new(
        kind: ConflictKind,
        severity: Severity,
        conflicting_slots: Vec<TimeSlot>,
        affected_time: Window,
    ) -> Self {
        let auto_resolvable =
            !kind.never_auto_resolvable() && conflicting_slots.iter().any(|s| s.is_flexible);
        let mut record = Self {
            id: String::new(),
            kind,
            severity,
            conflicting_slots,
            affected_time,
            observance: None,
            suggestions: Vec::new(),
            auto_resolvable,
        };
        record.id = record.dedup_key();
        record
    }

    pub fn with_observance(mut self, name: impl Into<String>) -> Self {
        self.observance = Some(name.into());
        self.id = self.dedup_key();
        self
    }

    /// Participant ids, sorted.
    pub fn participant_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .conflicting_slots
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Key identifying the underlying problem: kind, observance (if any),
    /// and the sorted participant ids.
    pub fn dedup_key(&self) -> String {
        let ids = self.participant_ids().join("+");
        match &self.observance {
            Some(name) => format!("{}:{}:{}", self.kind, name, ids),
            None => format!("{}:{}", self.kind, ids),
        }
    }

    /// The cheapest suggestion that is feasible and needs no approval.
    ///
    /// Ties go to the suggestion generated first.
    pub fn preferred_option(&self) -> Option<&ResolutionOption> {
        self.suggestions
            .iter()
            .filter(|o| o.feasible && !o.requires_approval)
            .min_by_key(|o| o.cost)
    }
}

// ── Overlap ─────────────────────────────────────────────────────────────────

/// Severity of an overlap between two slots, by their types.
pub fn overlap_severity(a: &TimeSlot, b: &TimeSlot) -> Severity {
    use SlotType::*;
    match (a.slot_type, b.slot_type) {
        (Booked, Booked) => Severity::Critical,
        (Booked, Prayer) | (Prayer, Booked) => Severity::High,
        (Booked, _) | (_, Booked) => Severity::Medium,
        _ => Severity::Low,
    }
}

/// One record per overlapping pair, earlier slot first.
pub fn detect_overlaps(sorted: &[TimeSlot]) -> Vec<ConflictRecord> {
    let mut out = Vec::new();
    for (i, a) in sorted.iter().enumerate() {
        for b in &sorted[i + 1..] {
            // Sorted by start: nothing further can reach back into `a`.
            if b.start_time >= a.end_time {
                break;
            }
            if let Some(shared) = intersection(a, b) {
                out.push(ConflictRecord::new(
                    ConflictKind::Overlap,
                    overlap_severity(a, b),
                    vec![a.clone(), b.clone()],
                    shared,
                ));
            }
        }
    }
    debug!(count = out.len(), "overlap detection");
    out
}

// ── Buffer violation ────────────────────────────────────────────────────────

/// Minutes that must separate `before` from `after`.
pub fn required_gap(before: &TimeSlot, after: &TimeSlot, options: &DetectionOptions) -> i64 {
    before
        .buffer_after
        .max(after.buffer_before)
        .max(options.min_break_between_services)
}

/// Whether buffer rules govern the spacing of these two slots.
pub(crate) fn buffer_applies(a: &TimeSlot, b: &TimeSlot, options: &DetectionOptions) -> bool {
    options.include_buffer_time
        && a.slot_type == SlotType::Booked
        && b.slot_type == SlotType::Booked
}

/// Consecutive booked services closer together than their required gap.
///
/// Each service is compared with the earlier service that ends last.
/// Services that overlap are left to [`detect_overlaps`].
pub fn detect_buffer_violations(
    sorted: &[TimeSlot],
    options: &DetectionOptions,
) -> Vec<ConflictRecord> {
    if !options.include_buffer_time {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut latest: Option<&TimeSlot> = None;

    for slot in sorted.iter().filter(|s| s.slot_type == SlotType::Booked) {
        if let Some(prev) = latest {
            if !overlaps(prev, slot) {
                let gap = gap_minutes(prev, slot);
                let required = required_gap(prev, slot, options);
                if gap < required {
                    out.push(ConflictRecord::new(
                        ConflictKind::BufferViolation,
                        Severity::Medium,
                        vec![prev.clone(), slot.clone()],
                        Window::new(prev.end_time, slot.start_time),
                    ));
                }
            }
        }
        if latest.is_none_or(|prev| slot.end_time > prev.end_time) {
            latest = Some(slot);
        }
    }

    debug!(count = out.len(), "buffer detection");
    out
}

// ── Observance ──────────────────────────────────────────────────────────────

/// Local dates whose observance windows can reach the slot, in order.
///
/// Starts one day early: a window opening late on the previous day may run
/// past midnight into the slot.
fn local_dates(slot: &TimeSlot, tz: &Tz) -> Vec<NaiveDate> {
    let start_date = slot.start_time.with_timezone(tz).date_naive();
    let first = start_date.pred_opt().unwrap_or(start_date);
    // End is exclusive: a slot ending exactly at midnight stays on one day.
    let last = (slot.end_time - Duration::seconds(1))
        .with_timezone(tz)
        .date_naive();
    first.iter_days().take_while(|d| *d <= last).collect()
}

/// One record per (slot, observance window) overlap. Prayer slots are exempt.
pub fn detect_observance_conflicts<P: ObservanceProvider + ?Sized>(
    sorted: &[TimeSlot],
    options: &DetectionOptions,
    provider: &P,
    tz: &Tz,
) -> Vec<ConflictRecord> {
    if !options.respect_prayer_times {
        return Vec::new();
    }

    let mut out = Vec::new();
    for slot in sorted.iter().filter(|s| s.slot_type != SlotType::Prayer) {
        for date in local_dates(slot, tz) {
            for observance in provider.windows_on(date) {
                let Some(window) = observance.locate(date, tz) else {
                    warn!(
                        observance = %observance.name,
                        %date,
                        "observance window cannot be placed in local time, skipped"
                    );
                    continue;
                };
                if slot.window().overlaps(&window) {
                    out.push(
                        ConflictRecord::new(
                            ConflictKind::ObservanceConflict,
                            Severity::High,
                            vec![slot.clone()],
                            window,
                        )
                        .with_observance(observance.name),
                    );
                }
            }
        }
    }

    debug!(count = out.len(), "observance detection");
    out
}

// ── Double booking ──────────────────────────────────────────────────────────

/// For each booked slot with overlapping booked peers, one record listing the
/// slot first and its peers after it in start order.
pub fn detect_double_bookings(sorted: &[TimeSlot]) -> Vec<ConflictRecord> {
    let booked: Vec<&TimeSlot> = sorted
        .iter()
        .filter(|s| s.slot_type == SlotType::Booked)
        .collect();

    let mut out = Vec::new();
    for (i, slot) in booked.iter().enumerate() {
        let peers: Vec<&TimeSlot> = booked
            .iter()
            .enumerate()
            .filter(|(j, peer)| *j != i && overlaps(slot, peer))
            .map(|(_, peer)| *peer)
            .collect();
        if peers.is_empty() {
            continue;
        }

        let shared: Vec<Window> = peers
            .iter()
            .filter_map(|peer| intersection(slot, peer))
            .collect();
        let affected = Window::new(
            shared.iter().map(|w| w.start).min().unwrap_or(slot.start_time),
            shared.iter().map(|w| w.end).max().unwrap_or(slot.end_time),
        );

        let mut participants = Vec::with_capacity(peers.len() + 1);
        participants.push((*slot).clone());
        participants.extend(peers.into_iter().cloned());

        out.push(ConflictRecord::new(
            ConflictKind::DoubleBooking,
            Severity::Critical,
            participants,
            affected,
        ));
    }

    debug!(count = out.len(), "double-booking detection");
    out
}

// ── Excessive span ──────────────────────────────────────────────────────────

/// At most one record: the span from the first working slot's start to the
/// last working slot's end is longer than `max_working_hours`.
pub fn detect_excessive_span(
    sorted: &[TimeSlot],
    options: &DetectionOptions,
) -> Option<ConflictRecord> {
    let working: Vec<&TimeSlot> = sorted.iter().filter(|s| s.slot_type.is_working()).collect();
    let (first, last) = (working.first()?, working.last()?);

    let span = Window::new(first.start_time, last.end_time);
    if !options.exceeds_working_hours(span.end - span.start) {
        return None;
    }

    debug!(
        minutes = span.duration_minutes(),
        max_hours = options.max_working_hours,
        "working span exceeded"
    );
    Some(ConflictRecord::new(
        ConflictKind::ExcessiveHours,
        Severity::Medium,
        working.into_iter().cloned().collect(),
        span,
    ))
}

// ── Tests ───────────────────────────────────────────────────────────────────
