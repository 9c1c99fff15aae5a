//! Ranked, costed remediation options per conflict kind.
//!
//! All kinds go through [`suggest`], which dispatches on the conflict kind.
//! Options are generated in a fixed order per kind; consumers that take the
//! first feasible option rely on that order, while
//! [`ConflictRecord::preferred_option`] ranks by cost.
//!
//! | Kind | Options, in order |
//! |---|---|
//! | overlap / break | move lower-priority slot after, move it before, remove it (flexible breaks) |
//! | buffer | push the later service back, shrink the binding buffer |
//! | observance | end before the window, start after the window |
//! | double booking | reschedule each peer after the triggering slot |
//! | excessive hours | split the day near the midpoint |

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::conflict::{buffer_applies, required_gap, ConflictKind, ConflictRecord};
use crate::interval::{gap_minutes, Window};
use crate::observance::local_midnight;
use crate::options::DetectionOptions;
use crate::slot::{shifted, SlotType, TimeSlot};

/// What a remediation does to its target slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    Move,
    Reschedule,
    Split,
    ExtendDay,
    RemoveBreak,
    AdjustBuffer,
}

/// One way to make a conflict go away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOption {
    pub kind: ResolutionKind,
    pub target_slot_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_buffer_before: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_buffer_after: Option<i64>,
    /// 1–10, lower is less disruptive.
    pub cost: u8,
    pub feasible: bool,
    pub requires_approval: bool,
}

impl ResolutionOption {
    fn new(kind: ResolutionKind, target: &TimeSlot, cost: u8) -> Self {
        Self {
            kind,
            target_slot_id: target.id.clone(),
            new_start_time: None,
            new_end_time: None,
            new_buffer_before: None,
            new_buffer_after: None,
            cost,
            feasible: true,
            requires_approval: true,
        }
    }

    fn placed_at(mut self, window: Window) -> Self {
        self.new_start_time = Some(window.start);
        self.new_end_time = Some(window.end);
        self
    }

    fn feasible_if(mut self, feasible: bool) -> Self {
        self.feasible = feasible;
        self
    }

    fn approval(mut self, required: bool) -> Self {
        self.requires_approval = required;
        self
    }
}

/// Cost of an option, depending on whether the moved slot is flexible.
#[derive(Debug, Clone, Copy)]
struct Cost {
    flexible: u8,
    fixed: u8,
}

impl Cost {
    const fn new(flexible: u8, fixed: u8) -> Self {
        Self { flexible, fixed }
    }

    const fn flat(cost: u8) -> Self {
        Self::new(cost, cost)
    }

    fn for_slot(self, slot: &TimeSlot) -> u8 {
        if slot.is_flexible {
            self.flexible
        } else {
            self.fixed
        }
    }
}

const OVERLAP_MOVE_AFTER: Cost = Cost::new(3, 7);
const OVERLAP_MOVE_BEFORE: Cost = Cost::new(4, 8);
const OVERLAP_REMOVE_BREAK: Cost = Cost::flat(5);
const BUFFER_PUSH_BACK: Cost = Cost::new(2, 6);
const BUFFER_SHRINK: Cost = Cost::flat(4);
const OBSERVANCE_END_BEFORE: Cost = Cost::new(3, 7);
const OBSERVANCE_START_AFTER: Cost = Cost::new(2, 6);
const DOUBLE_BOOKING_RESCHEDULE: Cost = Cost::flat(8);
const EXCESSIVE_SPLIT: Cost = Cost::flat(5);

/// Clearance kept around an observance window when moving a slot out of it.
const OBSERVANCE_MARGIN_MINUTES: i64 = 5;
/// Gap left after the triggering slot when rescheduling a double booking.
const RESCHEDULE_GAP_MINUTES: i64 = 15;
/// Length of the break inserted when splitting an over-long day.
pub const SPLIT_BREAK_MINUTES: i64 = 30;

/// Generate the options for one conflict.
pub fn suggest(conflict: &ConflictRecord, options: &DetectionOptions, tz: &Tz) -> Vec<ResolutionOption> {
    match conflict.kind {
        ConflictKind::Overlap | ConflictKind::BreakConflict => overlap_options(conflict, options, tz),
        ConflictKind::BufferViolation => buffer_options(conflict, options),
        ConflictKind::ObservanceConflict => observance_options(conflict, tz),
        ConflictKind::DoubleBooking => double_booking_options(conflict),
        ConflictKind::ExcessiveHours => split_options(conflict),
    }
}

/// `(higher, lower)` priority of a pair given in start order.
///
/// On equal priority the later slot is the lower one.
pub fn rank_pair<'a>(first: &'a TimeSlot, second: &'a TimeSlot) -> (&'a TimeSlot, &'a TimeSlot) {
    if first.priority < second.priority {
        (second, first)
    } else {
        (first, second)
    }
}

fn overlap_options(conflict: &ConflictRecord, options: &DetectionOptions, tz: &Tz) -> Vec<ResolutionOption> {
    let [first, second] = conflict.conflicting_slots.as_slice() else {
        return Vec::new();
    };
    let (higher, lower) = rank_pair(first, second);
    let guarded = buffer_applies(higher, lower, options);

    let gap_after = if guarded {
        required_gap(higher, lower, options)
    } else {
        lower.buffer_before
    };
    let after = lower.moved_to(higher.end_time + Duration::minutes(gap_after));

    let gap_before = if guarded {
        required_gap(lower, higher, options)
    } else {
        higher.buffer_before
    };
    let before = lower.moved_to_end(higher.start_time - Duration::minutes(gap_before));
    let midnight = local_midnight(lower.start_time, tz);

    let mut out = vec![
        ResolutionOption::new(ResolutionKind::Move, lower, OVERLAP_MOVE_AFTER.for_slot(lower))
            .placed_at(after)
            .approval(!lower.is_flexible),
        ResolutionOption::new(ResolutionKind::Move, lower, OVERLAP_MOVE_BEFORE.for_slot(lower))
            .placed_at(before)
            .feasible_if(before.start >= midnight)
            .approval(!lower.is_flexible),
    ];

    if lower.slot_type == SlotType::Break && lower.is_flexible && options.allow_flexible_breaks {
        out.push(ResolutionOption::new(
            ResolutionKind::RemoveBreak,
            lower,
            OVERLAP_REMOVE_BREAK.for_slot(lower),
        ));
    }
    out
}

fn buffer_options(conflict: &ConflictRecord, options: &DetectionOptions) -> Vec<ResolutionOption> {
    let [earlier, later] = conflict.conflicting_slots.as_slice() else {
        return Vec::new();
    };
    let actual = gap_minutes(earlier, later);
    let required = required_gap(earlier, later, options);

    let mut out = vec![ResolutionOption::new(
        ResolutionKind::Move,
        later,
        BUFFER_PUSH_BACK.for_slot(later),
    )
    .placed_at(shifted(later, required - actual))
    .approval(!later.is_flexible)];

    if options.allow_flexible_breaks {
        // Shrink whichever per-slot buffer sets the requirement.
        let shrink = if later.buffer_before >= earlier.buffer_after {
            let mut o = ResolutionOption::new(ResolutionKind::AdjustBuffer, later, BUFFER_SHRINK.for_slot(later));
            o.new_buffer_before = Some(actual);
            o
        } else {
            let mut o =
                ResolutionOption::new(ResolutionKind::AdjustBuffer, earlier, BUFFER_SHRINK.for_slot(earlier));
            o.new_buffer_after = Some(actual);
            o
        };
        out.push(shrink.feasible_if(actual >= options.min_break_between_services));
    }
    out
}

fn observance_options(conflict: &ConflictRecord, tz: &Tz) -> Vec<ResolutionOption> {
    let Some(slot) = conflict.conflicting_slots.first() else {
        return Vec::new();
    };
    let window = conflict.affected_time;
    let margin = Duration::minutes(OBSERVANCE_MARGIN_MINUTES);

    let before = slot.moved_to_end(window.start - margin);
    let after = slot.moved_to(window.end + margin);
    let midnight = local_midnight(slot.start_time, tz);

    vec![
        ResolutionOption::new(ResolutionKind::Move, slot, OBSERVANCE_END_BEFORE.for_slot(slot))
            .placed_at(before)
            .feasible_if(before.start >= midnight)
            .approval(!slot.is_flexible),
        ResolutionOption::new(ResolutionKind::Move, slot, OBSERVANCE_START_AFTER.for_slot(slot))
            .placed_at(after)
            .approval(!slot.is_flexible),
    ]
}

fn double_booking_options(conflict: &ConflictRecord) -> Vec<ResolutionOption> {
    let Some((trigger, peers)) = conflict.conflicting_slots.split_first() else {
        return Vec::new();
    };
    let start = trigger.end_time + Duration::minutes(RESCHEDULE_GAP_MINUTES);

    peers
        .iter()
        .map(|peer| {
            ResolutionOption::new(
                ResolutionKind::Reschedule,
                peer,
                DOUBLE_BOOKING_RESCHEDULE.for_slot(peer),
            )
            .placed_at(peer.moved_to(start))
        })
        .collect()
}

fn split_options(conflict: &ConflictRecord) -> Vec<ResolutionOption> {
    let midpoint = conflict.affected_time.midpoint();
    let Some(target) = conflict
        .conflicting_slots
        .iter()
        .min_by_key(|s| (s.start_time - midpoint).num_seconds().abs())
    else {
        return Vec::new();
    };

    vec![
        ResolutionOption::new(ResolutionKind::Split, target, EXCESSIVE_SPLIT.for_slot(target))
            .placed_at(Window::from_minutes(midpoint, SPLIT_BREAK_MINUTES)),
    ]
}

// ── Tests ───────────────────────────────────────────────────────────────────
