//! Time slots: the blocks that make up a provider's day.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interval::{Window, MINUTES_PER_DAY};
use crate::resolution::{ResolutionKind, ResolutionOption};

/// What a slot represents in the provider's day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    /// Open time that can be booked.
    Available,
    /// A customer appointment.
    Booked,
    Break,
    /// A religious-observance window blocked by the provider.
    Prayer,
    /// Blocked time (personal, closed, etc.).
    Unavailable,
}

impl SlotType {
    /// Whether this slot counts toward the provider's working span.
    pub fn is_working(self) -> bool {
        matches!(self, SlotType::Booked | SlotType::Available)
    }
}

pub const DEFAULT_PRIORITY: u8 = 3;
pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 5;

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

/// A contiguous block of a provider's day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub slot_type: SlotType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// 1–5, 5 is highest. Only used to break ties when choosing what to move.
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub is_flexible: bool,
    /// Minutes that must stay free before the slot starts.
    #[serde(default)]
    pub buffer_before: i64,
    /// Minutes that must stay free after the slot ends.
    #[serde(default)]
    pub buffer_after: i64,
}

impl TimeSlot {
    pub fn new(
        id: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        slot_type: SlotType,
    ) -> Self {
        Self {
            id: id.into(),
            start_time,
            end_time,
            slot_type,
            title: None,
            service_id: None,
            customer_id: None,
            priority: DEFAULT_PRIORITY,
            is_flexible: false,
            buffer_before: 0,
            buffer_after: 0,
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn flexible(mut self) -> Self {
        self.is_flexible = true;
        self
    }

    pub fn with_buffers(mut self, before: i64, after: i64) -> Self {
        self.buffer_before = before;
        self.buffer_after = after;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_service(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = Some(service_id.into());
        self
    }

    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn window(&self) -> Window {
        Window::new(self.start_time, self.end_time)
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Check the slot's own invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSlot`] if the slot ends at or before its
    /// start, its priority is outside 1–5, or either buffer is negative or
    /// longer than a day.
    pub fn validate(&self) -> Result<()> {
        if self.end_time <= self.start_time {
            return Err(EngineError::invalid_slot(
                &self.id,
                format!(
                    "end {} is not after start {}",
                    self.end_time.to_rfc3339(),
                    self.start_time.to_rfc3339()
                ),
            ));
        }
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&self.priority) {
            return Err(EngineError::invalid_slot(
                &self.id,
                format!("priority {} outside 1-5", self.priority),
            ));
        }
        if self.buffer_before < 0 || self.buffer_after < 0 {
            return Err(EngineError::invalid_slot(&self.id, "negative buffer"));
        }
        if self.buffer_before > MINUTES_PER_DAY || self.buffer_after > MINUTES_PER_DAY {
            return Err(EngineError::invalid_slot(
                &self.id,
                format!("buffer longer than {MINUTES_PER_DAY} minutes"),
            ));
        }
        Ok(())
    }

    /// Same slot, same duration, starting at `start`.
    pub(crate) fn moved_to(&self, start: DateTime<Utc>) -> Window {
        Window::new(start, start + (self.end_time - self.start_time))
    }

    /// Same slot, same duration, ending at `end`.
    pub(crate) fn moved_to_end(&self, end: DateTime<Utc>) -> Window {
        Window::new(end - (self.end_time - self.start_time), end)
    }
}

/// Apply a chosen resolution to a copy of `slots`.
///
/// The engine never mutates slots itself; this is the caller-side helper for
/// turning a [`ResolutionOption`] into a new slot collection that can be fed
/// back into analysis. Options whose target is not present leave the
/// collection unchanged.
pub fn apply_option(slots: &[TimeSlot], option: &ResolutionOption) -> Vec<TimeSlot> {
    let mut out = Vec::with_capacity(slots.len() + 2);

    for slot in slots {
        if slot.id != option.target_slot_id {
            out.push(slot.clone());
            continue;
        }

        match option.kind {
            ResolutionKind::Move | ResolutionKind::Reschedule => {
                let mut moved = slot.clone();
                if let Some(start) = option.new_start_time {
                    moved.start_time = start;
                }
                if let Some(end) = option.new_end_time {
                    moved.end_time = end;
                }
                out.push(moved);
            }
            ResolutionKind::Split => match (option.new_start_time, option.new_end_time) {
                (Some(break_start), Some(break_end)) => {
                    out.extend(split_around(slot, Window::new(break_start, break_end)));
                }
                _ => out.push(slot.clone()),
            },
            ResolutionKind::RemoveBreak => {
                if slot.slot_type != SlotType::Break {
                    out.push(slot.clone());
                }
            }
            ResolutionKind::AdjustBuffer => {
                let mut adjusted = slot.clone();
                if let Some(before) = option.new_buffer_before {
                    adjusted.buffer_before = before;
                }
                if let Some(after) = option.new_buffer_after {
                    adjusted.buffer_after = after;
                }
                out.push(adjusted);
            }
            ResolutionKind::ExtendDay => out.push(slot.clone()),
        }
    }

    out
}

/// Cut `slot` around `gap` and insert a break slot covering it.
fn split_around(slot: &TimeSlot, gap: Window) -> Vec<TimeSlot> {
    if !slot.window().overlaps(&gap) {
        let mut pieces = vec![slot.clone()];
        pieces.push(break_slot(slot, gap));
        return pieces;
    }

    let mut pieces = Vec::with_capacity(3);
    if gap.start > slot.start_time {
        let mut head = slot.clone();
        head.end_time = gap.start;
        pieces.push(head);
    }
    pieces.push(break_slot(slot, gap));
    if gap.end < slot.end_time {
        let mut tail = slot.clone();
        tail.id = format!("{}#2", slot.id);
        tail.start_time = gap.end;
        pieces.push(tail);
    }
    pieces
}

fn break_slot(origin: &TimeSlot, gap: Window) -> TimeSlot {
    TimeSlot::new(
        format!("{}-break", origin.id),
        gap.start,
        gap.end,
        SlotType::Break,
    )
    .flexible()
}

/// Shift a slot by whole minutes, keeping its duration.
pub(crate) fn shifted(slot: &TimeSlot, minutes: i64) -> Window {
    slot.moved_to(slot.start_time + Duration::minutes(minutes))
}

// ── Tests ───────────────────────────────────────────────────────────────────
