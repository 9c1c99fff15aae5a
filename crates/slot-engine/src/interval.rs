//! Pure interval arithmetic over time slots.
//!
//! Every interval is half-open: `[start, end)`. Two slots that touch
//! (`a.end == b.start`) do not overlap and have a gap of zero minutes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::slot::TimeSlot;

/// Upper bound for any buffer, break or observance length.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// A half-open `[start, end)` window of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window starting at `start` and lasting `minutes`.
    pub fn from_minutes(start: DateTime<Utc>, minutes: i64) -> Self {
        Self::new(start, start + Duration::minutes(minutes))
    }

    pub fn overlaps(&self, other: &Window) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The shared part of two windows, if any.
    pub fn intersection(&self, other: &Window) -> Option<Window> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Window::new(
            self.start.max(other.start),
            self.end.min(other.end),
        ))
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Midpoint of the window, truncated to the second.
    pub fn midpoint(&self) -> DateTime<Utc> {
        self.start + Duration::seconds((self.end - self.start).num_seconds() / 2)
    }
}

/// Whether two slots share any instant.
pub fn overlaps(a: &TimeSlot, b: &TimeSlot) -> bool {
    a.window().overlaps(&b.window())
}

/// Minutes from the end of `a` to the start of `b`, assuming `a` comes first.
///
/// Negative when the two slots overlap.
pub fn gap_minutes(a: &TimeSlot, b: &TimeSlot) -> i64 {
    (b.start_time - a.end_time).num_minutes()
}

/// Intersection of two slots, if they overlap.
pub fn intersection(a: &TimeSlot, b: &TimeSlot) -> Option<Window> {
    a.window().intersection(&b.window())
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotType;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 16, h, m, 0).unwrap()
    }

    fn slot(id: &str, start: (u32, u32), end: (u32, u32)) -> TimeSlot {
        TimeSlot::new(id, at(start.0, start.1), at(end.0, end.1), SlotType::Booked)
    }

    #[test]
    fn test_overlapping_slots() {
        let a = slot("a", (9, 0), (10, 0));
        let b = slot("b", (9, 30), (10, 30));
        assert!(overlaps(&a, &b));
        assert!(overlaps(&b, &a));
    }

    #[test]
    fn test_touching_slots_do_not_overlap() {
        let a = slot("a", (9, 0), (10, 0));
        let b = slot("b", (10, 0), (11, 0));
        assert!(!overlaps(&a, &b));
        assert_eq!(gap_minutes(&a, &b), 0);
    }

    #[test]
    fn test_contained_slot_overlaps() {
        let outer = slot("outer", (9, 0), (12, 0));
        let inner = slot("inner", (10, 0), (10, 15));
        assert!(overlaps(&outer, &inner));
        assert_eq!(
            intersection(&outer, &inner),
            Some(Window::new(at(10, 0), at(10, 15)))
        );
    }

    #[test]
    fn test_gap_is_negative_when_overlapping() {
        let a = slot("a", (9, 0), (10, 0));
        let b = slot("b", (9, 30), (10, 30));
        assert_eq!(gap_minutes(&a, &b), -30);
    }

    #[test]
    fn test_gap_between_separated_slots() {
        let a = slot("a", (9, 0), (9, 30));
        let b = slot("b", (9, 35), (10, 0));
        assert_eq!(gap_minutes(&a, &b), 5);
    }

    #[test]
    fn test_intersection_none_when_disjoint() {
        let a = slot("a", (9, 0), (9, 30));
        let b = slot("b", (11, 0), (12, 0));
        assert_eq!(intersection(&a, &b), None);
    }

    #[test]
    fn test_window_midpoint() {
        let w = Window::new(at(7, 0), at(20, 0));
        assert_eq!(w.midpoint(), at(13, 30));
        assert_eq!(w.duration_minutes(), 13 * 60);
    }
}
