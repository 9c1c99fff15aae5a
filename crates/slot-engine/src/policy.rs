//! Split conflicts into those that can be fixed without a human and the rest.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::ConflictRecord;
use crate::resolution::ResolutionOption;

/// Outcome of [`auto_resolve_conflicts`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoResolution {
    /// Conflicts with a feasible, approval-free option. Applying it is up to the caller.
    pub resolved: Vec<ConflictRecord>,
    /// Everything else.
    pub unresolved: Vec<ConflictRecord>,
}

impl AutoResolution {
    /// Each resolved conflict with the option it was resolved by.
    pub fn chosen(&self) -> impl Iterator<Item = (&ConflictRecord, &ResolutionOption)> {
        self.resolved
            .iter()
            .filter_map(|c| c.preferred_option().map(|o| (c, o)))
    }
}

/// Whether a conflict can be resolved without a human.
pub fn is_auto_resolvable(conflict: &ConflictRecord) -> bool {
    conflict.auto_resolvable && conflict.preferred_option().is_some()
}

/// Partition conflicts, preserving their relative order in each half.
///
/// The policy only classifies; it never touches the slots. The implied choice
/// for a resolved conflict is its [`ConflictRecord::preferred_option`].
pub fn auto_resolve_conflicts<I>(conflicts: I) -> AutoResolution
where
    I: IntoIterator<Item = ConflictRecord>,
{
    let (resolved, unresolved): (Vec<_>, Vec<_>) =
        conflicts.into_iter().partition(is_auto_resolvable);
    debug!(
        resolved = resolved.len(),
        unresolved = unresolved.len(),
        "auto-resolution"
    );
    AutoResolution {
        resolved,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::{ConflictKind, Severity};
    use crate::interval::Window;
    use crate::resolution::ResolutionKind;
    use crate::slot::{SlotType, TimeSlot};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 16, h, m, 0).unwrap()
    }

    fn option(cost: u8, feasible: bool, requires_approval: bool) -> ResolutionOption {
        ResolutionOption {
            kind: ResolutionKind::Move,
            target_slot_id: "b".to_string(),
            new_start_time: Some(at(11, 0)),
            new_end_time: Some(at(11, 30)),
            new_buffer_before: None,
            new_buffer_after: None,
            cost,
            feasible,
            requires_approval,
        }
    }

    fn conflict(flexible: bool, suggestions: Vec<ResolutionOption>) -> ConflictRecord {
        let mut b = TimeSlot::new("b", at(9, 30), at(10, 0), SlotType::Break);
        b.is_flexible = flexible;
        let a = TimeSlot::new("a", at(9, 0), at(10, 0), SlotType::Booked);
        let mut record = ConflictRecord::new(
            ConflictKind::Overlap,
            Severity::Medium,
            vec![a, b],
            Window::new(at(9, 30), at(10, 0)),
        );
        record.suggestions = suggestions;
        record
    }

    #[test]
    fn test_resolved_needs_feasible_approval_free_option() {
        let out = auto_resolve_conflicts(vec![
            conflict(true, vec![option(3, true, false)]),
            conflict(true, vec![option(3, false, false)]),
            conflict(true, vec![option(3, true, true)]),
            conflict(true, Vec::new()),
        ]);
        assert_eq!(out.resolved.len(), 1);
        assert_eq!(out.unresolved.len(), 3);
    }

    #[test]
    fn test_not_auto_resolvable_stays_unresolved() {
        let out = auto_resolve_conflicts(vec![conflict(false, vec![option(1, true, false)])]);
        assert!(out.resolved.is_empty());
        assert_eq!(out.unresolved.len(), 1);
    }

    #[test]
    fn test_chosen_is_cheapest_qualifying() {
        let out = auto_resolve_conflicts(vec![conflict(
            true,
            vec![
                option(1, true, true),
                option(4, true, false),
                option(2, true, false),
                option(2, true, false),
            ],
        )]);
        let chosen: Vec<_> = out.chosen().collect();
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].1.cost, 2);
    }

    #[test]
    fn test_empty_input() {
        let out = auto_resolve_conflicts(Vec::new());
        assert_eq!(out, AutoResolution::default());
    }
}
