//! End-to-end scenarios over the public API.

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use slot_engine::{
    apply_option, ConflictEngine, ConflictKind, ConflictRecord, DetectionOptions, OptionsPatch,
    ResolutionKind, Severity, SlotType, TimeSlot, Window,
};

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, h, m, 0).unwrap()
}

fn slot(id: &str, start: (u32, u32), end: (u32, u32), kind: SlotType) -> TimeSlot {
    TimeSlot::new(id, at(start.0, start.1), at(end.0, end.1), kind)
}

fn booked(id: &str, start: (u32, u32), end: (u32, u32)) -> TimeSlot {
    slot(id, start, end, SlotType::Booked)
}

fn engine() -> ConflictEngine {
    ConflictEngine::new(DetectionOptions::default())
}

fn of_kind(conflicts: &[ConflictRecord], kind: ConflictKind) -> Vec<&ConflictRecord> {
    conflicts.iter().filter(|c| c.kind == kind).collect()
}

fn summary(conflicts: &[ConflictRecord]) -> Vec<(ConflictKind, Vec<String>)> {
    conflicts
        .iter()
        .map(|c| {
            (
                c.kind,
                c.participant_ids().into_iter().map(String::from).collect(),
            )
        })
        .collect()
}

// ── Idempotence ─────────────────────────────────────────────────────────────

#[test]
fn test_analysis_is_idempotent() {
    let engine = engine();
    let slots = vec![
        booked("a", (9, 0), (10, 0)),
        booked("b", (9, 30), (10, 30)),
        booked("c", (10, 33), (11, 0)),
        slot("brk", (12, 20), (12, 50), SlotType::Break).flexible(),
        booked("late", (19, 0), (21, 0)),
    ];
    let first = engine.analyze_conflicts(&slots).unwrap();
    let second = engine.analyze_conflicts(&slots).unwrap();
    assert_eq!(summary(&first), summary(&second));
    assert_eq!(first, second);
}

// ── Double booking dedup ────────────────────────────────────────────────────

#[test]
fn test_two_bookings_one_overlap_one_double_booking() {
    let slots = vec![booked("A", (9, 0), (10, 0)), booked("B", (9, 30), (10, 30))];
    let conflicts = engine().analyze_conflicts(&slots).unwrap();

    let overlaps = of_kind(&conflicts, ConflictKind::Overlap);
    assert_eq!(overlaps.len(), 1);
    assert_eq!(overlaps[0].severity, Severity::Critical);

    let doubles = of_kind(&conflicts, ConflictKind::DoubleBooking);
    assert_eq!(doubles.len(), 1);
    assert_eq!(doubles[0].participant_ids(), vec!["A", "B"]);
    assert!(!doubles[0].auto_resolvable);

    assert_eq!(conflicts.len(), 2);
}

// ── Buffer boundary ─────────────────────────────────────────────────────────

#[test]
fn test_buffer_boundary() {
    let engine = engine();

    let exact = vec![booked("A", (9, 0), (9, 30)), booked("B", (9, 35), (10, 0))];
    assert!(engine.analyze_conflicts(&exact).unwrap().is_empty());

    let short = vec![booked("A", (9, 0), (9, 30)), booked("B", (9, 34), (10, 0))];
    let conflicts = engine.analyze_conflicts(&short).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::BufferViolation);
    assert_eq!(conflicts[0].affected_time, Window::new(at(9, 30), at(9, 34)));
}

// ── Observance ──────────────────────────────────────────────────────────────

#[test]
fn test_observance_conflict_window() {
    let mut engine = engine();
    engine.update_observance_times([("dhuhr", NaiveTime::from_hms_opt(12, 30, 0).unwrap())]);

    let slots = vec![booked("A", (12, 20), (12, 40))];
    let conflicts = engine.analyze_conflicts(&slots).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::ObservanceConflict);
    assert_eq!(conflicts[0].severity, Severity::High);
    assert_eq!(conflicts[0].affected_time, Window::new(at(12, 30), at(12, 45)));
}

#[test]
fn test_observance_in_provider_timezone() {
    let engine = ConflictEngine::new(DetectionOptions {
        timezone: "Asia/Riyadh".to_string(),
        ..Default::default()
    });
    // 12:20-12:40 local
    let slots = vec![booked("A", (9, 20), (9, 40))];
    let conflicts = engine.analyze_conflicts(&slots).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].affected_time, Window::new(at(9, 30), at(9, 45)));
}

#[test]
fn test_friday_congregation_window() {
    let mut engine = engine();
    assert!(engine.observances_mut().set_friday_duration("dhuhr", Some(60)).unwrap());

    let friday = |h, m| Utc.with_ymd_and_hms(2026, 3, 20, h, m, 0).unwrap();
    let on_friday = vec![TimeSlot::new("A", friday(13, 0), friday(13, 30), SlotType::Booked)];
    assert_eq!(engine.analyze_conflicts(&on_friday).unwrap().len(), 1);

    let on_monday = vec![booked("A", (13, 0), (13, 30))];
    assert!(engine.analyze_conflicts(&on_monday).unwrap().is_empty());
}

// ── Auto-resolution ─────────────────────────────────────────────────────────

#[test]
fn test_flexible_break_is_auto_resolved() {
    let engine = engine();
    let slots = vec![
        booked("appt", (10, 0), (11, 0)),
        slot("brk", (10, 30), (10, 45), SlotType::Break).flexible(),
    ];
    let conflicts = engine.analyze_conflicts(&slots).unwrap();
    assert_eq!(conflicts.len(), 1);
    assert!(conflicts[0].auto_resolvable);
    assert_eq!(conflicts[0].severity, Severity::Medium);

    let outcome = engine.auto_resolve_conflicts(conflicts);
    assert_eq!(outcome.resolved.len(), 1);
    assert!(outcome.unresolved.is_empty());

    let (_, chosen) = outcome.chosen().next().unwrap();
    assert_eq!(chosen.kind, ResolutionKind::Move);
    assert_eq!(chosen.target_slot_id, "brk");
    assert_eq!(chosen.cost, 3);
}

#[test]
fn test_fixed_slots_need_attention() {
    let engine = engine();
    let slots = vec![booked("A", (9, 0), (10, 0)), booked("B", (9, 30), (10, 30))];
    let conflicts = engine.analyze_conflicts(&slots).unwrap();
    let outcome = engine.auto_resolve_conflicts(conflicts);
    assert!(outcome.resolved.is_empty());
    assert_eq!(outcome.unresolved.len(), 2);
}

// ── Excessive hours ─────────────────────────────────────────────────────────

#[test]
fn test_thirteen_hour_day() {
    let engine = engine();
    for flexible in [false, true] {
        let mut day = booked("day", (7, 0), (20, 0));
        day.is_flexible = flexible;
        let conflicts = engine.analyze_conflicts(&[day]).unwrap();

        let excessive = of_kind(&conflicts, ConflictKind::ExcessiveHours);
        assert_eq!(excessive.len(), 1);
        assert!(!excessive[0].auto_resolvable);
        assert_eq!(excessive[0].suggestions[0].kind, ResolutionKind::Split);
    }
}

#[test]
fn test_longer_limit_clears_excessive_hours() {
    let engine = engine().with_options(&OptionsPatch {
        max_working_hours: Some(14.0),
        respect_prayer_times: Some(false),
        ..Default::default()
    });
    let conflicts = engine.analyze_conflicts(&[booked("day", (7, 0), (20, 0))]).unwrap();
    assert!(conflicts.is_empty());
}

// ── Round trips ─────────────────────────────────────────────────────────────

fn round_trip(engine: &ConflictEngine, slots: &[TimeSlot], kind: ConflictKind, pick: usize) {
    let conflicts = engine.analyze_conflicts(slots).unwrap();
    let conflict = of_kind(&conflicts, kind)[0];
    let option = &conflict.suggestions[pick];
    assert!(option.feasible);

    let fixed = apply_option(slots, option);
    let after = engine.analyze_conflicts(&fixed).unwrap();
    assert!(
        after.is_empty(),
        "{kind} via option {pick} left {:?}",
        summary(&after)
    );
}

#[test]
fn test_round_trip_overlap() {
    let slots = vec![
        booked("appt", (10, 0), (11, 0)),
        slot("brk", (10, 30), (10, 45), SlotType::Break).flexible(),
    ];
    round_trip(&engine(), &slots, ConflictKind::Overlap, 0);
    round_trip(&engine(), &slots, ConflictKind::Overlap, 1);
}

#[test]
fn test_round_trip_overlapping_bookings() {
    let slots = vec![booked("A", (9, 0), (10, 0)), booked("B", (9, 30), (10, 30))];
    round_trip(&engine(), &slots, ConflictKind::Overlap, 0);
    round_trip(&engine(), &slots, ConflictKind::Overlap, 1);
    round_trip(&engine(), &slots, ConflictKind::DoubleBooking, 0);
}

#[test]
fn test_round_trip_buffer() {
    let slots = vec![booked("A", (9, 0), (9, 30)), booked("B", (9, 34), (10, 0))];
    round_trip(&engine(), &slots, ConflictKind::BufferViolation, 0);
}

#[test]
fn test_round_trip_observance() {
    let slots = vec![booked("A", (12, 20), (12, 40))];
    round_trip(&engine(), &slots, ConflictKind::ObservanceConflict, 0);
    round_trip(&engine(), &slots, ConflictKind::ObservanceConflict, 1);
}

#[test]
fn test_round_trip_auto_resolved_choice() {
    let engine = engine();
    let slots = vec![
        booked("appt", (10, 0), (11, 0)),
        slot("brk", (10, 30), (10, 45), SlotType::Break).flexible(),
    ];
    let outcome = engine.auto_resolve_conflicts(engine.analyze_conflicts(&slots).unwrap());
    let mut fixed = slots.clone();
    for (_, option) in outcome.chosen() {
        fixed = apply_option(&fixed, option);
    }
    assert!(engine.analyze_conflicts(&fixed).unwrap().is_empty());
}

// ── Input contract ──────────────────────────────────────────────────────────

#[test]
fn test_degenerate_slot_rejected() {
    let slots = vec![booked("A", (10, 0), (10, 0))];
    let err = engine().analyze_conflicts(&slots).unwrap_err();
    assert!(err.to_string().contains("Invalid slot 'A'"), "got: {err}");
}

#[test]
fn test_negative_buffer_rejected() {
    let slots = vec![booked("A", (9, 0), (10, 0)).with_buffers(0, -5)];
    assert!(engine().analyze_conflicts(&slots).is_err());
}

#[test]
fn test_oversized_buffer_rejected_not_panicking() {
    let slots = vec![
        booked("a", (9, 0), (9, 30)).with_buffers(0, 1_000_000_000_000),
        booked("b", (9, 40), (10, 0)),
    ];
    let err = engine().analyze_conflicts(&slots).unwrap_err();
    assert!(err.to_string().contains("Invalid slot 'a'"), "got: {err}");
}

#[test]
fn test_day_long_buffer_still_analyzed() {
    let slots = vec![
        booked("a", (9, 0), (9, 30)).with_buffers(0, 1440),
        booked("b", (9, 40), (10, 0)),
    ];
    let conflicts = engine().analyze_conflicts(&slots).unwrap();
    let buffer = of_kind(&conflicts, ConflictKind::BufferViolation)[0];
    assert_eq!(
        buffer.suggestions[0].new_start_time,
        Some(at(9, 30) + chrono::Duration::minutes(1440))
    );
}
