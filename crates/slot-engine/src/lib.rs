//! # slot-engine
//!
//! Deterministic scheduling conflict detection and resolution for a service
//! provider's day.
//!
//! Given the day's time slots (appointments, breaks, observance windows,
//! blocked time), the engine finds every pairwise and aggregate conflict,
//! ranks its severity, proposes costed remediation options, and separates
//! the conflicts that can be fixed without a human from those that cannot.
//! Nothing is persisted and no I/O is performed: slots in, records out.
//!
//! ## Modules
//!
//! - [`slot`] — Time slots and the caller-side [`apply_option`] helper
//! - [`options`] — Detection options and partial updates
//! - [`observance`] — Observance provider trait and the default daily table
//! - [`interval`] — Overlap, gap, and intersection arithmetic
//! - [`conflict`] — Conflict records and the detectors
//! - [`resolution`] — Costed remediation options per conflict kind
//! - [`dedup`] — Collapse conflicts describing the same problem
//! - [`policy`] — Auto-resolution partitioning
//! - [`engine`] — The facade tying it together
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use slot_engine::{ConflictEngine, ConflictKind, DetectionOptions, SlotType, TimeSlot};
//!
//! let at = |h, m| Utc.with_ymd_and_hms(2026, 3, 16, h, m, 0).unwrap();
//! let slots = vec![
//!     TimeSlot::new("a", at(9, 0), at(10, 0), SlotType::Booked),
//!     TimeSlot::new("b", at(9, 30), at(10, 30), SlotType::Booked),
//! ];
//!
//! let engine = ConflictEngine::new(DetectionOptions::default());
//! let conflicts = engine.analyze_conflicts(&slots).unwrap();
//! assert_eq!(conflicts[0].kind, ConflictKind::Overlap);
//! assert_eq!(conflicts[1].kind, ConflictKind::DoubleBooking);
//!
//! let outcome = engine.auto_resolve_conflicts(conflicts);
//! assert!(outcome.resolved.is_empty()); // neither booking is flexible
//! ```

pub mod conflict;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod interval;
pub mod observance;
pub mod options;
pub mod policy;
pub mod resolution;
pub mod slot;

pub use conflict::{ConflictKind, ConflictRecord, Severity};
pub use dedup::deduplicate;
pub use engine::{analyze_conflicts, ConflictEngine};
pub use error::EngineError;
pub use interval::{gap_minutes, overlaps, Window};
pub use observance::{
    parse_clock_time, ObservanceEntry, ObservanceProvider, ObservanceTable, ObservanceWindow,
};
pub use options::{DetectionOptions, OptionsPatch};
pub use policy::{auto_resolve_conflicts, AutoResolution};
pub use resolution::{ResolutionKind, ResolutionOption};
pub use slot::{apply_option, SlotType, TimeSlot};
