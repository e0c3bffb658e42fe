//! # timegrid-core
//!
//! Interval algebra and recurrence-aware conflict detection for arranging
//! teacher/student class sessions.
//!
//! The engine answers three questions: what time regions are busy or open for
//! a resource once one-off and recurring commitments are combined; whether a
//! proposed session collides with an existing commitment or falls outside an
//! open-availability window; and how sets of time regions combine under
//! union, intersection, and subtraction while staying in a minimal canonical
//! form.
//!
//! All inputs are assumed to be resolved onto a single UTC reference
//! timeline; the engine performs civil-time arithmetic only and never touches
//! a timezone database.
//!
//! ## Modules
//!
//! - [`interval`] — half-open time spans with an explicit empty value
//! - [`interval_set`] — normalized interval collections with set algebra
//! - [`recurrence`] — weekly recurrence rules: parse, serialize, expand
//! - [`commitment`] — raw commitment ingestion and resolution
//! - [`availability`] — busy/open/free region computation
//! - [`conflict`] — candidate-slot conflict detection and reporting
//! - [`error`] — error types

pub mod availability;
pub mod commitment;
pub mod conflict;
pub mod error;
pub mod interval;
pub mod interval_set;
pub mod recurrence;

pub use availability::{available_set, busy_set, free_slots, open_set};
pub use commitment::{resolve_commitments, Commitment, CommitmentKind, RawCommitment, RawEntry};
pub use conflict::{
    check_batch, check_slot, overlaps_candidate, within_open_window, BatchEntry, CandidateSlot,
    ConflictKind, ConflictRecord, ConflictReport, ResourcePlan, RoomAssignment,
};
pub use error::TimegridError;
pub use interval::Interval;
pub use interval_set::IntervalSet;
pub use recurrence::{
    expand_or_empty, parse_recurrence, QueryWindow, RecurrenceSpec, MAX_OCCURRENCES,
};
