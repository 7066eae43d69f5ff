//! # shift-engine
//!
//! Deterministic assignment of employees to time slots.
//!
//! Given a window, a slot length and a roster of employees (each with
//! unavailabilities, existing schedules and a weekly hour ceiling), [`assign`]
//! produces a gapless, conflict-free, load-balanced set of schedule entries.
//! The engine is a pure function: no I/O, no state between calls.
//!
//! ## Modules
//!
//! - [`assign`] — the slot assignment engine
//! - [`interval`] — half-open UTC intervals and the adjacency merge
//! - [`employee`] — roster data model and generated entries
//! - [`instant`] — window bounds, parsing, and local-time conversion
//! - [`roster`] — in-memory store with conflict-checked writes
//! - [`error`] — Error types

pub mod assign;
pub mod employee;
pub mod error;
pub mod instant;
pub mod interval;
pub mod roster;

pub use assign::{assign, DEFAULT_SLOT};
pub use employee::{
    Employee, EmployeeId, ExistingSchedule, GeneratedScheduleEntry, Unavailability,
    DEFAULT_MAX_HOURS,
};
pub use error::ShiftError;
pub use instant::{localize, parse_instant, WindowBound};
pub use interval::{merge_adjacent, TimeInterval};
pub use roster::Roster;
