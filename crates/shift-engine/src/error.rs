//! Error types for shift-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::employee::EmployeeId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShiftError {
    /// Caller-correctable input problem (empty roster, missing id, bad slot).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The requested window is inverted or carries a floating instant.
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// No eligible employee exists for the slot `[start, end)`.
    #[error("Unable to find an available employee for interval {} -> {}", .start.to_rfc3339(), .end.to_rfc3339())]
    Scheduling {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Employee not found: {0}")]
    UnknownEmployee(EmployeeId),

    /// A write collided with data already held for the employee.
    #[error("Conflict for employee {employee_id}: {reason}")]
    Conflict {
        employee_id: EmployeeId,
        reason: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, ShiftError>;
