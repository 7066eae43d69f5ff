//! Greedy, load-balanced assignment of employees to consecutive slots.
//!
//! The window `[start, end)` is cut into fixed-size slots (the last one may be
//! shorter). Slots are resolved strictly in time order: each goes to the
//! eligible employee with the least total load, where load is existing
//! commitments plus what this call has already handed out. Ties fall back to
//! newly assigned time, then to input order, so the result is fully
//! deterministic. Finally each employee's slots are merged into continuous runs.
//!
//! The selection never backtracks. A choice that exhausts the only employee
//! able to cover a later slot fails the whole call even when another global
//! assignment would have worked.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use crate::employee::{Employee, EmployeeId, GeneratedScheduleEntry};
use crate::error::{Result, ShiftError};
use crate::instant::WindowBound;
use crate::interval::{merge_adjacent, TimeInterval};

/// Slot length used when the caller has no preference.
pub const DEFAULT_SLOT: TimeDelta = TimeDelta::hours(1);

/// Per-employee working state for one [`assign`] call.
struct Ledger<'a> {
    employee: &'a Employee,
    id: EmployeeId,
    busy: Vec<TimeInterval>,
    existing: TimeDelta,
    capacity: TimeDelta,
    assigned: TimeDelta,
    slots: Vec<TimeInterval>,
}

impl<'a> Ledger<'a> {
    fn open(employee: &'a Employee, id: EmployeeId) -> Self {
        let existing = employee.existing_load();
        let capacity = (employee.weekly_capacity() - existing).max(TimeDelta::zero());
        Self {
            employee,
            id,
            busy: employee.busy_intervals(),
            existing,
            capacity,
            assigned: TimeDelta::zero(),
            slots: Vec::new(),
        }
    }

    fn load(&self) -> TimeDelta {
        self.existing + self.assigned
    }

    fn remaining(&self) -> TimeDelta {
        self.capacity - self.assigned
    }

    fn record(&mut self, slot: TimeInterval) {
        self.assigned += slot.duration();
        self.slots.push(slot);
    }
}

/// Whether the employee behind `ledger` can take `slot`.
///
/// Active, enough remaining capacity for the whole slot, and no overlap with
/// either a busy interval or a slot already assigned in this call.
fn is_eligible(ledger: &Ledger<'_>, slot: &TimeInterval) -> bool {
    ledger.employee.active
        && ledger.remaining() >= slot.duration()
        && !ledger.busy.iter().any(|busy| busy.overlaps(slot))
        && !ledger.slots.iter().any(|taken| taken.overlaps(slot))
}

/// Assign employees to every slot of `[window_start, window_end)`.
///
/// Returns merged entries sorted by start. Together they tile the window with
/// no gaps and no overlaps. A `slot` longer than the window is clamped to the
/// window length.
///
/// # Errors
/// - `ShiftError::InvalidInput` if `employees` is empty, an employee has no id,
///   two employees share an id, or `slot` is not strictly positive.
/// - `ShiftError::InvalidWindow` if a bound is floating or `window_end` is not
///   after `window_start`.
/// - `ShiftError::Scheduling` with the slot bounds when some slot has no
///   eligible employee. No partial result is returned.
pub fn assign(
    window_start: impl Into<WindowBound>,
    window_end: impl Into<WindowBound>,
    employees: &[Employee],
    slot: TimeDelta,
) -> Result<Vec<GeneratedScheduleEntry>> {
    if employees.is_empty() {
        return Err(ShiftError::InvalidInput(
            "at least one employee is required to generate a schedule".to_string(),
        ));
    }

    let window_start = window_start.into().to_utc()?;
    let window_end = window_end.into().to_utc()?;

    let ids = employees
        .iter()
        .map(|emp| {
            emp.id.ok_or_else(|| {
                ShiftError::InvalidInput(format!(
                    "employee '{}' must have an id before scheduling",
                    emp.name
                ))
            })
        })
        .collect::<Result<Vec<EmployeeId>>>()?;

    let mut seen = HashSet::with_capacity(ids.len());
    if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(ShiftError::InvalidInput(format!(
            "employee id {} appears more than once",
            dup
        )));
    }

    if window_end <= window_start {
        return Err(ShiftError::InvalidWindow(format!(
            "end {} must be after start {}",
            window_end.to_rfc3339(),
            window_start.to_rfc3339()
        )));
    }

    if slot <= TimeDelta::zero() {
        return Err(ShiftError::InvalidInput(
            "slot duration must be positive".to_string(),
        ));
    }

    let slot = slot.min(window_end - window_start);

    let mut ledgers: Vec<Ledger<'_>> = employees
        .iter()
        .zip(ids)
        .map(|(emp, id)| Ledger::open(emp, id))
        .collect();

    let mut cursor = window_start;
    while cursor < window_end {
        let slot_end = next_boundary(cursor, slot, window_end);
        let candidate = TimeInterval::new(cursor, slot_end)?;

        let chosen = ledgers
            .iter()
            .enumerate()
            .filter(|(_, ledger)| is_eligible(ledger, &candidate))
            .min_by_key(|(idx, ledger)| (ledger.load(), ledger.assigned, *idx))
            .map(|(idx, _)| idx)
            .ok_or(ShiftError::Scheduling {
                start: cursor,
                end: slot_end,
            })?;

        let ledger = &mut ledgers[chosen];
        ledger.record(candidate);
        debug!(
            employee_id = ledger.id,
            start = %candidate.start(),
            end = %candidate.end(),
            "assigned slot"
        );

        cursor = slot_end;
    }

    let mut entries: Vec<GeneratedScheduleEntry> = ledgers
        .iter()
        .filter(|ledger| !ledger.slots.is_empty())
        .flat_map(|ledger| {
            merge_adjacent(&ledger.slots)
                .into_iter()
                .map(move |interval| GeneratedScheduleEntry {
                    employee_id: ledger.id,
                    interval,
                })
        })
        .collect();
    entries.sort_by_key(|entry| entry.interval.start());

    info!(
        window_start = %window_start,
        window_end = %window_end,
        employees = employees.len(),
        entries = entries.len(),
        "generated schedule"
    );

    Ok(entries)
}

/// `min(cursor + slot, window_end)`, saturating at `window_end` on overflow.
fn next_boundary(
    cursor: DateTime<Utc>,
    slot: TimeDelta,
    window_end: DateTime<Utc>,
) -> DateTime<Utc> {
    cursor
        .checked_add_signed(slot)
        .map_or(window_end, |t| t.min(window_end))
}
