//! In-memory roster store with conflict-checked writes.
//!
//! Holds employees together with their unavailabilities and schedules, hands
//! out ids on insert, and re-validates every write against what is already
//! stored. The whole roster (de)serializes as JSON so callers can keep it in a
//! file between runs.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::employee::{
    Employee, EmployeeId, ExistingSchedule, GeneratedScheduleEntry, Unavailability,
};
use crate::error::{Result, ShiftError};
use crate::interval::TimeInterval;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    employees: Vec<Employee>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a roster from a JSON file. A missing file is an empty roster.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "roster file missing, starting empty");
            return Ok(Self::new());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ShiftError::Storage(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| ShiftError::Storage(format!("{}: {}", path.display(), e)))
    }

    /// Write the roster to `path` as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ShiftError::Storage(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| ShiftError::Storage(format!("{}: {}", path.display(), e)))
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn employee(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == Some(id))
    }

    fn employee_mut(&mut self, id: EmployeeId) -> Result<&mut Employee> {
        self.employees
            .iter_mut()
            .find(|e| e.id == Some(id))
            .ok_or(ShiftError::UnknownEmployee(id))
    }

    /// Look up an employee by exact email.
    pub fn employee_by_email(&self, email: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.email == email)
    }

    /// Store a new active employee and return it with its assigned id.
    ///
    /// Emails are unique across the roster. Reusing one held by another
    /// employee is a [`ShiftError::Conflict`] naming the current holder.
    pub fn add_employee(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Option<String>,
        max_hours: u32,
    ) -> Result<&Employee> {
        let email = email.into();
        if let Some(holder) = self.employee_by_email(&email) {
            return Err(ShiftError::Conflict {
                employee_id: holder.id.unwrap_or_default(),
                reason: format!("email {} is already in use", email),
            });
        }

        let id = self.employees.iter().filter_map(|e| e.id).max().unwrap_or(0) + 1;
        let mut employee = Employee::new(id, name, max_hours).with_email(email);
        if let Some(role) = role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            employee = employee.with_role(role);
        }
        info!(employee_id = id, name = %employee.name, "added employee");
        self.employees.push(employee);
        Ok(&self.employees[self.employees.len() - 1])
    }

    /// Record a period the employee cannot work.
    ///
    /// With `check_overlap`, an overlap with one of the employee's existing
    /// unavailabilities is a [`ShiftError::Conflict`].
    pub fn add_unavailability(
        &mut self,
        employee_id: EmployeeId,
        interval: TimeInterval,
        note: Option<String>,
        check_overlap: bool,
    ) -> Result<Unavailability> {
        let id = self.next_unavailability_id();
        let employee = self.employee_mut(employee_id)?;

        if check_overlap
            && employee
                .unavailabilities
                .iter()
                .any(|u| u.interval.overlaps(&interval))
        {
            return Err(ShiftError::Conflict {
                employee_id,
                reason: "interval overlaps with existing unavailability".to_string(),
            });
        }

        let unavailability = Unavailability {
            id: Some(id),
            interval,
            note,
        };
        employee.unavailabilities.push(unavailability.clone());
        info!(employee_id, unavailability_id = id, "added unavailability");
        Ok(unavailability)
    }

    /// Delete an unavailability by id. Returns whether anything was removed.
    pub fn remove_unavailability(&mut self, id: i64) -> bool {
        for employee in &mut self.employees {
            let before = employee.unavailabilities.len();
            employee.unavailabilities.retain(|u| u.id != Some(id));
            if employee.unavailabilities.len() != before {
                return true;
            }
        }
        false
    }

    /// The employee's unavailabilities, sorted by start.
    pub fn unavailabilities_for(&self, employee_id: EmployeeId) -> Result<Vec<&Unavailability>> {
        let employee = self
            .employee(employee_id)
            .ok_or(ShiftError::UnknownEmployee(employee_id))?;
        let mut found: Vec<&Unavailability> = employee.unavailabilities.iter().collect();
        found.sort_by_key(|u| u.interval.start());
        Ok(found)
    }

    /// Unavailabilities of every employee that overlap `range`, sorted by start.
    pub fn unavailabilities_between(
        &self,
        range: &TimeInterval,
    ) -> Vec<(EmployeeId, &Unavailability)> {
        let mut found: Vec<(EmployeeId, &Unavailability)> = self
            .employees
            .iter()
            .filter_map(|e| e.id.map(|id| (id, e)))
            .flat_map(|(id, e)| e.unavailabilities.iter().map(move |u| (id, u)))
            .filter(|(_, u)| u.interval.overlaps(range))
            .collect();
        found.sort_by_key(|(id, u)| (u.interval.start(), *id));
        found
    }

    /// The employee's schedules, sorted by start.
    pub fn schedules_for(&self, employee_id: EmployeeId) -> Result<Vec<&ExistingSchedule>> {
        let employee = self
            .employee(employee_id)
            .ok_or(ShiftError::UnknownEmployee(employee_id))?;
        let mut found: Vec<&ExistingSchedule> = employee.schedules.iter().collect();
        found.sort_by_key(|s| s.interval.start());
        Ok(found)
    }

    /// Store a schedule for the employee.
    ///
    /// With `check_conflict`, an overlap with the employee's schedules or
    /// unavailabilities is a [`ShiftError::Conflict`].
    pub fn add_schedule(
        &mut self,
        employee_id: EmployeeId,
        interval: TimeInterval,
        check_conflict: bool,
    ) -> Result<ExistingSchedule> {
        let employee = self
            .employee(employee_id)
            .ok_or(ShiftError::UnknownEmployee(employee_id))?;
        if check_conflict {
            check_schedule_conflict(employee, employee_id, &interval)?;
        }
        self.insert_schedule(employee_id, interval)
    }

    /// Persist generated entries as schedules, all or nothing.
    ///
    /// Every entry is checked against stored data and against the other
    /// entries of the batch before anything is written.
    pub fn commit(
        &mut self,
        entries: &[GeneratedScheduleEntry],
    ) -> Result<Vec<ExistingSchedule>> {
        for (idx, entry) in entries.iter().enumerate() {
            let employee = self
                .employee(entry.employee_id)
                .ok_or(ShiftError::UnknownEmployee(entry.employee_id))?;
            check_schedule_conflict(employee, entry.employee_id, &entry.interval)?;

            let clashes_in_batch = entries[..idx].iter().any(|other| {
                other.employee_id == entry.employee_id
                    && other.interval.overlaps(&entry.interval)
            });
            if clashes_in_batch {
                return Err(ShiftError::Conflict {
                    employee_id: entry.employee_id,
                    reason: "batch contains overlapping entries".to_string(),
                });
            }
        }

        let stored = entries
            .iter()
            .map(|entry| self.insert_schedule(entry.employee_id, entry.interval))
            .collect::<Result<Vec<_>>>()?;
        info!(count = stored.len(), "committed generated schedule");
        Ok(stored)
    }

    fn insert_schedule(
        &mut self,
        employee_id: EmployeeId,
        interval: TimeInterval,
    ) -> Result<ExistingSchedule> {
        let id = self.next_schedule_id();
        let schedule = ExistingSchedule {
            id: Some(id),
            interval,
        };
        self.employee_mut(employee_id)?
            .schedules
            .push(schedule.clone());
        debug!(employee_id, schedule_id = id, "stored schedule");
        Ok(schedule)
    }

    fn next_unavailability_id(&self) -> i64 {
        self.employees
            .iter()
            .flat_map(|e| e.unavailabilities.iter().filter_map(|u| u.id))
            .max()
            .unwrap_or(0)
            + 1
    }

    fn next_schedule_id(&self) -> i64 {
        self.employees
            .iter()
            .flat_map(|e| e.schedules.iter().filter_map(|s| s.id))
            .max()
            .unwrap_or(0)
            + 1
    }
}

fn check_schedule_conflict(
    employee: &Employee,
    employee_id: EmployeeId,
    interval: &TimeInterval,
) -> Result<()> {
    if employee.busy_intervals().iter().any(|busy| busy.overlaps(interval)) {
        return Err(ShiftError::Conflict {
            employee_id,
            reason: format!(
                "{} -> {} conflicts with existing schedule or unavailability",
                interval.start().to_rfc3339(),
                interval.end().to_rfc3339()
            ),
        });
    }
    Ok(())
}
