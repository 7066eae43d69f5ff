//! Roster data model: employees, their unavailabilities and existing schedules,
//! and the entries produced by [`crate::assign`].

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::interval::TimeInterval;

/// Stable employee identity, assigned by the roster store.
pub type EmployeeId = i64;

/// Weekly ceiling given to employees created without an explicit value.
pub const DEFAULT_MAX_HOURS: u32 = 20;

/// A schedulable employee together with everything that makes them busy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// `None` until the employee has been stored. Scheduling requires an id.
    #[serde(default)]
    pub id: Option<EmployeeId>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    /// Weekly capacity ceiling in hours.
    #[serde(default = "default_max_hours")]
    pub max_hours: u32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub unavailabilities: Vec<Unavailability>,
    /// Prior commitments. They occupy busy time and consume capacity.
    #[serde(default)]
    pub schedules: Vec<ExistingSchedule>,
}

fn default_max_hours() -> u32 {
    DEFAULT_MAX_HOURS
}

fn default_active() -> bool {
    true
}

impl Employee {
    pub fn new(id: EmployeeId, name: impl Into<String>, max_hours: u32) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            email: String::new(),
            role: None,
            max_hours,
            active: true,
            unavailabilities: Vec::new(),
            schedules: Vec::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn with_unavailability(mut self, interval: TimeInterval) -> Self {
        self.unavailabilities.push(Unavailability {
            id: None,
            interval,
            note: None,
        });
        self
    }

    pub fn with_schedule(mut self, interval: TimeInterval) -> Self {
        self.schedules.push(ExistingSchedule { id: None, interval });
        self
    }

    /// Union of unavailabilities and existing schedules, sorted by start.
    ///
    /// Used only for conflict testing; overlapping entries are kept as-is.
    pub fn busy_intervals(&self) -> Vec<TimeInterval> {
        let mut busy: Vec<TimeInterval> = self
            .unavailabilities
            .iter()
            .map(|u| u.interval)
            .chain(self.schedules.iter().map(|s| s.interval))
            .collect();
        busy.sort_by_key(|iv| (iv.start(), iv.end()));
        busy
    }

    /// Total time already committed through existing schedules.
    pub fn existing_load(&self) -> TimeDelta {
        self.schedules
            .iter()
            .fold(TimeDelta::zero(), |acc, s| acc + s.interval.duration())
    }

    /// `max_hours` as a duration.
    pub fn weekly_capacity(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(self.max_hours))
    }
}

/// A period during which an employee cannot work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unavailability {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub interval: TimeInterval,
    /// Free text (time off, sick, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A schedule entry that already exists for an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingSchedule {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub interval: TimeInterval,
}

/// One merged run of slots assigned to an employee. Not yet persisted, so it
/// carries no identity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedScheduleEntry {
    pub employee_id: EmployeeId,
    #[serde(flatten)]
    pub interval: TimeInterval,
}
