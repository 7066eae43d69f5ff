//! `shift` CLI — manage a JSON roster and generate balanced schedules.
//!
//! ## Usage
//!
//! ```sh
//! # Add employees (ids are assigned automatically)
//! shift add-employee --name AdaLovelace --email ada@example.com --max-hours 20
//!
//! # Record time off, read as New York wall-clock time
//! shift add-unavailability --employee-id 1 --start "2025-08-27 09:00" --end "2025-08-27 12:00"
//!
//! # Generate a schedule for a window and print it as JSON
//! shift generate --start 2025-08-27T13:00:00Z --end 2025-08-27T21:00:00Z
//!
//! # Generate from local times and store the result in the roster
//! shift generate --start "2025-08-28 09:00" --end "2025-08-28 17:00" -z America/New_York --commit
//! ```
//!
//! The roster file defaults to `roster.json` and can be set with `--roster` or
//! `SHIFT_ROSTER`. Log output goes to stderr and is controlled by `RUST_LOG`.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use shift_engine::{
    assign, localize, parse_instant, Employee, Roster, TimeInterval, WindowBound,
    DEFAULT_MAX_HOURS,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_TIME_ZONE: &str = "America/New_York";

#[derive(Parser)]
#[command(
    name = "shift",
    version,
    about = "Shift roster and schedule generation CLI"
)]
struct Cli {
    /// Roster file (created on first write)
    #[arg(long, global = true, env = "SHIFT_ROSTER", default_value = "roster.json")]
    roster: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an employee to the roster
    AddEmployee {
        /// Full name
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(short, long)]
        role: Option<String>,
        /// Weekly hour ceiling
        #[arg(short, long, default_value_t = DEFAULT_MAX_HOURS)]
        max_hours: u32,
    },
    /// List every employee in the roster
    ListEmployees,
    /// Record a period an employee cannot work
    AddUnavailability {
        #[arg(long)]
        employee_id: i64,
        /// Start, e.g. "2025-08-27 09:00" (local) or an RFC 3339 instant
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Zone used to read local times
        #[arg(short = 'z', long, default_value = DEFAULT_TIME_ZONE)]
        time_zone: String,
        /// Time off, sick, ...
        #[arg(short, long)]
        note: Option<String>,
        /// Accept overlaps with the employee's existing unavailabilities
        #[arg(short = 'o', long)]
        allow_overlap: bool,
    },
    /// List an employee's unavailabilities in local time
    ListUnavailabilities {
        #[arg(long)]
        employee_id: i64,
        #[arg(short = 'z', long, default_value = DEFAULT_TIME_ZONE)]
        time_zone: String,
        /// Only show entries overlapping this range (requires --end)
        #[arg(long, requires = "end")]
        start: Option<String>,
        #[arg(long, requires = "start")]
        end: Option<String>,
    },
    /// Generate a schedule covering a window
    Generate {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Slot length in minutes
        #[arg(long, default_value_t = 60, allow_negative_numbers = true)]
        slot_minutes: i64,
        /// Zone used to read local times (without it, times must carry an offset)
        #[arg(short = 'z', long)]
        time_zone: Option<String>,
        /// Restrict scheduling to these employees (repeatable)
        #[arg(long = "employee-id")]
        employee_ids: Vec<i64>,
        /// Store the generated entries in the roster
        #[arg(long)]
        commit: bool,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!(roster = %cli.roster.display(), "loading roster");

    match cli.command {
        Commands::AddEmployee {
            name,
            email,
            role,
            max_hours,
        } => {
            let mut roster = load_roster(&cli.roster)?;
            let employee = roster
                .add_employee(name, email, role, max_hours)
                .context("Failed to add employee")?;
            println!(
                "Created employee {}, ID: {}, email: {}, role: {}",
                employee.name,
                display_id(employee),
                employee.email,
                employee.role.as_deref().unwrap_or("None")
            );
            save_roster(&roster, &cli.roster)?;
        }
        Commands::ListEmployees => {
            let roster = load_roster(&cli.roster)?;
            for e in roster.employees() {
                println!(
                    "{}\t{}\t{}\trole: {}\tmax hours: {}{}",
                    display_id(e),
                    e.name,
                    e.email,
                    e.role.as_deref().unwrap_or("None"),
                    e.max_hours,
                    if e.active { "" } else { "\tinactive" }
                );
            }
        }
        Commands::AddUnavailability {
            employee_id,
            start,
            end,
            time_zone,
            note,
            allow_overlap,
        } => {
            let mut roster = load_roster(&cli.roster)?;
            let name = roster
                .employee(employee_id)
                .map(|e| e.name.clone())
                .with_context(|| format!("Employee not found at employee ID: {}", employee_id))?;

            let interval = TimeInterval::new(
                resolve(&start, Some(&time_zone))?,
                resolve(&end, Some(&time_zone))?,
            )?;
            let created = roster.add_unavailability(employee_id, interval, note, !allow_overlap)?;
            save_roster(&roster, &cli.roster)?;

            println!(
                "Created unavailability [{} -> {} tz: {}] (id: {}) for employee {} (id: {})",
                start,
                end,
                time_zone,
                created.id.unwrap_or_default(),
                name,
                employee_id
            );
        }
        Commands::ListUnavailabilities {
            employee_id,
            time_zone,
            start,
            end,
        } => {
            let roster = load_roster(&cli.roster)?;
            let tz: chrono_tz::Tz = time_zone
                .parse()
                .map_err(|_| shift_engine::ShiftError::InvalidTimezone(time_zone.clone()))?;

            let mut found = roster.unavailabilities_for(employee_id)?;
            if let (Some(start), Some(end)) = (start, end) {
                let range = TimeInterval::new(
                    resolve(&start, Some(&time_zone))?,
                    resolve(&end, Some(&time_zone))?,
                )?;
                found.retain(|u| u.interval.overlaps(&range));
            }

            if found.is_empty() {
                println!("No unavailabilities found");
                return Ok(());
            }
            for u in found {
                println!(
                    "{}\t{} -> {}\tnote: {}",
                    u.id.unwrap_or_default(),
                    local(u.interval.start(), &tz),
                    local(u.interval.end(), &tz),
                    u.note.as_deref().unwrap_or("None")
                );
            }
        }
        Commands::Generate {
            start,
            end,
            slot_minutes,
            time_zone,
            employee_ids,
            commit,
            output,
        } => {
            let mut roster = load_roster(&cli.roster)?;
            let employees = select_employees(&roster, &employee_ids)?;

            let window_start = bound(&start, time_zone.as_deref())?;
            let window_end = bound(&end, time_zone.as_deref())?;
            let slot = TimeDelta::try_minutes(slot_minutes).context("slot length out of range")?;
            let entries = assign(
                window_start,
                window_end,
                &employees,
                slot,
            )
            .context("Failed to generate schedule")?;

            if commit {
                roster
                    .commit(&entries)
                    .context("Failed to store generated schedule")?;
                save_roster(&roster, &cli.roster)?;
            }

            let json = serde_json::to_string_pretty(&entries)?;
            write_output(output.as_deref(), &format!("{}\n", json))?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the `warn` default.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_roster(path: &Path) -> Result<Roster> {
    Roster::load(path).with_context(|| format!("Failed to read roster: {}", path.display()))
}

fn save_roster(roster: &Roster, path: &Path) -> Result<()> {
    roster
        .save(path)
        .with_context(|| format!("Failed to write roster: {}", path.display()))
}

fn display_id(employee: &Employee) -> String {
    employee
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Parse a bound, reading floating times in `time_zone` when one is given.
///
/// Without a zone a floating bound is passed through as-is and the engine
/// rejects it.
fn bound(input: &str, time_zone: Option<&str>) -> Result<WindowBound> {
    let parsed = parse_instant(input)?;
    match time_zone {
        Some(tz) => Ok(localize(parsed, tz)?.into()),
        None => Ok(parsed),
    }
}

fn resolve(input: &str, time_zone: Option<&str>) -> Result<DateTime<Utc>> {
    Ok(bound(input, time_zone)?.to_utc()?)
}

/// The roster's employees, narrowed to `ids` when any are given.
///
/// Repeated ids select the employee once, at their first position.
fn select_employees(roster: &Roster, ids: &[i64]) -> Result<Vec<Employee>> {
    if ids.is_empty() {
        return Ok(roster.employees().to_vec());
    }
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(**id))
        .map(|&id| {
            roster
                .employee(id)
                .cloned()
                .with_context(|| format!("Employee not found at employee ID: {}", id))
        })
        .collect()
}

fn local(instant: DateTime<Utc>, tz: &chrono_tz::Tz) -> String {
    instant.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string()
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
