//! Caller-supplied instants and their normalization to UTC.
//!
//! Window bounds arrive either qualified (they carry a UTC offset) or floating
//! (wall-clock only). The engine accepts only qualified bounds; [`localize`]
//! turns a floating bound into an instant by reading it in an IANA timezone.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::error::{Result, ShiftError};

/// A window bound as supplied by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowBound {
    /// An absolute instant with a known offset.
    Qualified(DateTime<FixedOffset>),
    /// A wall-clock reading with no offset. Not an instant until localized.
    Floating(NaiveDateTime),
}

impl WindowBound {
    /// Normalize to UTC. Floating bounds are rejected with
    /// [`ShiftError::InvalidWindow`].
    pub fn to_utc(&self) -> Result<DateTime<Utc>> {
        match self {
            WindowBound::Qualified(dt) => Ok(dt.with_timezone(&Utc)),
            WindowBound::Floating(naive) => Err(ShiftError::InvalidWindow(format!(
                "{} lacks timezone qualification",
                naive
            ))),
        }
    }

    pub fn is_qualified(&self) -> bool {
        matches!(self, WindowBound::Qualified(_))
    }
}

impl From<DateTime<Utc>> for WindowBound {
    fn from(dt: DateTime<Utc>) -> Self {
        WindowBound::Qualified(dt.fixed_offset())
    }
}

impl From<DateTime<FixedOffset>> for WindowBound {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        WindowBound::Qualified(dt)
    }
}

impl From<DateTime<chrono_tz::Tz>> for WindowBound {
    fn from(dt: DateTime<chrono_tz::Tz>) -> Self {
        WindowBound::Qualified(dt.fixed_offset())
    }
}

impl From<NaiveDateTime> for WindowBound {
    fn from(naive: NaiveDateTime) -> Self {
        WindowBound::Floating(naive)
    }
}

/// Parse a bound from text.
///
/// RFC 3339 strings (`2024-01-01T09:00:00Z`, `2024-01-01 09:00:00+02:00`) are
/// qualified. `YYYY-MM-DD HH:MM[:SS]`, with a space or `T` separator, is
/// floating. Anything else is [`ShiftError::InvalidWindow`].
pub fn parse_instant(input: &str) -> Result<WindowBound> {
    let trimmed = input.trim();
    let normalized = trimmed.replacen(' ', "T", 1);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(WindowBound::Qualified(dt));
    }
    if let Ok(naive) = normalized.parse::<NaiveDateTime>() {
        return Ok(WindowBound::Floating(naive));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M") {
        return Ok(WindowBound::Floating(naive));
    }

    Err(ShiftError::InvalidWindow(format!(
        "unrecognized instant: '{}'",
        trimmed
    )))
}

/// Resolve a bound to UTC, reading floating bounds as wall-clock time in
/// `timezone` (an IANA name such as `America/New_York`).
///
/// Qualified bounds pass through unchanged. A wall-clock time skipped by a DST
/// transition is rejected; a repeated one resolves to the earlier instant.
///
/// # Errors
/// Returns `ShiftError::InvalidTimezone` for an unknown zone name, and
/// `ShiftError::InvalidWindow` for a wall-clock time that does not exist.
pub fn localize(bound: WindowBound, timezone: &str) -> Result<DateTime<Utc>> {
    let tz: chrono_tz::Tz = timezone
        .parse()
        .map_err(|_| ShiftError::InvalidTimezone(timezone.to_string()))?;

    match bound {
        WindowBound::Qualified(dt) => Ok(dt.with_timezone(&Utc)),
        WindowBound::Floating(naive) => tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| {
                ShiftError::InvalidWindow(format!(
                    "{} does not exist in {} (DST gap)",
                    naive, timezone
                ))
            }),
    }
}
