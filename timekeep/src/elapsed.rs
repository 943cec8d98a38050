//! Elapsed-time arithmetic for timer snapshots.
//!
//! Everything here is computed from absolute timestamps and an explicit
//! `now`, so a display can be recomputed at any moment without drift.

use thiserror::Error;
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::domain::Timer;

/// Whole seconds in `d`, rounded towards negative infinity.
pub fn floor_seconds(d: Duration) -> i64 {
    let whole = d.whole_seconds();
    if d.is_negative() && d.subsec_nanoseconds() != 0 {
        whole - 1
    } else {
        whole
    }
}

/// Running seconds of `timer` at `now`, excluding every paused interval.
///
/// The in-progress pause segment (from `paused_at` to `now`) is subtracted
/// separately because the backend only folds it into `total_pause` on resume.
/// Skewed clocks or inconsistent data never produce a negative result.
pub fn elapsed_seconds(timer: &Timer, now: OffsetDateTime) -> u64 {
    let end = timer.end_time.unwrap_or(now);
    let mut total = floor_seconds(end - timer.start_time);
    total = total.saturating_sub(timer.total_pause);

    if let Some(paused_at) = timer.current_pause_start() {
        total = total.saturating_sub(floor_seconds(now - paused_at));
    }

    total.max(0) as u64
}

pub fn split_hms(seconds: u64) -> (u64, u64, u64) {
    (seconds / 3600, (seconds % 3600) / 60, seconds % 60)
}

/// Largest hours value accepted from an edit form.
pub const MAX_HOURS: u64 = 100_000;

/// Total seconds, or `None` on overflow.
pub fn combine_hms(hours: u64, minutes: u64, seconds: u64) -> Option<u64> {
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// `HH:MM:SS`, used on timer cards. Hours widen past two digits.
pub fn format_clock(seconds: u64) -> String {
    let (h, m, s) = split_hms(seconds);
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// `"<H>ч <M>м"`, used for project totals and statistics.
pub fn format_summary(seconds: i64) -> String {
    let (h, m, _) = split_hms(seconds.max(0) as u64);
    format!("{}ч {}м", h, m)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockParseError {
    #[error("expected HH:MM:SS, got {0:?}")]
    Shape(String),
    #[error("{field} is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be below 60, got {value}")]
    OutOfRange { field: &'static str, value: u64 },
    #[error("hours must be at most {max}, got {value}")]
    TooLong { value: u64, max: u64 },
}

/// Parse separate hours/minutes/seconds inputs into total seconds.
///
/// Empty inputs count as zero, matching an untouched numeric field.
pub fn parse_hms(hours: &str, minutes: &str, seconds: &str) -> Result<u64, ClockParseError> {
    let h = parse_field("hours", hours)?;
    let m = parse_field("minutes", minutes)?;
    let s = parse_field("seconds", seconds)?;
    if m >= 60 {
        return Err(ClockParseError::OutOfRange {
            field: "minutes",
            value: m,
        });
    }
    if s >= 60 {
        return Err(ClockParseError::OutOfRange {
            field: "seconds",
            value: s,
        });
    }
    let too_long = ClockParseError::TooLong {
        value: h,
        max: MAX_HOURS,
    };
    if h > MAX_HOURS {
        return Err(too_long);
    }
    combine_hms(h, m, s).ok_or(too_long)
}

/// Inverse of [`format_clock`].
pub fn parse_clock(input: &str) -> Result<u64, ClockParseError> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    let [h, m, s] = parts.as_slice() else {
        return Err(ClockParseError::Shape(input.to_string()));
    };
    parse_hms(h, m, s)
}

fn parse_field(field: &'static str, value: &str) -> Result<u64, ClockParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<u64>()
        .map_err(|_| ClockParseError::NotANumber {
            field,
            value: value.to_string(),
        })
}

pub fn to_local_time(dt: OffsetDateTime) -> OffsetDateTime {
    if let Ok(local_offset) = UtcOffset::current_local_offset() {
        dt.to_offset(local_offset)
    } else {
        dt
    }
}

/// Short `dd.mm.yy, HH:MM` rendering in the given offset.
pub fn format_timestamp_in(dt: OffsetDateTime, offset: UtcOffset) -> String {
    let dt = dt.to_offset(offset);
    format!(
        "{:02}.{:02}.{:02}, {:02}:{:02}",
        dt.day(),
        dt.month() as u8,
        dt.year().rem_euclid(100),
        dt.hour(),
        dt.minute()
    )
}

pub fn format_timestamp(dt: OffsetDateTime) -> String {
    let local = to_local_time(dt);
    format_timestamp_in(local, local.offset())
}
