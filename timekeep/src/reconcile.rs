//! Back-calculating a timer's `startTime` from a requested elapsed duration.
//!
//! The backend derives duration from `startTime` and its pause bookkeeping,
//! so editing the displayed duration means moving the start instant such that
//! [`elapsed_seconds`](crate::elapsed::elapsed_seconds) yields the new value.

use time::{Duration, OffsetDateTime};

use crate::domain::Timer;
use crate::elapsed::floor_seconds;
use crate::error::{Error, Result};

const OUT_OF_RANGE: &str = "Длительность таймера вне допустимого диапазона";

/// Paused seconds that count against the timer at `now`, including the
/// segment still in progress.
pub fn effective_pause(timer: &Timer, now: OffsetDateTime) -> i64 {
    let in_progress = timer
        .current_pause_start()
        .map(|paused_at| floor_seconds(now - paused_at).max(0))
        .unwrap_or(0);
    timer.total_pause.saturating_add(in_progress)
}

/// The start instant that makes `snapshot` report `desired_elapsed` seconds.
///
/// Closed timers are anchored on their `end_time`, open ones on `now`.
/// Durations that would move the start outside the representable range are
/// rejected with [`Error::Validation`].
pub fn start_time_for_elapsed(
    snapshot: &Timer,
    desired_elapsed: u64,
    now: OffsetDateTime,
) -> Result<OffsetDateTime> {
    let out_of_range = || Error::Validation(OUT_OF_RANGE.to_string());
    let desired = i64::try_from(desired_elapsed).map_err(|_| out_of_range())?;
    let (anchor, pause) = match snapshot.end_time {
        Some(end) => (end, snapshot.total_pause),
        None => (now, effective_pause(snapshot, now)),
    };
    let back = desired.checked_add(pause).ok_or_else(out_of_range)?;
    anchor
        .checked_sub(Duration::seconds(back))
        .ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elapsed::elapsed_seconds;
    use time::macros::datetime;

    const T: OffsetDateTime = datetime!(2024-05-10 08:00 UTC);

    #[test]
    fn closed_timer_round_trips() {
        let snapshot = Timer::new("t1", "", T)
            .with_total_pause(900)
            .ended_at(T + Duration::hours(5));

        for desired in [0u64, 1, 59, 3600, 7325, 40_000] {
            let start = start_time_for_elapsed(&snapshot, desired, T + Duration::days(2)).unwrap();
            assert_eq!(start, snapshot.end_time.unwrap() - Duration::seconds(desired as i64 + 900));

            let mut edited = snapshot.clone();
            edited.start_time = start;
            assert_eq!(elapsed_seconds(&edited, T + Duration::days(9)), desired);
        }
    }

    #[test]
    fn open_running_timer_reads_back_desired_value() {
        let snapshot = Timer::new("t1", "", T).with_total_pause(120);
        let t0 = T + Duration::minutes(30);

        let start = start_time_for_elapsed(&snapshot, 7200, t0).unwrap();
        assert_eq!(start, t0 - Duration::seconds(7200 + 120));

        let mut edited = snapshot.clone();
        edited.start_time = start;
        assert_eq!(elapsed_seconds(&edited, t0), 7200);
        let shortly_after = elapsed_seconds(&edited, t0 + Duration::milliseconds(900));
        assert!((7200..=7201).contains(&shortly_after));
    }

    #[test]
    fn open_paused_timer_accounts_for_pause_in_progress() {
        let paused_at = T + Duration::minutes(10);
        let snapshot = Timer::new("t1", "", T)
            .with_total_pause(60)
            .paused_since(paused_at);
        let now = paused_at + Duration::seconds(45);

        assert_eq!(effective_pause(&snapshot, now), 105);

        let start = start_time_for_elapsed(&snapshot, 300, now).unwrap();
        let mut edited = snapshot.clone();
        edited.start_time = start;
        assert_eq!(elapsed_seconds(&edited, now), 300);
        // Still paused, so it stays put.
        assert_eq!(elapsed_seconds(&edited, now + Duration::minutes(20)), 300);
    }

    #[test]
    fn unrepresentable_start_is_a_validation_error() {
        let open = Timer::new("t1", "", T);
        let huge = 200_000_000 * 3600;
        assert!(matches!(
            start_time_for_elapsed(&open, huge, T),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            start_time_for_elapsed(&open, u64::MAX, T),
            Err(Error::Validation(_))
        ));

        let closed = open.with_total_pause(i64::MAX).ended_at(T + Duration::hours(1));
        assert!(matches!(
            start_time_for_elapsed(&closed, 60, T),
            Err(Error::Validation(_))
        ));
    }
}
