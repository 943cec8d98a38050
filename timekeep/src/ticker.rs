use std::time::{Duration, Instant};

use time::OffsetDateTime;

use crate::domain::Timer;
use crate::elapsed::elapsed_seconds;

/// Per-timer display refresh.
///
/// Armed only while the snapshot is open and unpaused. Every tick recomputes
/// the value from the snapshot's absolute timestamps, so a ticker can be
/// dropped and rebuilt at any time without drift. It never touches remote
/// state.
#[derive(Debug, Clone)]
pub struct ElapsedTicker {
    snapshot: Timer,
    displayed: u64,
    next_tick: Option<Instant>,
}

impl ElapsedTicker {
    pub const INTERVAL: Duration = Duration::from_secs(1);

    pub fn new(snapshot: Timer, wall: OffsetDateTime, mono: Instant) -> Self {
        let mut ticker = Self {
            displayed: 0,
            next_tick: None,
            snapshot,
        };
        ticker.rearm(wall, mono);
        ticker
    }

    /// Swap in a fresh snapshot (e.g. after a refetch) and re-arm or disarm.
    pub fn update(&mut self, snapshot: Timer, wall: OffsetDateTime, mono: Instant) {
        self.snapshot = snapshot;
        self.rearm(wall, mono);
    }

    fn rearm(&mut self, wall: OffsetDateTime, mono: Instant) {
        self.displayed = elapsed_seconds(&self.snapshot, wall);
        self.next_tick = if self.snapshot.is_running() {
            Some(mono + Self::INTERVAL)
        } else {
            None
        };
    }

    pub fn snapshot(&self) -> &Timer {
        &self.snapshot
    }

    pub fn displayed(&self) -> u64 {
        self.displayed
    }

    pub fn is_armed(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Recompute if the tick is due. Returns whether the displayed value changed.
    pub fn tick(&mut self, wall: OffsetDateTime, mono: Instant) -> bool {
        let Some(due) = self.next_tick else {
            return false;
        };
        if mono < due {
            return false;
        }

        // Skip missed ticks instead of replaying them.
        let mut next = due + Self::INTERVAL;
        while next <= mono {
            next += Self::INTERVAL;
        }
        self.next_tick = Some(next);

        let value = elapsed_seconds(&self.snapshot, wall);
        let changed = value != self.displayed;
        self.displayed = value;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const T: OffsetDateTime = datetime!(2024-05-10 08:00 UTC);

    #[test]
    fn running_timer_ticks_once_per_second() {
        let mono = Instant::now();
        let mut ticker = ElapsedTicker::new(Timer::new("t1", "", T), T + time::Duration::seconds(10), mono);
        assert!(ticker.is_armed());
        assert_eq!(ticker.displayed(), 10);

        // Not due yet.
        assert!(!ticker.tick(T + time::Duration::seconds(10), mono + Duration::from_millis(500)));

        assert!(ticker.tick(T + time::Duration::seconds(11), mono + Duration::from_secs(1)));
        assert_eq!(ticker.displayed(), 11);
    }

    #[test]
    fn ticks_recompute_from_timestamps_after_a_stall() {
        let mono = Instant::now();
        let mut ticker = ElapsedTicker::new(Timer::new("t1", "", T), T, mono);

        // Loop was blocked for a minute: one tick catches up fully.
        assert!(ticker.tick(T + time::Duration::seconds(60), mono + Duration::from_secs(60)));
        assert_eq!(ticker.displayed(), 60);
        assert!(!ticker.tick(T + time::Duration::seconds(60), mono + Duration::from_millis(60_500)));
    }

    #[test]
    fn paused_and_stopped_timers_are_disarmed() {
        let mono = Instant::now();
        let paused = Timer::new("t1", "", T).paused_since(T + time::Duration::seconds(30));
        let mut ticker = ElapsedTicker::new(paused, T + time::Duration::seconds(90), mono);
        assert!(!ticker.is_armed());
        assert_eq!(ticker.displayed(), 30);
        assert!(!ticker.tick(T + time::Duration::seconds(200), mono + Duration::from_secs(110)));

        let stopped = Timer::new("t2", "", T).ended_at(T + time::Duration::seconds(45));
        let ticker = ElapsedTicker::new(stopped, T + time::Duration::hours(1), mono);
        assert!(!ticker.is_armed());
        assert_eq!(ticker.displayed(), 45);
    }

    #[test]
    fn resuming_rearms_the_ticker() {
        let mono = Instant::now();
        let paused = Timer::new("t1", "", T).paused_since(T + time::Duration::seconds(30));
        let mut ticker = ElapsedTicker::new(paused, T + time::Duration::seconds(90), mono);
        assert!(!ticker.is_armed());

        let resumed = Timer::new("t1", "", T).with_total_pause(60);
        ticker.update(resumed, T + time::Duration::seconds(90), mono);
        assert!(ticker.is_armed());
        assert_eq!(ticker.displayed(), 30);

        assert!(ticker.tick(T + time::Duration::seconds(91), mono + Duration::from_secs(1)));
        assert_eq!(ticker.displayed(), 31);
    }
}
