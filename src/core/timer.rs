//! Cooperative timers.
//!
//! Nothing in the core sleeps or spawns. Timed behavior (reveal chunks,
//! thinking placeholders, highlight emphasis, scroll-lock) is expressed as
//! deadlines in a [`TimerSet`] and driven by the host calling `tick(now)`.

use std::collections::BTreeMap;
use std::time::Instant;

/// Milliseconds on the host's monotonic timeline.
pub type Millis = u64;

/// Source of the current time for the cooperative event loop.
pub trait Clock {
    /// Milliseconds since the clock's origin.
    fn now(&self) -> Millis;
}

/// Monotonic clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Hand-driven clock for tests and scripted sessions.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: std::cell::Cell<Millis>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self { now: std::cell::Cell::new(start) }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Millis) {
        self.now.set(self.now.get().saturating_add(by));
    }

    pub fn set(&self, at: Millis) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now.get()
    }
}

/// A set of named, independently cancellable deadlines.
///
/// Arming a key that is already armed replaces its deadline, so a re-trigger
/// can never race the timer it supersedes.
#[derive(Debug, Clone)]
pub struct TimerSet<K: Ord + Clone> {
    deadlines: BTreeMap<K, Millis>,
}

impl<K: Ord + Clone> TimerSet<K> {
    pub fn new() -> Self {
        Self { deadlines: BTreeMap::new() }
    }

    /// Arm (or re-arm) `key` to fire at `at`.
    pub fn arm(&mut self, key: K, at: Millis) {
        self.deadlines.insert(key, at);
    }

    /// Cancel `key`. Cancelling an unarmed key is a no-op.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }

    pub fn is_armed(&self, key: &K) -> bool {
        self.deadlines.contains_key(key)
    }

    pub fn deadline(&self, key: &K) -> Option<Millis> {
        self.deadlines.get(key).copied()
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest first.
    pub fn due(&mut self, now: Millis) -> Vec<K> {
        let mut fired: Vec<(Millis, K)> = self
            .deadlines
            .iter()
            .filter(|(_, &at)| at <= now)
            .map(|(k, &at)| (at, k.clone()))
            .collect();
        fired.sort_by_key(|(at, _)| *at);

        for (_, key) in &fired {
            self.deadlines.remove(key);
        }
        fired.into_iter().map(|(_, k)| k).collect()
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.deadlines.values().min().copied()
    }

    /// Drop every timer. Called on teardown so nothing fires against stale state.
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

impl<K: Ord + Clone> Default for TimerSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_replaces_deadline() {
        let mut timers = TimerSet::new();
        timers.arm("emphasis", 100);
        timers.arm("emphasis", 500);

        assert!(timers.due(200).is_empty());
        assert_eq!(timers.due(500), vec!["emphasis"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_due_orders_by_deadline() {
        let mut timers = TimerSet::new();
        timers.arm(2, 300);
        timers.arm(1, 200);
        timers.arm(3, 900);

        assert_eq!(timers.due(400), vec![1, 2]);
        assert_eq!(timers.next_deadline(), Some(900));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timers = TimerSet::new();
        timers.arm("lock", 10);
        assert!(timers.cancel(&"lock"));
        assert!(!timers.cancel(&"lock"));
        assert!(timers.due(1_000).is_empty());
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut timers = TimerSet::new();
        timers.arm("a", 1);
        timers.arm("b", 2);
        timers.clear();
        assert!(timers.due(10).is_empty());
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(5);
        clock.advance(20);
        assert_eq!(clock.now(), 25);
        clock.set(3);
        assert_eq!(clock.now(), 3);
    }
}
