use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of "now" for the decision timer
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

/// Single-shot, reschedulable deadline. At most one is ever pending.
#[derive(Debug, Default)]
pub struct DecisionTimer {
    deadline: Option<Instant>,
}

impl DecisionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any pending deadline.
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarms and returns true once `now` has reached the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D: Duration = Duration::from_millis(1000);

    #[test]
    fn fires_exactly_once_at_deadline() {
        let clock = ManualClock::new();
        let mut timer = DecisionTimer::new();
        timer.arm(clock.now(), D);

        clock.advance(D - Duration::from_millis(1));
        assert!(!timer.fire_if_due(clock.now()));

        clock.advance(Duration::from_millis(1));
        assert!(timer.fire_if_due(clock.now()));
        assert!(!timer.fire_if_due(clock.now()));
        assert!(!timer.is_armed());
    }

    #[test]
    fn rearming_replaces_the_deadline() {
        let clock = ManualClock::new();
        let mut timer = DecisionTimer::new();
        timer.arm(clock.now(), D);

        clock.advance(D / 2);
        timer.arm(clock.now(), D);

        clock.advance(D / 2);
        assert!(!timer.fire_if_due(clock.now()));

        clock.advance(D / 2);
        assert!(timer.fire_if_due(clock.now()));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let clock = ManualClock::new();
        let mut timer = DecisionTimer::new();
        timer.cancel();
        timer.arm(clock.now(), D);
        timer.cancel();

        clock.advance(D * 3);
        assert!(!timer.fire_if_due(clock.now()));
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(Duration::from_millis(250));
        assert_eq!(other.elapsed(), Duration::from_millis(250));
        assert_eq!(clock.now(), other.now());
    }
}
