use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum PickrEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    /// The event source is gone; nothing will ever arrive again.
    Closed,
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait PickrEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<PickrEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<PickrEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => PickrEvent::Key(key),
                Ok(CtEvent::Mouse(mouse)) => PickrEvent::Mouse(mouse),
                Ok(CtEvent::Resize(w, h)) => PickrEvent::Resize(w, h),
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(error = %err, "terminal event reader stopped");
                    break;
                }
            };

            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PickrEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PickrEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<PickrEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<PickrEvent>) -> Self {
        Self { rx }
    }
}

impl PickrEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<PickrEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: PickrEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: PickrEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> PickrEvent {
        self.wait(self.ticker.interval())
    }

    /// Like [`Runner::step`], but never sleeps past `deadline`, so a pending
    /// decision is handled as soon as it is due.
    pub fn step_until(&self, deadline: Option<Instant>) -> PickrEvent {
        let mut timeout = self.ticker.interval();
        if let Some(deadline) = deadline {
            timeout = timeout.min(deadline.saturating_duration_since(Instant::now()));
        }
        self.wait(timeout)
    }

    fn wait(&self, timeout: Duration) -> PickrEvent {
        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => PickrEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => PickrEvent::Closed,
        }
    }
}
