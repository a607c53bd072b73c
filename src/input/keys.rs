use std::collections::HashSet;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{ContactSink, Surface};
use crate::contact::ContactId;

pub const KEYS_PROMPT: &str = "Press any key (A-Z, 0-9)";

/// Longest wait for the first auto-repeat after a key goes down.
pub const FIRST_REPEAT_WINDOW: Duration = Duration::from_millis(700);
/// Longest gap between two auto-repeats before the keys count as released.
pub const REPEAT_GAP: Duration = Duration::from_millis(150);

/// How a held key is let go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseMode {
    /// The terminal reports key releases.
    Release,
    /// No release events available: keys are let go once auto-repeat stops.
    Inferred,
}

/// Auto-repeat seen so far. The keyboard only repeats the most recent key,
/// so one stream keeps every held key alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RepeatStream {
    last_seen: Instant,
    repeating: bool,
}

impl RepeatStream {
    fn expires_at(&self) -> Instant {
        let window = if self.repeating {
            REPEAT_GAP
        } else {
            FIRST_REPEAT_WINDOW
        };
        self.last_seen + window
    }
}

/// Turns held letter/digit keys into contacts at random spots on the surface.
#[derive(Debug)]
pub struct KeyAdapter<G = StdRng> {
    held: HashSet<char>,
    surface: Surface,
    mode: ReleaseMode,
    stream: Option<RepeatStream>,
    rng: G,
}

impl KeyAdapter<StdRng> {
    pub fn new(surface: Surface, mode: ReleaseMode) -> Self {
        Self::with_rng(surface, mode, StdRng::from_entropy())
    }
}

impl<G: Rng> KeyAdapter<G> {
    pub fn with_rng(surface: Surface, mode: ReleaseMode, rng: G) -> Self {
        Self {
            held: HashSet::new(),
            surface,
            mode,
            stream: None,
            rng,
        }
    }

    pub fn mode(&self) -> ReleaseMode {
        self.mode
    }

    pub fn resize(&mut self, surface: Surface) {
        self.surface = surface;
    }

    pub fn is_held(&self, c: char) -> bool {
        self.held.contains(&c.to_ascii_lowercase())
    }

    /// Returns true if the key started a contact. Auto-repeat of a held key does nothing.
    pub fn key_down<S: ContactSink>(&mut self, sink: &mut S, c: char) -> bool {
        let Some(key) = pickable(c) else {
            return false;
        };
        if !self.held.insert(key) {
            return false;
        }

        let position = self.surface.random_point(&mut self.rng);
        sink.contact_start(ContactId::Key(key), position);
        true
    }

    pub fn key_up<S: ContactSink>(&mut self, sink: &mut S, c: char) -> bool {
        let Some(key) = pickable(c) else {
            return false;
        };
        if !self.held.remove(&key) {
            return false;
        }

        if self.held.is_empty() {
            self.stream = None;
        }
        sink.contact_end(ContactId::Key(key));
        true
    }

    /// Feeds a crossterm key event through the adapter. Returns true if it was consumed.
    pub fn handle<S: ContactSink>(&mut self, sink: &mut S, key: &KeyEvent) -> bool {
        self.handle_at(sink, key, Instant::now())
    }

    /// [`KeyAdapter::handle`] with the arrival time given.
    pub fn handle_at<S: ContactSink>(
        &mut self,
        sink: &mut S,
        key: &KeyEvent,
        now: Instant,
    ) -> bool {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        let KeyCode::Char(c) = key.code else {
            return false;
        };

        match (self.mode, key.kind) {
            (ReleaseMode::Release, KeyEventKind::Press) => self.key_down(sink, c),
            (ReleaseMode::Release, KeyEventKind::Release) => self.key_up(sink, c),
            (ReleaseMode::Inferred, KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.expire(sink, now);
                if self.is_held(c) {
                    self.stream = Some(RepeatStream {
                        last_seen: now,
                        repeating: true,
                    });
                    true
                } else if self.key_down(sink, c) {
                    self.stream = Some(RepeatStream {
                        last_seen: now,
                        repeating: false,
                    });
                    true
                } else {
                    false
                }
            }
            (ReleaseMode::Inferred, KeyEventKind::Release) => self.key_up(sink, c),
            _ => false,
        }
    }

    /// When the held keys will count as released if no repeat shows up.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.stream.map(|s| s.expires_at())
    }

    /// Ends every held key once the repeat stream has gone quiet. Returns how many ended.
    pub fn expire<S: ContactSink>(&mut self, sink: &mut S, now: Instant) -> usize {
        match self.next_expiry() {
            Some(at) if now >= at => {}
            _ => return 0,
        }

        self.stream = None;
        let mut released: Vec<char> = self.held.drain().collect();
        released.sort_unstable();
        debug!(keys = released.len(), "auto-repeat stopped, releasing held keys");
        for key in &released {
            sink.contact_end(ContactId::Key(*key));
        }
        released.len()
    }
}

fn pickable(c: char) -> Option<char> {
    let key = c.to_ascii_lowercase();
    (key.is_ascii_lowercase() || key.is_ascii_digit()).then_some(key)
}
