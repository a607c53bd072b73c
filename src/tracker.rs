//! Contact tracking and the decision round.
//!
//! A [`Tracker`] owns the active contacts, the single decision timer and the
//! selector. Input adapters call [`Tracker::contact_start`],
//! [`Tracker::contact_move`] and [`Tracker::contact_end`]; the event loop calls
//! [`Tracker::poll`] to let a due decision fire. Every transition is reported
//! to the [`Renderer`].

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info, trace};

use crate::contact::{ContactId, ContactSet, Position};
use crate::render::Renderer;
use crate::selector::Selector;
use crate::timer::{Clock, DecisionTimer, SystemClock};

pub const DEFAULT_DECISION_DELAY: Duration = Duration::from_millis(1000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    Idle,
    Pending,
    Decided(ContactId),
}

impl RoundState {
    pub fn chosen(&self) -> Option<ContactId> {
        match self {
            RoundState::Decided(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Tracker<R, C = SystemClock, G = StdRng> {
    contacts: ContactSet,
    timer: DecisionTimer,
    state: RoundState,
    selector: Selector<G>,
    clock: C,
    renderer: R,
    delay: Duration,
}

impl<R: Renderer> Tracker<R> {
    pub fn new(renderer: R, delay: Duration) -> Self {
        Self::with_parts(renderer, SystemClock, Selector::from_entropy(), delay)
    }

    /// Real clock, reproducible choices.
    pub fn seeded(renderer: R, delay: Duration, seed: u64) -> Self {
        Self::with_parts(renderer, SystemClock, Selector::seeded(seed), delay)
    }
}

impl<R: Renderer, C: Clock, G: Rng> Tracker<R, C, G> {
    pub fn with_parts(renderer: R, clock: C, selector: Selector<G>, delay: Duration) -> Self {
        Self {
            contacts: ContactSet::new(),
            timer: DecisionTimer::new(),
            state: RoundState::Idle,
            selector,
            clock,
            renderer,
            delay,
        }
    }

    /// A contact went down. Re-arms the decision timer even if `id` is already active.
    pub fn contact_start(&mut self, id: ContactId, position: Position) {
        if self.contacts.insert(id, position) {
            debug!(contact = %id, active = self.contacts.len(), "contact started");
            self.renderer.marker_created(id, position);
        }

        if let RoundState::Decided(previous) = self.state {
            debug!(contact = %id, previous = %previous, "new contact clears previous choice");
        }

        self.timer.arm(self.clock.now(), self.delay);
        self.state = RoundState::Pending;
        let active = self.contacts.ids();
        self.renderer.round_pending(&active);
    }

    pub fn contact_move(&mut self, id: ContactId, position: Position) {
        if self.contacts.update(id, position) {
            trace!(contact = %id, x = position.x, y = position.y, "contact moved");
            self.renderer.marker_moved(id, position);
        }
    }

    pub fn contact_end(&mut self, id: ContactId) {
        if self.contacts.remove(id).is_none() {
            return;
        }

        debug!(contact = %id, active = self.contacts.len(), "contact ended");
        self.renderer.marker_removed(id);

        if self.contacts.is_empty() {
            self.reset_round();
        }
    }

    /// Lets a due decision fire. Returns the chosen contact if one was picked.
    pub fn poll(&mut self) -> Option<ContactId> {
        if !self.timer.fire_if_due(self.clock.now()) {
            return None;
        }

        if self.contacts.is_empty() {
            return None;
        }

        let active = self.contacts.ids();
        let chosen = self.selector.select_one(&active);
        info!(chosen = %chosen, candidates = active.len(), "contact chosen");

        self.state = RoundState::Decided(chosen);
        self.renderer.contact_chosen(chosen, &active);
        Some(chosen)
    }

    fn reset_round(&mut self) {
        self.timer.cancel();
        self.state = RoundState::Idle;
        info!("round reset");
        self.renderer.round_reset();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Time left until a pending decision fires.
    pub fn time_to_decision(&self) -> Option<Duration> {
        self.timer
            .deadline()
            .map(|d| d.saturating_duration_since(self.clock.now()))
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn contacts(&self) -> &ContactSet {
        &self.contacts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
