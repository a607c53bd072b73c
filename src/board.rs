use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::contact::{ContactId, Position};
use crate::palette::{marker_color, Rgb};
use crate::render::Renderer;
use crate::timer::{Clock, SystemClock};

/// How long the chosen marker stays enlarged after a decision.
pub const CHOSEN_PULSE: Duration = Duration::from_millis(700);

pub const HOLD_STILL: &str = "Hold still...";
pub const CHOSEN: &str = "Chosen!";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    Resting,
    Bouncing,
    Dimmed,
    Chosen,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: ContactId,
    pub position: Position,
    pub color: Rgb,
    pub label: Option<char>,
    pub emphasis: Emphasis,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Prompt,
    HoldStill,
    Chosen,
}

/// View model of the playing surface, fed by the tracker.
#[derive(Debug)]
pub struct Board<C = SystemClock> {
    markers: HashMap<ContactId, Marker>,
    status: Status,
    idle_prompt: &'static str,
    chosen_at: Option<Instant>,
    bell_pending: bool,
    clock: C,
}

impl Board {
    pub fn new(idle_prompt: &'static str) -> Self {
        Self::with_clock(idle_prompt, SystemClock)
    }
}

impl<C: Clock> Board<C> {
    /// Share the tracker's clock so the pulse runs on the same time.
    pub fn with_clock(idle_prompt: &'static str, clock: C) -> Self {
        Self {
            markers: HashMap::new(),
            status: Status::Prompt,
            idle_prompt,
            chosen_at: None,
            bell_pending: false,
            clock,
        }
    }

    pub fn message(&self) -> &str {
        match self.status {
            Status::Prompt => self.idle_prompt,
            Status::HoldStill => HOLD_STILL,
            Status::Chosen => CHOSEN,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn marker(&self, id: ContactId) -> Option<&Marker> {
        self.markers.get(&id)
    }

    /// Markers in paint order: the chosen one last so it ends up on top.
    pub fn markers(&self) -> Vec<&Marker> {
        let mut markers: Vec<&Marker> = self.markers.values().collect();
        markers.sort_by_key(|m| (m.emphasis == Emphasis::Chosen, m.id.color_seed()));
        markers
    }

    pub fn is_pulsing(&self) -> bool {
        let now = self.clock.now();
        self.chosen_at
            .map(|at| now.saturating_duration_since(at) < CHOSEN_PULSE)
            .unwrap_or(false)
    }

    /// True once per decision; the caller rings the bell.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell_pending)
    }
}

impl<C: Clock> Renderer for Board<C> {
    fn marker_created(&mut self, id: ContactId, position: Position) {
        let label = match id {
            ContactId::Key(c) => Some(c.to_ascii_uppercase()),
            ContactId::Touch(_) => None,
        };
        self.markers.insert(
            id,
            Marker {
                id,
                position,
                color: marker_color(id),
                label,
                emphasis: Emphasis::Resting,
            },
        );
    }

    fn marker_moved(&mut self, id: ContactId, position: Position) {
        if let Some(marker) = self.markers.get_mut(&id) {
            marker.position = position;
        }
    }

    fn marker_removed(&mut self, id: ContactId) {
        self.markers.remove(&id);
    }

    fn contact_chosen(&mut self, chosen: ContactId, active: &[ContactId]) {
        for id in active {
            if let Some(marker) = self.markers.get_mut(id) {
                marker.emphasis = if *id == chosen {
                    Emphasis::Chosen
                } else {
                    Emphasis::Dimmed
                };
            }
        }
        self.status = Status::Chosen;
        self.chosen_at = Some(self.clock.now());
        self.bell_pending = true;
    }

    fn round_reset(&mut self) {
        self.markers.clear();
        self.status = Status::Prompt;
        self.chosen_at = None;
        self.bell_pending = false;
    }

    fn round_pending(&mut self, active: &[ContactId]) {
        for id in active {
            if let Some(marker) = self.markers.get_mut(id) {
                marker.emphasis = Emphasis::Bouncing;
            }
        }
        self.status = Status::HoldStill;
        self.chosen_at = None;
    }
}
