use std::collections::BTreeSet;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use super::ContactSink;
use crate::contact::{ContactId, Position};

pub const TOUCH_PROMPT: &str = "Place your fingers on the screen";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub identifier: u64,
    pub position: Position,
}

impl TouchPoint {
    pub fn new(identifier: u64, x: f64, y: f64) -> Self {
        Self {
            identifier,
            position: Position::new(x, y),
        }
    }
}

/// Adapter for touch-style platforms, where every event carries the full list
/// of points that are still down.
#[derive(Debug, Default)]
pub struct TouchAdapter {
    tracked: BTreeSet<u64>,
}

impl TouchAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked(&self) -> impl Iterator<Item = u64> + '_ {
        self.tracked.iter().copied()
    }

    /// Every listed point counts as a (re)start, so each new finger restarts the countdown.
    pub fn touch_start<S: ContactSink>(&mut self, sink: &mut S, touches: &[TouchPoint]) {
        for touch in touches {
            self.tracked.insert(touch.identifier);
            sink.contact_start(ContactId::Touch(touch.identifier), touch.position);
        }
    }

    pub fn touch_move<S: ContactSink>(&mut self, sink: &mut S, touches: &[TouchPoint]) {
        for touch in touches {
            if self.tracked.contains(&touch.identifier) {
                sink.contact_move(ContactId::Touch(touch.identifier), touch.position);
            }
        }
    }

    /// `remaining` is what is still down; anything tracked but missing from it has lifted.
    pub fn touch_end<S: ContactSink>(&mut self, sink: &mut S, remaining: &[TouchPoint]) {
        let lifted: Vec<u64> = self
            .tracked
            .iter()
            .copied()
            .filter(|id| !remaining.iter().any(|t| t.identifier == *id))
            .collect();

        for id in lifted {
            self.tracked.remove(&id);
            sink.contact_end(ContactId::Touch(id));
        }
    }
}

/// Treats each held mouse button as a finger on the surface.
#[derive(Debug, Default)]
pub struct MousePointer {
    touches: TouchAdapter,
    down: Vec<TouchPoint>,
}

impl MousePointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> &[TouchPoint] {
        &self.down
    }

    /// Returns true if the event changed a contact.
    pub fn handle<S: ContactSink>(&mut self, sink: &mut S, event: &MouseEvent) -> bool {
        let position = Position::new(event.column as f64, event.row as f64);

        match event.kind {
            MouseEventKind::Down(button) => {
                let identifier = button_id(button);
                match self.down.iter_mut().find(|t| t.identifier == identifier) {
                    Some(point) => point.position = position,
                    None => self.down.push(TouchPoint {
                        identifier,
                        position,
                    }),
                }
                self.touches.touch_start(sink, &self.down);
                true
            }
            MouseEventKind::Drag(button) => {
                let identifier = button_id(button);
                let Some(point) = self.down.iter_mut().find(|t| t.identifier == identifier) else {
                    return false;
                };
                point.position = position;
                let moved = [*point];
                self.touches.touch_move(sink, &moved);
                true
            }
            MouseEventKind::Up(button) => {
                let identifier = button_id(button);
                let before = self.down.len();
                self.down.retain(|t| t.identifier != identifier);
                if self.down.len() == before {
                    return false;
                }
                self.touches.touch_end(sink, &self.down);
                true
            }
            _ => false,
        }
    }
}

fn button_id(button: MouseButton) -> u64 {
    match button {
        MouseButton::Left => 0,
        MouseButton::Right => 1,
        MouseButton::Middle => 2,
    }
}
