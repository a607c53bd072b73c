//! Input adapters. Each one turns a platform's events into the same three
//! contact calls, so the tracker never knows where a contact came from.

pub mod keys;
pub mod touch;

use rand::Rng;

use crate::contact::{ContactId, Position};
use crate::render::Renderer;
use crate::timer::Clock;
use crate::tracker::Tracker;

/// Anything that accepts contact lifecycle calls
pub trait ContactSink {
    fn contact_start(&mut self, id: ContactId, position: Position);
    fn contact_move(&mut self, id: ContactId, position: Position);
    fn contact_end(&mut self, id: ContactId);
}

impl<R: Renderer, C: Clock, G: Rng> ContactSink for Tracker<R, C, G> {
    fn contact_start(&mut self, id: ContactId, position: Position) {
        Tracker::contact_start(self, id, position)
    }

    fn contact_move(&mut self, id: ContactId, position: Position) {
        Tracker::contact_move(self, id, position)
    }

    fn contact_end(&mut self, id: ContactId) {
        Tracker::contact_end(self, id)
    }
}

/// The area contacts live on, with the margin kept free when placing key markers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl Surface {
    pub fn new(width: f64, height: f64, margin_x: f64, margin_y: f64) -> Self {
        Self {
            width,
            height,
            margin_x,
            margin_y,
        }
    }

    /// A terminal of `cols` x `rows` cells.
    pub fn terminal(cols: u16, rows: u16) -> Self {
        Self::new(cols as f64, rows as f64, 6.0, 3.0)
    }

    /// Uniform point inside the margins; collapses to the center line when the surface is too small.
    pub fn random_point<G: Rng>(&self, rng: &mut G) -> Position {
        let x = random_along(rng, self.width, self.margin_x);
        let y = random_along(rng, self.height, self.margin_y);
        Position::new(x, y)
    }
}

fn random_along<G: Rng>(rng: &mut G, len: f64, margin: f64) -> f64 {
    if len > margin * 2.0 {
        rng.gen_range(margin..len - margin)
    } else {
        len / 2.0
    }
}
