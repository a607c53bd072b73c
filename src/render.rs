use crate::contact::{ContactId, Position};

/// Receives the tracker's state transitions and turns them into something visible.
pub trait Renderer {
    fn marker_created(&mut self, id: ContactId, position: Position);
    fn marker_moved(&mut self, id: ContactId, position: Position);
    fn marker_removed(&mut self, id: ContactId);
    /// `active` holds every id that took part in the decision, `chosen` included.
    fn contact_chosen(&mut self, chosen: ContactId, active: &[ContactId]);
    fn round_reset(&mut self);

    /// A decision was (re)scheduled over `active`.
    fn round_pending(&mut self, _active: &[ContactId]) {}
}

#[derive(Clone, Debug, PartialEq)]
pub enum RenderEvent {
    MarkerCreated(ContactId, Position),
    MarkerMoved(ContactId, Position),
    MarkerRemoved(ContactId),
    ContactChosen {
        chosen: ContactId,
        active: Vec<ContactId>,
    },
    RoundReset,
    RoundPending(Vec<ContactId>),
}

/// Renderer that just keeps a log of what it was told, for tests and headless runs
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub events: Vec<RenderEvent>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chosen(&self) -> Vec<ContactId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::ContactChosen { chosen, .. } => Some(*chosen),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&RenderEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn marker_created(&mut self, id: ContactId, position: Position) {
        self.events.push(RenderEvent::MarkerCreated(id, position));
    }

    fn marker_moved(&mut self, id: ContactId, position: Position) {
        self.events.push(RenderEvent::MarkerMoved(id, position));
    }

    fn marker_removed(&mut self, id: ContactId) {
        self.events.push(RenderEvent::MarkerRemoved(id));
    }

    fn contact_chosen(&mut self, chosen: ContactId, active: &[ContactId]) {
        self.events.push(RenderEvent::ContactChosen {
            chosen,
            active: active.to_vec(),
        });
    }

    fn round_reset(&mut self) {
        self.events.push(RenderEvent::RoundReset);
    }

    fn round_pending(&mut self, active: &[ContactId]) {
        self.events.push(RenderEvent::RoundPending(active.to_vec()));
    }
}
