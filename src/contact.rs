use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;

/// Identity of one continuous contact (a finger, a held mouse button or a held key).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContactId {
    Touch(u64),
    Key(char),
}

impl ContactId {
    /// Key contacts are case-insensitive, so `A` and `a` are the same contact.
    pub fn key(c: char) -> Self {
        ContactId::Key(c.to_ascii_lowercase())
    }

    /// Numeric seed used to pick a marker color.
    pub fn color_seed(&self) -> u64 {
        match self {
            ContactId::Touch(n) => *n,
            ContactId::Key(c) => *c as u64,
        }
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactId::Touch(n) => write!(f, "touch-{}", n),
            ContactId::Key(c) => write!(f, "key-{}", c),
        }
    }
}

/// Surface coordinates. The engine never looks at these, it only hands them to the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub position: Position,
    pub order: u64,
}

/// The currently active contacts, keyed by id.
#[derive(Debug, Default)]
pub struct ContactSet {
    contacts: HashMap<ContactId, Contact>,
    next_order: u64,
}

impl ContactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and leaves the stored contact untouched) if `id` is already active.
    pub fn insert(&mut self, id: ContactId, position: Position) -> bool {
        if self.contacts.contains_key(&id) {
            return false;
        }

        let order = self.next_order;
        self.next_order += 1;
        self.contacts.insert(
            id,
            Contact {
                id,
                position,
                order,
            },
        );
        true
    }

    pub fn update(&mut self, id: ContactId, position: Position) -> bool {
        match self.contacts.get_mut(&id) {
            Some(contact) => {
                contact.position = position;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: ContactId) -> Option<Contact> {
        self.contacts.remove(&id)
    }

    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(&id)
    }

    pub fn contains(&self, id: ContactId) -> bool {
        self.contacts.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Active ids in creation order.
    pub fn ids(&self) -> Vec<ContactId> {
        self.contacts
            .values()
            .sorted_by_key(|c| c.order)
            .map(|c| c.id)
            .collect()
    }
}
