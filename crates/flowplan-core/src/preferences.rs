//! User preference state read by the ordering and selection code.
//!
//! [`Preferences`] is owned by the project and outlives any solve.
//! [`SelectionSession`] holds the bump counts of a single solve and is
//! dropped with it, so bumps never leak between solves.

use crate::id::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    favorites: HashSet<ObjectId>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_favorite(&self, id: ObjectId) -> bool {
        self.favorites.contains(&id)
    }

    /// Mark as favorite. Returns false if it already was one.
    pub fn add_favorite(&mut self, id: ObjectId) -> bool {
        self.favorites.insert(id)
    }

    pub fn remove_favorite(&mut self, id: ObjectId) -> bool {
        self.favorites.remove(&id)
    }

    /// Flip favorite state; returns the new state.
    pub fn toggle_favorite(&mut self, id: ObjectId) -> bool {
        if self.favorites.remove(&id) {
            false
        } else {
            self.favorites.insert(id);
            true
        }
    }

    pub fn favorites(&self) -> &HashSet<ObjectId> {
        &self.favorites
    }
}

/// Per-solve bump counts.
#[derive(Debug, Clone, Default)]
pub struct SelectionSession {
    bumps: HashMap<ObjectId, u32>,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate bump weight for an object chosen in this session.
    pub fn add_to_favorite(&mut self, id: ObjectId, amount: u32) {
        let count = self.bumps.entry(id).or_insert(0);
        *count = count.saturating_add(amount);
    }

    pub fn bump_count(&self, id: ObjectId) -> u32 {
        self.bumps.get(&id).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.bumps.clear();
    }
}
