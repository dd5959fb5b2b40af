//! Body registry: an id-keyed arena with deferred removal
//!
//! Bodies of every category share one id counter and one map, iterated in id
//! order for determinism. Removals are only *marked* while a frame is being
//! resolved; `apply_removals` deletes them in a single pass afterwards.

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, Category};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    bodies: BTreeMap<BodyId, Body>,
    /// Ids marked for removal this frame
    pending: BTreeSet<BodyId>,
    next_id: BodyId,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            bodies: BTreeMap::new(),
            pending: BTreeSet::new(),
            next_id: 0,
        }
    }

    /// Allocate a new body id
    pub fn next_body_id(&mut self) -> BodyId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create a body with a fresh id and insert it
    pub fn spawn(&mut self, category: Category, pos: DVec2, vel: DVec2, radius: f64) -> BodyId {
        let id = self.next_body_id();
        self.bodies.insert(id, Body::new(id, category, pos, vel, radius));
        id
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    /// Every body, including ones marked for removal
    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    /// Bodies not marked for removal
    pub fn live(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values().filter(|b| !self.pending.contains(&b.id))
    }

    /// Snapshot of live ids in a category, for iterating while mutating
    pub fn live_ids(&self, category: Category) -> Vec<BodyId> {
        self.live().filter(|b| b.category == category).map(|b| b.id).collect()
    }

    /// Snapshot of live attractor ids (suns and black holes)
    pub fn live_attractor_ids(&self) -> Vec<BodyId> {
        self.live()
            .filter(|b| matches!(b.category, Category::Attractor(_)))
            .map(|b| b.id)
            .collect()
    }

    /// Number of live bodies in a category
    pub fn count(&self, category: Category) -> usize {
        self.live().filter(|b| b.category == category).count()
    }

    /// Number of bodies (marked or not) in a category
    pub fn count_all(&self, category: Category) -> usize {
        self.bodies.values().filter(|b| b.category == category).count()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Mark a body for removal at the end of the frame
    ///
    /// Returns true if this call marked it. Marks are never undone.
    pub fn mark(&mut self, id: BodyId) -> bool {
        self.bodies.contains_key(&id) && self.pending.insert(id)
    }

    pub fn is_marked(&self, id: BodyId) -> bool {
        self.pending.contains(&id)
    }

    /// Is `id` present and not marked?
    pub fn is_live(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id) && !self.pending.contains(&id)
    }

    /// Delete every marked body, returning them in id order
    pub fn apply_removals(&mut self) -> Vec<Body> {
        let pending = std::mem::take(&mut self.pending);
        pending.into_iter().filter_map(|id| self.bodies.remove(&id)).collect()
    }
}
