// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The arena that owns every hitbox, object and state.

use hashbrown::HashMap;

use crate::hitbox::HitboxNode;
use crate::object::ObjectNode;
use crate::state::{ObjectChange, SpaceState};
use crate::types::{HitboxId, ObjectId, StateId};

/// Slot storage with a free list. Liveness of a handle is checked by the
/// caller against the serial stored in the entry.
#[derive(Debug)]
pub(crate) struct Slab<T> {
    entries: Vec<Option<T>>,
    free: Vec<u32>,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Slab<T> {
    /// The slot the next [`Slab::put`] should use.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Handles use 32-bit slots by design."
    )]
    pub(crate) fn next_slot(&self) -> u32 {
        self.free
            .last()
            .copied()
            .unwrap_or(self.entries.len() as u32)
    }

    /// Store `value` in the slot returned by [`Slab::next_slot`].
    pub(crate) fn put(&mut self, slot: u32, value: T) {
        if self.free.last() == Some(&slot) {
            self.free.pop();
            self.entries[slot as usize] = Some(value);
        } else {
            debug_assert_eq!(slot as usize, self.entries.len(), "slot was not reserved");
            self.entries.push(Some(value));
        }
    }

    pub(crate) fn get(&self, slot: u32) -> Option<&T> {
        self.entries.get(slot as usize).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, slot: u32) -> Option<&mut T> {
        self.entries.get_mut(slot as usize).and_then(Option::as_mut)
    }

    pub(crate) fn take(&mut self, slot: u32) -> Option<T> {
        let value = self.entries.get_mut(slot as usize)?.take();
        if value.is_some() {
            self.free.push(slot);
        }
        value
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len() - self.free.len()
    }
}

/// Owner of all hitboxes, objects and states.
///
/// Every operation goes through `World` methods taking typed handles
/// ([`HitboxId`], [`ObjectId`], [`StateId`]). Handles to destroyed hitboxes
/// or objects are stale: getters return `None` and mutators do nothing.
/// States are never destroyed; using a [`StateId`] from another `World`
/// panics.
///
/// ## Example
///
/// ```rust
/// use cellspace_level::{LevelConfig, Shape, World};
/// use kurbo::Point;
///
/// let mut world = World::new();
/// let state = world.create_state(&LevelConfig::default()).unwrap();
///
/// let locator = world.create_hitbox(Point::new(10.0, 10.0), Shape::Circle { radius: 4.0 });
/// let object = world.create_object(locator, 0, ()).unwrap();
/// assert!(world.add_object(state, object));
/// assert!(world.contains_object(state, object));
/// assert_eq!(world.cell_range(locator).map(|r| r.len()), Some(1));
/// ```
#[derive(Default)]
pub struct World {
    pub(crate) hitboxes: Slab<HitboxNode>,
    pub(crate) objects: Slab<ObjectNode>,
    pub(crate) states: Vec<SpaceState>,
    pub(crate) changes: HashMap<u64, ObjectChange>,
    pub(crate) next_change: u64,
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("hitboxes", &self.hitboxes.len())
            .field("objects", &self.objects.len())
            .field("states", &self.states.len())
            .field("pending_changes", &self.changes.len())
            .finish_non_exhaustive()
    }
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` refers to a live hitbox.
    pub fn hitbox_is_alive(&self, id: HitboxId) -> bool {
        self.hitbox(id).is_some()
    }

    /// Whether `id` refers to a live object.
    pub fn object_is_alive(&self, id: ObjectId) -> bool {
        self.object(id).is_some()
    }

    pub(crate) fn hitbox(&self, id: HitboxId) -> Option<&HitboxNode> {
        self.hitboxes.get(id.slot).filter(|n| n.id == id)
    }

    pub(crate) fn hitbox_mut(&mut self, id: HitboxId) -> Option<&mut HitboxNode> {
        self.hitboxes.get_mut(id.slot).filter(|n| n.id == id)
    }

    /// Access a hitbox; panics if `id` is stale.
    pub(crate) fn hb(&self, id: HitboxId) -> &HitboxNode {
        self.hitbox(id).expect("dangling HitboxId")
    }

    /// Access a hitbox mutably; panics if `id` is stale.
    pub(crate) fn hb_mut(&mut self, id: HitboxId) -> &mut HitboxNode {
        self.hitbox_mut(id).expect("dangling HitboxId")
    }

    pub(crate) fn object(&self, id: ObjectId) -> Option<&ObjectNode> {
        self.objects.get(id.slot).filter(|n| n.id == id)
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Option<&mut ObjectNode> {
        self.objects.get_mut(id.slot).filter(|n| n.id == id)
    }

    pub(crate) fn obj(&self, id: ObjectId) -> &ObjectNode {
        self.object(id).expect("dangling ObjectId")
    }

    pub(crate) fn obj_mut(&mut self, id: ObjectId) -> &mut ObjectNode {
        self.object_mut(id).expect("dangling ObjectId")
    }

    pub(crate) fn st(&self, id: StateId) -> &SpaceState {
        self.states.get(id.idx()).expect("dangling StateId")
    }

    pub(crate) fn st_mut(&mut self, id: StateId) -> &mut SpaceState {
        self.states.get_mut(id.idx()).expect("dangling StateId")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slab_reuses_freed_slots() {
        let mut slab: Slab<&str> = Slab::default();
        let a = slab.next_slot();
        slab.put(a, "a");
        let b = slab.next_slot();
        slab.put(b, "b");
        assert_eq!((a, b), (0, 1));
        assert_eq!(slab.take(a), Some("a"));
        assert_eq!(slab.take(a), None);
        assert_eq!(slab.len(), 1);
        let c = slab.next_slot();
        assert_eq!(c, a);
        slab.put(c, "c");
        assert_eq!(slab.get(c), Some(&"c"));
        assert_eq!(slab.len(), 2);
    }
}
