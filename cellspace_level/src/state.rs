// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! States: membership, deferred changes, cursors and spatial queries.
//!
//! Adding, removing and moving objects never disturbs an open
//! [`ObjectCursor`]. A change is queued on every state it touches and applied
//! once none of those states has an open cursor, in request order.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use cellspace_index::{CellGrid, Direction};
use log::{debug, trace, warn};

use crate::config::LevelConfig;
use crate::error::Result;
use crate::object::PendingChange;
use crate::render::{Hud, Layer, Viewport};
use crate::types::{HitboxId, ObjectId, StateId};
use crate::world::World;

/// A queued move of an object into `to`, or out of every state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ObjectChange {
    pub(crate) object: ObjectId,
    pub(crate) to: Option<StateId>,
}

/// Per-state storage in the arena.
pub(crate) struct SpaceState {
    pub(crate) grid: CellGrid<HitboxId>,
    pub(crate) objects: BTreeSet<ObjectId>,
    /// Thinkers ordered by `(movement priority, id)`.
    pub(crate) thinkers: BTreeSet<(i32, ObjectId)>,
    pub(crate) queue: VecDeque<u64>,
    pub(crate) cursors: u32,
    /// Set while this state drains its queue.
    pub(crate) draining: bool,
    pub(crate) time_factor: f64,
    pub(crate) layers: BTreeMap<i32, Box<dyn Layer>>,
    pub(crate) viewports: BTreeMap<i32, Viewport>,
    pub(crate) hud: Option<Box<dyn Hud>>,
}

impl core::fmt::Debug for SpaceState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpaceState")
            .field("grid", &self.grid)
            .field("objects", &self.objects.len())
            .field("queue", &self.queue)
            .field("cursors", &self.cursors)
            .field("time_factor", &self.time_factor)
            .field("layers", &self.layers.keys().collect::<Vec<_>>())
            .field("viewports", &self.viewports)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Create a state from `config`.
    pub fn create_state(&mut self, config: &LevelConfig) -> Result<StateId> {
        config.validate()?;
        let mut viewports = BTreeMap::new();
        for vp in &config.viewports {
            viewports.insert(vp.id, Viewport::new(vp.x1, vp.y1, vp.x2, vp.y2)?);
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "State ids are 32-bit."
        )]
        let id = StateId(self.states.len() as u32);
        self.states.push(SpaceState {
            grid: CellGrid::new(config.cell_width, config.cell_height),
            objects: BTreeSet::new(),
            thinkers: BTreeSet::new(),
            queue: VecDeque::new(),
            cursors: 0,
            draining: false,
            time_factor: 1.0,
            layers: BTreeMap::new(),
            viewports,
            hud: None,
        });
        debug!(
            "created {id:?} with {} x {} cells",
            config.cell_width, config.cell_height
        );
        Ok(id)
    }

    /// Number of states created so far.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Global time scale of `state`; `step` does nothing while it is not positive.
    pub fn time_factor(&self, state: StateId) -> f64 {
        self.st(state).time_factor
    }

    /// Set the global time scale of `state`.
    pub fn set_time_factor(&mut self, state: StateId, time_factor: f64) {
        self.st_mut(state).time_factor = time_factor;
    }

    // --- Membership ---

    /// Request that `object` join `state`.
    ///
    /// Returns `false` if the object is stale or already headed for some
    /// state. The change applies immediately unless a cursor is open on a
    /// state it touches.
    pub fn add_object(&mut self, state: StateId, object: ObjectId) -> bool {
        if !self.object(object).is_some_and(|o| o.destination().is_none()) {
            return false;
        }
        self.request_change(object, Some(state));
        true
    }

    /// Request that each of `objects` join `state`, in order.
    ///
    /// Each object is handled as by [`World::add_object`]; returns how many
    /// were accepted.
    pub fn add_objects(
        &mut self,
        state: StateId,
        objects: impl IntoIterator<Item = ObjectId>,
    ) -> usize {
        objects
            .into_iter()
            .filter(|object| self.add_object(state, *object))
            .count()
    }

    /// Request that `object` leave `state`.
    ///
    /// Returns `false` unless `state` is where the object is headed.
    pub fn remove_object(&mut self, state: StateId, object: ObjectId) -> bool {
        if !self
            .object(object)
            .is_some_and(|o| o.destination() == Some(state))
        {
            return false;
        }
        self.request_change(object, None);
        true
    }

    /// Request that `object` move to `to` in one step, or leave every
    /// state with `None`.
    ///
    /// Returns `false` if the object is stale or already headed for `to`.
    pub fn move_object(&mut self, object: ObjectId, to: Option<StateId>) -> bool {
        if !self.object(object).is_some_and(|o| o.destination() != to) {
            return false;
        }
        self.request_change(object, to);
        true
    }

    fn request_change(&mut self, object: ObjectId, to: Option<StateId>) {
        let obj = self.obj_mut(object);
        let from = obj.state;
        if let Some(previous) = obj.pending.take() {
            self.changes.remove(&previous.id);
        }
        if from == to {
            return;
        }
        let id = self.next_change;
        self.next_change += 1;
        self.changes.insert(id, ObjectChange { object, to });
        self.obj_mut(object).pending = Some(PendingChange { id, to });

        let touched: Vec<StateId> = match (from, to) {
            (Some(a), Some(b)) => vec![a, b],
            (a, b) => a.or(b).into_iter().collect(),
        };
        for &state in &touched {
            let st = self.st_mut(state);
            st.queue.push_back(id);
            if st.cursors > 0 {
                debug!("{state:?}: deferring change of {object:?} behind open cursors");
            }
        }
        for state in touched {
            self.drain(state);
        }
    }

    /// Apply queued changes of `state` until one of its cursors opens.
    pub(crate) fn drain(&mut self, state: StateId) {
        let st = self.st_mut(state);
        if st.cursors > 0 || st.draining {
            return;
        }
        st.draining = true;
        trace!("{state:?}: draining {} queued changes", st.queue.len());
        loop {
            if self.st(state).cursors > 0 {
                break;
            }
            let Some(id) = self.st_mut(state).queue.pop_front() else {
                break;
            };
            let Some(change) = self.changes.get(&id).copied() else {
                continue;
            };
            let from = self.object(change.object).and_then(|o| o.state);
            let blocked = [from, change.to]
                .into_iter()
                .flatten()
                .find(|s| *s != state && self.st(*s).cursors > 0);
            if let Some(blocked) = blocked {
                // Stays queued on the blocked state, which drains it later.
                self.st_mut(blocked).queue.push_back(id);
                continue;
            }
            self.changes.remove(&id);
            self.apply_change(id, change);
        }
        self.st_mut(state).draining = false;
    }

    fn apply_change(&mut self, id: u64, change: ObjectChange) {
        let object = change.object;
        let Some(from) = self.object(object).map(|o| o.state) else {
            return;
        };
        if let Some(from) = from {
            self.with_behavior(object, |b, w| b.removed(w, object, from));
            self.leave_state(object, from);
        }
        let obj = self.obj_mut(object);
        if obj.pending.is_some_and(|p| p.id == id) {
            obj.pending = None;
        }
        if let Some(to) = change.to {
            self.enter_state(object, to);
            self.with_behavior(object, |b, w| b.added(w, object, to));
        }
    }

    fn leave_state(&mut self, object: ObjectId, state: StateId) {
        let obj = self.obj_mut(object);
        obj.state = None;
        let locator = obj.locator;
        let priority = obj.motion.map(|m| m.movement_priority);
        let st = self.st_mut(state);
        st.objects.remove(&object);
        if let Some(priority) = priority {
            st.thinkers.remove(&(priority, object));
        }
        self.set_owner(locator, Some(object), None);
        self.refresh(locator);
        debug!("{object:?} left {state:?}");
    }

    fn enter_state(&mut self, object: ObjectId, state: StateId) {
        let obj = self.obj_mut(object);
        obj.state = Some(state);
        let locator = obj.locator;
        let priority = obj.motion.map(|m| m.movement_priority);
        let st = self.st_mut(state);
        st.objects.insert(object);
        if let Some(priority) = priority {
            st.thinkers.insert((priority, object));
        }
        self.set_owner(locator, Some(object), Some(state));
        self.refresh(locator);
        debug!("{object:?} entered {state:?}");
    }

    /// Close every cursor still counted on `state` and apply its queued
    /// changes. Use after an [`ObjectCursor`] was dropped unfinished.
    pub fn flush_changes(&mut self, state: StateId) {
        self.st_mut(state).cursors = 0;
        self.drain(state);
    }

    pub(crate) fn release_cursor(&mut self, state: StateId) {
        let st = self.st_mut(state);
        st.cursors = st.cursors.saturating_sub(1);
        self.drain(state);
    }

    /// Objects currently in `state`, by id.
    pub fn objects(&self, state: StateId) -> impl Iterator<Item = ObjectId> + '_ {
        self.st(state).objects.iter().copied()
    }

    /// Thinkers of `state` in movement order.
    pub fn thinkers(&self, state: StateId) -> impl Iterator<Item = ObjectId> + '_ {
        self.st(state).thinkers.iter().map(|(_, o)| *o)
    }

    /// Whether `object` is currently in `state`.
    pub fn contains_object(&self, state: StateId, object: ObjectId) -> bool {
        self.st(state).objects.contains(&object)
    }

    /// Number of objects currently in `state`.
    pub fn object_count(&self, state: StateId) -> usize {
        self.st(state).objects.len()
    }

    /// Open a cursor over the objects in `state`.
    ///
    /// Changes touching `state` are held until the cursor finishes.
    pub fn object_cursor(&mut self, state: StateId) -> ObjectCursor {
        let st = self.st_mut(state);
        st.cursors += 1;
        ObjectCursor {
            state,
            snapshot: st.objects.iter().copied().collect(),
            next: 0,
            current: None,
            finished: false,
        }
    }

    // --- Spatial queries ---

    /// Objects whose overlap hitbox overlaps `object`'s, by id.
    pub fn overlapping_objects(&self, object: ObjectId) -> Vec<ObjectId> {
        let Some((state, hitbox)) = self
            .object(object)
            .and_then(|o| Some((o.state?, o.overlap?)))
        else {
            return Vec::new();
        };
        let b = self.hb(hitbox).bounds;
        let grid = &self.st(state).grid;
        let mut found: Vec<ObjectId> = grid
            .overlap_in(grid.range_exclusive(b.x0, b.y0, b.x1, b.y1))
            .into_iter()
            .filter(|other| self.overlaps(hitbox, *other))
            .filter_map(|other| self.hb(other).object)
            .filter(|other| *other != object)
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Whether any other object's overlap hitbox overlaps `object`'s.
    pub fn is_overlapping(&self, object: ObjectId) -> bool {
        !self.overlapping_objects(object).is_empty()
    }

    /// Solid hitboxes whose `direction` surface touches `collision`, by id.
    pub fn solid_contacts(&self, collision: HitboxId, direction: Direction) -> Vec<HitboxId> {
        let Some(node) = self.hitbox(collision) else {
            return Vec::new();
        };
        let Some(state) = node.state else {
            return Vec::new();
        };
        let b = node.bounds;
        let grid = &self.st(state).grid;
        grid.solid_in(grid.range_exclusive(b.x0, b.y0, b.x1, b.y1), direction)
            .into_iter()
            .filter(|solid| self.intersects_solid(collision, *solid))
            .collect()
    }
}

/// A cursor over a snapshot of one state's objects.
///
/// While any cursor on a state is open, changes touching that state are
/// queued instead of applied, so the snapshot stays exact. A cursor closes
/// when [`ObjectCursor::next`] runs out or [`ObjectCursor::finish`] is
/// called; dropping an open cursor leaves the state held until
/// [`World::flush_changes`].
#[derive(Debug)]
pub struct ObjectCursor {
    state: StateId,
    snapshot: Vec<ObjectId>,
    next: usize,
    current: Option<ObjectId>,
    finished: bool,
}

impl ObjectCursor {
    /// The state this cursor walks.
    pub fn state(&self) -> StateId {
        self.state
    }

    /// Advance to the next object, closing the cursor at the end.
    pub fn next(&mut self, world: &mut World) -> Option<ObjectId> {
        if self.finished {
            return None;
        }
        let Some(&object) = self.snapshot.get(self.next) else {
            self.current = None;
            self.finish(world);
            return None;
        };
        self.next += 1;
        self.current = Some(object);
        Some(object)
    }

    /// Request removal of the object last returned by [`ObjectCursor::next`].
    /// It stays visible until the cursor closes.
    pub fn remove_current(&mut self, world: &mut World) -> bool {
        match self.current.take() {
            Some(object) if !self.finished => world.remove_object(self.state, object),
            _ => false,
        }
    }

    /// Close the cursor and apply changes it was holding.
    pub fn finish(&mut self, world: &mut World) {
        if !self.finished {
            self.finished = true;
            world.release_cursor(self.state);
        }
    }

    /// Whether the cursor is closed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Drop for ObjectCursor {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                "object cursor on {:?} dropped unfinished; changes stay queued until flushed",
                self.state
            );
        }
    }
}
