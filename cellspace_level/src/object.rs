// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Objects, their role hitboxes, and the behavior hooks they expose.

use kurbo::{Point, Vec2};

use crate::error::{LevelError, Result};
use crate::render::Canvas;
use crate::types::{HitboxId, ObjectId, Roles, StateId, next_serial};
use crate::world::World;

/// Game-side reactions to an object's lifecycle.
///
/// Every hook has an empty default. Hooks that take `&mut World` run while
/// the behavior is lifted out of its object, so a hook may freely call back
/// into the world, including on its own object; nested hooks for the same
/// object are skipped.
pub trait Behavior {
    /// The object just entered `state`.
    fn added(&mut self, _world: &mut World, _object: ObjectId, _state: StateId) {}

    /// The object is about to leave `state`; it is still a member.
    fn removed(&mut self, _world: &mut World, _object: ObjectId, _state: StateId) {}

    /// Runs for every thinker of a state before any of them moves.
    fn before_movement(&mut self, _world: &mut World, _object: ObjectId) {}

    /// Runs for every thinker of a state after all of them have moved.
    fn after_movement(&mut self, _world: &mut World, _object: ObjectId) {}

    /// A free hitbox joined the object to take a role.
    fn hitbox_attached(&mut self, _world: &mut World, _object: ObjectId, _hitbox: HitboxId) {}

    /// A hitbox lost its last role and left the object.
    fn hitbox_detached(&mut self, _world: &mut World, _object: ObjectId, _hitbox: HitboxId) {}

    /// Paint the object with its locator at screen position `(x, y)`.
    fn draw(&self, _world: &World, _object: ObjectId, _canvas: &mut dyn Canvas, _x: i32, _y: i32) {}
}

impl Behavior for () {}

/// Movement data carried by thinker objects.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Motion {
    pub(crate) movement_priority: i32,
    pub(crate) velocity: Vec2,
    pub(crate) displacement: Vec2,
    pub(crate) collision: Option<HitboxId>,
    pub(crate) has_collision: bool,
}

/// A requested but not yet applied change of state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PendingChange {
    pub(crate) id: u64,
    pub(crate) to: Option<StateId>,
}

/// Per-object storage in the arena.
pub(crate) struct ObjectNode {
    pub(crate) id: ObjectId,
    pub(crate) state: Option<StateId>,
    pub(crate) pending: Option<PendingChange>,
    pub(crate) locator: HitboxId,
    pub(crate) overlap: Option<HitboxId>,
    pub(crate) solid: Option<HitboxId>,
    pub(crate) draw_layer: i32,
    pub(crate) time_factor: f64,
    pub(crate) behavior: Option<Box<dyn Behavior>>,
    pub(crate) motion: Option<Motion>,
}

impl core::fmt::Debug for ObjectNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectNode")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("locator", &self.locator)
            .field("draw_layer", &self.draw_layer)
            .field("motion", &self.motion)
            .finish_non_exhaustive()
    }
}

impl ObjectNode {
    /// The state the object will be in once pending changes apply.
    pub(crate) fn destination(&self) -> Option<StateId> {
        self.pending.map_or(self.state, |p| p.to)
    }

    pub(crate) fn has_collision(&self) -> bool {
        self.motion.is_some_and(|m| m.has_collision)
    }

    fn role_hitbox(&self, role: Roles) -> Option<HitboxId> {
        if role == Roles::LOCATOR {
            Some(self.locator)
        } else if role == Roles::OVERLAP {
            self.overlap
        } else if role == Roles::SOLID {
            self.solid
        } else {
            self.motion.and_then(|m| m.collision)
        }
    }

    fn set_role_hitbox(&mut self, role: Roles, hitbox: Option<HitboxId>) {
        if role == Roles::OVERLAP {
            self.overlap = hitbox;
        } else if role == Roles::SOLID {
            self.solid = hitbox;
        } else if role == Roles::COLLISION
            && let Some(motion) = &mut self.motion
        {
            motion.collision = hitbox;
        }
    }
}

impl World {
    /// Create an object positioned by `locator`, which must be a free hitbox.
    ///
    /// The object starts in no state.
    pub fn create_object(
        &mut self,
        locator: HitboxId,
        draw_layer: i32,
        behavior: impl Behavior + 'static,
    ) -> Result<ObjectId> {
        self.insert_object(locator, draw_layer, Box::new(behavior), None)
    }

    /// Create a thinker: an object that moves each step in
    /// `(movement_priority, id)` order and receives movement hooks.
    pub fn create_thinker(
        &mut self,
        locator: HitboxId,
        draw_layer: i32,
        movement_priority: i32,
        behavior: impl Behavior + 'static,
    ) -> Result<ObjectId> {
        let motion = Motion {
            movement_priority,
            velocity: Vec2::ZERO,
            displacement: Vec2::ZERO,
            collision: None,
            has_collision: false,
        };
        self.insert_object(locator, draw_layer, Box::new(behavior), Some(motion))
    }

    fn insert_object(
        &mut self,
        locator: HitboxId,
        draw_layer: i32,
        behavior: Box<dyn Behavior>,
        motion: Option<Motion>,
    ) -> Result<ObjectId> {
        if !self
            .hitbox(locator)
            .is_some_and(|n| n.parent.is_none() && n.object.is_none())
        {
            return Err(LevelError::HitboxUnavailable(locator));
        }
        let slot = self.objects.next_slot();
        let id = ObjectId {
            serial: next_serial(),
            slot,
        };
        self.objects.put(
            slot,
            ObjectNode {
                id,
                state: None,
                pending: None,
                locator,
                overlap: None,
                solid: None,
                draw_layer,
                time_factor: 1.0,
                behavior: Some(behavior),
                motion,
            },
        );
        self.set_owner(locator, Some(id), None);
        self.hb_mut(locator).roles |= Roles::LOCATOR;
        self.with_behavior(id, |b, w| b.hitbox_attached(w, id, locator));
        Ok(id)
    }

    /// Destroy an object that is in no state and has no pending move.
    ///
    /// Its hitboxes lose their roles and remain as free hitbox trees.
    pub fn destroy_object(&mut self, object: ObjectId) -> bool {
        let Some(obj) = self.object(object) else {
            return false;
        };
        if obj.state.is_some() || obj.pending.is_some() {
            return false;
        }
        let locator = obj.locator;
        let mut released = vec![locator];
        for role in [Roles::OVERLAP, Roles::SOLID, Roles::COLLISION] {
            if let Some(h) = obj.role_hitbox(role)
                && h != locator
                && !released.contains(&h)
            {
                released.push(h);
            }
        }
        for &h in &released[1..] {
            self.detach(h);
        }
        for &h in &released {
            self.hb_mut(h).roles = Roles::empty();
            self.set_owner(h, None, None);
        }
        self.objects.take(object.slot);
        true
    }

    /// Lift the behavior out of `object`, run `f` with the world, and put it
    /// back if the object still exists.
    pub(crate) fn with_behavior(
        &mut self,
        object: ObjectId,
        f: impl FnOnce(&mut dyn Behavior, &mut Self),
    ) {
        let Some(mut behavior) = self.object_mut(object).and_then(|o| o.behavior.take()) else {
            return;
        };
        f(behavior.as_mut(), self);
        if let Some(o) = self.object_mut(object) {
            o.behavior = Some(behavior);
        }
    }

    /// Replace the object's behavior.
    pub fn set_behavior(&mut self, object: ObjectId, behavior: impl Behavior + 'static) {
        if let Some(o) = self.object_mut(object) {
            o.behavior = Some(Box::new(behavior));
        }
    }

    // --- Role hitboxes ---

    /// The hitbox that positions the object.
    pub fn locator_hitbox(&self, object: ObjectId) -> Option<HitboxId> {
        self.object(object).map(|o| o.locator)
    }

    /// The hitbox tested by overlap queries.
    pub fn overlap_hitbox(&self, object: ObjectId) -> Option<HitboxId> {
        self.object(object).and_then(|o| o.overlap)
    }

    /// The hitbox exposing solid surfaces.
    pub fn solid_hitbox(&self, object: ObjectId) -> Option<HitboxId> {
        self.object(object).and_then(|o| o.solid)
    }

    /// The thinker's collision hitbox.
    pub fn collision_hitbox(&self, object: ObjectId) -> Option<HitboxId> {
        self.object(object).and_then(|o| o.role_hitbox(Roles::COLLISION))
    }

    /// Whether `hitbox` may take a role for `object`.
    fn role_candidate(&self, object: ObjectId, hitbox: HitboxId) -> bool {
        let (Some(obj), Some(node)) = (self.object(object), self.hitbox(hitbox)) else {
            return false;
        };
        hitbox == obj.locator
            || (node.parent.is_none() && node.object.is_none())
            || (node.parent == Some(obj.locator)
                && node.object == Some(object)
                && node.component_of.is_none())
    }

    /// Point a non-locator role at `hitbox`, or clear it with `None`.
    fn set_role(&mut self, object: ObjectId, role: Roles, hitbox: Option<HitboxId>) -> bool {
        let Some(obj) = self.object(object) else {
            return false;
        };
        if role == Roles::COLLISION && obj.motion.is_none() {
            return false;
        }
        let current = obj.role_hitbox(role);
        let locator = obj.locator;
        if current == hitbox {
            return false;
        }
        if let Some(h) = hitbox {
            if !self.role_candidate(object, h) {
                return false;
            }
            let joining = self.hb(h).object.is_none();
            if joining {
                self.attach(locator, h);
            }
            self.hb_mut(h).roles |= role;
            self.obj_mut(object).set_role_hitbox(role, Some(h));
            self.sync_buckets(h);
            if joining {
                self.with_behavior(object, |b, w| b.hitbox_attached(w, object, h));
            }
        } else {
            self.obj_mut(object).set_role_hitbox(role, None);
        }
        if let Some(old) = current {
            self.release_role(object, old, role);
        }
        true
    }

    /// Drop `role` from `hitbox`; a non-locator left with no roles and no
    /// children leaves the object.
    fn release_role(&mut self, object: ObjectId, hitbox: HitboxId, role: Roles) {
        let locator = self.obj(object).locator;
        self.hb_mut(hitbox).roles.remove(role);
        self.sync_buckets(hitbox);
        let node = self.hb(hitbox);
        if hitbox != locator && node.roles.is_empty() && node.children.is_empty() {
            self.detach(hitbox);
            self.with_behavior(object, |b, w| b.hitbox_detached(w, object, hitbox));
        }
    }

    /// Set the hitbox tested by overlap queries.
    ///
    /// The hitbox must be free, the locator, or a direct non-component child
    /// of the locator. Setting the current hitbox again returns `false`.
    pub fn set_overlap_hitbox(&mut self, object: ObjectId, hitbox: Option<HitboxId>) -> bool {
        self.set_role(object, Roles::OVERLAP, hitbox)
    }

    /// Set the hitbox exposing solid surfaces; same rules as
    /// [`World::set_overlap_hitbox`].
    pub fn set_solid_hitbox(&mut self, object: ObjectId, hitbox: Option<HitboxId>) -> bool {
        self.set_role(object, Roles::SOLID, hitbox)
    }

    /// Set a thinker's collision hitbox; same rules as
    /// [`World::set_overlap_hitbox`]. Always `false` for plain objects.
    pub fn set_collision_hitbox(&mut self, object: ObjectId, hitbox: Option<HitboxId>) -> bool {
        self.set_role(object, Roles::COLLISION, hitbox)
    }

    /// Replace the locator with a free hitbox.
    ///
    /// The new locator adopts the old one's non-component children and any
    /// other roles it held; the old locator is left as a free hitbox.
    pub fn set_locator_hitbox(&mut self, object: ObjectId, hitbox: HitboxId) -> bool {
        let Some(obj) = self.object(object) else {
            return false;
        };
        let old = obj.locator;
        let state = obj.state;
        if hitbox == old
            || !self
                .hitbox(hitbox)
                .is_some_and(|n| n.parent.is_none() && n.object.is_none())
        {
            return false;
        }
        let moved: Vec<HitboxId> = self
            .hb(old)
            .children
            .iter()
            .copied()
            .filter(|c| self.hb(*c).component_of.is_none())
            .collect();
        let roles = self.hb(old).roles;

        self.hb_mut(old).children.retain(|c| !moved.contains(c));
        self.hb_mut(old).roles = Roles::empty();
        self.set_owner(old, None, None);
        self.refresh(old);

        let obj = self.obj_mut(object);
        obj.locator = hitbox;
        for role in [Roles::OVERLAP, Roles::SOLID, Roles::COLLISION] {
            if obj.role_hitbox(role) == Some(old) {
                obj.set_role_hitbox(role, Some(hitbox));
            }
        }
        for &child in &moved {
            self.hb_mut(child).parent = Some(hitbox);
        }
        self.hb_mut(hitbox).children.extend(moved);
        self.hb_mut(hitbox).roles = roles;
        self.set_owner(hitbox, Some(object), state);
        self.refresh(hitbox);

        self.with_behavior(object, |b, w| {
            b.hitbox_detached(w, object, old);
            b.hitbox_attached(w, object, hitbox);
        });
        true
    }

    // --- Placement ---

    /// The object's position: its locator's position.
    pub fn position(&self, object: ObjectId) -> Option<Point> {
        self.object(object)
            .and_then(|o| self.abs_position(o.locator))
    }

    /// Move the object by moving its locator.
    pub fn set_position(&mut self, object: ObjectId, position: Point) {
        if let Some(locator) = self.locator_hitbox(object) {
            self.set_rel_position(locator, position);
        }
    }

    /// Draw layer of the locator; lower layers are drawn first.
    pub fn draw_layer(&self, object: ObjectId) -> Option<i32> {
        self.object(object).map(|o| o.draw_layer)
    }

    /// Change the draw layer, re-sorting the locator in its cells.
    pub fn set_draw_layer(&mut self, object: ObjectId, draw_layer: i32) {
        let Some(obj) = self.object_mut(object) else {
            return;
        };
        obj.draw_layer = draw_layer;
        let locator = obj.locator;
        self.sync_buckets(locator);
    }

    /// Per-object time scale applied to movement.
    pub fn object_time_factor(&self, object: ObjectId) -> Option<f64> {
        self.object(object).map(|o| o.time_factor)
    }

    /// Set the per-object time scale.
    pub fn set_object_time_factor(&mut self, object: ObjectId, time_factor: f64) {
        if let Some(o) = self.object_mut(object) {
            o.time_factor = time_factor;
        }
    }

    /// The state the object is currently in.
    pub fn object_state(&self, object: ObjectId) -> Option<StateId> {
        self.object(object).and_then(|o| o.state)
    }

    /// The state the object will be in once pending changes apply.
    pub fn object_destination(&self, object: ObjectId) -> Option<StateId> {
        self.object(object).and_then(ObjectNode::destination)
    }

    // --- Thinker data ---

    /// Whether the object was created with [`World::create_thinker`].
    pub fn is_thinker(&self, object: ObjectId) -> bool {
        self.object(object).is_some_and(|o| o.motion.is_some())
    }

    fn motion(&self, object: ObjectId) -> Option<&Motion> {
        self.object(object).and_then(|o| o.motion.as_ref())
    }

    fn motion_mut(&mut self, object: ObjectId) -> Option<&mut Motion> {
        self.object_mut(object).and_then(|o| o.motion.as_mut())
    }

    /// Movement priority; lower priorities move first.
    pub fn movement_priority(&self, object: ObjectId) -> Option<i32> {
        self.motion(object).map(|m| m.movement_priority)
    }

    /// Change the movement priority, re-sorting the state's thinkers.
    pub fn set_movement_priority(&mut self, object: ObjectId, movement_priority: i32) {
        let Some(obj) = self.object_mut(object) else {
            return;
        };
        let state = obj.state;
        let Some(motion) = &mut obj.motion else {
            return;
        };
        let old = core::mem::replace(&mut motion.movement_priority, movement_priority);
        if let Some(state) = state {
            let thinkers = &mut self.st_mut(state).thinkers;
            thinkers.remove(&(old, object));
            thinkers.insert((movement_priority, object));
        }
    }

    /// Velocity applied every step.
    pub fn velocity(&self, object: ObjectId) -> Option<Vec2> {
        self.motion(object).map(|m| m.velocity)
    }

    /// Set the velocity.
    pub fn set_velocity(&mut self, object: ObjectId, velocity: Vec2) {
        if let Some(m) = self.motion_mut(object) {
            m.velocity = velocity;
        }
    }

    /// Displacement to apply on the next step, then reset.
    pub fn displacement(&self, object: ObjectId) -> Option<Vec2> {
        self.motion(object).map(|m| m.displacement)
    }

    /// Set the pending displacement.
    pub fn set_displacement(&mut self, object: ObjectId, displacement: Vec2) {
        if let Some(m) = self.motion_mut(object) {
            m.displacement = displacement;
        }
    }

    /// Add to the pending displacement.
    pub fn change_displacement(&mut self, object: ObjectId, delta: Vec2) {
        if let Some(m) = self.motion_mut(object) {
            m.displacement += delta;
        }
    }

    /// Stop the thinker and aim its next step's displacement at `target`.
    pub fn move_to(&mut self, object: ObjectId, target: Point) {
        let Some(position) = self.position(object) else {
            return;
        };
        if let Some(m) = self.motion_mut(object) {
            m.velocity = Vec2::ZERO;
            m.displacement = target - position;
        }
    }

    /// Whether the collision hitbox is filed for solid-contact queries.
    pub fn has_collision(&self, object: ObjectId) -> bool {
        self.object(object).is_some_and(ObjectNode::has_collision)
    }

    /// Turn collision on or off for a thinker.
    pub fn set_collision(&mut self, object: ObjectId, has_collision: bool) {
        let Some(m) = self.motion_mut(object) else {
            return;
        };
        m.has_collision = has_collision;
        if let Some(h) = m.collision {
            self.sync_buckets(h);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use kurbo::Point;

    use crate::{LevelConfig, Shape};

    use super::*;

    #[derive(Clone, Default)]
    struct Log(Rc<RefCell<Vec<String>>>);

    impl Log {
        fn take(&self) -> Vec<String> {
            core::mem::take(&mut *self.0.borrow_mut())
        }
    }

    impl Behavior for Log {
        fn hitbox_attached(&mut self, _world: &mut World, _object: ObjectId, hitbox: HitboxId) {
            self.0.borrow_mut().push(format!("attached {}", hitbox.serial()));
        }

        fn hitbox_detached(&mut self, _world: &mut World, _object: ObjectId, hitbox: HitboxId) {
            self.0.borrow_mut().push(format!("detached {}", hitbox.serial()));
        }
    }

    #[test]
    fn locator_must_be_free() {
        let mut world = World::new();
        let parent = world.create_hitbox(Point::ORIGIN, Shape::Point);
        let child = world.create_hitbox(Point::ORIGIN, Shape::Point);
        assert!(world.add_child(parent, child));
        assert_eq!(
            world.create_object(child, 0, ()),
            Err(LevelError::HitboxUnavailable(child))
        );
        let object = world.create_object(parent, 0, ()).unwrap();
        assert_eq!(world.object_of(child), Some(object));
        assert_eq!(world.roles(parent), Roles::LOCATOR);
        assert!(world.create_object(parent, 0, ()).is_err());
    }

    #[test]
    fn role_hitboxes_join_and_leave() {
        let mut world = World::new();
        let log = Log::default();
        let locator = world.create_hitbox(Point::new(50.0, 50.0), Shape::Point);
        let object = world.create_object(locator, 0, log.clone()).unwrap();
        assert_eq!(log.take(), [format!("attached {}", locator.serial())]);

        let sensor = world.create_hitbox(Point::new(0.0, -8.0), Shape::Circle { radius: 4.0 });
        assert!(world.set_overlap_hitbox(object, Some(sensor)));
        assert!(!world.set_overlap_hitbox(object, Some(sensor)));
        assert_eq!(world.parent(sensor), Some(locator));
        assert_eq!(world.abs_position(sensor), Some(Point::new(50.0, 42.0)));
        assert_eq!(world.roles(sensor), Roles::OVERLAP);

        // The same child can take a second role.
        assert!(world.set_solid_hitbox(object, Some(sensor)));
        assert_eq!(world.roles(sensor), Roles::OVERLAP | Roles::SOLID);
        assert!(world.set_overlap_hitbox(object, None));
        assert_eq!(world.parent(sensor), Some(locator));
        assert!(world.set_solid_hitbox(object, None));
        assert_eq!(world.parent(sensor), None);
        assert_eq!(world.object_of(sensor), None);
        assert_eq!(
            log.take(),
            [
                format!("attached {}", sensor.serial()),
                format!("detached {}", sensor.serial())
            ]
        );

        // The locator itself never detaches.
        assert!(world.set_overlap_hitbox(object, Some(locator)));
        assert!(world.set_overlap_hitbox(object, None));
        assert_eq!(world.object_of(locator), Some(object));
        assert_eq!(world.roles(locator), Roles::LOCATOR);
    }

    #[test]
    fn role_candidates_are_restricted() {
        let mut world = World::new();
        let a = world.create_hitbox(Point::ORIGIN, Shape::Point);
        let b = world.create_hitbox(Point::ORIGIN, Shape::Point);
        let oa = world.create_object(a, 0, ()).unwrap();
        let ob = world.create_object(b, 0, ()).unwrap();
        // Another object's locator.
        assert!(!world.set_overlap_hitbox(oa, Some(b)));

        // A grandchild of the locator.
        let child = world.create_hitbox(Point::ORIGIN, Shape::Point);
        let grandchild = world.create_hitbox(Point::ORIGIN, Shape::Point);
        assert!(world.add_child(a, child));
        assert!(world.add_child(child, grandchild));
        assert!(!world.set_solid_hitbox(oa, Some(grandchild)));
        assert!(world.set_solid_hitbox(oa, Some(child)));

        // Collision roles need a thinker.
        let free = world.create_hitbox(Point::ORIGIN, Shape::Point);
        assert!(!world.set_collision_hitbox(ob, Some(free)));
        assert_eq!(world.object_of(free), None);
    }

    #[test]
    fn replacing_the_locator_moves_children() {
        let mut world = World::new();
        let old = world.create_hitbox(Point::new(10.0, 10.0), Shape::Point);
        let object = world.create_object(old, 0, ()).unwrap();
        let sensor = world.create_hitbox(Point::new(1.0, 0.0), Shape::Point);
        assert!(world.set_overlap_hitbox(object, Some(sensor)));
        assert!(world.set_solid_hitbox(object, Some(old)));

        let new = world.create_hitbox(Point::new(100.0, 0.0), Shape::Point);
        assert!(world.set_locator_hitbox(object, new));
        assert_eq!(world.locator_hitbox(object), Some(new));
        assert_eq!(world.solid_hitbox(object), Some(new));
        assert_eq!(world.roles(new), Roles::LOCATOR | Roles::SOLID);
        assert_eq!(world.parent(sensor), Some(new));
        assert_eq!(world.abs_position(sensor), Some(Point::new(101.0, 0.0)));
        assert_eq!(world.object_of(old), None);
        assert!(world.children(old).is_empty());
        assert_eq!(world.position(object), Some(Point::new(100.0, 0.0)));
    }

    #[test]
    fn destroying_an_object_frees_its_hitboxes() {
        let mut world = World::new();
        let state = world.create_state(&LevelConfig::default()).unwrap();
        let locator = world.create_hitbox(Point::ORIGIN, Shape::Point);
        let object = world.create_thinker(locator, 0, 0, ()).unwrap();
        let body = world.create_hitbox(Point::ORIGIN, Shape::Circle { radius: 2.0 });
        assert!(world.set_collision_hitbox(object, Some(body)));

        assert!(world.add_object(state, object));
        assert!(!world.destroy_object(object));
        assert!(world.remove_object(state, object));
        assert!(world.destroy_object(object));
        assert!(!world.object_is_alive(object));
        assert_eq!(world.object_of(locator), None);
        assert_eq!(world.parent(body), None);
        assert_eq!(world.roles(body), Roles::empty());
        assert!(world.destroy_hitbox(body));
    }

    #[test]
    fn thinker_settings() {
        let mut world = World::new();
        let state = world.create_state(&LevelConfig::default()).unwrap();
        let locator = world.create_hitbox(Point::new(5.0, 5.0), Shape::Point);
        let thinker = world.create_thinker(locator, 0, 3, ()).unwrap();
        assert!(world.is_thinker(thinker));
        assert_eq!(world.movement_priority(thinker), Some(3));
        assert!(!world.has_collision(thinker));

        world.set_velocity(thinker, Vec2::new(1.0, 0.0));
        world.move_to(thinker, Point::new(8.0, 1.0));
        assert_eq!(world.velocity(thinker), Some(Vec2::ZERO));
        assert_eq!(world.displacement(thinker), Some(Vec2::new(3.0, -4.0)));
        world.change_displacement(thinker, Vec2::new(1.0, 1.0));
        assert_eq!(world.displacement(thinker), Some(Vec2::new(4.0, -3.0)));

        assert!(world.add_object(state, thinker));
        world.set_movement_priority(thinker, -2);
        assert_eq!(
            world.st(state).thinkers.iter().copied().collect::<Vec<_>>(),
            [(-2, thinker)]
        );

        let body = world.create_hitbox(Point::ORIGIN, Shape::Circle { radius: 1.0 });
        assert!(world.set_collision_hitbox(thinker, Some(body)));
        let b = world.bounds(body).unwrap();
        let range = world.st(state).grid.range_inclusive(b.x0, b.y0, b.x1, b.y1);
        assert_eq!(world.cell_range(body), None);
        assert!(world.st(state).grid.collision_in(range).is_empty());
        world.set_collision(thinker, true);
        assert_eq!(world.st(state).grid.collision_in(range), [body]);

        let plain_locator = world.create_hitbox(Point::ORIGIN, Shape::Point);
        let plain = world.create_object(plain_locator, 0, ()).unwrap();
        assert!(!world.is_thinker(plain));
        assert_eq!(world.velocity(plain), None);
    }
}
