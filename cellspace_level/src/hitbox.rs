// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hitbox trees: creation, attachment, transforms, composites and surfaces.

use std::collections::BTreeMap;

use cellspace_geom::{Transform, normalize_angle};
use cellspace_index::{CellRange, Direction, Directions};
use kurbo::{Point, Rect};

use crate::cells::CellMembership;
use crate::shape::Shape;
use crate::types::{HitboxId, ObjectId, Roles, StateId, next_serial};
use crate::world::World;

/// Per-hitbox storage in the arena.
#[derive(Debug)]
pub(crate) struct HitboxNode {
    pub(crate) id: HitboxId,
    pub(crate) shape: Shape,
    /// Transform relative to the parent.
    pub(crate) rel: Transform,
    /// Cached world transform, composed from the parent chain.
    pub(crate) abs: Transform,
    /// Cached world edges.
    pub(crate) bounds: Rect,
    pub(crate) parent: Option<HitboxId>,
    pub(crate) children: Vec<HitboxId>,
    pub(crate) components: BTreeMap<String, HitboxId>,
    pub(crate) component_of: Option<HitboxId>,
    pub(crate) object: Option<ObjectId>,
    pub(crate) state: Option<StateId>,
    pub(crate) roles: Roles,
    pub(crate) solid_surfaces: Directions,
    /// Present while the hitbox is indexed in some state's grid.
    pub(crate) cells: Option<CellMembership>,
}

impl World {
    /// Create a free hitbox at `position` with no parent, object or roles.
    pub fn create_hitbox(&mut self, position: Point, shape: Shape) -> HitboxId {
        let slot = self.hitboxes.next_slot();
        let id = HitboxId {
            serial: next_serial(),
            slot,
        };
        let rel = Transform::at(position);
        let bounds = shape
            .bounds(&rel)
            .unwrap_or_else(|| Rect::from_points(position, position));
        self.hitboxes.put(
            slot,
            HitboxNode {
                id,
                shape,
                rel,
                abs: rel,
                bounds,
                parent: None,
                children: Vec::new(),
                components: BTreeMap::new(),
                component_of: None,
                object: None,
                state: None,
                roles: Roles::empty(),
                solid_surfaces: Directions::empty(),
                cells: None,
            },
        );
        id
    }

    /// Destroy a free hitbox and its whole subtree.
    ///
    /// Returns `false` if the hitbox is stale, has a parent, or belongs to an
    /// object.
    pub fn destroy_hitbox(&mut self, id: HitboxId) -> bool {
        match self.hitbox(id) {
            Some(node) if node.parent.is_none() && node.object.is_none() => {}
            _ => return false,
        }
        for hitbox in self.subtree(id) {
            self.hitboxes.take(hitbox.slot);
        }
        true
    }

    /// Pre-order list of `root` and its descendants.
    pub(crate) fn subtree(&self, root: HitboxId) -> Vec<HitboxId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.hb(id).children.iter().rev().copied());
        }
        out
    }

    // --- Tree structure ---

    /// Attach `child` under `parent`.
    ///
    /// Fails, leaving both hitboxes untouched, when either is stale, they
    /// are the same hitbox, the child already has a parent or an object,
    /// or the child is an ancestor of `parent`.
    pub fn add_child(&mut self, parent: HitboxId, child: HitboxId) -> bool {
        if !self.can_attach(parent, child) {
            return false;
        }
        self.attach(parent, child);
        true
    }

    /// Detach `child` from `parent`, leaving it a free hitbox.
    ///
    /// Fails when `child` is not a direct child of `parent`, holds a role,
    /// or is a component (use [`World::remove_component`] for those).
    pub fn remove_child(&mut self, parent: HitboxId, child: HitboxId) -> bool {
        match self.hitbox(child) {
            Some(node)
                if node.parent == Some(parent)
                    && node.roles.is_empty()
                    && node.component_of.is_none() =>
            {
                self.detach(child);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn can_attach(&self, parent: HitboxId, child: HitboxId) -> bool {
        let (Some(_), Some(node)) = (self.hitbox(parent), self.hitbox(child)) else {
            return false;
        };
        parent != child
            && node.parent.is_none()
            && node.object.is_none()
            && !self.is_ancestor(child, parent)
    }

    /// Whether `ancestor` appears on the parent chain of `of`.
    fn is_ancestor(&self, ancestor: HitboxId, of: HitboxId) -> bool {
        let mut next = self.hb(of).parent;
        while let Some(id) = next {
            if id == ancestor {
                return true;
            }
            next = self.hb(id).parent;
        }
        false
    }

    /// Link `child` under `parent`, adopt the parent's owner and refresh.
    pub(crate) fn attach(&mut self, parent: HitboxId, child: HitboxId) {
        let (object, state) = {
            let p = self.hb(parent);
            (p.object, p.state)
        };
        self.hb_mut(parent).children.push(child);
        self.hb_mut(child).parent = Some(parent);
        self.set_owner(child, object, state);
        self.refresh(child);
    }

    /// Unlink `child` from its parent and make it a free, unindexed tree.
    pub(crate) fn detach(&mut self, child: HitboxId) {
        let Some(parent) = self.hb(child).parent else {
            return;
        };
        self.hb_mut(parent).children.retain(|c| *c != child);
        self.hb_mut(child).parent = None;
        self.set_owner(child, None, None);
        self.refresh(child);
    }

    /// Set the owning object and state of a whole subtree. Grid membership
    /// catches up on the next [`World::refresh`].
    pub(crate) fn set_owner(
        &mut self,
        root: HitboxId,
        object: Option<ObjectId>,
        state: Option<StateId>,
    ) {
        for id in self.subtree(root) {
            let node = self.hb_mut(id);
            node.object = object;
            node.state = state;
        }
    }

    // --- Transform propagation ---

    /// Recompute absolute transforms and bounds below `root`, re-index every
    /// touched hitbox, and refresh the composites that contain `root`.
    pub(crate) fn refresh(&mut self, root: HitboxId) {
        let order = self.update_transforms(root);
        // Components come after their composite in pre-order, so a reverse
        // walk sees every component before the composite that unions it.
        for &id in order.iter().rev() {
            if self.hb(id).shape.is_composite() {
                self.update_composite_bounds(id);
            }
        }
        for &id in &order {
            self.sync_buckets(id);
        }
        let up = self.hb(root).component_of;
        self.refresh_composite_chain(up);
    }

    fn update_transforms(&mut self, root: HitboxId) -> Vec<HitboxId> {
        let parent_abs = self.hb(root).parent.map(|p| self.hb(p).abs);
        let mut order = Vec::new();
        let mut stack = vec![(root, parent_abs)];
        while let Some((id, parent_abs)) = stack.pop() {
            let node = self.hb_mut(id);
            node.abs = match parent_abs {
                Some(parent) => parent.then(&node.rel),
                None => node.rel,
            };
            if let Some(bounds) = node.shape.bounds(&node.abs) {
                node.bounds = bounds;
            }
            let abs = node.abs;
            stack.extend(node.children.iter().rev().map(|c| (*c, Some(abs))));
            order.push(id);
        }
        order
    }

    fn update_composite_bounds(&mut self, composite: HitboxId) {
        let node = self.hb(composite);
        let position = node.abs.position;
        let bounds = node
            .components
            .values()
            .map(|c| self.hb(*c).bounds)
            .reduce(|a, b| a.union(b))
            .unwrap_or_else(|| Rect::from_points(position, position));
        self.hb_mut(composite).bounds = bounds;
    }

    /// Walk up a chain of composites, re-unioning bounds and re-indexing.
    pub(crate) fn refresh_composite_chain(&mut self, mut next: Option<HitboxId>) {
        while let Some(composite) = next {
            self.update_composite_bounds(composite);
            self.sync_buckets(composite);
            next = self.hb(composite).component_of;
        }
    }

    fn update_rel(&mut self, id: HitboxId, f: impl FnOnce(&mut Transform)) {
        let Some(node) = self.hitbox_mut(id) else {
            return;
        };
        f(&mut node.rel);
        node.rel.angle = normalize_angle(node.rel.angle);
        self.refresh(id);
    }

    /// Move the hitbox relative to its parent.
    pub fn set_rel_position(&mut self, id: HitboxId, position: Point) {
        self.update_rel(id, |rel| rel.position = position);
    }

    /// Set the relative x coordinate.
    pub fn set_rel_x(&mut self, id: HitboxId, x: f64) {
        self.update_rel(id, |rel| rel.position.x = x);
    }

    /// Set the relative y coordinate.
    pub fn set_rel_y(&mut self, id: HitboxId, y: f64) {
        self.update_rel(id, |rel| rel.position.y = y);
    }

    /// Set the horizontal flip relative to the parent.
    pub fn set_rel_x_flip(&mut self, id: HitboxId, flip: bool) {
        self.update_rel(id, |rel| rel.x_flip = flip);
    }

    /// Set the vertical flip relative to the parent.
    pub fn set_rel_y_flip(&mut self, id: HitboxId, flip: bool) {
        self.update_rel(id, |rel| rel.y_flip = flip);
    }

    /// Set the rotation relative to the parent, in degrees.
    pub fn set_rel_angle(&mut self, id: HitboxId, angle: f64) {
        self.update_rel(id, |rel| rel.angle = angle);
    }

    /// Rotate by `delta` degrees relative to the current relative angle.
    pub fn change_rel_angle(&mut self, id: HitboxId, delta: f64) {
        self.update_rel(id, |rel| rel.angle += delta);
    }

    /// Replace the shape.
    ///
    /// Fails when the hitbox is stale, or is a composite with components
    /// and `shape` is not a composite.
    pub fn set_shape(&mut self, id: HitboxId, shape: Shape) -> bool {
        let Some(node) = self.hitbox_mut(id) else {
            return false;
        };
        if !node.components.is_empty() && !shape.is_composite() {
            return false;
        }
        node.shape = shape;
        self.refresh(id);
        true
    }

    // --- Queries ---

    /// Position relative to the parent.
    pub fn rel_position(&self, id: HitboxId) -> Option<Point> {
        self.hitbox(id).map(|n| n.rel.position)
    }

    /// World position.
    pub fn abs_position(&self, id: HitboxId) -> Option<Point> {
        self.hitbox(id).map(|n| n.abs.position)
    }

    /// Horizontal flip relative to the parent.
    pub fn rel_x_flip(&self, id: HitboxId) -> Option<bool> {
        self.hitbox(id).map(|n| n.rel.x_flip)
    }

    /// World horizontal flip.
    pub fn abs_x_flip(&self, id: HitboxId) -> Option<bool> {
        self.hitbox(id).map(|n| n.abs.x_flip)
    }

    /// Vertical flip relative to the parent.
    pub fn rel_y_flip(&self, id: HitboxId) -> Option<bool> {
        self.hitbox(id).map(|n| n.rel.y_flip)
    }

    /// World vertical flip.
    pub fn abs_y_flip(&self, id: HitboxId) -> Option<bool> {
        self.hitbox(id).map(|n| n.abs.y_flip)
    }

    /// Rotation relative to the parent, in `[0, 360)`.
    pub fn rel_angle(&self, id: HitboxId) -> Option<f64> {
        self.hitbox(id).map(|n| n.rel.angle)
    }

    /// World rotation, in `[0, 360)`.
    pub fn abs_angle(&self, id: HitboxId) -> Option<f64> {
        self.hitbox(id).map(|n| n.abs.angle)
    }

    /// World transform.
    pub fn abs_transform(&self, id: HitboxId) -> Option<Transform> {
        self.hitbox(id).map(|n| n.abs)
    }

    /// World left/top/right/bottom edges.
    pub fn bounds(&self, id: HitboxId) -> Option<Rect> {
        self.hitbox(id).map(|n| n.bounds)
    }

    /// The shape.
    pub fn shape(&self, id: HitboxId) -> Option<&Shape> {
        self.hitbox(id).map(|n| &n.shape)
    }

    /// Parent hitbox.
    pub fn parent(&self, id: HitboxId) -> Option<HitboxId> {
        self.hitbox(id).and_then(|n| n.parent)
    }

    /// Direct children, in attach order.
    pub fn children(&self, id: HitboxId) -> &[HitboxId] {
        self.hitbox(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// The object this hitbox's tree belongs to.
    pub fn object_of(&self, id: HitboxId) -> Option<ObjectId> {
        self.hitbox(id).and_then(|n| n.object)
    }

    /// The state this hitbox's object is in.
    pub fn state_of(&self, id: HitboxId) -> Option<StateId> {
        self.hitbox(id).and_then(|n| n.state)
    }

    /// Roles held for the owning object. Empty for stale ids.
    pub fn roles(&self, id: HitboxId) -> Roles {
        self.hitbox(id).map_or(Roles::empty(), |n| n.roles)
    }

    /// Cells the hitbox is indexed in, or `None` when not indexed.
    pub fn cell_range(&self, id: HitboxId) -> Option<CellRange> {
        self.hitbox(id).and_then(|n| n.cells).map(|m| m.range)
    }

    /// Distance between the world positions of two hitboxes.
    pub fn distance_between(&self, a: HitboxId, b: HitboxId) -> Option<f64> {
        Some(cellspace_geom::distance_between(
            self.abs_position(a)?,
            self.abs_position(b)?,
        ))
    }

    /// Angle in degrees from `a`'s world position to `b`'s.
    pub fn angle_between(&self, a: HitboxId, b: HitboxId) -> Option<f64> {
        Some(cellspace_geom::angle_between(
            self.abs_position(a)?,
            self.abs_position(b)?,
        ))
    }

    // --- Composites ---

    /// Attach `hitbox` as the component `name` of `composite`, replacing any
    /// previous component of that name.
    ///
    /// Fails when `composite` is not a composite or `hitbox` cannot be
    /// attached under it (see [`World::add_child`]).
    pub fn set_component(
        &mut self,
        composite: HitboxId,
        name: impl Into<String>,
        hitbox: HitboxId,
    ) -> bool {
        if !self
            .hitbox(composite)
            .is_some_and(|n| n.shape.is_composite())
            || !self.can_attach(composite, hitbox)
        {
            return false;
        }
        let name = name.into();
        self.remove_component(composite, &name);
        self.hb_mut(composite).components.insert(name, hitbox);
        self.hb_mut(hitbox).component_of = Some(composite);
        self.attach(composite, hitbox);
        true
    }

    /// Detach and return the component `name`, leaving it a free hitbox.
    pub fn remove_component(&mut self, composite: HitboxId, name: &str) -> Option<HitboxId> {
        let component = self.hitbox_mut(composite)?.components.remove(name)?;
        self.hb_mut(component).component_of = None;
        self.detach(component);
        self.refresh_composite_chain(Some(composite));
        Some(component)
    }

    /// The component named `name`.
    pub fn component(&self, composite: HitboxId, name: &str) -> Option<HitboxId> {
        self.hitbox(composite)?.components.get(name).copied()
    }

    /// All components, ordered by name.
    pub fn components(&self, composite: HitboxId) -> impl Iterator<Item = (&str, HitboxId)> + '_ {
        self.hitbox(composite)
            .into_iter()
            .flat_map(|n| n.components.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    /// The composite this hitbox is a component of.
    pub fn component_of(&self, id: HitboxId) -> Option<HitboxId> {
        self.hitbox(id).and_then(|n| n.component_of)
    }

    // --- Solid surfaces ---

    /// Whether the surface facing `direction` is solid.
    pub fn surface_is_solid(&self, id: HitboxId, direction: Direction) -> bool {
        self.hitbox(id)
            .is_some_and(|n| n.solid_surfaces.contains(direction.into()))
    }

    /// All solid surfaces.
    pub fn solid_surfaces(&self, id: HitboxId) -> Directions {
        self.hitbox(id)
            .map_or(Directions::empty(), |n| n.solid_surfaces)
    }

    /// Mark one surface solid or passable.
    pub fn set_surface_solid(&mut self, id: HitboxId, direction: Direction, solid: bool) {
        let Some(node) = self.hitbox_mut(id) else {
            return;
        };
        node.solid_surfaces.set(direction.into(), solid);
        self.sync_buckets(id);
    }

    /// Mark every surface solid, or none.
    pub fn set_solid(&mut self, id: HitboxId, solid: bool) {
        let Some(node) = self.hitbox_mut(id) else {
            return;
        };
        node.solid_surfaces = if solid {
            Directions::all()
        } else {
            Directions::empty()
        };
        self.sync_buckets(id);
    }
}
