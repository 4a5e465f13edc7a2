// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keeping each hitbox's grid membership in step with its roles and bounds.

use cellspace_index::{Buckets, CellRange};
use log::{debug, trace};

use crate::config::validate_cell_dimensions;
use crate::error::Result;
use crate::types::{HitboxId, Roles, StateId};
use crate::world::World;

/// Where and how a hitbox is currently filed in a state's grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CellMembership {
    pub(crate) state: StateId,
    pub(crate) range: CellRange,
    pub(crate) buckets: Buckets,
    pub(crate) layer: i32,
}

impl World {
    /// The buckets a hitbox belongs in right now, with its draw layer.
    fn desired_buckets(&self, id: HitboxId) -> (Buckets, i32) {
        let node = self.hb(id);
        let object = match (node.state, node.object) {
            (Some(_), Some(object)) => self.obj(object),
            _ => return (Buckets::empty(), 0),
        };
        let mut buckets = Buckets::empty();
        if node.roles.contains(Roles::LOCATOR) {
            buckets |= Buckets::LOCATOR;
        }
        if node.roles.contains(Roles::OVERLAP) {
            buckets |= Buckets::OVERLAP;
        }
        if node.roles.contains(Roles::SOLID) {
            buckets |= Buckets::solid_surfaces(node.solid_surfaces);
        }
        if node.roles.contains(Roles::COLLISION) && object.has_collision() {
            buckets |= Buckets::COLLISION;
        }
        (buckets, object.draw_layer)
    }

    /// Bring one hitbox's grid membership up to date.
    ///
    /// Only the buckets that changed are touched, and a moved hitbox is
    /// relocated through the difference of its old and new ranges.
    pub(crate) fn sync_buckets(&mut self, id: HitboxId) {
        let (desired, layer) = self.desired_buckets(id);
        let node = self.hb(id);
        let state = node.state;
        let bounds = node.bounds;
        let mut current = node.cells;

        if let Some(old) = current
            && (Some(old.state) != state || desired.is_empty())
        {
            self.st_mut(old.state)
                .grid
                .remove(id, old.range, old.buckets, old.layer);
            current = None;
        }

        let next = match state {
            Some(state) if !desired.is_empty() => {
                let grid = &mut self.st_mut(state).grid;
                let range = grid.range_inclusive(bounds.x0, bounds.y0, bounds.x1, bounds.y1);
                match current {
                    None => grid.insert(id, range, desired, layer),
                    Some(old) => {
                        let kept = old.buckets & desired;
                        grid.remove(id, old.range, old.buckets - desired, old.layer);
                        if kept.contains(Buckets::LOCATOR) {
                            grid.change_layer(id, old.range, old.layer, layer);
                        }
                        if old.range != range {
                            trace!("relocating {id:?} from {:?} to {range:?}", old.range);
                        }
                        grid.relocate(id, old.range, range, kept, layer);
                        grid.insert(id, range, desired - old.buckets, layer);
                    }
                }
                Some(CellMembership {
                    state,
                    range,
                    buckets: desired,
                    layer,
                })
            }
            _ => None,
        };
        self.hb_mut(id).cells = next;
    }

    /// Change a state's cell size and rebuild its grid.
    pub fn set_cell_dimensions(
        &mut self,
        state: StateId,
        cell_width: f64,
        cell_height: f64,
    ) -> Result<()> {
        validate_cell_dimensions(cell_width, cell_height)?;
        debug!("{state:?}: cell size set to {cell_width} x {cell_height}");
        self.st_mut(state)
            .grid
            .set_dimensions(cell_width, cell_height);
        self.rebuild_cells(state);
        Ok(())
    }

    /// Width of a grid cell in `state`.
    pub fn cell_width(&self, state: StateId) -> f64 {
        self.st(state).grid.cell_width()
    }

    /// Height of a grid cell in `state`.
    pub fn cell_height(&self, state: StateId) -> f64 {
        self.st(state).grid.cell_height()
    }

    /// Drop every cell of `state` and re-index all of its objects.
    pub fn rebuild_cells(&mut self, state: StateId) {
        self.st_mut(state).grid.clear();
        let locators: Vec<HitboxId> = self
            .st(state)
            .objects
            .iter()
            .map(|object| self.obj(*object).locator)
            .collect();
        debug!("{state:?}: rebuilding cells for {} objects", locators.len());
        for locator in locators {
            for id in self.subtree(locator) {
                self.hb_mut(id).cells = None;
                self.sync_buckets(id);
            }
        }
    }
}
