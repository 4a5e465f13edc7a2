// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sparse cell grid keyed by integer coordinates.
//!
//! Cells are created the first time a key is filed into them and are never
//! dropped afterwards (only [`CellGrid::clear`] and
//! [`CellGrid::set_dimensions`] discard them). The grid does not remember
//! which range each key occupies: callers pass the old range back when
//! relocating or removing, which keeps updates O(old cells + new cells).

use alloc::collections::BinaryHeap;
use alloc::collections::btree_set;
use alloc::vec::Vec;
use core::cmp::Reverse;
use core::fmt::Debug;
use core::hash::Hash;
use core::iter::Peekable;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::cell::Cell;
use crate::types::{Buckets, CellCoord, CellRange, Direction};

/// Floor of `value / size` as a grid coordinate.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
)]
#[inline]
fn floor_coord(value: f64, size: f64) -> i32 {
    debug_assert!(size > 0.0, "grid cell size must be strictly positive");
    let t = value / size;
    let coord = t as i32;
    // Round towards -∞ (the cast above has already truncated).
    if t < 0.0 && f64::from(coord) > t {
        coord.saturating_sub(1)
    } else {
        coord
    }
}

/// Ceiling of `value / size` as a grid coordinate.
#[inline]
fn ceil_coord(value: f64, size: f64) -> i32 {
    floor_coord(-value, size).saturating_neg()
}

/// A sparse grid of [`Cell`]s with fixed cell width and height.
pub struct CellGrid<K> {
    cell_width: f64,
    cell_height: f64,
    cells: HashMap<CellCoord, Cell<K>>,
    bounds: Option<CellRange>,
}

impl<K> Debug for CellGrid<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CellGrid")
            .field("cell_width", &self.cell_width)
            .field("cell_height", &self.cell_height)
            .field("cells", &self.cells.len())
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Ord + Hash> CellGrid<K> {
    /// Create an empty grid. Both dimensions must be strictly positive.
    pub fn new(cell_width: f64, cell_height: f64) -> Self {
        debug_assert!(
            cell_width > 0.0 && cell_height > 0.0,
            "cell dimensions must be strictly positive"
        );
        Self {
            cell_width,
            cell_height,
            cells: HashMap::new(),
            bounds: None,
        }
    }

    /// Width of every cell.
    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    /// Height of every cell.
    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    /// Change the cell dimensions. All cells are discarded; callers re-file
    /// their keys against the new ranges.
    pub fn set_dimensions(&mut self, cell_width: f64, cell_height: f64) {
        debug_assert!(
            cell_width > 0.0 && cell_height > 0.0,
            "cell dimensions must be strictly positive"
        );
        self.cell_width = cell_width;
        self.cell_height = cell_height;
        self.clear();
    }

    /// Discard every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.bounds = None;
    }

    /// Every cell a box with the given edges touches, edges included.
    ///
    /// A box whose edge lies exactly on a cell boundary is filed in the cells
    /// on both sides of it.
    pub fn range_inclusive(&self, left: f64, top: f64, right: f64, bottom: f64) -> CellRange {
        CellRange::new(
            ceil_coord(left, self.cell_width).saturating_sub(1),
            ceil_coord(top, self.cell_height).saturating_sub(1),
            floor_coord(right, self.cell_width),
            floor_coord(bottom, self.cell_height),
        )
    }

    /// The cells a region covers without counting cells it merely touches.
    ///
    /// A region narrower than one cell boundary on an axis collapses to the
    /// two cells straddling it.
    pub fn range_exclusive(&self, left: f64, top: f64, right: f64, bottom: f64) -> CellRange {
        let mut range = CellRange::new(
            floor_coord(left, self.cell_width),
            floor_coord(top, self.cell_height),
            ceil_coord(right, self.cell_width).saturating_sub(1),
            ceil_coord(bottom, self.cell_height).saturating_sub(1),
        );
        if range.left > range.right {
            range.left = range.left.saturating_sub(1);
            range.right = range.right.saturating_add(1);
        }
        if range.top > range.bottom {
            range.top = range.top.saturating_sub(1);
            range.bottom = range.bottom.saturating_add(1);
        }
        range
    }

    /// Range of coordinates holding a cell, if any cell exists.
    pub fn bounds(&self) -> Option<CellRange> {
        self.bounds
    }

    /// Number of cells that exist.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// The cell at `coord`, if one has been created.
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell<K>> {
        self.cells.get(&coord)
    }

    /// Existing cells inside `range`, in row-major order.
    pub fn cells_in(&self, range: CellRange) -> impl Iterator<Item = (CellCoord, &Cell<K>)> + '_ {
        let range = self.clip(range);
        range
            .into_iter()
            .flat_map(|r| r.iter())
            .filter_map(|coord| self.cells.get(&coord).map(|cell| (coord, cell)))
    }

    /// File `key` under `buckets` in every cell of `range`, creating cells as needed.
    pub fn insert(&mut self, key: K, range: CellRange, buckets: Buckets, layer: i32) {
        if buckets.is_empty() {
            return;
        }
        for coord in range.iter() {
            self.cell_mut(coord).insert(key, buckets, layer);
        }
    }

    /// Remove `key` from `buckets` in every cell of `range`.
    pub fn remove(&mut self, key: K, range: CellRange, buckets: Buckets, layer: i32) {
        if buckets.is_empty() {
            return;
        }
        for coord in range.iter() {
            if let Some(cell) = self.cells.get_mut(&coord) {
                cell.remove(key, buckets, layer);
            }
        }
    }

    /// Move `key` from `old` to `new`, touching only cells in their difference.
    pub fn relocate(
        &mut self,
        key: K,
        old: CellRange,
        new: CellRange,
        buckets: Buckets,
        layer: i32,
    ) {
        if old == new || buckets.is_empty() {
            return;
        }
        for coord in old.iter().filter(|c| !new.contains(*c)) {
            if let Some(cell) = self.cells.get_mut(&coord) {
                cell.remove(key, buckets, layer);
            }
        }
        for coord in new.iter().filter(|c| !old.contains(*c)) {
            self.cell_mut(coord).insert(key, buckets, layer);
        }
    }

    /// Re-sort `key`'s locator entries after its draw layer changed.
    pub fn change_layer(&mut self, key: K, range: CellRange, old_layer: i32, new_layer: i32) {
        if old_layer == new_layer {
            return;
        }
        for coord in range.iter() {
            if let Some(cell) = self.cells.get_mut(&coord) {
                cell.change_layer(key, old_layer, new_layer);
            }
        }
    }

    /// Visit the locators of every cell in `range` in ascending
    /// `(draw layer, key)` order, reporting a key filed in several cells once.
    pub fn visit_locators<F: FnMut(i32, K)>(&self, range: CellRange, mut f: F) {
        let mut sources: SmallVec<[Peekable<Locators<'_, K>>; 4]> = self
            .cells_in(range)
            .map(|(_, cell)| cell.locator_entries().peekable())
            .collect();
        let mut last: Option<(i32, K)> = None;
        let mut emit = |entry: (i32, K)| {
            if last != Some(entry) {
                last = Some(entry);
                f(entry.0, entry.1);
            }
        };
        match sources.as_mut_slice() {
            [] => {}
            [only] => only.for_each(|e| emit(*e)),
            [a, b] => loop {
                let take_b = match (a.peek(), b.peek()) {
                    (Some(x), Some(y)) => y < x,
                    (Some(_), None) => false,
                    (None, Some(_)) => true,
                    (None, None) => break,
                };
                let next = if take_b { b.next() } else { a.next() };
                if let Some(entry) = next {
                    emit(*entry);
                }
            },
            many => {
                let mut heap = BinaryHeap::with_capacity(many.len());
                for (i, source) in many.iter_mut().enumerate() {
                    if let Some(entry) = source.next() {
                        heap.push(Reverse((*entry, i)));
                    }
                }
                while let Some(Reverse((entry, i))) = heap.pop() {
                    emit(entry);
                    if let Some(next) = many[i].next() {
                        heap.push(Reverse((*next, i)));
                    }
                }
            }
        }
    }

    /// Keys filed under the overlap bucket anywhere in `range`, sorted and deduplicated.
    pub fn overlap_in(&self, range: CellRange) -> Vec<K> {
        self.collect(range, |cell, out| out.extend(cell.overlap()))
    }

    /// Keys filed under the collision bucket anywhere in `range`, sorted and deduplicated.
    pub fn collision_in(&self, range: CellRange) -> Vec<K> {
        self.collect(range, |cell, out| out.extend(cell.collision()))
    }

    /// Keys with a solid `direction` surface anywhere in `range`, sorted and deduplicated.
    pub fn solid_in(&self, range: CellRange, direction: Direction) -> Vec<K> {
        self.collect(range, |cell, out| out.extend(cell.solid(direction)))
    }

    fn collect(&self, range: CellRange, mut gather: impl FnMut(&Cell<K>, &mut Vec<K>)) -> Vec<K> {
        let mut out = Vec::new();
        for (_, cell) in self.cells_in(range) {
            gather(cell, &mut out);
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    fn cell_mut(&mut self, coord: CellCoord) -> &mut Cell<K> {
        let single = CellRange::single(coord);
        self.bounds = Some(self.bounds.map_or(single, |b| b.union(&single)));
        self.cells.entry(coord).or_default()
    }

    /// Restrict `range` to the occupied bounds so huge query ranges stay cheap.
    fn clip(&self, range: CellRange) -> Option<CellRange> {
        let b = self.bounds?;
        let clipped = CellRange::new(
            range.left.max(b.left),
            range.top.max(b.top),
            range.right.min(b.right),
            range.bottom.min(b.bottom),
        );
        (!clipped.is_empty()).then_some(clipped)
    }
}

type Locators<'a, K> = btree_set::Iter<'a, (i32, K)>;
