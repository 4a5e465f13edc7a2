// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single grid cell and its role buckets.

use alloc::collections::{BTreeSet, btree_set};
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashSet;

use crate::types::{Buckets, Direction};

/// One bucket of the grid.
///
/// Locators are kept sorted by `(draw layer, key)` so a cell can be walked in
/// paint order; the other buckets are unordered sets.
pub struct Cell<K> {
    locators: BTreeSet<(i32, K)>,
    overlap: HashSet<K>,
    collision: HashSet<K>,
    solid: [HashSet<K>; 4],
}

impl<K> Default for Cell<K> {
    fn default() -> Self {
        Self {
            locators: BTreeSet::new(),
            overlap: HashSet::new(),
            collision: HashSet::new(),
            solid: [HashSet::new(), HashSet::new(), HashSet::new(), HashSet::new()],
        }
    }
}

impl<K> Debug for Cell<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cell")
            .field("locators", &self.locators.len())
            .field("overlap", &self.overlap.len())
            .field("collision", &self.collision.len())
            .field("solid", &self.solid.each_ref().map(HashSet::len))
            .finish()
    }
}

impl<K: Copy + Ord + Hash> Cell<K> {
    /// Locators in ascending `(draw layer, key)` order.
    pub fn locators(&self) -> impl Iterator<Item = (i32, K)> + '_ {
        self.locators.iter().copied()
    }

    /// Keys in the overlap bucket, unordered.
    pub fn overlap(&self) -> impl Iterator<Item = K> + '_ {
        self.overlap.iter().copied()
    }

    /// Keys in the collision bucket, unordered.
    pub fn collision(&self) -> impl Iterator<Item = K> + '_ {
        self.collision.iter().copied()
    }

    /// Keys whose `direction` surface is solid, unordered.
    pub fn solid(&self, direction: Direction) -> impl Iterator<Item = K> + '_ {
        self.solid[direction.index()].iter().copied()
    }

    /// Whether `key` is filed under every bucket in `buckets`.
    ///
    /// Locator membership matches `key` under any draw layer.
    pub fn contains(&self, key: K, buckets: Buckets) -> bool {
        (!buckets.contains(Buckets::LOCATOR) || self.locators.iter().any(|(_, k)| *k == key))
            && Direction::ALL
            .into_iter()
            .filter(|d| buckets.contains(Buckets::solid(*d)))
            .all(|d| self.solid[d.index()].contains(&key))
            && (!buckets.contains(Buckets::OVERLAP) || self.overlap.contains(&key))
            && (!buckets.contains(Buckets::COLLISION) || self.collision.contains(&key))
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
            && self.overlap.is_empty()
            && self.collision.is_empty()
            && self.solid.iter().all(HashSet::is_empty)
    }

    pub(crate) fn locator_entries(&self) -> btree_set::Iter<'_, (i32, K)> {
        self.locators.iter()
    }

    pub(crate) fn insert(&mut self, key: K, buckets: Buckets, layer: i32) {
        if buckets.contains(Buckets::LOCATOR) {
            self.locators.insert((layer, key));
        }
        for set in self.sets_mut(buckets) {
            set.insert(key);
        }
    }

    pub(crate) fn remove(&mut self, key: K, buckets: Buckets, layer: i32) {
        if buckets.contains(Buckets::LOCATOR) {
            self.locators.remove(&(layer, key));
        }
        for set in self.sets_mut(buckets) {
            set.remove(&key);
        }
    }

    pub(crate) fn change_layer(&mut self, key: K, old_layer: i32, new_layer: i32) {
        if self.locators.remove(&(old_layer, key)) {
            self.locators.insert((new_layer, key));
        }
    }

    fn sets_mut(&mut self, buckets: Buckets) -> impl Iterator<Item = &mut HashSet<K>> {
        let [up, down, left, right] = &mut self.solid;
        [
            (Buckets::OVERLAP, &mut self.overlap),
            (Buckets::COLLISION, &mut self.collision),
            (Buckets::SOLID_UP, up),
            (Buckets::SOLID_DOWN, down),
            (Buckets::SOLID_LEFT, left),
            (Buckets::SOLID_RIGHT, right),
        ]
        .into_iter()
        .filter_map(move |(flag, set)| buckets.contains(flag).then_some(set))
    }
}
