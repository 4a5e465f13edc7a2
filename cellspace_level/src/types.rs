// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identifiers and role flags.

use core::sync::atomic::{AtomicU64, Ordering};

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Next value of the process-wide serial counter. Serials are never reused.
pub(crate) fn next_serial() -> u64 {
    NEXT_SERIAL.fetch_add(1, Ordering::Relaxed)
}

/// Identifier for a hitbox.
///
/// Ordering follows creation order across the whole process, which makes it
/// the tie-break for draw-layer ordering. A destroyed hitbox's slot can be
/// reused, but its serial cannot, so stale ids stay stale.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HitboxId {
    pub(crate) serial: u64,
    pub(crate) slot: u32,
}

impl HitboxId {
    /// The creation serial.
    pub const fn serial(self) -> u64 {
        self.serial
    }
}

/// Identifier for an object. Ordered by creation, like [`HitboxId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    pub(crate) serial: u64,
    pub(crate) slot: u32,
}

impl ObjectId {
    /// The creation serial.
    pub const fn serial(self) -> u64 {
        self.serial
    }
}

/// Identifier for a state. States live as long as their [`World`](crate::World).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) u32);

impl StateId {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// The roles a hitbox plays for its object.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Roles: u8 {
        /// Positions the object and orders it for drawing.
        const LOCATOR   = 0b0001;
        /// Tested by overlap queries.
        const OVERLAP   = 0b0010;
        /// Exposes solid surfaces.
        const SOLID     = 0b0100;
        /// Tested against solid surfaces.
        const COLLISION = 0b1000;
    }
}
