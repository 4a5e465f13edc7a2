// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cell ranges, directions, and bucket flags.

/// Integer grid coordinate `(column, row)`.
pub type CellCoord = (i32, i32);

/// An inclusive rectangle of grid coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Leftmost column.
    pub left: i32,
    /// Topmost row.
    pub top: i32,
    /// Rightmost column (inclusive).
    pub right: i32,
    /// Bottommost row (inclusive).
    pub bottom: i32,
}

impl CellRange {
    /// Create a range from its inclusive edges.
    #[inline]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// A range covering exactly one cell.
    #[inline]
    pub const fn single(coord: CellCoord) -> Self {
        Self::new(coord.0, coord.1, coord.0, coord.1)
    }

    /// Whether `coord` lies inside the range.
    #[inline]
    pub fn contains(&self, coord: CellCoord) -> bool {
        self.left <= coord.0
            && coord.0 <= self.right
            && self.top <= coord.1
            && coord.1 <= self.bottom
    }

    /// Smallest range covering both.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Number of cells in the range.
    #[allow(
        clippy::cast_sign_loss,
        reason = "Both spans are clamped to be non-negative before the cast."
    )]
    pub fn len(&self) -> usize {
        let w = (i64::from(self.right) - i64::from(self.left) + 1).max(0);
        let h = (i64::from(self.bottom) - i64::from(self.top) + 1).max(0);
        (w * h) as usize
    }

    /// Whether the range covers no cells.
    pub fn is_empty(&self) -> bool {
        self.right < self.left || self.bottom < self.top
    }

    /// Row-major iteration over every coordinate in the range.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + use<> {
        let Self {
            left,
            top,
            right,
            bottom,
        } = *self;
        (top..=bottom).flat_map(move |y| (left..=right).map(move |x| (x, y)))
    }
}

/// One of the four sides of an axis-aligned shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// The top edge, facing negative y.
    Up,
    /// The bottom edge, facing positive y.
    Down,
    /// The left edge, facing negative x.
    Left,
    /// The right edge, facing positive x.
    Right,
}

impl Direction {
    /// All four directions in declaration order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The direction facing the other way.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

bitflags::bitflags! {
    /// A set of [`Direction`]s, used for a hitbox's solid surfaces.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Directions: u8 {
        /// Top edge.
        const UP    = 0b0001;
        /// Bottom edge.
        const DOWN  = 0b0010;
        /// Left edge.
        const LEFT  = 0b0100;
        /// Right edge.
        const RIGHT = 0b1000;
    }
}

impl From<Direction> for Directions {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::UP,
            Direction::Down => Self::DOWN,
            Direction::Left => Self::LEFT,
            Direction::Right => Self::RIGHT,
        }
    }
}

bitflags::bitflags! {
    /// The per-cell buckets a key can be filed under.
    ///
    /// A key's number of grid memberships is the number of set bits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buckets: u8 {
        /// Draw-ordered locator bucket.
        const LOCATOR     = 0b0000_0001;
        /// Overlap bucket.
        const OVERLAP     = 0b0000_0010;
        /// Collision bucket.
        const COLLISION   = 0b0000_0100;
        /// Solid bucket for upward-facing surfaces.
        const SOLID_UP    = 0b0000_1000;
        /// Solid bucket for downward-facing surfaces.
        const SOLID_DOWN  = 0b0001_0000;
        /// Solid bucket for leftward-facing surfaces.
        const SOLID_LEFT  = 0b0010_0000;
        /// Solid bucket for rightward-facing surfaces.
        const SOLID_RIGHT = 0b0100_0000;
        /// Every solid bucket.
        const SOLID = Self::SOLID_UP.bits()
            | Self::SOLID_DOWN.bits()
            | Self::SOLID_LEFT.bits()
            | Self::SOLID_RIGHT.bits();
    }
}

impl Buckets {
    /// The solid bucket for one direction.
    pub const fn solid(direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::SOLID_UP,
            Direction::Down => Self::SOLID_DOWN,
            Direction::Left => Self::SOLID_LEFT,
            Direction::Right => Self::SOLID_RIGHT,
        }
    }

    /// The solid buckets for a set of surfaces.
    pub fn solid_surfaces(surfaces: Directions) -> Self {
        Direction::ALL
            .into_iter()
            .filter(|d| surfaces.contains((*d).into()))
            .fold(Self::empty(), |acc, d| acc | Self::solid(d))
    }

    /// Number of buckets in the set.
    pub fn memberships(self) -> u32 {
        self.bits().count_ones()
    }
}
