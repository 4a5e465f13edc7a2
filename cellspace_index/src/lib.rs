// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cellspace Index: a sparse, role-bucketed cell grid.
//!
//! The grid partitions the plane into fixed-size cells addressed by integer
//! `(column, row)` coordinates. Each [`Cell`] files keys under independent
//! buckets:
//!
//! - a locator bucket, ordered by `(draw layer, key)` for painting,
//! - an overlap bucket and a collision bucket,
//! - four solid buckets, one per facing [`Direction`].
//!
//! It is generic over the key type `K` and does not depend on any geometry
//! crate: callers compute the edges of their shapes and ask the grid for the
//! [`CellRange`] to file them under.
//!
//! # Ranges
//!
//! - [`CellGrid::range_inclusive`] counts every cell a box touches, including
//!   cells it only meets along a boundary. Use it for indexing.
//! - [`CellGrid::range_exclusive`] counts only cells a region actually covers
//!   and never returns an empty range. Use it for view queries.
//!
//! # Example
//!
//! ```rust
//! use cellspace_index::{Buckets, CellGrid};
//!
//! let mut grid: CellGrid<u64> = CellGrid::new(256.0, 256.0);
//! let range = grid.range_inclusive(250.0, 250.0, 260.0, 260.0);
//! assert_eq!(range.len(), 4);
//!
//! grid.insert(7, range, Buckets::LOCATOR | Buckets::OVERLAP, 0);
//! assert_eq!(grid.overlap_in(range), vec![7]);
//!
//! let mut drawn = Vec::new();
//! grid.visit_locators(range, |layer, key| drawn.push((layer, key)));
//! assert_eq!(drawn, [(0, 7)]);
//! ```
//!
//! Cells are created lazily and kept once created; changing the cell
//! dimensions discards all of them.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for coordinates, and strictly positive cell
//! dimensions. Debug builds assert the latter.

#![no_std]

extern crate alloc;

mod cell;
mod grid;
mod types;

pub use cell::Cell;
pub use grid::CellGrid;
pub use types::{Buckets, CellCoord, CellRange, Direction, Directions};
