// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cellspace Geom: the geometric foundation of the Cellspace level engine.
//!
//! This crate holds the pieces of 2D geometry that do not know anything about
//! hitbox trees, objects or grids. It is `no_std` and builds on [`kurbo`].
//!
//! # Transforms
//!
//! - [`Transform`] – a position with independent x/y flips and an angle in
//!   degrees. [`Transform::then`] composes a parent's absolute transform with a
//!   child's relative one; flips combine by XOR and the child's angle is
//!   mirrored by the parent's flips before being added.
//! - [`normalize_angle`], [`rotate`], [`distance_between`], [`angle_between`].
//!
//! Screen coordinates have y pointing down, so positive angles turn
//! counterclockwise as seen on screen.
//!
//! # Intersection
//!
//! - [`Primitive`] – point, segment, circle, polygon or rectangle in world
//!   space. [`Primitive::intersects`] is a single symmetric match over every
//!   pair.
//! - The [`segment`] module exposes the closed-form predicates used by that
//!   table (segment crossings, exact point-on-segment, circle versus segment,
//!   even-odd point-in-polygon).
//!
//! ```
//! use cellspace_geom::Primitive;
//! use kurbo::{Circle, Point};
//!
//! let circle = Primitive::Circle(Circle::new(Point::ORIGIN, 10.0));
//! let line = Primitive::segment(Point::new(5.0, -20.0), Point::new(5.0, 20.0));
//! assert!(circle.intersects(&line));
//! ```
//!
//! ## Features
//!
//! - `std` (default): use the standard library float functions.
//! - `libm`: use `libm` through `kurbo` for `no_std` targets.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod primitive;
pub mod segment;
mod transform;

pub use primitive::{Primitive, Vertices};
pub use transform::{Transform, angle_between, distance_between, normalize_angle, rotate};
