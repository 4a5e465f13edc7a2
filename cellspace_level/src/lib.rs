// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cellspace Level: hitbox trees, cell-indexed states and layered rendering.
//!
//! Everything lives in a [`World`] arena addressed by typed handles:
//!
//! - [`HitboxId`]: a [`Shape`] with a transform relative to an optional
//!   parent hitbox. Absolute position, flips and angle are kept current
//!   through the whole subtree after every change.
//! - [`ObjectId`]: an object positioned by its locator hitbox, with optional
//!   overlap, solid and (for thinkers) collision hitboxes. Game code hooks
//!   in through [`Behavior`].
//! - [`StateId`]: a space that objects join and leave. Each state owns a
//!   sparse cell grid that indexes the role hitboxes of its objects, its
//!   thinkers in movement order, and its viewports and layers.
//!
//! ## Deferred changes
//!
//! [`World::add_object`], [`World::remove_object`] and
//! [`World::move_object`] apply at once unless an [`ObjectCursor`] is open on
//! a state they touch, in which case they are queued and applied in request
//! order when the last such cursor finishes. [`World::step`] holds a cursor
//! for its whole duration, so hooks can add and remove objects freely.
//!
//! ## Queries
//!
//! - [`World::overlaps`]: exact overlap between two hitboxes, except that
//!   pairs of rectangles, slopes and polygons are compared by bounds only.
//! - [`World::overlapping_objects`] / [`World::is_overlapping`] use the grid's
//!   overlap buckets.
//! - [`World::solid_contacts`] uses the grid's directional solid buckets with
//!   the bounds-only [`World::intersects_solid`].
//!
//! ## Rendering
//!
//! [`World::render`] walks the viewports of a state in id order, drawing
//! negative [`Layer`]s, then the visible objects in `(draw layer, id)` order
//! through [`Behavior::draw`], then positive layers and [`Hud`]s, all through
//! a caller-supplied [`Canvas`].
//!
//! ## Example
//!
//! ```rust
//! use cellspace_level::{Direction, LevelConfig, Shape, World};
//! use kurbo::{Point, Vec2};
//!
//! let mut world = World::new();
//! let state = world.create_state(&LevelConfig::default()).unwrap();
//!
//! // A floor whose top surface is solid.
//! let slab = Shape::rectangle(-200.0, 0.0, 200.0, 16.0);
//! let floor = world.create_hitbox(Point::new(0.0, 100.0), slab);
//! world.set_surface_solid(floor, Direction::Up, true);
//! let ground = world.create_object(floor, 0, ()).unwrap();
//! world.set_solid_hitbox(ground, Some(floor));
//! world.add_object(state, ground);
//!
//! // A falling thinker with a collision box under its locator.
//! let locator = world.create_hitbox(Point::new(0.0, 80.0), Shape::Point);
//! let player = world.create_thinker(locator, 0, 0, ()).unwrap();
//! let feet = world.create_hitbox(Point::ORIGIN, Shape::rectangle(-4.0, -8.0, 4.0, 0.0));
//! world.set_collision_hitbox(player, Some(feet));
//! world.set_collision(player, true);
//! world.add_object(state, player);
//!
//! world.set_velocity(player, Vec2::new(0.0, 10.0));
//! world.step(state);
//! assert_eq!(world.position(player), Some(Point::new(0.0, 90.0)));
//! assert!(world.solid_contacts(feet, Direction::Up).is_empty());
//! world.step(state);
//! assert_eq!(world.solid_contacts(feet, Direction::Up), [floor]);
//! ```
//!
//! ## Features
//!
//! - `serde`: derive `Serialize` and `Deserialize` for [`LevelConfig`] and
//!   [`ViewportConfig`].
//!
//! Logging goes through the [`log`] facade; this crate never installs a
//! logger.

mod cells;
mod config;
mod error;
mod hitbox;
mod object;
mod overlap;
mod render;
mod shape;
mod state;
mod step;
mod types;
mod world;

pub use cellspace_geom::Transform;
pub use cellspace_index::{CellRange, Direction, Directions};

pub use config::{LevelConfig, ViewportConfig};
pub use error::{LevelError, Result};
pub use object::Behavior;
pub use render::{Canvas, Hud, Layer, ScreenRect, Viewport};
pub use shape::Shape;
pub use state::ObjectCursor;
pub use types::{HitboxId, ObjectId, Roles, StateId};
pub use world::World;
