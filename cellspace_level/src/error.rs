// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for configuration and collaborator-facing lookups.

use crate::types::HitboxId;

/// Errors reported by fallible [`World`](crate::World) operations.
///
/// Structural hitbox operations never produce these; they report an invalid
/// attach with a `false` return instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LevelError {
    /// Cell width was zero, negative or NaN.
    #[error("cell width must be positive, got {0}")]
    NonPositiveCellWidth(f64),
    /// Cell height was zero, negative or NaN.
    #[error("cell height must be positive, got {0}")]
    NonPositiveCellHeight(f64),
    /// A viewport's left edge lies right of its right edge.
    #[error("viewport has negative width ({x1} > {x2})")]
    NegativeViewportWidth {
        /// Left edge.
        x1: i32,
        /// Right edge.
        x2: i32,
    },
    /// A viewport's top edge lies below its bottom edge.
    #[error("viewport has negative height ({y1} > {y2})")]
    NegativeViewportHeight {
        /// Top edge.
        y1: i32,
        /// Bottom edge.
        y2: i32,
    },
    /// Layer id 0 is reserved for the object pass.
    #[error("layer id 0 is reserved for objects")]
    ReservedLayerId,
    /// No layer with this id.
    #[error("no layer with id {0}")]
    UnknownLayer(i32),
    /// No viewport with this id.
    #[error("no viewport with id {0}")]
    UnknownViewport(i32),
    /// The hitbox is stale, already has a parent, or already belongs to an object.
    #[error("hitbox {0:?} is not a free hitbox")]
    HitboxUnavailable(HitboxId),
}

/// Result alias for [`LevelError`].
pub type Result<T, E = LevelError> = core::result::Result<T, E>;
