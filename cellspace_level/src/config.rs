// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State configuration.

use crate::error::{LevelError, Result};
use crate::render::{ScreenRect, check_size};

/// Initial screen rectangle for a viewport, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportConfig {
    /// Viewport id; viewports render in ascending id order.
    pub id: i32,
    /// Left edge.
    pub x1: i32,
    /// Top edge.
    pub y1: i32,
    /// Right edge.
    pub x2: i32,
    /// Bottom edge.
    pub y2: i32,
}

impl ViewportConfig {
    /// Check that the rectangle has non-negative size.
    pub fn validate(&self) -> Result<()> {
        check_size(ScreenRect::new(self.x1, self.y1, self.x2, self.y2))
    }
}

/// Everything needed to create a state with
/// [`World::create_state`](crate::World::create_state).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LevelConfig {
    /// Width of a grid cell in world units.
    pub cell_width: f64,
    /// Height of a grid cell in world units.
    pub cell_height: f64,
    /// Viewports to create up front.
    pub viewports: Vec<ViewportConfig>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            cell_width: 256.0,
            cell_height: 256.0,
            viewports: Vec::new(),
        }
    }
}

impl LevelConfig {
    /// Reject non-positive cell dimensions and negative viewport sizes.
    pub fn validate(&self) -> Result<()> {
        validate_cell_dimensions(self.cell_width, self.cell_height)?;
        self.viewports.iter().try_for_each(ViewportConfig::validate)
    }
}

#[allow(
    clippy::neg_cmp_op_on_partial_ord,
    reason = "Negated comparisons also reject NaN."
)]
pub(crate) fn validate_cell_dimensions(cell_width: f64, cell_height: f64) -> Result<()> {
    if !(cell_width > 0.0) {
        return Err(LevelError::NonPositiveCellWidth(cell_width));
    }
    if !(cell_height > 0.0) {
        return Err(LevelError::NonPositiveCellHeight(cell_height));
    }
    Ok(())
}
