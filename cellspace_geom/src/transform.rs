// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flip/rotate transforms, angle helpers, and parent composition.
//!
//! Angles are in degrees and measured counterclockwise on screen. Because the
//! y axis points down, an angle of 90 degrees points toward negative y.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Vec2};

/// Normalize an angle in degrees into `[0, 360)`.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle % 360.0;
    let a = if a < 0.0 { a + 360.0 } else { a };
    // `-tiny + 360.0` can round up to exactly 360.
    if a >= 360.0 { 0.0 } else { a }
}

/// Rotate `v` by `degrees`, using the screen convention described in the module docs.
#[inline]
pub fn rotate(v: Vec2, degrees: f64) -> Vec2 {
    if degrees == 0.0 {
        return v;
    }
    let radians = degrees.to_radians();
    let ax = radians.cos();
    let ay = -radians.sin();
    Vec2::new(v.x * ax - v.y * ay, v.x * ay + v.y * ax)
}

/// Euclidean distance between two points.
#[inline]
pub fn distance_between(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Angle in degrees, in `[0, 360)`, of the direction from `a` to `b`.
#[inline]
pub fn angle_between(a: Point, b: Point) -> f64 {
    let d = b - a;
    normalize_angle(Vec2::new(d.x, -d.y).atan2().to_degrees())
}

/// A position plus independent x/y flips and a rotation angle.
///
/// Used both for a hitbox's transform relative to its parent and for the
/// absolute transform derived by composing the parent chain with [`Transform::then`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Position (relative to the parent's frame, or absolute).
    pub position: Point,
    /// Mirror across the vertical axis.
    pub x_flip: bool,
    /// Mirror across the horizontal axis.
    pub y_flip: bool,
    /// Rotation in degrees, kept in `[0, 360)`.
    pub angle: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform at the origin.
    pub const IDENTITY: Self = Self {
        position: Point::ORIGIN,
        x_flip: false,
        y_flip: false,
        angle: 0.0,
    };

    /// An unflipped, unrotated transform at `position`.
    pub const fn at(position: Point) -> Self {
        Self {
            position,
            x_flip: false,
            y_flip: false,
            angle: 0.0,
        }
    }

    /// `-1.0` when flipped horizontally, otherwise `1.0`.
    #[inline]
    pub fn x_sign(&self) -> f64 {
        if self.x_flip { -1.0 } else { 1.0 }
    }

    /// `-1.0` when flipped vertically, otherwise `1.0`.
    #[inline]
    pub fn y_sign(&self) -> f64 {
        if self.y_flip { -1.0 } else { 1.0 }
    }

    /// Map an offset expressed in this transform's frame: flip first, then rotate.
    #[inline]
    pub fn orient(&self, offset: Vec2) -> Vec2 {
        rotate(
            Vec2::new(offset.x * self.x_sign(), offset.y * self.y_sign()),
            self.angle,
        )
    }

    /// Compose `self` (a parent's absolute transform) with a child's relative transform.
    ///
    /// - Flips combine by XOR.
    /// - The child's angle is mirrored as `180 - angle` under a parent x flip and
    ///   as `360 - angle` under a parent y flip, then added to the parent angle.
    /// - The child's position is oriented by the parent and offset from the
    ///   parent's position.
    pub fn then(&self, local: &Self) -> Self {
        let mut angle = local.angle;
        if self.x_flip {
            angle = 180.0 - angle;
        }
        if self.y_flip {
            angle = 360.0 - angle;
        }
        Self {
            position: self.position + self.orient(local.position.to_vec2()),
            x_flip: self.x_flip ^ local.x_flip,
            y_flip: self.y_flip ^ local.y_flip,
            angle: normalize_angle(self.angle + angle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn normalize_wraps_both_directions() {
        assert!(close(normalize_angle(370.0), 10.0));
        assert!(close(normalize_angle(-90.0), 270.0));
        assert!(close(normalize_angle(720.0), 0.0));
        assert!(normalize_angle(-1e-300) < 360.0);
    }

    #[test]
    fn rotate_quarter_turn_points_up() {
        let v = rotate(Vec2::new(1.0, 0.0), 90.0);
        assert!(close(v.x, 0.0));
        assert!(close(v.y, -1.0));
    }

    #[test]
    fn angle_between_uses_screen_axes() {
        let a = Point::new(0.0, 0.0);
        assert!(close(angle_between(a, Point::new(1.0, 0.0)), 0.0));
        assert!(close(angle_between(a, Point::new(0.0, -1.0)), 90.0));
        assert!(close(angle_between(a, Point::new(-1.0, 0.0)), 180.0));
        assert!(close(distance_between(a, Point::new(3.0, 4.0)), 5.0));
    }

    #[test]
    fn composition_mirrors_angle_under_parent_flips() {
        let parent = Transform {
            position: Point::new(10.0, 0.0),
            x_flip: true,
            y_flip: false,
            angle: 30.0,
        };
        let child = Transform {
            position: Point::new(5.0, 0.0),
            x_flip: false,
            y_flip: true,
            angle: 10.0,
        };
        let abs = parent.then(&child);
        // 30 + (180 - 10)
        assert!(close(abs.angle, 200.0));
        assert!(abs.x_flip);
        assert!(abs.y_flip);

        let both = Transform {
            y_flip: true,
            ..parent
        };
        // 30 + (360 - (180 - 10))
        assert!(close(both.then(&child).angle, 220.0));
    }

    #[test]
    fn composition_flips_then_rotates_offsets() {
        let parent = Transform {
            position: Point::new(100.0, 100.0),
            x_flip: true,
            y_flip: false,
            angle: 0.0,
        };
        let abs = parent.then(&Transform::at(Point::new(5.0, 2.0)));
        assert!(close(abs.position.x, 95.0));
        assert!(close(abs.position.y, 102.0));

        let rotated = Transform {
            x_flip: false,
            angle: 90.0,
            ..parent
        };
        let abs = rotated.then(&Transform::at(Point::new(10.0, 0.0)));
        assert!(close(abs.position.x, 100.0));
        assert!(close(abs.position.y, 90.0));
    }
}
