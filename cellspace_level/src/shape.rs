// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hitbox shapes and their world-space geometry.

use cellspace_geom::{Primitive, Transform};
use kurbo::{Circle, Point, Rect, Vec2};

/// The geometry of a hitbox, relative to its own position.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// A single point at the hitbox position.
    Point,
    /// A disk centered on the hitbox position.
    Circle {
        /// Radius in world units.
        radius: f64,
    },
    /// A segment from the hitbox position to `position + difference`.
    ///
    /// The difference follows the hitbox's flips and rotation.
    Line {
        /// Offset of the far end.
        difference: Vec2,
    },
    /// A closed polygon. Vertices follow the hitbox's flips and rotation.
    ///
    /// Zero vertices behave like a point at the hitbox position, one vertex
    /// like a point at that vertex, and two vertices like a line.
    Polygon {
        /// Vertex offsets.
        vertices: Vec<Point>,
    },
    /// An axis-aligned rectangle given by edge offsets.
    ///
    /// Flips mirror the edges; rotation never applies.
    Rectangle {
        /// Left/top/right/bottom offsets from the hitbox position.
        edges: Rect,
    },
    /// A right-triangle wedge for sloped terrain.
    ///
    /// The hypotenuse runs from the hitbox position to `position + (dx, dy)`.
    /// `present_above`/`present_below` say which side of it is filled. Flips
    /// negate the differentials and a vertical flip swaps the two sides.
    Slope {
        /// Horizontal extent.
        dx: f64,
        /// Vertical extent.
        dy: f64,
        /// Filled on the side above the hypotenuse.
        present_above: bool,
        /// Filled on the side below the hypotenuse.
        present_below: bool,
    },
    /// The union of named component hitboxes.
    Composite,
}

impl Shape {
    /// A rectangle from edge offsets, normalized so left <= right and top <= bottom.
    pub fn rectangle(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::Rectangle {
            edges: Rect::new(left, top, right, bottom).abs(),
        }
    }

    /// Whether this is [`Shape::Composite`].
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite)
    }

    /// Shapes whose pairwise overlap is decided by bounds alone.
    pub(crate) fn is_coarse(&self) -> bool {
        match self {
            Self::Polygon { vertices } => vertices.len() >= 3,
            Self::Rectangle { .. } | Self::Slope { .. } => true,
            _ => false,
        }
    }

    /// World-space primitive under the hitbox's absolute transform.
    /// `None` for composites.
    pub(crate) fn primitive(&self, abs: &Transform) -> Option<Primitive> {
        let origin = abs.position;
        Some(match self {
            Self::Point => Primitive::Point(origin),
            Self::Circle { radius } => Primitive::Circle(Circle::new(origin, *radius)),
            Self::Line { difference } => {
                Primitive::segment(origin, origin + abs.orient(*difference))
            }
            Self::Polygon { vertices } => {
                let world: Vec<Point> = vertices
                    .iter()
                    .map(|v| origin + abs.orient(v.to_vec2()))
                    .collect();
                Primitive::polygon(origin, &world)
            }
            Self::Rectangle { edges } => Primitive::Rect(world_edges(*edges, abs)),
            Self::Slope { .. } => {
                let slope = WorldSlope::new(self, abs)?;
                slope.primitive()
            }
            Self::Composite => return None,
        })
    }

    /// World-space bounds under the hitbox's absolute transform.
    /// `None` for composites, whose bounds come from their components.
    pub(crate) fn bounds(&self, abs: &Transform) -> Option<Rect> {
        match self {
            Self::Rectangle { edges } => Some(world_edges(*edges, abs)),
            Self::Slope { .. } => WorldSlope::new(self, abs).map(|s| s.bounds()),
            Self::Composite => None,
            _ => self.primitive(abs).map(|p| p.bounding_box()),
        }
    }
}

fn world_edges(edges: Rect, abs: &Transform) -> Rect {
    let (left, right) = if abs.x_flip {
        (-edges.x1, -edges.x0)
    } else {
        (edges.x0, edges.x1)
    };
    let (top, bottom) = if abs.y_flip {
        (-edges.y1, -edges.y0)
    } else {
        (edges.y0, edges.y1)
    };
    Rect::new(left, top, right, bottom) + abs.position.to_vec2()
}

/// A slope resolved against its hitbox's absolute transform.
#[derive(Clone, Copy, Debug)]
struct WorldSlope {
    start: Point,
    end: Point,
    above: bool,
    below: bool,
}

impl WorldSlope {
    fn new(shape: &Shape, abs: &Transform) -> Option<Self> {
        let Shape::Slope {
            dx,
            dy,
            present_above,
            present_below,
        } = *shape
        else {
            return None;
        };
        let (above, below) = if abs.y_flip {
            (present_below, present_above)
        } else {
            (present_above, present_below)
        };
        let start = abs.position;
        Some(Self {
            start,
            end: start + Vec2::new(dx * abs.x_sign(), dy * abs.y_sign()),
            above,
            below,
        })
    }

    fn is_sloping(&self) -> bool {
        self.start.x != self.end.x && self.start.y != self.end.y
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn primitive(&self) -> Primitive {
        if !self.is_sloping() || (self.above && self.below) {
            return Primitive::Rect(self.bounds());
        }
        if !self.above && !self.below {
            return Primitive::segment(self.start, self.end);
        }
        // The two candidate right-angle corners; the lower one (larger y)
        // closes the triangle under the hypotenuse.
        let a = Point::new(self.start.x, self.end.y);
        let b = Point::new(self.end.x, self.start.y);
        let (lower, upper) = if a.y > b.y { (a, b) } else { (b, a) };
        let corner = if self.below { lower } else { upper };
        Primitive::polygon(self.start, &[self.start, self.end, corner])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn at(x: f64, y: f64) -> Transform {
        Transform::at(Point::new(x, y))
    }

    #[test]
    fn rectangle_flips_but_does_not_rotate() {
        let shape = Shape::rectangle(0.0, 0.0, 10.0, 4.0);
        let abs = Transform {
            x_flip: true,
            angle: 45.0,
            ..at(100.0, 100.0)
        };
        assert_eq!(shape.bounds(&abs), Some(Rect::new(90.0, 100.0, 100.0, 104.0)));
    }

    #[test]
    fn line_rotates_with_hitbox() {
        let shape = Shape::Line {
            difference: Vec2::new(10.0, 0.0),
        };
        let abs = Transform {
            angle: 90.0,
            ..at(0.0, 0.0)
        };
        let b = shape.bounds(&abs).unwrap();
        assert!(b.x0.abs() < EPSILON && b.x1.abs() < EPSILON);
        assert!((b.y0 + 10.0).abs() < EPSILON && b.y1.abs() < EPSILON);
    }

    #[test]
    fn slope_triangle_follows_presence() {
        let below = Shape::Slope {
            dx: 10.0,
            dy: 10.0,
            present_above: false,
            present_below: true,
        };
        let tri = below.primitive(&at(0.0, 0.0)).unwrap();
        // The filled corner is bottom-left of a down-right slope.
        assert!(tri.intersects(&Primitive::Point(Point::new(2.0, 8.0))));
        assert!(!tri.intersects(&Primitive::Point(Point::new(8.0, 2.0))));

        // A vertical flip turns "below" into "above" and mirrors dy.
        let flipped = below
            .primitive(&Transform {
                y_flip: true,
                ..at(0.0, 0.0)
            })
            .unwrap();
        assert!(flipped.intersects(&Primitive::Point(Point::new(2.0, -8.0))));
        assert!(!flipped.intersects(&Primitive::Point(Point::new(8.0, -2.0))));
    }

    #[test]
    fn degenerate_slopes() {
        let flat = Shape::Slope {
            dx: 10.0,
            dy: 0.0,
            present_above: false,
            present_below: true,
        };
        assert!(matches!(flat.primitive(&at(0.0, 0.0)), Some(Primitive::Rect(_))));
        let bare = Shape::Slope {
            dx: 10.0,
            dy: 5.0,
            present_above: false,
            present_below: false,
        };
        assert!(matches!(bare.primitive(&at(0.0, 0.0)), Some(Primitive::Segment(_))));
        assert_eq!(Shape::Composite.bounds(&at(1.0, 1.0)), None);
    }

    #[test]
    fn polygon_degenerates_by_vertex_count() {
        let empty = Shape::Polygon {
            vertices: Vec::new(),
        };
        assert_eq!(
            empty.primitive(&at(3.0, 4.0)),
            Some(Primitive::Point(Point::new(3.0, 4.0)))
        );
        assert!(!empty.is_coarse());
        let tri = Shape::Polygon {
            vertices: vec![Point::ORIGIN, Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
        };
        assert!(tri.is_coarse());
    }
}
