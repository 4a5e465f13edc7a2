// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! World-space primitives and the pairwise intersection table.

use kurbo::{Circle, Line, Point, Rect, Vec2};
use smallvec::SmallVec;

use crate::segment::{
    circle_intersects_polygon, circle_intersects_rect, circle_intersects_segment,
    point_in_polygon, point_in_rect, segment_contains_point, segment_intersects_polygon,
    segment_intersects_rect, segments_intersect,
};

/// Inline vertex storage; triangles and small polygons never allocate.
pub type Vertices = SmallVec<[Point; 8]>;

/// A closed set of world-space shapes with exact pairwise intersection tests.
///
/// Construct through [`Primitive::segment`] and [`Primitive::polygon`] to get
/// the degenerate forms normalized (a zero-length segment is a point, a polygon
/// with fewer than three vertices is a point or a segment).
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// A single point.
    Point(Point),
    /// A segment from `p0` to `p1`.
    Segment(Line),
    /// A filled disk.
    Circle(Circle),
    /// A closed polygon with at least three vertices.
    Polygon(Vertices),
    /// A filled axis-aligned rectangle.
    Rect(Rect),
}

impl Primitive {
    /// A segment, or a point if `start == end`.
    pub fn segment(start: Point, end: Point) -> Self {
        if start == end {
            Self::Point(start)
        } else {
            Self::Segment(Line::new(start, end))
        }
    }

    /// A polygon from world-space vertices; `origin` stands in when there are none.
    pub fn polygon(origin: Point, vertices: &[Point]) -> Self {
        match vertices {
            [] => Self::Point(origin),
            [p] => Self::Point(*p),
            [a, b] => Self::segment(*a, *b),
            _ => Self::Polygon(vertices.iter().copied().collect()),
        }
    }

    /// Axis-aligned bounds.
    pub fn bounding_box(&self) -> Rect {
        match self {
            Self::Point(p) => Rect::from_points(*p, *p),
            Self::Segment(line) => Rect::from_points(line.p0, line.p1),
            Self::Circle(c) => Rect::new(
                c.center.x - c.radius,
                c.center.y - c.radius,
                c.center.x + c.radius,
                c.center.y + c.radius,
            ),
            Self::Polygon(vertices) => {
                let Some((first, rest)) = vertices.split_first() else {
                    return Rect::ZERO;
                };
                rest.iter()
                    .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
            }
            Self::Rect(rect) => *rect,
        }
    }

    /// Exact intersection between two primitives. Symmetric in its arguments.
    ///
    /// Polygon/rectangle pairs are treated as intersecting; callers are
    /// expected to have rejected them by bounds first.
    pub fn intersects(&self, other: &Self) -> bool {
        use Primitive as P;
        match (self, other) {
            (P::Point(_), P::Point(_)) => true,
            (P::Point(p), P::Segment(l)) | (P::Segment(l), P::Point(p)) => {
                segment_contains_point(l.p0, diff(l), *p)
            }
            (P::Point(p), P::Circle(c)) | (P::Circle(c), P::Point(p)) => {
                (*p - c.center).hypot() < c.radius
            }
            (P::Point(p), P::Polygon(v)) | (P::Polygon(v), P::Point(p)) => point_in_polygon(*p, v),
            (P::Point(p), P::Rect(r)) | (P::Rect(r), P::Point(p)) => point_in_rect(*p, *r),
            (P::Segment(a), P::Segment(b)) => segments_intersect(a.p0, diff(a), b.p0, diff(b)),
            (P::Segment(l), P::Circle(c)) | (P::Circle(c), P::Segment(l)) => {
                circle_intersects_segment(c.center, c.radius, l.p0, diff(l))
            }
            (P::Segment(l), P::Polygon(v)) | (P::Polygon(v), P::Segment(l)) => {
                segment_intersects_polygon(l.p0, diff(l), v)
            }
            (P::Segment(l), P::Rect(r)) | (P::Rect(r), P::Segment(l)) => {
                segment_intersects_rect(l.p0, diff(l), *r)
            }
            (P::Circle(a), P::Circle(b)) => (a.center - b.center).hypot() < a.radius + b.radius,
            (P::Circle(c), P::Polygon(v)) | (P::Polygon(v), P::Circle(c)) => {
                circle_intersects_polygon(c.center, c.radius, v)
            }
            (P::Circle(c), P::Rect(r)) | (P::Rect(r), P::Circle(c)) => {
                circle_intersects_rect(c.center, c.radius, *r)
            }
            (P::Polygon(_) | P::Rect(_), P::Polygon(_) | P::Rect(_)) => true,
        }
    }
}

#[inline]
fn diff(line: &Line) -> Vec2 {
    line.p1 - line.p0
}
