// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed-form segment, circle, polygon and rectangle predicates.
//!
//! Segments are given as a start point plus a difference vector, matching how
//! line shapes store their geometry. Rectangles are `kurbo::Rect` values with
//! `x0 <= x1` and `y0 <= y1`.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Vec2};

/// `true` when `a` and `b` are both negative, both zero, or both positive.
#[inline]
fn same_sign(a: f64, b: f64) -> bool {
    (a < 0.0 && b < 0.0) || (a == 0.0 && b == 0.0) || (a > 0.0 && b > 0.0)
}

/// Parametric segment-segment test. Touching endpoints count; parallel
/// (including collinear) segments never intersect.
pub fn segments_intersect(start1: Point, diff1: Vec2, start2: Point, diff2: Vec2) -> bool {
    let denom = diff1.cross(diff2);
    if denom == 0.0 {
        return false;
    }
    let rel = start2 - start1;
    let t = rel.cross(diff2) / denom;
    let u = rel.cross(diff1) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Whether `point` lies exactly on the segment, strictly before its end.
///
/// The test is exact: the point must be collinear with the segment, and its
/// offset along the dominant axis must share the sign of the difference and be
/// strictly shorter than it.
pub fn segment_contains_point(start: Point, diff: Vec2, point: Point) -> bool {
    let rel = point - start;
    if diff.x == 0.0 {
        return rel.x == 0.0 && same_sign(rel.y, diff.y) && rel.y.abs() < diff.y.abs();
    }
    rel.cross(diff) == 0.0 && same_sign(rel.x, diff.x) && rel.x.abs() < diff.x.abs()
}

/// Circle versus segment via the quadratic `|start + t*diff - center|^2 = r^2`.
///
/// Intersects only when a root lies strictly inside `(0, 1)`, that is when the
/// segment crosses the circle's boundary. A segment lying wholly inside the
/// circle does not count, and neither does a zero-length segment.
pub fn circle_intersects_segment(center: Point, radius: f64, start: Point, diff: Vec2) -> bool {
    let a = diff.dot(diff);
    if a == 0.0 {
        return false;
    }
    let f = start - center;
    let b = 2.0 * f.dot(diff);
    let c = f.dot(f) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return false;
    }
    let disc = disc.sqrt();
    let t1 = (-b - disc) / (2.0 * a);
    let t2 = (-b + disc) / (2.0 * a);
    (t1 > 0.0 && t1 < 1.0) || (t2 > 0.0 && t2 < 1.0)
}

/// Iterate the closed edges of a polygon as `(start, diff)` pairs.
pub fn polygon_edges(vertices: &[Point]) -> impl Iterator<Item = (Point, Vec2)> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        (a, b - a)
    })
}

/// The four edges of a rectangle as `(start, diff)` pairs.
pub fn rect_edges(rect: Rect) -> [(Point, Vec2); 4] {
    let horizontal = Vec2::new(rect.width(), 0.0);
    let vertical = Vec2::new(0.0, rect.height());
    [
        (Point::new(rect.x0, rect.y0), horizontal),
        (Point::new(rect.x0, rect.y1), horizontal),
        (Point::new(rect.x0, rect.y0), vertical),
        (Point::new(rect.x1, rect.y0), vertical),
    ]
}

/// Even-odd point-in-polygon test.
///
/// Casts a horizontal ray toward negative x and counts edge crossings. An edge
/// counts when it spans the ray's y half-open (one endpoint strictly above,
/// the other at or below), so shared vertices are not double counted.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    let mut inside = false;
    for (start, diff) in polygon_edges(vertices) {
        let end = start + diff;
        if (start.y > point.y) != (end.y > point.y) {
            let x = start.x + (point.y - start.y) / diff.y * diff.x;
            if x < point.x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Strict interior test, falling back to an inclusive test for zero-area rectangles.
pub fn point_in_rect(point: Point, rect: Rect) -> bool {
    if rect.width() == 0.0 || rect.height() == 0.0 {
        return point.x >= rect.x0
            && point.x <= rect.x1
            && point.y >= rect.y0
            && point.y <= rect.y1;
    }
    point.x > rect.x0 && point.x < rect.x1 && point.y > rect.y0 && point.y < rect.y1
}

/// Segment versus rectangle: either endpoint strictly inside, or an edge crossing.
pub fn segment_intersects_rect(start: Point, diff: Vec2, rect: Rect) -> bool {
    point_in_rect(start, rect)
        || point_in_rect(start + diff, rect)
        || rect_edges(rect)
            .iter()
            .any(|&(s, d)| segments_intersect(start, diff, s, d))
}

/// Segment versus a closed polygon: any edge crossing, or the start point inside.
pub fn segment_intersects_polygon(start: Point, diff: Vec2, vertices: &[Point]) -> bool {
    polygon_edges(vertices).any(|(s, d)| segments_intersect(start, diff, s, d))
        || point_in_polygon(start, vertices)
}

/// Circle versus a closed polygon: any edge crossing the circle, or the center inside.
///
/// A polygon lying wholly inside the circle without containing its center is
/// missed.
pub fn circle_intersects_polygon(center: Point, radius: f64, vertices: &[Point]) -> bool {
    polygon_edges(vertices).any(|(s, d)| circle_intersects_segment(center, radius, s, d))
        || point_in_polygon(center, vertices)
}

/// Circle versus rectangle: center strictly inside, or any edge crossing the circle.
///
/// A rectangle lying wholly inside the circle without containing its center is
/// missed.
pub fn circle_intersects_rect(center: Point, radius: f64, rect: Rect) -> bool {
    point_in_rect(center, rect)
        || rect_edges(rect)
            .iter()
            .any(|&(s, d)| circle_intersects_segment(center, radius, s, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments_intersect() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(0.0, 10.0);
        assert!(segments_intersect(a, Vec2::new(10.0, 10.0), b, Vec2::new(10.0, -10.0)));
        // Touching at an endpoint.
        let across = Vec2::new(5.0, 0.0);
        assert!(segments_intersect(a, across, Point::new(5.0, -5.0), Vec2::new(0.0, 5.0)));
        // Parallel, even if collinear.
        assert!(!segments_intersect(a, across, Point::new(2.0, 0.0), across));
    }

    #[test]
    fn point_on_segment_excludes_end() {
        let start = Point::new(0.0, 0.0);
        let diff = Vec2::new(4.0, 2.0);
        assert!(segment_contains_point(start, diff, Point::new(2.0, 1.0)));
        assert!(!segment_contains_point(start, diff, Point::new(4.0, 2.0)));
        assert!(!segment_contains_point(start, diff, Point::new(-2.0, -1.0)));
        assert!(!segment_contains_point(start, diff, Point::new(2.0, 1.5)));
        let vertical = Vec2::new(0.0, -3.0);
        assert!(segment_contains_point(start, vertical, Point::new(0.0, -1.0)));
        assert!(!segment_contains_point(start, vertical, Point::new(0.0, 1.0)));
    }

    #[test]
    fn circle_against_vertical_segment() {
        let center = Point::ORIGIN;
        let start = Point::new(5.0, -20.0);
        assert!(circle_intersects_segment(center, 10.0, start, Vec2::new(0.0, 40.0)));
        let far = Point::new(15.0, -20.0);
        assert!(!circle_intersects_segment(center, 10.0, far, Vec2::new(0.0, 40.0)));
    }

    #[test]
    fn segment_inside_circle_is_missed() {
        let center = Point::ORIGIN;
        let inside = Point::new(-1.0, 0.0);
        assert!(!circle_intersects_segment(center, 10.0, inside, Vec2::new(2.0, 0.0)));
        assert!(!circle_intersects_segment(center, 10.0, Point::new(1.0, 1.0), Vec2::ZERO));
        // Leaving the circle through one end is a crossing.
        assert!(circle_intersects_segment(center, 10.0, inside, Vec2::new(20.0, 0.0)));
        // A small box inside the circle away from its center is missed too.
        let small = Rect::new(2.0, 2.0, 3.0, 3.0);
        assert!(!circle_intersects_rect(center, 10.0, small));
        assert!(circle_intersects_rect(center, 10.0, Rect::new(-1.0, -1.0, 1.0, 1.0)));
    }

    #[test]
    fn even_odd_polygon_containment() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(-1.0, 5.0), &square));
        // The ray passes exactly through a vertex of this diamond.
        let diamond = [
            Point::new(5.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(5.0, 10.0),
            Point::new(0.0, 5.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 5.0), &diamond));
        assert!(!point_in_polygon(Point::new(11.0, 5.0), &diamond));
    }

    #[test]
    fn rect_predicates() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(point_in_rect(Point::new(5.0, 5.0), rect));
        assert!(!point_in_rect(Point::new(0.0, 5.0), rect));
        assert!(point_in_rect(Point::new(0.0, 5.0), Rect::new(0.0, 0.0, 0.0, 10.0)));
        assert!(segment_intersects_rect(Point::new(-5.0, 5.0), Vec2::new(20.0, 0.0), rect));
        assert!(segment_intersects_rect(Point::new(2.0, 2.0), Vec2::new(1.0, 1.0), rect));
        assert!(!segment_intersects_rect(Point::new(-5.0, -5.0), Vec2::new(-1.0, 20.0), rect));
        assert!(circle_intersects_rect(Point::new(-3.0, 5.0), 4.0, rect));
        assert!(!circle_intersects_rect(Point::new(-5.0, 5.0), 4.0, rect));
    }
}
