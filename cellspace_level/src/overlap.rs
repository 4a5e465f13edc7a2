// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap and solid-contact predicates between hitboxes.

use kurbo::Rect;

use crate::hitbox::HitboxNode;
use crate::types::HitboxId;
use crate::world::World;

/// Inclusive bounding-box test; touching edges count.
fn edges_meet(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

impl World {
    /// Whether two hitboxes overlap.
    ///
    /// Hitboxes in different states never overlap, and a hitbox never
    /// overlaps itself. Composites overlap when any component does. Pairs
    /// drawn only from rectangles, slopes and polygons of three or more
    /// vertices are decided by their bounds alone; every other pair is
    /// tested exactly.
    ///
    /// A circle meets a line, rectangle or polygon only where it crosses an
    /// edge or, for closed shapes, where its center lies inside. A line or a
    /// small box lying wholly inside a circle away from its center is not
    /// reported.
    pub fn overlaps(&self, a: HitboxId, b: HitboxId) -> bool {
        match (self.hitbox(a), self.hitbox(b)) {
            (Some(a), Some(b)) => self.nodes_overlap(a, b),
            _ => false,
        }
    }

    fn nodes_overlap(&self, a: &HitboxNode, b: &HitboxNode) -> bool {
        if a.id == b.id {
            return false;
        }
        if let (Some(sa), Some(sb)) = (a.state, b.state)
            && sa != sb
        {
            return false;
        }
        if !edges_meet(a.bounds, b.bounds) {
            return false;
        }
        if a.shape.is_composite() {
            return a
                .components
                .values()
                .any(|c| self.nodes_overlap(self.hb(*c), b));
        }
        if b.shape.is_composite() {
            return b
                .components
                .values()
                .any(|c| self.nodes_overlap(a, self.hb(*c)));
        }
        if a.shape.is_coarse() && b.shape.is_coarse() {
            return true;
        }
        match (a.shape.primitive(&a.abs), b.shape.primitive(&b.abs)) {
            (Some(pa), Some(pb)) => pa.intersects(&pb),
            _ => false,
        }
    }

    /// Whether a collision hitbox touches a solid hitbox.
    ///
    /// Both must belong to different objects in the same state and their
    /// bounds must meet; composites recurse into their components. No
    /// finer shape test is made.
    pub fn intersects_solid(&self, collision: HitboxId, solid: HitboxId) -> bool {
        match (self.hitbox(collision), self.hitbox(solid)) {
            (Some(c), Some(s)) => self.nodes_touch_solid(c, s),
            _ => false,
        }
    }

    fn nodes_touch_solid(&self, collision: &HitboxNode, solid: &HitboxNode) -> bool {
        if collision.object == solid.object {
            return false;
        }
        let Some(state) = collision.state else {
            return false;
        };
        if solid.state != Some(state) || !edges_meet(collision.bounds, solid.bounds) {
            return false;
        }
        if collision.shape.is_composite() {
            return collision
                .components
                .values()
                .any(|c| self.nodes_touch_solid(self.hb(*c), solid));
        }
        if solid.shape.is_composite() {
            return solid
                .components
                .values()
                .any(|c| self.nodes_touch_solid(collision, self.hb(*c)));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};
    use proptest::prelude::*;

    use crate::{LevelConfig, Shape, World};

    #[test]
    fn circle_meets_line_through_it() {
        let mut world = World::new();
        let circle = world.create_hitbox(Point::ORIGIN, Shape::Circle { radius: 10.0 });
        let line = world.create_hitbox(
            Point::new(5.0, -20.0),
            Shape::Line {
                difference: Vec2::new(0.0, 40.0),
            },
        );
        assert!(world.overlaps(circle, line));
        assert!(world.overlaps(line, circle));

        world.set_rel_x(line, 15.0);
        assert!(!world.overlaps(circle, line));
    }

    #[test]
    fn shapes_wholly_inside_a_circle_are_missed() {
        let mut world = World::new();
        let circle = world.create_hitbox(Point::ORIGIN, Shape::Circle { radius: 10.0 });
        let line = world.create_hitbox(
            Point::new(-1.0, 0.0),
            Shape::Line {
                difference: Vec2::new(2.0, 0.0),
            },
        );
        assert!(!world.overlaps(circle, line));
        assert!(!world.overlaps(line, circle));

        let small = world.create_hitbox(Point::new(2.0, 2.0), Shape::rectangle(0.0, 0.0, 1.0, 1.0));
        assert!(!world.overlaps(circle, small));

        // Covering the center is enough for a closed shape.
        world.set_rel_position(small, Point::new(-0.5, -0.5));
        assert!(world.overlaps(circle, small));
        assert!(world.overlaps(small, circle));
    }

    #[test]
    fn distinct_points_do_not_overlap() {
        let mut world = World::new();
        let a = world.create_hitbox(Point::new(1.0, 1.0), Shape::Point);
        let b = world.create_hitbox(Point::new(2.0, 2.0), Shape::Point);
        assert!(!world.overlaps(a, b));
        let c = world.create_hitbox(Point::new(1.0, 1.0), Shape::Point);
        assert!(world.overlaps(a, c));
        assert!(!world.overlaps(a, a));
    }

    #[test]
    fn coarse_pairs_use_bounds() {
        let mut world = World::new();
        // An L-shaped concave polygon whose notch contains the rectangle.
        let l_shape = world.create_hitbox(
            Point::ORIGIN,
            Shape::Polygon {
                vertices: vec![
                    Point::new(0.0, 0.0),
                    Point::new(10.0, 0.0),
                    Point::new(10.0, 2.0),
                    Point::new(2.0, 2.0),
                    Point::new(2.0, 10.0),
                    Point::new(0.0, 10.0),
                ],
            },
        );
        let rect = world.create_hitbox(Point::new(6.0, 6.0), Shape::rectangle(0.0, 0.0, 2.0, 2.0));
        assert!(world.overlaps(l_shape, rect));

        // A point in the same notch is tested exactly.
        let point = world.create_hitbox(Point::new(6.0, 6.0), Shape::Point);
        assert!(!world.overlaps(l_shape, point));
    }

    #[test]
    fn composites_overlap_through_components() {
        let mut world = World::new();
        let body = world.create_hitbox(Point::ORIGIN, Shape::Composite);
        let left = world.create_hitbox(Point::new(-20.0, 0.0), Shape::Circle { radius: 2.0 });
        let right = world.create_hitbox(Point::new(20.0, 0.0), Shape::Circle { radius: 2.0 });
        assert!(world.set_component(body, "left", left));
        assert!(world.set_component(body, "right", right));

        // Inside the union bounds but between the components.
        let ball = world.create_hitbox(Point::ORIGIN, Shape::Circle { radius: 1.0 });
        assert!(!world.overlaps(body, ball));
        world.set_rel_x(ball, 19.0);
        assert!(world.overlaps(body, ball));
        assert!(world.overlaps(ball, body));
        // A composite never overlaps its own component through identity.
        assert!(!world.overlaps(left, left));
    }

    #[test]
    fn different_states_never_overlap() {
        let mut world = World::new();
        let s1 = world.create_state(&LevelConfig::default()).unwrap();
        let s2 = world.create_state(&LevelConfig::default()).unwrap();
        let a = world.create_hitbox(Point::ORIGIN, Shape::Circle { radius: 5.0 });
        let b = world.create_hitbox(Point::ORIGIN, Shape::Circle { radius: 5.0 });
        let oa = world.create_object(a, 0, ()).unwrap();
        let ob = world.create_object(b, 0, ()).unwrap();
        assert!(world.overlaps(a, b));
        assert!(world.add_object(s1, oa));
        // One state unset is still admissible.
        assert!(world.overlaps(a, b));
        assert!(world.add_object(s2, ob));
        assert!(!world.overlaps(a, b));
    }

    #[test]
    fn solid_contact_needs_distinct_objects_in_one_state() {
        let mut world = World::new();
        let state = world.create_state(&LevelConfig::default()).unwrap();
        let mover = world.create_hitbox(Point::ORIGIN, Shape::Circle { radius: 4.0 });
        // The circle misses the slope's filled triangle but meets its bounds.
        let ground = world.create_hitbox(
            Point::new(3.0, -3.0),
            Shape::Slope {
                dx: 10.0,
                dy: -10.0,
                present_above: true,
                present_below: false,
            },
        );
        assert!(!world.intersects_solid(mover, ground));

        let om = world.create_thinker(mover, 0, 0, ()).unwrap();
        let og = world.create_object(ground, 0, ()).unwrap();
        assert!(!world.intersects_solid(mover, ground));
        assert!(world.add_object(state, om));
        assert!(world.add_object(state, og));
        assert!(world.intersects_solid(mover, ground));

        world.set_rel_x(ground, 50.0);
        assert!(!world.intersects_solid(mover, ground));
    }

    fn shape_strategy() -> impl Strategy<Value = Shape> {
        let coord = || -20.0f64..20.0;
        prop_oneof![
            Just(Shape::Point),
            (1.0f64..15.0).prop_map(|radius| Shape::Circle { radius }),
            (coord(), coord()).prop_map(|(x, y)| Shape::Line {
                difference: Vec2::new(x, y)
            }),
            prop::collection::vec((coord(), coord()), 0..6).prop_map(|v| Shape::Polygon {
                vertices: v.into_iter().map(|(x, y)| Point::new(x, y)).collect()
            }),
            (coord(), coord(), coord(), coord())
                .prop_map(|(l, t, r, b)| Shape::rectangle(l, t, r, b)),
            (coord(), coord(), any::<bool>(), any::<bool>()).prop_map(|(dx, dy, above, below)| {
                Shape::Slope {
                    dx,
                    dy,
                    present_above: above,
                    present_below: below,
                }
            }),
        ]
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(
            sa in shape_strategy(),
            sb in shape_strategy(),
            (ax, ay, bx, by) in (-30.0f64..30.0, -30.0f64..30.0, -30.0f64..30.0, -30.0f64..30.0),
            angle in 0.0f64..360.0,
            flips in any::<(bool, bool)>(),
        ) {
            let mut world = World::new();
            let a = world.create_hitbox(Point::new(ax, ay), sa);
            let b = world.create_hitbox(Point::new(bx, by), sb);
            world.set_rel_angle(a, angle);
            world.set_rel_x_flip(b, flips.0);
            world.set_rel_y_flip(b, flips.1);
            prop_assert_eq!(world.overlaps(a, b), world.overlaps(b, a));
        }
    }
}
