// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewports, layers, HUDs and the draw-ordered render traversal.

use kurbo::{Point, Rect};

use crate::error::{LevelError, Result};
use crate::state::SpaceState;
use crate::types::{ObjectId, StateId};
use crate::world::World;

/// A rectangle in screen pixels, edges inclusive of `x1`/`y1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScreenRect {
    /// Left edge.
    pub x1: i32,
    /// Top edge.
    pub y1: i32,
    /// Right edge.
    pub x2: i32,
    /// Bottom edge.
    pub y2: i32,
}

impl ScreenRect {
    /// Create a rectangle from its edges.
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// The drawing surface a renderer exposes.
///
/// Only clipping goes through this trait; behaviors, layers and HUDs draw
/// through whatever richer API the implementor provides.
pub trait Canvas {
    /// Restrict drawing to `clip`.
    fn set_clip(&mut self, clip: ScreenRect);

    /// Remove the clip.
    fn clear_clip(&mut self);
}

/// Scenery drawn behind (negative ids) or in front of (positive ids) objects.
pub trait Layer {
    /// Draw the part of the layer seen from `camera` into `clip`.
    fn render(
        &self,
        world: &World,
        state: StateId,
        canvas: &mut dyn Canvas,
        camera: Point,
        clip: ScreenRect,
    );
}

/// Screen-space overlay for a viewport or a whole state.
pub trait Hud {
    /// Draw into `clip`.
    fn render(&self, world: &World, state: StateId, canvas: &mut dyn Canvas, clip: ScreenRect);
}

/// A screen rectangle showing the world around a camera object.
///
/// The camera sits at the center of the rectangle.
pub struct Viewport {
    rect: ScreenRect,
    camera: Option<ObjectId>,
    hud: Option<Box<dyn Hud>>,
}

impl core::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Viewport")
            .field("rect", &self.rect)
            .field("camera", &self.camera)
            .field("has_hud", &self.hud.is_some())
            .finish()
    }
}

impl Viewport {
    /// A viewport covering `(x1, y1)`..`(x2, y2)` in screen pixels.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Result<Self> {
        let rect = ScreenRect::new(x1, y1, x2, y2);
        check_size(rect)?;
        Ok(Self {
            rect,
            camera: None,
            hud: None,
        })
    }

    /// The screen rectangle.
    pub fn rect(&self) -> ScreenRect {
        self.rect
    }

    /// Move or resize the viewport.
    pub fn set_rect(&mut self, rect: ScreenRect) -> Result<()> {
        check_size(rect)?;
        self.rect = rect;
        Ok(())
    }

    /// Width in pixels.
    pub fn width(&self) -> i32 {
        self.rect.x2 - self.rect.x1
    }

    /// Height in pixels.
    pub fn height(&self) -> i32 {
        self.rect.y2 - self.rect.y1
    }

    /// The object the viewport follows.
    pub fn camera(&self) -> Option<ObjectId> {
        self.camera
    }

    /// Follow `camera`, or nothing.
    pub fn set_camera(&mut self, camera: Option<ObjectId>) {
        self.camera = camera;
    }

    /// The viewport's HUD.
    pub fn hud(&self) -> Option<&dyn Hud> {
        self.hud.as_deref()
    }

    /// Replace the viewport's HUD.
    pub fn set_hud(&mut self, hud: Option<Box<dyn Hud>>) {
        self.hud = hud;
    }

    /// Offsets of the left/top edges from the camera, in pixels.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Half of an i32 sum fits in i32."
    )]
    fn edge_offsets(&self) -> (i32, i32) {
        let left = -((f64::from(self.rect.x1) + f64::from(self.rect.x2)) / 2.0).round() as i32;
        let top = -((f64::from(self.rect.y1) + f64::from(self.rect.y2)) / 2.0).round() as i32;
        (left, top)
    }

    /// The world rectangle visible with the camera at `camera`.
    pub fn world_edges(&self, camera: Point) -> Rect {
        let (left, top) = self.edge_offsets();
        let left = round_coord(camera.x) + left;
        let top = round_coord(camera.y) + top;
        Rect::new(
            f64::from(left),
            f64::from(top),
            f64::from(left + self.width()),
            f64::from(top + self.height()),
        )
    }

    /// Whether any part of `rect` is visible with the camera at `camera`.
    pub fn rectangle_is_visible(&self, camera: Point, rect: Rect) -> bool {
        let view = self.world_edges(camera);
        rect.x0 < view.x1 && rect.x1 > view.x0 && rect.y0 < view.y1 && rect.y1 > view.y0
    }
}

/// Reject rectangles with negative width or height.
pub(crate) fn check_size(rect: ScreenRect) -> Result<()> {
    if rect.x1 > rect.x2 {
        return Err(LevelError::NegativeViewportWidth {
            x1: rect.x1,
            x2: rect.x2,
        });
    }
    if rect.y1 > rect.y2 {
        return Err(LevelError::NegativeViewportHeight {
            y1: rect.y1,
            y2: rect.y2,
        });
    }
    Ok(())
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "World coordinates on screen fit in i32."
)]
fn round_coord(v: f64) -> i32 {
    v.round() as i32
}

impl World {
    // --- Layers, viewports and HUDs ---

    /// Install `layer` under `id`, replacing any previous one. Id 0 is the
    /// object pass and is rejected.
    pub fn set_layer(&mut self, state: StateId, id: i32, layer: Box<dyn Layer>) -> Result<()> {
        if id == 0 {
            return Err(LevelError::ReservedLayerId);
        }
        self.st_mut(state).layers.insert(id, layer);
        Ok(())
    }

    /// The layer installed under `id`.
    pub fn layer(&self, state: StateId, id: i32) -> Option<&dyn Layer> {
        self.st(state).layers.get(&id).map(|l| &**l)
    }

    /// Remove and return the layer under `id`.
    pub fn remove_layer(&mut self, state: StateId, id: i32) -> Result<Box<dyn Layer>> {
        self.st_mut(state)
            .layers
            .remove(&id)
            .ok_or(LevelError::UnknownLayer(id))
    }

    /// Remove every layer of `state`.
    pub fn clear_layers(&mut self, state: StateId) {
        self.st_mut(state).layers.clear();
    }

    /// Install `viewport` under `id`, replacing any previous one.
    pub fn set_viewport(&mut self, state: StateId, id: i32, viewport: Viewport) {
        self.st_mut(state).viewports.insert(id, viewport);
    }

    /// The viewport under `id`.
    pub fn viewport(&self, state: StateId, id: i32) -> Option<&Viewport> {
        self.st(state).viewports.get(&id)
    }

    /// The viewport under `id`, mutably.
    pub fn viewport_mut(&mut self, state: StateId, id: i32) -> Option<&mut Viewport> {
        self.st_mut(state).viewports.get_mut(&id)
    }

    /// Remove and return the viewport under `id`.
    pub fn remove_viewport(&mut self, state: StateId, id: i32) -> Result<Viewport> {
        self.st_mut(state)
            .viewports
            .remove(&id)
            .ok_or(LevelError::UnknownViewport(id))
    }

    /// Remove every viewport of `state`.
    pub fn clear_viewports(&mut self, state: StateId) {
        self.st_mut(state).viewports.clear();
    }

    /// Replace the HUD drawn over the whole render region.
    pub fn set_hud(&mut self, state: StateId, hud: Option<Box<dyn Hud>>) {
        self.st_mut(state).hud = hud;
    }

    // --- Traversal ---

    /// Draw `state` into `region` of `canvas`.
    ///
    /// Viewports render in id order, each clipped to its rectangle offset by
    /// the region's corner. A viewport whose camera is in `state` draws the
    /// negative layers, then every visible object in `(draw layer, id)`
    /// order, then the positive layers. Its HUD follows. The state HUD is
    /// drawn last over the whole region.
    pub fn render(&self, state: StateId, canvas: &mut dyn Canvas, region: ScreenRect) {
        let st = self.st(state);
        for viewport in st.viewports.values() {
            let rect = viewport.rect;
            if rect.x1 == rect.x2 || rect.y1 == rect.y2 {
                continue;
            }
            let clip = ScreenRect::new(
                region.x1 + rect.x1,
                region.y1 + rect.y1,
                region.x1 + rect.x2,
                region.y1 + rect.y2,
            );
            canvas.set_clip(clip);
            if let Some(camera) = viewport.camera
                && let Some(camera) = self.object(camera)
                && camera.state == Some(state)
            {
                let camera = self.hb(camera.locator).abs.position;
                for layer in st.layers.range(..0).map(|(_, l)| l) {
                    layer.render(self, state, canvas, camera, clip);
                }
                self.draw_objects(st, viewport, canvas, camera, clip);
                for layer in st.layers.range(1..).map(|(_, l)| l) {
                    layer.render(self, state, canvas, camera, clip);
                }
            }
            if let Some(hud) = &viewport.hud {
                hud.render(self, state, canvas, clip);
            }
            canvas.clear_clip();
        }
        canvas.set_clip(region);
        if let Some(hud) = &st.hud {
            hud.render(self, state, canvas, region);
        }
    }

    fn draw_objects(
        &self,
        st: &SpaceState,
        viewport: &Viewport,
        canvas: &mut dyn Canvas,
        camera: Point,
        clip: ScreenRect,
    ) {
        let view = viewport.world_edges(camera);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "View edges are whole pixels."
        )]
        let (x_offset, y_offset) = (clip.x1 - view.x0 as i32, clip.y1 - view.y0 as i32);
        let range = st.grid.range_exclusive(view.x0, view.y0, view.x1, view.y1);
        st.grid.visit_locators(range, |_, hitbox| {
            let node = self.hb(hitbox);
            let b = node.bounds;
            if !(b.x0 < view.x1 && b.x1 > view.x0 && b.y0 < view.y1 && b.y1 > view.y0) {
                return;
            }
            let Some(object) = node.object.and_then(|o| self.object(o)) else {
                return;
            };
            if let Some(behavior) = &object.behavior {
                let x = round_coord(node.abs.position.x) + x_offset;
                let y = round_coord(node.abs.position.y) + y_offset;
                behavior.draw(self, object.id, canvas, x, y);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::{Behavior, LevelConfig, Shape, ViewportConfig};

    use super::*;

    type Events = Rc<RefCell<Vec<String>>>;

    #[derive(Default)]
    struct Recording(Vec<String>);

    impl Canvas for Recording {
        fn set_clip(&mut self, clip: ScreenRect) {
            self.0
                .push(format!("clip {} {} {} {}", clip.x1, clip.y1, clip.x2, clip.y2));
        }

        fn clear_clip(&mut self) {
            self.0.push("unclip".into());
        }
    }

    struct Sprite {
        name: &'static str,
        events: Events,
    }

    impl Behavior for Sprite {
        fn draw(&self, _: &World, _: ObjectId, _: &mut dyn Canvas, x: i32, y: i32) {
            self.events.borrow_mut().push(format!("{} at {x},{y}", self.name));
        }
    }

    struct Named(&'static str, Events);

    impl Layer for Named {
        fn render(&self, _: &World, _: StateId, _: &mut dyn Canvas, camera: Point, _: ScreenRect) {
            self.1
                .borrow_mut()
                .push(format!("layer {} from {},{}", self.0, camera.x, camera.y));
        }
    }

    impl Hud for Named {
        fn render(&self, _: &World, _: StateId, _: &mut dyn Canvas, clip: ScreenRect) {
            let (w, h) = (clip.x2 - clip.x1, clip.y2 - clip.y1);
            self.1.borrow_mut().push(format!("hud {} in {w}x{h}", self.0));
        }
    }

    #[test]
    fn viewport_validation() {
        assert_eq!(
            Viewport::new(10, 0, 0, 10).unwrap_err(),
            LevelError::NegativeViewportWidth { x1: 10, x2: 0 }
        );
        assert_eq!(
            Viewport::new(0, 5, 10, 0).unwrap_err(),
            LevelError::NegativeViewportHeight { y1: 5, y2: 0 }
        );
        let mut vp = Viewport::new(0, 0, 320, 240).unwrap();
        assert_eq!((vp.width(), vp.height()), (320, 240));
        assert!(vp.set_rect(ScreenRect::new(5, 5, 0, 10)).is_err());
        assert_eq!(vp.rect(), ScreenRect::new(0, 0, 320, 240));
    }

    #[test]
    fn visibility_is_centered_on_camera() {
        let vp = Viewport::new(0, 0, 100, 100).unwrap();
        let camera = Point::new(500.0, 500.0);
        assert_eq!(vp.world_edges(camera), Rect::new(450.0, 450.0, 550.0, 550.0));
        assert!(vp.rectangle_is_visible(camera, Rect::new(540.0, 540.0, 560.0, 560.0)));
        // Touching an edge is not visible.
        assert!(!vp.rectangle_is_visible(camera, Rect::new(550.0, 500.0, 560.0, 510.0)));
    }

    #[test]
    fn layer_and_viewport_ids() {
        let mut world = World::new();
        let state = world.create_state(&LevelConfig::default()).unwrap();
        let events = Events::default();
        assert_eq!(
            world.set_layer(state, 0, Box::new(Named("x", events.clone()))),
            Err(LevelError::ReservedLayerId)
        );
        assert!(world.set_layer(state, -1, Box::new(Named("back", events.clone()))).is_ok());
        assert!(world.layer(state, -1).is_some());
        assert!(world.remove_layer(state, -1).is_ok());
        assert!(matches!(world.remove_layer(state, -1), Err(LevelError::UnknownLayer(-1))));
        assert!(matches!(world.remove_viewport(state, 3), Err(LevelError::UnknownViewport(3))));
    }

    #[test]
    fn clearing_layers_and_viewports() {
        let mut world = World::new();
        let state = world.create_state(&LevelConfig::default()).unwrap();
        let events = Events::default();
        for (id, name) in [(-1, "back"), (1, "front")] {
            let layer = Box::new(Named(name, events.clone()));
            assert!(world.set_layer(state, id, layer).is_ok());
        }
        let locator = world.create_hitbox(Point::ORIGIN, Shape::Point);
        let camera = world.create_object(locator, 0, ()).unwrap();
        assert!(world.add_object(state, camera));
        let mut viewport = Viewport::new(0, 0, 10, 10).unwrap();
        viewport.set_camera(Some(camera));
        world.set_viewport(state, 0, viewport);

        let region = ScreenRect::new(0, 0, 10, 10);
        world.render(state, &mut Recording::default(), region);
        assert_eq!(
            events.take(),
            ["layer back from 0,0", "layer front from 0,0"]
        );

        world.clear_layers(state);
        assert!(world.layer(state, -1).is_none());
        let mut canvas = Recording::default();
        world.render(state, &mut canvas, region);
        assert!(events.borrow().is_empty());
        assert_eq!(canvas.0, ["clip 0 0 10 10", "unclip", "clip 0 0 10 10"]);

        world.clear_viewports(state);
        assert!(world.viewport(state, 0).is_none());
        let mut canvas = Recording::default();
        world.render(state, &mut canvas, region);
        assert_eq!(canvas.0, ["clip 0 0 10 10"]);
    }

    #[test]
    fn render_order_and_culling() {
        let mut world = World::new();
        let config = LevelConfig {
            viewports: vec![ViewportConfig {
                id: 0,
                x1: 0,
                y1: 0,
                x2: 100,
                y2: 100,
            }],
            ..LevelConfig::default()
        };
        let state = world.create_state(&config).unwrap();
        let events = Events::default();

        let spawn = |world: &mut World, name: &'static str, x: f64, y: f64, layer: i32| {
            let shape = Shape::rectangle(-2.0, -2.0, 2.0, 2.0);
            let locator = world.create_hitbox(Point::new(x, y), shape);
            let sprite = Sprite {
                name,
                events: events.clone(),
            };
            let object = world.create_object(locator, layer, sprite).unwrap();
            assert!(world.add_object(state, object));
            object
        };
        let hero = spawn(&mut world, "hero", 300.0, 300.0, 0);
        spawn(&mut world, "tree", 310.0, 290.0, -1);
        spawn(&mut world, "bird", 260.0, 340.0, 2);
        // Across a cell edge from the camera but still on screen.
        spawn(&mut world, "rock", 251.0, 258.0, 1);
        // Off screen.
        spawn(&mut world, "far", 400.0, 300.0, 0);

        world.set_layer(state, -5, Box::new(Named("sky", events.clone()))).unwrap();
        world.set_layer(state, 5, Box::new(Named("fog", events.clone()))).unwrap();
        world
            .viewport_mut(state, 0)
            .unwrap()
            .set_camera(Some(hero));
        world
            .viewport_mut(state, 0)
            .unwrap()
            .set_hud(Some(Box::new(Named("vp", events.clone()))));
        world.set_hud(state, Some(Box::new(Named("state", events.clone()))));

        let mut canvas = Recording::default();
        world.render(state, &mut canvas, ScreenRect::new(10, 20, 650, 500));

        assert_eq!(
            *events.borrow(),
            [
                "layer sky from 300,300",
                "tree at 70,60",
                "hero at 60,70",
                "rock at 11,28",
                "bird at 20,110",
                "layer fog from 300,300",
                "hud vp in 100x100",
                "hud state in 640x480",
            ]
        );
        assert_eq!(
            canvas.0,
            ["clip 10 20 110 120", "unclip", "clip 10 20 650 500"]
        );
    }

    #[test]
    fn viewports_without_a_camera_in_the_state_skip_the_world() {
        let mut world = World::new();
        let state = world.create_state(&LevelConfig::default()).unwrap();
        let events = Events::default();
        world.set_layer(state, 1, Box::new(Named("fog", events.clone()))).unwrap();
        let mut vp = Viewport::new(0, 0, 50, 50).unwrap();
        vp.set_hud(Some(Box::new(Named("vp", events.clone()))));
        world.set_viewport(state, 1, vp);
        // Degenerate viewports are skipped entirely.
        world.set_viewport(state, 2, Viewport::new(0, 0, 0, 50).unwrap());

        let mut canvas = Recording::default();
        world.render(state, &mut canvas, ScreenRect::new(0, 0, 50, 50));
        assert_eq!(*events.borrow(), ["hud vp in 50x50"]);
        assert_eq!(canvas.0, ["clip 0 0 50 50", "unclip", "clip 0 0 50 50"]);
    }
}
