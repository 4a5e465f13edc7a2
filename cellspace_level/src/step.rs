// Copyright 2025 the Cellspace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame movement step.

use kurbo::Vec2;

use crate::types::{ObjectId, StateId};
use crate::world::World;

impl World {
    /// Advance `state` by one step.
    ///
    /// Runs three passes over the state's thinkers in
    /// `(movement priority, id)` order: every `before_movement` hook, then
    /// every movement, then every `after_movement` hook. Each thinker moves
    /// by `(velocity + displacement) * state time factor * object time
    /// factor`, and its displacement resets. Nothing happens while the
    /// state's time factor is not positive.
    ///
    /// The step holds a cursor on `state`, so membership changes requested
    /// by hooks apply once it ends.
    pub fn step(&mut self, state: StateId) {
        let time_factor = self.st(state).time_factor;
        if time_factor <= 0.0 {
            return;
        }
        self.st_mut(state).cursors += 1;

        for object in self.thinker_snapshot(state) {
            self.with_behavior(object, |b, w| b.before_movement(w, object));
        }
        for object in self.thinker_snapshot(state) {
            self.advance(object, time_factor);
        }
        for object in self.thinker_snapshot(state) {
            self.with_behavior(object, |b, w| b.after_movement(w, object));
        }

        self.release_cursor(state);
    }

    fn thinker_snapshot(&self, state: StateId) -> Vec<ObjectId> {
        self.thinkers(state).collect()
    }

    fn advance(&mut self, object: ObjectId, state_factor: f64) {
        let Some(obj) = self.object_mut(object) else {
            return;
        };
        let factor = state_factor * obj.time_factor;
        let locator = obj.locator;
        let Some(motion) = &mut obj.motion else {
            return;
        };
        let delta = (motion.velocity + motion.displacement) * factor;
        motion.displacement = Vec2::ZERO;
        if delta != Vec2::ZERO {
            let position = self.hb(locator).rel.position + delta;
            self.set_rel_position(locator, position);
        }
    }
}
