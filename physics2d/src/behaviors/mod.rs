// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Force generators
//!
//! A [`Behavior`] runs once per step, before integration, and accumulates
//! acceleration onto bodies. Behaviors run in registration order and only
//! ever see bodies through the [`Bodies`] view, which offers read access plus
//! the `accelerate*` writers. Positions and velocities cannot be touched from
//! a behavior.
//!
//! # Built-in behaviors
//!
//! - [`ConstantAcceleration`]: uniform field such as gravity near a surface
//! - [`Newtonian`]: pairwise inverse-square attraction between all bodies
//! - [`Attractor`]: attraction towards a fixed point in space

mod attractor;
mod constant_acceleration;
mod newtonian;

pub use attractor::Attractor;
pub use constant_acceleration::ConstantAcceleration;
pub use newtonian::Newtonian;

use crate::body::Body;
use crate::math::Vector2;
use std::fmt;

/// Identifier assigned to a behavior when it joins a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BehaviorId(u64);

impl BehaviorId {
    /// Create a new BehaviorId from a raw u64 value
    pub fn new(id: u64) -> Self {
        BehaviorId(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BehaviorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Behavior({})", self.0)
    }
}

/// Restricted view over the world's bodies handed to behaviors
///
/// Bodies are indexed by slot, in world insertion order.
pub struct Bodies<'a> {
    bodies: &'a mut [Body],
}

impl<'a> Bodies<'a> {
    /// Wrap a body slice
    pub fn new(bodies: &'a mut [Body]) -> Self {
        Bodies { bodies }
    }

    /// Number of bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Check if there are no bodies
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Body at `index`
    pub fn get(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    /// Read-only slice of every body
    pub fn as_slice(&self) -> &[Body] {
        self.bodies
    }

    /// Iterate over bodies in slot order
    pub fn iter(&self) -> std::slice::Iter<'_, Body> {
        self.bodies.iter()
    }

    /// Add linear acceleration to the body at `index`
    ///
    /// Out-of-range indices are ignored.
    pub fn accelerate(&mut self, index: usize, acc: Vector2) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.accelerate(acc);
        }
    }

    /// Add angular acceleration to the body at `index`
    pub fn accelerate_angular(&mut self, index: usize, acc: f64) {
        if let Some(body) = self.bodies.get_mut(index) {
            body.accelerate_angular(acc);
        }
    }
}

/// A force generator applied once per step
///
/// Implementations must be deterministic: the same body set must always
/// receive the same accelerations.
pub trait Behavior: Send {
    /// Name of this behavior, used in logs and registry lookups
    fn name(&self) -> &str;

    /// Accumulate acceleration onto `bodies`
    ///
    /// `dt` is the timestep of the step in progress.
    fn behave(&mut self, bodies: &mut Bodies<'_>, dt: f64);
}

impl fmt::Debug for dyn Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior").field("name", &self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyOptions;

    #[test]
    fn test_bodies_view_accelerates_only() {
        let mut bodies = vec![
            Body::point(&BodyOptions::at(0.0, 0.0)).unwrap(),
            Body::point(&BodyOptions::at(1.0, 0.0)).unwrap(),
        ];
        let mut view = Bodies::new(&mut bodies);
        assert_eq!(view.len(), 2);

        view.accelerate(1, Vector2::new(0.0, 2.0));
        view.accelerate_angular(0, 0.5);
        // Ignored
        view.accelerate(5, Vector2::new(1.0, 1.0));

        assert_eq!(bodies[1].state().acc, Vector2::new(0.0, 2.0));
        assert_eq!(bodies[0].state().angular.acc, 0.5);
        assert_eq!(bodies[1].position(), Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_behavior_id_display() {
        assert_eq!(BehaviorId::new(3).to_string(), "Behavior(3)");
        assert_eq!(BehaviorId::new(3).raw(), 3);
    }
}
