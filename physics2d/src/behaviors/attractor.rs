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
//! Point attractor
//!
//! Pulls every non-fixed body towards a fixed point with magnitude
//! `strength / d^order`. The distance used in the falloff is clamped from
//! below by `min_distance`; bodies beyond `max_distance` are unaffected.
//! A negative strength turns the attractor into a repeller.

use super::{Behavior, Bodies};
use crate::error::ConfigurationError;
use crate::math::Vector2;

/// Attraction towards a point in world space
#[derive(Debug, Clone, PartialEq)]
pub struct Attractor {
    position: Vector2,
    strength: f64,
    order: f64,
    min_distance: f64,
    max_distance: f64,
}

impl Attractor {
    /// Create an inverse-square attractor at `position`
    ///
    /// # Panics
    ///
    /// Panics if `position` or `strength` is not finite.
    pub fn new(position: Vector2, strength: f64) -> Self {
        assert!(position.is_valid(), "Attractor position must be finite");
        assert!(strength.is_finite(), "Strength must be finite");
        Attractor {
            position,
            strength,
            order: 2.0,
            min_distance: 0.0,
            max_distance: f64::INFINITY,
        }
    }

    /// Create an attractor, returning an error for non-finite input
    pub fn try_new(position: Vector2, strength: f64) -> Result<Self, ConfigurationError> {
        if !strength.is_finite() {
            return Err(ConfigurationError::InvalidParameter {
                name: "strength",
                value: strength,
            });
        }
        if !position.is_valid() {
            return Err(ConfigurationError::InvalidParameter {
                name: "position",
                value: if position.x.is_finite() { position.y } else { position.x },
            });
        }
        Ok(Self::new(position, strength))
    }

    /// Set the falloff exponent (2 = inverse square, 0 = constant)
    ///
    /// # Panics
    ///
    /// Panics if `order` is negative or not finite.
    pub fn with_order(mut self, order: f64) -> Self {
        assert!(order >= 0.0 && order.is_finite(), "Order must be non-negative and finite");
        self.order = order;
        self
    }

    /// Clamp the falloff distance from below
    ///
    /// # Panics
    ///
    /// Panics if `distance` is negative or not finite.
    pub fn with_min_distance(mut self, distance: f64) -> Self {
        assert!(
            distance >= 0.0 && distance.is_finite(),
            "Min distance must be non-negative and finite"
        );
        self.min_distance = distance;
        self
    }

    /// Ignore bodies farther than `distance`
    ///
    /// # Panics
    ///
    /// Panics if `distance` is not positive.
    pub fn with_max_distance(mut self, distance: f64) -> Self {
        assert!(distance > 0.0, "Max distance must be positive");
        self.max_distance = distance;
        self
    }

    /// Attraction point
    pub fn position(&self) -> Vector2 {
        self.position
    }

    /// Move the attraction point
    pub fn set_position(&mut self, position: Vector2) {
        assert!(position.is_valid(), "Attractor position must be finite");
        self.position = position;
    }

    /// Attraction strength
    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Falloff exponent
    pub fn order(&self) -> f64 {
        self.order
    }

    fn acceleration_at(&self, pos: Vector2) -> Option<Vector2> {
        let offset = self.position - pos;
        let distance = offset.norm();
        // Direction is undefined at the attraction point itself
        if distance == 0.0 || distance > self.max_distance {
            return None;
        }
        let falloff = distance.max(self.min_distance).powf(self.order);
        let acc = offset * (self.strength / (falloff * distance));
        acc.is_valid().then_some(acc)
    }
}

impl Behavior for Attractor {
    fn name(&self) -> &str {
        "attractor"
    }

    fn behave(&mut self, bodies: &mut Bodies<'_>, _dt: f64) {
        for index in 0..bodies.len() {
            let acc = match bodies.get(index) {
                Some(body) if !body.is_fixed() => self.acceleration_at(body.position()),
                _ => None,
            };
            if let Some(acc) = acc {
                bodies.accelerate(index, acc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Body, BodyOptions};

    #[test]
    fn test_inverse_square_pull() {
        let mut bodies = vec![Body::point(&BodyOptions::at(10.0, 0.0)).unwrap()];
        let mut attractor = Attractor::new(Vector2::zero(), 200.0);
        attractor.behave(&mut Bodies::new(&mut bodies), 1.0);
        // 200 / 10² towards the origin
        let acc = bodies[0].state().acc;
        assert!((acc.x + 2.0).abs() < 1e-12);
        assert_eq!(acc.y, 0.0);
    }

    #[test]
    fn test_min_distance_clamps() {
        let mut bodies = vec![Body::point(&BodyOptions::at(1.0, 0.0)).unwrap()];
        Attractor::new(Vector2::zero(), 100.0)
            .with_min_distance(10.0)
            .behave(&mut Bodies::new(&mut bodies), 1.0);
        assert!((bodies[0].state().acc.x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_distance_and_centre_ignored() {
        let mut bodies = vec![
            Body::point(&BodyOptions::at(500.0, 0.0)).unwrap(),
            Body::point(&BodyOptions::at(0.0, 0.0)).unwrap(),
        ];
        Attractor::new(Vector2::zero(), 1.0)
            .with_max_distance(100.0)
            .behave(&mut Bodies::new(&mut bodies), 1.0);
        assert_eq!(bodies[0].state().acc, Vector2::zero());
        assert_eq!(bodies[1].state().acc, Vector2::zero());
    }

    #[test]
    fn test_order_zero_is_constant_magnitude() {
        let mut bodies = vec![
            Body::point(&BodyOptions::at(0.0, 3.0)).unwrap(),
            Body::point(&BodyOptions::at(0.0, -300.0)).unwrap(),
        ];
        Attractor::new(Vector2::zero(), 0.5)
            .with_order(0.0)
            .behave(&mut Bodies::new(&mut bodies), 1.0);
        assert!((bodies[0].state().acc.y + 0.5).abs() < 1e-12);
        assert!((bodies[1].state().acc.y - 0.5).abs() < 1e-12);
    }
}
