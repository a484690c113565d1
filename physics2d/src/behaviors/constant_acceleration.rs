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
//! Uniform acceleration field

use super::{Behavior, Bodies};
use crate::error::ConfigurationError;
use crate::math::Vector2;

/// Default field strength, in world units per millisecond squared
///
/// Pointing along +y, which is "down" in screen coordinates.
pub const DEFAULT_ACCELERATION: Vector2 = Vector2::new(0.0, 0.0004);

/// Applies the same acceleration to every non-fixed body
///
/// # Example
///
/// ```
/// use physics2d::behaviors::ConstantAcceleration;
/// use physics2d::math::Vector2;
///
/// let moon = ConstantAcceleration::new(Vector2::new(0.0, 0.0004 / 6.0));
/// assert!(moon.acceleration().y < ConstantAcceleration::default().acceleration().y);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantAcceleration {
    acc: Vector2,
}

impl ConstantAcceleration {
    /// Create a field with the given acceleration
    ///
    /// # Panics
    ///
    /// Panics if `acc` is not finite.
    pub fn new(acc: Vector2) -> Self {
        assert!(acc.is_valid(), "Acceleration must be finite");
        ConstantAcceleration { acc }
    }

    /// Create a field, returning an error for non-finite input
    pub fn try_new(acc: Vector2) -> Result<Self, ConfigurationError> {
        if !acc.is_valid() {
            return Err(ConfigurationError::InvalidParameter {
                name: "acc",
                value: if acc.x.is_finite() { acc.y } else { acc.x },
            });
        }
        Ok(ConstantAcceleration { acc })
    }

    /// Current acceleration
    pub fn acceleration(&self) -> Vector2 {
        self.acc
    }

    /// Replace the acceleration
    ///
    /// # Panics
    ///
    /// Panics if `acc` is not finite.
    pub fn set_acceleration(&mut self, acc: Vector2) {
        assert!(acc.is_valid(), "Acceleration must be finite");
        self.acc = acc;
    }
}

impl Default for ConstantAcceleration {
    fn default() -> Self {
        ConstantAcceleration {
            acc: DEFAULT_ACCELERATION,
        }
    }
}

impl Behavior for ConstantAcceleration {
    fn name(&self) -> &str {
        "constant-acceleration"
    }

    fn behave(&mut self, bodies: &mut Bodies<'_>, _dt: f64) {
        for index in 0..bodies.len() {
            let fixed = bodies.get(index).map_or(true, |b| b.is_fixed());
            if !fixed {
                bodies.accelerate(index, self.acc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Body, BodyOptions};

    #[test]
    fn test_default_field() {
        assert_eq!(
            ConstantAcceleration::default().acceleration(),
            Vector2::new(0.0, 0.0004)
        );
    }

    #[test]
    fn test_skips_fixed_bodies() {
        let mut bodies = vec![
            Body::circle(&BodyOptions::default()).unwrap(),
            Body::circle(&BodyOptions::default().fixed()).unwrap(),
        ];
        let mut field = ConstantAcceleration::new(Vector2::new(1.0, -2.0));
        field.behave(&mut Bodies::new(&mut bodies), 1.0);

        assert_eq!(bodies[0].state().acc, Vector2::new(1.0, -2.0));
        assert_eq!(bodies[1].state().acc, Vector2::zero());
    }

    #[test]
    fn test_try_new_rejects_nan() {
        assert!(ConstantAcceleration::try_new(Vector2::new(f64::NAN, 0.0)).is_err());
        assert!(ConstantAcceleration::try_new(Vector2::new(0.0, 1.0)).is_ok());
    }

    #[test]
    #[should_panic(expected = "Acceleration must be finite")]
    fn test_new_panics_on_infinite() {
        ConstantAcceleration::new(Vector2::new(0.0, f64::INFINITY));
    }
}
