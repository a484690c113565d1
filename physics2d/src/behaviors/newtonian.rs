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
//! Pairwise inverse-square attraction
//!
//! Every body attracts every other body with an acceleration proportional to
//! the *other* body's mass and inversely proportional to the squared
//! distance between centroids:
//!
//! **a_A = strength · m_B / d² · r̂**, where r̂ points from A to B.
//!
//! # Singularities
//!
//! Pairs closer than the tolerance (compared on the squared distance) are
//! skipped rather than softened, so overlapping bodies never receive an
//! unbounded kick. An optional maximum distance cuts off far pairs.
//!
//! # Parallel Computation
//!
//! For N bodies there are N·(N-1) directed interactions. Each body's total is
//! an independent fold over the others in slot order, so with the `parallel`
//! feature the per-body sums are distributed over Rayon without changing a
//! single bit of the result.

use super::{Behavior, Bodies};
use crate::body::Body;
use crate::error::ConfigurationError;
use crate::math::Vector2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Below this many bodies the sums are always computed on the calling thread
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Law {
    strength: f64,
    tolerance: f64,
    max_distance_sq: Option<f64>,
}

impl Law {
    /// Total acceleration on the body at `index` from every other body
    fn acceleration_on(&self, index: usize, bodies: &[Body]) -> Vector2 {
        let target = &bodies[index];
        let mut total = Vector2::zero();
        if target.is_fixed() {
            return total;
        }

        for (other_index, other) in bodies.iter().enumerate() {
            if other_index == index {
                continue;
            }

            let r = other.position() - target.position();
            let d_sq = r.norm_sq();
            if d_sq <= self.tolerance {
                tracing::trace!(index, other_index, d_sq, "newtonian pair within tolerance");
                continue;
            }
            if let Some(max_sq) = self.max_distance_sq {
                if d_sq > max_sq {
                    continue;
                }
            }

            let g = self.strength / d_sq;
            let contribution = r.normalized() * (g * other.mass());
            if !contribution.is_valid() {
                tracing::trace!(index, other_index, "newtonian pair produced non-finite acceleration");
                continue;
            }
            total += contribution;
        }
        total
    }
}

/// Mutual inverse-square attraction between all bodies
///
/// # Example
///
/// ```
/// use physics2d::behaviors::Newtonian;
///
/// let gravity = Newtonian::new(0.5).with_max_distance(1000.0);
/// assert_eq!(gravity.tolerance(), 50.0);
/// ```
#[derive(Debug, Clone)]
pub struct Newtonian {
    law: Law,
    /// Per-body results, reused across steps
    accels: Vec<Vector2>,
}

impl Newtonian {
    /// Create an attraction with the given strength
    ///
    /// The tolerance defaults to `100 · strength`.
    ///
    /// # Panics
    ///
    /// Panics if `strength` is negative or not finite.
    pub fn new(strength: f64) -> Self {
        assert!(
            strength >= 0.0 && strength.is_finite(),
            "Strength must be non-negative and finite"
        );
        Newtonian {
            law: Law {
                strength,
                tolerance: 100.0 * strength,
                max_distance_sq: None,
            },
            accels: Vec::new(),
        }
    }

    /// Create an attraction, returning an error for invalid strength
    pub fn try_new(strength: f64) -> Result<Self, ConfigurationError> {
        if !(strength >= 0.0 && strength.is_finite()) {
            return Err(ConfigurationError::InvalidParameter {
                name: "strength",
                value: strength,
            });
        }
        Ok(Self::new(strength))
    }

    /// Set the squared-distance tolerance under which pairs are skipped
    ///
    /// # Panics
    ///
    /// Panics if `tolerance` is negative or not finite.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        assert!(
            tolerance >= 0.0 && tolerance.is_finite(),
            "Tolerance must be non-negative and finite"
        );
        self.law.tolerance = tolerance;
        self
    }

    /// Ignore pairs farther apart than `distance`
    ///
    /// # Panics
    ///
    /// Panics if `distance` is not positive.
    pub fn with_max_distance(mut self, distance: f64) -> Self {
        assert!(distance > 0.0, "Max distance must be positive");
        self.law.max_distance_sq = Some(distance * distance);
        self
    }

    /// Attraction strength
    pub fn strength(&self) -> f64 {
        self.law.strength
    }

    /// Squared-distance tolerance
    pub fn tolerance(&self) -> f64 {
        self.law.tolerance
    }

    /// Maximum interaction distance, if any
    pub fn max_distance(&self) -> Option<f64> {
        self.law.max_distance_sq.map(f64::sqrt)
    }

    fn compute(&mut self, bodies: &[Body]) {
        let law = self.law;
        self.accels.clear();
        self.accels.resize(bodies.len(), Vector2::zero());

        #[cfg(feature = "parallel")]
        {
            if bodies.len() >= PARALLEL_THRESHOLD {
                self.accels
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(index, out)| *out = law.acceleration_on(index, bodies));
                return;
            }
        }

        for (index, out) in self.accels.iter_mut().enumerate() {
            *out = law.acceleration_on(index, bodies);
        }
    }
}

impl Default for Newtonian {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Behavior for Newtonian {
    fn name(&self) -> &str {
        "newtonian"
    }

    fn behave(&mut self, bodies: &mut Bodies<'_>, _dt: f64) {
        if self.law.strength == 0.0 || bodies.len() < 2 {
            return;
        }
        self.compute(bodies.as_slice());
        for (index, &acc) in self.accels.iter().enumerate() {
            bodies.accelerate(index, acc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyOptions;

    fn point(x: f64, y: f64, mass: f64) -> Body {
        Body::point(&BodyOptions::at(x, y).with_mass(mass)).unwrap()
    }

    #[test]
    fn test_defaults() {
        let gravity = Newtonian::default();
        assert_eq!(gravity.strength(), 1.0);
        assert_eq!(gravity.tolerance(), 100.0);
        assert_eq!(gravity.max_distance(), None);
    }

    #[test]
    fn test_pair_accelerations_point_at_each_other() {
        let mut bodies = vec![point(0.0, 0.0, 1.0), point(20.0, 0.0, 3.0)];
        let mut gravity = Newtonian::new(1.0);
        gravity.behave(&mut Bodies::new(&mut bodies), 1.0);

        // g = 1 / 400
        let a0 = bodies[0].state().acc;
        let a1 = bodies[1].state().acc;
        assert!((a0.x - 3.0 / 400.0).abs() < 1e-15);
        assert!((a1.x + 1.0 / 400.0).abs() < 1e-15);
        assert_eq!(a0.y, 0.0);

        // Equal and opposite forces
        assert!((a0.x * 1.0 + a1.x * 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_pairs_within_tolerance_skipped() {
        // d² = 100 is not strictly above the default tolerance
        let mut bodies = vec![point(0.0, 0.0, 1.0), point(10.0, 0.0, 1.0)];
        Newtonian::new(1.0).behave(&mut Bodies::new(&mut bodies), 1.0);
        assert_eq!(bodies[0].state().acc, Vector2::zero());

        // Coincident bodies never produce NaN
        let mut bodies = vec![point(5.0, 5.0, 1.0), point(5.0, 5.0, 1.0)];
        Newtonian::new(1.0)
            .with_tolerance(0.0)
            .behave(&mut Bodies::new(&mut bodies), 1.0);
        assert!(bodies[0].state().is_valid());
        assert_eq!(bodies[0].state().acc, Vector2::zero());
    }

    #[test]
    fn test_max_distance() {
        let mut bodies = vec![point(0.0, 0.0, 1.0), point(100.0, 0.0, 1.0)];
        Newtonian::new(1.0)
            .with_max_distance(50.0)
            .behave(&mut Bodies::new(&mut bodies), 1.0);
        assert_eq!(bodies[0].state().acc, Vector2::zero());
    }

    #[test]
    fn test_fixed_bodies_attract_but_do_not_accumulate() {
        let mut bodies = vec![
            Body::point(&BodyOptions::at(0.0, 0.0).with_mass(10.0).fixed()).unwrap(),
            point(0.0, 50.0, 1.0),
        ];
        Newtonian::new(1.0).behave(&mut Bodies::new(&mut bodies), 1.0);
        assert_eq!(bodies[0].state().acc, Vector2::zero());
        assert!(bodies[1].state().acc.y < 0.0);
    }

    #[test]
    fn test_many_bodies_match_direct_sum() {
        let mut bodies: Vec<Body> = (0..80)
            .map(|i| {
                let angle = i as f64 * 0.37;
                point(angle.cos() * (50.0 + i as f64), angle.sin() * 70.0, 1.0 + (i % 3) as f64)
            })
            .collect();
        let expected: Vec<Vector2> = {
            let law = Newtonian::new(2.0).law;
            (0..bodies.len()).map(|i| law.acceleration_on(i, &bodies)).collect()
        };

        Newtonian::new(2.0).behave(&mut Bodies::new(&mut bodies), 1.0);
        for (body, acc) in bodies.iter().zip(expected) {
            assert_eq!(body.state().acc, acc);
        }
    }

    #[test]
    fn test_above_parallel_threshold_matches_sequential_fold_bitwise() {
        let bodies: Vec<Body> = (0..300)
            .map(|i| {
                let angle = i as f64 * 0.61;
                let radius = 30.0 + (i % 17) as f64 * 11.0;
                point(angle.cos() * radius, angle.sin() * radius, 0.5 + (i % 5) as f64)
            })
            .collect();

        let mut gravity = Newtonian::new(1.5).with_max_distance(400.0);
        gravity.compute(&bodies);
        assert_eq!(gravity.accels.len(), bodies.len());
        for (index, acc) in gravity.accels.iter().enumerate() {
            let expected = gravity.law.acceleration_on(index, &bodies);
            assert_eq!(acc.x.to_bits(), expected.x.to_bits(), "body {index}");
            assert_eq!(acc.y.to_bits(), expected.y.to_bits(), "body {index}");
        }
    }

    #[test]
    fn test_try_new() {
        assert!(Newtonian::try_new(-1.0).is_err());
        assert!(Newtonian::try_new(f64::NAN).is_err());
        assert!(Newtonian::try_new(0.0).is_ok());
    }
}
