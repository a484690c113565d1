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
//! Numerical integration of body state
//!
//! Integrators advance position and velocity from the acceleration that
//! behaviors accumulated during the current step. Every integrator follows
//! the same contract:
//!
//! 1. Snapshot the state into `old` (interpolation and rollback source)
//! 2. Skip fixed bodies
//! 3. Advance linear and angular state
//! 4. Zero the accumulated acceleration
//!
//! A non-positive or non-finite `dt` leaves every body untouched.
//!
//! # Integrators
//!
//! - **Symplectic Euler** (default): `v += a·dt; x += v·dt`. First order but
//!   symplectic, so energy errors stay bounded over long runs.
//! - **Improved Euler**: `x += v·dt + ½·a·dt²; v += a·dt`. Exact for constant
//!   acceleration.

use crate::body::Body;
use crate::error::ConfigurationError;

mod euler;

pub use euler::{ImprovedEuler, SymplecticEuler};

/// Check that a timestep is positive and finite
pub fn validate_timestep(dt: f64) -> Result<(), ConfigurationError> {
    if dt > 0.0 && dt.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidTimestep(dt))
    }
}

/// Total kinetic energy of a body set (fixed bodies contribute nothing)
pub fn total_kinetic_energy(bodies: &[Body]) -> f64 {
    bodies.iter().map(Body::kinetic_energy).sum()
}

/// Trait for numerical integration methods
pub trait Integrator: Send + Sync {
    /// Get the name of this integrator
    fn name(&self) -> &str;

    /// Advance one non-fixed body by `dt`
    ///
    /// Called after the snapshot has been taken. Implementations only update
    /// position and velocity; the caller clears acceleration.
    fn advance(&self, body: &mut Body, dt: f64);

    /// Integrate motion for a collection of bodies
    ///
    /// Returns the number of bodies advanced (fixed bodies are not counted).
    fn integrate(&self, bodies: &mut [Body], dt: f64) -> usize {
        if validate_timestep(dt).is_err() {
            return 0;
        }

        let mut count = 0;
        for body in bodies.iter_mut() {
            body.state_mut().snapshot();
            if !body.is_fixed() {
                self.advance(body, dt);
                count += 1;
            }
            body.state_mut().clear_acceleration();
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyOptions;
    use crate::math::Vector2;

    // Mass-spring system along x: a = -k/m · x
    struct HarmonicOscillator {
        spring_constant: f64,
        mass: f64,
    }

    impl HarmonicOscillator {
        fn energy(&self, x: f64, v: f64) -> f64 {
            0.5 * self.mass * v * v + 0.5 * self.spring_constant * x * x
        }
    }

    #[test]
    fn test_validate_timestep() {
        assert!(validate_timestep(1.0 / 60.0).is_ok());
        assert_eq!(validate_timestep(0.0), Err(ConfigurationError::InvalidTimestep(0.0)));
        assert!(validate_timestep(-1.0).is_err());
        assert!(validate_timestep(f64::INFINITY).is_err());
        assert!(validate_timestep(f64::NAN).is_err());
    }

    #[test]
    fn test_symplectic_energy_stays_bounded() {
        let sho = HarmonicOscillator {
            spring_constant: 100.0,
            mass: 1.0,
        };
        let mut bodies = vec![Body::point(&BodyOptions::at(1.0, 0.0)).unwrap()];
        let integrator = SymplecticEuler;
        let dt = 0.001;
        let e0 = sho.energy(1.0, 0.0);

        let mut max_error: f64 = 0.0;
        for _ in 0..10_000 {
            let x = bodies[0].position().x;
            bodies[0].accelerate(Vector2::new(-sho.spring_constant / sho.mass * x, 0.0));
            integrator.integrate(&mut bodies, dt);
            let state = bodies[0].state();
            let error = (sho.energy(state.pos.x, state.vel.x) - e0).abs() / e0;
            max_error = max_error.max(error);
        }
        // Bounded oscillation, no secular drift
        assert!(max_error < 0.02, "energy error {max_error}");
    }

    #[test]
    fn test_total_kinetic_energy() {
        let bodies = vec![
            Body::point(&BodyOptions::default().with_velocity(2.0, 0.0)).unwrap(),
            Body::point(&BodyOptions::default().with_velocity(0.0, 2.0).fixed()).unwrap(),
        ];
        assert_eq!(total_kinetic_energy(&bodies), 2.0);
    }
}
