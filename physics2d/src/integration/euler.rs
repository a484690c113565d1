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
//! Euler-family integrators
//!
//! # Algorithms
//!
//! Symplectic (semi-implicit) Euler uses the *new* velocity to move:
//!
//! ```text
//! v(t + dt) = v(t) + a(t)*dt
//! x(t + dt) = x(t) + v(t + dt)*dt
//! ```
//!
//! Improved Euler adds the second-order position term:
//!
//! ```text
//! x(t + dt) = x(t) + v(t)*dt + 0.5*a(t)*dt²
//! v(t + dt) = v(t) + a(t)*dt
//! ```
//!
//! Both treat the angular state the same way as the linear one.
//!
//! # References
//!
//! - Hairer, E., Lubich, C., & Wanner, G. (2006). Geometric Numerical Integration
//!   (2nd ed.). Springer. Section VI.3.

use super::Integrator;
use crate::body::Body;

/// Semi-implicit Euler integrator, the default for worlds
///
/// # Example
///
/// ```
/// use physics2d::body::{Body, BodyOptions};
/// use physics2d::integration::{Integrator, SymplecticEuler};
/// use physics2d::math::Vector2;
///
/// let mut bodies = vec![Body::point(&BodyOptions::default()).unwrap()];
/// bodies[0].accelerate(Vector2::new(0.0, 2.0));
/// SymplecticEuler.integrate(&mut bodies, 0.5);
/// assert_eq!(bodies[0].state().vel, Vector2::new(0.0, 1.0));
/// assert_eq!(bodies[0].position(), Vector2::new(0.0, 0.5));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymplecticEuler;

impl Integrator for SymplecticEuler {
    fn name(&self) -> &str {
        "symplectic-euler"
    }

    fn advance(&self, body: &mut Body, dt: f64) {
        let state = body.state_mut();
        let acc = state.acc;
        state.vel.vadd(acc * dt);
        let vel = state.vel;
        state.pos.vadd(vel * dt);

        state.angular.vel += state.angular.acc * dt;
        state.angular.pos += state.angular.vel * dt;
    }
}

/// Second-order position update for constant acceleration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImprovedEuler;

impl Integrator for ImprovedEuler {
    fn name(&self) -> &str {
        "improved-euler"
    }

    fn advance(&self, body: &mut Body, dt: f64) {
        let half_dt_sq = 0.5 * dt * dt;
        let state = body.state_mut();
        let (vel, acc) = (state.vel, state.acc);
        state.pos.vadd(vel * dt + acc * half_dt_sq);
        state.vel.vadd(acc * dt);

        let angular = &mut state.angular;
        angular.pos += angular.vel * dt + angular.acc * half_dt_sq;
        angular.vel += angular.acc * dt;
    }
}
