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
//! Kinematic state of a body
//!
//! Linear and angular position, velocity, and acceleration, plus a snapshot
//! of the previous step used for interpolation and rollback.

use crate::math::Vector2;

/// Scalar rotation about the body centroid
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngularState {
    /// Orientation in radians
    pub pos: f64,
    /// Angular velocity in radians per time unit
    pub vel: f64,
    /// Angular acceleration in radians per time unit squared
    pub acc: f64,
}

impl AngularState {
    /// Check if all fields are finite
    pub fn is_valid(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite() && self.acc.is_finite()
    }
}

/// Copy of the kinematic fields taken once per step
///
/// Never used for live math; only for interpolation and rollback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Snapshot {
    /// Centroid position
    pub pos: Vector2,
    /// Linear velocity
    pub vel: Vector2,
    /// Linear acceleration
    pub acc: Vector2,
    /// Rotation
    pub angular: AngularState,
}

/// Full kinematic state of a body
///
/// # Examples
///
/// ```
/// use physics2d::body::BodyState;
/// use physics2d::math::Vector2;
///
/// let mut state = BodyState::at(Vector2::new(1.0, 2.0));
/// state.snapshot();
/// state.pos.x = 3.0;
/// assert_eq!(state.interpolated_pos(0.5), Vector2::new(2.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyState {
    /// Centroid position in world space
    pub pos: Vector2,
    /// Linear velocity
    pub vel: Vector2,
    /// Linear acceleration accumulated for the current step
    pub acc: Vector2,
    /// Rotation about the centroid
    pub angular: AngularState,
    /// State at the start of the last integrated step
    pub old: Snapshot,
}

impl BodyState {
    /// State at rest at `pos`
    pub fn at(pos: Vector2) -> Self {
        let mut state = BodyState {
            pos,
            ..Default::default()
        };
        state.snapshot();
        state
    }

    /// Copy the current kinematics into `old`
    pub fn snapshot(&mut self) {
        self.old = Snapshot {
            pos: self.pos,
            vel: self.vel,
            acc: self.acc,
            angular: self.angular,
        };
    }

    /// Restore the kinematics saved by the last [`snapshot`](Self::snapshot)
    pub fn rollback(&mut self) {
        self.pos = self.old.pos;
        self.vel = self.old.vel;
        self.acc = self.old.acc;
        self.angular = self.old.angular;
    }

    /// Position blended between the previous and current step
    ///
    /// `alpha = 0` yields the previous position, `alpha = 1` the current one.
    pub fn interpolated_pos(&self, alpha: f64) -> Vector2 {
        self.old.pos + (self.pos - self.old.pos) * alpha
    }

    /// Orientation blended between the previous and current step
    pub fn interpolated_angle(&self, alpha: f64) -> f64 {
        self.old.angular.pos + (self.angular.pos - self.old.angular.pos) * alpha
    }

    /// Clear linear and angular acceleration
    pub fn clear_acceleration(&mut self) {
        self.acc = Vector2::zero();
        self.angular.acc = 0.0;
    }

    /// Check if every live field is finite
    pub fn is_valid(&self) -> bool {
        self.pos.is_valid() && self.vel.is_valid() && self.acc.is_valid() && self.angular.is_valid()
    }
}
