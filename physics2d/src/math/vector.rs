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
//! Two-dimensional vector value type
//!
//! `Vector2` is `Copy`, so every temporary lives on the stack and two
//! logically distinct vectors can never alias. The fluent mutators
//! (`vadd`, `mult`, `rotate`, ...) return `&mut Self` for chaining on a
//! single instance; the operator overloads return fresh values.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// 2D vector with double-precision components
///
/// # Examples
///
/// ```
/// use physics2d::math::Vector2;
///
/// let mut v = Vector2::new(3.0, 4.0);
/// assert_eq!(v.norm(), 5.0);
///
/// v.mult(2.0).vadd(Vector2::new(1.0, 0.0));
/// assert_eq!(v, Vector2::new(7.0, 8.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    /// Horizontal component
    pub x: f64,
    /// Vertical component
    pub y: f64,
}

impl Vector2 {
    /// Zero vector
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    /// Create a new vector
    pub const fn new(x: f64, y: f64) -> Self {
        Vector2 { x, y }
    }

    /// Create the zero vector
    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Unit vector pointing at `angle` radians from the x-axis
    pub fn from_angle(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vector2::new(cos, sin)
    }

    /// Overwrite both components
    pub fn set(&mut self, x: f64, y: f64) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Overwrite with another vector's components
    pub fn clone_from_vec(&mut self, other: Vector2) -> &mut Self {
        self.x = other.x;
        self.y = other.y;
        self
    }

    /// Add `other` in place
    pub fn vadd(&mut self, other: Vector2) -> &mut Self {
        self.x += other.x;
        self.y += other.y;
        self
    }

    /// Subtract `other` in place
    pub fn vsub(&mut self, other: Vector2) -> &mut Self {
        self.x -= other.x;
        self.y -= other.y;
        self
    }

    /// Scale in place
    pub fn mult(&mut self, factor: f64) -> &mut Self {
        self.x *= factor;
        self.y *= factor;
        self
    }

    /// Negate in place
    pub fn negate(&mut self) -> &mut Self {
        self.x = -self.x;
        self.y = -self.y;
        self
    }

    /// Rotate counter-clockwise by `angle` radians in place
    pub fn rotate(&mut self, angle: f64) -> &mut Self {
        let (sin, cos) = angle.sin_cos();
        let x = self.x * cos - self.y * sin;
        let y = self.x * sin + self.y * cos;
        self.x = x;
        self.y = y;
        self
    }

    /// Rotate by +90° in place (`(x, y) -> (-y, x)`)
    pub fn perp(&mut self) -> &mut Self {
        let x = self.x;
        self.x = -self.y;
        self.y = x;
        self
    }

    /// Normalize in place; the zero vector is left unchanged
    pub fn normalize(&mut self) -> &mut Self {
        let norm = self.norm();
        if norm > 0.0 {
            self.x /= norm;
            self.y /= norm;
        }
        self
    }

    /// Dot product
    #[inline]
    pub fn dot(self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Scalar z-component of the 3D cross product
    #[inline]
    pub fn cross(self, other: Vector2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Cross product of a scalar angular quantity with this vector (`ω × r`)
    #[inline]
    pub fn cross_scalar(omega: f64, r: Vector2) -> Vector2 {
        Vector2::new(-omega * r.y, omega * r.x)
    }

    /// Squared length
    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.dot(self)
    }

    /// Length
    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// Squared distance to `other`
    #[inline]
    pub fn dist_sq(self, other: Vector2) -> f64 {
        (self - other).norm_sq()
    }

    /// Distance to `other`
    #[inline]
    pub fn dist(self, other: Vector2) -> f64 {
        self.dist_sq(other).sqrt()
    }

    /// Unit vector in the same direction, or zero for the zero vector
    pub fn normalized(self) -> Vector2 {
        let mut v = self;
        v.normalize();
        v
    }

    /// Copy rotated counter-clockwise by `angle` radians
    pub fn rotated(self, angle: f64) -> Vector2 {
        let mut v = self;
        v.rotate(angle);
        v
    }

    /// Copy rotated by +90°
    pub fn perpendicular(self) -> Vector2 {
        Vector2::new(-self.y, self.x)
    }

    /// Angle from the positive x-axis in radians
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Check if both components are finite (not NaN or infinite)
    pub fn is_valid(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Get the vector as an array
    pub fn as_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Create a vector from an array
    pub fn from_array(arr: [f64; 2]) -> Self {
        Vector2::new(arr[0], arr[1])
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vector2> for f64 {
    type Output = Vector2;

    fn mul(self, rhs: Vector2) -> Vector2 {
        rhs * self
    }
}

impl Div<f64> for Vector2 {
    type Output = Vector2;

    fn div(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.vadd(rhs);
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        self.vsub(rhs);
    }
}

impl MulAssign<f64> for Vector2 {
    fn mul_assign(&mut self, rhs: f64) {
        self.mult(rhs);
    }
}

impl From<(f64, f64)> for Vector2 {
    fn from((x, y): (f64, f64)) -> Self {
        Vector2::new(x, y)
    }
}
