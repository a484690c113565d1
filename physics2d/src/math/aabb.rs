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
//! Axis-aligned bounding boxes
//!
//! Boxes are stored as a center plus half-extents. They are derived from a
//! body's geometry every step and never persisted as body state.

use super::Vector2;

/// Axis-aligned bounding box (center + half-extents)
///
/// # Examples
///
/// ```
/// use physics2d::math::{Aabb, Vector2};
///
/// let aabb = Aabb::from_corners(Vector2::new(13.0, 9.0), Vector2::new(20.0, 21.0));
/// assert_eq!(aabb.center(), Vector2::new(16.5, 15.0));
/// assert_eq!(aabb.half_extents(), Vector2::new(3.5, 6.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    center: Vector2,
    half: Vector2,
}

impl Aabb {
    /// Create a box from its center and (non-negative) half-extents
    pub fn new(center: Vector2, half_width: f64, half_height: f64) -> Self {
        Aabb {
            center,
            half: Vector2::new(half_width.abs(), half_height.abs()),
        }
    }

    /// Create a box spanning two opposite corners, in any order
    pub fn from_corners(a: Vector2, b: Vector2) -> Self {
        let min = Vector2::new(a.x.min(b.x), a.y.min(b.y));
        let max = Vector2::new(a.x.max(b.x), a.y.max(b.y));
        Aabb {
            center: (min + max) * 0.5,
            half: (max - min) * 0.5,
        }
    }

    /// Smallest box containing every point; `None` for an empty input
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vector2>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| {
            (
                Vector2::new(min.x.min(p.x), min.y.min(p.y)),
                Vector2::new(max.x.max(p.x), max.y.max(p.y)),
            )
        });
        Some(Aabb::from_corners(min, max))
    }

    /// Center of the box
    pub fn center(&self) -> Vector2 {
        self.center
    }

    /// Half-extents of the box
    pub fn half_extents(&self) -> Vector2 {
        self.half
    }

    /// Lower-left corner
    pub fn min(&self) -> Vector2 {
        self.center - self.half
    }

    /// Upper-right corner
    pub fn max(&self) -> Vector2 {
        self.center + self.half
    }

    /// Lower bound along axis 0 (x) or 1 (y)
    #[inline]
    pub fn min_on(&self, axis: usize) -> f64 {
        if axis == 0 {
            self.center.x - self.half.x
        } else {
            self.center.y - self.half.y
        }
    }

    /// Upper bound along axis 0 (x) or 1 (y)
    #[inline]
    pub fn max_on(&self, axis: usize) -> f64 {
        if axis == 0 {
            self.center.x + self.half.x
        } else {
            self.center.y + self.half.y
        }
    }

    /// Check whether `point` lies inside or on the boundary
    pub fn contains(&self, point: Vector2) -> bool {
        (point.x - self.center.x).abs() <= self.half.x
            && (point.y - self.center.y).abs() <= self.half.y
    }

    /// Check whether two boxes overlap; touching boundaries count as overlap
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        (self.center.x - other.center.x).abs() <= self.half.x + other.half.x
            && (self.center.y - other.center.y).abs() <= self.half.y + other.half.y
    }

    /// Copy shifted by `offset`
    pub fn translated(&self, offset: Vector2) -> Aabb {
        Aabb {
            center: self.center + offset,
            half: self.half,
        }
    }

    /// Shift in place by `offset`
    pub fn translate(&mut self, offset: Vector2) -> &mut Self {
        self.center.vadd(offset);
        self
    }

    /// Check if center and extents are finite
    pub fn is_valid(&self) -> bool {
        self.center.is_valid() && self.half.is_valid()
    }
}
