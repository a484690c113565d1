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
//! Collision pairs and contact manifolds

use crate::body::BodyId;
use crate::math::Vector2;

/// Unordered pair of body slots whose bounding boxes overlap
///
/// Always stored with the lower slot first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidatePair {
    a: usize,
    b: usize,
}

impl CandidatePair {
    /// Create a pair, ordering the slots
    pub fn new(first: usize, second: usize) -> Self {
        if first <= second {
            CandidatePair { a: first, b: second }
        } else {
            CandidatePair { a: second, b: first }
        }
    }

    /// Lower slot
    pub fn a(&self) -> usize {
        self.a
    }

    /// Higher slot
    pub fn b(&self) -> usize {
        self.b
    }
}

/// Contact manifold between two overlapping bodies
///
/// `normal` is unit length and points from body A towards body B;
/// `penetration` is strictly positive. Holds one or two world-space contact
/// points inline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    slots: (usize, usize),
    body_a: BodyId,
    body_b: BodyId,
    normal: Vector2,
    penetration: f64,
    points: [Vector2; 2],
    point_count: usize,
}

impl Contact {
    pub(crate) fn new(
        slots: (usize, usize),
        ids: (BodyId, BodyId),
        normal: Vector2,
        penetration: f64,
        points: &[Vector2],
    ) -> Self {
        debug_assert!(!points.is_empty() && points.len() <= 2);
        let mut inline = [Vector2::zero(); 2];
        let point_count = points.len().min(2);
        inline[..point_count].copy_from_slice(&points[..point_count]);
        Contact {
            slots,
            body_a: ids.0,
            body_b: ids.1,
            normal,
            penetration,
            points: inline,
            point_count,
        }
    }

    /// First body of the pair
    pub fn body_a(&self) -> BodyId {
        self.body_a
    }

    /// Second body of the pair
    pub fn body_b(&self) -> BodyId {
        self.body_b
    }

    /// Body slots in the world at detection time
    pub fn slots(&self) -> (usize, usize) {
        self.slots
    }

    /// Unit normal from A to B
    pub fn normal(&self) -> Vector2 {
        self.normal
    }

    /// Overlap depth along the normal
    pub fn penetration(&self) -> f64 {
        self.penetration
    }

    /// World-space contact points (one or two)
    pub fn points(&self) -> &[Vector2] {
        &self.points[..self.point_count]
    }

    /// Check whether the contact involves `id`
    pub fn involves(&self, id: BodyId) -> bool {
        self.body_a == id || self.body_b == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_orders_slots() {
        let pair = CandidatePair::new(7, 2);
        assert_eq!((pair.a(), pair.b()), (2, 7));
        assert_eq!(pair, CandidatePair::new(2, 7));
        assert!(CandidatePair::new(1, 9) < CandidatePair::new(2, 3));
    }

    #[test]
    fn test_contact_points_inline() {
        let contact = Contact::new(
            (0, 1),
            (BodyId::new(4), BodyId::new(5)),
            Vector2::new(0.0, 1.0),
            0.5,
            &[Vector2::new(1.0, 1.0), Vector2::new(2.0, 1.0)],
        );
        assert_eq!(contact.points().len(), 2);
        assert!(contact.involves(BodyId::new(5)));
        assert!(!contact.involves(BodyId::new(6)));

        let single = Contact::new(
            (0, 1),
            (BodyId::new(4), BodyId::new(5)),
            Vector2::new(1.0, 0.0),
            0.1,
            &[Vector2::zero()],
        );
        assert_eq!(single.points(), &[Vector2::zero()]);
    }
}
