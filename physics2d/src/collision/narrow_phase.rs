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
//! Exact overlap tests and contact generation
//!
//! # Pair handling
//!
//! | A \ B    | point/circle        | polygon/rectangle |
//! |----------|---------------------|-------------------|
//! | point/circle | closed form     | SAT               |
//! | polygon  | SAT (mirrored)      | SAT + clipping    |
//!
//! A point is a circle of radius zero; two points never collide.
//!
//! # Separating axis test
//!
//! Polygon pairs test every edge normal of A, then every edge normal of B,
//! and keep the axis of least overlap. When A's and B's best axes are equal
//! within tolerance, A's wins, so ties always resolve towards the body
//! registered first. The edge of the winning axis is the *reference* face;
//! the most anti-parallel edge of the other polygon is the *incident* face.
//! The incident face is clipped against the side planes of the reference
//! face, and the clipped points behind the reference face become the
//! contact points (one or two).
//!
//! Circle/polygon pairs test every edge normal plus the axis from the
//! polygon vertex closest to the circle center.
//!
//! The contact normal always points from A to B and the reported
//! penetration is the overlap along it; non-positive overlap is no contact.

use super::contact::{CandidatePair, Contact};
use crate::body::{Body, BodyId};
use crate::math::Vector2;
use crate::scratch::{ScratchConfig, ScratchPool, ScratchStats};

/// Relative tolerance for preferring A's separating axis over B's
const AXIS_TIE_TOLERANCE: f64 = 1e-9;

/// Squared distance under which two clipped points are merged
const POINT_MERGE_DISTANCE_SQ: f64 = 1e-18;

/// Contact generator for candidate pairs
///
/// Polygon vertex and normal lists are transformed into world space in
/// pooled scratch buffers, so steady-state detection allocates nothing.
pub struct NarrowPhase {
    scratch: ScratchPool<Vector2>,
}

impl NarrowPhase {
    /// Create a narrow phase with default scratch configuration
    pub fn new() -> Self {
        Self::with_config(ScratchConfig::default())
    }

    /// Create a narrow phase with custom scratch configuration
    pub fn with_config(config: ScratchConfig) -> Self {
        NarrowPhase {
            scratch: ScratchPool::with_config(config),
        }
    }

    /// Scratch buffer reuse statistics
    pub fn scratch_stats(&self) -> ScratchStats {
        self.scratch.stats()
    }

    /// Test every candidate pair, appending contacts to `contacts`
    ///
    /// `contacts` is cleared first. Contacts are produced in pair order.
    /// Returns the number of contacts found.
    pub fn detect(
        &self,
        bodies: &[Body],
        pairs: &[CandidatePair],
        contacts: &mut Vec<Contact>,
    ) -> usize {
        contacts.clear();
        for pair in pairs {
            let (Some(a), Some(b)) = (bodies.get(pair.a()), bodies.get(pair.b())) else {
                continue;
            };
            if let Some(contact) = self.collide((pair.a(), a), (pair.b(), b)) {
                contacts.push(contact);
            }
        }
        contacts.len()
    }

    /// Exact test for one pair of bodies at the given slots
    pub fn collide(&self, a: (usize, &Body), b: (usize, &Body)) -> Option<Contact> {
        let (slot_a, body_a) = a;
        let (slot_b, body_b) = b;
        let ids = (
            body_a.id().unwrap_or(BodyId::new(slot_a as u64)),
            body_b.id().unwrap_or(BodyId::new(slot_b as u64)),
        );

        let manifold = match (
            body_a.geometry().round_radius(),
            body_b.geometry().round_radius(),
        ) {
            (Some(ra), Some(rb)) => {
                if ra == 0.0 && rb == 0.0 {
                    None
                } else {
                    circle_circle(body_a.position(), ra, body_b.position(), rb)
                }
            }
            (Some(ra), None) => {
                let mut verts = self.scratch.acquire();
                let mut normals = self.scratch.acquire();
                body_b.world_vertices(&mut verts);
                body_b.world_normals(&mut normals);
                circle_polygon(body_a.position(), ra, &verts, &normals)
            }
            (None, Some(rb)) => {
                let mut verts = self.scratch.acquire();
                let mut normals = self.scratch.acquire();
                body_a.world_vertices(&mut verts);
                body_a.world_normals(&mut normals);
                circle_polygon(body_b.position(), rb, &verts, &normals)
                    .map(Manifold::flipped)
            }
            (None, None) => {
                let mut verts_a = self.scratch.acquire();
                let mut normals_a = self.scratch.acquire();
                let mut verts_b = self.scratch.acquire();
                let mut normals_b = self.scratch.acquire();
                body_a.world_vertices(&mut verts_a);
                body_a.world_normals(&mut normals_a);
                body_b.world_vertices(&mut verts_b);
                body_b.world_normals(&mut normals_b);
                polygon_polygon(
                    Polygon {
                        vertices: &verts_a,
                        normals: &normals_a,
                    },
                    Polygon {
                        vertices: &verts_b,
                        normals: &normals_b,
                    },
                )
            }
        }?;

        if !(manifold.penetration > 0.0) || !manifold.normal.is_valid() {
            return None;
        }
        Some(Contact::new(
            (slot_a, slot_b),
            ids,
            manifold.normal,
            manifold.penetration,
            manifold.points(),
        ))
    }
}

impl Default for NarrowPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NarrowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrowPhase")
            .field("scratch", &self.scratch.stats())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
struct Manifold {
    normal: Vector2,
    penetration: f64,
    points: [Vector2; 2],
    count: usize,
}

impl Manifold {
    fn single(normal: Vector2, penetration: f64, point: Vector2) -> Self {
        Manifold {
            normal,
            penetration,
            points: [point, Vector2::zero()],
            count: 1,
        }
    }

    fn flipped(mut self) -> Self {
        self.normal.negate();
        self
    }

    fn points(&self) -> &[Vector2] {
        &self.points[..self.count]
    }
}

#[derive(Clone, Copy)]
struct Polygon<'a> {
    vertices: &'a [Vector2],
    normals: &'a [Vector2],
}

impl Polygon<'_> {
    fn len(&self) -> usize {
        self.vertices.len()
    }

    /// (min, max) of the projection onto `axis`
    fn project(&self, axis: Vector2) -> (f64, f64) {
        self.vertices
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                let d = v.dot(axis);
                (lo.min(d), hi.max(d))
            })
    }
}

fn circle_circle(ca: Vector2, ra: f64, cb: Vector2, rb: f64) -> Option<Manifold> {
    let d = cb - ca;
    let radii = ra + rb;
    let dist_sq = d.norm_sq();
    if dist_sq >= radii * radii {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 0.0 {
        d / dist
    } else {
        // Concentric: any direction separates them
        Vector2::new(1.0, 0.0)
    };
    let penetration = radii - dist;
    let point = ca + normal * (ra - 0.5 * penetration);
    Some(Manifold::single(normal, penetration, point))
}

/// Circle (as A) against polygon (as B); normal points from circle to polygon
fn circle_polygon(
    center: Vector2,
    radius: f64,
    vertices: &[Vector2],
    normals: &[Vector2],
) -> Option<Manifold> {
    let polygon = Polygon { vertices, normals };
    if polygon.len() < 3 {
        return None;
    }

    // Normal from circle to polygon along the axis of least overlap
    let mut best_normal = Vector2::zero();
    let mut best_overlap = f64::INFINITY;
    let mut test_axis = |axis: Vector2| -> bool {
        let (lo, hi) = polygon.project(axis);
        let c = center.dot(axis);
        let forward = hi - (c - radius);
        let backward = (c + radius) - lo;
        let overlap = forward.min(backward);
        if overlap <= 0.0 {
            return false;
        }
        if overlap < best_overlap {
            best_overlap = overlap;
            // Leaving towards +axis puts the polygon on the -axis side
            best_normal = if forward < backward { -axis } else { axis };
        }
        true
    };

    for &normal in normals {
        if !test_axis(normal) {
            return None;
        }
    }

    let closest = vertices
        .iter()
        .copied()
        .fold((Vector2::zero(), f64::INFINITY), |best, v| {
            let d = v.dist_sq(center);
            if d < best.1 {
                (v, d)
            } else {
                best
            }
        })
        .0;
    let vertex_axis = center - closest;
    if vertex_axis.norm_sq() > 0.0 && !test_axis(vertex_axis.normalized()) {
        return None;
    }

    let normal = best_normal;
    let point = center + normal * (radius - 0.5 * best_overlap);
    Some(Manifold::single(normal, best_overlap, point))
}

/// Best face of `reference` against `incident`: (face index, separation)
///
/// Separation is negative when the polygons overlap along that face normal.
fn least_penetration(reference: Polygon<'_>, incident: Polygon<'_>) -> (usize, f64) {
    let mut best_index = 0;
    let mut best = f64::NEG_INFINITY;
    for (i, (&n, &v)) in reference.normals.iter().zip(reference.vertices).enumerate() {
        let support = incident
            .vertices
            .iter()
            .map(|&w| n.dot(w - v))
            .fold(f64::INFINITY, f64::min);
        if support > best {
            best = support;
            best_index = i;
        }
    }
    (best_index, best)
}

fn incident_face(reference_normal: Vector2, incident: Polygon<'_>) -> [Vector2; 2] {
    let mut index = 0;
    let mut min_dot = f64::INFINITY;
    for (i, &n) in incident.normals.iter().enumerate() {
        let dot = reference_normal.dot(n);
        if dot < min_dot {
            min_dot = dot;
            index = i;
        }
    }
    let next = (index + 1) % incident.len();
    [incident.vertices[index], incident.vertices[next]]
}

/// Clip a segment to the half-plane `normal·p <= offset`
///
/// Returns the number of points kept in `face` (0 to 2).
fn clip(normal: Vector2, offset: f64, face: &mut [Vector2; 2]) -> usize {
    let mut out = *face;
    let mut count = 0;
    let da = normal.dot(face[0]) - offset;
    let db = normal.dot(face[1]) - offset;

    if da <= 0.0 {
        out[count] = face[0];
        count += 1;
    }
    if db <= 0.0 {
        out[count] = face[1];
        count += 1;
    }
    if da * db < 0.0 && count < 2 {
        let alpha = da / (da - db);
        out[count] = face[0] + (face[1] - face[0]) * alpha;
        count += 1;
    }

    *face = out;
    count
}

fn polygon_polygon(a: Polygon<'_>, b: Polygon<'_>) -> Option<Manifold> {
    if a.len() < 3 || b.len() < 3 {
        return None;
    }

    let (face_a, sep_a) = least_penetration(a, b);
    if sep_a >= 0.0 {
        return None;
    }
    let (face_b, sep_b) = least_penetration(b, a);
    if sep_b >= 0.0 {
        return None;
    }

    let tolerance = AXIS_TIE_TOLERANCE * sep_a.abs().max(sep_b.abs()).max(1.0);
    let (reference, incident, face, separation, flip) = if sep_a >= sep_b - tolerance {
        (a, b, face_a, sep_a, false)
    } else {
        (b, a, face_b, sep_b, true)
    };

    let ref_normal = reference.normals[face];
    let v1 = reference.vertices[face];
    let v2 = reference.vertices[(face + 1) % reference.len()];
    let side = (v2 - v1).normalized();

    let mut points = [Vector2::zero(); 2];
    let mut count = 0;

    let mut segment = incident_face(ref_normal, incident);
    let clipped = clip(-side, -side.dot(v1), &mut segment) == 2
        && clip(side, side.dot(v2), &mut segment) == 2;
    if clipped {
        let ref_offset = ref_normal.dot(v1);
        for p in segment {
            if ref_normal.dot(p) - ref_offset <= 0.0 {
                points[count] = p;
                count += 1;
            }
        }
    }

    if count == 0 {
        // Clipping lost the face to rounding; fall back to the deepest vertex
        let deepest = incident
            .vertices
            .iter()
            .copied()
            .fold((Vector2::zero(), f64::INFINITY), |best, v| {
                let d = ref_normal.dot(v);
                if d < best.1 {
                    (v, d)
                } else {
                    best
                }
            })
            .0;
        points[0] = deepest;
        count = 1;
    } else if count == 2 && points[0].dist_sq(points[1]) <= POINT_MERGE_DISTANCE_SQ {
        count = 1;
    }

    let normal = if flip { -ref_normal } else { ref_normal };
    Some(Manifold {
        normal,
        penetration: -separation,
        points,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyOptions;
    use std::f64::consts::FRAC_PI_4;

    const EPS: f64 = 1e-9;

    fn circle(x: f64, y: f64, r: f64) -> Body {
        Body::circle(&BodyOptions::at(x, y).with_radius(r)).unwrap()
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Body {
        Body::rectangle(&BodyOptions::at(x, y).with_size(w, h)).unwrap()
    }

    fn collide(a: &Body, b: &Body) -> Option<Contact> {
        NarrowPhase::new().collide((0, a), (1, b))
    }

    #[test]
    fn test_circle_circle() {
        let contact = collide(&circle(0.0, 0.0, 2.0), &circle(3.0, 0.0, 2.0)).unwrap();
        assert_eq!(contact.normal(), Vector2::new(1.0, 0.0));
        assert!((contact.penetration() - 1.0).abs() < EPS);
        assert!((contact.points()[0] - Vector2::new(1.5, 0.0)).norm() < EPS);

        assert!(collide(&circle(0.0, 0.0, 2.0), &circle(4.0, 0.0, 2.0)).is_none());
        assert!(collide(&circle(0.0, 0.0, 2.0), &circle(5.0, 0.0, 2.0)).is_none());
    }

    #[test]
    fn test_concentric_circles() {
        let contact = collide(&circle(1.0, 1.0, 2.0), &circle(1.0, 1.0, 1.0)).unwrap();
        assert!((contact.normal().norm() - 1.0).abs() < EPS);
        assert!((contact.penetration() - 3.0).abs() < EPS);
    }

    #[test]
    fn test_points() {
        let p = Body::point(&BodyOptions::at(0.0, 0.0)).unwrap();
        let q = Body::point(&BodyOptions::at(0.0, 0.0)).unwrap();
        assert!(collide(&p, &q).is_none());

        // A point is a zero-radius circle
        let contact = collide(&p, &circle(1.0, 0.0, 2.0)).unwrap();
        assert!((contact.penetration() - 1.0).abs() < EPS);
        assert!(collide(&rect(0.0, 0.0, 2.0, 2.0), &p).is_some());
        assert!(collide(&rect(5.0, 0.0, 2.0, 2.0), &p).is_none());
    }

    #[test]
    fn test_circle_rectangle_face() {
        // Circle r=20 at (10,8) against a 10x10 square at (10,10)
        let contact = collide(&circle(10.0, 8.0, 20.0), &rect(10.0, 10.0, 10.0, 10.0)).unwrap();
        assert!(contact.penetration() > 0.0);
        assert!((contact.normal().norm() - 1.0).abs() < EPS);

        // Resting on top of the face
        let contact = collide(&rect(0.0, 0.0, 10.0, 10.0), &circle(0.0, 6.0, 2.0)).unwrap();
        assert!((contact.normal() - Vector2::new(0.0, 1.0)).norm() < EPS);
        assert!((contact.penetration() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_circle_rectangle_corner() {
        // Near the corner (5,5) but outside along the diagonal
        let corner = Vector2::new(5.0, 5.0);
        let offset = Vector2::new(1.0, 1.0).normalized() * 1.5;
        let c = corner + offset;
        assert!(collide(&rect(0.0, 0.0, 10.0, 10.0), &circle(c.x, c.y, 1.0)).is_none());

        let c = corner + Vector2::new(1.0, 1.0).normalized() * 0.5;
        let contact = collide(&circle(c.x, c.y, 1.0), &rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        let expected = -Vector2::new(1.0, 1.0).normalized();
        assert!((contact.normal() - expected).norm() < EPS);
        assert!((contact.penetration() - 0.5).abs() < EPS);
    }

    fn triangle() -> Body {
        let vertices = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(10.0, 0.0),
            Vector2::new(0.0, 10.0),
        ];
        Body::polygon(&BodyOptions::at(10.0 / 3.0, 10.0 / 3.0).with_vertices(vertices)).unwrap()
    }

    fn shifted(body: &Body, offset: Vector2) -> Body {
        let mut body = body.clone();
        body.state_mut().pos.vadd(offset);
        body
    }

    #[test]
    fn test_deep_circle_in_triangle_points_to_polygon() {
        // Closer to the hypotenuse than to the centroid's side of it
        let triangle = triangle();
        let center = triangle.position() + Vector2::new(-0.8, 0.7);
        let contact = collide(&circle(center.x, center.y, 0.1), &triangle).unwrap();

        let expected = -Vector2::new(1.0, 1.0).normalized();
        assert!((contact.normal() - expected).norm() < EPS, "{:?}", contact.normal());
        let depth = (10.0 - center.x - center.y) / 2.0_f64.sqrt() + 0.1;
        assert!((contact.penetration() - depth).abs() < EPS);

        let contact = collide(&triangle, &circle(center.x, center.y, 0.1)).unwrap();
        assert!((contact.normal() + expected).norm() < EPS);
    }

    #[test]
    fn test_moving_by_penetration_separates_circle_and_triangle() {
        let triangle = triangle();
        let mut contacts = 0;
        for i in 0..40 {
            for j in 0..40 {
                let x = -0.5 + 11.0 * (i as f64 + 0.5) / 40.0;
                let y = -0.5 + 11.0 * (j as f64 + 0.5) / 40.0;
                let disc = circle(x, y, 0.1);

                if let Some(contact) = collide(&disc, &triangle) {
                    contacts += 1;
                    let push = contact.normal() * (contact.penetration() + 1e-6);
                    let moved = shifted(&triangle, push);
                    assert!(collide(&disc, &moved).is_none(), "circle at ({x}, {y})");
                }
                if let Some(contact) = collide(&triangle, &disc) {
                    let push = contact.normal() * (contact.penetration() + 1e-6);
                    let moved = shifted(&disc, push);
                    assert!(collide(&triangle, &moved).is_none(), "circle at ({x}, {y})");
                }
            }
        }
        assert!(contacts > 500);
    }

    #[test]
    fn test_rectangle_stack_has_two_points() {
        let lower = rect(0.0, 0.0, 10.0, 10.0);
        let upper = rect(1.0, 9.0, 6.0, 10.0);
        let contact = collide(&lower, &upper).unwrap();
        assert!((contact.normal() - Vector2::new(0.0, 1.0)).norm() < EPS);
        assert!((contact.penetration() - 1.0).abs() < EPS);
        assert_eq!(contact.points().len(), 2);
        for p in contact.points() {
            assert!((p.y - 4.0).abs() < EPS);
            assert!(p.x >= -2.0 - EPS && p.x <= 4.0 + EPS);
        }

        // Swapping the order flips the normal
        let contact = collide(&upper, &lower).unwrap();
        assert!((contact.normal() - Vector2::new(0.0, -1.0)).norm() < EPS);
    }

    #[test]
    fn test_rotated_square_corner_single_point() {
        let ground = rect(0.0, 0.0, 20.0, 2.0);
        let half_diag = 2.0_f64.sqrt();
        let diamond = Body::rectangle(
            &BodyOptions::at(0.0, 1.0 + half_diag - 0.25)
                .with_size(2.0, 2.0)
                .with_angle(FRAC_PI_4),
        )
        .unwrap();
        let contact = collide(&ground, &diamond).unwrap();
        assert_eq!(contact.points().len(), 1);
        assert!((contact.penetration() - 0.25).abs() < 1e-6);
        assert!((contact.normal() - Vector2::new(0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_separated_polygons() {
        assert!(collide(&rect(0.0, 0.0, 2.0, 2.0), &rect(3.0, 0.0, 2.0, 2.0)).is_none());
        // Touching is not a contact
        assert!(collide(&rect(0.0, 0.0, 2.0, 2.0), &rect(2.0, 0.0, 2.0, 2.0)).is_none());
    }

    #[test]
    fn test_identical_overlap_prefers_first_body() {
        let a = rect(0.0, 0.0, 4.0, 4.0);
        let b = rect(3.0, 0.0, 4.0, 4.0);
        let contact = collide(&a, &b).unwrap();
        assert!((contact.normal() - Vector2::new(1.0, 0.0)).norm() < EPS);
        assert!((contact.penetration() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_detect_keeps_pair_order() {
        let bodies = vec![
            circle(0.0, 0.0, 1.0),
            circle(1.5, 0.0, 1.0),
            circle(50.0, 0.0, 1.0),
            circle(3.0, 0.0, 1.0),
        ];
        let pairs = [
            CandidatePair::new(0, 1),
            CandidatePair::new(0, 2),
            CandidatePair::new(1, 3),
        ];
        let narrow = NarrowPhase::new();
        let mut contacts = Vec::new();
        assert_eq!(narrow.detect(&bodies, &pairs, &mut contacts), 2);
        assert_eq!(contacts[0].slots(), (0, 1));
        assert_eq!(contacts[1].slots(), (1, 3));

        // Second pass reuses scratch buffers
        narrow.detect(&bodies, &pairs, &mut contacts);
        assert_eq!(contacts.len(), 2);
    }

    #[test]
    fn test_scratch_reused_for_polygons() {
        let bodies = vec![rect(0.0, 0.0, 2.0, 2.0), rect(1.0, 0.0, 2.0, 2.0)];
        let pairs = [CandidatePair::new(0, 1)];
        let narrow = NarrowPhase::new();
        let mut contacts = Vec::new();
        for _ in 0..3 {
            narrow.detect(&bodies, &pairs, &mut contacts);
        }
        let stats = narrow.scratch_stats();
        assert_eq!(stats.misses, 4);
        assert_eq!(stats.hits, 8);
    }
}
