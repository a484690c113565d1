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
//! Collision geometry
//!
//! Every body owns exactly one [`Geometry`]: a point, a circle, a convex
//! polygon, or a rectangle. Shapes are validated on construction, so a
//! `Geometry` value is always well-formed.
//!
//! # Conventions
//!
//! - Polygon vertices are stored counter-clockwise (positive signed area in
//!   a y-up frame). Clockwise input is accepted and reversed.
//! - Vertices are in body-local space with the centroid at the origin; a
//!   body's position is its centroid, not its first vertex.
//! - Edge `i` runs from vertex `i` to vertex `i + 1`; its outward normal is
//!   the edge direction rotated by -90°.

use crate::error::GeometryError;
use crate::math::{Aabb, Vector2};
use std::f64::consts::TAU;
use std::fmt;

/// Squared length below which an edge is treated as degenerate
const DEGENERATE_EDGE_SQ: f64 = 1e-24;

/// Discriminant of a [`Geometry`], used for pair dispatch and registry tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryKind {
    /// No extent
    Point,
    /// Disc of fixed radius
    Circle,
    /// Arbitrary convex polygon
    ConvexPolygon,
    /// Axis-aligned (in local space) rectangle
    Rectangle,
}

impl GeometryKind {
    /// Registry tag for this kind
    pub fn name(self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Circle => "circle",
            GeometryKind::ConvexPolygon => "convex-polygon",
            GeometryKind::Rectangle => "rectangle",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Disc geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    radius: f64,
}

impl Circle {
    /// Create a circle
    ///
    /// Fails with [`GeometryError::NonPositiveRadius`] unless `radius` is
    /// positive and finite.
    pub fn new(radius: f64) -> Result<Self, GeometryError> {
        if radius > 0.0 && radius.is_finite() {
            Ok(Circle { radius })
        } else {
            Err(GeometryError::NonPositiveRadius(radius))
        }
    }

    /// Radius
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

/// Convex polygon centred on its centroid
///
/// # Examples
///
/// ```
/// use physics2d::body::ConvexPolygon;
/// use physics2d::math::Vector2;
///
/// let tri = ConvexPolygon::new(vec![
///     Vector2::new(0.0, 0.0),
///     Vector2::new(3.0, 0.0),
///     Vector2::new(0.0, 3.0),
/// ]).unwrap();
/// assert_eq!(tri.area(), 4.5);
/// assert_eq!(tri.centroid(), Vector2::new(1.0, 1.0));
/// assert_eq!(tri.vertices()[0], Vector2::new(-1.0, -1.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolygon {
    vertices: Vec<Vector2>,
    normals: Vec<Vector2>,
    area: f64,
    centroid: Vector2,
    unit_moi: f64,
}

impl ConvexPolygon {
    /// Validate and centre a vertex list
    ///
    /// # Errors
    ///
    /// - [`GeometryError::TooFewVertices`] for fewer than three vertices
    /// - [`GeometryError::NonFiniteVertex`] for NaN/inf coordinates
    /// - [`GeometryError::DegenerateEdge`] for repeated consecutive vertices
    /// - [`GeometryError::ZeroArea`] for collinear outlines
    /// - [`GeometryError::NotConvex`] when the outline turns both ways
    /// - [`GeometryError::SelfIntersecting`] when it winds more than once
    pub fn new(mut vertices: Vec<Vector2>) -> Result<Self, GeometryError> {
        let n = vertices.len();
        if n < 3 {
            return Err(GeometryError::TooFewVertices(n));
        }
        if let Some(index) = vertices.iter().position(|v| !v.is_valid()) {
            return Err(GeometryError::NonFiniteVertex { index });
        }
        for i in 0..n {
            if (vertices[(i + 1) % n] - vertices[i]).norm_sq() <= DEGENERATE_EDGE_SQ {
                return Err(GeometryError::DegenerateEdge { index: i });
            }
        }

        let signed_area = signed_area(&vertices);
        if signed_area.abs() <= f64::EPSILON * bounding_scale(&vertices) {
            return Err(GeometryError::ZeroArea);
        }
        if signed_area < 0.0 {
            vertices.reverse();
        }
        check_convex(&vertices)?;

        let area = signed_area.abs();
        let centroid = centroid(&vertices, area);
        for v in vertices.iter_mut() {
            v.vsub(centroid);
        }

        let normals = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .map(|(&a, &b)| {
                let edge = b - a;
                Vector2::new(edge.y, -edge.x).normalized()
            })
            .collect();
        let unit_moi = polygon_unit_moi(&vertices);

        Ok(ConvexPolygon {
            vertices,
            normals,
            area,
            centroid,
            unit_moi,
        })
    }

    /// Vertices in local space, counter-clockwise, centroid at the origin
    pub fn vertices(&self) -> &[Vector2] {
        &self.vertices
    }

    /// Outward unit normal of each edge in local space
    pub fn normals(&self) -> &[Vector2] {
        &self.normals
    }

    /// Enclosed area
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Centroid of the vertices as originally supplied
    ///
    /// Stored vertices are shifted by this amount; the local centroid is
    /// always the origin.
    pub fn centroid(&self) -> Vector2 {
        self.centroid
    }

    /// Moment of inertia per unit mass about the centroid
    pub fn unit_moi(&self) -> f64 {
        self.unit_moi
    }

    fn aabb(&self, angle: f64) -> Aabb {
        let (sin, cos) = angle.sin_cos();
        let rotate = |v: &Vector2| Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos);
        // Never empty: construction guarantees at least three vertices
        Aabb::from_points(self.vertices.iter().map(rotate)).unwrap_or_default()
    }

    fn contains(&self, local: Vector2) -> bool {
        self.vertices
            .iter()
            .zip(&self.normals)
            .all(|(&v, &n)| n.dot(local - v) <= 0.0)
    }
}

/// Rectangle with cached sides for the closed-form inertia
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    width: f64,
    height: f64,
    polygon: ConvexPolygon,
}

impl Rectangle {
    /// Create a `width` x `height` rectangle centred on the origin
    ///
    /// The first vertex is the lower-left corner `(-width/2, -height/2)`.
    pub fn new(width: f64, height: f64) -> Result<Self, GeometryError> {
        let valid = |s: f64| s > 0.0 && s.is_finite();
        if !valid(width) || !valid(height) {
            return Err(GeometryError::NonPositiveSides { width, height });
        }
        let (hw, hh) = (width * 0.5, height * 0.5);
        let polygon = ConvexPolygon::new(vec![
            Vector2::new(-hw, -hh),
            Vector2::new(hw, -hh),
            Vector2::new(hw, hh),
            Vector2::new(-hw, hh),
        ])?;
        Ok(Rectangle {
            width,
            height,
            polygon,
        })
    }

    /// Width along local x
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height along local y
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Polygon view of the rectangle
    pub fn polygon(&self) -> &ConvexPolygon {
        &self.polygon
    }

    fn aabb(&self, angle: f64) -> Aabb {
        let (sin, cos) = angle.sin_cos();
        let (hw, hh) = (self.width * 0.5, self.height * 0.5);
        Aabb::new(
            Vector2::zero(),
            hw * cos.abs() + hh * sin.abs(),
            hw * sin.abs() + hh * cos.abs(),
        )
    }
}

/// Shape of a body
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Zero-extent point
    Point,
    /// Disc
    Circle(Circle),
    /// Convex polygon
    Polygon(ConvexPolygon),
    /// Rectangle
    Rectangle(Rectangle),
}

impl Geometry {
    /// Point geometry
    pub fn point() -> Self {
        Geometry::Point
    }

    /// Circle geometry
    pub fn circle(radius: f64) -> Result<Self, GeometryError> {
        Circle::new(radius).map(Geometry::Circle)
    }

    /// Convex polygon geometry
    pub fn polygon(vertices: Vec<Vector2>) -> Result<Self, GeometryError> {
        ConvexPolygon::new(vertices).map(Geometry::Polygon)
    }

    /// Rectangle geometry
    pub fn rectangle(width: f64, height: f64) -> Result<Self, GeometryError> {
        Rectangle::new(width, height).map(Geometry::Rectangle)
    }

    /// Discriminant of this geometry
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point => GeometryKind::Point,
            Geometry::Circle(_) => GeometryKind::Circle,
            Geometry::Polygon(_) => GeometryKind::ConvexPolygon,
            Geometry::Rectangle(_) => GeometryKind::Rectangle,
        }
    }

    /// Polygon view for polygon and rectangle geometries
    pub fn as_polygon(&self) -> Option<&ConvexPolygon> {
        match self {
            Geometry::Polygon(p) => Some(p),
            Geometry::Rectangle(r) => Some(r.polygon()),
            _ => None,
        }
    }

    /// Radius for circles, zero for points, `None` for polygons
    pub fn round_radius(&self) -> Option<f64> {
        match self {
            Geometry::Point => Some(0.0),
            Geometry::Circle(c) => Some(c.radius()),
            _ => None,
        }
    }

    /// Moment of inertia per unit mass about the centroid
    pub fn unit_moi(&self) -> f64 {
        match self {
            Geometry::Point => 0.0,
            Geometry::Circle(c) => c.radius * c.radius / 2.0,
            Geometry::Polygon(p) => p.unit_moi(),
            Geometry::Rectangle(r) => (r.height * r.height + r.width * r.width) / 12.0,
        }
    }

    /// Bounding box in body-local space rotated by `angle`
    ///
    /// The box is centred relative to the body centroid; translate it by the
    /// body position for world space.
    pub fn aabb(&self, angle: f64) -> Aabb {
        match self {
            Geometry::Point => Aabb::new(Vector2::zero(), 0.0, 0.0),
            Geometry::Circle(c) => Aabb::new(Vector2::zero(), c.radius, c.radius),
            Geometry::Polygon(p) => p.aabb(angle),
            Geometry::Rectangle(r) => r.aabb(angle),
        }
    }

    /// Check whether a point in (unrotated) body-local space is inside
    ///
    /// Points have no extent and contain nothing.
    pub fn contains(&self, local: Vector2) -> bool {
        match self {
            Geometry::Point => false,
            Geometry::Circle(c) => local.norm_sq() <= c.radius * c.radius,
            Geometry::Polygon(p) => p.contains(local),
            Geometry::Rectangle(r) => r.polygon.contains(local),
        }
    }

    /// Re-check invariants; used by `Body::recalc`
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Geometry::Point => Ok(()),
            Geometry::Circle(c) => Circle::new(c.radius).map(|_| ()),
            Geometry::Polygon(p) => {
                if p.vertices.len() < 3 {
                    Err(GeometryError::TooFewVertices(p.vertices.len()))
                } else if p.area <= 0.0 {
                    Err(GeometryError::ZeroArea)
                } else {
                    Ok(())
                }
            }
            Geometry::Rectangle(r) => Rectangle::new(r.width, r.height).map(|_| ()),
        }
    }
}

fn signed_area(vertices: &[Vector2]) -> f64 {
    let n = vertices.len();
    let twice: f64 = (0..n)
        .map(|i| vertices[i].cross(vertices[(i + 1) % n]))
        .sum();
    twice * 0.5
}

fn bounding_scale(vertices: &[Vector2]) -> f64 {
    Aabb::from_points(vertices.iter().copied())
        .map(|b| {
            let h = b.half_extents();
            4.0 * h.x * h.y
        })
        .unwrap_or(0.0)
        .max(f64::MIN_POSITIVE)
}

/// Counter-clockwise outlines must never turn clockwise and must wind once
fn check_convex(vertices: &[Vector2]) -> Result<(), GeometryError> {
    let n = vertices.len();
    let mut winding = 0.0;
    for i in 0..n {
        let e0 = vertices[(i + 1) % n] - vertices[i];
        let e1 = vertices[(i + 2) % n] - vertices[(i + 1) % n];
        let turn = e0.cross(e1);
        if turn < -1e-9 * e0.norm() * e1.norm() {
            return Err(GeometryError::NotConvex);
        }
        winding += turn.atan2(e0.dot(e1));
    }
    if winding > TAU + 1e-6 {
        return Err(GeometryError::SelfIntersecting);
    }
    Ok(())
}

fn centroid(vertices: &[Vector2], area: f64) -> Vector2 {
    let n = vertices.len();
    let mut sum = Vector2::zero();
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        sum += (a + b) * a.cross(b);
    }
    sum * (1.0 / (6.0 * area))
}

/// Closed-form polygon inertia per unit mass about the local origin
fn polygon_unit_moi(vertices: &[Vector2]) -> f64 {
    let n = vertices.len();
    let mut num = 0.0;
    let mut denom = 0.0;
    for i in 0..n {
        let prev = vertices[(i + n - 1) % n];
        let cur = vertices[i];
        let fac = prev.cross(cur).abs();
        num += fac * (cur.dot(cur) + cur.dot(prev) + prev.dot(prev));
        denom += fac;
    }
    num / (6.0 * denom)
}
