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
//! Rigid bodies
//!
//! A [`Body`] combines kinematic state, mass properties, material
//! coefficients, and exactly one [`Geometry`]. Mass properties are derived
//! by [`Body::recalc`], which runs at construction and after every mutation
//! of mass or geometry.
//!
//! Fixed bodies have infinite effective mass: their inverse mass and inverse
//! moment of inertia are zero, the integrator skips them, and impulses never
//! move them.

mod geometry;
mod state;

pub use geometry::{Circle, ConvexPolygon, Geometry, GeometryKind, Rectangle};
pub use state::{AngularState, BodyState, Snapshot};

use crate::error::{ConfigurationError, PhysicsError, Result};
use crate::math::{Aabb, Vector2};
use std::fmt;

/// Unique identifier assigned to a body when it joins a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u64);

impl BodyId {
    /// Create a new BodyId from a raw u64 value
    pub fn new(id: u64) -> Self {
        BodyId(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body({})", self.0)
    }
}

/// Initial kinematics, material, and shape parameters for body construction
///
/// Shape parameters (`radius`, `width`/`height`, `vertices`) are read only by
/// the constructor matching the requested geometry kind.
///
/// # Examples
///
/// ```
/// use physics2d::body::{Body, BodyOptions};
///
/// let ball = Body::circle(
///     &BodyOptions::at(10.0, 8.0).with_radius(20.0).with_mass(2.0),
/// ).unwrap();
/// assert_eq!(ball.moi(), 2.0 * 20.0 * 20.0 / 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BodyOptions {
    /// Centroid position
    pub pos: Vector2,
    /// Linear velocity
    pub vel: Vector2,
    /// Orientation in radians
    pub angle: f64,
    /// Angular velocity
    pub angular_vel: f64,
    /// Mass; must be positive unless `fixed`
    pub mass: f64,
    /// Restitution in `[0, 1]`
    pub restitution: f64,
    /// Coefficient of friction, non-negative
    pub cof: f64,
    /// Infinite effective mass; never integrated or pushed
    pub fixed: bool,
    /// Circle radius
    pub radius: f64,
    /// Rectangle width
    pub width: f64,
    /// Rectangle height
    pub height: f64,
    /// Polygon vertices (any winding; recentred on construction)
    pub vertices: Vec<Vector2>,
}

impl Default for BodyOptions {
    fn default() -> Self {
        BodyOptions {
            pos: Vector2::zero(),
            vel: Vector2::zero(),
            angle: 0.0,
            angular_vel: 0.0,
            mass: 1.0,
            restitution: 1.0,
            cof: 0.8,
            fixed: false,
            radius: 1.0,
            width: 1.0,
            height: 1.0,
            vertices: Vec::new(),
        }
    }
}

impl BodyOptions {
    /// Default options placed at `(x, y)`
    pub fn at(x: f64, y: f64) -> Self {
        BodyOptions {
            pos: Vector2::new(x, y),
            ..Default::default()
        }
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vel = Vector2::new(vx, vy);
        self
    }

    /// Set the initial orientation
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// Set the initial angular velocity
    pub fn with_angular_velocity(mut self, angular_vel: f64) -> Self {
        self.angular_vel = angular_vel;
        self
    }

    /// Set the mass
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Set the restitution coefficient
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set the coefficient of friction
    pub fn with_cof(mut self, cof: f64) -> Self {
        self.cof = cof;
        self
    }

    /// Mark the body as fixed (static)
    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    /// Set the circle radius
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set the rectangle size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the polygon vertices
    pub fn with_vertices(mut self, vertices: Vec<Vector2>) -> Self {
        self.vertices = vertices;
        self
    }
}

/// A simulated rigid body
#[derive(Debug, Clone)]
pub struct Body {
    id: Option<BodyId>,
    state: BodyState,
    geometry: Geometry,
    mass: f64,
    moi: f64,
    inv_mass: f64,
    inv_moi: f64,
    restitution: f64,
    cof: f64,
    fixed: bool,
}

impl Body {
    /// Create a body with the given geometry
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::NonPositiveMass`] for a non-fixed body without
    ///   positive finite mass
    /// - [`ConfigurationError::InvalidRestitution`] /
    ///   [`ConfigurationError::InvalidFriction`] for out-of-range coefficients
    /// - [`ConfigurationError::NonFiniteState`] for NaN/inf kinematics
    pub fn new(geometry: Geometry, options: &BodyOptions) -> Result<Self> {
        validate_restitution(options.restitution)?;
        validate_cof(options.cof)?;
        let kinematics_valid = options.pos.is_valid()
            && options.vel.is_valid()
            && options.angle.is_finite()
            && options.angular_vel.is_finite();
        if !kinematics_valid {
            return Err(ConfigurationError::NonFiniteState.into());
        }

        let mut state = BodyState::at(options.pos);
        state.vel = options.vel;
        state.angular.pos = options.angle;
        state.angular.vel = options.angular_vel;
        state.snapshot();

        let mut body = Body {
            id: None,
            state,
            geometry,
            mass: options.mass,
            moi: 0.0,
            inv_mass: 0.0,
            inv_moi: 0.0,
            restitution: options.restitution,
            cof: options.cof,
            fixed: options.fixed,
        };
        body.recalc()?;
        Ok(body)
    }

    /// Point body built from `options`
    pub fn point(options: &BodyOptions) -> Result<Self> {
        Body::new(Geometry::point(), options)
    }

    /// Circle body built from `options.radius`
    pub fn circle(options: &BodyOptions) -> Result<Self> {
        Body::new(Geometry::circle(options.radius)?, options)
    }

    /// Rectangle body built from `options.width` / `options.height`
    pub fn rectangle(options: &BodyOptions) -> Result<Self> {
        Body::new(Geometry::rectangle(options.width, options.height)?, options)
    }

    /// Convex polygon body built from `options.vertices`
    ///
    /// `options.pos` is the centroid position; the vertices are recentred.
    pub fn polygon(options: &BodyOptions) -> Result<Self> {
        Body::new(Geometry::polygon(options.vertices.clone())?, options)
    }

    /// Recompute derived mass properties
    ///
    /// Validates the geometry and mass, then derives the moment of inertia
    /// and the inverse mass/inertia used by the resolver.
    pub fn recalc(&mut self) -> Result<()> {
        self.geometry.validate()?;
        validate_mass(self.mass, self.fixed)?;

        self.moi = self.mass * self.geometry.unit_moi();
        if self.fixed {
            self.inv_mass = 0.0;
            self.inv_moi = 0.0;
        } else {
            self.inv_mass = 1.0 / self.mass;
            self.inv_moi = if self.moi > 0.0 { 1.0 / self.moi } else { 0.0 };
        }
        Ok(())
    }

    /// Identifier assigned by the owning world, if any
    pub fn id(&self) -> Option<BodyId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: Option<BodyId>) {
        self.id = id;
    }

    /// Kinematic state
    pub fn state(&self) -> &BodyState {
        &self.state
    }

    /// Mutable kinematic state, for teleporting or nudging between steps
    pub fn state_mut(&mut self) -> &mut BodyState {
        &mut self.state
    }

    /// Geometry
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Replace the geometry and recompute mass properties
    ///
    /// On error the body keeps its previous geometry.
    pub fn set_geometry(&mut self, geometry: Geometry) -> Result<()> {
        geometry.validate()?;
        self.geometry = geometry;
        self.recalc()
    }

    /// Mass
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Change the mass and recompute mass properties
    ///
    /// On error the body keeps its previous mass.
    pub fn set_mass(&mut self, mass: f64) -> Result<()> {
        validate_mass(mass, self.fixed)?;
        self.mass = mass;
        self.recalc()
    }

    /// Moment of inertia about the centroid
    pub fn moi(&self) -> f64 {
        self.moi
    }

    /// Inverse mass; zero for fixed bodies
    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    /// Inverse moment of inertia; zero for fixed bodies and points
    pub fn inv_moi(&self) -> f64 {
        self.inv_moi
    }

    /// Restitution coefficient
    pub fn restitution(&self) -> f64 {
        self.restitution
    }

    /// Change the restitution coefficient
    pub fn set_restitution(&mut self, restitution: f64) -> Result<()> {
        validate_restitution(restitution)?;
        self.restitution = restitution;
        Ok(())
    }

    /// Coefficient of friction
    pub fn cof(&self) -> f64 {
        self.cof
    }

    /// Change the coefficient of friction
    pub fn set_cof(&mut self, cof: f64) -> Result<()> {
        validate_cof(cof)?;
        self.cof = cof;
        Ok(())
    }

    /// Whether the body is fixed
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Toggle the fixed flag and recompute mass properties
    ///
    /// Releasing a fixed body requires a positive mass.
    pub fn set_fixed(&mut self, fixed: bool) -> Result<()> {
        validate_mass(self.mass, fixed)?;
        self.fixed = fixed;
        self.recalc()
    }

    /// Centroid position
    pub fn position(&self) -> Vector2 {
        self.state.pos
    }

    /// Orientation in radians
    pub fn angle(&self) -> f64 {
        self.state.angular.pos
    }

    /// Add to this step's linear acceleration
    pub fn accelerate(&mut self, acc: Vector2) {
        self.state.acc.vadd(acc);
    }

    /// Add to this step's angular acceleration
    pub fn accelerate_angular(&mut self, acc: f64) {
        self.state.angular.acc += acc;
    }

    /// Apply an instantaneous impulse at `arm`, relative to the centroid
    ///
    /// Fixed bodies are unaffected.
    pub fn apply_impulse(&mut self, impulse: Vector2, arm: Vector2) {
        if self.fixed {
            return;
        }
        self.state.vel.vadd(impulse * self.inv_mass);
        self.state.angular.vel += self.inv_moi * arm.cross(impulse);
    }

    /// Velocity of the material point at `arm` from the centroid (`v + ω × r`)
    pub fn velocity_at(&self, arm: Vector2) -> Vector2 {
        self.state.vel + Vector2::cross_scalar(self.state.angular.vel, arm)
    }

    /// Transform a body-local point to world space
    pub fn world_point(&self, local: Vector2) -> Vector2 {
        local.rotated(self.state.angular.pos) + self.state.pos
    }

    /// Transform a world point to body-local space
    pub fn local_point(&self, world: Vector2) -> Vector2 {
        (world - self.state.pos).rotated(-self.state.angular.pos)
    }

    /// Write world-space polygon vertices into `out`
    ///
    /// `out` is cleared first and left empty for round geometries.
    pub fn world_vertices(&self, out: &mut Vec<Vector2>) {
        out.clear();
        if let Some(poly) = self.geometry.as_polygon() {
            let (sin, cos) = self.state.angular.pos.sin_cos();
            let pos = self.state.pos;
            out.extend(poly.vertices().iter().map(|v| {
                Vector2::new(v.x * cos - v.y * sin + pos.x, v.x * sin + v.y * cos + pos.y)
            }));
        }
    }

    /// Write world-space outward edge normals into `out`
    pub fn world_normals(&self, out: &mut Vec<Vector2>) {
        out.clear();
        if let Some(poly) = self.geometry.as_polygon() {
            let angle = self.state.angular.pos;
            out.extend(poly.normals().iter().map(|n| n.rotated(angle)));
        }
    }

    /// World-space bounding box for the current state
    pub fn aabb(&self) -> Aabb {
        self.geometry
            .aabb(self.state.angular.pos)
            .translated(self.state.pos)
    }

    /// Check whether a world point lies inside the geometry
    pub fn contains_point(&self, world: Vector2) -> bool {
        self.geometry.contains(self.local_point(world))
    }

    /// Linear momentum (zero for fixed bodies)
    pub fn momentum(&self) -> Vector2 {
        if self.fixed {
            Vector2::zero()
        } else {
            self.state.vel * self.mass
        }
    }

    /// Translational plus rotational kinetic energy (zero for fixed bodies)
    pub fn kinetic_energy(&self) -> f64 {
        if self.fixed {
            return 0.0;
        }
        0.5 * self.mass * self.state.vel.norm_sq()
            + 0.5 * self.moi * self.state.angular.vel * self.state.angular.vel
    }
}

fn validate_mass(mass: f64, fixed: bool) -> std::result::Result<(), ConfigurationError> {
    let valid = if fixed {
        mass >= 0.0 && mass.is_finite()
    } else {
        mass > 0.0 && mass.is_finite()
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositiveMass(mass))
    }
}

fn validate_restitution(restitution: f64) -> std::result::Result<(), ConfigurationError> {
    if (0.0..=1.0).contains(&restitution) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidRestitution(restitution))
    }
}

fn validate_cof(cof: f64) -> std::result::Result<(), ConfigurationError> {
    if cof >= 0.0 && cof.is_finite() {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidFriction(cof))
    }
}
