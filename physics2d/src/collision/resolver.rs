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
//! Impulse-based contact resolution
//!
//! Contacts are resolved one at a time, in the order the narrow phase
//! produced them. For each contact:
//!
//! 1. Relative velocity at every point, including `ω × r` for both bodies,
//!    measured before any impulse of this contact is applied
//! 2. Normal impulses for all points at once, so that every approaching
//!    point ends with `v_n = -e·v_n0` and no point is left approaching.
//!    A single point reduces to
//!    `j = -(1 + e)·v_n / (1/m_a + 1/m_b + (r_a×n)²/I_a + (r_b×n)²/I_b)`
//! 3. Friction impulses along the tangent, each point's total clamped to
//!    `μ·j` (Coulomb), then a second normal pass if friction applied
//!    torque
//!
//! After the velocity pass, a fraction of the penetration beyond the slop
//! is removed by moving the bodies apart in proportion to their inverse
//! masses.

use super::contact::Contact;
use crate::body::Body;
use crate::error::ConfigurationError;
use crate::math::Vector2;

/// Tangential speeds below this produce no friction impulse
const TANGENT_EPSILON: f64 = 1e-12;

/// Passes over the points of a contact when accumulating friction
const FRICTION_ITERATIONS: usize = 4;

/// Relative size below which a two-point system is treated as singular
const SINGULAR_EPSILON: f64 = 1e-9;

/// Rule for combining a per-body coefficient into a per-contact one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineRule {
    /// Smaller of the two
    Min,
    /// Larger of the two
    Max,
    /// `a · b`
    Product,
    /// `(a + b) / 2`
    Average,
    /// `sqrt(a · b)`
    GeometricMean,
}

impl CombineRule {
    /// Combine two coefficients
    pub fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            CombineRule::Min => a.min(b),
            CombineRule::Max => a.max(b),
            CombineRule::Product => a * b,
            CombineRule::Average => 0.5 * (a + b),
            CombineRule::GeometricMean => (a * b).sqrt(),
        }
    }
}

/// Configuration for contact resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// How body restitutions combine (default: product)
    pub restitution_rule: CombineRule,
    /// How body friction coefficients combine (default: geometric mean)
    pub friction_rule: CombineRule,
    /// Fraction of excess penetration removed per step, in `[0, 1]`
    pub correction_percent: f64,
    /// Penetration tolerated without positional correction
    pub slop: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            restitution_rule: CombineRule::Product,
            friction_rule: CombineRule::GeometricMean,
            correction_percent: 0.4,
            slop: 0.01,
        }
    }
}

impl ResolverConfig {
    /// Set the restitution combine rule
    pub fn with_restitution_rule(mut self, rule: CombineRule) -> Self {
        self.restitution_rule = rule;
        self
    }

    /// Set the friction combine rule
    pub fn with_friction_rule(mut self, rule: CombineRule) -> Self {
        self.friction_rule = rule;
        self
    }

    /// Set the positional correction fraction
    pub fn with_correction(mut self, percent: f64, slop: f64) -> Self {
        self.correction_percent = percent;
        self.slop = slop;
        self
    }

    /// Check that correction parameters are in range
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(0.0..=1.0).contains(&self.correction_percent) {
            return Err(ConfigurationError::InvalidParameter {
                name: "correction_percent",
                value: self.correction_percent,
            });
        }
        if !(self.slop >= 0.0 && self.slop.is_finite()) {
            return Err(ConfigurationError::InvalidParameter {
                name: "slop",
                value: self.slop,
            });
        }
        Ok(())
    }
}

/// Sequential impulse resolver
#[derive(Debug, Clone, Default)]
pub struct ContactResolver {
    config: ResolverConfig,
}

impl ContactResolver {
    /// Create a resolver with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with custom configuration
    pub fn with_config(config: ResolverConfig) -> Self {
        ContactResolver { config }
    }

    /// Current configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve every contact in order
    ///
    /// Contacts whose slots are out of range or equal are ignored.
    pub fn resolve(&self, bodies: &mut [Body], contacts: &[Contact]) {
        for contact in contacts {
            let (i, j) = contact.slots();
            if i == j || i.max(j) >= bodies.len() {
                continue;
            }
            let (a, b) = pair_mut(bodies, i, j);
            self.resolve_contact(a, b, contact);
        }
    }

    /// Apply impulses and positional correction for one contact
    ///
    /// `a` and `b` must match the contact's body order. Both points of a
    /// two-point manifold are solved together, so a flat face landing on
    /// another loses (or reflects) its whole approach velocity.
    pub fn resolve_contact(&self, a: &mut Body, b: &mut Body, contact: &Contact) {
        let inv_mass_sum = a.inv_mass() + b.inv_mass();
        if inv_mass_sum <= 0.0 {
            return;
        }

        let normal = contact.normal();
        let restitution = self
            .config
            .restitution_rule
            .combine(a.restitution(), b.restitution());
        let friction = self.config.friction_rule.combine(a.cof(), b.cof());

        let points = contact.points();
        let count = points.len().min(2);
        let mut ra = [Vector2::zero(); 2];
        let mut rb = [Vector2::zero(); 2];
        let mut target = [0.0; 2];
        for i in 0..count {
            ra[i] = points[i] - a.position();
            rb[i] = points[i] - b.position();
            let vn = relative_velocity(a, b, ra[i], rb[i]).dot(normal);
            // Approaching points bounce back at e·|vn|, the rest only stop
            if vn < 0.0 {
                target[i] = -restitution * vn;
            }
        }

        let mut k = [[0.0; 2]; 2];
        for i in 0..count {
            for j in 0..count {
                k[i][j] = coupling(a, b, (ra[i], rb[i]), (ra[j], rb[j]), normal);
            }
        }
        let arms = Arms {
            ra: &ra[..count],
            rb: &rb[..count],
        };

        let normal_impulse = push_apart(a, b, normal, &arms, &k, &target);
        if friction > 0.0 && apply_friction(a, b, normal, friction, &arms, &normal_impulse) {
            // Friction torque can turn a corner back into the surface
            push_apart(a, b, normal, &arms, &k, &target);
        }

        self.correct_positions(a, b, contact);
    }

    fn correct_positions(&self, a: &mut Body, b: &mut Body, contact: &Contact) {
        let inv_mass_sum = a.inv_mass() + b.inv_mass();
        let excess = (contact.penetration() - self.config.slop).max(0.0);
        if excess == 0.0 || inv_mass_sum <= 0.0 {
            return;
        }
        let correction: Vector2 =
            contact.normal() * (excess / inv_mass_sum * self.config.correction_percent);
        let (inv_a, inv_b) = (a.inv_mass(), b.inv_mass());
        a.state_mut().pos.vsub(correction * inv_a);
        b.state_mut().pos.vadd(correction * inv_b);
    }
}

/// Contact point offsets from each body's center
struct Arms<'a> {
    ra: &'a [Vector2],
    rb: &'a [Vector2],
}

impl Arms<'_> {
    fn len(&self) -> usize {
        self.ra.len()
    }

    fn at(&self, i: usize) -> (Vector2, Vector2) {
        (self.ra[i], self.rb[i])
    }
}

/// Apply the normal impulses that bring every point up to its target
/// normal velocity without pulling any point together; returns them
fn push_apart(
    a: &mut Body,
    b: &mut Body,
    normal: Vector2,
    arms: &Arms<'_>,
    k: &[[f64; 2]; 2],
    target: &[f64; 2],
) -> [f64; 2] {
    let mut bias = [0.0; 2];
    for i in 0..arms.len() {
        let (ra, rb) = arms.at(i);
        bias[i] = relative_velocity(a, b, ra, rb).dot(normal) - target[i];
    }
    let impulses = solve_normal(k, &bias, arms.len());
    for (i, &jn) in impulses.iter().enumerate().take(arms.len()) {
        if jn > 0.0 {
            let (ra, rb) = arms.at(i);
            let impulse = normal * jn;
            a.apply_impulse(-impulse, ra);
            b.apply_impulse(impulse, rb);
        }
    }
    impulses
}

/// Coulomb friction with accumulated per-point impulses
///
/// Each point's total stays within `±μ·j_n` of its own normal impulse.
/// Returns whether any friction impulse was applied.
fn apply_friction(
    a: &mut Body,
    b: &mut Body,
    normal: Vector2,
    friction: f64,
    arms: &Arms<'_>,
    normal_impulse: &[f64; 2],
) -> bool {
    let tangent = normal.perpendicular();
    let mut accumulated = [0.0; 2];
    let mut applied = false;
    for _ in 0..FRICTION_ITERATIONS {
        for i in 0..arms.len() {
            let bound = friction * normal_impulse[i];
            if bound <= 0.0 {
                continue;
            }
            let (ra, rb) = arms.at(i);
            let k_tangent = coupling(a, b, (ra, rb), (ra, rb), tangent);
            if k_tangent <= 0.0 {
                continue;
            }
            let vt = relative_velocity(a, b, ra, rb).dot(tangent);
            if vt.abs() <= TANGENT_EPSILON {
                continue;
            }
            let total = (accumulated[i] - vt / k_tangent).clamp(-bound, bound);
            let delta = total - accumulated[i];
            if delta == 0.0 {
                continue;
            }
            accumulated[i] = total;
            let impulse = tangent * delta;
            a.apply_impulse(-impulse, ra);
            b.apply_impulse(impulse, rb);
            applied = true;
        }
    }
    applied
}

/// Velocity of `b` relative to `a` at the given contact arms
fn relative_velocity(a: &Body, b: &Body, ra: Vector2, rb: Vector2) -> Vector2 {
    b.velocity_at(rb) - a.velocity_at(ra)
}

/// Change in relative velocity along `dir` at point `i` per unit impulse
/// along `dir` at point `j`
///
/// With `i == j` this is the familiar effective mass denominator
/// `1/m_a + 1/m_b + (r_a×d)²/I_a + (r_b×d)²/I_b`.
fn coupling(
    a: &Body,
    b: &Body,
    (ra_i, rb_i): (Vector2, Vector2),
    (ra_j, rb_j): (Vector2, Vector2),
    dir: Vector2,
) -> f64 {
    a.inv_mass()
        + b.inv_mass()
        + ra_i.cross(dir) * ra_j.cross(dir) * a.inv_moi()
        + rb_i.cross(dir) * rb_j.cross(dir) * b.inv_moi()
}

/// Non-negative normal impulses `x` with `w = K·x + bias >= 0` and
/// `x_i · w_i = 0` for each point
///
/// Two-point manifolds are solved exactly by trying, in order, both points
/// pushing, only the first, then only the second.
fn solve_normal(k: &[[f64; 2]; 2], bias: &[f64; 2], count: usize) -> [f64; 2] {
    let single = |i: usize| {
        if bias[i] < 0.0 && k[i][i] > 0.0 {
            -bias[i] / k[i][i]
        } else {
            0.0
        }
    };
    if count < 2 {
        return [single(0), 0.0];
    }

    let det = k[0][0] * k[1][1] - k[0][1] * k[1][0];
    if det > SINGULAR_EPSILON * k[0][0] * k[1][1] {
        let x0 = (k[0][1] * bias[1] - k[1][1] * bias[0]) / det;
        let x1 = (k[1][0] * bias[0] - k[0][0] * bias[1]) / det;
        if x0 >= 0.0 && x1 >= 0.0 {
            return [x0, x1];
        }
    }

    // The idle point must not be left approaching
    let tolerance = SINGULAR_EPSILON * bias[0].abs().max(bias[1].abs());
    let x0 = single(0);
    if x0 > 0.0 && k[1][0] * x0 + bias[1] >= -tolerance {
        return [x0, 0.0];
    }
    let x1 = single(1);
    if x1 > 0.0 && k[0][1] * x1 + bias[0] >= -tolerance {
        return [0.0, x1];
    }
    if x0 > 0.0 || x1 > 0.0 {
        // Degenerate arms; push at the faster approaching point
        return if bias[0] <= bias[1] { [x0, 0.0] } else { [0.0, x1] };
    }
    [0.0, 0.0]
}

/// Borrow two distinct slots mutably, in the given order
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    if i < j {
        let (left, right) = bodies.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = bodies.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{BodyId, BodyOptions};
    use crate::collision::NarrowPhase;

    const EPS: f64 = 1e-9;

    fn ball(x: f64, vx: f64, restitution: f64) -> Body {
        Body::circle(
            &BodyOptions::at(x, 0.0)
                .with_radius(1.0)
                .with_velocity(vx, 0.0)
                .with_restitution(restitution)
                .with_cof(0.0),
        )
        .unwrap()
    }

    fn head_on(penetration: f64) -> Contact {
        Contact::new(
            (0, 1),
            (BodyId::new(0), BodyId::new(1)),
            Vector2::new(1.0, 0.0),
            penetration,
            &[Vector2::new(0.0, 0.0)],
        )
    }

    #[test]
    fn test_combine_rules() {
        assert_eq!(CombineRule::Min.combine(0.2, 0.8), 0.2);
        assert_eq!(CombineRule::Max.combine(0.2, 0.8), 0.8);
        assert!((CombineRule::Product.combine(0.5, 0.5) - 0.25).abs() < EPS);
        assert_eq!(CombineRule::Average.combine(0.2, 0.8), 0.5);
        assert!((CombineRule::GeometricMean.combine(0.25, 1.0) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_elastic_head_on_swaps_velocities() {
        let mut bodies = vec![ball(-1.0, 1.0, 1.0), ball(1.0, -1.0, 1.0)];
        let resolver = ContactResolver::with_config(ResolverConfig::default().with_correction(0.0, 0.0));
        resolver.resolve(&mut bodies, &[head_on(0.0)]);
        assert!((bodies[0].state().vel.x + 1.0).abs() < EPS);
        assert!((bodies[1].state().vel.x - 1.0).abs() < EPS);
    }

    #[test]
    fn test_inelastic_collision_conserves_momentum() {
        let mut bodies = vec![ball(-1.0, 2.0, 0.0), ball(1.0, 0.0, 0.0)];
        ContactResolver::new().resolve(&mut bodies, &[head_on(0.0)]);
        let v0 = bodies[0].state().vel.x;
        let v1 = bodies[1].state().vel.x;
        assert!((v0 - 1.0).abs() < EPS);
        assert!((v1 - 1.0).abs() < EPS);
    }

    #[test]
    fn test_separating_contact_untouched() {
        let mut bodies = vec![ball(-1.0, -1.0, 1.0), ball(1.0, 1.0, 1.0)];
        ContactResolver::new().resolve(&mut bodies, &[head_on(0.0)]);
        assert_eq!(bodies[0].state().vel.x, -1.0);
        assert_eq!(bodies[1].state().vel.x, 1.0);
    }

    #[test]
    fn test_fixed_body_reflects() {
        let mut bodies = vec![
            Body::rectangle(&BodyOptions::at(-1.0, 0.0).fixed().with_cof(0.0)).unwrap(),
            ball(1.0, -3.0, 1.0),
        ];
        ContactResolver::new().resolve(&mut bodies, &[head_on(0.0)]);
        assert_eq!(bodies[0].state().vel, Vector2::zero());
        assert!((bodies[1].state().vel.x - 3.0).abs() < EPS);
    }

    #[test]
    fn test_positional_correction() {
        let mut bodies = vec![ball(-1.0, 0.0, 0.0), ball(1.0, 0.0, 0.0)];
        let resolver = ContactResolver::with_config(ResolverConfig::default().with_correction(0.5, 0.1));
        resolver.resolve(&mut bodies, &[head_on(1.1)]);
        // (1.1 - 0.1) * 0.5 split evenly between equal masses
        assert!((bodies[0].position().x + 1.25).abs() < EPS);
        assert!((bodies[1].position().x - 1.25).abs() < EPS);
    }

    #[test]
    fn test_friction_is_clamped() {
        // Sliding along +x into a fixed floor with normal +y from floor to ball
        let mut bodies = vec![
            Body::rectangle(
                &BodyOptions::at(0.0, -1.0)
                    .with_size(100.0, 2.0)
                    .with_cof(0.5)
                    .fixed(),
            )
            .unwrap(),
            Body::point(
                &BodyOptions::at(0.0, 0.0)
                    .with_velocity(10.0, -1.0)
                    .with_restitution(0.0)
                    .with_cof(0.5),
            )
            .unwrap(),
        ];
        let contact = Contact::new(
            (0, 1),
            (BodyId::new(0), BodyId::new(1)),
            Vector2::new(0.0, 1.0),
            0.001,
            &[Vector2::zero()],
        );
        ContactResolver::new().resolve(&mut bodies, &[contact]);
        let vel = bodies[1].state().vel;
        assert!(vel.y.abs() < EPS);
        // |jt| <= μ·jn = 0.5 · 1
        assert!((vel.x - 9.5).abs() < EPS);
    }

    /// 10x10 box falling flat onto a fixed floor, overlapping by 0.5
    fn landing(restitution: f64, cof: f64) -> (Vec<Body>, Contact) {
        let floor = Body::rectangle(
            &BodyOptions::at(0.0, 0.0)
                .with_size(100.0, 10.0)
                .with_restitution(1.0)
                .with_cof(1.0)
                .fixed(),
        )
        .unwrap();
        let crate_box = Body::rectangle(
            &BodyOptions::at(0.0, 9.5)
                .with_size(10.0, 10.0)
                .with_velocity(0.0, -1.0)
                .with_restitution(restitution)
                .with_cof(cof),
        )
        .unwrap();
        let bodies = vec![floor, crate_box];
        let contact = NarrowPhase::new()
            .collide((0, &bodies[0]), (1, &bodies[1]))
            .unwrap();
        (bodies, contact)
    }

    fn approach_speeds(bodies: &[Body], contact: &Contact) -> Vec<f64> {
        contact
            .points()
            .iter()
            .map(|&p| {
                let ra = p - bodies[0].position();
                let rb = p - bodies[1].position();
                relative_velocity(&bodies[0], &bodies[1], ra, rb).dot(contact.normal())
            })
            .collect()
    }

    #[test]
    fn test_flat_landing_reflects_with_full_restitution() {
        let (mut bodies, contact) = landing(1.0, 0.0);
        assert_eq!(contact.points().len(), 2);
        assert!((contact.normal() - Vector2::new(0.0, 1.0)).norm() < EPS);

        let resolver = ContactResolver::with_config(ResolverConfig::default().with_correction(0.0, 0.0));
        resolver.resolve(&mut bodies, &[contact]);
        let state = bodies[1].state();
        assert!((state.vel.y - 1.0).abs() < EPS, "vel = {:?}", state.vel);
        assert!(state.vel.x.abs() < EPS);
        assert!(state.angular.vel.abs() < EPS);
    }

    #[test]
    fn test_flat_landing_stops_without_restitution() {
        let (mut bodies, contact) = landing(0.0, 0.0);
        let resolver = ContactResolver::with_config(ResolverConfig::default().with_correction(0.0, 0.0));
        resolver.resolve(&mut bodies, &[contact]);
        for vn in approach_speeds(&bodies, &contact) {
            assert!(vn.abs() < EPS, "vn = {vn}");
        }
        assert!(bodies[1].state().angular.vel.abs() < EPS);
    }

    #[test]
    fn test_tilted_landing_leaves_no_point_approaching() {
        let (mut bodies, contact) = landing(0.5, 0.0);
        // Spinning box: one corner comes down faster than the other
        bodies[1].state_mut().angular.vel = 0.05;
        let resolver = ContactResolver::with_config(ResolverConfig::default().with_correction(0.0, 0.0));
        resolver.resolve(&mut bodies, &[contact]);
        for vn in approach_speeds(&bodies, &contact) {
            assert!(vn >= -EPS, "vn = {vn}");
        }
    }

    #[test]
    fn test_flat_landing_friction_slows_slide() {
        let (mut bodies, contact) = landing(0.0, 1.0);
        bodies[1].state_mut().vel = Vector2::new(0.2, -1.0);
        let resolver = ContactResolver::with_config(ResolverConfig::default().with_correction(0.0, 0.0));
        resolver.resolve(&mut bodies, &[contact]);
        let vel = bodies[1].state().vel;
        assert!(vel.x >= 0.0 && vel.x < 0.2, "vel = {vel:?}");
        // The tipping torque from friction must not drive a corner into the floor
        for vn in approach_speeds(&bodies, &contact) {
            assert!(vn >= -EPS, "vn = {vn}");
        }
    }

    #[test]
    fn test_validate() {
        assert!(ResolverConfig::default().validate().is_ok());
        assert!(ResolverConfig::default().with_correction(1.5, 0.0).validate().is_err());
        assert!(ResolverConfig::default().with_correction(0.5, -1.0).validate().is_err());
    }
}
