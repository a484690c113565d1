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
//! Error types for body construction, configuration, and stepping
//!
//! Errors are always local to the call that detected them: a failed
//! constructor or setter leaves existing state untouched, and a failed step
//! rolls every body back to its pre-step snapshot.

use crate::body::BodyId;
use thiserror::Error;

/// Malformed geometry rejected at construction or `recalc` time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A polygon needs at least three vertices.
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {index} is not finite")]
    NonFiniteVertex {
        /// Index of the offending vertex in the input order.
        index: usize,
    },

    /// Two consecutive vertices coincide.
    #[error("vertices {index} and its successor coincide")]
    DegenerateEdge {
        /// Index of the first vertex of the zero-length edge.
        index: usize,
    },

    /// The polygon encloses no area.
    #[error("polygon has zero area")]
    ZeroArea,

    /// The vertex order turns both ways, so the outline is not convex.
    #[error("polygon is not convex")]
    NotConvex,

    /// The vertex order winds around the centroid more than once.
    #[error("polygon outline intersects itself")]
    SelfIntersecting,

    /// Circle radius must be strictly positive and finite.
    #[error("circle radius must be positive and finite, got {0}")]
    NonPositiveRadius(f64),

    /// Rectangle sides must be strictly positive and finite.
    #[error("rectangle sides must be positive and finite, got {width}x{height}")]
    NonPositiveSides {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },
}

/// Invalid numeric configuration for a body, behavior, or world
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Non-fixed bodies need a strictly positive, finite mass.
    #[error("mass must be positive and finite for a non-fixed body, got {0}")]
    NonPositiveMass(f64),

    /// Restitution lies in `[0, 1]`.
    #[error("restitution must lie in [0, 1], got {0}")]
    InvalidRestitution(f64),

    /// Friction coefficients are non-negative.
    #[error("coefficient of friction must be non-negative and finite, got {0}")]
    InvalidFriction(f64),

    /// Timesteps are positive and finite.
    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f64),

    /// Catch-all for a named parameter outside its domain.
    #[error("parameter '{name}' has invalid value {value}")]
    InvalidParameter {
        /// Parameter name as used by the registry.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Initial kinematics must be finite.
    #[error("initial state is not finite")]
    NonFiniteState,
}

/// Umbrella error for every fallible operation in the crate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// See [`GeometryError`].
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// See [`ConfigurationError`].
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A step produced a NaN or infinite state; the step was rolled back.
    #[error("{body} reached a non-finite state; step rolled back")]
    NonFiniteState {
        /// First body found in a non-finite state.
        body: BodyId,
    },

    /// Nothing is registered under the requested name.
    #[error("no {role} kind named '{kind}' is registered")]
    UnknownKind {
        /// `"body"`, `"behavior"`, or `"topic"`.
        role: &'static str,
        /// Requested kind tag.
        kind: String,
    },

    /// A kind tag is already taken.
    #[error("{role} kind '{kind}' is already registered")]
    DuplicateKind {
        /// `"body"`, `"behavior"`, or `"extension"`.
        role: &'static str,
        /// Conflicting kind tag.
        kind: String,
    },

    /// An extension was built against an incompatible API version.
    #[error("extension '{name}' targets API {found}, engine provides {expected}")]
    IncompatibleExtension {
        /// Extension name.
        name: String,
        /// API version declared by the extension.
        found: String,
        /// API version of this crate.
        expected: String,
    },
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, PhysicsError>;
