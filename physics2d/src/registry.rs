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
//! Named constructors for bodies and behaviors
//!
//! A [`Registry`] maps kind tags such as `"circle"` or `"newtonian"` to
//! constructor functions. Each world owns one; there is no global state.
//!
//! New kinds arrive through [`Extension`]s. Installing an extension:
//! - Checks its API version against [`EXTENSION_API_VERSION`]
//! - Rejects a second extension with the same name
//! - Runs its `install` hook against a staged copy of the registry, so a
//!   failing extension leaves the registry untouched
//!
//! # Built-in kinds
//!
//! | Role     | Kinds |
//! |----------|-------|
//! | body     | `point`, `circle`, `convex-polygon`, `rectangle` |
//! | behavior | `constant-acceleration`, `newtonian`, `attractor` |

use crate::behaviors::{Attractor, Behavior, ConstantAcceleration, Newtonian};
use crate::body::{Body, BodyOptions, GeometryKind};
use crate::error::{ConfigurationError, PhysicsError, Result};
use crate::math::Vector2;
use semver::Version;
use std::collections::BTreeMap;
use std::fmt;

/// Version of the extension API
///
/// Extensions report the version they were built against; see
/// [`Registry::install`] for the compatibility rules.
pub const EXTENSION_API_VERSION: &str = "0.1.0";

/// Constructor for a body kind
pub type BodyConstructor = fn(&BodyOptions) -> Result<Body>;

/// Constructor for a behavior kind
pub type BehaviorConstructor = fn(&Params) -> Result<Box<dyn Behavior>>;

/// Named scalar and vector parameters for behavior constructors
///
/// # Example
///
/// ```
/// use physics2d::registry::Params;
/// use physics2d::math::Vector2;
///
/// let params = Params::new()
///     .with("strength", 2.0)
///     .with_vector("pos", Vector2::new(10.0, 0.0));
/// assert_eq!(params.scalar_or("strength", 1.0), 2.0);
/// assert_eq!(params.scalar_or("order", 2.0), 2.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    scalars: BTreeMap<String, f64>,
    vectors: BTreeMap<String, Vector2>,
}

impl Params {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar parameter
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.scalars.insert(name.to_string(), value);
        self
    }

    /// Add a vector parameter
    pub fn with_vector(mut self, name: &str, value: Vector2) -> Self {
        self.vectors.insert(name.to_string(), value);
        self
    }

    /// Scalar parameter, if present
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.scalars.get(name).copied()
    }

    /// Scalar parameter or a default
    pub fn scalar_or(&self, name: &str, default: f64) -> f64 {
        self.scalar(name).unwrap_or(default)
    }

    /// Vector parameter, if present
    pub fn vector(&self, name: &str) -> Option<Vector2> {
        self.vectors.get(name).copied()
    }

    /// Vector parameter or a default
    pub fn vector_or(&self, name: &str, default: Vector2) -> Vector2 {
        self.vector(name).unwrap_or(default)
    }
}

/// A bundle of kinds installed into a [`Registry`]
pub trait Extension {
    /// Unique extension name
    fn name(&self) -> &str;

    /// Extension version (MAJOR.MINOR.PATCH)
    fn version(&self) -> &str;

    /// API version this extension was built against
    fn api_version(&self) -> &str {
        EXTENSION_API_VERSION
    }

    /// Register this extension's kinds
    fn install(&self, registry: &mut Registry) -> Result<()>;
}

/// Kind tag → constructor maps for bodies and behaviors
#[derive(Clone, Default)]
pub struct Registry {
    bodies: BTreeMap<String, BodyConstructor>,
    behaviors: BTreeMap<String, BehaviorConstructor>,
    extensions: Vec<(String, String)>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in kind
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        // Built-in kinds cannot collide in an empty registry
        if let Err(err) = registry.install(&Builtins) {
            tracing::warn!(error = %err, "failed to install built-in kinds");
        }
        registry
    }

    /// Register a body constructor under `kind`
    pub fn register_body(&mut self, kind: &str, constructor: BodyConstructor) -> Result<()> {
        if self.bodies.contains_key(kind) {
            return Err(PhysicsError::DuplicateKind {
                role: "body",
                kind: kind.to_string(),
            });
        }
        self.bodies.insert(kind.to_string(), constructor);
        Ok(())
    }

    /// Register a behavior constructor under `kind`
    pub fn register_behavior(&mut self, kind: &str, constructor: BehaviorConstructor) -> Result<()> {
        if self.behaviors.contains_key(kind) {
            return Err(PhysicsError::DuplicateKind {
                role: "behavior",
                kind: kind.to_string(),
            });
        }
        self.behaviors.insert(kind.to_string(), constructor);
        Ok(())
    }

    /// Install an extension
    ///
    /// # Errors
    ///
    /// - [`PhysicsError::IncompatibleExtension`] if the API versions differ
    ///   in major version, or in minor version while the API is 0.x, or the
    ///   extension needs a newer minor version
    /// - [`PhysicsError::DuplicateKind`] if the extension name or one of its
    ///   kinds is already registered
    /// - Any error returned by the extension's `install`
    pub fn install(&mut self, extension: &dyn Extension) -> Result<()> {
        let name = extension.name();
        let api_version = extension.api_version();
        if !is_version_compatible(api_version, EXTENSION_API_VERSION) {
            tracing::warn!(
                extension = name,
                api_version,
                expected = EXTENSION_API_VERSION,
                "rejecting incompatible extension"
            );
            return Err(PhysicsError::IncompatibleExtension {
                name: name.to_string(),
                found: api_version.to_string(),
                expected: EXTENSION_API_VERSION.to_string(),
            });
        }
        if self.extensions.iter().any(|(installed, _)| installed == name) {
            return Err(PhysicsError::DuplicateKind {
                role: "extension",
                kind: name.to_string(),
            });
        }

        let mut staged = self.clone();
        extension.install(&mut staged)?;
        staged
            .extensions
            .push((name.to_string(), extension.version().to_string()));
        *self = staged;

        tracing::debug!(extension = name, version = extension.version(), "installed extension");
        Ok(())
    }

    /// Construct a body of the given kind
    pub fn create_body(&self, kind: &str, options: &BodyOptions) -> Result<Body> {
        let constructor = self.bodies.get(kind).ok_or_else(|| PhysicsError::UnknownKind {
            role: "body",
            kind: kind.to_string(),
        })?;
        constructor(options)
    }

    /// Construct a behavior of the given kind
    pub fn create_behavior(&self, kind: &str, params: &Params) -> Result<Box<dyn Behavior>> {
        let constructor = self
            .behaviors
            .get(kind)
            .ok_or_else(|| PhysicsError::UnknownKind {
                role: "behavior",
                kind: kind.to_string(),
            })?;
        constructor(params)
    }

    /// Check whether a body kind is registered
    pub fn has_body_kind(&self, kind: &str) -> bool {
        self.bodies.contains_key(kind)
    }

    /// Check whether a behavior kind is registered
    pub fn has_behavior_kind(&self, kind: &str) -> bool {
        self.behaviors.contains_key(kind)
    }

    /// Registered body kinds, sorted
    pub fn body_kinds(&self) -> impl Iterator<Item = &str> {
        self.bodies.keys().map(String::as_str)
    }

    /// Registered behavior kinds, sorted
    pub fn behavior_kinds(&self) -> impl Iterator<Item = &str> {
        self.behaviors.keys().map(String::as_str)
    }

    /// Installed extensions as (name, version), in install order
    pub fn extensions(&self) -> &[(String, String)] {
        &self.extensions
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("body_kinds", &self.bodies.keys().collect::<Vec<_>>())
            .field("behavior_kinds", &self.behaviors.keys().collect::<Vec<_>>())
            .field("extensions", &self.extensions)
            .finish()
    }
}

/// Check if an extension API version is compatible with the engine
///
/// Uses semantic versioning rules:
/// - Major version must match
/// - For major version 0.x.y, minor versions must match (breaking changes)
/// - For major version >= 1, the extension's minor version must not exceed the engine's
/// - Patch version is ignored
fn is_version_compatible(extension_version: &str, engine_version: &str) -> bool {
    let (Ok(ext), Ok(engine)) = (
        Version::parse(extension_version),
        Version::parse(engine_version),
    ) else {
        return false;
    };

    if ext.major != engine.major {
        return false;
    }
    if ext.major != 0 {
        ext.minor <= engine.minor
    } else {
        ext.minor == engine.minor
    }
}

/// The kinds every world knows about
struct Builtins;

impl Extension for Builtins {
    fn name(&self) -> &str {
        "builtins"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn install(&self, registry: &mut Registry) -> Result<()> {
        registry.register_body(GeometryKind::Point.name(), Body::point)?;
        registry.register_body(GeometryKind::Circle.name(), Body::circle)?;
        registry.register_body(GeometryKind::ConvexPolygon.name(), Body::polygon)?;
        registry.register_body(GeometryKind::Rectangle.name(), Body::rectangle)?;

        registry.register_behavior("constant-acceleration", constant_acceleration)?;
        registry.register_behavior("newtonian", newtonian)?;
        registry.register_behavior("attractor", attractor)?;
        Ok(())
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value >= 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigurationError::InvalidParameter { name, value }.into())
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && !value.is_nan() {
        Ok(value)
    } else {
        Err(ConfigurationError::InvalidParameter { name, value }.into())
    }
}

fn constant_acceleration(params: &Params) -> Result<Box<dyn Behavior>> {
    let default = ConstantAcceleration::default().acceleration();
    let behavior = ConstantAcceleration::try_new(params.vector_or("acc", default))?;
    Ok(Box::new(behavior))
}

fn newtonian(params: &Params) -> Result<Box<dyn Behavior>> {
    let mut behavior = Newtonian::try_new(params.scalar_or("strength", 1.0))?;
    if let Some(tolerance) = params.scalar("tolerance") {
        behavior = behavior.with_tolerance(non_negative("tolerance", tolerance)?);
    }
    if let Some(max) = params.scalar("max") {
        behavior = behavior.with_max_distance(positive("max", max)?);
    }
    Ok(Box::new(behavior))
}

fn attractor(params: &Params) -> Result<Box<dyn Behavior>> {
    let mut behavior = Attractor::try_new(
        params.vector_or("pos", Vector2::zero()),
        params.scalar_or("strength", 1.0),
    )?;
    behavior = behavior.with_order(non_negative("order", params.scalar_or("order", 2.0))?);
    behavior = behavior.with_min_distance(non_negative("min", params.scalar_or("min", 0.0))?);
    if let Some(max) = params.scalar("max") {
        behavior = behavior.with_max_distance(positive("max", max)?);
    }
    Ok(Box::new(behavior))
}
