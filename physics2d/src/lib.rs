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
//! # physics2d
//!
//! A deterministic 2D rigid-body physics engine.
//!
//! ## Features
//!
//! - **Behaviors**: Pluggable force generators (constant acceleration, Newtonian attraction, point attractors)
//! - **Integration**: Semi-implicit and improved Euler integrators with per-step snapshots
//! - **Collision Detection**: Sweep-and-prune broad phase and SAT narrow phase with edge clipping
//! - **Contact Resolution**: Impulses with restitution, Coulomb friction, and positional correction
//! - **Determinism**: Identical inputs produce bit-identical trajectories
//! - **Parallelization**: Optional Rayon integration for order-independent per-body work
//! - **Extensibility**: Named body and behavior kinds installed through extensions
//!
//! ## Example
//!
//! ```rust
//! use physics2d::behaviors::ConstantAcceleration;
//! use physics2d::body::{Body, BodyOptions};
//! use physics2d::World;
//!
//! let mut world = World::new();
//! let ball = world.add_body(Body::circle(&BodyOptions::at(0.0, 0.0).with_radius(5.0)).unwrap());
//! world.add_body(
//!     Body::rectangle(&BodyOptions::at(0.0, 100.0).with_size(400.0, 20.0).fixed()).unwrap(),
//! );
//! world.add_behavior(Box::new(ConstantAcceleration::default()));
//!
//! for _ in 0..200 {
//!     world.tick().unwrap();
//! }
//! assert!(world.body(ball).unwrap().position().y > 0.0);
//! ```

#![warn(missing_docs)]

/// Force generators run before integration
pub mod behaviors;

/// Rigid bodies, their geometry, and kinematic state
pub mod body;

/// Broad phase, narrow phase, and contact resolution
pub mod collision;

/// Error types
pub mod error;

/// Numerical integration methods
pub mod integration;

/// Vector and bounding-box math
pub mod math;

/// Named body and behavior constructors
pub mod registry;

/// Reusable scratch buffers for the narrow phase
pub mod scratch;

/// The simulation world and step pipeline
pub mod world;

pub use body::{Body, BodyId, BodyOptions};
pub use error::{PhysicsError, Result};
pub use math::{Aabb, Vector2};
pub use world::{World, WorldConfig};
