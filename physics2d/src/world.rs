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
//! The simulation world and its step pipeline
//!
//! A [`World`] owns bodies (in insertion order), behaviors (in registration
//! order), an integrator, and all step-scoped workspace. Each call to
//! [`World::step`] runs:
//!
//! 1. Behaviors accumulate acceleration
//! 2. The integrator advances every non-fixed body
//! 3. Sweep and prune produces candidate pairs
//! 4. The narrow phase turns candidates into contacts
//! 5. The resolver applies impulses and positional correction
//!
//! A step that leaves any body in a non-finite state is rolled back and
//! reported as [`PhysicsError::NonFiniteState`].
//!
//! # Example
//!
//! ```
//! use physics2d::body::{Body, BodyOptions};
//! use physics2d::world::{Topic, World};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let mut world = World::new();
//! world.add_body(Body::circle(&BodyOptions::at(10.0, 8.0).with_radius(20.0)).unwrap());
//! world.add_body(Body::rectangle(&BodyOptions::at(10.0, 10.0).with_size(10.0, 10.0)).unwrap());
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&hits);
//! world.subscribe(Topic::CollisionsDetected, move |_| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! world.step(1.0).unwrap();
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use crate::behaviors::{Behavior, BehaviorId, Bodies};
use crate::body::{Body, BodyId, BodyOptions};
use crate::collision::{Contact, ContactResolver, NarrowPhase, ResolverConfig, SweepAndPrune, SweepConfig};
use crate::error::{ConfigurationError, PhysicsError, Result};
use crate::integration::{validate_timestep, Integrator, SymplecticEuler};
use crate::math::Vector2;
use crate::registry::{Params, Registry};
use crate::scratch::ScratchConfig;
use std::fmt;
use std::str::FromStr;

/// Default timestep: 160 steps per 1000 time units
pub const DEFAULT_TIMESTEP: f64 = 1000.0 / 160.0;

/// Configuration for a [`World`]
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Timestep used by [`World::tick`]
    pub timestep: f64,
    /// Broad-phase configuration
    pub broad_phase: SweepConfig,
    /// Contact resolution configuration
    pub resolver: ResolverConfig,
    /// Roll back and fail steps that produce NaN or infinite state
    pub check_finite: bool,
    /// Narrow-phase scratch buffer configuration
    pub scratch: ScratchConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            timestep: DEFAULT_TIMESTEP,
            broad_phase: SweepConfig::default(),
            resolver: ResolverConfig::default(),
            check_finite: true,
            scratch: ScratchConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Set the timestep used by [`World::tick`]
    pub fn with_timestep(mut self, timestep: f64) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the broad-phase configuration
    pub fn with_broad_phase(mut self, broad_phase: SweepConfig) -> Self {
        self.broad_phase = broad_phase;
        self
    }

    /// Set the contact resolution configuration
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Enable or disable the non-finite state check
    pub fn with_check_finite(mut self, check_finite: bool) -> Self {
        self.check_finite = check_finite;
        self
    }

    /// Set the scratch buffer configuration
    pub fn with_scratch(mut self, scratch: ScratchConfig) -> Self {
        self.scratch = scratch;
        self
    }

    /// Check the timestep and resolver parameters
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        validate_timestep(self.timestep)?;
        self.resolver.validate()
    }
}

/// Event topics a world publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Before behaviors run
    StepStart,
    /// After a committed step
    StepEnd,
    /// After resolution, when at least one contact exists
    CollisionsDetected,
    /// A body joined the world
    AddBody,
    /// A body left the world
    RemoveBody,
    /// A behavior was registered
    AddBehavior,
    /// A behavior was removed
    RemoveBehavior,
}

impl Topic {
    /// Every topic
    pub const ALL: [Topic; 7] = [
        Topic::StepStart,
        Topic::StepEnd,
        Topic::CollisionsDetected,
        Topic::AddBody,
        Topic::RemoveBody,
        Topic::AddBehavior,
        Topic::RemoveBehavior,
    ];

    /// Canonical topic name
    pub fn name(&self) -> &'static str {
        match self {
            Topic::StepStart => "step:start",
            Topic::StepEnd => "step:end",
            Topic::CollisionsDetected => "collisions:detected",
            Topic::AddBody => "add:body",
            Topic::RemoveBody => "remove:body",
            Topic::AddBehavior => "add:behavior",
            Topic::RemoveBehavior => "remove:behavior",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Topic {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self> {
        Topic::ALL
            .into_iter()
            .find(|topic| topic.name() == s)
            .ok_or_else(|| PhysicsError::UnknownKind {
                role: "topic",
                kind: s.to_string(),
            })
    }
}

/// Payload delivered to subscribers
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// A step is starting
    StepStart {
        /// Index of the step
        step: u64,
        /// Timestep
        dt: f64,
    },
    /// A step committed
    StepEnd {
        /// Summary of the step
        stats: StepStats,
    },
    /// Contacts resolved during the step
    CollisionsDetected {
        /// The step's contacts, in pair order
        contacts: &'a [Contact],
    },
    /// A body joined the world
    AddBody {
        /// Assigned id
        id: BodyId,
    },
    /// A body left the world
    RemoveBody {
        /// Id the body had
        id: BodyId,
    },
    /// A behavior was registered
    AddBehavior {
        /// Assigned id
        id: BehaviorId,
        /// Behavior name
        name: &'a str,
    },
    /// A behavior was removed
    RemoveBehavior {
        /// Id the behavior had
        id: BehaviorId,
        /// Behavior name
        name: &'a str,
    },
}

impl Event<'_> {
    /// Topic this event is published on
    pub fn topic(&self) -> Topic {
        match self {
            Event::StepStart { .. } => Topic::StepStart,
            Event::StepEnd { .. } => Topic::StepEnd,
            Event::CollisionsDetected { .. } => Topic::CollisionsDetected,
            Event::AddBody { .. } => Topic::AddBody,
            Event::RemoveBody { .. } => Topic::RemoveBody,
            Event::AddBehavior { .. } => Topic::AddBehavior,
            Event::RemoveBehavior { .. } => Topic::RemoveBehavior,
        }
    }
}

/// Handle returned by [`World::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Pipeline stage a world is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepPhase {
    /// Between steps
    #[default]
    Idle,
    /// Behaviors are accumulating acceleration
    ApplyingBehaviors,
    /// Bodies are being advanced
    Integrating,
    /// Candidate pairs are being found
    BroadPhase,
    /// Candidate pairs are being tested
    NarrowPhase,
    /// Contacts are being resolved
    Resolving,
}

/// Summary of one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Index of the step (0 for the first)
    pub step: u64,
    /// Pairs reported by the broad phase
    pub candidate_pairs: usize,
    /// Contacts found by the narrow phase
    pub contacts: usize,
    /// Bodies advanced by the integrator
    pub integrated: usize,
}

type Callback = Box<dyn FnMut(&Event<'_>) + Send>;

struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    callback: Callback,
}

/// Deliver `event` to every subscriber of its topic, in subscription order
fn emit(subscribers: &mut [Subscription], event: &Event<'_>) {
    let topic = event.topic();
    for subscription in subscribers.iter_mut().filter(|s| s.topic == topic) {
        (subscription.callback)(event);
    }
}

/// A deterministic 2D rigid-body simulation
pub struct World {
    config: WorldConfig,
    registry: Registry,
    integrator: Box<dyn Integrator>,
    bodies: Vec<Body>,
    behaviors: Vec<(BehaviorId, Box<dyn Behavior>)>,
    subscribers: Vec<Subscription>,
    broad_phase: SweepAndPrune,
    narrow_phase: NarrowPhase,
    resolver: ContactResolver,
    contacts: Vec<Contact>,
    next_body_id: u64,
    next_behavior_id: u64,
    next_subscription_id: u64,
    step_count: u64,
    phase: StepPhase,
    paused: bool,
}

impl World {
    /// Create a world with the default configuration and built-in kinds
    pub fn new() -> Self {
        Self::build(WorldConfig::default())
    }

    /// Create a world with a custom configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if the configuration does not validate.
    pub fn with_config(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: WorldConfig) -> Self {
        World {
            registry: Registry::with_builtins(),
            integrator: Box::new(SymplecticEuler),
            bodies: Vec::new(),
            behaviors: Vec::new(),
            subscribers: Vec::new(),
            broad_phase: SweepAndPrune::with_config(config.broad_phase.clone()),
            narrow_phase: NarrowPhase::with_config(config.scratch.clone()),
            resolver: ContactResolver::with_config(config.resolver.clone()),
            contacts: Vec::new(),
            next_body_id: 0,
            next_behavior_id: 0,
            next_subscription_id: 0,
            step_count: 0,
            phase: StepPhase::Idle,
            paused: false,
            config,
        }
    }

    /// Replace the kind registry
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the integrator
    pub fn with_integrator(mut self, integrator: Box<dyn Integrator>) -> Self {
        self.integrator = integrator;
        self
    }

    /// Replace the integrator between steps
    pub fn set_integrator(&mut self, integrator: Box<dyn Integrator>) {
        self.integrator = integrator;
    }

    /// Current integrator
    pub fn integrator(&self) -> &dyn Integrator {
        self.integrator.as_ref()
    }

    /// World configuration
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Timestep used by [`tick`](Self::tick)
    pub fn timestep(&self) -> f64 {
        self.config.timestep
    }

    /// Kind registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable kind registry, for installing extensions
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    // Membership

    /// Add a body, assigning it a fresh id
    pub fn add_body(&mut self, mut body: Body) -> BodyId {
        let id = BodyId::new(self.next_body_id);
        self.next_body_id += 1;
        body.set_id(Some(id));
        self.bodies.push(body);
        self.broad_phase.insert();

        tracing::debug!(%id, bodies = self.bodies.len(), "added body");
        emit(&mut self.subscribers, &Event::AddBody { id });
        id
    }

    /// Construct a body of a registered kind and add it
    pub fn create_body(&mut self, kind: &str, options: &BodyOptions) -> Result<BodyId> {
        let body = self.registry.create_body(kind, options)?;
        Ok(self.add_body(body))
    }

    /// Remove a body, returning it without an id
    ///
    /// Returns `None` if `id` is not a member. Clears the last step's
    /// contacts, since their slots no longer line up.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let slot = self.slot_of(id)?;
        let mut body = self.bodies.remove(slot);
        self.broad_phase.remove(slot);
        self.contacts.clear();
        body.set_id(None);

        tracing::debug!(%id, bodies = self.bodies.len(), "removed body");
        emit(&mut self.subscribers, &Event::RemoveBody { id });
        Some(body)
    }

    /// Register a behavior; behaviors run in registration order
    pub fn add_behavior(&mut self, behavior: Box<dyn Behavior>) -> BehaviorId {
        let id = BehaviorId::new(self.next_behavior_id);
        self.next_behavior_id += 1;

        tracing::debug!(%id, name = behavior.name(), "added behavior");
        emit(
            &mut self.subscribers,
            &Event::AddBehavior {
                id,
                name: behavior.name(),
            },
        );
        self.behaviors.push((id, behavior));
        id
    }

    /// Construct a behavior of a registered kind and add it
    pub fn create_behavior(&mut self, kind: &str, params: &Params) -> Result<BehaviorId> {
        let behavior = self.registry.create_behavior(kind, params)?;
        Ok(self.add_behavior(behavior))
    }

    /// Remove a behavior; `None` if `id` is not registered
    pub fn remove_behavior(&mut self, id: BehaviorId) -> Option<Box<dyn Behavior>> {
        let index = self.behaviors.iter().position(|(bid, _)| *bid == id)?;
        let (_, behavior) = self.behaviors.remove(index);

        tracing::debug!(%id, name = behavior.name(), "removed behavior");
        emit(
            &mut self.subscribers,
            &Event::RemoveBehavior {
                id,
                name: behavior.name(),
            },
        );
        Some(behavior)
    }

    // Queries

    // Ids are assigned in increasing order and removal preserves order
    fn slot_of(&self, id: BodyId) -> Option<usize> {
        self.bodies
            .binary_search_by_key(&Some(id), |body| body.id())
            .ok()
    }

    /// Body with the given id
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.slot_of(id).map(|slot| &self.bodies[slot])
    }

    /// Mutable body with the given id
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        let slot = self.slot_of(id)?;
        self.bodies.get_mut(slot)
    }

    /// Every body, in insertion order
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Number of bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of behaviors
    pub fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }

    /// Bodies whose geometry contains a world-space point
    pub fn find_at(&self, point: Vector2) -> impl Iterator<Item = &Body> + '_ {
        self.bodies
            .iter()
            .filter(move |body| body.contains_point(point))
    }

    /// Contacts resolved by the last step
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Number of committed steps
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Pipeline stage; always [`StepPhase::Idle`] between steps
    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    // Events

    /// Call `callback` for every event on `topic`
    pub fn subscribe<F>(&mut self, topic: Topic, callback: F) -> SubscriptionId
    where
        F: FnMut(&Event<'_>) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.subscribers.push(Subscription {
            id,
            topic,
            callback: Box::new(callback),
        });
        id
    }

    /// Drop a subscription; returns `false` if it did not exist
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    // Stepping

    /// Stop stepping; [`step`](Self::step) becomes a no-op
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume stepping
    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// Check if the world is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Step by the configured timestep
    pub fn tick(&mut self) -> Result<StepStats> {
        self.step(self.config.timestep)
    }

    /// Advance the simulation by `dt`
    ///
    /// A paused world, or a `dt` that is not positive and finite, leaves
    /// everything untouched and returns empty stats.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::NonFiniteState`] if any body ends the step
    /// with a NaN or infinite field. Every body is restored to its pre-step
    /// state and the step is not counted.
    pub fn step(&mut self, dt: f64) -> Result<StepStats> {
        let step = self.step_count;
        if self.paused || validate_timestep(dt).is_err() {
            return Ok(StepStats {
                step,
                ..StepStats::default()
            });
        }

        emit(&mut self.subscribers, &Event::StepStart { step, dt });

        self.phase = StepPhase::ApplyingBehaviors;
        {
            let mut view = Bodies::new(&mut self.bodies);
            for (_, behavior) in self.behaviors.iter_mut() {
                behavior.behave(&mut view, dt);
            }
        }

        self.phase = StepPhase::Integrating;
        let integrated = self.integrator.integrate(&mut self.bodies, dt);
        self.check_finite()?;

        self.phase = StepPhase::BroadPhase;
        let candidate_pairs = self.broad_phase.update(&self.bodies).len();

        self.phase = StepPhase::NarrowPhase;
        let contacts =
            self.narrow_phase
                .detect(&self.bodies, self.broad_phase.pairs(), &mut self.contacts);

        self.phase = StepPhase::Resolving;
        self.resolver.resolve(&mut self.bodies, &self.contacts);
        self.check_finite()?;

        self.phase = StepPhase::Idle;
        self.step_count += 1;
        let stats = StepStats {
            step,
            candidate_pairs,
            contacts,
            integrated,
        };

        if !self.contacts.is_empty() {
            emit(
                &mut self.subscribers,
                &Event::CollisionsDetected {
                    contacts: &self.contacts,
                },
            );
        }
        emit(&mut self.subscribers, &Event::StepEnd { stats });

        tracing::debug!(
            step,
            dt,
            candidate_pairs,
            contacts,
            integrated,
            "step complete"
        );
        Ok(stats)
    }

    /// Roll the step back if any body left the finite range
    fn check_finite(&mut self) -> Result<()> {
        if !self.config.check_finite {
            return Ok(());
        }
        let Some(body) = self.bodies.iter().find(|body| !body.state().is_valid()) else {
            return Ok(());
        };
        let id = body.id().unwrap_or(BodyId::new(u64::MAX));

        tracing::warn!(%id, step = self.step_count, phase = ?self.phase, "non-finite state, rolling back step");
        for body in self.bodies.iter_mut() {
            let state = body.state_mut();
            state.rollback();
            state.clear_acceleration();
        }
        self.contacts.clear();
        self.phase = StepPhase::Idle;
        Err(PhysicsError::NonFiniteState { body: id })
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("integrator", &self.integrator.name())
            .field("bodies", &self.bodies.len())
            .field("behaviors", &self.behaviors)
            .field("subscribers", &self.subscribers.len())
            .field("step_count", &self.step_count)
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviors::ConstantAcceleration;
    use crate::integration::ImprovedEuler;
    use std::sync::{Arc, Mutex};

    fn circle(x: f64, y: f64, radius: f64) -> Body {
        Body::circle(&BodyOptions::at(x, y).with_radius(radius)).unwrap()
    }

    fn record(world: &mut World, topic: Topic) -> Arc<Mutex<Vec<String>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        world.subscribe(topic, move |event| {
            sink.lock().unwrap().push(format!("{:?}", event.topic()));
        });
        log
    }

    #[test]
    fn test_ids_are_unique_and_ordered() {
        let mut world = World::new();
        let a = world.add_body(circle(0.0, 0.0, 1.0));
        let b = world.add_body(circle(10.0, 0.0, 1.0));
        let c = world.add_body(circle(20.0, 0.0, 1.0));
        assert!(a < b && b < c);

        let removed = world.remove_body(b).unwrap();
        assert_eq!(removed.id(), None);
        assert!(world.body(b).is_none());
        assert_eq!(world.body(c).unwrap().position(), Vector2::new(20.0, 0.0));

        let d = world.add_body(removed);
        assert!(d > c);
        assert_eq!(world.bodies().len(), 3);
        assert!(world.remove_body(b).is_none());
    }

    #[test]
    fn test_membership_events() {
        let mut world = World::new();
        let added = record(&mut world, Topic::AddBody);
        let removed = record(&mut world, Topic::RemoveBehavior);

        let id = world.add_body(circle(0.0, 0.0, 1.0));
        let behavior = world.add_behavior(Box::new(ConstantAcceleration::default()));
        assert!(world.remove_behavior(behavior).is_some());
        assert!(world.remove_behavior(behavior).is_none());
        world.remove_body(id);

        assert_eq!(added.lock().unwrap().len(), 1);
        assert_eq!(removed.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_step_events_in_order() {
        let mut world = World::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for topic in [Topic::StepStart, Topic::CollisionsDetected, Topic::StepEnd] {
            let sink = Arc::clone(&log);
            world.subscribe(topic, move |event| sink.lock().unwrap().push(event.topic()));
        }
        world.add_body(circle(0.0, 0.0, 5.0));
        world.add_body(circle(6.0, 0.0, 5.0));

        let stats = world.step(1.0).unwrap();
        assert_eq!(stats.step, 0);
        assert_eq!(stats.contacts, 1);
        assert_eq!(stats.integrated, 2);
        assert_eq!(
            *log.lock().unwrap(),
            vec![Topic::StepStart, Topic::CollisionsDetected, Topic::StepEnd]
        );
        assert_eq!(world.step_count(), 1);
        assert_eq!(world.phase(), StepPhase::Idle);
    }

    #[test]
    fn test_unsubscribe() {
        let mut world = World::new();
        let log = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&log);
        let id = world.subscribe(Topic::StepEnd, move |_| *sink.lock().unwrap() += 1);

        world.step(1.0).unwrap();
        assert!(world.unsubscribe(id));
        assert!(!world.unsubscribe(id));
        world.step(1.0).unwrap();
        assert_eq!(*log.lock().unwrap(), 1);
    }

    #[test]
    fn test_invalid_dt_is_noop() {
        let mut world = World::new();
        let id = world.add_body(Body::circle(&BodyOptions::at(0.0, 0.0).with_velocity(1.0, 0.0)).unwrap());
        let log = record(&mut world, Topic::StepStart);

        for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let stats = world.step(dt).unwrap();
            assert_eq!(stats, StepStats::default());
        }
        assert_eq!(world.body(id).unwrap().position(), Vector2::zero());
        assert_eq!(world.step_count(), 0);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_pause() {
        let mut world = World::new();
        let id = world.add_body(Body::circle(&BodyOptions::at(0.0, 0.0).with_velocity(1.0, 0.0)).unwrap());
        world.pause();
        assert!(world.is_paused());
        world.tick().unwrap();
        assert_eq!(world.body(id).unwrap().position(), Vector2::zero());

        world.unpause();
        world.tick().unwrap();
        assert_eq!(world.body(id).unwrap().position().x, DEFAULT_TIMESTEP);
    }

    #[test]
    fn test_non_finite_step_rolls_back() {
        let mut world = World::new();
        let id = world.add_body(
            Body::circle(&BodyOptions::at(1.0, 2.0).with_velocity(f64::MAX, 0.0)).unwrap(),
        );
        let other = world.add_body(Body::circle(&BodyOptions::at(100.0, 0.0).with_velocity(0.0, 1.0)).unwrap());
        let ends = record(&mut world, Topic::StepEnd);

        let err = world.step(10.0).unwrap_err();
        assert_eq!(err, PhysicsError::NonFiniteState { body: id });
        assert_eq!(world.body(id).unwrap().position(), Vector2::new(1.0, 2.0));
        assert_eq!(world.body(other).unwrap().position(), Vector2::new(100.0, 0.0));
        assert_eq!(world.step_count(), 0);
        assert_eq!(world.phase(), StepPhase::Idle);
        assert!(ends.lock().unwrap().is_empty());
    }

    #[test]
    fn test_create_by_kind() {
        let mut world = World::new();
        let id = world
            .create_body("rectangle", &BodyOptions::at(5.0, 5.0).with_size(2.0, 2.0))
            .unwrap();
        assert_eq!(world.find_at(Vector2::new(5.5, 5.5)).count(), 1);
        assert_eq!(world.find_at(Vector2::new(7.0, 5.0)).count(), 0);
        assert!(world.body(id).is_some());

        world
            .create_behavior("constant-acceleration", &Params::new())
            .unwrap();
        assert_eq!(world.behavior_count(), 1);
        assert!(world.create_behavior("drag", &Params::new()).is_err());
    }

    #[test]
    fn test_with_config_validates() {
        assert!(World::with_config(WorldConfig::default().with_timestep(0.0)).is_err());
        let world = World::with_config(
            WorldConfig::default().with_resolver(ResolverConfig::default().with_correction(2.0, 0.0)),
        );
        assert!(world.is_err());
        assert!(World::with_config(WorldConfig::default().with_timestep(1.0)).is_ok());
    }

    #[test]
    fn test_topic_names_round_trip() {
        for topic in Topic::ALL {
            assert_eq!(topic.name().parse::<Topic>().unwrap(), topic);
        }
        assert!("step:middle".parse::<Topic>().is_err());
    }

    #[test]
    fn test_integrator_swap() {
        let world = World::new().with_integrator(Box::new(ImprovedEuler));
        assert_eq!(world.integrator().name(), "improved-euler");
    }
}
