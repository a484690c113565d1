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
//! Sweep-and-prune broad phase
//!
//! Each tracked axis keeps a list of interval endpoints, two per body. Every
//! step the endpoint values are overwritten in place from fresh bounding
//! boxes and the list is re-sorted with insertion sort. Bodies move little
//! between steps, so the list is nearly sorted and the sort is close to
//! linear.
//!
//! The sweep walks the sorted endpoints of one axis while maintaining the set
//! of open intervals. When an interval opens, every open interval is a
//! candidate and is confirmed with a full box overlap test. The result is a
//! conservative superset of the touching pairs: every pair whose boxes
//! overlap is reported, excluding pairs of two fixed bodies.
//!
//! # Ordering
//!
//! Endpoints with equal values sort minimum-before-maximum, so touching
//! intervals count as overlapping. The pair list is sorted by slot before it
//! is returned, so resolution order never depends on sort history.

use super::contact::CandidatePair;
use crate::body::Body;
use crate::math::{Aabb, Vector2};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Below this many bodies bounding boxes are always refreshed on the calling thread
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 256;

/// Axis selection for the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepAxis {
    /// Track and sweep the x axis
    #[default]
    X,
    /// Track and sweep the y axis
    Y,
    /// Track both axes; sweep whichever has the larger spread of box centers
    Adaptive,
}

/// Configuration for the sweep-and-prune broad phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepConfig {
    /// Axis selection
    pub axis: SweepAxis,
}

impl SweepConfig {
    /// Create a configuration sweeping `axis`
    pub fn new(axis: SweepAxis) -> Self {
        SweepConfig { axis }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Endpoint {
    slot: usize,
    value: f64,
    is_min: bool,
}

impl Endpoint {
    /// Sort order: by value, then minimum endpoints first
    #[inline]
    fn after(&self, other: &Endpoint) -> bool {
        self.value > other.value || (self.value == other.value && !self.is_min && other.is_min)
    }
}

/// Incremental sweep-and-prune over body slots
///
/// Slots are the positions of bodies in the world's body list. The world
/// calls [`insert`](Self::insert) and [`remove`](Self::remove) as membership
/// changes; all buffers are reused across steps.
#[derive(Debug, Clone, Default)]
pub struct SweepAndPrune {
    config: SweepConfig,
    aabbs: Vec<Aabb>,
    fixed: Vec<bool>,
    endpoints: [Vec<Endpoint>; 2],
    tracked: usize,
    active: Vec<usize>,
    pairs: Vec<CandidatePair>,
}

impl SweepAndPrune {
    /// Create an empty broad phase sweeping the x axis
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty broad phase with custom configuration
    pub fn with_config(config: SweepConfig) -> Self {
        SweepAndPrune {
            config,
            ..Default::default()
        }
    }

    /// Current configuration
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Number of tracked slots
    pub fn len(&self) -> usize {
        self.tracked
    }

    /// Check if no slots are tracked
    pub fn is_empty(&self) -> bool {
        self.tracked == 0
    }

    fn tracks(&self, axis: usize) -> bool {
        match self.config.axis {
            SweepAxis::X => axis == 0,
            SweepAxis::Y => axis == 1,
            SweepAxis::Adaptive => true,
        }
    }

    /// Start tracking a new slot (always the next slot after the last)
    ///
    /// Endpoint values are filled in on the next [`update`](Self::update).
    pub fn insert(&mut self) -> usize {
        let slot = self.tracked;
        for axis in 0..2 {
            if self.tracks(axis) {
                // Appended as an empty interval at -inf; the next sort moves it
                for is_min in [true, false] {
                    self.endpoints[axis].push(Endpoint {
                        slot,
                        value: f64::NEG_INFINITY,
                        is_min,
                    });
                }
            }
        }
        self.tracked += 1;
        slot
    }

    /// Stop tracking `slot`; higher slots shift down by one
    pub fn remove(&mut self, slot: usize) {
        if slot >= self.tracked {
            return;
        }
        for list in &mut self.endpoints {
            list.retain(|ep| ep.slot != slot);
            for ep in list.iter_mut() {
                if ep.slot > slot {
                    ep.slot -= 1;
                }
            }
        }
        if slot < self.aabbs.len() {
            self.aabbs.remove(slot);
            self.fixed.remove(slot);
        }
        self.tracked -= 1;
        self.pairs.clear();
    }

    /// Drop every tracked slot and rebuild for `count` slots
    pub fn reset(&mut self, count: usize) {
        for list in &mut self.endpoints {
            list.clear();
        }
        self.aabbs.clear();
        self.fixed.clear();
        self.pairs.clear();
        self.tracked = 0;
        for _ in 0..count {
            self.insert();
        }
    }

    /// Bounding box computed for `slot` by the last update
    pub fn aabb(&self, slot: usize) -> Option<&Aabb> {
        self.aabbs.get(slot)
    }

    /// Candidate pairs found by the last update
    pub fn pairs(&self) -> &[CandidatePair] {
        &self.pairs
    }

    /// Refresh bounding boxes, re-sort, and sweep
    ///
    /// Returns the candidate pairs, ordered by slot.
    pub fn update(&mut self, bodies: &[Body]) -> &[CandidatePair] {
        if bodies.len() != self.tracked {
            tracing::warn!(
                tracked = self.tracked,
                bodies = bodies.len(),
                "broad phase out of sync with body list, rebuilding"
            );
            self.reset(bodies.len());
        }

        self.refresh_aabbs(bodies);
        for axis in 0..2 {
            if self.tracks(axis) {
                self.refresh_endpoints(axis);
                insertion_sort(&mut self.endpoints[axis]);
            }
        }

        let axis = self.sweep_axis();
        self.sweep(axis);
        self.pairs.as_slice()
    }

    fn refresh_aabbs(&mut self, bodies: &[Body]) {
        self.aabbs.resize(bodies.len(), Aabb::default());
        self.fixed.clear();
        self.fixed.extend(bodies.iter().map(Body::is_fixed));

        #[cfg(feature = "parallel")]
        {
            if bodies.len() >= PARALLEL_THRESHOLD {
                self.aabbs
                    .par_iter_mut()
                    .zip(bodies.par_iter())
                    .for_each(|(out, body)| *out = body.aabb());
                return;
            }
        }

        for (out, body) in self.aabbs.iter_mut().zip(bodies) {
            *out = body.aabb();
        }
    }

    fn refresh_endpoints(&mut self, axis: usize) {
        let aabbs = &self.aabbs;
        for ep in self.endpoints[axis].iter_mut() {
            let aabb = &aabbs[ep.slot];
            ep.value = if ep.is_min {
                aabb.min_on(axis)
            } else {
                aabb.max_on(axis)
            };
        }
    }

    fn sweep_axis(&self) -> usize {
        match self.config.axis {
            SweepAxis::X => 0,
            SweepAxis::Y => 1,
            SweepAxis::Adaptive => {
                let spread = center_spread(&self.aabbs);
                if spread.y > spread.x {
                    1
                } else {
                    0
                }
            }
        }
    }

    fn sweep(&mut self, axis: usize) {
        self.pairs.clear();
        self.active.clear();

        for ep in &self.endpoints[axis] {
            if ep.is_min {
                let aabb = &self.aabbs[ep.slot];
                for &other in &self.active {
                    if self.fixed[ep.slot] && self.fixed[other] {
                        continue;
                    }
                    if aabb.overlaps(&self.aabbs[other]) {
                        self.pairs.push(CandidatePair::new(ep.slot, other));
                    }
                }
                self.active.push(ep.slot);
            } else if let Some(pos) = self.active.iter().position(|&s| s == ep.slot) {
                self.active.swap_remove(pos);
            }
        }

        self.pairs.sort_unstable();
    }
}

fn insertion_sort(list: &mut [Endpoint]) {
    for i in 1..list.len() {
        let mut j = i;
        while j > 0 && list[j - 1].after(&list[j]) {
            list.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Variance of box centers along each axis
fn center_spread(aabbs: &[Aabb]) -> Vector2 {
    if aabbs.is_empty() {
        return Vector2::zero();
    }
    let n = aabbs.len() as f64;
    let mean = aabbs
        .iter()
        .fold(Vector2::zero(), |acc, aabb| acc + aabb.center())
        / n;
    let sq = aabbs.iter().fold(Vector2::zero(), |acc, aabb| {
        let d = aabb.center() - mean;
        acc + Vector2::new(d.x * d.x, d.y * d.y)
    });
    sq / n
}
