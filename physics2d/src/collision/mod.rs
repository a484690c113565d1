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
//! Two-phase collision detection and impulse resolution
//!
//! 1. [`SweepAndPrune`] turns bounding boxes into [`CandidatePair`]s
//! 2. [`NarrowPhase`] filters candidates into exact [`Contact`]s
//! 3. [`ContactResolver`] applies impulses and positional correction
//!
//! Every stage works on body *slots* (indices into the world's body list)
//! and produces its output in ascending slot order.

pub mod broad_phase;
pub mod contact;
pub mod narrow_phase;
pub mod resolver;

pub use broad_phase::{SweepAndPrune, SweepAxis, SweepConfig};
pub use contact::{CandidatePair, Contact};
pub use narrow_phase::NarrowPhase;
pub use resolver::{CombineRule, ContactResolver, ResolverConfig};
