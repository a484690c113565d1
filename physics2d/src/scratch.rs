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
//! Reusable scratch buffers for the step pipeline
//!
//! The narrow phase needs short-lived vertex and normal lists for every
//! polygon it tests. Buffers are checked out of a [`ScratchPool`], used
//! within one function, and returned automatically when the guard drops, so
//! once the pool has warmed up a step performs no heap allocation here.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

/// Configuration for scratch pool behavior
#[derive(Debug, Clone)]
pub struct ScratchConfig {
    /// Initial capacity for each freshly allocated buffer
    pub initial_capacity: usize,
    /// Maximum number of idle buffers kept for reuse
    pub max_pool_size: usize,
    /// Whether to log when the pool has to allocate
    pub log_allocations: bool,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        ScratchConfig {
            initial_capacity: 16,
            max_pool_size: 8,
            log_allocations: false,
        }
    }
}

impl ScratchConfig {
    /// Create a new pool configuration with custom settings
    pub fn new(initial_capacity: usize, max_pool_size: usize) -> Self {
        ScratchConfig {
            initial_capacity,
            max_pool_size,
            log_allocations: false,
        }
    }

    /// Enable logging for allocation events
    pub fn with_logging(mut self) -> Self {
        self.log_allocations = true;
        self
    }
}

/// Statistics for monitoring pool reuse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScratchStats {
    /// Number of checkouts served by an idle buffer
    pub hits: usize,
    /// Number of checkouts that had to allocate
    pub misses: usize,
    /// Current number of idle buffers
    pub pool_size: usize,
    /// Peak number of idle buffers
    pub peak_size: usize,
}

impl ScratchStats {
    /// Calculate the hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct PoolInner<T> {
    idle: Vec<Vec<T>>,
    stats: ScratchStats,
}

/// Pool of reusable `Vec<T>` buffers
///
/// Checkouts borrow the pool, so a guard can never outlive it. The pool is
/// `Send + Sync` so that a `World` holding one stays `Send`.
pub struct ScratchPool<T> {
    inner: Mutex<PoolInner<T>>,
    config: ScratchConfig,
}

impl<T> ScratchPool<T> {
    /// Create a pool with default configuration
    pub fn new() -> Self {
        Self::with_config(ScratchConfig::default())
    }

    /// Create a pool with custom configuration
    pub fn with_config(config: ScratchConfig) -> Self {
        ScratchPool {
            inner: Mutex::new(PoolInner {
                idle: Vec::new(),
                stats: ScratchStats::default(),
            }),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolInner<T>> {
        // Poisoning cannot leave the idle list inconsistent
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check out an empty buffer
    ///
    /// Reuses an idle buffer when one is available, otherwise allocates. The
    /// buffer goes back to the pool when the guard is dropped.
    pub fn acquire(&self) -> ScratchGuard<'_, T> {
        let mut inner = self.lock();
        let buffer = match inner.idle.pop() {
            Some(mut buffer) => {
                buffer.clear();
                inner.stats.hits += 1;
                buffer
            }
            None => {
                inner.stats.misses += 1;
                if self.config.log_allocations {
                    tracing::debug!(
                        hit_rate = inner.stats.hit_rate(),
                        "scratch pool allocating new buffer"
                    );
                }
                Vec::with_capacity(self.config.initial_capacity)
            }
        };
        inner.stats.pool_size = inner.idle.len();

        ScratchGuard {
            buffer: Some(buffer),
            pool: self,
        }
    }

    fn release(&self, buffer: Vec<T>) {
        let mut inner = self.lock();
        if inner.idle.len() < self.config.max_pool_size {
            inner.idle.push(buffer);
            inner.stats.pool_size = inner.idle.len();
            if inner.stats.pool_size > inner.stats.peak_size {
                inner.stats.peak_size = inner.stats.pool_size;
            }
        }
        // If the pool is full the buffer is dropped (deallocated)
    }

    /// Get current pool statistics
    pub fn stats(&self) -> ScratchStats {
        self.lock().stats.clone()
    }

    /// Drop every idle buffer
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.idle.clear();
        inner.stats.pool_size = 0;
    }

    /// Number of idle buffers
    pub fn len(&self) -> usize {
        self.lock().idle.len()
    }

    /// Check if there are no idle buffers
    pub fn is_empty(&self) -> bool {
        self.lock().idle.is_empty()
    }
}

impl<T> Default for ScratchPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for a checked-out buffer
///
/// Dereferences to `Vec<T>`; returns the buffer to its pool on drop.
pub struct ScratchGuard<'a, T> {
    buffer: Option<Vec<T>>,
    pool: &'a ScratchPool<T>,
}

impl<T> Deref for ScratchGuard<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        // Only `drop` takes the buffer out
        self.buffer.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T> DerefMut for ScratchGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buffer.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T> Drop for ScratchGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.pool.release(buffer);
        }
    }
}
