/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::future::Future;
use std::sync::Arc;

use crate::config::Config;
use crate::error;
use crate::metrics::LimiterMetrics;
use crate::runtime::slots::Slots;
use crate::types::{Outcome, OverflowPolicy};

pub use crate::runtime::slots::{AcquireSlot, OwnedSlot};

/// Bounds the number of operations in flight at once.
///
/// Limiter is internally reference-counted and can be freely cloned. Clones share the same
/// slots, so hand a clone to every call site that should respect the same ceiling.
///
/// There is no fairness guarantee between queued calls beyond roughly first-come, and an
/// operation that never settles holds its slot forever.
#[derive(Debug, Clone)]
pub struct Limiter {
    slots: Arc<Slots>,
}

impl Limiter {
    /// Create a new limiter.
    ///
    /// Fails with [`ErrorKind::InvalidConfiguration`](error::ErrorKind::InvalidConfiguration)
    /// if `max_concurrent` is zero.
    pub fn new(config: Config) -> Result<Self, error::Error> {
        config.validate()?;
        tracing::debug!(
            max_concurrent = config.max_concurrent(),
            overflow_policy = config.overflow_policy().as_str(),
            "created limiter"
        );
        Ok(Self {
            slots: Arc::new(Slots::new(&config)),
        })
    }

    /// Run `operation` once a slot is available.
    ///
    /// * If a slot is free the operation runs right away.
    /// * If every slot is taken and the policy is [`OverflowPolicy::Queue`], waits until a slot
    ///   frees up. Any in-flight operation settling, successfully or not, wakes the waiters;
    ///   those that lose the race for the slot go back to waiting.
    /// * If every slot is taken and the policy is [`OverflowPolicy::Drop`], returns
    ///   `Ok(Outcome::Dropped)` without ever calling `operation`.
    ///
    /// The value or error produced by `operation` is returned unchanged. The slot is released
    /// when the operation settles, panics, or the returned future is dropped.
    ///
    /// Arguments are passed through the closure:
    ///
    /// ```no_run
    /// # async fn fetch(n: u32) -> Result<u32, std::io::Error> { Ok(n) }
    /// # async fn example(limiter: live_limit::Limiter) {
    /// let n = 7;
    /// let outcome = limiter.limit(|| fetch(n)).await;
    /// # }
    /// ```
    pub async fn limit<F, Fut, T, E>(&self, operation: F) -> Result<Outcome<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let slot = match self.acquire().await {
            Some(slot) => slot,
            None => return Ok(Outcome::Dropped),
        };

        let result = operation().await;
        drop(slot);
        result.map(Outcome::Completed)
    }

    /// Claim a slot without running anything.
    ///
    /// The returned future resolves to `None` when the call is dropped by policy, otherwise to
    /// an [`OwnedSlot`] that keeps the slot taken until it is dropped.
    pub fn acquire(&self) -> AcquireSlot {
        AcquireSlot::new(self.slots.clone())
    }

    /// The maximum number of operations allowed in flight at once.
    pub fn max_concurrent(&self) -> usize {
        self.slots.max_concurrent()
    }

    /// The policy applied to calls arriving while every slot is taken.
    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.slots.overflow_policy()
    }

    /// The number of slots taken right now.
    pub fn in_flight(&self) -> usize {
        self.slots.in_flight()
    }

    /// Metrics shared by all clones of this limiter.
    pub fn metrics(&self) -> &LimiterMetrics {
        self.slots.metrics()
    }
}
