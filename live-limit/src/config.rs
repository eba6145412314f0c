/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error;
use crate::types::OverflowPolicy;
use crate::DEFAULT_MAX_CONCURRENT;

/// Load a [`Config`] from the environment
pub mod loader;

/// Configuration for a [`Limiter`](crate::Limiter)
#[derive(Debug, Clone)]
pub struct Config {
    max_concurrent: usize,
    overflow_policy: OverflowPolicy,
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the maximum number of operations allowed in flight at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Returns the policy applied to calls arriving while every slot is taken.
    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow_policy
    }

    pub(crate) fn validate(&self) -> Result<(), error::Error> {
        if self.max_concurrent == 0 {
            return Err(error::invalid_configuration(
                "`max_concurrent` must be a positive integer",
            ));
        }
        Ok(())
    }
}

/// Fluent style builder for [Config]
#[derive(Debug, Clone)]
pub struct Builder {
    max_concurrent: usize,
    overflow_policy: OverflowPolicy,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            overflow_policy: OverflowPolicy::default(),
        }
    }
}

impl Builder {
    /// Set the maximum number of operations allowed in flight at once.
    ///
    /// Must be at least 1, [`Limiter::new`](crate::Limiter::new) rejects a config with zero.
    /// Default is 8.
    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    /// Set what happens to calls that arrive while every slot is taken.
    ///
    /// Default is [OverflowPolicy::Queue].
    pub fn overflow_policy(mut self, overflow_policy: OverflowPolicy) -> Self {
        self.overflow_policy = overflow_policy;
        self
    }

    /// Consumes the builder and constructs a [`Config`](crate::config::Config)
    ///
    /// NOTE: This does not validate the settings, that happens when the limiter is created.
    pub fn build(self) -> Config {
        Config {
            max_concurrent: self.max_concurrent,
            overflow_policy: self.overflow_policy,
        }
    }
}
