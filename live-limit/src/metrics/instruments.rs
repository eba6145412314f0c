/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing numeric value.
#[derive(Debug, Default)]
pub(crate) struct IncreasingCounter {
    value: AtomicU64,
}

impl IncreasingCounter {
    /// Increment the counter by the given amount and return the new value.
    pub(crate) fn increment(&self, amount: u64) -> u64 {
        self.value.fetch_add(amount, Ordering::Relaxed) + amount
    }

    /// Get the current value of the counter.
    pub(crate) fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A value that can increase or decrease over time.
#[derive(Debug, Default)]
pub(crate) struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    /// Set the gauge to the given value and return the new value.
    pub(crate) fn set(&self, value: u64) -> u64 {
        self.value.store(value, Ordering::Relaxed);
        value
    }

    /// Raise the gauge to `value` if it is currently lower. Returns the resulting value.
    pub(crate) fn raise_to(&self, value: u64) -> u64 {
        self.value.fetch_max(value, Ordering::Relaxed).max(value)
    }

    /// Get the current value of the gauge.
    pub(crate) fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}
