/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

mod instruments;

use self::instruments::{Gauge, IncreasingCounter};

/// Counters describing what a [`Limiter`](crate::Limiter) has done so far.
///
/// All clones of a limiter share one set of metrics.
#[derive(Debug, Default)]
pub struct LimiterMetrics {
    admitted: IncreasingCounter,
    dropped: IncreasingCounter,
    queued: IncreasingCounter,
    in_flight: Gauge,
    high_water_mark: Gauge,
}

impl LimiterMetrics {
    pub(crate) fn record_admitted(&self, in_flight: usize) {
        self.admitted.increment(1);
        self.in_flight.set(in_flight as u64);
        self.high_water_mark.raise_to(in_flight as u64);
    }

    pub(crate) fn record_released(&self, in_flight: usize) {
        self.in_flight.set(in_flight as u64);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.increment(1);
    }

    pub(crate) fn record_queued(&self) {
        self.queued.increment(1);
    }

    /// Total number of calls admitted into a slot.
    pub fn admitted(&self) -> u64 {
        self.admitted.value()
    }

    /// Total number of calls dropped because every slot was taken.
    pub fn dropped(&self) -> u64 {
        self.dropped.value()
    }

    /// Total number of calls that had to wait for a slot at least once.
    pub fn queued(&self) -> u64 {
        self.queued.value()
    }

    /// Number of operations in flight as of the last admission or release.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.value()
    }

    /// The most operations that have ever been in flight at the same time.
    pub fn high_water_mark(&self) -> u64 {
        self.high_water_mark.value()
    }
}

#[cfg(test)]
mod tests {
    use super::LimiterMetrics;

    #[test]
    fn test_high_water_mark_survives_release() {
        let metrics = LimiterMetrics::default();
        metrics.record_admitted(1);
        metrics.record_admitted(2);
        metrics.record_released(1);
        metrics.record_admitted(2);
        metrics.record_released(1);
        metrics.record_released(0);

        assert_eq!(3, metrics.admitted());
        assert_eq!(0, metrics.in_flight());
        assert_eq!(2, metrics.high_water_mark());
    }
}
