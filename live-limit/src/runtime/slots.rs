/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use futures_util::future::{select_all, FutureExt, SelectAll, Shared};
use futures_util::ready;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use crate::config::Config;
use crate::metrics::LimiterMetrics;
use crate::types::OverflowPolicy;

/// Key of an in-flight slot. Wraps around on overflow.
pub(crate) type SlotId = u64;

/// Settles once the owning slot has been released.
///
/// The sender half lives in [`OwnedSlot`] and is never used to send, so the receiver
/// always resolves to `Err(RecvError)`. Waiters don't care either way.
type ReleaseSignal = Shared<oneshot::Receiver<()>>;

struct SlotTable {
    in_flight: HashMap<SlotId, ReleaseSignal>,
    next_id: SlotId,
}

impl SlotTable {
    fn new() -> Self {
        Self {
            in_flight: HashMap::new(),
            next_id: SlotId::MIN,
        }
    }

    fn mint_id(&mut self) -> SlotId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

impl fmt::Debug for SlotTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotTable")
            .field("in_flight", &self.in_flight.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// Shared state behind every clone of a [`Limiter`](crate::Limiter).
#[derive(Debug)]
pub(crate) struct Slots {
    // NOTE: the lock is only held for check-and-commit, never across an await
    table: Mutex<SlotTable>,
    max_concurrent: usize,
    overflow_policy: OverflowPolicy,
    metrics: LimiterMetrics,
}

/// Result of a single admission attempt
enum Claim {
    Admitted(OwnedSlot),
    Dropped,
    /// Every slot is taken, wait on any of these before trying again
    Full(Vec<ReleaseSignal>),
}

impl Slots {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            table: Mutex::new(SlotTable::new()),
            max_concurrent: config.max_concurrent(),
            overflow_policy: config.overflow_policy(),
            metrics: LimiterMetrics::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotTable> {
        // nothing panics while the table is locked, it is never left half updated
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub(crate) fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow_policy
    }

    pub(crate) fn metrics(&self) -> &LimiterMetrics {
        &self.metrics
    }

    /// Number of slots currently taken
    pub(crate) fn in_flight(&self) -> usize {
        self.lock().in_flight.len()
    }

    fn mint_id(&self) -> SlotId {
        self.lock().mint_id()
    }

    fn try_claim(self: &Arc<Self>, id: SlotId) -> Claim {
        let mut table = self.lock();

        if table.in_flight.len() < self.max_concurrent {
            let (release_tx, release_rx) = oneshot::channel();
            table.in_flight.insert(id, release_rx.shared());
            let in_flight = table.in_flight.len();
            self.metrics.record_admitted(in_flight);
            tracing::trace!(slot = id, in_flight, "slot admitted");
            return Claim::Admitted(OwnedSlot {
                id,
                slots: self.clone(),
                _release: release_tx,
            });
        }

        match self.overflow_policy {
            OverflowPolicy::Drop => {
                self.metrics.record_dropped();
                tracing::debug!(
                    slot = id,
                    max_concurrent = self.max_concurrent,
                    "all slots taken, dropping call"
                );
                Claim::Dropped
            }
            OverflowPolicy::Queue => Claim::Full(table.in_flight.values().cloned().collect()),
        }
    }

    fn release(&self, id: SlotId) {
        let mut table = self.lock();
        table.in_flight.remove(&id);
        let in_flight = table.in_flight.len();
        self.metrics.record_released(in_flight);
        tracing::trace!(slot = id, in_flight, "slot released");
    }
}

/// A slot claimed from a [`Limiter`](crate::Limiter).
///
/// The slot is given back when this is dropped, waking up any callers queued behind it.
#[must_use]
#[clippy::has_significant_drop]
#[derive(Debug)]
pub struct OwnedSlot {
    id: SlotId,
    slots: Arc<Slots>,
    // dropped after `Drop::drop` has removed the slot from the table
    _release: oneshot::Sender<()>,
}

impl Drop for OwnedSlot {
    fn drop(&mut self) {
        self.slots.release(self.id);
    }
}

/// Future returned by [`Limiter::acquire`](crate::Limiter::acquire).
///
/// Resolves to `Some(slot)` once admitted or `None` if the call was dropped. The slot
/// identifier is minted when the future is created, before any admission decision.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct AcquireSlot {
    slots: Arc<Slots>,
    id: SlotId,
    queued: bool,
    waiting: Option<SelectAll<ReleaseSignal>>,
}

impl AcquireSlot {
    pub(crate) fn new(slots: Arc<Slots>) -> Self {
        let id = slots.mint_id();
        Self {
            slots,
            id,
            queued: false,
            waiting: None,
        }
    }
}

impl fmt::Debug for AcquireSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcquireSlot")
            .field("id", &self.id)
            .field("queued", &self.queued)
            .field("waiting", &self.waiting.is_some())
            .finish()
    }
}

impl Future for AcquireSlot {
    type Output = Option<OwnedSlot>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        loop {
            if let Some(waiting) = this.waiting.as_mut() {
                // A slot settling is all we wait for, how it settled is irrelevant. Several
                // waiters may wake for the same release so admission is re-checked below.
                let _ = ready!(waiting.poll_unpin(cx));
                this.waiting = None;
            }

            match this.slots.try_claim(this.id) {
                Claim::Admitted(slot) => return Poll::Ready(Some(slot)),
                Claim::Dropped => return Poll::Ready(None),
                Claim::Full(signals) => {
                    if !this.queued {
                        this.queued = true;
                        this.slots.metrics.record_queued();
                        tracing::debug!(
                            slot = this.id,
                            max_concurrent = this.slots.max_concurrent,
                            "all slots taken, queueing call"
                        );
                    }
                    // non-empty: the table is full and max_concurrent >= 1
                    this.waiting = Some(select_all(signals));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio_test::{assert_pending, assert_ready, task};

    use super::{AcquireSlot, SlotId, Slots};
    use crate::config::Config;
    use crate::types::OverflowPolicy;

    fn slots(max_concurrent: usize, overflow_policy: OverflowPolicy) -> Arc<Slots> {
        let config = Config::builder()
            .max_concurrent(max_concurrent)
            .overflow_policy(overflow_policy)
            .build();
        Arc::new(Slots::new(&config))
    }

    #[test]
    fn test_slot_ids_wrap_around() {
        let slots = slots(1, OverflowPolicy::Queue);
        slots.lock().next_id = SlotId::MAX;
        assert_eq!(SlotId::MAX, slots.mint_id());
        assert_eq!(SlotId::MIN, slots.mint_id());
        assert_eq!(SlotId::MIN + 1, slots.mint_id());
    }

    #[tokio::test]
    async fn test_dropped_call_still_mints_id() {
        let slots = slots(1, OverflowPolicy::Drop);
        let held = AcquireSlot::new(slots.clone()).await.unwrap();
        assert!(AcquireSlot::new(slots.clone()).await.is_none());
        assert_eq!(2, slots.lock().next_id);
        assert_eq!(1, slots.in_flight());
        drop(held);
        assert_eq!(0, slots.in_flight());
        assert_eq!(1, slots.metrics().dropped());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_waiter_wakes_on_release() {
        let slots = slots(1, OverflowPolicy::Queue);
        let held = AcquireSlot::new(slots.clone()).await.unwrap();

        let mut waiter = task::spawn(AcquireSlot::new(slots.clone()));
        assert_pending!(waiter.poll());
        assert!(!waiter.is_woken());
        assert_eq!(1, slots.metrics().queued());

        drop(held);
        assert!(waiter.is_woken());
        let slot = assert_ready!(waiter.poll());
        assert!(slot.is_some());
        assert_eq!(1, slots.in_flight());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_simultaneous_wakeups_recheck_capacity() {
        let slots = slots(1, OverflowPolicy::Queue);
        let held = AcquireSlot::new(slots.clone()).await.unwrap();

        let mut w1 = task::spawn(AcquireSlot::new(slots.clone()));
        let mut w2 = task::spawn(AcquireSlot::new(slots.clone()));
        assert_pending!(w1.poll());
        assert_pending!(w2.poll());

        drop(held);
        assert!(w1.is_woken());
        assert!(w2.is_woken());

        // w1 claims the freed slot, w2 has to go back to waiting
        let s1 = assert_ready!(w1.poll()).unwrap();
        assert_pending!(w2.poll());
        assert_eq!(1, slots.in_flight());

        drop(s1);
        assert!(w2.is_woken());
        let _s2 = assert_ready!(w2.poll()).unwrap();
        assert_eq!(1, slots.in_flight());
        assert_eq!(1, slots.metrics().high_water_mark());
        assert_eq!(2, slots.metrics().queued());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_waiter_wakes_on_any_release() {
        let slots = slots(2, OverflowPolicy::Queue);
        let first = AcquireSlot::new(slots.clone()).await.unwrap();
        let second = AcquireSlot::new(slots.clone()).await.unwrap();

        let mut waiter = task::spawn(AcquireSlot::new(slots.clone()));
        assert_pending!(waiter.poll());

        drop(second);
        assert!(waiter.is_woken());
        let _third = assert_ready!(waiter.poll()).unwrap();
        assert_eq!(2, slots.in_flight());
        drop(first);
        assert_eq!(1, slots.in_flight());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_cancelled_waiter_holds_nothing() {
        let slots = slots(1, OverflowPolicy::Queue);
        let held = AcquireSlot::new(slots.clone()).await.unwrap();

        let mut waiter = task::spawn(AcquireSlot::new(slots.clone()));
        assert_pending!(waiter.poll());
        drop(waiter);

        drop(held);
        assert_eq!(0, slots.in_flight());
        let _slot = AcquireSlot::new(slots.clone()).await.unwrap();
        assert_eq!(1, slots.in_flight());
    }
}
