//! Status change fan-out: per-observer buffered queues.
//!
//! Every registered observer gets its own queue with its own overflow
//! policy, so a slow observer can only ever lose its own events. Emission is
//! synchronous and never blocks: the emitter applies the policy, enqueues,
//! and wakes the receiver.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// What to do when an observer does not consume status changes as fast as
/// they are produced.
///
/// The policy is per-observer, chosen at subscription time; one observer's
/// backlog never affects another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferingPolicy {
    /// The queue grows without bound.
    Unbounded,

    /// Keep at most `n` elements; once full, incoming elements are dropped.
    BufferingOldest(usize),

    /// Keep at most `n` elements; once full, the oldest queued element is
    /// evicted to make room for the incoming one.
    BufferingNewest(usize),
}

struct Shared<T> {
    queue: Mutex<VecDeque<T>>,
    notify: Notify,
    policy: BufferingPolicy,
}

/// The receiving half of one observer's queue.
///
/// Elements arrive in emission order. A newly registered observer sees only
/// changes emitted after registration; there is no history replay.
pub struct Subscription<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Subscription<T> {
    /// Waits for the next element.
    pub async fn recv(&mut self) -> T {
        loop {
            if let Some(value) = self.shared.queue.lock().pop_front() {
                return value;
            }
            self.shared.notify.notified().await;
        }
    }

    /// Returns the next element if one is already queued.
    pub fn try_recv(&mut self) -> Option<T> {
        self.shared.queue.lock().pop_front()
    }
}

/// The sending half, held by the emitter. One per observer.
pub(crate) struct Emitter<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Emitter<T> {
    /// Enqueues `value` per the observer's buffering policy. Never blocks.
    pub(crate) fn emit(&self, value: T) {
        {
            let mut queue = self.shared.queue.lock();
            match self.shared.policy {
                BufferingPolicy::Unbounded => queue.push_back(value),
                BufferingPolicy::BufferingOldest(limit) => {
                    // Drop the incoming element once the queue is full.
                    if queue.len() < limit {
                        queue.push_back(value);
                    }
                }
                BufferingPolicy::BufferingNewest(limit) => {
                    if limit == 0 {
                        return;
                    }
                    while queue.len() >= limit {
                        queue.pop_front();
                    }
                    queue.push_back(value);
                }
            }
        }
        self.shared.notify.notify_one();
    }

    /// Whether the receiving half still exists. Dead observers are pruned by
    /// the emitter's owner on the next emission pass.
    pub(crate) fn is_connected(&self) -> bool {
        Arc::strong_count(&self.shared) > 1
    }
}

/// Creates a connected emitter/subscription pair with the given policy.
pub(crate) fn channel<T>(policy: BufferingPolicy) -> (Emitter<T>, Subscription<T>) {
    let shared = Arc::new(Shared {
        queue: Mutex::new(VecDeque::new()),
        notify: Notify::new(),
        policy,
    });
    (
        Emitter {
            shared: Arc::clone(&shared),
        },
        Subscription { shared },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unbounded_delivers_in_emission_order() {
        let (emitter, mut subscription) = channel(BufferingPolicy::Unbounded);
        for i in 0..100 {
            emitter.emit(i);
        }
        for i in 0..100 {
            assert_eq!(subscription.recv().await, i);
        }
        assert_eq!(subscription.try_recv(), None);
    }

    #[tokio::test]
    async fn test_buffering_oldest_drops_incoming_when_full() {
        let (emitter, mut subscription) = channel(BufferingPolicy::BufferingOldest(2));
        emitter.emit(1);
        emitter.emit(2);
        emitter.emit(3);

        assert_eq!(subscription.try_recv(), Some(1));
        assert_eq!(subscription.try_recv(), Some(2));
        assert_eq!(subscription.try_recv(), None);
    }

    #[tokio::test]
    async fn test_buffering_newest_evicts_oldest_when_full() {
        let (emitter, mut subscription) = channel(BufferingPolicy::BufferingNewest(2));
        emitter.emit(1);
        emitter.emit(2);
        emitter.emit(3);

        assert_eq!(subscription.try_recv(), Some(2));
        assert_eq!(subscription.try_recv(), Some(3));
        assert_eq!(subscription.try_recv(), None);
    }

    #[tokio::test]
    async fn test_zero_capacity_drops_everything() {
        let (emitter, mut subscription) = channel(BufferingPolicy::BufferingNewest(0));
        emitter.emit(1);
        assert_eq!(subscription.try_recv(), None);

        let (emitter, mut subscription) = channel(BufferingPolicy::BufferingOldest(0));
        emitter.emit(1);
        assert_eq!(subscription.try_recv(), None);
    }

    #[tokio::test]
    async fn test_recv_wakes_on_emit() {
        let (emitter, mut subscription) = channel(BufferingPolicy::Unbounded);

        let receiver = tokio::spawn(async move { subscription.recv().await });
        // The emit may race ahead of the receiver registering; Notify holds
        // the permit either way.
        emitter.emit(42);

        assert_eq!(receiver.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_is_connected_tracks_receiver_drop() {
        let (emitter, subscription) = channel::<u32>(BufferingPolicy::Unbounded);
        assert!(emitter.is_connected());
        drop(subscription);
        assert!(!emitter.is_connected());
    }
}
