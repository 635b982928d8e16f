//! Round- and phase-indexed buffer of received peer messages

use flipnet_core::{Phase, Value};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Buffer of peer messages keyed by `(phase, round)`.
///
/// Inbound handlers append while the driver reads; duplicates count, and
/// messages for rounds ahead of the current one are retained so
/// out-of-order arrivals are not lost. Each append signals waiters so the
/// driver's bounded wait wakes without polling.
pub struct Inbox {
    buckets: Mutex<HashMap<(Phase, u64), Vec<(Value, usize)>>>,
    notify: Notify,
}

impl Inbox {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            notify: Notify::new(),
        }
    }

    /// Append a message to its `(phase, round)` bucket.
    pub fn deliver(&self, phase: Phase, round: u64, value: Value, from: usize) {
        self.buckets
            .lock()
            .entry((phase, round))
            .or_default()
            .push((value, from));
        self.notify.notify_waiters();
    }

    /// Current contents of a bucket.
    pub fn snapshot(&self, phase: Phase, round: u64) -> Vec<(Value, usize)> {
        self.buckets
            .lock()
            .get(&(phase, round))
            .cloned()
            .unwrap_or_default()
    }

    /// Values in a bucket, senders dropped.
    pub fn values(&self, phase: Phase, round: u64) -> Vec<Value> {
        self.snapshot(phase, round)
            .into_iter()
            .map(|(value, _)| value)
            .collect()
    }

    /// Number of messages in a bucket.
    pub fn count(&self, phase: Phase, round: u64) -> usize {
        self.buckets
            .lock()
            .get(&(phase, round))
            .map(|bucket| bucket.len())
            .unwrap_or(0)
    }

    /// Wait until a bucket holds at least `threshold` messages or `window`
    /// elapses, whichever comes first.
    pub async fn wait_for(&self, phase: Phase, round: u64, threshold: usize, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;

        loop {
            // Register interest before re-checking so a concurrent deliver
            // cannot slip between the check and the wait.
            let notified = self.notify.notified();

            if self.count(phase, round) >= threshold {
                return;
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return;
            }
        }
    }

    /// Drop buckets for rounds below `round`. Safe once the tally for
    /// every earlier round has completed.
    pub fn prune_below(&self, round: u64) {
        self.buckets.lock().retain(|&(_, r), _| r >= round);
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared inbox
pub type SharedInbox = Arc<Inbox>;

/// Create a shared inbox
pub fn create_inbox() -> SharedInbox {
    Arc::new(Inbox::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_and_snapshot() {
        let inbox = Inbox::new();
        inbox.deliver(Phase::One, 0, Value::Zero, 1);
        inbox.deliver(Phase::One, 0, Value::One, 2);
        inbox.deliver(Phase::Two, 0, Value::Maybe, 1);

        assert_eq!(
            inbox.snapshot(Phase::One, 0),
            vec![(Value::Zero, 1), (Value::One, 2)]
        );
        assert_eq!(inbox.values(Phase::Two, 0), vec![Value::Maybe]);
        assert_eq!(inbox.count(Phase::Two, 1), 0);
    }

    #[test]
    fn test_duplicates_count() {
        let inbox = Inbox::new();
        inbox.deliver(Phase::One, 3, Value::One, 1);
        inbox.deliver(Phase::One, 3, Value::One, 1);

        assert_eq!(inbox.count(Phase::One, 3), 2);
    }

    #[test]
    fn test_future_rounds_are_buffered() {
        let inbox = Inbox::new();
        inbox.deliver(Phase::One, 7, Value::Zero, 4);

        assert_eq!(inbox.values(Phase::One, 7), vec![Value::Zero]);
    }

    #[test]
    fn test_prune_below() {
        let inbox = Inbox::new();
        inbox.deliver(Phase::One, 0, Value::Zero, 1);
        inbox.deliver(Phase::Two, 1, Value::One, 1);
        inbox.deliver(Phase::One, 2, Value::One, 2);

        inbox.prune_below(1);

        assert_eq!(inbox.count(Phase::One, 0), 0);
        assert_eq!(inbox.count(Phase::Two, 1), 1);
        assert_eq!(inbox.count(Phase::One, 2), 1);
    }

    #[tokio::test]
    async fn test_wait_resolves_on_threshold() {
        let inbox = create_inbox();

        let waiter = inbox.clone();
        let handle = tokio::spawn(async move {
            waiter
                .wait_for(Phase::One, 0, 2, Duration::from_secs(5))
                .await;
        });

        inbox.deliver(Phase::One, 0, Value::Zero, 1);
        inbox.deliver(Phase::One, 0, Value::One, 2);

        // Must resolve well before the window.
        tokio::time::timeout(Duration::from_millis(500), handle)
            .await
            .expect("wait did not resolve on threshold")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_resolves_on_window() {
        let inbox = Inbox::new();

        let start = tokio::time::Instant::now();
        inbox
            .wait_for(Phase::One, 0, 5, Duration::from_millis(50))
            .await;

        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(inbox.count(Phase::One, 0), 0);
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_already_met() {
        let inbox = Inbox::new();
        inbox.deliver(Phase::Two, 2, Value::One, 0);

        let start = tokio::time::Instant::now();
        inbox
            .wait_for(Phase::Two, 2, 1, Duration::from_secs(5))
            .await;

        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
