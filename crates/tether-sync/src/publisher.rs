//! Deduplicating state broadcast.
//!
//! Every synchronizer publishes through one [`StatePublisher`]. A state is
//! only broadcast when it differs from the last one, so consumers see every
//! distinct transition but not every producer emission.

use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Holder of the last published state and the broadcast sender.
pub struct StatePublisher<S> {
    last: Mutex<S>,
    tx: broadcast::Sender<S>,
}

impl<S: Clone + PartialEq> StatePublisher<S> {
    /// Create a publisher whose current state is `initial`.
    ///
    /// `capacity` is how many states a subscriber may fall behind before it
    /// starts skipping.
    pub fn new(initial: S, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            last: Mutex::new(initial),
            tx,
        }
    }

    /// Publish `state` if it differs from the last one. Returns whether it
    /// was published.
    pub fn publish(&self, state: S) -> bool {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if *last == state {
            return false;
        }
        *last = state.clone();
        // No subscribers is not an error; the state is still retained.
        let _ = self.tx.send(state);
        true
    }

    /// The last published state.
    pub fn current(&self) -> S {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribe: the stream yields the current state first, then every
    /// later distinct state.
    pub fn subscribe(&self) -> StateStream<S> {
        // Subscribing under the lock means no publication falls between the
        // snapshot and the receiver.
        let last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        StateStream {
            pending: Some(last.clone()),
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A consumer's view of a state stream.
///
/// The stream ends (yields `None`) once the synchronizer is dropped.
pub struct StateStream<S> {
    pending: Option<S>,
    rx: broadcast::Receiver<S>,
}

impl<S: Clone> StateStream<S> {
    /// Wait for the next state.
    pub async fn next(&mut self) -> Option<S> {
        if let Some(state) = self.pending.take() {
            return Some(state);
        }
        loop {
            match self.rx.recv().await {
                Ok(state) => return Some(state),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "state subscriber lagged, skipping missed states");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// The next state if one is already buffered.
    pub fn try_next(&mut self) -> Option<S> {
        if let Some(state) = self.pending.take() {
            return Some(state);
        }
        loop {
            match self.rx.try_recv() {
                Ok(state) => return Some(state),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "state subscriber lagged, skipping missed states");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Wait until a state matching `pred` arrives and return it.
    ///
    /// Returns `None` if the stream ends first.
    pub async fn wait_for(&mut self, mut pred: impl FnMut(&S) -> bool) -> Option<S> {
        while let Some(state) = self.next().await {
            if pred(&state) {
                return Some(state);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_duplicates_are_dropped() {
        let publisher = StatePublisher::new(0u8, 8);
        let mut stream = publisher.subscribe();

        assert!(publisher.publish(1));
        assert!(!publisher.publish(1));
        assert!(publisher.publish(2));
        assert!(publisher.publish(1));

        assert_eq!(stream.next().await, Some(0));
        assert_eq!(stream.next().await, Some(1));
        assert_eq!(stream.next().await, Some(2));
        assert_eq!(stream.next().await, Some(1));
        assert_eq!(stream.try_next(), None);
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_current_first() {
        let publisher = StatePublisher::new("loading", 8);
        publisher.publish("ready");

        let mut stream = publisher.subscribe();
        assert_eq!(stream.next().await, Some("ready"));
        assert_eq!(publisher.current(), "ready");
    }

    #[tokio::test]
    async fn test_lagging_subscriber_skips() {
        let publisher = StatePublisher::new(0u32, 2);
        let mut stream = publisher.subscribe();
        for n in 1..=10 {
            publisher.publish(n);
        }

        assert_eq!(stream.next().await, Some(0));
        // Only the newest states survive in the buffer.
        assert_eq!(stream.next().await, Some(9));
        assert_eq!(stream.next().await, Some(10));
    }

    #[tokio::test]
    async fn test_stream_ends_when_publisher_dropped() {
        let publisher = StatePublisher::new(0u8, 4);
        let mut stream = publisher.subscribe();
        drop(publisher);

        assert_eq!(stream.next().await, Some(0));
        assert_eq!(stream.next().await, None);
    }

    proptest! {
        #[test]
        fn stream_never_repeats_a_state(states in prop::collection::vec(0u8..4, 0..64)) {
            let publisher = StatePublisher::new(0u8, 128);
            let mut stream = publisher.subscribe();
            for state in &states {
                publisher.publish(*state);
            }

            let mut seen = Vec::new();
            while let Some(state) = stream.try_next() {
                seen.push(state);
            }

            prop_assert!(seen.windows(2).all(|pair| pair[0] != pair[1]));
            prop_assert_eq!(seen.last().copied(), Some(publisher.current()));
        }
    }
}
