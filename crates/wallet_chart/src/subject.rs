//! Latest-value broadcast primitive.
//!
//! [`StateSubject`] keeps the most recently published value and a list of
//! subscribers. A new subscriber receives the current value first and then
//! every later publication, in order, through its own unbounded queue, so a
//! slow reader never causes another reader to miss a state.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;

struct Inner<T> {
    current: T,
    subscribers: Vec<mpsc::UnboundedSender<T>>,
    completed: bool,
}

/// Holds the current value and fans every update out to subscribers.
pub struct StateSubject<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> StateSubject<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: initial,
                subscribers: Vec::new(),
                completed: false,
            }),
        }
    }

    /// Snapshot of the current value.
    pub fn current(&self) -> T {
        self.inner.lock().current.clone()
    }

    /// Replace the current value and deliver it to every live subscriber.
    ///
    /// Returns `false` (and changes nothing) once the subject is completed.
    pub fn publish(&self, value: T) -> bool {
        let mut inner = self.inner.lock();
        if inner.completed {
            return false;
        }
        inner
            .subscribers
            .retain(|tx| tx.send(value.clone()).is_ok());
        inner.current = value;
        true
    }

    /// Subscribe to updates. The receiver yields the current value first.
    ///
    /// Subscribing to a completed subject yields the last value and then ends.
    pub fn subscribe(&self) -> StateReceiver<T> {
        let mut inner = self.inner.lock();
        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is alive, so this send cannot fail.
        let _ = tx.send(inner.current.clone());
        if !inner.completed {
            inner.subscribers.push(tx);
        }
        StateReceiver { rx }
    }

    /// End every subscriber stream. Idempotent.
    pub fn complete(&self) {
        let mut inner = self.inner.lock();
        inner.completed = true;
        inner.subscribers.clear();
    }

    #[cfg(test)]
    fn is_completed(&self) -> bool {
        self.inner.lock().completed
    }

    /// Number of subscribers still attached (dropped receivers are pruned on
    /// the next publication).
    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

/// Receiving half of a [`StateSubject`] subscription.
pub struct StateReceiver<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> StateReceiver<T> {
    /// Wait for the next value. `None` once the subject has completed (or was
    /// dropped) and every queued value has been read.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Take the next queued value without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Drain everything queued right now.
    pub fn drain(&mut self) -> Vec<T> {
        let mut values = Vec::new();
        while let Ok(value) = self.rx.try_recv() {
            values.push(value);
        }
        values
    }
}

impl<T> Stream for StateReceiver<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn new_subject_exposes_initial_value() {
        let subject = StateSubject::new(1);
        assert_eq!(subject.current(), 1);
        assert!(!subject.is_completed());
    }

    #[test]
    fn subscriber_gets_current_then_updates() {
        let subject = StateSubject::new(0);
        subject.publish(1);

        let mut rx = subject.subscribe();
        subject.publish(2);
        subject.publish(3);

        assert_eq!(rx.drain(), vec![1, 2, 3]);
    }

    #[test]
    fn every_subscriber_sees_every_value() {
        let subject = StateSubject::new("a");
        let mut first = subject.subscribe();
        let mut second = subject.subscribe();
        subject.publish("b");

        assert_eq!(first.drain(), vec!["a", "b"]);
        assert_eq!(second.drain(), vec!["a", "b"]);
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let subject = StateSubject::new(0);
        let rx = subject.subscribe();
        let _kept = subject.subscribe();
        assert_eq!(subject.subscriber_count(), 2);

        drop(rx);
        subject.publish(1);
        assert_eq!(subject.subscriber_count(), 1);
    }

    #[test]
    fn complete_stops_publication() {
        let subject = StateSubject::new(0);
        let mut rx = subject.subscribe();
        subject.complete();
        subject.complete();

        assert!(!subject.publish(5));
        assert_eq!(subject.current(), 0);
        assert_eq!(rx.try_recv(), Some(0));
        assert_eq!(rx.try_recv(), None);
    }

    #[tokio::test]
    async fn stream_ends_after_complete() {
        let subject = StateSubject::new(0);
        let rx = subject.subscribe();
        subject.publish(1);
        subject.complete();

        let values: Vec<i32> = rx.collect().await;
        assert_eq!(values, vec![0, 1]);
    }

    #[tokio::test]
    async fn late_subscriber_to_completed_subject_gets_last_value() {
        let subject = StateSubject::new(0);
        subject.publish(9);
        subject.complete();

        let mut rx = subject.subscribe();
        assert_eq!(rx.recv().await, Some(9));
        assert_eq!(rx.recv().await, None);
    }
}
