//! Scroll event wiring between the render surface and its controller.
//!
//! The view owns a [`ScrollSignal`] and calls [`notify()`](ScrollSignal::notify)
//! whenever the list scrolls.  A controller holds a [`ScrollSubscription`] for
//! as long as it lives; dropping the subscription is the unsubscribe, so
//! teardown on any path (including task abort) releases it.
//!
//! Backed by a [`tokio::sync::watch`] channel: only the latest viewport
//! matters, older unread events are superseded.

use tokio::sync::watch;

use crate::viewport::Viewport;

/// Publisher side, owned by the view.
#[derive(Debug)]
pub struct ScrollSignal {
    tx: watch::Sender<Viewport>,
}

impl ScrollSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Viewport::default());
        Self { tx }
    }

    /// Publish a scroll event.  Works with no subscribers.
    pub fn notify(&self, viewport: Viewport) {
        self.tx.send_replace(viewport);
    }

    /// Register a listener.  Events published before this call are not
    /// delivered.
    pub fn subscribe(&self) -> ScrollSubscription {
        ScrollSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ScrollSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener side, owned by a controller.
#[derive(Debug)]
pub struct ScrollSubscription {
    rx: watch::Receiver<Viewport>,
}

impl ScrollSubscription {
    /// Wait for the next scroll event.  Returns `None` once the signal has
    /// been dropped.
    pub async fn next(&mut self) -> Option<Viewport> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Forget any event that arrived since the last [`next()`](Self::next).
    pub fn discard_pending(&mut self) {
        self.rx.borrow_and_update();
    }
}
