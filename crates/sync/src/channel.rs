//! Channel abstractions the remote session exposes to the core.
//!
//! The session owns the live UI; the core only ever sees these four
//! primitives: a one-shot notification listener, a panel visibility wait, and
//! the size/remove pair of a removable collection.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::Result;

/// How a pending notification is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    Accept,
    Dismiss,
}

/// A single-fire notification raised by the remote session.
///
/// At most one is pending at any instant; a second cannot be raised until the
/// first is resolved. The responder is consumed by [`Notification::settle`],
/// so resolution happens at most once by construction. The session side must
/// treat a dropped responder as a dismissal so the UI is never left blocked.
#[derive(Debug)]
pub struct Notification {
    message: String,
    responder: oneshot::Sender<Disposition>,
}

impl Notification {
    pub fn new(message: impl Into<String>, responder: oneshot::Sender<Disposition>) -> Self {
        Self {
            message: message.into(),
            responder,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Resolve the notification and hand back its message.
    pub fn settle(self, disposition: Disposition) -> String {
        // The session may have stopped waiting for the reply; the
        // notification ceases to exist either way.
        let _ = self.responder.send(disposition);
        self.message
    }
}

/// One-shot notification listener registration.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Arm a listener for the next notification. Arming must complete before
    /// the triggering action starts, otherwise a notification raised
    /// synchronously inside the action is silently dropped.
    async fn arm(&self) -> Result<oneshot::Receiver<Notification>>;
}

/// Persistent on-screen success indicator.
#[async_trait]
pub trait PanelChannel: Send + Sync {
    /// Resolve once the panel is visible, yielding its content.
    ///
    /// The resolver bounds this wait with its own timeout; implementations
    /// may poll indefinitely as long as they are cancel-safe.
    async fn wait_visible(&self) -> Result<String>;
}

/// An ordered remote collection whose items are removable from the front.
///
/// Size is observable only by re-querying the session. A removal is
/// eventually reflected in a later size query, but not necessarily
/// immediately (rendering delay), which is why [`drain`](crate::drain::drain)
/// re-measures after a settle wait.
#[async_trait]
pub trait RemovableCollection: Send + Sync {
    async fn size(&self) -> Result<usize>;

    /// Remove the item at index 0. Later items shift down, so repeated calls
    /// walk the whole collection without removing by identity.
    async fn remove_first(&self) -> Result<()>;

    /// Give the remote session time to reflect a mutation. The default is a
    /// flat bounded wait; implementations that can observe rendering should
    /// override it.
    async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
