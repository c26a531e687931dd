//! Outcome race resolution: pair one action with the first terminal outcome
//! the remote session reports for it.

use std::future::Future;
use std::time::Duration;

use futures::future;
use tokio::time::sleep;
use tracing::debug;

use crate::channel::{Disposition, NotificationChannel, PanelChannel};
use crate::error::{Result, SyncError};

/// The terminal outcome of one resolved action.
///
/// Exactly one variant is produced per invocation. `NotificationReceived` and
/// `PanelAppeared` are mutually exclusive per invocation: the resolver
/// returns whichever is observed first and ignores the other if it fires
/// later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A notification was raised and resolved.
    NotificationReceived { message: String },
    /// The persistent success panel became visible.
    PanelAppeared { content: String },
    /// Neither channel fired within the window.
    TimedOut,
}

/// Races an action against its expected outcome channels.
///
/// The central correctness property: the notification listener is armed
/// *before* the action future is created, so a notification raised
/// synchronously during the action's own execution is never missed. Arming
/// after starting the action is a race that silently drops fast
/// notifications; that ordering is not expressible through this API.
///
/// ```no_run
/// # use std::time::Duration;
/// # use vitrine_sync::{OutcomeResolver, NotificationChannel, PanelChannel, SyncError};
/// # async fn demo(dialogs: &dyn NotificationChannel, panel: &dyn PanelChannel) -> vitrine_sync::Result<()> {
/// let outcome = OutcomeResolver::new(Duration::from_secs(5))
///     .watch_notification(dialogs)
///     .watch_panel(panel)
///     .run(|| async { Ok::<(), SyncError>(()) })
///     .await?;
/// # let _ = outcome; Ok(())
/// # }
/// ```
pub struct OutcomeResolver<'a> {
    notification: Option<&'a dyn NotificationChannel>,
    panel: Option<&'a dyn PanelChannel>,
    timeout: Duration,
    disposition: Disposition,
}

impl<'a> OutcomeResolver<'a> {
    pub fn new(timeout: Duration) -> Self {
        Self {
            notification: None,
            panel: None,
            timeout,
            disposition: Disposition::Accept,
        }
    }

    /// Watch for a notification; it is resolved (accepted unless
    /// [`dismiss`](Self::dismiss) was requested) as soon as it arrives.
    pub fn watch_notification(mut self, channel: &'a dyn NotificationChannel) -> Self {
        self.notification = Some(channel);
        self
    }

    /// Watch for the success panel becoming visible.
    pub fn watch_panel(mut self, channel: &'a dyn PanelChannel) -> Self {
        self.panel = Some(channel);
        self
    }

    /// Dismiss the notification instead of accepting it.
    pub fn dismiss(mut self) -> Self {
        self.disposition = Disposition::Dismiss;
        self
    }

    /// Arm the watched channels, run `action`, and return the first outcome.
    ///
    /// The action's own failure propagates as [`SyncError::ActionFailed`],
    /// never as [`ActionOutcome::TimedOut`]. The resolver returns as soon as
    /// a channel fires even if the action future is still pending, because a
    /// raised notification can block the action from ever completing; the
    /// abandoned future is dropped at that point.
    pub async fn run<F, Fut, E>(self, action: F) -> Result<ActionOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: std::fmt::Display,
    {
        // Arm before acting. Everything below depends on this ordering.
        let armed = match self.notification {
            Some(channel) => Some(channel.arm().await?),
            None => None,
        };

        let action = action();
        tokio::pin!(action);

        let notification = async {
            match armed {
                Some(rx) => rx.await.map_err(|_| SyncError::ChannelClosed("notification")),
                None => future::pending().await,
            }
        };
        tokio::pin!(notification);

        let panel = async {
            match self.panel {
                Some(channel) => channel.wait_visible().await,
                None => future::pending().await,
            }
        };
        tokio::pin!(panel);

        let deadline = sleep(self.timeout);
        tokio::pin!(deadline);

        let mut action_done = false;
        loop {
            tokio::select! {
                res = &mut action, if !action_done => {
                    res.map_err(|e| SyncError::ActionFailed(e.to_string()))?;
                    action_done = true;
                    debug!("action completed, still waiting for an outcome");
                }
                raised = &mut notification => {
                    let message = raised?.settle(self.disposition);
                    debug!(%message, "notification resolved");
                    return Ok(ActionOutcome::NotificationReceived { message });
                }
                content = &mut panel => {
                    let content = content?;
                    debug!(%content, "panel appeared");
                    return Ok(ActionOutcome::PanelAppeared { content });
                }
                _ = &mut deadline => {
                    debug!(timeout_ms = self.timeout.as_millis() as u64, "no outcome observed");
                    return Ok(ActionOutcome::TimedOut);
                }
            }
        }
    }
}

/// Convenience for the common case where only a notification can follow the
/// action (no panel possible). Same arm-before-act ordering; returns the
/// message directly, or [`SyncError::NoNotification`] if the window elapses
/// with nothing raised.
pub async fn resolve_single_notification<F, Fut, E>(
    channel: &dyn NotificationChannel,
    timeout: Duration,
    action: F,
) -> Result<String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
    E: std::fmt::Display,
{
    let outcome = OutcomeResolver::new(timeout)
        .watch_notification(channel)
        .run(action)
        .await?;

    match outcome {
        ActionOutcome::NotificationReceived { message } => Ok(message),
        // No panel channel was watched, so any other outcome means the window
        // elapsed with nothing raised.
        ActionOutcome::PanelAppeared { .. } | ActionOutcome::TimedOut => {
            Err(SyncError::NoNotification(timeout.as_millis() as u64))
        }
    }
}
