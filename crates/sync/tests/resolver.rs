//! Race-resolution behavior against mock channels.
//!
//! All tests run on tokio's paused clock, so the delays below are virtual
//! and the suite completes instantly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};
use tokio::time::sleep;

use vitrine_sync::{
    resolve_single_notification, ActionOutcome, Disposition, Notification, NotificationChannel,
    OutcomeResolver, PanelChannel, SyncError,
};

/// Mock session dialog stream: holds the armed one-shot sender, like a
/// browser page holds its next-dialog listener.
#[derive(Default)]
struct MockDialogs {
    armed: Mutex<Option<oneshot::Sender<Notification>>>,
}

impl MockDialogs {
    /// Raise a notification toward whoever armed a listener. Returns the
    /// disposition receiver, or `None` if nobody was listening (the
    /// notification is lost, as in a real session).
    async fn raise(&self, message: &str) -> Option<oneshot::Receiver<Disposition>> {
        let sender = self.armed.lock().await.take()?;
        let (tx, rx) = oneshot::channel();
        sender.send(Notification::new(message, tx)).ok()?;
        Some(rx)
    }
}

#[async_trait]
impl NotificationChannel for MockDialogs {
    async fn arm(&self) -> vitrine_sync::Result<oneshot::Receiver<Notification>> {
        let (tx, rx) = oneshot::channel();
        *self.armed.lock().await = Some(tx);
        Ok(rx)
    }
}

/// Panel that becomes visible after a fixed delay.
struct MockPanel {
    content: &'static str,
    delay: Duration,
}

#[async_trait]
impl PanelChannel for MockPanel {
    async fn wait_visible(&self) -> vitrine_sync::Result<String> {
        sleep(self.delay).await;
        Ok(self.content.to_string())
    }
}

fn never_panel() -> MockPanel {
    MockPanel {
        content: "unreachable",
        delay: Duration::from_secs(3600),
    }
}

#[tokio::test(start_paused = true)]
async fn zero_delay_notification_is_never_missed() {
    let dialogs = MockDialogs::default();

    // The action raises the notification synchronously during its own
    // execution; the listener armed inside run() must already be in place.
    let outcome = OutcomeResolver::new(Duration::from_millis(1000))
        .watch_notification(&dialogs)
        .run(|| async {
            let raised = dialogs.raise("Wrong password.").await;
            assert!(raised.is_some(), "listener was not armed before the action ran");
            Ok::<(), SyncError>(())
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::NotificationReceived {
            message: "Wrong password.".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn arming_after_the_action_loses_a_zero_delay_notification() {
    let dialogs = MockDialogs::default();

    // Wrong order: act first, then resolve. The notification fires with no
    // listener attached and is gone, so the resolver can only time out.
    assert!(dialogs.raise("too fast").await.is_none());

    let outcome = OutcomeResolver::new(Duration::from_millis(100))
        .watch_notification(&dialogs)
        .run(|| async { Ok::<(), SyncError>(()) })
        .await
        .unwrap();

    assert_eq!(outcome, ActionOutcome::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn panel_after_delay_wins_when_no_notification() {
    let dialogs = MockDialogs::default();
    let panel = MockPanel {
        content: "Order placed",
        delay: Duration::from_millis(200),
    };

    let outcome = OutcomeResolver::new(Duration::from_millis(1000))
        .watch_notification(&dialogs)
        .watch_panel(&panel)
        .run(|| async { Ok::<(), SyncError>(()) })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::PanelAppeared {
            content: "Order placed".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn nothing_observable_times_out() {
    let dialogs = MockDialogs::default();
    let panel = never_panel();

    let outcome = OutcomeResolver::new(Duration::from_millis(1000))
        .watch_notification(&dialogs)
        .watch_panel(&panel)
        .run(|| async { Ok::<(), SyncError>(()) })
        .await
        .unwrap();

    assert_eq!(outcome, ActionOutcome::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn first_observed_channel_wins() {
    let dialogs = Arc::new(MockDialogs::default());
    let panel = MockPanel {
        content: "Thank you for your purchase!",
        delay: Duration::from_millis(200),
    };

    // Notification at 50 ms beats the panel at 200 ms.
    let raiser = dialogs.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(50)).await;
        raiser.raise("Please fill out Name and Creditcard.").await;
    });

    let outcome = OutcomeResolver::new(Duration::from_millis(1000))
        .watch_notification(&*dialogs)
        .watch_panel(&panel)
        .run(|| async { Ok::<(), SyncError>(()) })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::NotificationReceived {
            message: "Please fill out Name and Creditcard.".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn notification_wins_even_while_action_is_blocked() {
    let dialogs = Arc::new(MockDialogs::default());

    let raiser = dialogs.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(10)).await;
        raiser.raise("Product added").await;
    });

    // The action never completes, as if blocked behind a modal. The resolver
    // must not wait for it.
    let outcome = OutcomeResolver::new(Duration::from_millis(1000))
        .watch_notification(&*dialogs)
        .run(|| async {
            sleep(Duration::from_secs(3600)).await;
            Ok::<(), SyncError>(())
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ActionOutcome::NotificationReceived {
            message: "Product added".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn notification_is_accepted_exactly_once() {
    let dialogs = MockDialogs::default();
    let disposition = Mutex::new(None);

    OutcomeResolver::new(Duration::from_millis(1000))
        .watch_notification(&dialogs)
        .run(|| async {
            *disposition.lock().await = dialogs.raise("Sign up successful.").await;
            Ok::<(), SyncError>(())
        })
        .await
        .unwrap();

    let rx = disposition.lock().await.take().unwrap();
    assert_eq!(rx.await.unwrap(), Disposition::Accept);
}

#[tokio::test(start_paused = true)]
async fn dismiss_is_honored() {
    let dialogs = MockDialogs::default();
    let disposition = Mutex::new(None);

    OutcomeResolver::new(Duration::from_millis(1000))
        .watch_notification(&dialogs)
        .dismiss()
        .run(|| async {
            *disposition.lock().await = dialogs.raise("Are you sure?").await;
            Ok::<(), SyncError>(())
        })
        .await
        .unwrap();

    let rx = disposition.lock().await.take().unwrap();
    assert_eq!(rx.await.unwrap(), Disposition::Dismiss);
}

#[tokio::test(start_paused = true)]
async fn consecutive_resolves_do_not_leak_listeners() {
    let dialogs = MockDialogs::default();

    let first = OutcomeResolver::new(Duration::from_millis(1000))
        .watch_notification(&dialogs)
        .run(|| async {
            dialogs.raise("first").await;
            Ok::<(), SyncError>(())
        })
        .await
        .unwrap();
    assert_eq!(
        first,
        ActionOutcome::NotificationReceived { message: "first".into() }
    );

    // The first listener fired and is gone; the second resolve arms a fresh
    // one and only ever sees the second notification.
    let second = OutcomeResolver::new(Duration::from_millis(1000))
        .watch_notification(&dialogs)
        .run(|| async {
            dialogs.raise("second").await;
            Ok::<(), SyncError>(())
        })
        .await
        .unwrap();
    assert_eq!(
        second,
        ActionOutcome::NotificationReceived { message: "second".into() }
    );
}

#[tokio::test(start_paused = true)]
async fn action_failure_is_not_a_timeout() {
    let dialogs = MockDialogs::default();

    let err = OutcomeResolver::new(Duration::from_millis(1000))
        .watch_notification(&dialogs)
        .run(|| async { Err::<(), _>("store unreachable") })
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::ActionFailed(reason) if reason.contains("store unreachable")));
}

#[tokio::test(start_paused = true)]
async fn closed_notification_channel_is_an_error() {
    let dialogs = MockDialogs::default();

    let err = OutcomeResolver::new(Duration::from_millis(1000))
        .watch_notification(&dialogs)
        .run(|| async {
            // Session tears down its listener without a dialog.
            dialogs.armed.lock().await.take();
            Ok::<(), SyncError>(())
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::ChannelClosed("notification")));
}

#[tokio::test(start_paused = true)]
async fn single_notification_helper_returns_message() {
    let dialogs = MockDialogs::default();

    let message = resolve_single_notification(&dialogs, Duration::from_millis(1000), || async {
        dialogs.raise("This user already exist.").await;
        Ok::<(), SyncError>(())
    })
    .await
    .unwrap();

    assert_eq!(message, "This user already exist.");
}

#[tokio::test(start_paused = true)]
async fn single_notification_helper_fails_on_silence() {
    let dialogs = MockDialogs::default();

    let err = resolve_single_notification(&dialogs, Duration::from_millis(500), || async {
        Ok::<(), SyncError>(())
    })
    .await
    .unwrap_err();

    assert!(matches!(err, SyncError::NoNotification(500)));
}
