//! Error types for the synchronization core

use thiserror::Error;

/// Result type alias using [`SyncError`]
pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The triggering action itself could not complete. Kept distinct from a
    /// timed-out outcome so callers can tell "no outcome" from "could not
    /// even perform the action".
    #[error("action failed: {0}")]
    ActionFailed(String),

    /// A watched channel hung up before delivering its event.
    #[error("{0} channel closed before delivering an event")]
    ChannelClosed(&'static str),

    /// `resolve_single_notification` elapsed with nothing raised.
    #[error("no notification within {0} ms")]
    NoNotification(u64),

    /// The remote session could not be observed (size query, panel read,
    /// listener registration).
    #[error("session error: {0}")]
    Session(String),
}
