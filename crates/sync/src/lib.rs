//! Vitrine Synchronization Core
//!
//! The remote storefront session is event-driven: an action performed against
//! it (submitting a login form, placing an order) reports its outcome through
//! one of several mutually exclusive, single-fire channels. This crate pairs
//! each action with the outcome it produced:
//!
//! - [`OutcomeResolver`] races an action against its expected outcome
//!   channels (a blocking notification, a persistent success panel, or a
//!   timeout) and guarantees that a notification raised synchronously inside
//!   the action is never dropped, by arming the listener before the action
//!   runs.
//! - [`drain`] empties a remote collection whose size settles asynchronously,
//!   bounded by an attempt budget, a stall detector, and a safety limit.
//!
//! Page-level glue maps real UI locators onto the channel traits in
//! [`channel`]; the core never sees a selector.

pub mod channel;
pub mod drain;
pub mod error;
pub mod resolver;

pub use channel::{
    Disposition, Notification, NotificationChannel, PanelChannel, RemovableCollection,
};
pub use drain::{drain, DrainReport, DEFAULT_SAFETY_LIMIT, DEFAULT_STALL_LIMIT};
pub use error::{Result, SyncError};
pub use resolver::{resolve_single_notification, ActionOutcome, OutcomeResolver};
