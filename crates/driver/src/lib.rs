//! Vitrine storefront driver
//!
//! Maps a live storefront UI onto the channel primitives of `vitrine-sync`:
//! the browser's dialog stream becomes a `NotificationChannel`, the
//! sweet-alert confirmation and the welcome banner become `PanelChannel`s,
//! and the cart table a `RemovableCollection`.
//!
//! The browser itself is controlled through a long-lived Playwright sidecar
//! (`node` + a generated driver script) speaking newline-delimited JSON over
//! stdin/stdout; see [`bridge`].

pub mod api;
pub mod bridge;
pub mod config;
pub mod creds;
pub mod error;
pub mod pages;
pub mod session;

pub use api::{AuthApi, AuthOutcome};
pub use bridge::{Bridge, BridgeConfig};
pub use config::DriverConfig;
pub use creds::TestUser;
pub use error::{DriverError, DriverResult};
pub use session::StoreSession;
