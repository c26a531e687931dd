//! Live storefront session.

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::warn;
use vitrine_sync::{Disposition, Notification, NotificationChannel, SyncError};

use crate::bridge::{Bridge, BridgeConfig};
use crate::config::DriverConfig;
use crate::error::DriverResult;

mod selectors {
    pub const NAVBAR: &str = ".navbar";
    pub const NAV_CART: &str = "#cartur";
    pub const NAV_LOGIN: &str = "#login2";
    pub const NAV_LOGOUT: &str = "#logout2";
    pub const WELCOME_USER: &str = "#nameofuser";
}

/// One browser page driving the storefront, exclusively owned by the calling
/// flow for its duration. Only one action may be in flight at a time; the
/// caller sequences resolves itself.
pub struct StoreSession {
    bridge: Bridge,
    config: DriverConfig,
}

impl StoreSession {
    pub async fn launch(config: DriverConfig) -> DriverResult<Self> {
        let bridge = Bridge::launch(BridgeConfig::from(&config)).await?;
        Ok(Self { bridge, config })
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Navigate to the storefront home page and wait for the shell to render.
    pub async fn goto_home(&self) -> DriverResult<()> {
        self.goto("").await
    }

    /// Navigate to a path relative to the base URL.
    pub async fn goto(&self, path: &str) -> DriverResult<()> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        self.bridge.goto(&url, self.config.timeouts.navigation).await?;
        self.bridge
            .wait_for(selectors::NAVBAR, "visible", self.config.timeouts.short)
            .await
    }

    pub async fn open_cart(&self) -> DriverResult<()> {
        self.bridge
            .click(selectors::NAV_CART, self.config.timeouts.short)
            .await?;
        self.bridge
            .wait_for(crate::pages::cart::selectors::TABLE_BODY, "visible", self.config.timeouts.short)
            .await
    }

    /// Username from the welcome banner, if someone is logged in.
    pub async fn logged_in_user(&self) -> DriverResult<Option<String>> {
        if !self.bridge.visible(selectors::WELCOME_USER).await? {
            return Ok(None);
        }
        let text = self.bridge.text(selectors::WELCOME_USER).await?;
        Ok(text
            .strip_prefix("Welcome ")
            .map(|name| name.trim().to_string()))
    }

    pub async fn logout(&self) -> DriverResult<()> {
        if self.logged_in_user().await?.is_some() {
            self.bridge
                .click(selectors::NAV_LOGOUT, self.config.timeouts.short)
                .await?;
            self.bridge
                .wait_for(selectors::NAV_LOGIN, "visible", self.config.timeouts.short)
                .await?;
        }
        Ok(())
    }

    pub async fn close(self) -> DriverResult<()> {
        self.bridge.shutdown().await
    }
}

/// The browser's dialog stream as the core's notification channel.
///
/// `arm` registers the one-shot listener on the page, then spawns a relay
/// that forwards the dialog message to the resolver and carries the
/// resolver's disposition back to the held dialog. If the resolver goes away
/// without settling, the dialog is accepted so the page is not left blocked.
#[async_trait]
impl NotificationChannel for StoreSession {
    async fn arm(&self) -> vitrine_sync::Result<oneshot::Receiver<Notification>> {
        let dialog_rx = self.bridge.arm_dialog().await.map_err(SyncError::from)?;

        let (tx, rx) = oneshot::channel();
        let bridge = self.bridge.clone();
        tokio::spawn(async move {
            let Ok(message) = dialog_rx.await else {
                return;
            };
            let (disposition_tx, disposition_rx) = oneshot::channel();
            if tx.send(Notification::new(message, disposition_tx)).is_ok() {
                let disposition = disposition_rx.await.unwrap_or(Disposition::Dismiss);
                let accept = disposition == Disposition::Accept;
                if let Err(err) = bridge.settle_dialog(accept).await {
                    warn!(%err, "failed to settle dialog");
                }
            } else if let Err(err) = bridge.settle_dialog(true).await {
                warn!(%err, "failed to settle abandoned dialog");
            }
        });

        Ok(rx)
    }
}
