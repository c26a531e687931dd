//! Cart page: item table, order modal, and the sweet-alert confirmation.
//!
//! The item table backs the core's `RemovableCollection` (rows are removed
//! front-first and the table re-renders asynchronously), and the sweet-alert
//! is the `PanelChannel` a purchase resolves against.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use vitrine_sync::{PanelChannel, RemovableCollection, SyncError};

use crate::error::DriverResult;
use crate::pages::extract_price;
use crate::session::StoreSession;

pub(crate) mod selectors {
    pub const TABLE_BODY: &str = "#tbodyid";
    pub const ROWS: &str = "#tbodyid tr";
    pub const ROW_TITLES: &str = "#tbodyid tr td:nth-child(2)";
    pub const ROW_PRICES: &str = "#tbodyid tr td:nth-child(3)";
    pub const FIRST_DELETE: &str = "#tbodyid tr:first-child a";
    pub const TOTAL: &str = "#totalp";
    pub const PLACE_ORDER: &str = "button[data-target=\"#orderModal\"]";

    pub const ORDER_MODAL: &str = "#orderModal";
    pub const ORDER_NAME: &str = "#name";
    pub const ORDER_COUNTRY: &str = "#country";
    pub const ORDER_CITY: &str = "#city";
    pub const ORDER_CARD: &str = "#card";
    pub const ORDER_MONTH: &str = "#month";
    pub const ORDER_YEAR: &str = "#year";
    pub const PURCHASE: &str = "#orderModal button.btn-primary";

    pub const SUCCESS_PANEL: &str = ".sweet-alert";
    pub const SUCCESS_MESSAGE: &str = ".sweet-alert p";
    pub const SUCCESS_OK: &str = ".sweet-alert .confirm";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub title: String,
    pub price: u32,
}

/// Checkout form contents.
#[derive(Debug, Clone)]
pub struct OrderInfo {
    pub name: String,
    pub country: String,
    pub city: String,
    pub credit_card: String,
    pub month: String,
    pub year: String,
}

pub struct CartPage<'a> {
    session: &'a StoreSession,
}

impl<'a> CartPage<'a> {
    pub fn new(session: &'a StoreSession) -> Self {
        Self { session }
    }

    /// Navigate straight to the cart page and let it render.
    pub async fn goto(&self) -> DriverResult<()> {
        self.session.goto("cart.html").await?;
        self.wait_loaded().await;
        Ok(())
    }

    /// Wait for the cart table plus a beat for its AJAX fill. Best-effort:
    /// an empty cart may never show the table.
    pub async fn wait_loaded(&self) {
        let _ = self
            .session
            .bridge()
            .wait_for(
                selectors::TABLE_BODY,
                "visible",
                self.session.config().timeouts.short,
            )
            .await;
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    pub async fn items(&self) -> DriverResult<Vec<CartItem>> {
        let titles = self.session.bridge().texts(selectors::ROW_TITLES).await?;
        let prices = self.session.bridge().texts(selectors::ROW_PRICES).await?;
        Ok(titles
            .into_iter()
            .zip(prices)
            .map(|(title, price)| CartItem {
                title: title.trim().to_string(),
                price: extract_price(&price),
            })
            .collect())
    }

    pub async fn item_count(&self) -> DriverResult<usize> {
        self.session.bridge().count(selectors::ROWS).await
    }

    pub async fn has_item(&self, title: &str) -> DriverResult<bool> {
        let wanted = title.trim().to_lowercase();
        Ok(self
            .items()
            .await?
            .iter()
            .any(|item| item.title.to_lowercase() == wanted))
    }

    /// Displayed total, or 0 while the cart is empty and the element absent.
    pub async fn total(&self) -> DriverResult<u32> {
        if !self.session.bridge().visible(selectors::TOTAL).await? {
            return Ok(0);
        }
        let text = self.session.bridge().text(selectors::TOTAL).await?;
        Ok(extract_price(&text))
    }

    /// Whether the displayed total matches the sum of the line items.
    pub async fn total_is_consistent(&self) -> DriverResult<bool> {
        let items = self.items().await?;
        let expected: u32 = items.iter().map(|item| item.price).sum();
        Ok(self.total().await? == expected)
    }

    pub async fn open_order_modal(&self) -> DriverResult<()> {
        let timeouts = &self.session.config().timeouts;
        self.session
            .bridge()
            .click(selectors::PLACE_ORDER, timeouts.short)
            .await?;
        self.session
            .bridge()
            .wait_for(selectors::ORDER_MODAL, "visible", timeouts.short)
            .await?;
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(())
    }

    pub async fn fill_order_form(&self, order: &OrderInfo) -> DriverResult<()> {
        let bridge = self.session.bridge();
        bridge.fill(selectors::ORDER_NAME, &order.name).await?;
        bridge.fill(selectors::ORDER_COUNTRY, &order.country).await?;
        bridge.fill(selectors::ORDER_CITY, &order.city).await?;
        bridge.fill(selectors::ORDER_CARD, &order.credit_card).await?;
        bridge.fill(selectors::ORDER_MONTH, &order.month).await?;
        bridge.fill(selectors::ORDER_YEAR, &order.year).await?;
        Ok(())
    }

    /// Click Purchase. The caller observes the outcome (sweet-alert
    /// confirmation or a validation notification) through the resolver, with
    /// this page as the panel channel.
    pub async fn submit_order(&self) -> DriverResult<()> {
        self.session
            .bridge()
            .click(selectors::PURCHASE, self.session.config().timeouts.short)
            .await
    }

    /// Dismiss the sweet-alert confirmation.
    pub async fn confirm_success(&self) -> DriverResult<()> {
        let timeouts = &self.session.config().timeouts;
        self.session
            .bridge()
            .click(selectors::SUCCESS_OK, timeouts.short)
            .await?;
        self.session
            .bridge()
            .wait_for(selectors::SUCCESS_PANEL, "hidden", timeouts.short)
            .await
    }
}

#[async_trait]
impl RemovableCollection for CartPage<'_> {
    async fn size(&self) -> vitrine_sync::Result<usize> {
        self.item_count().await.map_err(SyncError::from)
    }

    async fn remove_first(&self) -> vitrine_sync::Result<()> {
        self.session
            .bridge()
            .click(selectors::FIRST_DELETE, self.session.config().timeouts.short)
            .await
            .map_err(SyncError::from)
    }

    async fn settle(&self) {
        self.wait_loaded().await;
    }
}

/// The sweet-alert purchase confirmation as the success panel.
#[async_trait]
impl PanelChannel for CartPage<'_> {
    async fn wait_visible(&self) -> vitrine_sync::Result<String> {
        loop {
            if self
                .session
                .bridge()
                .visible(selectors::SUCCESS_PANEL)
                .await
                .map_err(SyncError::from)?
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        let content = self
            .session
            .bridge()
            .text(selectors::SUCCESS_MESSAGE)
            .await
            .map_err(SyncError::from)?;
        Ok(content.trim().to_string())
    }
}
