//! Product detail page.

use crate::error::DriverResult;
use crate::pages::extract_price;
use crate::session::StoreSession;

mod selectors {
    pub const NAME: &str = ".name";
    pub const PRICE: &str = ".price-container";
    pub const ADD_TO_CART: &str = "a.btn-success";
}

pub struct ProductPage<'a> {
    session: &'a StoreSession,
}

impl<'a> ProductPage<'a> {
    pub fn new(session: &'a StoreSession) -> Self {
        Self { session }
    }

    pub async fn name(&self) -> DriverResult<String> {
        let text = self.session.bridge().text(selectors::NAME).await?;
        Ok(text.trim().to_string())
    }

    /// Displayed price ("$790 *includes tax" -> 790).
    pub async fn price(&self) -> DriverResult<u32> {
        let text = self.session.bridge().text(selectors::PRICE).await?;
        Ok(extract_price(&text))
    }

    /// Click "Add to cart". The storefront confirms with a blocking
    /// notification, so callers run this through the resolver:
    ///
    /// ```no_run
    /// # use vitrine_driver::{StoreSession, pages::ProductPage};
    /// # use vitrine_sync::resolve_single_notification;
    /// # async fn demo(session: &StoreSession) -> vitrine_sync::Result<()> {
    /// let product = ProductPage::new(session);
    /// let message = resolve_single_notification(
    ///     session,
    ///     session.config().timeouts.action,
    ///     || product.add_to_cart(),
    /// )
    /// .await?;
    /// # let _ = message; Ok(())
    /// # }
    /// ```
    pub async fn add_to_cart(&self) -> DriverResult<()> {
        self.session
            .bridge()
            .click(selectors::ADD_TO_CART, self.session.config().timeouts.short)
            .await
    }
}
