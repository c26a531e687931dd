//! Home page: product grid and category sidebar.

use std::time::Duration;

use crate::error::DriverResult;
use crate::session::StoreSession;

pub const CATEGORY_PHONES: &str = "Phones";
pub const CATEGORY_LAPTOPS: &str = "Laptops";
pub const CATEGORY_MONITORS: &str = "Monitors";

mod selectors {
    pub const PRODUCT_TITLES: &str = ".card-title";
    pub const PRODUCT_LINKS: &str = ".card-title a";
    pub const CATEGORY_ITEMS: &str = ".list-group-item";
    pub const NEXT_BUTTON: &str = "#next2";
}

pub struct HomePage<'a> {
    session: &'a StoreSession,
}

impl<'a> HomePage<'a> {
    pub fn new(session: &'a StoreSession) -> Self {
        Self { session }
    }

    pub async fn wait_loaded(&self) -> DriverResult<()> {
        self.session
            .bridge()
            .wait_for(
                selectors::PRODUCT_TITLES,
                "visible",
                self.session.config().timeouts.medium,
            )
            .await
    }

    /// Titles of the products currently shown in the grid.
    pub async fn product_titles(&self) -> DriverResult<Vec<String>> {
        let titles = self.session.bridge().texts(selectors::PRODUCT_TITLES).await?;
        Ok(titles.into_iter().map(|t| t.trim().to_string()).collect())
    }

    /// Open a product's detail page by its visible name.
    pub async fn open_product(&self, name: &str) -> DriverResult<()> {
        let selector = format!("{}:has-text(\"{name}\")", selectors::PRODUCT_LINKS);
        self.session
            .bridge()
            .click(&selector, self.session.config().timeouts.short)
            .await?;
        self.session
            .bridge()
            .wait_for(".name", "visible", self.session.config().timeouts.medium)
            .await
    }

    /// Filter the grid by sidebar category (see the `CATEGORY_*` constants).
    pub async fn select_category(&self, label: &str) -> DriverResult<()> {
        let selector = format!("{}:has-text(\"{label}\")", selectors::CATEGORY_ITEMS);
        self.session
            .bridge()
            .click(&selector, self.session.config().timeouts.short)
            .await?;
        // The grid refreshes in place via AJAX.
        tokio::time::sleep(Duration::from_millis(500)).await;
        self.wait_loaded().await
    }

    pub async fn next_page(&self) -> DriverResult<()> {
        self.session
            .bridge()
            .click(selectors::NEXT_BUTTON, self.session.config().timeouts.short)
            .await?;
        tokio::time::sleep(Duration::from_millis(500)).await;
        self.wait_loaded().await
    }
}
