//! Login and signup modals, plus the welcome banner as a success panel.

use std::time::Duration;

use async_trait::async_trait;
use vitrine_sync::{PanelChannel, SyncError};

use crate::error::DriverResult;
use crate::session::StoreSession;

mod selectors {
    pub const NAV_LOGIN: &str = "#login2";
    pub const NAV_SIGNUP: &str = "#signin2";
    pub const WELCOME_USER: &str = "#nameofuser";

    pub const LOGIN_MODAL: &str = "#logInModal";
    pub const LOGIN_USERNAME: &str = "#loginusername";
    pub const LOGIN_PASSWORD: &str = "#loginpassword";
    pub const LOGIN_SUBMIT: &str = "#logInModal button.btn-primary";

    pub const SIGNUP_MODAL: &str = "#signInModal";
    pub const SIGNUP_USERNAME: &str = "#sign-username";
    pub const SIGNUP_PASSWORD: &str = "#sign-password";
    pub const SIGNUP_SUBMIT: &str = "#signInModal button.btn-primary";
}

pub struct LoginPage<'a> {
    session: &'a StoreSession,
}

impl<'a> LoginPage<'a> {
    pub fn new(session: &'a StoreSession) -> Self {
        Self { session }
    }

    async fn open_modal(&self, trigger: &str, modal: &str) -> DriverResult<()> {
        let timeouts = &self.session.config().timeouts;
        self.session.bridge().click(trigger, timeouts.short).await?;
        self.session
            .bridge()
            .wait_for(modal, "visible", timeouts.short)
            .await?;
        // Modal fade-in animation.
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(())
    }

    pub async fn open_login_modal(&self) -> DriverResult<()> {
        self.open_modal(selectors::NAV_LOGIN, selectors::LOGIN_MODAL).await
    }

    pub async fn open_signup_modal(&self) -> DriverResult<()> {
        self.open_modal(selectors::NAV_SIGNUP, selectors::SIGNUP_MODAL).await
    }

    pub async fn fill_login(&self, username: &str, password: &str) -> DriverResult<()> {
        self.session.bridge().fill(selectors::LOGIN_USERNAME, username).await?;
        self.session.bridge().fill(selectors::LOGIN_PASSWORD, password).await
    }

    pub async fn fill_signup(&self, username: &str, password: &str) -> DriverResult<()> {
        self.session.bridge().fill(selectors::SIGNUP_USERNAME, username).await?;
        self.session.bridge().fill(selectors::SIGNUP_PASSWORD, password).await
    }

    /// Click the login submit button. Outcome (welcome banner or a rejection
    /// notification) is observed by the caller through the resolver.
    pub async fn submit_login(&self) -> DriverResult<()> {
        self.session
            .bridge()
            .click(selectors::LOGIN_SUBMIT, self.session.config().timeouts.short)
            .await
    }

    pub async fn submit_signup(&self) -> DriverResult<()> {
        self.session
            .bridge()
            .click(selectors::SIGNUP_SUBMIT, self.session.config().timeouts.short)
            .await
    }
}

/// The "Welcome <user>" banner as the success panel of a login action.
pub struct WelcomePanel<'a> {
    session: &'a StoreSession,
}

impl<'a> WelcomePanel<'a> {
    pub fn new(session: &'a StoreSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl PanelChannel for WelcomePanel<'_> {
    async fn wait_visible(&self) -> vitrine_sync::Result<String> {
        loop {
            if self
                .session
                .bridge()
                .visible(selectors::WELCOME_USER)
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
            .text(selectors::WELCOME_USER)
            .await
            .map_err(SyncError::from)?;
        Ok(content.trim().to_string())
    }
}
