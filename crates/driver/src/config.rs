//! Driver configuration

use std::time::Duration;

/// Timeout tiers used across the driver. `short` bounds single UI waits,
/// `action` bounds a full resolve window, `navigation` bounds page loads.
#[derive(Debug, Clone)]
pub struct Timeouts {
    pub short: Duration,
    pub medium: Duration,
    pub long: Duration,
    pub navigation: Duration,
    pub action: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(5),
            medium: Duration::from_secs(10),
            long: Duration::from_secs(30),
            navigation: Duration::from_secs(30),
            action: Duration::from_secs(15),
        }
    }
}

/// Configuration for a storefront session.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Base URL of the storefront UI.
    pub base_url: String,

    /// Base URL of the storefront's auth/cart API.
    pub api_base_url: String,

    pub timeouts: Timeouts,

    /// Password assigned to generated test users.
    pub default_password: String,

    /// Prefix for generated usernames.
    pub username_prefix: String,

    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.demoblaze.com".to_string(),
            api_base_url: "https://api.demoblaze.com".to_string(),
            timeouts: Timeouts::default(),
            default_password: "TestPass123!".to_string(),
            username_prefix: "testuser_".to_string(),
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

impl DriverConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("VITRINE_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(url) = std::env::var("VITRINE_API_URL") {
            config.api_base_url = url;
        }
        if let Ok(v) = std::env::var("VITRINE_HEADFUL") {
            config.headless = v != "1" && v.to_lowercase() != "true";
        }
        config
    }
}
