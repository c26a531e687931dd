//! Test credential generation

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::config::DriverConfig;

/// Credentials for a throwaway storefront account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUser {
    pub username: String,
    pub password: String,
}

/// Unique username: prefix + millisecond timestamp + random salt. The
/// storefront rejects duplicate usernames, so uniqueness matters more than
/// prettiness.
pub fn unique_username(prefix: &str) -> String {
    let stamp = chrono::Utc::now().timestamp_millis();
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("{prefix}{stamp}_{salt}")
}

pub fn test_user(config: &DriverConfig) -> TestUser {
    TestUser {
        username: unique_username(&config.username_prefix),
        password: config.default_password.clone(),
    }
}
