//! HTTP client for the storefront auth API.
//!
//! Used by flows to provision accounts without going through the signup
//! modal. The API reports errors as prose in a 200 body, so outcomes are
//! classified from the response text.

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::config::DriverConfig;
use crate::creds::{self, TestUser};
use crate::error::{DriverError, DriverResult};

#[derive(Debug, Serialize)]
struct AuthPayload<'a> {
    username: &'a str,
    password: String,
}

/// Outcome of a signup or login call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Ok { token: Option<String> },
    Rejected { message: String },
}

impl AuthOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, AuthOutcome::Ok { .. })
    }
}

pub struct AuthApi {
    client: reqwest::Client,
    base_url: String,
    token_re: Regex,
}

impl AuthApi {
    pub fn new(config: &DriverConfig) -> DriverResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeouts.medium)
            .build()?;
        let token_re = Regex::new(r#"Auth_token:\s*([^\s"]+)"#)
            .map_err(|e| DriverError::Api(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            token_re,
        })
    }

    // The API expects base64-encoded passwords.
    fn encode_password(password: &str) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(password)
    }

    async fn post(&self, path: &str, username: &str, password: &str) -> DriverResult<String> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(&AuthPayload {
                username,
                password: Self::encode_password(password),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DriverError::Api(format!(
                "{path} returned {status}: {}",
                if body.is_empty() { "no response" } else { &body }
            )));
        }
        debug!(path, body_len = body.len(), "auth API call succeeded");
        Ok(body)
    }

    /// Register a user. An empty body means success; a duplicate username is
    /// reported as a rejection, not an error.
    pub async fn signup(&self, username: &str, password: &str) -> DriverResult<AuthOutcome> {
        let body = self.post("/signup", username, password).await?;
        if body.contains("already exist") {
            return Ok(AuthOutcome::Rejected {
                message: "This user already exist.".to_string(),
            });
        }
        Ok(AuthOutcome::Ok { token: None })
    }

    pub async fn login(&self, username: &str, password: &str) -> DriverResult<AuthOutcome> {
        let body = self.post("/login", username, password).await?;
        if body.contains("Wrong password") {
            return Ok(AuthOutcome::Rejected {
                message: "Wrong password.".to_string(),
            });
        }
        if body.contains("User does not exist") {
            return Ok(AuthOutcome::Rejected {
                message: "User does not exist.".to_string(),
            });
        }
        let token = self
            .token_re
            .captures(&body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        Ok(AuthOutcome::Ok { token })
    }

    /// Provision a fresh account and return its credentials.
    pub async fn create_test_user(&self, config: &DriverConfig) -> DriverResult<TestUser> {
        let user = creds::test_user(config);
        match self.signup(&user.username, &user.password).await? {
            AuthOutcome::Ok { .. } => Ok(user),
            AuthOutcome::Rejected { message } => Err(DriverError::Api(format!(
                "could not provision {}: {message}",
                user.username
            ))),
        }
    }

    /// Probe for account existence by attempting a login with a throwaway
    /// password: "Wrong password" means the account exists.
    pub async fn user_exists(&self, username: &str) -> DriverResult<bool> {
        let outcome = self.login(username, "existence-probe").await?;
        Ok(!matches!(
            outcome,
            AuthOutcome::Rejected { ref message } if message == "User does not exist."
        ))
    }
}
