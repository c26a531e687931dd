//! Live auth API tests against the storefront backend.
//!
//! Network-bound, so ignored by default:
//!
//! ```text
//! cargo test -p vitrine-driver -- --ignored
//! ```

use vitrine_driver::api::AuthOutcome;
use vitrine_driver::{creds, AuthApi, DriverConfig};

fn api() -> (DriverConfig, AuthApi) {
    let config = DriverConfig::from_env();
    let api = AuthApi::new(&config).unwrap();
    (config, api)
}

#[tokio::test]
#[ignore = "requires network"]
async fn duplicate_signup_is_rejected() {
    let (config, api) = api();
    let user = creds::test_user(&config);

    let first = api.signup(&user.username, &user.password).await.unwrap();
    assert!(first.is_ok(), "fresh signup rejected: {first:?}");

    let second = api.signup(&user.username, &user.password).await.unwrap();
    assert!(
        matches!(second, AuthOutcome::Rejected { ref message } if message.contains("already exist")),
        "duplicate signup not rejected: {second:?}"
    );
}

#[tokio::test]
#[ignore = "requires network"]
async fn wrong_password_is_rejected_and_valid_login_yields_a_token() {
    let (config, api) = api();
    let user = api.create_test_user(&config).await.unwrap();

    let rejected = api.login(&user.username, "not-the-password").await.unwrap();
    assert!(
        matches!(rejected, AuthOutcome::Rejected { ref message } if message.contains("Wrong password")),
        "bad password not rejected: {rejected:?}"
    );

    match api.login(&user.username, &user.password).await.unwrap() {
        AuthOutcome::Ok { token } => assert!(token.is_some(), "login succeeded without a token"),
        other => panic!("valid login rejected: {other:?}"),
    }
}

#[tokio::test]
#[ignore = "requires network"]
async fn existence_probe_distinguishes_known_and_unknown_users() {
    let (config, api) = api();
    let user = api.create_test_user(&config).await.unwrap();

    assert!(api.user_exists(&user.username).await.unwrap());
    assert!(!api
        .user_exists(&creds::unique_username("nosuchuser_"))
        .await
        .unwrap());
}
