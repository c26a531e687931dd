//! The business flows under validation.
//!
//! Every flow that ends in a storefront response goes through the
//! synchronization core: notifications via `resolve_single_notification` or a
//! watched notification channel, success indicators via a panel channel, and
//! cart clearing via `drain`. Flows return a short human-readable detail on
//! success and bail with the resolved outcome otherwise.

use anyhow::{bail, ensure, Context, Result};
use tracing::info;

use vitrine_driver::pages::home::{CATEGORY_LAPTOPS, CATEGORY_MONITORS, CATEGORY_PHONES};
use vitrine_driver::pages::{CartPage, HomePage, LoginPage, OrderInfo, ProductPage, WelcomePanel};
use vitrine_driver::{creds, AuthApi, StoreSession};
use vitrine_sync::{
    drain, resolve_single_notification, ActionOutcome, OutcomeResolver, DEFAULT_SAFETY_LIMIT,
    DEFAULT_STALL_LIMIT,
};

pub const FLOW_NAMES: &[&str] = &[
    "signup",
    "login",
    "wrong-password",
    "browse",
    "add-to-cart",
    "clear-cart",
    "order-validation",
    "purchase",
];

pub async fn run_flow(name: &str, session: &StoreSession, api: &AuthApi) -> Result<String> {
    match name {
        "signup" => signup(session).await,
        "login" => login(session, api).await,
        "wrong-password" => login_rejects_wrong_password(session, api).await,
        "browse" => browse(session).await,
        "add-to-cart" => add_to_cart(session).await,
        "clear-cart" => clear_cart(session).await,
        "order-validation" => order_validation(session).await,
        "purchase" => purchase(session).await,
        other => bail!("unknown flow: {other}"),
    }
}

/// Register a fresh user through the signup modal; the storefront confirms
/// with a blocking notification.
pub async fn signup(session: &StoreSession) -> Result<String> {
    let user = creds::test_user(session.config());
    session.goto_home().await?;

    let page = LoginPage::new(session);
    page.open_signup_modal().await?;
    page.fill_signup(&user.username, &user.password).await?;

    let message = resolve_single_notification(
        session,
        session.config().timeouts.action,
        || page.submit_signup(),
    )
    .await?;
    ensure!(
        message.contains("Sign up successful"),
        "signup rejected: {message}"
    );
    Ok(format!("registered {}", user.username))
}

/// Valid login resolves through the welcome banner, not a notification.
pub async fn login(session: &StoreSession, api: &AuthApi) -> Result<String> {
    let user = api.create_test_user(session.config()).await?;
    session.goto_home().await?;

    let page = LoginPage::new(session);
    page.open_login_modal().await?;
    page.fill_login(&user.username, &user.password).await?;

    let welcome = WelcomePanel::new(session);
    let outcome = OutcomeResolver::new(session.config().timeouts.action)
        .watch_notification(session)
        .watch_panel(&welcome)
        .run(|| page.submit_login())
        .await?;

    match outcome {
        ActionOutcome::PanelAppeared { content } if content.contains(&user.username) => {
            Ok(format!("logged in as {}", user.username))
        }
        other => bail!("expected welcome banner, got {other:?}"),
    }
}

/// A bad password resolves through the notification channel with the
/// storefront's rejection message, never through the welcome banner.
pub async fn login_rejects_wrong_password(session: &StoreSession, api: &AuthApi) -> Result<String> {
    let user = api.create_test_user(session.config()).await?;
    session.goto_home().await?;

    let page = LoginPage::new(session);
    page.open_login_modal().await?;
    page.fill_login(&user.username, "definitely-not-it").await?;

    let welcome = WelcomePanel::new(session);
    let outcome = OutcomeResolver::new(session.config().timeouts.action)
        .watch_notification(session)
        .watch_panel(&welcome)
        .run(|| page.submit_login())
        .await?;

    match outcome {
        ActionOutcome::NotificationReceived { message } if message.contains("Wrong password") => {
            Ok("wrong password rejected".to_string())
        }
        other => bail!("expected wrong-password notification, got {other:?}"),
    }
}

/// Walk the category filters and the grid pagination, then check a product's
/// detail page against its grid listing.
pub async fn browse(session: &StoreSession) -> Result<String> {
    session.goto_home().await?;
    let home = HomePage::new(session);
    home.wait_loaded().await?;

    for category in [CATEGORY_PHONES, CATEGORY_LAPTOPS, CATEGORY_MONITORS] {
        home.select_category(category).await?;
        let titles = home.product_titles().await?;
        ensure!(!titles.is_empty(), "no products under {category}");
        info!(category, count = titles.len(), "category filtered");
    }

    // Pagination applies to the unfiltered grid.
    session.goto_home().await?;
    home.wait_loaded().await?;
    let first_page = home.product_titles().await?;
    home.next_page().await?;
    let second_page = home.product_titles().await?;
    ensure!(
        first_page != second_page,
        "next page shows the same products"
    );

    let title = first_page.first().context("empty product grid")?.clone();
    session.goto_home().await?;
    home.wait_loaded().await?;
    home.open_product(&title).await?;

    let product = ProductPage::new(session);
    let name = product.name().await?;
    let price = product.price().await?;
    ensure!(name == title, "detail page shows {name}, grid said {title}");
    ensure!(price > 0, "detail page shows no price for {name}");
    Ok(format!("browsed catalog, checked {name} at {price}"))
}

/// Open the first product in the grid and add it to the cart.
async fn add_first_product(session: &StoreSession) -> Result<String> {
    session.goto_home().await?;
    let home = HomePage::new(session);
    home.wait_loaded().await?;

    let titles = home.product_titles().await?;
    let title = titles.first().context("empty product grid")?.clone();
    home.open_product(&title).await?;

    let product = ProductPage::new(session);
    let message = resolve_single_notification(
        session,
        session.config().timeouts.action,
        || product.add_to_cart(),
    )
    .await?;
    ensure!(
        message.contains("Product added"),
        "add to cart rejected: {message}"
    );
    Ok(title)
}

pub async fn add_to_cart(session: &StoreSession) -> Result<String> {
    let title = add_first_product(session).await?;

    let cart = CartPage::new(session);
    cart.goto().await?;
    ensure!(cart.has_item(&title).await?, "{title} missing from cart");
    ensure!(cart.total_is_consistent().await?, "cart total mismatch");
    Ok(format!("added {title}"))
}

/// Seed the cart, then hand it to the bounded convergence drain.
pub async fn clear_cart(session: &StoreSession) -> Result<String> {
    let first = add_first_product(session).await?;
    let second = add_first_product(session).await?;
    info!(%first, %second, "cart seeded");

    let cart = CartPage::new(session);
    cart.goto().await?;

    let report = drain(&cart, DEFAULT_SAFETY_LIMIT, DEFAULT_STALL_LIMIT).await?;
    ensure!(report.is_drained(), "cart not cleared: {report:?}");
    ensure!(cart.item_count().await? == 0, "cart reports residual items");
    Ok("cart drained".to_string())
}

/// Submitting an empty order form resolves through the validation
/// notification, not the confirmation panel.
pub async fn order_validation(session: &StoreSession) -> Result<String> {
    add_first_product(session).await?;

    let cart = CartPage::new(session);
    cart.goto().await?;
    cart.open_order_modal().await?;

    let outcome = OutcomeResolver::new(session.config().timeouts.action)
        .watch_notification(session)
        .watch_panel(&cart)
        .run(|| cart.submit_order())
        .await?;

    match outcome {
        ActionOutcome::NotificationReceived { message }
            if message.contains("Please fill out") =>
        {
            Ok("empty order rejected".to_string())
        }
        other => bail!("expected validation notification, got {other:?}"),
    }
}

/// Full checkout: the confirmation sweet-alert is the success panel.
pub async fn purchase(session: &StoreSession) -> Result<String> {
    let title = add_first_product(session).await?;

    let cart = CartPage::new(session);
    cart.goto().await?;
    cart.open_order_modal().await?;
    cart.fill_order_form(&sample_order()).await?;

    let outcome = OutcomeResolver::new(session.config().timeouts.action)
        .watch_notification(session)
        .watch_panel(&cart)
        .run(|| cart.submit_order())
        .await?;

    match outcome {
        ActionOutcome::PanelAppeared { content } if content.contains("Id:") => {
            cart.confirm_success().await?;
            Ok(format!("purchased {title}: {content}"))
        }
        other => bail!("expected order confirmation, got {other:?}"),
    }
}

fn sample_order() -> OrderInfo {
    OrderInfo {
        name: "Vitrine Tester".to_string(),
        country: "Norway".to_string(),
        city: "Oslo".to_string(),
        credit_card: "4111111111111111".to_string(),
        month: "12".to_string(),
        year: "2030".to_string(),
    }
}
