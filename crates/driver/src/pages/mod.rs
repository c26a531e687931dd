//! Thin locator surfaces over the live session.
//!
//! Each page maps the UI elements the flows need onto bridge calls, and
//! where the core needs to observe the page, implements the corresponding
//! `vitrine-sync` channel trait.

pub mod cart;
pub mod home;
pub mod login;
pub mod product;

pub use cart::{CartItem, CartPage, OrderInfo};
pub use home::HomePage;
pub use login::{LoginPage, WelcomePanel};
pub use product::ProductPage;

use std::sync::OnceLock;

use regex::Regex;

/// Numeric price from display text ("$790 *includes tax" -> 790).
pub(crate) fn extract_price(text: &str) -> u32 {
    static PRICE_RE: OnceLock<Regex> = OnceLock::new();
    let re = PRICE_RE.get_or_init(|| Regex::new(r"[\d,]+").expect("price pattern"));
    re.find(text)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::extract_price;

    #[test]
    fn prices_are_extracted_from_display_text() {
        assert_eq!(extract_price("$790"), 790);
        assert_eq!(extract_price("$1,100 *includes tax"), 1100);
        assert_eq!(extract_price("free"), 0);
    }
}
