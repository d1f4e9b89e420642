//! Integration tests for Pawmart.
//!
//! These tests exercise the full session stack (session context, sync
//! orchestrator, favorites store) against the in-memory gateway, so they run
//! hermetically with no network or external services.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pawmart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_sync` - Guest cart, login merge, multi-device persistence
//! - `favorites` - Favorites lifecycle across login/logout

use rust_decimal::Decimal;

use pawmart_core::{CurrencyCode, Price, Product, UserId};

/// A catalog product priced in whole cents.
#[must_use]
pub fn product(id: &str, cents: i64) -> Product {
    Product::new(
        id,
        format!("Product {id}"),
        Price::new(Decimal::new(cents, 2), CurrencyCode::USD),
    )
}

/// The default test user.
#[must_use]
pub fn user() -> UserId {
    UserId::new("user-1")
}
