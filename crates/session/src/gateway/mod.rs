//! Remote persistence gateway.
//!
//! The session core consumes a per-user document store through the
//! [`StorageGateway`] trait. Two implementations ship with this crate:
//! [`DocumentStoreClient`] (the REST backend) and [`MemoryGateway`] (an
//! in-memory double used by tests).

mod memory;
mod rest;

pub use memory::MemoryGateway;
pub use rest::DocumentStoreClient;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pawmart_core::{Cart, CartItem, Product, ProductId, UserId};

/// Errors that can occur when talking to the remote store.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed (network, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The store rejected the credentials or the per-user access rule.
    #[error("permission denied: {0}")]
    Denied(String),

    /// A cart save carried a revision at or below the highest the store has
    /// already accepted for this user.
    #[error("stale write rejected (remote is at revision {0})")]
    StaleWrite(u64),

    /// Unexpected HTTP status.
    #[error("unexpected status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        message: String,
    },

    /// Backend-reported failure (used by non-HTTP implementations).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// The persisted shape of a user's cart.
///
/// Only the line items and bookkeeping fields are stored; the cart aggregates
/// are recomputed on load, so a corrupt stored total is unrepresentable.
/// Missing fields take the defaults below and unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartDocument {
    /// Monotonically increasing save sequence. The store accepts a write only
    /// if its revision is higher than the last one it accepted.
    #[serde(default)]
    pub revision: u64,
    /// When the document was last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// The cart lines.
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl CartDocument {
    /// Snapshot a cart for persistence at the given revision.
    #[must_use]
    pub fn snapshot(revision: u64, cart: &Cart) -> Self {
        Self {
            revision,
            updated_at: Some(Utc::now()),
            items: cart.items().to_vec(),
        }
    }

    /// Rebuild the cart, recomputing line totals and aggregates.
    #[must_use]
    pub fn into_cart(self) -> Cart {
        Cart::from_items(self.items)
    }
}

/// Interface to the per-user remote document store.
///
/// `load_cart` distinguishes "no cart document exists" (`Ok(None)`) from a
/// failed read (`Err`); callers must never treat a failure as an empty cart.
#[allow(async_fn_in_trait)]
pub trait StorageGateway {
    /// Load the user's cart document, or `None` if the user has never saved
    /// one.
    async fn load_cart(&self, user_id: &UserId) -> Result<Option<CartDocument>, GatewayError>;

    /// Persist the user's cart document. Rejected with
    /// [`GatewayError::StaleWrite`] if its revision is not the highest seen.
    async fn save_cart(&self, user_id: &UserId, document: &CartDocument)
    -> Result<(), GatewayError>;

    /// Delete the user's cart document. Deleting an absent document is not an
    /// error.
    async fn delete_cart(&self, user_id: &UserId) -> Result<(), GatewayError>;

    /// List the product ids the user has favorited.
    async fn list_favorite_ids(&self, user_id: &UserId) -> Result<Vec<ProductId>, GatewayError>;

    /// Record a favorite. Idempotent.
    async fn add_favorite(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), GatewayError>;

    /// Remove a favorite. Removing an absent favorite is not an error.
    async fn remove_favorite(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), GatewayError>;

    /// Resolve a product id to its catalog snapshot, or `None` if the id no
    /// longer exists (stale reference).
    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_document_defaults_on_load() {
        // A minimal stored document: every field missing takes its default.
        let document: CartDocument = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(document.revision, 0);
        assert_eq!(document.updated_at, None);
        assert!(document.items.is_empty());
        assert!(document.into_cart().is_empty());
    }

    #[test]
    fn test_cart_document_ignores_unknown_fields() {
        let document: CartDocument =
            serde_json::from_str(r#"{"revision": 3, "legacy_field": true}"#).expect("deserialize");
        assert_eq!(document.revision, 3);
    }

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::StaleWrite(7);
        assert_eq!(err.to_string(), "stale write rejected (remote is at revision 7)");

        let err = GatewayError::Status {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected status 503: unavailable");
    }
}
