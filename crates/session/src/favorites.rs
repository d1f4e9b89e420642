//! Favorites store.
//!
//! Mutations are pessimistic: local state changes only after the remote call
//! confirms, so a failed call leaves nothing to roll back. The list refresh
//! is superseding: each refresh carries a request token, and a completion is
//! applied only if its token is still the latest one issued, so a stale
//! response can never overwrite a newer one.

use uuid::Uuid;

use pawmart_core::{Product, ProductId, UserId};

use crate::gateway::{GatewayError, StorageGateway};

/// Load state of the favorites list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoritesStatus {
    /// No refresh has run yet (or the cache was invalidated on logout).
    #[default]
    Idle,
    /// A refresh is in flight.
    Loading,
    /// The list reflects the last completed refresh.
    Succeeded,
    /// The last refresh failed; the previous list is kept untouched.
    Failed,
}

/// The user's favorited products, resolved to display snapshots.
///
/// Entries are keyed by product id with no duplicates.
#[derive(Debug, Default)]
pub struct FavoritesStore {
    items: Vec<Product>,
    status: FavoritesStatus,
    error: Option<String>,
    current_request: Option<Uuid>,
}

impl FavoritesStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The resolved favorite products.
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// Current load status.
    #[must_use]
    pub const fn status(&self) -> FavoritesStatus {
        self.status
    }

    /// Error message from the last failed refresh, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a product is favorited.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|product| &product.id == product_id)
    }

    /// Start a refresh: marks the store loading and returns the request
    /// token that the matching [`Self::complete_refresh`] must present.
    /// Issuing a new token supersedes any refresh still in flight.
    pub fn begin_refresh(&mut self) -> Uuid {
        let token = Uuid::new_v4();
        self.current_request = Some(token);
        self.status = FavoritesStatus::Loading;
        self.error = None;
        token
    }

    /// Complete a refresh. The result is applied only if `token` is still the
    /// latest issued; a superseded completion is discarded. Returns whether
    /// the result was applied.
    pub fn complete_refresh(
        &mut self,
        token: Uuid,
        result: Result<Vec<Product>, GatewayError>,
    ) -> bool {
        if self.current_request != Some(token) {
            tracing::debug!(%token, "discarding superseded favorites refresh");
            return false;
        }
        self.current_request = None;

        match result {
            Ok(products) => {
                self.items.clear();
                for product in products {
                    if !self.contains(&product.id) {
                        self.items.push(product);
                    }
                }
                self.status = FavoritesStatus::Succeeded;
            }
            Err(err) => {
                self.status = FavoritesStatus::Failed;
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Fetch the favorite ids and resolve them to product snapshots, then
    /// apply the result through the supersession check. Ids that no longer
    /// resolve to a product are stale references and are dropped silently.
    pub async fn refresh<G: StorageGateway>(&mut self, gateway: &G, user_id: &UserId) {
        let token = self.begin_refresh();
        let result = Self::fetch_resolved(gateway, user_id).await;
        self.complete_refresh(token, result);
    }

    /// Record a favorite remotely, then insert it locally on confirmation.
    ///
    /// # Errors
    ///
    /// Returns the gateway error on remote failure; local state is untouched.
    pub async fn add<G: StorageGateway>(
        &mut self,
        gateway: &G,
        user_id: &UserId,
        product: Product,
    ) -> Result<(), GatewayError> {
        gateway.add_favorite(user_id, &product.id).await?;
        if !self.contains(&product.id) {
            self.items.push(product);
        }
        Ok(())
    }

    /// Remove a favorite remotely, then locally on confirmation. Removing a
    /// favorite that is not present is a safe no-op.
    ///
    /// # Errors
    ///
    /// Returns the gateway error on remote failure; local state is untouched.
    pub async fn remove<G: StorageGateway>(
        &mut self,
        gateway: &G,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), GatewayError> {
        gateway.remove_favorite(user_id, product_id).await?;
        self.items.retain(|product| &product.id != product_id);
        Ok(())
    }

    /// Drop the cached list. Called on logout: the cache is stale for the
    /// next user and is refreshed on the next login.
    pub fn invalidate(&mut self) {
        self.items.clear();
        self.status = FavoritesStatus::Idle;
        self.error = None;
        self.current_request = None;
    }

    async fn fetch_resolved<G: StorageGateway>(
        gateway: &G,
        user_id: &UserId,
    ) -> Result<Vec<Product>, GatewayError> {
        let ids = gateway.list_favorite_ids(user_id).await?;
        let mut products = Vec::with_capacity(ids.len());
        for id in ids {
            match gateway.get_product(&id).await? {
                Some(product) => products.push(product),
                None => tracing::debug!(product_id = %id, "dropping stale favorite reference"),
            }
        }
        Ok(products)
    }
}
