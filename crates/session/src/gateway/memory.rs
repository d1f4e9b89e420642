//! In-memory gateway: the hermetic test double.
//!
//! Behaves like the remote store at the interface boundary, including the
//! revision check on cart saves, and adds failure injection plus a save
//! counter so tests can assert on write traffic.

use std::collections::HashMap;
use std::sync::Mutex;

use pawmart_core::{Product, ProductId, UserId};

use super::{CartDocument, GatewayError, StorageGateway};

/// In-memory implementation of [`StorageGateway`].
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    carts: HashMap<UserId, CartDocument>,
    favorites: HashMap<UserId, Vec<ProductId>>,
    products: HashMap<ProductId, Product>,
    cart_saves: u64,
    fail_cart_loads: bool,
    fail_cart_saves: bool,
    fail_favorite_calls: bool,
}

impl MemoryGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the catalog with a product.
    pub fn insert_product(&self, product: Product) {
        self.lock().products.insert(product.id.clone(), product);
    }

    /// Seed a stored cart document for a user.
    pub fn seed_cart(&self, user_id: UserId, document: CartDocument) {
        self.lock().carts.insert(user_id, document);
    }

    /// The cart document currently stored for a user.
    #[must_use]
    pub fn stored_cart(&self, user_id: &UserId) -> Option<CartDocument> {
        self.lock().carts.get(user_id).cloned()
    }

    /// The favorite ids currently stored for a user.
    #[must_use]
    pub fn stored_favorites(&self, user_id: &UserId) -> Vec<ProductId> {
        self.lock().favorites.get(user_id).cloned().unwrap_or_default()
    }

    /// How many cart saves have been accepted.
    #[must_use]
    pub fn cart_save_count(&self) -> u64 {
        self.lock().cart_saves
    }

    /// Make subsequent cart loads fail.
    pub fn fail_cart_loads(&self, fail: bool) {
        self.lock().fail_cart_loads = fail;
    }

    /// Make subsequent cart saves fail.
    pub fn fail_cart_saves(&self, fail: bool) {
        self.lock().fail_cart_saves = fail;
    }

    /// Make subsequent favorite reads/writes fail.
    pub fn fail_favorite_calls(&self, fail: bool) {
        self.lock().fail_favorite_calls = fail;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A poisoned lock only happens if a test already panicked.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl StorageGateway for MemoryGateway {
    async fn load_cart(&self, user_id: &UserId) -> Result<Option<CartDocument>, GatewayError> {
        let state = self.lock();
        if state.fail_cart_loads {
            return Err(GatewayError::Backend("injected cart load failure".to_string()));
        }
        Ok(state.carts.get(user_id).cloned())
    }

    async fn save_cart(
        &self,
        user_id: &UserId,
        document: &CartDocument,
    ) -> Result<(), GatewayError> {
        let mut state = self.lock();
        if state.fail_cart_saves {
            return Err(GatewayError::Backend("injected cart save failure".to_string()));
        }
        if let Some(existing) = state.carts.get(user_id)
            && document.revision <= existing.revision
        {
            return Err(GatewayError::StaleWrite(existing.revision));
        }
        state.carts.insert(user_id.clone(), document.clone());
        state.cart_saves += 1;
        Ok(())
    }

    async fn delete_cart(&self, user_id: &UserId) -> Result<(), GatewayError> {
        self.lock().carts.remove(user_id);
        Ok(())
    }

    async fn list_favorite_ids(&self, user_id: &UserId) -> Result<Vec<ProductId>, GatewayError> {
        let state = self.lock();
        if state.fail_favorite_calls {
            return Err(GatewayError::Backend("injected favorites failure".to_string()));
        }
        Ok(state.favorites.get(user_id).cloned().unwrap_or_default())
    }

    async fn add_favorite(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), GatewayError> {
        let mut state = self.lock();
        if state.fail_favorite_calls {
            return Err(GatewayError::Backend("injected favorites failure".to_string()));
        }
        let favorites = state.favorites.entry(user_id.clone()).or_default();
        if !favorites.contains(product_id) {
            favorites.push(product_id.clone());
        }
        Ok(())
    }

    async fn remove_favorite(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), GatewayError> {
        let mut state = self.lock();
        if state.fail_favorite_calls {
            return Err(GatewayError::Backend("injected favorites failure".to_string()));
        }
        if let Some(favorites) = state.favorites.get_mut(user_id) {
            favorites.retain(|id| id != product_id);
        }
        Ok(())
    }

    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>, GatewayError> {
        let state = self.lock();
        if state.fail_favorite_calls {
            return Err(GatewayError::Backend("injected product lookup failure".to_string()));
        }
        Ok(state.products.get(product_id).cloned())
    }
}
