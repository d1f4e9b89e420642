//! The session context: one owned object per logical storefront session.
//!
//! The cart and favorites stores are never mutated from outside; every
//! operation funnels through this type, which is what lets the orchestrator
//! observe each mutation and identity edge exactly once. There is no ambient
//! global state: callers hold the `Session` and pass it where it is needed.

use std::num::NonZeroU32;

use pawmart_core::{Cart, Product, ProductId, SyncIdentity, UserId};

use crate::error::{Result, SessionError};
use crate::favorites::FavoritesStore;
use crate::gateway::StorageGateway;
use crate::sync::{SyncOrchestrator, SyncState};

/// A storefront session: local cart and favorites plus their sync engine,
/// bound to one gateway.
pub struct Session<G> {
    gateway: G,
    cart: Cart,
    favorites: FavoritesStore,
    identity: SyncIdentity,
    sync: SyncOrchestrator,
}

impl<G: StorageGateway> Session<G> {
    /// Start an anonymous session with an empty cart.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            cart: Cart::new(),
            favorites: FavoritesStore::new(),
            identity: SyncIdentity::Anonymous,
            sync: SyncOrchestrator::new(),
        }
    }

    /// The local cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The favorites store.
    #[must_use]
    pub const fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    /// The current identity.
    #[must_use]
    pub const fn identity(&self) -> &SyncIdentity {
        &self.identity
    }

    /// The orchestrator's sync state.
    #[must_use]
    pub const fn sync_state(&self) -> &SyncState {
        self.sync.state()
    }

    /// Whether a cart mutation is still awaiting a successful remote save.
    #[must_use]
    pub const fn has_pending_cart_save(&self) -> bool {
        self.sync.is_dirty()
    }

    /// The gateway this session talks to.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    // =========================================================================
    // Cart operations
    // =========================================================================

    /// Add one unit of a product to the cart.
    pub async fn add_to_cart(&mut self, product: &Product) {
        self.cart.add_item(product);
        self.after_cart_mutation().await;
    }

    /// Remove one unit of a product. Returns `false` if the product was not
    /// in the cart (no-op).
    pub async fn remove_one_from_cart(&mut self, product_id: &ProductId) -> bool {
        let changed = self.cart.remove_one(product_id);
        if changed {
            self.after_cart_mutation().await;
        }
        changed
    }

    /// Set a cart line's quantity. This is the validation boundary: values
    /// of zero are rejected with [`SessionError::InvalidQuantity`] rather
    /// than clamped. Returns `false` if the product was not in the cart.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidQuantity`] if `quantity` is zero.
    pub async fn set_cart_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<bool> {
        let quantity =
            NonZeroU32::new(quantity).ok_or(SessionError::InvalidQuantity(quantity))?;
        let changed = self.cart.set_quantity(product_id, quantity);
        if changed {
            self.after_cart_mutation().await;
        }
        Ok(changed)
    }

    /// Empty the cart.
    pub async fn clear_cart(&mut self) {
        if self.cart.is_empty() {
            return;
        }
        self.cart.clear();
        self.after_cart_mutation().await;
    }

    /// Retry a pending cart save, if any.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the save fails again; the save stays
    /// pending.
    pub async fn flush_cart(&mut self) -> Result<()> {
        self.sync.flush(&self.gateway, &self.cart).await
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Sign in. Merges the guest cart with the user's remote cart and
    /// refreshes favorites.
    ///
    /// # Errors
    ///
    /// [`SessionError::MergeAborted`] if the cart merge could not complete.
    /// The user remains signed in with the guest cart intact; call
    /// [`Self::retry_sync`] (or sign in again) to retry the merge. Favorites
    /// refresh failures surface through the favorites store's status, not
    /// here.
    pub async fn sign_in(&mut self, user_id: UserId) -> Result<()> {
        self.identity = SyncIdentity::Authenticated(user_id.clone());
        let merge = self
            .sync
            .identity_changed(&self.gateway, &mut self.cart, &self.identity)
            .await;
        self.favorites.refresh(&self.gateway, &user_id).await;
        merge
    }

    /// Sign out. Clears the local cart (the remote cart is left intact for
    /// the next login) and invalidates the favorites cache.
    ///
    /// # Errors
    ///
    /// None in practice: the logout transition performs no gateway calls.
    pub async fn sign_out(&mut self) -> Result<()> {
        self.identity = SyncIdentity::Anonymous;
        self.favorites.invalidate();
        self.sync
            .identity_changed(&self.gateway, &mut self.cart, &self.identity)
            .await
    }

    /// Re-run the sync transition for the current identity, e.g. to retry a
    /// merge that aborted on a network failure.
    ///
    /// # Errors
    ///
    /// [`SessionError::MergeAborted`] if the merge fails again.
    pub async fn retry_sync(&mut self) -> Result<()> {
        self.sync
            .identity_changed(&self.gateway, &mut self.cart, &self.identity)
            .await
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Reload the favorites list from remote storage.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotAuthenticated`] while anonymous. Remote failures
    /// surface through the store's status/error fields.
    pub async fn refresh_favorites(&mut self) -> Result<()> {
        let user_id = self.require_user()?;
        self.favorites.refresh(&self.gateway, &user_id).await;
        Ok(())
    }

    /// Favorite a product (pessimistic: local state changes only after the
    /// remote call confirms).
    ///
    /// # Errors
    ///
    /// [`SessionError::NotAuthenticated`] while anonymous, or the gateway
    /// error on remote failure (local state untouched).
    pub async fn add_favorite(&mut self, product: Product) -> Result<()> {
        let user_id = self.require_user()?;
        self.favorites
            .add(&self.gateway, &user_id, product)
            .await
            .map_err(SessionError::from)
    }

    /// Unfavorite a product. Removing an absent favorite is a safe no-op.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotAuthenticated`] while anonymous, or the gateway
    /// error on remote failure (local state untouched).
    pub async fn remove_favorite(&mut self, product_id: &ProductId) -> Result<()> {
        let user_id = self.require_user()?;
        self.favorites
            .remove(&self.gateway, &user_id, product_id)
            .await
            .map_err(SessionError::from)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn require_user(&self) -> Result<UserId> {
        self.identity
            .user_id()
            .cloned()
            .ok_or(SessionError::NotAuthenticated)
    }

    /// Report the mutation to the orchestrator and, while synced, persist.
    /// Persistence is background with respect to the user action: a failed
    /// save is logged and left pending (`has_pending_cart_save`) rather than
    /// failing the mutation, so checkout is never blocked on a save.
    async fn after_cart_mutation(&mut self) {
        if self.sync.note_local_mutation()
            && let Err(err) = self.sync.flush(&self.gateway, &self.cart).await
        {
            tracing::warn!(error = %err, "background cart save failed");
        }
    }
}
