//! Sync orchestrator: the identity-edge state machine.
//!
//! Side effects are driven by *edges* of the identity value, so the previous
//! identity is a first-class field here rather than something inferred from a
//! single current-value read:
//!
//! - anonymous → authenticated: merge the guest cart with the remote cart
//!   (union by product id, quantities summed, remote price wins), persist the
//!   result, and install it locally as the new authoritative state
//! - authenticated → anonymous: clear the local cart; the remote cart is left
//!   intact for the next login
//! - local mutation while synced: persist the full current cart
//!
//! Every save carries a monotonically increasing revision that the gateway
//! accepts only if it is the highest seen, so an earlier save whose network
//! round-trip finishes late can never overwrite a later one. The install step
//! of the merge runs under the `applying_remote` flag, which the mutation
//! observer checks before scheduling a save; without it the merge reload
//! would count as a fresh mutation and loop back into another save.

use tracing::instrument;

use pawmart_core::{Cart, SyncIdentity, UserId};

use crate::error::SessionError;
use crate::gateway::{CartDocument, GatewayError, StorageGateway};

/// Where the orchestrator stands relative to remote storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Guest session: cart mutations are purely local.
    #[default]
    Anonymous,
    /// A login merge is in progress.
    Merging,
    /// The local cart mirrors the user's remote cart; mutations are persisted.
    Synced(UserId),
}

/// Drives merge-on-login, clear-on-logout, and persist-on-mutation.
#[derive(Debug, Default)]
pub struct SyncOrchestrator {
    state: SyncState,
    /// Last identity an edge was fully processed for. Stays `Anonymous` when
    /// a merge aborts, so the same login edge remains eligible for retry.
    previous_identity: SyncIdentity,
    /// Set while remote state is being installed into the local cart; the
    /// mutation observer ignores changes made under this flag.
    applying_remote: bool,
    /// Revision of the last save the gateway accepted for this user.
    revision: u64,
    /// A local mutation has not been persisted yet. Sticky across failed
    /// saves: later mutations coalesce into the next successful flush.
    dirty: bool,
}

impl SyncOrchestrator {
    /// Create an orchestrator for a fresh anonymous session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current sync state.
    #[must_use]
    pub const fn state(&self) -> &SyncState {
        &self.state
    }

    /// Whether a local mutation is still awaiting persistence.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Process an identity observation. Only edges (changes against the
    /// recorded previous identity) have effects; repeated observations of the
    /// same identity are no-ops, except that a repeated authenticated
    /// observation retries an earlier aborted merge.
    ///
    /// # Errors
    ///
    /// [`SessionError::MergeAborted`] if the login merge could not complete;
    /// the guest cart is preserved and the merge stays eligible for retry.
    #[instrument(skip(self, gateway, cart), fields(state = ?self.state))]
    pub async fn identity_changed<G: StorageGateway>(
        &mut self,
        gateway: &G,
        cart: &mut Cart,
        identity: &SyncIdentity,
    ) -> Result<(), SessionError> {
        let previous = self.previous_identity.clone();
        match (previous, identity) {
            (SyncIdentity::Anonymous, SyncIdentity::Authenticated(user_id)) => {
                let user_id = user_id.clone();
                self.merge_guest_cart(gateway, cart, &user_id).await
            }
            (SyncIdentity::Authenticated(_), SyncIdentity::Anonymous) => {
                self.clear_local(cart);
                Ok(())
            }
            (SyncIdentity::Authenticated(previous), SyncIdentity::Authenticated(next))
                if &previous != next =>
            {
                // Direct user switch: logout semantics for the first user,
                // then a login merge (against the now-empty guest cart) for
                // the second.
                let next = next.clone();
                self.clear_local(cart);
                self.merge_guest_cart(gateway, cart, &next).await
            }
            _ => Ok(()),
        }
    }

    /// Observe a local cart mutation. Returns whether a save should follow.
    ///
    /// Mutations made while remote state is being installed are not local
    /// intent and schedule nothing; mutations while anonymous are purely
    /// local.
    pub fn note_local_mutation(&mut self) -> bool {
        if self.applying_remote {
            return false;
        }
        if matches!(self.state, SyncState::Synced(_)) {
            self.dirty = true;
            return true;
        }
        false
    }

    /// Persist the current cart if a mutation is pending. Saves are strictly
    /// serialized (the caller awaits each one) and coalesce: however many
    /// mutations set the dirty flag, one save of the latest state clears it.
    ///
    /// # Errors
    ///
    /// Returns the gateway error on failure; the dirty flag stays set so the
    /// save is retried on the next mutation or explicit flush. A failed save
    /// is logged and never mistaken for a successful one.
    pub async fn flush<G: StorageGateway>(
        &mut self,
        gateway: &G,
        cart: &Cart,
    ) -> Result<(), SessionError> {
        let user_id = match &self.state {
            SyncState::Synced(user_id) if self.dirty => user_id.clone(),
            _ => return Ok(()),
        };

        let next_revision = self.revision + 1;
        let document = CartDocument::snapshot(next_revision, cart);
        match gateway.save_cart(&user_id, &document).await {
            Ok(()) => {
                self.revision = next_revision;
                self.dirty = false;
                tracing::debug!(user_id = %user_id, revision = next_revision, "cart saved");
                Ok(())
            }
            Err(err) => {
                // A stale-write rejection means another device of this user
                // saved at a higher revision. Adopt the remote counter so the
                // retry proposes above it instead of being rejected forever.
                if let GatewayError::StaleWrite(remote_revision) = err {
                    self.revision = remote_revision;
                }
                tracing::warn!(
                    user_id = %user_id,
                    revision = next_revision,
                    error = %err,
                    "cart save failed; keeping dirty flag for retry"
                );
                Err(SessionError::Gateway(err))
            }
        }
    }

    /// Login merge: load the remote cart, union it with the guest cart,
    /// persist the result, and install it locally.
    async fn merge_guest_cart<G: StorageGateway>(
        &mut self,
        gateway: &G,
        cart: &mut Cart,
        user_id: &UserId,
    ) -> Result<(), SessionError> {
        self.state = SyncState::Merging;

        let remote = match gateway.load_cart(user_id).await {
            Ok(Some(document)) => {
                self.revision = document.revision;
                document.into_cart()
            }
            // No remote cart exists; merging against the empty cart is
            // correct, unlike the failure case below.
            Ok(None) => {
                self.revision = 0;
                Cart::new()
            }
            Err(err) => {
                self.state = SyncState::Anonymous;
                tracing::warn!(user_id = %user_id, error = %err, "remote cart load failed, merge aborted");
                return Err(SessionError::MergeAborted(err));
            }
        };

        let merged = cart.merged_with(&remote);
        let next_revision = self.revision + 1;
        let document = CartDocument::snapshot(next_revision, &merged);
        if let Err(err) = gateway.save_cart(user_id, &document).await {
            self.state = SyncState::Anonymous;
            tracing::warn!(user_id = %user_id, error = %err, "merged cart save failed, merge aborted");
            return Err(SessionError::MergeAborted(err));
        }
        self.revision = next_revision;

        // Install the merged cart as the new authoritative local state. This
        // is remote state arriving, not a fresh local mutation.
        self.applying_remote = true;
        *cart = merged;
        self.applying_remote = false;

        self.dirty = false;
        self.state = SyncState::Synced(user_id.clone());
        self.previous_identity = SyncIdentity::Authenticated(user_id.clone());
        tracing::info!(user_id = %user_id, revision = next_revision, "guest cart merged");
        Ok(())
    }

    /// Logout: reset the local cart. No gateway write; the remote cart stays
    /// available for the next login.
    fn clear_local(&mut self, cart: &mut Cart) {
        self.applying_remote = true;
        cart.clear();
        self.applying_remote = false;

        self.dirty = false;
        self.state = SyncState::Anonymous;
        self.previous_identity = SyncIdentity::Anonymous;
    }
}
