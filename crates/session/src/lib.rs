//! Pawmart session core: cart and favorites synchronization.
//!
//! This crate keeps a shopping cart consistent across an anonymous (guest)
//! session and an authenticated, multi-device session backed by per-user
//! remote document storage, plus the companion favorites list mutated against
//! the same store.
//!
//! # Architecture
//!
//! - [`gateway`] - The remote persistence interface: the [`gateway::StorageGateway`]
//!   trait, the REST client that speaks to the document store, and an
//!   in-memory double for tests
//! - [`favorites`] - The favorites store: pessimistic add/remove plus a
//!   superseding list refresh
//! - [`sync`] - The sync orchestrator: the identity-edge state machine that
//!   merges the guest cart on login, clears it on logout, and persists every
//!   mutation while signed in
//! - [`session`] - The owned session context that ties the pieces together;
//!   all cart/favorites mutations funnel through it
//!
//! # Example
//!
//! ```rust,ignore
//! use pawmart_session::{Session, gateway::DocumentStoreClient};
//!
//! let gateway = DocumentStoreClient::new(&config)?;
//! let mut session = Session::new(gateway);
//!
//! session.add_to_cart(&product).await;       // guest cart, purely local
//! session.sign_in(user_id).await?;           // guest cart merged with remote
//! session.add_to_cart(&product).await;       // persisted to remote storage
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod favorites;
pub mod gateway;
pub mod session;
pub mod sync;

pub use config::{ConfigError, GatewayConfig};
pub use error::{Result, SessionError};
pub use gateway::{CartDocument, GatewayError, StorageGateway};
pub use session::Session;
pub use sync::SyncState;
