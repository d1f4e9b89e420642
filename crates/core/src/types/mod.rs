//! Shared domain types.

pub mod cart;
pub mod id;
pub mod identity;
pub mod price;
pub mod product;

pub use cart::{Cart, CartItem};
pub use id::{ProductId, UserId};
pub use identity::SyncIdentity;
pub use price::{CurrencyCode, Price};
pub use product::Product;
