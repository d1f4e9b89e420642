//! Pawmart Core - Shared types library.
//!
//! This crate provides the common types used across all Pawmart components:
//! - `session` - Cart/favorites synchronization engine
//! - `cli` - Command-line tools for remote-store maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, product snapshots, the cart reducer,
//!   and the session identity

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
