//! CLI command implementations.

pub mod cart;
pub mod favorites;
pub mod product;

use pawmart_session::gateway::DocumentStoreClient;
use pawmart_session::{ConfigError, GatewayConfig, GatewayError};
use thiserror::Error;

/// Errors that can occur while running a CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Gateway configuration could not be loaded from the environment.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A remote call failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Output serialization failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Build a document store client from the environment.
pub fn client() -> Result<DocumentStoreClient, CommandError> {
    let config = GatewayConfig::from_env()?;
    Ok(DocumentStoreClient::new(&config)?)
}
