//! Session-level error type.
//!
//! Remote failures are classified at the boundary where they matter: a merge
//! failure is fatal to the merge attempt only (the guest cart survives and the
//! user stays signed in), while a background cart-save failure leaves the
//! orchestrator dirty so the save can be retried rather than silently lost.

use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A remote storage call failed.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The login merge was aborted; the guest cart is preserved locally and
    /// the merge will be retried on the next identity edge or `retry_sync`.
    #[error("cart merge aborted: {0}")]
    MergeAborted(#[source] GatewayError),

    /// Quantity validation at the session boundary. Values <= 0 are rejected,
    /// never clamped.
    #[error("quantity must be a positive integer (got {0})")]
    InvalidQuantity(u32),

    /// The operation needs a signed-in user.
    #[error("operation requires a signed-in user")]
    NotAuthenticated,
}

/// Result type alias for `SessionError`.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SessionError::InvalidQuantity(0);
        assert_eq!(err.to_string(), "quantity must be a positive integer (got 0)");

        let err = SessionError::NotAuthenticated;
        assert_eq!(err.to_string(), "operation requires a signed-in user");
    }

    #[test]
    fn test_merge_aborted_carries_cause() {
        let err = SessionError::MergeAborted(GatewayError::Backend("offline".to_string()));
        assert_eq!(
            err.to_string(),
            "cart merge aborted: storage backend error: offline"
        );
    }
}
