//! Session identity as seen by the sync engine.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Who owns the current session.
///
/// The sync engine reacts to *edges* of this value (login, logout), never to
/// its steady state, so the previous identity is always tracked explicitly by
/// the orchestrator rather than inferred from a single read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SyncIdentity {
    /// Guest session: the local cart is the system of record.
    #[default]
    Anonymous,
    /// Signed-in session: the remote per-user documents are the system of
    /// record.
    Authenticated(UserId),
}

impl SyncIdentity {
    /// The signed-in user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user_id) => Some(user_id),
        }
    }

    /// Whether this identity is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_accessor() {
        assert_eq!(SyncIdentity::Anonymous.user_id(), None);

        let id = UserId::new("u1");
        let identity = SyncIdentity::Authenticated(id.clone());
        assert_eq!(identity.user_id(), Some(&id));
        assert!(identity.is_authenticated());
        assert!(!SyncIdentity::Anonymous.is_authenticated());
    }
}
