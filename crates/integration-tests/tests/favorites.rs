//! End-to-end favorites flows.
//!
//! Favorites mutations are pessimistic (remote first, local on confirmation)
//! and the list follows the login/logout lifecycle, so these tests assert on
//! the local store and the gateway's stored ids together.

use pawmart_core::ProductId;
use pawmart_integration_tests::{product, user};
use pawmart_session::favorites::FavoritesStatus;
use pawmart_session::gateway::MemoryGateway;
use pawmart_session::{Session, SessionError, StorageGateway};

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_favorites_load_on_login() {
    let gateway = MemoryGateway::new();
    gateway.insert_product(product("dog-bed", 4999));
    gateway.insert_product(product("cat-toy", 799));

    let mut session = Session::new(gateway);
    {
        let gateway = session.gateway();
        gateway.add_favorite(&user(), &ProductId::new("dog-bed")).await.expect("seed");
        gateway.add_favorite(&user(), &ProductId::new("cat-toy")).await.expect("seed");
    }

    session.sign_in(user()).await.expect("sign in");

    let favorites = session.favorites();
    assert_eq!(favorites.status(), FavoritesStatus::Succeeded);
    assert_eq!(favorites.items().len(), 2);
    assert!(favorites.contains(&ProductId::new("dog-bed")));
    assert!(favorites.contains(&ProductId::new("cat-toy")));
}

#[tokio::test]
async fn test_favorites_cleared_on_logout() {
    let gateway = MemoryGateway::new();
    gateway.insert_product(product("dog-bed", 4999));

    let mut session = Session::new(gateway);
    session.sign_in(user()).await.expect("sign in");
    session.add_favorite(product("dog-bed", 4999)).await.expect("add");
    assert_eq!(session.favorites().items().len(), 1);

    session.sign_out().await.expect("sign out");

    assert!(session.favorites().items().is_empty());
    assert_eq!(session.favorites().status(), FavoritesStatus::Idle);
    // The remote record survives for the next login.
    assert_eq!(session.gateway().stored_favorites(&user()).len(), 1);
}

#[tokio::test]
async fn test_favorites_do_not_leak_across_users() {
    let other = pawmart_core::UserId::new("user-2");

    let gateway = MemoryGateway::new();
    gateway.insert_product(product("dog-bed", 4999));

    let mut session = Session::new(gateway);
    session.sign_in(user()).await.expect("sign in as first user");
    session.add_favorite(product("dog-bed", 4999)).await.expect("add");

    session.sign_out().await.expect("sign out");
    session.sign_in(other).await.expect("sign in as second user");

    assert!(session.favorites().items().is_empty());
    assert_eq!(session.favorites().status(), FavoritesStatus::Succeeded);
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn test_add_and_remove_persist_remotely() {
    let gateway = MemoryGateway::new();
    let mut session = Session::new(gateway);
    session.sign_in(user()).await.expect("sign in");

    session.add_favorite(product("dog-bed", 4999)).await.expect("add");
    assert!(session.favorites().contains(&ProductId::new("dog-bed")));
    assert_eq!(session.gateway().stored_favorites(&user()), vec![ProductId::new("dog-bed")]);

    session.remove_favorite(&ProductId::new("dog-bed")).await.expect("remove");
    assert!(!session.favorites().contains(&ProductId::new("dog-bed")));
    assert!(session.gateway().stored_favorites(&user()).is_empty());
}

#[tokio::test]
async fn test_remote_failure_leaves_local_state_untouched() {
    let gateway = MemoryGateway::new();
    let mut session = Session::new(gateway);
    session.sign_in(user()).await.expect("sign in");

    session.gateway().fail_favorite_calls(true);
    let result = session.add_favorite(product("dog-bed", 4999)).await;

    assert!(result.is_err());
    assert!(session.favorites().items().is_empty(), "no speculative insert");
    assert!(session.gateway().stored_favorites(&user()).is_empty());
}

#[tokio::test]
async fn test_removing_an_absent_favorite_is_a_noop() {
    let gateway = MemoryGateway::new();
    let mut session = Session::new(gateway);
    session.sign_in(user()).await.expect("sign in");

    session
        .remove_favorite(&ProductId::new("never-favorited"))
        .await
        .expect("absent removal is a no-op");
}

#[tokio::test]
async fn test_anonymous_favorites_are_rejected() {
    let mut session = Session::new(MemoryGateway::new());

    let err = session
        .add_favorite(product("dog-bed", 4999))
        .await
        .expect_err("anonymous add must fail");
    assert!(matches!(err, SessionError::NotAuthenticated));

    let err = session
        .remove_favorite(&ProductId::new("dog-bed"))
        .await
        .expect_err("anonymous remove must fail");
    assert!(matches!(err, SessionError::NotAuthenticated));

    let err = session
        .refresh_favorites()
        .await
        .expect_err("anonymous refresh must fail");
    assert!(matches!(err, SessionError::NotAuthenticated));
}

// =============================================================================
// Refresh semantics
// =============================================================================

#[tokio::test]
async fn test_stale_favorite_ids_are_dropped_on_refresh() {
    let gateway = MemoryGateway::new();
    gateway.insert_product(product("dog-bed", 4999));

    let mut session = Session::new(gateway);
    {
        let gateway = session.gateway();
        gateway.add_favorite(&user(), &ProductId::new("dog-bed")).await.expect("seed");
        // Favorited once, since removed from the catalog.
        gateway.add_favorite(&user(), &ProductId::new("discontinued")).await.expect("seed");
    }

    session.sign_in(user()).await.expect("sign in");

    assert_eq!(session.favorites().items().len(), 1);
    assert!(session.favorites().contains(&ProductId::new("dog-bed")));
}

#[tokio::test]
async fn test_failed_refresh_keeps_the_previous_list() {
    let gateway = MemoryGateway::new();
    gateway.insert_product(product("dog-bed", 4999));

    let mut session = Session::new(gateway);
    session.sign_in(user()).await.expect("sign in");
    session.add_favorite(product("dog-bed", 4999)).await.expect("add");

    session.gateway().fail_favorite_calls(true);
    session.refresh_favorites().await.expect("refresh itself does not error");

    assert_eq!(session.favorites().status(), FavoritesStatus::Failed);
    assert!(session.favorites().error().is_some());
    assert_eq!(session.favorites().items().len(), 1, "previous list kept");
}
