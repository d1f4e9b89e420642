//! Favorites inspection commands.

use pawmart_core::UserId;
use pawmart_session::StorageGateway;

use super::CommandError;

/// Print a user's favorite product ids, one per line.
#[allow(clippy::print_stdout)]
pub async fn list(user: &str) -> Result<(), CommandError> {
    let client = super::client()?;
    let user_id = UserId::new(user);

    let ids = client.list_favorite_ids(&user_id).await?;
    if ids.is_empty() {
        println!("no favorites stored for user {user}");
        return Ok(());
    }
    for id in ids {
        println!("{id}");
    }
    Ok(())
}
