//! Stored cart document commands.

use pawmart_core::UserId;
use pawmart_session::StorageGateway;

use super::CommandError;

/// Print a user's stored cart document as JSON.
#[allow(clippy::print_stdout)]
pub async fn show(user: &str) -> Result<(), CommandError> {
    let client = super::client()?;
    let user_id = UserId::new(user);

    match client.load_cart(&user_id).await? {
        Some(document) => {
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        None => {
            println!("no cart stored for user {user}");
        }
    }
    Ok(())
}

/// Delete a user's stored cart document.
#[allow(clippy::print_stdout)]
pub async fn delete(user: &str) -> Result<(), CommandError> {
    let client = super::client()?;
    let user_id = UserId::new(user);

    client.delete_cart(&user_id).await?;
    println!("deleted cart for user {user}");
    Ok(())
}
