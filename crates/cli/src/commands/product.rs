//! Product lookup commands.

use pawmart_core::ProductId;
use pawmart_session::StorageGateway;

use super::CommandError;

/// Print a product as JSON, if it exists.
#[allow(clippy::print_stdout)]
pub async fn get(id: &str) -> Result<(), CommandError> {
    let client = super::client()?;
    let product_id = ProductId::new(id);

    match client.get_product(&product_id).await? {
        Some(product) => {
            println!("{}", serde_json::to_string_pretty(&product)?);
        }
        None => {
            println!("no product found with id {id}");
        }
    }
    Ok(())
}
