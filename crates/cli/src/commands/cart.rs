//! Cart commands.
//!
//! Each command hydrates the cart, applies one mutation, prints the result,
//! and waits for the sync worker to persist it before returning.

use kedai_storefront::state::Storefront;

use super::{CliError, CommandCart, print_cart};

/// Print the cart.
pub async fn show(storefront: &Storefront) -> Result<(), CliError> {
    let session = CommandCart::open(storefront).await?;
    print_cart(&session.cart);
    session.close().await
}

/// Add one unit of `product_id`.
pub async fn add(storefront: &Storefront, product_id: &str) -> Result<(), CliError> {
    let product = storefront
        .api()
        .products(None)
        .await?
        .into_iter()
        .find(|product| product.id == *product_id)
        .ok_or_else(|| CliError::UnknownProduct(product_id.to_owned()))?;

    let mut session = CommandCart::open(storefront).await?;
    session.cart.add_to_cart(&product);
    print_cart(&session.cart);
    session.close().await
}

/// Set the quantity of `product_id`; zero or less removes it.
pub async fn set_quantity(storefront: &Storefront, product_id: &str, quantity: i64) -> Result<(), CliError> {
    let mut session = CommandCart::open(storefront).await?;
    if session.cart.line(product_id).is_none() {
        tracing::warn!(product_id, "Product is not in the cart");
    }
    let had_items = !session.cart.is_empty();
    session.cart.update_quantity(product_id, quantity);
    print_cart(&session.cart);

    if had_items && session.cart.is_empty() {
        session.discard_remote(storefront).await?;
    }
    session.close().await
}

/// Attach kitchen notes to a line, or clear them.
pub async fn set_notes(storefront: &Storefront, product_id: &str, notes: Option<String>) -> Result<(), CliError> {
    let mut session = CommandCart::open(storefront).await?;
    session.cart.set_notes(product_id, notes);
    print_cart(&session.cart);
    session.close().await
}

/// Empty the cart, both locally and on the backend.
pub async fn clear(storefront: &Storefront) -> Result<(), CliError> {
    let mut session = CommandCart::open(storefront).await?;
    session.cart.clear_cart();
    print_cart(&session.cart);
    session.discard_remote(storefront).await?;
    session.close().await
}
