//! Checkout and order tracking.

use kedai_core::{Order, OrderDraft, OrderId, StoreInfo};
use kedai_storefront::checkout::place_order;
use kedai_storefront::state::Storefront;

use super::{CliError, CommandCart, print_cart, require_token};

/// Order everything in the cart.
pub async fn checkout(
    storefront: &Storefront,
    store: &str,
    address: &str,
    payment_method: &str,
) -> Result<(), CliError> {
    let token = require_token(storefront).await?;
    let mut session = CommandCart::open(storefront).await?;

    if session.cart.is_empty() {
        session.close().await?;
        return Err(CliError::EmptyCart);
    }

    print_cart(&session.cart);
    let draft = OrderDraft::from_cart(
        session.cart.items(),
        StoreInfo::new(store, address),
        payment_method,
    );

    // The remote delete after ordering must not race a queued upsert
    session.cart.scheduler().flush().await;
    let result = place_order(storefront.api(), &mut session.cart, &token, &draft).await;
    let kept_lines = session.cart.len();
    session.close().await?;

    let order = result?;
    println!("Order {} placed", order.id);
    print_order(&order);
    if kept_lines > 0 {
        println!("The saved cart could not be removed; run `kedai cart clear` to empty it");
    }
    Ok(())
}

/// List the user's orders.
pub async fn list(storefront: &Storefront) -> Result<(), CliError> {
    let token = require_token(storefront).await?;
    let orders = storefront.api().orders(&token).await?;

    if orders.is_empty() {
        println!("No orders yet");
    }
    for order in &orders {
        print_order(order);
    }
    Ok(())
}

/// Show one order.
pub async fn show(storefront: &Storefront, id: &str) -> Result<(), CliError> {
    let token = require_token(storefront).await?;
    let order = storefront.api().order(&token, &OrderId::new(id)).await?;
    print_order(&order);
    Ok(())
}

fn print_order(order: &Order) {
    let status = order.status.unwrap_or_default();
    let total = order
        .total_amount
        .map(|total| total.format_idr())
        .unwrap_or_default();
    let method = order.delivery_method.as_deref().unwrap_or("-");

    println!("{:<26} {:<18} {:<10} {:>14}", order.id, status.as_str(), method, total);
}
