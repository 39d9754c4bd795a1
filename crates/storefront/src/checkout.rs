//! Order placement.
//!
//! Placing an order is the one place the remote cart is deleted. The local
//! cart is cleared only once the backend has accepted the order and dropped
//! its copy of the cart, so the two never disagree about what is left.

use std::future::Future;

use secrecy::SecretString;
use tracing::{info, instrument, warn};

use kedai_core::{Order, OrderDraft};

use crate::api::{ApiClient, ApiError, CartBackend};
use crate::cart::{CartStore, SyncScheduler};

/// Backend operations needed to submit an order.
pub trait OrderBackend: Send + Sync {
    /// Submit `draft` and return the created order.
    fn create_order(
        &self,
        token: &SecretString,
        draft: &OrderDraft,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send;
}

impl OrderBackend for ApiClient {
    async fn create_order(&self, token: &SecretString, draft: &OrderDraft) -> Result<Order, ApiError> {
        Self::create_order(self, token, draft).await
    }
}

/// Submit an order and empty the cart.
///
/// After the order is created the remote cart is deleted, and only then is
/// the local cart cleared. If the delete fails the order still stands and is
/// returned, but both carts keep their lines; check [`CartStore::is_empty`]
/// to tell the cases apart.
///
/// # Errors
///
/// Returns `ApiError` if the order is rejected. The cart is left as it was.
#[instrument(skip_all, fields(lines = draft.items.len(), total = %draft.total_amount))]
pub async fn place_order<B, S>(
    backend: &B,
    cart: &mut CartStore<S>,
    token: &SecretString,
    draft: &OrderDraft,
) -> Result<Order, ApiError>
where
    B: OrderBackend + CartBackend,
    S: SyncScheduler,
{
    let order = backend.create_order(token, draft).await?;
    info!(order_id = %order.id, "Order placed");

    match backend.delete_cart(token).await {
        Ok(()) => cart.clear_cart(),
        Err(e) => warn!(
            error = %e,
            order_id = %order.id,
            "Failed to delete remote cart after checkout, keeping local cart"
        ),
    }

    Ok(order)
}
