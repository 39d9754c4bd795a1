//! Remote cart normalization.
//!
//! The backend nests product data under `product` for each cart entry; the
//! client works with flat [`CartLineItem`]s.

use tracing::warn;

use kedai_core::CartLineItem;

use super::types::RemoteCartEntry;

/// Flatten remote cart entries into local line items.
///
/// Entries whose product no longer exists are skipped.
pub fn convert_remote_cart(entries: Vec<RemoteCartEntry>) -> Vec<CartLineItem> {
    entries.into_iter().filter_map(convert_remote_entry).collect()
}

fn convert_remote_entry(entry: RemoteCartEntry) -> Option<CartLineItem> {
    let Some(product) = entry.product else {
        warn!(quantity = entry.quantity, "Skipping remote cart entry without product");
        return None;
    };

    Some(CartLineItem {
        id: product.id,
        name: product.name,
        price: product.price,
        image: product.image,
        quantity: entry.quantity,
        notes: None,
    })
}
