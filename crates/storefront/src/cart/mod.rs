//! Client-side cart.
//!
//! [`CartStore`] owns the in-memory list of line items for the session and is
//! the only thing that mutates it. Mutations are synchronous and infallible:
//! invalid input is logged and ignored. After each applied mutation the store
//! hands a snapshot to its [`SyncScheduler`], which persists it in the
//! background (see [`sync`]).
//!
//! # Invariants
//!
//! - At most one line per product id (adds merge into the existing line)
//! - Every line has `quantity >= 1` (setting a quantity to zero removes it)
//! - Lines keep insertion order
//!
//! # Example
//!
//! ```rust,ignore
//! let (sync, worker) = spawn_sync_worker(storage.clone(), api.clone());
//! let mut cart = CartStore::new(sync);
//!
//! cart.hydrate(&api, &token).await?;
//! cart.add_to_cart(&product);
//! cart.update_quantity("p1", 3);
//! ```

pub mod sync;

use secrecy::SecretString;
use tracing::{debug, instrument, warn};

use kedai_core::{CartLineItem, Price};

use crate::api::{ApiError, CartBackend};

pub use sync::{
    SyncError, SyncHandle, SyncOutcome, SyncScheduler, spawn_sync_worker, sync_snapshot,
};

/// The session's cart.
pub struct CartStore<S = SyncHandle> {
    items: Vec<CartLineItem>,
    scheduler: S,
}

impl<S: SyncScheduler> CartStore<S> {
    /// Create an empty cart that reports snapshots to `scheduler`.
    #[must_use]
    pub const fn new(scheduler: S) -> Self {
        Self {
            items: Vec::new(),
            scheduler,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Owned copy of the current lines.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLineItem> {
        self.items.clone()
    }

    /// The line for `product_id`, if carted.
    #[must_use]
    pub fn line(&self, product_id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|line| line.id == *product_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// The scheduler snapshots are sent to.
    #[must_use]
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `item`.
    ///
    /// Items without an id, a name, or a non-zero price are ignored. A product
    /// already in the cart has its quantity bumped by one and keeps its notes;
    /// a new product is appended with quantity one. The caller's `quantity`
    /// field is not consulted.
    pub fn add_to_cart(&mut self, item: impl Into<CartLineItem>) {
        let item = item.into();

        if item.id.is_empty() || item.name.is_empty() || item.price.is_zero() {
            warn!(
                product_id = %item.id,
                name = %item.name,
                price = %item.price,
                "Ignoring invalid cart item"
            );
            return;
        }

        let incoming = CartLineItem { quantity: 1, ..item };

        if let Some(existing) = self.items.iter_mut().find(|line| line.id == incoming.id) {
            existing.quantity = existing.quantity.saturating_add(incoming.quantity);
            debug!(product_id = %existing.id, quantity = existing.quantity, "Merged into cart line");
        } else {
            debug!(product_id = %incoming.id, "Added cart line");
            self.items.push(incoming);
        }

        self.commit();
    }

    /// Set the quantity of `product_id` exactly.
    ///
    /// Zero or negative removes the line. Unknown ids leave the lines as they
    /// are.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.items.retain(|line| line.id != *product_id);
        } else {
            let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            if let Some(line) = self.items.iter_mut().find(|line| line.id == *product_id) {
                line.quantity = quantity;
            }
        }

        self.commit();
    }

    /// Set or clear the notes on a line. Unknown ids are ignored.
    pub fn set_notes(&mut self, product_id: &str, notes: Option<String>) {
        let Some(line) = self.items.iter_mut().find(|line| line.id == *product_id) else {
            debug!(product_id, "No cart line to annotate");
            return;
        };

        line.notes = notes.filter(|n| !n.is_empty());
        self.commit();
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.commit();
    }

    /// Replace the cart wholesale.
    ///
    /// Lines with quantity zero are dropped and repeated ids are folded into
    /// their first occurrence, so the invariants hold whatever the source.
    pub fn set_cart(&mut self, items: Vec<CartLineItem>) {
        let mut normalized: Vec<CartLineItem> = Vec::with_capacity(items.len());

        for item in items.into_iter().filter(|item| item.quantity > 0) {
            if let Some(existing) = normalized.iter_mut().find(|line| line.id == item.id) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            } else {
                normalized.push(item);
            }
        }

        self.items = normalized;
        self.commit();
    }

    /// Replace the cart with the backend's copy.
    ///
    /// Returns the number of lines loaded.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the fetch fails for any reason other than the
    /// remote cart not existing yet. The local cart is unchanged in that case.
    #[instrument(skip_all)]
    pub async fn hydrate<B: CartBackend>(
        &mut self,
        backend: &B,
        token: &SecretString,
    ) -> Result<usize, ApiError> {
        let items = backend.fetch_cart(token).await?;
        self.set_cart(items);
        debug!(lines = self.items.len(), "Cart hydrated");
        Ok(self.items.len())
    }

    fn commit(&self) {
        self.scheduler.schedule(self.items.clone());
    }
}

/// Delete the backend's copy of the cart.
///
/// Snapshot sync never pushes an empty cart, so emptying a cart for good takes
/// this explicit call, made after pending snapshots are flushed. A cart that
/// does not exist remotely counts as deleted.
///
/// # Errors
///
/// Returns `ApiError` if the backend rejects the delete.
#[instrument(skip_all)]
pub async fn discard_remote_cart<B: CartBackend>(backend: &B, token: &SecretString) -> Result<(), ApiError> {
    match backend.delete_cart(token).await {
        Ok(()) | Err(ApiError::NotFound(_)) => Ok(()),
        Err(e) => Err(e),
    }
}
