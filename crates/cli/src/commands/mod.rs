//! Subcommand implementations.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod session;

use secrecy::SecretString;
use thiserror::Error;
use tokio::task::JoinHandle;

use kedai_storefront::api::ApiError;
use kedai_storefront::cart::{CartStore, SyncHandle, discard_remote_cart};
use kedai_storefront::session::{SessionError, current_token};
use kedai_storefront::state::Storefront;
use kedai_storefront::storage::StorageError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command needs a logged-in session.
    #[error("Not logged in. Run `kedai login` first")]
    NotLoggedIn,

    /// The product id is not in the catalog.
    #[error("No such product: {0}")]
    UnknownProduct(String),

    /// Checkout with nothing to order.
    #[error("Cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The sync worker panicked before flushing.
    #[error("Cart sync worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Read the session token or fail with [`CliError::NotLoggedIn`].
async fn require_token(storefront: &Storefront) -> Result<SecretString, CliError> {
    current_token(storefront.storage())
        .await?
        .ok_or(CliError::NotLoggedIn)
}

/// A cart for the duration of one command.
///
/// Hydrated from the backend when a session exists; otherwise starts empty
/// and nothing it does outlives the process.
struct CommandCart {
    cart: CartStore<SyncHandle>,
    worker: JoinHandle<()>,
    token: Option<SecretString>,
}

impl CommandCart {
    async fn open(storefront: &Storefront) -> Result<Self, CliError> {
        let (mut cart, worker) = storefront.open_cart();

        let token = current_token(storefront.storage()).await?;
        match &token {
            Some(token) => {
                cart.hydrate(storefront.api(), token).await?;
            }
            None => tracing::warn!("Not logged in; cart changes will not be saved"),
        }

        Ok(Self { cart, worker, token })
    }

    /// Delete the backend cart once every queued snapshot has landed.
    ///
    /// Without this an emptied cart comes back on the next hydration, since
    /// empty snapshots are only written locally.
    async fn discard_remote(&self, storefront: &Storefront) -> Result<(), CliError> {
        let Some(token) = &self.token else {
            return Ok(());
        };
        self.cart.scheduler().flush().await;
        discard_remote_cart(storefront.api(), token).await?;
        Ok(())
    }

    /// Drop the store and wait for queued snapshots to be written.
    async fn close(self) -> Result<(), CliError> {
        drop(self.cart);
        self.worker.await?;
        Ok(())
    }
}

fn print_cart<S>(cart: &CartStore<S>)
where
    S: kedai_storefront::cart::SyncScheduler,
{
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    for line in cart.items() {
        println!(
            "{:<26} {:<28} x{:<4} {:>14}",
            line.id,
            line.name,
            line.quantity,
            line.line_total().format_idr()
        );
        if let Some(notes) = &line.notes {
            println!("{:<26} note: {notes}", "");
        }
    }
    println!(
        "{} item(s), subtotal {}",
        cart.total_quantity(),
        cart.subtotal().format_idr()
    );
}
