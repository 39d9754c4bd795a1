//! Best-effort cart persistence.
//!
//! Every cart mutation hands a full snapshot to a [`SyncScheduler`]. The
//! production scheduler, [`SyncHandle`], forwards snapshots over a channel to
//! a background worker that mirrors each one to local storage and, when a
//! session token exists, to the remote cart. Failures are logged and dropped;
//! the in-memory cart is never rolled back.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use kedai_core::{CartLineItem, RemoteCartItem};

use crate::api::{ApiError, CartBackend};
use crate::session;
use crate::storage::{LocalStorage, StorageError, keys};

/// Receives a cart snapshot after every mutation.
pub trait SyncScheduler {
    /// Queue `snapshot` for persistence. Must not block.
    fn schedule(&self, snapshot: Vec<CartLineItem>);
}

/// Discards every snapshot. For carts that are never persisted.
impl SyncScheduler for () {
    fn schedule(&self, _snapshot: Vec<CartLineItem>) {}
}

/// Errors from a single sync attempt. Logged by the worker, never surfaced.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Local storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Remote cart update failed: {0}")]
    Api(#[from] ApiError),
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage(StorageError::Serialize(e))
    }
}

/// What a sync attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No session token; nothing was written anywhere.
    NoSession,
    /// Snapshot was empty; written locally, remote left alone.
    StoredLocally,
    /// Written locally and upserted remotely.
    Synced { lines: usize },
}

/// Persist one snapshot.
///
/// 1. No token: stop without touching storage or the network.
/// 2. Write the snapshot to [`keys::CART`], even when empty.
/// 3. Empty snapshot: stop, so a local clear never wipes the remote cart.
/// 4. Upsert `{ product, quantity }` pairs to the backend.
///
/// # Errors
///
/// Returns `SyncError` if storage or the backend fails.
#[instrument(skip_all, fields(lines = snapshot.len()))]
pub async fn sync_snapshot<S, B>(
    storage: &S,
    backend: &B,
    snapshot: &[CartLineItem],
) -> Result<SyncOutcome, SyncError>
where
    S: LocalStorage,
    B: CartBackend,
{
    let Some(token) = session::current_token(storage).await? else {
        debug!("No session token, cart stays in memory");
        return Ok(SyncOutcome::NoSession);
    };

    let json = serde_json::to_string(snapshot)?;
    storage.set_item(keys::CART, &json).await?;

    if snapshot.is_empty() {
        return Ok(SyncOutcome::StoredLocally);
    }

    let items: Vec<RemoteCartItem> = snapshot.iter().map(CartLineItem::to_remote).collect();
    backend.upsert_cart(&token, &items).await?;

    Ok(SyncOutcome::Synced { lines: items.len() })
}

// =============================================================================
// Background worker
// =============================================================================

/// Work items for the sync worker.
#[derive(Debug)]
enum SyncMessage {
    Snapshot(Vec<CartLineItem>),
    Flush(oneshot::Sender<()>),
}

/// Scheduler handle feeding the background sync worker.
///
/// Cheaply cloneable. The worker stops once every handle is dropped and the
/// queue is drained.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    tx: mpsc::UnboundedSender<SyncMessage>,
}

impl SyncHandle {
    /// Wait until every snapshot scheduled before this call has been applied.
    ///
    /// Returns immediately if the worker has stopped.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(SyncMessage::Flush(done_tx)).is_err() {
            warn!("Cart sync worker has stopped, nothing to flush");
            return;
        }
        // Only fails if the worker panicked mid-queue
        let _ = done_rx.await;
    }
}

impl SyncScheduler for SyncHandle {
    fn schedule(&self, snapshot: Vec<CartLineItem>) {
        if self.tx.send(SyncMessage::Snapshot(snapshot)).is_err() {
            warn!("Cart sync worker has stopped, snapshot dropped");
        }
    }
}

/// Spawn the sync worker on the current tokio runtime.
///
/// Snapshots are applied one at a time in the order they were scheduled, so
/// the last mutation is always the last write. Call [`SyncHandle::flush`], or
/// drop all handles and await the returned `JoinHandle`, to wait for pending
/// writes.
pub fn spawn_sync_worker<S, B>(storage: S, backend: B) -> (SyncHandle, JoinHandle<()>)
where
    S: LocalStorage + 'static,
    B: CartBackend + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<SyncMessage>();

    let task = tokio::spawn(async move {
        debug!("Cart sync worker started");
        while let Some(message) = rx.recv().await {
            match message {
                SyncMessage::Snapshot(snapshot) => {
                    match sync_snapshot(&storage, &backend, &snapshot).await {
                        Ok(outcome) => debug!(?outcome, "Cart snapshot persisted"),
                        Err(e) => warn!(error = %e, "Failed to sync cart"),
                    }
                }
                SyncMessage::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
        info!("Cart sync worker stopped");
    });

    (SyncHandle { tx }, task)
}
