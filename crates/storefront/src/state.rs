//! Client state shared across commands.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::api::{ApiClient, ApiError};
use crate::cart::{CartStore, SyncHandle, spawn_sync_worker};
use crate::config::ClientConfig;
use crate::storage::FileStorage;

/// Everything a storefront session needs: configuration, the backend client,
/// and the local store.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: ClientConfig,
    api: ApiClient,
    storage: FileStorage,
}

impl Storefront {
    /// Build the client state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        let storage = FileStorage::new(config.storage_dir.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                storage,
            }),
        })
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the local store.
    #[must_use]
    pub fn storage(&self) -> &FileStorage {
        &self.inner.storage
    }

    /// Start a cart backed by a fresh sync worker.
    ///
    /// Drop the cart, then await the returned handle, to flush pending
    /// writes before exiting.
    #[must_use]
    pub fn open_cart(&self) -> (CartStore<SyncHandle>, JoinHandle<()>) {
        let (sync, worker) = spawn_sync_worker(self.inner.storage.clone(), self.inner.api.clone());
        (CartStore::new(sync), worker)
    }
}
