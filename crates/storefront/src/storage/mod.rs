//! On-device key/value storage.
//!
//! A small async string store keyed by fixed names (see [`keys`]). Two
//! implementations are provided:
//!
//! - [`MemoryStorage`] - process-local, used by tests and ephemeral sessions
//! - [`FileStorage`] - one JSON file per key under a directory
//!
//! Values are opaque strings; callers serialize with `serde_json`.

mod file;
mod memory;

use std::future::Future;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Storage keys used by the client.
pub mod keys {
    /// Bearer token for the current session.
    pub const TOKEN: &str = "token";

    /// JSON snapshot of the cart, written by the sync worker.
    pub const CART: &str = "cart";

    /// JSON profile of the logged-in user.
    pub const USER: &str = "user";

    /// Id of an account that signed up but has not verified its email yet.
    pub const PENDING_USER: &str = "pendingUserId";
}

/// Errors that can occur when reading or writing local storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Key contains characters that cannot be used as a file name.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Async key/value store.
///
/// Methods return `Send` futures so implementations can be driven from the
/// background sync worker.
pub trait LocalStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get_item(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Keys map directly to file names, so only a conservative charset is allowed.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
