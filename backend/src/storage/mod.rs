//! Durable key-value slots and remote batch collections
//!
//! The offline queue persists through a [`KeyValueStore`]; the remote
//! collection is reached through [`crate::services::batch_store::RemoteBatchStore`].

pub mod file;
pub mod memory;
pub mod postgres;
pub mod remote;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::PgBatchStore;
pub use remote::InMemoryBatchStore;

#[derive(Error, Debug)]
pub enum KvError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A durable string-keyed slot holding opaque bytes.
///
/// Every call observes the result of every earlier completed `set`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    /// Set a key-value pair, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), KvError>;
}
