//! Snapshot persistence
//!
//! Snapshots are stored as JSON under `"istanbul-snapshot" || block_hash`.

use alloy_primitives::B256;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{Snapshot, ValidatorSet, constants};

/// Error type returned by database backends
pub type DatabaseError = Box<dyn std::error::Error + Send + Sync>;

/// Snapshot store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No snapshot stored for this hash
    #[error("snapshot {0} not found")]
    NotFound(B256),

    /// Backend failure
    #[error("database error: {0}")]
    Database(DatabaseError),

    /// Stored record could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value backend for snapshots
pub trait SnapshotDatabase {
    /// Read a value, `None` if the key is absent
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, DatabaseError>;

    /// Write a value
    fn put(&self, key: &[u8], value: Vec<u8>) -> Result<(), DatabaseError>;
}

impl<T: SnapshotDatabase + ?Sized> SnapshotDatabase for &T {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, DatabaseError> {
        (**self).get(key)
    }

    fn put(&self, key: &[u8], value: Vec<u8>) -> Result<(), DatabaseError> {
        (**self).put(key, value)
    }
}

/// In-memory database
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    entries: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the database is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl SnapshotDatabase for MemoryDatabase {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, DatabaseError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: Vec<u8>) -> Result<(), DatabaseError> {
        self.entries.write().insert(key.to_vec(), value);
        Ok(())
    }
}

/// Database key of the snapshot at `hash`
pub fn snapshot_key(hash: &B256) -> Vec<u8> {
    let mut key = Vec::with_capacity(constants::SNAPSHOT_KEY_PREFIX.len() + hash.len());
    key.extend_from_slice(constants::SNAPSHOT_KEY_PREFIX);
    key.extend_from_slice(hash.as_slice());
    key
}

/// Loads and stores snapshots in a [`SnapshotDatabase`]
#[derive(Debug)]
pub struct SnapshotStore<DB> {
    db: DB,
}

impl<DB: SnapshotDatabase> SnapshotStore<DB> {
    /// Create a store over a database
    pub const fn new(db: DB) -> Self {
        Self { db }
    }

    /// The underlying database
    pub const fn db(&self) -> &DB {
        &self.db
    }

    /// Load the snapshot at `hash`.
    ///
    /// The stored epoch is replaced with `epoch`, the currently configured
    /// value.
    pub fn load<V: ValidatorSet>(&self, epoch: u64, hash: B256) -> Result<Snapshot<V>, StoreError> {
        let blob = self
            .db
            .get(&snapshot_key(&hash))
            .map_err(StoreError::Database)?
            .ok_or(StoreError::NotFound(hash))?;

        let snap: Snapshot<V> = serde_json::from_slice(&blob)?;
        trace!(target: "istanbul::store", number = snap.number(), %hash, "Loaded snapshot");
        Ok(snap.with_epoch(epoch))
    }

    /// Persist a snapshot under its block hash
    pub fn store<V: ValidatorSet>(&self, snap: &Snapshot<V>) -> Result<(), StoreError> {
        let blob = serde_json::to_vec(snap)?;
        self.db.put(&snapshot_key(&snap.hash()), blob).map_err(StoreError::Database)?;
        debug!(
            target: "istanbul::store",
            number = snap.number(),
            hash = %snap.hash(),
            "Stored voting snapshot"
        );
        Ok(())
    }
}
