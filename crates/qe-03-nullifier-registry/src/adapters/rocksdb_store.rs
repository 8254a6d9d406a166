//! # RocksDB Nullifier Store
//!
//! Each consumed nullifier is a key `nf/<32 bytes>` with an empty value.
//! Batches are written with a single `WriteBatch`, so a crash never leaves
//! part of a batch behind.

use crate::domain::StoreError;
use crate::ports::NullifierStore;
use rocksdb::{Options, WriteBatch, WriteOptions, DB};
use shared_types::Nullifier;
use std::path::PathBuf;

const KEY_PREFIX: &[u8] = b"nf/";

#[derive(Debug, Clone)]
pub struct RocksDbNullifierConfig {
    pub path: PathBuf,
    /// fsync after each batch (default: true for durability)
    pub sync_writes: bool,
}

impl RocksDbNullifierConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync_writes: true,
        }
    }

    /// Config for testing (no fsync)
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync_writes: false,
        }
    }
}

pub struct RocksDbNullifierStore {
    db: DB,
    config: RocksDbNullifierConfig,
    count: u64,
}

impl RocksDbNullifierStore {
    /// Open or create the store and count existing entries.
    pub fn open(config: RocksDbNullifierConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &config.path).map_err(|e| StoreError::Io {
            message: format!("Failed to open RocksDB: {}", e),
        })?;

        let mut count = 0u64;
        for item in db.prefix_iterator(KEY_PREFIX) {
            let (key, _) = item.map_err(|e| StoreError::Io {
                message: format!("RocksDB scan failed: {}", e),
            })?;
            if !key.starts_with(KEY_PREFIX) {
                break;
            }
            if key.len() != KEY_PREFIX.len() + 32 {
                return Err(StoreError::Corrupted {
                    message: format!("unexpected key length {}", key.len()),
                });
            }
            count += 1;
        }

        Ok(Self { db, config, count })
    }

    fn key(nullifier: &Nullifier) -> Vec<u8> {
        let mut key = Vec::with_capacity(KEY_PREFIX.len() + 32);
        key.extend_from_slice(KEY_PREFIX);
        key.extend_from_slice(nullifier.as_bytes());
        key
    }
}

impl NullifierStore for RocksDbNullifierStore {
    fn contains(&self, nullifier: &Nullifier) -> Result<bool, StoreError> {
        self.db
            .get_pinned(Self::key(nullifier))
            .map(|v| v.is_some())
            .map_err(|e| StoreError::Io {
                message: format!("RocksDB get failed: {}", e),
            })
    }

    fn insert_batch(&mut self, nullifiers: &[Nullifier]) -> Result<(), StoreError> {
        let mut batch = WriteBatch::default();
        for nullifier in nullifiers {
            batch.put(Self::key(nullifier), b"");
        }

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);

        self.db
            .write_opt(batch, &write_opts)
            .map_err(|e| StoreError::Io {
                message: format!("RocksDB batch write failed: {}", e),
            })?;
        self.count += nullifiers.len() as u64;
        Ok(())
    }

    fn len(&self) -> Result<u64, StoreError> {
        Ok(self.count)
    }
}
