//! StateStore: redb-backed persistence for the charm's flags and config.
//!
//! Supports both on-disk and in-memory backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use exporter_core::ConfigMap;
use redb::{Database, ReadableDatabase};
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::Flags;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// State store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(FLAGS).map_err(map_err!(Table))?;
        txn.open_table(CONFIG).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Current flag set. A fresh store has every flag unset.
    pub fn flags(&self) -> StateResult<Flags> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(FLAGS).map_err(map_err!(Table))?;
        match table.get(FLAGS_KEY).map_err(map_err!(Read))? {
            Some(guard) => serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize)),
            None => Ok(Flags::default()),
        }
    }

    /// Config applied by the last committed pass, if any.
    pub fn applied_config(&self) -> StateResult<Option<ConfigMap>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(CONFIG).map_err(map_err!(Table))?;
        match table.get(APPLIED_CONFIG_KEY).map_err(map_err!(Read))? {
            Some(guard) => {
                let config: ConfigMap =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }

    /// Persist the outcome of a pass: flags and applied config in one transaction.
    pub fn commit(&self, flags: &Flags, config: &ConfigMap) -> StateResult<()> {
        let flags_value = serde_json::to_vec(flags).map_err(map_err!(Serialize))?;
        let config_value = serde_json::to_vec(config).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(FLAGS).map_err(map_err!(Table))?;
            table
                .insert(FLAGS_KEY, flags_value.as_slice())
                .map_err(map_err!(Write))?;
        }
        {
            let mut table = txn.open_table(CONFIG).map_err(map_err!(Table))?;
            table
                .insert(APPLIED_CONFIG_KEY, config_value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(flags = ?flags.active(), "state committed");
        Ok(())
    }
}
