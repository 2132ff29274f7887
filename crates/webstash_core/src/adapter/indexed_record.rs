//! Indexed-record adapter.
//!
//! Stores payloads in a single collection of a versioned record store,
//! keyed by name. The collection is created lazily in the store's upgrade
//! step the first time the store is opened at this version.
//!
//! Every call opens its own connection and transaction.

use super::BackendAdapter;
use crate::capability::BackendCapability;
use crate::error::{StashError, StashResult};
use crate::host::{Host, RecordDatabase, RecordSchema, TransactionMode};
use crate::payload::Payload;
use async_trait::async_trait;
use std::rc::Rc;

/// Adapter over the host's record store.
pub struct IndexedRecordAdapter {
    host: Rc<dyn Host>,
    store_name: String,
    version: u32,
    collection: String,
    schema: RecordSchema,
}

impl IndexedRecordAdapter {
    /// Creates an adapter storing into `collection` of `store_name` at `version`.
    pub fn new(host: Rc<dyn Host>, store_name: String, version: u32, collection: String) -> Self {
        let schema = RecordSchema::new([collection.clone()]);
        Self {
            host,
            store_name,
            version,
            collection,
            schema,
        }
    }

    async fn open(&self) -> StashResult<Box<dyn RecordDatabase>> {
        self.host
            .record_store()?
            .open(&self.store_name, self.version, &self.schema)
            .await
    }
}

#[async_trait(?Send)]
impl BackendAdapter for IndexedRecordAdapter {
    fn capability(&self) -> BackendCapability {
        BackendCapability::IndexedRecord
    }

    async fn write(&self, name: &str, payload: &Payload) -> StashResult<()> {
        let db = self.open().await?;
        let tx = db.transaction(&self.collection, TransactionMode::ReadWrite)?;
        tx.put(name, payload).await
    }

    async fn read(&self, name: &str) -> StashResult<Payload> {
        let db = self.open().await?;
        let tx = db.transaction(&self.collection, TransactionMode::ReadOnly)?;
        tx.get(name)
            .await?
            .ok_or_else(|| StashError::not_found(name))
    }
}
