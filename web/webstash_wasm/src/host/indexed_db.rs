//! IndexedDB record stores.
//!
//! Payloads are stored as `Blob` values keyed by name. The object store is
//! created in the `upgradeneeded` step of the first open, never afterwards.

use crate::blob::{blob_to_payload, payload_to_blob};
use crate::bridge::{request_done, transaction_done};
use crate::error::{describe, js_error};
use async_trait::async_trait;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Blob, IdbDatabase, IdbFactory, IdbObjectStore, IdbTransaction, IdbTransactionMode,
    IdbVersionChangeEvent,
};
use webstash_core::host::{
    RecordDatabase, RecordSchema, RecordStoreApi, RecordTransaction, SchemaUpgrade,
    TransactionMode,
};
use webstash_core::{Payload, StashError, StashResult};

/// The `indexedDB` factory.
pub(crate) struct WebRecordStore {
    factory: IdbFactory,
}

impl WebRecordStore {
    pub(crate) fn new(factory: IdbFactory) -> Self {
        Self { factory }
    }
}

#[async_trait(?Send)]
impl RecordStoreApi for WebRecordStore {
    async fn open(
        &self,
        name: &str,
        version: u32,
        schema: &RecordSchema,
    ) -> StashResult<Box<dyn RecordDatabase>> {
        let request = self.factory.open_with_u32(name, version).map_err(js_error)?;
        let failure = Rc::new(RefCell::new(None));

        let on_upgrade = {
            let request = request.clone();
            let schema = schema.clone();
            let failure = Rc::clone(&failure);
            Closure::<dyn FnMut(IdbVersionChangeEvent)>::new(move |_: IdbVersionChangeEvent| {
                let Ok(result) = request.result() else {
                    return;
                };
                let db: IdbDatabase = result.unchecked_into();
                if !apply_schema(&db, &schema, &failure) {
                    if let Some(transaction) = request.transaction() {
                        let _ = transaction.abort();
                    }
                }
            })
        };
        request.set_onupgradeneeded(Some(on_upgrade.as_ref().unchecked_ref()));

        let opened = request_done(&request).await;
        request.set_onupgradeneeded(None);

        // The aborted upgrade only surfaces as AbortError; report its cause.
        if let Some(err) = failure.borrow_mut().take() {
            return Err(err);
        }
        let db = opened?
            .dyn_into::<IdbDatabase>()
            .map_err(|_| StashError::Contract("open did not yield a database".to_string()))?;
        Ok(Box::new(WebRecordDatabase { db }))
    }
}

/// Applies `schema` to `db`, keeping the first failure in `failure`.
/// Returns false if the upgrade has to be aborted.
fn apply_schema(
    db: &IdbDatabase,
    schema: &RecordSchema,
    failure: &RefCell<Option<StashError>>,
) -> bool {
    match schema.apply(&mut SchemaStep { db }) {
        Ok(()) => true,
        Err(err) => {
            failure.borrow_mut().get_or_insert(err);
            false
        }
    }
}

/// Schema access during `upgradeneeded`.
struct SchemaStep<'a> {
    db: &'a IdbDatabase,
}

impl SchemaUpgrade for SchemaStep<'_> {
    fn has_collection(&self, name: &str) -> bool {
        self.db.object_store_names().contains(name)
    }

    fn create_collection(&mut self, name: &str) -> StashResult<()> {
        self.db
            .create_object_store(name)
            .map(drop)
            .map_err(js_error)
    }
}

/// An open connection, closed when dropped.
struct WebRecordDatabase {
    db: IdbDatabase,
}

impl Drop for WebRecordDatabase {
    fn drop(&mut self) {
        // Pending transactions still run to completion after close().
        self.db.close();
    }
}

fn transaction_error(err: JsValue) -> StashError {
    StashError::Transaction(describe(&err))
}

impl RecordDatabase for WebRecordDatabase {
    fn transaction(
        &self,
        collection: &str,
        mode: TransactionMode,
    ) -> StashResult<Box<dyn RecordTransaction>> {
        let mode = match mode {
            TransactionMode::ReadOnly => IdbTransactionMode::Readonly,
            TransactionMode::ReadWrite => IdbTransactionMode::Readwrite,
        };
        let transaction = self
            .db
            .transaction_with_str_and_mode(collection, mode)
            .map_err(transaction_error)?;
        let store = transaction
            .object_store(collection)
            .map_err(transaction_error)?;

        Ok(Box::new(WebRecordTransaction { transaction, store }))
    }
}

/// A transaction over one object store.
struct WebRecordTransaction {
    transaction: IdbTransaction,
    store: IdbObjectStore,
}

#[async_trait(?Send)]
impl RecordTransaction for WebRecordTransaction {
    async fn put(&self, key: &str, payload: &Payload) -> StashResult<()> {
        let blob = payload_to_blob(payload)?;
        self.store
            .put_with_key(&blob, &JsValue::from_str(key))
            .map_err(transaction_error)?;

        // A failed put aborts the transaction, so commit covers both.
        transaction_done(&self.transaction).await
    }

    async fn get(&self, key: &str) -> StashResult<Option<Payload>> {
        let request = self
            .store
            .get(&JsValue::from_str(key))
            .map_err(transaction_error)?;
        let value = request_done(&request).await?;
        if value.is_undefined() {
            return Ok(None);
        }

        let blob: Blob = value
            .dyn_into()
            .map_err(|_| StashError::Contract(format!("record {key} is not a Blob")))?;
        blob_to_payload(&blob).await.map(Some)
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn schema_failure_is_kept_for_the_caller() {
        let factory = web_sys::window()
            .and_then(|window| window.indexed_db().ok().flatten())
            .expect("indexedDB");
        let request = factory
            .open_with_u32("webstash-schema-test", 1)
            .expect("open");
        let db: IdbDatabase = request_done(&request).await.expect("opened").unchecked_into();
        let failure = RefCell::new(None);

        // Outside a version change createObjectStore throws.
        assert!(!apply_schema(&db, &RecordSchema::new(["late"]), &failure));
        assert!(matches!(
            failure.borrow().as_ref(),
            Some(StashError::Host(message)) if message.contains("InvalidStateError")
        ));
        db.close();
    }
}
