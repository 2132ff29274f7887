//! Backend adapters.
//!
//! Each adapter translates the uniform `(name, payload)` contract onto one
//! native host surface. Adapters hold no open handles between calls: every
//! write or read acquires what it needs from the [`Host`] and releases it
//! when done.

mod cookie;
mod file_handle;
mod indexed_record;
mod key_value;

pub use cookie::CookieAdapter;
pub use file_handle::FileHandleAdapter;
pub use indexed_record::IndexedRecordAdapter;
pub use key_value::KeyValueAdapter;

use crate::capability::BackendCapability;
use crate::config::GatewayConfig;
use crate::error::StashResult;
use crate::host::{Host, KvScope};
use crate::payload::Payload;
use async_trait::async_trait;
use std::rc::Rc;

/// Uniform blob contract implemented by every backend.
///
/// # Invariants
///
/// - `write` returning `Ok` means the payload is stored under `name`
/// - `read` returns `Ok` only if it located data for `name`; "nothing
///   stored" is reported as [`crate::StashError::NotFound`]
#[async_trait(?Send)]
pub trait BackendAdapter {
    /// The capability this adapter implements.
    fn capability(&self) -> BackendCapability;

    /// Stores `payload` under `name`.
    async fn write(&self, name: &str, payload: &Payload) -> StashResult<()>;

    /// Retrieves the payload stored under `name`.
    async fn read(&self, name: &str) -> StashResult<Payload>;
}

/// Builds the adapter for `capability`.
pub fn build(
    capability: BackendCapability,
    host: Rc<dyn Host>,
    config: &GatewayConfig,
) -> Box<dyn BackendAdapter> {
    match capability {
        BackendCapability::FileHandle => {
            Box::new(FileHandleAdapter::new(host, config.min_file_quota))
        }
        BackendCapability::IndexedRecord => Box::new(IndexedRecordAdapter::new(
            host,
            config.record_store_name.clone(),
            config.record_store_version,
            config.record_collection.clone(),
        )),
        BackendCapability::PersistentKv => {
            Box::new(KeyValueAdapter::new(host, KvScope::Persistent))
        }
        BackendCapability::SessionKv => Box::new(KeyValueAdapter::new(host, KvScope::Session)),
        BackendCapability::Cookie => {
            Box::new(CookieAdapter::new(host, config.cookie_path.clone()))
        }
    }
}
