//! Key-value adapters (persistent and session).
//!
//! String-only maps cannot hold bytes, so the adapter stores a transient
//! resource locator under the name and resolves it on read. Locators only
//! live as long as the page context that minted them: after a full reload
//! the stored string may point nowhere and the read fails over.

use super::BackendAdapter;
use crate::capability::BackendCapability;
use crate::error::{StashError, StashResult};
use crate::host::{Host, KvScope};
use crate::payload::Payload;
use async_trait::async_trait;
use std::rc::Rc;

/// Adapter over one of the host's string-keyed maps.
pub struct KeyValueAdapter {
    host: Rc<dyn Host>,
    scope: KvScope,
}

impl KeyValueAdapter {
    /// Creates an adapter over the map for `scope`.
    pub fn new(host: Rc<dyn Host>, scope: KvScope) -> Self {
        Self { host, scope }
    }
}

#[async_trait(?Send)]
impl BackendAdapter for KeyValueAdapter {
    fn capability(&self) -> BackendCapability {
        self.scope.capability()
    }

    async fn write(&self, name: &str, payload: &Payload) -> StashResult<()> {
        let storage = self.host.key_value(self.scope)?;
        let locator = self.host.locators()?.mint(payload)?;
        storage.set_item(name, &locator)
    }

    async fn read(&self, name: &str) -> StashResult<Payload> {
        let storage = self.host.key_value(self.scope)?;
        match storage.get_item(name)? {
            Some(locator) if !locator.is_empty() => {
                self.host.locators()?.resolve(&locator).await
            }
            _ => Err(StashError::not_found(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{Fault, MemoryHost};
    use futures::executor::block_on;

    fn adapter(host: &MemoryHost, scope: KvScope) -> KeyValueAdapter {
        KeyValueAdapter::new(Rc::new(host.clone()), scope)
    }

    #[test]
    fn stores_locator_not_bytes() {
        let host = MemoryHost::new();
        let adapter = adapter(&host, KvScope::Persistent);

        block_on(adapter.write("doc", &Payload::from(vec![9u8; 64]))).unwrap();

        let stored = host.item(KvScope::Persistent, "doc").unwrap();
        assert!(stored.starts_with("blob:"));
        assert_eq!(block_on(adapter.read("doc")).unwrap().size(), 64);
    }

    #[test]
    fn scopes_are_separate() {
        let host = MemoryHost::new();
        block_on(adapter(&host, KvScope::Session).write("k", &Payload::from(vec![1u8]))).unwrap();

        assert!(host.item(KvScope::Session, "k").is_some());
        let err = block_on(adapter(&host, KvScope::Persistent).read("k")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn locator_expires_on_reload() {
        let host = MemoryHost::new();
        let adapter = adapter(&host, KvScope::Persistent);
        block_on(adapter.write("k", &Payload::from(vec![1u8]))).unwrap();

        host.reload();

        assert!(host.item(KvScope::Persistent, "k").is_some());
        let err = block_on(adapter.read("k")).unwrap_err();
        assert!(matches!(err, StashError::Locator { .. }));
    }

    #[test]
    fn empty_value_is_not_found() {
        let host = MemoryHost::new();
        host.set_item(KvScope::Session, "k", "");
        let err = block_on(adapter(&host, KvScope::Session).read("k")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn storage_error_propagates() {
        let host = MemoryHost::new();
        host.inject(BackendCapability::PersistentKv, Fault::Write);
        let err = block_on(adapter(&host, KvScope::Persistent).write("k", &Payload::from(vec![1u8])))
            .unwrap_err();
        assert!(matches!(err, StashError::QuotaExceeded { .. }));
    }
}
