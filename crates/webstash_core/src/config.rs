//! Gateway configuration.

use crate::capability::{BackendCapability, CapabilityMap};
use crate::sink::DiagnosticSink;
use std::rc::Rc;

/// Smallest quota requested from the file-handle backend (1 MiB).
pub const DEFAULT_MIN_FILE_QUOTA: u64 = 1024 * 1024;

/// Configuration for constructing a [`crate::StorageGateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Whether to use the file-handle backend.
    pub want_file_handle: bool,

    /// Whether to use the indexed-record backend.
    pub want_indexed_record: bool,

    /// Whether to use the persistent key-value backend.
    pub want_persistent_kv: bool,

    /// Whether to use the session key-value backend.
    pub want_session_kv: bool,

    /// Whether to use the cookie backend.
    pub want_cookie: bool,

    /// Where recovered failures are reported. `None` means [`crate::TracingSink`].
    pub sink: Option<Rc<dyn DiagnosticSink>>,

    /// Floor for the file-handle quota request, in bytes.
    pub min_file_quota: u64,

    /// Name of the record store container.
    pub record_store_name: String,

    /// Schema version of the record store container.
    pub record_store_version: u32,

    /// Name of the record collection holding payloads.
    pub record_collection: String,

    /// Path attribute for cookies written by the cookie backend.
    pub cookie_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            want_file_handle: true,
            want_indexed_record: true,
            want_persistent_kv: true,
            want_session_kv: true,
            want_cookie: true,
            sink: None,
            min_file_quota: DEFAULT_MIN_FILE_QUOTA,
            record_store_name: "fileStorage".to_string(),
            record_store_version: 1,
            record_collection: "files".to_string(),
            cookie_path: "/".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that wants exactly `capability`.
    #[must_use]
    pub fn only(capability: BackendCapability) -> Self {
        Self::default().wanted(CapabilityMap::only(capability))
    }

    /// Sets whether to use the file-handle backend.
    #[must_use]
    pub fn want_file_handle(mut self, value: bool) -> Self {
        self.want_file_handle = value;
        self
    }

    /// Sets whether to use the indexed-record backend.
    #[must_use]
    pub fn want_indexed_record(mut self, value: bool) -> Self {
        self.want_indexed_record = value;
        self
    }

    /// Sets whether to use the persistent key-value backend.
    #[must_use]
    pub fn want_persistent_kv(mut self, value: bool) -> Self {
        self.want_persistent_kv = value;
        self
    }

    /// Sets whether to use the session key-value backend.
    #[must_use]
    pub fn want_session_kv(mut self, value: bool) -> Self {
        self.want_session_kv = value;
        self
    }

    /// Sets whether to use the cookie backend.
    #[must_use]
    pub fn want_cookie(mut self, value: bool) -> Self {
        self.want_cookie = value;
        self
    }

    /// Sets every `want_*` flag from `wanted`.
    #[must_use]
    pub fn wanted(mut self, wanted: CapabilityMap) -> Self {
        self.want_file_handle = wanted.get(BackendCapability::FileHandle);
        self.want_indexed_record = wanted.get(BackendCapability::IndexedRecord);
        self.want_persistent_kv = wanted.get(BackendCapability::PersistentKv);
        self.want_session_kv = wanted.get(BackendCapability::SessionKv);
        self.want_cookie = wanted.get(BackendCapability::Cookie);
        self
    }

    /// Sets the diagnostic sink.
    #[must_use]
    pub fn sink(mut self, sink: Rc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets the floor for file-handle quota requests.
    #[must_use]
    pub fn min_file_quota(mut self, bytes: u64) -> Self {
        self.min_file_quota = bytes;
        self
    }

    /// Sets the record store name and version.
    #[must_use]
    pub fn record_store(mut self, name: impl Into<String>, version: u32) -> Self {
        self.record_store_name = name.into();
        self.record_store_version = version;
        self
    }

    /// Sets the record collection name.
    #[must_use]
    pub fn record_collection(mut self, name: impl Into<String>) -> Self {
        self.record_collection = name.into();
        self
    }

    /// Sets the cookie path attribute.
    #[must_use]
    pub fn cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    /// Returns the `want_*` flags as a map.
    #[must_use]
    pub fn wanted_map(&self) -> CapabilityMap {
        CapabilityMap::none()
            .with(BackendCapability::FileHandle, self.want_file_handle)
            .with(BackendCapability::IndexedRecord, self.want_indexed_record)
            .with(BackendCapability::PersistentKv, self.want_persistent_kv)
            .with(BackendCapability::SessionKv, self.want_session_kv)
            .with(BackendCapability::Cookie, self.want_cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.wanted_map(), CapabilityMap::all());
        assert_eq!(config.min_file_quota, 1024 * 1024);
        assert_eq!(config.record_store_name, "fileStorage");
        assert_eq!(config.record_store_version, 1);
        assert_eq!(config.record_collection, "files");
        assert_eq!(config.cookie_path, "/");
        assert!(config.sink.is_none());
    }

    #[test]
    fn builder_pattern() {
        let config = GatewayConfig::new()
            .want_file_handle(false)
            .want_indexed_record(false)
            .min_file_quota(4096);

        let wanted = config.wanted_map();
        assert!(!wanted.get(BackendCapability::FileHandle));
        assert!(!wanted.get(BackendCapability::IndexedRecord));
        assert!(wanted.get(BackendCapability::PersistentKv));
        assert_eq!(config.min_file_quota, 4096);
    }

    #[test]
    fn only_wants_one_backend() {
        let config = GatewayConfig::only(BackendCapability::SessionKv);
        assert_eq!(
            config.wanted_map().iter().collect::<Vec<_>>(),
            vec![BackendCapability::SessionKv]
        );
    }
}
