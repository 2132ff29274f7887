//! Capability detection.

use crate::capability::{BackendCapability, CapabilityMap};

/// Entry points of the file-handle API. Either one counts.
const FILE_SYSTEM_ENTRY_POINTS: [&str; 2] = ["requestFileSystem", "webkitRequestFileSystem"];

/// Quota-type constants the file-handle API must expose alongside its entry point.
const FILE_SYSTEM_QUOTA_TYPES: [&str; 2] = ["TEMPORARY", "PERSISTENT"];

const INDEXED_DB: &str = "indexedDB";
const LOCAL_STORAGE: &str = "localStorage";
const SESSION_STORAGE: &str = "sessionStorage";

/// The introspectable surface of a host's global object.
pub trait HostProbe {
    /// Returns true if the global object exposes a property called `name`.
    fn has_property(&self, name: &str) -> bool;

    /// Returns the host's "cookies enabled" signal.
    fn cookies_enabled(&self) -> bool;
}

/// Computes which backends the host supports.
///
/// Absent features yield `false`; probing never fails.
pub fn detect<P: HostProbe + ?Sized>(host: &P) -> CapabilityMap {
    let mut support = CapabilityMap::none();

    let file_system = FILE_SYSTEM_ENTRY_POINTS
        .iter()
        .any(|name| host.has_property(name))
        && FILE_SYSTEM_QUOTA_TYPES
            .iter()
            .all(|name| host.has_property(name));

    support.set(BackendCapability::FileHandle, file_system);
    support.set(BackendCapability::IndexedRecord, host.has_property(INDEXED_DB));
    support.set(BackendCapability::PersistentKv, host.has_property(LOCAL_STORAGE));
    support.set(BackendCapability::SessionKv, host.has_property(SESSION_STORAGE));
    support.set(BackendCapability::Cookie, host.cookies_enabled());

    tracing::debug!(?support, "probed host capabilities");
    support
}
