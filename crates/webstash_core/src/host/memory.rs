//! In-memory host.
//!
//! Implements every host surface in memory. Useful for:
//! - Unit and scenario tests (fault injection, call counting)
//! - Running the gateway outside a browser
//!
//! # Example
//!
//! ```rust
//! use webstash_core::{BackendCapability, MemoryHost};
//!
//! let host = MemoryHost::new().without_capability(BackendCapability::FileHandle);
//! assert_eq!(host.calls(BackendCapability::IndexedRecord), 0);
//! ```

use super::{
    CookieJar, DirectoryEntry, FileArea, FileEntry, FileSystemApi, FileWriter, Host,
    KeyValueStorage, KvScope, LocatorRegistry, RecordDatabase, RecordSchema, RecordStoreApi,
    RecordTransaction, SchemaUpgrade, TransactionMode, WriteEvent,
};
use crate::capability::BackendCapability;
use crate::detect::HostProbe;
use crate::error::{StashError, StashResult};
use crate::payload::Payload;
use async_trait::async_trait;
use futures::stream::{self, LocalBoxStream, StreamExt};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Largest `name=value` pair the cookie jar accepts, in bytes.
pub const MAX_COOKIE_BYTES: usize = 4096;

/// Default quota the file area grants (64 MiB).
pub const DEFAULT_FILE_QUOTA: u64 = 64 * 1024 * 1024;

const DEFAULT_PROPERTIES: [&str; 6] = [
    "requestFileSystem",
    "TEMPORARY",
    "PERSISTENT",
    "indexedDB",
    "localStorage",
    "sessionStorage",
];

/// A failure to inject into one capability's surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fault {
    /// Acquiring the surface fails (storage blocked).
    Access,
    /// Writes fail (writer error, aborted transaction, quota exceeded).
    Write,
    /// Reads fail.
    Read,
    /// File writers report progress but never signal completion or error.
    SilentWrite,
}

#[derive(Debug, Clone)]
enum FileNode {
    File(Payload),
    Directory,
}

#[derive(Debug, Default)]
struct DatabaseState {
    version: u32,
    upgrades: u32,
    collections: HashMap<String, HashMap<String, Payload>>,
}

#[derive(Debug, Clone)]
struct Cookie {
    name: String,
    value: String,
    path: Option<String>,
}

#[derive(Debug)]
struct Inner {
    properties: HashSet<String>,
    cookies_enabled: bool,
    file_quota: u64,
    last_quota: Option<u64>,
    files: HashMap<String, FileNode>,
    databases: HashMap<String, DatabaseState>,
    items: HashMap<KvScope, HashMap<String, String>>,
    cookies: Vec<Cookie>,
    locators: HashMap<String, Payload>,
    next_locator: u64,
    faults: HashSet<(BackendCapability, Fault)>,
    calls: HashMap<BackendCapability, usize>,
}

impl Inner {
    fn faulted(&self, capability: BackendCapability, fault: Fault) -> bool {
        self.faults.contains(&(capability, fault))
    }
}

/// A host whose storage surfaces all live in memory.
///
/// Cloning yields another handle to the same state.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    inner: Rc<RefCell<Inner>>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// Creates a host supporting all five backends.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                properties: DEFAULT_PROPERTIES.iter().map(|p| p.to_string()).collect(),
                cookies_enabled: true,
                file_quota: DEFAULT_FILE_QUOTA,
                last_quota: None,
                files: HashMap::new(),
                databases: HashMap::new(),
                items: HashMap::new(),
                cookies: Vec::new(),
                locators: HashMap::new(),
                next_locator: 0,
                faults: HashSet::new(),
                calls: HashMap::new(),
            })),
        }
    }

    /// Creates a host supporting nothing.
    #[must_use]
    pub fn bare() -> Self {
        let host = Self::new();
        {
            let mut inner = host.inner.borrow_mut();
            inner.properties.clear();
            inner.cookies_enabled = false;
        }
        host
    }

    /// Exposes the global property `name`.
    #[must_use]
    pub fn with_property(self, name: &str) -> Self {
        self.inner.borrow_mut().properties.insert(name.to_string());
        self
    }

    /// Hides the global property `name`.
    #[must_use]
    pub fn without_property(self, name: &str) -> Self {
        self.inner.borrow_mut().properties.remove(name);
        self
    }

    /// Hides everything the detector looks for to find `capability`.
    #[must_use]
    pub fn without_capability(self, capability: BackendCapability) -> Self {
        match capability {
            BackendCapability::FileHandle => self
                .without_property("requestFileSystem")
                .without_property("webkitRequestFileSystem"),
            BackendCapability::IndexedRecord => self.without_property("indexedDB"),
            BackendCapability::PersistentKv => self.without_property("localStorage"),
            BackendCapability::SessionKv => self.without_property("sessionStorage"),
            BackendCapability::Cookie => self.with_cookies_enabled(false),
        }
    }

    /// Sets the "cookies enabled" signal.
    #[must_use]
    pub fn with_cookies_enabled(self, enabled: bool) -> Self {
        self.inner.borrow_mut().cookies_enabled = enabled;
        self
    }

    /// Sets the largest quota the file area grants.
    #[must_use]
    pub fn with_file_quota(self, bytes: u64) -> Self {
        self.inner.borrow_mut().file_quota = bytes;
        self
    }

    /// Injects `fault` into `capability` until [`MemoryHost::clear_faults`].
    pub fn inject(&self, capability: BackendCapability, fault: Fault) {
        self.inner.borrow_mut().faults.insert((capability, fault));
    }

    /// Removes every injected fault.
    pub fn clear_faults(&self) {
        self.inner.borrow_mut().faults.clear();
    }

    /// Number of times the surface for `capability` was acquired.
    #[must_use]
    pub fn calls(&self, capability: BackendCapability) -> usize {
        self.inner.borrow().calls.get(&capability).copied().unwrap_or(0)
    }

    /// Total surface acquisitions across all capabilities.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.inner.borrow().calls.values().sum()
    }

    /// The quota passed to the most recent file area request.
    #[must_use]
    pub fn last_quota_request(&self) -> Option<u64> {
        self.inner.borrow().last_quota
    }

    /// Creates a directory named `name` in the file area root.
    pub fn add_directory(&self, name: &str) {
        self.inner
            .borrow_mut()
            .files
            .insert(name.to_string(), FileNode::Directory);
    }

    /// Number of version-change steps the record store `name` went through.
    #[must_use]
    pub fn record_upgrades(&self, name: &str) -> u32 {
        self.inner
            .borrow()
            .databases
            .get(name)
            .map_or(0, |db| db.upgrades)
    }

    /// Returns the raw string stored under `key` in the `scope` map.
    #[must_use]
    pub fn item(&self, scope: KvScope, key: &str) -> Option<String> {
        self.inner
            .borrow()
            .items
            .get(&scope)
            .and_then(|map| map.get(key).cloned())
    }

    /// Stores a raw string under `key` in the `scope` map.
    pub fn set_item(&self, scope: KvScope, key: &str, value: &str) {
        self.inner
            .borrow_mut()
            .items
            .entry(scope)
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Returns the path attribute of cookie `name`.
    #[must_use]
    pub fn cookie_path(&self, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .cookies
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| c.path.clone())
    }

    /// Simulates a full page reload: every outstanding locator expires.
    ///
    /// Persistent surfaces (files, records, maps, cookies) survive.
    pub fn reload(&self) {
        self.inner.borrow_mut().locators.clear();
    }

    fn acquire(&self, capability: BackendCapability, property: Option<&str>) -> StashResult<()> {
        let mut inner = self.inner.borrow_mut();
        *inner.calls.entry(capability).or_insert(0) += 1;

        if inner.faulted(capability, Fault::Access) {
            return Err(StashError::Unavailable(format!(
                "access to {capability} denied"
            )));
        }
        if let Some(property) = property {
            if !inner.properties.contains(property) {
                return Err(StashError::Unavailable(format!("{property} is not defined")));
            }
        }
        Ok(())
    }
}

impl HostProbe for MemoryHost {
    fn has_property(&self, name: &str) -> bool {
        self.inner.borrow().properties.contains(name)
    }

    fn cookies_enabled(&self) -> bool {
        self.inner.borrow().cookies_enabled
    }
}

impl Host for MemoryHost {
    fn file_system(&self) -> StashResult<Rc<dyn FileSystemApi>> {
        self.acquire(BackendCapability::FileHandle, None)?;
        Ok(Rc::new(self.clone()))
    }

    fn record_store(&self) -> StashResult<Rc<dyn RecordStoreApi>> {
        self.acquire(BackendCapability::IndexedRecord, Some("indexedDB"))?;
        Ok(Rc::new(self.clone()))
    }

    fn key_value(&self, scope: KvScope) -> StashResult<Rc<dyn KeyValueStorage>> {
        let property = match scope {
            KvScope::Persistent => "localStorage",
            KvScope::Session => "sessionStorage",
        };
        self.acquire(scope.capability(), Some(property))?;
        Ok(Rc::new(MemoryKeyValue {
            host: self.clone(),
            scope,
        }))
    }

    fn cookies(&self) -> StashResult<Rc<dyn CookieJar>> {
        self.acquire(BackendCapability::Cookie, None)?;
        Ok(Rc::new(self.clone()))
    }

    fn locators(&self) -> StashResult<Rc<dyn LocatorRegistry>> {
        Ok(Rc::new(self.clone()))
    }
}

// ---------------------------------------------------------------------------
// File handles
// ---------------------------------------------------------------------------

#[async_trait(?Send)]
impl FileSystemApi for MemoryHost {
    async fn request_persistent(&self, quota: u64) -> StashResult<Rc<dyn FileArea>> {
        let mut inner = self.inner.borrow_mut();
        inner.last_quota = Some(quota);
        if quota > inner.file_quota {
            return Err(StashError::QuotaExceeded {
                requested: quota,
                available: inner.file_quota,
            });
        }
        Ok(Rc::new(self.clone()))
    }
}

#[async_trait(?Send)]
impl FileArea for MemoryHost {
    async fn get_entry(&self, name: &str, create: bool) -> StashResult<DirectoryEntry> {
        let mut inner = self.inner.borrow_mut();
        let is_directory = inner
            .files
            .get(name)
            .map(|node| matches!(node, FileNode::Directory));
        match is_directory {
            Some(true) => Ok(DirectoryEntry::Unsupported {
                kind: "directory".to_string(),
            }),
            Some(false) => Ok(self.file_entry(name)),
            None if create => {
                inner
                    .files
                    .insert(name.to_string(), FileNode::File(Payload::default()));
                Ok(self.file_entry(name))
            }
            None => Err(StashError::not_found(name)),
        }
    }
}

impl MemoryHost {
    fn file_entry(&self, name: &str) -> DirectoryEntry {
        DirectoryEntry::File(Box::new(MemoryFile {
            host: self.clone(),
            name: name.to_string(),
        }))
    }
}

struct MemoryFile {
    host: MemoryHost,
    name: String,
}

#[async_trait(?Send)]
impl FileEntry for MemoryFile {
    async fn create_writer(&self) -> StashResult<Box<dyn FileWriter>> {
        Ok(Box::new(MemoryFileWriter {
            host: self.host.clone(),
            name: self.name.clone(),
        }))
    }

    async fn file(&self) -> StashResult<Payload> {
        let inner = self.host.inner.borrow();
        if inner.faulted(BackendCapability::FileHandle, Fault::Read) {
            return Err(StashError::Host(format!("could not read {:?}", self.name)));
        }
        match inner.files.get(&self.name) {
            Some(FileNode::File(payload)) => Ok(payload.clone()),
            _ => Err(StashError::not_found(&self.name)),
        }
    }
}

struct MemoryFileWriter {
    host: MemoryHost,
    name: String,
}

impl FileWriter for MemoryFileWriter {
    fn write(&mut self, payload: Payload) -> LocalBoxStream<'_, WriteEvent> {
        let mut inner = self.host.inner.borrow_mut();
        let events = if inner.faulted(BackendCapability::FileHandle, Fault::SilentWrite) {
            vec![WriteEvent::Progress { written: 0 }]
        } else if inner.faulted(BackendCapability::FileHandle, Fault::Write) {
            vec![
                WriteEvent::Progress { written: 0 },
                WriteEvent::Error(StashError::Host(format!(
                    "write to {:?} failed",
                    self.name
                ))),
            ]
        } else {
            let written = payload.size();
            inner
                .files
                .insert(self.name.clone(), FileNode::File(payload));
            vec![WriteEvent::Progress { written }, WriteEvent::WriteEnd]
        };
        stream::iter(events).boxed_local()
    }
}

// ---------------------------------------------------------------------------
// Record store
// ---------------------------------------------------------------------------

struct MemoryUpgrade<'a> {
    collections: &'a mut HashMap<String, HashMap<String, Payload>>,
}

impl SchemaUpgrade for MemoryUpgrade<'_> {
    fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    fn create_collection(&mut self, name: &str) -> StashResult<()> {
        self.collections.insert(name.to_string(), HashMap::new());
        Ok(())
    }
}

#[async_trait(?Send)]
impl RecordStoreApi for MemoryHost {
    async fn open(
        &self,
        name: &str,
        version: u32,
        schema: &RecordSchema,
    ) -> StashResult<Box<dyn RecordDatabase>> {
        let mut inner = self.inner.borrow_mut();
        let db = inner.databases.entry(name.to_string()).or_default();

        if db.version > version {
            return Err(StashError::Version {
                name: name.to_string(),
                existing: db.version,
                requested: version,
            });
        }
        if db.version < version {
            schema.apply(&mut MemoryUpgrade {
                collections: &mut db.collections,
            })?;
            db.version = version;
            db.upgrades += 1;
        }

        Ok(Box::new(MemoryRecordDatabase {
            host: self.clone(),
            name: name.to_string(),
        }))
    }
}

struct MemoryRecordDatabase {
    host: MemoryHost,
    name: String,
}

impl RecordDatabase for MemoryRecordDatabase {
    fn transaction(
        &self,
        collection: &str,
        mode: TransactionMode,
    ) -> StashResult<Box<dyn RecordTransaction>> {
        let inner = self.host.inner.borrow();
        let exists = inner
            .databases
            .get(&self.name)
            .is_some_and(|db| db.collections.contains_key(collection));
        if !exists {
            return Err(StashError::Transaction(format!(
                "no collection {collection:?} in {:?}",
                self.name
            )));
        }

        Ok(Box::new(MemoryTransaction {
            host: self.host.clone(),
            database: self.name.clone(),
            collection: collection.to_string(),
            mode,
        }))
    }
}

struct MemoryTransaction {
    host: MemoryHost,
    database: String,
    collection: String,
    mode: TransactionMode,
}

#[async_trait(?Send)]
impl RecordTransaction for MemoryTransaction {
    async fn put(&self, key: &str, payload: &Payload) -> StashResult<()> {
        if self.mode == TransactionMode::ReadOnly {
            return Err(StashError::Transaction(
                "put in a read-only transaction".to_string(),
            ));
        }

        let mut inner = self.host.inner.borrow_mut();
        if inner.faulted(BackendCapability::IndexedRecord, Fault::Write) {
            return Err(StashError::Transaction("transaction aborted".to_string()));
        }
        let records = inner
            .databases
            .get_mut(&self.database)
            .and_then(|db| db.collections.get_mut(&self.collection))
            .ok_or_else(|| StashError::Transaction("collection was deleted".to_string()))?;
        records.insert(key.to_string(), payload.clone());
        Ok(())
    }

    async fn get(&self, key: &str) -> StashResult<Option<Payload>> {
        let inner = self.host.inner.borrow();
        if inner.faulted(BackendCapability::IndexedRecord, Fault::Read) {
            return Err(StashError::Transaction("transaction aborted".to_string()));
        }
        Ok(inner
            .databases
            .get(&self.database)
            .and_then(|db| db.collections.get(&self.collection))
            .and_then(|records| records.get(key).cloned()))
    }
}

// ---------------------------------------------------------------------------
// String-keyed surfaces
// ---------------------------------------------------------------------------

struct MemoryKeyValue {
    host: MemoryHost,
    scope: KvScope,
}

impl KeyValueStorage for MemoryKeyValue {
    fn get_item(&self, key: &str) -> StashResult<Option<String>> {
        if self
            .host
            .inner
            .borrow()
            .faulted(self.scope.capability(), Fault::Read)
        {
            return Err(StashError::Host(format!("getItem({key:?}) failed")));
        }
        Ok(self.host.item(self.scope, key))
    }

    fn set_item(&self, key: &str, value: &str) -> StashResult<()> {
        if self
            .host
            .inner
            .borrow()
            .faulted(self.scope.capability(), Fault::Write)
        {
            return Err(StashError::QuotaExceeded {
                requested: (key.len() + value.len()) as u64,
                available: 0,
            });
        }
        self.host.set_item(self.scope, key, value);
        Ok(())
    }
}

impl CookieJar for MemoryHost {
    fn cookie_string(&self) -> StashResult<String> {
        let inner = self.inner.borrow();
        if inner.faulted(BackendCapability::Cookie, Fault::Read) {
            return Err(StashError::Host("document.cookie unreadable".to_string()));
        }
        let pairs: Vec<String> = inner
            .cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        Ok(pairs.join("; "))
    }

    fn set_cookie(&self, assignment: &str) -> StashResult<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.faulted(BackendCapability::Cookie, Fault::Write) {
            return Err(StashError::Host("cookie rejected".to_string()));
        }

        let mut parts = assignment.split(';');
        let pair = parts.next().unwrap_or_default();
        if pair.len() > MAX_COOKIE_BYTES {
            return Err(StashError::Host(format!(
                "cookie exceeds {MAX_COOKIE_BYTES} bytes"
            )));
        }
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| StashError::Host(format!("malformed cookie {pair:?}")))?;
        let path = parts
            .filter_map(|attr| attr.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("path"))
            .map(|(_, value)| value.trim().to_string());

        let cookie = Cookie {
            name: name.trim().to_string(),
            value: value.to_string(),
            path,
        };
        match inner.cookies.iter_mut().find(|c| c.name == cookie.name) {
            Some(existing) => *existing = cookie,
            None => inner.cookies.push(cookie),
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl LocatorRegistry for MemoryHost {
    fn mint(&self, payload: &Payload) -> StashResult<String> {
        let mut inner = self.inner.borrow_mut();
        let locator = format!("blob:memory/{}", inner.next_locator);
        inner.next_locator += 1;
        inner.locators.insert(locator.clone(), payload.clone());
        Ok(locator)
    }

    async fn resolve(&self, locator: &str) -> StashResult<Payload> {
        self.inner
            .borrow()
            .locators
            .get(locator)
            .cloned()
            .ok_or_else(|| StashError::Locator {
                locator: locator.to_string(),
                reason: "not registered in this page context".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::detect;
    use crate::CapabilityMap;
    use futures::executor::block_on;

    #[test]
    fn new_host_supports_everything() {
        assert_eq!(detect(&MemoryHost::new()), CapabilityMap::all());
        assert!(detect(&MemoryHost::bare()).is_empty());
    }

    #[test]
    fn without_capability_hides_probe() {
        let host = MemoryHost::new()
            .without_capability(BackendCapability::FileHandle)
            .without_capability(BackendCapability::Cookie);
        let support = detect(&host);
        assert!(!support.get(BackendCapability::FileHandle));
        assert!(!support.get(BackendCapability::Cookie));
        assert!(support.get(BackendCapability::IndexedRecord));
    }

    #[test]
    fn cookie_jar_replaces_by_name() {
        let host = MemoryHost::new();
        host.set_cookie("a=1;path=/").unwrap();
        host.set_cookie("b=2").unwrap();
        host.set_cookie("a=3;path=/docs").unwrap();

        assert_eq!(host.cookie_string().unwrap(), "a=3; b=2");
        assert_eq!(host.cookie_path("a").as_deref(), Some("/docs"));
        assert_eq!(host.cookie_path("b"), None);
    }

    #[test]
    fn cookie_jar_enforces_size_ceiling() {
        let host = MemoryHost::new();
        let big = format!("k={}", "x".repeat(MAX_COOKIE_BYTES));
        assert!(host.set_cookie(&big).is_err());
        assert!(host.set_cookie("no-equals").is_err());
    }

    #[test]
    fn locators_expire_on_reload() {
        let host = MemoryHost::new();
        let first = host.mint(&Payload::from(vec![1u8])).unwrap();
        assert!(block_on(host.resolve(&first)).is_ok());

        host.reload();
        assert!(block_on(host.resolve(&first)).is_err());

        let second = host.mint(&Payload::from(vec![2u8])).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn access_fault_is_counted() {
        let host = MemoryHost::new();
        host.inject(BackendCapability::SessionKv, Fault::Access);

        assert!(host.key_value(KvScope::Session).is_err());
        assert!(host.key_value(KvScope::Persistent).is_ok());
        assert_eq!(host.calls(BackendCapability::SessionKv), 1);
        assert_eq!(host.total_calls(), 2);

        host.clear_faults();
        assert!(host.key_value(KvScope::Session).is_ok());
    }

    #[test]
    fn clones_share_one_store() {
        let host = MemoryHost::new();
        let page = host.clone();
        let storage = page.key_value(KvScope::Persistent).unwrap();

        storage.set_item("k", "v").unwrap();
        assert_eq!(host.item(KvScope::Persistent, "k").as_deref(), Some("v"));
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));

        host.inject(BackendCapability::PersistentKv, Fault::Read);
        assert!(storage.get_item("k").is_err());
        host.inject(BackendCapability::PersistentKv, Fault::Write);
        assert!(matches!(
            storage.set_item("k", "w"),
            Err(StashError::QuotaExceeded { .. })
        ));
        assert_eq!(page.item(KvScope::Persistent, "k").as_deref(), Some("v"));
    }
}
