//! Host surfaces consumed by the backend adapters.
//!
//! A [`Host`] is the browser-like environment the gateway runs in. It
//! answers capability probes (via [`HostProbe`]) and hands out the native
//! storage surfaces that the adapters translate the blob contract onto:
//!
//! - [`FileSystemApi`] - sandboxed file area with entries and writers
//! - [`RecordStoreApi`] - versioned record store with transactions
//! - [`KeyValueStorage`] - string-only maps (persistent and session)
//! - [`CookieJar`] - the document cookie string
//! - [`LocatorRegistry`] - transient resource locators for in-memory payloads
//!
//! Surfaces are fetched per operation; a host may refuse access at any time
//! (for example when storage is blocked) and the adapter fails over.
//!
//! All async methods are `?Send`: hosts are single-threaded.

pub mod memory;

use crate::capability::BackendCapability;
use crate::detect::HostProbe;
use crate::error::StashResult;
use crate::payload::Payload;
use crate::StashError;
use async_trait::async_trait;
use futures::stream::LocalBoxStream;
use std::rc::Rc;

/// A browser-like host environment.
pub trait Host: HostProbe {
    /// Returns the file-handle API.
    fn file_system(&self) -> StashResult<Rc<dyn FileSystemApi>>;

    /// Returns the record store factory.
    fn record_store(&self) -> StashResult<Rc<dyn RecordStoreApi>>;

    /// Returns the string-keyed map for `scope`.
    fn key_value(&self, scope: KvScope) -> StashResult<Rc<dyn KeyValueStorage>>;

    /// Returns the cookie jar.
    fn cookies(&self) -> StashResult<Rc<dyn CookieJar>>;

    /// Returns the transient locator registry.
    fn locators(&self) -> StashResult<Rc<dyn LocatorRegistry>>;
}

/// Which string-keyed map a key-value backend targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KvScope {
    /// Survives the session (localStorage).
    Persistent,
    /// Cleared when the session ends (sessionStorage).
    Session,
}

impl KvScope {
    /// The capability backed by this scope.
    #[must_use]
    pub const fn capability(self) -> BackendCapability {
        match self {
            KvScope::Persistent => BackendCapability::PersistentKv,
            KvScope::Session => BackendCapability::SessionKv,
        }
    }
}

// ---------------------------------------------------------------------------
// File handles
// ---------------------------------------------------------------------------

/// Entry point of the file-handle API.
#[async_trait(?Send)]
pub trait FileSystemApi {
    /// Requests a persistent file area of at least `quota` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StashError::QuotaExceeded`] if the host denies the quota.
    async fn request_persistent(&self, quota: u64) -> StashResult<Rc<dyn FileArea>>;
}

/// The root directory of a granted file area.
#[async_trait(?Send)]
pub trait FileArea {
    /// Looks up `name` in the root directory, creating a file if `create`
    /// is set and nothing exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`StashError::NotFound`] if `create` is unset and the entry
    /// does not exist.
    async fn get_entry(&self, name: &str, create: bool) -> StashResult<DirectoryEntry>;
}

/// An entry returned by [`FileArea::get_entry`].
pub enum DirectoryEntry {
    /// A file offering a writer and a reader.
    File(Box<dyn FileEntry>),
    /// Anything else (a directory, or a file object missing its
    /// reader/writer operations).
    Unsupported {
        /// What the host reported the entry as.
        kind: String,
    },
}

/// A file entry.
#[async_trait(?Send)]
pub trait FileEntry {
    /// Obtains a writer that replaces the file contents.
    async fn create_writer(&self) -> StashResult<Box<dyn FileWriter>>;

    /// Materialises the file contents.
    async fn file(&self) -> StashResult<Payload>;
}

/// Signals raised by a [`FileWriter`] while a write is in flight.
#[derive(Debug)]
pub enum WriteEvent {
    /// Bytes written so far.
    Progress {
        /// Running total.
        written: u64,
    },
    /// The write completed.
    WriteEnd,
    /// The write failed.
    Error(StashError),
}

/// Writes a payload into a file entry.
pub trait FileWriter {
    /// Starts writing `payload`. The stream yields the writer's signals in
    /// the order the host raises them.
    fn write(&mut self, payload: Payload) -> LocalBoxStream<'_, WriteEvent>;
}

// ---------------------------------------------------------------------------
// Record store
// ---------------------------------------------------------------------------

/// Collections a record store must contain once opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordSchema {
    collections: Vec<String>,
}

impl RecordSchema {
    /// Creates a schema requiring `collections`.
    pub fn new<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            collections: collections.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the required collections.
    #[must_use]
    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    /// Creates every required collection that is missing.
    ///
    /// Hosts call this from their version-change step only, so schema
    /// creation happens once per store lifetime.
    pub fn apply(&self, upgrade: &mut dyn SchemaUpgrade) -> StashResult<()> {
        for collection in &self.collections {
            if !upgrade.has_collection(collection) {
                upgrade.create_collection(collection)?;
            }
        }
        Ok(())
    }
}

/// The schema surface available during a record store's version change.
pub trait SchemaUpgrade {
    /// Returns true if `name` already exists.
    fn has_collection(&self, name: &str) -> bool;

    /// Creates the collection `name`.
    fn create_collection(&mut self, name: &str) -> StashResult<()>;
}

/// Opens record store containers.
#[async_trait(?Send)]
pub trait RecordStoreApi {
    /// Opens `name` at `version`, applying `schema` if the open triggers a
    /// version change.
    ///
    /// # Errors
    ///
    /// Returns [`StashError::Version`] if the store exists at a newer version.
    async fn open(
        &self,
        name: &str,
        version: u32,
        schema: &RecordSchema,
    ) -> StashResult<Box<dyn RecordDatabase>>;
}

/// Transaction access mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionMode {
    /// Reads only.
    ReadOnly,
    /// Reads and writes.
    ReadWrite,
}

/// An open record store connection.
pub trait RecordDatabase {
    /// Starts a transaction scoped to `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`StashError::Transaction`] if the collection does not exist.
    fn transaction(
        &self,
        collection: &str,
        mode: TransactionMode,
    ) -> StashResult<Box<dyn RecordTransaction>>;
}

/// A transaction over one collection.
#[async_trait(?Send)]
pub trait RecordTransaction {
    /// Upserts `payload` under `key`; resolves once the transaction commits.
    async fn put(&self, key: &str, payload: &Payload) -> StashResult<()>;

    /// Fetches the record under `key`. An absent key is `Ok(None)`.
    async fn get(&self, key: &str) -> StashResult<Option<Payload>>;
}

// ---------------------------------------------------------------------------
// String-keyed surfaces
// ---------------------------------------------------------------------------

/// A flat string-keyed map with string values.
pub trait KeyValueStorage {
    /// Returns the value stored under `key`.
    fn get_item(&self, key: &str) -> StashResult<Option<String>>;

    /// Stores `value` under `key`.
    fn set_item(&self, key: &str, value: &str) -> StashResult<()>;
}

/// The document cookie string.
pub trait CookieJar {
    /// Returns every visible cookie as `name=value` pairs joined by `; `.
    fn cookie_string(&self) -> StashResult<String>;

    /// Applies a single cookie assignment such as `name=value;path=/`.
    fn set_cookie(&self, assignment: &str) -> StashResult<()>;
}

/// Mints and resolves transient resource locators.
///
/// A locator stands in for an in-memory payload where only strings can be
/// stored. It is only valid within the page context that minted it.
#[async_trait(?Send)]
pub trait LocatorRegistry {
    /// Registers `payload` and returns a locator for it.
    fn mint(&self, payload: &Payload) -> StashResult<String>;

    /// Fetches the payload behind `locator`.
    ///
    /// # Errors
    ///
    /// Returns [`StashError::Locator`] if the locator is unknown or expired.
    async fn resolve(&self, locator: &str) -> StashResult<Payload>;
}
