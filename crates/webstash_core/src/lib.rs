//! # WebStash Core
//!
//! Save and read named blobs of bytes over whatever client-side persistence
//! a browser-like host offers, falling back through the mechanisms in a fixed
//! preference order until one succeeds.
//!
//! This crate provides:
//! - A capability detector that probes the host once at construction
//! - A backend selector that orders eligible backends by preference
//! - Five backend adapters (file handles, indexed records, persistent and
//!   session key-value maps, cookies)
//! - The [`StorageGateway`] orchestrator with first-success-wins fallback
//! - An in-memory host ([`MemoryHost`]) for tests and non-browser embedding
//!
//! ## Preference Order
//!
//! 1. **FileHandle** - sandboxed, quota-bounded file area
//! 2. **IndexedRecord** - versioned record store
//! 3. **PersistentKv** - string-keyed map surviving the session
//! 4. **SessionKv** - string-keyed map scoped to the session
//! 5. **Cookie** - same-origin cookie string
//!
//! Key-value and cookie backends only store a transient resource locator,
//! not the payload itself. Locators are valid for the lifetime of the
//! originating page context.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use webstash_core::{GatewayConfig, MemoryHost, StorageGateway};
//!
//! let host = MemoryHost::new();
//! let gateway = StorageGateway::new(Rc::new(host), GatewayConfig::default());
//!
//! futures::executor::block_on(async {
//!     assert!(gateway.save_text("greeting.txt", "hello").await);
//!     let text = gateway.read_text("greeting.txt").await.unwrap();
//!     assert_eq!(text.as_deref(), Some("hello"));
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
mod capability;
mod config;
mod detect;
mod error;
mod gateway;
pub mod host;
mod payload;
mod select;
mod sink;

pub use capability::{BackendCapability, CapabilityMap};
pub use config::{GatewayConfig, DEFAULT_MIN_FILE_QUOTA};
pub use detect::{detect, HostProbe};
pub use error::{StashError, StashResult};
pub use gateway::StorageGateway;
pub use host::memory::{Fault, MemoryHost};
pub use host::{Host, KvScope};
pub use payload::{Payload, TEXT_PLAIN};
pub use select::eligible;
pub use sink::{DiagnosticSink, Operation, TracingSink};
