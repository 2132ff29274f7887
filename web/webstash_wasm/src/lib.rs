//! # WebStash WASM
//!
//! WebAssembly bindings for WebStash over the browser's own storage
//! mechanisms.
//!
//! This crate provides:
//! - [`WebHost`], the browser implementation of the gateway's host traits
//! - [`ConsoleSink`], which reports recovered failures with `console.warn`,
//!   and [`JsLoggerSink`] for a caller-supplied `logger`
//! - A JavaScript-friendly API via wasm-bindgen ([`BrowserStorage`])
//!
//! ## Backend Order
//!
//! Saves and reads try each backend the browser supports and the caller
//! wants, in this order, and stop at the first success:
//! 1. **FileSystem** - the legacy sandboxed file system API
//! 2. **IndexedDB** - the `fileStorage` database, `files` object store
//! 3. **LocalStorage** - an object URL for the payload
//! 4. **SessionStorage** - same, cleared with the session
//! 5. **Cookie** - an object URL in a cookie
//!
//! Object URLs only live as long as the page that created them, so the last
//! three backends do not survive a reload.
//!
//! ## Usage
//!
//! ```javascript
//! import init, { BrowserStorage } from 'webstash_wasm';
//!
//! async function main() {
//!     await init();
//!
//!     const storage = new BrowserStorage({ wantFileSystem: false });
//!     await storage.saveTextFile("notes.txt", "hello");
//!
//!     const text = await storage.readTextFile("notes.txt");
//!     console.log(text, storage.eligibleBackends());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod blob;
mod bridge;
mod browser_storage;
mod error;
mod host;
mod sink;
mod utils;

pub use browser_storage::{BrowserStorage, StorageOptions};
pub use host::WebHost;
pub use sink::{ConsoleSink, JsLoggerSink};

use wasm_bindgen::prelude::*;

/// Initialize the WASM module.
///
/// This sets up panic hooks for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    utils::set_panic_hook();
}
