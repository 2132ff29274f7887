//! The browser host.
//!
//! [`WebHost`] answers capability probes against the global `window` and
//! hands out `web-sys` backed implementations of the gateway's surfaces.

mod file_system;
mod indexed_db;
mod locator;
mod storage;

use crate::error::js_error;
use file_system::WebFileSystem;
use indexed_db::WebRecordStore;
use js_sys::{Function, Reflect};
use locator::WebLocators;
use std::rc::Rc;
use storage::{WebCookieJar, WebStorage};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlDocument, Window};
use webstash_core::host::{
    CookieJar, FileSystemApi, KeyValueStorage, LocatorRegistry, RecordStoreApi,
};
use webstash_core::{Host, HostProbe, KvScope, StashError, StashResult};

/// Names under which browsers expose the legacy file system entry point.
const FILE_SYSTEM_ENTRY_POINTS: [&str; 2] = ["requestFileSystem", "webkitRequestFileSystem"];

/// A host backed by the page's global `window`.
#[derive(Debug, Clone)]
pub struct WebHost {
    window: Window,
}

impl WebHost {
    /// Binds to the global `window`.
    ///
    /// # Errors
    ///
    /// Returns [`StashError::Unavailable`] outside a window context (for
    /// example in a worker).
    pub fn new() -> StashResult<Self> {
        web_sys::window()
            .map(|window| Self { window })
            .ok_or_else(|| StashError::Unavailable("no global window".to_string()))
    }
}

impl HostProbe for WebHost {
    fn has_property(&self, name: &str) -> bool {
        Reflect::has(&self.window, &JsValue::from_str(name)).unwrap_or(false)
    }

    fn cookies_enabled(&self) -> bool {
        Reflect::get(&self.window.navigator(), &JsValue::from_str("cookieEnabled"))
            .ok()
            .and_then(|enabled| enabled.as_bool())
            .unwrap_or(false)
    }
}

impl Host for WebHost {
    fn file_system(&self) -> StashResult<Rc<dyn FileSystemApi>> {
        let request = FILE_SYSTEM_ENTRY_POINTS
            .iter()
            .find_map(|name| {
                Reflect::get(&self.window, &JsValue::from_str(name))
                    .ok()
                    .and_then(|value| value.dyn_into::<Function>().ok())
            })
            .ok_or_else(|| {
                StashError::Unavailable("requestFileSystem is not defined".to_string())
            })?;

        Ok(Rc::new(WebFileSystem::new(self.window.clone(), request)))
    }

    fn record_store(&self) -> StashResult<Rc<dyn RecordStoreApi>> {
        let factory = self
            .window
            .indexed_db()
            .map_err(js_error)?
            .ok_or_else(|| StashError::Unavailable("indexedDB is not defined".to_string()))?;

        Ok(Rc::new(WebRecordStore::new(factory)))
    }

    fn key_value(&self, scope: KvScope) -> StashResult<Rc<dyn KeyValueStorage>> {
        let storage = match scope {
            KvScope::Persistent => self.window.local_storage(),
            KvScope::Session => self.window.session_storage(),
        }
        .map_err(js_error)?
        .ok_or_else(|| StashError::Unavailable(format!("{} is not defined", scope.capability())))?;

        Ok(Rc::new(WebStorage::new(storage)))
    }

    fn cookies(&self) -> StashResult<Rc<dyn CookieJar>> {
        let document = self
            .window
            .document()
            .ok_or_else(|| StashError::Unavailable("no document".to_string()))?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| StashError::Unavailable("document has no cookie jar".to_string()))?;

        Ok(Rc::new(WebCookieJar::new(document)))
    }

    fn locators(&self) -> StashResult<Rc<dyn LocatorRegistry>> {
        Ok(Rc::new(WebLocators::new(self.window.clone())))
    }
}
