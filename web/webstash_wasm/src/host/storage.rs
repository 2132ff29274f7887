//! `localStorage`, `sessionStorage` and `document.cookie`.

use crate::error::js_error;
use web_sys::{HtmlDocument, Storage};
use webstash_core::host::{CookieJar, KeyValueStorage};
use webstash_core::StashResult;

/// A `Storage` object (either scope).
pub(crate) struct WebStorage {
    storage: Storage,
}

impl WebStorage {
    pub(crate) fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

impl KeyValueStorage for WebStorage {
    fn get_item(&self, key: &str) -> StashResult<Option<String>> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> StashResult<()> {
        self.storage.set_item(key, value).map_err(js_error)
    }
}

/// The document's cookie string.
pub(crate) struct WebCookieJar {
    document: HtmlDocument,
}

impl WebCookieJar {
    pub(crate) fn new(document: HtmlDocument) -> Self {
        Self { document }
    }
}

impl CookieJar for WebCookieJar {
    fn cookie_string(&self) -> StashResult<String> {
        self.document.cookie().map_err(js_error)
    }

    fn set_cookie(&self, assignment: &str) -> StashResult<()> {
        self.document.set_cookie(assignment).map_err(js_error)
    }
}
