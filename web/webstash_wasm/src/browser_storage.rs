//! The JavaScript-facing API.

use crate::blob::payload_to_blob;
use crate::bridge::method;
use crate::error::to_js;
use crate::host::WebHost;
use crate::sink::{ConsoleSink, JsLoggerSink};
use js_sys::{Array, Object, Promise, Reflect, Uint8Array};
use serde::Deserialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use webstash_core::{DiagnosticSink, GatewayConfig, Payload, StorageGateway};

/// Which backends a [`BrowserStorage`] may use.
///
/// Deserialized from the options object passed to the constructor; every
/// field is optional and defaults to `true`. The `logger` entry is taken
/// off the object first, see [`split_logger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageOptions {
    /// Use the legacy file system API.
    pub want_file_system: bool,
    /// Use IndexedDB.
    #[serde(rename = "wantIndexedDB")]
    pub want_indexed_db: bool,
    /// Use `localStorage`.
    pub want_local_storage: bool,
    /// Use `sessionStorage`.
    pub want_session_storage: bool,
    /// Use cookies.
    pub want_cookie: bool,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            want_file_system: true,
            want_indexed_db: true,
            want_local_storage: true,
            want_session_storage: true,
            want_cookie: true,
        }
    }
}

impl StorageOptions {
    /// Parses a JavaScript options object. `undefined` and `null` select
    /// the defaults.
    pub fn from_js(options: JsValue) -> Result<Self, JsValue> {
        if options.is_undefined() || options.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_wasm_bindgen::from_value(options)?)
    }

    /// Builds the gateway configuration, reporting recovered failures to
    /// `sink`.
    pub fn into_config(self, sink: Rc<dyn DiagnosticSink>) -> GatewayConfig {
        GatewayConfig::new()
            .want_file_handle(self.want_file_system)
            .want_indexed_record(self.want_indexed_db)
            .want_persistent_kv(self.want_local_storage)
            .want_session_kv(self.want_session_storage)
            .want_cookie(self.want_cookie)
            .sink(sink)
    }
}

/// Takes the `logger` entry off a JavaScript options object.
///
/// Returns the remaining options, as a copy when a logger was present, and
/// the logger itself unless it is missing, `undefined` or `null`.
fn split_logger(options: JsValue) -> Result<(JsValue, Option<JsValue>), JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok((options, None));
    }
    let key = JsValue::from_str("logger");
    let logger = Reflect::get(&options, &key)?;
    if logger.is_undefined() || logger.is_null() {
        return Ok((options, None));
    }

    let rest = Object::assign(&Object::new(), options.unchecked_ref());
    Reflect::delete_property(&rest, &key)?;
    Ok((rest.into(), Some(logger)))
}

/// Picks where recovered failures are reported: the caller's logger when
/// one was given, the console otherwise.
fn diagnostics(logger: Option<JsValue>) -> Result<Rc<dyn DiagnosticSink>, JsValue> {
    Ok(match logger {
        Some(logger) => {
            let warn = method(&logger, "warn").map_err(to_js)?;
            Rc::new(JsLoggerSink::new(logger, warn))
        }
        None => Rc::new(ConsoleSink),
    })
}

/// Saves and reads named files through the first browser storage mechanism
/// that works.
///
/// ## Example
///
/// ```javascript
/// const storage = new BrowserStorage({ wantCookie: false });
///
/// const saved = await storage.saveFile("image.png", bytes, "image/png");
/// const blob = await storage.readFile("image.png");
/// ```
#[wasm_bindgen]
pub struct BrowserStorage {
    gateway: Rc<StorageGateway>,
}

#[wasm_bindgen]
impl BrowserStorage {
    /// Probes the browser and fixes the backend order.
    ///
    /// # Arguments
    ///
    /// * `options` - `{ wantFileSystem, wantIndexedDB, wantLocalStorage,
    ///   wantSessionStorage, wantCookie, logger }`, all optional. `logger`
    ///   must have a `warn` method; recovered failures go to `console.warn`
    ///   without one.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<BrowserStorage, JsValue> {
        let (options, logger) = split_logger(options)?;
        let options = StorageOptions::from_js(options)?;
        let sink = diagnostics(logger)?;
        let host = WebHost::new().map_err(to_js)?;

        Ok(BrowserStorage {
            gateway: Rc::new(StorageGateway::new(Rc::new(host), options.into_config(sink))),
        })
    }

    /// Saves `data` under `name`. Resolves to `true` if any backend
    /// accepted it.
    #[wasm_bindgen(js_name = saveFile)]
    pub fn save_file(&self, name: String, data: Uint8Array, media_type: Option<String>) -> Promise {
        let gateway = Rc::clone(&self.gateway);
        let payload = match media_type {
            Some(media_type) => Payload::with_media_type(data.to_vec(), media_type),
            None => Payload::new(data.to_vec()),
        };

        future_to_promise(async move { Ok(JsValue::from_bool(gateway.save(&name, payload).await)) })
    }

    /// Saves `text` as a `text/plain` file.
    #[wasm_bindgen(js_name = saveTextFile)]
    pub fn save_text_file(&self, name: String, text: String) -> Promise {
        let gateway = Rc::clone(&self.gateway);

        future_to_promise(async move {
            Ok(JsValue::from_bool(gateway.save_text(&name, &text).await))
        })
    }

    /// Reads the file under `name`. Resolves to a `Blob` carrying the saved
    /// media type, or `undefined` if no backend has it.
    #[wasm_bindgen(js_name = readFile)]
    pub fn read_file(&self, name: String) -> Promise {
        let gateway = Rc::clone(&self.gateway);

        future_to_promise(async move {
            match gateway.read(&name).await {
                Some(payload) => payload_to_blob(&payload).map(JsValue::from).map_err(to_js),
                None => Ok(JsValue::UNDEFINED),
            }
        })
    }

    /// Reads the file under `name` as UTF-8 text. Resolves to `undefined`
    /// if no backend has it and rejects if the bytes are not UTF-8.
    #[wasm_bindgen(js_name = readTextFile)]
    pub fn read_text_file(&self, name: String) -> Promise {
        let gateway = Rc::clone(&self.gateway);

        future_to_promise(async move {
            match gateway.read_text(&name).await {
                Ok(Some(text)) => Ok(JsValue::from_str(&text)),
                Ok(None) => Ok(JsValue::UNDEFINED),
                Err(err) => Err(to_js(err)),
            }
        })
    }

    /// Names of the backends in the order they are tried.
    #[wasm_bindgen(js_name = eligibleBackends)]
    pub fn eligible_backends(&self) -> Array {
        self.gateway
            .eligible()
            .into_iter()
            .map(|backend| JsValue::from_str(backend.name()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webstash_core::BackendCapability;

    #[test]
    fn default_options_want_everything() {
        let config = StorageOptions::default().into_config(Rc::new(ConsoleSink));
        assert_eq!(
            config.wanted_map().iter().collect::<Vec<_>>(),
            BackendCapability::PREFERENCE_ORDER.to_vec()
        );
        assert!(config.sink.is_some());
    }

    #[test]
    fn options_map_onto_backends() {
        let options = StorageOptions {
            want_file_system: false,
            want_cookie: false,
            ..StorageOptions::default()
        };
        let wanted = options.into_config(Rc::new(ConsoleSink)).wanted_map();

        assert!(!wanted.get(BackendCapability::FileHandle));
        assert!(wanted.get(BackendCapability::IndexedRecord));
        assert!(wanted.get(BackendCapability::PersistentKv));
        assert!(wanted.get(BackendCapability::SessionKv));
        assert!(!wanted.get(BackendCapability::Cookie));
    }
}
