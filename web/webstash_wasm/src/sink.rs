//! Console diagnostics.

use js_sys::Function;
use wasm_bindgen::JsValue;
use webstash_core::{BackendCapability, DiagnosticSink, Operation, StashError};

/// "Failed to save file to IndexedDB", "Failed to read file from Cookie".
fn describe_failure(backend: BackendCapability, operation: Operation) -> String {
    let preposition = match operation {
        Operation::Save => "to",
        Operation::Read => "from",
    };
    format!("Failed to {operation} file {preposition} {backend}")
}

/// Reports recovered backend failures with `console.warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl DiagnosticSink for ConsoleSink {
    fn warn(&self, backend: BackendCapability, operation: Operation, error: &StashError) {
        web_sys::console::warn_2(
            &JsValue::from_str(&describe_failure(backend, operation)),
            &JsValue::from_str(&error.to_string()),
        );
    }
}

/// Reports recovered backend failures to a caller-supplied logger object,
/// calling `logger.warn(message, error)`.
#[derive(Debug, Clone)]
pub struct JsLoggerSink {
    logger: JsValue,
    warn: Function,
}

impl JsLoggerSink {
    /// Wraps `logger`, whose `warn` method has already been looked up.
    pub(crate) fn new(logger: JsValue, warn: Function) -> Self {
        Self { logger, warn }
    }
}

impl DiagnosticSink for JsLoggerSink {
    fn warn(&self, backend: BackendCapability, operation: Operation, error: &StashError) {
        let message = JsValue::from_str(&describe_failure(backend, operation));
        let error = JsValue::from_str(&error.to_string());
        if let Err(thrown) = self.warn.call2(&self.logger, &message, &error) {
            // A throwing logger must not break the fallback chain.
            web_sys::console::warn_2(&message, &thrown);
        }
    }
}
