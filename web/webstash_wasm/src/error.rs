//! Conversions between JavaScript exceptions and gateway errors.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::DomException;
use webstash_core::StashError;

/// Wraps a thrown JavaScript value as a host error, keeping its message.
pub(crate) fn js_error(value: JsValue) -> StashError {
    StashError::Host(describe(&value))
}

/// Renders a thrown JavaScript value for humans.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(exception) = value.dyn_ref::<DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Returns the `DOMException` name of a thrown value, if it is one.
pub(crate) fn exception_name(value: &JsValue) -> Option<String> {
    value.dyn_ref::<DomException>().map(DomException::name)
}

/// Converts a gateway error into a value JavaScript can catch.
pub(crate) fn to_js(err: StashError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
