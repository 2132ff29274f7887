//! Bridges callback-style DOM APIs onto futures.
//!
//! The legacy file system API takes success and error callbacks, and
//! IndexedDB raises events on request and transaction objects. Both are
//! wrapped in a `Promise` whose resolve/reject functions are installed as
//! the callbacks, so no Rust closures need to outlive the call.

use crate::error::{describe, js_error};
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{IdbRequest, IdbTransaction};
use webstash_core::{StashError, StashResult};

/// Runs `start` with a success and an error callback and waits for one of
/// them to fire.
///
/// A synchronous throw from `start` counts as the error callback firing.
pub(crate) async fn with_callbacks<F>(start: F) -> Result<JsValue, JsValue>
where
    F: FnOnce(&Function, &Function) -> Result<JsValue, JsValue>,
{
    let mut start = Some(start);
    let promise = Promise::new(&mut |resolve, reject| {
        if let Some(start) = start.take() {
            if let Err(err) = start(&resolve, &reject) {
                let _ = reject.call1(&JsValue::UNDEFINED, &err);
            }
        }
    });
    JsFuture::from(promise).await
}

/// Looks up the method `name` on `target`.
pub(crate) fn method(target: &JsValue, name: &str) -> StashResult<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .map_err(js_error)?
        .dyn_into::<Function>()
        .map_err(|_| StashError::Contract(format!("entry does not implement {name}")))
}

/// Returns true if `target` has a property called `name`.
pub(crate) fn has(target: &JsValue, name: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

/// Waits for an IndexedDB request to succeed and returns its result.
pub(crate) async fn request_done(request: &IdbRequest) -> StashResult<JsValue> {
    let promise = Promise::new(&mut |resolve, reject| {
        request.set_onsuccess(Some(&resolve));
        request.set_onerror(Some(&reject));
    });
    let outcome = JsFuture::from(promise).await;
    request.set_onsuccess(None);
    request.set_onerror(None);

    match outcome {
        Ok(_) => request.result().map_err(js_error),
        Err(_) => Err(match request.error() {
            Ok(Some(exception)) => js_error(exception.into()),
            _ => StashError::Transaction("request failed".to_string()),
        }),
    }
}

/// Waits for an IndexedDB transaction to commit.
pub(crate) async fn transaction_done(transaction: &IdbTransaction) -> StashResult<()> {
    let promise = Promise::new(&mut |resolve, reject| {
        transaction.set_oncomplete(Some(&resolve));
        transaction.set_onerror(Some(&reject));
        transaction.set_onabort(Some(&reject));
    });
    let outcome = JsFuture::from(promise).await;
    transaction.set_oncomplete(None);
    transaction.set_onerror(None);
    transaction.set_onabort(None);

    match outcome {
        Ok(_) => Ok(()),
        Err(_) => Err(StashError::Transaction(match transaction.error() {
            Some(exception) => describe(&exception.into()),
            None => "transaction aborted".to_string(),
        })),
    }
}
