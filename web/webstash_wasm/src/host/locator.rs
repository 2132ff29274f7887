//! Object URLs as transient locators.

use crate::blob::{blob_to_payload, payload_to_blob};
use crate::error::{describe, js_error};
use async_trait::async_trait;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, Response, Url, Window};
use webstash_core::host::LocatorRegistry;
use webstash_core::{Payload, StashError, StashResult};

/// Mints `blob:` URLs and fetches them back.
pub(crate) struct WebLocators {
    window: Window,
}

impl WebLocators {
    pub(crate) fn new(window: Window) -> Self {
        Self { window }
    }
}

fn locator_error(locator: &str, reason: impl Into<String>) -> StashError {
    StashError::Locator {
        locator: locator.to_string(),
        reason: reason.into(),
    }
}

#[async_trait(?Send)]
impl LocatorRegistry for WebLocators {
    fn mint(&self, payload: &Payload) -> StashResult<String> {
        let blob = payload_to_blob(payload)?;
        Url::create_object_url_with_blob(&blob).map_err(js_error)
    }

    async fn resolve(&self, locator: &str) -> StashResult<Payload> {
        // A revoked or foreign blob URL rejects the fetch with a TypeError.
        let response: Response = JsFuture::from(self.window.fetch_with_str(locator))
            .await
            .map_err(|err| locator_error(locator, describe(&err)))?
            .dyn_into()
            .map_err(|_| locator_error(locator, "fetch did not yield a response"))?;

        if !response.ok() {
            return Err(locator_error(
                locator,
                format!("fetch returned status {}", response.status()),
            ));
        }

        let blob: Blob = JsFuture::from(response.blob().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(|value: JsValue| locator_error(locator, describe(&value)))?;

        blob_to_payload(&blob).await
    }
}
