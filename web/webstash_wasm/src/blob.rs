//! Payload and `Blob` conversions.

use crate::error::js_error;
use js_sys::{Array, Uint8Array};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag};
use webstash_core::{Payload, StashResult};

/// Copies `payload` into a new `Blob`, carrying its media type.
pub(crate) fn payload_to_blob(payload: &Payload) -> StashResult<Blob> {
    let bytes = Uint8Array::from(&payload.data()[..]);
    let parts = Array::of1(&bytes);
    let options = BlobPropertyBag::new();
    if let Some(media_type) = payload.media_type() {
        options.set_type(media_type);
    }
    Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_error)
}

/// Reads the contents of `blob`.
pub(crate) async fn blob_to_payload(blob: &Blob) -> StashResult<Payload> {
    let buffer = JsFuture::from(blob.array_buffer()).await.map_err(js_error)?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    let media_type = blob.type_();

    Ok(if media_type.is_empty() {
        Payload::new(bytes)
    } else {
        Payload::with_media_type(bytes, media_type)
    })
}
