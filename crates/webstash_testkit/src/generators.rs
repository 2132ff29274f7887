//! Property-based test generators using proptest.

use proptest::prelude::*;
use webstash_core::{BackendCapability, CapabilityMap, Payload};

/// Strategy for names usable as file names, record keys and cookie names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9_.-]{0,31}"
}

/// Strategy for arbitrary payload bytes.
pub fn payload_bytes_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..4096)
}

/// Strategy for payloads, sometimes tagged with a media type.
pub fn payload_strategy() -> impl Strategy<Value = Payload> {
    (
        payload_bytes_strategy(),
        prop::option::of(prop::sample::select(vec![
            "application/octet-stream",
            "image/png",
            "text/plain",
        ])),
    )
        .prop_map(|(bytes, media_type)| match media_type {
            Some(media_type) => Payload::with_media_type(bytes, media_type),
            None => Payload::new(bytes),
        })
}

/// Strategy for a single backend.
pub fn capability_strategy() -> impl Strategy<Value = BackendCapability> {
    prop::sample::select(BackendCapability::PREFERENCE_ORDER.to_vec())
}

/// Strategy for arbitrary capability maps.
pub fn capability_map_strategy() -> impl Strategy<Value = CapabilityMap> {
    prop::array::uniform5(any::<bool>()).prop_map(|flags| {
        BackendCapability::PREFERENCE_ORDER
            .into_iter()
            .zip(flags)
            .filter(|(_, on)| *on)
            .map(|(capability, _)| capability)
            .collect()
    })
}
