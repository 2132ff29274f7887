//! Browser tests, run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Function, Object, Reflect, Uint8Array};
use wasm_bindgen::JsCast;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use webstash_core::{BackendCapability, GatewayConfig, StorageGateway};
use webstash_wasm::{BrowserStorage, StorageOptions, WebHost};

wasm_bindgen_test_configure!(run_in_browser);

fn options(pairs: &[(&str, bool)]) -> JsValue {
    let options = Object::new();
    for (key, value) in pairs {
        Reflect::set(&options, &JsValue::from_str(key), &JsValue::from_bool(*value))
            .expect("set option");
    }
    options.into()
}

fn gateway_for(capability: BackendCapability) -> StorageGateway {
    let host = WebHost::new().expect("window");
    StorageGateway::new(Rc::new(host), GatewayConfig::only(capability))
}

#[wasm_bindgen_test]
fn options_parse_from_camel_case() {
    let parsed = StorageOptions::from_js(options(&[
        ("wantFileSystem", false),
        ("wantIndexedDB", false),
    ]))
    .expect("parse options");

    assert!(!parsed.want_file_system);
    assert!(!parsed.want_indexed_db);
    assert!(parsed.want_local_storage);
    assert_eq!(
        StorageOptions::from_js(JsValue::UNDEFINED).expect("defaults"),
        StorageOptions::default()
    );
}

#[wasm_bindgen_test]
fn eligible_backends_follow_options() {
    let storage = BrowserStorage::new(options(&[("wantFileSystem", false), ("wantCookie", false)]))
        .expect("construct");
    let names: Vec<String> = storage
        .eligible_backends()
        .iter()
        .filter_map(|name| name.as_string())
        .collect();

    assert!(!names.iter().any(|name| name == "FileSystem" || name == "Cookie"));
    assert_eq!(names.first().map(String::as_str), Some("IndexedDB"));
}

#[wasm_bindgen_test]
async fn indexed_db_round_trip() {
    let gateway = gateway_for(BackendCapability::IndexedRecord);

    assert!(gateway.save_text("webstash-test.txt", "stored in a record").await);
    let text = gateway.read_text("webstash-test.txt").await.expect("utf-8");
    assert_eq!(text.as_deref(), Some("stored in a record"));
}

#[wasm_bindgen_test]
async fn local_storage_holds_a_locator() {
    let gateway = gateway_for(BackendCapability::PersistentKv);

    assert!(gateway.save("webstash-test.bin", vec![1u8, 2, 3]).await);
    let stored = web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item("webstash-test.bin").ok().flatten())
        .expect("item present");
    assert!(stored.starts_with("blob:"));

    let read = gateway.read("webstash-test.bin").await.expect("read back");
    assert_eq!(&read.data()[..], &[1u8, 2, 3]);
}

#[wasm_bindgen_test]
async fn browser_storage_round_trips_bytes() {
    let storage = BrowserStorage::new(options(&[("wantFileSystem", false)])).expect("construct");
    let bytes = Uint8Array::from(&[7u8, 8, 9][..]);

    let saved = JsFuture::from(storage.save_file(
        "webstash-api.bin".to_string(),
        bytes,
        Some("application/octet-stream".to_string()),
    ))
    .await
    .expect("save resolves");
    assert_eq!(saved.as_bool(), Some(true));

    let read: web_sys::Blob = JsFuture::from(storage.read_file("webstash-api.bin".to_string()))
        .await
        .expect("read resolves")
        .dyn_into()
        .expect("a Blob");
    assert_eq!(read.type_(), "application/octet-stream");
    let buffer = JsFuture::from(read.array_buffer()).await.expect("blob bytes");
    assert_eq!(Uint8Array::new(&buffer).to_vec(), vec![7, 8, 9]);

    let missing = JsFuture::from(storage.read_file("webstash-missing".to_string()))
        .await
        .expect("read resolves");
    assert!(missing.is_undefined());
}

#[wasm_bindgen_test]
async fn read_file_keeps_the_media_type() {
    let storage = BrowserStorage::new(options(&[("wantFileSystem", false)])).expect("construct");

    JsFuture::from(storage.save_text_file("webstash-note.txt".to_string(), "hi".to_string()))
        .await
        .expect("save resolves");
    let read: web_sys::Blob = JsFuture::from(storage.read_file("webstash-note.txt".to_string()))
        .await
        .expect("read resolves")
        .dyn_into()
        .expect("a Blob");
    assert_eq!(read.type_(), "text/plain");
}

/// A logger object whose `warn` records its arguments in `logger.calls`.
fn recording_logger() -> (JsValue, Array) {
    let logger = Object::new();
    let calls = Array::new();
    Reflect::set(&logger, &JsValue::from_str("calls"), &calls).expect("set calls");
    let warn = Function::new_with_args("message, error", "this.calls.push([message, error]);");
    Reflect::set(&logger, &JsValue::from_str("warn"), &warn).expect("set warn");
    (logger.into(), calls)
}

#[wasm_bindgen_test]
async fn recovered_failures_go_to_the_supplied_logger() {
    let (logger, calls) = recording_logger();
    let options = options(&[
        ("wantFileSystem", false),
        ("wantIndexedDB", false),
        ("wantSessionStorage", false),
        ("wantCookie", false),
    ]);
    Reflect::set(&options, &JsValue::from_str("logger"), &logger).expect("set logger");
    let storage = BrowserStorage::new(options).expect("construct");

    let read = JsFuture::from(storage.read_file("webstash-never-saved".to_string()))
        .await
        .expect("read resolves");
    assert!(read.is_undefined());

    assert_eq!(calls.length(), 1);
    let first: Array = calls.get(0).unchecked_into();
    assert_eq!(
        first.get(0).as_string().as_deref(),
        Some("Failed to read file from LocalStorage")
    );
    assert!(first.get(1).as_string().is_some());
}

#[wasm_bindgen_test]
fn logger_without_warn_is_rejected() {
    let options = options(&[]);
    Reflect::set(&options, &JsValue::from_str("logger"), &Object::new()).expect("set logger");

    assert!(BrowserStorage::new(options).is_err());
}
