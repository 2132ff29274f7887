//! The legacy sandboxed file system API.
//!
//! `requestFileSystem(PERSISTENT, quota, ok, err)` grants a file area whose
//! `root.getFile(name, { create }, ok, err)` yields entries with
//! `createWriter(ok, err)` and `file(ok, err)`. Writers report through
//! `onprogress`, `onwriteend` and `onerror` handlers.

use crate::blob::{blob_to_payload, payload_to_blob};
use crate::bridge::{has, method, with_callbacks};
use crate::error::{exception_name, js_error};
use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedSender};
use futures::stream::LocalBoxStream;
use js_sys::{Array, Function, Object, Reflect};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, Window};
use webstash_core::host::{
    DirectoryEntry, FileArea, FileEntry, FileSystemApi, FileWriter, WriteEvent,
};
use webstash_core::{Payload, StashError, StashResult};

/// The `requestFileSystem` entry point bound to its window.
pub(crate) struct WebFileSystem {
    window: Window,
    request: Function,
}

impl WebFileSystem {
    pub(crate) fn new(window: Window, request: Function) -> Self {
        Self { window, request }
    }
}

#[async_trait(?Send)]
impl FileSystemApi for WebFileSystem {
    async fn request_persistent(&self, quota: u64) -> StashResult<Rc<dyn FileArea>> {
        let kind = Reflect::get(&self.window, &JsValue::from_str("PERSISTENT")).map_err(js_error)?;
        let size = JsValue::from_f64(quota as f64);

        let file_system = with_callbacks(|ok, err| {
            self.request
                .apply(&self.window, &Array::of4(&kind, &size, ok, err))
        })
        .await
        .map_err(|err| match exception_name(&err).as_deref() {
            Some("QuotaExceededError") => StashError::QuotaExceeded {
                requested: quota,
                available: 0,
            },
            _ => js_error(err),
        })?;

        let root = Reflect::get(&file_system, &JsValue::from_str("root")).map_err(js_error)?;
        Ok(Rc::new(WebFileArea { root }))
    }
}

/// The root directory of a granted file area.
struct WebFileArea {
    root: JsValue,
}

#[async_trait(?Send)]
impl FileArea for WebFileArea {
    async fn get_entry(&self, name: &str, create: bool) -> StashResult<DirectoryEntry> {
        let get_file = method(&self.root, "getFile")?;
        let options = Object::new();
        Reflect::set(&options, &JsValue::from_str("create"), &JsValue::from_bool(create))
            .map_err(js_error)?;
        let path = JsValue::from_str(name);

        let entry = with_callbacks(|ok, err| {
            get_file.apply(&self.root, &Array::of4(&path, &options, ok, err))
        })
        .await
        .map_err(|err| match exception_name(&err).as_deref() {
            Some("NotFoundError") if !create => StashError::not_found(name),
            _ => js_error(err),
        })?;

        if has(&entry, "createWriter") && has(&entry, "file") {
            return Ok(DirectoryEntry::File(Box::new(WebFileEntry { entry })));
        }

        let is_directory = Reflect::get(&entry, &JsValue::from_str("isDirectory"))
            .ok()
            .and_then(|value| value.as_bool())
            .unwrap_or(false);
        Ok(DirectoryEntry::Unsupported {
            kind: if is_directory { "directory" } else { "entry" }.to_string(),
        })
    }
}

/// A `FileEntry` object.
struct WebFileEntry {
    entry: JsValue,
}

#[async_trait(?Send)]
impl FileEntry for WebFileEntry {
    async fn create_writer(&self) -> StashResult<Box<dyn FileWriter>> {
        let create_writer = method(&self.entry, "createWriter")?;
        let writer = with_callbacks(|ok, err| create_writer.call2(&self.entry, ok, err))
            .await
            .map_err(js_error)?;

        Ok(Box::new(WebFileWriter {
            writer,
            handlers: Vec::new(),
        }))
    }

    async fn file(&self) -> StashResult<Payload> {
        let file = method(&self.entry, "file")?;
        let blob: Blob = with_callbacks(|ok, err| file.call2(&self.entry, ok, err))
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| StashError::Contract("file() did not yield a Blob".to_string()))?;

        blob_to_payload(&blob).await
    }
}

/// A `FileWriter` object together with the handlers installed on it.
struct WebFileWriter {
    writer: JsValue,
    handlers: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl WebFileWriter {
    fn listen(&mut self, slot: &str, handler: impl FnMut(JsValue) + 'static) -> StashResult<()> {
        let closure = Closure::<dyn FnMut(JsValue)>::new(handler);
        Reflect::set(&self.writer, &JsValue::from_str(slot), closure.as_ref()).map_err(js_error)?;
        self.handlers.push(closure);
        Ok(())
    }

    fn start(&mut self, payload: &Payload, events: UnboundedSender<WriteEvent>) -> StashResult<()> {
        let blob = payload_to_blob(payload)?;
        self.handlers.clear();

        let progress = events.clone();
        self.listen("onprogress", move |event| {
            let written = Reflect::get(&event, &JsValue::from_str("loaded"))
                .ok()
                .and_then(|loaded| loaded.as_f64())
                .map_or(0, |loaded| loaded as u64);
            let _ = progress.unbounded_send(WriteEvent::Progress { written });
        })?;

        let end = events.clone();
        self.listen("onwriteend", move |_| {
            let _ = end.unbounded_send(WriteEvent::WriteEnd);
        })?;

        let writer = self.writer.clone();
        self.listen("onerror", move |_| {
            let error = Reflect::get(&writer, &JsValue::from_str("error"))
                .unwrap_or(JsValue::UNDEFINED);
            let _ = events.unbounded_send(WriteEvent::Error(js_error(error)));
        })?;

        method(&self.writer, "write")?
            .call1(&self.writer, &blob)
            .map_err(js_error)?;
        Ok(())
    }
}

impl FileWriter for WebFileWriter {
    fn write(&mut self, payload: Payload) -> LocalBoxStream<'_, WriteEvent> {
        let (events, stream) = mpsc::unbounded();
        if let Err(err) = self.start(&payload, events.clone()) {
            let _ = events.unbounded_send(WriteEvent::Error(err));
        }
        Box::pin(stream)
    }
}
