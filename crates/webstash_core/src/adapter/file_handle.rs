//! File-handle adapter.
//!
//! Stores each payload as a file named after the request inside a
//! persistent, quota-bounded file area.
//!
//! ## Quota
//!
//! Writes request `max(payload size, min_quota)` bytes; reads request
//! `min_quota`. The floor avoids quota prompts and denials on tiny payloads.
//!
//! ## Write completion
//!
//! The writer signals completion asynchronously. A write resolves on the
//! first `WriteEnd`, rejects on the first `Error`, and rejects if the
//! writer goes quiet without raising either.

use super::BackendAdapter;
use crate::capability::BackendCapability;
use crate::error::{StashError, StashResult};
use crate::host::{DirectoryEntry, FileArea, FileEntry, Host, WriteEvent};
use crate::payload::Payload;
use async_trait::async_trait;
use futures::StreamExt;
use std::rc::Rc;

/// Adapter over the host's file-handle API.
pub struct FileHandleAdapter {
    host: Rc<dyn Host>,
    min_quota: u64,
}

impl FileHandleAdapter {
    /// Creates an adapter requesting at least `min_quota` bytes per call.
    pub fn new(host: Rc<dyn Host>, min_quota: u64) -> Self {
        Self { host, min_quota }
    }

    async fn area(&self, size: u64) -> StashResult<Rc<dyn FileArea>> {
        let quota = size.max(self.min_quota);
        self.host.file_system()?.request_persistent(quota).await
    }

    async fn file_entry(
        &self,
        area: &dyn FileArea,
        name: &str,
        create: bool,
    ) -> StashResult<Box<dyn FileEntry>> {
        match area.get_entry(name, create).await? {
            DirectoryEntry::File(entry) => Ok(entry),
            DirectoryEntry::Unsupported { kind } => Err(StashError::Contract(format!(
                "entry {name:?} is a {kind}, not a readable and writable file"
            ))),
        }
    }
}

#[async_trait(?Send)]
impl BackendAdapter for FileHandleAdapter {
    fn capability(&self) -> BackendCapability {
        BackendCapability::FileHandle
    }

    async fn write(&self, name: &str, payload: &Payload) -> StashResult<()> {
        let area = self.area(payload.size()).await?;
        let entry = self.file_entry(area.as_ref(), name, true).await?;
        let mut writer = entry.create_writer().await?;

        let mut events = writer.write(payload.clone());
        while let Some(event) = events.next().await {
            match event {
                WriteEvent::Progress { written } => {
                    tracing::trace!(name, written, "file write progress");
                }
                WriteEvent::WriteEnd => return Ok(()),
                WriteEvent::Error(err) => return Err(err),
            }
        }

        Err(StashError::Host(format!(
            "writer for {name:?} closed without signalling completion"
        )))
    }

    async fn read(&self, name: &str) -> StashResult<Payload> {
        let area = self.area(0).await?;
        let entry = self.file_entry(area.as_ref(), name, false).await?;
        entry.file().await
    }
}
