//! The storage gateway.
//!
//! Probes the host once, fixes the ordered list of eligible backends, and
//! replays that list for every save and read.
//!
//! ## Fallback
//!
//! Backends are tried strictly one after another. The first backend that
//! completes the operation wins and the rest are not attempted. A failing
//! backend is reported to the [`DiagnosticSink`] and skipped; nothing a
//! backend raises escapes the gateway.
//!
//! On reads, "backend errored" and "backend had no record" are treated the
//! same way: both fall through to the next backend.

use crate::adapter::{self, BackendAdapter};
use crate::capability::{BackendCapability, CapabilityMap};
use crate::config::GatewayConfig;
use crate::detect::detect;
use crate::error::StashResult;
use crate::host::Host;
use crate::payload::Payload;
use crate::select::eligible;
use crate::sink::{DiagnosticSink, Operation, TracingSink};
use std::fmt;
use std::rc::Rc;

/// Saves and reads named payloads through the best available backend.
pub struct StorageGateway {
    support: CapabilityMap,
    wanted: CapabilityMap,
    adapters: Vec<Box<dyn BackendAdapter>>,
    sink: Rc<dyn DiagnosticSink>,
}

impl StorageGateway {
    /// Probes `host` and builds the ordered adapter list for `config`.
    pub fn new(host: Rc<dyn Host>, config: GatewayConfig) -> Self {
        let support = detect(host.as_ref());
        let wanted = config.wanted_map();
        let order = eligible(&support, &wanted);
        tracing::debug!(?order, "selected storage backends");

        let adapters = order
            .into_iter()
            .map(|capability| adapter::build(capability, Rc::clone(&host), &config))
            .collect();
        let sink: Rc<dyn DiagnosticSink> = match &config.sink {
            Some(sink) => Rc::clone(sink),
            None => Rc::new(TracingSink),
        };

        Self {
            support,
            wanted,
            adapters,
            sink,
        }
    }

    /// Builds a gateway over an explicit adapter list, tried in the given
    /// order. No host probing is performed.
    pub fn with_adapters(
        adapters: Vec<Box<dyn BackendAdapter>>,
        sink: Option<Rc<dyn DiagnosticSink>>,
    ) -> Self {
        let support: CapabilityMap = adapters.iter().map(|a| a.capability()).collect();
        let sink: Rc<dyn DiagnosticSink> = match sink {
            Some(sink) => sink,
            None => Rc::new(TracingSink),
        };
        Self {
            support,
            wanted: CapabilityMap::all(),
            adapters,
            sink,
        }
    }

    /// What the host supports, as probed at construction.
    #[must_use]
    pub fn support(&self) -> CapabilityMap {
        self.support
    }

    /// What the configuration asked for.
    #[must_use]
    pub fn wanted(&self) -> CapabilityMap {
        self.wanted
    }

    /// The backends that will be tried, in order.
    #[must_use]
    pub fn eligible(&self) -> Vec<BackendCapability> {
        self.adapters.iter().map(|a| a.capability()).collect()
    }

    /// Saves `payload` under `name`. Returns `false` if every backend failed
    /// or none is eligible.
    pub async fn save(&self, name: &str, payload: impl Into<Payload>) -> bool {
        self.save_tracked(name, &payload.into()).await.is_some()
    }

    /// Encodes `text` as UTF-8 (`text/plain`) and saves it under `name`.
    pub async fn save_text(&self, name: &str, text: &str) -> bool {
        self.save_tracked(name, &Payload::text(text)).await.is_some()
    }

    /// Saves `payload` under `name` and returns the backend that stored it.
    pub async fn save_tracked(&self, name: &str, payload: &Payload) -> Option<BackendCapability> {
        for adapter in &self.adapters {
            let backend = adapter.capability();
            match adapter.write(name, payload).await {
                Ok(()) => {
                    tracing::debug!(%backend, name, size = payload.size(), "saved payload");
                    return Some(backend);
                }
                Err(err) => self.sink.warn(backend, Operation::Save, &err),
            }
        }

        tracing::debug!(name, "no backend accepted the payload");
        None
    }

    /// Reads the payload stored under `name`.
    pub async fn read(&self, name: &str) -> Option<Payload> {
        self.read_tracked(name).await.map(|(_, payload)| payload)
    }

    /// Reads the payload under `name` and decodes it as UTF-8.
    ///
    /// Returns `Ok(None)` if no backend holds `name`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StashError::Decode`] if the located bytes are not
    /// valid UTF-8. The fallback chain is not resumed in that case.
    pub async fn read_text(&self, name: &str) -> StashResult<Option<String>> {
        match self.read(name).await {
            Some(payload) => Ok(Some(String::from_utf8(payload.into_bytes().to_vec())?)),
            None => Ok(None),
        }
    }

    /// Reads the payload under `name` and returns the backend that served it.
    pub async fn read_tracked(&self, name: &str) -> Option<(BackendCapability, Payload)> {
        for adapter in &self.adapters {
            let backend = adapter.capability();
            match adapter.read(name).await {
                Ok(payload) => {
                    tracing::debug!(%backend, name, size = payload.size(), "read payload");
                    return Some((backend, payload));
                }
                Err(err) => self.sink.warn(backend, Operation::Read, &err),
            }
        }

        tracing::debug!(name, "no backend holds the name");
        None
    }
}

impl fmt::Debug for StorageGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageGateway")
            .field("support", &self.support)
            .field("wanted", &self.wanted)
            .field("eligible", &self.eligible())
            .field("sink", &self.sink)
            .finish()
    }
}
