//! Test fixtures and gateway helpers.
//!
//! Provides a sample payload and convenience constructors for gateways
//! over an in-memory host.

use crate::sink::RecordingSink;
use std::rc::Rc;
use webstash_core::{BackendCapability, GatewayConfig, MemoryHost, Payload, StorageGateway};

/// A small PNG image (48x48, 3250 bytes).
pub const SAMPLE_PNG: &[u8] = include_bytes!("../fixtures/sample.png");

/// Returns [`SAMPLE_PNG`] as an `image/png` payload.
pub fn sample_png() -> Payload {
    Payload::with_media_type(SAMPLE_PNG, "image/png")
}

/// A gateway over an in-memory host, with its sink kept for assertions.
pub struct TestGateway {
    /// The gateway under test.
    pub gateway: StorageGateway,
    /// The host the gateway was built over.
    pub host: MemoryHost,
    /// Every warning the gateway emitted.
    pub sink: Rc<RecordingSink>,
}

impl TestGateway {
    /// Creates a gateway over a fully capable host.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_host(MemoryHost::new(), config)
    }

    /// Creates a gateway over `host`.
    ///
    /// Any sink already set on `config` is replaced by a [`RecordingSink`].
    pub fn with_host(host: MemoryHost, config: GatewayConfig) -> Self {
        let sink = Rc::new(RecordingSink::new());
        let gateway = StorageGateway::new(Rc::new(host.clone()), config.sink(sink.clone()));
        Self {
            gateway,
            host,
            sink,
        }
    }

    /// Creates a gateway that only wants `capability`.
    pub fn only(capability: BackendCapability) -> Self {
        Self::new(GatewayConfig::only(capability))
    }

    /// Creates a second gateway over the same host.
    pub fn sibling(&self, config: GatewayConfig) -> TestGateway {
        TestGateway::with_host(self.host.clone(), config)
    }
}

impl std::ops::Deref for TestGateway {
    type Target = StorageGateway;

    fn deref(&self) -> &Self::Target {
        &self.gateway
    }
}

/// The progressively restricted configurations of the fallback chain,
/// paired with the backend each one should land on.
///
/// The first entry is the default configuration; each following entry
/// additionally turns off the backend the previous one landed on.
pub fn fallback_chain() -> Vec<(GatewayConfig, BackendCapability)> {
    let mut config = GatewayConfig::default();
    let mut chain = Vec::with_capacity(BackendCapability::PREFERENCE_ORDER.len());

    for capability in BackendCapability::PREFERENCE_ORDER {
        chain.push((config.clone(), capability));
        let wanted = config.wanted_map().with(capability, false);
        config = config.wanted(wanted);
    }

    chain
}

/// Runs `f` with a gateway over a fully capable host.
pub fn with_gateway<F, R>(config: GatewayConfig, f: F) -> R
where
    F: FnOnce(&TestGateway) -> R,
{
    let test = TestGateway::new(config);
    f(&test)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_png_has_signature() {
        assert_eq!(&SAMPLE_PNG[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(sample_png().size(), 3250);
    }

    #[test]
    fn fallback_chain_lands_on_each_backend() {
        let chain = fallback_chain();
        assert_eq!(chain.len(), 5);

        for (config, expected) in &chain {
            let eligible = TestGateway::new(config.clone()).eligible();
            assert_eq!(eligible.first(), Some(expected));
        }
        assert_eq!(
            chain[4].0.wanted_map().iter().collect::<Vec<_>>(),
            vec![BackendCapability::Cookie]
        );
    }
}
