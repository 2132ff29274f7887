//! # WebStash Testkit
//!
//! Test utilities for WebStash.
//!
//! This crate provides:
//! - Fixtures: a sample image payload, gateways over an in-memory host,
//!   and the progressive fallback configurations
//! - A recording diagnostic sink for asserting on recovered failures
//! - Property-based test generators using proptest
//! - Tracing initialisation for tests
//!
//! ## Usage
//!
//! ```rust
//! use webstash_testkit::prelude::*;
//!
//! let test = TestGateway::new(GatewayConfig::default());
//! block_on(async {
//!     assert!(test.save("image.jpg", sample_png()).await);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod logging;
pub mod sink;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::logging::*;
    pub use crate::sink::*;
    pub use futures::executor::block_on;
    pub use webstash_core::{
        BackendCapability, CapabilityMap, Fault, GatewayConfig, KvScope, MemoryHost, Operation,
        Payload, StorageGateway,
    };
}

pub use fixtures::*;
pub use generators::*;
pub use logging::*;
pub use sink::*;
