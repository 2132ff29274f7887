//! Backend selection.

use crate::capability::{BackendCapability, CapabilityMap};

/// Returns the backends both supported and wanted, in preference order.
///
/// An empty result is valid: no backend is available.
pub fn eligible(support: &CapabilityMap, wanted: &CapabilityMap) -> Vec<BackendCapability> {
    support.intersect(wanted).iter().collect()
}
