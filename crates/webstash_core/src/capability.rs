//! Backend capabilities and capability maps.

use std::fmt;

/// One of the five persistence mechanisms the gateway knows about.
///
/// Declaration order is the preference order: most capacity and robustness
/// first. `Ord` follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BackendCapability {
    /// Sandboxed, quota-bounded file area.
    FileHandle,
    /// Versioned record store (IndexedDB).
    IndexedRecord,
    /// Persistent string-keyed map (localStorage).
    PersistentKv,
    /// Session-scoped string-keyed map (sessionStorage).
    SessionKv,
    /// Same-origin cookie string.
    Cookie,
}

impl BackendCapability {
    /// Every capability, in preference order.
    pub const PREFERENCE_ORDER: [BackendCapability; 5] = [
        BackendCapability::FileHandle,
        BackendCapability::IndexedRecord,
        BackendCapability::PersistentKv,
        BackendCapability::SessionKv,
        BackendCapability::Cookie,
    ];

    /// Returns the host-facing name of the mechanism.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BackendCapability::FileHandle => "FileSystem",
            BackendCapability::IndexedRecord => "IndexedDB",
            BackendCapability::PersistentKv => "LocalStorage",
            BackendCapability::SessionKv => "SessionStorage",
            BackendCapability::Cookie => "Cookie",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BackendCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A boolean per [`BackendCapability`].
///
/// Used both for what the host supports and for what the caller wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CapabilityMap {
    flags: [bool; 5],
}

impl CapabilityMap {
    /// A map with every capability set.
    #[must_use]
    pub const fn all() -> Self {
        Self { flags: [true; 5] }
    }

    /// A map with no capability set.
    #[must_use]
    pub const fn none() -> Self {
        Self { flags: [false; 5] }
    }

    /// A map with exactly `capability` set.
    #[must_use]
    pub fn only(capability: BackendCapability) -> Self {
        Self::none().with(capability, true)
    }

    /// Returns the flag for `capability`.
    #[must_use]
    pub const fn get(&self, capability: BackendCapability) -> bool {
        self.flags[capability.index()]
    }

    /// Sets the flag for `capability`.
    pub fn set(&mut self, capability: BackendCapability, value: bool) {
        self.flags[capability.index()] = value;
    }

    /// Returns a copy with the flag for `capability` replaced.
    #[must_use]
    pub fn with(mut self, capability: BackendCapability, value: bool) -> Self {
        self.set(capability, value);
        self
    }

    /// Capabilities set in both maps.
    #[must_use]
    pub fn intersect(&self, other: &CapabilityMap) -> CapabilityMap {
        let mut flags = [false; 5];
        for (i, flag) in flags.iter_mut().enumerate() {
            *flag = self.flags[i] && other.flags[i];
        }
        CapabilityMap { flags }
    }

    /// Iterates the set capabilities in preference order.
    pub fn iter(&self) -> impl Iterator<Item = BackendCapability> + '_ {
        BackendCapability::PREFERENCE_ORDER
            .into_iter()
            .filter(move |c| self.get(*c))
    }

    /// Returns true if no capability is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.iter().all(|f| !f)
    }
}

impl Default for CapabilityMap {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<BackendCapability> for CapabilityMap {
    fn from_iter<I: IntoIterator<Item = BackendCapability>>(iter: I) -> Self {
        let mut map = CapabilityMap::none();
        for capability in iter {
            map.set(capability, true);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_order_matches_ord() {
        let mut sorted = BackendCapability::PREFERENCE_ORDER;
        sorted.sort();
        assert_eq!(sorted, BackendCapability::PREFERENCE_ORDER);
        assert!(BackendCapability::FileHandle < BackendCapability::Cookie);
    }

    #[test]
    fn default_map_is_all() {
        let map = CapabilityMap::default();
        assert_eq!(map.iter().count(), 5);
        assert!(!map.is_empty());
        assert!(CapabilityMap::none().is_empty());
    }

    #[test]
    fn intersect_keeps_common_flags() {
        let a = CapabilityMap::all().with(BackendCapability::FileHandle, false);
        let b = CapabilityMap::none()
            .with(BackendCapability::FileHandle, true)
            .with(BackendCapability::Cookie, true);

        let both = a.intersect(&b);
        assert_eq!(both.iter().collect::<Vec<_>>(), vec![BackendCapability::Cookie]);
    }

    #[test]
    fn iter_follows_preference_order() {
        let map: CapabilityMap = [BackendCapability::Cookie, BackendCapability::IndexedRecord]
            .into_iter()
            .collect();
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![BackendCapability::IndexedRecord, BackendCapability::Cookie]
        );
    }

    #[test]
    fn display_uses_host_names() {
        assert_eq!(BackendCapability::PersistentKv.to_string(), "LocalStorage");
        assert_eq!(BackendCapability::FileHandle.to_string(), "FileSystem");
    }
}
