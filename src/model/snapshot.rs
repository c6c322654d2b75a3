use std::collections::HashMap;

use super::app::App;

/// The Discovery Agent's current world-view: a mapping from zone name to the sequence of
/// `App`s last successfully fetched from that zone.
///
/// Installed atomically by the Discovery Agent —
/// this type itself is a plain, immutable value; the publication discipline lives in
/// [`crate::discovery::agent::DiscoveryAgent`], which holds it behind an `ArcSwap`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    zones: HashMap<String, Vec<App>>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    pub fn zone(&self, zone: &str) -> Option<&[App]> {
        self.zones.get(zone).map(Vec::as_slice)
    }

    pub fn zones(&self) -> impl Iterator<Item = &String> {
        self.zones.keys()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn contains_zone(&self, zone: &str) -> bool {
        self.zones.contains_key(zone)
    }
}

/// Assembles a [`Snapshot`] from per-zone fetch results before the single atomic install.
#[derive(Default)]
pub struct SnapshotBuilder {
    zones: HashMap<String, Vec<App>>,
}

impl SnapshotBuilder {
    pub fn insert(mut self, zone: impl Into<String>, apps: Vec<App>) -> Self {
        self.zones.insert(zone.into(), apps);
        self
    }

    pub fn build(self) -> Snapshot {
        Snapshot { zones: self.zones }
    }
}
