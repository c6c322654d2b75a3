use serde::{Deserialize, Serialize};

use super::instance::Instance;

/// A named group of service instances sharing `app_name`.
///
/// Invariant: every `Instance` in `instances` has `app_name` equal to `name`,
/// case-insensitively — enforced by whoever assembles the `App` (the discovery fetch cycle,
/// or the wire decoder), never by `App` itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub name: String,
    pub instances: Vec<Instance>,
    #[serde(skip)]
    pub region: String,
    #[serde(skip)]
    pub zone: String,
}

impl App {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: Vec::new(),
            region: String::new(),
            zone: String::new(),
        }
    }

    /// A deep copy of this `App` and every `Instance` it contains.
    pub fn defensive_copy(&self) -> Self {
        self.clone()
    }

    /// Returns a copy of this `App` restricted to `UP` instances, or `None` if none remain.
    pub fn restricted_to_up(&self) -> Option<Self> {
        let instances: Vec<Instance> = self
            .instances
            .iter()
            .filter(|i| i.is_up())
            .map(Instance::defensive_copy)
            .collect();
        if instances.is_empty() {
            return None;
        }
        Some(Self {
            name: self.name.clone(),
            instances,
            region: self.region.clone(),
            zone: self.zone.clone(),
        })
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn matches_vip(&self, vip: &str) -> bool {
        self.instances.iter().any(|i| i.vip_address == vip)
    }

    pub fn matches_svip(&self, svip: &str) -> bool {
        self.instances.iter().any(|i| i.secure_vip_address == svip)
    }

    /// Restricted to `UP` instances whose `vip_address` equals `vip`.
    pub fn filtered_by_vip(&self, vip: &str) -> Option<Self> {
        self.filtered(|i| i.is_up() && i.vip_address == vip)
    }

    /// Restricted to `UP` instances whose `secure_vip_address` equals `svip`.
    pub fn filtered_by_svip(&self, svip: &str) -> Option<Self> {
        self.filtered(|i| i.is_up() && i.secure_vip_address == svip)
    }

    fn filtered<F: Fn(&Instance) -> bool>(&self, pred: F) -> Option<Self> {
        let instances: Vec<Instance> = self
            .instances
            .iter()
            .filter(|i| pred(i))
            .map(Instance::defensive_copy)
            .collect();
        if instances.is_empty() {
            return None;
        }
        Some(Self {
            name: self.name.clone(),
            instances,
            region: self.region.clone(),
            zone: self.zone.clone(),
        })
    }
}
