use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle/availability status of an [`Instance`] as reported to (or by) the registry.
///
/// Unknown strings supplied by the *server* degrade to [`Status::Unknown`] rather than
/// rejecting the whole entity (see the status-enum design note in the registration agent);
/// unknown strings supplied by the *caller* of `change_status` are rejected earlier, before
/// a value of this type is ever constructed from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    Down,
    #[serde(rename = "STARTING")]
    Starting,
    #[serde(rename = "OUT_OF_SERVICE")]
    OutOfService,
    #[serde(other)]
    Unknown,
}

impl Status {
    /// Parses a status string supplied by a caller (e.g. `change_status`). Unlike the
    /// `Deserialize` impl used for server-supplied payloads, this rejects any string outside
    /// the five recognized values instead of degrading it to `Unknown`; `"UNKNOWN"` itself is
    /// accepted as an explicit, valid caller-supplied status.
    pub fn parse_caller_supplied(raw: &str) -> Option<Self> {
        match raw {
            "UP" => Some(Status::Up),
            "DOWN" => Some(Status::Down),
            "STARTING" => Some(Status::Starting),
            "OUT_OF_SERVICE" => Some(Status::OutOfService),
            "UNKNOWN" => Some(Status::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "UP",
            Status::Down => "DOWN",
            Status::Starting => "STARTING",
            Status::OutOfService => "OUT_OF_SERVICE",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What changed about an [`Instance`] between two discovery fetches, as annotated by the
/// registry server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ActionType {
    #[serde(rename = "ADDED")]
    Added,
    #[serde(rename = "MODIFIED")]
    Modified,
    #[serde(rename = "DELETED")]
    Deleted,
    #[serde(other)]
    #[default]
    Unknown,
}

/// One side (plain or TLS) of an instance's listening address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub enabled: bool,
    pub port: u16,
}

impl Port {
    pub fn new(enabled: bool, port: u16) -> Self {
        Self { enabled, port }
    }
}

/// Lease bookkeeping: how often the client renews, how long the server waits before expiring
/// an unrenewed instance, and (once known) the server-assigned registration/renewal timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseInfo {
    pub renewal_interval_secs: u32,
    pub duration_secs: u32,
    pub registration_timestamp: i64,
    pub last_renewal_timestamp: i64,
    pub eviction_timestamp: i64,
    pub service_up_timestamp: i64,
}

impl Default for LeaseInfo {
    fn default() -> Self {
        Self {
            renewal_interval_secs: 30,
            duration_secs: 90,
            registration_timestamp: 0,
            last_renewal_timestamp: 0,
            eviction_timestamp: 0,
            service_up_timestamp: 0,
        }
    }
}

/// Client-declared data-center tag. Essential attributes only; cloud-specific metadata
/// (AWS/Amazon data center info) is out of scope for this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCenterInfo {
    pub class: String,
    pub name: String,
}

impl Default for DataCenterInfo {
    fn default() -> Self {
        Self {
            class: "com.netflix.appinfo.InstanceInfo$DefaultDataCenterInfo".to_string(),
            name: "MyOwn".to_string(),
        }
    }
}

/// An advertised endpoint belonging to exactly one [`crate::model::App`].
///
/// `region` and `zone` are client-side annotations stamped by the Discovery Agent when it
/// installs a snapshot; they are not part of the registry wire format and are
/// empty for an `Instance` built locally by the Registration Agent before it has been through
/// a discovery fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub instance_id: String,
    pub app_name: String,
    pub host_name: String,
    pub ip_address: String,
    pub non_secure_port: Port,
    pub secure_port: Port,
    pub status: Status,
    pub overridden_status: Status,
    pub vip_address: String,
    pub secure_vip_address: String,
    pub home_page_url: String,
    pub status_page_url: String,
    pub health_check_url: String,
    pub metadata: HashMap<String, String>,
    pub lease_info: LeaseInfo,
    pub data_center_info: DataCenterInfo,
    pub action_type: ActionType,
    #[serde(skip)]
    pub region: String,
    #[serde(skip)]
    pub zone: String,
}

impl Instance {
    /// `true` iff this instance currently counts as available.
    pub fn is_up(&self) -> bool {
        self.status == Status::Up
    }

    /// A deep copy suitable for handing back to a caller. `Instance` has no interior mutability
    /// or shared pointers, so a `Clone` already produces an independent value; this exists to
    /// name the intent at call
    /// sites in the query engine.
    pub fn defensive_copy(&self) -> Self {
        self.clone()
    }
}
