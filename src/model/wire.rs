//! JSON wire shapes for the registry REST contract.
//!
//! The registry encodes a handful of fields oddly relative to the domain types in
//! [`crate::model`]: ports are `{"@enabled": "true"|"false", "$": <int>}`, `dataCenterInfo`
//! carries an `@class` discriminator, and list responses wrap their payload under
//! `applications.application[]` / `application.instance[]` / `instance`. This module is the
//! only place that format leaks into; everywhere else in the crate works with the plain
//! domain types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::app::App;
use super::instance::{ActionType, DataCenterInfo, Instance, LeaseInfo, Port, Status};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PortDto {
    #[serde(rename = "@enabled", with = "enabled_as_string")]
    enabled: bool,
    #[serde(rename = "$")]
    port: u16,
}

mod enabled_as_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw == "true")
    }
}

impl From<Port> for PortDto {
    fn from(p: Port) -> Self {
        PortDto {
            enabled: p.enabled,
            port: p.port,
        }
    }
}

impl From<PortDto> for Port {
    fn from(p: PortDto) -> Self {
        Port::new(p.enabled, p.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataCenterInfoDto {
    #[serde(rename = "@class")]
    class: String,
    name: String,
}

impl From<DataCenterInfo> for DataCenterInfoDto {
    fn from(d: DataCenterInfo) -> Self {
        DataCenterInfoDto {
            class: d.class,
            name: d.name,
        }
    }
}

impl From<DataCenterInfoDto> for DataCenterInfo {
    fn from(d: DataCenterInfoDto) -> Self {
        DataCenterInfo {
            class: d.class,
            name: d.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LeaseInfoDto {
    #[serde(rename = "renewalIntervalInSecs")]
    renewal_interval_in_secs: u32,
    #[serde(rename = "durationInSecs")]
    duration_in_secs: u32,
    #[serde(default, rename = "registrationTimestamp")]
    registration_timestamp: i64,
    #[serde(default, rename = "lastRenewalTimestamp")]
    last_renewal_timestamp: i64,
    #[serde(default, rename = "evictionTimestamp")]
    eviction_timestamp: i64,
    #[serde(default, rename = "serviceUpTimestamp")]
    service_up_timestamp: i64,
}

impl From<LeaseInfo> for LeaseInfoDto {
    fn from(l: LeaseInfo) -> Self {
        LeaseInfoDto {
            renewal_interval_in_secs: l.renewal_interval_secs,
            duration_in_secs: l.duration_secs,
            registration_timestamp: l.registration_timestamp,
            last_renewal_timestamp: l.last_renewal_timestamp,
            eviction_timestamp: l.eviction_timestamp,
            service_up_timestamp: l.service_up_timestamp,
        }
    }
}

impl From<LeaseInfoDto> for LeaseInfo {
    fn from(l: LeaseInfoDto) -> Self {
        LeaseInfo {
            renewal_interval_secs: l.renewal_interval_in_secs,
            duration_secs: l.duration_in_secs,
            registration_timestamp: l.registration_timestamp,
            last_renewal_timestamp: l.last_renewal_timestamp,
            eviction_timestamp: l.eviction_timestamp,
            service_up_timestamp: l.service_up_timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct InstanceDto {
    #[serde(rename = "instanceId")]
    instance_id: String,
    #[serde(rename = "app")]
    app_name: String,
    #[serde(rename = "hostName")]
    host_name: String,
    #[serde(rename = "ipAddr")]
    ip_address: String,
    port: PortDto,
    #[serde(rename = "securePort")]
    secure_port: PortDto,
    status: Status,
    #[serde(rename = "overriddenstatus")]
    overridden_status: Status,
    #[serde(rename = "vipAddress")]
    vip_address: String,
    #[serde(rename = "secureVipAddress")]
    secure_vip_address: String,
    #[serde(rename = "homePageUrl")]
    home_page_url: String,
    #[serde(rename = "statusPageUrl")]
    status_page_url: String,
    #[serde(rename = "healthCheckUrl")]
    health_check_url: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(rename = "leaseInfo")]
    lease_info: LeaseInfoDto,
    #[serde(rename = "dataCenterInfo")]
    data_center_info: DataCenterInfoDto,
    #[serde(default, rename = "actionType")]
    action_type: ActionType,
}

impl From<&Instance> for InstanceDto {
    fn from(i: &Instance) -> Self {
        InstanceDto {
            instance_id: i.instance_id.clone(),
            app_name: i.app_name.clone(),
            host_name: i.host_name.clone(),
            ip_address: i.ip_address.clone(),
            port: i.non_secure_port.into(),
            secure_port: i.secure_port.into(),
            status: i.status,
            overridden_status: i.overridden_status,
            vip_address: i.vip_address.clone(),
            secure_vip_address: i.secure_vip_address.clone(),
            home_page_url: i.home_page_url.clone(),
            status_page_url: i.status_page_url.clone(),
            health_check_url: i.health_check_url.clone(),
            metadata: i.metadata.clone(),
            lease_info: i.lease_info.into(),
            data_center_info: i.data_center_info.clone().into(),
            action_type: i.action_type,
        }
    }
}

impl From<InstanceDto> for Instance {
    fn from(d: InstanceDto) -> Self {
        Instance {
            instance_id: d.instance_id,
            app_name: d.app_name,
            host_name: d.host_name,
            ip_address: d.ip_address,
            non_secure_port: d.port.into(),
            secure_port: d.secure_port.into(),
            status: d.status,
            overridden_status: d.overridden_status,
            vip_address: d.vip_address,
            secure_vip_address: d.secure_vip_address,
            home_page_url: d.home_page_url,
            status_page_url: d.status_page_url,
            health_check_url: d.health_check_url,
            metadata: d.metadata,
            lease_info: d.lease_info.into(),
            data_center_info: d.data_center_info.into(),
            action_type: d.action_type,
            region: String::new(),
            zone: String::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub instance: InstanceDtoRef<'a>,
}

/// Serialize-only wrapper avoiding an allocation when building the register body.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub(crate) struct InstanceDtoRef<'a>(#[serde(with = "instance_dto_ref")] pub &'a Instance);

mod instance_dto_ref {
    use super::{Instance, InstanceDto};
    use serde::{Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &&Instance, serializer: S) -> Result<S::Ok, S::Error> {
        InstanceDto::from(*value).serialize(serializer)
    }
}

#[derive(Debug, Deserialize)]
struct SingleInstanceEnvelope {
    instance: InstanceDto,
}

#[derive(Debug, Default, Deserialize)]
struct InstanceListEnvelope {
    #[serde(default, rename = "instance")]
    instance: Vec<InstanceDto>,
}

#[derive(Debug, Deserialize)]
struct AppEnvelope {
    name: String,
    #[serde(flatten)]
    instances: InstanceListEnvelope,
}

#[derive(Debug, Default, Deserialize)]
struct AppListEnvelope {
    #[serde(default, rename = "application")]
    application: Vec<AppEnvelope>,
}

#[derive(Debug, Deserialize)]
struct ApplicationsEnvelope {
    #[serde(default)]
    applications: AppListEnvelope,
}

#[derive(Debug, Deserialize)]
struct SingleApplicationEnvelope {
    application: AppEnvelope,
}

fn app_from_envelope(e: AppEnvelope) -> App {
    App {
        name: e.name,
        instances: e.instances.instance.into_iter().map(Instance::from).collect(),
        region: String::new(),
        zone: String::new(),
    }
}

/// Parses a `QueryApps`/`QueryVipApps`/`QuerySvipApps` response body: `applications.application[]`.
pub(crate) fn parse_apps(body: &[u8]) -> Result<Vec<App>, serde_json::Error> {
    let envelope: ApplicationsEnvelope = serde_json::from_slice(body)?;
    Ok(envelope
        .applications
        .application
        .into_iter()
        .map(app_from_envelope)
        .collect())
}

/// Parses a `QueryApp` response body: a single `application.instance[]`.
pub(crate) fn parse_app(body: &[u8]) -> Result<App, serde_json::Error> {
    let envelope: SingleApplicationEnvelope = serde_json::from_slice(body)?;
    Ok(app_from_envelope(envelope.application))
}

/// Parses a `QueryAppInstance`/`QueryInstance` response body: a single `instance`.
pub(crate) fn parse_instance(body: &[u8]) -> Result<Instance, serde_json::Error> {
    let envelope: SingleInstanceEnvelope = serde_json::from_slice(body)?;
    Ok(envelope.instance.into())
}

/// Serializes the register request body: `{"instance": <Instance>}`.
pub(crate) fn register_body(instance: &Instance) -> Vec<u8> {
    let request = RegisterRequest {
        instance: InstanceDtoRef(instance),
    };
    serde_json::to_vec(&request).expect("Instance is always representable as JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::instance::{DataCenterInfo, LeaseInfo, Port, Status};

    fn sample_instance() -> Instance {
        Instance {
            instance_id: "svc-a#1".to_string(),
            app_name: "svc-a".to_string(),
            host_name: "host1".to_string(),
            ip_address: "10.0.0.1".to_string(),
            non_secure_port: Port::new(true, 8080),
            secure_port: Port::new(false, 443),
            status: Status::Up,
            overridden_status: Status::Unknown,
            vip_address: "svc-a".to_string(),
            secure_vip_address: "svc-a".to_string(),
            home_page_url: "http://host1:8080/".to_string(),
            status_page_url: "http://host1:8080/actuator/info".to_string(),
            health_check_url: "http://host1:8080/actuator/health".to_string(),
            metadata: HashMap::new(),
            lease_info: LeaseInfo::default(),
            data_center_info: DataCenterInfo::default(),
            action_type: ActionType::Added,
            region: String::new(),
            zone: String::new(),
        }
    }

    #[test]
    fn register_body_round_trips_essential_fields() {
        let instance = sample_instance();
        let body = register_body(&instance);
        let parsed = parse_instance_from_register_body(&body);

        assert_eq!(parsed.instance_id, instance.instance_id);
        assert_eq!(parsed.status, instance.status);
        assert_eq!(parsed.non_secure_port, instance.non_secure_port);
        assert_eq!(parsed.secure_port, instance.secure_port);
        assert_eq!(parsed.data_center_info, instance.data_center_info);
    }

    fn parse_instance_from_register_body(body: &[u8]) -> Instance {
        #[derive(Deserialize)]
        struct Envelope {
            instance: InstanceDto,
        }
        let envelope: Envelope = serde_json::from_slice(body).unwrap();
        envelope.instance.into()
    }

    #[test]
    fn port_enabled_flag_round_trips_through_at_string_encoding() {
        let dto = PortDto {
            enabled: true,
            port: 8080,
        };
        let json = serde_json::to_string(&dto).unwrap();
        assert!(json.contains("\"@enabled\":\"true\""));
        let back: PortDto = serde_json::from_str(&json).unwrap();
        assert!(back.enabled);
        assert_eq!(back.port, 8080);
    }

    #[test]
    fn parse_apps_accepts_empty_applications() {
        let body = br#"{"applications":{"application":[]}}"#;
        let apps = parse_apps(body).unwrap();
        assert!(apps.is_empty());
    }

    #[test]
    fn parse_apps_reads_nested_instances() {
        let body = br#"{"applications":{"application":[{"name":"svc-x","instance":[]}]}}"#;
        let apps = parse_apps(body).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name, "svc-x");
    }

    #[test]
    fn unknown_status_from_server_degrades_to_unknown() {
        let body = br#"{"status": "WEIRD"}"#;
        #[derive(Deserialize)]
        struct S {
            status: Status,
        }
        let s: S = serde_json::from_str(std::str::from_utf8(body).unwrap()).unwrap();
        assert_eq!(s.status, Status::Unknown);
    }
}
