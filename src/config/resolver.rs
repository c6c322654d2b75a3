use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use uuid::Uuid;

use crate::model::{DataCenterInfo, Endpoint};

use super::client_config::{ClientConfig, ClientSettings};
use super::defaults::*;
use super::error::ConfigError;
use super::host_probe::{DefaultHostProbe, HostProbe};
use super::instance_config::{InstanceConfig, InstanceSettings};
use super::Config;

/// Normalizes user-supplied configuration into a frozen [`Config`].
///
/// `resolve` is idempotent: the first successful call is cached, and every later call
/// (regardless of the arguments passed) returns that same cached result: repeated calls are
/// idempotent, and a running Client never observes two different resolved configs.
pub struct Resolver<P: HostProbe = DefaultHostProbe> {
    host_probe: P,
    cached: OnceLock<Arc<Config>>,
}

impl Resolver<DefaultHostProbe> {
    pub fn new() -> Self {
        Self {
            host_probe: DefaultHostProbe,
            cached: OnceLock::new(),
        }
    }
}

impl Default for Resolver<DefaultHostProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: HostProbe> Resolver<P> {
    pub fn with_host_probe(host_probe: P) -> Self {
        Self {
            host_probe,
            cached: OnceLock::new(),
        }
    }

    pub fn resolve(
        &self,
        instance: InstanceConfig,
        client: ClientConfig,
    ) -> Result<Arc<Config>, ConfigError> {
        if let Some(cached) = self.cached.get() {
            return Ok(Arc::clone(cached));
        }
        let resolved = Arc::new(self.resolve_fresh(instance, client)?);
        Ok(Arc::clone(self.cached.get_or_init(|| resolved)))
    }

    fn resolve_fresh(
        &self,
        instance: InstanceConfig,
        client: ClientConfig,
    ) -> Result<Config, ConfigError> {
        let instance_settings = self.resolve_instance(&instance)?;
        let client_settings = resolve_client(&client, &instance_settings);

        Ok(Config::new(
            instance_settings,
            trim_map(instance.metadata),
            client_settings,
        ))
    }

    fn resolve_instance(
        &self,
        cfg: &InstanceConfig,
    ) -> Result<InstanceSettings, ConfigError> {
        let app_name = trimmed_or(&cfg.app_name, DEFAULT_APP_NAME);
        let instance_id = trimmed_or_else(&cfg.instance_id, new_instance_id);

        let prefer_ip_address = cfg.prefer_ip_address.unwrap_or(false);

        let (host_name, ip_address) = self.resolve_host_identity(cfg)?;

        let (non_secure_port_enabled, non_secure_port) =
            resolve_port(cfg.non_secure_port, cfg.non_secure_port_enabled, DEFAULT_NON_SECURE_PORT, true);
        let (secure_port_enabled, secure_port) =
            resolve_port(cfg.secure_port, cfg.secure_port_enabled, DEFAULT_SECURE_PORT, false);

        let vip_address = trimmed_or(&cfg.vip_address, &app_name);
        let secure_vip_address = trimmed_or(&cfg.secure_vip_address, &app_name);

        let lease_renewal_interval_in_seconds = positive_or(
            cfg.lease_renewal_interval_in_seconds,
            DEFAULT_RENEWAL_INTERVAL_SECS,
        );
        let lease_expiration_duration_in_seconds = positive_or(
            cfg.lease_expiration_duration_in_seconds,
            DEFAULT_LEASE_DURATION_SECS,
        );

        let registry_enabled = cfg.registry_enabled.unwrap_or(true);
        let instance_enabled_on_it = cfg.instance_enabled_on_it.unwrap_or(true);
        let data_center_info = cfg.data_center_info.clone().unwrap_or_default();

        let advertised_host = if prefer_ip_address {
            ip_address.clone()
        } else {
            host_name.clone()
        };
        let (scheme, port) = if non_secure_port_enabled {
            ("http", non_secure_port)
        } else {
            ("https", secure_port)
        };

        let home_page_url = trimmed_or_else(&cfg.home_page_url, || {
            synthesize_url(
                scheme,
                &advertised_host,
                port,
                trimmed_or(&cfg.home_page_url_path, DEFAULT_HOME_PAGE_URL_PATH).as_str(),
            )
        });
        let status_page_url = trimmed_or_else(&cfg.status_page_url, || {
            synthesize_url(
                scheme,
                &advertised_host,
                port,
                trimmed_or(&cfg.status_page_url_path, DEFAULT_STATUS_PAGE_URL_PATH).as_str(),
            )
        });
        let health_check_url = trimmed_or_else(&cfg.health_check_url, || {
            synthesize_url(
                scheme,
                &advertised_host,
                port,
                trimmed_or(&cfg.health_check_url_path, DEFAULT_HEALTH_CHECK_URL_PATH).as_str(),
            )
        });

        Ok(InstanceSettings {
            app_name,
            instance_id,
            host_name,
            ip_address,
            prefer_ip_address,
            instance_enabled_on_it,
            non_secure_port_enabled,
            non_secure_port,
            secure_port_enabled,
            secure_port,
            vip_address,
            secure_vip_address,
            home_page_url,
            status_page_url,
            health_check_url,
            lease_renewal_interval_in_seconds,
            lease_expiration_duration_in_seconds,
            registry_enabled,
            data_center_info,
        })
    }

    fn resolve_host_identity(
        &self,
        cfg: &InstanceConfig,
    ) -> Result<(String, String), ConfigError> {
        let host_name = match &cfg.host_name {
            Some(h) if !h.trim().is_empty() => h.trim().to_string(),
            _ => self
                .host_probe
                .hostname()
                .map_err(|e| ConfigError::HostProbeFailed(e.to_string()))?,
        };
        let ip_address = match &cfg.ip_address {
            Some(ip) if !ip.trim().is_empty() => ip.trim().to_string(),
            _ => self
                .host_probe
                .local_ipv4()
                .map_err(|e| ConfigError::HostProbeFailed(e.to_string()))?,
        };
        Ok((host_name, ip_address))
    }
}

fn resolve_port(
    configured: Option<u16>,
    configured_enabled: Option<bool>,
    default_port: u16,
    default_enabled_when_absent: bool,
) -> (bool, u16) {
    match configured {
        Some(port) if port > 0 => (true, port),
        _ => (
            configured_enabled.unwrap_or(default_enabled_when_absent),
            default_port,
        ),
    }
}

fn resolve_client(cfg: &ClientConfig, instance: &InstanceSettings) -> ClientSettings {
    let region = trimmed_or(&cfg.region, DEFAULT_REGION);
    let zone = trimmed_or(&cfg.zone, DEFAULT_ZONE);

    let mut zones_in_region: Vec<String> = cfg
        .available_zones
        .get(&region)
        .map(|csv| split_csv(csv))
        .unwrap_or_default();
    if !zones_in_region.iter().any(|z| z == &zone) {
        zones_in_region.push(zone.clone());
    }

    let service_url_of_default_zone =
        trimmed_or(&cfg.service_url_of_default_zone, DEFAULT_SERVICE_URL);

    let mut service_url_of_all_zone = cfg.service_url_of_all_zone.clone();
    for z in &zones_in_region {
        if service_url_of_all_zone.contains_key(z) {
            continue;
        }
        let url = if z == DEFAULT_ZONE {
            service_url_of_default_zone.clone()
        } else {
            DEFAULT_SERVICE_URL.to_string()
        };
        service_url_of_all_zone.insert(z.clone(), url);
    }

    let read_timeout = Duration::from_secs(
        cfg.eureka_server_read_timeout_seconds
            .unwrap_or(DEFAULT_READ_TIMEOUT_SECS),
    );
    let connect_timeout = Duration::from_secs(
        cfg.eureka_server_connect_timeout_seconds
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
    );

    let mut endpoints_by_zone = HashMap::new();
    for (z, url) in &service_url_of_all_zone {
        let mut endpoint = Endpoint::new(url.clone(), z.clone())
            .with_timeouts(read_timeout, connect_timeout);
        if let (Some(user), Some(pass)) = (
            cfg.eureka_server_username.as_ref(),
            cfg.eureka_server_password.as_ref(),
        ) {
            endpoint = endpoint.with_credentials(user.clone(), pass.clone());
        }
        endpoints_by_zone.insert(z.clone(), endpoint);
    }

    let _ = &instance.app_name; // instance settings currently don't affect zone resolution

    ClientSettings {
        discovery_enabled: cfg.discovery_enabled.unwrap_or(true),
        registry_fetch_interval: Duration::from_secs(u64::from(positive_or(
            cfg.registry_fetch_interval_seconds,
            DEFAULT_REGISTRY_FETCH_INTERVAL_SECS,
        ))),
        prefer_same_zone_eureka: cfg.prefer_same_zone_eureka.unwrap_or(true),
        region,
        zone,
        zones_in_region,
        endpoints_by_zone,
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn new_instance_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn trimmed_or(value: &Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}

fn trimmed_or_else(value: &Option<String>, default: impl FnOnce() -> String) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default(),
    }
}

fn positive_or(value: Option<u32>, default: u32) -> u32 {
    match value {
        Some(v) if v > 0 => v,
        _ => default,
    }
}

fn trim_map(map: HashMap<String, String>) -> HashMap<String, String> {
    map.into_iter()
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

fn synthesize_url(scheme: &str, host: &str, port: u16, path: &str) -> String {
    format!("{scheme}://{host}:{port}{path}")
}
