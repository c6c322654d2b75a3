use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::config::Config;
use crate::context::AgentContext;
use crate::model::{ActionType, Instance, LeaseInfo, Port, Status};
use crate::transport::{operations, TransportError};

use super::error::RegistrationError;
use super::state::LifecycleState;

struct AgentState {
    lifecycle: LifecycleState,
    instance: Instance,
}

/// Owns instance lifecycle, heartbeat loop, status & metadata mutations, deregistration.
pub struct RegistrationAgent {
    state: Mutex<AgentState>,
}

impl RegistrationAgent {
    pub fn new(config: &Config) -> Self {
        let instance = build_instance(config);
        let lifecycle = LifecycleState::initial(config.instance.instance_enabled_on_it);
        Self {
            state: Mutex::new(AgentState { lifecycle, instance }),
        }
    }

    /// A defensive copy of the instance this agent would (re-)register with the current
    /// status baked in.
    pub fn current_instance(&self) -> Instance {
        self.state.lock().expect("registration state poisoned").instance.defensive_copy()
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.state.lock().expect("registration state poisoned").lifecycle
    }

    pub fn register(&self, ctx: &dyn AgentContext) -> Result<(), RegistrationError> {
        if !ctx.config().instance.registry_enabled {
            return Err(RegistrationError::FeatureDisabled);
        }
        let endpoint = registry_endpoint(ctx)?;
        let instance = self.current_instance();
        operations::register(ctx.transport(), endpoint, &instance.app_name, &instance)?;
        Ok(())
    }

    pub fn change_status(&self, ctx: &dyn AgentContext, raw_status: &str) -> Result<(), RegistrationError> {
        if !ctx.config().instance.registry_enabled {
            return Err(RegistrationError::FeatureDisabled);
        }
        let status = Status::parse_caller_supplied(raw_status)
            .ok_or_else(|| RegistrationError::InvalidStatus(raw_status.to_string()))?;

        let endpoint = registry_endpoint(ctx)?;
        let (app_name, instance_id) = {
            let guard = self.state.lock().expect("registration state poisoned");
            (guard.instance.app_name.clone(), guard.instance.instance_id.clone())
        };
        operations::change_status(ctx.transport(), endpoint, &app_name, &instance_id, status.as_str())?;

        let mut guard = self.state.lock().expect("registration state poisoned");
        guard.lifecycle = LifecycleState::from(status);
        guard.instance.status = status;
        Ok(())
    }

    pub fn change_metadata(
        &self,
        ctx: &dyn AgentContext,
        updates: HashMap<String, String>,
    ) -> Result<(), RegistrationError> {
        if !ctx.config().instance.registry_enabled {
            return Err(RegistrationError::FeatureDisabled);
        }
        let endpoint = registry_endpoint(ctx)?;
        let (app_name, instance_id) = {
            let guard = self.state.lock().expect("registration state poisoned");
            (guard.instance.app_name.clone(), guard.instance.instance_id.clone())
        };
        operations::modify_metadata(ctx.transport(), endpoint, &app_name, &instance_id, &updates)?;

        // Merge only on success; a partial remote failure never reaches this line.
        ctx.config().merge_metadata(updates.clone());
        let mut guard = self.state.lock().expect("registration state poisoned");
        guard.instance.metadata.extend(updates);
        Ok(())
    }

    pub fn unregister(&self, ctx: &dyn AgentContext) -> Result<(), RegistrationError> {
        if !ctx.config().instance.registry_enabled {
            return Err(RegistrationError::FeatureDisabled);
        }
        let endpoint = registry_endpoint(ctx)?;
        let (app_name, instance_id) = {
            let guard = self.state.lock().expect("registration state poisoned");
            (guard.instance.app_name.clone(), guard.instance.instance_id.clone())
        };
        operations::unregister(ctx.transport(), endpoint, &app_name, &instance_id)?;

        let mut guard = self.state.lock().expect("registration state poisoned");
        guard.lifecycle = LifecycleState::Unregistered;
        Ok(())
    }

    /// Sends one heartbeat if the feature is enabled, heartbeat is enabled, and the lifecycle
    /// is `Up`. Failures are logged and swallowed — heartbeat failure is soft.
    pub(crate) fn tick_heartbeat(&self, ctx: &dyn AgentContext) {
        if !ctx.config().instance.registry_enabled {
            return;
        }
        let (app_name, instance_id, should_send) = {
            let guard = self.state.lock().expect("registration state poisoned");
            (
                guard.instance.app_name.clone(),
                guard.instance.instance_id.clone(),
                guard.lifecycle.heartbeat_enabled(),
            )
        };
        if !should_send {
            return;
        }
        let endpoint = match registry_endpoint(ctx) {
            Ok(endpoint) => endpoint,
            Err(err) => {
                debug!(%err, "skipping heartbeat tick, no endpoint available");
                return;
            }
        };
        match operations::heartbeat(ctx.transport(), endpoint, &app_name, &instance_id) {
            Ok(()) => debug!(app = %app_name, instance = %instance_id, "heartbeat sent"),
            Err(err) => warn!(app = %app_name, instance = %instance_id, %err, "heartbeat failed, will retry next tick"),
        }
    }
}

fn registry_endpoint<'a>(ctx: &'a dyn AgentContext) -> Result<&'a crate::model::Endpoint, RegistrationError> {
    ctx.config()
        .client
        .home_zone_endpoint()
        .ok_or_else(|| {
            RegistrationError::Transport(TransportError::NoEndpointAvailable(
                "no endpoint configured for the client's home zone".to_string(),
            ))
        })
}

/// Constructs the `Instance` an agent would register, from resolved configuration.
fn build_instance(config: &Config) -> Instance {
    let instance = &config.instance;
    let host_name = instance.advertised_host().to_string();
    let status = if instance.instance_enabled_on_it {
        Status::Up
    } else {
        Status::Starting
    };

    Instance {
        instance_id: instance.instance_id.clone(),
        app_name: instance.app_name.clone(),
        host_name,
        ip_address: instance.ip_address.clone(),
        non_secure_port: Port::new(instance.non_secure_port_enabled, instance.non_secure_port),
        secure_port: Port::new(instance.secure_port_enabled, instance.secure_port),
        status,
        overridden_status: Status::Unknown,
        vip_address: instance.vip_address.clone(),
        secure_vip_address: instance.secure_vip_address.clone(),
        home_page_url: instance.home_page_url.clone(),
        status_page_url: instance.status_page_url.clone(),
        health_check_url: instance.health_check_url.clone(),
        metadata: config.metadata(),
        lease_info: LeaseInfo {
            renewal_interval_secs: instance.lease_renewal_interval_in_seconds,
            duration_secs: instance.lease_expiration_duration_in_seconds,
            ..LeaseInfo::default()
        },
        data_center_info: instance.data_center_info.clone(),
        action_type: ActionType::Added,
        region: String::new(),
        zone: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, InstanceConfig, Resolver};
    use crate::model::Endpoint;
    use crate::transport::Transport;
    use assert_matches::assert_matches;
    use httpmock::Method::{DELETE, POST, PUT};
    use httpmock::MockServer;

    struct TestContext {
        config: Config,
        transport: Transport,
    }

    impl AgentContext for TestContext {
        fn config(&self) -> &Config {
            &self.config
        }
        fn transport(&self) -> &Transport {
            &self.transport
        }
        fn current_snapshot(&self) -> std::sync::Arc<crate::model::Snapshot> {
            std::sync::Arc::new(crate::model::Snapshot::empty())
        }
        fn publish_snapshot(&self, _snapshot: crate::model::Snapshot) {}
    }

    fn context_with(server: &MockServer, app_name: &str, instance_id: &str) -> TestContext {
        let resolver = Resolver::new();
        let mut instance_cfg = InstanceConfig::default();
        instance_cfg.app_name = Some(app_name.to_string());
        instance_cfg.instance_id = Some(instance_id.to_string());
        instance_cfg.host_name = Some("host1".to_string());
        instance_cfg.ip_address = Some("10.0.0.1".to_string());
        instance_cfg.non_secure_port = Some(8080);

        let mut client_cfg = ClientConfig::default();
        client_cfg.service_url_of_default_zone = Some(format!("{}/eureka", server.base_url()));

        let config = resolver.resolve(instance_cfg, client_cfg).unwrap();
        TestContext {
            config: Config::new(
                config.instance.clone(),
                config.metadata(),
                config.client.clone(),
            ),
            transport: Transport::new(),
        }
    }

    #[test]
    fn register_posts_and_succeeds_on_204() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/eureka/apps/svc-a");
            then.status(204);
        });

        let ctx = context_with(&server, "svc-a", "svc-a#1");
        let agent = RegistrationAgent::new(&ctx.config);
        agent.register(&ctx).unwrap();
        mock.assert();
    }

    #[test]
    fn change_status_with_bogus_value_never_calls_the_server() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT);
            then.status(200);
        });

        let ctx = context_with(&server, "svc-a", "svc-a#1");
        let agent = RegistrationAgent::new(&ctx.config);
        let err = agent.change_status(&ctx, "BOGUS").unwrap_err();
        assert_matches!(err, RegistrationError::InvalidStatus(_));
        mock.assert_hits(0);
    }

    #[test]
    fn change_status_out_of_service_disables_heartbeat() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/eureka/apps/svc-a/svc-a#1/status");
            then.status(200);
        });

        let ctx = context_with(&server, "svc-a", "svc-a#1");
        let agent = RegistrationAgent::new(&ctx.config);
        assert!(agent.lifecycle().heartbeat_enabled());

        agent.change_status(&ctx, "OUT_OF_SERVICE").unwrap();
        assert!(!agent.lifecycle().heartbeat_enabled());
    }

    #[test]
    fn unregister_transitions_to_unregistered() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/eureka/apps/svc-a/svc-a#1");
            then.status(200);
        });

        let ctx = context_with(&server, "svc-a", "svc-a#1");
        let agent = RegistrationAgent::new(&ctx.config);
        agent.unregister(&ctx).unwrap();
        assert_eq!(agent.lifecycle(), LifecycleState::Unregistered);
    }

    #[test]
    fn feature_disabled_short_circuits_without_a_server_call() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(204);
        });

        let mut ctx = context_with(&server, "svc-a", "svc-a#1");
        ctx.config = Config::new(
            crate::config::InstanceSettings {
                registry_enabled: false,
                ..ctx.config.instance.clone()
            },
            ctx.config.metadata(),
            ctx.config.client.clone(),
        );

        let agent = RegistrationAgent::new(&ctx.config);
        let err = agent.register(&ctx).unwrap_err();
        assert_matches!(err, RegistrationError::FeatureDisabled);
        mock.assert_hits(0);
    }

    #[test]
    fn heartbeat_failure_does_not_change_lifecycle() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT);
            then.status(500);
        });

        let ctx = context_with(&server, "svc-a", "svc-a#1");
        let agent = RegistrationAgent::new(&ctx.config);
        let before = agent.lifecycle();
        agent.tick_heartbeat(&ctx);
        assert_eq!(agent.lifecycle(), before);
    }
}
