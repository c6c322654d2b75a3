//! End-to-end scenarios against a simulated registry, covering the Client's public surface:
//! registration, graceful shutdown, multi-zone discovery fan-out, endpoint failover, the
//! feature-disabled short-circuit, and status-mutation authorization.

use std::collections::HashMap;
use std::thread::sleep;
use std::time::Duration;

use assert_matches::assert_matches;
use eureka_client::config::{ClientConfig, InstanceConfig};
use eureka_client::{Client, ClientError};
use httpmock::Method::{DELETE, GET, POST, PUT};
use httpmock::MockServer;

fn base_configs(server: &MockServer) -> (InstanceConfig, ClientConfig) {
    let mut instance = InstanceConfig::default();
    instance.app_name = Some("svc-a".to_string());
    instance.instance_id = Some("svc-a#1".to_string());
    instance.host_name = Some("host1".to_string());
    instance.ip_address = Some("10.0.0.1".to_string());
    instance.non_secure_port = Some(8080);

    let mut client = ClientConfig::default();
    client.service_url_of_default_zone = Some(format!("{}/eureka", server.base_url()));
    client.discovery_enabled = Some(false);
    (instance, client)
}

#[test]
fn scenario_1_happy_registration_then_heartbeat() {
    let server = MockServer::start();
    let register = server.mock(|when, then| {
        when.method(POST)
            .path("/eureka/apps/svc-a")
            .body_contains("\"instanceId\":\"svc-a#1\"")
            .body_contains("\"status\":\"UP\"");
        then.status(204);
    });
    let heartbeat = server.mock(|when, then| {
        when.method(PUT).path("/eureka/apps/svc-a/svc-a#1");
        then.status(200);
    });

    let (instance, client_cfg) = base_configs(&server);
    let client = Client::new(instance, client_cfg).unwrap();

    client.start().unwrap();
    register.assert();

    sleep(Duration::from_millis(300));
    heartbeat.assert_hits(1);

    client.force_stop();
}

#[test]
fn scenario_2_graceful_shutdown_stops_the_heartbeat() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/eureka/apps/svc-a");
        then.status(204);
    });
    let heartbeat = server.mock(|when, then| {
        when.method(PUT).path("/eureka/apps/svc-a/svc-a#1");
        then.status(200);
    });
    let unregister = server.mock(|when, then| {
        when.method(DELETE).path("/eureka/apps/svc-a/svc-a#1");
        then.status(200);
    });

    let (mut instance, client_cfg) = base_configs(&server);
    instance.lease_renewal_interval_in_seconds = Some(1);
    let client = Client::new(instance, client_cfg).unwrap();

    client.start().unwrap();
    sleep(Duration::from_millis(200));
    heartbeat.assert_hits(1);

    client.stop().unwrap();
    unregister.assert();

    let hits_at_stop = heartbeat.hits();
    sleep(Duration::from_millis(1300));
    assert_eq!(
        heartbeat.hits(),
        hits_at_stop,
        "no heartbeat should fire after the scope is cancelled"
    );
}

#[test]
fn scenario_3_multi_zone_discovery_fan_out() {
    fn instance_json(instance_id: &str, host_name: &str) -> String {
        format!(
            r#"{{"instanceId":"{instance_id}","app":"svc-x","hostName":"{host_name}","ipAddr":"10.0.0.1",
             "port":{{"@enabled":"true","$":"80"}},"securePort":{{"@enabled":"false","$":"443"}},
             "status":"UP","overriddenstatus":"UNKNOWN","vipAddress":"svc-x","secureVipAddress":"svc-x",
             "homePageUrl":"","statusPageUrl":"","healthCheckUrl":"",
             "leaseInfo":{{"renewalIntervalInSecs":30,"durationInSecs":90}},
             "dataCenterInfo":{{"@class":"x","name":"MyOwn"}}}}"#
        )
    }

    let z1 = MockServer::start();
    z1.mock(|when, then| {
        when.method(GET).path("/eureka/apps");
        then.status(200).body(format!(
            r#"{{"applications":{{"application":[{{"name":"svc-x","instance":[{}]}}]}}}}"#,
            instance_json("z1#1", "h1")
        ));
    });
    let z2 = MockServer::start();
    z2.mock(|when, then| {
        when.method(GET).path("/eureka/apps");
        then.status(200).body(format!(
            r#"{{"applications":{{"application":[{{"name":"svc-x","instance":[{}]}}]}}}}"#,
            instance_json("z2#1", "h2")
        ));
    });
    let registry = MockServer::start();
    registry.mock(|when, then| {
        when.method(POST);
        then.status(204);
    });
    registry.mock(|when, then| {
        when.method(PUT);
        then.status(200);
    });

    let mut instance = InstanceConfig::default();
    instance.host_name = Some("home".to_string());
    instance.ip_address = Some("10.0.0.9".to_string());

    let mut client_cfg = ClientConfig::default();
    client_cfg.region = Some("r".to_string());
    client_cfg.zone = Some("z1".to_string());
    client_cfg.prefer_same_zone_eureka = Some(true);
    client_cfg
        .available_zones
        .insert("r".to_string(), "z1,z2".to_string());
    client_cfg
        .service_url_of_all_zone
        .insert("z1".to_string(), format!("{}/eureka", z1.base_url()));
    client_cfg
        .service_url_of_all_zone
        .insert("z2".to_string(), format!("{}/eureka", z2.base_url()));
    client_cfg.service_url_of_default_zone = Some(format!("{}/eureka", registry.base_url()));

    let client = Client::new(instance, client_cfg).unwrap();
    client.start().unwrap();

    sleep(Duration::from_millis(300));

    let app = client.access_app("svc-x").unwrap();
    assert_eq!(app.instances.len(), 1);
    assert_eq!(app.instances[0].host_name, "h1");

    client.force_stop();
}

#[test]
fn scenario_4_endpoint_failover_reports_success_with_two_attempts() {
    let bad = MockServer::start();
    bad.mock(|when, then| {
        when.method(POST).path("/eureka/apps/svc-a");
        then.status(500);
    });
    let good = MockServer::start();
    let good_register = good.mock(|when, then| {
        when.method(POST).path("/eureka/apps/svc-a");
        then.status(204);
    });

    let mut instance = InstanceConfig::default();
    instance.app_name = Some("svc-a".to_string());
    instance.instance_id = Some("svc-a#1".to_string());
    instance.host_name = Some("host1".to_string());
    instance.ip_address = Some("10.0.0.1".to_string());

    let mut client_cfg = ClientConfig::default();
    client_cfg.service_url_of_default_zone =
        Some(format!("{}/eureka,{}/eureka", bad.base_url(), good.base_url()));
    client_cfg.discovery_enabled = Some(false);

    let client = Client::new(instance, client_cfg).unwrap();
    client.start().unwrap();
    good_register.assert();

    client.force_stop();
}

#[test]
fn scenario_5_feature_disabled_short_circuits_without_any_http_call() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/eureka/apps/svc-a");
        then.status(204);
    });
    let query_mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200).body("{}");
    });

    let (instance, client_cfg) = base_configs(&server);
    let client = Client::new(instance, client_cfg).unwrap();
    client.start().unwrap();

    let err = client.access_app("x").unwrap_err();
    assert_matches!(err, ClientError::Query(_));
    query_mock.assert_hits(0);

    client.force_stop();
}

#[test]
fn scenario_6_status_mutation_disables_the_heartbeat() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/eureka/apps/svc-a");
        then.status(204);
    });
    let heartbeat = server.mock(|when, then| {
        when.method(PUT).path("/eureka/apps/svc-a/svc-a#1");
        then.status(200);
    });
    let status = server.mock(|when, then| {
        when.method(PUT)
            .path("/eureka/apps/svc-a/svc-a#1/status")
            .query_param("value", "OUT_OF_SERVICE");
        then.status(200);
    });

    let (mut instance, client_cfg) = base_configs(&server);
    instance.lease_renewal_interval_in_seconds = Some(1);
    let client = Client::new(instance, client_cfg).unwrap();

    client.start().unwrap();
    sleep(Duration::from_millis(200));
    let hits_before = heartbeat.hits();

    client.change_status("OUT_OF_SERVICE").unwrap();
    status.assert();

    sleep(Duration::from_millis(1300));
    assert_eq!(
        heartbeat.hits(),
        hits_before,
        "no further heartbeat should fire once status is OUT_OF_SERVICE"
    );

    client.force_stop();
}

#[test]
fn start_on_an_already_running_client_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/eureka/apps/svc-a");
        then.status(204);
    });
    let (instance, client_cfg) = base_configs(&server);
    let client = Client::new(instance, client_cfg).unwrap();

    client.start().unwrap();
    assert_matches!(client.start().unwrap_err(), ClientError::AlreadyRunning);

    client.force_stop();
}

#[test]
fn stop_on_a_never_started_client_fails() {
    let server = MockServer::start();
    let (instance, client_cfg) = base_configs(&server);
    let client = Client::new(instance, client_cfg).unwrap();

    assert_matches!(client.stop().unwrap_err(), ClientError::NotStarted);
}

#[test]
fn change_status_with_bogus_value_never_calls_the_server() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/eureka/apps/svc-a");
        then.status(204);
    });
    let status_mock = server.mock(|when, then| {
        when.method(PUT).path("/eureka/apps/svc-a/svc-a#1/status");
        then.status(200);
    });

    let (instance, client_cfg) = base_configs(&server);
    let client = Client::new(instance, client_cfg).unwrap();
    client.start().unwrap();

    let err = client.change_status("BOGUS").unwrap_err();
    assert_matches!(err, ClientError::Registration(_));
    status_mock.assert_hits(0);

    client.force_stop();
}

#[test]
fn register_unregister_register_returns_to_a_valid_state() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/eureka/apps/svc-a");
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/eureka/apps/svc-a/svc-a#1");
        then.status(200);
    });

    let (instance, client_cfg) = base_configs(&server);
    let client = Client::new(instance.clone(), client_cfg.clone()).unwrap();
    client.start().unwrap();
    client.stop().unwrap();

    let second = Client::new(instance, client_cfg).unwrap();
    second.start().unwrap();
    assert!(second.lifecycle().heartbeat_enabled());
    second.force_stop();
}

#[test]
fn change_metadata_is_observable_through_the_local_instance_snapshot() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/eureka/apps/svc-a");
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(PUT).path("/eureka/apps/svc-a/svc-a#1/metadata");
        then.status(200);
    });

    let (instance, client_cfg) = base_configs(&server);
    let client = Client::new(instance, client_cfg).unwrap();
    client.start().unwrap();

    let mut updates = HashMap::new();
    updates.insert("region".to_string(), "us".to_string());
    client.change_metadata(updates).unwrap();

    assert_eq!(
        client.current_instance().metadata.get("region"),
        Some(&"us".to_string())
    );

    client.force_stop();
}
