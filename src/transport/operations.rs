//! The eleven registry operations layered on [`super::Transport`].

use std::collections::HashMap;

use http::{Method, StatusCode};

use crate::model::wire;
use crate::model::{App, Endpoint, Instance};

use super::error::TransportError;
use super::Transport;

pub fn register(
    transport: &Transport,
    endpoint: &Endpoint,
    app_name: &str,
    instance: &Instance,
) -> Result<(), TransportError> {
    let body = wire::register_body(instance);
    transport
        .execute(
            endpoint,
            StatusCode::NO_CONTENT,
            Method::POST,
            &["apps", app_name],
            None,
            Some(body),
        )
        .into_result()
        .map(|_| ())
}

pub fn heartbeat(
    transport: &Transport,
    endpoint: &Endpoint,
    app_name: &str,
    instance_id: &str,
) -> Result<(), TransportError> {
    transport
        .execute(
            endpoint,
            StatusCode::OK,
            Method::PUT,
            &["apps", app_name, instance_id],
            None,
            None,
        )
        .into_result()
        .map(|_| ())
}

pub fn unregister(
    transport: &Transport,
    endpoint: &Endpoint,
    app_name: &str,
    instance_id: &str,
) -> Result<(), TransportError> {
    transport
        .execute(
            endpoint,
            StatusCode::OK,
            Method::DELETE,
            &["apps", app_name, instance_id],
            None,
            None,
        )
        .into_result()
        .map(|_| ())
}

pub fn query_apps(transport: &Transport, endpoint: &Endpoint) -> Result<Vec<App>, TransportError> {
    let response = transport
        .execute(endpoint, StatusCode::OK, Method::GET, &["apps"], None, None)
        .into_result()?;
    Ok(wire::parse_apps(response.body())?)
}

pub fn query_app(
    transport: &Transport,
    endpoint: &Endpoint,
    app_name: &str,
) -> Result<App, TransportError> {
    let response = transport
        .execute(endpoint, StatusCode::OK, Method::GET, &["apps", app_name], None, None)
        .into_result()?;
    Ok(wire::parse_app(response.body())?)
}

pub fn query_app_instance(
    transport: &Transport,
    endpoint: &Endpoint,
    app_name: &str,
    instance_id: &str,
) -> Result<Instance, TransportError> {
    let response = transport
        .execute(
            endpoint,
            StatusCode::OK,
            Method::GET,
            &["apps", app_name, instance_id],
            None,
            None,
        )
        .into_result()?;
    Ok(wire::parse_instance(response.body())?)
}

pub fn query_instance(
    transport: &Transport,
    endpoint: &Endpoint,
    instance_id: &str,
) -> Result<Instance, TransportError> {
    let response = transport
        .execute(
            endpoint,
            StatusCode::OK,
            Method::GET,
            &["instances", instance_id],
            None,
            None,
        )
        .into_result()?;
    Ok(wire::parse_instance(response.body())?)
}

pub fn change_status(
    transport: &Transport,
    endpoint: &Endpoint,
    app_name: &str,
    instance_id: &str,
    status: &str,
) -> Result<(), TransportError> {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("value", status)
        .finish();
    transport
        .execute(
            endpoint,
            StatusCode::OK,
            Method::PUT,
            &["apps", app_name, instance_id, "status"],
            Some(&query),
            None,
        )
        .into_result()
        .map(|_| ())
}

pub fn modify_metadata(
    transport: &Transport,
    endpoint: &Endpoint,
    app_name: &str,
    instance_id: &str,
    metadata: &HashMap<String, String>,
) -> Result<(), TransportError> {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(metadata.iter())
        .finish();
    transport
        .execute(
            endpoint,
            StatusCode::OK,
            Method::PUT,
            &["apps", app_name, instance_id, "metadata"],
            Some(&query),
            None,
        )
        .into_result()
        .map(|_| ())
}

pub fn query_vip_apps(
    transport: &Transport,
    endpoint: &Endpoint,
    vip: &str,
) -> Result<Vec<App>, TransportError> {
    let response = transport
        .execute(endpoint, StatusCode::OK, Method::GET, &["vips", vip], None, None)
        .into_result()?;
    Ok(wire::parse_apps(response.body())?)
}

pub fn query_svip_apps(
    transport: &Transport,
    endpoint: &Endpoint,
    svip: &str,
) -> Result<Vec<App>, TransportError> {
    let response = transport
        .execute(endpoint, StatusCode::OK, Method::GET, &["svips", svip], None, None)
        .into_result()?;
    Ok(wire::parse_apps(response.body())?)
}
