//! Request router: executes one registry operation against every URL in an endpoint's
//! comma-separated attempt list until one satisfies the operation's expected status.

pub mod error;
pub mod operations;

use http::{Method, StatusCode};
use url::Url;

use crate::http::{BasicAuth, HttpClient, HttpConfig};
use crate::model::Endpoint;

pub use error::TransportError;

/// One URL tried during an [`Transport::execute`] call, kept for diagnostics even on success.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub url: String,
    pub method: Method,
    pub username: Option<String>,
    pub error: Option<String>,
}

/// Outcome of routing one registry operation across an endpoint's attempt list.
#[derive(Debug)]
pub struct TransportResult {
    pub response: Option<http::Response<Vec<u8>>>,
    pub attempts: Vec<Attempt>,
    pub error: Option<TransportError>,
}

impl TransportResult {
    pub fn into_result(self) -> Result<http::Response<Vec<u8>>, TransportError> {
        match (self.response, self.error) {
            (Some(response), None) => Ok(response),
            (_, Some(error)) => Err(error),
            (None, None) => Err(TransportError::NoEndpointAvailable(
                "no attempts were made".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transport {
    default_config: HttpConfig,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport {
    pub fn new() -> Self {
        Self {
            default_config: HttpConfig::default(),
        }
    }

    /// Routes one registry operation across `endpoint`'s comma-separated attempt list.
    ///
    /// `path_segments` are appended one at a time via [`Url::path_segments_mut`], which
    /// percent-encodes each segment — callers never interpolate raw strings (like an instance
    /// id containing `#`) into a URL themselves.
    pub fn execute(
        &self,
        endpoint: &Endpoint,
        expected_status: StatusCode,
        method: Method,
        path_segments: &[&str],
        query: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> TransportResult {
        let attempt_list: Vec<String> = endpoint
            .service_url
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if attempt_list.is_empty() {
            return TransportResult {
                response: None,
                attempts: Vec::new(),
                error: Some(TransportError::NoEndpointAvailable(
                    "attempt list is empty".to_string(),
                )),
            };
        }

        let http_config = match endpoint.effective_timeout() {
            Some(timeout) => HttpConfig::new(timeout, timeout),
            None => self.default_config.clone(),
        };
        let http_client = match HttpClient::new(http_config) {
            Ok(client) => client,
            Err(err) => {
                return TransportResult {
                    response: None,
                    attempts: Vec::new(),
                    error: Some(TransportError::NoEndpointAvailable(err.to_string())),
                }
            }
        };

        let mut attempts = Vec::new();
        let mut last_error = TransportError::NoEndpointAvailable(
            "no attempt satisfied the expected status".to_string(),
        );

        for raw in attempt_list {
            let parsed = match Url::parse(&raw) {
                Ok(url) => url,
                Err(err) => {
                    let msg = err.to_string();
                    attempts.push(Attempt {
                        url: raw,
                        method: method.clone(),
                        username: None,
                        error: Some(msg.clone()),
                    });
                    last_error = TransportError::NoEndpointAvailable(msg);
                    continue;
                }
            };

            let credentials = extract_credentials(&parsed, endpoint);
            let url = match build_url(&parsed, path_segments, query) {
                Ok(url) => url,
                Err(msg) => {
                    attempts.push(Attempt {
                        url: raw,
                        method: method.clone(),
                        username: credentials.map(|c| c.0),
                        error: Some(msg.clone()),
                    });
                    last_error = TransportError::NoEndpointAvailable(msg);
                    continue;
                }
            };

            let request = match build_request(&method, &url, body.clone(), &credentials) {
                Ok(request) => request,
                Err(msg) => {
                    attempts.push(Attempt {
                        url,
                        method: method.clone(),
                        username: credentials.map(|c| c.0),
                        error: Some(msg.clone()),
                    });
                    last_error = TransportError::NoEndpointAvailable(msg);
                    continue;
                }
            };

            match http_client.send(request) {
                Ok(response) if response.status() == expected_status => {
                    attempts.push(Attempt {
                        url,
                        method: method.clone(),
                        username: credentials.map(|c| c.0),
                        error: None,
                    });
                    return TransportResult {
                        response: Some(response),
                        attempts,
                        error: None,
                    };
                }
                Ok(response) => {
                    let actual = response.status();
                    attempts.push(Attempt {
                        url,
                        method: method.clone(),
                        username: credentials.map(|c| c.0),
                        error: Some(format!("expected {expected_status} actual {actual}")),
                    });
                    last_error = TransportError::StatusMismatch {
                        expected: expected_status,
                        actual,
                    };
                }
                Err(err) => {
                    let msg = err.to_string();
                    attempts.push(Attempt {
                        url,
                        method: method.clone(),
                        username: credentials.map(|c| c.0),
                        error: Some(msg.clone()),
                    });
                    last_error = TransportError::NoEndpointAvailable(msg);
                }
            }
        }

        TransportResult {
            response: None,
            attempts,
            error: Some(last_error),
        }
    }
}

fn extract_credentials(parsed: &Url, endpoint: &Endpoint) -> Option<(String, String)> {
    let user = parsed.username();
    if !user.is_empty() {
        return Some((user.to_string(), parsed.password().unwrap_or("").to_string()));
    }
    endpoint
        .username
        .as_ref()
        .map(|username| (username.clone(), endpoint.password.clone().unwrap_or_default()))
}

fn build_url(parsed: &Url, path_segments: &[&str], query: Option<&str>) -> Result<String, String> {
    let mut url = parsed.clone();
    // Credentials travel via the `BasicAuth` request extension, not embedded in the URL.
    let _ = url.set_username("");
    let _ = url.set_password(None);
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| "endpoint URL cannot be a base".to_string())?;
        segments.pop_if_empty();
        segments.extend(path_segments);
    }
    url.set_query(query);
    Ok(url.to_string())
}

fn build_request(
    method: &Method,
    url: &str,
    body: Option<Vec<u8>>,
    credentials: &Option<(String, String)>,
) -> Result<http::Request<Vec<u8>>, String> {
    let mut builder = http::Request::builder()
        .method(method.clone())
        .uri(url)
        .header("Accept", "application/json");
    if body.is_some() {
        builder = builder.header("Content-Type", "application/json");
    }
    let mut request = builder
        .body(body.unwrap_or_default())
        .map_err(|err| err.to_string())?;
    if let Some((username, password)) = credentials {
        request.extensions_mut().insert(BasicAuth {
            username: username.clone(),
            password: password.clone(),
        });
    }
    Ok(request)
}
