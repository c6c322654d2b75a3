//! Thin wrapper around a blocking `reqwest` client.

use http::{Response as HttpResponse, StatusCode};
use reqwest::blocking::Client;
use reqwest::Error as ReqwestError;

use super::config::HttpConfig;

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(http_config: HttpConfig) -> Result<Self, HttpBuildError> {
        let client = Client::builder()
            .use_rustls_tls()
            .tls_built_in_native_certs(true)
            .timeout(http_config.timeout)
            .connect_timeout(http_config.conn_timeout)
            .build()
            .map_err(|err| HttpBuildError::ClientBuilder(err.to_string()))?;
        Ok(Self { client })
    }

    pub fn send(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<HttpResponse<Vec<u8>>, HttpResponseError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.uri().to_string());
        builder = builder.headers(request.headers().clone());
        if let Some(auth) = request.extensions().get::<BasicAuth>() {
            builder = builder.basic_auth(&auth.username, Some(&auth.password));
        }

        let res = builder
            .body(request.body().clone())
            .send()
            .map_err(from_reqwest_error)?;

        let status = res.status();
        let body = res
            .bytes()
            .map_err(|err| HttpResponseError::ReadingResponse(err.to_string()))?
            .to_vec();

        http::Response::builder()
            .status(status)
            .body(body)
            .map_err(|err| HttpResponseError::BuildingResponse(err.to_string()))
    }
}

/// Attached as a request extension so [`HttpClient::send`] can apply HTTP Basic auth without
/// threading credentials through every call site.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

#[derive(thiserror::Error, Debug)]
pub enum HttpResponseError {
    #[error("could not read response body: {0}")]
    ReadingResponse(String),
    #[error("could not build response: {0}")]
    BuildingResponse(String),
    #[error("connection error: {0}")]
    ConnectError(#[source] ReqwestError),
    #[error("timeout error: {0}")]
    TimeoutError(#[source] ReqwestError),
    #[error("dns resolution error: {0}")]
    DnsError(#[source] ReqwestError),
    #[error("transport error: {0}")]
    GenericTransportError(#[source] ReqwestError),
}

impl HttpResponseError {
    pub fn status_code(&self) -> Option<StatusCode> {
        None
    }
}

fn from_reqwest_error(e: ReqwestError) -> HttpResponseError {
    if e.is_connect() {
        HttpResponseError::ConnectError(e)
    } else if e.is_timeout() {
        HttpResponseError::TimeoutError(e)
    } else if (e.is_builder() || e.is_request()) && e.to_string().to_lowercase().contains("dns") {
        HttpResponseError::DnsError(e)
    } else {
        HttpResponseError::GenericTransportError(e)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum HttpBuildError {
    #[error("could not build the http client: {0}")]
    ClientBuilder(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use std::time::Duration;

    #[test]
    fn sends_a_request_and_returns_the_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.path("/apps").method(GET);
            then.status(200).body("hello");
        });

        let client = HttpClient::new(HttpConfig::new(
            Duration::from_secs(3),
            Duration::from_secs(3),
        ))
        .unwrap();

        let request = http::Request::builder()
            .uri(server.url("/apps"))
            .method("GET")
            .body(Vec::new())
            .unwrap();

        let response = client.send(request).unwrap();
        mock.assert();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), b"hello");
    }

    #[test]
    fn basic_auth_extension_is_forwarded() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.path("/apps")
                .method(POST)
                .header("authorization", "Basic dXNlcjpwYXNz");
            then.status(204);
        });

        let client = HttpClient::new(HttpConfig::default()).unwrap();

        let mut request = http::Request::builder()
            .uri(server.url("/apps"))
            .method("POST")
            .body(Vec::new())
            .unwrap();
        request.extensions_mut().insert(BasicAuth {
            username: "user".to_string(),
            password: "pass".to_string(),
        });

        let response = client.send(request).unwrap();
        mock.assert();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn timeout_is_classified_distinctly() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/slow");
            then.delay(Duration::from_millis(150)).status(200);
        });

        let client = HttpClient::new(HttpConfig::new(
            Duration::from_millis(20),
            Duration::from_millis(20),
        ))
        .unwrap();

        let request = http::Request::builder()
            .uri(server.url("/slow"))
            .method("GET")
            .body(Vec::new())
            .unwrap();

        let result = client.send(request);
        assert_matches!(result, Err(HttpResponseError::TimeoutError(_)));
    }
}
