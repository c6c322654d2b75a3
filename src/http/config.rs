use std::time::Duration;

/// Per-request tunables for [`super::client::HttpClient`], derived from an [`crate::model::Endpoint`]
/// for each attempt the transport makes.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub conn_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(8),
            conn_timeout: Duration::from_secs(5),
        }
    }
}

impl HttpConfig {
    pub fn new(timeout: Duration, conn_timeout: Duration) -> Self {
        Self {
            timeout,
            conn_timeout,
        }
    }
}
