use std::time::Duration;

/// One registry server's connection descriptor.
///
/// `service_url` is a comma-separated list of base URLs, exactly as configured — splitting
/// and trimming it into the Transport's "attempt list" is the Transport's job,
/// not this type's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub service_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub read_timeout: Duration,
    pub connect_timeout: Duration,
    pub zone: String,
}

impl Endpoint {
    pub fn new(service_url: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            username: None,
            password: None,
            read_timeout: Duration::from_secs(8),
            connect_timeout: Duration::from_secs(5),
            zone: zone.into(),
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_timeouts(mut self, read: Duration, connect: Duration) -> Self {
        self.read_timeout = read;
        self.connect_timeout = connect;
        self
    }

    /// `max(read, connect)` if either is positive, else `None` (Transport default applies).
    pub fn effective_timeout(&self) -> Option<Duration> {
        if self.read_timeout.is_zero() && self.connect_timeout.is_zero() {
            return None;
        }
        Some(self.read_timeout.max(self.connect_timeout))
    }
}
