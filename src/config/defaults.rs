//! Default values collected in one place so the resolver reads as a single checklist.

pub const DEFAULT_APP_NAME: &str = "unknown";
pub const DEFAULT_NON_SECURE_PORT: u16 = 80;
pub const DEFAULT_SECURE_PORT: u16 = 443;
pub const DEFAULT_STATUS_PAGE_URL_PATH: &str = "/actuator/info";
pub const DEFAULT_HOME_PAGE_URL_PATH: &str = "/";
pub const DEFAULT_HEALTH_CHECK_URL_PATH: &str = "/actuator/health";
pub const DEFAULT_RENEWAL_INTERVAL_SECS: u32 = 30;
pub const DEFAULT_LEASE_DURATION_SECS: u32 = 90;
pub const DEFAULT_REGISTRY_FETCH_INTERVAL_SECS: u32 = 30;
pub const DEFAULT_REGION: &str = "default";
pub const DEFAULT_ZONE: &str = "defaultZone";
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8761/eureka";
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
