//! HTTP client settings for the backend connection.
//!
//! The gateway never retries a backend request, so unlike a general purpose
//! client configuration there is no retry policy here: one search maps to exactly
//! one GET.

use std::time::Duration;

/// User agent sent with every backend request.
pub const USER_AGENT: &str = concat!("ldap2http/", env!("CARGO_PKG_VERSION"));

/// Default timeout for establishing a backend connection
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// HTTP client configuration.
///
/// Configures timeouts and connection pooling of the backend client. The request
/// timeout is unset by default, leaving the transport's own behaviour in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Whole-request timeout, `None` for no limit
    pub timeout: Option<Duration>,

    /// Timeout for establishing the TCP/TLS connection
    pub connect_timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable response compression
    pub enable_compression: bool,

    /// User agent header value
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_compression: true,
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
