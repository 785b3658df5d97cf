//! Configuration structures for the gateway.
//!
//! This module provides the resolved runtime configuration: where the HTTP backend
//! lives, where the LDAP listener binds, and the single bind identity. How the values are collected (flags or environment) is up to the binary.

use crate::client::ClientConfig;
use crate::identity::Identity;
use crate::Error;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default address the LDAP listener binds to.
pub const DEFAULT_LISTEN_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Gateway runtime configuration.
///
/// All values are fixed at startup and shared read-only between connections.
#[derive(Debug, Validate)]
pub struct GatewayConfig {
    /// Backend base URL every search path is appended to
    #[validate(url)]
    backend_url: String,

    /// LDAP listen port
    #[validate(range(min = 1))]
    port: u16,

    /// LDAP listen address
    listen_address: IpAddr,

    /// Optional backend request timeout in seconds
    #[validate(range(min = 1, max = 3600))]
    request_timeout_secs: Option<u64>,

    /// The one identity allowed to bind
    identity: Identity,
}

impl GatewayConfig {
    /// Create a new gateway configuration with required parameters.
    ///
    /// # Arguments
    ///
    /// * `backend_url` - The backend base URL (e.g., "http://localhost:8010")
    /// * `port` - The TCP port the LDAP listener binds to
    /// * `identity` - The bind DN and password clients must present
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(backend_url: impl Into<String>, port: u16, identity: Identity) -> Result<Self, Error> {
        let config = Self {
            backend_url: backend_url.into(),
            port,
            listen_address: DEFAULT_LISTEN_ADDRESS,
            request_timeout_secs: None,
            identity,
        };

        config.check()?;
        Ok(config)
    }

    /// Set the address the LDAP listener binds to.
    #[must_use]
    pub const fn with_listen_address(mut self, address: IpAddr) -> Self {
        self.listen_address = address;
        self
    }

    /// Set the backend request timeout in seconds.
    #[must_use]
    pub const fn with_request_timeout_secs(mut self, seconds: Option<u64>) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the first problem found.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        if self.identity.bind_dn().is_empty() {
            return Err(Error::ConfigError("bind dn not specified".to_string()));
        }
        if self.identity.matches_password("") {
            return Err(Error::ConfigError(
                "bind password not specified".to_string(),
            ));
        }

        self.parse_backend_url().map(|_| ())
    }

    /// Parse and validate the backend URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed, is not `http`/`https`, or cannot
    /// carry path segments.
    pub fn parse_backend_url(&self) -> Result<Url, Error> {
        let url = Url::parse(&self.backend_url)
            .map_err(|e| Error::ConfigError(format!("Invalid backend URL: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::ConfigError(format!(
                "Unsupported backend URL scheme: {}",
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() {
            return Err(Error::ConfigError(format!(
                "Backend URL cannot carry a path: {url}"
            )));
        }

        Ok(url)
    }

    /// Backend base URL as configured.
    #[must_use]
    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// LDAP listen port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Socket address the LDAP listener binds to.
    #[must_use]
    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_address, self.port)
    }

    /// The configured bind identity.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Get the backend request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// HTTP client settings derived from this configuration.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new().with_timeout(self.request_timeout())
    }
}
