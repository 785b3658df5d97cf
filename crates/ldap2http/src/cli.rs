//! Command-line interface.

use crate::Result;
use clap::Parser;
use ldap2http_core::config::DEFAULT_LISTEN_ADDRESS;
use ldap2http_core::{GatewayConfig, Identity};
use std::net::IpAddr;

/// Command-line options. Every value may also come from the environment; flags win.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ldap2http",
    author,
    version,
    about,
    long_about = None,
    disable_version_flag = true
)]
pub struct Cli {
    /// Backend base URL (e.g. "http://localhost:8010")
    #[arg(short = 'u', long = "url", env = "LDAP2HTTP_BACKEND_URL")]
    pub url: String,

    /// LDAP port to listen on
    #[arg(short, long, env = "LDAP2HTTP_PORT")]
    pub port: u16,

    /// DN accepted for simple binds
    #[arg(short = 'b', long = "bind", env = "LDAP2HTTP_BIND_DN")]
    pub bind_dn: String,

    /// Password accepted for simple binds
    #[arg(
        short = 'w',
        long = "password",
        env = "LDAP2HTTP_BIND_PASSWORD",
        hide_env_values = true
    )]
    pub password: String,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Address to listen on
    #[arg(long, env = "LDAP2HTTP_LISTEN_ADDRESS", default_value_t = DEFAULT_LISTEN_ADDRESS)]
    pub listen_address: IpAddr,

    /// Backend request timeout in seconds (no timeout when unset)
    #[arg(long, env = "LDAP2HTTP_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    pub version: Option<bool>,
}

impl Cli {
    /// Build and validate the gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration or validation error for an unusable URL, an empty bind
    /// DN or password, or an out-of-range timeout.
    pub fn into_config(self) -> Result<GatewayConfig> {
        let config = GatewayConfig::new(self.url, self.port, Identity::new(self.bind_dn, self.password))?
            .with_listen_address(self.listen_address)
            .with_request_timeout_secs(self.timeout);
        config.check()?;
        Ok(config)
    }
}
