//! ldap2http binary: serves LDAP binds and searches from an HTTP JSON backend.

use clap::Parser;
use ldap2http::cli::Cli;
use ldap2http::{server, Gateway};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    let addr = config.listen_addr();

    let gateway = match Gateway::from_config(config) {
        Ok(gateway) => Arc::new(gateway),
        Err(err) => {
            error!(error = %err, "failed to initialize gateway");
            return ExitCode::FAILURE;
        }
    };

    let listener = match server::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, "failed to start listener");
            return ExitCode::FAILURE;
        }
    };
    info!("LDAP server listening on {addr}");

    match server::serve(listener, gateway).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "listener stopped");
            ExitCode::FAILURE
        }
    }
}
