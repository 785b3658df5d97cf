//! # ldap2http-core
//!
//! Core types and utilities for the ldap2http directory gateway.
//!
//! This crate provides the error type, configuration, bind identity and HTTP client
//! settings shared by the gateway.
//!
//! ## Modules
//!
//! - [`error`] - Error types and conversions from the HTTP and JSON libraries
//! - [`config`] - Resolved gateway configuration and validation
//! - [`identity`] - The single bind identity
//! - [`client`] - HTTP client settings for the backend
//! - [`query`] - Query string builder

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod query;

// Re-export commonly used types
pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use identity::Identity;
