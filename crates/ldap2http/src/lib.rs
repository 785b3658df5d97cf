//! Read-only LDAP to HTTP gateway.
//!
//! This crate accepts LDAP v3 connections, authenticates simple binds against a single
//! configured identity, and answers search requests by issuing one HTTP GET per search
//! to a JSON backend. The search base DN becomes the URL path (root first), the filter
//! and scope become query parameters, and every object in the returned JSON array is
//! sent back as a search result entry.
//!
//! The pipeline for a search is:
//!
//! 1. [`wire`] turns the decoded protocol request into a [`SearchRequest`].
//! 2. [`translate`] builds the [`BackendUrl`].
//! 3. [`backend`] fetches and decodes the JSON array.
//! 4. [`mapper`] streams the entries followed by a single done marker.
//! 5. [`classify`] maps failures onto `noSuchObject` or `unavailable`.
//!
//! [`session`] holds per-connection state and [`server`] runs the accept loop.

#![deny(missing_docs)]

pub mod auth;
pub mod backend;
pub mod classify;
pub mod cli;
pub mod dn;
pub mod filter;
pub mod gateway;
pub mod mapper;
pub mod server;
pub mod session;
pub mod translate;
pub mod wire;

pub use backend::{Backend, BackendEntry, HttpBackend};
pub use classify::{classify, classify_status, FailureClass};
pub use dn::{DistinguishedName, DistinguishedNameError, RelativeDistinguishedName};
pub use gateway::Gateway;
pub use mapper::{EntryStream, OutboundEntry, SearchEvent};
pub use session::{Flow, Session, SessionState};
pub use translate::{translate, BackendUrl, Scope, SearchRequest};

/// Convenient result alias that reuses the core error type.
pub type Result<T> = ldap2http_core::Result<T>;
