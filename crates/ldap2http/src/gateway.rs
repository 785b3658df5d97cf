//! Bind and search handling shared by every connection.

use crate::auth::authenticate;
use crate::backend::{Backend, HttpBackend};
use crate::mapper::EntryStream;
use crate::translate::{translate, BackendUrl, SearchRequest};
use crate::Result;
use ldap2http_core::GatewayConfig;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Read-only state shared by all sessions: configuration, parsed base URL and the
/// backend client.
pub struct Gateway {
    config: GatewayConfig,
    base_url: Url,
    backend: Arc<dyn Backend>,
}

impl Gateway {
    /// Create a gateway talking to the configured backend over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL is unusable or the HTTP client cannot be
    /// built.
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        let backend = HttpBackend::new(&config.client_config())?;
        Self::with_backend(config, Arc::new(backend))
    }

    /// Create a gateway with a custom backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL is unusable.
    pub fn with_backend(config: GatewayConfig, backend: Arc<dyn Backend>) -> Result<Self> {
        let base_url = config.parse_backend_url()?;
        Ok(Self {
            config,
            base_url,
            backend,
        })
    }

    /// Check a simple bind against the configured identity.
    ///
    /// # Errors
    ///
    /// Returns [`ldap2http_core::Error::InvalidCredentials`] on any mismatch.
    pub fn bind(&self, dn: &str, password: &str) -> Result<()> {
        authenticate(self.config.identity(), dn, password)
    }

    /// Backend URL for a search.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path.
    pub fn backend_url(&self, request: &SearchRequest) -> Result<BackendUrl> {
        translate(&self.base_url, request)
    }

    /// Run one search: build the URL, call the backend once, and stream the result.
    ///
    /// # Errors
    ///
    /// Returns the backend failure unchanged; callers classify it.
    pub async fn search(&self, request: &SearchRequest) -> Result<EntryStream> {
        let url = self.backend_url(request)?;
        let entries = self.backend.fetch(&url).await?;
        debug!(url = %url, count = entries.len(), "backend answered");
        Ok(EntryStream::new(entries))
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
