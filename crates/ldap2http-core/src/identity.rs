//! The single bind identity accepted by the gateway.

use secrecy::{ExposeSecret, SecretString};

/// Bind credentials configured at startup.
///
/// There is exactly one valid identity per process. The password is kept behind
/// [`SecretString`] so it never shows up in `Debug` output or logs.
#[derive(Debug)]
pub struct Identity {
    bind_dn: String,
    bind_password: SecretString,
}

impl Identity {
    /// Create a new identity.
    ///
    /// # Arguments
    ///
    /// * `bind_dn` - The DN clients must present when binding
    /// * `bind_password` - The password clients must present when binding
    #[must_use]
    pub fn new(bind_dn: impl Into<String>, bind_password: impl Into<String>) -> Self {
        Self {
            bind_dn: bind_dn.into(),
            bind_password: SecretString::from(bind_password.into()),
        }
    }

    /// Get the bind DN.
    #[must_use]
    pub fn bind_dn(&self) -> &str {
        &self.bind_dn
    }

    /// Exact, case-sensitive comparison against the configured DN.
    #[must_use]
    pub fn matches_dn(&self, dn: &str) -> bool {
        self.bind_dn == dn
    }

    /// Exact comparison against the configured password.
    #[must_use]
    pub fn matches_password(&self, password: &str) -> bool {
        self.bind_password.expose_secret() == password
    }
}
