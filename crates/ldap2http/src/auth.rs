//! Bind authentication against the configured identity.

use crate::Result;
use ldap2http_core::{Error, Identity};
use tracing::debug;

/// Check a simple bind attempt.
///
/// Both the DN and the password must equal the configured values exactly; there is no
/// normalization of the DN. Every mismatch yields the same
/// [`Error::InvalidCredentials`], the mismatched field is only reported in debug logs.
///
/// # Errors
///
/// Returns [`Error::InvalidCredentials`] unless both fields match.
pub fn authenticate(identity: &Identity, dn: &str, password: &str) -> Result<()> {
    let dn_ok = identity.matches_dn(dn);
    let password_ok = identity.matches_password(password);

    if dn_ok && password_ok {
        return Ok(());
    }

    let mismatch = match (dn_ok, password_ok) {
        (false, false) => "dn and password",
        (false, true) => "dn",
        _ => "password",
    };
    debug!(dn = %dn, mismatch, "bad bind");
    Err(Error::InvalidCredentials)
}
