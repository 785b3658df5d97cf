//! Backend failure classification.
//!
//! Every backend failure ends the current search with one of two LDAP result
//! codes. Client-class statuses (anything below 500, including 400 and 403) read as
//! a missing search target; everything else, including failures without a status,
//! reads as an unavailable service.

use ldap2http_core::Error;
use ldap3_proto::proto::LdapResultCode;

/// Statuses at or above this value are backend failures rather than misses.
pub const SERVER_ERROR_THRESHOLD: u16 = 500;

/// Protocol-level outcome of a failed backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// The search target does not exist at the backend.
    NotFound,
    /// The backend itself is failing.
    Unavailable,
}

impl FailureClass {
    /// LDAP result code sent to the client.
    #[must_use]
    pub const fn result_code(self) -> LdapResultCode {
        match self {
            Self::NotFound => LdapResultCode::NoSuchObject,
            Self::Unavailable => LdapResultCode::Unavailable,
        }
    }

    /// Diagnostic message sent with the result code.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotFound => "no such object",
            Self::Unavailable => "service unavailable",
        }
    }
}

/// Classify a backend HTTP status code.
#[must_use]
pub const fn classify_status(status: u16) -> FailureClass {
    if status < SERVER_ERROR_THRESHOLD {
        FailureClass::NotFound
    } else {
        FailureClass::Unavailable
    }
}

/// Classify any backend failure. Errors without a status are unavailable.
#[must_use]
pub fn classify(error: &Error) -> FailureClass {
    error
        .status()
        .map_or(FailureClass::Unavailable, classify_status)
}
