//! Conversions between LDAP protocol messages and gateway types.

use crate::dn::DistinguishedName;
use crate::filter;
use crate::mapper::OutboundEntry;
use crate::translate::{Scope, SearchRequest};
use ldap3_proto::proto::{
    LdapPartialAttribute, LdapResultCode, LdapSearchResultEntry, LdapSearchScope,
};
use ldap3_proto::simple::SearchRequest as LdapSearchRequest;
use serde_json::{Map, Value};

/// Member naming the entry.
pub const DN_KEY: &str = "dn";

/// Member holding the attributes when the backend uses the nested entry shape.
pub const ATTRIBUTES_KEY: &str = "attributes";

/// A search the gateway refuses before contacting the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Result code for the search done message.
    pub code: LdapResultCode,
    /// Diagnostic message.
    pub message: String,
}

impl Rejection {
    fn new(code: LdapResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Map a protocol scope onto the gateway scope. `children` has no backend token.
///
/// # Errors
///
/// Returns an `unwillingToPerform` rejection for the `children` scope.
pub fn scope_from_ldap(scope: &LdapSearchScope) -> Result<Scope, Rejection> {
    match scope {
        LdapSearchScope::Base => Ok(Scope::Base),
        LdapSearchScope::OneLevel => Ok(Scope::One),
        LdapSearchScope::Subtree => Ok(Scope::Sub),
        LdapSearchScope::Children => Err(Rejection::new(
            LdapResultCode::UnwillingToPerform,
            "children scope is not supported",
        )),
    }
}

/// Build a gateway search from a decoded protocol search.
///
/// # Errors
///
/// Returns `invalidDNSyntax` for a malformed base DN and `unwillingToPerform` for an
/// unsupported scope.
pub fn search_request_from_ldap(request: &LdapSearchRequest) -> Result<SearchRequest, Rejection> {
    let base = DistinguishedName::parse(&request.base)
        .map_err(|err| Rejection::new(LdapResultCode::InvalidDNSyntax, err.to_string()))?;
    let scope = scope_from_ldap(&request.scope)?;

    Ok(SearchRequest::new(base)
        .with_filter(filter::render(&request.filter))
        .with_scope(scope))
}

/// Turn an outbound entry into a protocol search result entry.
///
/// The entry name comes from a string `dn` member. Attributes come from a nested
/// `attributes` object when present, otherwise from every other member.
#[must_use]
pub fn entry_to_ldap(entry: OutboundEntry) -> LdapSearchResultEntry {
    let mut members = entry.into_attributes();

    let dn = match members.get(DN_KEY) {
        Some(Value::String(dn)) => {
            let dn = dn.clone();
            members.remove(DN_KEY);
            dn
        }
        _ => String::new(),
    };

    let attributes = match members.remove(ATTRIBUTES_KEY) {
        Some(Value::Object(nested)) => nested,
        Some(other) => {
            members.insert(ATTRIBUTES_KEY.to_string(), other);
            members
        }
        None => members,
    };

    LdapSearchResultEntry {
        dn,
        attributes: partial_attributes(attributes),
    }
}

fn partial_attributes(attributes: Map<String, Value>) -> Vec<LdapPartialAttribute> {
    attributes
        .into_iter()
        .filter_map(|(atype, value)| {
            let vals = attribute_values(value);
            (!vals.is_empty()).then_some(LdapPartialAttribute { atype, vals })
        })
        .collect()
}

fn attribute_values(value: Value) -> Vec<Vec<u8>> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(scalar_bytes)
            .collect(),
        other => vec![scalar_bytes(other)],
    }
}

fn scalar_bytes(value: Value) -> Vec<u8> {
    match value {
        Value::String(s) => s.into_bytes(),
        other => other.to_string().into_bytes(),
    }
}
