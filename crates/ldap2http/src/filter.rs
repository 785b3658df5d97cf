//! String form of LDAP search filters.
//!
//! Filters are forwarded to the backend as opaque text; this renders the decoded
//! protocol filter back into its RFC 4515 representation.

use ldap3_proto::proto::{LdapFilter, LdapMatchingRuleAssertion, LdapSubstringFilter};

/// Render a protocol filter as an RFC 4515 string, e.g. `(&(objectClass=person)(uid=jd))`.
#[must_use]
pub fn render(filter: &LdapFilter) -> String {
    let mut out = String::new();
    write_filter(&mut out, filter);
    out
}

fn write_filter(out: &mut String, filter: &LdapFilter) {
    out.push('(');
    match filter {
        LdapFilter::And(filters) => {
            out.push('&');
            for f in filters {
                write_filter(out, f);
            }
        }
        LdapFilter::Or(filters) => {
            out.push('|');
            for f in filters {
                write_filter(out, f);
            }
        }
        LdapFilter::Not(inner) => {
            out.push('!');
            write_filter(out, inner);
        }
        LdapFilter::Equality(attr, value) => write_assertion(out, attr, "=", value),
        LdapFilter::GreaterOrEqual(attr, value) => write_assertion(out, attr, ">=", value),
        LdapFilter::LessOrEqual(attr, value) => write_assertion(out, attr, "<=", value),
        LdapFilter::Approx(attr, value) => write_assertion(out, attr, "~=", value),
        LdapFilter::Present(attr) => {
            out.push_str(attr);
            out.push_str("=*");
        }
        LdapFilter::Substring(attr, substrings) => write_substring(out, attr, substrings),
        LdapFilter::Extensible(assertion) => write_extensible(out, assertion),
    }
    out.push(')');
}

fn write_assertion(out: &mut String, attr: &str, op: &str, value: &str) {
    out.push_str(attr);
    out.push_str(op);
    out.push_str(&escape_value(value));
}

fn write_substring(out: &mut String, attr: &str, substrings: &LdapSubstringFilter) {
    out.push_str(attr);
    out.push('=');
    if let Some(initial) = &substrings.initial {
        out.push_str(&escape_value(initial));
    }
    out.push('*');
    for any in &substrings.any {
        out.push_str(&escape_value(any));
        out.push('*');
    }
    if let Some(last) = &substrings.final_ {
        out.push_str(&escape_value(last));
    }
}

fn write_extensible(out: &mut String, assertion: &LdapMatchingRuleAssertion) {
    if let Some(attr) = &assertion.type_ {
        out.push_str(attr);
    }
    if assertion.dn_attributes {
        out.push_str(":dn");
    }
    if let Some(rule) = &assertion.matching_rule {
        out.push(':');
        out.push_str(rule);
    }
    out.push_str(":=");
    out.push_str(&escape_value(&assertion.match_value));
}

/// Escape an assertion value (`*`, `(`, `)`, `\` and NUL become `\XX`).
#[must_use]
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            other => escaped.push(other),
        }
    }
    escaped
}
