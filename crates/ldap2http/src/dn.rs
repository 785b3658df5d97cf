//! Distinguished Name parsing for search bases.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use ldap2http_core::error::Error as CoreError;

/// Errors that can occur when parsing distinguished names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistinguishedNameError {
    /// A component in the distinguished name was invalid.
    #[error("invalid distinguished name component: {0}")]
    InvalidComponent(String),
    /// A component was missing the attribute name to the left of the `=`.
    #[error("distinguished name component missing attribute: {0}")]
    MissingAttribute(String),
    /// A component was missing the value to the right of the `=`.
    #[error("distinguished name component missing value for attribute {0}")]
    MissingValue(String),
    /// The distinguished name ended with an escape character.
    #[error("distinguished name contains an unterminated escape sequence")]
    UnterminatedEscape,
    /// Hex escapes in a value did not decode to UTF-8.
    #[error("distinguished name value has invalid escapes: {0}")]
    InvalidEscape(String),
}

impl From<DistinguishedNameError> for CoreError {
    fn from(err: DistinguishedNameError) -> Self {
        CoreError::InvalidRequest(err.to_string())
    }
}

/// Relative distinguished name (single attribute/value pair).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeDistinguishedName {
    attribute: String,
    value: String,
}

impl RelativeDistinguishedName {
    /// Create a new relative distinguished name.
    #[must_use]
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Attribute portion of the RDN (e.g. `ou`).
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Attribute value portion of the RDN, unescaped.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Strongly-typed distinguished name wrapper.
///
/// Components are kept leaf-most first, the way directory clients write them. The empty
/// string parses to the root DN, which has no components. Each component keeps the text
/// the client sent (trimmed, escapes intact) while the parsed values are unescaped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistinguishedName {
    raw: String,
    components: Vec<String>,
    rdns: Vec<Vec<RelativeDistinguishedName>>,
}

impl DistinguishedName {
    /// The root DN (empty search base).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a distinguished name from a string.
    ///
    /// # Errors
    ///
    /// Returns [`DistinguishedNameError`] if a component is empty or not an
    /// `attribute=value` pair, or if the input ends in a dangling escape.
    pub fn parse(input: impl AsRef<str>) -> std::result::Result<Self, DistinguishedNameError> {
        let raw = input.as_ref();
        if raw.trim().is_empty() {
            return Ok(Self::root());
        }

        let components = split_escaped(raw, ',')?;
        let mut rdns = Vec::with_capacity(components.len());
        for component in &components {
            let mut rdn_components = Vec::new();
            for part in split_escaped(component, '+')? {
                let (attribute, value) = split_attribute_value(&part)?;
                rdn_components.push(RelativeDistinguishedName::new(attribute, value));
            }
            rdns.push(rdn_components);
        }

        Ok(Self {
            raw: components.join(","),
            components,
            rdns,
        })
    }

    /// Borrows the distinguished name string, components trimmed and comma-joined.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true for the root DN.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Number of RDN sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    /// Returns true for the root DN.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Returns the RDN sets in order (each set represents a `+`-joined group).
    #[must_use]
    pub fn rdns(&self) -> &[Vec<RelativeDistinguishedName>] {
        &self.rdns
    }

    /// Component texts as sent, leaf-most first.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Component texts as sent, root-most first.
    ///
    /// This is the hierarchical order used for backend resource paths.
    #[must_use]
    pub fn hierarchy(&self) -> Vec<String> {
        self.components.iter().rev().cloned().collect()
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DistinguishedName {
    type Err = DistinguishedNameError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for DistinguishedName {
    type Error = DistinguishedNameError;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        Self::parse(value)
    }
}

fn split_escaped(
    input: &str,
    delimiter: char,
) -> std::result::Result<Vec<String>, DistinguishedNameError> {
    let mut parts = Vec::new();
    let mut current = String::new();
    // Length of `current` up to and including the last escape sequence; trailing
    // whitespace is only trimmed beyond it so `\ ` survives.
    let mut protected = 0;
    let mut escape = false;

    for ch in input.chars() {
        if escape {
            current.push('\\');
            current.push(ch);
            protected = current.len();
            escape = false;
            continue;
        }

        if ch == '\\' {
            escape = true;
            continue;
        }

        if ch == delimiter {
            parts.push(finish_part(&current, protected));
            current.clear();
            protected = 0;
            continue;
        }

        current.push(ch);
    }

    if escape {
        return Err(DistinguishedNameError::UnterminatedEscape);
    }

    parts.push(finish_part(&current, protected));
    if parts.iter().any(String::is_empty) {
        return Err(DistinguishedNameError::InvalidComponent(input.to_string()));
    }
    Ok(parts)
}

fn finish_part(part: &str, protected: usize) -> String {
    let end = part.trim_end().len().max(protected);
    part[..end].trim_start().to_string()
}

fn split_attribute_value(
    component: &str,
) -> std::result::Result<(String, String), DistinguishedNameError> {
    let mut escape = false;
    let mut index = None;

    for (i, ch) in component.char_indices() {
        if escape {
            escape = false;
            continue;
        }

        if ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '=' {
            index = Some(i);
            break;
        }
    }

    let idx =
        index.ok_or_else(|| DistinguishedNameError::InvalidComponent(component.to_string()))?;
    let attribute = component[..idx].trim();
    let value_part = component[idx + 1..].trim_start();

    if attribute.is_empty() {
        return Err(DistinguishedNameError::MissingAttribute(
            component.to_string(),
        ));
    }

    if value_part.is_empty() {
        return Err(DistinguishedNameError::MissingValue(attribute.to_string()));
    }

    Ok((attribute.to_string(), unescape(value_part)?))
}

/// Decode RFC 4514 escapes: `\XX` hex pairs are raw UTF-8 bytes, any other escaped
/// character stands for itself.
fn unescape(value: &str) -> std::result::Result<String, DistinguishedNameError> {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            decoded.push(bytes[i]);
            i += 1;
            continue;
        }

        if let Some(byte) = bytes.get(i + 1..i + 3).and_then(hex_pair) {
            decoded.push(byte);
            i += 3;
            continue;
        }

        let next = value[i + 1..]
            .chars()
            .next()
            .ok_or(DistinguishedNameError::UnterminatedEscape)?;
        let start = i + 1;
        let end = start + next.len_utf8();
        decoded.extend_from_slice(&bytes[start..end]);
        i = end;
    }

    String::from_utf8(decoded).map_err(|_| DistinguishedNameError::InvalidEscape(value.to_string()))
}

fn hex_pair(pair: &[u8]) -> Option<u8> {
    let high = char::from(pair[0]).to_digit(16)?;
    let low = char::from(pair[1]).to_digit(16)?;
    u8::try_from(high * 16 + low).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_dn() {
        let dn = DistinguishedName::parse("ou=math,dc=example,dc=com").unwrap();
        assert_eq!(dn.len(), 3);
        assert_eq!(dn.rdns()[0][0].attribute(), "ou");
        assert_eq!(dn.rdns()[0][0].value(), "math");
        assert_eq!(dn.to_string(), "ou=math,dc=example,dc=com");
    }

    #[test]
    fn parse_trims_component_whitespace() {
        let dn = DistinguishedName::parse(" ou=math , dc=example,  dc=com ").unwrap();
        assert_eq!(dn.as_str(), "ou=math,dc=example,dc=com");
    }

    #[test]
    fn empty_dn_is_root() {
        let dn = DistinguishedName::parse("").unwrap();
        assert!(dn.is_root());
        assert!(dn.is_empty());
        assert_eq!(dn, DistinguishedName::root());
        assert!(dn.hierarchy().is_empty());
        assert_eq!(dn.as_str(), "");
    }

    #[test]
    fn parse_dn_with_escape() {
        let dn = DistinguishedName::parse("cn=Smith\\, John,ou=People,dc=example,dc=com").unwrap();
        assert_eq!(dn.rdns()[0][0].value(), "Smith, John");
        assert_eq!(dn.components()[0], "cn=Smith\\, John");
        assert_eq!(dn.len(), 4);
    }

    #[test]
    fn hex_escapes_decode_to_bytes() {
        let dn = DistinguishedName::parse("cn=Smith\\2C John,dc=com").unwrap();
        assert_eq!(dn.len(), 2);
        assert_eq!(dn.rdns()[0][0].value(), "Smith, John");
        assert_eq!(dn.components()[0], "cn=Smith\\2C John");

        let dn = DistinguishedName::parse("cn=a\\5Cb,dc=com").unwrap();
        assert_eq!(dn.rdns()[0][0].value(), "a\\b");

        let dn = DistinguishedName::parse("cn=Lu\\C4\\8Di\\C4\\87,dc=com").unwrap();
        assert_eq!(dn.rdns()[0][0].value(), "Lu\u{10d}i\u{107}");
    }

    #[test]
    fn hex_escapes_must_form_utf8() {
        assert!(matches!(
            DistinguishedName::parse("cn=\\FF,dc=com").unwrap_err(),
            DistinguishedNameError::InvalidEscape(_)
        ));
    }

    #[test]
    fn equals_inside_value_is_kept_verbatim() {
        let dn = DistinguishedName::parse("cn=a=b,dc=com").unwrap();
        assert_eq!(dn.rdns()[0][0].attribute(), "cn");
        assert_eq!(dn.rdns()[0][0].value(), "a=b");
        assert_eq!(dn.hierarchy(), vec!["dc=com", "cn=a=b"]);
        assert_eq!(dn.as_str(), "cn=a=b,dc=com");
    }

    #[test]
    fn escaped_trailing_space_is_not_trimmed() {
        let dn = DistinguishedName::parse("cn=a\\ ,dc=com").unwrap();
        assert_eq!(dn.components()[0], "cn=a\\ ");
        assert_eq!(dn.rdns()[0][0].value(), "a ");
    }

    #[test]
    fn parse_escaped_plus_is_not_multi_valued() {
        let dn = DistinguishedName::parse("cn=a\\+b,dc=com").unwrap();
        assert_eq!(dn.rdns()[0].len(), 1);
        assert_eq!(dn.rdns()[0][0].value(), "a+b");
    }

    #[test]
    fn parse_multi_valued_rdn() {
        let dn = DistinguishedName::parse("cn=John+uid=1234,ou=People,dc=example,dc=com").unwrap();
        assert_eq!(dn.rdns()[0].len(), 2);
        assert_eq!(
            dn.hierarchy(),
            vec!["dc=com", "dc=example", "ou=People", "cn=John+uid=1234"]
        );
    }

    #[test]
    fn hierarchy_reverses_components() {
        let dn = DistinguishedName::parse("ou=math,dc=example,dc=com").unwrap();
        assert_eq!(dn.components(), vec!["ou=math", "dc=example", "dc=com"]);
        assert_eq!(dn.hierarchy(), vec!["dc=com", "dc=example", "ou=math"]);
    }

    #[test]
    fn reversing_twice_restores_order() {
        for input in [
            "ou=math,dc=example,dc=com",
            "cn=a,cn=b,cn=a",
            "uid=root",
            "cn=John+uid=1234,ou=People,dc=example,dc=com",
        ] {
            let dn = DistinguishedName::parse(input).unwrap();
            let mut twice = dn.hierarchy();
            twice.reverse();
            assert_eq!(twice, dn.components());
        }
    }

    #[test]
    fn invalid_trailing_delimiter() {
        let err = DistinguishedName::parse("cn=John,").unwrap_err();
        assert!(matches!(err, DistinguishedNameError::InvalidComponent(_)));
    }

    #[test]
    fn component_without_equals_is_rejected() {
        let err = DistinguishedName::parse("math,dc=com").unwrap_err();
        assert_eq!(
            err,
            DistinguishedNameError::InvalidComponent("math".to_string())
        );
    }

    #[test]
    fn missing_attribute_and_value() {
        assert!(matches!(
            DistinguishedName::parse("=math").unwrap_err(),
            DistinguishedNameError::MissingAttribute(_)
        ));
        assert!(matches!(
            DistinguishedName::parse("ou=").unwrap_err(),
            DistinguishedNameError::MissingValue(_)
        ));
    }

    #[test]
    fn dangling_escape_is_rejected() {
        assert_eq!(
            DistinguishedName::parse("cn=abc\\").unwrap_err(),
            DistinguishedNameError::UnterminatedEscape
        );
    }

    #[test]
    fn converts_into_core_error() {
        let err: CoreError = DistinguishedNameError::UnterminatedEscape.into();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }
}
