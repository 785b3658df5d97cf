//! Search request to backend URL translation.
//!
//! A search base such as `ou=math,dc=example,dc=com` becomes the resource path
//! `/dc=com/dc=example/ou=math` below the backend base URL; the filter and scope
//! travel as query parameters.

use crate::dn::DistinguishedName;
use crate::Result;
use ldap2http_core::query::QueryParams;
use ldap2http_core::Error;
use std::fmt;
use url::Url;

/// Search breadth selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The named object only.
    Base,
    /// Immediate children of the named object.
    One,
    /// The whole subtree.
    Sub,
}

impl Scope {
    /// Token sent in the `scope` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::One => "one",
            Self::Sub => "sub",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directory search as seen by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    base: DistinguishedName,
    filter: Option<String>,
    scope: Option<Scope>,
}

impl SearchRequest {
    /// Create a search below `base` with no filter and no scope.
    #[must_use]
    pub fn new(base: DistinguishedName) -> Self {
        Self {
            base,
            filter: None,
            scope: None,
        }
    }

    /// Attach the filter string forwarded to the backend.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Attach the search scope.
    #[must_use]
    pub const fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Search base.
    #[must_use]
    pub const fn base(&self) -> &DistinguishedName {
        &self.base
    }

    /// Filter string, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Search scope, if any.
    #[must_use]
    pub const fn scope(&self) -> Option<Scope> {
        self.scope
    }
}

/// The backend URL derived from one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendUrl(Url);

impl BackendUrl {
    /// Borrow the URL string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Borrow the parsed URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for BackendUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Build the backend URL for a search.
///
/// DN components are appended root-most first as path segments of `base_url`, then
/// `filter` and `scope` are added to the query in that order when present.
///
/// # Errors
///
/// Returns [`Error::InvalidEndpoint`] if `base_url` cannot carry path segments.
pub fn translate(base_url: &Url, request: &SearchRequest) -> Result<BackendUrl> {
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);

    {
        let mut segments = url.path_segments_mut().map_err(|()| {
            Error::InvalidEndpoint(format!("backend URL cannot carry a path: {base_url}"))
        })?;
        segments.pop_if_empty();
        segments.extend(request.base().hierarchy());
    }

    let mut query = QueryParams::new();
    query.push_opt("filter", request.filter());
    query.push_opt("scope", request.scope());
    url.set_query(query.encode().as_deref());

    Ok(BackendUrl(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8010").unwrap()
    }

    fn search(dn: &str) -> SearchRequest {
        SearchRequest::new(DistinguishedName::parse(dn).unwrap())
    }

    #[test]
    fn reverses_dn_into_path() {
        let request = search("ou=math,dc=example,dc=com").with_scope(Scope::Sub);
        let url = translate(&base(), &request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8010/dc=com/dc=example/ou=math?scope=sub"
        );
    }

    #[test]
    fn filter_precedes_scope() {
        let request = search("ou=math,dc=example,dc=com")
            .with_filter("(objectClass=*)")
            .with_scope(Scope::Sub);
        let url = translate(&base(), &request).unwrap();
        assert_eq!(url.as_url().query(), Some("filter=%28objectClass%3D%2A%29&scope=sub"));
    }

    #[test]
    fn omits_absent_parameters() {
        let url = translate(&base(), &search("dc=com")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8010/dc=com");

        let url = translate(&base(), &search("dc=com").with_filter("(cn=alice)")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8010/dc=com?filter=%28cn%3Dalice%29");
    }

    #[test]
    fn empty_dn_keeps_base_path() {
        let request = SearchRequest::new(DistinguishedName::root()).with_scope(Scope::Base);
        let url = translate(&base(), &request).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8010/?scope=base");

        let nested = Url::parse("http://localhost:8010/api/v1").unwrap();
        let url = translate(&nested, &SearchRequest::new(DistinguishedName::root())).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8010/api/v1");
    }

    #[test]
    fn appends_below_base_path() {
        let nested = Url::parse("http://localhost:8010/api/").unwrap();
        let url = translate(&nested, &search("uid=jd,dc=com").with_scope(Scope::One)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8010/api/dc=com/uid=jd?scope=one");
    }

    #[test]
    fn encodes_path_segments() {
        let url = translate(&base(), &search("cn=John Doe/Jr,dc=com")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8010/dc=com/cn=John%20Doe%2FJr");
    }

    #[test]
    fn escaped_components_keep_client_text() {
        let hex = translate(&base(), &search("cn=Smith\\2C John,dc=com")).unwrap();
        assert_eq!(hex.as_str(), "http://localhost:8010/dc=com/cn=Smith%5C2C%20John");

        let plain = translate(&base(), &search("cn=Smith\\, John,dc=com")).unwrap();
        assert_eq!(plain.as_str(), "http://localhost:8010/dc=com/cn=Smith%5C,%20John");

        let equals = translate(&base(), &search("cn=a=b,dc=com")).unwrap();
        assert_eq!(equals.as_str(), "http://localhost:8010/dc=com/cn=a=b");
    }

    #[test]
    fn translation_is_deterministic() {
        let request = search("cn=alice,ou=people,dc=example,dc=com")
            .with_filter("(&(objectClass=person)(uid=alice))")
            .with_scope(Scope::Base);
        let first = translate(&base(), &request).unwrap();
        let second = translate(&base(), &request.clone()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn scope_tokens() {
        assert_eq!(Scope::Base.as_str(), "base");
        assert_eq!(Scope::One.as_str(), "one");
        assert_eq!(Scope::Sub.to_string(), "sub");
    }
}
