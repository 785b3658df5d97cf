//! HTTP backend invocation.

use crate::translate::BackendUrl;
use crate::Result;
use async_trait::async_trait;
use ldap2http_core::client::ClientConfig;
use ldap2http_core::Error;
use reqwest::{header, Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// One element of the backend's JSON array, kept exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendEntry(Map<String, Value>);

impl BackendEntry {
    /// Wrap an attribute mapping.
    #[must_use]
    pub const fn new(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }

    /// Borrow the attribute mapping.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Take the attribute mapping.
    #[must_use]
    pub fn into_attributes(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for BackendEntry {
    fn from(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }
}

/// Source of search results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Perform exactly one request for `url` and return the entries it lists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackendStatus`] for non-success statuses,
    /// [`Error::MalformedResponse`] when the body is not a JSON array of objects, and a
    /// transport error otherwise.
    async fn fetch(&self, url: &BackendUrl) -> Result<Vec<BackendEntry>>;
}

/// [`Backend`] speaking HTTP through `reqwest`.
///
/// Requests are never retried; the client's built-in retry policy is switched off.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
}

impl HttpBackend {
    /// Build the HTTP client from the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .gzip(config.enable_compression)
            .retry(reqwest::retry::never());

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build backend HTTP client: {err}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch(&self, url: &BackendUrl) -> Result<Vec<BackendEntry>> {
        debug!(url = %url, "invoking backend");

        let response = self
            .http
            .get(url.as_url().clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .ok()
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
            return Err(Error::BackendStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        parse_entries(&body)
    }
}

/// Decode a backend body, which must be a JSON array of objects.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] for anything else, including a bare object.
pub fn parse_entries(body: &[u8]) -> Result<Vec<BackendEntry>> {
    serde_json::from_slice::<Vec<BackendEntry>>(body).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dn::DistinguishedName;
    use crate::translate::{translate, Scope, SearchRequest};
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend() -> HttpBackend {
        HttpBackend::new(&ClientConfig::new()).unwrap()
    }

    fn url_for(server: &MockServer, dn: &str) -> BackendUrl {
        let base = Url::parse(&server.uri()).unwrap();
        let request = SearchRequest::new(DistinguishedName::parse(dn).unwrap())
            .with_filter("(objectClass=*)")
            .with_scope(Scope::Sub);
        translate(&base, &request).unwrap()
    }

    #[tokio::test]
    async fn fetch_returns_entries_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dc=com/dc=example/ou=math"))
            .and(query_param("filter", "(objectClass=*)"))
            .and(query_param("scope", "sub"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"cn": "alice"},
                {"cn": "bob", "mail": ["bob@example.com", "b@example.com"]}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let entries = backend()
            .fetch(&url_for(&server, "ou=math,dc=example,dc=com"))
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].attributes()["cn"], "alice");
        assert_eq!(entries[1].attributes()["cn"], "bob");
    }

    #[tokio::test]
    async fn fetch_reports_status_without_retrying() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let err = backend()
            .fetch(&url_for(&server, "dc=com"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            Error::BackendStatus {
                status: 503,
                message: "maintenance".to_string()
            }
        );
    }

    #[tokio::test]
    async fn dropped_connection_is_not_retried() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&accepted);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                drop(stream);
            }
        });

        let base = Url::parse(&format!("http://{addr}")).unwrap();
        let url = translate(&base, &SearchRequest::new(DistinguishedName::parse("dc=com").unwrap()))
            .unwrap();
        let err = backend().fetch(&url).await.unwrap_err();

        assert!(err.status().is_none());
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_uses_reason_phrase_for_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = backend()
            .fetch(&url_for(&server, "dc=com"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            Error::BackendStatus {
                status: 404,
                message: "Not Found".to_string()
            }
        );
    }

    #[tokio::test]
    async fn fetch_rejects_non_array_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cn": "alice"})))
            .mount(&server)
            .await;

        let err = backend()
            .fetch(&url_for(&server, "dc=com"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn fetch_rejects_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = backend()
            .fetch(&url_for(&server, "dc=com"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn fetch_reports_unreachable_backend() {
        let server = MockServer::start().await;
        let url = url_for(&server, "dc=com");
        drop(server);

        let err = backend().fetch(&url).await.unwrap_err();
        assert_eq!(err.status(), None);
    }

    #[test]
    fn parse_entries_accepts_empty_array() {
        assert!(parse_entries(b"[]").unwrap().is_empty());
    }

    #[test]
    fn parse_entries_rejects_scalar_elements() {
        let err = parse_entries(b"[1, 2]").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
