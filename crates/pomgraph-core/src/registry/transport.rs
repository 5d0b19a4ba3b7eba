//! HTTP transport to the registry.

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;

use crate::errors::{ResolveError, ResolveResult};

/// Status and body of one registry response, as cached and persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: 404,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Issues a single GET. Implementations report only transport failures as
/// errors; every HTTP status comes back as a [`RawResponse`].
#[async_trait]
pub trait RegistryTransport: Send + Sync {
    async fn get(&self, url: &str) -> ResolveResult<RawResponse>;
}

/// `reqwest`-backed transport. No timeout is set: the caller's
/// [`Context`](crate::Context) bounds every request.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    inner: ReqwestClient,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> ResolveResult<Self> {
        let inner = ReqwestClient::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|source| ResolveError::Transport {
                url: String::new(),
                source,
            })?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl RegistryTransport for HttpTransport {
    async fn get(&self, url: &str) -> ResolveResult<RawResponse> {
        let transport_error = |source| ResolveError::Transport {
            url: url.to_string(),
            source,
        };
        let response = self.inner.get(url).send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?;
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_http_transport_returns_status_and_body() {
        let server = MockServer::start_async().await;
        let found = server
            .mock_async(|when, then| {
                when.method(GET).path("/org/example/lib/maven-metadata.xml");
                then.status(200).body("<metadata/>");
            })
            .await;
        let missing = server
            .mock_async(|when, then| {
                when.method(GET).path("/org/example/gone/maven-metadata.xml");
                then.status(404);
            })
            .await;

        let transport = HttpTransport::new("pomgraph-test").unwrap();

        let response = transport
            .get(&server.url("/org/example/lib/maven-metadata.xml"))
            .await
            .unwrap();
        assert!(response.is_success());
        assert_eq!(response.body, b"<metadata/>".to_vec());

        let response = transport
            .get(&server.url("/org/example/gone/maven-metadata.xml"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);

        found.assert_async().await;
        missing.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_transport_connection_failure() {
        let transport = HttpTransport::new("pomgraph-test").unwrap();
        let err = transport.get("http://127.0.0.1:9/unreachable").await.unwrap_err();
        assert!(matches!(err, ResolveError::Transport { .. }));
    }
}
