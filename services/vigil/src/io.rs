//! HTTP client abstraction for testability

use std::collections::HashMap;

use async_trait::async_trait;

/// HTTP response from a request.
///
/// The status line is always available once a response was received;
/// `content` is only present when headers and body could actually be read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content: Option<HttpContent>,
}

/// The readable part of a response
#[derive(Debug, Clone)]
pub struct HttpContent {
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// Abstraction over HTTP client for dependency injection
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient: Send + Sync {
    /// Send a GET request to the given URL
    async fn get(&self, url: &str) -> crate::Result<HttpResponse>;
}

/// Production HTTP client using reqwest
#[derive(Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> crate::Result<HttpResponse> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| crate::VigilError::Http(format!("GET {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        // A response that arrived but cannot be read is still classified by
        // its status code, so body extraction failure is not an error here.
        let content = match response.text().await {
            Ok(body) => {
                tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
                Some(HttpContent { headers, body })
            }
            Err(e) => {
                tracing::debug!("GET {} -> {}, could not read body: {}", url, status, e);
                None
            }
        };

        Ok(HttpResponse { status, content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A URL that will always refuse connections (port 1 is reserved and unbound)
    const UNREACHABLE_URL: &str = "http://127.0.0.1:1/test";

    #[tokio::test]
    async fn get_connection_refused_returns_http_error() {
        let client = ReqwestHttpClient::default();
        let err = client.get(UNREACHABLE_URL).await.unwrap_err();

        match &err {
            crate::VigilError::Http(msg) => {
                assert!(
                    msg.starts_with("GET http://127.0.0.1:1/test failed:"),
                    "{msg}"
                );
            }
            other => panic!("expected VigilError::Http, got {other:?}"),
        }
    }
}
