//! Single-endpoint health check

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::endpoint::Endpoint;
use crate::io::HttpClient;
use crate::status::{epoch_ms, EndpointState, EndpointStatus, ResponseData};

/// Performs one bounded-time GET against an endpoint and classifies the
/// result.
///
/// `check` is total: every failure mode is captured in the returned status.
pub struct HealthChecker {
    http: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl HealthChecker {
    pub fn new(http: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// Check one endpoint, racing the request against the configured
    /// timeout. On expiry the in-flight request future is dropped, which
    /// releases the underlying connection.
    pub async fn check(&self, endpoint: &Endpoint) -> EndpointStatus {
        tracing::debug!("Checking '{}' at {}", endpoint.name, endpoint.url);
        let start = Instant::now();

        match tokio::time::timeout(self.timeout, self.http.get(&endpoint.url)).await {
            Ok(Ok(response)) => {
                let response_time_ms = start.elapsed().as_millis() as u64;
                let state = if (200..=299).contains(&response.status) {
                    EndpointState::Up
                } else {
                    EndpointState::Down
                };
                tracing::debug!(
                    "Check '{}' -> {} (HTTP {}, {} ms)",
                    endpoint.name,
                    state,
                    response.status,
                    response_time_ms
                );

                let status = response.status;
                EndpointStatus {
                    endpoint: endpoint.clone(),
                    state,
                    response_time_ms: Some(response_time_ms),
                    error: None,
                    last_checked_epoch_ms: epoch_ms(),
                    response: response.content.map(|content| ResponseData {
                        status_code: status,
                        headers: content.headers,
                        body: content.body,
                    }),
                }
            }
            Ok(Err(e)) => {
                tracing::debug!("Check '{}' failed: {}", endpoint.name, e);
                EndpointStatus {
                    endpoint: endpoint.clone(),
                    state: EndpointState::Down,
                    response_time_ms: None,
                    error: Some(e.to_string()),
                    last_checked_epoch_ms: epoch_ms(),
                    response: None,
                }
            }
            Err(_) => {
                tracing::debug!(
                    "Check '{}' timed out after {:?}",
                    endpoint.name,
                    self.timeout
                );
                EndpointStatus {
                    endpoint: endpoint.clone(),
                    state: EndpointState::Down,
                    response_time_ms: None,
                    error: Some("timeout".to_string()),
                    last_checked_epoch_ms: epoch_ms(),
                    response: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{HttpContent, HttpResponse, MockHttpClient};
    use std::collections::HashMap;

    fn endpoint() -> Endpoint {
        Endpoint::new("API", "https://api.example.com/health")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            content: Some(HttpContent {
                headers: HashMap::from([(
                    "content-type".to_string(),
                    "application/json".to_string(),
                )]),
                body: body.to_string(),
            }),
        }
    }

    fn checker(mock: MockHttpClient, timeout: Duration) -> HealthChecker {
        HealthChecker::new(Arc::new(mock), timeout)
    }

    #[tokio::test]
    async fn ok_response_is_up() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .withf(|url| url.contains("api.example.com/health"))
            .returning(|_| Box::pin(async { Ok(response(200, r#"{"ok":true}"#)) }));

        let status = checker(mock, Duration::from_secs(2)).check(&endpoint()).await;

        assert_eq!(status.state, EndpointState::Up);
        assert!(status.response_time_ms.is_some());
        assert!(status.error.is_none());
        let response = status.response.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"ok":true}"#);
        assert_eq!(
            response.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert!(status.last_checked_epoch_ms > 0);
    }

    #[tokio::test]
    async fn upper_bound_of_success_range_is_up() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .returning(|_| Box::pin(async { Ok(response(299, "")) }));

        let status = checker(mock, Duration::from_secs(2)).check(&endpoint()).await;
        assert_eq!(status.state, EndpointState::Up);
    }

    #[tokio::test]
    async fn error_status_is_down_with_response() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .returning(|_| Box::pin(async { Ok(response(500, "Internal Server Error")) }));

        let status = checker(mock, Duration::from_secs(2)).check(&endpoint()).await;

        assert_eq!(status.state, EndpointState::Down);
        assert!(status.response_time_ms.is_some());
        // A non-2xx response is not an error, just an unhealthy endpoint
        assert!(status.error.is_none());
        assert_eq!(status.response.unwrap().status_code, 500);
    }

    #[tokio::test]
    async fn redirect_status_is_down() {
        let mut mock = MockHttpClient::new();
        mock.expect_get()
            .returning(|_| Box::pin(async { Ok(response(301, "")) }));

        let status = checker(mock, Duration::from_secs(2)).check(&endpoint()).await;
        assert_eq!(status.state, EndpointState::Down);
    }

    #[tokio::test]
    async fn unreadable_content_still_classifies_by_status() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().returning(|_| {
            Box::pin(async {
                Ok(HttpResponse {
                    status: 200,
                    content: None,
                })
            })
        });

        let status = checker(mock, Duration::from_secs(2)).check(&endpoint()).await;

        assert_eq!(status.state, EndpointState::Up);
        assert!(status.response_time_ms.is_some());
        assert!(status.error.is_none());
        assert!(status.response.is_none());
    }

    #[tokio::test]
    async fn network_failure_is_down_with_error() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().returning(|_| {
            Box::pin(async {
                Err(crate::VigilError::Http(
                    "GET https://api.example.com/health failed: connection refused".to_string(),
                ))
            })
        });

        let status = checker(mock, Duration::from_secs(2)).check(&endpoint()).await;

        assert_eq!(status.state, EndpointState::Down);
        assert!(status.response_time_ms.is_none());
        assert!(status.response.is_none());
        assert!(status.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn hanging_request_times_out() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().returning(|_| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(response(200, ""))
            })
        });

        let start = Instant::now();
        let status = checker(mock, Duration::from_millis(100))
            .check(&endpoint())
            .await;

        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(status.state, EndpointState::Down);
        assert_eq!(status.error.as_deref(), Some("timeout"));
        assert!(status.response.is_none());
        assert!(status.response_time_ms.is_none());
    }
}
