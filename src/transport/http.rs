use crate::config::SettingsProvider;
use crate::{Error, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use url::Url;

/// Attempt budget per call.
pub const MAX_ATTEMPTS: u32 = 3;
/// Per-attempt cap, independent of prior attempts' duration. Worst-case
/// wall time per call is roughly `ATTEMPT_TIMEOUT * MAX_ATTEMPTS`.
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);
/// Overall timeout used when the caller does not supply one (connectivity
/// checks).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const PING_ENDPOINT: &str = "/webhook/seo-test";

/// Successful (2xx) outcome of a transport call, prior to normalization.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

pub struct WorkflowTransport {
    client: reqwest::Client,
    settings: Arc<dyn SettingsProvider>,
}

impl WorkflowTransport {
    pub fn new(settings: Arc<dyn SettingsProvider>) -> Result<Self> {
        // Per-attempt timeouts are set on the request, not the client, so
        // the builder stays minimal.
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| Error::Transport {
                attempts: 0,
                message: e.to_string(),
            })?;
        Ok(Self { client, settings })
    }

    /// POSTs `payload` as JSON to `{base_url}{endpoint}` with bearer auth.
    ///
    /// Retry policy, per attempt:
    /// - connection refused / timeout / DNS failure: retry immediately
    /// - HTTP 5xx: retry immediately
    /// - HTTP 4xx: surface immediately, no retry
    /// - HTTP 2xx: return the raw body
    pub async fn post(
        &self,
        endpoint: &str,
        payload: &Value,
        overall_timeout: Duration,
    ) -> Result<RawResponse> {
        let settings = self.settings.snapshot();
        if settings.base_url.is_empty() {
            return Err(Error::configuration(
                "workflow engine base URL is not set",
            ));
        }
        if settings.token.is_empty() {
            return Err(Error::configuration("webhook token is not set"));
        }
        Url::parse(&settings.base_url).map_err(|_| {
            Error::configuration(format!("invalid base URL `{}`", settings.base_url))
        })?;

        let url = format!("{}{}", settings.base_url.trim_end_matches('/'), endpoint);
        let body = serde_json::to_vec(payload)?;
        let payload_size = body.len();
        let attempt_timeout = overall_timeout.min(ATTEMPT_TIMEOUT);

        let mut last_failure = String::new();
        for attempt in 1..=MAX_ATTEMPTS {
            let started = Instant::now();
            let outcome = self
                .client
                .post(&url)
                .timeout(attempt_timeout)
                .bearer_auth(&settings.token)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone())
                .send()
                .await;
            let duration_ms = started.elapsed().as_millis() as u64;

            let response = match outcome {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        endpoint,
                        attempt,
                        payload_size,
                        duration_ms,
                        error = %e,
                        "transport failure"
                    );
                    last_failure = e.to_string();
                    continue;
                }
            };

            let status = response.status();
            if status.is_server_error() {
                warn!(
                    endpoint,
                    attempt,
                    payload_size,
                    duration_ms,
                    status = status.as_u16(),
                    "server error from workflow engine"
                );
                if attempt < MAX_ATTEMPTS {
                    continue;
                }
                return Err(Error::UpstreamHttp {
                    status: status.as_u16(),
                    message: status_message(status),
                });
            }

            if !status.is_success() {
                info!(
                    endpoint,
                    attempt,
                    payload_size,
                    duration_ms,
                    status = status.as_u16(),
                    success = false,
                    "client error from workflow engine, not retrying"
                );
                return Err(Error::UpstreamHttp {
                    status: status.as_u16(),
                    message: status_message(status),
                });
            }

            let status = status.as_u16();
            match response.text().await {
                Ok(text) => {
                    info!(
                        endpoint,
                        attempt,
                        payload_size,
                        duration_ms,
                        status,
                        success = true,
                        response_size = text.len(),
                        "workflow call completed"
                    );
                    return Ok(RawResponse { status, body: text });
                }
                Err(e) => {
                    // Body cut off mid-read counts as a transport failure
                    // for this attempt.
                    warn!(
                        endpoint,
                        attempt,
                        payload_size,
                        duration_ms,
                        error = %e,
                        "failed reading response body"
                    );
                    last_failure = e.to_string();
                }
            }
        }

        Err(Error::Transport {
            attempts: MAX_ATTEMPTS,
            message: last_failure,
        })
    }

    /// Reachability check against the engine's test webhook.
    pub async fn ping(&self) -> Result<()> {
        self.post(PING_ENDPOINT, &json!({ "action": "ping" }), DEFAULT_TIMEOUT)
            .await?;
        Ok(())
    }
}

fn status_message(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, SwapSettings};

    fn transport_for(server: &mockito::ServerGuard) -> WorkflowTransport {
        let settings = SwapSettings::new(Settings::new(server.url(), "test-token"));
        WorkflowTransport::new(Arc::new(settings)).unwrap()
    }

    /// One-shot HTTP/1.1 responder serving a fixed script, one connection
    /// per attempt. Lets tests sequence different outcomes for identical
    /// retried requests, which a single mock cannot.
    async fn scripted_server(script: Vec<&'static str>) -> (String, tokio::task::JoinHandle<usize>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut served = 0;
            for response in script {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 8192];
                let _ = socket.read(&mut buf).await;
                if !response.is_empty() {
                    socket.write_all(response.as_bytes()).await.unwrap();
                }
                // Empty script entries close the connection without a
                // response, which the client sees as a transport failure.
                drop(socket);
                served += 1;
            }
            served
        });
        (url, handle)
    }

    const SERVER_ERROR: &str =
        "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
    const OK_ENVELOPE: &str = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 16\r\nconnection: close\r\n\r\n{\"success\":true}";

    #[tokio::test]
    async fn two_server_errors_then_success_returns_the_body() {
        let (url, handle) = scripted_server(vec![SERVER_ERROR, SERVER_ERROR, OK_ENVELOPE]).await;
        let settings = SwapSettings::new(Settings::new(url, "test-token"));
        let transport = WorkflowTransport::new(Arc::new(settings)).unwrap();

        let response = transport
            .post("/webhook/seo-test", &json!({"action": "ping"}), DEFAULT_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"success":true}"#);
        assert_eq!(handle.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn dropped_connections_then_success_are_retried() {
        let (url, handle) = scripted_server(vec!["", "", OK_ENVELOPE]).await;
        let settings = SwapSettings::new(Settings::new(url, "test-token"));
        let transport = WorkflowTransport::new(Arc::new(settings)).unwrap();

        let response = transport
            .post("/webhook/seo-test", &json!({"action": "ping"}), DEFAULT_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(handle.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn unreachable_backend_fails_after_all_attempts() {
        // Bind then drop so the port refuses connections.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let settings = SwapSettings::new(Settings::new(url, "test-token"));
        let transport = WorkflowTransport::new(Arc::new(settings)).unwrap();
        let err = transport
            .post("/webhook/seo-test", &json!({"action": "ping"}), DEFAULT_TIMEOUT)
            .await
            .unwrap_err();

        match err {
            Error::Transport { attempts, .. } => assert_eq!(attempts, MAX_ATTEMPTS),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn three_server_errors_exhaust_the_attempt_budget() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/webhook/seo-test")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let transport = transport_for(&server);
        let err = transport
            .post("/webhook/seo-test", &json!({"action": "ping"}), DEFAULT_TIMEOUT)
            .await
            .unwrap_err();

        match err {
            Error::UpstreamHttp { status, .. } => assert_eq!(status, 503),
            other => panic!("unexpected error: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_error_surfaces_after_exactly_one_attempt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/webhook/seo-test")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let transport = transport_for(&server);
        let err = transport
            .post("/webhook/seo-test", &json!({"action": "ping"}), DEFAULT_TIMEOUT)
            .await
            .unwrap_err();

        match err {
            Error::UpstreamHttp { status, .. } => assert_eq!(status, 404),
            other => panic!("unexpected error: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn bearer_token_is_sent_on_every_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/webhook/seo-test")
            .match_header("authorization", "Bearer test-token")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let transport = transport_for(&server);
        transport.ping().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_base_url_is_a_configuration_error() {
        let settings = SwapSettings::new(Settings::new("", "token"));
        let transport = WorkflowTransport::new(Arc::new(settings)).unwrap();
        let err = transport.ping().await.unwrap_err();
        assert_eq!(err.code(), "not_configured");
    }

    #[tokio::test]
    async fn missing_token_is_a_configuration_error() {
        let settings = SwapSettings::new(Settings::new("https://n8n.example.com", ""));
        let transport = WorkflowTransport::new(Arc::new(settings)).unwrap();
        let err = transport.ping().await.unwrap_err();
        assert_eq!(err.code(), "not_configured");
    }

    #[tokio::test]
    async fn live_settings_edits_reach_the_next_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/webhook/seo-test")
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let settings = Arc::new(SwapSettings::new(Settings::new("", "")));
        let transport = WorkflowTransport::new(settings.clone()).unwrap();
        assert_eq!(transport.ping().await.unwrap_err().code(), "not_configured");

        settings.update(Settings::new(server.url(), "test-token"));
        transport.ping().await.unwrap();
        mock.assert_async().await;
    }
}
