//! HTTP transport for the Vultr REST API
//!
//! Executes prepared requests, maps non-2xx statuses to [`Error::Api`] and
//! retries idempotent requests on transient failures. Resource handlers sit
//! on top of this and never retry on their own.

use crate::config::Config;
use crate::error::{Error, Result};
use reqwest::{Method, Request, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging.
/// Truncates long responses and strips control characters.
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let total = body.chars().count();
    let truncated = if total > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Backoff settings for idempotent requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub limit: u32,
    pub wait_min: Duration,
    pub wait_max: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            limit: config.retry_limit,
            wait_min: config.retry_wait_min(),
            wait_max: config.retry_wait_max(),
        }
    }

    /// Wait before retry number `attempt` (zero-based): doubles each time, capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.wait_min
            .checked_mul(factor)
            .unwrap_or(self.wait_max)
            .min(self.wait_max)
    }
}

/// Only these verbs are replayed after a transient failure. Credential
/// issuance (OPTIONS) and creation (POST) are sent exactly once.
fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::PUT | Method::DELETE)
}

/// Error body shape returned by the API
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: String,
}

fn api_error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}

/// Decode a JSON response body. An empty body decodes as JSON `null`.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let trimmed = body.trim_ascii();
    let input: &[u8] = if trimmed.is_empty() { b"null" } else { trimmed };

    serde_json::from_slice(input).map_err(|e| Error::Decode {
        message: e.to_string(),
        body: sanitize_for_log(&String::from_utf8_lossy(body)),
    })
}

/// HTTP client wrapper for Vultr API calls
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            retry: RetryPolicy::from_config(config),
        })
    }

    /// Underlying reqwest client, used to build requests
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Execute a request and return the raw body of a 2xx response
    pub async fn execute(&self, mut request: Request) -> Result<Vec<u8>> {
        let idempotent = is_idempotent(request.method());
        let mut attempt = 0u32;

        loop {
            let replay = if idempotent && attempt < self.retry.limit {
                request.try_clone()
            } else {
                None
            };

            match (self.execute_once(request).await, replay) {
                (Err(err), Some(next)) if err.is_retryable() => {
                    let wait = self.retry.backoff(attempt);
                    tracing::warn!(
                        "Retrying {} {} in {:?} (attempt {}/{}): {}",
                        next.method(),
                        next.url().path(),
                        wait,
                        attempt + 1,
                        self.retry.limit,
                        err
                    );
                    tokio::time::sleep(wait).await;
                    request = next;
                    attempt += 1;
                }
                (result, _) => return result,
            }
        }
    }

    async fn execute_once(&self, request: Request) -> Result<Vec<u8>> {
        tracing::debug!("{} {}", request.method(), request.url());

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "API error: {} - {}",
                status,
                sanitize_for_log(&String::from_utf8_lossy(&body))
            );
            return Err(Error::Api {
                status: status.as_u16(),
                message: api_error_message(status, &body),
            });
        }

        Ok(body.to_vec())
    }
}

/// Format a client error for display.
/// Security: maps API failures to generic messages instead of echoing server text.
pub fn describe_error(error: &Error) -> String {
    match error {
        Error::Api { status, message } => match status {
            401 => "Authentication failed. Check VULTR_API_KEY.".to_string(),
            403 => "Permission denied. Check the API key's access controls.".to_string(),
            404 => "Resource not found.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            400 | 422 => format!("Invalid request: {}", truncate_message(message)),
            409 => "Resource conflict. The resource may already exist or be in use.".to_string(),
            500..=599 => "Vultr API temporarily unavailable. Please try again.".to_string(),
            _ => "Request failed. Check your network connection and try again.".to_string(),
        },
        Error::Transport(err) if err.is_timeout() => "Request timed out.".to_string(),
        Error::Transport(_) => {
            "Request failed. Check your network connection and try again.".to_string()
        }
        other => truncate_message(&other.to_string()),
    }
}

fn truncate_message(message: &str) -> String {
    let sanitized = message
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(80)
        .collect::<String>();

    if sanitized.len() < message.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("500 bytes total"));
    }

    #[test]
    fn test_sanitize_handles_multibyte_boundary() {
        let body = "é".repeat(300);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated"));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            limit: 5,
            wait_min: Duration::from_millis(100),
            wait_max: Duration::from_millis(350),
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(350));
        assert_eq!(policy.backoff(40), Duration::from_millis(350));
    }

    #[test]
    fn test_only_idempotent_methods_replay() {
        assert!(is_idempotent(&Method::GET));
        assert!(is_idempotent(&Method::PUT));
        assert!(is_idempotent(&Method::DELETE));
        assert!(!is_idempotent(&Method::POST));
        assert!(!is_idempotent(&Method::OPTIONS));
    }

    #[test]
    fn test_api_error_message_prefers_body() {
        let msg = api_error_message(
            StatusCode::NOT_FOUND,
            br#"{"error":"Invalid registry ID","status":404}"#,
        );
        assert_eq!(msg, "Invalid registry ID");

        let msg = api_error_message(StatusCode::NOT_FOUND, b"<html>oops</html>");
        assert_eq!(msg, "Not Found");
    }

    #[test]
    fn test_decode_empty_body_as_null() {
        let value: Option<serde_json::Value> = decode_json(b"  ").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_decode_error_keeps_body_snippet() {
        let err = decode_json::<Vec<u32>>(b"{\"not\": \"a list\"}").unwrap_err();
        match err {
            Error::Decode { body, .. } => assert!(body.contains("not")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_describe_error_hides_server_text() {
        let err = Error::Api {
            status: 500,
            message: "stack trace at db.rs:42".to_string(),
        };
        let msg = describe_error(&err);
        assert!(!msg.contains("db.rs"));

        let err = Error::Api {
            status: 404,
            message: String::new(),
        };
        assert_eq!(describe_error(&err), "Resource not found.");
    }
}
