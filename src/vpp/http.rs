//! HTTP utilities for the dataplane's JSON API gateway

use super::dataplane::TransportError;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= MAX_LOG_BODY_LENGTH)
            .last()
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Short explanation for a gateway status code
pub fn status_hint(status: u16) -> &'static str {
    match status {
        401 => "authentication failed, check the API token",
        403 => "permission denied by the gateway",
        404 => "call not known to the gateway or dataplane plugin not loaded",
        429 => "rate limited, try again later",
        400 => "invalid call arguments",
        500 | 502 | 503 => "gateway or dataplane temporarily unavailable",
        _ => "unexpected gateway response",
    }
}

/// HTTP client wrapper for gateway calls
#[derive(Clone)]
pub struct VppHttpClient {
    client: Client,
}

impl VppHttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("vppstate/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unavailable(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// POST a call to the gateway and decode the JSON reply
    pub async fn post(
        &self,
        url: &str,
        message: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<Value, TransportError> {
        tracing::debug!("POST {} ({})", url, message);

        let mut request = self.client.post(url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| request_error(message, e))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| request_error(message, e))?;

        if !status.is_success() {
            // Only log a sanitized, truncated body
            tracing::error!(
                "Gateway error: {} - {}",
                status,
                sanitize_for_log(&response_body)
            );
            return Err(TransportError::Status {
                message: message.to_string(),
                status: status.as_u16(),
                hint: status_hint(status.as_u16()),
            });
        }

        // Calls without a reply body behave like an empty reply
        if response_body.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }

        serde_json::from_str(&response_body).map_err(|source| TransportError::Decode {
            message: message.to_string(),
            source,
        })
    }
}

fn request_error(message: &str, error: reqwest::Error) -> TransportError {
    if error.is_connect() {
        TransportError::Unavailable(format!("cannot connect for {}: {}", message, error))
    } else {
        TransportError::Request {
            message: message.to_string(),
            source: error,
        }
    }
}
