use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::ApiError;

/// Status reported by `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerHealth {
    pub status: String,
    pub uptime: f64,
}

impl ServerHealth {
    /// Value stored when a poll fails
    pub fn error() -> Self {
        Self {
            status: "error".to_string(),
            uptime: 0.0,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }

    /// Whole minutes of uptime
    pub fn uptime_minutes(&self) -> u64 {
        if self.uptime.is_finite() && self.uptime > 0.0 {
            (self.uptime / 60.0).floor() as u64
        } else {
            0
        }
    }
}

/// Payload of `POST /generate`
#[derive(Debug, Clone, Serialize)]
pub struct GenerateParams<'a> {
    pub text: &'a str,
}

/// The two calls the client makes against the quiz service
pub trait QuizBackend: Clone + Send + Sync + 'static {
    fn health(&self) -> impl Future<Output = Result<ServerHealth, ApiError>> + Send;

    /// Returns the decoded response body. Bodies that are not JSON come back
    /// as `Value::String`.
    fn generate(&self, text: &str) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

/// HTTP implementation of [`QuizBackend`]
#[derive(Clone)]
pub struct QuizClient {
    base_url: String,
    client: reqwest::Client,
}

impl QuizClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self::with_http_client(config.base_url.clone(), client))
    }

    /// Use an already configured `reqwest::Client`
    pub fn with_http_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl QuizBackend for QuizClient {
    fn health(&self) -> impl Future<Output = Result<ServerHealth, ApiError>> + Send {
        let client = self.client.clone();
        let url = format!("{}/health", self.base_url);

        async move {
            let response = client.get(&url).send().await?;
            let body = Self::read_body(response).await?;
            let health: ServerHealth = serde_json::from_str(&body)?;
            tracing::debug!(status = %health.status, uptime = health.uptime, "health poll ok");
            Ok(health)
        }
    }

    fn generate(&self, text: &str) -> impl Future<Output = Result<Value, ApiError>> + Send {
        let client = self.client.clone();
        let url = format!("{}/generate", self.base_url);
        let params = serde_json::to_value(GenerateParams { text });

        async move {
            let params = params?;
            tracing::debug!(request = %params, "sending generate request");

            let response = client
                .post(&url)
                .header("Content-Type", "application/json")
                .json(&params)
                .send()
                .await?;
            let body = Self::read_body(response).await?;
            tracing::debug!(bytes = body.len(), "generate response received");

            Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
        }
    }
}

/// Mirrors the truthiness check applied to a generate response body.
pub fn is_empty_body(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Converts a generate body into the content of an assistant message:
/// strings verbatim, everything else serialized as JSON.
pub fn body_to_content(value: Value) -> Result<String, ApiError> {
    if is_empty_body(&value) {
        return Err(ApiError::EmptyBody);
    }
    match value {
        Value::String(s) => Ok(s),
        other => Ok(serde_json::to_string(&other)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uptime_minutes_floors() {
        let health = ServerHealth {
            status: "healthy".to_string(),
            uptime: 179.9,
        };
        assert_eq!(health.uptime_minutes(), 2);
        assert_eq!(ServerHealth::error().uptime_minutes(), 0);
    }

    #[test]
    fn only_healthy_status_is_healthy() {
        let mut health = ServerHealth::error();
        assert!(!health.is_healthy());
        health.status = "healthy".to_string();
        assert!(health.is_healthy());
        health.status = "degraded".to_string();
        assert!(!health.is_healthy());
    }

    #[test]
    fn falsy_bodies_are_empty() {
        for value in [json!(null), json!(false), json!(0), json!(""), json!(0.0)] {
            assert!(is_empty_body(&value), "{value} should be empty");
        }
        for value in [json!(true), json!(1), json!("x"), json!([]), json!({})] {
            assert!(!is_empty_body(&value), "{value} should not be empty");
        }
    }

    #[test]
    fn string_body_is_kept_verbatim() {
        let content = body_to_content(json!("hello")).unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn object_body_is_serialized() {
        let content = body_to_content(json!({"answer": 2})).unwrap();
        assert_eq!(content, r#"{"answer":2}"#);
    }

    #[test]
    fn empty_body_is_an_error() {
        assert!(matches!(body_to_content(json!(null)), Err(ApiError::EmptyBody)));
    }
}
