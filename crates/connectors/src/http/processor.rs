use crate::{error::ProcessorError, http::response::ProcessorResponse, processor::BatchProcessor};
use async_trait::async_trait;
use model::records::batch::{BatchRequest, BatchResult};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("sluice/", env!("CARGO_PKG_VERSION"));
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Serialize)]
struct BatchBody<'a> {
    target: &'a str,
    batch: usize,
    rows: usize,
    payload: &'a str,
}

/// Posts each batch as JSON to a remote import endpoint.
#[derive(Debug, Clone)]
pub struct HttpBatchProcessor {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpBatchProcessor {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ProcessorError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(ProcessorError::Unavailable(
                "no endpoint URL configured".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(HttpBatchProcessor {
            client,
            endpoint,
            api_token: None,
        })
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BatchProcessor for HttpBatchProcessor {
    fn name(&self) -> &str {
        "http"
    }

    async fn process(&self, request: &BatchRequest) -> Result<BatchResult, ProcessorError> {
        debug!(
            endpoint = %self.endpoint,
            batch = request.number(),
            rows = request.row_count,
            bytes = request.payload.len(),
            "Posting batch"
        );

        let body = BatchBody {
            target: &request.target,
            batch: request.number(),
            rows: request.row_count,
            payload: &request.payload,
        };

        let mut call = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            call = call.bearer_auth(token);
        }

        let response = call.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(
                endpoint = %self.endpoint,
                batch = request.number(),
                status = status.as_u16(),
                "Endpoint rejected batch"
            );
            return Err(ProcessorError::Status {
                status: status.as_u16(),
                body: excerpt(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(BatchResult::default());
        }

        let parsed: ProcessorResponse = serde_json::from_str(&text)
            .map_err(|e| ProcessorError::Decode(format!("{e}: {}", excerpt(&text))))?;

        Ok(parsed.into())
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(BODY_EXCERPT_CHARS).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    fn request(payload: &str) -> BatchRequest {
        BatchRequest {
            target: "card-42".to_string(),
            batch_index: 1,
            row_count: payload.lines().count().saturating_sub(1),
            payload: payload.to_string(),
        }
    }

    #[tokio::test]
    async fn posts_batch_and_parses_counters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/import"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(serde_json::json!({
                "target": "card-42",
                "batch": 2,
                "payload": "email\na@x.com"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "insertedCount": 1,
                "skippedCount": 0,
                "pointsAwarded": 10,
                "errors": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let processor = HttpBatchProcessor::new(format!("{}/import", server.uri()))
            .unwrap()
            .with_api_token(Some("secret".to_string()));

        let result = processor.process(&request("email\na@x.com")).await.unwrap();
        assert_eq!(result.inserted, 1);
        assert_eq!(result.counters.get("pointsAwarded"), Some(&10));
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(413).set_body_string("payload too large"))
            .mount(&server)
            .await;

        let processor = HttpBatchProcessor::new(server.uri()).unwrap();
        let err = processor.process(&request("a\nb")).await.unwrap_err();

        match &err {
            ProcessorError::Status { status, body } => {
                assert_eq!(*status, 413);
                assert_eq!(body, "payload too large");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "HTTP 413: payload too large");
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let processor = HttpBatchProcessor::new(server.uri()).unwrap();
        let err = processor.process(&request("a")).await.unwrap_err();
        assert!(matches!(err, ProcessorError::Decode(_)));
    }

    #[tokio::test]
    async fn empty_body_counts_as_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let processor = HttpBatchProcessor::new(server.uri()).unwrap();
        let result = processor.process(&request("a")).await.unwrap();
        assert_eq!(result, BatchResult::default());
    }

    #[test]
    fn rejects_blank_endpoint() {
        assert!(matches!(
            HttpBatchProcessor::new("  "),
            Err(ProcessorError::Unavailable(_))
        ));
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let long = "x".repeat(500);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), BODY_EXCERPT_CHARS + 1);
        assert!(cut.ends_with('…'));
    }
}
