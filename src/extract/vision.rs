//! Remote vision-model extraction fallback.
//!
//! When the local PDF parse yields nothing, the raw document bytes are presented to a
//! multimodal completion endpoint as a base64 data URL together with a fixed verbatim
//! transcription instruction. The call is deterministic (temperature 0) and capped at a
//! generous token ceiling; documents longer than the ceiling come back truncated, which is
//! an accepted limitation of this tier.

use crate::config::Config;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const EXTRACTION_INSTRUCTION: &str = "Extract ALL text from this document exactly as it appears. Preserve formatting, tables, and special characters. Return ONLY raw extracted text without any commentary.";
const MAX_COMPLETION_TOKENS: u32 = 4096;

/// Errors raised by the vision extraction tier.
#[derive(Debug, Error)]
pub enum VisionError {
    /// The HTTP call could not be completed (connection, timeout, malformed body).
    #[error("extraction request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("extraction service error ({status}): {message}")]
    Service {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Error message reported in the response body, when present.
        message: String,
    },
    /// The response carried no completion choices.
    #[error("extraction service returned no choices")]
    EmptyResponse,
    /// The completion was present but blank.
    #[error("extraction service returned no text")]
    EmptyText,
}

/// HTTP client for the multimodal extraction endpoint.
pub struct VisionExtractor {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

impl VisionExtractor {
    /// Construct a client sharing the pipeline's HTTP transport.
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.extraction_model.clone(),
        }
    }

    /// Transcribe the document bytes, returning verbatim text.
    pub async fn extract(&self, bytes: &[u8]) -> Result<String, VisionError> {
        let payload = STANDARD.encode(bytes);
        let body = json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": EXTRACTION_INSTRUCTION },
                    {
                        "type": "image",
                        "image_url": { "url": format!("data:application/pdf;base64,{payload}") }
                    }
                ]
            }],
            "max_tokens": MAX_COMPLETION_TOKENS,
            "temperature": 0
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = read_error_message(response).await;
            return Err(VisionError::Service { status, message });
        }

        let completion: CompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or(VisionError::EmptyResponse)?
            .message
            .content;

        let content = content.trim();
        if content.is_empty() {
            Err(VisionError::EmptyText)
        } else {
            Ok(content.to_string())
        }
    }
}

/// Pull `error.message` out of an error response body, defaulting when absent.
pub(crate) async fn read_error_message(response: reqwest::Response) -> String {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorBody>,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match response.json::<ErrorResponse>().await {
        Ok(ErrorResponse {
            error: Some(body), ..
        }) => body.message,
        _ => "Unknown error".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn extractor(base_url: &str) -> VisionExtractor {
        VisionExtractor::new(
            Client::new(),
            &Config::for_tests(base_url, 1536, 2000),
        )
    }

    #[tokio::test]
    async fn extract_sends_data_url_and_reads_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer test-key")
                    .body_contains("\"temperature\":0")
                    .body_contains("\"max_tokens\":4096")
                    .body_contains("data:application/pdf;base64,")
                    .body_contains("Extract ALL text from this document");
                then.status(200).json_body(json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "  Recovered text.  " } }
                    ]
                }));
            })
            .await;

        let text = extractor(&server.base_url())
            .extract(b"%PDF-1.4 garbage")
            .await
            .expect("extraction result");

        mock.assert();
        assert_eq!(text, "Recovered text.");
    }

    #[tokio::test]
    async fn extract_surfaces_service_error_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429).json_body(json!({
                    "error": { "message": "Rate limit reached" }
                }));
            })
            .await;

        let error = extractor(&server.base_url())
            .extract(b"bytes")
            .await
            .expect_err("service error");

        match error {
            VisionError::Service { status, message } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(message, "Rate limit reached");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn extract_rejects_blank_completion() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({
                    "choices": [ { "message": { "content": "   " } } ]
                }));
            })
            .await;

        let error = extractor(&server.base_url())
            .extract(b"bytes")
            .await
            .expect_err("blank completion");
        assert!(matches!(error, VisionError::EmptyText));
    }
}
