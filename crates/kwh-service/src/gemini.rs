//! Gemini client for appliance wattage estimates.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Error type for Gemini operations.
#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gemini returned an error response.
    #[error("Gemini API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The response had no text.
    #[error("Gemini returned an empty answer")]
    EmptyAnswer,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Prompt asking for a single numeric wattage.
#[must_use]
pub fn wattage_prompt(appliance: &str) -> String {
    format!(
        "What is the average wattage of a {appliance}? If the average wattage is a range, \
         give me the modal wattage. If not available, give a single value representing the \
         average wattage best. Return only a single numeric value (e.g., 700, 800) with no \
         additional text or explanation."
    )
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API URL (e.g., `"https://generativelanguage.googleapis.com"`)
    /// * `api_key` - Gemini API key
    /// * `model` - Model name (e.g., `"gemini-2.0-flash"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Model used for requests.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask for the typical wattage of an appliance; returns the model's
    /// trimmed answer.
    pub async fn lookup_wattage(&self, appliance: &str) -> Result<String, GeminiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let prompt = wattage_prompt(appliance);
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: &prompt }],
            }],
        };

        tracing::debug!(appliance = %appliance, model = %self.model, "Requesting wattage estimate");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorEnvelope>().await {
                Ok(envelope) => envelope.error.message,
                Err(_) => format!("HTTP {status}"),
            };
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        let answer = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if answer.is_empty() {
            return Err(GeminiError::EmptyAnswer);
        }
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(server.uri(), "test-key", "gemini-2.0-flash").unwrap()
    }

    fn answer(text: &str) -> serde_json::Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }] })
    }

    #[test]
    fn prompt_names_the_appliance() {
        let prompt = wattage_prompt("rice cooker");
        assert!(prompt.starts_with("What is the average wattage of a rice cooker?"));
        assert!(prompt.ends_with("with no additional text or explanation."));
    }

    #[tokio::test]
    async fn returns_trimmed_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": wattage_prompt("microwave") }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(answer(" 1000\n")))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server).lookup_wattage("microwave").await.unwrap(), "1000");
    }

    #[tokio::test]
    async fn empty_answer_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client(&server).lookup_wattage("fan").await.unwrap_err();
        assert!(matches!(err, GeminiError::EmptyAnswer));
    }

    #[tokio::test]
    async fn api_error_keeps_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED" }
            })))
            .mount(&server)
            .await;

        match client(&server).lookup_wattage("fan").await.unwrap_err() {
            GeminiError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
