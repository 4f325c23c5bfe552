//! Energy-saving recommendations from a hosted Gradio Space.
//!
//! The Space exposes the two-step Gradio call API: `POST
//! /gradio_api/call/predict` queues a job and returns an `event_id`, and
//! `GET /gradio_api/call/predict/{event_id}` streams server-sent events until
//! the job completes or fails.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

/// Error type for recommendation operations.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    /// Another recommendation is in flight.
    #[error("recommendation model is busy")]
    Busy,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Space returned an error status.
    #[error("Gradio API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// The job reported an `error` event.
    #[error("recommendation job failed: {0}")]
    JobFailed(String),

    /// The event stream ended without a result, or the result was unusable.
    #[error("malformed event stream: {0}")]
    MalformedStream(String),
}

#[derive(Debug, Serialize)]
struct CallRequest<'a> {
    data: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct CallResponse {
    event_id: String,
}

/// Client for the Space's `/predict` endpoint.
#[derive(Debug, Clone)]
pub struct RecommendClient {
    client: Client,
    base_url: String,
}

impl RecommendClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Space URL (e.g., `"https://wh1plashr-apptry.hf.space"`)
    /// * `timeout` - Limit for each of the two requests
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RecommendError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Run one prediction and return its first output.
    ///
    /// String outputs are returned verbatim; other JSON values as JSON text.
    pub async fn predict(&self, appliance_info: &str) -> Result<String, RecommendError> {
        let url = format!("{}/gradio_api/call/predict", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&CallRequest {
                data: [appliance_info],
            })
            .send()
            .await?;
        let call: CallResponse = check_status(response).await?.json().await?;

        tracing::debug!(event_id = %call.event_id, "Recommendation job queued");

        let response = self
            .client
            .get(format!("{url}/{}", call.event_id))
            .send()
            .await?;
        let stream = check_status(response).await?.text().await?;

        parse_event_stream(&stream)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RecommendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(RecommendError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Find the terminal event in a Gradio event stream.
fn parse_event_stream(stream: &str) -> Result<String, RecommendError> {
    let mut event = "";
    let mut data: Vec<&str> = Vec::new();

    // A trailing blank line flushes the last block.
    for line in stream.lines().chain(std::iter::once("")) {
        if line.is_empty() {
            match event {
                "complete" => return first_output(&data.join("\n")),
                "error" => {
                    let message = data.join("\n");
                    let message = match message.trim() {
                        "" | "null" => "the Space reported an error".to_string(),
                        other => other.to_string(),
                    };
                    return Err(RecommendError::JobFailed(message));
                }
                _ => {}
            }
            event = "";
            data.clear();
        } else if let Some(name) = line.strip_prefix("event:") {
            event = name.trim();
        } else if let Some(payload) = line.strip_prefix("data:") {
            data.push(payload.strip_prefix(' ').unwrap_or(payload));
        }
    }

    Err(RecommendError::MalformedStream(
        "stream ended before the job completed".into(),
    ))
}

fn first_output(data: &str) -> Result<String, RecommendError> {
    let outputs: Vec<serde_json::Value> = serde_json::from_str(data)
        .map_err(|e| RecommendError::MalformedStream(format!("bad result payload: {e}")))?;

    match outputs.into_iter().next() {
        Some(serde_json::Value::String(text)) => Ok(text),
        Some(other) => Ok(other.to_string()),
        None => Err(RecommendError::MalformedStream("empty result".into())),
    }
}

/// Serializes access to the recommendation Space.
///
/// At most one call is in flight per proxy; a caller that finds the slot
/// taken gets [`RecommendError::Busy`] immediately rather than waiting.
pub struct RecommendationProxy {
    client: RecommendClient,
    slot: Semaphore,
}

impl RecommendationProxy {
    /// Wrap a client with a single-slot gate.
    #[must_use]
    pub fn new(client: RecommendClient) -> Self {
        Self {
            client,
            slot: Semaphore::new(1),
        }
    }

    /// Whether a call is currently in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Request a recommendation, failing fast when another is running.
    pub async fn recommend(&self, appliance_info: &str) -> Result<String, RecommendError> {
        let _permit = self.slot.try_acquire().map_err(|_| RecommendError::Busy)?;
        self.client.predict(appliance_info).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_job(server: &MockServer, stream: &str, delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/gradio_api/call/predict"))
            .and(body_json(json!({ "data": ["Aircon 1500W, 8h/day"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "event_id": "abc123" })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gradio_api/call/predict/abc123"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(stream.as_bytes().to_vec(), "text/event-stream")
                    .set_delay(delay),
            )
            .mount(server)
            .await;
    }

    fn proxy(server: &MockServer) -> RecommendationProxy {
        RecommendationProxy::new(
            RecommendClient::new(server.uri(), Duration::from_secs(10)).unwrap(),
        )
    }

    #[test]
    fn complete_event_yields_first_output() {
        let stream = "event: generating\ndata: null\n\n\
                      event: complete\ndata: [\"Turn off idle devices.\", 3]\n\n";
        assert_eq!(parse_event_stream(stream).unwrap(), "Turn off idle devices.");
    }

    #[test]
    fn non_string_output_is_json_text() {
        let stream = "event: complete\ndata: [{\"tip\": \"unplug\"}]";
        assert_eq!(parse_event_stream(stream).unwrap(), r#"{"tip":"unplug"}"#);
    }

    #[test]
    fn error_event_fails() {
        let err = parse_event_stream("event: heartbeat\ndata: null\n\nevent: error\ndata: null\n\n")
            .unwrap_err();
        assert!(matches!(err, RecommendError::JobFailed(_)));
    }

    #[test]
    fn truncated_stream_fails() {
        let err = parse_event_stream("event: generating\ndata: null\n\n").unwrap_err();
        assert!(matches!(err, RecommendError::MalformedStream(_)));
    }

    #[tokio::test]
    async fn recommend_runs_both_steps() {
        let server = MockServer::start().await;
        mount_job(
            &server,
            "event: complete\ndata: [\"Use the timer.\"]\n\n",
            Duration::ZERO,
        )
        .await;

        let text = proxy(&server).recommend("Aircon 1500W, 8h/day").await.unwrap();
        assert_eq!(text, "Use the timer.");
    }

    #[tokio::test]
    async fn second_caller_is_turned_away() {
        let server = MockServer::start().await;
        mount_job(
            &server,
            "event: complete\ndata: [\"Use the timer.\"]\n\n",
            Duration::from_millis(300),
        )
        .await;

        let proxy = Arc::new(proxy(&server));
        let first = tokio::spawn({
            let proxy = proxy.clone();
            async move { proxy.recommend("Aircon 1500W, 8h/day").await }
        });

        // Wait for the first call to take the slot.
        while !proxy.is_busy() {
            tokio::task::yield_now().await;
        }
        let second = proxy.recommend("Aircon 1500W, 8h/day").await;

        assert!(matches!(second, Err(RecommendError::Busy)));
        assert_eq!(first.await.unwrap().unwrap(), "Use the timer.");
        assert!(!proxy.is_busy());
    }

    #[tokio::test]
    async fn upstream_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("sleeping"))
            .mount(&server)
            .await;

        match proxy(&server).recommend("x").await.unwrap_err() {
            RecommendError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "sleeping");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
