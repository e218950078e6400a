//! HTTP client for the Ollama-compatible generation API.

use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::sink::TokenSink;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Bound on a single generation call. A hung upstream call would otherwise
/// stall its task indefinitely - and, during the loop, the whole run.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Failure kinds at the generation-service boundary.
#[derive(Debug, Error)]
pub enum AiError {
    /// Network, HTTP-status, or timeout failure.
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered, but the body was not what we expected.
    #[error("malformed generation response: {source}")]
    Decode {
        source: serde_json::Error,
        /// Raw body kept for diagnostics.
        raw: String,
    },
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

/// Client for an Ollama-compatible generation endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AiError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    /// Send a prompt and wait for the complete response text.
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<String, AiError> {
        debug!(model, "starting generation request");
        let body = self
            .http
            .post(self.generate_url())
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
            })
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let chunk: GenerateChunk = serde_json::from_str(&body).map_err(|source| AiError::Decode {
            source,
            raw: body.clone(),
        })?;

        debug!(model, chars = chunk.response.len(), "generation request finished");
        Ok(chunk.response)
    }

    /// Send a prompt and forward each token fragment to `sink` as it
    /// arrives. Returns the accumulated text seen before the done marker.
    ///
    /// The response is newline-delimited JSON; fragments may be split
    /// across network chunks, so lines are reassembled before parsing.
    /// Unparseable lines are skipped rather than failing the stream.
    pub async fn generate_streaming(
        &self,
        model: &str,
        prompt: &str,
        sink: &dyn TokenSink,
    ) -> Result<String, AiError> {
        debug!(model, "starting streaming generation request");
        let response = self
            .http
            .post(self.generate_url())
            .json(&GenerateRequest {
                model,
                prompt,
                stream: true,
            })
            .send()
            .await?
            .error_for_status()?;

        let mut stream = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();
        let mut full = String::new();

        'receive: while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            pending.extend_from_slice(&bytes);

            while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                let line = &line[..line.len() - 1];
                if line.is_empty() {
                    continue;
                }
                let Ok(parsed) = serde_json::from_slice::<GenerateChunk>(line) else {
                    continue;
                };
                if !parsed.response.is_empty() {
                    full.push_str(&parsed.response);
                    sink.accept(&parsed.response);
                }
                if parsed.done {
                    break 'receive;
                }
            }
        }

        debug!(model, chars = full.len(), "streaming generation finished");
        Ok(full)
    }
}
