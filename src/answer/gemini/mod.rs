
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::answer::GenerationProvider;
use crate::config::GeminiConfig;
use crate::{BestiaryError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key: String,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl GeminiClient {
    #[inline]
    pub fn new(config: &GeminiConfig, api_key: String) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            agent,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        }
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }

    fn make_request_with_retry(&self, request_json: &str) -> Result<String> {
        let url = self.generate_url();
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!("Generation request attempt {}/{}", attempt, self.retry_attempts);

            match self
                .agent
                .post(&url)
                .header("Content-Type", "application/json")
                .send(request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
            {
                Ok(response_text) => return Ok(response_text),
                Err(error) => {
                    let should_retry = match &error {
                        // 429 is the provider's rate limit; backing off is the
                        // only useful response.
                        ureq::Error::StatusCode(status) => {
                            if *status >= 500 || *status == 429 {
                                warn!(
                                    "Retryable generation error (status {}), attempt {}/{}",
                                    status, attempt, self.retry_attempts
                                );
                                true
                            } else {
                                warn!("Client error (status {}), not retrying", status);
                                return Err(BestiaryError::GenerationFailed(format!(
                                    "HTTP {} from generation endpoint (check the API key)",
                                    status
                                )));
                            }
                        }
                        ureq::Error::ConnectionFailed
                        | ureq::Error::HostNotFound
                        | ureq::Error::Timeout(_)
                        | ureq::Error::Io(_) => {
                            warn!(
                                "Transport error: {}, attempt {}/{}",
                                error, attempt, self.retry_attempts
                            );
                            true
                        }
                        _ => false,
                    };

                    if !should_retry {
                        return Err(BestiaryError::GenerationFailed(format!(
                            "Non-retryable error: {}",
                            error
                        )));
                    }

                    last_error = Some(BestiaryError::GenerationFailed(format!(
                        "Request error: {}",
                        error
                    )));

                    if attempt < self.retry_attempts {
                        let delay_ms = EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 1000;
                        std::thread::sleep(Duration::from_millis(delay_ms));
                    }
                }
            }
        }

        error!("All generation attempts failed");
        Err(last_error.unwrap_or_else(|| {
            BestiaryError::GenerationFailed("Request failed after retries".to_string())
        }))
    }
}

impl GenerationProvider for GeminiClient {
    #[inline]
    fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let request_json = serde_json::to_string(&request).map_err(|e| {
            BestiaryError::GenerationFailed(format!("Failed to serialize request: {}", e))
        })?;

        let response_text = self.make_request_with_retry(&request_json)?;

        let response: GenerateResponse = serde_json::from_str(&response_text).map_err(|e| {
            BestiaryError::GenerationFailed(format!("Failed to parse generation response: {}", e))
        })?;

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            BestiaryError::GenerationFailed("Generation response contained no candidates".to_string())
        })?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect();

        if text.is_empty() {
            return Err(BestiaryError::GenerationFailed(
                "Generation response contained no text".to_string(),
            ));
        }

        debug!("Generated answer of {} chars", text.len());
        Ok(text)
    }
}
