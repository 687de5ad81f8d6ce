//! The `suggest` exchange with a remote text-generation service.
//!
//! One JSON document goes out per invocation and the answer is read from
//! `candidates[0].content.parts[0].text` of the reply.

use serde::Serialize;
use serde_json::Value;

use crate::env::{API_KEY_VAR, ENDPOINT_VAR, Environment, MODEL_VAR};
use crate::errors::SuggestError;
use crate::http::{Url, http_post};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Where and how to reach the service.
#[derive(Debug, Clone)]
pub struct SuggestConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
}

impl SuggestConfig {
    /// Read the configuration from the shell environment.
    ///
    /// Fails only when the credential is missing; the endpoint and model
    /// fall back to their defaults.
    pub fn from_env(env: &Environment) -> Result<Self, SuggestError> {
        let api_key = env
            .get_var(API_KEY_VAR)
            .filter(|key| !key.is_empty())
            .ok_or(SuggestError::MissingCredential(API_KEY_VAR))?;
        Ok(Self {
            api_key,
            endpoint: env
                .get_var(ENDPOINT_VAR)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: env
                .get_var(MODEL_VAR)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    fn request_url(&self) -> Result<Url, SuggestError> {
        let raw = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint.trim_end_matches('/'),
            self.model,
            self.api_key
        );
        Url::parse(&raw).ok_or_else(|| SuggestError::Endpoint(self.endpoint.clone()))
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

pub struct SuggestClient {
    config: SuggestConfig,
}

impl SuggestClient {
    pub fn new(config: SuggestConfig) -> Self {
        Self { config }
    }

    /// Send `prompt` and return the generated text.
    pub fn generate(&self, prompt: &str) -> Result<String, SuggestError> {
        let url = self.config.request_url()?;
        let body = serde_json::to_vec(&GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        })?;

        log::debug!("suggest: POST {}://{}{}", url.scheme, url.host, url.path);
        let response = http_post(&url, "application/json", &body)?;
        log::debug!(
            "suggest: status {} with {} byte body",
            response.status_code,
            response.body.len()
        );

        if !response.is_success() {
            let message = serde_json::from_slice::<Value>(&response.body)
                .ok()
                .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string))
                .unwrap_or_else(|| "no error details".to_string());
            return Err(SuggestError::Status {
                status: response.status_code,
                message,
            });
        }

        extract_answer(&response.body)
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a response body.
pub fn extract_answer(body: &[u8]) -> Result<String, SuggestError> {
    let json: Value = serde_json::from_slice(body)?;
    json.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(SuggestError::UnexpectedFormat)
}

/// Run one `suggest` invocation: join the words, read the configuration and ask the service.
pub fn suggest(env: &Environment, words: &[String]) -> Result<String, SuggestError> {
    if words.is_empty() {
        return Err(SuggestError::MissingPrompt);
    }
    let prompt = words.join(" ");
    let config = SuggestConfig::from_env(env)?;
    SuggestClient::new(config).generate(&prompt)
}
