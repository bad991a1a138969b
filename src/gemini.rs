// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Gemini API client for hosted content generation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::GeminiConfig;
use crate::{Result, SorterError};

/// One content part of a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 payload
    pub data: String,
}

/// Everything needed for a single `generateContent` call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub part: Part,
    pub system_instruction: String,
    pub response_schema: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    contents: Vec<WireContent<'a>>,
    system_instruction: WireInstruction<'a>,
    generation_config: WireGenerationConfig<'a>,
}

#[derive(Serialize)]
struct WireContent<'a> {
    role: &'static str,
    parts: [&'a Part; 1],
}

#[derive(Serialize)]
struct WireInstruction<'a> {
    parts: [TextRef<'a>; 1],
}

#[derive(Serialize)]
struct TextRef<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Anything that can answer a [`GenerateRequest`] with a text payload
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Issue the request and return the model's text reply
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

/// Gemini REST client
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(base_url: &str, model: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()?;

        // Normalize URL
        let base_url = base_url
            .trim_end_matches('/')
            .trim_end_matches("/v1beta")
            .to_string();

        Ok(Self {
            client,
            base_url,
            model: model.to_string(),
            api_key,
        })
    }

    /// Build a client from config, reading the API key from the environment
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            &config.model,
            config.api_key(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            SorterError::Config("Gemini API key is not configured".to_string())
        })?;

        let body = WireRequest {
            contents: vec![WireContent {
                role: "user",
                parts: [&request.part],
            }],
            system_instruction: WireInstruction {
                parts: [TextRef { text: &request.system_instruction }],
            },
            generation_config: WireGenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
            },
        };

        debug!("Sending request to Gemini: model={}", self.model);

        let response = self.client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SorterError::Upstream(format!(
                "Gemini returned status {}",
                response.status()
            )));
        }

        let result: GenerateResponse = response.json().await?;
        let text: String = result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SorterError::Upstream("Gemini returned no text".to_string()));
        }

        Ok(text)
    }
}
