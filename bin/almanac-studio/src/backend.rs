// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::config::LlmConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You analyse datasets. Reply with a JSON object of the form \
{\"summary\": string, \"anomalies\": [string]}. Keep the summary short and list each anomaly \
as one sentence. Omit anomalies when there are none.";

/// The structured answer expected back from the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReply {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("malformed reply: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait InsightBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<InsightReply, BackendError>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}
impl OpenAiBackend {
    pub fn new(config: &LlmConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_payload(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ]
        })
    }

    /// Reads the first choice's content as an [`InsightReply`].
    pub fn parse_reply(body: &Value) -> Result<InsightReply, BackendError> {
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| BackendError::Malformed("no message content in reply".to_string()))?;
        serde_json::from_str(content).map_err(|e| BackendError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl InsightBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<InsightReply, BackendError> {
        let api_key = self.api_key.as_deref().ok_or(BackendError::MissingApiKey)?;
        debug!(model = %self.model, chars = prompt.len(), "sending insight request");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.build_payload(prompt))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        let body: Value = response.json().await?;
        Self::parse_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_structured_content() {
        let body = json!({
            "choices": [{"message": {"content": "{\"summary\": \"Steps peak in October\", \"anomalies\": [\"May is low\"]}"}}]
        });
        let reply = OpenAiBackend::parse_reply(&body).unwrap();
        assert_eq!(reply.summary, "Steps peak in October");
        assert_eq!(reply.anomalies, Some(vec!["May is low".to_string()]));
    }

    #[test]
    fn rejects_missing_or_unstructured_content() {
        assert!(matches!(
            OpenAiBackend::parse_reply(&json!({"choices": []})),
            Err(BackendError::Malformed(_))
        ));
        let body = json!({"choices": [{"message": {"content": "plain words"}}]});
        assert!(OpenAiBackend::parse_reply(&body).is_err());
    }

    #[test]
    fn endpoint_joins_base_url() {
        let config = LlmConfig {
            base_url: "http://localhost:9999/v1/".to_string(),
            ..Default::default()
        };
        let backend = OpenAiBackend::new(&config).unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:9999/v1/chat/completions");
        let payload = backend.build_payload("hi");
        assert_eq!(payload["response_format"]["type"], "json_object");
        assert_eq!(payload["messages"][1]["content"], "hi");
    }
}
