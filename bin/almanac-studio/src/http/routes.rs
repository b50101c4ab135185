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

use crate::backend::InsightBackend;
use almanac::report::dataset_digest;
use almanac::{Dataset, DatasetAnalyser};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn InsightBackend>,
    pub analyser: Arc<DatasetAnalyser>,
    pub digest_insights: usize,
}

/// A `prompt` that is not a string counts as missing.
#[derive(Debug, Deserialize)]
pub struct InsightRequest {
    #[serde(default)]
    pub prompt: Option<serde_json::Value>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightMeta {
    pub rows: usize,
    pub columns: usize,
    pub insights: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightResponse {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomalies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<InsightMeta>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing prompt in request body")]
    MissingPrompt,
    #[error("Invalid request body")]
    Rejected(#[from] JsonRejection),
    #[error("Invalid dataset")]
    InvalidDataset(String),
    #[error("AI call failed")]
    Upstream(String),
}
impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingPrompt | ApiError::InvalidDataset(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(rejection) => rejection.status(),
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
    fn details(&self) -> Option<String> {
        match self {
            ApiError::MissingPrompt => None,
            ApiError::Rejected(rejection) => Some(rejection.body_text()),
            ApiError::InvalidDataset(details) | ApiError::Upstream(details) => {
                Some(details.clone())
            }
        }
    }
}
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details() {
            Some(details) => json!({ "error": self.to_string(), "details": details }),
            None => json!({ "error": self.to_string() }),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Dataset digest first, then the caller's question.
pub fn compose_prompt(digest: &str, prompt: &str) -> String {
    format!("Dataset context:\n{digest}\n\nQuestion:\n{prompt}")
}

async fn handle_insight(
    State(state): State<AppState>,
    payload: Result<Json<InsightRequest>, JsonRejection>,
) -> Result<Json<InsightResponse>, ApiError> {
    let Json(request) = payload?;
    let prompt = request
        .prompt
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MissingPrompt)?;

    let (full_prompt, meta) = match request.data {
        Some(data) if !data.is_null() => {
            let dataset = Dataset::from_json_value(data)
                .map_err(|e| ApiError::InvalidDataset(e.to_string()))?;
            let analysis = state.analyser.analyse(&dataset);
            let digest = dataset_digest(
                &dataset,
                &analysis.summary,
                &analysis.insights,
                state.digest_insights,
            );
            let meta = InsightMeta {
                rows: analysis.summary.total_rows,
                columns: analysis.summary.total_columns,
                insights: analysis.insights.len(),
            };
            (compose_prompt(&digest, prompt), Some(meta))
        }
        _ => (prompt.to_string(), None),
    };
    info!(
        prompt_chars = full_prompt.len(),
        with_data = meta.is_some(),
        "insight request"
    );

    let reply = state.backend.complete(&full_prompt).await.map_err(|e| {
        warn!(error = %e, "insight backend failed");
        ApiError::Upstream(e.to_string())
    })?;
    Ok(Json(InsightResponse {
        summary: reply.summary,
        anomalies: reply.anomalies,
        meta,
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub fn build_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/insight", post(handle_insight))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
