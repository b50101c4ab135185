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

pub mod routes;

pub use routes::{build_router, compose_prompt, ApiError, AppState, InsightMeta, InsightResponse};

use crate::backend::OpenAiBackend;
use crate::config::StudioConfig;
use almanac::DatasetAnalyser;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the production state from configuration.
pub fn state_from_config(config: &StudioConfig) -> Result<AppState> {
    let backend = OpenAiBackend::new(&config.llm).context("building language model client")?;
    if config.llm.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; /insight requests will fail");
    }
    let analyser = DatasetAnalyser::with_config(config.analysis.clone())?;
    Ok(AppState {
        backend: Arc::new(backend),
        analyser: Arc::new(analyser),
        digest_insights: config.digest_insights,
    })
}

/// Serves until the listener fails or Ctrl-C arrives.
pub async fn serve(config: &StudioConfig, state: AppState) -> Result<()> {
    let app = build_router(state, config.http.body_limit_bytes);
    let addr = config.http.addr.as_str();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            warn!(error=%e, %addr, "bind failed, using ephemeral");
            tokio::net::TcpListener::bind("127.0.0.1:0").await?
        }
    };
    let local = listener.local_addr()?;
    info!(%local, model = %config.llm.model, "almanac studio listening");

    tokio::select! {
        res = axum::serve(listener, app) => res?,
        _ = tokio::signal::ctrl_c() => {}
    }
    info!("almanac studio shutting down");
    Ok(())
}
