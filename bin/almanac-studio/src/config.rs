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

use almanac::AnalysisConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub addr: String,
    pub body_limit_bytes: usize,
}
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:4000".to_string(),
            body_limit_bytes: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Read from `OPENAI_API_KEY`; never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}
impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub http: HttpConfig,
    pub llm: LlmConfig,
    /// Insights included in the prompt digest.
    pub digest_insights: usize,
    pub analysis: AnalysisConfig,
}
impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            llm: LlmConfig::default(),
            digest_insights: 5,
            analysis: AnalysisConfig::default(),
        }
    }
}

/// Defaults, then an optional TOML file, then environment variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
}
impl ConfigLoader {
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
        }
    }

    pub fn load(&self) -> Result<StudioConfig> {
        self.load_with(|key| std::env::var(key).ok())
    }

    pub fn load_with<F>(&self, lookup: F) -> Result<StudioConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => StudioConfig::default(),
        };
        apply_env(&mut config, lookup)?;
        config
            .analysis
            .validate()
            .context("invalid [analysis] settings")?;
        Ok(config)
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("{key}={raw}")))
        .transpose()
}

pub fn apply_env<F>(config: &mut StudioConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(addr) = lookup("ALMANAC_HTTP_ADDR") {
        config.http.addr = addr;
    }
    if let Some(limit) = parsed(&lookup, "ALMANAC_BODY_LIMIT_BYTES")? {
        config.http.body_limit_bytes = limit;
    }
    if let Some(url) = lookup("ALMANAC_LLM_BASE_URL") {
        config.llm.base_url = url;
    }
    if let Some(model) = lookup("ALMANAC_LLM_MODEL") {
        config.llm.model = model;
    }
    if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
        config.llm.api_key = Some(key);
    }
    if let Some(secs) = parsed(&lookup, "ALMANAC_LLM_TIMEOUT_SECS")? {
        config.llm.timeout_secs = secs;
    }
    if let Some(n) = parsed(&lookup, "ALMANAC_DIGEST_INSIGHTS")? {
        config.digest_insights = n;
    }
    Ok(())
}
