//! User settings read from a RON file.
//!
//! Every field has a default, so a partial file (or none at all) is fine.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use docdesk_core::wire::IndexRequest;
use docdesk_core::SearchParameters;
use docdesk_engine::{ClientSettings, Pacing};
use docdesk_logging::desk_info;

pub const DEFAULT_CONFIG_FILE: &str = "docdesk.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub pacing: PacingConfig,
    pub indexation: IndexationConfig,
    pub search: SearchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: None,
            pacing: PacingConfig::default(),
            indexation: IndexationConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub between_files_ms: u64,
    pub hide_progress_after_ms: u64,
    pub step_interval_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            between_files_ms: 2000,
            hide_progress_after_ms: 2500,
            step_interval_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexationConfig {
    pub chunk_size: u32,
    pub chunk_overlap: u32,
    pub embedding_model: String,
}

impl Default for IndexationConfig {
    fn default() -> Self {
        let form = IndexRequest::default();
        Self {
            chunk_size: form.chunk_size,
            chunk_overlap: form.chunk_overlap,
            embedding_model: form.embedding_model,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub top_k: u32,
    pub temperature: f32,
    pub max_tokens: u32,
    pub show_sources: bool,
    pub system_prompt: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let params = SearchParameters::default();
        Self {
            top_k: params.top_k,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            show_sources: true,
            system_prompt: params.system_prompt,
        }
    }
}

impl Config {
    pub fn client_settings(&self, server_url: &str) -> ClientSettings {
        ClientSettings {
            base_url: server_url.to_string(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            between_files: Duration::from_millis(self.pacing.between_files_ms),
            hide_progress_after: Duration::from_millis(self.pacing.hide_progress_after_ms),
            step_interval: Duration::from_millis(self.pacing.step_interval_ms),
        }
    }

    pub fn index_form(&self) -> IndexRequest {
        IndexRequest {
            chunk_size: self.indexation.chunk_size,
            chunk_overlap: self.indexation.chunk_overlap,
            embedding_model: self.indexation.embedding_model.clone(),
        }
    }

    pub fn search_parameters(&self) -> SearchParameters {
        SearchParameters {
            top_k: self.search.top_k,
            temperature: self.search.temperature,
            max_tokens: self.search.max_tokens,
            system_prompt: self.search.system_prompt.clone(),
        }
    }
}

/// Reads the config file. An explicit path must exist; the default file may
/// be absent, in which case defaults apply.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            return Ok(Config::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config {}", path.display()));
        }
    };
    let config: Config =
        ron::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
    desk_info!("Loaded config from {:?}", path);
    Ok(config)
}
