// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for kb-sorter

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Gemini API settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Allow-lists loaded into a fresh session
    #[serde(default)]
    pub lists: ListConfig,

    /// Web UI settings
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ListConfig {
    #[serde(default = "default_projects")]
    pub projects: Vec<String>,
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// How long the "Categorized!" state stays visible before the form resets
    #[serde(default = "default_confirm_reset_ms")]
    pub confirm_reset_ms: u64,
}

// Default value functions
fn default_base_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_model() -> String { "gemini-2.5-flash".to_string() }
fn default_api_key_env() -> String { "API_KEY".to_string() }
fn default_timeout() -> u64 { 120 }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8080 }
fn default_confirm_reset_ms() -> u64 { 2000 }

fn default_projects() -> Vec<String> {
    ["Work", "Personal", "Side-Project"]
        .into_iter().map(String::from).collect()
}

fn default_tags() -> Vec<String> {
    ["Urgent", "Invoice", "Receipt", "Idea", "Inspiration", "Code Snippet"]
        .into_iter().map(String::from).collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            lists: ListConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            projects: default_projects(),
            tags: default_tags(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            confirm_reset_ms: default_confirm_reset_ms(),
        }
    }
}

impl GeminiConfig {
    /// Read the API key from the environment.
    ///
    /// A missing key is logged but not fatal: the UI still starts and the
    /// first categorization fails with the generic upstream error.
    pub fn api_key(&self) -> Option<String> {
        let key = std::env::var(&self.api_key_env)
            .ok()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty());

        if key.is_none() {
            tracing::error!("{} environment variable not set.", self.api_key_env);
        }
        key
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::SorterError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.lists.projects, vec!["Work", "Personal", "Side-Project"]);
        assert_eq!(config.lists.tags.len(), 6);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"lists": {"projects": ["Home"]}, "web": {"port": 9000}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.lists.projects, vec!["Home"]);
        assert_eq!(config.lists.tags, default_tags());
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.gemini.api_key_env, "API_KEY");
    }

    #[test]
    fn save_then_load_keeps_lists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.lists.tags.push("tax-document".to_string());
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.lists.tags.last().map(String::as_str), Some("tax-document"));
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        match AppConfig::load(&path) {
            Err(crate::SorterError::Config(msg)) => assert!(msg.contains("Failed to parse config")),
            other => panic!("expected config error, got {:?}", other),
        }
    }
}
