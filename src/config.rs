/// Configuration module for symchunk.
///
/// Handles loading, validating, and providing default configuration values.
/// Every field is optional in the JSON file; command-line flags override it.
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::indexer::discovery::DiscoveryOptions;
use crate::indexer::languages;
use crate::lsp::client::LspOptions;

// ── Default value functions ──────────────────────────────────────────

fn default_clangd_path() -> String {
    "clangd".to_string()
}

fn default_dot() -> String {
    ".".to_string()
}

fn default_output() -> String {
    "chunks.json".to_string()
}

fn default_true() -> bool {
    true
}

fn default_language_id() -> String {
    "cpp".to_string()
}

fn default_initialize_secs() -> u64 {
    10
}

fn default_request_secs() -> u64 {
    30
}

fn default_shutdown_secs() -> u64 {
    5
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_clangd_path")]
    pub clangd_path: String,

    /// Directory holding `compile_commands.json`.
    #[serde(default = "default_dot")]
    pub compile_commands_dir: String,

    #[serde(default = "default_dot")]
    pub root: String,

    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub compact: bool,

    #[serde(default = "default_true")]
    pub background_index: bool,

    #[serde(default = "default_language_id")]
    pub language_id: String,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiscoveryConfig {
    #[serde(default = "languages::default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "languages::default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TimeoutConfig {
    #[serde(default = "default_initialize_secs")]
    pub initialize_secs: u64,

    #[serde(default = "default_request_secs")]
    pub request_secs: u64,

    #[serde(default = "default_shutdown_secs")]
    pub shutdown_secs: u64,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            clangd_path: default_clangd_path(),
            compile_commands_dir: default_dot(),
            root: default_dot(),
            output: default_output(),
            compact: false,
            background_index: default_true(),
            language_id: default_language_id(),
            discovery: DiscoveryConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: languages::default_extensions(),
            skip_dirs: languages::default_skip_dirs(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            initialize_secs: default_initialize_secs(),
            request_secs: default_request_secs(),
            shutdown_secs: default_shutdown_secs(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults. A file that is not valid JSON is
    /// reported and also yields the defaults.
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref();

        if !path.exists() {
            info!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {}: {e}", path.display());
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data)
            .with_context(|| format!("failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.clangd_path.is_empty(), "clangd_path must not be empty");
        anyhow::ensure!(!self.output.is_empty(), "output must not be empty");
        anyhow::ensure!(
            !self.discovery.extensions.is_empty(),
            "at least one source extension must be specified"
        );
        anyhow::ensure!(
            self.timeouts.initialize_secs > 0,
            "timeouts.initialize_secs must be positive"
        );
        anyhow::ensure!(
            self.timeouts.request_secs > 0,
            "timeouts.request_secs must be positive"
        );
        anyhow::ensure!(
            self.timeouts.shutdown_secs > 0,
            "timeouts.shutdown_secs must be positive"
        );
        Ok(())
    }

    #[must_use]
    pub fn lsp_options(&self) -> LspOptions {
        LspOptions {
            clangd_path: self.clangd_path.clone(),
            compile_commands_dir: PathBuf::from(&self.compile_commands_dir),
            root: PathBuf::from(&self.root),
            background_index: self.background_index,
            language_id: self.language_id.clone(),
            initialize_timeout: Duration::from_secs(self.timeouts.initialize_secs),
            request_timeout: Duration::from_secs(self.timeouts.request_secs),
            shutdown_timeout: Duration::from_secs(self.timeouts.shutdown_secs),
        }
    }

    #[must_use]
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            extensions: self
                .discovery
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            skip_dirs: self.discovery.skip_dirs.clone(),
            exclude_patterns: self.discovery.exclude_patterns.clone(),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
