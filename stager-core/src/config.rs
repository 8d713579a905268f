//! Configuration management for stager
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (STAGER_*)
//! 3. Config file (~/.config/stager/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Hub connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HubConfig {
    /// Base URL of the hub REST API
    pub url: String,

    /// Task being executed, 0 when running stand-alone
    pub task: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            task: 0,
        }
    }
}

/// Paths of the external programs driven by the agent
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Tools {
    pub svn: String,
    pub git: String,
    pub curl: String,
    pub analyzer: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            svn: "/usr/bin/svn".to_string(),
            git: "/usr/bin/git".to_string(),
            curl: "/usr/bin/curl".to_string(),
            analyzer: "/opt/windup".to_string(),
        }
    }
}

/// Directory layout of a task sandbox
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Layout {
    /// Home directory receiving tool config and credential files
    pub home: PathBuf,

    /// Root under which inputs and reports are staged
    pub root: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            home: dirs::home_dir().unwrap_or_else(|| PathBuf::from("/addon")),
            root: PathBuf::from("/addon"),
        }
    }
}

impl Layout {
    /// Application checkout
    pub fn source_dir(&self) -> PathBuf {
        self.root.join("source")
    }

    /// Dependency artifacts
    pub fn deps_dir(&self) -> PathBuf {
        self.root.join("deps")
    }

    /// Binary artifacts
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("binary")
    }

    /// Staged analyzer rules
    pub fn rules_dir(&self) -> PathBuf {
        self.root.join("rules")
    }

    /// Analyzer report output
    pub fn report_dir(&self) -> PathBuf {
        self.root.join("report")
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub hub: HubConfig,
    pub layout: Layout,
    pub tools: Tools,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/stager/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stager").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - STAGER_HUB_URL: Hub base URL
    /// - STAGER_TASK: Task id
    /// - STAGER_HOME: Home directory for tool configuration
    /// - STAGER_ROOT: Staging root directory
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = var("STAGER_HUB_URL") {
            self.hub.url = url;
        }

        if let Some(task) = var("STAGER_TASK") {
            self.hub.task = task
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("STAGER_TASK is not a task id: {}", task)))?;
        }

        if let Some(home) = var("STAGER_HOME") {
            self.layout.home = PathBuf::from(home);
        }

        if let Some(root) = var("STAGER_ROOT") {
            self.layout.root = PathBuf::from(root);
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, hub_url: Option<String>, task: Option<u64>) -> Self {
        if let Some(url) = hub_url {
            self.hub.url = url;
        }

        if let Some(task) = task {
            self.hub.task = task;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(hub_url: Option<String>, task: Option<u64>) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(hub_url, task))
    }
}
