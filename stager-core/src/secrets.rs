//! Hub credentials of the agent itself
//!
//! The hub token is kept apart from the configuration file. It is read
//! from `STAGER_HUB_TOKEN`, falling back to `~/.config/stager/secrets.toml`,
//! which must not be readable by group or others.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Secrets structure
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    pub hub: HubSecrets,
}

/// Hub authentication
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HubSecrets {
    /// Bearer token presented to the hub
    pub token: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("hub_token", &self.hub.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns empty secrets if the file doesn't exist
    pub fn load() -> Result<Self> {
        match Self::default_secrets_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = std::fs::metadata(path)?.permissions().mode();
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        if let Some(ref mut token) = secrets.hub.token {
            *token = token.trim().to_string();
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/stager/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("stager").join("secrets.toml"))
    }

    /// Hub token, `STAGER_HUB_TOKEN` taking precedence over the file
    pub fn hub_token(&self) -> Option<String> {
        Self::pick_token(std::env::var("STAGER_HUB_TOKEN").ok(), self.hub.token.as_deref())
    }

    fn pick_token(env: Option<String>, file: Option<&str>) -> Option<String> {
        if let Some(token) = env.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
            debug!("Using hub token from STAGER_HUB_TOKEN");
            return Some(token);
        }

        file.filter(|t| !t.is_empty()).map(|t| {
            debug!("Using hub token from secrets file");
            t.to_string()
        })
    }
}
