//! SSH key and client configuration
//!
//! The key is written owner-only under `<home>/.ssh` together with a
//! `Host` entry so that the checkout tool's ssh transport uses it without
//! prompting. OpenSSH resolves `~` from the password database rather than
//! `HOME`, so callers pass [`SshConfig::command`] to the tool explicitly.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use url::Url;

use super::files::{create_exclusive, single_line};
use super::remote;
use crate::hub::Identity;
use crate::{Error, Result};

/// Written ssh configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshConfig {
    pub key_path: PathBuf,
    pub config_path: PathBuf,
}

impl SshConfig {
    /// `ssh` invocation reading the written config file
    pub fn command(&self) -> String {
        let path = self.config_path.display().to_string();
        if path
            .chars()
            .any(|c| c.is_whitespace() || "'\"\\$`;&|<>()*?".contains(c))
        {
            format!("ssh -F '{}'", path.replace('\'', "'\\''"))
        } else {
            format!("ssh -F {}", path)
        }
    }
}

/// Write the identity's key and a matching host entry for `url`
///
/// Returns `None` when the identity carries no key.
pub fn write(home: &Path, url: &Url, identity: &Identity) -> Result<Option<SshConfig>> {
    if !identity.has_key() {
        return Ok(None);
    }

    let dir = home.join(".ssh");
    let key_path = dir.join(format!("id_{}", identity.id));
    let config_path = dir.join("config");

    let entry = host_entry(url, identity, &key_path, &dir.join("known_hosts"))?;

    let mut key = identity.key.clone();
    if !key.ends_with('\n') {
        key.push('\n');
    }
    create_exclusive(&key_path, key.as_bytes(), 0o600)?;
    create_exclusive(&config_path, entry.as_bytes(), 0o600)?;

    tracing::debug!(host = remote::host(url), key = %key_path.display(), "Wrote ssh identity");
    Ok(Some(SshConfig {
        key_path,
        config_path,
    }))
}

fn host_entry(url: &Url, identity: &Identity, key_path: &Path, known_hosts: &Path) -> Result<String> {
    let host = match remote::host(url) {
        "" => "*",
        h => h,
    };
    let user = if url.username().is_empty() {
        identity.user.as_str()
    } else {
        url.username()
    };
    if user.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(Error::Validation(format!(
            "ssh user of identity {} contains whitespace or control characters",
            identity.id
        )));
    }

    let mut entry = format!("Host {}\n", host);
    if host != "*" {
        let _ = writeln!(entry, "  HostName {}", host);
    }
    if let Some(port) = url.port() {
        let _ = writeln!(entry, "  Port {}", port);
    }
    if !user.is_empty() {
        let _ = writeln!(entry, "  User {}", user);
    }
    let _ = writeln!(entry, "  IdentityFile {}", config_path(key_path)?);
    entry.push_str("  IdentitiesOnly yes\n");
    entry.push_str("  StrictHostKeyChecking accept-new\n");
    let _ = writeln!(entry, "  UserKnownHostsFile {}", config_path(known_hosts)?);
    Ok(entry)
}

/// Path as an ssh_config argument, double-quoted when it has whitespace
fn config_path(path: &Path) -> Result<String> {
    let path = path.display().to_string();
    single_line("ssh config path", &path)?;
    if path.contains('"') {
        return Err(Error::Validation(format!(
            "ssh config path cannot contain quotes: {}",
            path
        )));
    }
    if path.chars().any(char::is_whitespace) {
        Ok(format!("\"{}\"", path))
    } else {
        Ok(path)
    }
}
