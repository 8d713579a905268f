//! Binary artifact download

use std::path::PathBuf;

use async_trait::async_trait;
use url::Url;

use super::files::{create_exclusive, ensure_dir, single_line};
use super::{remote, Fetcher, RepositoryKind, Scm};
use crate::hub::Identity;
use crate::{Error, Result};

/// Artifact fetched with curl into the destination directory
#[derive(Debug)]
pub struct Binary {
    scm: Scm,
}

impl Binary {
    pub(crate) fn new(scm: Scm) -> Self {
        Self { scm }
    }

    fn file_name(url: &Url) -> Result<String> {
        remote::file_name(url)
            .ok_or_else(|| Error::Validation(format!("Artifact URL has no file name: {}", url)))
    }

    /// Write `.curlrc`, holding the proxy settings when one applies
    async fn write_config(&self, url: &Url) -> Result<()> {
        let curlrc = match self.scm.proxy(url).await? {
            Some(proxy) => proxy.curlrc()?,
            None => String::new(),
        };
        create_exclusive(&self.scm.home().join(".curlrc"), curlrc.as_bytes(), 0o600)
    }

    fn write_creds(&self, url: &Url, identity: &Identity) -> Result<Option<PathBuf>> {
        if !identity.has_password() {
            return Ok(None);
        }
        let path = self.scm.home().join(".netrc");
        let netrc = format!(
            "machine {} login {} password {}\n",
            remote::host(url),
            netrc_token("netrc login", &identity.user)?,
            netrc_token("netrc password", &identity.password)?
        );
        create_exclusive(&path, netrc.as_bytes(), 0o600)?;
        Ok(Some(path))
    }
}

/// netrc token, double-quoted when it holds whitespace, quotes or
/// backslashes
fn netrc_token(field: &str, value: &str) -> Result<String> {
    single_line(field, value)?;
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\') {
        Ok(format!(
            "\"{}\"",
            value.replace('\\', "\\\\").replace('"', "\\\"")
        ))
    } else {
        Ok(value.to_string())
    }
}

#[async_trait]
impl Fetcher for Binary {
    fn kind(&self) -> RepositoryKind {
        RepositoryKind::Binary
    }

    fn url(&self) -> Result<Url> {
        remote::parse(&self.scm.repository.url)
    }

    async fn validate(&self) -> Result<()> {
        let url = self.url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Validation(format!(
                "Unsupported artifact URL scheme: {}",
                url.scheme()
            )));
        }
        Self::file_name(&url)?;
        self.scm.check_transport(&url).await
    }

    async fn fetch(&self) -> Result<()> {
        let url = self.url()?;
        let file_name = Self::file_name(&url)?;
        self.scm.activity(&format!("Downloading: {}", url));

        self.scm.clean().await?;
        let identity = self.scm.identity().await?;
        self.write_config(&url).await?;

        let mut netrc = None;
        if let Some(ref id) = identity {
            netrc = self.write_creds(&url, id)?;
        }

        ensure_dir(self.scm.dest(), 0o755)?;
        let output = self.scm.dest().join(&file_name);

        let insecure = self.scm.insecure().await?;
        let mut cmd = self
            .scm
            .command(&self.scm.tools.curl)
            .with_env("CURL_HOME", self.scm.home().display().to_string());
        cmd.options.push("--fail");
        cmd.options.push("--silent");
        cmd.options.push("--show-error");
        cmd.options.push("--location");
        if let Some(ref path) = netrc {
            cmd.options.add("--netrc-file", [path.display().to_string()]);
        }
        cmd.options.add("--output", [output.display().to_string()]);
        if insecure {
            cmd.options.push("--insecure");
        }
        cmd.options.push(url.to_string());

        self.scm.run(&cmd).await?;
        tracing::info!(url = %url, path = %output.display(), "Artifact downloaded");
        Ok(())
    }
}
