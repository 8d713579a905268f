//! Subversion checkout

use std::fmt::Write as _;
use std::path::PathBuf;

use async_trait::async_trait;
use url::Url;

use super::files::create_exclusive;
use super::{remote, ssh, Fetcher, RepositoryKind, Scm};
use crate::hub::Identity;
use crate::Result;

/// Branch checked out when none is configured
const DEFAULT_BRANCH: &str = "trunk";

/// Subversion repository
#[derive(Debug)]
pub struct Subversion {
    scm: Scm,
}

impl Subversion {
    pub(crate) fn new(scm: Scm) -> Self {
        Self { scm }
    }

    fn config_dir(&self) -> PathBuf {
        self.scm.home().join(".subversion")
    }

    /// Write the `servers` file, including the proxy block when one applies
    async fn write_config(&self, url: &Url) -> Result<()> {
        let path = self.config_dir().join("servers");
        let servers = match self.scm.proxy(url).await? {
            Some(proxy) => proxy.svn_servers()?,
            None => String::new(),
        };
        create_exclusive(&path, servers.as_bytes(), 0o600)
    }

    /// Write the password store entry for `identity`
    fn write_creds(&self, url: &Url, identity: &Identity) -> Result<()> {
        let path = self
            .config_dir()
            .join("auth")
            .join("svn.simple")
            .join("entry");
        let entry = render_entry(&realm(url), &identity.user, &identity.password);
        create_exclusive(&path, entry.as_bytes(), 0o600)
    }
}

#[async_trait]
impl Fetcher for Subversion {
    fn kind(&self) -> RepositoryKind {
        RepositoryKind::Subversion
    }

    fn url(&self) -> Result<Url> {
        let mut url = remote::parse(&self.scm.repository.url)?;
        let branch = match self.scm.repository.branch.trim_matches('/') {
            "" => DEFAULT_BRANCH,
            b => b,
        };
        let path = format!("{}/{}", url.path().trim_end_matches('/'), branch);
        url.set_path(&path);
        Ok(url)
    }

    async fn validate(&self) -> Result<()> {
        let url = remote::parse(&self.scm.repository.url)?;
        self.scm.check_transport(&url).await
    }

    async fn fetch(&self) -> Result<()> {
        let url = self.url()?;
        self.scm.activity(&format!("Cloning: {}", url));

        self.scm.clean().await?;
        let identity = self.scm.identity().await?;
        self.write_config(&url).await?;

        let mut ssh_config = None;
        if let Some(ref id) = identity {
            if !id.user.is_empty() {
                self.write_creds(&url, id)?;
            }
            ssh_config = ssh::write(self.scm.home(), &url, id)?;
        }

        let insecure = self.scm.insecure().await?;
        let dest = self.scm.dest().display().to_string();
        let mut cmd = self.scm.command(&self.scm.tools.svn);
        cmd.options.add("checkout", [url.to_string(), dest]);
        cmd.options.push("--non-interactive");
        if insecure {
            cmd.options.push("--trust-server-cert");
        }
        if let Some(ssh) = ssh_config {
            cmd = cmd.with_env("SVN_SSH", ssh.command());
        }

        self.scm.run(&cmd).await?;
        tracing::info!(url = %url, dest = %self.scm.dest().display(), "Subversion checkout complete");
        Ok(())
    }
}

/// Authentication realm of the repository root, `<https://host:443>`
fn realm(url: &Url) -> String {
    match url.port_or_known_default() {
        Some(port) => format!("<{}://{}:{}>", url.scheme(), remote::host(url), port),
        None => format!("<{}://{}>", url.scheme(), remote::host(url)),
    }
}

/// Render an `svn.simple` password store record
///
/// Each value is preceded by its length in bytes.
pub fn render_entry(realm: &str, user: &str, password: &str) -> String {
    let fields = [
        ("svn:realmstring", realm),
        ("username", user),
        ("passtype", "simple"),
        ("password", password),
    ];
    let mut s = String::new();
    for (key, value) in fields {
        let _ = write!(s, "K {}\n{}\nV {}\n{}\n", key.len(), key, value.len(), value);
    }
    s.push_str("END\n");
    s
}
