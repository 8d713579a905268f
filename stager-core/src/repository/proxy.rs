//! Proxy resolution and rendering
//!
//! The proxy is looked up fresh for every fetch so that administrator
//! changes take effect on the next task.

use std::fmt::Write as _;

use url::Url;

use super::files::single_line;
use super::remote;
use crate::hub::{IdentityStore, ProxyStore};
use crate::{Error, Result};

/// Map a repository URL scheme to the proxy kind serving it
pub fn proxy_kind(scheme: &str) -> Option<&'static str> {
    match scheme {
        "http" => Some("http"),
        "https" | "ssh" => Some("https"),
        _ => None,
    }
}

/// An enabled proxy applicable to a repository URL
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedProxy {
    pub host: String,
    /// Zero when unset
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub excluded: Vec<String>,
}

impl std::fmt::Debug for ResolvedProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProxy")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("excluded", &self.excluded)
            .finish_non_exhaustive()
    }
}

/// Resolve the proxy for `url`, `None` when no proxy applies
pub async fn resolve(
    url: &Url,
    proxies: &dyn ProxyStore,
    identities: &dyn IdentityStore,
) -> Result<Option<ResolvedProxy>> {
    let Some(kind) = proxy_kind(url.scheme()) else {
        return Ok(None);
    };

    let proxy = match proxies.find(kind).await? {
        Some(p) if p.enabled => p,
        _ => return Ok(None),
    };

    let host = remote::host(url);
    if proxy.excluded.iter().any(|h| h == host) {
        tracing::debug!(host, proxy = %proxy.host, "Host excluded from proxy");
        return Ok(None);
    }

    let (user, password) = match proxy.identity {
        Some(ref r) => {
            let id = identities.get(r.id).await.map_err(|e| match e {
                Error::AuthResolution(_) => e,
                other => Error::AuthResolution(format!("proxy identity {}: {}", r.id, other)),
            })?;
            (Some(id.user), Some(id.password))
        }
        None => (None, None),
    };

    tracing::debug!(kind, proxy = %proxy.host, port = proxy.port, "Resolved proxy");
    Ok(Some(ResolvedProxy {
        host: proxy.host,
        port: proxy.port,
        user,
        password,
        excluded: proxy.excluded,
    }))
}

impl ResolvedProxy {
    /// `[global]` block of the Subversion `servers` file
    pub fn svn_servers(&self) -> Result<String> {
        self.check_lines()?;
        let mut s = String::from("[global]\n");
        let _ = writeln!(s, "http-proxy-host = {}", self.host);
        if self.port > 0 {
            let _ = writeln!(s, "http-proxy-port = {}", self.port);
        }
        if let Some(ref user) = self.user {
            let _ = writeln!(s, "http-proxy-username = {}", user);
            let _ = writeln!(s, "http-proxy-password = {}", self.password.as_deref().unwrap_or(""));
        }
        if !self.excluded.is_empty() {
            let _ = writeln!(s, "http-proxy-exceptions = {}", self.excluded.join(", "));
        }
        Ok(s)
    }

    /// Values rendered one per line must not break out of their line
    fn check_lines(&self) -> Result<()> {
        single_line("proxy host", &self.host)?;
        if let Some(ref user) = self.user {
            single_line("proxy user", user)?;
        }
        if let Some(ref password) = self.password {
            single_line("proxy password", password)?;
        }
        for host in &self.excluded {
            single_line("proxy exclusion", host)?;
        }
        Ok(())
    }

    /// Proxy URL with credentials percent-encoded
    pub fn url(&self) -> Result<String> {
        let mut url = Url::parse(&format!("http://{}", self.host))?;
        let invalid = || Error::Config(format!("Invalid proxy host: {}", self.host));
        if self.port > 0 {
            url.set_port(Some(self.port)).map_err(|_| invalid())?;
        }
        if let Some(ref user) = self.user {
            url.set_username(user).map_err(|_| invalid())?;
            url.set_password(self.password.as_deref()).map_err(|_| invalid())?;
        }
        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    /// `[http]` proxy line of a `.gitconfig`
    pub fn git_config(&self) -> Result<String> {
        Ok(format!("[http]\n\tproxy = {}\n", self.url()?))
    }

    /// Proxy settings of a `.curlrc`
    pub fn curlrc(&self) -> Result<String> {
        self.check_lines()?;
        let mut s = String::new();
        let _ = write!(s, "proxy = \"http://{}", self.host);
        if self.port > 0 {
            let _ = write!(s, ":{}", self.port);
        }
        s.push_str("\"\n");
        if let Some(ref user) = self.user {
            let _ = writeln!(
                s,
                "proxy-user = \"{}:{}\"",
                quote(user),
                quote(self.password.as_deref().unwrap_or(""))
            );
        }
        if !self.excluded.is_empty() {
            let _ = writeln!(s, "noproxy = \"{}\"", quote(&self.excluded.join(",")));
        }
        Ok(s)
    }
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
