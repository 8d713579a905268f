//! Repository kind tags

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Kind of repository a fetcher knows how to stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RepositoryKind {
    /// Git clone followed by a branch or tag checkout
    #[default]
    Git,
    /// Subversion checkout of a branch directory
    Subversion,
    /// Single artifact downloaded over HTTP
    Binary,
}

impl RepositoryKind {
    /// Get all supported kinds
    pub fn all() -> &'static [RepositoryKind] {
        &[
            RepositoryKind::Git,
            RepositoryKind::Subversion,
            RepositoryKind::Binary,
        ]
    }

    /// Tag used by the hub
    pub fn name(&self) -> &'static str {
        match self {
            RepositoryKind::Git => "git",
            RepositoryKind::Subversion => "subversion",
            RepositoryKind::Binary => "binary",
        }
    }

    /// Prefix of activity messages
    pub fn label(&self) -> &'static str {
        match self {
            RepositoryKind::Git => "[GIT]",
            RepositoryKind::Subversion => "[SVN]",
            RepositoryKind::Binary => "[BINARY]",
        }
    }

    /// Setting that permits plaintext transport and untrusted certificates
    pub fn insecure_setting(&self) -> &'static str {
        match self {
            RepositoryKind::Git => "git.insecure.enabled",
            RepositoryKind::Subversion => "svn.insecure.enabled",
            RepositoryKind::Binary => "binary.insecure.enabled",
        }
    }

    /// URL schemes that carry data unencrypted
    pub fn plaintext_schemes(&self) -> &'static [&'static str] {
        match self {
            RepositoryKind::Git => &["http", "git"],
            RepositoryKind::Subversion => &["http", "svn"],
            RepositoryKind::Binary => &["http"],
        }
    }
}

impl fmt::Display for RepositoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RepositoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "git" => Ok(RepositoryKind::Git),
            "subversion" | "svn" => Ok(RepositoryKind::Subversion),
            "binary" => Ok(RepositoryKind::Binary),
            _ => Err(Error::UnsupportedKind(s.to_string())),
        }
    }
}
