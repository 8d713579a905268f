//! Hub resources and the store interfaces used to reach them
//!
//! The hub owns applications, identities, proxies and rule bundles. The
//! fetchers and the analyzer never talk to it directly; they receive a
//! [`Context`] holding trait objects so that tests can substitute stubs.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::activity::ActivitySink;
use crate::command::ProcessRunner;
use crate::repository::RepositoryKind;
use crate::Result;

/// Identity kind used for repository access
pub const SOURCE_IDENTITY: &str = "source";

/// Reference to another hub resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Ref {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

impl Ref {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: String::new(),
        }
    }
}

/// Repository settings of an application or rule bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Repository {
    /// Repository kind tag, empty means git
    pub kind: String,
    /// Remote URL
    pub url: String,
    /// Branch to check out
    pub branch: String,
    /// Tag to check out (git only)
    pub tag: String,
    /// Sub-path within the checkout holding the interesting content
    pub path: String,
}

impl Repository {
    pub fn new(kind: RepositoryKind, url: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }
}

/// Application under analysis
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Application {
    pub id: u64,
    pub name: String,
    pub repository: Option<Repository>,
    pub identities: Vec<Ref>,
}

impl Application {
    /// Build an anonymous owner for a repository that does not belong to
    /// an application (custom rule repositories, rule bundles).
    pub fn owning(repository: Repository, identity: Option<Ref>) -> Self {
        Self {
            repository: Some(repository),
            identities: identity.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// Stored credentials
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Identity {
    pub id: u64,
    pub kind: String,
    pub name: String,
    pub user: String,
    pub password: String,
    /// SSH private key (PEM)
    pub key: String,
}

impl Identity {
    pub fn has_password(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }

    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Proxy settings managed by the hub administrator
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Proxy {
    pub id: u64,
    pub enabled: bool,
    /// `http` or `https`
    pub kind: String,
    pub host: String,
    /// Zero when unset
    pub port: u16,
    pub identity: Option<Ref>,
    pub excluded: Vec<String>,
}

/// Rule set belonging to a bundle
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleSet {
    pub id: u64,
    pub name: String,
    pub file: Option<Ref>,
}

/// Named collection of analyzer rules
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleBundle {
    pub id: u64,
    pub name: String,
    #[serde(rename = "rulesets")]
    pub rule_sets: Vec<RuleSet>,
    pub repository: Option<Repository>,
    pub identity: Option<Ref>,
}

/// Boolean feature flags
#[async_trait]
pub trait SettingStore: Send + Sync {
    async fn bool(&self, key: &str) -> Result<bool>;
}

/// Identity lookup
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find the identity of the given kind among those referenced by the
    /// application. `Ok(None)` means no identity matched.
    async fn find(&self, application: &Application, kind: &str) -> Result<Option<Identity>>;

    /// Get an identity by id
    async fn get(&self, id: u64) -> Result<Identity>;
}

/// Proxy lookup
#[async_trait]
pub trait ProxyStore: Send + Sync {
    /// Find the proxy configured for `kind` (`http` or `https`)
    async fn find(&self, kind: &str) -> Result<Option<Proxy>>;
}

/// Rule bundle lookup
#[async_trait]
pub trait RuleBundleStore: Send + Sync {
    async fn get(&self, id: u64) -> Result<RuleBundle>;
}

/// File download
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Download file `id` to `path`
    async fn get(&self, id: u64, path: &Path) -> Result<()>;
}

/// Task bucket access
#[async_trait]
pub trait BucketStore: Send + Sync {
    /// Download the bucket entry at `path` into directory `dest`
    async fn get(&self, path: &str, dest: &Path) -> Result<()>;
}

/// Collaborators threaded into every fetcher
#[derive(Clone)]
pub struct Context {
    pub settings: Arc<dyn SettingStore>,
    pub identities: Arc<dyn IdentityStore>,
    pub proxies: Arc<dyn ProxyStore>,
    pub runner: Arc<dyn ProcessRunner>,
    pub activity: Arc<dyn ActivitySink>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}
