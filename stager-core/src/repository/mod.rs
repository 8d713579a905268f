//! Repository fetching
//!
//! A [`Fetcher`] stages a read-only working copy of an application's
//! repository. Each kind writes the configuration and credential files its
//! tool needs into the task home directory before running the checkout.

mod binary;
mod files;
mod git;
mod kind;
pub mod proxy;
pub mod remote;
pub mod ssh;
mod svn;

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

pub use binary::Binary;
pub use files::{create_exclusive, ensure_dir, remove_dir};
pub use git::Git;
pub use kind::RepositoryKind;
pub use proxy::ResolvedProxy;
pub use svn::{render_entry, Subversion};

use crate::command::Command;
use crate::config::Tools;
use crate::hub::{Application, Context, Identity, Repository, SOURCE_IDENTITY};
use crate::{Error, Result};

/// Stages a repository into a destination directory
#[async_trait]
pub trait Fetcher: Send + Sync + fmt::Debug {
    /// Kind of repository handled
    fn kind(&self) -> RepositoryKind;

    /// Effective URL passed to the checkout tool
    fn url(&self) -> Result<Url>;

    /// Check the repository settings against the transport policy
    async fn validate(&self) -> Result<()>;

    /// Replace the destination with a fresh checkout
    async fn fetch(&self) -> Result<()>;
}

/// Home directory, tools and collaborators shared by the fetchers of a task
#[derive(Debug, Clone)]
pub struct Workspace {
    pub home: PathBuf,
    pub tools: Tools,
    pub context: Context,
}

impl Workspace {
    pub fn new(home: impl Into<PathBuf>, tools: Tools, context: Context) -> Self {
        Self {
            home: home.into(),
            tools,
            context,
        }
    }

    /// Workspace with its own home below this one, for additional fetches
    /// within the same task
    pub fn scoped(&self, name: &str) -> Self {
        Self {
            home: self.home.join(".stager").join(name),
            ..self.clone()
        }
    }
}

/// Build the fetcher for the application's repository kind
pub fn new(
    dest: impl Into<PathBuf>,
    application: &Application,
    workspace: &Workspace,
) -> Result<Box<dyn Fetcher>> {
    let repository = application
        .repository
        .clone()
        .ok_or_else(|| Error::Config(format!("Application {} has no repository", application.id)))?;
    let kind: RepositoryKind = repository.kind.parse()?;

    let scm = Scm {
        kind,
        application: application.clone(),
        repository,
        dest: dest.into(),
        home: workspace.home.clone(),
        tools: workspace.tools.clone(),
        ctx: workspace.context.clone(),
    };

    tracing::debug!(%kind, dest = %scm.dest.display(), "Created fetcher");
    Ok(match kind {
        RepositoryKind::Git => Box::new(Git::new(scm)),
        RepositoryKind::Subversion => Box::new(Subversion::new(scm)),
        RepositoryKind::Binary => Box::new(Binary::new(scm)),
    })
}

/// State and steps shared by every fetcher kind
pub(crate) struct Scm {
    kind: RepositoryKind,
    application: Application,
    repository: Repository,
    dest: PathBuf,
    home: PathBuf,
    tools: Tools,
    ctx: Context,
}

impl fmt::Debug for Scm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scm")
            .field("kind", &self.kind)
            .field("url", &self.repository.url)
            .field("dest", &self.dest)
            .field("home", &self.home)
            .finish_non_exhaustive()
    }
}

impl Scm {
    fn dest(&self) -> &Path {
        &self.dest
    }

    fn home(&self) -> &Path {
        &self.home
    }

    /// Reject plaintext schemes unless the kind's insecure setting is on
    async fn check_transport(&self, url: &Url) -> Result<()> {
        if !self.kind.plaintext_schemes().contains(&url.scheme()) {
            return Ok(());
        }
        if self.insecure().await? {
            tracing::warn!(url = %url, "Plaintext repository URL permitted by setting");
            return Ok(());
        }
        Err(Error::Validation(format!(
            "{} URL used with {} = false",
            url.scheme(),
            self.kind.insecure_setting()
        )))
    }

    async fn insecure(&self) -> Result<bool> {
        self.ctx.settings.bool(self.kind.insecure_setting()).await
    }

    /// Wipe the destination so the checkout starts clean
    async fn clean(&self) -> Result<()> {
        remove_dir(&self.dest).await
    }

    /// Source identity of the owning application; `None` means anonymous
    async fn identity(&self) -> Result<Option<Identity>> {
        let found = self
            .ctx
            .identities
            .find(&self.application, SOURCE_IDENTITY)
            .await?;
        match found {
            Some(ref id) => tracing::debug!(identity = id.id, name = %id.name, "Using identity"),
            None => tracing::debug!("No source identity, fetching anonymously"),
        }
        Ok(found)
    }

    async fn proxy(&self, url: &Url) -> Result<Option<ResolvedProxy>> {
        proxy::resolve(url, self.ctx.proxies.as_ref(), self.ctx.identities.as_ref()).await
    }

    fn activity(&self, message: &str) {
        self.ctx.activity.activity(&format!("{} {}", self.kind.label(), message));
    }

    /// Tool invocation reading its configuration from the task home
    fn command(&self, path: &str) -> Command {
        Command::new(path).with_env("HOME", self.home.display().to_string())
    }

    async fn run(&self, command: &Command) -> Result<()> {
        command.run(self.ctx.runner.as_ref()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::Repository;
    use crate::testing::{StubIdentities, StubProxies, StubSettings, TestContext};

    fn workspace() -> Workspace {
        let ctx = TestContext::new(StubSettings::new(), StubIdentities::new(), StubProxies::new());
        Workspace::new("/tmp/home", Tools::default(), ctx.context)
    }

    fn app(kind: &str, url: &str) -> Application {
        Application {
            id: 1,
            repository: Some(Repository {
                kind: kind.to_string(),
                url: url.to_string(),
                ..Repository::default()
            }),
            ..Application::default()
        }
    }

    #[test]
    fn test_factory_selects_kind() {
        let ws = workspace();
        let cases = [
            ("", RepositoryKind::Git),
            ("git", RepositoryKind::Git),
            ("subversion", RepositoryKind::Subversion),
            ("binary", RepositoryKind::Binary),
        ];
        for (tag, expected) in cases {
            let fetcher = new("/tmp/src", &app(tag, "https://example.com/r"), &ws).unwrap();
            assert_eq!(fetcher.kind(), expected);
        }
    }

    #[test]
    fn test_factory_unknown_kind() {
        let err = new("/tmp/src", &app("hg", "https://example.com/r"), &workspace()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedKind(ref k) if k == "hg"));
    }

    #[test]
    fn test_factory_without_repository() {
        let err = new("/tmp/src", &Application::default(), &workspace()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_validate_plaintext_for_all_kinds() {
        for kind in RepositoryKind::all() {
            let application = app(kind.name(), "http://repo.example.com/r/app.war");

            let ws = workspace();
            let fetcher = new("/tmp/src", &application, &ws).unwrap();
            let err = fetcher.validate().await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{kind}: {err}");

            let ctx = TestContext::new(
                StubSettings::new().with(kind.insecure_setting(), true),
                StubIdentities::new(),
                StubProxies::new(),
            );
            let ws = Workspace::new("/tmp/home", Tools::default(), ctx.context);
            let fetcher = new("/tmp/src", &application, &ws).unwrap();
            assert!(fetcher.validate().await.is_ok(), "{kind}");
        }
    }

    #[tokio::test]
    async fn test_validate_https_without_setting() {
        for kind in RepositoryKind::all() {
            let application = app(kind.name(), "https://repo.example.com/r/app.war");
            let fetcher = new("/tmp/src", &application, &workspace()).unwrap();
            assert!(fetcher.validate().await.is_ok(), "{kind}");
        }
    }
}
