//! Application analyzer invocation
//!
//! Stages the inputs described by the task data (source checkout, binary
//! artifact, rules) and runs the analyzer with the resulting options.

mod options;
mod rules;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use options::{Filter, Mode, Scope, Sources, Targets};
pub use rules::Rules;

use crate::command::{Command, Options};
use crate::config::Layout;
use crate::hub::{Application, BucketStore, FileStore, RuleBundleStore};
use crate::repository::{self, Workspace};
use crate::Result;

/// Task data of an analysis
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Data {
    pub mode: Mode,
    pub sources: Option<Sources>,
    pub targets: Option<Targets>,
    pub scope: Scope,
    pub rules: Option<Rules>,
}

/// Hub resources needed to stage analyzer inputs
#[derive(Clone)]
pub struct Resources {
    pub bundles: Arc<dyn RuleBundleStore>,
    pub files: Arc<dyn FileStore>,
    pub bucket: Arc<dyn BucketStore>,
}

/// Runs the analyzer for one application
pub struct Analyzer {
    application: Application,
    data: Data,
    layout: Layout,
    workspace: Workspace,
    resources: Resources,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("application", &self.application.id)
            .field("data", &self.data)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    pub fn new(
        application: Application,
        data: Data,
        layout: Layout,
        workspace: Workspace,
        resources: Resources,
    ) -> Self {
        Self {
            application,
            data,
            layout,
            workspace,
            resources,
        }
    }

    /// Stage inputs and run the analyzer
    pub async fn run(&self) -> Result<()> {
        self.stage_source().await?;

        let mut cmd = Command::new(&self.workspace.tools.analyzer)
            .with_env("HOME", self.workspace.home.display().to_string());
        cmd.options = self.options().await?;

        tracing::info!(application = self.application.id, "Running analyzer");
        if let Err(e) = cmd.run(self.workspace.context.runner.as_ref()).await {
            self.report_log();
            return Err(e);
        }
        Ok(())
    }

    /// Fetch the application repository unless a binary is analyzed
    async fn stage_source(&self) -> Result<()> {
        if self.data.mode.binary || self.application.repository.is_none() {
            return Ok(());
        }
        let fetcher = repository::new(self.layout.source_dir(), &self.application, &self.workspace)?;
        fetcher.validate().await?;
        fetcher.fetch().await
    }

    /// Checkout path holding the application, honoring the repository path
    fn app_dir(&self) -> PathBuf {
        let source = self.layout.source_dir();
        match self.application.repository {
            Some(ref r) if !r.path.is_empty() => source.join(r.path.trim_start_matches('/')),
            _ => source,
        }
    }

    /// Build the analyzer command line
    ///
    /// Inputs the options point at are staged on the way: the binary
    /// artifact is downloaded and rule files and rule repositories are
    /// fetched into the rules directory. The source checkout is not.
    pub async fn options(&self) -> Result<Options> {
        let mut options = Options::new();
        options.push("--batchMode");
        options.add("--output", [self.layout.report_dir().display().to_string()]);

        let deps = self.layout.deps_dir();
        if tokio::fs::metadata(&deps).await.is_ok_and(|m| m.is_dir()) {
            options.add("--input", [deps.display().to_string()]);
        }

        self.add_mode_options(&mut options).await?;
        if let Some(ref sources) = self.data.sources {
            sources.add_options(&mut options);
        }
        if let Some(ref targets) = self.data.targets {
            targets.add_options(&mut options);
        }
        self.data.scope.add_options(&mut options);
        if let Some(ref rules) = self.data.rules {
            let dir = self.layout.rules_dir();
            let stager = rules::RuleStager {
                dir: &dir,
                workspace: &self.workspace,
                resources: &self.resources,
            };
            stager.add_options(rules, &mut options).await?;
        }
        Ok(options)
    }

    async fn add_mode_options(&self, options: &mut Options) -> Result<()> {
        let mode = &self.data.mode;
        if mode.binary {
            if !mode.artifact.is_empty() {
                let bin = self.layout.bin_dir();
                self.resources.bucket.get(&mode.artifact, &bin).await?;
                options.add("--input", [bin.display().to_string()]);
            }
        } else {
            options.add("--input", [self.app_dir().display().to_string()]);
        }
        if mode.diva {
            options.push("--enableTransactionAnalysis");
        }
        Ok(())
    }

    /// Replay the analyzer log into the activity sink
    fn report_log(&self) {
        let path = self
            .workspace
            .home
            .join(".mta")
            .join("log")
            .join("mta.log");
        let Ok(contents) = std::fs::read_to_string(&path) else {
            tracing::debug!(path = %path.display(), "No analyzer log to report");
            return;
        };
        for line in contents.lines() {
            self.workspace.context.activity.activity(&format!(">> {}", line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tools;
    use crate::hub::{Ref, Repository, RuleBundle, RuleSet};
    use crate::repository::RepositoryKind;
    use crate::testing::{RecordingRunner, StubIdentities, StubProxies, StubSettings, TestContext};
    use crate::Error;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct StubHub {
        bundles: Vec<RuleBundle>,
        downloads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RuleBundleStore for StubHub {
        async fn get(&self, id: u64) -> Result<RuleBundle> {
            self.bundles
                .iter()
                .find(|b| b.id == id)
                .cloned()
                .ok_or_else(|| Error::Other(format!("bundle {} not found", id)))
        }
    }

    #[async_trait]
    impl FileStore for StubHub {
        async fn get(&self, id: u64, path: &Path) -> Result<()> {
            self.downloads
                .lock()
                .unwrap()
                .push(format!("file {} -> {}", id, path.display()));
            Ok(())
        }
    }

    #[async_trait]
    impl BucketStore for StubHub {
        async fn get(&self, path: &str, dest: &Path) -> Result<()> {
            self.downloads
                .lock()
                .unwrap()
                .push(format!("bucket {} -> {}", path, dest.display()));
            Ok(())
        }
    }

    struct Fixture {
        tmp: TempDir,
        ctx: TestContext,
        hub: Arc<StubHub>,
    }

    impl Fixture {
        fn new(runner: RecordingRunner, hub: StubHub) -> Self {
            Self {
                tmp: TempDir::new().unwrap(),
                ctx: TestContext::with_runner(
                    StubSettings::new(),
                    StubIdentities::new(),
                    StubProxies::new(),
                    runner,
                ),
                hub: Arc::new(hub),
            }
        }

        fn layout(&self) -> Layout {
            Layout {
                home: self.tmp.path().join("home"),
                root: self.tmp.path().join("addon"),
            }
        }

        fn analyzer(&self, application: Application, data: Data) -> Analyzer {
            let layout = self.layout();
            let workspace = Workspace::new(&layout.home, Tools::default(), self.ctx.context.clone());
            let resources = Resources {
                bundles: self.hub.clone(),
                files: self.hub.clone(),
                bucket: self.hub.clone(),
            };
            Analyzer::new(application, data, layout, workspace, resources)
        }

        fn path(&self, rel: &str) -> String {
            self.tmp.path().join(rel).display().to_string()
        }
    }

    fn svn_app() -> Application {
        let mut repository = Repository::new(RepositoryKind::Subversion, "https://svn.example.com/repo");
        repository.path = "app".to_string();
        Application {
            id: 1,
            repository: Some(repository),
            ..Application::default()
        }
    }

    #[tokio::test]
    async fn test_options_order() {
        let f = Fixture::new(RecordingRunner::new(), StubHub::default());
        let data: Data = serde_json::from_str(
            r#"{
                "mode": {"diva": true},
                "sources": ["weblogic"],
                "targets": ["eap7"],
                "scope": {"withKnown": true}
            }"#,
        )
        .unwrap();
        let options = f.analyzer(svn_app(), data).options().await.unwrap();
        assert_eq!(
            options.as_slice(),
            &[
                "--batchMode".to_string(),
                "--output".to_string(),
                f.path("addon/report"),
                "--input".to_string(),
                f.path("addon/source/app"),
                "--enableTransactionAnalysis".to_string(),
                "--source".to_string(),
                "weblogic".to_string(),
                "--target".to_string(),
                "eap7".to_string(),
                "--analyzeKnownLibraries".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_binary_mode_and_deps() {
        let f = Fixture::new(RecordingRunner::new(), StubHub::default());
        std::fs::create_dir_all(f.tmp.path().join("addon/deps")).unwrap();
        let data = Data {
            mode: Mode {
                binary: true,
                artifact: "app.war".to_string(),
                ..Mode::default()
            },
            ..Data::default()
        };
        let analyzer = f.analyzer(svn_app(), data);
        let options = analyzer.options().await.unwrap();
        assert_eq!(
            &options.as_slice()[3..],
            &[
                "--input".to_string(),
                f.path("addon/deps"),
                "--input".to_string(),
                f.path("addon/binary"),
            ]
        );
        assert_eq!(
            f.hub.downloads.lock().unwrap().as_slice(),
            &[format!("bucket app.war -> {}", f.path("addon/binary"))]
        );
    }

    #[tokio::test]
    async fn test_rule_bundles() {
        let hub = StubHub {
            bundles: vec![RuleBundle {
                id: 5,
                name: "custom".to_string(),
                rule_sets: vec![
                    RuleSet {
                        id: 51,
                        name: "first".to_string(),
                        file: Some(Ref {
                            id: 900,
                            name: "first.windup.xml".to_string(),
                        }),
                    },
                    RuleSet {
                        id: 52,
                        name: "no file".to_string(),
                        file: None,
                    },
                ],
                ..RuleBundle::default()
            }],
            ..StubHub::default()
        };
        let f = Fixture::new(RecordingRunner::new(), hub);
        let data = Data {
            mode: Mode {
                binary: true,
                ..Mode::default()
            },
            rules: Some(Rules {
                path: "rules".to_string(),
                bundles: vec![Ref::new(5)],
                tags: Filter {
                    included: vec!["security".to_string()],
                    excluded: vec![],
                },
                ..Rules::default()
            }),
            ..Data::default()
        };
        let options = f.analyzer(svn_app(), data).options().await.unwrap();

        assert_eq!(
            &options.as_slice()[3..],
            &[
                "--userRulesDirectory".to_string(),
                f.path("addon/rules/files"),
                "--userRulesDirectory".to_string(),
                f.path("addon/rules/bundles/5/rulesets"),
                "--includeTags".to_string(),
                "security".to_string(),
            ]
        );
        assert_eq!(
            f.hub.downloads.lock().unwrap().as_slice(),
            &[
                format!("bucket rules -> {}", f.path("addon/rules/files")),
                format!(
                    "file 900 -> {}",
                    f.path("addon/rules/bundles/5/rulesets/51-first.windup.xml")
                ),
            ]
        );
        assert!(f.tmp.path().join("addon/rules/bundles/5/rulesets").is_dir());
    }

    #[tokio::test]
    async fn test_run_fetches_source_then_analyzes() {
        let f = Fixture::new(RecordingRunner::new(), StubHub::default());
        f.analyzer(svn_app(), Data::default()).run().await.unwrap();

        let commands = f.ctx.runner.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].path, "/usr/bin/svn");
        assert_eq!(commands[1].path, "/opt/windup");
        assert!(commands[1].options.contains("--batchMode"));
    }

    #[tokio::test]
    async fn test_run_failure_reports_log() {
        let f = Fixture::new(RecordingRunner::failing(2, "analysis failed"), StubHub::default());
        let log_dir = f.tmp.path().join("home/.mta/log");
        std::fs::create_dir_all(&log_dir).unwrap();
        std::fs::write(log_dir.join("mta.log"), "INFO start\nSEVERE boom\n").unwrap();

        let data = Data {
            mode: Mode {
                binary: true,
                ..Mode::default()
            },
            ..Data::default()
        };
        let err = f.analyzer(svn_app(), data).run().await.unwrap_err();
        assert!(matches!(err, Error::Process { .. }));
        assert_eq!(
            f.ctx.activity.entries(),
            vec![">> INFO start".to_string(), ">> SEVERE boom".to_string()]
        );
    }
}
