//! Custom rule staging
//!
//! Rules come from three places: a bucket path uploaded with the task, an
//! optional rule repository, and rule bundles stored in the hub (each with
//! its own rule-set files and optional repository).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::options::Filter;
use super::Resources;
use crate::command::Options;
use crate::hub::{Application, Ref, Repository, RuleBundle};
use crate::repository::{ensure_dir, Workspace};
use crate::Result;

/// Extension expected of analyzer rule files
const RULE_EXTENSION: &str = ".windup.xml";

/// Rule settings of a task
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Rules {
    /// Bucket path holding uploaded rule files
    pub path: String,
    pub bundles: Vec<Ref>,
    pub repository: Option<Repository>,
    pub identity: Option<Ref>,
    pub tags: Filter,
}

/// Stages rules into `dir` and adds the matching analyzer options
pub(crate) struct RuleStager<'a> {
    pub dir: &'a Path,
    pub workspace: &'a Workspace,
    pub resources: &'a Resources,
}

impl RuleStager<'_> {
    pub async fn add_options(&self, rules: &Rules, options: &mut Options) -> Result<()> {
        let files = self.dir.join("files");
        ensure_dir(&files, 0o755)?;
        options.add("--userRulesDirectory", [files.display().to_string()]);
        if !rules.path.is_empty() {
            self.resources.bucket.get(&rules.path, &files).await?;
        }

        if let Some(ref repository) = rules.repository {
            let root = self.dir.join("repository");
            let workspace = self.workspace.scoped("rules");
            self.add_repository(&root, repository, rules.identity.clone(), &workspace, options)
                .await?;
        }

        for bundle in &rules.bundles {
            let bundle = self.resources.bundles.get(bundle.id).await?;
            self.add_rule_sets(&bundle, options).await?;
            if let Some(ref repository) = bundle.repository {
                let root = self.bundle_dir(&bundle).join("repository");
                let workspace = self.workspace.scoped(&format!("bundle-{}", bundle.id));
                self.add_repository(&root, repository, bundle.identity.clone(), &workspace, options)
                    .await?;
            }
        }

        if !rules.tags.included.is_empty() {
            options.add("--includeTags", &rules.tags.included);
        }
        if !rules.tags.excluded.is_empty() {
            options.add("--excludeTags", &rules.tags.excluded);
        }
        Ok(())
    }

    fn bundle_dir(&self, bundle: &RuleBundle) -> PathBuf {
        self.dir.join("bundles").join(bundle.id.to_string())
    }

    /// Download the bundle's rule-set files
    async fn add_rule_sets(&self, bundle: &RuleBundle, options: &mut Options) -> Result<()> {
        let dir = self.bundle_dir(bundle).join("rulesets");
        ensure_dir(&dir, 0o755)?;
        options.add("--userRulesDirectory", [dir.display().to_string()]);

        for rule_set in &bundle.rule_sets {
            let Some(ref file) = rule_set.file else {
                continue;
            };
            let path = dir.join(format!("{}-{}", rule_set.id, file.name));
            self.workspace
                .context
                .activity
                .activity(&format!("[FILE] Get rule: {}", path.display()));
            self.resources.files.get(file.id, &path).await?;
        }
        Ok(())
    }

    /// Fetch a rule repository and add its rule directory
    async fn add_repository(
        &self,
        root: &Path,
        repository: &Repository,
        identity: Option<Ref>,
        workspace: &Workspace,
        options: &mut Options,
    ) -> Result<()> {
        ensure_dir(root, 0o755)?;
        let owner = Application::owning(repository.clone(), identity);
        let fetcher = crate::repository::new(root, &owner, workspace)?;
        fetcher.validate().await?;
        fetcher.fetch().await?;

        let rule_dir = root.join(repository.path.trim_start_matches('/'));
        options.add("--userRulesDirectory", [rule_dir.display().to_string()]);
        self.warn_unexpected_files(&rule_dir)
    }

    fn warn_unexpected_files(&self, dir: &Path) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(RULE_EXTENSION) {
                tracing::warn!(file = %entry.path().display(), "Ignoring rule file without extension");
                self.workspace.context.activity.activity(&format!(
                    "[WARNING] File {} without extension ({}) ignored.",
                    entry.path().display(),
                    RULE_EXTENSION
                ));
            }
        }
        Ok(())
    }
}
