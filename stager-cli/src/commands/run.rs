//! Run command - execute the analysis task

use anyhow::Context as _;
use chrono::Utc;
use clap::Args;
use stager_core::{Analyzer, Config, Data, Resources};

use super::{hub_client, workspace};

/// Run the analyzer for the configured task
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Stage rules and artifacts, then print the analyzer command instead
    /// of running it (the source repository is not fetched)
    #[arg(long)]
    dry_run: bool,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        if config.hub.task == 0 {
            anyhow::bail!("No task id; pass --task or set STAGER_TASK");
        }
        let client = hub_client(config)?;

        let task = client
            .task(config.hub.task)
            .await
            .with_context(|| format!("Failed to load task {}", config.hub.task))?;
        if let Some(created) = task.create_time {
            let age = (Utc::now() - created).num_seconds();
            tracing::info!(task = task.id, name = %task.name, age_secs = age, "Task loaded");
        }

        let app_ref = task
            .application
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Task {} has no application", task.id))?;
        let application = client
            .application(app_ref.id)
            .await
            .with_context(|| format!("Failed to load application {}", app_ref.id))?;
        let data: Data = if task.data.is_null() {
            Data::default()
        } else {
            serde_json::from_value(task.data.clone()).context("Invalid task data")?
        };

        let resources = Resources {
            bundles: client.clone(),
            files: client.clone(),
            bucket: client.clone(),
        };
        let analyzer = Analyzer::new(
            application,
            data,
            config.layout.clone(),
            workspace(config, &client),
            resources,
        );

        if self.dry_run {
            let options = analyzer.options().await?;
            println!("{} {}", config.tools.analyzer, options.as_slice().join(" "));
            return Ok(());
        }

        analyzer.run().await?;
        println!("Analysis complete: {}", config.layout.report_dir().display());
        Ok(())
    }
}
