//! Fetch command - stage a single repository

use std::path::PathBuf;

use clap::Args;
use stager_core::hub::{Application, Repository};
use stager_core::{repository, Config};

use super::{hub_client, workspace};

/// Fetch one repository into a directory
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Repository kind (git, subversion, binary)
    #[arg(short, long, default_value = "git")]
    kind: String,

    /// Repository URL
    #[arg(short, long)]
    url: String,

    /// Branch to check out
    #[arg(short, long)]
    branch: Option<String>,

    /// Tag to check out (git)
    #[arg(long)]
    tag: Option<String>,

    /// Application whose source identity is used
    #[arg(short, long)]
    application: Option<u64>,

    /// Destination directory
    #[arg(short, long)]
    dest: PathBuf,
}

impl FetchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = hub_client(config)?;

        let repository = Repository {
            kind: self.kind.clone(),
            url: self.url.clone(),
            branch: self.branch.clone().unwrap_or_default(),
            tag: self.tag.clone().unwrap_or_default(),
            path: String::new(),
        };
        let application = match self.application {
            Some(id) => Application {
                repository: Some(repository),
                ..client.application(id).await?
            },
            None => Application::owning(repository, None),
        };

        let fetcher = repository::new(&self.dest, &application, &workspace(config, &client))?;
        fetcher.validate().await?;
        fetcher.fetch().await?;

        println!("Fetched {} into {}", fetcher.url()?, self.dest.display());
        Ok(())
    }
}
