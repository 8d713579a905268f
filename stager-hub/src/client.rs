//! Hub REST client using reqwest

use std::path::Path;

use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use stager_core::config::HubConfig;
use stager_core::hub::{Application, Identity};
use stager_core::Secrets;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result, Task};

/// Hub API client scoped to one task
#[derive(Clone)]
pub struct HubClient {
    http: HttpClient,
    base: Url,
    token: Option<String>,
    task: u64,
}

impl HubClient {
    /// Create a client for the hub at `base`
    pub fn new(base: &str, token: Option<String>, task: u64) -> Result<Self> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = HttpClient::builder()
            .user_agent(concat!("stager/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(hub = %base, task, authenticated = token.is_some(), "Created hub client");
        Ok(Self {
            http,
            base,
            token,
            task,
        })
    }

    /// Create a client from configuration
    ///
    /// Token is loaded from (in priority order):
    /// 1. STAGER_HUB_TOKEN environment variable
    /// 2. ~/.config/stager/secrets.toml
    pub fn from_config(config: &HubConfig) -> Result<Self> {
        let secrets = Secrets::load().map_err(|e| Error::Config(e.to_string()))?;
        Self::new(&config.url, secrets.hub_token(), config.task)
    }

    /// Task this client serves
    pub fn task_id(&self) -> u64 {
        self.task
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    async fn send(&self, url: Url) -> Result<Response> {
        debug!(url = %url, "Hub request");
        let mut request = self.http.get(url.clone());
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        Ok(self.send(url).await?.json().await?)
    }

    /// Like [`get_json`](Self::get_json) but a 404 is `None`
    pub(crate) async fn find_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        match self.get_json(url).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Stream the response body into `path`, creating parent directories
    pub(crate) async fn download(&self, url: Url, path: &Path) -> Result<()> {
        let mut response = self.send(url).await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(path).await?;
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;
        debug!(path = %path.display(), bytes = written, "Downloaded");
        Ok(())
    }

    pub async fn task(&self, id: u64) -> Result<Task> {
        self.get_json(self.endpoint(&format!("tasks/{}", id))?).await
    }

    pub async fn application(&self, id: u64) -> Result<Application> {
        self.get_json(self.endpoint(&format!("applications/{}", id))?)
            .await
    }

    pub async fn identity(&self, id: u64) -> Result<Identity> {
        self.get_json(self.endpoint(&format!("identities/{}", id))?)
            .await
    }
}

impl std::fmt::Debug for HubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubClient")
            .field("base", &self.base.as_str())
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}
