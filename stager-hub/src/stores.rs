//! Store trait implementations backed by the hub

use std::path::Path;

use async_trait::async_trait;
use stager_core::hub::{
    Application, BucketStore, FileStore, Identity, IdentityStore, Proxy, ProxyStore, RuleBundle,
    RuleBundleStore, SettingStore,
};
use stager_core::Result;

use crate::HubClient;

#[async_trait]
impl SettingStore for HubClient {
    /// Unknown settings read as `false`
    async fn bool(&self, key: &str) -> Result<bool> {
        let url = self.endpoint(&format!("settings/{}", key))?;
        let value = self.find_json::<bool>(url).await?;
        Ok(value.unwrap_or(false))
    }
}

#[async_trait]
impl IdentityStore for HubClient {
    async fn find(&self, application: &Application, kind: &str) -> Result<Option<Identity>> {
        let refs = if application.identities.is_empty() && application.id != 0 {
            self.application(application.id).await?.identities
        } else {
            application.identities.clone()
        };
        for r in &refs {
            let identity = self.identity(r.id).await?;
            if identity.kind == kind {
                tracing::debug!(application = application.id, identity = identity.id, kind, "Identity matched");
                return Ok(Some(identity));
            }
        }
        Ok(None)
    }

    async fn get(&self, id: u64) -> Result<Identity> {
        Ok(self.identity(id).await?)
    }
}

#[async_trait]
impl ProxyStore for HubClient {
    async fn find(&self, kind: &str) -> Result<Option<Proxy>> {
        let mut url = self.endpoint("proxies")?;
        url.query_pairs_mut().append_pair("kind", kind);
        let proxies: Vec<Proxy> = self.get_json(url).await?;
        Ok(proxies.into_iter().find(|p| p.kind == kind))
    }
}

#[async_trait]
impl RuleBundleStore for HubClient {
    async fn get(&self, id: u64) -> Result<RuleBundle> {
        let url = self.endpoint(&format!("rulebundles/{}", id))?;
        Ok(self.get_json(url).await?)
    }
}

#[async_trait]
impl FileStore for HubClient {
    async fn get(&self, id: u64, path: &Path) -> Result<()> {
        let url = self.endpoint(&format!("files/{}", id))?;
        self.download(url, path)
            .await
            .map_err(crate::Error::into_download_error)
    }
}

#[async_trait]
impl BucketStore for HubClient {
    async fn get(&self, path: &str, dest: &Path) -> Result<()> {
        let path = path.trim_matches('/');
        let name = path.rsplit('/').next().unwrap_or_default();
        if name.is_empty() {
            return Err(stager_core::Error::Validation(
                "Empty bucket path".to_string(),
            ));
        }
        let url = self.endpoint(&format!("tasks/{}/bucket/{}", self.task_id(), path))?;
        self.download(url, &dest.join(name))
            .await
            .map_err(crate::Error::into_download_error)
    }
}
