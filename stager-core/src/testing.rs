//! In-memory collaborators for unit tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::activity::RecordedActivity;
use crate::command::{Command, Output, ProcessRunner};
use crate::hub::{Application, Context, Identity, IdentityStore, Proxy, ProxyStore, SettingStore};
use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct StubSettings {
    values: HashMap<String, bool>,
}

impl StubSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: bool) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }
}

#[async_trait]
impl SettingStore for StubSettings {
    async fn bool(&self, key: &str) -> Result<bool> {
        Ok(self.values.get(key).copied().unwrap_or(false))
    }
}

#[derive(Debug, Default)]
pub struct StubIdentities {
    found: Option<Identity>,
    stored: HashMap<u64, Identity>,
    unreachable: bool,
}

impl StubIdentities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity returned by `find` when its kind matches
    pub fn with_found(mut self, identity: Identity) -> Self {
        self.found = Some(identity);
        self
    }

    /// Identity returned by `get`
    pub fn with_stored(mut self, identity: Identity) -> Self {
        self.stored.insert(identity.id, identity);
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }
}

#[async_trait]
impl IdentityStore for StubIdentities {
    async fn find(&self, _application: &Application, kind: &str) -> Result<Option<Identity>> {
        if self.unreachable {
            return Err(Error::AuthResolution("identity store unreachable".to_string()));
        }
        Ok(self.found.clone().filter(|id| id.kind == kind))
    }

    async fn get(&self, id: u64) -> Result<Identity> {
        self.stored
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::AuthResolution(format!("identity {} not found", id)))
    }
}

#[derive(Debug, Default)]
pub struct StubProxies {
    proxies: Vec<Proxy>,
}

impl StubProxies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, proxy: Proxy) -> Self {
        self.proxies.push(proxy);
        self
    }
}

#[async_trait]
impl ProxyStore for StubProxies {
    async fn find(&self, kind: &str) -> Result<Option<Proxy>> {
        Ok(self.proxies.iter().find(|p| p.kind == kind).cloned())
    }
}

/// Records commands instead of running them
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<Command>>,
    code: i32,
    stderr: String,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(code: i32, stderr: &str) -> Self {
        Self {
            code,
            stderr: stderr.to_string(),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, command: &Command) -> Result<Output> {
        self.commands.lock().unwrap().push(command.clone());
        Ok(Output {
            code: Some(self.code),
            stdout: String::new(),
            stderr: self.stderr.clone(),
        })
    }
}

/// Context whose runner and activity sink can be inspected afterwards
pub struct TestContext {
    pub context: Context,
    pub runner: Arc<RecordingRunner>,
    pub activity: Arc<RecordedActivity>,
}

impl TestContext {
    pub fn new(settings: StubSettings, identities: StubIdentities, proxies: StubProxies) -> Self {
        Self::with_runner(settings, identities, proxies, RecordingRunner::new())
    }

    pub fn with_runner(
        settings: StubSettings,
        identities: StubIdentities,
        proxies: StubProxies,
        runner: RecordingRunner,
    ) -> Self {
        let runner = Arc::new(runner);
        let activity = Arc::new(RecordedActivity::new());
        let context = Context {
            settings: Arc::new(settings),
            identities: Arc::new(identities),
            proxies: Arc::new(proxies),
            runner: runner.clone(),
            activity: activity.clone(),
        };
        Self {
            context,
            runner,
            activity,
        }
    }
}
