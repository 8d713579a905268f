//! Stager Core - staging of application inputs for analysis tasks
//!
//! This crate fetches application repositories (Git, Subversion, binary
//! artifacts) into a task sandbox, writing the credential and proxy files
//! each tool expects, and assembles the analyzer invocation around them.

pub mod activity;
pub mod analyzer;
pub mod command;
pub mod config;
pub mod error;
pub mod hub;
pub mod repository;
pub mod secrets;

#[cfg(test)]
pub(crate) mod testing;

pub use activity::{ActivitySink, RecordedActivity, TracingActivity};
pub use analyzer::{Analyzer, Data, Resources};
pub use command::{Command, Options, Output, ProcessRunner, SystemRunner};
pub use config::{Config, HubConfig, Layout, Tools};
pub use error::{Error, Result};
pub use hub::{Application, Context, Identity, Proxy, Repository};
pub use repository::{Fetcher, RepositoryKind, Workspace};
pub use secrets::Secrets;
