//! Stager Hub - hub REST client for the stager analysis agent
//!
//! [`HubClient`] reads tasks, applications, identities, proxies, settings
//! and rule bundles from the hub and implements the store traits of
//! `stager-core` so fetchers and the analyzer can be driven from it.

mod client;
mod error;
mod stores;
mod task;

#[cfg(test)]
mod testing;

pub use client::HubClient;
pub use error::{Error, Result};
pub use task::Task;
