//! Task activity reporting

use std::sync::Mutex;

/// One-way sink for human readable task progress
pub trait ActivitySink: Send + Sync {
    fn activity(&self, message: &str);
}

/// Forwards activity to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingActivity;

impl ActivitySink for TracingActivity {
    fn activity(&self, message: &str) {
        tracing::info!(target: "activity", "{}", message);
    }
}

/// Keeps activity in memory, useful for reporting and tests
#[derive(Debug, Default)]
pub struct RecordedActivity {
    entries: Mutex<Vec<String>>,
}

impl RecordedActivity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn entries(&self) -> Vec<String> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ActivitySink for RecordedActivity {
    fn activity(&self, message: &str) {
        tracing::debug!(target: "activity", "{}", message);
        match self.entries.lock() {
            Ok(mut entries) => entries.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}
