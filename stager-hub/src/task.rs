//! Task resource

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stager_core::hub::Ref;

/// Unit of work assigned to the agent
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub name: String,
    pub application: Option<Ref>,
    /// Addon specific data, decoded by the caller
    pub data: serde_json::Value,
    pub create_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task() {
        let json = r#"{
            "id": 42,
            "name": "petclinic.analysis",
            "application": {"id": 7, "name": "petclinic"},
            "data": {"mode": {"binary": false}, "targets": ["eap7"]},
            "createTime": "2026-03-01T10:15:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 42);
        assert_eq!(task.application.map(|a| a.id), Some(7));
        assert_eq!(task.data["targets"][0], "eap7");
        assert_eq!(
            task.create_time.map(|t| t.to_rfc3339()),
            Some("2026-03-01T10:15:00+00:00".to_string())
        );
    }

    #[test]
    fn test_parse_minimal_task() {
        let task: Task = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert!(task.application.is_none());
        assert!(task.data.is_null());
    }
}
