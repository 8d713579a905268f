//! Analyzer settings that map directly onto command-line options

use serde::{Deserialize, Serialize};

use crate::command::Options;

/// Included/excluded name lists
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Filter {
    pub included: Vec<String>,
    pub excluded: Vec<String>,
}

/// What is analyzed
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Mode {
    /// Analyze a binary artifact instead of the source checkout
    pub binary: bool,
    /// Bucket path of the artifact
    pub artifact: String,
    /// Dependencies are staged into the deps directory by the caller
    pub with_deps: bool,
    /// Enable transaction analysis
    pub diva: bool,
}

/// Source technologies
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Sources(pub Vec<String>);

impl Sources {
    pub fn add_options(&self, options: &mut Options) {
        for source in &self.0 {
            options.add("--source", [source]);
        }
    }
}

/// Migration targets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Targets(pub Vec<String>);

impl Targets {
    pub fn add_options(&self, options: &mut Options) {
        for target in &self.0 {
            options.add("--target", [target]);
        }
    }
}

/// Which packages are analyzed
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scope {
    /// Also analyze known open-source libraries
    pub with_known: bool,
    pub packages: Filter,
}

impl Scope {
    pub fn add_options(&self, options: &mut Options) {
        if self.with_known {
            options.push("--analyzeKnownLibraries");
        }
        if !self.packages.included.is_empty() {
            options.add("--packages", &self.packages.included);
        }
        if !self.packages.excluded.is_empty() {
            options.add("--excludePackages", &self.packages.excluded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_and_targets() {
        let mut options = Options::new();
        Sources(vec!["weblogic".to_string()]).add_options(&mut options);
        Targets(vec!["eap7".to_string(), "quarkus".to_string()]).add_options(&mut options);
        assert_eq!(
            options.as_slice(),
            &["--source", "weblogic", "--target", "eap7", "--target", "quarkus"]
        );
    }

    #[test]
    fn test_scope() {
        let scope: Scope = serde_json::from_str(
            r#"{"withKnown": true, "packages": {"included": ["org.a", "org.b"], "excluded": ["org.c"]}}"#,
        )
        .unwrap();
        let mut options = Options::new();
        scope.add_options(&mut options);
        assert_eq!(
            options.as_slice(),
            &[
                "--analyzeKnownLibraries",
                "--packages",
                "org.a",
                "org.b",
                "--excludePackages",
                "org.c"
            ]
        );
    }

    #[test]
    fn test_empty_scope_adds_nothing() {
        let mut options = Options::new();
        Scope::default().add_options(&mut options);
        assert!(options.is_empty());
    }
}
