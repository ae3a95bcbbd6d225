//! JSON output renderer.

use serde::Serialize;

use crate::output::{ConfigReport, CredentialReport, DatabaseReport, OutputRenderer, ServiceReport};

/// JSON output renderer.
pub struct JsonRenderer;

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

impl OutputRenderer for JsonRenderer {
    fn render_credentials(&self, report: &CredentialReport) -> String {
        to_json(report)
    }

    fn render_service(&self, report: &ServiceReport) -> String {
        to_json(report)
    }

    fn render_config(&self, report: &ConfigReport) -> String {
        to_json(report)
    }

    fn render_database(&self, report: &DatabaseReport) -> String {
        to_json(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::BootstrapOutcome;

    #[test]
    fn render_credentials_json() {
        let report = CredentialReport {
            access_key_id: "AKIA123".into(),
            secret_access_key: "****".into(),
            region: "us-east-1".into(),
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&JsonRenderer.render_credentials(&report)).unwrap();
        assert_eq!(parsed["access_key_id"], "AKIA123");
        assert_eq!(parsed["secret_access_key"], "****");
        assert_eq!(parsed["region"], "us-east-1");
    }

    #[test]
    fn render_config_keeps_file_order() {
        let mut entries = indexmap::IndexMap::new();
        entries.insert("b".to_string(), "2".to_string());
        entries.insert("a".to_string(), "1".to_string());
        let report = ConfigReport {
            path: "/tmp/x".into(),
            entries,
        };
        let output = JsonRenderer.render_config(&report);
        assert!(output.find("\"b\"").unwrap() < output.find("\"a\"").unwrap());
    }

    #[test]
    fn database_outcome_only_when_set() {
        let report = DatabaseReport {
            database: "openshift".into(),
            host: "localhost".into(),
            port: 27017,
            exists: true,
            outcome: None,
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&JsonRenderer.render_database(&report)).unwrap();
        assert!(parsed.get("outcome").is_none());

        let report = report.with_outcome(BootstrapOutcome::AlreadyExists);
        let parsed: serde_json::Value =
            serde_json::from_str(&JsonRenderer.render_database(&report)).unwrap();
        assert_eq!(parsed["outcome"], "already exists");
        assert_eq!(parsed["port"], 27017);
    }
}
