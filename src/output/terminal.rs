//! Terminal renderer: aligned `label  value` lines.

use colored::Colorize;

use crate::output::{ConfigReport, CredentialReport, DatabaseReport, OutputRenderer, ServiceReport};

/// Terminal output renderer with colored labels.
pub struct TerminalRenderer;

fn line(output: &mut String, label: &str, value: &str) {
    output.push_str(&format!("  {:<18} {}\n", format!("{label}:").as_str().dimmed(), value));
}

impl OutputRenderer for TerminalRenderer {
    fn render_credentials(&self, report: &CredentialReport) -> String {
        let mut output = String::new();
        line(&mut output, "access key id", &report.access_key_id);
        line(&mut output, "secret key", &report.secret_access_key);
        line(&mut output, "region", &report.region);
        output
    }

    fn render_service(&self, report: &ServiceReport) -> String {
        let mut output = format!(" {} {}\n", "✔".green().bold(), report.service.as_str().bold());
        line(&mut output, "endpoint", &report.endpoint);
        line(&mut output, "signing region", &report.signing_region);
        line(&mut output, "access key id", &report.access_key_id);
        output
    }

    fn render_config(&self, report: &ConfigReport) -> String {
        let mut output = format!(" {}\n", report.path.as_str().bold());
        if report.entries.is_empty() {
            output.push_str(&format!("  {}\n", "(no entries)".dimmed()));
        }
        for (key, value) in &report.entries {
            line(&mut output, key, value);
        }
        output
    }

    fn render_database(&self, report: &DatabaseReport) -> String {
        let location = format!("{}:{}", report.host, report.port);
        let status = match (&report.outcome, report.exists) {
            (Some(outcome), _) => outcome.as_str().green().bold().to_string(),
            (None, true) => "found".green().bold().to_string(),
            (None, false) => "not found".yellow().bold().to_string(),
        };
        format!(
            " {} {} {}\n",
            status,
            report.database.as_str().bold(),
            format!("on {location}").as_str().dimmed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_report(exists: bool) -> DatabaseReport {
        DatabaseReport {
            database: "openshift".into(),
            host: "localhost".into(),
            port: 27017,
            exists,
            outcome: None,
        }
    }

    #[test]
    fn renders_found_and_not_found() {
        colored::control::set_override(false);
        assert_eq!(
            TerminalRenderer.render_database(&db_report(true)),
            " found openshift on localhost:27017\n"
        );
        assert!(TerminalRenderer
            .render_database(&db_report(false))
            .starts_with(" not found openshift"));
    }

    #[test]
    fn renders_credentials_lines() {
        let report = CredentialReport {
            access_key_id: "AKIA123".into(),
            secret_access_key: "****".into(),
            region: "us-east-1".into(),
        };
        let output = TerminalRenderer.render_credentials(&report);
        assert_eq!(output.lines().count(), 3);
        assert!(output.contains("AKIA123"));
        assert!(output.contains("us-east-1"));
    }

    #[test]
    fn renders_empty_config() {
        let report = ConfigReport {
            path: "/home/ops/.awsconfig".into(),
            entries: indexmap::IndexMap::new(),
        };
        let output = TerminalRenderer.render_config(&report);
        assert!(output.contains("/home/ops/.awsconfig"));
        assert!(output.contains("(no entries)"));
    }
}
