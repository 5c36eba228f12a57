//! Diagnostic reporter module
//!
//! Provides formatting for diagnostic results in multiple output formats:
//! human-readable, JSON, and YAML.

use extdoctor_core::types::ExtensionType;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::severity::Severity;
use crate::{ConstructionFailure, DiagnosticResult, ExtensionReport, Issue, OverallStatus};

/// Output format for diagnostic results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable colored output
    #[default]
    Human,
    /// JSON format for machine consumption
    Json,
    /// YAML format for machine consumption
    Yaml,
}

/// Diagnostic result reporter
pub struct DiagnosticReporter {
    verbose: bool,
}

impl DiagnosticReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn format(&self, result: &DiagnosticResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Human => self.format_human(result),
            OutputFormat::Json => self.format_json(result),
            OutputFormat::Yaml => self.format_yaml(result),
        }
    }

    fn format_human(&self, result: &DiagnosticResult) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", "Extension Doctor".bold()));
        output.push_str(&format!(
            "Examined {} extension(s), showing issues of severity {} and above\n\n",
            result.extensions.len() + result.failures.len(),
            result.min_severity
        ));

        for report in result.with_visible_issues() {
            output.push_str(&self.format_extension(report, result.min_severity));
        }

        if !result.failures.is_empty() {
            output.push_str(&format!("{}\n", "Unreadable extensions".bold().underline()));
            for failure in &result.failures {
                output.push_str(&self.format_failure(failure));
            }
            output.push('\n');
        }

        output.push_str(&self.format_summary(result));
        output
    }

    fn format_extension(&self, report: &ExtensionReport, min: Severity) -> String {
        let mut output = String::new();

        let mut title = format!("#{} {} ({}", report.extension_id, report.name, report.kind);
        if let Some(folder) = &report.folder {
            title.push_str(&format!(", {}", folder));
        }
        title.push(')');
        output.push_str(&format!("{}", title.bold().underline()));
        if report.core {
            output.push_str(&format!(" {}", "core".dimmed()));
        }
        output.push('\n');

        for issue in report.visible_issues(min) {
            output.push_str(&self.format_issue(issue));
        }

        output.push('\n');
        output
    }

    fn format_issue(&self, issue: &Issue) -> String {
        let mut output = format!(
            "  {} {} {}\n",
            severity_badge(issue.severity),
            issue.label,
            format!("[{}]", issue.slug).dimmed()
        );

        if self.verbose {
            output.push_str(&format!("      {}\n", issue.description.dimmed()));
        }
        if issue.template != "none" {
            output.push_str(&format!("      Remedy: {}\n", issue.template.replace('_', " ")));
        }
        if !issue.actions.is_empty() {
            output.push_str(&format!(
                "      Fix: {}\n",
                issue.actions.join(", ").yellow()
            ));
        }

        output
    }

    fn format_failure(&self, failure: &ConstructionFailure) -> String {
        format!(
            "  {} #{} {} ({}) - {}\n",
            "✗".red(),
            failure.extension_id,
            failure.element,
            failure.kind,
            failure.error.red()
        )
    }

    fn format_summary(&self, result: &DiagnosticResult) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", "Summary".bold().underline()));

        match &result.overall_status {
            OverallStatus::Healthy => {
                output.push_str(&format!("  {} No problems found\n", "✓".green()));
            }
            OverallStatus::Warnings(n) => {
                output.push_str(&format!("  {} {} warning(s)\n", "⚠".yellow(), n));
            }
            OverallStatus::Errors(n) => {
                output.push_str(&format!("  {} {} error(s) need attention\n", "✗".red(), n));
            }
        }

        if self.verbose {
            for (severity, count) in result.counts.iter().rev() {
                output.push_str(&format!("      {:<9} {}\n", severity.as_str(), count));
            }
        }

        output
    }

    fn format_json(&self, result: &DiagnosticResult) -> String {
        let json_result = JsonDiagnosticResult::from(result);
        serde_json::to_string_pretty(&json_result)
            .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {}\"}}", e))
    }

    fn format_yaml(&self, result: &DiagnosticResult) -> String {
        let json_result = JsonDiagnosticResult::from(result);
        serde_yaml_ng::to_string(&json_result)
            .unwrap_or_else(|e| format!("error: \"Failed to serialize: {}\"", e))
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new(false)
    }
}

fn severity_badge(severity: Severity) -> String {
    let label = format!("{:<9}", severity.as_str());
    match severity {
        Severity::Debug => label.dimmed().to_string(),
        Severity::Info | Severity::Notice => label.blue().to_string(),
        Severity::Warning => label.yellow().to_string(),
        Severity::Error => label.red().to_string(),
        Severity::Critical | Severity::Alert | Severity::Emergency => {
            label.red().bold().to_string()
        }
    }
}

/// Serializable diagnostic result
#[derive(Debug, Serialize)]
pub struct JsonDiagnosticResult<'a> {
    pub overall_status: &'static str,
    pub min_severity: Severity,
    pub counts: BTreeMap<&'static str, usize>,
    pub extensions: Vec<JsonExtension<'a>>,
    pub failures: &'a [ConstructionFailure],
}

/// One extension with the issues at or above the threshold
#[derive(Debug, Serialize)]
pub struct JsonExtension<'a> {
    pub extension_id: i64,
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: ExtensionType,
    pub element: &'a str,
    pub folder: Option<&'a str>,
    pub client: &'a str,
    pub core: bool,
    pub enabled: bool,
    pub issues: Vec<&'a Issue>,
}

impl<'a> JsonExtension<'a> {
    fn new(report: &'a ExtensionReport, min: Severity) -> Self {
        Self {
            extension_id: report.extension_id,
            name: &report.name,
            kind: report.kind,
            element: &report.element,
            folder: report.folder.as_deref(),
            client: &report.client,
            core: report.core,
            enabled: report.enabled,
            issues: report.visible_issues(min).collect(),
        }
    }
}

impl<'a> From<&'a DiagnosticResult> for JsonDiagnosticResult<'a> {
    fn from(result: &'a DiagnosticResult) -> Self {
        Self {
            overall_status: match &result.overall_status {
                OverallStatus::Healthy => "healthy",
                OverallStatus::Warnings(_) => "warnings",
                OverallStatus::Errors(_) => "errors",
            },
            min_severity: result.min_severity,
            counts: result
                .counts
                .iter()
                .map(|(severity, count)| (severity.as_str(), *count))
                .collect(),
            extensions: result
                .with_visible_issues()
                .map(|report| JsonExtension::new(report, result.min_severity))
                .collect(),
            failures: &result.failures,
        }
    }
}
