//! extdoctor issues - extension health diagnostics
//!
//! This crate evaluates the issue rules against every extension of a site
//! and dispatches fixes.
//!
//! # Features
//!
//! - **Issue rules**: nineteen single-purpose checks, from broken installs to
//!   misconfigured update sites
//! - **Issue manager**: per-extension issue list with lookup by qualified id
//!   or bare name, and fix dispatch by action name
//! - **Multi-format output**: human-readable, JSON and YAML reports
//!
//! # Example
//!
//! ```rust,no_run
//! use extdoctor_core::HierarchicalConfigLoader;
//! use extdoctor_extensions::AuditContext;
//! use extdoctor_issues::{Doctor, DoctorOptions, OutputFormat};
//!
//! fn main() -> extdoctor_core::Result<()> {
//!     let config = HierarchicalConfigLoader::new()?.load(None)?;
//!     let ctx = AuditContext::open(config)?;
//!     let result = Doctor::new(&ctx).run(&DoctorOptions::default())?;
//!
//!     println!("{}", result.format(OutputFormat::Human));
//!     Ok(())
//! }
//! ```

mod manager;
mod reporter;
mod rule;
pub mod rules;
mod severity;

pub use manager::{Issue, IssueManager};
pub use reporter::{DiagnosticReporter, OutputFormat};
pub use rule::{
    bare_name, normalize_action, FixContext, FixOutcome, IssueRule, RuleInfo, DEFAULT_ACTION,
    RULE_NAMESPACE,
};
pub use severity::Severity;

use extdoctor_core::error::{Error, Result};
use extdoctor_core::platform::{ExtensionFilter, Uninstaller};
use extdoctor_core::types::ExtensionType;
use extdoctor_extensions::{AuditContext, ExtensionRecord};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tracing::{debug, warn};

/// Runs the issue rules over a site
///
/// Issue lists are cached per extension for the lifetime of the doctor; a
/// fix drops the cached list of the extension it touched.
pub struct Doctor<'a> {
    ctx: &'a AuditContext,
    issues: RefCell<HashMap<i64, Rc<IssueManager>>>,
}

impl<'a> Doctor<'a> {
    pub fn new(ctx: &'a AuditContext) -> Self {
        Self {
            ctx,
            issues: RefCell::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &'a AuditContext {
        self.ctx
    }

    /// The issue list of one extension, evaluated on first access
    pub fn issues_for(&self, record: &ExtensionRecord) -> Rc<IssueManager> {
        if let Some(manager) = self.issues.borrow().get(&record.id()) {
            return Rc::clone(manager);
        }

        let manager = Rc::new(IssueManager::evaluate(self.ctx, record));
        self.issues
            .borrow_mut()
            .insert(record.id(), Rc::clone(&manager));
        manager
    }

    /// Evaluate every selected extension
    pub fn run(&self, options: &DoctorOptions) -> Result<DiagnosticResult> {
        let rows = match options.id {
            Some(id) => vec![self
                .ctx
                .store()
                .extension_by_id(id)?
                .ok_or_else(|| Error::extension_not_found(id))?],
            None => self.ctx.store().list_extensions(&ExtensionFilter {
                kind: options.kind,
                ..Default::default()
            })?,
        };

        let mut extensions = Vec::with_capacity(rows.len());
        let mut failures = Vec::new();

        for row in rows {
            let (id, element, kind) = (row.extension_id, row.element.clone(), row.kind.clone());
            match self.ctx.make(row) {
                Ok(record) => {
                    let manager = self.issues_for(&record);
                    extensions.push(ExtensionReport::new(&record, &manager));
                }
                Err(e) => {
                    warn!("Extension {} could not be examined: {}", id, e);
                    failures.push(ConstructionFailure {
                        extension_id: id,
                        kind,
                        element,
                        error: e.to_string(),
                    });
                }
            }
        }

        debug!(
            "Examined {} extension(s), {} failed to load",
            extensions.len(),
            failures.len()
        );

        Ok(DiagnosticResult::new(extensions, failures, options.min_severity))
    }

    /// Apply a fix to one extension
    pub fn fix(
        &self,
        uninstaller: &dyn Uninstaller,
        extension_id: i64,
        issue: &str,
        action: &str,
    ) -> Result<FixOutcome> {
        let record = self
            .ctx
            .record_by_id(extension_id)?
            .ok_or_else(|| Error::extension_not_found(extension_id))?;
        let manager = self.issues_for(&record);

        let fx = FixContext {
            audit: self.ctx,
            uninstaller,
        };
        let outcome = manager.fix(&fx, &record, issue, action);

        self.issues.borrow_mut().remove(&extension_id);
        outcome
    }
}

/// Options for running the doctor
#[derive(Debug, Clone)]
pub struct DoctorOptions {
    /// Examine only this extension
    pub id: Option<i64>,
    /// Examine only extensions of this type
    pub kind: Option<ExtensionType>,
    /// Issues below this severity are left out of the report
    pub min_severity: Severity,
    /// CI mode - affects exit codes
    pub ci: bool,
}

impl Default for DoctorOptions {
    fn default() -> Self {
        Self {
            id: None,
            kind: None,
            min_severity: Severity::Info,
            ci: false,
        }
    }
}

/// Issues of one extension, as reported
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionReport {
    pub extension_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ExtensionType,
    pub element: String,
    pub folder: Option<String>,
    pub client: String,
    pub core: bool,
    pub enabled: bool,
    /// Every triggered issue, most severe first
    pub issues: Vec<Issue>,
}

impl ExtensionReport {
    fn new(record: &ExtensionRecord, manager: &IssueManager) -> Self {
        let mut issues = manager.issues().to_vec();
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));

        Self {
            extension_id: record.id(),
            name: record.name().to_string(),
            kind: record.kind(),
            element: record.element().to_string(),
            folder: record.folder().map(str::to_string),
            client: record.client().to_string(),
            core: record.is_core(),
            enabled: record.is_enabled(),
            issues,
        }
    }

    /// Issues at or above `min`
    pub fn visible_issues(&self, min: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.severity >= min)
    }
}

/// An extension whose record could not be built
#[derive(Debug, Clone, Serialize)]
pub struct ConstructionFailure {
    pub extension_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub element: String,
    pub error: String,
}

/// Result of running the doctor
#[derive(Debug)]
pub struct DiagnosticResult {
    pub extensions: Vec<ExtensionReport>,
    pub failures: Vec<ConstructionFailure>,
    /// Issues per severity, hidden ones included
    pub counts: BTreeMap<Severity, usize>,
    pub min_severity: Severity,
    pub overall_status: OverallStatus,
}

impl DiagnosticResult {
    fn new(
        extensions: Vec<ExtensionReport>,
        failures: Vec<ConstructionFailure>,
        min_severity: Severity,
    ) -> Self {
        let mut counts: BTreeMap<Severity, usize> = BTreeMap::new();
        for issue in extensions.iter().flat_map(|e| &e.issues) {
            *counts.entry(issue.severity).or_default() += 1;
        }

        let errors: usize = counts
            .iter()
            .filter(|(severity, _)| severity.is_failure())
            .map(|(_, n)| n)
            .sum::<usize>()
            + failures.len();
        let warnings = counts.get(&Severity::Warning).copied().unwrap_or_default();

        let overall_status = if errors > 0 {
            OverallStatus::Errors(errors)
        } else if warnings > 0 {
            OverallStatus::Warnings(warnings)
        } else {
            OverallStatus::Healthy
        };

        Self {
            extensions,
            failures,
            counts,
            min_severity,
            overall_status,
        }
    }

    /// Format the result for display
    pub fn format(&self, format: OutputFormat) -> String {
        let reporter = DiagnosticReporter::new(false);
        reporter.format(self, format)
    }

    /// Format with verbose output
    pub fn format_verbose(&self, format: OutputFormat) -> String {
        let reporter = DiagnosticReporter::new(true);
        reporter.format(self, format)
    }

    /// Get the exit code for CI mode
    pub fn exit_code(&self) -> i32 {
        match &self.overall_status {
            OverallStatus::Healthy => 0,
            OverallStatus::Warnings(_) => 0,
            OverallStatus::Errors(_) => 1,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.overall_status, OverallStatus::Healthy)
    }

    /// Extensions with at least one issue at or above the report threshold
    pub fn with_visible_issues(&self) -> impl Iterator<Item = &ExtensionReport> {
        self.extensions
            .iter()
            .filter(|e| e.visible_issues(self.min_severity).next().is_some())
    }
}

/// Overall status of the diagnostic run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverallStatus {
    /// No issue above notice
    Healthy,
    /// Warnings, but nothing at error level
    Warnings(usize),
    /// Issues at error level or worse, or extensions that failed to load
    Errors(usize),
}
