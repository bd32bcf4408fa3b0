//! doctor
//!
//! Diagnosis vocabulary for graph consistency checks.
//!
//! # Architecture
//!
//! The troubleshoot crawl walks the graph and records a [`Finding`] per
//! broken edge. A finding pairs a [`KnownIssue`] with whether it was
//! repaired in the same run. [`DiagnosisReport`] collects and formats them.
//!
//! # Design Principles
//!
//! - Never guess repairs silently
//! - Repairs only happen when the caller asks for them (`--adjust`)
//! - Issue ids are stable across runs for the same edge

mod issues;

pub use issues::KnownIssue;

use sha2::{Digest, Sha256};

/// Severity of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The score invariant is broken.
    Error,
    /// Suspicious but possibly legitimate.
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A stable, deterministic issue identifier.
///
/// # Example
///
/// ```
/// use openbook::doctor::IssueId;
///
/// let id = IssueId::new("unscored-destination", "some edge");
/// assert!(id.as_str().starts_with("unscored-destination:"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueId(String);

impl IssueId {
    /// Create an issue ID from a type and key.
    ///
    /// The ID is formatted as `type:hash(key)` where hash is a truncated
    /// SHA-256 of the key.
    pub fn new(issue_type: &str, key: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let hash = hasher.finalize();
        let short_hash = hex::encode(&hash[..4]); // 8 hex chars
        Self(format!("{}:{}", issue_type, short_hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IssueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One detected issue and what was done about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub issue: KnownIssue,
    /// True when the run fixed the issue.
    pub repaired: bool,
}

/// Summary of a diagnosis.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosisSummary {
    pub issue_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub repaired_count: usize,
}

/// Findings from one troubleshoot run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiagnosisReport {
    pub findings: Vec<Finding>,
}

impl DiagnosisReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding.
    pub fn record(&mut self, issue: KnownIssue, repaired: bool) {
        tracing::warn!(id = %issue.issue_id(), repaired, "{}", issue);
        self.findings.push(Finding { issue, repaired });
    }

    /// Check whether nothing was found.
    pub fn is_healthy(&self) -> bool {
        self.findings.is_empty()
    }

    /// Errors that are still present after the run.
    pub fn outstanding_errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.issue.severity() == Severity::Error && !f.repaired)
    }

    pub fn summary(&self) -> DiagnosisSummary {
        let mut summary = DiagnosisSummary {
            issue_count: self.findings.len(),
            ..Default::default()
        };
        for finding in &self.findings {
            match finding.issue.severity() {
                Severity::Error => summary.error_count += 1,
                Severity::Warning => summary.warning_count += 1,
            }
            if finding.repaired {
                summary.repaired_count += 1;
            }
        }
        summary
    }

    /// Format the diagnosis for display.
    pub fn format(&self) -> String {
        if self.is_healthy() {
            return "Graph is consistent - no issues found.".to_string();
        }

        let summary = self.summary();
        let mut lines = vec![
            format!(
                "Found {} issue(s): {} errors, {} warnings, {} repaired",
                summary.issue_count,
                summary.error_count,
                summary.warning_count,
                summary.repaired_count
            ),
            String::new(),
        ];

        for finding in &self.findings {
            let tag = match (finding.issue.severity(), finding.repaired) {
                (_, true) => "FIXED",
                (Severity::Error, false) => "ERROR",
                (Severity::Warning, false) => "WARN",
            };
            lines.push(format!(
                "[{}] {} ({})",
                tag,
                finding.issue,
                finding.issue.issue_id()
            ));
        }

        if self.outstanding_errors().next().is_some() {
            lines.push(String::new());
            lines.push("Run 'ob troubleshoot --adjust' to repair errors.".to_string());
        }

        lines.join("\n")
    }
}
