//! Registry validation.
//!
//! Validation never fails with an error: every check returns its findings as
//! data and the caller decides what is fatal. Findings carry a severity so the
//! CLI can log them and compute the overall pass/fail flag.

use serde::Serialize;
use std::fmt;

pub mod collisions;
pub mod record;
pub mod support;

pub use collisions::{find_address_collisions, CollisionField, CollisionReport};
pub use record::{find_duplicate_keys, validate_record};
pub use support::{check_support, validate_support, SupportCheck};

/// Severity of a single finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERR"),
        }
    }
}

/// A single (severity, message) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn info(message: impl Into<String>) -> Self {
        Self { severity: Severity::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Ordered findings of one validation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    /// True when no hard error was recorded
    pub fn passed(&self) -> bool {
        !self.findings.iter().any(Finding::is_error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    /// Emit every finding through the `log` facade at its severity
    pub fn log(&self) {
        for finding in &self.findings {
            match finding.severity {
                Severity::Info => log::info!("{}", finding.message),
                Severity::Warning => log::warn!("{}", finding.message),
                Severity::Error => log::error!("{}", finding.message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_passes_without_errors() {
        let mut report = ValidationReport::new();
        report.push(Finding::info("override present"));
        report.push(Finding::warning("missing support info"));
        assert!(report.passed());

        report.push(Finding::error("invalid definition"));
        assert!(!report.passed());
        assert_eq!(report.count(Severity::Error), 1);
        assert_eq!(report.count(Severity::Warning), 1);
    }

    #[test]
    fn test_finding_display() {
        assert_eq!(Finding::warning("x").to_string(), "WARN: x");
        assert_eq!(Finding::error("y").to_string(), "ERR: y");
    }
}
