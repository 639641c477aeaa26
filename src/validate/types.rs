//! Finding, rule and severity types.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::DocGraphError;

/// Rule identifiers reported in findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    OrphanFiles,
    DeadLink,
    DeadAnchor,
    ExternalLink,
    ParseError,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::OrphanFiles => "orphan-files",
            Rule::DeadLink => "dead-link",
            Rule::DeadAnchor => "dead-anchor",
            Rule::ExternalLink => "external-link",
            Rule::ParseError => "parse-error",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity attached to a reported finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warn => f.write_str("warn"),
        }
    }
}

/// Configured severity for a rule; `Off` suppresses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSeverity {
    Error,
    Warn,
    Off,
}

impl RuleSeverity {
    pub fn to_severity(self) -> Option<Severity> {
        match self {
            RuleSeverity::Error => Some(Severity::Error),
            RuleSeverity::Warn => Some(Severity::Warn),
            RuleSeverity::Off => None,
        }
    }
}

impl FromStr for RuleSeverity {
    type Err = DocGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(RuleSeverity::Error),
            "warn" | "warning" => Ok(RuleSeverity::Warn),
            "off" | "ignore" => Ok(RuleSeverity::Off),
            _ => Err(DocGraphError::InvalidSeverity(s.to_string())),
        }
    }
}

/// Severities for the configurable rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSeverities {
    pub orphan_files: RuleSeverity,
    pub dead_link: RuleSeverity,
    pub dead_anchor: RuleSeverity,
}

impl Default for RuleSeverities {
    fn default() -> Self {
        Self {
            orphan_files: RuleSeverity::Error,
            dead_link: RuleSeverity::Error,
            dead_anchor: RuleSeverity::Error,
        }
    }
}

impl RuleSeverities {
    /// Effective severity of a rule. `parse-error` is always an error;
    /// `external-link` severity comes from the link policy instead.
    pub fn severity_of(&self, rule: Rule) -> Option<Severity> {
        match rule {
            Rule::OrphanFiles => self.orphan_files.to_severity(),
            Rule::DeadLink => self.dead_link.to_severity(),
            Rule::DeadAnchor => self.dead_anchor.to_severity(),
            Rule::ExternalLink => Some(Severity::Warn),
            Rule::ParseError => Some(Severity::Error),
        }
    }
}

/// What to do with `http(s)://` links. They are never fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExternalLinkPolicy {
    /// Check that the URL is well formed; report malformed ones.
    Validate,
    /// Report every external link as a warning.
    Warn,
    /// Report every external link as an error.
    Error,
    #[default]
    Ignore,
}

impl FromStr for ExternalLinkPolicy {
    type Err = DocGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "validate" => Ok(ExternalLinkPolicy::Validate),
            "warn" => Ok(ExternalLinkPolicy::Warn),
            "error" => Ok(ExternalLinkPolicy::Error),
            "ignore" => Ok(ExternalLinkPolicy::Ignore),
            _ => Err(DocGraphError::InvalidPolicy(s.to_string())),
        }
    }
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
    pub severity: Severity,
    pub rule: Rule,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<PathBuf>,
}

impl Finding {
    /// Total order used for stable output: location first, then rule and
    /// message to break ties.
    pub fn report_order(&self, other: &Self) -> Ordering {
        (&self.file, self.line, self.column, self.rule, &self.message).cmp(&(
            &other.file,
            other.line,
            other.column,
            other.rule,
            &other.message,
        ))
    }
}

/// Sort findings into deterministic report order.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| a.report_order(b));
}

/// True when any finding carries `error` severity.
pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(|f| f.severity == Severity::Error)
}
