//! Link validation over a built documentation graph.
//!
//! Every graph member is read through the [`ContentProvider`] on the worker
//! pool and each of its links is checked. Results are plain [`Finding`]s;
//! nothing here fails the run.

pub mod slug;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::graph::DocGraph;
use crate::parser::{is_markdown, ContentProvider, ExtractedLink, FileExtractions, LinkKind};
use crate::paths::resolve_target;
use crate::pool::WorkerPool;

pub use slug::slugify;
pub use types::{
    has_errors, sort_findings, ExternalLinkPolicy, Finding, Rule, RuleSeverities, RuleSeverity,
    Severity,
};

pub struct LinkValidator {
    provider: Arc<dyn ContentProvider>,
    pool: Arc<WorkerPool>,
    policy: ExternalLinkPolicy,
    severities: RuleSeverities,
}

impl LinkValidator {
    pub fn new(provider: Arc<dyn ContentProvider>, pool: Arc<WorkerPool>) -> Self {
        Self {
            provider,
            pool,
            policy: ExternalLinkPolicy::default(),
            severities: RuleSeverities::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExternalLinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_severities(mut self, severities: RuleSeverities) -> Self {
        self.severities = severities;
        self
    }

    /// Check every link in every graph member. Sorted by location.
    pub fn validate(&self, graph: &DocGraph) -> Vec<Finding> {
        let files = graph.all_nodes();
        info!(files = files.len(), workers = self.pool.size(), "validating links");

        let mut findings: Vec<Finding> = self
            .pool
            .run(&files, |file| self.validate_file(graph, file))
            .into_iter()
            .flatten()
            .collect();

        sort_findings(&mut findings);
        info!(findings = findings.len(), "link validation finished");
        findings
    }

    fn validate_file(&self, graph: &DocGraph, file: &Path) -> Vec<Finding> {
        let extraction = match self.provider.extract(file) {
            Ok(extraction) => extraction,
            Err(e) => {
                debug!(file = %file.display(), error = %e, "unreadable file");
                return vec![Finding {
                    file: file.to_path_buf(),
                    line: 1,
                    column: 1,
                    end_column: None,
                    severity: Severity::Error,
                    rule: Rule::ParseError,
                    message: format!("Could not read file: {e}"),
                    literal: None,
                    resolved_path: None,
                }];
            }
        };

        let scope_root = graph
            .scope_root()
            .map(Path::to_path_buf)
            .or_else(|| file.parent().map(Path::to_path_buf))
            .unwrap_or_default();

        let mut findings = Vec::new();
        for link in &extraction.links {
            let finding = match link.kind() {
                LinkKind::Anchor => self.check_local_anchor(file, &extraction, link),
                LinkKind::File => self.check_file_link(file, link, &scope_root),
                LinkKind::External => self.check_external(file, link),
                LinkKind::Other => None,
            };
            findings.extend(finding);
        }
        findings
    }

    /// `#slug` against the file's own headings. A bare `#` is a link to the
    /// top of the page and always valid.
    fn check_local_anchor(
        &self,
        file: &Path,
        extraction: &FileExtractions,
        link: &ExtractedLink,
    ) -> Option<Finding> {
        let severity = self.severities.severity_of(Rule::DeadAnchor)?;
        let anchor = link.target.trim_start_matches('#');
        if anchor.is_empty() || anchor_exists(extraction, anchor) {
            return None;
        }
        Some(finding(
            file,
            link,
            severity,
            Rule::DeadAnchor,
            format!("Anchor '#{anchor}' not found in this file"),
            None,
        ))
    }

    /// Target existence first; the anchor is only checked when the target
    /// is an existing markdown file.
    fn check_file_link(
        &self,
        file: &Path,
        link: &ExtractedLink,
        scope_root: &Path,
    ) -> Option<Finding> {
        let (raw, anchor) = link.split_target();
        if raw.is_empty() {
            return None;
        }
        let target = resolve_target(file, &raw, scope_root);

        if !target.exists() {
            let severity = self.severities.severity_of(Rule::DeadLink)?;
            return Some(finding(
                file,
                link,
                severity,
                Rule::DeadLink,
                format!("Link target '{raw}' does not exist"),
                Some(target),
            ));
        }

        let anchor = anchor?;
        if !target.is_file() || !is_markdown(&target) {
            return None;
        }
        let severity = self.severities.severity_of(Rule::DeadAnchor)?;
        let extraction = match self.provider.extract(&target) {
            Ok(extraction) => extraction,
            Err(e) => {
                debug!(target = %target.display(), error = %e, "anchor check skipped");
                return None;
            }
        };
        if anchor_exists(&extraction, &anchor) {
            return None;
        }
        Some(finding(
            file,
            link,
            severity,
            Rule::DeadAnchor,
            format!("Anchor '#{anchor}' not found in '{raw}'"),
            Some(target),
        ))
    }

    fn check_external(&self, file: &Path, link: &ExtractedLink) -> Option<Finding> {
        let (severity, message) = match self.policy {
            ExternalLinkPolicy::Ignore => return None,
            ExternalLinkPolicy::Warn => (Severity::Warn, "External link not checked".to_string()),
            ExternalLinkPolicy::Error => (Severity::Error, "External link not allowed".to_string()),
            ExternalLinkPolicy::Validate => {
                if is_well_formed_url(&link.target) {
                    return None;
                }
                (Severity::Error, "Malformed external URL".to_string())
            }
        };
        Some(finding(
            file,
            link,
            severity,
            Rule::ExternalLink,
            format!("{message}: {}", link.target),
            None,
        ))
    }
}

/// Findings for orphan files at the configured severity. Empty when the
/// rule is off.
pub fn orphan_findings(orphans: &[PathBuf], severities: &RuleSeverities) -> Vec<Finding> {
    let Some(severity) = severities.severity_of(Rule::OrphanFiles) else {
        return Vec::new();
    };
    orphans
        .iter()
        .map(|path| Finding {
            file: path.clone(),
            line: 1,
            column: 1,
            end_column: None,
            severity,
            rule: Rule::OrphanFiles,
            message: "File is not reachable from any entrypoint".to_string(),
            literal: None,
            resolved_path: None,
        })
        .collect()
}

fn finding(
    file: &Path,
    link: &ExtractedLink,
    severity: Severity,
    rule: Rule,
    message: String,
    resolved_path: Option<PathBuf>,
) -> Finding {
    Finding {
        file: file.to_path_buf(),
        line: link.line,
        column: link.column,
        end_column: link.end_column,
        severity,
        rule,
        message,
        literal: Some(link.literal.clone()),
        resolved_path,
    }
}

/// Exact match, then a case-insensitive retry: authors often write
/// `#Getting-Started` for a heading slugged as `getting-started`.
fn anchor_exists(extraction: &FileExtractions, anchor: &str) -> bool {
    let anchor = anchor.replace("%20", " ");
    extraction.has_anchor(&anchor) || extraction.has_anchor(&anchor.to_lowercase())
}

/// `http(s)://host[...]` with a non-empty host and no whitespace.
fn is_well_formed_url(url: &str) -> bool {
    let Some((_, rest)) = url.split_once("://") else {
        return false;
    };
    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = host.rsplit('@').next().unwrap_or(host);
    let host = host.split(':').next().unwrap_or(host);
    !host.is_empty()
        && !url.chars().any(char::is_whitespace)
        && host
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '[' | ']'))
}
