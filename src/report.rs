//! Rendering findings, dependency trees and stats for the terminal.
//!
//! Paths are shown relative to a base directory (normally the working
//! directory). JSON keeps the same relative paths so output is stable
//! across machines.

use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::deps::{DependencyNode, DependencyReport};
use crate::error::Result;
use crate::graph::{GraphStats, OrphanReport};
use crate::paths::display_relative;
use crate::validate::{Finding, Severity};

/// Output format for `validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    /// `file:line:column:severity:rule:message:literal`, one per line. The
    /// literal field is empty when the finding has no source text.
    Grep,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
}

impl Summary {
    pub fn of(findings: &[Finding]) -> Self {
        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        Self {
            errors,
            warnings: findings.len() - errors,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonValidation<'a> {
    findings: &'a [Finding],
    orphan_check: &'a OrphanReport,
    summary: Summary,
}

/// Render validation results. `findings` must already be sorted.
pub fn render_findings(
    findings: &[Finding],
    orphans: &OrphanReport,
    format: OutputFormat,
    base: &Path,
) -> Result<String> {
    let findings: Vec<Finding> = findings.iter().map(|f| relativize(f, base)).collect();
    let summary = Summary::of(&findings);

    let out = match format {
        OutputFormat::Json => {
            let orphan_check = match orphans {
                OrphanReport::Checked { orphans } => OrphanReport::Checked {
                    orphans: orphans.iter().map(|p| display_relative(p, base)).collect(),
                },
                skipped => skipped.clone(),
            };
            let mut json = serde_json::to_string_pretty(&JsonValidation {
                findings: &findings,
                orphan_check: &orphan_check,
                summary,
            })?;
            json.push('\n');
            json
        }
        OutputFormat::Grep => findings
            .iter()
            .map(|f| {
                format!(
                    "{}:{}:{}:{}:{}:{}:{}\n",
                    f.file.display(),
                    f.line,
                    f.column,
                    f.severity,
                    f.rule,
                    f.message,
                    f.literal.as_deref().unwrap_or_default()
                )
            })
            .collect(),
        OutputFormat::Text => render_text(&findings, orphans, summary),
    };
    Ok(out)
}

fn render_text(findings: &[Finding], orphans: &OrphanReport, summary: Summary) -> String {
    let mut out = String::new();
    for f in findings {
        let _ = writeln!(
            out,
            "{}:{}:{}  {:<5}  {}  {}",
            f.file.display(),
            f.line,
            f.column,
            f.severity.to_string(),
            f.rule,
            f.message
        );
        if let Some(literal) = &f.literal {
            let _ = writeln!(out, "    {literal}");
        }
    }
    if let OrphanReport::Skipped { depth_limit } = orphans {
        let _ = writeln!(out, "{}", orphan_skip_notice(*depth_limit));
    }
    if findings.is_empty() {
        out.push_str("✓ No problems found\n");
    } else {
        let _ = writeln!(
            out,
            "✗ {} error(s), {} warning(s)",
            summary.errors, summary.warnings
        );
    }
    out
}

/// Shown whenever orphan detection was skipped, in every format but JSON.
pub fn orphan_skip_notice(depth_limit: usize) -> String {
    format!(
        "note: orphan detection skipped (graph limited to depth {depth_limit}; \
         run with unlimited depth to check for orphans)"
    )
}

fn relativize(finding: &Finding, base: &Path) -> Finding {
    Finding {
        file: display_relative(&finding.file, base),
        resolved_path: finding
            .resolved_path
            .as_ref()
            .map(|p| display_relative(p, base)),
        ..finding.clone()
    }
}

/// Render a dependency report as indented trees.
pub fn render_dependencies(report: &DependencyReport, base: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", display_relative(&report.file, base).display());
    let _ = writeln!(out, "─────────────────");

    if let Some(tree) = &report.outgoing {
        let _ = writeln!(
            out,
            "Depends on ({} direct, {} total):",
            report.stats.direct_outgoing, report.stats.total_outgoing
        );
        render_children(&mut out, tree, base, "  ");
    }
    if let Some(tree) = &report.incoming {
        let _ = writeln!(
            out,
            "Referenced by ({} direct, {} total):",
            report.stats.direct_incoming, report.stats.total_incoming
        );
        render_children(&mut out, tree, base, "  ");
    }
    if !report.cycles.is_empty() {
        let _ = writeln!(out, "Cycles:");
        for cycle in &report.cycles {
            let _ = writeln!(
                out,
                "  {} -> {} ({:?})",
                display_relative(&cycle.from, base).display(),
                display_relative(&cycle.to, base).display(),
                cycle.direction
            );
        }
    }
    out
}

fn render_children(out: &mut String, node: &DependencyNode, base: &Path, prefix: &str) {
    let children = node.children();
    if children.is_empty() {
        let _ = writeln!(out, "{prefix}(none)");
        return;
    }
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let (branch, indent) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
        let label = display_relative(child.path(), base);
        let suffix = match child {
            DependencyNode::Cycle { .. } => " (cycle)",
            DependencyNode::Expanded { missing: true, .. } => " (missing)",
            DependencyNode::Expanded { truncated: true, .. } => " ...",
            DependencyNode::Expanded { .. } => "",
        };
        let _ = writeln!(out, "{prefix}{branch}{}{suffix}", label.display());
        if !child.children().is_empty() {
            render_children(out, child, base, &format!("{prefix}{indent}"));
        }
    }
}

/// One path per line, relative to `base`.
pub fn render_paths(paths: &[PathBuf], base: &Path) -> String {
    paths
        .iter()
        .map(|p| format!("{}\n", display_relative(p, base).display()))
        .collect()
}

pub fn render_stats(stats: &GraphStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Documentation Graph");
    let _ = writeln!(out, "───────────────────");
    let _ = writeln!(out, "Files:        {}", stats.nodes);
    let _ = writeln!(out, "Entrypoints:  {}", stats.entrypoints);
    let _ = writeln!(out, "Links:        {}", stats.edges);
    let _ = writeln!(out, "Dangling:     {}", stats.dangling_edges);
    let _ = writeln!(out, "Unexpanded:   {}", stats.unexpanded);
    let _ = writeln!(out, "Max depth:    {}", stats.max_depth);
    out
}
