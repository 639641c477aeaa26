//! validate: orphans, dead links, dead anchors.

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

use super::Session;
use crate::pool::WorkerPool;
use crate::report::{render_findings, OutputFormat};
use crate::validate::{has_errors, orphan_findings, sort_findings, LinkValidator};

/// Exit code 1 when any finding has error severity.
pub fn run(session: &Session, format: OutputFormat) -> Result<i32> {
    let settings = &session.settings;
    let graph = session.build_graph()?;
    let orphans = session.analyzer.find_orphans(&graph)?;

    let pool = Arc::new(WorkerPool::new(settings.max_concurrency)?);
    let mut findings = LinkValidator::new(Arc::clone(&session.provider), pool)
        .with_policy(settings.external_policy)
        .with_severities(settings.severities)
        .validate(&graph);
    findings.extend(orphan_findings(orphans.orphans(), &settings.severities));
    sort_findings(&mut findings);

    info!(
        files = graph.all_nodes().len(),
        findings = findings.len(),
        orphan_check_skipped = orphans.is_skipped(),
        "validation complete"
    );

    let out = render_findings(&findings, &orphans, format, &session.base)?;
    std::io::stdout().lock().write_all(out.as_bytes())?;

    Ok(if has_errors(&findings) { 1 } else { 0 })
}
