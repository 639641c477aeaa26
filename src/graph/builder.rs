//
//  builder.rs
//  docgraph
//

use ignore::WalkBuilder;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::engine::DocGraph;
use super::types::OrphanReport;
use crate::error::{DocGraphError, Result};
use crate::exclude::ExclusionManager;
use crate::parser::{is_markdown, ContentProvider, ExtractedLink, LinkKind};
use crate::paths::{common_ancestor, resolve_target};

/// Where traversal is allowed to expand.
#[derive(Debug, Clone)]
pub struct ScopeOptions {
    /// Explicit scope directory. Derived from the entrypoints when `None`.
    pub root: Option<PathBuf>,
    /// Record out-of-scope files without following their links.
    pub limit_to_scope: bool,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            root: None,
            limit_to_scope: true,
        }
    }
}

/// Per-build traversal state, threaded through the DFS.
struct TraversalContext {
    /// Smallest depth each path was expanded at.
    expanded_at: HashMap<PathBuf, usize>,
    max_depth: Option<usize>,
    scope_root: PathBuf,
}

impl TraversalContext {
    fn beyond_limit(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth > max)
    }

    /// Already expanded at `depth` or closer to an entrypoint.
    fn reached_at_or_before(&self, path: &Path, depth: usize) -> bool {
        self.expanded_at.get(path).is_some_and(|&seen| seen <= depth)
    }
}

/// Builds documentation graphs and finds orphans.
pub struct GraphAnalyzer {
    provider: Arc<dyn ContentProvider>,
    exclusions: Arc<ExclusionManager>,
    scope: ScopeOptions,
}

impl GraphAnalyzer {
    pub fn new(
        provider: Arc<dyn ContentProvider>,
        exclusions: Arc<ExclusionManager>,
        scope: ScopeOptions,
    ) -> Self {
        Self {
            provider,
            exclusions,
            scope,
        }
    }

    /// Build a graph from `entrypoints`, each seeded at depth 0.
    ///
    /// Files deeper than `max_depth` (when set) are left out. Entrypoints
    /// must exist; everything else that is missing becomes a dangling edge.
    pub fn build_graph(&self, entrypoints: &[PathBuf], max_depth: Option<usize>) -> Result<DocGraph> {
        let entrypoints = canonical_entrypoints(entrypoints)?;
        let scope_root = self.resolve_scope(&entrypoints)?;

        info!(
            entrypoints = entrypoints.len(),
            scope = %scope_root.display(),
            max_depth = ?max_depth,
            "building documentation graph"
        );

        let mut graph = DocGraph::new();
        graph.set_build_info(max_depth, scope_root.clone());

        for entry in &entrypoints {
            if self.exclusions.should_exclude(entry) {
                warn!(file = %entry.display(), "entrypoint is excluded, skipping");
                continue;
            }
            graph.add_node(entry, 0);
        }

        let mut ctx = TraversalContext {
            expanded_at: HashMap::new(),
            max_depth,
            scope_root,
        };
        for entry in &entrypoints {
            self.visit(&mut graph, entry, 0, &mut ctx);
        }

        let stats = graph.stats();
        info!(
            nodes = stats.nodes,
            edges = stats.edges,
            dangling = stats.dangling_edges,
            "graph built"
        );
        Ok(graph)
    }

    /// Depth-first expansion keyed on the shortest hop count seen so far.
    ///
    /// A file first reached along a long path is expanded again when a
    /// shorter path reaches it, so the member set for a bound `d` is exactly
    /// the files within `d` hops. The recorded depth stays the discovery
    /// depth and edges are only recorded on the first expansion.
    fn visit(&self, graph: &mut DocGraph, path: &Path, depth: usize, ctx: &mut TraversalContext) {
        if ctx.beyond_limit(depth) || ctx.reached_at_or_before(path, depth) {
            return;
        }
        if self.exclusions.should_exclude(path) {
            debug!(file = %path.display(), "excluded");
            return;
        }

        let first_visit = ctx
            .expanded_at
            .insert(path.to_path_buf(), depth)
            .is_none();
        graph.add_node(path, depth);

        if self.scope.limit_to_scope && !path.starts_with(&ctx.scope_root) {
            debug!(file = %path.display(), "outside scope, not expanding");
            return;
        }

        let extraction = match self.provider.extract(path) {
            Ok(extraction) => extraction,
            Err(e) => {
                if first_visit {
                    warn!(file = %path.display(), error = %e, "could not read file, not expanding");
                }
                return;
            }
        };
        if !first_visit {
            debug!(file = %path.display(), depth, "re-expanding at shorter depth");
        }
        graph.mark_expanded(path);

        for link in &extraction.links {
            let Some(target) = graph_target(path, link, &ctx.scope_root) else {
                continue;
            };
            if first_visit {
                graph.add_edge(path, &target);
            }
            if target.is_file() {
                self.visit(graph, &target, depth + 1, ctx);
            }
        }
    }

    /// Explicit scope, or the entrypoint's directory (one entrypoint), or
    /// the deepest directory shared by all entrypoints.
    fn resolve_scope(&self, entrypoints: &[PathBuf]) -> Result<PathBuf> {
        if let Some(root) = &self.scope.root {
            return match root.canonicalize() {
                Ok(root) if root.is_dir() => Ok(root),
                _ => Err(DocGraphError::ScopeNotFound(root.clone())),
            };
        }
        let dirs: Vec<PathBuf> = entrypoints
            .iter()
            .filter_map(|e| e.parent().map(Path::to_path_buf))
            .collect();
        common_ancestor(&dirs).ok_or(DocGraphError::NoEntrypoints)
    }

    /// Markdown files under the graph's scope that are not graph members.
    ///
    /// Skipped for depth-limited graphs: a file cut off by the depth bound
    /// would look exactly like a real orphan.
    pub fn find_orphans(&self, graph: &DocGraph) -> Result<OrphanReport> {
        if let Some(depth_limit) = graph.depth_limit() {
            info!(depth_limit, "orphan detection skipped for depth-limited graph");
            return Ok(OrphanReport::Skipped { depth_limit });
        }
        let Some(root) = graph.scope_root() else {
            return Ok(OrphanReport::Checked {
                orphans: Vec::new(),
            });
        };

        let orphans: Vec<PathBuf> = self
            .markdown_files(root)?
            .into_iter()
            .filter(|file| !graph.has_node(file))
            .collect();

        info!(orphans = orphans.len(), "orphan detection finished");
        Ok(OrphanReport::Checked { orphans })
    }

    /// Walk `root` for markdown files, pruning excluded directories before
    /// descending into them. Sorted, canonical paths.
    pub fn markdown_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let exclusions = Arc::clone(&self.exclusions);
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                entry.depth() == 0 || !is_dir || !exclusions.should_exclude_directory(entry.path())
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            if !entry.file_type().is_some_and(|ft| ft.is_file()) || !is_markdown(entry.path()) {
                continue;
            }
            let path = entry
                .path()
                .canonicalize()
                .map_err(|e| DocGraphError::io(entry.path(), e))?;
            if self.exclusions.should_exclude(&path) {
                continue;
            }
            files.push(path);
        }

        files.sort();
        files.dedup();
        debug!(root = %root.display(), files = files.len(), "markdown walk finished");
        Ok(files)
    }
}

/// Resolve a link to the markdown file it makes an edge to, if any.
///
/// Anchors, external links, images and non-markdown files do not create
/// edges.
fn graph_target(source: &Path, link: &ExtractedLink, scope_root: &Path) -> Option<PathBuf> {
    if link.is_image || link.kind() != LinkKind::File {
        return None;
    }
    let (raw, _) = link.split_target();
    if raw.is_empty() {
        return None;
    }
    let target = resolve_target(source, &raw, scope_root);
    is_markdown(&target).then_some(target)
}

fn canonical_entrypoints(entrypoints: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if entrypoints.is_empty() {
        return Err(DocGraphError::NoEntrypoints);
    }
    let mut out: Vec<PathBuf> = Vec::with_capacity(entrypoints.len());
    for entry in entrypoints {
        let canonical = entry.canonicalize().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DocGraphError::EntrypointNotFound(entry.clone()),
            _ => DocGraphError::io(entry, e),
        })?;
        if !canonical.is_file() {
            return Err(DocGraphError::EntrypointNotAFile(entry.clone()));
        }
        if !out.contains(&canonical) {
            out.push(canonical);
        }
    }
    Ok(out)
}

fn walk_error(root: &Path, err: ignore::Error) -> DocGraphError {
    match err.io_error() {
        Some(io_err) => DocGraphError::io(root, io::Error::new(io_err.kind(), err.to_string())),
        None => DocGraphError::Walk(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exclude::ExclusionOptions;
    use crate::parser::MarkdownProvider;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn write(dir: &TempDir, rel: &str, content: &str) -> PathBuf {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path.canonicalize().unwrap()
    }

    fn analyzer(dir: &TempDir, scope: ScopeOptions, cli: &[&str]) -> GraphAnalyzer {
        let cli: Vec<String> = cli.iter().map(|s| s.to_string()).collect();
        let exclusions =
            ExclusionManager::new(dir.path(), &ExclusionOptions::default(), &cli).unwrap();
        GraphAnalyzer::new(
            Arc::new(MarkdownProvider::new()),
            Arc::new(exclusions),
            scope,
        )
    }

    fn basic_tree() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let readme = write(&dir, "README.md", "# Home\n\n[Guide](guide.md)\n");
        write(&dir, "guide.md", "# Guide\n\n[Setup](./setup.md)\n");
        write(&dir, "setup.md", "# Setup\n");
        write(&dir, "orphan.md", "# Orphan\n");
        (dir, readme)
    }

    #[test]
    fn test_build_and_orphans() {
        let (dir, readme) = basic_tree();
        let analyzer = analyzer(&dir, ScopeOptions::default(), &[]);
        let graph = analyzer.build_graph(&[readme], None).unwrap();

        assert_eq!(graph.all_nodes().len(), 3);
        let setup = dir.path().join("setup.md").canonicalize().unwrap();
        assert_eq!(graph.depth_of(&setup), Some(2));

        let report = analyzer.find_orphans(&graph).unwrap();
        let orphan = dir.path().join("orphan.md").canonicalize().unwrap();
        assert_eq!(report.orphans(), &[orphan]);
    }

    #[test]
    fn test_cycle_terminates() {
        let dir = tempdir().unwrap();
        let a = write(&dir, "a.md", "[b](b.md)\n");
        write(&dir, "b.md", "[c](c.md)\n");
        write(&dir, "c.md", "[a](a.md)\n");

        let graph = analyzer(&dir, ScopeOptions::default(), &[])
            .build_graph(&[a.clone()], None)
            .unwrap();
        assert_eq!(graph.all_nodes().len(), 3);
        assert_eq!(graph.depth_of(&a), Some(0));
        assert_eq!(graph.stats().edges, 3);
    }

    #[test]
    fn test_depth_limit_and_skipped_orphans() {
        let (dir, readme) = basic_tree();
        let analyzer = analyzer(&dir, ScopeOptions::default(), &[]);

        let zero = analyzer.build_graph(&[readme.clone()], Some(0)).unwrap();
        let one = analyzer.build_graph(&[readme.clone()], Some(1)).unwrap();
        let all = analyzer.build_graph(&[readme], None).unwrap();

        assert_eq!(zero.all_nodes().len(), 1);
        assert_eq!(one.all_nodes().len(), 2);
        for path in one.all_nodes() {
            assert!(all.has_node(path));
        }
        // The edge to the cut-off file is still recorded.
        let guide = dir.path().join("guide.md").canonicalize().unwrap();
        assert_eq!(zero.outgoing(zero.entrypoints()[0]), vec![guide.as_path()]);

        let report = analyzer.find_orphans(&one).unwrap();
        assert_eq!(report, OrphanReport::Skipped { depth_limit: 1 });
    }

    #[test]
    fn test_missing_target_is_dangling_edge() {
        let dir = tempdir().unwrap();
        let readme = write(&dir, "README.md", "[Missing](./missing.md)\n");
        let graph = analyzer(&dir, ScopeOptions::default(), &[])
            .build_graph(&[readme], None)
            .unwrap();

        assert_eq!(graph.all_nodes().len(), 1);
        assert_eq!(graph.dangling_edges().len(), 1);
    }

    #[test]
    fn test_excluded_target_not_added() {
        let (dir, readme) = basic_tree();
        let graph = analyzer(&dir, ScopeOptions::default(), &["guide.md"])
            .build_graph(&[readme], None)
            .unwrap();

        assert_eq!(graph.all_nodes().len(), 1);
        assert_eq!(graph.stats().dangling_edges, 1);
    }

    #[test]
    fn test_out_of_scope_recorded_but_not_expanded() {
        let dir = tempdir().unwrap();
        let index = write(&dir, "docs/index.md", "[Shared](../shared/notes.md)\n");
        write(&dir, "shared/notes.md", "[Deeper](deeper.md)\n");
        write(&dir, "shared/deeper.md", "# Deeper\n");

        let limited = analyzer(&dir, ScopeOptions::default(), &[])
            .build_graph(&[index.clone()], None)
            .unwrap();
        let notes = dir.path().join("shared/notes.md").canonicalize().unwrap();
        assert!(limited.has_node(&notes));
        assert!(!limited.is_expanded(&notes));
        assert_eq!(limited.all_nodes().len(), 2);

        let unlimited = analyzer(
            &dir,
            ScopeOptions {
                root: None,
                limit_to_scope: false,
            },
            &[],
        )
        .build_graph(&[index], None)
        .unwrap();
        assert_eq!(unlimited.all_nodes().len(), 3);
    }

    #[test]
    fn test_multi_entrypoint_scope_is_common_ancestor() {
        let dir = tempdir().unwrap();
        let a = write(&dir, "docs/api/index.md", "# API\n");
        let b = write(&dir, "docs/guide/index.md", "# Guide\n");
        write(&dir, "docs/lonely.md", "# Lonely\n");

        let analyzer = analyzer(&dir, ScopeOptions::default(), &[]);
        let graph = analyzer.build_graph(&[a, b], None).unwrap();
        let docs = dir.path().join("docs").canonicalize().unwrap();
        assert_eq!(graph.scope_root(), Some(docs.as_path()));
        assert_eq!(graph.entrypoints().len(), 2);

        let report = analyzer.find_orphans(&graph).unwrap();
        assert_eq!(report.orphans(), &[docs.join("lonely.md")]);
    }

    #[test]
    fn test_entrypoint_stays_at_depth_zero() {
        let dir = tempdir().unwrap();
        let a = write(&dir, "a.md", "[b](b.md)\n");
        let b = write(&dir, "b.md", "# B\n");

        let graph = analyzer(&dir, ScopeOptions::default(), &[])
            .build_graph(&[a, b.clone()], None)
            .unwrap();
        assert_eq!(graph.depth_of(&b), Some(0));
    }

    #[test]
    fn test_entrypoint_reached_first_still_expands_from_zero() {
        let dir = tempdir().unwrap();
        let a = write(&dir, "a.md", "[b](b.md)\n");
        let b = write(&dir, "b.md", "[c](c.md)\n");
        let c = write(&dir, "c.md", "# C\n");

        let graph = analyzer(&dir, ScopeOptions::default(), &[])
            .build_graph(&[a, b.clone()], Some(1))
            .unwrap();
        assert_eq!(graph.depth_of(&b), Some(0));
        assert_eq!(graph.depth_of(&c), Some(1));
        assert_eq!(graph.all_nodes().len(), 3);
    }

    #[test]
    fn test_reexpansion_does_not_double_count_edges() {
        let dir = tempdir().unwrap();
        let a = write(&dir, "a.md", "[b](b.md) [y](y.md)\n");
        write(&dir, "b.md", "[y](y.md)\n");
        let y = write(&dir, "y.md", "[z](z.md)\n");
        let z = write(&dir, "z.md", "# Z\n");

        let graph = analyzer(&dir, ScopeOptions::default(), &[])
            .build_graph(&[a], None)
            .unwrap();
        assert_eq!(graph.depth_of(&y), Some(2));
        assert_eq!(graph.stats().edges, 4);
        let edge = graph
            .graph
            .find_edge(graph.path_index[&y], graph.path_index[&z])
            .unwrap();
        assert_eq!(graph.graph[edge].occurrences, 1);
    }

    #[test]
    fn test_missing_entrypoint_is_error() {
        let dir = tempdir().unwrap();
        let err = analyzer(&dir, ScopeOptions::default(), &[])
            .build_graph(&[dir.path().join("nope.md")], None)
            .unwrap_err();
        assert_eq!(err.code(), "ENTRYPOINT_NOT_FOUND");

        let err = analyzer(&dir, ScopeOptions::default(), &[])
            .build_graph(&[], None)
            .unwrap_err();
        assert_eq!(err.code(), "NO_ENTRYPOINTS");
    }

    #[test]
    fn test_orphan_walk_prunes_excluded_dirs() {
        let (dir, readme) = basic_tree();
        write(&dir, "node_modules/pkg/README.md", "# pkg\n");
        write(&dir, "archive/old.md", "# old\n");

        let analyzer = analyzer(&dir, ScopeOptions::default(), &["archive/"]);
        let graph = analyzer.build_graph(&[readme], None).unwrap();
        let report = analyzer.find_orphans(&graph).unwrap();

        let orphan = dir.path().join("orphan.md").canonicalize().unwrap();
        assert_eq!(report.orphans(), &[orphan]);
    }

    #[test]
    fn test_non_markdown_links_are_not_edges() {
        let dir = tempdir().unwrap();
        let readme = write(&dir, "README.md", "[code](main.rs) ![img](logo.png) [top](#home)\n");
        write(&dir, "main.rs", "fn main() {}\n");

        let graph = analyzer(&dir, ScopeOptions::default(), &[])
            .build_graph(&[readme.clone()], None)
            .unwrap();
        assert!(graph.outgoing(&readme).is_empty());
    }
}
