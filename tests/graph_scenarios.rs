//! End-to-end scenarios: build a graph from files on disk, then validate,
//! find orphans, analyze dependencies and order.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use docgraph::{
    ContentProvider, DependencyAnalyzer, DependencyOptions, ExclusionManager, ExclusionOptions,
    GraphAnalyzer, LinkValidator, MarkdownProvider, OrphanReport, Rule, ScopeOptions, WorkerPool,
};
use tempfile::{tempdir, TempDir};

struct Fixture {
    dir: TempDir,
    provider: Arc<dyn ContentProvider>,
}

impl Fixture {
    fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempdir().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        Self {
            dir,
            provider: Arc::new(MarkdownProvider::new()),
        }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel).canonicalize().unwrap()
    }

    fn analyzer(&self, patterns: &[&str]) -> GraphAnalyzer {
        let options = ExclusionOptions {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            ..ExclusionOptions::default()
        };
        let exclusions = ExclusionManager::new(self.dir.path(), &options, &[]).unwrap();
        GraphAnalyzer::new(
            Arc::clone(&self.provider),
            Arc::new(exclusions),
            ScopeOptions::default(),
        )
    }

    fn validator(&self) -> LinkValidator {
        LinkValidator::new(Arc::clone(&self.provider), Arc::new(WorkerPool::new(4).unwrap()))
    }
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_readme_guide_setup_with_orphan() {
    let fx = Fixture::new(&[
        ("README.md", "# Home\n\nStart with the [guide](guide.md).\n"),
        ("guide.md", "# Guide\n\nThen [set up](./setup.md#install).\n"),
        ("setup.md", "# Setup\n\n## Install\n"),
        ("orphan.md", "# Nobody links here\n"),
    ]);
    let analyzer = fx.analyzer(&[]);
    let graph = analyzer.build_graph(&[fx.path("README.md")], None).unwrap();

    assert_eq!(graph.all_nodes().len(), 3);
    let report = analyzer.find_orphans(&graph).unwrap();
    assert_eq!(names(report.orphans()), vec!["orphan.md"]);
    assert!(fx.validator().validate(&graph).is_empty());

    assert_eq!(
        names(&graph.dependency_order()),
        vec!["setup.md", "guide.md", "README.md"]
    );
}

#[test]
fn test_dead_link_and_dead_anchor() {
    let fx = Fixture::new(&[
        (
            "README.md",
            "# Home\n\n## Getting Started\n\n[Missing](./missing.md)\n\
             [ok](#getting-started)\n[bad](#non-existent)\n",
        ),
    ]);
    let graph = fx
        .analyzer(&[])
        .build_graph(&[fx.path("README.md")], None)
        .unwrap();
    let findings = fx.validator().validate(&graph);

    let rules: Vec<Rule> = findings.iter().map(|f| f.rule).collect();
    assert_eq!(rules, vec![Rule::DeadLink, Rule::DeadAnchor]);
    assert_eq!(findings[0].line, 5);
    assert_eq!(findings[1].literal.as_deref(), Some("[bad](#non-existent)"));
}

#[test]
fn test_cycle_order_and_dependencies() {
    let fx = Fixture::new(&[
        ("a.md", "[b](b.md)\n"),
        ("b.md", "[c](c.md)\n"),
        ("c.md", "[a](a.md)\n"),
    ]);
    let graph = fx
        .analyzer(&[])
        .build_graph(&[fx.path("a.md")], None)
        .unwrap();

    let order = graph.dependency_order();
    assert_eq!(order.len(), 3);
    let pos = |name: &str| order.iter().position(|p| p.ends_with(name)).unwrap();
    let satisfied = [("a.md", "b.md"), ("b.md", "c.md"), ("c.md", "a.md")]
        .iter()
        .filter(|(from, to)| pos(*to) <= pos(*from))
        .count();
    assert!(satisfied >= 2);

    let report = DependencyAnalyzer::new(&graph)
        .analyze(&fx.path("a.md"), DependencyOptions::default())
        .unwrap();
    assert_eq!(report.cycles.len(), 2);
    assert_eq!(report.stats.total_outgoing, 2);
}

#[test]
fn test_depth_monotonicity() {
    let fx = Fixture::new(&[
        ("README.md", "[a](a.md) [b](nested/b.md)\n"),
        ("a.md", "[c](c.md)\n"),
        ("nested/b.md", "[d](../d.md)\n"),
        ("c.md", "[e](e.md)\n"),
        ("d.md", "# d\n"),
        ("e.md", "# e\n"),
    ]);
    let analyzer = fx.analyzer(&[]);
    let entry = [fx.path("README.md")];

    let mut previous: Vec<PathBuf> = Vec::new();
    for depth in 0..4 {
        let graph = analyzer.build_graph(&entry, Some(depth)).unwrap();
        let nodes: Vec<PathBuf> = graph.all_nodes().iter().map(|p| p.to_path_buf()).collect();
        assert!(previous.iter().all(|p| nodes.contains(p)), "depth {depth}");
        assert!(analyzer.find_orphans(&graph).unwrap().is_skipped());
        previous = nodes;
    }

    let full = analyzer.build_graph(&entry, None).unwrap();
    assert!(previous.iter().all(|p| full.has_node(p)));
    assert_eq!(full.all_nodes().len(), 6);
    assert!(matches!(
        analyzer.find_orphans(&full).unwrap(),
        OrphanReport::Checked { .. }
    ));
}

#[test]
fn test_depth_monotonicity_with_long_path_found_first() {
    // a reaches y through b and c before its direct link is followed.
    let fx = Fixture::new(&[
        ("a.md", "[b](b.md)\n[y](y.md)\n"),
        ("b.md", "[c](c.md)\n"),
        ("c.md", "[y](y.md)\n"),
        ("y.md", "[z](z.md)\n"),
        ("z.md", "# z\n"),
    ]);
    let analyzer = fx.analyzer(&[]);
    let entry = [fx.path("a.md")];

    let mut previous: Vec<PathBuf> = Vec::new();
    for depth in 0..5 {
        let graph = analyzer.build_graph(&entry, Some(depth)).unwrap();
        let nodes: Vec<PathBuf> = graph.all_nodes().iter().map(|p| p.to_path_buf()).collect();
        assert!(
            previous.iter().all(|p| nodes.contains(p)),
            "depth {depth} lost files: {:?} vs {:?}",
            names(&previous),
            names(&nodes)
        );
        previous = nodes;
    }

    let two = analyzer.build_graph(&entry, Some(2)).unwrap();
    let two_nodes: Vec<PathBuf> = two.all_nodes().iter().map(|p| p.to_path_buf()).collect();
    assert_eq!(names(&two_nodes), vec!["a.md", "b.md", "c.md", "y.md", "z.md"]);
    let three = analyzer.build_graph(&entry, Some(3)).unwrap();
    assert!(three.has_node(&fx.path("z.md")));
    assert_eq!(three.stats().edges, 5);
}

#[test]
fn test_exclusions_hide_files_from_graph_and_orphans() {
    let fx = Fixture::new(&[
        ("README.md", "[draft](drafts/wip.md)\n[keep](drafts/keep.md)\n"),
        ("drafts/wip.md", "# wip\n"),
        ("drafts/keep.md", "# keep\n"),
        ("drafts/stray.md", "# stray\n"),
        (".hidden/notes.md", "# hidden\n"),
        ("node_modules/pkg/README.md", "# pkg\n"),
    ]);

    // File-level exclusion with a later negation re-includes keep.md.
    let analyzer = fx.analyzer(&["drafts/*.md", "!drafts/keep.md"]);
    let graph = analyzer.build_graph(&[fx.path("README.md")], None).unwrap();
    assert!(graph.has_node(&fx.path("drafts/keep.md")));
    assert!(!graph.has_node(&fx.path("drafts/wip.md")));
    assert!(analyzer.find_orphans(&graph).unwrap().orphans().is_empty());

    // Directory-level exclusion cannot be undone below it.
    let analyzer = fx.analyzer(&["drafts/", "!drafts/keep.md"]);
    let graph = analyzer.build_graph(&[fx.path("README.md")], None).unwrap();
    assert!(!graph.has_node(&fx.path("drafts/keep.md")));
    assert_eq!(graph.all_nodes(), vec![fx.path("README.md").as_path()]);
}

#[test]
fn test_multiple_entrypoints_share_scope() {
    let fx = Fixture::new(&[
        ("docs/api/index.md", "[shared](../shared.md)\n"),
        ("docs/guide/index.md", "[shared](../shared.md)\n"),
        ("docs/shared.md", "# Shared\n"),
        ("docs/unused.md", "# Unused\n"),
        ("outside.md", "# Outside the scope\n"),
    ]);
    let analyzer = fx.analyzer(&[]);
    let graph = analyzer
        .build_graph(
            &[fx.path("docs/api/index.md"), fx.path("docs/guide/index.md")],
            None,
        )
        .unwrap();

    assert_eq!(graph.entrypoints().len(), 2);
    assert_eq!(graph.depth_of(&fx.path("docs/shared.md")), Some(1));
    assert_eq!(graph.incoming(&fx.path("docs/shared.md")).len(), 2);

    let report = analyzer.find_orphans(&graph).unwrap();
    assert_eq!(names(report.orphans()), vec!["unused.md"]);
}

#[test]
fn test_missing_scope_is_config_error() {
    let fx = Fixture::new(&[("README.md", "# Home\n")]);
    let analyzer = GraphAnalyzer::new(
        Arc::clone(&fx.provider),
        Arc::new(ExclusionManager::empty(fx.dir.path())),
        ScopeOptions {
            root: Some(fx.dir.path().join("no-such-dir")),
            limit_to_scope: true,
        },
    );
    let err = analyzer
        .build_graph(&[fx.path("README.md")], None)
        .unwrap_err();
    assert_eq!(err.code(), "SCOPE_NOT_FOUND");
    assert_eq!(err.exit_code(), 2);
}
