//
//  engine.rs
//  docgraph
//

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::types::*;

/// The documentation graph: files are nodes, links are edges.
///
/// Built once per invocation by the graph analyzer and read-only afterwards.
#[derive(Debug, Clone)]
pub struct DocGraph {
    /// Directed graph over every known path, members and referenced slots.
    pub(crate) graph: DiGraph<NodeData, EdgeData>,
    /// Index: path -> node index.
    pub(crate) path_index: HashMap<PathBuf, NodeIndex>,
    /// Depth bound the graph was built with (`None` = unlimited).
    pub(crate) depth_limit: Option<usize>,
    /// Scope directory the graph was built with.
    pub(crate) scope_root: Option<PathBuf>,
}

impl DocGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            path_index: HashMap::new(),
            depth_limit: None,
            scope_root: None,
        }
    }

    pub(crate) fn set_build_info(&mut self, depth_limit: Option<usize>, scope_root: PathBuf) {
        self.depth_limit = depth_limit;
        self.scope_root = Some(scope_root);
    }

    /// Depth bound used when building, `None` when unlimited.
    pub fn depth_limit(&self) -> Option<usize> {
        self.depth_limit
    }

    pub fn scope_root(&self) -> Option<&Path> {
        self.scope_root.as_deref()
    }

    // ─── Node Operations ────────────────────────────────────────

    /// Get or create the slot for a path without making it a member.
    fn slot(&mut self, path: &Path) -> NodeIndex {
        if let Some(&idx) = self.path_index.get(path) {
            return idx;
        }
        let idx = self
            .graph
            .add_node(NodeData::new_referenced(path.to_path_buf()));
        self.path_index.insert(path.to_path_buf(), idx);
        idx
    }

    /// Add a file as a graph member. Idempotent: an existing member keeps
    /// the depth it was first added with.
    pub fn add_node(&mut self, path: impl AsRef<Path>, depth: usize) -> NodeIndex {
        let path = path.as_ref();
        let Some(&idx) = self.path_index.get(path) else {
            let idx = self
                .graph
                .add_node(NodeData::new_member(path.to_path_buf(), depth));
            self.path_index.insert(path.to_path_buf(), idx);
            return idx;
        };
        // A referenced slot is promoted; an existing member is left alone.
        if let Some(node) = self.graph.node_weight_mut(idx) {
            if node.depth.is_none() {
                node.depth = Some(depth);
            }
        }
        idx
    }

    /// Record that the file's outgoing links were followed.
    pub(crate) fn mark_expanded(&mut self, path: &Path) {
        if let Some(&idx) = self.path_index.get(path) {
            if let Some(node) = self.graph.node_weight_mut(idx) {
                node.expanded = true;
            }
        }
    }

    // ─── Edge Operations ────────────────────────────────────────

    /// Record a link from `from` to `to`. Neither end needs to be a member;
    /// repeated links between the same pair share one edge.
    pub fn add_edge(&mut self, from: impl AsRef<Path>, to: impl AsRef<Path>) {
        let from = self.slot(from.as_ref());
        let to = self.slot(to.as_ref());
        match self.graph.find_edge(from, to) {
            Some(edge) => {
                if let Some(data) = self.graph.edge_weight_mut(edge) {
                    data.occurrences += 1;
                }
            }
            None => {
                self.graph.add_edge(from, to, EdgeData::new());
            }
        }
    }

    // ─── Internal Helpers ───────────────────────────────────────

    pub(crate) fn node(&self, path: &Path) -> Option<&NodeData> {
        self.path_index
            .get(path)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    pub(crate) fn is_member(&self, idx: NodeIndex) -> bool {
        self.graph.node_weight(idx).is_some_and(|n| n.is_member())
    }
}

impl Default for DocGraph {
    fn default() -> Self {
        Self::new()
    }
}
