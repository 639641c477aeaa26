//
//  types.rs
//  docgraph
//

use serde::Serialize;
use std::path::PathBuf;

/// Data stored for every path the graph knows about.
///
/// A path is a graph member only when it has a depth. Paths that only ever
/// appear as edge targets (missing, excluded or never reached files) are
/// kept as referenced slots so dangling edges stay queryable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub path: PathBuf,
    pub depth: Option<usize>,
    /// Outgoing links were followed.
    pub expanded: bool,
}

impl NodeData {
    pub fn new_member(path: PathBuf, depth: usize) -> Self {
        Self {
            path,
            depth: Some(depth),
            expanded: false,
        }
    }

    pub fn new_referenced(path: PathBuf) -> Self {
        Self {
            path,
            depth: None,
            expanded: false,
        }
    }

    pub fn is_member(&self) -> bool {
        self.depth.is_some()
    }
}

/// A directed link relationship between two files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeData {
    /// How many links in the source point at the target.
    pub occurrences: usize,
}

impl EdgeData {
    pub fn new() -> Self {
        Self { occurrences: 1 }
    }
}

impl Default for EdgeData {
    fn default() -> Self {
        Self::new()
    }
}

/// A graph member as returned by queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocNode {
    pub path: PathBuf,
    pub depth: usize,
}

/// Graph statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub nodes: usize,
    pub entrypoints: usize,
    pub edges: usize,
    /// Edges whose target is not a graph member.
    pub dangling_edges: usize,
    /// Members recorded but not expanded (out of scope or unreadable).
    pub unexpanded: usize,
    pub max_depth: usize,
}

/// Result of orphan detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum OrphanReport {
    /// Full filesystem walk done; files below were never reached.
    #[serde(rename_all = "camelCase")]
    Checked { orphans: Vec<PathBuf> },
    /// Graph was built with a depth limit, so unreached files may just be
    /// deeper than the limit. Nothing is reported.
    #[serde(rename_all = "camelCase")]
    Skipped { depth_limit: usize },
}

impl OrphanReport {
    pub fn orphans(&self) -> &[PathBuf] {
        match self {
            OrphanReport::Checked { orphans } => orphans,
            OrphanReport::Skipped { .. } => &[],
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, OrphanReport::Skipped { .. })
    }
}
