//! Incoming and outgoing dependency trees for a single file.
//!
//! Trees are built bottom-up from an existing [`DocGraph`]. An edge that
//! points back at a node already on the current path becomes a
//! [`DependencyNode::Cycle`] leaf and a [`CycleEdge`] entry instead of
//! being followed.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DocGraphError, Result};
use crate::graph::DocGraph;

/// Which trees to build and how deep.
#[derive(Debug, Clone, Copy)]
pub struct DependencyOptions {
    pub include_incoming: bool,
    pub include_outgoing: bool,
    /// Tree levels below the root; `None` = unlimited.
    pub max_depth: Option<usize>,
}

impl Default for DependencyOptions {
    fn default() -> Self {
        Self {
            include_incoming: true,
            include_outgoing: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// One node of a dependency tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DependencyNode {
    #[serde(rename_all = "camelCase")]
    Expanded {
        path: PathBuf,
        children: Vec<DependencyNode>,
        /// Neighbors exist but the depth limit stopped expansion.
        truncated: bool,
        /// Not a graph member (dangling link target).
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        missing: bool,
    },
    /// Edge back to an ancestor on the current path.
    #[serde(rename_all = "camelCase")]
    Cycle { cycle_back_to: PathBuf },
}

impl DependencyNode {
    pub fn path(&self) -> &Path {
        match self {
            DependencyNode::Expanded { path, .. } => path,
            DependencyNode::Cycle { cycle_back_to } => cycle_back_to,
        }
    }

    pub fn children(&self) -> &[DependencyNode] {
        match self {
            DependencyNode::Expanded { children, .. } => children,
            DependencyNode::Cycle { .. } => &[],
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, DependencyNode::Cycle { .. })
    }
}

/// Edge that closes a cycle, in tree direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CycleEdge {
    pub from: PathBuf,
    pub to: PathBuf,
    pub direction: Direction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyStats {
    pub direct_incoming: usize,
    pub total_incoming: usize,
    pub direct_outgoing: usize,
    pub total_outgoing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming: Option<DependencyNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<DependencyNode>,
    pub cycles: Vec<CycleEdge>,
    pub stats: DependencyStats,
}

pub struct DependencyAnalyzer<'g> {
    graph: &'g DocGraph,
}

/// Current ancestor path plus cycles found so far, for one direction.
struct TreeContext<'g> {
    direction: Direction,
    max_depth: Option<usize>,
    ancestors: Vec<&'g Path>,
    cycles: BTreeSet<CycleEdge>,
}

impl<'g> DependencyAnalyzer<'g> {
    pub fn new(graph: &'g DocGraph) -> Self {
        Self { graph }
    }

    /// Build the requested trees for `file`, which must be a graph member.
    pub fn analyze(&self, file: &Path, options: DependencyOptions) -> Result<DependencyReport> {
        let file = self.resolve_member(file)?;

        let mut cycles = BTreeSet::new();
        let mut build = |direction| {
            let (tree, found) = self.tree(file, direction, options.max_depth);
            cycles.extend(found);
            tree
        };
        let incoming = options
            .include_incoming
            .then(|| build(Direction::Incoming));
        let outgoing = options
            .include_outgoing
            .then(|| build(Direction::Outgoing));

        let stats = DependencyStats {
            direct_incoming: self.neighbors(file, Direction::Incoming).len(),
            total_incoming: self.reachable(file, Direction::Incoming),
            direct_outgoing: self.neighbors(file, Direction::Outgoing).len(),
            total_outgoing: self.reachable(file, Direction::Outgoing),
        };

        debug!(
            file = %file.display(),
            cycles = cycles.len(),
            direct_in = stats.direct_incoming,
            direct_out = stats.direct_outgoing,
            "dependencies analyzed"
        );

        Ok(DependencyReport {
            file: file.to_path_buf(),
            incoming,
            outgoing,
            cycles: cycles.into_iter().collect(),
            stats,
        })
    }

    /// Accept the path as given or canonicalized.
    fn resolve_member(&self, file: &Path) -> Result<&'g Path> {
        let canonical = file.canonicalize().ok();
        [Some(file.to_path_buf()), canonical]
            .into_iter()
            .flatten()
            .find_map(|candidate| {
                self.graph
                    .all_nodes()
                    .into_iter()
                    .find(|member| *member == candidate.as_path())
            })
            .ok_or_else(|| DocGraphError::FileNotInGraph(file.to_path_buf()))
    }

    fn tree(
        &self,
        root: &'g Path,
        direction: Direction,
        max_depth: Option<usize>,
    ) -> (DependencyNode, BTreeSet<CycleEdge>) {
        let mut ctx = TreeContext {
            direction,
            max_depth,
            ancestors: Vec::new(),
            cycles: BTreeSet::new(),
        };
        let tree = self.expand(root, 0, &mut ctx);
        (tree, ctx.cycles)
    }

    fn expand(&self, path: &'g Path, depth: usize, ctx: &mut TreeContext<'g>) -> DependencyNode {
        let neighbors = self.neighbors(path, ctx.direction);
        let missing = !self.graph.has_node(path);

        if ctx.max_depth.is_some_and(|max| depth >= max) {
            return DependencyNode::Expanded {
                path: path.to_path_buf(),
                children: Vec::new(),
                truncated: !neighbors.is_empty(),
                missing,
            };
        }

        ctx.ancestors.push(path);
        let children = neighbors
            .into_iter()
            .map(|next| {
                if ctx.ancestors.contains(&next) {
                    ctx.cycles.insert(CycleEdge {
                        from: path.to_path_buf(),
                        to: next.to_path_buf(),
                        direction: ctx.direction,
                    });
                    DependencyNode::Cycle {
                        cycle_back_to: next.to_path_buf(),
                    }
                } else {
                    self.expand(next, depth + 1, ctx)
                }
            })
            .collect();
        ctx.ancestors.pop();

        DependencyNode::Expanded {
            path: path.to_path_buf(),
            children,
            truncated: false,
            missing,
        }
    }

    fn neighbors(&self, path: &Path, direction: Direction) -> Vec<&'g Path> {
        match direction {
            Direction::Incoming => self.graph.incoming(path),
            Direction::Outgoing => self.graph.outgoing(path),
        }
    }

    /// Distinct files transitively reachable from `file`, excluding itself.
    fn reachable(&self, file: &'g Path, direction: Direction) -> usize {
        let mut seen: HashSet<&Path> = HashSet::from([file]);
        let mut queue: VecDeque<&Path> = VecDeque::from([file]);
        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current, direction) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen.len() - 1
    }
}
