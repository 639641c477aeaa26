//
//  query.rs
//  docgraph
//

use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::path::Path;

use super::engine::DocGraph;
use super::types::*;

impl DocGraph {
    /// Whether `path` is a graph member (visited and not excluded).
    pub fn has_node(&self, path: &Path) -> bool {
        self.node(path).is_some_and(|n| n.is_member())
    }

    /// All member paths, sorted.
    pub fn all_nodes(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = self
            .graph
            .node_weights()
            .filter(|n| n.is_member())
            .map(|n| n.path.as_path())
            .collect();
        paths.sort();
        paths
    }

    /// All members with their discovery depth, sorted by path.
    pub fn nodes(&self) -> Vec<DocNode> {
        let mut nodes: Vec<DocNode> = self
            .graph
            .node_weights()
            .filter_map(|n| {
                n.depth.map(|depth| DocNode {
                    path: n.path.clone(),
                    depth,
                })
            })
            .collect();
        nodes.sort_by(|a, b| a.path.cmp(&b.path));
        nodes
    }

    /// Depth-0 members, sorted.
    pub fn entrypoints(&self) -> Vec<&Path> {
        self.all_nodes()
            .into_iter()
            .filter(|p| self.depth_of(p) == Some(0))
            .collect()
    }

    /// Discovery depth of a member.
    pub fn depth_of(&self, path: &Path) -> Option<usize> {
        self.node(path).and_then(|n| n.depth)
    }

    /// Whether the member's links were followed during the build.
    pub fn is_expanded(&self, path: &Path) -> bool {
        self.node(path).is_some_and(|n| n.expanded)
    }

    /// Link targets of `path`, members or not, sorted.
    pub fn outgoing(&self, path: &Path) -> Vec<&Path> {
        self.neighbors(path, Direction::Outgoing)
    }

    /// Files linking to `path`, sorted.
    pub fn incoming(&self, path: &Path) -> Vec<&Path> {
        self.neighbors(path, Direction::Incoming)
    }

    fn neighbors(&self, path: &Path, direction: Direction) -> Vec<&Path> {
        let Some(&idx) = self.path_index.get(path) else {
            return Vec::new();
        };
        let mut paths: Vec<&Path> = self
            .graph
            .edges_directed(idx, direction)
            .map(|edge| match direction {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            })
            .filter_map(|other| self.graph.node_weight(other))
            .map(|n| n.path.as_path())
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// Edges whose target is not a member, as (from, to), sorted.
    pub fn dangling_edges(&self) -> Vec<(&Path, &Path)> {
        let mut edges: Vec<(&Path, &Path)> = self
            .graph
            .edge_references()
            .filter(|edge| !self.is_member(edge.target()))
            .map(|edge| {
                (
                    self.graph[edge.source()].path.as_path(),
                    self.graph[edge.target()].path.as_path(),
                )
            })
            .collect();
        edges.sort();
        edges
    }

    /// Get graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();

        for node in self.graph.node_weights() {
            let Some(depth) = node.depth else { continue };
            stats.nodes += 1;
            if depth == 0 {
                stats.entrypoints += 1;
            }
            if !node.expanded {
                stats.unexpanded += 1;
            }
            stats.max_depth = stats.max_depth.max(depth);
        }

        stats.edges = self.graph.edge_count();
        stats.dangling_edges = self
            .graph
            .edge_references()
            .filter(|edge| !self.is_member(edge.target()))
            .count();

        stats
    }
}
