//
//  order.rs
//  docgraph
//

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::engine::DocGraph;

impl DocGraph {
    /// Linearize members so that a file's link targets come before the file.
    ///
    /// Post-order DFS from the entrypoints in lexicographic order, then from
    /// every member not reached that way. Cycles are broken at the edge that
    /// closes them, so each member appears exactly once.
    pub fn dependency_order(&self) -> Vec<PathBuf> {
        let mut visited: HashSet<&Path> = HashSet::new();
        let mut order = Vec::with_capacity(self.graph.node_count());

        for entry in self.entrypoints() {
            self.emit_post_order(entry, &mut visited, &mut order);
        }
        for path in self.all_nodes() {
            self.emit_post_order(path, &mut visited, &mut order);
        }

        order
    }

    /// Members sorted by path.
    pub fn alphabetical_order(&self) -> Vec<PathBuf> {
        self.all_nodes().into_iter().map(Path::to_path_buf).collect()
    }

    fn emit_post_order<'g>(
        &'g self,
        path: &'g Path,
        visited: &mut HashSet<&'g Path>,
        order: &mut Vec<PathBuf>,
    ) {
        // Inserted before recursing: in-progress nodes count as visited.
        if !visited.insert(path) {
            return;
        }
        for target in self.outgoing(path) {
            if self.has_node(target) {
                self.emit_post_order(target, visited, order);
            }
        }
        order.push(path.to_path_buf());
    }
}
