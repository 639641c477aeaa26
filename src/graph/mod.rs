//! Documentation graph: files are nodes, resolved links are edges.
//!
//! [`GraphAnalyzer`] walks links from the entrypoints and produces a
//! [`DocGraph`]; queries and dependency ordering live on the graph itself.

pub mod builder;
pub mod engine;
pub mod order;
pub mod query;
pub mod types;

pub use builder::{GraphAnalyzer, ScopeOptions};
pub use engine::DocGraph;
pub use types::{DocNode, EdgeData, GraphStats, NodeData, OrphanReport};
