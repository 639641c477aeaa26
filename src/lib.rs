//! # docgraph
//!
//! Structural validation for trees of interlinked markdown files.
//!
//! Files are nodes and relative markdown links are edges. From one or more
//! entrypoints docgraph builds a [`DocGraph`], then answers:
//!
//! - **Orphans**: markdown files under the scope that nothing reaches
//! - **Dead links and anchors**: link targets or `#headings` that don't exist
//! - **Dependencies**: who a file links to and who links to it, with cycles
//! - **Order**: a linearization where linked files come before linkers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use docgraph::{
//!     ContentProvider, ExclusionManager, ExclusionOptions, GraphAnalyzer, LinkValidator,
//!     MarkdownProvider, ScopeOptions, WorkerPool,
//! };
//!
//! let provider: Arc<dyn ContentProvider> = Arc::new(MarkdownProvider::new());
//! let exclusions = ExclusionManager::new(
//!     std::path::Path::new("docs"),
//!     &ExclusionOptions::default(),
//!     &[],
//! ).unwrap();
//! let analyzer = GraphAnalyzer::new(
//!     Arc::clone(&provider),
//!     Arc::new(exclusions),
//!     ScopeOptions::default(),
//! );
//!
//! let graph = analyzer.build_graph(&[PathBuf::from("docs/README.md")], None).unwrap();
//! let orphans = analyzer.find_orphans(&graph).unwrap();
//! let findings = LinkValidator::new(provider, Arc::new(WorkerPool::new(10).unwrap()))
//!     .validate(&graph);
//!
//! println!("{} files, {} orphans, {} findings",
//!     graph.all_nodes().len(), orphans.orphans().len(), findings.len());
//! ```

pub mod cli;
pub mod config;
pub mod deps;
pub mod error;
pub mod exclude;
pub mod graph;
pub mod parser;
pub mod paths;
pub mod pool;
pub mod report;
pub mod validate;

// Re-exports for convenience
pub use config::{DocGraphConfig, Settings};
pub use deps::{DependencyAnalyzer, DependencyNode, DependencyOptions, DependencyReport};
pub use error::{DocGraphError, Result};
pub use exclude::{ExclusionManager, ExclusionOptions};
pub use graph::{DocGraph, GraphAnalyzer, OrphanReport, ScopeOptions};
pub use parser::{ContentProvider, MarkdownProvider};
pub use pool::WorkerPool;
pub use validate::{slugify, ExternalLinkPolicy, Finding, LinkValidator, Rule, Severity};
