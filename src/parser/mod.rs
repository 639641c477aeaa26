//! Content provider: turns markdown files into links, headings and
//! frontmatter.
//!
//! The graph engine only sees [`ContentProvider`]; the default
//! implementation is [`MarkdownProvider`], which reads from disk, parses
//! with `pulldown-cmark` and memoizes per canonical path.

pub mod extractor;
pub mod frontmatter;
pub mod types;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::{DocGraphError, Result};

pub use extractor::extract_markdown;
pub use frontmatter::{parse_frontmatter, Frontmatter};
pub use types::{ExtractedHeading, ExtractedLink, FileExtractions, LinkKind};

/// File extensions treated as markdown documents.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdx"];

/// Check whether a path looks like a markdown document.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|m| m.eq_ignore_ascii_case(ext))
        })
}

/// Source of per-file extraction results.
///
/// Implementations must be safe to call from several worker threads at once.
pub trait ContentProvider: Send + Sync {
    fn extract(&self, path: &Path) -> Result<Arc<FileExtractions>>;
}

/// Reads markdown from disk and caches extractions for one invocation.
///
/// The cache is write-once per path. Two workers racing on the same path
/// may both parse it; the second insert is dropped.
#[derive(Default)]
pub struct MarkdownProvider {
    cache: RwLock<HashMap<PathBuf, Arc<FileExtractions>>>,
}

impl MarkdownProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached files.
    pub fn cached(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    fn cached_entry(&self, path: &Path) -> Option<Arc<FileExtractions>> {
        self.cache.read().ok()?.get(path).cloned()
    }
}

impl ContentProvider for MarkdownProvider {
    fn extract(&self, path: &Path) -> Result<Arc<FileExtractions>> {
        if let Some(hit) = self.cached_entry(path) {
            return Ok(hit);
        }

        let source = fs::read_to_string(path).map_err(|e| DocGraphError::io(path, e))?;
        let extraction = Arc::new(extract_markdown(path, &source));

        if let Ok(mut cache) = self.cache.write() {
            let entry = cache
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::clone(&extraction));
            return Ok(Arc::clone(entry));
        }
        Ok(extraction)
    }
}
