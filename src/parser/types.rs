//
//  types.rs
//  docgraph
//

use serde::Serialize;
use std::path::PathBuf;

use super::frontmatter::Frontmatter;

/// How a link target should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    /// `#slug` within the same file.
    Anchor,
    /// Relative or root-relative file, possibly with `#anchor`.
    File,
    /// `http://` or `https://`.
    External,
    /// Any other scheme (`mailto:`, `tel:`, ...). Never checked.
    Other,
}

/// A link as written in a markdown file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedLink {
    /// Destination as written (`./guide.md#setup`).
    pub target: String,
    /// 1-based source position of the link.
    pub line: usize,
    pub column: usize,
    /// Column just past the link, when it ends on the same line.
    pub end_column: Option<usize>,
    /// Literal source text, e.g. `[Guide](./guide.md)`.
    pub literal: String,
    pub is_image: bool,
}

impl ExtractedLink {
    pub fn kind(&self) -> LinkKind {
        classify(&self.target)
    }

    /// Split a file link into its path and anchor parts. Query strings are
    /// dropped; `%20` is decoded.
    pub fn split_target(&self) -> (String, Option<String>) {
        let (path, anchor) = match self.target.split_once('#') {
            Some((p, a)) => (p, Some(a.to_string()).filter(|a| !a.is_empty())),
            None => (self.target.as_str(), None),
        };
        let path = path.split('?').next().unwrap_or(path);
        (path.replace("%20", " "), anchor)
    }
}

/// A heading and the anchors it provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedHeading {
    pub text: String,
    pub level: u8,
    pub line: usize,
    pub column: usize,
    pub slug: String,
    /// Explicit `{#id}` attribute, if any.
    pub id: Option<String>,
}

/// Everything the engine needs to know about one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileExtractions {
    pub file_path: PathBuf,
    pub links: Vec<ExtractedLink>,
    pub headings: Vec<ExtractedHeading>,
    /// Anchors this file answers to: slugs, duplicate-suffixed slugs and
    /// explicit ids.
    pub anchors: Vec<String>,
    #[serde(skip)]
    pub frontmatter: Option<Frontmatter>,
}

impl FileExtractions {
    pub fn has_anchor(&self, anchor: &str) -> bool {
        self.anchors.iter().any(|a| a == anchor)
    }
}

/// Classify a raw link destination.
pub fn classify(target: &str) -> LinkKind {
    let lower = target.trim().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return LinkKind::External;
    }
    if lower.starts_with('#') {
        return LinkKind::Anchor;
    }
    if lower.starts_with("//") || has_scheme(&lower) {
        return LinkKind::Other;
    }
    LinkKind::File
}

/// `scheme:` prefix per RFC 3986 (letter, then letters/digits/`+-.`).
/// Single letters are treated as Windows drive letters, not schemes.
fn has_scheme(target: &str) -> bool {
    match target.split_once(':') {
        Some((scheme, _)) => {
            scheme.len() > 1
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
