//! Layered gitignore-style exclusion.
//!
//! Layers, lowest precedence first:
//! built-in defaults, `.gitignore` (opt-in), the ignore file
//! (`.docgraphignore`), project config patterns, CLI patterns.
//!
//! Each layer is one compiled [`Gitignore`] matcher. A path's fate is decided
//! by the highest layer with a matching pattern, so `!keep.md` on the CLI
//! re-includes a file excluded by the project config. A directory excluded
//! by any layer hides its whole subtree; negating a file below it has no
//! effect. Exclude `dir/*.md` instead of `dir/` when that matters.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::Match;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DocGraphError, Result};

/// Directories skipped unless defaults are disabled.
const DEFAULT_PATTERNS: &[&str] = &["node_modules/"];

/// Hidden directories (`.git/`, `.cache/`, ...).
const HIDDEN_DIR_PATTERN: &str = ".*/";

/// Where a pattern layer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayerSource {
    Defaults,
    VcsIgnore,
    IgnoreFile,
    Project,
    Cli,
}

/// Pattern sources, as resolved from configuration.
#[derive(Debug, Clone)]
pub struct ExclusionOptions {
    /// Project config patterns.
    pub patterns: Vec<String>,
    /// Ignore file name, relative to the root.
    pub ignore_file: Option<String>,
    pub use_gitignore: bool,
    pub exclude_hidden: bool,
    pub use_defaults: bool,
}

impl Default for ExclusionOptions {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            ignore_file: Some(".docgraphignore".to_string()),
            use_gitignore: false,
            exclude_hidden: true,
            use_defaults: true,
        }
    }
}

#[derive(Debug, Clone)]
struct PatternLayer {
    source: LayerSource,
    matcher: Gitignore,
}

/// Immutable exclusion matcher built once per invocation.
#[derive(Debug, Clone)]
pub struct ExclusionManager {
    root: PathBuf,
    /// Ordered lowest to highest precedence.
    layers: Vec<PatternLayer>,
}

impl ExclusionManager {
    /// A manager that excludes nothing.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            layers: Vec::new(),
        }
    }

    /// Build all layers rooted at `root`.
    pub fn new(root: &Path, options: &ExclusionOptions, cli_patterns: &[String]) -> Result<Self> {
        let root = root
            .canonicalize()
            .map_err(|e| DocGraphError::io(root, e))?;
        let mut layers = Vec::new();

        let mut defaults: Vec<String> = Vec::new();
        if options.use_defaults {
            defaults.extend(DEFAULT_PATTERNS.iter().map(|p| p.to_string()));
        }
        if options.exclude_hidden {
            defaults.push(HIDDEN_DIR_PATTERN.to_string());
        }
        layers.extend(compile_lines(&root, LayerSource::Defaults, &defaults)?);

        if options.use_gitignore {
            layers.extend(compile_file(&root, LayerSource::VcsIgnore, &root.join(".gitignore"))?);
        }
        if let Some(name) = &options.ignore_file {
            layers.extend(compile_file(&root, LayerSource::IgnoreFile, &root.join(name))?);
        }
        layers.extend(compile_lines(&root, LayerSource::Project, &options.patterns)?);
        layers.extend(compile_lines(&root, LayerSource::Cli, cli_patterns)?);

        debug!(
            root = %root.display(),
            layers = ?layers.iter().map(|l| l.source).collect::<Vec<_>>(),
            "exclusion layers compiled"
        );

        Ok(Self { root, layers })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sources of the active layers, lowest precedence first.
    pub fn layer_sources(&self) -> Vec<LayerSource> {
        self.layers.iter().map(|l| l.source).collect()
    }

    /// Whether a directory (and therefore its whole subtree) is excluded.
    /// Used to prune walks before descending.
    pub fn should_exclude_directory(&self, path: &Path) -> bool {
        match self.relative(path) {
            Some(rel) if rel.as_os_str().is_empty() => false,
            Some(rel) => self.ancestor_excluded(rel) || self.decide(rel, true),
            None => self.decide(basename(path), true),
        }
    }

    /// Whether a file or directory is excluded, honoring excluded ancestors.
    pub fn should_exclude(&self, path: &Path) -> bool {
        let is_dir = path.is_dir();
        match self.relative(path) {
            Some(rel) if rel.as_os_str().is_empty() => false,
            Some(rel) => self.ancestor_excluded(rel) || self.decide(rel, is_dir),
            None => self.decide(basename(path), is_dir),
        }
    }

    fn relative<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(&self.root).ok()
    }

    /// Top-down check of every ancestor directory strictly between the root
    /// and `rel`.
    fn ancestor_excluded(&self, rel: &Path) -> bool {
        let mut ancestors: Vec<&Path> = rel
            .ancestors()
            .skip(1)
            .filter(|a| !a.as_os_str().is_empty())
            .collect();
        ancestors.reverse();
        ancestors.into_iter().any(|dir| self.decide(dir, true))
    }

    /// Last matching layer wins.
    fn decide(&self, rel: &Path, is_dir: bool) -> bool {
        let mut excluded = false;
        for layer in &self.layers {
            match layer.matcher.matched(rel, is_dir) {
                Match::Ignore(_) => excluded = true,
                Match::Whitelist(_) => excluded = false,
                Match::None => {}
            }
        }
        excluded
    }
}

fn basename(path: &Path) -> &Path {
    path.file_name().map(Path::new).unwrap_or(path)
}

fn compile_lines(root: &Path, source: LayerSource, lines: &[String]) -> Result<Option<PatternLayer>> {
    if lines.is_empty() {
        return Ok(None);
    }
    let mut builder = GitignoreBuilder::new(root);
    for line in lines {
        builder
            .add_line(None, line)
            .map_err(|e| DocGraphError::InvalidPattern {
                pattern: line.clone(),
                message: e.to_string(),
            })?;
    }
    let matcher = builder.build().map_err(|e| DocGraphError::InvalidPattern {
        pattern: lines.join(", "),
        message: e.to_string(),
    })?;
    Ok(Some(PatternLayer { source, matcher }))
}

fn compile_file(root: &Path, source: LayerSource, file: &Path) -> Result<Option<PatternLayer>> {
    if !file.is_file() {
        return Ok(None);
    }
    let mut builder = GitignoreBuilder::new(root);
    if let Some(e) = builder.add(file) {
        return Err(DocGraphError::InvalidPattern {
            pattern: file.display().to_string(),
            message: e.to_string(),
        });
    }
    let matcher = builder.build().map_err(|e| DocGraphError::InvalidPattern {
        pattern: file.display().to_string(),
        message: e.to_string(),
    })?;
    debug!(file = %file.display(), ?source, "loaded ignore file");
    Ok(Some(PatternLayer { source, matcher }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn setup() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        for sub in ["drafts", "node_modules/pkg", ".cache", "docs"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        for file in [
            "drafts/keep.md",
            "drafts/wip.md",
            "node_modules/pkg/README.md",
            ".cache/notes.md",
            "docs/guide.md",
        ] {
            fs::write(dir.path().join(file), "# x\n").unwrap();
        }
        dir
    }

    #[test]
    fn test_defaults_exclude_node_modules_and_hidden() {
        let dir = setup();
        let mgr = ExclusionManager::new(dir.path(), &ExclusionOptions::default(), &[]).unwrap();
        let root = mgr.root().to_path_buf();

        assert!(mgr.should_exclude_directory(&root.join("node_modules")));
        assert!(mgr.should_exclude(&root.join("node_modules/pkg/README.md")));
        assert!(mgr.should_exclude(&root.join(".cache/notes.md")));
        assert!(!mgr.should_exclude(&root.join("docs/guide.md")));
    }

    #[test]
    fn test_defaults_can_be_disabled() {
        let dir = setup();
        let options = ExclusionOptions {
            exclude_hidden: false,
            use_defaults: false,
            ..Default::default()
        };
        let mgr = ExclusionManager::new(dir.path(), &options, &[]).unwrap();
        let root = mgr.root().to_path_buf();

        assert!(!mgr.should_exclude(&root.join(".cache/notes.md")));
        assert!(!mgr.should_exclude(&root.join("node_modules/pkg/README.md")));
        assert!(mgr.layer_sources().is_empty());
    }

    #[test]
    fn test_cli_negation_overrides_project_file_pattern() {
        let dir = setup();
        let options = ExclusionOptions {
            patterns: patterns(&["drafts/*.md"]),
            ..Default::default()
        };
        let mgr =
            ExclusionManager::new(dir.path(), &options, &patterns(&["!drafts/keep.md"])).unwrap();
        let root = mgr.root().to_path_buf();

        assert!(mgr.should_exclude(&root.join("drafts/wip.md")));
        assert!(!mgr.should_exclude(&root.join("drafts/keep.md")));
    }

    #[test]
    fn test_directory_exclusion_cannot_be_negated_below() {
        let dir = setup();
        let options = ExclusionOptions {
            patterns: patterns(&["drafts/"]),
            ..Default::default()
        };
        let mgr =
            ExclusionManager::new(dir.path(), &options, &patterns(&["!drafts/keep.md"])).unwrap();
        let root = mgr.root().to_path_buf();

        assert!(mgr.should_exclude_directory(&root.join("drafts")));
        assert!(mgr.should_exclude(&root.join("drafts/keep.md")));
    }

    #[test]
    fn test_ignore_file_layer_below_project_layer() {
        let dir = setup();
        fs::write(dir.path().join(".docgraphignore"), "docs/*.md\n").unwrap();
        let mgr = ExclusionManager::new(dir.path(), &ExclusionOptions::default(), &[]).unwrap();
        let root = mgr.root().to_path_buf();
        assert!(mgr.should_exclude(&root.join("docs/guide.md")));

        let options = ExclusionOptions {
            patterns: patterns(&["!docs/guide.md"]),
            ..Default::default()
        };
        let mgr = ExclusionManager::new(dir.path(), &options, &[]).unwrap();
        assert!(!mgr.should_exclude(&root.join("docs/guide.md")));
        assert_eq!(
            mgr.layer_sources(),
            vec![LayerSource::Defaults, LayerSource::IgnoreFile, LayerSource::Project]
        );
    }

    #[test]
    fn test_gitignore_only_when_enabled() {
        let dir = setup();
        fs::write(dir.path().join(".gitignore"), "docs/\n").unwrap();

        let mgr = ExclusionManager::new(dir.path(), &ExclusionOptions::default(), &[]).unwrap();
        let root = mgr.root().to_path_buf();
        assert!(!mgr.should_exclude(&root.join("docs/guide.md")));

        let options = ExclusionOptions {
            use_gitignore: true,
            ..Default::default()
        };
        let mgr = ExclusionManager::new(dir.path(), &options, &[]).unwrap();
        assert!(mgr.should_exclude(&root.join("docs/guide.md")));
    }

    #[test]
    fn test_glob_features() {
        let dir = setup();
        let cli = patterns(&["**/w?p.md", "docs/[gh]uide.md"]);
        let mgr = ExclusionManager::new(dir.path(), &ExclusionOptions::default(), &cli).unwrap();
        let root = mgr.root().to_path_buf();

        assert!(mgr.should_exclude(&root.join("drafts/wip.md")));
        assert!(mgr.should_exclude(&root.join("docs/guide.md")));
        assert!(!mgr.should_exclude(&root.join("drafts/keep.md")));
    }

    #[test]
    fn test_root_itself_is_never_excluded() {
        let dir = setup();
        let mgr = ExclusionManager::new(dir.path(), &ExclusionOptions::default(), &[]).unwrap();
        let root = mgr.root().to_path_buf();
        assert!(!mgr.should_exclude_directory(&root));
        assert!(!mgr.should_exclude(&root));
    }

    #[test]
    fn test_empty_manager_excludes_nothing() {
        let mgr = ExclusionManager::empty("/docs");
        assert!(!mgr.should_exclude(Path::new("/docs/.hidden/a.md")));
    }
}
