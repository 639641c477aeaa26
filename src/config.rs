//! Configuration loading and merging.
//!
//! `.docgraph.toml` holds project defaults. CLI flags are applied on top
//! as overrides, then the whole thing is resolved into typed [`Settings`]
//! before any graph work starts, so bad values fail fast.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DocGraphError, Result};
use crate::exclude::ExclusionOptions;
use crate::validate::{ExternalLinkPolicy, RuleSeverities, RuleSeverity};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".docgraph.toml";

/// Top-level docgraph configuration, as written in `.docgraph.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocGraphConfig {
    /// Files treated as depth-0 roots.
    #[serde(default)]
    pub entrypoints: Vec<PathBuf>,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub exclude: ExcludeConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    /// Upper bound on parallel file reads during validation.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

/// Either a plain integer or a keyword such as `"unlimited"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DepthSetting {
    Limit(usize),
    Keyword(String),
}

/// Traversal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub max_depth: Option<DepthSetting>,
    /// Scope root; derived from the entrypoints when unset.
    #[serde(default)]
    pub scope: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub limit_to_scope: bool,
}

/// Link checking policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    #[serde(default = "default_external_policy")]
    pub external: String,
}

/// Exclusion pattern sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludeConfig {
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
    #[serde(default)]
    pub use_gitignore: bool,
    #[serde(default = "default_true")]
    pub exclude_hidden: bool,
    /// Built-in defaults such as `node_modules/`.
    #[serde(default = "default_true")]
    pub defaults: bool,
}

/// Per-rule severities (`error`, `warn` or `off`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "orphan-files", default = "default_error")]
    pub orphan_files: String,
    #[serde(rename = "dead-link", default = "default_error")]
    pub dead_link: String,
    #[serde(rename = "dead-anchor", default = "default_error")]
    pub dead_anchor: String,
}

fn default_true() -> bool {
    true
}

fn default_max_concurrency() -> usize {
    10
}

fn default_external_policy() -> String {
    "ignore".to_string()
}

fn default_ignore_file() -> String {
    ".docgraphignore".to_string()
}

fn default_error() -> String {
    "error".to_string()
}

impl Default for DocGraphConfig {
    fn default() -> Self {
        Self {
            entrypoints: Vec::new(),
            graph: GraphConfig::default(),
            links: LinksConfig::default(),
            exclude: ExcludeConfig::default(),
            rules: RulesConfig::default(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            scope: None,
            limit_to_scope: true,
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            external: default_external_policy(),
        }
    }
}

impl Default for ExcludeConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            ignore_file: default_ignore_file(),
            use_gitignore: false,
            exclude_hidden: true,
            defaults: true,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            orphan_files: default_error(),
            dead_link: default_error(),
            dead_anchor: default_error(),
        }
    }
}

/// Fully validated settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub entrypoints: Vec<PathBuf>,
    /// `None` means unlimited.
    pub max_depth: Option<usize>,
    pub scope: Option<PathBuf>,
    pub limit_to_scope: bool,
    pub external_policy: ExternalLinkPolicy,
    pub severities: RuleSeverities,
    pub exclusion: ExclusionOptions,
    /// Highest-precedence exclusion patterns, from the command line.
    pub cli_patterns: Vec<String>,
    pub max_concurrency: usize,
}

impl DocGraphConfig {
    /// Load config from a TOML file. A missing file yields the defaults;
    /// a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(DocGraphError::io(path, e)),
        };

        let config: Self = toml::from_str(&contents).map_err(|e| DocGraphError::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config.relative_to(path.parent().unwrap_or(Path::new("."))))
    }

    /// Look for `.docgraph.toml` in `dir`.
    pub fn discover(dir: &Path) -> Result<Self> {
        Self::load(&dir.join(CONFIG_FILE_NAME))
    }

    /// Rebase relative paths so they are interpreted against the config
    /// file's directory rather than the process working directory.
    fn relative_to(mut self, base: &Path) -> Self {
        if base.as_os_str().is_empty() {
            return self;
        }
        self.entrypoints = self
            .entrypoints
            .into_iter()
            .map(|p| if p.is_absolute() { p } else { base.join(p) })
            .collect();
        self.graph.scope = self
            .graph
            .scope
            .map(|p| if p.is_absolute() { p } else { base.join(p) });
        self
    }

    /// Validate every string-typed value and produce [`Settings`].
    pub fn resolve(self, cli_patterns: Vec<String>) -> Result<Settings> {
        let max_depth = match &self.graph.max_depth {
            None => None,
            Some(DepthSetting::Limit(n)) => Some(*n),
            Some(DepthSetting::Keyword(s)) => parse_depth(s)?,
        };

        let severities = RuleSeverities {
            orphan_files: self.rules.orphan_files.parse::<RuleSeverity>()?,
            dead_link: self.rules.dead_link.parse::<RuleSeverity>()?,
            dead_anchor: self.rules.dead_anchor.parse::<RuleSeverity>()?,
        };

        let exclusion = ExclusionOptions {
            patterns: self.exclude.patterns,
            ignore_file: Some(self.exclude.ignore_file).filter(|f| !f.is_empty()),
            use_gitignore: self.exclude.use_gitignore,
            exclude_hidden: self.exclude.exclude_hidden,
            use_defaults: self.exclude.defaults,
        };

        Ok(Settings {
            entrypoints: self.entrypoints,
            max_depth,
            scope: self.graph.scope,
            limit_to_scope: self.graph.limit_to_scope,
            external_policy: self.links.external.parse()?,
            severities,
            exclusion,
            cli_patterns,
            max_concurrency: self.max_concurrency.max(1),
        })
    }
}

/// Parse a depth argument: a non-negative integer, or `unlimited`/`inf`/`-1`.
pub fn parse_depth(value: &str) -> Result<Option<usize>> {
    let trimmed = value.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "unlimited" | "infinite" | "inf" | "-1" => Ok(None),
        other => other
            .parse::<usize>()
            .map(Some)
            .map_err(|_| DocGraphError::InvalidDepth(value.to_string())),
    }
}
