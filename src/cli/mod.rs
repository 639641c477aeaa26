//! CLI module for docgraph.
//!
//! Commands:
//! - validate: orphans, dead links, dead anchors
//! - deps: incoming/outgoing dependency trees for one file
//! - order: dependency-ordered file list or concatenation
//! - list: graph files filtered by frontmatter
//! - stats: graph counts

pub mod deps;
pub mod list;
pub mod order;
pub mod stats;
pub mod validate;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::config::{parse_depth, DocGraphConfig, Settings, CONFIG_FILE_NAME};
use crate::error::{DocGraphError, Result};
use crate::exclude::ExclusionManager;
use crate::graph::{DocGraph, GraphAnalyzer, ScopeOptions};
use crate::parser::{ContentProvider, MarkdownProvider};
use crate::report::OutputFormat;

/// Entrypoint used when neither the command line nor the config names one.
const DEFAULT_ENTRYPOINT: &str = "README.md";

#[derive(Parser)]
#[command(name = "docgraph")]
#[command(about = "docgraph - structural validation for interlinked markdown", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: ./.docgraph.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command that builds a graph.
#[derive(Args, Debug, Clone, Default)]
pub struct GraphArgs {
    /// Entrypoint files (default: from config, else README.md)
    pub entrypoints: Vec<PathBuf>,

    /// Maximum link depth from the entrypoints (integer or "unlimited")
    #[arg(short, long)]
    pub depth: Option<String>,

    /// Scope directory (default: derived from the entrypoints)
    #[arg(long)]
    pub scope: Option<PathBuf>,

    /// Expand links in files outside the scope too
    #[arg(long)]
    pub no_scope_limit: bool,

    /// Extra exclusion pattern (gitignore syntax, repeatable)
    #[arg(short = 'x', long = "exclude")]
    pub exclude: Vec<String>,

    /// Also honor .gitignore
    #[arg(long)]
    pub gitignore: bool,

    /// Do not skip hidden directories
    #[arg(long)]
    pub include_hidden: bool,

    /// External link policy: validate, warn, error, ignore
    #[arg(long)]
    pub external: Option<String>,

    /// Max parallel file reads
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    // ─── Validation ─────────────────────────────────────────────
    /// Check for orphan files, dead links and dead anchors
    Validate {
        #[command(flatten)]
        graph: GraphArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    // ─── Analysis ───────────────────────────────────────────────
    /// Show what a file depends on and what references it
    Deps {
        /// File to analyze
        file: PathBuf,

        #[command(flatten)]
        graph: GraphArgs,

        /// Only the incoming tree
        #[arg(long)]
        incoming: bool,

        /// Only the outgoing tree
        #[arg(long)]
        outgoing: bool,

        /// Tree depth (integer or "unlimited")
        #[arg(long)]
        tree_depth: Option<String>,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// List files so that dependencies come first
    Order {
        #[command(flatten)]
        graph: GraphArgs,

        /// Sort by path instead
        #[arg(long)]
        alphabetical: bool,

        /// Print file contents instead of paths
        #[arg(long)]
        concat: bool,

        /// Drop YAML frontmatter when concatenating
        #[arg(long)]
        strip_frontmatter: bool,
    },

    /// List graph files, optionally filtered by frontmatter
    List {
        #[command(flatten)]
        graph: GraphArgs,

        /// Frontmatter filter key=value (repeatable, all must match)
        #[arg(short = 'w', long = "where")]
        filters: Vec<String>,
    },

    /// Show graph statistics
    Stats {
        #[command(flatten)]
        graph: GraphArgs,

        /// JSON output
        #[arg(long)]
        json: bool,
    },
}

/// Dispatch a parsed command. Returns the process exit code.
pub fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Validate { graph, format } => {
            validate::run(&Session::open(&graph, config)?, format)
        }
        Commands::Deps {
            file,
            graph,
            incoming,
            outgoing,
            tree_depth,
            json,
        } => {
            let session = Session::open(&graph, config)?;
            let options = deps::options(incoming, outgoing, tree_depth.as_deref())?;
            deps::run(&session, &file, options, json)
        }
        Commands::Order {
            graph,
            alphabetical,
            concat,
            strip_frontmatter,
        } => order::run(
            &Session::open(&graph, config)?,
            alphabetical,
            concat,
            strip_frontmatter,
        ),
        Commands::List { graph, filters } => list::run(&Session::open(&graph, config)?, &filters),
        Commands::Stats { graph, json } => stats::run(&Session::open(&graph, config)?, json),
    }
}

/// Everything one command invocation needs: merged settings plus the
/// shared provider and analyzer.
pub struct Session {
    pub settings: Settings,
    pub provider: Arc<dyn ContentProvider>,
    pub analyzer: GraphAnalyzer,
    /// Directory paths are reported relative to.
    pub base: PathBuf,
}

impl Session {
    /// Load config, apply CLI overrides and validate everything before any
    /// graph work starts.
    pub fn open(args: &GraphArgs, config_path: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|e| DocGraphError::io(".", e))?;
        let (config, config_dir) = match config_path {
            Some(path) => (
                DocGraphConfig::load(path)?,
                path.parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| cwd.clone()),
            ),
            None => (DocGraphConfig::discover(&cwd)?, cwd.clone()),
        };

        let mut settings = config.resolve(args.exclude.clone())?;
        apply_overrides(&mut settings, args)?;
        settings.entrypoints = entrypoints(args, &settings, &config_dir)?;

        let exclusions =
            ExclusionManager::new(&config_dir, &settings.exclusion, &settings.cli_patterns)?;
        let provider: Arc<dyn ContentProvider> = Arc::new(MarkdownProvider::new());
        let analyzer = GraphAnalyzer::new(
            Arc::clone(&provider),
            Arc::new(exclusions),
            ScopeOptions {
                root: settings.scope.clone(),
                limit_to_scope: settings.limit_to_scope,
            },
        );

        debug!(
            config = %config_dir.join(CONFIG_FILE_NAME).display(),
            entrypoints = settings.entrypoints.len(),
            "session ready"
        );

        Ok(Self {
            settings,
            provider,
            analyzer,
            base: cwd,
        })
    }

    pub fn build_graph(&self) -> Result<DocGraph> {
        self.analyzer
            .build_graph(&self.settings.entrypoints, self.settings.max_depth)
    }
}

fn apply_overrides(settings: &mut Settings, args: &GraphArgs) -> Result<()> {
    if let Some(depth) = &args.depth {
        settings.max_depth = parse_depth(depth)?;
    }
    if let Some(scope) = &args.scope {
        settings.scope = Some(scope.clone());
    }
    if args.no_scope_limit {
        settings.limit_to_scope = false;
    }
    if args.gitignore {
        settings.exclusion.use_gitignore = true;
    }
    if args.include_hidden {
        settings.exclusion.exclude_hidden = false;
    }
    if let Some(policy) = &args.external {
        settings.external_policy = policy.parse()?;
    }
    if let Some(jobs) = args.jobs {
        settings.max_concurrency = jobs.max(1);
    }
    Ok(())
}

/// Command line first, then config, then `README.md` in the config
/// directory.
fn entrypoints(args: &GraphArgs, settings: &Settings, config_dir: &Path) -> Result<Vec<PathBuf>> {
    if !args.entrypoints.is_empty() {
        return Ok(args.entrypoints.clone());
    }
    if !settings.entrypoints.is_empty() {
        return Ok(settings.entrypoints.clone());
    }
    let readme = config_dir.join(DEFAULT_ENTRYPOINT);
    if readme.is_file() {
        return Ok(vec![readme]);
    }
    Err(DocGraphError::NoEntrypoints)
}
