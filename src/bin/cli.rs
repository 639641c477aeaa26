//! docgraph CLI - structural validation for interlinked markdown.

use clap::Parser;
use docgraph::cli::{run, Cli};
use docgraph::DocGraphError;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<DocGraphError>() {
                Some(err) => {
                    eprintln!("  code: {}", err.code());
                    err.exit_code()
                }
                None => 3,
            }
        }
    };
    std::process::exit(code);
}

/// `RUST_LOG` wins; otherwise warn, `-v` info, `-vv` debug.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "docgraph=warn",
        1 => "docgraph=info",
        _ => "docgraph=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
