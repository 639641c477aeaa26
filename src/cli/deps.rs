//! deps: dependency trees for one file.

use anyhow::Result;
use std::path::Path;

use super::Session;
use crate::config::parse_depth;
use crate::deps::{DependencyAnalyzer, DependencyOptions};
use crate::report::render_dependencies;

/// Neither flag means both directions.
pub fn options(incoming: bool, outgoing: bool, tree_depth: Option<&str>) -> Result<DependencyOptions> {
    let both = !incoming && !outgoing;
    Ok(DependencyOptions {
        include_incoming: incoming || both,
        include_outgoing: outgoing || both,
        max_depth: tree_depth.map(parse_depth).transpose()?.flatten(),
    })
}

pub fn run(session: &Session, file: &Path, options: DependencyOptions, json: bool) -> Result<i32> {
    let graph = session.build_graph()?;
    let report = DependencyAnalyzer::new(&graph).analyze(file, options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_dependencies(&report, &session.base));
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options() {
        let both = options(false, false, None).unwrap();
        assert!(both.include_incoming && both.include_outgoing);
        assert_eq!(both.max_depth, None);

        let only_in = options(true, false, Some("2")).unwrap();
        assert!(only_in.include_incoming && !only_in.include_outgoing);
        assert_eq!(only_in.max_depth, Some(2));

        assert!(options(false, true, Some("lots")).is_err());
    }
}
