//! stats: graph counts.

use anyhow::Result;

use super::Session;
use crate::report::render_stats;

pub fn run(session: &Session, json: bool) -> Result<i32> {
    let graph = session.build_graph()?;
    let stats = graph.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", render_stats(&stats));
    }
    Ok(0)
}
