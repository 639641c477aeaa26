//! list: graph files filtered by frontmatter.

use anyhow::Result;
use std::path::Path;

use super::Session;
use crate::error::DocGraphError;
use crate::parser::Frontmatter;
use crate::report::render_paths;

/// A parsed `key=value` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub key: String,
    pub value: String,
}

impl Filter {
    pub fn parse(raw: &str) -> crate::error::Result<Self> {
        match raw.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(Self {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            }),
            _ => Err(DocGraphError::InvalidFilter(raw.to_string())),
        }
    }

    /// A file without frontmatter never matches.
    pub fn matches(&self, frontmatter: Option<&Frontmatter>) -> bool {
        frontmatter.is_some_and(|fm| fm.matches(&self.key, &self.value))
    }
}

pub fn run(session: &Session, raw_filters: &[String]) -> Result<i32> {
    let filters = raw_filters
        .iter()
        .map(|f| Filter::parse(f))
        .collect::<crate::error::Result<Vec<_>>>()?;
    let graph = session.build_graph()?;

    let mut selected = Vec::new();
    for file in graph.alphabetical_order() {
        if filters.is_empty() || matches_all(session, &file, &filters) {
            selected.push(file);
        }
    }
    print!("{}", render_paths(&selected, &session.base));
    Ok(0)
}

fn matches_all(session: &Session, file: &Path, filters: &[Filter]) -> bool {
    match session.provider.extract(file) {
        Ok(extraction) => filters
            .iter()
            .all(|f| f.matches(extraction.frontmatter.as_ref())),
        Err(_) => false,
    }
}
