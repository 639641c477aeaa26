//! order: dependency-ordered listing and concatenation.

use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use super::Session;
use crate::error::DocGraphError;
use crate::parser::frontmatter::strip_frontmatter;
use crate::report::render_paths;

pub fn run(session: &Session, alphabetical: bool, concat: bool, strip: bool) -> Result<i32> {
    let graph = session.build_graph()?;
    let files = if alphabetical {
        graph.alphabetical_order()
    } else {
        graph.dependency_order()
    };

    let out = if concat {
        concatenate(&files, strip)?
    } else {
        render_paths(&files, &session.base)
    };
    std::io::stdout().lock().write_all(out.as_bytes())?;
    Ok(0)
}

/// File contents in the given order, separated by a blank line.
pub fn concatenate(files: &[PathBuf], strip: bool) -> crate::error::Result<String> {
    let mut parts = Vec::with_capacity(files.len());
    for file in files {
        let source = fs::read_to_string(file).map_err(|e| DocGraphError::io(file, e))?;
        let body = if strip { strip_frontmatter(&source) } else { &source };
        parts.push(body.trim_end_matches('\n').to_string());
    }
    let mut out = parts.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_concatenate_strips_frontmatter() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        fs::write(&a, "---\ntitle: A\n---\n# A\n").unwrap();
        fs::write(&b, "# B\n\n").unwrap();

        let files = vec![b.clone(), a.clone()];
        assert_eq!(concatenate(&files, true).unwrap(), "# B\n\n# A\n");
        assert!(concatenate(&files, false).unwrap().contains("title: A"));
    }

    #[test]
    fn test_concatenate_missing_file() {
        let err = concatenate(&[PathBuf::from("/nope/x.md")], false).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
