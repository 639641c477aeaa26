//! YAML frontmatter: parsing, lookup and stripping.

use serde_yaml::{Mapping, Value};
use tracing::debug;

/// Parsed frontmatter fields of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pub fields: Mapping,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// `key=value` filter semantics: scalar equality, or membership when the
    /// field is a sequence.
    pub fn matches(&self, key: &str, expected: &str) -> bool {
        match self.get(key) {
            Some(Value::Sequence(items)) => items.iter().any(|v| scalar_eq(v, expected)),
            Some(value) => scalar_eq(value, expected),
            None => false,
        }
    }
}

fn scalar_eq(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Bool(b) => b.to_string() == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Null => expected.is_empty() || expected == "null",
        _ => false,
    }
}

/// Locate the frontmatter block. Returns (yaml, body).
fn split(source: &str) -> Option<(&str, &str)> {
    let rest = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "---" || trimmed == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

/// Parse leading `---` delimited YAML. Malformed YAML or a non-mapping
/// document yields `None`.
pub fn parse_frontmatter(source: &str) -> Option<Frontmatter> {
    let (yaml, _) = split(source)?;
    if yaml.trim().is_empty() {
        return Some(Frontmatter::default());
    }
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(fields)) => Some(Frontmatter { fields }),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "ignoring malformed frontmatter");
            None
        }
    }
}

/// The document without its frontmatter block.
pub fn strip_frontmatter(source: &str) -> &str {
    match split(source) {
        Some((_, body)) => body.trim_start_matches(['\n', '\r']),
        None => source,
    }
}
