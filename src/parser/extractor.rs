//
//  extractor.rs
//  docgraph
//

use pulldown_cmark::{Event, LinkType, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use super::frontmatter::parse_frontmatter;
use super::types::*;
use crate::validate::slugify;

/// Maps byte offsets to 1-based (line, column) pairs.
struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, starts }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = self.starts[line];
        let column = self
            .source
            .get(start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (line + 1, column + 1)
    }
}

struct PendingHeading {
    level: u8,
    id: Option<String>,
    start: usize,
    text: String,
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
}

/// Extract links, headings, anchors and frontmatter from markdown source.
///
/// Parsing never fails; anything `pulldown-cmark` does not recognize as a
/// link or heading is simply not reported.
pub fn extract_markdown(path: &Path, source: &str) -> FileExtractions {
    let index = LineIndex::new(source);
    let mut links = Vec::new();
    let mut headings = Vec::new();
    let mut pending: Option<PendingHeading> = None;

    for (event, range) in Parser::new_ext(source, options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                ..
            }) => {
                if link_type != LinkType::Email {
                    links.push(build_link(&index, source, &dest_url, range, false));
                }
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                links.push(build_link(&index, source, &dest_url, range, true));
            }
            Event::Start(Tag::Heading { level, id, .. }) => {
                pending = Some(PendingHeading {
                    level: level as u8,
                    id: id.map(|i| i.to_string()),
                    start: range.start,
                    text: String::new(),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = pending.as_mut() {
                    heading.text.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(heading) = pending.take() {
                    let (line, column) = index.position(heading.start);
                    let text = heading.text.trim().to_string();
                    headings.push(ExtractedHeading {
                        slug: slugify(&text),
                        text,
                        level: heading.level,
                        line,
                        column,
                        id: heading.id,
                    });
                }
            }
            _ => {}
        }
    }

    let anchors = collect_anchors(&headings);

    FileExtractions {
        file_path: path.to_path_buf(),
        links,
        headings,
        anchors,
        frontmatter: parse_frontmatter(source),
    }
}

fn build_link(
    index: &LineIndex<'_>,
    source: &str,
    dest: &str,
    range: Range<usize>,
    is_image: bool,
) -> ExtractedLink {
    let (line, column) = index.position(range.start);
    let (end_line, end_column) = index.position(range.end);
    let literal = source
        .get(range)
        .unwrap_or_default()
        .trim_end()
        .to_string();

    ExtractedLink {
        target: dest.trim().to_string(),
        line,
        column,
        end_column: (end_line == line).then_some(end_column),
        literal,
        is_image,
    }
}

/// Every anchor a file answers to. Repeated slugs get `-1`, `-2`, ...
/// suffixes the way GitHub renders them.
fn collect_anchors(headings: &[ExtractedHeading]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut anchors = Vec::with_capacity(headings.len());

    for heading in headings {
        if let Some(id) = &heading.id {
            anchors.push(id.clone());
        }
        if heading.slug.is_empty() {
            continue;
        }
        let count = seen.entry(heading.slug.as_str()).or_insert(0);
        if *count == 0 {
            anchors.push(heading.slug.clone());
        } else {
            anchors.push(format!("{}-{}", heading.slug, count));
        }
        *count += 1;
    }

    anchors
}
