//! Segmentation tests: what is a command block and what is text.

use quill_core::Verb;
use quill_engine::{segment, Segment};

fn commands(doc: &str) -> Vec<String> {
    segment(doc)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Command(b) => Some(b.command),
            Segment::Text(_) => None,
        })
        .collect()
}

fn text(doc: &str) -> String {
    segment(doc)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Text(t) => Some(t),
            Segment::Command(_) => None,
        })
        .collect()
}

#[test]
fn blocks_in_source_order() {
    let doc = "# Create Glossary\n## Name\nParts\n___\n# Create  Term\n## Term\nWidget\n";
    assert_eq!(commands(doc), vec!["Create Glossary", "Create Term"]);
}

#[test]
fn non_verb_headers_are_text() {
    let doc = "# Notes\nSome prose.\n# Provenance\n* earlier\n";
    assert!(commands(doc).is_empty());
    assert_eq!(text(doc), doc);
}

#[test]
fn rule_line_belongs_to_block() {
    let doc = "intro\n# View Glossaries\n___\noutro\n";
    let segments = segment(doc);
    let block = segments
        .iter()
        .find_map(|s| match s {
            Segment::Command(b) => Some(b),
            Segment::Text(_) => None,
        })
        .unwrap();
    assert_eq!(block.verb, Verb::View);
    assert_eq!(block.text, "# View Glossaries\n");
    assert!(block.terminated);
    assert_eq!(block.start_line, 2);
    assert_eq!(text(doc), "intro\noutro\n");
}

#[test]
fn header_ends_previous_block() {
    let doc = "# Create Glossary\n## Name\nParts\n# Delete Glossary\n## Name\nOld\n";
    let blocks: Vec<_> = segment(doc)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Command(b) => Some(b),
            Segment::Text(_) => None,
        })
        .collect();
    assert_eq!(blocks.len(), 2);
    assert!(!blocks[0].terminated);
    assert_eq!(blocks[1].verb, Verb::Delete);
    assert_eq!(blocks[1].start_line, 4);
}
