//! Block segmentation
//!
//! Splits a document into command blocks and pass-through text. A command
//! block starts at a level-1 header whose first word is a verb
//! (`# Create Glossary`) and runs until a rule line (`---`/`___`), the next
//! level-1 header, or end of document. The terminating rule line belongs to
//! the block and is not repeated in the surrounding text.
//!
//! Verbs that are also everyday words (`Add`, `Remove`, `Attach`, `Unlink`)
//! only open a block when the header names a known command, so a prose
//! header such as `# Add notes here` stays text.
//!
//! Every other line, including level-1 headers that do not start with a
//! verb (`# Provenance`, `# Notes`), is text and is emitted unchanged.

use quill_core::Verb;

use crate::extract::{header_text, is_command_header, is_comment_line, is_rule_line};
use crate::table::CommandTable;

/// One command block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBlock {
    /// Header text with whitespace normalized, e.g. `Create Glossary Term`
    pub command: String,
    /// Verb parsed from the header
    pub verb: Verb,
    /// Block text from the header line up to (not including) the rule line
    pub text: String,
    /// 1-based line number of the header
    pub start_line: usize,
    /// Whether the block was closed by a rule line
    pub terminated: bool,
}

/// A piece of a segmented document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text passed through unchanged
    Text(String),
    /// A command to be parsed and dispatched
    Command(CommandBlock),
}

/// Verb of a line that opens a command block.
pub fn command_verb(line: &str) -> Option<Verb> {
    if is_comment_line(line) || !is_command_header(line) {
        return None;
    }
    header_text(line).split_whitespace().next()?.parse().ok()
}

/// Whether the header's first word is the verb's own name rather than an
/// alias of it.
fn spelled_as_verb(command: &str, verb: Verb) -> bool {
    command
        .split_whitespace()
        .next()
        .is_some_and(|w| w.eq_ignore_ascii_case(verb.as_str()))
}

/// Normalize a header to single-spaced words.
pub fn normalize_command(header: &str) -> String {
    header.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split `document` into text and command blocks, in source order, using the
/// built-in command table to recognize alias-led headers.
pub fn segment(document: &str) -> Vec<Segment> {
    segment_with(document, CommandTable::builtin_knows)
}

/// Split `document` into text and command blocks, in source order.
///
/// `known` answers whether a normalized header names a registered command;
/// it is consulted only for headers led by a verb alias.
pub fn segment_with(document: &str, known: impl Fn(&str) -> bool) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut block: Option<(CommandBlock, Vec<&str>)> = None;

    fn close(block: Option<(CommandBlock, Vec<&str>)>, terminated: bool, out: &mut Vec<Segment>) {
        if let Some((mut b, lines)) = block {
            b.text = lines.join("\n");
            b.text.push('\n');
            b.terminated = terminated;
            out.push(Segment::Command(b));
        }
    }

    for (index, line) in document.lines().enumerate() {
        let opens = command_verb(line).and_then(|verb| {
            let command = normalize_command(header_text(line));
            (spelled_as_verb(&command, verb) || known(&command)).then_some((verb, command))
        });
        if let Some((verb, command)) = opens {
            close(block.take(), false, &mut segments);
            if !text.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut text)));
            }
            block = Some((
                CommandBlock {
                    command,
                    verb,
                    text: String::new(),
                    start_line: index + 1,
                    terminated: false,
                },
                vec![line],
            ));
            continue;
        }

        if block.is_none() {
            text.push_str(line);
            text.push('\n');
        } else if is_rule_line(line) {
            close(block.take(), true, &mut segments);
        } else if is_command_header(line) {
            // A non-command level-1 header also ends the block
            close(block.take(), false, &mut segments);
            text.push_str(line);
            text.push('\n');
        } else if let Some((_, lines)) = block.as_mut() {
            lines.push(line);
        }
    }

    close(block.take(), false, &mut segments);
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }

    tracing::debug!(
        target: "quill::document",
        segments = segments.len(),
        commands = segments.iter().filter(|s| matches!(s, Segment::Command(_))).count(),
        "Document segmented"
    );
    segments
}
