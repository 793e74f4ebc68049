//! Attribute extraction
//!
//! Pulls a labelled section's body out of a command block:
//!
//! ```text
//! # Create Glossary Term        <- command header (level 1)
//! > guidance for the author     <- blockquote, ignored everywhere
//! ## Display Name               <- section header (level 2+)
//! Widget                        <- section body
//! ## Description
//! A small mechanical part.
//! ___                           <- rule line, ends the block
//! ```
//!
//! Blockquote lines are dropped before anything else, and runs of blank
//! lines are collapsed to one, so neither inline guidance nor extra spacing
//! can change what is extracted.

/// True for a rule line (`---` or `___`), which terminates a block.
pub fn is_rule_line(line: &str) -> bool {
    let t = line.trim();
    t.starts_with("---") || t.starts_with("___")
}

/// True for a level-1 header line (`# Text`).
pub fn is_command_header(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("# ") && !t[2..].trim().is_empty()
}

/// True for a section header line (`## Text`, or deeper).
pub fn is_section_header(line: &str) -> bool {
    line.trim_start().starts_with("##")
}

/// True for a blockquote (author comment) line.
pub fn is_comment_line(line: &str) -> bool {
    line.trim_start().starts_with('>')
}

/// Text of a header line with the leading `#` run removed.
pub fn header_text(line: &str) -> &str {
    line.trim().trim_start_matches('#').trim()
}

/// Remove comment lines and collapse blank-line runs.
pub fn strip_comments(block: &str) -> String {
    let mut out = String::with_capacity(block.len());
    let mut previous_blank = false;
    for line in block.lines() {
        if is_comment_line(line) {
            continue;
        }
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        previous_blank = blank;
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Text of the block's command header, if it has one.
pub fn extract_command_header(block: &str) -> Option<String> {
    block
        .lines()
        .filter(|l| !is_comment_line(l))
        .find(|l| is_command_header(l))
        .map(|l| header_text(l).to_string())
}

/// Labels of every section header present in the block, in order.
pub fn section_labels(block: &str) -> Vec<String> {
    block
        .lines()
        .filter(|l| !is_comment_line(l) && is_section_header(l))
        .map(|l| header_text(l).to_string())
        .collect()
}

fn label_matches(header: &str, label: &str) -> bool {
    header.trim().to_lowercase() == label.trim().to_lowercase()
}

/// Body of the first section headed by any of `labels`.
///
/// Labels are tried in iteration order; the first label with a matching
/// section header wins even if another label's section appears earlier in
/// the block. Returns `None` when no label matches. A matching section with
/// no body yields `Some("")`.
pub fn extract_section<S: AsRef<str>>(block: &str, labels: &[S]) -> Option<String> {
    let cleaned = strip_comments(block);
    let lines: Vec<&str> = cleaned.lines().collect();

    for label in labels {
        let label = label.as_ref();
        let start = lines
            .iter()
            .position(|l| is_section_header(l) && label_matches(header_text(l), label));
        let Some(start) = start else {
            continue;
        };

        let body: Vec<&str> = lines[start + 1..]
            .iter()
            .take_while(|l| !is_section_header(l) && !is_rule_line(l) && !is_command_header(l))
            .copied()
            .collect();
        let text = body.join("\n").trim().to_string();
        tracing::trace!(target: "quill::extract", label, len = text.len(), "Section extracted");
        return Some(text);
    }
    None
}
