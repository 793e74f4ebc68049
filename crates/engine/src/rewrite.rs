//! Block rewriting for auto-conversion
//!
//! Edits the text of a command block in place: swap the header verb, set a
//! section's body, drop a section. Everything the edit does not touch
//! (other sections, author comments, ordering) is kept as written, so a
//! converted block still reads like the one the author wrote.

use quill_core::Verb;

use crate::extract::{header_text, is_command_header, is_comment_line, is_rule_line, is_section_header};

fn matches_any<S: AsRef<str>>(line: &str, labels: &[S]) -> bool {
    if is_comment_line(line) || !is_section_header(line) {
        return false;
    }
    let header = header_text(line).to_lowercase();
    labels
        .iter()
        .any(|l| l.as_ref().trim().to_lowercase() == header)
}

/// Index one past the last body line of the section whose header is at `start`.
fn section_end(lines: &[String], start: usize) -> usize {
    lines[start + 1..]
        .iter()
        .position(|l| {
            !is_comment_line(l) && (is_section_header(l) || is_rule_line(l) || is_command_header(l))
        })
        .map(|p| start + 1 + p)
        .unwrap_or(lines.len())
}

fn to_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

fn from_lines(mut lines: Vec<String>) -> String {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Replace the block's command header with `# <verb> <object_type>`.
pub fn replace_header(text: &str, verb: Verb, object_type: &str) -> String {
    let mut lines = to_lines(text);
    if let Some(line) = lines
        .iter_mut()
        .find(|l| !is_comment_line(l) && is_command_header(l))
    {
        *line = format!("# {} {}", verb, object_type);
    }
    from_lines(lines)
}

/// Set the body of the section headed by any of `labels`.
///
/// An existing section keeps its header as written; a missing one is
/// appended as `## <label>`.
pub fn set_section<S: AsRef<str>>(text: &str, labels: &[S], label: &str, value: &str) -> String {
    let mut lines = to_lines(text);
    match lines.iter().position(|l| matches_any(l, labels)) {
        Some(start) => {
            let end = section_end(&lines, start);
            let keep_blank = end < lines.len();
            let mut body = vec![value.to_string()];
            if keep_blank {
                body.push(String::new());
            }
            lines.splice(start + 1..end, body);
        }
        None => {
            while lines.last().is_some_and(|l| l.trim().is_empty()) {
                lines.pop();
            }
            lines.push(String::new());
            lines.push(format!("## {}", label));
            lines.push(value.to_string());
        }
    }
    from_lines(lines)
}

/// Remove the section headed by any of `labels`, header included.
pub fn remove_section<S: AsRef<str>>(text: &str, labels: &[S]) -> String {
    let mut lines = to_lines(text);
    if let Some(start) = lines.iter().position(|l| matches_any(l, labels)) {
        let end = section_end(&lines, start);
        lines.drain(start..end);
    }
    from_lines(lines)
}
