//! View/List handler.
//!
//! Searches the catalog and renders the hits. `LIST` and `TABLE` are built
//! here from the search hits in one piece; every other format asks the
//! catalog to render each hit.

use quill_core::{Directive, EntityMatch, OutputFormat, ParsedCommand, Result};
use quill_engine::parse::{OUTPUT_FORMAT_KEY, SEARCH_STRING_KEY};

use super::{settle, HandlerContext};
use crate::Output;

/// Key of the page size attribute of View commands.
pub const PAGE_SIZE_KEY: &str = "page_size";

fn list(matches: &[EntityMatch]) -> String {
    matches
        .iter()
        .map(|m| format!("* {} (`{}`)\n", m.display_name, m.qualified_name))
        .collect()
}

fn table(matches: &[EntityMatch]) -> String {
    let mut out = String::from("| Display Name | Qualified Name | GUID |\n|---|---|---|\n");
    for m in matches {
        out.push_str(&format!("| {} | {} | {} |\n", m.display_name, m.qualified_name, m.guid));
    }
    out
}

/// Handle a View or List block.
pub fn view_elements(
    hc: &mut HandlerContext<'_>,
    cmd: &ParsedCommand,
    directive: Directive,
) -> Result<Output> {
    if let Some(out) = settle(hc.spec, cmd, directive) {
        return Ok(out);
    }
    let search = cmd.text(SEARCH_STRING_KEY).unwrap_or("*");
    let format = cmd
        .text(OUTPUT_FORMAT_KEY)
        .and_then(OutputFormat::parse)
        .unwrap_or(OutputFormat::List);

    let mut matches = hc
        .catalog
        .find(&hc.spec.entity_type, search)
        .map_err(hc.fault("find"))?;
    matches.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
    if let Some(size) = cmd.value(PAGE_SIZE_KEY).as_int().filter(|n| *n > 0) {
        matches.truncate(size as usize);
    }

    let mut text = format!("## {} matching `{}`\n\n", cmd.object_type, search);
    if matches.is_empty() {
        text.push_str("No matching entities.\n");
    } else {
        match format {
            OutputFormat::List => text.push_str(&list(&matches)),
            OutputFormat::Table => text.push_str(&table(&matches)),
            other => {
                let rendered = matches
                    .iter()
                    .map(|m| hc.catalog.render(&m.guid, other))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(hc.fault("render"))?;
                text.push_str(&rendered.join("\n"));
            }
        }
    }
    tracing::debug!(target: "quill::executor", command = %hc.spec.name, search, count = matches.len(), "Listed");
    Ok(Output::Listed {
        count: matches.len(),
        text,
    })
}
