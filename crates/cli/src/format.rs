//! Report, listing and error formatting.
//!
//! Two modes:
//! - **Human** (default): one line per block plus a totals line
//! - **JSON** (`--json`): `serde_json::to_string_pretty`

use serde_json::json;

use quill_executor::{BlockOutcome, DocumentReport, Output, Registry};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

const KINDS: [&str; 7] = [
    "echo",
    "validated",
    "applied",
    "converted",
    "listed",
    "skipped",
    "failed",
];

fn detail(outcome: &BlockOutcome) -> Option<String> {
    match &outcome.result {
        Ok(Output::Validated { valid: false, reasons }) => Some(reasons.join("; ")),
        Ok(Output::Converted { verb, .. }) => Some(format!("rewritten as {}", verb)),
        Ok(Output::Applied { guid, .. }) => Some(guid.to_string()),
        Ok(Output::Listed { count, .. }) => Some(format!("{} found", count)),
        Ok(Output::Skipped { reason }) => Some(reason.clone()),
        Ok(_) => None,
        Err(e) => Some(e.to_string()),
    }
}

/// Summarize a document pass.
pub fn format_report(report: &DocumentReport, source: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => {
            let blocks: Vec<_> = report
                .outcomes
                .iter()
                .map(|o| {
                    json!({
                        "command": o.command,
                        "line": o.start_line,
                        "outcome": o.kind(),
                        "detail": detail(o),
                    })
                })
                .collect();
            let counts: serde_json::Map<String, serde_json::Value> = KINDS
                .iter()
                .map(|k| (k.to_string(), report.count(k).into()))
                .collect();
            let value = json!({
                "source": source,
                "directive": report.directive.to_string(),
                "blocks": blocks,
                "counts": counts,
            });
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        }
        OutputMode::Human => {
            let mut out = String::new();
            for o in &report.outcomes {
                out.push_str(&format!("{}:{} {} -> {}", source, o.start_line, o.command, o.kind()));
                if let Some(d) = detail(o).filter(|d| !d.is_empty()) {
                    out.push_str(&format!(" ({})", d));
                }
                out.push('\n');
            }
            let totals: Vec<String> = KINDS
                .iter()
                .map(|k| (k, report.count(k)))
                .filter(|(_, n)| *n > 0)
                .map(|(k, n)| format!("{} {}", n, k))
                .collect();
            let plural = if report.outcomes.len() == 1 { "" } else { "s" };
            if totals.is_empty() {
                out.push_str(&format!("{} block{}", report.outcomes.len(), plural));
            } else {
                out.push_str(&format!(
                    "{} block{}: {}",
                    report.outcomes.len(),
                    plural,
                    totals.join(", ")
                ));
            }
            out
        }
    }
}

/// List the registered commands, canonical names first.
pub fn format_commands(registry: &Registry, all_names: bool, mode: OutputMode) -> String {
    let specs = registry.specifications();
    match mode {
        OutputMode::Json => {
            let value: Vec<_> = specs
                .iter()
                .map(|s| {
                    json!({
                        "name": s.name,
                        "verb": s.verb.to_string(),
                        "family": s.family,
                        "entity_type": s.entity_type,
                        "alternate_names": s.alternate_names,
                    })
                })
                .collect();
            serde_json::to_string_pretty(&value).unwrap_or_default()
        }
        OutputMode::Human => {
            let width = specs.iter().map(|s| s.name.len()).max().unwrap_or(0);
            let mut lines = Vec::with_capacity(specs.len());
            for s in &specs {
                lines.push(format!("{:width$}  {}", s.name, s.entity_type, width = width));
                if all_names {
                    for alt in &s.alternate_names {
                        lines.push(format!("  {}", alt));
                    }
                }
            }
            lines.join("\n")
        }
    }
}

/// Format an error with its chain of causes.
pub fn format_error(err: &anyhow::Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => json!({ "error": format!("{:#}", err) }).to_string(),
        OutputMode::Human => format!("(error) {:#}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{Directive, Error, Guid};

    fn report() -> DocumentReport {
        DocumentReport {
            directive: Directive::Process,
            output: String::new(),
            outcomes: vec![
                BlockOutcome {
                    command: "Create Glossary".into(),
                    start_line: 1,
                    result: Ok(Output::Applied {
                        guid: Guid::new("g-1"),
                        text: String::new(),
                    }),
                },
                BlockOutcome {
                    command: "Create Spaceship".into(),
                    start_line: 9,
                    result: Err(Error::UnknownCommand {
                        command: "Create Spaceship".into(),
                    }),
                },
            ],
        }
    }

    #[test]
    fn test_human_report() {
        let text = format_report(&report(), "parts.md", OutputMode::Human);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "parts.md:1 Create Glossary -> applied (g-1)");
        assert!(lines[1].starts_with("parts.md:9 Create Spaceship -> failed ("));
        assert_eq!(lines[2], "2 blocks: 1 applied, 1 failed");
    }

    #[test]
    fn test_json_report() {
        let text = format_report(&report(), "parts.md", OutputMode::Json);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["directive"], "process");
        assert_eq!(value["counts"]["applied"], 1);
        assert_eq!(value["counts"]["failed"], 1);
        assert_eq!(value["blocks"][1]["line"], 9);
    }

    #[test]
    fn test_commands_listing() {
        let table = quill_engine::CommandTable::builtin().unwrap();
        let registry = Registry::from_table(&table).unwrap();

        let short = format_commands(&registry, false, OutputMode::Human);
        assert_eq!(short.lines().count(), table.len());
        assert!(short.contains("Create Glossary Term"));

        let long = format_commands(&registry, true, OutputMode::Human);
        assert!(long.contains("  Update Term"));
    }

    #[test]
    fn test_error_chain() {
        let err = anyhow::anyhow!("connection refused").context("loading catalog");
        assert_eq!(
            format_error(&err, OutputMode::Human),
            "(error) loading catalog: connection refused"
        );
    }
}
