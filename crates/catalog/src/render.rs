//! Entity rendering
//!
//! Turns an [`EntityRecord`] into the text embedded in a processed document.
//! Markdown formats use the property names title-cased as section labels
//! (`contentStatus` becomes `Content Status`).

use quill_core::{EntityRecord, OutputFormat};

/// `GlossaryTerm` -> `Glossary Term`, `contentStatus` -> `Content Status`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for (i, c) in name.chars().enumerate() {
        if c == '_' || c == '-' {
            out.push(' ');
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            out.push(' ');
        }
        if i == 0 || out.ends_with(' ') {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
    }
    out
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{}: {}", k, value_text(v)))
            .collect::<Vec<_>>()
            .join("\n"),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Properties other than the identity ones, in stored order.
fn extra_properties(record: &EntityRecord) -> impl Iterator<Item = (String, String)> + '_ {
    record
        .properties
        .iter()
        .filter(|(k, v)| k.as_str() != "qualifiedName" && k.as_str() != "displayName" && !v.is_null())
        .map(|(k, v)| (title_case(k), value_text(v)))
}

fn display(record: &EntityRecord) -> &str {
    record.display_name().unwrap_or(record.guid.as_str())
}

fn markdown(record: &EntityRecord, header: &str) -> String {
    let mut out = format!("{}\n\n## Display Name\n{}\n", header, display(record));
    for (label, text) in extra_properties(record) {
        out.push_str(&format!("\n## {}\n{}\n", label, text));
    }
    if let Some(qn) = record.qualified_name() {
        out.push_str(&format!("\n## Qualified Name\n{}\n", qn));
    }
    out.push_str(&format!("\n## GUID\n{}\n", record.guid));
    out
}

/// Render one entity.
pub fn render_record(record: &EntityRecord, format: OutputFormat) -> String {
    let type_label = title_case(&record.entity_type);
    match format {
        OutputFormat::Md => markdown(record, &format!("# {} {}", type_label, display(record))),
        OutputFormat::Form => markdown(record, &format!("# Update {}", type_label)),
        OutputFormat::Report => {
            let mut out = format!("## {}\n\n", display(record));
            out.push_str(&format!("* **Type**: {}\n", type_label));
            if let Some(qn) = record.qualified_name() {
                out.push_str(&format!("* **Qualified Name**: {}\n", qn));
            }
            out.push_str(&format!("* **GUID**: {}\n", record.guid));
            for (label, text) in extra_properties(record) {
                out.push_str(&format!("* **{}**: {}\n", label, text.replace('\n', "; ")));
            }
            out
        }
        OutputFormat::List => format!(
            "* {} (`{}`)\n",
            display(record),
            record.qualified_name().unwrap_or_default()
        ),
        OutputFormat::Table => format!(
            "| Display Name | Qualified Name | GUID |\n|---|---|---|\n| {} | {} | {} |\n",
            display(record),
            record.qualified_name().unwrap_or_default(),
            record.guid
        ),
        OutputFormat::Dict => {
            let mut map = record.properties.clone();
            map.insert("guid".into(), record.guid.as_str().into());
            serde_json::to_string_pretty(&map).unwrap_or_default()
        }
        OutputFormat::Json => serde_json::to_string_pretty(record).unwrap_or_default(),
    }
}
