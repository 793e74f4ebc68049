//! Parsing tests: usage levels, severities and identity resolution.

use quill_catalog::MemoryCatalog;
use quill_core::{AttributeValue, CatalogClient, UsageLevel, Verb};
use quill_engine::{parse_command, CommandTable, ProcessingContext};

use crate::common::parse_as;

const TIERED: &str = r#"{
  "commands": [
    {
      "name": "Create Sensor",
      "verb": "Create",
      "family": "Sensor",
      "entity_type": "Sensor",
      "qualified_name_prefix": "Sensor",
      "attributes": [
        {"key": "display_name", "style": "Simple", "labels": ["Display Name"], "input_required": true},
        {"key": "range", "style": "Simple", "labels": ["Range"], "usage_level": "Advanced", "input_required": true},
        {"key": "calibration", "style": "Simple", "labels": ["Calibration"], "usage_level": "Expert", "input_required": true},
        {"key": "firmware", "style": "Simple", "labels": ["Firmware"], "usage_level": "Invisible", "input_required": true},
        {"key": "qualified_name", "style": "QN", "labels": ["Qualified Name"]}
      ]
    }
  ]
}"#;

const SENSOR: &str = "# Create Sensor\n## Display Name\nThermo\n";

fn parse_tiered(level: UsageLevel, block: &str) -> quill_core::ParsedCommand {
    let table = CommandTable::from_json(TIERED).unwrap();
    let spec = table.get("Create Sensor").unwrap();
    let catalog = MemoryCatalog::new();
    let mut ctx = ProcessingContext::new(level);
    parse_command(&mut ctx, &catalog, spec, block).unwrap()
}

#[test]
fn attributes_above_level_are_never_missing() {
    let cmd = parse_tiered(UsageLevel::Basic, SENSOR);
    assert!(cmd.valid, "{}", cmd.reason_text());
    assert!(cmd.attribute("range").is_none());
    assert!(cmd.attribute("calibration").is_none());
    assert!(cmd.attribute("firmware").is_none());
}

#[test]
fn higher_levels_reveal_strictly_more() {
    let advanced = parse_tiered(UsageLevel::Advanced, SENSOR);
    assert!(!advanced.valid);
    assert!(advanced.reason_text().contains("'Range'"));
    assert!(!advanced.reason_text().contains("'Calibration'"));

    let expert = parse_tiered(UsageLevel::Expert, SENSOR);
    assert!(expert.reason_text().contains("'Range'"));
    assert!(expert.reason_text().contains("'Calibration'"));
    assert!(!expert.reason_text().contains("'Firmware'"));

    let invisible = parse_tiered(UsageLevel::Invisible, SENSOR);
    assert!(invisible.reason_text().contains("'Firmware'"));
}

#[test]
fn sections_above_level_are_ignored() {
    let block = "# Create Sensor\n## Display Name\nThermo\n## Calibration\n2024-01\n";
    let cmd = parse_tiered(UsageLevel::Basic, block);
    assert!(cmd.valid);
    assert!(cmd.attribute("calibration").is_none());
}

#[test]
fn defaults_fill_absent_sections() {
    let catalog = MemoryCatalog::new();
    let cmd = parse_as(
        &catalog,
        UsageLevel::Advanced,
        "Create Glossary",
        "# Create Glossary\n## Name\nParts\n",
    );
    assert_eq!(cmd.text("language"), Some("English"));
    assert_eq!(cmd.value("merge_update"), &AttributeValue::Bool(true));
}

#[test]
fn update_without_identity_sections_warns() {
    let catalog = MemoryCatalog::new();
    catalog.insert("Glossary", "Glossary::Parts", "Parts");
    let cmd = parse_as(
        &catalog,
        UsageLevel::Basic,
        "Create Glossary",
        "# Update Glossary\n## Name\nParts\n",
    );
    assert!(cmd.valid);
    assert_eq!(cmd.verb, Verb::Update);
    assert!(cmd.exists);
    assert!(cmd.warnings.iter().any(|w| w.contains("'Qualified Name' not supplied")));
    assert!(cmd.reasons.is_empty());
}

#[test]
fn create_of_existing_entity_is_invalid() {
    let catalog = MemoryCatalog::new();
    let guid = catalog.insert("Glossary", "Glossary::Parts", "Parts");
    let cmd = parse_as(
        &catalog,
        UsageLevel::Basic,
        "Create Glossary",
        "# Create Glossary\n## Name\nParts\n",
    );
    assert!(!cmd.valid);
    assert!(cmd.exists);
    assert!(cmd.unique);
    assert_eq!(cmd.guid, Some(guid));
    assert!(cmd.reason_text().contains("already exists"));
}

#[test]
fn mismatched_guid_is_reported() {
    let catalog = MemoryCatalog::new();
    catalog.insert("Glossary", "Glossary::Parts", "Parts");
    let other = catalog.insert("Glossary", "Glossary::Bolts", "Bolts");
    let block = format!(
        "# Update Glossary\n## Name\nParts\n## Qualified Name\nGlossary::Parts\n## GUID\n{}\n",
        other
    );
    let cmd = parse_as(&catalog, UsageLevel::Basic, "Create Glossary", &block);
    assert!(!cmd.valid);
    assert!(cmd.reason_text().contains("does not match"));
}

#[test]
fn view_parse_has_no_identity() {
    let catalog = MemoryCatalog::new();
    let cmd = parse_as(
        &catalog,
        UsageLevel::Basic,
        "View Glossaries",
        "# List Glossaries\n## Search\npar\n",
    );
    assert!(cmd.valid);
    assert_eq!(cmd.verb, Verb::List);
    assert_eq!(cmd.text("search_string"), Some("par"));
    assert_eq!(cmd.text("output_format"), Some("LIST"));
    assert_eq!(catalog.counts().reads(), 0);
}

#[test]
fn parse_never_mutates() {
    let catalog = MemoryCatalog::new();
    catalog.insert("GlossaryTerm", "GlossaryTerm::Gadget", "Gadget");
    let block = "# Link Related Terms\n## Term 1\nWidget\n## Term 2\nGadget\n";
    let cmd = parse_as(&catalog, UsageLevel::Basic, "Link Term-Term Relationship", block);
    assert!(!cmd.valid);
    assert!(!cmd.exists);
    assert_eq!(catalog.counts().mutations(), 0);
    assert_eq!(catalog.find("GlossaryTerm", "*").unwrap().len(), 1);
}
