//! Configuration-driven processing: `quill.toml`, custom command tables and
//! output files.

use quill_engine::QuillConfig;

use crate::common::*;

#[test]
fn config_sets_level_and_qualifier() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quill.toml");
    std::fs::write(
        &path,
        "usage_level = \"advanced\"\nlocal_qualifier = \"Acme\"\n",
    )
    .unwrap();
    let config = QuillConfig::from_file(&path).unwrap();

    let catalog = MemoryCatalog::new();
    let processor = DocumentProcessor::from_config(executor(&catalog), Directive::Process, &config).unwrap();
    let doc = "# Create Glossary\n## Name\nParts\n## Language\nFrench\n___\n";
    let report = processor.process("parts.md", doc);

    assert_eq!(report.count("applied"), 1);
    let stored = catalog.by_qualified_name("Acme::Glossary::Parts");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].property("language"), Some("French"));
}

#[test]
fn basic_level_drops_advanced_sections() {
    let catalog = MemoryCatalog::new();
    let doc = "# Create Glossary\n## Name\nParts\n## Language\nFrench\n___\n";

    let report = run(&catalog, Directive::Process, doc);

    assert_eq!(report.count("applied"), 1);
    let stored = catalog.by_qualified_name("Glossary::Parts");
    assert!(stored[0].property("language").is_none());
}

#[test]
fn bad_usage_level_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quill.toml");
    std::fs::write(&path, "usage_level = \"wizard\"\n").unwrap();

    let err = QuillConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, quill_core::Error::Config { .. }));
}

#[test]
fn custom_command_table() {
    let dir = tempfile::tempdir().unwrap();
    let table_path = dir.path().join("commands.json");
    std::fs::write(
        &table_path,
        r#"{"commands": [{
            "name": "Create Sensor",
            "verb": "Create",
            "family": "Sensor",
            "entity_type": "Sensor",
            "alternate_names": ["Update Sensor"],
            "qualified_name_prefix": "Sensor",
            "attributes": [
                {"key": "display_name", "style": "Simple", "labels": ["Display Name", "Sensor"], "input_required": true},
                {"key": "range", "style": "Simple Int", "labels": ["Range"]},
                {"key": "qualified_name", "style": "QN", "labels": ["Qualified Name"]},
                {"key": "guid", "style": "ID", "labels": ["GUID"]}
            ]
        }]}"#,
    )
    .unwrap();

    let table = CommandTable::load(Some(&table_path)).unwrap();
    let catalog = MemoryCatalog::new();
    let processor = DocumentProcessor::new(Executor::new(&table, &catalog).unwrap(), Directive::Process);
    let report = processor.process("sensors.md", "# Create Sensor\n## Sensor\nThermo\n## Range\n120\n___\n# Create Glossary\n## Name\nParts\n___\n");

    assert_eq!(report.count("applied"), 1);
    assert_eq!(report.failed(), 1);
    let stored = catalog.by_qualified_name("Sensor::Thermo");
    assert_eq!(stored[0].properties.get("range"), Some(&serde_json::json!(120)));
}

#[test]
fn processed_document_is_written_once_per_pass() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("terms.md");
    std::fs::write(&source, WIDGET).unwrap();

    let catalog = MemoryCatalog::new();
    let report = processor(&catalog, Directive::Process).process_file(&source).unwrap();
    assert!(report.should_persist());

    let path = report.write(dir.path(), &source, stamp()).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "terms-processed-2024-06-01-10-00-00.md"
    );
    let written = std::fs::read_to_string(path).unwrap();
    assert!(written.contains("# Glossary Term Widget"));
    assert!(written.contains("* Derived from processing file terms.md on "));
}
