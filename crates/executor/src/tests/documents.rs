//! Document pass tests: output assembly, provenance and persistence.

use chrono::{NaiveDate, NaiveDateTime};
use quill_catalog::MemoryCatalog;
use quill_core::{CatalogError, CatalogErrorKind, Directive};

use super::{basic, executor, WIDGET};
use crate::{DocumentProcessor, DocumentReport, SEPARATOR};

const GLOSSARY_DOC: &str = "Intro text.\n\n# Create Glossary\n## Display Name\nParts\n___\n\n# Create Term\n## Term Name\nWidget\n## In Glossary\nParts\n___\n";

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn run(catalog: &MemoryCatalog, directive: Directive, doc: &str) -> DocumentReport {
    let processor = DocumentProcessor::new(executor(catalog), directive);
    processor.process_at(&mut basic(), "parts.md", doc, now())
}

#[test]
fn test_blocks_in_one_pass_see_each_other() {
    let catalog = MemoryCatalog::new();
    let report = run(&catalog, Directive::Process, GLOSSARY_DOC);

    assert_eq!(report.count("applied"), 2);
    assert_eq!(report.failed(), 0);
    assert_eq!(catalog.len(), 2);

    let rels = catalog.relationships();
    assert_eq!(rels.len(), 1);
    let glossary = &catalog.by_qualified_name("Glossary::Parts")[0];
    assert_eq!(rels[0].end1, glossary.guid);
}

#[test]
fn test_output_layout() {
    let catalog = MemoryCatalog::new();
    let report = run(&catalog, Directive::Process, GLOSSARY_DOC);

    assert!(report.output.starts_with("Intro text.\n\n# Glossary Parts\n"));
    assert_eq!(report.output.matches(SEPARATOR).count(), 2);
    assert!(report
        .output
        .ends_with("\n\n# Provenance\n\n* Derived from processing file parts.md on 2024-03-05 09:30\n"));
}

#[test]
fn test_reprocessing_input_changes_nothing() {
    let catalog = MemoryCatalog::new();
    let first = run(&catalog, Directive::Process, GLOSSARY_DOC);
    assert!(first.should_persist());

    catalog.reset_counts();
    let second = run(&catalog, Directive::Process, GLOSSARY_DOC);

    assert_eq!(second.count("converted"), 2);
    assert_eq!(catalog.counts().mutations(), 0);
    assert_eq!(catalog.len(), 2);
}

#[test]
fn test_existing_provenance_is_not_repeated() {
    let catalog = MemoryCatalog::new();
    let doc = format!("{}\n# Provenance\n\n* Derived from processing file old.md on 2024-01-01 08:00\n", WIDGET);

    let report = run(&catalog, Directive::Process, &doc);
    assert_eq!(report.output.matches("# Provenance").count(), 1);
    assert!(!report.output.contains("parts.md"));
}

#[test]
fn test_failed_block_keeps_its_text() {
    let catalog = MemoryCatalog::new();
    catalog.fail_next_mutation(CatalogError::new(CatalogErrorKind::Server, "unavailable"));

    let report = run(&catalog, Directive::Process, GLOSSARY_DOC);

    assert_eq!(report.failed(), 1);
    assert_eq!(report.outcomes[0].command, "Create Glossary");
    assert_eq!(report.outcomes[0].start_line, 3);
    assert!(report
        .output
        .contains("# Create Glossary\n## Display Name\nParts\n___\n"));
    // The term's glossary was never created
    assert_eq!(report.count("skipped"), 1);
    assert!(catalog.is_empty());
}

#[test]
fn test_validate_pass_is_not_persisted() {
    let catalog = MemoryCatalog::new();
    let report = run(&catalog, Directive::Validate, GLOSSARY_DOC);

    assert_eq!(report.count("validated"), 2);
    assert!(!report.should_persist());
    assert!(report.output.contains("# Create Term\n## Term Name\nWidget\n"));
    assert!(catalog.is_empty());
}

#[test]
fn test_display_pass_echoes() {
    let catalog = MemoryCatalog::new();
    let report = run(&catalog, Directive::Display, GLOSSARY_DOC);

    assert_eq!(report.count("echo"), 2);
    assert!(report.output.contains("* **Display Name**: Parts\n"));
    assert_eq!(catalog.counts().reads(), 0);
}

#[test]
fn test_write_and_process_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("parts.md");
    std::fs::write(&source, GLOSSARY_DOC).unwrap();

    let catalog = MemoryCatalog::new();
    let processor = DocumentProcessor::new(executor(&catalog), Directive::Process);
    let report = processor.process_file(&source).unwrap();
    assert!(report.output.contains("Derived from processing file parts.md"));

    let out_dir = dir.path().join("processed");
    let path = report.write(&out_dir, &source, now()).unwrap();
    assert_eq!(path, out_dir.join("parts-processed-2024-03-05-09-30-00.md"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), report.output);
}

#[test]
fn test_processor_context_carries_qualifier() {
    let catalog = MemoryCatalog::new();
    let processor = DocumentProcessor::new(executor(&catalog), Directive::Process)
        .with_local_qualifier("Acme");
    let report = processor.process("parts.md", WIDGET);

    assert_eq!(report.count("applied"), 1);
    assert_eq!(catalog.by_qualified_name("Acme::GlossaryTerm::Widget").len(), 1);
}

#[test]
fn test_glossary_and_term_sharing_a_name_are_both_created() {
    let catalog = MemoryCatalog::new();
    let doc = "# Create Glossary\n## Display Name\nWidget\n___\n\n# Create Glossary Term\n## Display Name\nWidget\n## In Glossary\nWidget\n___\n";
    let report = run(&catalog, Directive::Process, doc);

    assert_eq!(report.count("applied"), 2);
    assert_eq!(report.count("converted"), 0);
    assert_eq!(catalog.counts().creates, 2);

    let glossary = &catalog.by_qualified_name("Glossary::Widget")[0];
    let term = &catalog.by_qualified_name("GlossaryTerm::Widget")[0];
    assert_eq!(term.entity_type, "GlossaryTerm");
    let rels = catalog.relationships();
    assert_eq!(rels.len(), 1);
    assert_eq!(rels[0].relationship_type, "TermAnchor");
    assert_eq!(rels[0].end1, glossary.guid);
    assert_eq!(rels[0].end2, term.guid);
}

#[test]
fn test_prose_header_with_verb_alias_passes_through() {
    let catalog = MemoryCatalog::new();
    let doc = format!("# Add notes here\nRemember the bolts.\n\n{}", WIDGET);
    let report = run(&catalog, Directive::Process, &doc);

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.failed(), 0);
    assert!(report
        .output
        .starts_with("# Add notes here\nRemember the bolts.\n\n# Glossary Term Widget\n"));
    assert_eq!(report.output.matches(SEPARATOR).count(), 1);
}
