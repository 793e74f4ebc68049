//! The Widget scenarios: create, re-process, ambiguity.

use crate::common::*;

#[test]
fn widget_is_created() {
    let catalog = MemoryCatalog::new();
    let report = run(&catalog, Directive::Process, WIDGET);

    assert_eq!(report.count("applied"), 1);
    assert_eq!(catalog.counts().creates, 1);
    assert_eq!(catalog.counts().mutations(), 1);

    let stored = catalog.by_qualified_name("GlossaryTerm::Widget");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].display_name(), Some("Widget"));
    assert!(report.should_persist());
    assert!(report.output.starts_with("# Glossary Term Widget\n"));
}

#[test]
fn existing_widget_is_converted_to_update() {
    let catalog = MemoryCatalog::new();
    let guid = catalog.insert("GlossaryTerm", "GlossaryTerm::Widget", "Widget");

    let report = run(&catalog, Directive::Process, WIDGET);

    assert_eq!(report.count("converted"), 1);
    assert_eq!(catalog.counts().mutations(), 0);
    let expected = format!(
        "# Update Glossary Term\n## Display Name\nWidget\n## Description\nA small mechanical part.\n\n## Qualified Name\nGlossaryTerm::Widget\n\n## GUID\n{}\n___\n",
        guid
    );
    assert!(report.output.starts_with(&expected));

    // The rewritten block is valid as written
    let validated = run(&catalog, Directive::Validate, &report.output);
    assert_eq!(validated.count("validated"), 1);
    match &validated.outcomes[0].result {
        Ok(Output::Validated { valid, .. }) => assert!(*valid),
        other => panic!("expected Validated, got {:?}", other),
    }
}

#[test]
fn ambiguous_widget_is_left_alone() {
    let catalog = MemoryCatalog::new();
    catalog.insert("GlossaryTerm", "GlossaryTerm::Widget", "Widget");
    catalog.insert("GlossaryTerm", "Gears::Widget", "Widget");

    let report = run(&catalog, Directive::Process, WIDGET);

    assert_eq!(report.count("skipped"), 1);
    assert_eq!(catalog.counts().mutations(), 0);
    match &report.outcomes[0].result {
        Ok(Output::Skipped { reason }) => {
            assert!(reason.contains("Qualified Name"));
            assert!(reason.contains("Gears::Widget"));
        }
        other => panic!("expected Skipped, got {:?}", other),
    }
    assert!(report.output.starts_with(WIDGET));
    assert!(!report.should_persist());
}
