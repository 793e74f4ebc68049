//! Reference cache consistency: a name resolved once in a pass is never
//! looked up remotely again in that pass.

use crate::common::*;

#[test]
fn second_resolution_is_served_from_cache() {
    let catalog = MemoryCatalog::new();
    catalog.insert("GlossaryTerm", "GlossaryTerm::Widget", "Widget");
    let executor = executor(&catalog);
    let mut ctx = ProcessingContext::new(UsageLevel::Basic);
    let block = &blocks(WIDGET)[0];

    executor.parse(&mut ctx, block, Directive::Validate).unwrap();
    let after_first = catalog.counts().lookups;
    assert!(after_first > 0);

    let cmd = executor.parse(&mut ctx, block, Directive::Validate).unwrap();
    assert_eq!(catalog.counts().lookups, after_first);
    assert!(cmd.exists);
    assert_eq!(cmd.qualified_name.as_deref(), Some("GlossaryTerm::Widget"));
}

#[test]
fn qualified_name_and_display_name_share_an_entry() {
    let catalog = MemoryCatalog::new();
    let guid = catalog.insert("GlossaryTerm", "GlossaryTerm::Gadget", "Gadget");
    let executor = executor(&catalog);
    let mut ctx = ProcessingContext::new(UsageLevel::Basic);

    let by_name = "# Update Term\n## Term Name\nGadget\n";
    let by_qn = "# Update Term\n## Term Name\nGadget\n## Qualified Name\nGlossaryTerm::Gadget\n";

    executor.parse(&mut ctx, &blocks(by_name)[0], Directive::Validate).unwrap();
    let lookups = catalog.counts().lookups;
    let cmd = executor.parse(&mut ctx, &blocks(by_qn)[0], Directive::Validate).unwrap();

    assert_eq!(catalog.counts().lookups, lookups);
    assert_eq!(cmd.guid, Some(guid));
}

#[test]
fn created_entities_resolve_without_lookup() {
    let catalog = MemoryCatalog::new();
    let doc = "# Create Glossary\n## Name\nParts\n___\n# Create Term\n## Term\nWidget\n## In Glossary\nParts\n___\n";
    let processor = processor(&catalog, Directive::Process);
    let mut ctx = processor.new_context();

    let report = processor.process_at(&mut ctx, "doc.md", doc, stamp());

    assert_eq!(report.count("applied"), 2);
    let glossary = ctx.cache.get("Glossary::Parts").unwrap();
    assert_eq!(
        glossary.guid.as_ref(),
        Some(&catalog.by_qualified_name("Glossary::Parts")[0].guid)
    );
    assert!(ctx.cache.get("GlossaryTerm::Widget").unwrap().guid.is_some());
}

#[test]
fn fresh_pass_starts_with_empty_cache() {
    let catalog = MemoryCatalog::new();
    catalog.insert("GlossaryTerm", "GlossaryTerm::Widget", "Widget");

    run(&catalog, Directive::Validate, WIDGET);
    let first = catalog.counts().lookups;
    run(&catalog, Directive::Validate, WIDGET);

    assert_eq!(catalog.counts().lookups, 2 * first);
}
