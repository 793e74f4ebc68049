//! Re-processing a clean document against unchanged catalog state makes no
//! mutating calls.

use crate::common::*;

const CATALOG_DOC: &str = "\
# Create Glossary
## Glossary Name
Parts
## Description
Everything in the warehouse.
___

# Create Glossary Term
## Term Name
Widget
## In Glossary
Parts
___

# Create Glossary Term
## Term Name
Gadget
## In Glossary
Parts
___

# Link Related Terms
## Term 1
Widget
## Term 2
Gadget
___

# Create Collection
## Collection Name
Favourites
___

# Add Member to Collection
## Collection
Favourites
## Member
GlossaryTerm::Widget
___
";

#[test]
fn first_pass_applies_everything() {
    let catalog = MemoryCatalog::new();
    let report = run(&catalog, Directive::Process, CATALOG_DOC);

    assert_eq!(report.count("applied"), 6, "{:#?}", report.outcomes);
    assert_eq!(catalog.len(), 4);
    // Two term anchors, the related-term link and the membership
    assert_eq!(catalog.relationships().len(), 4);
}

#[test]
fn second_pass_mutates_nothing() {
    let catalog = MemoryCatalog::new();
    run(&catalog, Directive::Process, CATALOG_DOC);
    let relationships = catalog.relationships().len();
    catalog.reset_counts();

    let second = run(&catalog, Directive::Process, CATALOG_DOC);

    assert_eq!(second.count("converted"), 4);
    // Links between existing ends hold already and are only rendered
    assert_eq!(second.count("applied"), 2);
    assert_eq!(second.failed(), 0);
    assert_eq!(catalog.counts().mutations(), 0);
    assert_eq!(catalog.len(), 4);
    assert_eq!(catalog.relationships().len(), relationships);
}

#[test]
fn converted_output_validates_cleanly() {
    let catalog = MemoryCatalog::new();
    run(&catalog, Directive::Process, CATALOG_DOC);
    let second = run(&catalog, Directive::Process, CATALOG_DOC);

    let validated = run(&catalog, Directive::Validate, &second.output);
    let invalid: Vec<_> = validated
        .outcomes
        .iter()
        .filter(|o| !matches!(o.result, Ok(Output::Validated { valid: true, .. })))
        .map(|o| o.command.clone())
        .collect();
    assert!(invalid.is_empty(), "invalid blocks: {:?}", invalid);
}
