//! Label synonymy: every label of an attribute yields the same parse.

use proptest::prelude::*;

use quill_catalog::MemoryCatalog;
use quill_core::UsageLevel;
use quill_engine::extract_section;

use crate::common::parse_as;

const TERM_LABELS: [&str; 3] = ["Display Name", "Term Name", "Term"];
const COLLECTION_LABELS: [&str; 4] = ["Display Name", "Collection Name", "Catalog Name", "Name"];

fn recase(label: &str, upper: bool) -> String {
    if upper {
        label.to_uppercase()
    } else {
        label.to_lowercase()
    }
}

proptest! {
    #[test]
    fn term_name_label_is_irrelevant(
        index in 0usize..TERM_LABELS.len(),
        upper in any::<bool>(),
        name in "[A-Z][a-z]{2,10}",
    ) {
        let catalog = MemoryCatalog::new();
        let label = recase(TERM_LABELS[index], upper);
        let block = format!("# Create Glossary Term\n## {}\n{}\n## Description\nSomething.\n", label, name);

        let cmd = parse_as(&catalog, UsageLevel::Basic, "Create Glossary Term", &block);
        prop_assert!(cmd.valid, "{}", cmd.reason_text());
        prop_assert_eq!(cmd.display_name.as_deref(), Some(name.as_str()));
        let expected = format!("GlossaryTerm::{}", name);
        prop_assert_eq!(cmd.qualified_name.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn collection_name_label_is_irrelevant(
        index in 0usize..COLLECTION_LABELS.len(),
        name in "[A-Z][a-z]{2,10}",
    ) {
        let catalog = MemoryCatalog::new();
        let block = format!("# Create Collection\n## {}\n{}\n", COLLECTION_LABELS[index], name);

        let cmd = parse_as(&catalog, UsageLevel::Basic, "Create Collection", &block);
        prop_assert!(cmd.valid, "{}", cmd.reason_text());
        let expected = format!("Collection::{}", name);
        prop_assert_eq!(cmd.qualified_name.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn blockquotes_never_change_a_section(
        body in "[a-zA-Z ]{1,40}",
        comment in "[a-zA-Z ]{0,40}",
    ) {
        let plain = format!("# Create Glossary\n## Description\n{}\n", body);
        let commented = format!("# Create Glossary\n> {}\n## Description\n> {}\n{}\n", comment, comment, body);
        prop_assert_eq!(
            extract_section(&plain, &["Description"]),
            extract_section(&commented, &["Description"])
        );
    }
}
