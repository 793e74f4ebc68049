//! Output enum for command handling results.
//!
//! Every handled block produces exactly one output. Which variant depends on
//! the directive, the parse outcome and the command's verb, never on the
//! command family.

use serde::{Deserialize, Serialize};

use quill_core::{Guid, Verb};

/// Result of handling one command block.
///
/// # Example
///
/// ```text
/// match executor.execute(&mut ctx, &block, Directive::Process)? {
///     Output::Applied { guid, text } => println!("{} -> {}", guid, text),
///     Output::Converted { verb, .. } => println!("rewritten as {}", verb),
///     Output::Skipped { reason } => eprintln!("skipped: {}", reason),
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    /// Display directive: the parsed structure, echoed
    Echo(String),

    /// Validate directive: the parse outcome
    Validated {
        /// Whether the block would be applied
        valid: bool,
        /// Diagnostics collected while parsing
        reasons: Vec<String>,
    },

    /// The block contradicted catalog state and was rewritten
    Converted {
        /// Verb of the rewritten block
        verb: Verb,
        /// The rewritten block text
        text: String,
    },

    /// A mutation was applied
    Applied {
        /// The entity the mutation was applied to
        guid: Guid,
        /// Catalog rendering of that entity
        text: String,
    },

    /// A View/List command ran
    Listed {
        /// Number of entities listed
        count: usize,
        /// Rendered results
        text: String,
    },

    /// Nothing was done
    Skipped {
        /// Why
        reason: String,
    },
}

impl Output {
    /// Whether this output changed catalog state or rewrote the block.
    pub fn changes_document(&self) -> bool {
        matches!(self, Output::Applied { .. } | Output::Converted { .. })
    }

    /// Short name for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Output::Echo(_) => "echo",
            Output::Validated { .. } => "validated",
            Output::Converted { .. } => "converted",
            Output::Applied { .. } => "applied",
            Output::Listed { .. } => "listed",
            Output::Skipped { .. } => "skipped",
        }
    }
}
