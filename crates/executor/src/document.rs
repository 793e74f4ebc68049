//! Document driver
//!
//! Runs every command block of a document through the [`Executor`] in
//! source order and assembles the output document:
//!
//! - text between blocks is passed through unchanged
//! - an applied block is replaced by the catalog's rendering
//! - a converted block is replaced by its rewritten text
//! - a skipped or failed block is kept as written
//!
//! Every command-derived piece is followed by a `___` rule line. A provenance
//! note is appended unless the document already carries one.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use quill_core::{CatalogClient, Directive, Result, UsageLevel};
use quill_engine::extract::{header_text, is_command_header};
use quill_engine::{segment_with, CommandBlock, ProcessingContext, QuillConfig, Segment};

use crate::{Executor, Output};

/// Rule line written after every command-derived piece of output.
pub const SEPARATOR: &str = "___\n";

/// Header of the provenance note.
pub const PROVENANCE_HEADER: &str = "Provenance";

/// What happened to one block.
#[derive(Debug)]
pub struct BlockOutcome {
    /// Command as written in the header
    pub command: String,
    /// 1-based line of the header in the source document
    pub start_line: usize,
    /// Handler output, or the fault that stopped the block
    pub result: Result<Output>,
}

impl BlockOutcome {
    /// Short outcome name for reports; `failed` for faults.
    pub fn kind(&self) -> &'static str {
        match &self.result {
            Ok(output) => output.kind(),
            Err(_) => "failed",
        }
    }
}

/// Result of one document pass.
#[derive(Debug)]
pub struct DocumentReport {
    /// Directive the pass ran under
    pub directive: Directive,
    /// The assembled output document
    pub output: String,
    /// Per-block outcomes, in source order
    pub outcomes: Vec<BlockOutcome>,
}

impl DocumentReport {
    /// Number of blocks with the given outcome kind.
    pub fn count(&self, kind: &str) -> usize {
        self.outcomes.iter().filter(|o| o.kind() == kind).count()
    }

    /// Number of blocks that failed with a fault.
    pub fn failed(&self) -> usize {
        self.count("failed")
    }

    /// Whether the output is worth writing: a processing pass that applied
    /// or converted at least one block.
    pub fn should_persist(&self) -> bool {
        self.directive == Directive::Process
            && self
                .outcomes
                .iter()
                .any(|o| o.result.as_ref().is_ok_and(Output::changes_document))
    }

    /// Write the output next to other processed documents.
    ///
    /// Returns the path written.
    pub fn write(&self, dir: &Path, source: &Path, now: NaiveDateTime) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = output_path(dir, source, now);
        fs::write(&path, &self.output)?;
        tracing::info!(target: "quill::document", path = %path.display(), "Processed document written");
        Ok(path)
    }
}

/// `<dir>/<stem>-processed-<YYYY-MM-DD-HH-MM-SS>.md`
pub fn output_path(dir: &Path, source: &Path, now: NaiveDateTime) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    dir.join(format!(
        "{}-processed-{}.md",
        stem,
        now.format("%Y-%m-%d-%H-%M-%S")
    ))
}

/// Whether `document` already has a `# Provenance` header.
pub fn has_provenance(document: &str) -> bool {
    document
        .lines()
        .any(|l| is_command_header(l) && header_text(l).eq_ignore_ascii_case(PROVENANCE_HEADER))
}

/// The note appended to processed documents.
pub fn provenance_note(source_name: &str, now: NaiveDateTime) -> String {
    format!(
        "# {}\n\n* Derived from processing file {} on {}\n",
        PROVENANCE_HEADER,
        source_name,
        now.format("%Y-%m-%d %H:%M")
    )
}

fn push_piece(out: &mut String, text: &str) {
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(SEPARATOR);
}

/// Runs whole documents through an [`Executor`].
pub struct DocumentProcessor<C> {
    executor: Executor<C>,
    directive: Directive,
    usage_level: UsageLevel,
    local_qualifier: String,
}

impl<C: CatalogClient> DocumentProcessor<C> {
    /// A processor at the basic usage level with no local qualifier.
    pub fn new(executor: Executor<C>, directive: Directive) -> Self {
        Self {
            executor,
            directive,
            usage_level: UsageLevel::Basic,
            local_qualifier: String::new(),
        }
    }

    /// A processor using the usage level and qualifier from `config`.
    pub fn from_config(executor: Executor<C>, directive: Directive, config: &QuillConfig) -> Result<Self> {
        Ok(Self::new(executor, directive)
            .with_usage_level(config.usage_level()?)
            .with_local_qualifier(config.local_qualifier.trim()))
    }

    /// Set the usage level of every pass.
    pub fn with_usage_level(mut self, level: UsageLevel) -> Self {
        self.usage_level = level;
        self
    }

    /// Set the qualified-name prefix of every pass.
    pub fn with_local_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.local_qualifier = qualifier.into();
        self
    }

    /// The executor blocks are run through.
    pub fn executor(&self) -> &Executor<C> {
        &self.executor
    }

    /// The directive every block runs under.
    pub fn directive(&self) -> Directive {
        self.directive
    }

    /// A fresh context for one pass.
    pub fn new_context(&self) -> ProcessingContext {
        ProcessingContext::new(self.usage_level).with_local_qualifier(self.local_qualifier.clone())
    }

    /// Process `document` in a fresh context, stamped with the local time.
    pub fn process(&self, source_name: &str, document: &str) -> DocumentReport {
        let mut ctx = self.new_context();
        self.process_at(&mut ctx, source_name, document, chrono::Local::now().naive_local())
    }

    /// Read and process a file.
    pub fn process_file(&self, path: &Path) -> Result<DocumentReport> {
        let document = fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.process(&name, &document))
    }

    /// Process `document` in `ctx`, stamping provenance with `now`.
    pub fn process_at(
        &self,
        ctx: &mut ProcessingContext,
        source_name: &str,
        document: &str,
        now: NaiveDateTime,
    ) -> DocumentReport {
        let mut output = String::with_capacity(document.len() + 128);
        let mut outcomes = Vec::new();

        let registry = self.executor.registry();
        for piece in segment_with(document, |command| registry.get(command).is_some()) {
            match piece {
                Segment::Text(text) => output.push_str(&text),
                Segment::Command(block) => {
                    let result = self.executor.execute(ctx, &block, self.directive);
                    self.emit(&mut output, &block, &result);
                    outcomes.push(BlockOutcome {
                        command: block.command,
                        start_line: block.start_line,
                        result,
                    });
                }
            }
        }

        if !has_provenance(document) {
            if !output.is_empty() && !output.ends_with("\n\n") {
                if !output.ends_with('\n') {
                    output.push('\n');
                }
                output.push('\n');
            }
            output.push_str(&provenance_note(source_name, now));
        }

        let report = DocumentReport {
            directive: self.directive,
            output,
            outcomes,
        };
        tracing::info!(
            target: "quill::document",
            source = source_name,
            directive = %self.directive,
            blocks = report.outcomes.len(),
            applied = report.count("applied"),
            converted = report.count("converted"),
            skipped = report.count("skipped"),
            failed = report.failed(),
            "Document processed"
        );
        report
    }

    fn emit(&self, out: &mut String, block: &CommandBlock, result: &Result<Output>) {
        match result {
            Ok(Output::Echo(text))
            | Ok(Output::Converted { text, .. })
            | Ok(Output::Applied { text, .. })
            | Ok(Output::Listed { text, .. }) => push_piece(out, text),
            Ok(Output::Validated { .. }) | Ok(Output::Skipped { .. }) => push_piece(out, &block.text),
            Err(e) => {
                tracing::error!(
                    target: "quill::document",
                    command = %block.command,
                    line = block.start_line,
                    retryable = e.is_retryable(),
                    error = %e,
                    "Block failed; original text kept"
                );
                push_piece(out, &block.text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(12, 4, 9)
            .unwrap()
    }

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("/out"), Path::new("docs/glossary.md"), noon());
        assert_eq!(path, PathBuf::from("/out/glossary-processed-2024-03-05-12-04-09.md"));
    }

    #[test]
    fn test_provenance() {
        assert_eq!(
            provenance_note("glossary.md", noon()),
            "# Provenance\n\n* Derived from processing file glossary.md on 2024-03-05 12:04\n"
        );
        assert!(has_provenance("text\n# provenance\n* earlier\n"));
        assert!(!has_provenance("## Provenance\n"));
    }
}
