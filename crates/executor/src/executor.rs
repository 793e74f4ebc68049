//! The Executor - single entry point from a command block to the catalog.
//!
//! The Executor is a stateless dispatcher: it holds the registry and the
//! catalog client, while all per-pass state lives in the caller's
//! [`ProcessingContext`]. Dispatch is one registry lookup, one parse and one
//! handler call.

use quill_core::{
    CatalogClient, CatalogError, CatalogErrorKind, CatalogResult, CommandSpecification, Directive,
    EntityMatch, EntityRecord, Error, Guid, OutputFormat, ParsedCommand, Properties, Result,
};
use quill_engine::{parse_command, CommandBlock, CommandTable, ProcessingContext};

use crate::handlers::HandlerContext;
use crate::registry::{Registration, Registry};
use crate::Output;

/// Stand-in catalog for the display directive: every lookup finds nothing
/// and every write is refused, so a display pass never reaches the real
/// catalog.
struct Unreachable;

impl Unreachable {
    fn refuse<T>(&self, operation: &str) -> CatalogResult<T> {
        Err(CatalogError::new(
            CatalogErrorKind::Protocol,
            format!("{} is not available under the display directive", operation),
        ))
    }
}

impl CatalogClient for Unreachable {
    fn lookup_by_name(&self, _: &str, _: &str) -> CatalogResult<Vec<EntityMatch>> {
        Ok(Vec::new())
    }

    fn lookup_by_guid(&self, _: &str, _: &Guid) -> CatalogResult<Option<EntityRecord>> {
        Ok(None)
    }

    fn find(&self, _: &str, _: &str) -> CatalogResult<Vec<EntityMatch>> {
        Ok(Vec::new())
    }

    fn create(&self, _: &str, _: &Properties) -> CatalogResult<Guid> {
        self.refuse("create")
    }

    fn update(&self, _: &str, _: &Guid, _: &Properties, _: bool) -> CatalogResult<()> {
        self.refuse("update")
    }

    fn link(&self, _: &str, _: &Guid, _: &Guid, _: &Properties) -> CatalogResult<()> {
        self.refuse("link")
    }

    fn related(&self, _: &str, _: &Guid, _: &Guid) -> CatalogResult<bool> {
        Ok(false)
    }

    fn detach(&self, _: &str, _: &Guid, _: &Guid) -> CatalogResult<()> {
        self.refuse("detach")
    }

    fn delete(&self, _: &str, _: &Guid) -> CatalogResult<()> {
        self.refuse("delete")
    }

    fn render(&self, _: &Guid, _: OutputFormat) -> CatalogResult<String> {
        self.refuse("render")
    }
}

/// The command executor.
///
/// # Example
///
/// ```ignore
/// use quill_catalog::MemoryCatalog;
/// use quill_core::{Directive, UsageLevel};
/// use quill_engine::{segment, CommandTable, ProcessingContext, Segment};
/// use quill_executor::Executor;
///
/// let catalog = MemoryCatalog::new();
/// let executor = Executor::new(&CommandTable::builtin()?, &catalog)?;
/// let mut ctx = ProcessingContext::new(UsageLevel::Basic);
///
/// for piece in segment(document) {
///     if let Segment::Command(block) = piece {
///         let output = executor.execute(&mut ctx, &block, Directive::Validate)?;
///     }
/// }
/// ```
pub struct Executor<C> {
    registry: Registry,
    catalog: C,
}

impl<C: CatalogClient> Executor<C> {
    /// Build an executor over every command of `table`.
    pub fn new(table: &CommandTable, catalog: C) -> Result<Self> {
        Ok(Self::with_registry(Registry::from_table(table)?, catalog))
    }

    /// Build an executor over a prepared registry.
    pub fn with_registry(registry: Registry, catalog: C) -> Self {
        Self { registry, catalog }
    }

    /// The command registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The catalog commands are applied to.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    fn registration(&self, block: &CommandBlock) -> Result<&Registration> {
        self.registry
            .get(&block.command)
            .ok_or_else(|| Error::UnknownCommand {
                command: block.command.clone(),
            })
    }

    fn catalog_for(&self, directive: Directive) -> &dyn CatalogClient {
        match directive {
            Directive::Display => &Unreachable,
            _ => &self.catalog,
        }
    }

    /// Parse a block without handling it.
    pub fn parse(
        &self,
        ctx: &mut ProcessingContext,
        block: &CommandBlock,
        directive: Directive,
    ) -> Result<ParsedCommand> {
        let registration = self.registration(block)?;
        parse_command(ctx, self.catalog_for(directive), &registration.spec, &block.text)
    }

    /// Parse and handle one block.
    ///
    /// # Errors
    ///
    /// Unknown commands, unreadable headers and catalog faults. Validation
    /// failures are never errors; they come back as an [`Output`].
    pub fn execute(
        &self,
        ctx: &mut ProcessingContext,
        block: &CommandBlock,
        directive: Directive,
    ) -> Result<Output> {
        let registration = self.registration(block)?;
        let spec: &CommandSpecification = &registration.spec;
        let catalog = self.catalog_for(directive);

        let cmd = parse_command(ctx, catalog, spec, &block.text)?;
        let mut hc = HandlerContext { catalog, ctx, spec };
        let output = (registration.handler)(&mut hc, &cmd, directive)
            .map_err(|e| e.in_command(&spec.name))?;

        tracing::debug!(
            target: "quill::executor",
            command = %block.command,
            line = block.start_line,
            %directive,
            outcome = output.kind(),
            "Block handled"
        );
        Ok(output)
    }

    /// Execute several blocks in order against one context.
    ///
    /// A failing block does not stop the ones after it.
    pub fn execute_many(
        &self,
        ctx: &mut ProcessingContext,
        blocks: &[CommandBlock],
        directive: Directive,
    ) -> Vec<Result<Output>> {
        blocks
            .iter()
            .map(|block| self.execute(ctx, block, directive))
            .collect()
    }
}
