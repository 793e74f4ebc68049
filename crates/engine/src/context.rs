//! Per-pass processing state
//!
//! A `ProcessingContext` lives for exactly one document pass. It owns the
//! reference cache, so two passes never share memoized lookups unless the
//! caller deliberately reuses the context.

use quill_core::{Result, UsageLevel};

use crate::cache::ReferenceCache;
use crate::config::QuillConfig;

/// State threaded through the parser and handlers for one document pass.
#[derive(Debug, Clone, Default)]
pub struct ProcessingContext {
    /// Name to GUID memo for this pass
    pub cache: ReferenceCache,
    /// Highest attribute tier considered by the parser
    pub usage_level: UsageLevel,
    /// Optional prefix for synthesized qualified names
    pub local_qualifier: String,
}

impl ProcessingContext {
    /// A fresh context at the given usage level.
    pub fn new(usage_level: UsageLevel) -> Self {
        Self {
            usage_level,
            ..Self::default()
        }
    }

    /// A fresh context configured from `quill.toml` settings.
    pub fn from_config(config: &QuillConfig) -> Result<Self> {
        Ok(Self {
            cache: ReferenceCache::new(),
            usage_level: config.usage_level()?,
            local_qualifier: config.local_qualifier.trim().to_string(),
        })
    }

    /// Set the qualified-name prefix.
    pub fn with_local_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.local_qualifier = qualifier.into();
        self
    }

    /// Build a qualified name for a new entity.
    ///
    /// The shape is `[local_qualifier::]prefix::Name[::version]`, with
    /// whitespace runs in the name replaced by `-`.
    pub fn synthesize_qualified_name(&self, prefix: &str, name: &str, version: Option<&str>) -> String {
        let name = name.split_whitespace().collect::<Vec<_>>().join("-");
        let mut parts: Vec<&str> = Vec::with_capacity(4);
        if !self.local_qualifier.is_empty() {
            parts.push(&self.local_qualifier);
        }
        if !prefix.is_empty() {
            parts.push(prefix);
        }
        parts.push(&name);
        if let Some(v) = version.map(str::trim).filter(|v| !v.is_empty()) {
            parts.push(v);
        }
        parts.join("::")
    }
}
