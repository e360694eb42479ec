//! Template registry: the `with_arg` / `with_no_arg` halves consulted by the renderer.
//!
//! A registry is built once at startup (usually with [`TemplateRegistry::from_config`])
//! and passed by reference to every render call; it is never mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use medsql_core::{Config, TemplateTag};

use crate::catalog::{self, Catalog};
use crate::error::RenderError;

/// Which registry half a tag lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Takes `(schema, concept)`; used by `<TAG-TEMPLATE><ARG-DOMAIN><INDEX>`.
    WithArg,
    /// Precomputed fragment; used by bare `<TAG-TEMPLATE>`.
    WithNoArg,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::WithArg => write!(f, "with_arg"),
            TemplateKind::WithNoArg => write!(f, "with_no_arg"),
        }
    }
}

/// Renders the SQL fragment for one concept value.
///
/// Implementations may do I/O; the renderer calls them synchronously and
/// imposes no timeout. Plain closures `Fn(&str, &str) -> String` qualify.
pub trait ArgRenderer: Send + Sync {
    fn render(&self, schema: &str, concept: &str) -> Result<String, RenderError>;

    /// Short description for listings.
    fn describe(&self) -> String {
        "<callback>".to_string()
    }
}

impl<F> ArgRenderer for F
where
    F: Fn(&str, &str) -> String + Send + Sync,
{
    fn render(&self, schema: &str, concept: &str) -> Result<String, RenderError> {
        Ok(self(schema, concept))
    }
}

struct NoArgEntry {
    fragment: String,
    source: String,
}

/// One row of [`TemplateRegistry::entries`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub tag: String,
    pub placeholder: String,
    pub kind: TemplateKind,
    pub source: String,
}

/// Schema name plus the two tag → renderer mappings.
pub struct TemplateRegistry {
    schema: String,
    max_expansions: Option<usize>,
    with_arg: BTreeMap<TemplateTag, Box<dyn ArgRenderer>>,
    with_no_arg: BTreeMap<TemplateTag, NoArgEntry>,
}

impl TemplateRegistry {
    /// Empty registry for `schema`.
    pub fn new(schema: impl Into<String>) -> Self {
        TemplateRegistry {
            schema: schema.into(),
            max_expansions: None,
            with_arg: BTreeMap::new(),
            with_no_arg: BTreeMap::new(),
        }
    }

    /// Registry backed by the template catalog: embedded defaults, overridden by
    /// `config.template_dir`, with the tag mapping of `config` merged over the
    /// default mapping. `with_no_arg` fragments are rendered here, once.
    pub fn from_config(config: &Config) -> Result<Self, RenderError> {
        let catalog = Catalog::load(config.template_dir.as_deref())?;
        let mut registry = TemplateRegistry::new(&config.schema);
        registry.max_expansions = config.max_expansions;

        for (tag, name) in catalog::merged_mapping(catalog::DEFAULT_WITH_ARG, &config.with_arg) {
            let template = catalog.arg_template(&name)?;
            registry.with_arg.insert(tag, Box::new(template));
        }
        for (tag, name) in
            catalog::merged_mapping(catalog::DEFAULT_WITH_NO_ARG, &config.with_no_arg)
        {
            let fragment = catalog.render(&name, &config.schema, None)?;
            registry.with_no_arg.insert(
                tag,
                NoArgEntry {
                    fragment,
                    source: catalog::normalize_template_name(&name),
                },
            );
        }
        tracing::debug!(
            with_arg = registry.with_arg.len(),
            with_no_arg = registry.with_no_arg.len(),
            schema = %registry.schema,
            "template registry ready"
        );
        Ok(registry)
    }

    /// Register (or replace) the `with_arg` renderer for `tag`.
    pub fn with_arg_renderer<R>(mut self, tag: impl Into<TemplateTag>, renderer: R) -> Self
    where
        R: ArgRenderer + 'static,
    {
        self.with_arg.insert(tag.into(), Box::new(renderer));
        self
    }

    /// Register (or replace) the precomputed `with_no_arg` fragment for `tag`.
    pub fn with_no_arg_fragment(
        mut self,
        tag: impl Into<TemplateTag>,
        fragment: impl Into<String>,
    ) -> Self {
        self.with_no_arg.insert(
            tag.into(),
            NoArgEntry {
                fragment: fragment.into(),
                source: "<fragment>".to_string(),
            },
        );
        self
    }

    /// Fail a render call after `limit` substitutions instead of looping on a
    /// template that expands to itself. Unlimited by default.
    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn max_expansions(&self) -> Option<usize> {
        self.max_expansions
    }

    pub fn arg_renderer(&self, tag: &str) -> Option<&dyn ArgRenderer> {
        self.with_arg.get(tag).map(|r| &**r)
    }

    pub fn no_arg_fragment(&self, tag: &str) -> Option<&str> {
        self.with_no_arg.get(tag).map(|e| e.fragment.as_str())
    }

    /// All registered tags, `with_arg` first, each half sorted by tag.
    pub fn entries(&self) -> Vec<RegistryEntry> {
        let with_arg = self.with_arg.iter().map(|(tag, r)| RegistryEntry {
            tag: tag.0.clone(),
            placeholder: format!("{}<ARG-DOMAIN><N>", tag.placeholder()),
            kind: TemplateKind::WithArg,
            source: r.describe(),
        });
        let with_no_arg = self.with_no_arg.iter().map(|(tag, e)| RegistryEntry {
            tag: tag.0.clone(),
            placeholder: tag.placeholder(),
            kind: TemplateKind::WithNoArg,
            source: e.source.clone(),
        });
        with_arg.chain(with_no_arg).collect()
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("schema", &self.schema)
            .field("max_expansions", &self.max_expansions)
            .field("with_arg", &self.with_arg.keys().collect::<Vec<_>>())
            .field("with_no_arg", &self.with_no_arg.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
