//! Query rendering: skeleton + registry + arguments → executable SQL.
//!
//! # Stages
//!
//! | Stage | Placeholder                          | Replaced by                              |
//! |-------|--------------------------------------|------------------------------------------|
//! | 1     | `<SCHEMA>`                           | schema name, one global substitution     |
//! | 2     | `<TAG-TEMPLATE><ARG-DOMAIN><INDEX>`  | `with_arg[TAG](schema, args[DOMAIN][INDEX])` |
//! | 3     | `<ARG-DOMAIN><INDEX>`                | `args[DOMAIN][INDEX]`, verbatim          |
//! | 4     | `<TAG-TEMPLATE>`                     | `with_no_arg[TAG]`                       |
//!
//! Stages 2–4 replace one placeholder at a time and then rescan the whole
//! query from offset 0, so fragments injected by a template are themselves
//! expanded. A stage runs until its grammar no longer matches anywhere before
//! the next one starts. Stage 2 must finish before stage 4 because every
//! stage 2 placeholder begins with a stage 4 placeholder.

use medsql_core::ArgumentDictionary;

use crate::error::RenderError;
use crate::lint;
use crate::registry::{TemplateKind, TemplateRegistry};
use crate::scanner::{self, Grammar, Placeholder, SCHEMA_MARKER};

/// Render `query` against `registry` and `args`.
///
/// Fails on the first placeholder that cannot be resolved; nothing is
/// returned for a partially rendered query. Text that is not an exact
/// placeholder is copied through, and any `<WORD>`-shaped leftovers are
/// logged at `warn`.
pub fn render_template_query(
    query: &str,
    registry: &TemplateRegistry,
    args: &ArgumentDictionary,
) -> Result<String, RenderError> {
    let mut sql = query.replace(SCHEMA_MARKER, registry.schema());
    let mut budget = Budget::new(registry.max_expansions());

    exhaust(&mut sql, Grammar::TemplateArg, &mut budget, |placeholder| {
        let Placeholder::TemplateArg { tag, domain, index } = *placeholder else {
            return Ok(placeholder.to_string());
        };
        let concept = lookup(args, domain, index, placeholder)?;
        let renderer = registry
            .arg_renderer(tag)
            .ok_or_else(|| RenderError::UnknownTemplate {
                tag: tag.to_string(),
                kind: TemplateKind::WithArg,
            })?;
        renderer
            .render(registry.schema(), concept)
            .map_err(|e| RenderError::Template {
                tag: tag.to_string(),
                source: Box::new(e),
            })
    })?;

    exhaust(&mut sql, Grammar::BareArg, &mut budget, |placeholder| {
        let Placeholder::BareArg { domain, index } = *placeholder else {
            return Ok(placeholder.to_string());
        };
        lookup(args, domain, index, placeholder).map(str::to_string)
    })?;

    exhaust(&mut sql, Grammar::NoArgTemplate, &mut budget, |placeholder| {
        let Placeholder::NoArgTemplate { tag } = *placeholder else {
            return Ok(placeholder.to_string());
        };
        registry
            .no_arg_fragment(tag)
            .map(str::to_string)
            .ok_or_else(|| RenderError::UnknownTemplate {
                tag: tag.to_string(),
                kind: TemplateKind::WithNoArg,
            })
    })?;

    for token in lint::find_unrendered(&sql) {
        tracing::warn!(token = %token.text, offset = token.start, "unrendered token in query");
    }
    Ok(sql)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Substitutions made so far, checked against the registry's optional cap.
struct Budget {
    limit: Option<usize>,
    spent: usize,
}

impl Budget {
    fn new(limit: Option<usize>) -> Self {
        Budget { limit, spent: 0 }
    }

    fn spend(&mut self) -> Result<(), RenderError> {
        if let Some(limit) = self.limit {
            if self.spent >= limit {
                return Err(RenderError::ExpansionLimit { limit });
            }
        }
        self.spent += 1;
        Ok(())
    }
}

/// Replace the leftmost match of `grammar` with `resolve`'s output until none remain.
fn exhaust<F>(
    sql: &mut String,
    grammar: Grammar,
    budget: &mut Budget,
    mut resolve: F,
) -> Result<(), RenderError>
where
    F: FnMut(&Placeholder<'_>) -> Result<String, RenderError>,
{
    while let Some(found) = scanner::find_first(sql.as_str(), grammar) {
        budget.spend()?;
        let replacement = resolve(&found.placeholder)?;
        tracing::debug!(
            placeholder = %found.placeholder,
            offset = found.start,
            len = replacement.len(),
            "substituted placeholder"
        );
        let range = found.start..found.end;
        sql.replace_range(range, &replacement);
    }
    Ok(())
}

/// `args[domain][index]`, with the placeholder text attached to any failure.
fn lookup<'a>(
    args: &'a ArgumentDictionary,
    domain: &str,
    index: &str,
    placeholder: &Placeholder<'_>,
) -> Result<&'a str, RenderError> {
    let values = args
        .values(domain)
        .ok_or_else(|| RenderError::UnknownDomain {
            domain: domain.to_string(),
            placeholder: placeholder.to_string(),
        })?;
    // Digit runs too long for usize cannot be in range either.
    index
        .parse::<usize>()
        .ok()
        .and_then(|i| values.get(i))
        .map(String::as_str)
        .ok_or_else(|| RenderError::IndexOutOfRange {
            domain: domain.to_string(),
            index: index.to_string(),
            len: values.len(),
            placeholder: placeholder.to_string(),
        })
}
