//! Question masking.
//!
//! Before the question goes to the sequence model, every resolved entity
//! mention is replaced by the bare placeholder that will later be rendered
//! back from the argument dictionary: the `i`-th `DRUG` entity becomes
//! `<ARG-DRUG><i>`. Build the matching dictionary with
//! [`ArgumentDictionary::from_entities`](crate::types::ArgumentDictionary::from_entities).

use std::collections::HashMap;

use regex::{Captures, RegexBuilder};
use thiserror::Error;

use crate::types::EntitySet;

/// Errors from question masking.
#[derive(Debug, Error)]
pub enum MaskError {
    /// The combined mention pattern could not be compiled (e.g. exceeds the size limit).
    #[error("failed to build mention pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Replace each entity mention in `question` with its `<ARG-DOMAIN><INDEX>` placeholder.
///
/// Matching is case-insensitive and whole-word. All mentions are replaced in
/// one pass over the question, longest surface text first, so a placeholder
/// already written is never matched again. When two entities share a surface
/// text the first one (domain order, then list order) wins.
pub fn mask_question(question: &str, entities: &EntitySet) -> Result<String, MaskError> {
    let mut replacements: HashMap<String, String> = HashMap::new();
    let mut texts: Vec<&str> = Vec::new();
    for (domain, list) in entities.iter() {
        for (index, entity) in list.iter().enumerate() {
            let text = entity.text.trim();
            if text.is_empty() {
                continue;
            }
            let key = text.to_lowercase();
            if replacements.contains_key(&key) {
                continue;
            }
            replacements.insert(key, domain.placeholder(index));
            texts.push(text);
        }
    }
    if texts.is_empty() {
        return Ok(question.to_string());
    }

    texts.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    let alternation = texts
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
        .case_insensitive(true)
        .build()?;

    let masked = pattern.replace_all(question, |caps: &Captures<'_>| {
        let found = &caps[0];
        match replacements.get(&found.to_lowercase()) {
            Some(placeholder) => placeholder.clone(),
            // Case folding matched something lowercasing does not map back.
            None => found.to_string(),
        }
    });
    tracing::debug!(mentions = texts.len(), "masked question");
    Ok(masked.into_owned())
}
