//! Domain types shared by the renderer and the CLI.
//!
//! All types are serializable/deserializable via serde + serde_yaml so that
//! argument dictionaries and entity sets can be read from JSON or YAML files.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of a renderer family, e.g. `DRUG` in `<DRUG-TEMPLATE>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TemplateTag(pub String);

impl TemplateTag {
    /// The placeholder text for this tag, e.g. `<DRUG-TEMPLATE>`.
    pub fn placeholder(&self) -> String {
        format!("<{}-TEMPLATE>", self.0)
    }
}

impl fmt::Display for TemplateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TemplateTag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TemplateTag {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Borrow<str> for TemplateTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Argument-dictionary key grouping same-category concept values (`DRUG`, `GENDER`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Domain(pub String);

impl Domain {
    /// The bare placeholder for the `index`-th value of this domain, e.g. `<ARG-DRUG><0>`.
    pub fn placeholder(&self, index: usize) -> String {
        format!("<ARG-{}><{}>", self.0, index)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Domain {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Domain {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Borrow<str> for Domain {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// An entity mention after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    /// Surface form as it appears in the question.
    pub text: String,
    /// Normalized concept value (RxNorm code, ICD10 code, canonical name).
    pub query_arg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<usize>,
}

impl ResolvedEntity {
    pub fn new(text: impl Into<String>, query_arg: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            query_arg: query_arg.into(),
            begin_offset: None,
            end_offset: None,
        }
    }
}

/// Resolved entities grouped by domain; list position is the placeholder index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntitySet(pub BTreeMap<Domain, Vec<ResolvedEntity>>);

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity to `domain`, returning its placeholder index.
    pub fn push(&mut self, domain: impl Into<Domain>, entity: ResolvedEntity) -> usize {
        let list = self.0.entry(domain.into()).or_default();
        list.push(entity);
        list.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Domain, &[ResolvedEntity])> {
        self.0.iter().map(|(d, v)| (d, v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

// ---------------------------------------------------------------------------
// Argument dictionary
// ---------------------------------------------------------------------------

/// Domain → ordered concept values, indexed positionally by placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentDictionary(BTreeMap<Domain, Vec<String>>);

impl ArgumentDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from resolved entities: each domain maps to its `query_arg`s in order.
    pub fn from_entities(entities: &EntitySet) -> Self {
        let map = entities
            .iter()
            .map(|(domain, list)| {
                let values = list.iter().map(|e| e.query_arg.clone()).collect();
                (domain.clone(), values)
            })
            .collect();
        Self(map)
    }

    /// Replace the values of `domain`.
    pub fn insert<I, S>(&mut self, domain: impl Into<Domain>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(domain.into(), values.into_iter().map(Into::into).collect());
    }

    /// Append a value to `domain`, returning its index.
    pub fn push(&mut self, domain: impl Into<Domain>, value: impl Into<String>) -> usize {
        let list = self.0.entry(domain.into()).or_default();
        list.push(value.into());
        list.len() - 1
    }

    /// Append every value of `other` after the existing values of the same domain.
    pub fn extend(&mut self, other: ArgumentDictionary) {
        for (domain, values) in other.0 {
            self.0.entry(domain).or_default().extend(values);
        }
    }

    pub fn values(&self, domain: &str) -> Option<&[String]> {
        self.0.get(domain).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Domain, &[String])> {
        self.0.iter().map(|(d, v)| (d, v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<D, V> FromIterator<(D, Vec<V>)> for ArgumentDictionary
where
    D: Into<Domain>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (D, Vec<V>)>>(iter: T) -> Self {
        let mut args = Self::new();
        for (domain, values) in iter {
            args.insert(domain, values);
        }
        args
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(TemplateTag::from("DRUG").to_string(), "DRUG");
        assert_eq!(Domain::from("GENDER").to_string(), "GENDER");
    }

    #[test]
    fn placeholder_text() {
        assert_eq!(TemplateTag::from("STATENAME").placeholder(), "<STATENAME-TEMPLATE>");
        assert_eq!(Domain::from("DRUG").placeholder(3), "<ARG-DRUG><3>");
    }

    #[test]
    fn arguments_from_entities_keep_order() {
        let mut entities = EntitySet::new();
        entities.push("DRUG", ResolvedEntity::new("aspirin", "1191"));
        entities.push("DRUG", ResolvedEntity::new("ibuprofen", "5640"));
        entities.push("GENDER", ResolvedEntity::new("women", "FEMALE"));

        let args = ArgumentDictionary::from_entities(&entities);
        assert_eq!(args.values("DRUG").unwrap(), ["1191", "5640"]);
        assert_eq!(args.values("GENDER").unwrap(), ["FEMALE"]);
        assert!(args.values("RACE").is_none());
    }

    #[test]
    fn extend_appends_after_existing_values() {
        let mut args: ArgumentDictionary = [("DRUG", vec!["a"])].into_iter().collect();
        let more: ArgumentDictionary = [("DRUG", vec!["b"]), ("RACE", vec!["White"])]
            .into_iter()
            .collect();
        args.extend(more);
        assert_eq!(args.values("DRUG").unwrap(), ["a", "b"]);
        assert_eq!(args.values("RACE").unwrap(), ["White"]);
    }

    #[test]
    fn argument_dictionary_yaml_shape_is_a_plain_mapping() {
        let args: ArgumentDictionary =
            serde_yaml::from_str("DRUG: [aspirin, ibuprofen]\nDAYS: ['30']\n").expect("parse");
        assert_eq!(args.values("DRUG").unwrap()[1], "ibuprofen");
        assert_eq!(args.values("DAYS").unwrap()[0], "30");
    }

    #[test]
    fn entity_set_accepts_json() {
        let json = r#"{"CONDITION": [{"text": "laryngitis", "query_arg": "J04.0", "begin_offset": 12}]}"#;
        let set: EntitySet = serde_yaml::from_str(json).expect("parse");
        let (domain, list) = set.iter().next().unwrap();
        assert_eq!(domain.0, "CONDITION");
        assert_eq!(list[0].begin_offset, Some(12));
        assert_eq!(list[0].end_offset, None);
    }
}
