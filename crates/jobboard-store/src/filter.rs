//! Filter expressions over JSON documents.
//!
//! A [`Filter`] is backend-neutral. [`Filter::to_document`] renders it as a
//! Mongo-style query document for the Data API; [`Filter::matcher`] compiles
//! it for in-memory evaluation with the same semantics:
//! - dotted paths walk nested objects
//! - an array field matches when any element matches
//! - missing and `null` fields never satisfy comparisons or patterns
//! - `$exists: false` holds only for missing fields

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::error::{StoreError, StoreResult};
use crate::pattern::Pattern;

/// Predicate applied to a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Value),
    Regex(Pattern),
    Gte(f64),
    Lte(f64),
    Exists(bool),
}

/// Boolean combination of field predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Field { path: String, condition: Condition },
}

impl Filter {
    /// Filter that matches every document.
    pub fn all() -> Self {
        Filter::And(Vec::new())
    }

    pub fn field(path: impl Into<String>, condition: Condition) -> Self {
        Filter::Field {
            path: path.into(),
            condition,
        }
    }

    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::field(path, Condition::Eq(value.into()))
    }

    pub fn regex(path: impl Into<String>, pattern: Pattern) -> Self {
        Self::field(path, Condition::Regex(pattern))
    }

    pub fn gte(path: impl Into<String>, value: f64) -> Self {
        Self::field(path, Condition::Gte(value))
    }

    pub fn lte(path: impl Into<String>, value: f64) -> Self {
        Self::field(path, Condition::Lte(value))
    }

    pub fn exists(path: impl Into<String>, exists: bool) -> Self {
        Self::field(path, Condition::Exists(exists))
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    /// Render as a Mongo-style query document.
    pub fn to_document(&self) -> Value {
        match self {
            Filter::And(filters) if filters.is_empty() => json!({}),
            Filter::And(filters) => {
                json!({ "$and": filters.iter().map(Filter::to_document).collect::<Vec<_>>() })
            }
            Filter::Or(filters) => {
                json!({ "$or": filters.iter().map(Filter::to_document).collect::<Vec<_>>() })
            }
            Filter::Field { path, condition } => {
                let mut doc = Map::new();
                doc.insert(path.clone(), condition_document(condition));
                Value::Object(doc)
            }
        }
    }

    /// Compile regexes once so the filter can be evaluated repeatedly.
    pub fn matcher(&self) -> StoreResult<Matcher> {
        let node = match self {
            Filter::And(filters) => MatchNode::And(
                filters
                    .iter()
                    .map(|f| f.matcher().map(|m| m.root))
                    .collect::<StoreResult<_>>()?,
            ),
            Filter::Or(filters) => MatchNode::Or(
                filters
                    .iter()
                    .map(|f| f.matcher().map(|m| m.root))
                    .collect::<StoreResult<_>>()?,
            ),
            Filter::Field { path, condition } => {
                let test = match condition {
                    Condition::Eq(value) => FieldTest::Eq(value.clone()),
                    Condition::Regex(pattern) => FieldTest::Regex(pattern.compile().map_err(
                        |e| StoreError::InvalidFilter(format!("pattern {}: {}", pattern.source(), e)),
                    )?),
                    Condition::Gte(value) => FieldTest::Gte(*value),
                    Condition::Lte(value) => FieldTest::Lte(*value),
                    Condition::Exists(exists) => FieldTest::Exists(*exists),
                };
                MatchNode::Field {
                    path: path.split('.').map(str::to_string).collect(),
                    test,
                }
            }
        };
        Ok(Matcher { root: node })
    }
}

fn condition_document(condition: &Condition) -> Value {
    match condition {
        Condition::Eq(value) => json!({ "$eq": value }),
        Condition::Regex(pattern) => json!({
            "$regex": pattern.source(),
            "$options": pattern.options(),
        }),
        Condition::Gte(value) => json!({ "$gte": value }),
        Condition::Lte(value) => json!({ "$lte": value }),
        Condition::Exists(exists) => json!({ "$exists": exists }),
    }
}

/// Compiled form of a [`Filter`].
#[derive(Debug, Clone)]
pub struct Matcher {
    root: MatchNode,
}

#[derive(Debug, Clone)]
enum MatchNode {
    And(Vec<MatchNode>),
    Or(Vec<MatchNode>),
    Field { path: Vec<String>, test: FieldTest },
}

#[derive(Debug, Clone)]
enum FieldTest {
    Eq(Value),
    Regex(Regex),
    Gte(f64),
    Lte(f64),
    Exists(bool),
}

impl Matcher {
    pub fn matches(&self, document: &Value) -> bool {
        self.root.matches(document)
    }
}

impl MatchNode {
    fn matches(&self, document: &Value) -> bool {
        match self {
            MatchNode::And(nodes) => nodes.iter().all(|n| n.matches(document)),
            MatchNode::Or(nodes) => nodes.iter().any(|n| n.matches(document)),
            MatchNode::Field { path, test } => {
                let value = resolve_path(document, path);
                match test {
                    FieldTest::Exists(expected) => value.is_some() == *expected,
                    _ => value.is_some_and(|v| any_element(v, |e| test.matches_scalar(e))),
                }
            }
        }
    }
}

impl FieldTest {
    fn matches_scalar(&self, value: &Value) -> bool {
        match self {
            FieldTest::Eq(expected) => value == expected || numbers_equal(value, expected),
            FieldTest::Regex(regex) => value.as_str().is_some_and(|s| regex.is_match(s)),
            FieldTest::Gte(bound) => value.as_f64().is_some_and(|v| v >= *bound),
            FieldTest::Lte(bound) => value.as_f64().is_some_and(|v| v <= *bound),
            FieldTest::Exists(_) => true,
        }
    }
}

fn numbers_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Apply `test` to a value, or to each element when the value is an array.
fn any_element(value: &Value, test: impl Fn(&Value) -> bool) -> bool {
    match value {
        Value::Array(items) => test(value) || items.iter().any(&test),
        other => test(other),
    }
}

/// Walk a dotted path. `null` counts as present for `$exists` but matches
/// nothing else, which `matches_scalar` handles.
fn resolve_path<'a>(document: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter()
        .try_fold(document, |current, segment| current.as_object()?.get(segment))
}
