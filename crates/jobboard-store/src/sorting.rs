//! Sort ordering for document queries.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use jobboard_models::job::fields;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    /// Parse from string, returning default if invalid.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" | "1" => Self::Ascending,
            _ => Self::Descending,
        }
    }

    /// Numeric direction in the query document format.
    pub const fn as_i32(&self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// Single-field sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Newest first.
    pub fn newest_first() -> Self {
        Self::new(fields::CREATED_AT, SortDirection::Descending)
    }

    /// Render as `{"<field>": 1 | -1}`.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert(self.field.clone(), Value::from(self.direction.as_i32()));
        Value::Object(doc)
    }

    /// Compare two documents by the sort field.
    ///
    /// Missing values sort before present ones in ascending order. Strings
    /// that both parse as RFC 3339 timestamps compare chronologically.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ordering = compare_values(lookup(a, &self.field), lookup(b, &self.field));
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::newest_first()
    }
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
        .filter(|v| !v.is_null())
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (a.parse::<DateTime<Utc>>(), b.parse::<DateTime<Utc>>()) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_newest_first() {
        assert_eq!(SortSpec::default().to_document(), json!({ "createdAt": -1 }));
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!(SortDirection::from_str_or_default("ASC"), SortDirection::Ascending);
        assert_eq!(SortDirection::from_str_or_default("nope"), SortDirection::Descending);
    }

    #[test]
    fn test_timestamps_compare_chronologically() {
        // Lexicographic order would rank the offset value as newer.
        let earlier = json!({ "createdAt": "2024-05-01T12:00:00+05:00" });
        let later = json!({ "createdAt": "2024-05-01T08:00:00Z" });
        let spec = SortSpec::newest_first();
        assert_eq!(spec.compare(&later, &earlier), Ordering::Less);
        assert_eq!(spec.compare(&earlier, &later), Ordering::Greater);
    }

    #[test]
    fn test_missing_values_sort_last_when_descending() {
        let spec = SortSpec::new("views", SortDirection::Descending);
        let missing = json!({});
        let present = json!({ "views": 3 });
        assert_eq!(spec.compare(&present, &missing), Ordering::Less);
    }
}
