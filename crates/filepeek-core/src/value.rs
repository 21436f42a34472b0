//! Portable value model for returned rows and statistics.
//!
//! Every scalar that leaves the crate is a [`Value`]: a closed, JSON-safe
//! variant. Producers in [`crate::normalize`] collapse the stored types of
//! each format into it.

use std::cmp::Ordering;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A normalized scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value (nulls, NaN markers, non-finite floats).
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer that fits in 64 signed bits.
    Int(i64),
    /// Finite floating point number.
    Float(f64),
    /// Text, including timestamps and stringified wide or complex types.
    String(String),
}

impl Value {
    /// Build a float, collapsing NaN and infinities to [`Value::Null`].
    pub fn float(v: f64) -> Self {
        if v.is_finite() {
            Value::Float(v)
        } else {
            Value::Null
        }
    }

    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Natural ordering between two values of compatible kinds.
    ///
    /// Numbers compare numerically (ints and floats mix), strings
    /// lexicographically, booleans `false < true`. Any other pairing,
    /// including anything against `Null`, is incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v),
        }
    }
}

/// One logical row: column names mapped to values, in column order.
///
/// Serializes as a JSON object whose keys keep the column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    fields: Vec<(String, Value)>,
}

impl RowRecord {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty record with room for `n` columns.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            fields: Vec::with_capacity(n),
        }
    }

    /// Append a column. Callers keep names unique.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push((name.into(), value));
    }

    /// Look up a column by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(Value::float(f64::NAN), Value::Null);
        assert_eq!(Value::float(f64::INFINITY), Value::Null);
        assert_eq!(Value::float(1.5), Value::Float(1.5));
    }

    #[test]
    fn compare_mixes_ints_and_floats_but_not_strings() {
        assert_eq!(
            Value::Int(2).compare(&Value::Float(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::String("b".into()).compare(&Value::String("a".into())),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::Int(1).compare(&Value::String("1".into())), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
    }

    #[test]
    fn row_record_serializes_in_column_order() {
        let row: RowRecord = [
            ("zeta", Value::Int(1)),
            ("alpha", Value::Null),
            ("mid", Value::String("x".into())),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":null,"mid":"x"}"#);
        assert_eq!(row.get("alpha"), Some(&Value::Null));
        assert_eq!(row.columns().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn pushed_fields_keep_their_order() {
        let mut row = RowRecord::new();
        assert!(row.is_empty());
        row.push("b", Value::Bool(true));
        row.push("a", Value::Float(0.5));

        assert_eq!(row.len(), 2);
        let pairs: Vec<(&str, String)> = row.iter().map(|(k, v)| (k, v.to_string())).collect();
        assert_eq!(pairs, [("b", "true".to_string()), ("a", "0.5".to_string())]);
        assert_eq!(row.get("missing"), None);
    }
}
