//! Column values shared by SQL rendering and in-memory evaluation.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Uuid(Uuid),
    Text(String),
    Int(i32),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Orders two values of the same kind. Mixed kinds and nulls do not compare.
    /// Text compares by byte value, which can differ from a database collation.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Ordering used for `ORDER BY`: nulls sort after every other value.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }

    /// Appends the value to a query as a bind parameter.
    pub fn push_bind(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self.clone() {
            Value::Uuid(v) => builder.push_bind(v),
            Value::Text(v) => builder.push_bind(v),
            Value::Int(v) => builder.push_bind(v),
            Value::Float(v) => builder.push_bind(v),
            Value::Bool(v) => builder.push_bind(v),
            Value::Timestamp(v) => builder.push_bind(v),
            Value::Null => builder.push("NULL"),
        };
    }

    /// Appends a list of same-kind values as a single array parameter.
    /// Returns false, pushing nothing, when the list is empty, mixes kinds or
    /// holds a null.
    pub fn push_array_bind(values: &[Value], builder: &mut QueryBuilder<'_, Postgres>) -> bool {
        fn all<T>(values: &[Value], pick: impl Fn(&Value) -> Option<T>) -> Option<Vec<T>> {
            values.iter().map(pick).collect()
        }

        match values.first() {
            Some(Value::Uuid(_)) => all(values, |v| match v {
                Value::Uuid(v) => Some(*v),
                _ => None,
            })
            .map(|array| {
                builder.push_bind(array);
            })
            .is_some(),
            Some(Value::Text(_)) => all(values, |v| match v {
                Value::Text(v) => Some(v.clone()),
                _ => None,
            })
            .map(|array| {
                builder.push_bind(array);
            })
            .is_some(),
            Some(Value::Int(_)) => all(values, |v| match v {
                Value::Int(v) => Some(*v),
                _ => None,
            })
            .map(|array| {
                builder.push_bind(array);
            })
            .is_some(),
            Some(Value::Float(_)) => all(values, |v| match v {
                Value::Float(v) => Some(*v),
                _ => None,
            })
            .map(|array| {
                builder.push_bind(array);
            })
            .is_some(),
            Some(Value::Bool(_)) => all(values, |v| match v {
                Value::Bool(v) => Some(*v),
                _ => None,
            })
            .map(|array| {
                builder.push_bind(array);
            })
            .is_some(),
            Some(Value::Timestamp(_)) => all(values, |v| match v {
                Value::Timestamp(v) => Some(*v),
                _ => None,
            })
            .map(|array| {
                builder.push_bind(array);
            })
            .is_some(),
            Some(Value::Null) | None => false,
        }
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
