//! Composable row predicates and ordering.
//!
//! A [`Filter`] renders to a parameterized SQL condition and evaluates against
//! in-memory rows with the same semantics: comparisons against NULL never
//! match, an empty `IN` list matches nothing and an empty `NOT IN` list
//! matches everything.
//!
//! Ordering is the exception: PostgreSQL sorts text by the database collation
//! while the in-memory backend sorts it by byte value, so mixed-case keys such
//! as "Beta" and "alpha" may come back in a different order.

use std::cmp::Ordering;

use sqlx::{Postgres, QueryBuilder};

use crate::value::Value;

/// Row predicate over named columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    Ne(&'static str, Value),
    Lt(&'static str, Value),
    Le(&'static str, Value),
    Gt(&'static str, Value),
    Ge(&'static str, Value),
    In(&'static str, Vec<Value>),
    NotIn(&'static str, Vec<Value>),
    /// Case-insensitive substring match.
    Contains(&'static str, String),
    IsNull(&'static str),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    /// Matches every row.
    pub fn all() -> Self {
        Filter::And(Vec::new())
    }

    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Eq(column, value.into())
    }

    pub fn ne(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Ne(column, value.into())
    }

    pub fn lt(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Lt(column, value.into())
    }

    pub fn le(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Le(column, value.into())
    }

    pub fn gt(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Gt(column, value.into())
    }

    pub fn ge(column: &'static str, value: impl Into<Value>) -> Self {
        Filter::Ge(column, value.into())
    }

    pub fn is_in<I, V>(column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In(column, values.into_iter().map(Into::into).collect())
    }

    pub fn not_in<I, V>(column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::NotIn(column, values.into_iter().map(Into::into).collect())
    }

    pub fn contains(column: &'static str, needle: impl Into<String>) -> Self {
        Filter::Contains(column, needle.into())
    }

    pub fn is_null(column: &'static str) -> Self {
        Filter::IsNull(column)
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut parts) => {
                parts.push(other);
                Filter::And(parts)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut parts) => {
                parts.push(other);
                Filter::Or(parts)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Filter::Not(Box::new(self))
    }

    /// Appends this predicate as a SQL boolean expression.
    pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Filter::Eq(col, Value::Null) => {
                builder.push(quote(col)).push(" IS NULL");
            }
            Filter::Ne(col, Value::Null) => {
                builder.push(quote(col)).push(" IS NOT NULL");
            }
            Filter::Eq(col, v) => push_comparison(builder, col, "=", v),
            Filter::Ne(col, v) => push_comparison(builder, col, "<>", v),
            Filter::Lt(col, v) => push_comparison(builder, col, "<", v),
            Filter::Le(col, v) => push_comparison(builder, col, "<=", v),
            Filter::Gt(col, v) => push_comparison(builder, col, ">", v),
            Filter::Ge(col, v) => push_comparison(builder, col, ">=", v),
            Filter::In(col, values) => push_membership(builder, col, values, false),
            Filter::NotIn(col, values) => push_membership(builder, col, values, true),
            Filter::Contains(col, needle) => {
                builder
                    .push("STRPOS(LOWER(")
                    .push(quote(col))
                    .push("), LOWER(")
                    .push_bind(needle.clone())
                    .push(")) > 0");
            }
            Filter::IsNull(col) => {
                builder.push(quote(col)).push(" IS NULL");
            }
            Filter::And(parts) => push_group(builder, parts, " AND ", "TRUE"),
            Filter::Or(parts) => push_group(builder, parts, " OR ", "FALSE"),
            Filter::Not(inner) => {
                builder.push("NOT (");
                inner.push_sql(builder);
                builder.push(")");
            }
        }
    }

    /// Evaluates the predicate against a row's column values.
    pub fn matches(&self, row: &[(&'static str, Value)]) -> bool {
        match self {
            Filter::Eq(col, Value::Null) => column(row, col).is_null(),
            Filter::Ne(col, Value::Null) => !column(row, col).is_null(),
            Filter::Eq(col, v) => compare(row, col, v) == Some(Ordering::Equal),
            Filter::Ne(col, v) => matches!(
                compare(row, col, v),
                Some(Ordering::Less) | Some(Ordering::Greater)
            ),
            Filter::Lt(col, v) => compare(row, col, v) == Some(Ordering::Less),
            Filter::Le(col, v) => matches!(
                compare(row, col, v),
                Some(Ordering::Less) | Some(Ordering::Equal)
            ),
            Filter::Gt(col, v) => compare(row, col, v) == Some(Ordering::Greater),
            Filter::Ge(col, v) => matches!(
                compare(row, col, v),
                Some(Ordering::Greater) | Some(Ordering::Equal)
            ),
            Filter::In(col, values) => {
                let actual = column(row, col);
                values
                    .iter()
                    .any(|v| actual.compare(v) == Some(Ordering::Equal))
            }
            Filter::NotIn(col, values) => {
                let actual = column(row, col);
                if values.is_empty() {
                    return true;
                }
                !actual.is_null()
                    && values
                        .iter()
                        .all(|v| actual.compare(v) != Some(Ordering::Equal))
            }
            Filter::Contains(col, needle) => match column(row, col) {
                Value::Text(text) => text.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            },
            Filter::IsNull(col) => column(row, col).is_null(),
            Filter::And(parts) => parts.iter().all(|f| f.matches(row)),
            Filter::Or(parts) => parts.iter().any(|f| f.matches(row)),
            Filter::Not(inner) => !inner.matches(row),
        }
    }
}

/// Sort key for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

impl Order {
    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            descending: true,
        }
    }

    /// Appends `ORDER BY ...` for the given keys, if any.
    pub fn push_sql(orders: &[Order], builder: &mut QueryBuilder<'_, Postgres>) {
        if orders.is_empty() {
            return;
        }
        builder.push(" ORDER BY ");
        for (i, order) in orders.iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(quote(order.column));
            builder.push(if order.descending { " DESC" } else { " ASC" });
        }
    }

    /// Compares two rows by a list of sort keys. Text compares by byte value,
    /// not by collation.
    pub fn compare_rows(
        orders: &[Order],
        a: &[(&'static str, Value)],
        b: &[(&'static str, Value)],
    ) -> Ordering {
        for order in orders {
            let ordering = column(a, order.column).sort_cmp(column(b, order.column));
            let ordering = if order.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Quotes a column identifier.
pub(crate) fn quote(column: &str) -> String {
    format!("\"{}\"", column.replace('"', "\"\""))
}

static NULL: Value = Value::Null;

fn column<'a>(row: &'a [(&'static str, Value)], name: &str) -> &'a Value {
    row.iter()
        .find(|(col, _)| *col == name)
        .map(|(_, v)| v)
        .unwrap_or(&NULL)
}

fn compare(row: &[(&'static str, Value)], col: &str, value: &Value) -> Option<Ordering> {
    column(row, col).compare(value)
}

fn push_comparison(
    builder: &mut QueryBuilder<'_, Postgres>,
    col: &str,
    op: &str,
    value: &Value,
) {
    builder.push(quote(col)).push(" ").push(op).push(" ");
    value.push_bind(builder);
}

fn push_membership(
    builder: &mut QueryBuilder<'_, Postgres>,
    col: &str,
    values: &[Value],
    negated: bool,
) {
    if values.is_empty() {
        builder.push(if negated { "TRUE" } else { "FALSE" });
        return;
    }

    // One array parameter keeps long key lists under the bind limit.
    builder
        .push(quote(col))
        .push(if negated { " <> ALL(" } else { " = ANY(" });
    if Value::push_array_bind(values, builder) {
        builder.push(")");
        return;
    }

    builder.push("ARRAY[");
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        value.push_bind(builder);
    }
    builder.push("])");
}

fn push_group(
    builder: &mut QueryBuilder<'_, Postgres>,
    parts: &[Filter],
    separator: &str,
    empty: &str,
) {
    if parts.is_empty() {
        builder.push(empty);
        return;
    }

    builder.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            builder.push(separator);
        }
        part.push_sql(builder);
    }
    builder.push(")");
}
