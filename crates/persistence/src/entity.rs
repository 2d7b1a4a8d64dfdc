//! Table metadata implemented by every persisted row type.

use std::fmt::Debug;

use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::filter::Filter;
use crate::value::Value;

/// Primary key of an entity: a single id or a composite tuple.
pub trait EntityKey: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Key values in the same order as [`Entity::KEY_COLUMNS`].
    fn key_values(&self) -> Vec<Value>;
}

impl EntityKey for Uuid {
    fn key_values(&self) -> Vec<Value> {
        vec![Value::Uuid(*self)]
    }
}

impl EntityKey for (Uuid, Uuid) {
    fn key_values(&self) -> Vec<Value> {
        vec![Value::Uuid(self.0), Value::Uuid(self.1)]
    }
}

impl EntityKey for (Uuid, String) {
    fn key_values(&self) -> Vec<Value> {
        vec![Value::Uuid(self.0), Value::Text(self.1.clone())]
    }
}

/// A row type bound to a table.
///
/// `values()` must list every column of the table, keys included, in a stable
/// order; the repository uses it for inserts, updates and in-memory filtering.
pub trait Entity:
    for<'r> sqlx::FromRow<'r, PgRow> + Clone + Debug + Send + Sync + Unpin + 'static
{
    type Key: EntityKey;

    const TABLE: &'static str;
    const KEY_COLUMNS: &'static [&'static str];

    fn key(&self) -> Self::Key;

    fn values(&self) -> Vec<(&'static str, Value)>;
}

/// Pairs key columns with the values of a key.
pub fn key_filter<T: Entity>(key: &T::Key) -> Filter {
    let parts = T::KEY_COLUMNS
        .iter()
        .zip(key.key_values())
        .map(|(col, value)| Filter::Eq(*col, value))
        .collect();
    Filter::And(parts)
}
