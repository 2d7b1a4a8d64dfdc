//! Process-local table storage used by the in-memory unit of work.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::entity::Entity;
use crate::error::RepositoryError;

/// Type-erased table of entity rows.
trait Table: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Entity> Table for Vec<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// All in-memory tables, keyed by row type. Rows keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: HashMap<TypeId, Box<dyn Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of one table; empty if nothing was stored yet.
    pub fn rows<T: Entity>(&self) -> &[T] {
        self.tables
            .get(&TypeId::of::<T>())
            .and_then(|table| table.as_any().downcast_ref::<Vec<T>>())
            .map(|rows| rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn rows_mut<T: Entity>(&mut self) -> Result<&mut Vec<T>, RepositoryError> {
        self.tables
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Vec::<T>::new()))
            .as_any_mut()
            .downcast_mut::<Vec<T>>()
            .ok_or_else(|| RepositoryError::Storage(format!("table {} has wrong type", T::TABLE)))
    }

    /// Appends a row, rejecting a key that is already present.
    pub fn insert<T: Entity>(
        &mut self,
        entity: T,
        journal: &mut Journal,
    ) -> Result<(), RepositoryError> {
        let key = entity.key();
        let rows = self.rows_mut::<T>()?;
        if rows.iter().any(|row| row.key() == key) {
            return Err(RepositoryError::DuplicateKey(T::TABLE));
        }
        rows.push(entity);
        journal.record(move |store| {
            if let Ok(rows) = store.rows_mut::<T>() {
                rows.retain(|row| row.key() != key);
            }
        });
        Ok(())
    }

    /// Replaces the row with the same key. Returns false when absent.
    pub fn replace<T: Entity>(
        &mut self,
        entity: T,
        journal: &mut Journal,
    ) -> Result<bool, RepositoryError> {
        let key = entity.key();
        let rows = self.rows_mut::<T>()?;
        let Some(row) = rows.iter_mut().find(|row| row.key() == key) else {
            return Ok(false);
        };
        let previous = std::mem::replace(row, entity);
        journal.record(move |store| {
            if let Ok(rows) = store.rows_mut::<T>() {
                if let Some(row) = rows.iter_mut().find(|row| row.key() == key) {
                    *row = previous;
                }
            }
        });
        Ok(true)
    }

    /// Removes every row for which `predicate` holds; returns how many.
    pub fn remove_where<T, F>(
        &mut self,
        mut predicate: F,
        journal: &mut Journal,
    ) -> Result<u64, RepositoryError>
    where
        T: Entity,
        F: FnMut(&T) -> bool,
    {
        let rows = self.rows_mut::<T>()?;
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(rows.len());
        for (index, row) in std::mem::take(rows).into_iter().enumerate() {
            if predicate(&row) {
                removed.push((index, row));
            } else {
                kept.push(row);
            }
        }
        *rows = kept;

        let count = removed.len() as u64;
        if !removed.is_empty() {
            journal.record(move |store| {
                if let Ok(rows) = store.rows_mut::<T>() {
                    for (index, row) in removed {
                        if rows.iter().all(|existing| existing.key() != row.key()) {
                            let at = index.min(rows.len());
                            rows.insert(at, row);
                        }
                    }
                }
            });
        }
        Ok(count)
    }
}

type Undo = Box<dyn FnOnce(&mut MemoryStore) + Send>;

/// Undo log of the writes made by one in-memory transaction.
///
/// Rolling back replays the inverse of each write, newest first, so rows
/// written by other handles in the meantime are left alone.
pub struct Journal {
    undo: Option<Vec<Undo>>,
}

impl Journal {
    /// Journal that records every write.
    pub fn recording() -> Self {
        Self {
            undo: Some(Vec::new()),
        }
    }

    /// Journal for autocommit writes; records nothing.
    pub fn disabled() -> Self {
        Self { undo: None }
    }

    fn record(&mut self, undo: impl FnOnce(&mut MemoryStore) + Send + 'static) {
        if let Some(entries) = self.undo.as_mut() {
            entries.push(Box::new(undo));
        }
    }

    pub fn len(&self) -> usize {
        self.undo.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reverts every recorded write against `store`.
    pub fn undo(self, store: &mut MemoryStore) {
        for undo in self.undo.into_iter().flatten().rev() {
            undo(store);
        }
    }
}
