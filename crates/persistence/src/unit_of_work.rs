//! Shared data-access context.
//!
//! A [`UnitOfWork`] is a cheap handle that every repository of a request is
//! built from. It is backed either by a PostgreSQL pool or by process-local
//! tables. [`UnitOfWork::begin`] returns a transaction-scoped handle; work done
//! through it is kept by [`UnitOfWork::commit`] and discarded by
//! [`UnitOfWork::rollback`] or by dropping every clone without committing.
//! In memory, a rollback reverts only the transaction's own writes.

use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

use crate::entity::Entity;
use crate::error::RepositoryError;
use crate::memory::{Journal, MemoryStore};
use crate::repository::Repository;

pub(crate) type SharedTransaction = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;
pub(crate) type SharedStore = Arc<StdMutex<MemoryStore>>;

#[derive(Clone)]
pub(crate) enum Backend {
    Postgres(PgPool),
    PostgresTx(SharedTransaction),
    Memory(SharedStore),
    MemoryTx(Arc<MemoryTransaction>),
}

/// An open in-memory transaction and the undo log of its writes.
pub(crate) struct MemoryTransaction {
    pub(crate) store: SharedStore,
    journal: StdMutex<Option<Journal>>,
}

impl MemoryTransaction {
    /// Applies one write through this transaction, logging how to revert it.
    fn write<R>(
        &self,
        f: impl FnOnce(&mut MemoryStore, &mut Journal) -> Result<R, RepositoryError>,
    ) -> Result<R, RepositoryError> {
        let mut open = lock(&self.journal)?;
        let journal = open.as_mut().ok_or(RepositoryError::TransactionClosed)?;
        let mut store = lock(&self.store)?;
        f(&mut store, journal)
    }

    fn finish(&self, revert: bool) -> Result<(), RepositoryError> {
        let journal = lock(&self.journal)?
            .take()
            .ok_or(RepositoryError::TransactionClosed)?;
        if revert {
            journal.undo(&mut *lock(&self.store)?);
        }
        Ok(())
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        let pending = self.journal.get_mut().ok().and_then(|j| j.take());
        if let Some(journal) = pending {
            if let Ok(mut store) = self.store.lock() {
                journal.undo(&mut store);
            }
        }
    }
}

pub(crate) fn lock<T>(mutex: &StdMutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Storage("in-memory store lock poisoned".to_string()))
}

/// Data-access context shared by repositories.
#[derive(Clone)]
pub struct UnitOfWork {
    pub(crate) backend: Backend,
    /// False for handles that joined an enclosing transaction.
    owner: bool,
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.backend {
            Backend::Postgres(_) => "postgres",
            Backend::PostgresTx(_) => "postgres-transaction",
            Backend::Memory(_) => "memory",
            Backend::MemoryTx(_) => "memory-transaction",
        };
        f.debug_struct("UnitOfWork")
            .field("backend", &kind)
            .field("owner", &self.owner)
            .finish()
    }
}

impl UnitOfWork {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            backend: Backend::Postgres(pool),
            owner: true,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(StdMutex::new(MemoryStore::new()))),
            owner: true,
        }
    }

    /// Typed repository over this context.
    pub fn repository<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.clone())
    }

    pub fn is_transaction(&self) -> bool {
        matches!(self.backend, Backend::PostgresTx(_) | Backend::MemoryTx(_))
    }

    /// The underlying pool, when not in a transaction on PostgreSQL.
    pub fn pool(&self) -> Option<&PgPool> {
        match &self.backend {
            Backend::Postgres(pool) => Some(pool),
            _ => None,
        }
    }

    /// Starts a transaction. Inside a transaction this joins the enclosing one;
    /// commit and rollback on the joined handle are no-ops.
    pub async fn begin(&self) -> Result<UnitOfWork, RepositoryError> {
        let backend = match &self.backend {
            Backend::Postgres(pool) => {
                let tx = pool.begin().await?;
                Backend::PostgresTx(Arc::new(Mutex::new(Some(tx))))
            }
            Backend::Memory(store) => Backend::MemoryTx(Arc::new(MemoryTransaction {
                store: store.clone(),
                journal: StdMutex::new(Some(Journal::recording())),
            })),
            Backend::PostgresTx(_) | Backend::MemoryTx(_) => {
                return Ok(UnitOfWork {
                    backend: self.backend.clone(),
                    owner: false,
                });
            }
        };

        debug!("Transaction started");
        Ok(UnitOfWork {
            backend,
            owner: true,
        })
    }

    pub async fn commit(&self) -> Result<(), RepositoryError> {
        if !self.owner {
            return Ok(());
        }
        match &self.backend {
            Backend::PostgresTx(tx) => {
                let tx = tx.lock().await.take().ok_or(RepositoryError::TransactionClosed)?;
                tx.commit().await?;
            }
            Backend::MemoryTx(tx) => tx.finish(false)?,
            Backend::Postgres(_) | Backend::Memory(_) => {}
        }
        debug!("Transaction committed");
        Ok(())
    }

    pub async fn rollback(&self) -> Result<(), RepositoryError> {
        if !self.owner {
            return Ok(());
        }
        match &self.backend {
            Backend::PostgresTx(tx) => {
                let tx = tx.lock().await.take().ok_or(RepositoryError::TransactionClosed)?;
                tx.rollback().await?;
            }
            Backend::MemoryTx(tx) => tx.finish(true)?,
            Backend::Postgres(_) | Backend::Memory(_) => {}
        }
        debug!("Transaction rolled back");
        Ok(())
    }

    /// Runs `f` against the in-memory store, if this is an in-memory context.
    pub(crate) fn with_store<R>(
        &self,
        f: impl FnOnce(&mut MemoryStore) -> Result<R, RepositoryError>,
    ) -> Option<Result<R, RepositoryError>> {
        let store = match &self.backend {
            Backend::Memory(store) => store,
            Backend::MemoryTx(tx) => &tx.store,
            Backend::Postgres(_) | Backend::PostgresTx(_) => return None,
        };
        Some(lock(store).and_then(|mut guard| f(&mut guard)))
    }

    /// Runs a write against the in-memory store. Inside a transaction the
    /// write is journaled so a rollback can revert exactly it.
    pub(crate) fn with_store_mut<R>(
        &self,
        f: impl FnOnce(&mut MemoryStore, &mut Journal) -> Result<R, RepositoryError>,
    ) -> Option<Result<R, RepositoryError>> {
        match &self.backend {
            Backend::Memory(store) => Some(
                lock(store).and_then(|mut guard| f(&mut guard, &mut Journal::disabled())),
            ),
            Backend::MemoryTx(tx) => Some(tx.write(f)),
            Backend::Postgres(_) | Backend::PostgresTx(_) => None,
        }
    }
}
