//! Generic repository over any [`Entity`].
//!
//! One `Repository<T>` serves every table: point lookups by (possibly
//! composite) key, filtered scans, a composable [`Query`] handle, and the
//! write operations. Reads and inserts propagate failures; `update`, `delete`
//! and `delete_where` report failure as `false` and log the cause. The `try_*`
//! variants propagate instead, for multi-step operations that must abort.

use std::marker::PhantomData;

use shared::pagination::{self, PaginatedList};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::warn;

use crate::entity::{key_filter, Entity};
use crate::error::RepositoryError;
use crate::filter::{quote, Filter, Order};
use crate::memory::MemoryStore;
use crate::metrics::QueryTimer;
use crate::unit_of_work::{Backend, UnitOfWork};

/// Typed data access for one table.
pub struct Repository<T: Entity> {
    uow: UnitOfWork,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self::new(self.uow.clone())
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(uow: UnitOfWork) -> Self {
        Self {
            uow,
            _marker: PhantomData,
        }
    }

    /// Row with the given primary key, if any.
    pub async fn get(&self, key: &T::Key) -> Result<Option<T>, RepositoryError> {
        let timer = QueryTimer::for_table("get", T::TABLE);
        let result = match self.uow.with_store(|store| {
            Ok(store.rows::<T>().iter().find(|row| row.key() == *key).cloned())
        }) {
            Some(result) => result,
            None => {
                let builder = select_sql(T::TABLE, &key_filter::<T>(key), &[], None, Some(1));
                self.fetch_rows(builder)
                    .await
                    .map(|rows| rows.into_iter().next())
            }
        };
        timer.record();
        result
    }

    /// Every row of the table, in storage order.
    pub async fn get_all(&self) -> Result<Vec<T>, RepositoryError> {
        self.query().fetch_all().await
    }

    /// Every row matching `filter`.
    pub async fn get_all_where(&self, filter: Filter) -> Result<Vec<T>, RepositoryError> {
        self.query().filter(filter).fetch_all().await
    }

    /// Composable query handle; nothing runs until a terminal method is awaited.
    pub fn query(&self) -> Query<T> {
        Query {
            repo: self.clone(),
            filter: Filter::all(),
            orders: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    pub async fn count(&self, filter: Filter) -> Result<i64, RepositoryError> {
        self.query().filter(filter).count().await
    }

    pub async fn exists(&self, filter: Filter) -> Result<bool, RepositoryError> {
        Ok(self.count(filter).await? > 0)
    }

    /// Inserts a row.
    pub async fn add(&self, entity: &T) -> Result<(), RepositoryError> {
        let timer = QueryTimer::for_table("add", T::TABLE);
        let result = match self
            .uow
            .with_store_mut(|store, journal| store.insert(entity.clone(), journal))
        {
            Some(result) => result,
            None => {
                let values = entity.values();
                let mut builder = QueryBuilder::new(format!("INSERT INTO {} (", quote(T::TABLE)));
                for (i, (col, _)) in values.iter().enumerate() {
                    if i > 0 {
                        builder.push(", ");
                    }
                    builder.push(quote(col));
                }
                builder.push(") VALUES (");
                for (i, (_, value)) in values.iter().enumerate() {
                    if i > 0 {
                        builder.push(", ");
                    }
                    value.push_bind(&mut builder);
                }
                builder.push(")");
                self.execute(builder).await.map(|_| ())
            }
        };
        timer.record();
        result
    }

    /// Writes every non-key column of the row with the entity's key.
    /// Returns `Ok(false)` if no such row exists.
    pub async fn try_update(&self, entity: &T) -> Result<bool, RepositoryError> {
        let timer = QueryTimer::for_table("update", T::TABLE);
        let result = match self
            .uow
            .with_store_mut(|store, journal| store.replace(entity.clone(), journal))
        {
            Some(result) => result,
            None => {
                let key = entity.key();
                let assignments: Vec<_> = entity
                    .values()
                    .into_iter()
                    .filter(|(col, _)| !T::KEY_COLUMNS.contains(col))
                    .collect();

                if assignments.is_empty() {
                    self.get(&key).await.map(|row| row.is_some())
                } else {
                    let mut builder = QueryBuilder::new(format!("UPDATE {} SET ", quote(T::TABLE)));
                    for (i, (col, value)) in assignments.iter().enumerate() {
                        if i > 0 {
                            builder.push(", ");
                        }
                        builder.push(quote(col)).push(" = ");
                        value.push_bind(&mut builder);
                    }
                    builder.push(" WHERE ");
                    key_filter::<T>(&key).push_sql(&mut builder);
                    self.execute(builder).await.map(|affected| affected > 0)
                }
            }
        };
        timer.record();
        result
    }

    /// Like [`Repository::try_update`], but failures become `false`.
    pub async fn update(&self, entity: &T) -> bool {
        match self.try_update(entity).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!(table = T::TABLE, key = ?entity.key(), error = %e, "Update failed");
                false
            }
        }
    }

    /// Deletes the row with the given key. Composite keys are passed as tuples.
    pub async fn try_delete(&self, key: &T::Key) -> Result<bool, RepositoryError> {
        let timer = QueryTimer::for_table("delete", T::TABLE);
        let result = match self
            .uow
            .with_store_mut(|store, journal| {
                store.remove_where::<T, _>(|row| row.key() == *key, journal)
            })
        {
            Some(result) => result.map(|removed| removed > 0),
            None => {
                let mut builder = QueryBuilder::new(format!("DELETE FROM {} WHERE ", quote(T::TABLE)));
                key_filter::<T>(key).push_sql(&mut builder);
                self.execute(builder).await.map(|affected| affected > 0)
            }
        };
        timer.record();
        result
    }

    /// Like [`Repository::try_delete`], but failures become `false`.
    pub async fn delete(&self, key: &T::Key) -> bool {
        match self.try_delete(key).await {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!(table = T::TABLE, key = ?key, error = %e, "Delete failed");
                false
            }
        }
    }

    /// Deletes every row matching `filter`; returns how many were removed.
    pub async fn try_delete_where(&self, filter: Filter) -> Result<u64, RepositoryError> {
        let timer = QueryTimer::for_table("delete_where", T::TABLE);
        let result = match self
            .uow
            .with_store_mut(|store, journal| {
                store.remove_where::<T, _>(|row| filter.matches(&row.values()), journal)
            })
        {
            Some(result) => result,
            None => {
                let mut builder = QueryBuilder::new(format!("DELETE FROM {} WHERE ", quote(T::TABLE)));
                filter.push_sql(&mut builder);
                self.execute(builder).await
            }
        };
        timer.record();
        result
    }

    /// Bulk delete; `false` when nothing matched or the delete failed.
    pub async fn delete_where(&self, filter: Filter) -> bool {
        match self.try_delete_where(filter).await {
            Ok(removed) => removed > 0,
            Err(e) => {
                warn!(table = T::TABLE, error = %e, "Bulk delete failed");
                false
            }
        }
    }

    async fn fetch_rows(
        &self,
        mut builder: QueryBuilder<'static, Postgres>,
    ) -> Result<Vec<T>, RepositoryError> {
        match &self.uow.backend {
            Backend::Postgres(pool) => Ok(builder.build_query_as::<T>().fetch_all(pool).await?),
            Backend::PostgresTx(tx) => {
                let mut guard = tx.lock().await;
                let conn = guard.as_mut().ok_or(RepositoryError::TransactionClosed)?;
                Ok(builder.build_query_as::<T>().fetch_all(&mut **conn).await?)
            }
            Backend::Memory(_) | Backend::MemoryTx(_) => Err(sql_on_memory()),
        }
    }

    async fn fetch_count(
        &self,
        mut builder: QueryBuilder<'static, Postgres>,
    ) -> Result<i64, RepositoryError> {
        let row = match &self.uow.backend {
            Backend::Postgres(pool) => builder.build().fetch_one(pool).await?,
            Backend::PostgresTx(tx) => {
                let mut guard = tx.lock().await;
                let conn = guard.as_mut().ok_or(RepositoryError::TransactionClosed)?;
                builder.build().fetch_one(&mut **conn).await?
            }
            Backend::Memory(_) | Backend::MemoryTx(_) => return Err(sql_on_memory()),
        };
        Ok(row.try_get::<i64, _>(0)?)
    }

    async fn execute(
        &self,
        mut builder: QueryBuilder<'static, Postgres>,
    ) -> Result<u64, RepositoryError> {
        let done = match &self.uow.backend {
            Backend::Postgres(pool) => builder.build().execute(pool).await?,
            Backend::PostgresTx(tx) => {
                let mut guard = tx.lock().await;
                let conn = guard.as_mut().ok_or(RepositoryError::TransactionClosed)?;
                builder.build().execute(&mut **conn).await?
            }
            Backend::Memory(_) | Backend::MemoryTx(_) => return Err(sql_on_memory()),
        };
        Ok(done.rows_affected())
    }
}

fn sql_on_memory() -> RepositoryError {
    RepositoryError::Storage("SQL issued against the in-memory backend".to_string())
}

fn select_sql(
    table: &str,
    filter: &Filter,
    orders: &[Order],
    offset: Option<i64>,
    limit: Option<i64>,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT * FROM {} WHERE ", quote(table)));
    filter.push_sql(&mut builder);
    Order::push_sql(orders, &mut builder);
    if let Some(limit) = limit {
        builder.push(" LIMIT ").push_bind(limit);
    }
    if let Some(offset) = offset {
        builder.push(" OFFSET ").push_bind(offset);
    }
    builder
}

fn select_memory<T: Entity>(
    store: &MemoryStore,
    filter: &Filter,
    orders: &[Order],
    offset: Option<i64>,
    limit: Option<i64>,
) -> Vec<T> {
    let mut rows: Vec<(Vec<_>, &T)> = store
        .rows::<T>()
        .iter()
        .map(|row| (row.values(), row))
        .filter(|(values, _)| filter.matches(values))
        .collect();

    if !orders.is_empty() {
        rows.sort_by(|(a, _), (b, _)| Order::compare_rows(orders, a, b));
    }

    rows.into_iter()
        .skip(offset.unwrap_or(0).max(0) as usize)
        .take(limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX))
        .map(|(_, row)| row.clone())
        .collect()
}

/// Deferred query over one table.
pub struct Query<T: Entity> {
    repo: Repository<T>,
    filter: Filter,
    orders: Vec<Order>,
    offset: Option<i64>,
    limit: Option<i64>,
}

impl<T: Entity> Query<T> {
    /// Adds a predicate; successive calls are combined with AND.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = self.filter.and(filter);
        self
    }

    pub fn order_by(mut self, column: &'static str) -> Self {
        self.orders.push(Order::asc(column));
        self
    }

    pub fn order_by_desc(mut self, column: &'static str) -> Self {
        self.orders.push(Order::desc(column));
        self
    }

    pub fn skip(mut self, count: i64) -> Self {
        self.offset = Some(count.max(0));
        self
    }

    pub fn take(mut self, count: i64) -> Self {
        self.limit = Some(count.max(0));
        self
    }

    pub async fn fetch_all(self) -> Result<Vec<T>, RepositoryError> {
        let timer = QueryTimer::for_table("select", T::TABLE);
        let result = match self.repo.uow.with_store(|store| {
            Ok(select_memory::<T>(
                store,
                &self.filter,
                &self.orders,
                self.offset,
                self.limit,
            ))
        }) {
            Some(result) => result,
            None => {
                let builder = select_sql(
                    T::TABLE,
                    &self.filter,
                    &self.orders,
                    self.offset,
                    self.limit,
                );
                self.repo.fetch_rows(builder).await
            }
        };
        timer.record();
        result
    }

    pub async fn first(self) -> Result<Option<T>, RepositoryError> {
        Ok(self.take(1).fetch_all().await?.into_iter().next())
    }

    /// Number of matching rows; ordering and paging are ignored.
    pub async fn count(self) -> Result<i64, RepositoryError> {
        let timer = QueryTimer::for_table("count", T::TABLE);
        let result = match self.repo.uow.with_store(|store| {
            Ok(store
                .rows::<T>()
                .iter()
                .filter(|row| self.filter.matches(&row.values()))
                .count() as i64)
        }) {
            Some(result) => result,
            None => {
                let mut builder =
                    QueryBuilder::new(format!("SELECT COUNT(*) FROM {} WHERE ", quote(T::TABLE)));
                self.filter.push_sql(&mut builder);
                self.repo.fetch_count(builder).await
            }
        };
        timer.record();
        result
    }

    /// Counts the matches, then loads one 1-based page of them.
    pub async fn paginate(
        self,
        page_index: i64,
        page_size: i64,
    ) -> Result<PaginatedList<T>, RepositoryError> {
        let (page_index, page_size) = pagination::normalize(page_index, page_size);
        let total = Query {
            repo: self.repo.clone(),
            filter: self.filter.clone(),
            orders: Vec::new(),
            offset: None,
            limit: None,
        }
        .count()
        .await?;

        let items = self
            .skip(pagination::offset(page_index, page_size))
            .take(page_size)
            .fetch_all()
            .await?;

        Ok(PaginatedList::new(items, total, page_index, page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use sqlx::FromRow;
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq, FromRow)]
    struct CityRow {
        id: Uuid,
        name: String,
        population: i32,
    }

    impl Entity for CityRow {
        type Key = Uuid;
        const TABLE: &'static str = "cities";
        const KEY_COLUMNS: &'static [&'static str] = &["id"];

        fn key(&self) -> Uuid {
            self.id
        }

        fn values(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("id", self.id.into()),
                ("name", self.name.clone().into()),
                ("population", self.population.into()),
            ]
        }
    }

    #[derive(Debug, Clone, PartialEq, FromRow)]
    struct Visit {
        city_id: Uuid,
        person_id: Uuid,
    }

    impl Entity for Visit {
        type Key = (Uuid, Uuid);
        const TABLE: &'static str = "visits";
        const KEY_COLUMNS: &'static [&'static str] = &["city_id", "person_id"];

        fn key(&self) -> (Uuid, Uuid) {
            (self.city_id, self.person_id)
        }

        fn values(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("city_id", self.city_id.into()),
                ("person_id", self.person_id.into()),
            ]
        }
    }

    fn city(name: &str, population: i32) -> CityRow {
        CityRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            population,
        }
    }

    async fn seeded() -> (UnitOfWork, Vec<CityRow>) {
        let uow = UnitOfWork::in_memory();
        let repo = uow.repository::<CityRow>();
        let cities = vec![
            city("Varna", 330),
            city("Burgas", 200),
            city("Sofia", 1200),
            city("Ruse", 140),
            city("Pleven", 95),
        ];
        for c in &cities {
            repo.add(c).await.unwrap();
        }
        (uow, cities)
    }

    #[tokio::test]
    async fn test_get_returns_none_for_missing_key() {
        let (uow, cities) = seeded().await;
        let repo = uow.repository::<CityRow>();

        assert_eq!(repo.get(&cities[2].id).await.unwrap(), Some(cities[2].clone()));
        assert_eq!(repo.get(&Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_add_duplicate_key_fails() {
        let (uow, cities) = seeded().await;
        let err = uow
            .repository::<CityRow>()
            .add(&cities[0])
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_filtered_and_ordered_query() {
        let (uow, _) = seeded().await;
        let names: Vec<String> = uow
            .repository::<CityRow>()
            .query()
            .filter(Filter::gt("population", 100))
            .order_by("name")
            .fetch_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names, vec!["Burgas", "Ruse", "Sofia", "Varna"]);
    }

    #[tokio::test]
    async fn test_paginate_alphabetical() {
        let (uow, _) = seeded().await;
        let repo = uow.repository::<CityRow>();

        let first = repo.query().order_by("name").paginate(1, 2).await.unwrap();
        assert_eq!(first.total_pages, 3);
        assert_eq!(
            first.items.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["Burgas", "Pleven"]
        );

        let last = repo.query().order_by("name").paginate(3, 2).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].name, "Varna");
        assert!(last.has_previous_page);
        assert!(!last.has_next_page);
    }

    #[tokio::test]
    async fn test_paginate_empty() {
        let uow = UnitOfWork::in_memory();
        let page = uow
            .repository::<CityRow>()
            .query()
            .paginate(1, 10)
            .await
            .unwrap();
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_previous_page);
        assert!(!page.has_next_page);
    }

    #[tokio::test]
    async fn test_update_soft_fails_for_missing_row() {
        let (uow, mut cities) = seeded().await;
        let repo = uow.repository::<CityRow>();

        cities[0].population = 340;
        assert!(repo.update(&cities[0]).await);
        assert_eq!(repo.get(&cities[0].id).await.unwrap().unwrap().population, 340);

        assert!(!repo.update(&city("Atlantis", 1)).await);
    }

    #[tokio::test]
    async fn test_delete_by_key_and_predicate() {
        let (uow, cities) = seeded().await;
        let repo = uow.repository::<CityRow>();

        assert!(repo.delete(&cities[0].id).await);
        assert!(!repo.delete(&cities[0].id).await);

        assert!(repo.delete_where(Filter::lt("population", 150)).await);
        assert!(!repo.delete_where(Filter::lt("population", 150)).await);
        assert_eq!(repo.count(Filter::all()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_composite_key_delete() {
        let uow = UnitOfWork::in_memory();
        let visits = uow.repository::<Visit>();
        let city_id = Uuid::new_v4();
        let first = Visit {
            city_id,
            person_id: Uuid::new_v4(),
        };
        let second = Visit {
            city_id,
            person_id: Uuid::new_v4(),
        };
        visits.add(&first).await.unwrap();
        visits.add(&second).await.unwrap();

        assert!(visits.delete(&(first.city_id, first.person_id)).await);
        assert_eq!(visits.get_all().await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_rollback_restores_state() {
        let (uow, cities) = seeded().await;

        let tx = uow.begin().await.unwrap();
        assert!(tx.is_transaction());
        tx.repository::<CityRow>()
            .try_delete_where(Filter::all())
            .await
            .unwrap();
        assert_eq!(uow.repository::<CityRow>().count(Filter::all()).await.unwrap(), 0);
        tx.rollback().await.unwrap();

        let repo = uow.repository::<CityRow>();
        assert_eq!(repo.count(Filter::all()).await.unwrap(), cities.len() as i64);
    }

    #[tokio::test]
    async fn test_commit_keeps_changes_and_closes() {
        let (uow, cities) = seeded().await;

        let tx = uow.begin().await.unwrap();
        assert!(tx.repository::<CityRow>().delete(&cities[1].id).await);
        tx.commit().await.unwrap();
        assert!(matches!(
            tx.commit().await,
            Err(RepositoryError::TransactionClosed)
        ));

        assert_eq!(uow.repository::<CityRow>().get(&cities[1].id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let (uow, cities) = seeded().await;
        {
            let tx = uow.begin().await.unwrap();
            tx.repository::<CityRow>().delete(&cities[3].id).await;
        }
        assert!(uow
            .repository::<CityRow>()
            .get(&cities[3].id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_rollback_keeps_writes_from_other_handles() {
        let uow = UnitOfWork::in_memory();
        let repo = uow.repository::<CityRow>();
        let kept = city("Varna", 330);
        repo.add(&kept).await.unwrap();

        let tx = uow.begin().await.unwrap();
        tx.repository::<CityRow>().add(&city("Atlantis", 1)).await.unwrap();
        let outside = city("Sofia", 1200);
        repo.add(&outside).await.unwrap();
        tx.rollback().await.unwrap();

        let names: Vec<String> = repo
            .query()
            .order_by("name")
            .fetch_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Sofia", "Varna"]);
    }

    #[tokio::test]
    async fn test_dropped_transaction_keeps_writes_from_other_handles() {
        let (uow, cities) = seeded().await;
        let outside = city("Plovdiv", 340);
        {
            let tx = uow.begin().await.unwrap();
            tx.repository::<CityRow>().delete(&cities[0].id).await;
            uow.repository::<CityRow>().add(&outside).await.unwrap();
        }

        let repo = uow.repository::<CityRow>();
        assert!(repo.get(&cities[0].id).await.unwrap().is_some());
        assert!(repo.get(&outside.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rollback_restores_original_row_order() {
        let (uow, cities) = seeded().await;

        let tx = uow.begin().await.unwrap();
        let tx_repo = tx.repository::<CityRow>();
        let mut renamed = cities[1].clone();
        renamed.name = "Burgas-2".to_string();
        assert!(tx_repo.update(&renamed).await);
        tx_repo.try_delete_where(Filter::gt("population", 150)).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(uow.repository::<CityRow>().get_all().await.unwrap(), cities);
    }

    #[tokio::test]
    async fn test_writes_after_commit_are_rejected() {
        let uow = UnitOfWork::in_memory();
        let tx = uow.begin().await.unwrap();
        tx.commit().await.unwrap();

        let err = tx
            .repository::<CityRow>()
            .add(&city("Ruse", 140))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::TransactionClosed));
        assert_eq!(uow.repository::<CityRow>().count(Filter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_nested_begin_joins_outer_transaction() {
        let (uow, cities) = seeded().await;

        let outer = uow.begin().await.unwrap();
        let inner = outer.begin().await.unwrap();
        inner.repository::<CityRow>().delete(&cities[4].id).await;
        inner.commit().await.unwrap();
        outer.rollback().await.unwrap();

        assert!(uow
            .repository::<CityRow>()
            .get(&cities[4].id)
            .await
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_select_sql_shape() {
        let builder = select_sql(
            "cities",
            &Filter::eq("name", "Sofia"),
            &[Order::desc("population")],
            Some(10),
            Some(5),
        );
        assert_eq!(
            builder.sql(),
            r#"SELECT * FROM "cities" WHERE "name" = $1 ORDER BY "population" DESC LIMIT $2 OFFSET $3"#
        );
    }
}
