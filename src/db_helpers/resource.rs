use std::marker::PhantomData;

use serde::Serialize;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite, SqlitePool};

use crate::errors::RequestError;

pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Describes one soft-deletable table to [`SoftDeleteRepository`].
///
/// Every table has an integer `id`, a store defaulted `created_at` and the
/// nullable `updated_at` / `deleted_at` pair; the rest is listed here.
pub trait Resource: Send + Sync + 'static {
    /// What gets written on insert and update.
    type Entity: Send + 'static;
    /// What a row of [`Resource::SELECT`] decodes into.
    type Response: for<'r> FromRow<'r, SqliteRow> + Serialize + Send + Unpin + 'static;

    /// Lowercase name used in error messages, e.g. `article`.
    const NAME: &'static str;
    const TABLE: &'static str;
    /// `SELECT ... FROM <TABLE> AS r ...` with no `WHERE` clause. The
    /// resource table must be aliased as `r`.
    const SELECT: &'static str;
    /// Writable columns, in the order [`Resource::bind_entity`] binds them.
    const COLUMNS: &'static [&'static str];

    fn bind_entity<'q>(entity: Self::Entity, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
}

/// A resource whose active listing can be narrowed by a text pattern.
pub trait Filterable: Resource {
    /// Column in [`Resource::SELECT`] the pattern is matched against.
    const FILTER_COLUMN: &'static str;
}

pub struct SoftDeleteRepository<R> {
    pool: SqlitePool,
    resource: PhantomData<fn() -> R>,
}

fn expect_single_row(rows_affected: u64, name: &str, action: &str) -> Result<(), RequestError> {
    if rows_affected != 1 {
        tracing::debug!("{} rows affected, expected one {} to be {}", rows_affected, name, action);
        return Err(RequestError::Persistence(format!("no {} {}", name, action)));
    }
    Ok(())
}

impl<R: Resource> SoftDeleteRepository<R> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            resource: PhantomData,
        }
    }

    pub async fn insert(&self, entity: R::Entity) -> Result<(), RequestError> {
        let placeholders = vec!["?"; R::COLUMNS.len()].join(", ");
        let query = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            R::COLUMNS.join(", "),
            placeholders
        );
        let result = R::bind_entity(entity, sqlx::query(&query))
            .execute(&self.pool)
            .await?;
        tracing::debug!("inserted {} {}", R::NAME, result.last_insert_rowid());
        expect_single_row(result.rows_affected(), R::NAME, "saved")
    }

    pub async fn find_all(&self) -> Result<Vec<R::Response>, RequestError> {
        self.fetch_where("r.deleted_at IS NULL").await
    }

    pub async fn find_all_soft_deleted(&self) -> Result<Vec<R::Response>, RequestError> {
        self.fetch_where("r.deleted_at IS NOT NULL").await
    }

    /// Looks a row up whether or not it has been soft deleted.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<R::Response>, RequestError> {
        let query = format!("{} WHERE r.id = ?", R::SELECT);
        let result = sqlx::query_as::<Sqlite, R::Response>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(result)
    }

    pub async fn update(&self, id: i64, entity: R::Entity) -> Result<(), RequestError> {
        let assignments = R::COLUMNS
            .iter()
            .map(|column| format!("{} = ?", column))
            .collect::<Vec<String>>()
            .join(", ");
        let query = format!(
            "UPDATE {} SET {}, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            R::TABLE,
            assignments
        );
        let result = R::bind_entity(entity, sqlx::query(&query))
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_single_row(result.rows_affected(), R::NAME, "updated")
    }

    pub async fn soft_delete(&self, id: i64) -> Result<(), RequestError> {
        let query = format!(
            "UPDATE {} SET deleted_at = CURRENT_TIMESTAMP WHERE id = ?",
            R::TABLE
        );
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        expect_single_row(result.rows_affected(), R::NAME, "deleted")
    }

    pub async fn delete(&self, id: i64) -> Result<(), RequestError> {
        let query = format!("DELETE FROM {} WHERE id = ?", R::TABLE);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        expect_single_row(result.rows_affected(), R::NAME, "deleted")
    }

    async fn fetch_where(&self, condition: &str) -> Result<Vec<R::Response>, RequestError> {
        let query = format!("{} WHERE {} ORDER BY r.id", R::SELECT, condition);
        let result = sqlx::query_as::<Sqlite, R::Response>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(result)
    }
}

impl<R: Filterable> SoftDeleteRepository<R> {
    /// Active rows whose filter column contains `pattern`, matched with
    /// `GLOB` so the comparison is case sensitive and `*`, `?` and `[...]`
    /// in the pattern keep their wildcard meaning.
    pub async fn find_all_by_filter(&self, pattern: &str) -> Result<Vec<R::Response>, RequestError> {
        let query = format!(
            "{} WHERE r.deleted_at IS NULL AND {} GLOB '*' || ? || '*' ORDER BY r.id",
            R::SELECT,
            R::FILTER_COLUMN
        );
        let result = sqlx::query_as::<Sqlite, R::Response>(&query)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_helpers::test_support::memory_pool;
    use crate::db_helpers::CategoryResource;
    use crate::models::Category;

    fn category(name: &str) -> Category {
        Category {
            name: name.to_owned(),
            slug: crate::slugify(name),
        }
    }

    #[tokio::test]
    async fn writes_on_missing_id_are_persistence_errors() {
        let repository = SoftDeleteRepository::<CategoryResource>::new(memory_pool(true).await);

        let result = repository.update(42, category("Nope")).await;
        assert!(matches!(result, Err(RequestError::Persistence(ref m)) if m == "no category updated"));

        let result = repository.soft_delete(42).await;
        assert!(matches!(result, Err(RequestError::Persistence(ref m)) if m == "no category deleted"));

        let result = repository.delete(42).await;
        assert!(matches!(result, Err(RequestError::Persistence(_))));
    }

    #[tokio::test]
    async fn find_by_id_ignores_soft_delete_state() {
        let repository = SoftDeleteRepository::<CategoryResource>::new(memory_pool(true).await);
        repository.insert(category("Tech News")).await.unwrap();
        let id = repository.find_all().await.unwrap()[0].id;

        repository.soft_delete(id).await.unwrap();

        let found = repository.find_by_id(id).await.unwrap().unwrap();
        assert!(found.deleted_at.is_some());
        assert!(repository.find_by_id(id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unchanged_update_still_succeeds() {
        let repository = SoftDeleteRepository::<CategoryResource>::new(memory_pool(true).await);
        repository.insert(category("Same")).await.unwrap();
        let id = repository.find_all().await.unwrap()[0].id;

        repository.update(id, category("Same")).await.unwrap();
        repository.update(id, category("Same")).await.unwrap();

        let found = repository.find_by_id(id).await.unwrap().unwrap();
        assert!(found.updated_at.is_some());
    }

    #[tokio::test]
    async fn store_constraints_surface_as_database_errors() {
        let repository = SoftDeleteRepository::<CategoryResource>::new(memory_pool(true).await);
        let result = repository.insert(category("")).await;
        assert!(matches!(
            result,
            Err(RequestError::DatabaseError(sqlx::Error::Database(_)))
        ));
    }
}
