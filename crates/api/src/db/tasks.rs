//! Task repository for database operations.
//!
//! Queries are assembled with `QueryBuilder` and bound parameters; sort
//! columns are never taken from user input directly — the route layer maps
//! requested sort fields through a whitelist before they reach this module.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use taskboard_core::{Page, PageRequest, TaskId};

use super::{RepositoryError, escape_like};
use crate::models::Task;

/// Default ordering when a request names no sort fields.
const DEFAULT_ORDER_COLUMNS: &[&str] = &["created_date"];

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` task queries.
#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: uuid::Uuid,
    name: String,
    created_by_user: String,
    created_date: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: TaskId::new(row.id),
            name: row.name,
            created_by_user: row.created_by_user,
            created_date: row.created_date,
        }
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Row predicate for task list queries.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Restrict to rows created by this user (non-admin callers).
    pub owner: Option<String>,
    /// Case-insensitive substring match on `name`.
    pub name_contains: Option<String>,
}

impl TaskFilter {
    fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(owner) = &self.owner {
            qb.push(" AND created_by_user = ").push_bind(owner.clone());
        }
        if let Some(name) = &self.name_contains {
            qb.push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(name)));
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for task database operations.
pub struct TaskRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TaskRepository<'a> {
    /// Create a new task repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a task by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let row: Option<TaskRow> = sqlx::query_as(
            r"
            SELECT id, name, created_by_user, created_date
            FROM task
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Fetch one page of tasks matching `filter`, ordered by the given
    /// whitelisted columns.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either the page or the count
    /// query fails.
    pub async fn find_page(
        &self,
        filter: &TaskFilter,
        request: &PageRequest,
        order_columns: &[&'static str],
    ) -> Result<Page<Task>, RepositoryError> {
        let mut qb = QueryBuilder::new(
            "SELECT id, name, created_by_user, created_date FROM task WHERE TRUE",
        );
        filter.apply(&mut qb);

        qb.push(" ORDER BY ");
        let columns = if order_columns.is_empty() {
            DEFAULT_ORDER_COLUMNS
        } else {
            order_columns
        };
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(*column).push(" ").push(request.direction().as_sql());
        }
        qb.push(" LIMIT ")
            .push_bind(request.limit())
            .push(" OFFSET ")
            .push_bind(request.offset());

        let rows: Vec<TaskRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM task WHERE TRUE");
        filter.apply(&mut count_qb);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            request,
            total,
        ))
    }

    /// Insert a new task stamped with its creator and creation time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the generated id collides.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        created_by_user: &str,
    ) -> Result<Task, RepositoryError> {
        let row: TaskRow = sqlx::query_as(
            r"
            INSERT INTO task (id, name, created_by_user, created_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, created_by_user, created_date
            ",
        )
        .bind(TaskId::generate().as_uuid())
        .bind(name)
        .bind(created_by_user)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("task id already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Update a task's name, preserving its ownership stamps.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the task doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: TaskId, name: &str) -> Result<Task, RepositoryError> {
        let row: Option<TaskRow> = sqlx::query_as(
            r"
            UPDATE task
            SET name = $2
            WHERE id = $1
            RETURNING id, name, created_by_user, created_date
            ",
        )
        .bind(id.as_uuid())
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete a task by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the task doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: TaskId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM task WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
