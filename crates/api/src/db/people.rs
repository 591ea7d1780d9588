//! Person repository for database operations.
//!
//! People are stored as a `person` row (address flattened into columns) plus
//! zero or more `person_child` rows. Updates replace the child set inside the
//! same transaction that restamps the audit columns.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use taskboard_core::{ChildId, Page, PageRequest, PersonId};

use super::{RepositoryError, escape_like};
use crate::models::{Address, Child, ChildPayload, Person, PersonPayload};

/// Default ordering when a request names no sort fields.
const DEFAULT_ORDER_COLUMNS: &[&str] = &["created_date"];

const PERSON_COLUMNS: &str = "id, full_name, date_of_birth, address, city, state_or_province, \
     created_by_user, created_date, last_modified_by_user, last_modified_date";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` person queries.
#[derive(Debug, sqlx::FromRow)]
struct PersonRow {
    id: Uuid,
    full_name: String,
    date_of_birth: NaiveDate,
    address: Option<String>,
    city: Option<String>,
    state_or_province: Option<String>,
    created_by_user: String,
    created_date: DateTime<Utc>,
    last_modified_by_user: Option<String>,
    last_modified_date: Option<DateTime<Utc>>,
}

impl PersonRow {
    fn into_person(self, children: Vec<Child>) -> Person {
        Person {
            id: PersonId::new(self.id),
            full_name: self.full_name,
            date_of_birth: self.date_of_birth,
            address: Address {
                address: self.address,
                city: self.city,
                state_or_province: self.state_or_province,
            },
            children,
            created_by_user: self.created_by_user,
            created_date: self.created_date,
            last_modified_by_user: self.last_modified_by_user,
            last_modified_date: self.last_modified_date,
        }
    }
}

/// Internal row type for `PostgreSQL` child queries.
#[derive(Debug, sqlx::FromRow)]
struct ChildRow {
    id: Uuid,
    person_id: Uuid,
    name: String,
    date_of_birth: Option<NaiveDate>,
}

impl From<ChildRow> for Child {
    fn from(row: ChildRow) -> Self {
        Self {
            id: ChildId::new(row.id),
            name: row.name,
            date_of_birth: row.date_of_birth,
        }
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Row predicate for person list queries.
#[derive(Debug, Clone, Default)]
pub struct PersonFilter {
    /// Restrict to rows created by this user (non-admin callers).
    pub owner: Option<String>,
    /// Case-insensitive substring match on `full_name`.
    pub name_contains: Option<String>,
}

impl PersonFilter {
    fn apply(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(owner) = &self.owner {
            qb.push(" AND created_by_user = ").push_bind(owner.clone());
        }
        if let Some(name) = &self.name_contains {
            qb.push(" AND full_name ILIKE ")
                .push_bind(format!("%{}%", escape_like(name)));
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for person database operations.
pub struct PersonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PersonRepository<'a> {
    /// Create a new person repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a person (with children) by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(&self, id: PersonId) -> Result<Option<Person>, RepositoryError> {
        let row: Option<PersonRow> = sqlx::query_as(&format!(
            "SELECT {PERSON_COLUMNS} FROM person WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let children = self.children_for(&[row.id]).await?.remove(&row.id);
        Ok(Some(row.into_person(children.unwrap_or_default())))
    }

    /// Fetch one page of people matching `filter`, ordered by the given
    /// whitelisted columns, children included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any of the queries fail.
    pub async fn find_page(
        &self,
        filter: &PersonFilter,
        request: &PageRequest,
        order_columns: &[&'static str],
    ) -> Result<Page<Person>, RepositoryError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {PERSON_COLUMNS} FROM person WHERE TRUE"
        ));
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

        let rows: Vec<PersonRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut children = self.children_for(&ids).await?;

        let people = rows
            .into_iter()
            .map(|row| {
                let kids = children.remove(&row.id).unwrap_or_default();
                row.into_person(kids)
            })
            .collect();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM person WHERE TRUE");
        filter.apply(&mut count_qb);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        Ok(Page::new(people, request, total))
    }

    /// Insert a new person (and children) stamped with its creator.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the generated id collides.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        payload: &PersonPayload,
        created_by_user: &str,
    ) -> Result<Person, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: PersonRow = sqlx::query_as(&format!(
            r"
            INSERT INTO person
                (id, full_name, date_of_birth, address, city, state_or_province,
                 created_by_user, created_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PERSON_COLUMNS}
            "
        ))
        .bind(PersonId::generate().as_uuid())
        .bind(&payload.full_name)
        .bind(payload.date_of_birth)
        .bind(&payload.address.address)
        .bind(&payload.address.city)
        .bind(&payload.address.state_or_province)
        .bind(created_by_user)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("person id already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let children = insert_children(&mut tx, row.id, &payload.children).await?;

        tx.commit().await?;

        Ok(row.into_person(children))
    }

    /// Update a person, restamping the `last_modified_*` audit columns and
    /// replacing the child set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the person doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: PersonId,
        payload: &PersonPayload,
        modified_by_user: &str,
    ) -> Result<Person, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<PersonRow> = sqlx::query_as(&format!(
            r"
            UPDATE person
            SET full_name = $2,
                date_of_birth = $3,
                address = $4,
                city = $5,
                state_or_province = $6,
                last_modified_by_user = $7,
                last_modified_date = $8
            WHERE id = $1
            RETURNING {PERSON_COLUMNS}
            "
        ))
        .bind(id.as_uuid())
        .bind(&payload.full_name)
        .bind(payload.date_of_birth)
        .bind(&payload.address.address)
        .bind(&payload.address.city)
        .bind(&payload.address.state_or_province)
        .bind(modified_by_user)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };

        sqlx::query("DELETE FROM person_child WHERE person_id = $1")
            .bind(row.id)
            .execute(&mut *tx)
            .await?;
        let children = insert_children(&mut tx, row.id, &payload.children).await?;

        tx.commit().await?;

        Ok(row.into_person(children))
    }

    /// Delete a person by their ID. Children cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the person doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: PersonId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM person WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Load children for a set of people, grouped by person id.
    async fn children_for(
        &self,
        person_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Child>>, RepositoryError> {
        if person_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<ChildRow> = sqlx::query_as(
            r"
            SELECT id, person_id, name, date_of_birth
            FROM person_child
            WHERE person_id = ANY($1)
            ORDER BY name ASC
            ",
        )
        .bind(person_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Child>> = HashMap::new();
        for row in rows {
            grouped.entry(row.person_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}

/// Insert a replacement child set inside an open transaction.
async fn insert_children(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    person_id: Uuid,
    children: &[ChildPayload],
) -> Result<Vec<Child>, RepositoryError> {
    let mut inserted = Vec::with_capacity(children.len());
    for child in children {
        let row: ChildRow = sqlx::query_as(
            r"
            INSERT INTO person_child (id, person_id, name, date_of_birth)
            VALUES ($1, $2, $3, $4)
            RETURNING id, person_id, name, date_of_birth
            ",
        )
        .bind(ChildId::generate().as_uuid())
        .bind(person_id)
        .bind(&child.name)
        .bind(child.date_of_birth)
        .fetch_one(&mut **tx)
        .await?;
        inserted.push(row.into());
    }
    Ok(inserted)
}
