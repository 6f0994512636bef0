//! `PostgreSQL` record store for the phonebook service.
//!
//! This crate provides [`PostgresPersonStore`], the production implementation
//! of the `PersonStore` trait from `phonebook-core`. It uses a sqlx connection
//! pool and supports:
//!
//! - Rule checks before every write
//! - Store-wide uniqueness through `UNIQUE` constraints, reported as
//!   validation failures naming the offending field
//! - Lazy connection, so a database that is down at startup only fails the
//!   requests that touch it
//!
//! # Example
//!
//! ```no_run
//! use phonebook_core::{PersonDraft, PersonStore};
//! use phonebook_postgres::PostgresPersonStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresPersonStore::new("postgres://localhost/phonebook").await?;
//! store.migrate().await?;
//! let person = store.create(PersonDraft::new("Ada Lovelace", "12-34-56789")).await?;
//! println!("created {}", person.id);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use phonebook_core::validation::{Field, RuleSet, ValidationError};
use phonebook_core::{Person, PersonDraft, PersonId, PersonStore, StoreError, StoreFuture};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// Name of the `UNIQUE` constraint on `persons.name`.
const NAME_UNIQUE_CONSTRAINT: &str = "persons_name_key";

/// Name of the `UNIQUE` constraint on `persons.number`.
const NUMBER_UNIQUE_CONSTRAINT: &str = "persons_number_key";

/// Row shape of the `persons` table, minus bookkeeping columns.
#[derive(Debug, sqlx::FromRow)]
struct PersonRow {
    id: Uuid,
    name: String,
    number: String,
}

impl From<PersonRow> for Person {
    fn from(row: PersonRow) -> Self {
        Self {
            id: PersonId::from_uuid(row.id),
            name: row.name,
            number: row.number,
        }
    }
}

/// `PostgreSQL`-backed `PersonStore`.
#[derive(Debug, Clone)]
pub struct PostgresPersonStore {
    pool: PgPool,
}

impl PostgresPersonStore {
    /// Connect eagerly to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unclassified`] if the connection fails.
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| StoreError::Unclassified(format!("Failed to connect: {e}")))?;
        Ok(Self::from_pool(pool))
    }

    /// Build a pool that opens connections on first use.
    ///
    /// Only the URL is checked here; an unreachable server surfaces on the
    /// first query instead.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unclassified`] if `database_url` cannot be parsed.
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)
            .map_err(|e| StoreError::Unclassified(format!("Invalid database URL: {e}")))?;
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unclassified`] if migrations fail.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unclassified(format!("Migration failed: {e}")))
    }

    /// Round-trip a trivial query.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unclassified`] if the database is unreachable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(unclassified)
    }
}

fn unclassified(e: sqlx::Error) -> StoreError {
    StoreError::Unclassified(e.to_string())
}

/// Translate a failed write, turning unique violations into validation errors.
fn write_error(e: sqlx::Error, draft: &PersonDraft) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(NAME_UNIQUE_CONSTRAINT) => Some(Field::Name),
                Some(NUMBER_UNIQUE_CONSTRAINT) => Some(Field::Number),
                _ => None,
            };
            if let Some(field) = field {
                return ValidationError::unique(field, field.value(draft)).into();
            }
        }
    }
    unclassified(e)
}

fn record(op: &'static str) {
    metrics::counter!("phonebook_store_operations_total", "op" => op).increment(1);
}

impl PersonStore for PostgresPersonStore {
    fn create(&self, draft: PersonDraft) -> StoreFuture<'_, Person> {
        Box::pin(async move {
            record("create");
            RuleSet::person().check(&draft)?;

            let id = PersonId::new();
            let row: PersonRow = sqlx::query_as(
                r"
                INSERT INTO persons (id, name, number)
                VALUES ($1, $2, $3)
                RETURNING id, name, number
                ",
            )
            .bind(id.as_uuid())
            .bind(&draft.name)
            .bind(&draft.number)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, &draft))?;

            tracing::debug!(id = %row.id, "Person inserted");
            Ok(row.into())
        })
    }

    fn find_all(&self) -> StoreFuture<'_, Vec<Person>> {
        Box::pin(async move {
            record("find_all");
            let rows: Vec<PersonRow> = sqlx::query_as(
                "SELECT id, name, number FROM persons ORDER BY created_at ASC, id ASC",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(unclassified)?;

            Ok(rows.into_iter().map(Person::from).collect())
        })
    }

    fn find_by_id(&self, id: PersonId) -> StoreFuture<'_, Option<Person>> {
        Box::pin(async move {
            record("find_by_id");
            let row: Option<PersonRow> =
                sqlx::query_as("SELECT id, name, number FROM persons WHERE id = $1")
                    .bind(id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(unclassified)?;

            Ok(row.map(Person::from))
        })
    }

    fn update_by_id(&self, id: PersonId, draft: PersonDraft) -> StoreFuture<'_, Option<Person>> {
        Box::pin(async move {
            record("update_by_id");
            RuleSet::person().check(&draft)?;

            let row: Option<PersonRow> = sqlx::query_as(
                r"
                UPDATE persons
                SET name = $2, number = $3
                WHERE id = $1
                RETURNING id, name, number
                ",
            )
            .bind(id.as_uuid())
            .bind(&draft.name)
            .bind(&draft.number)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| write_error(e, &draft))?;

            Ok(row.map(Person::from))
        })
    }

    fn delete_by_id(&self, id: PersonId) -> StoreFuture<'_, Option<Person>> {
        Box::pin(async move {
            record("delete_by_id");
            let row: Option<PersonRow> =
                sqlx::query_as("DELETE FROM persons WHERE id = $1 RETURNING id, name, number")
                    .bind(id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(unclassified)?;

            Ok(row.map(Person::from))
        })
    }

    fn count(&self) -> StoreFuture<'_, usize> {
        Box::pin(async move {
            record("count");
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM persons")
                .fetch_one(&self.pool)
                .await
                .map_err(unclassified)?;

            usize::try_from(count)
                .map_err(|_| StoreError::Unclassified(format!("Invalid row count: {count}")))
        })
    }
}
