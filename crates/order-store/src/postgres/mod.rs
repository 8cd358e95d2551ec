//! PostgreSQL-backed store.

mod orders;
mod rows;

use async_trait::async_trait;
use domain::{ChildAreaPattern, CountryArea, PassportOffice, RegisterOffice, Street};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::error::storage_failure;
use crate::{DirectoryStore, Result};

const FIND_STREETS: &str = r#"
    SELECT street_code, street_name
    FROM street
    WHERE upper(street_name) LIKE upper($1)
    ORDER BY street_code
"#;

const FIND_PASSPORT_OFFICES: &str = r#"
    SELECT p_office_id, p_office_area_id, p_office_name
    FROM passport_office
    WHERE p_office_area_id = $1
    ORDER BY p_office_id
"#;

const FIND_REGISTER_OFFICES: &str = r#"
    SELECT r_office_id, r_office_area_id, r_office_name
    FROM register_office
    WHERE r_office_area_id = $1
    ORDER BY r_office_id
"#;

const FIND_CHILD_AREAS: &str = r#"
    SELECT area_id, area_name
    FROM country_struct
    WHERE area_id LIKE $1 AND area_id <> $2
    ORDER BY area_id
"#;

/// PostgreSQL implementation of the directory and order stores.
///
/// Every operation borrows one pooled connection for its duration.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_street(row: PgRow) -> Result<Street> {
        Ok(Street::new(
            row.try_get("street_code")?,
            row.try_get::<String, _>("street_name")?,
        ))
    }

    fn row_to_passport_office(row: PgRow) -> Result<PassportOffice> {
        Ok(PassportOffice::new(
            row.try_get("p_office_id")?,
            rows::area_code(&row, "p_office_area_id")?,
            row.try_get::<String, _>("p_office_name")?,
        ))
    }

    fn row_to_register_office(row: PgRow) -> Result<RegisterOffice> {
        Ok(RegisterOffice::new(
            row.try_get("r_office_id")?,
            rows::area_code(&row, "r_office_area_id")?,
            row.try_get::<String, _>("r_office_name")?,
        ))
    }

    fn row_to_area(row: PgRow) -> Result<CountryArea> {
        Ok(CountryArea::new(
            rows::area_code(&row, "area_id")?,
            row.try_get::<String, _>("area_name")?,
        ))
    }
}

#[async_trait]
impl DirectoryStore for PostgresStore {
    #[tracing::instrument(skip(self))]
    async fn find_child_areas(&self, area_id: &str) -> Result<Vec<CountryArea>> {
        let predicate = ChildAreaPattern::for_area(area_id)?;
        metrics::counter!("area_lookups_total").increment(1);

        let rows = sqlx::query(FIND_CHILD_AREAS)
            .bind(&predicate.pattern)
            .bind(&predicate.exclude)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_failure("find_child_areas"))?;

        rows.into_iter().map(Self::row_to_area).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn find_streets(&self, pattern: &str) -> Result<Vec<Street>> {
        let rows = sqlx::query(FIND_STREETS)
            .bind(format!("%{pattern}%"))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_failure("find_streets"))?;

        rows.into_iter().map(Self::row_to_street).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn find_passport_offices(&self, area_id: &str) -> Result<Vec<PassportOffice>> {
        let rows = sqlx::query(FIND_PASSPORT_OFFICES)
            .bind(area_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_failure("find_passport_offices"))?;

        rows.into_iter().map(Self::row_to_passport_office).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn find_register_offices(&self, area_id: &str) -> Result<Vec<RegisterOffice>> {
        let rows = sqlx::query(FIND_REGISTER_OFFICES)
            .bind(area_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_failure("find_register_offices"))?;

        rows.into_iter().map(Self::row_to_register_office).collect()
    }
}
