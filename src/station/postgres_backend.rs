//! PostgreSQL-based station store backend.

use async_trait::async_trait;
use sqlx::PgPool;

use super::backend::{StationStore, StoreError};
use super::models::{NewStation, Station};

/// PostgreSQL-based station store.
///
/// Table structure:
/// - `stations` - one row per station, `id` generated by a serial sequence
pub struct PostgresStationStore {
    pool: PgPool,
}

impl PostgresStationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `stations` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stations (
                id SERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                location TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Active'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Station schema ready");
        Ok(())
    }
}

#[async_trait]
impl StationStore for PostgresStationStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn list(&self) -> Result<Vec<Station>, StoreError> {
        let stations = sqlx::query_as::<_, Station>(
            "SELECT id, name, location, status FROM stations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stations)
    }

    async fn get(&self, id: i32) -> Result<Option<Station>, StoreError> {
        let station = sqlx::query_as::<_, Station>(
            "SELECT id, name, location, status FROM stations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(station)
    }

    async fn create(&self, station: NewStation) -> Result<Station, StoreError> {
        let created = sqlx::query_as::<_, Station>(
            r#"
            INSERT INTO stations (name, location, status)
            VALUES ($1, $2, $3)
            RETURNING id, name, location, status
            "#,
        )
        .bind(&station.name)
        .bind(&station.location)
        .bind(&station.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn update(&self, id: i32, station: NewStation) -> Result<Station, StoreError> {
        // A row deleted concurrently simply matches nothing
        let updated = sqlx::query_as::<_, Station>(
            r#"
            UPDATE stations
            SET name = $2, location = $3, status = $4
            WHERE id = $1
            RETURNING id, name, location, status
            "#,
        )
        .bind(id)
        .bind(&station.name)
        .bind(&station.location)
        .bind(&station.status)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM stations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
