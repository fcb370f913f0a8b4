//! Territory polygon storage (single row in global_settings)

use sqlx::{types::Json, Pool, Postgres};

use crate::{error::AppResult, geo::TerritoryPolygon};

const TERRITORY_KEY: &str = "territory_polygon";

#[derive(Clone)]
pub struct TerritoryRepository {
    pool: Pool<Postgres>,
}

impl TerritoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Raw stored value; decoding is left to the caller so that a corrupt
    /// value does not fail the request
    pub async fn get_raw(&self) -> AppResult<Option<serde_json::Value>> {
        let value: Option<Option<serde_json::Value>> =
            sqlx::query_scalar("SELECT value FROM global_settings WHERE key = $1")
                .bind(TERRITORY_KEY)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value.flatten())
    }

    /// Replace the stored polygon wholesale
    pub async fn save(&self, polygon: &TerritoryPolygon) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO global_settings (key, value) VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(TERRITORY_KEY)
        .bind(Json(polygon))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
