//! Scans repository. Scans are append-only: there is no update or delete.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    geo::LookupStrategy,
    models::{
        checkpoint::Checkpoint,
        scan::{NewScan, ReporterScanStats, Scan, ScanDetails, ScanQuery, ScanTotals},
    },
};

use super::Repository;

/// Storage seam used by the scan service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Find a checkpoint, active or not, using one lookup strategy
    async fn find_checkpoint(&self, strategy: LookupStrategy, code: &str) -> AppResult<Option<Checkpoint>>;

    /// Insert a scan provided the checkpoint is still active. Returns
    /// `None` when it was deactivated or deleted in the meantime.
    async fn insert_scan(&self, scan: &NewScan) -> AppResult<Option<Scan>>;
}

#[async_trait]
impl ScanStore for Repository {
    async fn find_checkpoint(&self, strategy: LookupStrategy, code: &str) -> AppResult<Option<Checkpoint>> {
        self.checkpoints.find_by(strategy, code).await
    }

    async fn insert_scan(&self, scan: &NewScan) -> AppResult<Option<Scan>> {
        self.scans.insert(scan).await
    }
}

#[derive(Clone)]
pub struct ScansRepository {
    pool: Pool<Postgres>,
}

impl ScansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a scan if its checkpoint is active at insert time
    pub async fn insert(&self, scan: &NewScan) -> AppResult<Option<Scan>> {
        let row = sqlx::query_as::<_, Scan>(
            r#"
            INSERT INTO scans (user_id, checkpoint_id, latitude, longitude, distance_meters, is_valid, notes)
            SELECT $1, c.id, $3, $4, $5, $6, $7
            FROM checkpoints c
            WHERE c.id = $2 AND c.is_active = TRUE
            RETURNING *
            "#,
        )
        .bind(scan.user_id)
        .bind(scan.checkpoint_id)
        .bind(scan.position.latitude)
        .bind(scan.position.longitude)
        .bind(scan.distance_meters)
        .bind(scan.is_valid)
        .bind(&scan.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(super::reporter_write_error)?;
        Ok(row)
    }

    /// Scan history, newest first
    pub async fn list(&self, query: &ScanQuery, limit: i64) -> AppResult<Vec<ScanDetails>> {
        let mut sql = String::from(
            r#"
            SELECT s.id, s.scan_time, s.latitude, s.longitude, s.distance_meters, s.is_valid, s.notes,
                   u.id AS user_id, u.full_name AS user_name, u.role AS user_role,
                   c.id AS checkpoint_id, c.name AS checkpoint_name, c.checkpoint_type
            FROM scans s
            JOIN users u ON s.user_id = u.id
            JOIN checkpoints c ON s.checkpoint_id = c.id
            WHERE 1=1
            "#,
        );
        let mut idx = 1;

        macro_rules! add_filter {
            ($field:expr, $clause:expr) => {
                if $field.is_some() {
                    sql.push_str(&format!(" AND {} ${}", $clause, idx));
                    idx += 1;
                }
            };
        }

        add_filter!(query.user_id, "s.user_id =");
        add_filter!(query.checkpoint_id, "s.checkpoint_id =");
        add_filter!(query.from_date, "s.scan_time >=");
        add_filter!(query.to_date, "s.scan_time <=");
        sql.push_str(&format!(" ORDER BY s.scan_time DESC, s.id DESC LIMIT ${}", idx));

        let mut builder = sqlx::query_as::<_, ScanDetails>(&sql);

        macro_rules! bind_filter {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_filter!(query.user_id);
        bind_filter!(query.checkpoint_id);
        bind_filter!(query.from_date);
        bind_filter!(query.to_date);

        let rows = builder.bind(limit).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Aggregate counters over an optional window
    pub async fn totals(
        &self,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
    ) -> AppResult<ScanTotals> {
        let row = sqlx::query_as::<_, ScanTotals>(
            r#"
            SELECT
                COUNT(*) AS total_scans,
                COUNT(DISTINCT user_id) AS active_users,
                COUNT(DISTINCT checkpoint_id) AS scanned_checkpoints,
                AVG(distance_meters) AS avg_distance,
                COUNT(*) FILTER (WHERE is_valid) AS valid_scans,
                COUNT(*) FILTER (WHERE NOT is_valid) AS invalid_scans
            FROM scans
            WHERE ($1::timestamptz IS NULL OR scan_time >= $1)
              AND ($2::timestamptz IS NULL OR scan_time <= $2)
            "#,
        )
        .bind(from_date)
        .bind(to_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Per-reporter counters for guards and patrol officers
    pub async fn reporter_stats(
        &self,
        from_date: Option<DateTime<Utc>>,
        to_date: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<ReporterScanStats>> {
        let rows = sqlx::query_as::<_, ReporterScanStats>(
            r#"
            SELECT u.id, u.full_name, u.role,
                   COUNT(s.id) AS scan_count,
                   MAX(s.scan_time) AS last_scan
            FROM users u
            LEFT JOIN scans s ON u.id = s.user_id
                AND ($1::timestamptz IS NULL OR s.scan_time >= $1)
                AND ($2::timestamptz IS NULL OR s.scan_time <= $2)
            WHERE u.role IN ('kpp', 'patrol')
            GROUP BY u.id, u.full_name, u.role
            ORDER BY scan_count DESC, u.id
            "#,
        )
        .bind(from_date)
        .bind(to_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
