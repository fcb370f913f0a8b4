//! Checkpoint scan service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    geo::{GeoPoint, LookupStrategy, Resolution, ScanVerdict},
    models::{
        checkpoint::{Checkpoint, CheckpointSummary},
        scan::{NewScan, ScanDetails, ScanQuery, ScanRequest, ScanResult, ScanStats, ScanStatsQuery},
        user::UserClaims,
    },
    repository::{Repository, ScanStore},
};

const DEFAULT_HISTORY_LIMIT: i64 = 100;
const MAX_HISTORY_LIMIT: i64 = 1000;

/// Turns a raw scan attempt into a persisted verdict
#[derive(Clone)]
pub struct ScanValidator {
    store: Arc<dyn ScanStore>,
}

impl ScanValidator {
    pub fn new(store: Arc<dyn ScanStore>) -> Self {
        Self { store }
    }

    /// Resolve a submitted code, trying each lookup strategy in order
    pub async fn resolve(&self, code: &str) -> AppResult<Resolution<Checkpoint>> {
        let mut resolution = Resolution::Unknown;
        for strategy in LookupStrategy::candidates(code) {
            let found = self.store.find_checkpoint(strategy, code).await?;
            resolution = resolution.observe(found, |c| c.is_active);
            if resolution.is_active() {
                tracing::debug!(%strategy, "Scan code resolved");
                break;
            }
        }
        Ok(resolution)
    }

    /// Validate and record a scan. Out-of-range scans are recorded with
    /// `is_valid = false`; only unresolved codes are rejected.
    pub async fn submit(&self, user_id: i32, request: ScanRequest) -> AppResult<ScanResult> {
        let code = request.code.trim();

        let checkpoint = match self.resolve(code).await? {
            Resolution::Active(checkpoint) => checkpoint,
            Resolution::Inactive(checkpoint) => {
                tracing::warn!(user_id, checkpoint_id = checkpoint.id, "Scan of inactive checkpoint");
                return Err(AppError::CheckpointNotResolved);
            }
            Resolution::Unknown => {
                tracing::warn!(user_id, code, "Scan code matched no checkpoint");
                return Err(AppError::CheckpointNotResolved);
            }
        };

        let position = GeoPoint::new(request.latitude, request.longitude);
        let verdict = ScanVerdict::evaluate(
            position,
            checkpoint.position(),
            checkpoint.radius_meters,
            checkpoint.is_active,
        );

        let new_scan = NewScan {
            user_id,
            checkpoint_id: checkpoint.id,
            position,
            distance_meters: verdict.distance_meters,
            is_valid: verdict.is_valid,
            notes: request
                .note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        };

        let scan = match self.store.insert_scan(&new_scan).await? {
            Some(scan) => scan,
            None => {
                tracing::warn!(
                    user_id,
                    checkpoint_id = checkpoint.id,
                    "Checkpoint deactivated before scan was recorded"
                );
                return Err(AppError::CheckpointNotResolved);
            }
        };

        if verdict.is_valid {
            tracing::info!(
                user_id,
                checkpoint_id = checkpoint.id,
                distance = verdict.distance_meters,
                "Scan accepted"
            );
        } else {
            tracing::warn!(
                user_id,
                checkpoint_id = checkpoint.id,
                distance = verdict.distance_meters,
                radius = checkpoint.radius_meters,
                "Scan out of range"
            );
        }

        Ok(ScanResult {
            scan,
            checkpoint: CheckpointSummary::from(&checkpoint),
            distance_meters: verdict.distance_meters,
            required_radius: checkpoint.radius_meters,
            is_valid: verdict.is_valid,
            message: verdict.message(checkpoint.radius_meters),
        })
    }
}

#[derive(Clone)]
pub struct ScanService {
    repository: Repository,
    validator: ScanValidator,
}

impl ScanService {
    pub fn new(repository: Repository) -> Self {
        let validator = ScanValidator::new(Arc::new(repository.clone()));
        Self { repository, validator }
    }

    pub async fn submit(&self, claims: &UserClaims, request: ScanRequest) -> AppResult<ScanResult> {
        self.validator.submit(claims.user_id, request).await
    }

    /// Scan history. Non-admins only ever see their own scans.
    pub async fn history(&self, claims: &UserClaims, mut query: ScanQuery) -> AppResult<Vec<ScanDetails>> {
        if !claims.is_admin() {
            query.user_id = Some(claims.user_id);
        }
        let limit = query
            .limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        self.repository.scans.list(&query, limit).await
    }

    pub async fn stats(&self, query: ScanStatsQuery) -> AppResult<ScanStats> {
        let stats = self.repository.scans.totals(query.from_date, query.to_date).await?;
        let user_stats = self
            .repository
            .scans
            .reporter_stats(query.from_date, query.to_date)
            .await?;
        Ok(ScanStats { stats, user_stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geo::distance::destination,
        models::{enums::CheckpointType, scan::Scan},
        repository::scans::MockScanStore,
    };
    use chrono::Utc;
    use mockall::predicate::eq;

    fn checkpoint(is_active: bool) -> Checkpoint {
        Checkpoint {
            id: 12,
            name: "Main gate".to_string(),
            description: None,
            latitude: 41.2995,
            longitude: 69.2401,
            radius_meters: 50.0,
            short_code: "4821".to_string(),
            qr_code_data: "CP-1700000000000-k3j9x0a1b".to_string(),
            checkpoint_type: CheckpointType::Kpp,
            is_active,
            created_at: None,
            updated_at: None,
        }
    }

    fn stored(scan: &NewScan) -> Scan {
        Scan {
            id: 1,
            user_id: scan.user_id,
            checkpoint_id: scan.checkpoint_id,
            scan_time: Utc::now(),
            latitude: scan.position.latitude,
            longitude: scan.position.longitude,
            distance_meters: scan.distance_meters,
            is_valid: scan.is_valid,
            notes: scan.notes.clone(),
        }
    }

    fn request(code: &str, at: GeoPoint) -> ScanRequest {
        ScanRequest {
            code: code.to_string(),
            latitude: at.latitude,
            longitude: at.longitude,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_scan_at_checkpoint_is_valid() {
        let mut store = MockScanStore::new();
        store
            .expect_find_checkpoint()
            .with(eq(LookupStrategy::ShortCode), eq("4821"))
            .times(1)
            .returning(|_, _| Ok(Some(checkpoint(true))));
        store
            .expect_insert_scan()
            .times(1)
            .returning(|scan| Ok(Some(stored(scan))));

        let validator = ScanValidator::new(Arc::new(store));
        let result = validator
            .submit(5, request(" 4821 ", checkpoint(true).position()))
            .await
            .expect("scan accepted");

        assert!(result.is_valid);
        assert!(result.distance_meters.abs() < 1e-9);
        assert_eq!(result.checkpoint.name, "Main gate");
        assert_eq!(result.scan.user_id, 5);
    }

    #[tokio::test]
    async fn test_out_of_range_scan_is_recorded_invalid() {
        let far = destination(checkpoint(true).position(), 90.0, 500.0);

        let mut store = MockScanStore::new();
        store
            .expect_find_checkpoint()
            .returning(|_, _| Ok(Some(checkpoint(true))));
        store
            .expect_insert_scan()
            .withf(|scan| !scan.is_valid && (scan.distance_meters - 500.0).abs() < 1e-6)
            .times(1)
            .returning(|scan| Ok(Some(stored(scan))));

        let validator = ScanValidator::new(Arc::new(store));
        let result = validator.submit(5, request("4821", far)).await.expect("recorded");

        assert!(!result.is_valid);
        assert!(!result.scan.is_valid);
        assert!(result.message.starts_with("Too far"));
    }

    #[tokio::test]
    async fn test_falls_back_to_qr_payload() {
        let mut store = MockScanStore::new();
        store
            .expect_find_checkpoint()
            .with(eq(LookupStrategy::ShortCode), eq("1234"))
            .returning(|_, _| Ok(None));
        store
            .expect_find_checkpoint()
            .with(eq(LookupStrategy::QrPayload), eq("1234"))
            .returning(|_, _| Ok(Some(checkpoint(true))));
        store
            .expect_insert_scan()
            .returning(|scan| Ok(Some(stored(scan))));

        let validator = ScanValidator::new(Arc::new(store));
        let result = validator
            .submit(5, request("1234", checkpoint(true).position()))
            .await
            .expect("resolved by payload");
        assert!(result.is_valid);
    }

    #[tokio::test]
    async fn test_qr_payload_skips_short_code_lookup() {
        let mut store = MockScanStore::new();
        store
            .expect_find_checkpoint()
            .with(eq(LookupStrategy::QrPayload), eq("CP-1700000000000-k3j9x0a1b"))
            .times(1)
            .returning(|_, _| Ok(Some(checkpoint(true))));
        store
            .expect_insert_scan()
            .returning(|scan| Ok(Some(stored(scan))));

        let validator = ScanValidator::new(Arc::new(store));
        let result = validator
            .submit(5, request("CP-1700000000000-k3j9x0a1b", checkpoint(true).position()))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_inactive_checkpoint_is_not_resolved() {
        let mut store = MockScanStore::new();
        store
            .expect_find_checkpoint()
            .returning(|_, _| Ok(Some(checkpoint(false))));
        store.expect_insert_scan().never();

        let validator = ScanValidator::new(Arc::new(store));
        let err = validator
            .submit(5, request("4821", checkpoint(false).position()))
            .await
            .expect_err("inactive");
        assert!(matches!(err, AppError::CheckpointNotResolved));
    }

    #[tokio::test]
    async fn test_unknown_code_is_not_resolved() {
        let mut store = MockScanStore::new();
        store.expect_find_checkpoint().returning(|_, _| Ok(None));
        store.expect_insert_scan().never();

        let validator = ScanValidator::new(Arc::new(store));
        let err = validator
            .submit(5, request("9999", GeoPoint::new(0.0, 0.0)))
            .await
            .expect_err("unknown");
        assert!(matches!(err, AppError::CheckpointNotResolved));
    }

    #[tokio::test]
    async fn test_deactivated_during_scan() {
        let mut store = MockScanStore::new();
        store
            .expect_find_checkpoint()
            .returning(|_, _| Ok(Some(checkpoint(true))));
        store.expect_insert_scan().returning(|_| Ok(None));

        let validator = ScanValidator::new(Arc::new(store));
        let err = validator
            .submit(5, request("4821", checkpoint(true).position()))
            .await
            .expect_err("raced");
        assert!(matches!(err, AppError::CheckpointNotResolved));
    }

    #[tokio::test]
    async fn test_blank_note_is_dropped() {
        let mut store = MockScanStore::new();
        store
            .expect_find_checkpoint()
            .returning(|_, _| Ok(Some(checkpoint(true))));
        store
            .expect_insert_scan()
            .withf(|scan| scan.notes.is_none())
            .returning(|scan| Ok(Some(stored(scan))));

        let validator = ScanValidator::new(Arc::new(store));
        let mut req = request("4821", checkpoint(true).position());
        req.note = Some("   ".to_string());
        assert!(validator.submit(5, req).await.is_ok());
    }
}
