//! API integration tests
//!
//! Need a running server with a migrated database. Tokens are signed locally
//! with `JWT_SECRET`; staff members are created through `/users` with an
//! administrator token. The territory is a single shared row, so run with
//! `cargo test -- --ignored --test-threads=1`.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

use checkpost_server::{
    geo::{distance, GeoPoint},
    models::{enums::Role, user::UserClaims},
};

const BASE_URL: &str = "http://localhost:3000/api/v1";
const ADMIN_ID: i32 = 1;

fn token(user_id: i32, role: Role) -> String {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".to_string());
    let now = Utc::now();
    UserClaims {
        sub: format!("user-{}", user_id),
        user_id,
        role,
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    }
    .create_token(&secret)
    .expect("Failed to sign token")
}

/// Create a staff member with a unique email and return its ID
async fn create_staff(client: &Client, admin: &str, role: &str) -> i32 {
    let email = format!(
        "{}-{}@example.com",
        role,
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({ "email": email, "full_name": "Integration Staff", "role": role }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("id") as i32
}

async fn create_checkpoint(client: &Client, admin: &str, latitude: f64, longitude: f64) -> Value {
    let response = client
        .post(format!("{}/checkpoints", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({
            "name": "Integration gate",
            "latitude": latitude,
            "longitude": longitude,
            "radius_meters": 50.0,
            "checkpoint_type": "kpp"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_ready_pings_database() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_checkpoint_codes_are_generated() {
    let client = Client::new();
    let admin = token(ADMIN_ID, Role::Admin);

    let checkpoint = create_checkpoint(&client, &admin, 41.2995, 69.2401).await;
    let short_code = checkpoint["short_code"].as_str().expect("short code");
    assert_eq!(short_code.len(), 4);
    assert!(checkpoint["qr_code_data"]
        .as_str()
        .expect("qr payload")
        .starts_with("CP-"));

    let response = client
        .put(format!("{}/checkpoints/{}", BASE_URL, checkpoint["id"]))
        .bearer_auth(&admin)
        .json(&json!({ "is_active": false }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_scan_inside_and_outside_radius() {
    let client = Client::new();
    let admin = token(ADMIN_ID, Role::Admin);
    let patrol_id = create_staff(&client, &admin, "patrol").await;
    let patrol = token(patrol_id, Role::Patrol);

    let checkpoint = create_checkpoint(&client, &admin, 41.3100, 69.2800).await;
    let code = checkpoint["short_code"].as_str().expect("short code").to_string();

    let response = client
        .post(format!("{}/scans", BASE_URL))
        .bearer_auth(&patrol)
        .json(&json!({ "code": code, "latitude": 41.3100, "longitude": 69.2800 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_valid"], true);
    assert_eq!(body["scan"]["user_id"], patrol_id);

    // About 1.1 km north
    let response = client
        .post(format!("{}/scans", BASE_URL))
        .bearer_auth(&patrol)
        .json(&json!({ "code": code, "latitude": 41.3200, "longitude": 69.2800 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_valid"], false);
    assert!(body["message"].as_str().expect("message").starts_with("Too far"));

    let response = client
        .delete(format!("{}/checkpoints/{}", BASE_URL, checkpoint["id"]))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let response = client
        .get(format!("{}/users/{}/stats", BASE_URL, patrol_id))
        .bearer_auth(&patrol)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let stats: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(stats["total_scans"], 2);
    assert_eq!(stats["scans_last_30_days"], 2);
    assert!(stats["last_scan"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_unknown_code_is_not_found() {
    let client = Client::new();
    let patrol_id = create_staff(&client, &token(ADMIN_ID, Role::Admin), "patrol").await;
    let patrol = token(patrol_id, Role::Patrol);

    let response = client
        .post(format!("{}/scans", BASE_URL))
        .bearer_auth(&patrol)
        .json(&json!({ "code": "CP-0-doesnotex", "latitude": 0.0, "longitude": 0.0 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_patrol_history_is_scoped_to_caller() {
    let client = Client::new();
    let patrol_id = create_staff(&client, &token(ADMIN_ID, Role::Admin), "patrol").await;
    let patrol = token(patrol_id, Role::Patrol);

    let response = client
        .get(format!("{}/scans?user_id={}", BASE_URL, ADMIN_ID))
        .bearer_auth(&patrol)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    for scan in body.as_array().expect("array") {
        assert_eq!(scan["user_id"], patrol_id);
    }
}

#[tokio::test]
#[ignore]
async fn test_patrol_session_and_boundary_exit() {
    let client = Client::new();
    let admin = token(ADMIN_ID, Role::Admin);
    let patrol_id = create_staff(&client, &admin, "patrol").await;
    let patrol = token(patrol_id, Role::Patrol);

    let response = client
        .put(format!("{}/territory", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({ "polygon": [[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]] }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/patrols/session/start", BASE_URL))
        .bearer_auth(&patrol)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/patrols/track", BASE_URL))
        .bearer_auth(&patrol)
        .json(&json!({ "latitude": 5.0, "longitude": 5.0 }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["inside_territory"], true);
    assert!(body["boundary_event"].is_null());

    let response = client
        .post(format!("{}/patrols/track", BASE_URL))
        .bearer_auth(&patrol)
        .json(&json!({ "latitude": 15.0, "longitude": 15.0 }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["inside_territory"], false);
    assert_eq!(body["boundary_event"], "exited");
    assert!(body["session_distance_meters"].as_f64().expect("distance") > 0.0);

    let response = client
        .get(format!("{}/patrols/active?scope=outside", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body
        .as_array()
        .expect("array")
        .iter()
        .any(|p| p["id"] == patrol_id && p["inside_territory"] == false));

    let response = client
        .post(format!("{}/patrols/session/end", BASE_URL))
        .bearer_auth(&patrol)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .put(format!("{}/territory", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({ "polygon": [] }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_concurrent_samples_count_leg_once() {
    let client = Client::new();
    let admin = token(ADMIN_ID, Role::Admin);
    let patrol_id = create_staff(&client, &admin, "patrol").await;
    let patrol = token(patrol_id, Role::Patrol);

    let response = client
        .post(format!("{}/patrols/session/start", BASE_URL))
        .bearer_auth(&patrol)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let track = |latitude: f64, longitude: f64| {
        client
            .post(format!("{}/patrols/track", BASE_URL))
            .bearer_auth(&patrol)
            .json(&json!({ "latitude": latitude, "longitude": longitude }))
            .send()
    };

    let response = track(41.3000, 69.2400).await.expect("Failed to send request");
    assert!(response.status().is_success());

    let (first, second) = tokio::join!(track(41.3050, 69.2400), track(41.3050, 69.2400));
    assert!(first.expect("Failed to send request").status().is_success());
    assert!(second.expect("Failed to send request").status().is_success());

    let response = client
        .post(format!("{}/patrols/session/end", BASE_URL))
        .bearer_auth(&patrol)
        .send()
        .await
        .expect("Failed to send request");
    let session: Value = response.json().await.expect("Failed to parse response");

    let leg = distance(GeoPoint::new(41.3000, 69.2400), GeoPoint::new(41.3050, 69.2400));
    let total = session["total_distance_meters"].as_f64().expect("distance");
    assert!((total - leg).abs() < 0.01, "total {} leg {}", total, leg);
}

#[tokio::test]
#[ignore]
async fn test_territory_round_trip() {
    let client = Client::new();
    let admin = token(ADMIN_ID, Role::Admin);
    let polygon = json!([
        [41.2995, 69.2401],
        [41.3120, 69.2555],
        [41.3051, 69.2812],
        [41.2876, 69.2790],
        [41.2833, 69.2504]
    ]);

    let response = client
        .put(format!("{}/territory", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({ "polygon": polygon }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/territory", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["polygon"], polygon);

    let response = client
        .put(format!("{}/territory", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({ "polygon": [] }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_staff_lifecycle() {
    let client = Client::new();
    let admin = token(ADMIN_ID, Role::Admin);
    let kpp_id = create_staff(&client, &admin, "kpp").await;
    let kpp = token(kpp_id, Role::Kpp);

    let response = client
        .put(format!("{}/users/{}", BASE_URL, kpp_id))
        .bearer_auth(&kpp)
        .json(&json!({ "phone": "+998 90 555 00 11" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["phone"], "+998 90 555 00 11");

    let response = client
        .put(format!("{}/users/{}", BASE_URL, kpp_id))
        .bearer_auth(&kpp)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/users?role=kpp", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.as_array().expect("array").iter().any(|u| u["id"] == kpp_id));

    let response = client
        .delete(format!("{}/users/{}", BASE_URL, kpp_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/users/{}", BASE_URL, kpp_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_deleted_staff_token_is_rejected() {
    let client = Client::new();
    let admin = token(ADMIN_ID, Role::Admin);
    let checkpoint = create_checkpoint(&client, &admin, 41.3300, 69.3000).await;
    let patrol_id = create_staff(&client, &admin, "patrol").await;
    let patrol = token(patrol_id, Role::Patrol);

    let response = client
        .delete(format!("{}/users/{}", BASE_URL, patrol_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .post(format!("{}/scans", BASE_URL))
        .bearer_auth(&patrol)
        .json(&json!({
            "code": checkpoint["short_code"],
            "latitude": 41.3300,
            "longitude": 69.3000
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    let response = client
        .post(format!("{}/patrols/session/start", BASE_URL))
        .bearer_auth(&patrol)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_territory_rejects_two_vertices() {
    let client = Client::new();
    let admin = token(ADMIN_ID, Role::Admin);

    let response = client
        .put(format!("{}/territory", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({ "polygon": [[0.0, 0.0], [1.0, 1.0]] }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/checkpoints", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
