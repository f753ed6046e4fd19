//! Health and availability endpoint tests

use serde_json::Value;
use uuid::Uuid;

use crate::common::*;

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let app = TestApp::new().await;

    let response = app.get_without_tenant("/api/v1/health").await;
    response.assert_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn liveness_and_readiness_endpoints() {
    let app = TestApp::new().await;

    app.get_without_tenant("/api/v1/health/live")
        .await
        .assert_ok();
    app.get_without_tenant("/api/v1/health/ready")
        .await
        .assert_ok();
}

#[tokio::test]
async fn detailed_health_reports_database_component() {
    let app = TestApp::new().await;

    let response = app.get_without_tenant("/api/v1/health/detailed").await;
    response.assert_ok();

    let body: Value = response.json();
    assert_eq!(body["components"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn availability_requires_tenant_header() {
    let app = TestApp::new().await;

    let response = app
        .get_without_tenant(&format!(
            "/api/v1/availability?master_id={}&date=2026-09-07&duration_minutes=60",
            Uuid::new_v4()
        ))
        .await;
    response.assert_bad_request();
}

#[tokio::test]
async fn availability_unknown_tenant_not_found() {
    let app = TestApp::new().await;

    let response = app
        .get(
            &format!(
                "/api/v1/availability?master_id={}&date=2026-09-07&duration_minutes=60",
                Uuid::new_v4()
            ),
            Uuid::new_v4(),
        )
        .await;
    response.assert_not_found();
}

#[tokio::test]
async fn availability_unknown_master_not_found() {
    let app = TestApp::new().await;
    let tenant_id = seed_tenant(&app.state.db).await;

    let response = app
        .get(
            &format!(
                "/api/v1/availability?master_id={}&date=2026-09-07&duration_minutes=60",
                Uuid::new_v4()
            ),
            tenant_id,
        )
        .await;
    response.assert_not_found();
}

#[tokio::test]
async fn availability_without_duration_is_rejected() {
    let app = TestApp::new().await;
    let tenant_id = seed_tenant(&app.state.db).await;
    let master_id = seed_master(&app.state.db, tenant_id, "Anna").await;

    let response = app
        .get(
            &format!(
                "/api/v1/availability?master_id={}&date=2026-09-07",
                master_id
            ),
            tenant_id,
        )
        .await;
    response.assert_validation_error();
}

/// A 09:00-18:00 day with a 13:00-14:00 break on a 15-minute grid offers a
/// 60-minute service at 09:00 through 12:00 and 14:00 through 17:00.
#[tokio::test]
async fn full_day_slot_grid_with_break() {
    let app = TestApp::new().await;
    let tenant_id = seed_tenant(&app.state.db).await;
    let master_id = seed_master(&app.state.db, tenant_id, "Anna").await;
    seed_weekday_schedule(&app.state.db, tenant_id, master_id).await;

    let date = future_working_date();
    let response = app
        .get(
            &format!(
                "/api/v1/availability?master_id={}&date={}&duration_minutes=60",
                master_id, date
            ),
            tenant_id,
        )
        .await;
    response.assert_ok();

    let body: Value = response.json();
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 26);

    assert_eq!(slots[0]["start"], "09:00");
    assert_eq!(slots[0]["end"], "10:00");
    assert_eq!(slots[12]["start"], "12:00");
    assert_eq!(slots[13]["start"], "14:00");
    assert_eq!(slots[25]["start"], "17:00");
    assert_eq!(slots[25]["end"], "18:00");

    // Nothing may start inside or across the break
    for slot in slots {
        let start = slot["start"].as_str().unwrap();
        assert!(
            start <= "12:00" || start >= "14:00",
            "unexpected slot start {}",
            start
        );
    }
}

/// Repeated identical queries must return the same grid
#[tokio::test]
async fn availability_is_idempotent() {
    let app = TestApp::new().await;
    let tenant_id = seed_tenant(&app.state.db).await;
    let master_id = seed_master(&app.state.db, tenant_id, "Anna").await;
    seed_weekday_schedule(&app.state.db, tenant_id, master_id).await;

    let uri = format!(
        "/api/v1/availability?master_id={}&date={}&duration_minutes=60",
        master_id,
        future_working_date()
    );
    let first: Value = app.get(&uri, tenant_id).await.json();
    let second: Value = app.get(&uri, tenant_id).await.json();
    assert_eq!(first, second);
}

#[tokio::test]
async fn absence_suppresses_all_slots() {
    let app = TestApp::new().await;
    let tenant_id = seed_tenant(&app.state.db).await;
    let master_id = seed_master(&app.state.db, tenant_id, "Anna").await;
    seed_weekday_schedule(&app.state.db, tenant_id, master_id).await;

    let date = future_working_date();
    seed_absence(&app.state.db, tenant_id, master_id, date, date).await;

    let response = app
        .get(
            &format!(
                "/api/v1/availability?master_id={}&date={}&duration_minutes=60",
                master_id, date
            ),
            tenant_id,
        )
        .await;
    response.assert_ok();

    let body: Value = response.json();
    assert!(body["slots"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn day_without_schedule_is_empty() {
    let app = TestApp::new().await;
    let tenant_id = seed_tenant(&app.state.db).await;
    let master_id = seed_master(&app.state.db, tenant_id, "Anna").await;
    seed_weekday_schedule(&app.state.db, tenant_id, master_id).await;

    // Saturday has no weekly schedule entry
    let saturday = future_working_date() + chrono::Duration::days(5);
    let response = app
        .get(
            &format!(
                "/api/v1/availability?master_id={}&date={}&duration_minutes=60",
                master_id, saturday
            ),
            tenant_id,
        )
        .await;
    response.assert_ok();

    let body: Value = response.json();
    assert!(body["slots"].as_array().unwrap().is_empty());
}

/// Duration may come from a comma-separated service selection
#[tokio::test]
async fn service_selection_sums_durations() {
    let app = TestApp::new().await;
    let tenant_id = seed_tenant(&app.state.db).await;
    let master_id = seed_master(&app.state.db, tenant_id, "Anna").await;
    seed_weekday_schedule(&app.state.db, tenant_id, master_id).await;
    let haircut = seed_service(&app.state.db, tenant_id, "Haircut", 60, false).await;
    let styling = seed_service(&app.state.db, tenant_id, "Styling", 30, false).await;

    let response = app
        .get(
            &format!(
                "/api/v1/availability?master_id={}&date={}&service_ids={},{}",
                master_id,
                future_working_date(),
                haircut,
                styling
            ),
            tenant_id,
        )
        .await;
    response.assert_ok();

    let body: Value = response.json();
    let slots = body["slots"].as_array().unwrap();
    // 90 minutes: last morning start 11:30, last afternoon start 16:30
    assert_eq!(slots[0]["start"], "09:00");
    assert_eq!(slots[0]["end"], "10:30");
    assert_eq!(slots.last().unwrap()["start"], "16:30");
}

/// A selection naming a service this tenant does not have is 404, not a
/// server error
#[tokio::test]
async fn availability_with_unknown_service_is_not_found() {
    let app = TestApp::new().await;
    let tenant_id = seed_tenant(&app.state.db).await;
    let master_id = seed_master(&app.state.db, tenant_id, "Anna").await;
    seed_weekday_schedule(&app.state.db, tenant_id, master_id).await;

    app.get(
        &format!(
            "/api/v1/availability?master_id={}&date={}&service_ids={}",
            master_id,
            future_working_date(),
            uuid::Uuid::new_v4()
        ),
        tenant_id,
    )
    .await
    .assert_not_found();
}

#[tokio::test]
async fn booked_interval_disappears_from_slots() {
    let app = TestApp::new().await;
    let tenant_id = seed_tenant(&app.state.db).await;
    let master_id = seed_master(&app.state.db, tenant_id, "Anna").await;
    seed_weekday_schedule(&app.state.db, tenant_id, master_id).await;
    let haircut = seed_service(&app.state.db, tenant_id, "Haircut", 60, false).await;

    let date = future_working_date();
    app.post_json(
        "/api/v1/bookings",
        tenant_id,
        serde_json::json!({
            "master_id": master_id,
            "service_ids": [haircut],
            "date": date.to_string(),
            "start": "10:00",
            "client": { "name": "Mia" }
        }),
    )
    .await
    .assert_created();

    let body: Value = app
        .get(
            &format!(
                "/api/v1/availability?master_id={}&date={}&duration_minutes=60",
                master_id, date
            ),
            tenant_id,
        )
        .await
        .json();

    let occupied = body["occupied"].as_array().unwrap();
    assert_eq!(occupied.len(), 1);
    assert_eq!(occupied[0]["start"], "10:00");
    assert_eq!(occupied[0]["end"], "11:00");

    let starts: Vec<&str> = body["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start"].as_str().unwrap())
        .collect();
    // Any 60-minute slot overlapping 10:00-11:00 is gone
    for taken in ["09:15", "09:30", "09:45", "10:00", "10:15", "10:30", "10:45"] {
        assert!(!starts.contains(&taken), "slot {} should be gone", taken);
    }
    assert!(starts.contains(&"09:00"));
    assert!(starts.contains(&"11:00"));
}
