//! Concurrent booking tests
//!
//! Two simultaneous requests for overlapping intervals must never both
//! commit; the per-master lock serializes the check-then-write section.

use axum::http::StatusCode;
use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::*;

async fn seed_salon(app: &TestApp) -> (Uuid, Uuid, Uuid) {
    let tenant_id = seed_tenant(&app.state.db).await;
    let master_id = seed_master(&app.state.db, tenant_id, "Anna").await;
    seed_weekday_schedule(&app.state.db, tenant_id, master_id).await;
    let service_id = seed_service(&app.state.db, tenant_id, "Haircut", 60, false).await;
    (tenant_id, master_id, service_id)
}

fn payload(master_id: Uuid, service_id: Uuid, date: NaiveDate, start: &str, client: &str) -> Value {
    json!({
        "master_id": master_id,
        "service_ids": [service_id],
        "date": date.to_string(),
        "start": start,
        "client": { "name": client }
    })
}

#[tokio::test]
async fn concurrent_requests_for_same_slot_commit_exactly_one() {
    let app = TestApp::new().await;
    let (tenant_id, master_id, service_id) = seed_salon(&app).await;
    let date = future_working_date();

    let (first, second) = tokio::join!(
        app.post_json(
            "/api/v1/bookings",
            tenant_id,
            payload(master_id, service_id, date, "10:00", "Mia"),
        ),
        app.post_json(
            "/api/v1/bookings",
            tenant_id,
            payload(master_id, service_id, date, "10:00", "Lea"),
        ),
    );

    let mut statuses = vec![first.status, second.status];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);

    let start_at = winner(&first, &second)["start_at"]
        .as_str()
        .unwrap()
        .to_string();
    let end_at = winner(&first, &second)["end_at"]
        .as_str()
        .unwrap()
        .to_string();
    let committed =
        overlapping_booking_count(&app.state.db, master_id, &start_at, &end_at).await;
    assert_eq!(committed, 1);
}

#[tokio::test]
async fn concurrent_requests_for_overlapping_slots_commit_exactly_one() {
    let app = TestApp::new().await;
    let (tenant_id, master_id, service_id) = seed_salon(&app).await;
    let date = future_working_date();

    // 10:00-11:00 and 10:30-11:30 overlap without being identical
    let (first, second) = tokio::join!(
        app.post_json(
            "/api/v1/bookings",
            tenant_id,
            payload(master_id, service_id, date, "10:00", "Mia"),
        ),
        app.post_json(
            "/api/v1/bookings",
            tenant_id,
            payload(master_id, service_id, date, "10:30", "Lea"),
        ),
    );

    let mut statuses = vec![first.status, second.status];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn concurrent_requests_for_different_masters_both_commit() {
    let app = TestApp::new().await;
    let (tenant_id, master_a, service_id) = seed_salon(&app).await;
    let master_b = seed_master(&app.state.db, tenant_id, "Boris").await;
    seed_weekday_schedule(&app.state.db, tenant_id, master_b).await;
    let date = future_working_date();

    let (first, second) = tokio::join!(
        app.post_json(
            "/api/v1/bookings",
            tenant_id,
            payload(master_a, service_id, date, "10:00", "Mia"),
        ),
        app.post_json(
            "/api/v1/bookings",
            tenant_id,
            payload(master_b, service_id, date, "10:00", "Lea"),
        ),
    );

    first.assert_created();
    second.assert_created();
}

/// Many sequential attempts at the same slot: the first wins, the rest see 409
#[tokio::test]
async fn repeated_attempts_never_double_book() {
    let app = TestApp::new().await;
    let (tenant_id, master_id, service_id) = seed_salon(&app).await;
    let date = future_working_date();

    let mut created = 0;
    let mut conflicted = 0;
    for i in 0..5 {
        let response = app
            .post_json(
                "/api/v1/bookings",
                tenant_id,
                payload(master_id, service_id, date, "10:00", &format!("Client {}", i)),
            )
            .await;
        match response.status {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicted += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicted, 4);
}

/// Edits re-validate the window through pool reads before they open their
/// transaction. Saturating the pool with simultaneous edits must therefore
/// make progress instead of deadlocking on connection acquisition.
#[tokio::test]
async fn concurrent_edits_saturating_the_pool_all_complete() {
    let app = TestApp::new().await;
    let tenant_id = seed_tenant(&app.state.db).await;
    let service_id = seed_service(&app.state.db, tenant_id, "Haircut", 60, false).await;
    let date = future_working_date();

    // One booking per master, as many as the pool has connections
    let mut booking_ids = Vec::new();
    for i in 0..5 {
        let master_id = seed_master(&app.state.db, tenant_id, &format!("Master {}", i)).await;
        seed_weekday_schedule(&app.state.db, tenant_id, master_id).await;
        let created: Value = app
            .post_json(
                "/api/v1/bookings",
                tenant_id,
                payload(master_id, service_id, date, "10:00", &format!("Client {}", i)),
            )
            .await
            .json();
        booking_ids.push(created["id"].as_str().unwrap().to_string());
    }

    let app = &app;
    let edits = booking_ids.iter().map(|id| {
        let uri = format!("/api/v1/bookings/{}", id);
        async move {
            app.put_json(
                &uri,
                tenant_id,
                json!({ "date": date.to_string(), "start": "15:00" }),
            )
            .await
        }
    });
    let responses = futures::future::join_all(edits).await;

    for response in responses {
        response.assert_ok();
    }
}

fn winner<'a>(first: &'a TestResponse, second: &'a TestResponse) -> Value {
    let response = if first.status == StatusCode::CREATED {
        first
    } else {
        second
    };
    response.json()
}
