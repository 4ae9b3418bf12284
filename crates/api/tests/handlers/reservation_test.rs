use axum::http::StatusCode;
use chrono::NaiveDate;
use eyre::eyre;
use fake::{Fake, Faker};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;
use waqitly_db::mock::{MockBookingRepo, MockReservationRepo};

use crate::test_utils::{mocked_server, reservation_body, TestContext};

#[test_log::test(tokio::test)]
async fn test_create_reservation_returns_created_envelope() {
    let ctx = TestContext::new();
    let space: Uuid = Faker.fake();

    let response = ctx
        .server
        .post("/api/reservations")
        .json(&reservation_body(space, "2031-06-03", "09:00:00", "10:00:00"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Reservation created successfully"));
    assert_eq!(body["data"]["status"], json!("pending"));
    assert_eq!(body["data"]["space_id"], json!(space));
    assert_eq!(body["data"]["start_time"], json!("09:00:00"));
    assert_eq!(body["data"]["cancelled_at"], Value::Null);
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_get_reservation_round_trips_through_http() {
    let ctx = TestContext::new();
    let created: Value = ctx
        .server
        .post("/api/reservations")
        .json(&reservation_body(Faker.fake(), "2031-06-03", "09:00:00", "10:00:00"))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap();

    let response = ctx.server.get(&format!("/api/reservations/{}", id)).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"], created["data"]);
    assert_eq!(body["message"], json!("Reservation retrieved successfully"));
}

#[tokio::test]
async fn test_unknown_or_malformed_id_is_not_found() {
    let ctx = TestContext::new();

    for path in [
        format!("/api/reservations/{}", Uuid::new_v4()),
        "/api/reservations/not-a-uuid".to_string(),
    ] {
        let response = ctx.server.get(&path).await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Reservation not found"));
    }
}

#[tokio::test]
async fn test_overlapping_and_touching_requests_are_rejected() {
    let ctx = TestContext::new();
    let space: Uuid = Faker.fake();

    ctx.server
        .post("/api/reservations")
        .json(&reservation_body(space, "2031-06-03", "09:00:00", "10:00:00"))
        .await
        .assert_status(StatusCode::CREATED);

    for (start, end) in [
        ("09:30:00", "10:30:00"),
        ("10:00:00", "11:00:00"),
        ("08:00:00", "09:00:00"),
    ] {
        let response = ctx
            .server
            .post("/api/reservations")
            .json(&reservation_body(space, "2031-06-03", start, end))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(
            body["message"],
            json!("Space is not available at the requested time")
        );
    }

    // A one-minute gap is free.
    ctx.server
        .post("/api/reservations")
        .json(&reservation_body(space, "2031-06-03", "10:01:00", "11:00:00"))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_invalid_body_lists_field_errors() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/reservations")
        .json(&json!({
            "space_id": "nope",
            "date": "2031-06-03",
            "start_time": "10:00:00",
            "end_time": "09:00:00",
            "total_price": 100
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Validation failed"));
    assert_eq!(
        body["errors"]["user_id"],
        json!(["The user_id field is required."])
    );
    assert!(body["errors"]["space_id"].is_array());
    assert_eq!(
        body["errors"]["end_time"],
        json!(["The end_time field must be a time after start_time."])
    );
}

#[tokio::test]
async fn test_malformed_json_is_a_body_error() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/reservations")
        .text("{\"user_id\": ")
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["errors"]["body"].is_array());
}

#[tokio::test]
async fn test_list_filters_and_orders_newest_first() {
    let ctx = TestContext::new();
    let space: Uuid = Faker.fake();

    for (date, start, end) in [
        ("2031-06-03", "09:00:00", "10:00:00"),
        ("2031-06-05", "09:00:00", "10:00:00"),
        ("2031-06-03", "14:00:00", "15:00:00"),
    ] {
        ctx.server
            .post("/api/reservations")
            .json(&reservation_body(space, date, start, end))
            .await
            .assert_status(StatusCode::CREATED);
    }
    ctx.server
        .post("/api/reservations")
        .json(&reservation_body(Faker.fake(), "2031-06-04", "09:00:00", "10:00:00"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = ctx
        .server
        .get("/api/reservations")
        .add_query_param("space_id", space)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let slots: Vec<(String, String)> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["date"].as_str().unwrap().to_string(),
                r["start_time"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        slots,
        vec![
            ("2031-06-05".to_string(), "09:00:00".to_string()),
            ("2031-06-03".to_string(), "14:00:00".to_string()),
            ("2031-06-03".to_string(), "09:00:00".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_unparseable_query_is_a_query_error() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get("/api/reservations")
        .add_query_param("status", "archived")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["errors"]["query"].is_array());
}

#[tokio::test]
async fn test_status_walk_and_cancel_endpoint() {
    let ctx = TestContext::new();
    let created: Value = ctx
        .server
        .post("/api/reservations")
        .json(&reservation_body(Faker.fake(), "2031-06-03", "09:00:00", "10:00:00"))
        .await
        .json();
    let path = format!("/api/reservations/{}", created["data"]["id"].as_str().unwrap());

    let confirmed = ctx
        .server
        .patch(&path)
        .json(&json!({ "status": "confirmed" }))
        .await;
    assert_eq!(confirmed.status_code(), StatusCode::OK);
    assert_eq!(confirmed.json::<Value>()["data"]["status"], json!("confirmed"));

    let cancelled = ctx.server.patch(&format!("{}/cancel", path)).await;
    assert_eq!(cancelled.status_code(), StatusCode::OK);
    let body: Value = cancelled.json();
    assert_eq!(body["data"]["status"], json!("cancelled"));
    assert!(body["data"]["cancelled_at"].is_string());
    assert_eq!(body["message"], json!("Reservation cancelled successfully"));

    let again = ctx.server.patch(&format!("{}/cancel", path)).await;
    assert_eq!(again.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        again.json::<Value>()["message"],
        json!("Reservation is already cancelled")
    );
}

#[tokio::test]
async fn test_completed_and_rejected_reservations_cannot_be_cancelled() {
    let ctx = TestContext::new();

    let done: Value = ctx
        .server
        .post("/api/reservations")
        .json(&reservation_body(Faker.fake(), "2031-06-03", "09:00:00", "10:00:00"))
        .await
        .json();
    let done_path = format!("/api/reservations/{}", done["data"]["id"].as_str().unwrap());
    for status in ["confirmed", "done"] {
        ctx.server
            .patch(&done_path)
            .json(&json!({ "status": status }))
            .await
            .assert_status_ok();
    }

    let response = ctx.server.patch(&format!("{}/cancel", done_path)).await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["message"],
        json!("Cannot cancel completed reservation")
    );

    let rejected: Value = ctx
        .server
        .post("/api/reservations")
        .json(&reservation_body(Faker.fake(), "2031-06-03", "09:00:00", "10:00:00"))
        .await
        .json();
    let rejected_path = format!("/api/reservations/{}", rejected["data"]["id"].as_str().unwrap());
    ctx.server
        .patch(&rejected_path)
        .json(&json!({ "status": "rejected" }))
        .await
        .assert_status_ok();

    let response = ctx.server.patch(&format!("{}/cancel", rejected_path)).await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["message"],
        json!("Cannot change reservation status from rejected to cancelled")
    );
}

#[tokio::test]
async fn test_cancelled_slot_can_be_taken_again() {
    let ctx = TestContext::new();
    let space: Uuid = Faker.fake();
    let first: Value = ctx
        .server
        .post("/api/reservations")
        .json(&reservation_body(space, "2031-06-03", "09:00:00", "10:00:00"))
        .await
        .json();

    ctx.server
        .patch(&format!(
            "/api/reservations/{}/cancel",
            first["data"]["id"].as_str().unwrap()
        ))
        .await
        .assert_status_ok();

    ctx.server
        .post("/api/reservations")
        .json(&reservation_body(space, "2031-06-03", "09:00:00", "10:00:00"))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_past_reservation_is_frozen() {
    let ctx = TestContext::new();
    let earlier = NaiveDate::from_ymd_opt(2031, 5, 20).unwrap();
    let past = ctx
        .seed_reservation(
            earlier,
            reservation_body(Faker.fake(), "2031-05-25", "09:00:00", "10:00:00"),
        )
        .await;
    let path = format!("/api/reservations/{}", past.id);

    let update = ctx
        .server
        .patch(&path)
        .json(&json!({ "total_price": 1 }))
        .await;
    assert_eq!(update.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        update.json::<Value>()["message"],
        json!("Cannot modify past reservations")
    );

    ctx.server
        .patch(&format!("{}/cancel", path))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    ctx.server
        .delete(&path)
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // Reading the past is still allowed.
    ctx.server.get(&path).await.assert_status_ok();
}

#[tokio::test]
async fn test_delete_reservation() {
    let ctx = TestContext::new();
    let created: Value = ctx
        .server
        .post("/api/reservations")
        .json(&reservation_body(Faker.fake(), "2031-06-03", "09:00:00", "10:00:00"))
        .await
        .json();
    let path = format!("/api/reservations/{}", created["data"]["id"].as_str().unwrap());

    let response = ctx.server.delete(&path).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], json!("Reservation deleted successfully"));
    assert!(body.get("data").is_none());
    ctx.server
        .get(&path)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_repository_failure_is_internal_error() {
    let mut reservations = MockReservationRepo::new();
    reservations
        .expect_find_by_id()
        .returning(|_| Err(eyre!("connection reset by peer")));
    let server = mocked_server(reservations, MockBookingRepo::new());

    let response = server
        .get(&format!("/api/reservations/{}", Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("Internal server error"));
    assert!(!response.text().contains("connection reset"));
}

#[tokio::test]
async fn test_patch_on_cancelled_reservation_is_refused() {
    let ctx = TestContext::new();
    let created: Value = ctx
        .server
        .post("/api/reservations")
        .json(&reservation_body(Faker.fake(), "2031-06-03", "09:00:00", "10:00:00"))
        .await
        .json();
    let path = format!("/api/reservations/{}", created["data"]["id"].as_str().unwrap());
    ctx.server
        .patch(&format!("{}/cancel", path))
        .await
        .assert_status_ok();

    let recancel = ctx
        .server
        .patch(&path)
        .json(&json!({ "status": "cancelled" }))
        .await;
    assert_eq!(recancel.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        recancel.json::<Value>()["message"],
        json!("Reservation is already cancelled")
    );

    let moved = ctx
        .server
        .patch(&path)
        .json(&json!({ "start_time": "15:00:00", "end_time": "16:00:00" }))
        .await;
    assert_eq!(moved.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        moved.json::<Value>()["message"],
        json!("Cannot modify cancelled reservation")
    );
}
