use axum::http::StatusCode;
use chrono::NaiveDate;
use eyre::eyre;
use fake::{Fake, Faker};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;
use waqitly_db::mock::{MockBookingRepo, MockReservationRepo};

use crate::test_utils::{booking_body, mocked_server, reservation_body, TestContext};

#[test_log::test(tokio::test)]
async fn test_create_booking_with_line_items() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/bookings")
        .json(&booking_body(Faker.fake(), "2031-06-02", "14:00:00", "16:00:00"))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["message"], json!("Booking created successfully"));
    let services = body["data"]["services"].as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["booking_id"], body["data"]["id"]);
    assert_eq!(services[0]["quantity"], json!(2));
}

#[tokio::test]
async fn test_overlapping_booking_is_rejected() {
    let ctx = TestContext::new();
    let space: Uuid = Faker.fake();

    ctx.server
        .post("/api/bookings")
        .json(&booking_body(space, "2031-06-02", "14:00:00", "16:00:00"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = ctx
        .server
        .post("/api/bookings")
        .json(&booking_body(space, "2031-06-02", "16:00:00", "17:00:00"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["message"],
        json!("Space is not available at the requested time")
    );
}

#[tokio::test]
async fn test_bookings_and_reservations_do_not_block_each_other() {
    let ctx = TestContext::new();
    let space: Uuid = Faker.fake();

    ctx.server
        .post("/api/reservations")
        .json(&reservation_body(space, "2031-06-02", "14:00:00", "16:00:00"))
        .await
        .assert_status(StatusCode::CREATED);

    ctx.server
        .post("/api/bookings")
        .json(&booking_body(space, "2031-06-02", "14:00:00", "16:00:00"))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_invalid_line_items_are_reported_by_path() {
    let ctx = TestContext::new();
    let repeated: Uuid = Faker.fake();
    let mut body = booking_body(Faker.fake(), "2031-06-02", "14:00:00", "16:00:00");
    body["services"] = json!([
        { "space_service_id": repeated, "quantity": 0, "price": 100 },
        { "space_service_id": repeated, "quantity": 1, "price": 100 }
    ]);

    let response = ctx.server.post("/api/bookings").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(
        body["errors"]["services.0.quantity"],
        json!(["The quantity field must be at least 1."])
    );
    assert!(body["errors"]["services.1.space_service_id"].is_array());
}

#[tokio::test]
async fn test_update_booking_moves_within_free_time() {
    let ctx = TestContext::new();
    let space: Uuid = Faker.fake();
    let created: Value = ctx
        .server
        .post("/api/bookings")
        .json(&booking_body(space, "2031-06-02", "14:00:00", "16:00:00"))
        .await
        .json();
    ctx.server
        .post("/api/bookings")
        .json(&booking_body(space, "2031-06-02", "18:00:00", "19:00:00"))
        .await
        .assert_status(StatusCode::CREATED);
    let path = format!("/api/bookings/{}", created["data"]["id"].as_str().unwrap());

    // Overlapping only itself is fine.
    let moved = ctx
        .server
        .patch(&path)
        .json(&json!({ "start_time": "15:00:00", "end_time": "17:00:00" }))
        .await;
    assert_eq!(moved.status_code(), StatusCode::OK);
    assert_eq!(moved.json::<Value>()["data"]["end_time"], json!("17:00:00"));

    let clash = ctx
        .server
        .patch(&path)
        .json(&json!({ "end_time": "18:30:00" }))
        .await;
    assert_eq!(clash.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let inverted = ctx
        .server
        .patch(&path)
        .json(&json!({ "end_time": "14:00:00" }))
        .await;
    assert_eq!(inverted.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        inverted.json::<Value>()["message"],
        json!("Invalid interval: start 15:00:00 must be before end 14:00:00")
    );
}

#[tokio::test]
async fn test_past_booking_is_frozen() {
    let ctx = TestContext::new();
    let past = ctx
        .seed_booking(
            NaiveDate::from_ymd_opt(2031, 5, 1).unwrap(),
            booking_body(Faker.fake(), "2031-05-10", "09:00:00", "10:00:00"),
        )
        .await;
    let path = format!("/api/bookings/{}", past.id);

    let update = ctx
        .server
        .patch(&path)
        .json(&json!({ "total_price": 5 }))
        .await;
    assert_eq!(update.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        update.json::<Value>()["message"],
        json!("Cannot modify past bookings")
    );

    ctx.server
        .delete(&path)
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_and_delete_bookings() {
    let ctx = TestContext::new();
    let user: Uuid = Faker.fake();
    let mut mine = booking_body(Faker.fake(), "2031-06-02", "09:00:00", "10:00:00");
    mine["user_id"] = json!(user);
    let created: Value = ctx.server.post("/api/bookings").json(&mine).await.json();
    ctx.server
        .post("/api/bookings")
        .json(&booking_body(Faker.fake(), "2031-06-02", "09:00:00", "10:00:00"))
        .await
        .assert_status(StatusCode::CREATED);

    let listed: Value = ctx
        .server
        .get("/api/bookings")
        .add_query_param("user_id", user)
        .await
        .json();
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["data"][0]["id"], created["data"]["id"]);

    let path = format!("/api/bookings/{}", created["data"]["id"].as_str().unwrap());
    let deleted = ctx.server.delete(&path).await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    assert_eq!(
        deleted.json::<Value>()["message"],
        json!("Booking deleted successfully")
    );

    let missing = ctx.server.get(&path).await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(missing.json::<Value>()["message"], json!("Booking not found"));
}

#[tokio::test]
async fn test_booking_list_failure_is_internal_error() {
    let mut bookings = MockBookingRepo::new();
    bookings
        .expect_list()
        .returning(|_| Err(eyre!("pool timed out")));
    let server = mocked_server(MockReservationRepo::new(), bookings);

    let response = server.get("/api/bookings").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>()["message"],
        json!("Internal server error")
    );
}
