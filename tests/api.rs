use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use smart_transit::api::{AppState, router};
use smart_transit::fleet::{FleetStore, sample_fleet};
use smart_transit::payment::SimulatedGateway;
use smart_transit::store::{BookingStore, MemoryKv};

fn app() -> Router {
    let (buses, routes) = sample_fleet();
    router(AppState {
        fleet: Arc::new(FleetStore::new(buses, routes)),
        bookings: Arc::new(BookingStore::new(Arc::new(MemoryKv::new()))),
        gateway: Arc::new(SimulatedGateway::new(Duration::ZERO)),
    })
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn booking_payload(email: &str, seats: &[&str]) -> Value {
    json!({
        "passenger_name": "Asha Rao",
        "passenger_email": email,
        "passenger_phone": "+91 98765 43210",
        "bus_id": "BUS001",
        "route_number": "42A",
        "from_stop": "Majestic",
        "to_stop": "Indiranagar",
        "seats": seats,
        "total_amount": seats.len() * 25,
        "journey_date": "2026-08-14",
        "payment_method": "gpay",
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = get(&app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn booking_round_trip() {
    let app = app();

    let (status, body) = post(&app, "/bookings", booking_payload("asha@example.com", &["1A", "1B"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Booking confirmed successfully"));

    let booking_id = body["booking_id"].as_str().unwrap();
    assert!(booking_id.starts_with("BKG"));

    let (status, body) = get(&app, &format!("/bookings/{booking_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking"]["passenger_email"], json!("asha@example.com"));
    assert_eq!(body["booking"]["total_amount"], json!(50));
    assert_eq!(body["booking"]["payment_status"], json!("completed"));
    assert!(
        body["booking"]["transaction_id"]
            .as_str()
            .unwrap()
            .starts_with("TXN")
    );

    let (status, body) = get(&app, "/booked-seats/BUS001/2026-08-14").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seats"], json!(["1A", "1B"]));

    // Another day's occupancy is untouched.
    let (_, body) = get(&app, "/booked-seats/BUS001/2026-08-15").await;
    assert_eq!(body["seats"], json!([]));
}

#[tokio::test]
async fn client_settled_payment_keeps_its_transaction_id() {
    let app = app();
    let mut payload = booking_payload("asha@example.com", &["3C"]);
    payload["transaction_id"] = json!("TXN1754300000000abc");

    let (status, body) = post(&app, "/bookings", payload).await;
    assert_eq!(status, StatusCode::OK);

    let booking_id = body["booking_id"].as_str().unwrap();
    let (_, body) = get(&app, &format!("/bookings/{booking_id}")).await;
    assert_eq!(body["booking"]["transaction_id"], json!("TXN1754300000000abc"));
    assert_eq!(body["booking"]["upi_id"], Value::Null); // not part of the record
}

#[tokio::test]
async fn unknown_booking_is_a_404() {
    let (status, body) = get(&app(), "/bookings/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Booking not found" }));
}

#[tokio::test]
async fn user_bookings_arrive_in_creation_order() {
    let app = app();

    let (_, first) = post(&app, "/bookings", booking_payload("x@example.com", &["1A"])).await;
    let (_, _other) = post(&app, "/bookings", booking_payload("y@example.com", &["2B"])).await;
    let (_, second) = post(&app, "/bookings", booking_payload("x@example.com", &["3C"])).await;

    let (status, body) = get(&app, "/user-bookings/x@example.com").await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<_> = body["bookings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["booking_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, [
        first["booking_id"].as_str().unwrap(),
        second["booking_id"].as_str().unwrap()
    ]);

    let (_, body) = get(&app, "/user-bookings/nobody@example.com").await;
    assert_eq!(body["bookings"], json!([]));
}

#[tokio::test]
async fn invalid_booking_is_rejected_with_details() {
    let app = app();

    let (status, body) = post(&app, "/bookings", booking_payload("asha@example.com", &[])).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Failed to create booking"));
    assert_eq!(body["details"], json!("at least one seat must be selected"));

    let mut payload = booking_payload("asha@example.com", &["1A"]);
    payload["total_amount"] = json!(999);
    let (status, body) = post(&app, "/bookings", payload).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"], json!("total amount 999 does not match expected 25"));
}

#[tokio::test]
async fn upi_validation_blocks_the_booking() {
    let app = app();
    let mut payload = booking_payload("asha@example.com", &["1A"]);
    payload["payment_method"] = json!("other");

    let (status, body) = post(&app, "/bookings", payload).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"], json!("missing required field: upi_id"));
}

#[tokio::test]
async fn seat_map_marks_sold_seats() {
    let app = app();
    post(&app, "/bookings", booking_payload("asha@example.com", &["1A"])).await;

    let (status, body) = get(&app, "/seat-map/BUS001/2026-08-14").await;
    assert_eq!(status, StatusCode::OK);

    let seats = body["seats"].as_array().unwrap();
    assert_eq!(seats.len(), 40); // BUS001 capacity
    assert_eq!(seats[0]["seat_number"], json!("1A"));
    assert_eq!(seats[0]["status"], json!("booked"));
    assert_eq!(seats[0]["type"], json!("window"));
    assert_eq!(seats[1]["status"], json!("available"));

    let (status, _) = get(&app, "/seat-map/BUS999/2026-08-14").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn fleet_endpoints_serve_snapshot_and_status_updates() {
    let app = app();

    let (status, body) = get(&app, "/buses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["buses"].as_array().unwrap().len(), 5);

    let (status, body) = get(&app, "/routes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["routes"].as_array().unwrap().len(), 3);

    let (status, body) = post(&app, "/buses/BUS001/status", json!({ "status": "Stopped" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bus"]["status"], json!("Stopped"));

    let (status, body) = post(&app, "/buses/BUS999/status", json!({ "status": "Running" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Bus not found"));
}
