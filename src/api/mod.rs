use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};

use crate::booking::{JourneyDetails, Passenger, build_booking, seat_map};
use crate::fleet::{BusStatus, FleetStore};
use crate::payment::{PaymentDetails, PaymentGateway, PaymentRequest, UpiProvider};
use crate::store::{BookingStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub fleet: Arc<FleetStore>,
    pub bookings: Arc<BookingStore>,
    pub gateway: Arc<dyn PaymentGateway>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Booking not found")]
    BookingNotFound,

    #[error("Bus not found")]
    BusNotFound,

    #[error("Failed to create booking")]
    CreateBooking(String),

    #[error("Failed to read booking store")]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, body) = match &self {
            ApiError::BookingNotFound | ApiError::BusNotFound => (
                StatusCode::NOT_FOUND,
                json!({ "success": false, "error": self.to_string() }),
            ),
            ApiError::CreateBooking(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": self.to_string(), "details": details }),
            ),
            ApiError::Store(source) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "error": self.to_string(), "details": source.to_string() }),
            ),
        };
        (code, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/bookings", post(create_booking))
        .route("/bookings/{booking_id}", get(get_booking))
        .route("/user-bookings/{email}", get(user_bookings))
        .route("/booked-seats/{bus_id}/{date}", get(booked_seats))
        .route("/seat-map/{bus_id}/{date}", get(seat_map_for_bus))
        .route("/buses", get(list_buses))
        .route("/buses/{bus_id}/status", post(update_bus_status))
        .route("/routes", get(list_routes))
        .layer(cors())
        .with_state(state)
}

/// Open CORS: the passenger UI is served from wherever.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(600))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Booking payload as the client assembles it over the booking flow. A
/// payload carrying a transaction id already settled its (simulated) payment
/// client-side; one without is settled here through the gateway seam.
#[derive(Debug, Deserialize)]
pub struct BookingPayload {
    pub passenger_name: String,
    pub passenger_email: String,
    pub passenger_phone: String,
    pub bus_id: String,
    pub route_number: String,
    pub from_stop: String,
    pub to_stop: String,
    pub seats: Vec<String>,
    pub total_amount: u32,
    pub journey_date: NaiveDate,
    pub payment_method: UpiProvider,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<BookingPayload>,
) -> Result<Json<Value>, ApiError> {
    let passenger = Passenger {
        name: payload.passenger_name,
        email: payload.passenger_email,
        phone: payload.passenger_phone,
    };
    let journey = JourneyDetails {
        bus_id: payload.bus_id,
        route_number: payload.route_number,
        from_stop: payload.from_stop,
        to_stop: payload.to_stop,
        journey_date: payload.journey_date,
    };

    let payment = match payload.transaction_id {
        Some(transaction_id) => PaymentDetails {
            amount: payload.total_amount,
            upi_id: payload
                .upi_id
                .unwrap_or_else(|| format!("{}@user", payload.payment_method)),
            provider: payload.payment_method,
            transaction_id,
        },
        None => state
            .gateway
            .process(PaymentRequest {
                amount: payload.total_amount,
                provider: payload.payment_method,
                upi_id: payload.upi_id,
            })
            .await
            .map_err(|e| ApiError::CreateBooking(e.to_string()))?,
    };

    let booking = build_booking(&passenger, &journey, &payload.seats, &payment)
        .map_err(|e| ApiError::CreateBooking(e.to_string()))?;
    state
        .bookings
        .create(&booking)
        .await
        .map_err(|e| ApiError::CreateBooking(e.to_string()))?;

    tracing::info!(
        booking_id = %booking.booking_id,
        bus_id = %booking.bus_id,
        seats = booking.seats.len(),
        "booking confirmed"
    );

    Ok(Json(json!({
        "success": true,
        "booking_id": booking.booking_id,
        "message": "Booking confirmed successfully",
    })))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let booking = state
        .bookings
        .get(&booking_id)
        .await?
        .ok_or(ApiError::BookingNotFound)?;
    Ok(Json(json!({ "success": true, "booking": booking })))
}

async fn user_bookings(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let bookings = state.bookings.bookings_for_user(&email).await?;
    Ok(Json(json!({ "success": true, "bookings": bookings })))
}

async fn booked_seats(
    State(state): State<AppState>,
    Path((bus_id, date)): Path<(String, NaiveDate)>,
) -> Result<Json<Value>, ApiError> {
    let seats = state.bookings.booked_seats(&bus_id, date).await?;
    Ok(Json(json!({ "success": true, "seats": seats })))
}

/// Seat grid for one bus and date, with that date's sold seats marked.
async fn seat_map_for_bus(
    State(state): State<AppState>,
    Path((bus_id, date)): Path<(String, NaiveDate)>,
) -> Result<Json<Value>, ApiError> {
    let bus = state.fleet.bus(&bus_id).await.ok_or(ApiError::BusNotFound)?;
    let booked = state
        .bookings
        .booked_seats(&bus_id, date)
        .await?
        .into_iter()
        .collect();

    let seats = seat_map::generate_seat_map(bus.capacity, &booked, &Default::default());
    Ok(Json(json!({ "success": true, "seats": seats })))
}

async fn list_buses(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "success": true, "buses": state.fleet.snapshot().await }))
}

async fn list_routes(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "success": true, "routes": state.fleet.routes() }))
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: BusStatus,
}

/// Driver portal action: operational status is the only field a driver may
/// change.
async fn update_bus_status(
    State(state): State<AppState>,
    Path(bus_id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Value>, ApiError> {
    let bus = state
        .fleet
        .set_status(&bus_id, update.status)
        .await
        .ok_or(ApiError::BusNotFound)?;

    tracing::info!(bus_id = %bus.bus_id, status = ?bus.status, "driver status update");
    Ok(Json(json!({ "success": true, "bus": bus })))
}
