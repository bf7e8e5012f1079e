use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ValidationError, require};
use crate::payment::UpiProvider;

pub mod builder;
pub mod flow;
pub mod seat_map;

pub use builder::build_booking;
pub use flow::{BookingFlow, BookingStage, FlowError};

/// Flat fare per seat, in rupees.
pub const TICKET_PRICE: u32 = 25;

/// Most seats a single booking may hold.
pub const MAX_SEATS_PER_BOOKING: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// A confirmed ticket purchase. Immutable once persisted; there is no
/// cancellation or modification path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: String,
    pub passenger_name: String,
    pub passenger_email: String,
    pub passenger_phone: String,
    pub bus_id: String,
    pub route_number: String,
    pub from_stop: String,
    pub to_stop: String,
    pub seats: Vec<String>,
    pub total_amount: u32,
    pub booking_date: DateTime<Utc>,
    pub journey_date: NaiveDate,
    pub payment_status: PaymentStatus,
    pub payment_method: UpiProvider,
    pub transaction_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Passenger {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("passenger_name", &self.name)?;
        require("passenger_email", &self.email)?;
        require("passenger_phone", &self.phone)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyDetails {
    pub bus_id: String,
    pub route_number: String,
    pub from_stop: String,
    pub to_stop: String,
    pub journey_date: NaiveDate,
}

impl JourneyDetails {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("from_stop", &self.from_stop)?;
        require("to_stop", &self.to_stop)
    }
}

/// Time-derived id with a random suffix so simultaneous bookings cannot
/// collide on the wall clock alone.
pub fn new_booking_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("BKG{}{}", Utc::now().timestamp_millis(), &suffix[..6])
}
