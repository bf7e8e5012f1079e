use chrono::Utc;

use crate::booking::{
    Booking, JourneyDetails, MAX_SEATS_PER_BOOKING, Passenger, PaymentStatus, TICKET_PRICE,
    new_booking_id,
};
use crate::error::ValidationError;
use crate::payment::PaymentDetails;

/// Assembles a persisted booking record from the data collected over the
/// booking flow. The paid amount must match the seat count exactly; any blank
/// required field rejects the whole record.
pub fn build_booking(
    passenger: &Passenger,
    journey: &JourneyDetails,
    seats: &[String],
    payment: &PaymentDetails,
) -> Result<Booking, ValidationError> {
    passenger.validate()?;
    journey.validate()?;

    if seats.is_empty() {
        return Err(ValidationError::NoSeats);
    }
    if seats.len() > MAX_SEATS_PER_BOOKING {
        return Err(ValidationError::TooManySeats {
            selected: seats.len(),
            limit: MAX_SEATS_PER_BOOKING,
        });
    }

    let expected = seats.len() as u32 * TICKET_PRICE;
    if payment.amount != expected {
        return Err(ValidationError::AmountMismatch {
            expected,
            actual: payment.amount,
        });
    }

    Ok(Booking {
        booking_id: new_booking_id(),
        passenger_name: passenger.name.clone(),
        passenger_email: passenger.email.clone(),
        passenger_phone: passenger.phone.clone(),
        bus_id: journey.bus_id.clone(),
        route_number: journey.route_number.clone(),
        from_stop: journey.from_stop.clone(),
        to_stop: journey.to_stop.clone(),
        seats: seats.to_vec(),
        total_amount: expected,
        booking_date: Utc::now(),
        journey_date: journey.journey_date,
        payment_status: PaymentStatus::Completed,
        payment_method: payment.provider,
        transaction_id: payment.transaction_id.clone(),
    })
}
