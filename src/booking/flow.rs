use std::collections::HashSet;

use thiserror::Error;

use crate::booking::seat_map::toggle_seat;
use crate::booking::{
    Booking, JourneyDetails, MAX_SEATS_PER_BOOKING, Passenger, builder::build_booking,
};
use crate::error::ValidationError;
use crate::payment::PaymentDetails;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingStage {
    Details,
    Seats,
    Payment,
    Confirmation,
}

#[derive(Debug, Error, PartialEq)]
pub enum FlowError {
    #[error("step not allowed in the {0:?} stage")]
    WrongStage(BookingStage),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// One passenger's progress through Details -> Seats -> Payment ->
/// Confirmation. The only backward edges are Seats -> Details and a payment
/// cancel back to Seats; a confirmed flow accepts nothing further. Dropping
/// the value abandons the booking with nothing persisted.
pub struct BookingFlow {
    stage: BookingStage,
    passenger: Option<Passenger>,
    journey: Option<JourneyDetails>,
    selected: Vec<String>,
}

impl BookingFlow {
    pub fn new() -> Self {
        Self {
            stage: BookingStage::Details,
            passenger: None,
            journey: None,
            selected: Vec::new(),
        }
    }

    pub fn stage(&self) -> BookingStage {
        self.stage
    }

    pub fn selected_seats(&self) -> &[String] {
        &self.selected
    }

    pub fn total_amount(&self) -> u32 {
        self.selected.len() as u32 * super::TICKET_PRICE
    }

    pub fn submit_details(
        &mut self,
        passenger: Passenger,
        journey: JourneyDetails,
    ) -> Result<(), FlowError> {
        if self.stage != BookingStage::Details {
            return Err(FlowError::WrongStage(self.stage));
        }
        passenger.validate()?;
        journey.validate()?;

        self.passenger = Some(passenger);
        self.journey = Some(journey);
        self.stage = BookingStage::Seats;
        Ok(())
    }

    /// Seats -> Details. Entered details and any seat selection are kept.
    pub fn back_to_details(&mut self) -> Result<(), FlowError> {
        if self.stage != BookingStage::Seats {
            return Err(FlowError::WrongStage(self.stage));
        }
        self.stage = BookingStage::Details;
        Ok(())
    }

    pub fn toggle_seat(
        &mut self,
        seat_number: &str,
        booked: &HashSet<String>,
    ) -> Result<&[String], FlowError> {
        if self.stage != BookingStage::Seats {
            return Err(FlowError::WrongStage(self.stage));
        }
        self.selected = toggle_seat(
            seat_number,
            std::mem::take(&mut self.selected),
            booked,
            MAX_SEATS_PER_BOOKING,
        );
        Ok(&self.selected)
    }

    pub fn proceed_to_payment(&mut self) -> Result<(), FlowError> {
        if self.stage != BookingStage::Seats {
            return Err(FlowError::WrongStage(self.stage));
        }
        if self.selected.is_empty() {
            return Err(ValidationError::NoSeats.into());
        }
        self.stage = BookingStage::Payment;
        Ok(())
    }

    /// Payment -> Seats, discarding any in-flight payment result.
    pub fn cancel_payment(&mut self) -> Result<(), FlowError> {
        if self.stage != BookingStage::Payment {
            return Err(FlowError::WrongStage(self.stage));
        }
        self.stage = BookingStage::Seats;
        Ok(())
    }

    /// Payment -> Confirmation: builds the final record from everything the
    /// flow collected.
    pub fn complete(&mut self, payment: &PaymentDetails) -> Result<Booking, FlowError> {
        if self.stage != BookingStage::Payment {
            return Err(FlowError::WrongStage(self.stage));
        }

        let passenger = self
            .passenger
            .as_ref()
            .expect("details are submitted before the seats stage");
        let journey = self
            .journey
            .as_ref()
            .expect("details are submitted before the seats stage");

        let booking = build_booking(passenger, journey, &self.selected, payment)?;
        self.stage = BookingStage::Confirmation;
        Ok(booking)
    }
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self::new()
    }
}
