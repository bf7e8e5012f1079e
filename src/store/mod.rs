use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use itertools::Itertools;
use serde_json::Value;
use thiserror::Error;

use crate::booking::Booking;

pub mod memory;

pub use memory::MemoryKv;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key-value backend failure: {0}")]
    Backend(String),

    #[error("malformed record: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Minimal persistence contract: JSON values by exact string key. No
/// transactions, no range queries.
#[async_trait]
pub trait KeyValue: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Key of the append-only list of all booking ids, in creation order.
const LOG_KEY: &str = "bookings:log";

fn booking_key(id: &str) -> String {
    format!("booking:{id}")
}

/// Booking persistence over any [`KeyValue`] backend. The id log plus the
/// per-booking records are the single source of truth; the per-user and
/// per-(bus, date) views are derived on read, so no index can go stale if a
/// write sequence is cut short.
pub struct BookingStore {
    kv: Arc<dyn KeyValue>,
}

impl BookingStore {
    pub fn new(kv: Arc<dyn KeyValue>) -> Self {
        Self { kv }
    }

    /// Writes the record, then appends its id to the log. The two writes are
    /// not atomic; failing between them leaves an unreferenced record that no
    /// read path can observe. Nothing is rolled back.
    pub async fn create(&self, booking: &Booking) -> Result<(), StoreError> {
        let record = serde_json::to_value(booking)?;
        self.kv.set(&booking_key(&booking.booking_id), record).await?;

        let mut log = self.booking_log().await?;
        log.push(booking.booking_id.clone());
        self.kv.set(LOG_KEY, serde_json::to_value(log)?).await
    }

    pub async fn get(&self, booking_id: &str) -> Result<Option<Booking>, StoreError> {
        match self.kv.get(&booking_key(booking_id)).await? {
            Some(record) => Ok(Some(serde_json::from_value(record)?)),
            None => Ok(None),
        }
    }

    /// All of one passenger's bookings in creation order. Log entries whose
    /// record has gone missing are skipped.
    pub async fn bookings_for_user(&self, email: &str) -> Result<Vec<Booking>, StoreError> {
        let bookings = self
            .all_bookings()
            .await?
            .into_iter()
            .filter(|b| b.passenger_email == email)
            .collect();
        Ok(bookings)
    }

    /// Seat numbers already sold for one bus on one journey date, first
    /// occurrence first.
    pub async fn booked_seats(
        &self,
        bus_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<String>, StoreError> {
        let seats = self
            .all_bookings()
            .await?
            .into_iter()
            .filter(|b| b.bus_id == bus_id && b.journey_date == date)
            .flat_map(|b| b.seats)
            .unique()
            .collect();
        Ok(seats)
    }

    async fn booking_log(&self) -> Result<Vec<String>, StoreError> {
        match self.kv.get(LOG_KEY).await? {
            Some(ids) => Ok(serde_json::from_value(ids)?),
            None => Ok(Vec::new()),
        }
    }

    async fn all_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let mut bookings = Vec::new();
        for id in self.booking_log().await? {
            if let Some(booking) = self.get(&id).await? {
                bookings.push(booking);
            }
        }
        Ok(bookings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{JourneyDetails, Passenger, build_booking};
    use crate::payment::{PaymentDetails, UpiProvider};
    use chrono::NaiveDate;
    use serde_json::json;

    fn journey_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 14).unwrap()
    }

    fn booking_for(email: &str, bus_id: &str, seats: &[&str]) -> Booking {
        let passenger = Passenger {
            name: "Asha Rao".into(),
            email: email.into(),
            phone: "+91 98765 43210".into(),
        };
        let journey = JourneyDetails {
            bus_id: bus_id.into(),
            route_number: "42A".into(),
            from_stop: "Majestic".into(),
            to_stop: "Indiranagar".into(),
            journey_date: journey_date(),
        };
        let seats: Vec<String> = seats.iter().map(|s| s.to_string()).collect();
        let payment = PaymentDetails {
            amount: seats.len() as u32 * 25,
            upi_id: "gpay@user".into(),
            provider: UpiProvider::Gpay,
            transaction_id: "TXN1".into(),
        };
        build_booking(&passenger, &journey, &seats, &payment).unwrap()
    }

    fn store() -> (BookingStore, Arc<MemoryKv>) {
        let kv = Arc::new(MemoryKv::new());
        (BookingStore::new(kv.clone()), kv)
    }

    #[tokio::test]
    async fn created_bookings_can_be_fetched_by_id() {
        let (store, _) = store();
        let booking = booking_for("x@example.com", "BUS001", &["1A", "1B"]);

        store.create(&booking).await.unwrap();
        let fetched = store.get(&booking.booking_id).await.unwrap().unwrap();
        assert_eq!(fetched, booking);
    }

    #[tokio::test]
    async fn unknown_id_is_none_not_an_error() {
        let (store, _) = store();
        assert!(store.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn user_bookings_come_back_in_creation_order() {
        let (store, _) = store();
        let first = booking_for("x@example.com", "BUS001", &["1A"]);
        let second = booking_for("x@example.com", "BUS002", &["2C"]);
        let unrelated = booking_for("y@example.com", "BUS001", &["3D"]);

        store.create(&first).await.unwrap();
        store.create(&unrelated).await.unwrap();
        store.create(&second).await.unwrap();

        let bookings = store.bookings_for_user("x@example.com").await.unwrap();
        let ids: Vec<_> = bookings.iter().map(|b| b.booking_id.as_str()).collect();
        assert_eq!(ids, [first.booking_id.as_str(), second.booking_id.as_str()]);
    }

    #[tokio::test]
    async fn booked_seats_union_covers_every_booking_for_the_date() {
        let (store, _) = store();
        store
            .create(&booking_for("x@example.com", "BUS001", &["1A", "1B"]))
            .await
            .unwrap();
        store
            .create(&booking_for("y@example.com", "BUS001", &["1B", "2C"]))
            .await
            .unwrap();
        store
            .create(&booking_for("z@example.com", "BUS002", &["4D"]))
            .await
            .unwrap();

        let seats = store.booked_seats("BUS001", journey_date()).await.unwrap();
        assert_eq!(seats, ["1A", "1B", "2C"]);

        let other_day = NaiveDate::from_ymd_opt(2026, 8, 15).unwrap();
        assert!(store.booked_seats("BUS001", other_day).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn log_entries_without_records_are_skipped() {
        let (store, kv) = store();
        let booking = booking_for("x@example.com", "BUS001", &["1A"]);
        store.create(&booking).await.unwrap();

        // Corrupt the log with an id that has no record behind it.
        kv.set(
            LOG_KEY,
            json!([booking.booking_id, "BKG0000000000000dead"]),
        )
        .await
        .unwrap();

        let bookings = store.bookings_for_user("x@example.com").await.unwrap();
        assert_eq!(bookings.len(), 1);
    }

    #[tokio::test]
    async fn backend_failures_surface_as_store_errors() {
        struct FailingKv;

        #[async_trait]
        impl KeyValue for FailingKv {
            async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
                Err(StoreError::Backend("disk on fire".into()))
            }

            async fn set(&self, _key: &str, _value: Value) -> Result<(), StoreError> {
                Err(StoreError::Backend("disk on fire".into()))
            }
        }

        let store = BookingStore::new(Arc::new(FailingKv));
        let booking = booking_for("x@example.com", "BUS001", &["1A"]);

        assert!(matches!(
            store.create(&booking).await.unwrap_err(),
            StoreError::Backend(_)
        ));
        assert!(matches!(
            store.get("anything").await.unwrap_err(),
            StoreError::Backend(_)
        ));
    }
}
