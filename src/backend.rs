use crate::{
    error::BookingResult,
    types::{Booking, BookingStatus, NewBooking, OperatingHours, Service},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Persistent store behind the booking manager.
///
/// `admit_booking` and `transition_booking` are atomic: the closure sees the
/// ledger as it is inside the same lock or transaction that writes its result.
pub trait BookingBackend: Clone + Send + Sync + 'static {
    fn operating_hours(
        &self,
        barbershop_id: Uuid,
        weekday: i16,
    ) -> BookingResult<Option<OperatingHours>>;
    fn set_operating_hours(&self, hours: OperatingHours) -> BookingResult<()>;

    /// Soft-deleted services are never returned.
    fn service(&self, service_id: Uuid) -> BookingResult<Option<Service>>;
    fn services(&self, barbershop_id: Uuid) -> BookingResult<Vec<Service>>;
    fn add_service(&self, service: Service) -> BookingResult<Service>;
    fn set_service_active(&self, service_id: Uuid, is_active: bool) -> BookingResult<Service>;
    fn delete_service(&self, service_id: Uuid, deleted_at: DateTime<Utc>) -> BookingResult<()>;

    /// Non-cancelled bookings of a barbershop overlapping `[from, until)`.
    fn bookings_between(
        &self,
        barbershop_id: Uuid,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> BookingResult<Vec<Booking>>;
    fn booking(&self, booking_id: Uuid) -> BookingResult<Option<Booking>>;
    fn bookings(&self, barbershop_id: Uuid) -> BookingResult<Vec<Booking>>;
    fn customer_bookings(&self, customer_id: &str) -> BookingResult<Vec<Booking>>;

    fn admit_booking<F>(
        &self,
        barbershop_id: Uuid,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        admit: F,
    ) -> BookingResult<Booking>
    where
        F: FnOnce(&[Booking]) -> BookingResult<NewBooking>;

    fn transition_booking<F>(&self, booking_id: Uuid, transition: F) -> BookingResult<Booking>
    where
        F: FnOnce(&Booking) -> BookingResult<BookingStatus>;
}
