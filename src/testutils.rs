use crate::{
    backend::BookingBackend,
    error::{BookingError, BookingResult},
    types::{Booking, BookingStatus, NewBooking, OperatingHours, Service},
};
use chrono::{DateTime, Utc};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use uuid::Uuid;

pub struct MockBookingBackendInner {
    pub success: AtomicBool,
    pub calls_to_operating_hours: AtomicU64,
    pub calls_to_set_operating_hours: AtomicU64,
    pub calls_to_service: AtomicU64,
    pub calls_to_services: AtomicU64,
    pub calls_to_add_service: AtomicU64,
    pub calls_to_set_service_active: AtomicU64,
    pub calls_to_delete_service: AtomicU64,
    pub calls_to_bookings_between: AtomicU64,
    pub calls_to_booking: AtomicU64,
    pub calls_to_bookings: AtomicU64,
    pub calls_to_customer_bookings: AtomicU64,
    pub calls_to_admit_booking: AtomicU64,
    pub calls_to_transition_booking: AtomicU64,
}

#[derive(Clone)]
pub struct MockBookingBackend(pub Arc<MockBookingBackendInner>);

impl MockBookingBackendInner {
    fn new() -> Self {
        Self {
            success: AtomicBool::new(true),
            calls_to_operating_hours: AtomicU64::default(),
            calls_to_set_operating_hours: AtomicU64::default(),
            calls_to_service: AtomicU64::default(),
            calls_to_services: AtomicU64::default(),
            calls_to_add_service: AtomicU64::default(),
            calls_to_set_service_active: AtomicU64::default(),
            calls_to_delete_service: AtomicU64::default(),
            calls_to_bookings_between: AtomicU64::default(),
            calls_to_booking: AtomicU64::default(),
            calls_to_bookings: AtomicU64::default(),
            calls_to_customer_bookings: AtomicU64::default(),
            calls_to_admit_booking: AtomicU64::default(),
            calls_to_transition_booking: AtomicU64::default(),
        }
    }
}

impl MockBookingBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockBookingBackendInner::new()))
    }

    fn result(&self, counter: &AtomicU64) -> BookingResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(BookingError::Storage("Supposed to fail".into())),
        }
    }

    fn pending_booking(id: Uuid) -> Booking {
        Booking {
            id,
            service_id: Uuid::new_v4(),
            barbershop_id: Uuid::new_v4(),
            customer_id: "customer".into(),
            start_time: Utc::now(),
            duration_minutes: 30,
            status: BookingStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

impl BookingBackend for MockBookingBackend {
    fn operating_hours(
        &self,
        _barbershop_id: Uuid,
        _weekday: i16,
    ) -> BookingResult<Option<OperatingHours>> {
        self.result(&self.0.calls_to_operating_hours)?;
        Ok(None)
    }

    fn set_operating_hours(&self, _hours: OperatingHours) -> BookingResult<()> {
        self.result(&self.0.calls_to_set_operating_hours)
    }

    fn service(&self, _service_id: Uuid) -> BookingResult<Option<Service>> {
        self.result(&self.0.calls_to_service)?;
        Ok(None)
    }

    fn services(&self, _barbershop_id: Uuid) -> BookingResult<Vec<Service>> {
        self.result(&self.0.calls_to_services)?;
        Ok(Vec::new())
    }

    fn add_service(&self, service: Service) -> BookingResult<Service> {
        self.result(&self.0.calls_to_add_service)?;
        Ok(service)
    }

    fn set_service_active(&self, service_id: Uuid, is_active: bool) -> BookingResult<Service> {
        self.result(&self.0.calls_to_set_service_active)?;
        let mut service = Service::new(Uuid::new_v4(), "Mock service".into(), 30, 1000);
        service.id = service_id;
        service.is_active = is_active;
        Ok(service)
    }

    fn delete_service(&self, _service_id: Uuid, _deleted_at: DateTime<Utc>) -> BookingResult<()> {
        self.result(&self.0.calls_to_delete_service)
    }

    fn bookings_between(
        &self,
        _barbershop_id: Uuid,
        _from: DateTime<Utc>,
        _until: DateTime<Utc>,
    ) -> BookingResult<Vec<Booking>> {
        self.result(&self.0.calls_to_bookings_between)?;
        Ok(Vec::new())
    }

    fn booking(&self, booking_id: Uuid) -> BookingResult<Option<Booking>> {
        self.result(&self.0.calls_to_booking)?;
        Ok(Some(Self::pending_booking(booking_id)))
    }

    fn bookings(&self, _barbershop_id: Uuid) -> BookingResult<Vec<Booking>> {
        self.result(&self.0.calls_to_bookings)?;
        Ok(Vec::new())
    }

    fn customer_bookings(&self, _customer_id: &str) -> BookingResult<Vec<Booking>> {
        self.result(&self.0.calls_to_customer_bookings)?;
        Ok(Vec::new())
    }

    fn admit_booking<F>(
        &self,
        _barbershop_id: Uuid,
        _from: DateTime<Utc>,
        _until: DateTime<Utc>,
        admit: F,
    ) -> BookingResult<Booking>
    where
        F: FnOnce(&[Booking]) -> BookingResult<NewBooking>,
    {
        self.result(&self.0.calls_to_admit_booking)?;
        Ok(admit(&[])?.into_booking(Utc::now()))
    }

    fn transition_booking<F>(&self, booking_id: Uuid, transition: F) -> BookingResult<Booking>
    where
        F: FnOnce(&Booking) -> BookingResult<BookingStatus>,
    {
        self.result(&self.0.calls_to_transition_booking)?;
        let mut booking = Self::pending_booking(booking_id);
        booking.status = transition(&booking)?;
        Ok(booking)
    }
}
