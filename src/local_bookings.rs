use crate::{
    backend::BookingBackend,
    error::{BookingError, BookingResult},
    types::{Booking, BookingStatus, NewBooking, OperatingHours, Service, ServiceStatus},
};
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Store {
    hours: HashMap<(Uuid, i16), OperatingHours>,
    services: HashMap<Uuid, Service>,
    bookings: HashMap<Uuid, Booking>,
}

/// In-memory store used when no database is configured. Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct LocalBookings {
    store: Arc<Mutex<Store>>,
}

impl LocalBookings {
    fn store(&self) -> BookingResult<MutexGuard<'_, Store>> {
        self.store.lock().map_err(|err| {
            error!(%err, "Local booking store is poisoned");
            BookingError::Storage("local booking store is poisoned".into())
        })
    }

    fn sorted(mut bookings: Vec<Booking>) -> Vec<Booking> {
        bookings.sort_unstable_by(|a, b| a.start_time.cmp(&b.start_time));
        bookings
    }
}

impl BookingBackend for LocalBookings {
    fn operating_hours(
        &self,
        barbershop_id: Uuid,
        weekday: i16,
    ) -> BookingResult<Option<OperatingHours>> {
        Ok(self.store()?.hours.get(&(barbershop_id, weekday)).cloned())
    }

    fn set_operating_hours(&self, hours: OperatingHours) -> BookingResult<()> {
        self.store()?
            .hours
            .insert((hours.barbershop_id, hours.weekday), hours);
        Ok(())
    }

    fn service(&self, service_id: Uuid) -> BookingResult<Option<Service>> {
        Ok(self
            .store()?
            .services
            .get(&service_id)
            .filter(|service| service.status == ServiceStatus::Active)
            .cloned())
    }

    fn services(&self, barbershop_id: Uuid) -> BookingResult<Vec<Service>> {
        let mut services: Vec<Service> = self
            .store()?
            .services
            .values()
            .filter(|service| {
                service.barbershop_id == barbershop_id && service.status == ServiceStatus::Active
            })
            .cloned()
            .collect();
        services.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    fn add_service(&self, service: Service) -> BookingResult<Service> {
        self.store()?.services.insert(service.id, service.clone());
        Ok(service)
    }

    fn set_service_active(&self, service_id: Uuid, is_active: bool) -> BookingResult<Service> {
        let mut store = self.store()?;
        match store.services.get_mut(&service_id) {
            Some(service) if service.status == ServiceStatus::Active => {
                service.is_active = is_active;
                Ok(service.clone())
            }
            _ => Err(BookingError::ServiceNotFound),
        }
    }

    fn delete_service(&self, service_id: Uuid, deleted_at: DateTime<Utc>) -> BookingResult<()> {
        let mut store = self.store()?;
        match store.services.get_mut(&service_id) {
            Some(service) if service.status == ServiceStatus::Active => {
                service.status = ServiceStatus::Deleted;
                service.deleted_at = Some(deleted_at);
                Ok(())
            }
            _ => Err(BookingError::ServiceNotFound),
        }
    }

    fn bookings_between(
        &self,
        barbershop_id: Uuid,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> BookingResult<Vec<Booking>> {
        let bookings = self
            .store()?
            .bookings
            .values()
            .filter(|booking| {
                booking.barbershop_id == barbershop_id
                    && booking.blocks_availability()
                    && booking.overlaps(from, until)
            })
            .cloned()
            .collect();
        Ok(Self::sorted(bookings))
    }

    fn booking(&self, booking_id: Uuid) -> BookingResult<Option<Booking>> {
        Ok(self.store()?.bookings.get(&booking_id).cloned())
    }

    fn bookings(&self, barbershop_id: Uuid) -> BookingResult<Vec<Booking>> {
        let bookings = self
            .store()?
            .bookings
            .values()
            .filter(|booking| booking.barbershop_id == barbershop_id)
            .cloned()
            .collect();
        Ok(Self::sorted(bookings))
    }

    fn customer_bookings(&self, customer_id: &str) -> BookingResult<Vec<Booking>> {
        let bookings = self
            .store()?
            .bookings
            .values()
            .filter(|booking| booking.customer_id == customer_id)
            .cloned()
            .collect();
        Ok(Self::sorted(bookings))
    }

    fn admit_booking<F>(
        &self,
        barbershop_id: Uuid,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        admit: F,
    ) -> BookingResult<Booking>
    where
        F: FnOnce(&[Booking]) -> BookingResult<NewBooking>,
    {
        // The guard is held from the ledger snapshot until the insert.
        let mut store = self.store()?;
        let ledger: Vec<Booking> = store
            .bookings
            .values()
            .filter(|booking| {
                booking.barbershop_id == barbershop_id
                    && booking.blocks_availability()
                    && booking.overlaps(from, until)
            })
            .cloned()
            .collect();

        let booking = admit(&ledger)?.into_booking(Utc::now());
        store.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    fn transition_booking<F>(&self, booking_id: Uuid, transition: F) -> BookingResult<Booking>
    where
        F: FnOnce(&Booking) -> BookingResult<BookingStatus>,
    {
        let mut store = self.store()?;
        let booking = store
            .bookings
            .get_mut(&booking_id)
            .ok_or(BookingError::BookingNotFound)?;
        booking.status = transition(booking)?;
        Ok(booking.clone())
    }
}
