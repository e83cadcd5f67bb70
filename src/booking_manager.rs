use crate::{
    backend::BookingBackend,
    clock::Clock,
    configuration::Configuration,
    error::{BookingError, BookingResult},
    slots::{available_slots, candidate_slots, day_window, SlotRequest},
    types::{
        weekday_index, AvailableTimeSlot, Booking, BookingStatus, NewBooking, OperatingHours,
        Service,
    },
};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Upper bound for the configured lead time, one year.
const MAX_LEAD_TIME_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    pub slot_granularity_minutes: i32,
    pub lead_time: Duration,
    pub utc_offset: FixedOffset,
    pub initial_status: BookingStatus,
}

impl BookingPolicy {
    pub fn from_configuration<C: Configuration>(configuration: &C) -> BookingResult<Self> {
        let slot_granularity_minutes = configuration.slot_granularity_minutes();
        if slot_granularity_minutes <= 0 {
            return Err(BookingError::InvalidConfiguration(format!(
                "slot granularity must be positive, got {slot_granularity_minutes} minutes"
            )));
        }
        let lead_time_minutes = configuration.lead_time_minutes();
        if !(0..=MAX_LEAD_TIME_MINUTES).contains(&lead_time_minutes) {
            return Err(BookingError::InvalidConfiguration(format!(
                "lead time must be between 0 and {MAX_LEAD_TIME_MINUTES} minutes, \
                 got {lead_time_minutes} minutes"
            )));
        }
        let offset_minutes = configuration.utc_offset_minutes();
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
            BookingError::InvalidConfiguration(format!(
                "utc offset of {offset_minutes} minutes is out of range"
            ))
        })?;
        let initial_status = match configuration.auto_confirm() {
            true => BookingStatus::Confirmed,
            false => BookingStatus::Pending,
        };

        Ok(Self {
            slot_granularity_minutes,
            lead_time: Duration::minutes(lead_time_minutes),
            utc_offset,
            initial_status,
        })
    }
}

/// Availability and admission on top of a [`BookingBackend`].
#[derive(Clone)]
pub struct BookingManager<T: BookingBackend> {
    backend: T,
    policy: BookingPolicy,
    clock: Arc<dyn Clock>,
}

impl<T: BookingBackend> BookingManager<T> {
    pub fn new(backend: T, policy: BookingPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            policy,
            clock,
        }
    }

    fn bookable_service(&self, barbershop_id: Uuid, service_id: Uuid) -> BookingResult<Service> {
        self.backend
            .service(service_id)?
            .filter(|service| service.barbershop_id == barbershop_id && service.is_bookable())
            .ok_or(BookingError::ServiceNotFound)
    }

    fn slot_request(&self, service: &Service, date: NaiveDate) -> SlotRequest {
        SlotRequest {
            barbershop_id: service.barbershop_id,
            service_id: service.id,
            date,
            duration_minutes: service.duration_minutes,
            utc_offset: self.policy.utc_offset,
        }
    }

    fn earliest_start(&self) -> DateTime<Utc> {
        self.clock.now() + self.policy.lead_time
    }

    pub fn list_available_slots(
        &self,
        barbershop_id: Uuid,
        service_id: Uuid,
        date: NaiveDate,
    ) -> BookingResult<Vec<AvailableTimeSlot>> {
        let service = self.bookable_service(barbershop_id, service_id)?;
        let hours = match self.backend.operating_hours(barbershop_id, weekday_index(date))? {
            Some(hours) if hours.is_open => hours,
            _ => return Ok(Vec::new()),
        };
        let candidates = candidate_slots(
            &hours,
            service.duration_minutes,
            self.policy.slot_granularity_minutes,
        )?;

        let (from, until) = day_window(date, self.policy.utc_offset);
        let ledger = self.backend.bookings_between(barbershop_id, from, until)?;
        Ok(available_slots(
            &self.slot_request(&service, date),
            candidates,
            &ledger,
            self.earliest_start(),
        ))
    }

    /// Validates the request and commits it. The availability check runs again
    /// inside the backend's atomic unit, so a stale client slot list can't win.
    pub fn admit_booking(
        &self,
        barbershop_id: Uuid,
        service_id: Uuid,
        requested_start: DateTime<Utc>,
        customer_id: &str,
    ) -> BookingResult<Booking> {
        let result = self.try_admit(barbershop_id, service_id, requested_start, customer_id);
        match &result {
            Ok(booking) => info!(
                booking_id = %booking.id,
                %barbershop_id,
                %service_id,
                start = %requested_start,
                status = %booking.status,
                "Booking admitted"
            ),
            Err(err) => warn!(
                %err,
                %barbershop_id,
                %service_id,
                start = %requested_start,
                "Booking rejected"
            ),
        }
        result
    }

    fn try_admit(
        &self,
        barbershop_id: Uuid,
        service_id: Uuid,
        requested_start: DateTime<Utc>,
        customer_id: &str,
    ) -> BookingResult<Booking> {
        let service = self.bookable_service(barbershop_id, service_id)?;

        let local_start = requested_start.with_timezone(&self.policy.utc_offset);
        let date = local_start.date_naive();
        let hours = self
            .backend
            .operating_hours(barbershop_id, weekday_index(date))?
            .filter(|hours| hours.is_open)
            .ok_or(BookingError::BarbershopClosed)?;
        hours.validate()?;

        let start_second = i64::from(local_start.time().num_seconds_from_midnight());
        let opening_second = i64::from(hours.opening_minute()) * 60;
        let closing_second = i64::from(hours.closing_minute()) * 60;
        let duration_seconds = i64::from(service.duration_minutes) * 60;
        if start_second < opening_second || start_second + duration_seconds > closing_second {
            return Err(BookingError::BarbershopClosed);
        }

        let request = self.slot_request(&service, date);
        let (from, until) = day_window(date, self.policy.utc_offset);
        let earliest_start = self.earliest_start();
        let granularity = self.policy.slot_granularity_minutes;
        let status = self.policy.initial_status;

        self.backend.admit_booking(barbershop_id, from, until, |ledger| {
            let candidates = candidate_slots(&hours, service.duration_minutes, granularity)?;
            let still_available = available_slots(&request, candidates, ledger, earliest_start)
                .iter()
                .any(|slot| slot.start_time == requested_start);
            if !still_available {
                return Err(BookingError::SlotConflict);
            }

            Ok(NewBooking {
                service_id: service.id,
                barbershop_id,
                customer_id: customer_id.into(),
                start_time: requested_start,
                duration_minutes: service.duration_minutes,
                status,
            })
        })
    }

    fn transition(&self, booking_id: Uuid, next: BookingStatus) -> BookingResult<Booking> {
        let booking = self.backend.transition_booking(booking_id, |booking| {
            match booking.status.can_transition_to(next) {
                true => Ok(next),
                false => Err(BookingError::InvalidTransition {
                    from: booking.status,
                    to: next,
                }),
            }
        })?;
        info!(%booking_id, status = %booking.status, "Booking status changed");
        Ok(booking)
    }

    pub fn confirm_booking(&self, booking_id: Uuid) -> BookingResult<Booking> {
        self.transition(booking_id, BookingStatus::Confirmed)
    }

    pub fn cancel_booking(&self, booking_id: Uuid) -> BookingResult<Booking> {
        self.transition(booking_id, BookingStatus::Cancelled)
    }

    /// Customers may only withdraw their own requests that are still pending.
    pub fn cancel_own_booking(
        &self,
        booking_id: Uuid,
        customer_id: &str,
    ) -> BookingResult<Booking> {
        let booking = self.backend.transition_booking(booking_id, |booking| {
            if booking.customer_id != customer_id {
                return Err(BookingError::NotBookingOwner);
            }
            if booking.status != BookingStatus::Pending {
                return Err(BookingError::InvalidTransition {
                    from: booking.status,
                    to: BookingStatus::Cancelled,
                });
            }
            Ok(BookingStatus::Cancelled)
        })?;
        info!(%booking_id, "Booking cancelled by customer");
        Ok(booking)
    }

    pub fn set_operating_hours(&self, hours: OperatingHours) -> BookingResult<()> {
        hours.validate()?;
        self.backend.set_operating_hours(hours.clone())?;
        info!(
            barbershop_id = %hours.barbershop_id,
            weekday = hours.weekday,
            is_open = hours.is_open,
            "Operating hours updated"
        );
        Ok(())
    }

    pub fn add_service(
        &self,
        barbershop_id: Uuid,
        name: String,
        duration_minutes: i32,
        price_in_cents: i64,
    ) -> BookingResult<Service> {
        if duration_minutes <= 0 {
            return Err(BookingError::InvalidConfiguration(format!(
                "service duration must be positive, got {duration_minutes} minutes"
            )));
        }
        if price_in_cents < 0 {
            return Err(BookingError::InvalidConfiguration(format!(
                "service price can't be negative, got {price_in_cents} cents"
            )));
        }
        let service = self.backend.add_service(Service::new(
            barbershop_id,
            name,
            duration_minutes,
            price_in_cents,
        ))?;
        info!(service_id = %service.id, %barbershop_id, "Service added");
        Ok(service)
    }

    pub fn set_service_active(&self, service_id: Uuid, is_active: bool) -> BookingResult<Service> {
        let service = self.backend.set_service_active(service_id, is_active)?;
        info!(%service_id, is_active, "Service activation changed");
        Ok(service)
    }

    pub fn delete_service(&self, service_id: Uuid) -> BookingResult<()> {
        self.backend.delete_service(service_id, self.clock.now())?;
        info!(%service_id, "Service deleted");
        Ok(())
    }

    pub fn services(&self, barbershop_id: Uuid) -> BookingResult<Vec<Service>> {
        self.backend.services(barbershop_id)
    }

    pub fn bookable_services(&self, barbershop_id: Uuid) -> BookingResult<Vec<Service>> {
        let mut services = self.backend.services(barbershop_id)?;
        services.retain(Service::is_bookable);
        Ok(services)
    }

    pub fn barbershop_bookings(&self, barbershop_id: Uuid) -> BookingResult<Vec<Booking>> {
        self.backend.bookings(barbershop_id)
    }

    pub fn customer_bookings(&self, customer_id: &str) -> BookingResult<Vec<Booking>> {
        self.backend.customer_bookings(customer_id)
    }

    pub fn customer_booking(&self, booking_id: Uuid, customer_id: &str) -> BookingResult<Booking> {
        let booking = self
            .backend
            .booking(booking_id)?
            .ok_or(BookingError::BookingNotFound)?;
        match booking.customer_id == customer_id {
            true => Ok(booking),
            false => Err(BookingError::NotBookingOwner),
        }
    }
}
