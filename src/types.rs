use crate::error::BookingError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Weekly opening hours of one barbershop for one weekday (0 = Sunday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub barbershop_id: Uuid,
    pub weekday: i16,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub is_open: bool,
}

impl OperatingHours {
    pub fn opening_minute(&self) -> u32 {
        minute_of_day(self.opening_time)
    }

    pub fn closing_minute(&self) -> u32 {
        minute_of_day(self.closing_time)
    }

    /// An open day must close strictly after it opens. Closed days are never checked.
    pub fn validate(&self) -> Result<(), BookingError> {
        if !(0..=6).contains(&self.weekday) {
            return Err(BookingError::InvalidConfiguration(format!(
                "weekday {} is outside 0..=6",
                self.weekday
            )));
        }
        if self.is_open && self.closing_minute() <= self.opening_minute() {
            return Err(BookingError::InvalidConfiguration(format!(
                "closing time {} is not after opening time {}",
                self.closing_time.format("%H:%M"),
                self.opening_time.format("%H:%M")
            )));
        }
        Ok(())
    }
}

pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

pub fn weekday_index(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Active,
    Deleted,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Active => "active",
            ServiceStatus::Deleted => "deleted",
        }
    }
}

impl FromStr for ServiceStatus {
    type Err = BookingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(ServiceStatus::Active),
            "deleted" => Ok(ServiceStatus::Deleted),
            other => Err(BookingError::Storage(format!(
                "unknown service status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub barbershop_id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price_in_cents: i64,
    pub is_active: bool,
    pub status: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Service {
    pub fn new(
        barbershop_id: Uuid,
        name: String,
        duration_minutes: i32,
        price_in_cents: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            barbershop_id,
            name,
            duration_minutes,
            price_in_cents,
            is_active: true,
            status: ServiceStatus::Active,
            deleted_at: None,
        }
    }

    pub fn is_bookable(&self) -> bool {
        self.is_active && self.status == ServiceStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(BookingError::Storage(format!(
                "unknown booking status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub service_id: Uuid,
    pub barbershop_id: Uuid,
    pub customer_id: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn end_time(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn blocks_availability(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }

    /// Half-open interval intersection, touching endpoints do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end_time() && self.start_time < end
    }
}

/// A booking that passed admission control and is about to enter the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub service_id: Uuid,
    pub barbershop_id: Uuid,
    pub customer_id: String,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: BookingStatus,
}

impl NewBooking {
    pub fn into_booking(self, created_at: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            service_id: self.service_id,
            barbershop_id: self.barbershop_id,
            customer_id: self.customer_id,
            start_time: self.start_time,
            duration_minutes: self.duration_minutes,
            status: self.status,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableTimeSlot {
    pub barbershop_id: Uuid,
    pub service_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn hours(opening: (u32, u32), closing: (u32, u32), is_open: bool) -> OperatingHours {
        OperatingHours {
            barbershop_id: Uuid::new_v4(),
            weekday: 1,
            opening_time: NaiveTime::from_hms_opt(opening.0, opening.1, 0).unwrap(),
            closing_time: NaiveTime::from_hms_opt(closing.0, closing.1, 0).unwrap(),
            is_open,
        }
    }

    #[test]
    fn test_validate_operating_hours() {
        hours((9, 0), (18, 0), true).validate().unwrap();
        hours((18, 0), (9, 0), false).validate().unwrap();

        let err = hours((9, 0), (9, 0), true).validate().unwrap_err();
        assert!(matches!(err, BookingError::InvalidConfiguration(_)));
        let err = hours((18, 0), (9, 0), true).validate().unwrap_err();
        assert!(matches!(err, BookingError::InvalidConfiguration(_)));

        let mut sunday_plus_seven = hours((9, 0), (18, 0), true);
        sunday_plus_seven.weekday = 7;
        sunday_plus_seven.validate().unwrap_err();
    }

    #[test_case(BookingStatus::Pending, BookingStatus::Confirmed, true)]
    #[test_case(BookingStatus::Pending, BookingStatus::Cancelled, true)]
    #[test_case(BookingStatus::Confirmed, BookingStatus::Cancelled, true)]
    #[test_case(BookingStatus::Confirmed, BookingStatus::Pending, false)]
    #[test_case(BookingStatus::Cancelled, BookingStatus::Pending, false)]
    #[test_case(BookingStatus::Cancelled, BookingStatus::Confirmed, false)]
    #[test_case(BookingStatus::Pending, BookingStatus::Pending, false)]
    fn test_booking_status_transitions(from: BookingStatus, to: BookingStatus, allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_booking_overlap_is_half_open() {
        let start = Utc.with_ymd_and_hms(2030, 1, 7, 10, 0, 0).unwrap();
        let booking = NewBooking {
            service_id: Uuid::new_v4(),
            barbershop_id: Uuid::new_v4(),
            customer_id: "customer".into(),
            start_time: start,
            duration_minutes: 30,
            status: BookingStatus::Pending,
        }
        .into_booking(Utc::now());

        let half_hour = Duration::minutes(30);
        assert!(booking.overlaps(start, start + half_hour));
        assert!(booking.overlaps(start + Duration::minutes(15), start + Duration::minutes(45)));
        assert!(!booking.overlaps(start - half_hour, start));
        assert!(!booking.overlaps(start + half_hour, start + Duration::hours(1)));
    }

    #[test]
    fn test_weekday_index_starts_on_sunday() {
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2030, 1, 6).unwrap()), 0);
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()), 1);
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2030, 1, 12).unwrap()), 6);
    }

    #[test]
    fn test_status_round_trip_through_storage_text() {
        assert_eq!("confirmed".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
        assert_eq!("deleted".parse::<ServiceStatus>().unwrap(), ServiceStatus::Deleted);
        "archived".parse::<BookingStatus>().unwrap_err();
    }
}
