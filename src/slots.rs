//! Slot generation and availability filtering.
//!
//! Nothing in here is stored: candidate start times are derived from the
//! operating hours on every call and filtered against the booking ledger
//! that the caller hands in.

use crate::{
    error::BookingError,
    types::{AvailableTimeSlot, Booking, OperatingHours},
};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

/// Candidate start times of one day, ascending, stepping by the slot granularity.
#[derive(Debug, Clone)]
pub struct SlotCandidates {
    next_minute: u32,
    last_minute: Option<u32>,
    step: u32,
}

impl SlotCandidates {
    fn empty() -> Self {
        Self {
            next_minute: 0,
            last_minute: None,
            step: 1,
        }
    }
}

impl Iterator for SlotCandidates {
    type Item = NaiveTime;

    fn next(&mut self) -> Option<NaiveTime> {
        let last_minute = self.last_minute?;
        if self.next_minute > last_minute {
            return None;
        }
        let minute = self.next_minute;
        self.next_minute += self.step;
        NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0)
    }
}

pub fn candidate_slots(
    hours: &OperatingHours,
    duration_minutes: i32,
    granularity_minutes: i32,
) -> Result<SlotCandidates, BookingError> {
    if !hours.is_open {
        return Ok(SlotCandidates::empty());
    }
    if duration_minutes <= 0 {
        return Err(BookingError::InvalidConfiguration(format!(
            "service duration must be positive, got {duration_minutes} minutes"
        )));
    }
    if granularity_minutes <= 0 {
        return Err(BookingError::InvalidConfiguration(format!(
            "slot granularity must be positive, got {granularity_minutes} minutes"
        )));
    }
    hours.validate()?;

    let opening = hours.opening_minute();
    let closing = hours.closing_minute();
    let duration = duration_minutes as u32;
    if opening + duration > closing {
        return Ok(SlotCandidates::empty());
    }

    Ok(SlotCandidates {
        next_minute: opening,
        last_minute: Some(closing - duration),
        step: granularity_minutes as u32,
    })
}

/// UTC bounds `[start, end)` of the barbershop-local calendar day.
pub fn day_window(date: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_to_utc(date, NaiveTime::MIN, offset);
    (start, start + Duration::days(1))
}

fn local_to_utc(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
    // A fixed offset never produces gaps or folds.
    (date.and_time(time) - offset).and_utc()
}

/// Everything needed to turn candidate times into concrete slots.
#[derive(Debug, Clone, Copy)]
pub struct SlotRequest {
    pub barbershop_id: Uuid,
    pub service_id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: i32,
    pub utc_offset: FixedOffset,
}

/// Drops candidates that start before `earliest_start` or overlap a booking that
/// still blocks the ledger.
pub fn available_slots(
    request: &SlotRequest,
    candidates: impl Iterator<Item = NaiveTime>,
    ledger: &[Booking],
    earliest_start: DateTime<Utc>,
) -> Vec<AvailableTimeSlot> {
    let duration = Duration::minutes(i64::from(request.duration_minutes));
    let blocking: Vec<&Booking> = ledger
        .iter()
        .filter(|booking| {
            booking.barbershop_id == request.barbershop_id && booking.blocks_availability()
        })
        .collect();

    candidates
        .map(|time| local_to_utc(request.date, time, request.utc_offset))
        .filter(|start| *start >= earliest_start)
        .filter(|start| {
            let end = *start + duration;
            !blocking.iter().any(|booking| booking.overlaps(*start, end))
        })
        .map(|start| AvailableTimeSlot {
            barbershop_id: request.barbershop_id,
            service_id: request.service_id,
            start_time: start,
            end_time: start + duration,
        })
        .collect()
}
