//! Slot generation and calendar layout.
//!
//! Nothing here decides whether two appointments conflict: that answer comes
//! from an [`AvailabilityCheck`], which in production is the
//! `check_slot_availability` database function.

mod calendar;
mod slots;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

pub use calendar::{
    DayMarker, DaySchedule, DayOverview, SlotRow, day_schedule, month_markers, week_days,
    week_overview,
};
pub use slots::{available_slots, candidate_slots};

/// Answers whether a service can start at a given date and time.
#[async_trait]
pub trait AvailabilityCheck {
    async fn is_available(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        service_id: i32,
        exclude_appointment: Option<i32>,
    ) -> Result<bool>;
}
