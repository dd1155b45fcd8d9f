use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use super::slots::time_grid;
use crate::models::{AppointmentDetails, ClinicSettings, ScheduleBlock};

/// One line of the day view.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRow {
    pub time: NaiveTime,
    /// Appointment starting exactly at this time.
    pub appointment: Option<AppointmentDetails>,
    /// Id of an earlier appointment still running at this time.
    pub continues: Option<i32>,
    pub block_id: Option<i32>,
    pub blocked_reason: Option<String>,
}

impl SlotRow {
    pub fn is_free(&self) -> bool {
        self.appointment.as_ref().is_none_or(|a| !a.status.occupies_slot())
            && self.continues.is_none()
            && self.block_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub working_day: bool,
    pub rows: Vec<SlotRow>,
    /// Appointments whose start time is not on the slot grid.
    pub off_grid: Vec<AppointmentDetails>,
    pub blocks: Vec<ScheduleBlock>,
}

/// Lay out one day: the slot grid with appointments and blocks over it.
///
/// The grid is drawn on closed days too so staff can still see anything
/// that was booked there.
pub fn day_schedule(
    date: NaiveDate,
    settings: &ClinicSettings,
    appointments: &[AppointmentDetails],
    blocks: &[ScheduleBlock],
) -> DaySchedule {
    let grid = time_grid(settings);
    let todays: Vec<&AppointmentDetails> = appointments.iter().filter(|a| a.date == date).collect();

    let rows = grid
        .iter()
        .map(|&time| {
            // An active appointment wins over a cancelled one at the same time.
            let starting = todays
                .iter()
                .filter(|a| a.start_time == time)
                .max_by_key(|a| a.status.occupies_slot())
                .map(|a| (*a).clone());

            let slot_at = date.and_time(time);
            let continues = todays
                .iter()
                .filter(|a| a.status.occupies_slot())
                .find(|a| a.starts_at() < slot_at && a.ends_at() > slot_at)
                .map(|a| a.id);

            let block = blocks.iter().find(|b| b.covers(date, time));

            SlotRow {
                time,
                appointment: starting,
                continues,
                block_id: block.map(|b| b.id),
                blocked_reason: block.map(|b| b.reason_label().to_string()),
            }
        })
        .collect();

    let off_grid = todays
        .iter()
        .filter(|a| !grid.contains(&a.start_time))
        .map(|a| (*a).clone())
        .collect();

    DaySchedule {
        date,
        working_day: settings.is_working_day(date),
        rows,
        off_grid,
        blocks: blocks.iter().filter(|b| b.touches_day(date)).cloned().collect(),
    }
}

/// Monday through Sunday of the week containing `date`.
pub fn week_days(date: NaiveDate) -> [NaiveDate; 7] {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayOverview {
    pub date: NaiveDate,
    pub working_day: bool,
    /// Appointments still holding their slot.
    pub appointments: usize,
    pub cancelled: usize,
    pub blocked: bool,
}

pub fn week_overview(
    date: NaiveDate,
    settings: &ClinicSettings,
    appointments: &[AppointmentDetails],
    blocks: &[ScheduleBlock],
) -> Vec<DayOverview> {
    week_days(date)
        .iter()
        .map(|&day| {
            let (active, inactive): (Vec<&AppointmentDetails>, Vec<&AppointmentDetails>) = appointments
                .iter()
                .filter(|a| a.date == day)
                .partition(|a| a.status.occupies_slot());
            DayOverview {
                date: day,
                working_day: settings.is_working_day(day),
                appointments: active.len(),
                cancelled: inactive.len(),
                blocked: blocks.iter().any(|b| b.touches_day(day)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayMarker {
    pub appointments: usize,
    pub blocked: bool,
}

/// Days of the month that carry appointments or blocks.
pub fn month_markers(
    year: i32,
    month: u32,
    appointments: &[AppointmentDetails],
    blocks: &[ScheduleBlock],
) -> BTreeMap<NaiveDate, DayMarker> {
    let mut markers: BTreeMap<NaiveDate, DayMarker> = BTreeMap::new();

    for appointment in appointments
        .iter()
        .filter(|a| a.date.year() == year && a.date.month() == month)
    {
        markers.entry(appointment.date).or_default().appointments += 1;
    }

    let mut day = NaiveDate::from_ymd_opt(year, month, 1);
    while let Some(current) = day {
        if current.month() != month {
            break;
        }
        if blocks.iter().any(|b| b.touches_day(current)) {
            markers.entry(current).or_default().blocked = true;
        }
        day = current.succ_opt();
    }

    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;
    use pretty_assertions::assert_eq;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn settings() -> ClinicSettings {
        ClinicSettings {
            opening_time: t(9, 0),
            closing_time: t(12, 0),
            booking_interval_minutes: 30,
            ..ClinicSettings::default()
        }
    }

    fn appointment(id: i32, date: NaiveDate, time: NaiveTime, minutes: i32, status: AppointmentStatus) -> AppointmentDetails {
        AppointmentDetails {
            id,
            client_id: 1,
            service_id: 1,
            date,
            start_time: time,
            status,
            notes: None,
            client_name: format!("Client {}", id),
            client_email: "client@example.com".into(),
            client_phone: "555".into(),
            service_title: "Facial".into(),
            service_price: 150.0,
            service_duration: minutes,
        }
    }

    fn block(id: i32, date: NaiveDate, from: NaiveTime, to: NaiveTime) -> ScheduleBlock {
        ScheduleBlock {
            id,
            starts_at: date.and_time(from),
            ends_at: date.and_time(to),
            reason: Some("Equipment maintenance".into()),
            created_by: None,
        }
    }

    #[test]
    fn day_rows_carry_appointments_continuations_and_blocks() {
        let monday = day(3);
        let appointments = vec![
            appointment(1, monday, t(9, 0), 60, AppointmentStatus::Scheduled),
            appointment(2, day(4), t(9, 0), 60, AppointmentStatus::Scheduled),
        ];
        let blocks = vec![block(7, monday, t(11, 0), t(12, 0))];

        let schedule = day_schedule(monday, &settings(), &appointments, &blocks);

        assert!(schedule.working_day);
        assert_eq!(schedule.rows.len(), 6);
        assert_eq!(schedule.rows[0].appointment.as_ref().map(|a| a.id), Some(1));
        assert_eq!(schedule.rows[1].continues, Some(1));
        assert!(!schedule.rows[1].is_free());
        assert!(schedule.rows[2].is_free());
        assert_eq!(schedule.rows[4].block_id, Some(7));
        assert_eq!(schedule.rows[4].blocked_reason.as_deref(), Some("Equipment maintenance"));
        assert_eq!(schedule.rows[5].block_id, Some(7));
        assert_eq!(schedule.blocks.len(), 1);
    }

    #[test]
    fn cancelled_appointment_leaves_slot_free() {
        let monday = day(3);
        let appointments = vec![appointment(1, monday, t(10, 0), 60, AppointmentStatus::Cancelled)];

        let schedule = day_schedule(monday, &settings(), &appointments, &[]);

        let row = &schedule.rows[2];
        assert_eq!(row.appointment.as_ref().map(|a| a.id), Some(1));
        assert!(row.is_free());
        assert_eq!(schedule.rows[3].continues, None);
    }

    #[test]
    fn active_appointment_wins_over_cancelled_one_at_same_time() {
        let monday = day(3);
        let appointments = vec![
            appointment(1, monday, t(10, 0), 30, AppointmentStatus::Cancelled),
            appointment(2, monday, t(10, 0), 30, AppointmentStatus::Scheduled),
        ];

        let schedule = day_schedule(monday, &settings(), &appointments, &[]);

        assert_eq!(schedule.rows[2].appointment.as_ref().map(|a| a.id), Some(2));
    }

    #[test]
    fn off_grid_appointments_are_listed_separately() {
        let monday = day(3);
        let appointments = vec![appointment(3, monday, t(10, 15), 30, AppointmentStatus::Scheduled)];

        let schedule = day_schedule(monday, &settings(), &appointments, &[]);

        assert_eq!(schedule.off_grid.len(), 1);
        assert_eq!(schedule.rows[3].continues, Some(3));
    }

    #[test]
    fn closed_day_still_gets_a_grid() {
        let sunday = day(2);
        let schedule = day_schedule(sunday, &settings(), &[], &[]);
        assert!(!schedule.working_day);
        assert_eq!(schedule.rows.len(), 6);
    }

    #[test]
    fn week_starts_on_monday() {
        let days = week_days(day(6));
        assert_eq!(days[0], day(3));
        assert_eq!(days[6], day(9));

        // a Sunday belongs to the week that started the Monday before
        assert_eq!(week_days(day(9))[0], day(3));
    }

    #[test]
    fn week_overview_counts_per_day() {
        let appointments = vec![
            appointment(1, day(3), t(9, 0), 30, AppointmentStatus::Scheduled),
            appointment(2, day(3), t(10, 0), 30, AppointmentStatus::Cancelled),
            appointment(3, day(5), t(9, 0), 30, AppointmentStatus::Completed),
        ];
        let blocks = vec![block(1, day(7), t(9, 0), t(10, 0))];

        let week = week_overview(day(5), &settings(), &appointments, &blocks);

        assert_eq!(week.len(), 7);
        assert_eq!((week[0].appointments, week[0].cancelled), (1, 1));
        assert_eq!(week[2].appointments, 1);
        assert!(week[4].blocked);
        assert!(!week[6].working_day);
    }

    #[test]
    fn month_markers_cover_appointments_and_multi_day_blocks() {
        let appointments = vec![
            appointment(1, day(3), t(9, 0), 30, AppointmentStatus::Scheduled),
            appointment(2, day(3), t(10, 0), 30, AppointmentStatus::Scheduled),
            appointment(3, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(), t(9, 0), 30, AppointmentStatus::Scheduled),
        ];
        let blocks = vec![ScheduleBlock {
            id: 1,
            starts_at: day(29).and_time(t(8, 0)),
            ends_at: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap().and_time(t(8, 0)),
            reason: None,
            created_by: None,
        }];

        let markers = month_markers(2024, 6, &appointments, &blocks);

        assert_eq!(markers.get(&day(3)), Some(&DayMarker { appointments: 2, blocked: false }));
        assert_eq!(markers.get(&day(29)).map(|m| m.blocked), Some(true));
        assert_eq!(markers.get(&day(30)).map(|m| m.blocked), Some(true));
        assert_eq!(markers.len(), 3);
    }
}
