//! Booking and slot lookup against an in-memory agenda with the same
//! overlap rules as the `check_slot_availability` database function.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use pretty_assertions::assert_eq;

use clinic_manager::booking::{book_appointment, BookingRequest, BookingStore};
use clinic_manager::error::ClinicError;
use clinic_manager::models::{Appointment, Client, ClinicSettings, ScheduleBlock};
use clinic_manager::scheduling::{available_slots, AvailabilityCheck};

struct Agenda {
    durations: HashMap<i32, i64>,
    blocks: Vec<ScheduleBlock>,
    clients: Mutex<Vec<Client>>,
    appointments: Mutex<Vec<Appointment>>,
}

impl Agenda {
    fn new() -> Self {
        Self {
            durations: HashMap::from([(1, 60), (2, 30)]),
            blocks: Vec::new(),
            clients: Mutex::new(Vec::new()),
            appointments: Mutex::new(Vec::new()),
        }
    }

    fn span(&self, date: NaiveDate, time: NaiveTime, service_id: i32) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let minutes = *self.durations.get(&service_id)?;
        let start = date.and_time(time);
        Some((start, start + Duration::minutes(minutes)))
    }
}

#[async_trait]
impl AvailabilityCheck for Agenda {
    async fn is_available(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        service_id: i32,
        exclude_appointment: Option<i32>,
    ) -> Result<bool> {
        let Some((start, end)) = self.span(date, time, service_id) else {
            return Ok(false);
        };

        let appointments = self.appointments.lock().unwrap();
        let clash = appointments
            .iter()
            .filter(|a| a.status.occupies_slot() && Some(a.id) != exclude_appointment)
            .filter_map(|a| self.span(a.date, a.start_time, a.service_id))
            .any(|(s, e)| s < end && e > start);
        let blocked = self.blocks.iter().any(|b| b.starts_at < end && b.ends_at > start);

        Ok(!clash && !blocked)
    }
}

#[async_trait]
impl BookingStore for Agenda {
    async fn find_client_by_email(&self, email: &str) -> Result<Option<Client>> {
        let clients = self.clients.lock().unwrap();
        Ok(clients.iter().find(|c| c.email.eq_ignore_ascii_case(email.trim())).cloned())
    }

    async fn create_client(&self, client: &Client) -> Result<i32> {
        let mut clients = self.clients.lock().unwrap();
        let id = clients.len() as i32 + 1;
        clients.push(Client { id, ..client.clone() });
        Ok(id)
    }

    async fn create_appointment(&self, appointment: &Appointment) -> Result<i32> {
        if !self
            .is_available(appointment.date, appointment.start_time, appointment.service_id, None)
            .await?
        {
            return Err(ClinicError::SlotUnavailable {
                date: appointment.date,
                time: appointment.start_time,
            }
            .into());
        }
        let mut appointments = self.appointments.lock().unwrap();
        let id = appointments.len() as i32 + 1;
        appointments.push(Appointment { id, ..appointment.clone() });
        Ok(id)
    }
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

fn morning() -> ClinicSettings {
    ClinicSettings {
        opening_time: t(9, 0),
        closing_time: t(12, 0),
        booking_interval_minutes: 30,
        ..ClinicSettings::default()
    }
}

fn request(service_id: i32, time: NaiveTime, email: &str) -> BookingRequest {
    BookingRequest {
        service_id,
        date: monday(),
        time,
        name: "Ana Silva".into(),
        email: email.into(),
        phone: "555-0101".into(),
        notes: String::new(),
    }
}

#[tokio::test]
async fn booked_hour_disappears_from_the_slot_list() {
    let agenda = Agenda::new();
    book_appointment(&agenda, &request(1, t(10, 0), "ana@example.com")).await.unwrap();

    let slots = available_slots(&agenda, &morning(), monday(), 2).await.unwrap();

    assert_eq!(slots, vec![t(9, 0), t(9, 30), t(11, 0), t(11, 30)]);
}

#[tokio::test]
async fn long_service_cannot_start_right_before_a_booking() {
    let agenda = Agenda::new();
    book_appointment(&agenda, &request(2, t(10, 0), "ana@example.com")).await.unwrap();

    let slots = available_slots(&agenda, &morning(), monday(), 1).await.unwrap();

    // 09:30 would still be running at 10:00
    assert_eq!(slots, vec![t(9, 0), t(10, 30), t(11, 0), t(11, 30)]);
}

#[tokio::test]
async fn second_booking_on_the_same_time_is_refused() {
    let agenda = Agenda::new();
    book_appointment(&agenda, &request(1, t(9, 0), "ana@example.com")).await.unwrap();

    let err = book_appointment(&agenda, &request(2, t(9, 30), "bruno@example.com"))
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<ClinicError>(),
        Some(&ClinicError::SlotUnavailable { date: monday(), time: t(9, 30) })
    );
    // the new client was stored before the slot was refused
    assert_eq!(agenda.clients.lock().unwrap().len(), 2);
    assert_eq!(agenda.appointments.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn blocks_and_closed_days_have_no_slots() {
    let mut agenda = Agenda::new();
    agenda.blocks.push(ScheduleBlock {
        id: 1,
        starts_at: monday().and_time(t(9, 0)),
        ends_at: monday().and_time(t(11, 0)),
        reason: Some("Training".into()),
        created_by: None,
    });

    let slots = available_slots(&agenda, &morning(), monday(), 2).await.unwrap();
    assert_eq!(slots, vec![t(11, 0), t(11, 30)]);

    let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
    assert!(available_slots(&agenda, &morning(), sunday, 2).await.unwrap().is_empty());
}
