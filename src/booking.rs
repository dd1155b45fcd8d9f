use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::db::Database;
use crate::models::{Appointment, AppointmentStatus, Client};
use crate::validation::{first_error, validate_booking_contact};

/// What the public booking wizard collects.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub service_id: i32,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
}

impl BookingRequest {
    fn notes(&self) -> Option<String> {
        let notes = self.notes.trim();
        (!notes.is_empty()).then(|| notes.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmation {
    pub appointment: Appointment,
    pub client: Client,
    pub new_client: bool,
}

#[async_trait]
pub trait BookingStore {
    async fn find_client_by_email(&self, email: &str) -> Result<Option<Client>>;
    async fn create_client(&self, client: &Client) -> Result<i32>;
    /// Must refuse a slot the availability check rejects.
    async fn create_appointment(&self, appointment: &Appointment) -> Result<i32>;
}

#[async_trait]
impl BookingStore for Database {
    async fn find_client_by_email(&self, email: &str) -> Result<Option<Client>> {
        Database::find_client_by_email(self, email).await
    }

    async fn create_client(&self, client: &Client) -> Result<i32> {
        Database::create_client(self, client).await
    }

    async fn create_appointment(&self, appointment: &Appointment) -> Result<i32> {
        Database::create_appointment(self, appointment).await
    }
}

/// Books a slot from the public form.
///
/// A client with the same e-mail is reused, otherwise one is created from
/// the contact details. The appointment starts as `scheduled`.
pub async fn book_appointment<S>(store: &S, request: &BookingRequest) -> Result<BookingConfirmation>
where
    S: BookingStore + Sync + ?Sized,
{
    first_error(validate_booking_contact(&request.name, &request.email, &request.phone))?;

    let (client, new_client) = match store.find_client_by_email(&request.email).await? {
        Some(existing) => (existing, false),
        None => {
            let mut client = Client {
                name: request.name.trim().to_string(),
                email: request.email.trim().to_string(),
                phone: request.phone.trim().to_string(),
                notes: request.notes(),
                ..Client::blank()
            };
            client.id = store.create_client(&client).await?;
            (client, true)
        }
    };

    let mut appointment = Appointment::new(client.id, request.service_id, request.date, request.time);
    appointment.status = AppointmentStatus::Scheduled;
    appointment.notes = request.notes();
    appointment.id = store.create_appointment(&appointment).await?;

    tracing::info!(
        appointment_id = appointment.id,
        client_id = client.id,
        new_client,
        "online booking confirmed"
    );

    Ok(BookingConfirmation {
        appointment,
        client,
        new_client,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClinicError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        clients: Mutex<Vec<Client>>,
        appointments: Mutex<Vec<Appointment>>,
        taken: Vec<NaiveTime>,
    }

    #[async_trait]
    impl BookingStore for MemoryStore {
        async fn find_client_by_email(&self, email: &str) -> Result<Option<Client>> {
            let clients = self.clients.lock().unwrap();
            Ok(clients.iter().find(|c| c.email.eq_ignore_ascii_case(email.trim())).cloned())
        }

        async fn create_client(&self, client: &Client) -> Result<i32> {
            let mut clients = self.clients.lock().unwrap();
            let mut stored = client.clone();
            stored.id = clients.len() as i32 + 1;
            clients.push(stored);
            Ok(clients.len() as i32)
        }

        async fn create_appointment(&self, appointment: &Appointment) -> Result<i32> {
            if self.taken.contains(&appointment.start_time) {
                return Err(ClinicError::SlotUnavailable {
                    date: appointment.date,
                    time: appointment.start_time,
                }
                .into());
            }
            let mut appointments = self.appointments.lock().unwrap();
            appointments.push(appointment.clone());
            Ok(appointments.len() as i32 + 100)
        }
    }

    fn request(email: &str, hour: u32) -> BookingRequest {
        BookingRequest {
            service_id: 3,
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            name: " Ana Silva ".into(),
            email: email.into(),
            phone: "(11) 98765-4321".into(),
            notes: "  ".into(),
        }
    }

    #[tokio::test]
    async fn first_booking_creates_client_and_appointment() {
        let store = MemoryStore::default();

        let confirmation = book_appointment(&store, &request("ana@example.com", 10)).await.unwrap();

        assert!(confirmation.new_client);
        assert_eq!(confirmation.client.id, 1);
        assert_eq!(confirmation.client.name, "Ana Silva");
        assert_eq!(confirmation.client.notes, None);
        assert_eq!(confirmation.appointment.id, 101);
        assert_eq!(confirmation.appointment.client_id, 1);
        assert_eq!(confirmation.appointment.status, AppointmentStatus::Scheduled);
    }

    #[tokio::test]
    async fn returning_client_is_matched_by_email() {
        let store = MemoryStore::default();
        book_appointment(&store, &request("ana@example.com", 10)).await.unwrap();

        let second = book_appointment(&store, &request("ANA@example.com", 11)).await.unwrap();

        assert!(!second.new_client);
        assert_eq!(second.client.id, 1);
        assert_eq!(store.clients.lock().unwrap().len(), 1);
        assert_eq!(store.appointments.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invalid_contact_stops_before_touching_the_store() {
        let store = MemoryStore::default();

        let err = book_appointment(&store, &request("ana-at-example", 10)).await.unwrap_err();

        assert_eq!(
            err.downcast::<ClinicError>().unwrap(),
            ClinicError::Validation("Invalid e-mail address".into())
        );
        assert!(store.clients.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn taken_slot_is_reported() {
        let store = MemoryStore {
            taken: vec![NaiveTime::from_hms_opt(10, 0, 0).unwrap()],
            ..MemoryStore::default()
        };

        let err = book_appointment(&store, &request("ana@example.com", 10)).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::SlotUnavailable { .. })
        ));
        assert!(store.appointments.lock().unwrap().is_empty());
    }
}
