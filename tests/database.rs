//! Runs against a real PostgreSQL database when `TEST_DATABASE_URL` is set,
//! otherwise every test returns early.

use chrono::{Duration, NaiveDate, NaiveTime};
use uuid::Uuid;

use clinic_manager::booking::{book_appointment, BookingRequest};
use clinic_manager::config::Config;
use clinic_manager::db::Database;
use clinic_manager::error::ClinicError;
use clinic_manager::models::{Appointment, AppointmentStatus, Client, Service};
use clinic_manager::scheduling::AvailabilityCheck;

async fn database() -> Option<Database> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let config = Config::from_pairs(vec![("DATABASE_URL".to_string(), url)]).unwrap();
    let db = Database::new(&config).await.unwrap();
    db.migrate().await.unwrap();
    Some(db)
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn booking_cancel_and_history_round_trip() {
    let Some(db) = database().await else {
        return;
    };

    let tag = Uuid::new_v4().simple().to_string();
    // a Monday far enough ahead, spread out so runs do not collide
    let weeks = (Uuid::new_v4().as_u128() % 500) as i64;
    let date = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap() + Duration::weeks(weeks);

    let service_id = db
        .create_service(&Service {
            title: format!("Test peeling {}", tag),
            description: "integration test".into(),
            price: 80.0,
            duration_minutes: 60,
            ..Service::blank()
        })
        .await
        .unwrap();

    let request = BookingRequest {
        service_id,
        date,
        time: t(10, 0),
        name: "Test Client".into(),
        email: format!("{}@example.com", tag),
        phone: "555-0100".into(),
        notes: String::new(),
    };
    let confirmation = book_appointment(&db, &request).await.unwrap();
    assert!(confirmation.new_client);

    assert!(!db.is_available(date, t(10, 30), service_id, None).await.unwrap());
    assert!(db.is_available(date, t(11, 0), service_id, None).await.unwrap());
    // the appointment does not clash with itself when rescheduled
    assert!(db
        .is_available(date, t(10, 30), service_id, Some(confirmation.appointment.id))
        .await
        .unwrap());

    let clash = BookingRequest { time: t(10, 30), ..request.clone() };
    let err = book_appointment(&db, &clash).await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ClinicError>(),
        Some(&ClinicError::SlotUnavailable { date, time: t(10, 30) })
    );

    db.cancel_appointment(confirmation.appointment.id, Some("test over"))
        .await
        .unwrap();
    assert!(db.is_available(date, t(10, 30), service_id, None).await.unwrap());

    let history = db.client_history(confirmation.client.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, AppointmentStatus::Cancelled);
    assert_eq!(history[0].notes.as_deref(), Some("test over"));

    let err = db.delete_service(service_id).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ClinicError>(), Some(ClinicError::Validation(_))));

    db.delete_client(confirmation.client.id).await.unwrap();
    db.delete_service(service_id).await.unwrap();
}

#[tokio::test]
async fn settings_survive_an_update() {
    let Some(db) = database().await else {
        return;
    };

    let original = db.get_settings().await.unwrap();
    let mut changed = original.clone();
    changed.booking_interval_minutes = 45;
    changed.working_days = vec![1, 3, 5];
    db.update_settings(&changed).await.unwrap();

    let stored = db.get_settings().await.unwrap();
    assert_eq!(stored.booking_interval_minutes, 45);
    assert_eq!(stored.working_days, vec![1, 3, 5]);

    db.update_settings(&original).await.unwrap();
}

fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<ClinicError>(), Some(ClinicError::NotFound { .. }))
}

#[tokio::test]
async fn unknown_appointment_ids_are_reported() {
    let Some(db) = database().await else {
        return;
    };

    let missing = i32::MAX;
    assert!(is_not_found(&db.cancel_appointment(missing, Some("gone")).await.unwrap_err()));
    assert!(is_not_found(&db.complete_appointment(missing).await.unwrap_err()));
    assert!(is_not_found(&db.mark_no_show(missing).await.unwrap_err()));
    assert!(is_not_found(&db.delete_appointment(missing).await.unwrap_err()));

    let date = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();
    let mut ghost = Appointment::new(missing, missing, date, t(10, 0));
    ghost.id = missing;
    ghost.status = AppointmentStatus::Cancelled;
    assert!(is_not_found(&db.update_appointment(&ghost).await.unwrap_err()));
}

#[tokio::test]
async fn late_appointment_blocks_the_next_morning() {
    let Some(db) = database().await else {
        return;
    };

    let tag = Uuid::new_v4().simple().to_string();
    let weeks = (Uuid::new_v4().as_u128() % 500) as i64;
    let date = NaiveDate::from_ymd_opt(2031, 1, 6).unwrap() + Duration::weeks(weeks);
    let next_day = date + Duration::days(1);

    let service_id = db
        .create_service(&Service {
            title: format!("Test night massage {}", tag),
            description: "integration test".into(),
            price: 120.0,
            duration_minutes: 90,
            ..Service::blank()
        })
        .await
        .unwrap();
    let client_id = db
        .create_client(&Client {
            name: "Night Owl".into(),
            email: format!("{}@example.com", tag),
            phone: "555-0199".into(),
            ..Client::blank()
        })
        .await
        .unwrap();

    // 23:30 + 90 minutes runs until 01:00 the next day
    db.create_appointment(&Appointment::new(client_id, service_id, date, t(23, 30)))
        .await
        .unwrap();

    assert!(!db.is_available(next_day, t(0, 30), service_id, None).await.unwrap());
    assert!(db.is_available(next_day, t(1, 0), service_id, None).await.unwrap());
    assert!(!db.is_available(date, t(22, 30), service_id, None).await.unwrap());

    db.delete_client(client_id).await.unwrap();
    db.delete_service(service_id).await.unwrap();
}
