use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[sqlx(type_name = "appointment_status", rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no-show",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::NoShow => "No-show",
        }
    }

    /// No further status changes are offered once an appointment is final.
    pub fn is_final(&self) -> bool {
        !matches!(self, AppointmentStatus::Scheduled)
    }

    /// Statuses that still occupy their slot on the calendar.
    pub fn occupies_slot(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Completed)
    }

    pub fn next(&self) -> Self {
        match self {
            AppointmentStatus::Scheduled => AppointmentStatus::Completed,
            AppointmentStatus::Completed => AppointmentStatus::Cancelled,
            AppointmentStatus::Cancelled => AppointmentStatus::NoShow,
            AppointmentStatus::NoShow => AppointmentStatus::Scheduled,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            "no-show" | "no_show" | "noshow" => Ok(AppointmentStatus::NoShow),
            other => Err(format!("unknown appointment status: {}", other)),
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: i32,
    pub client_id: i32,
    pub service_id: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl Appointment {
    pub fn new(client_id: i32, service_id: i32, date: NaiveDate, start_time: NaiveTime) -> Self {
        Self {
            id: 0,
            client_id,
            service_id,
            date,
            start_time,
            status: AppointmentStatus::Scheduled,
            notes: None,
        }
    }
}

/// An appointment joined with the client and service columns the screens show.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct AppointmentDetails {
    pub id: i32,
    pub client_id: i32,
    pub service_id: i32,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub service_title: String,
    pub service_price: f64,
    pub service_duration: i32,
}

impl AppointmentDetails {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.starts_at() + chrono::Duration::minutes(self.service_duration as i64)
    }

    pub fn appointment(&self) -> Appointment {
        Appointment {
            id: self.id,
            client_id: self.client_id,
            service_id: self.service_id,
            date: self.date,
            start_time: self.start_time,
            status: self.status,
            notes: self.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_its_own_names() {
        for status in AppointmentStatus::ALL {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
        assert_eq!("Canceled".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Cancelled));
        assert!("pending".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn only_scheduled_is_open() {
        assert!(!AppointmentStatus::Scheduled.is_final());
        assert!(AppointmentStatus::Completed.is_final());
        assert!(AppointmentStatus::Cancelled.is_final());
        assert!(AppointmentStatus::NoShow.is_final());
    }

    #[test]
    fn cancelled_and_no_show_free_the_slot() {
        assert!(AppointmentStatus::Scheduled.occupies_slot());
        assert!(AppointmentStatus::Completed.occupies_slot());
        assert!(!AppointmentStatus::Cancelled.occupies_slot());
        assert!(!AppointmentStatus::NoShow.occupies_slot());
    }
}
