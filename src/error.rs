use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Domain failures that the UI turns into notifications.
#[derive(Debug, Error, PartialEq)]
pub enum ClinicError {
    #[error("{0}")]
    Validation(String),

    #[error("The time {} on {} is not available", short_time(.time), short_date(.date))]
    SlotUnavailable { date: NaiveDate, time: NaiveTime },

    #[error("The clinic is closed on {0}")]
    ClinicClosed(NaiveDate),

    #[error("Invalid credentials. Check your e-mail and password.")]
    InvalidCredentials,

    #[error("This account is disabled")]
    InactiveAccount,

    #[error("Your session has expired, please log in again")]
    SessionExpired,

    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: i32 },
}

fn short_time(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn short_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_unavailable_message_uses_short_formats() {
        let err = ClinicError::SlotUnavailable {
            date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
        };
        assert_eq!(err.to_string(), "The time 14:30 on 2024-03-08 is not available");
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = ClinicError::NotFound { entity: "Service", id: 7 };
        assert_eq!(err.to_string(), "Service #7 not found");
    }
}
