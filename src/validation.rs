//! Form validation shared by the admin wizards and the public booking form.
//!
//! Each validator returns every problem in field order; screens show the
//! first one.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ClinicError;
use crate::models::{Category, Client, ClinicSettings, ScheduleBlock, Service};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Parses `HH:MM`, the format every time field uses.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M").ok()
}

/// Parses `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

/// First error as a `ClinicError::Validation`, if any.
pub fn first_error(errors: Vec<String>) -> Result<(), ClinicError> {
    match errors.into_iter().next() {
        Some(message) => Err(ClinicError::Validation(message)),
        None => Ok(()),
    }
}

fn contact_errors(name: &str, email: &str, phone: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push("Name is required".to_string());
    }
    if email.trim().is_empty() {
        errors.push("E-mail is required".to_string());
    } else if !is_valid_email(email) {
        errors.push("Invalid e-mail address".to_string());
    }
    if phone.trim().is_empty() {
        errors.push("Phone is required".to_string());
    }
    errors
}

pub fn validate_client(client: &Client) -> Vec<String> {
    contact_errors(&client.name, &client.email, &client.phone)
}

/// Contact details typed into the public booking form.
pub fn validate_booking_contact(name: &str, email: &str, phone: &str) -> Vec<String> {
    contact_errors(name, email, phone)
}

pub fn validate_service(service: &Service) -> Vec<String> {
    let mut errors = Vec::new();
    if service.title.trim().is_empty() {
        errors.push("Title is required".to_string());
    }
    if service.description.trim().is_empty() {
        errors.push("Description is required".to_string());
    }
    if !service.price.is_finite() || service.price < 0.0 {
        errors.push("Price must be zero or more".to_string());
    }
    if service.duration_minutes <= 0 {
        errors.push("Duration must be greater than zero".to_string());
    }
    errors
}

pub fn validate_category(category: &Category) -> Vec<String> {
    let mut errors = Vec::new();
    if category.name.trim().is_empty() {
        errors.push("Name is required".to_string());
    }
    if category.display_order < 0 {
        errors.push("Order must be zero or more".to_string());
    }
    errors
}

pub fn validate_settings(settings: &ClinicSettings) -> Vec<String> {
    let mut errors = Vec::new();
    if settings.clinic_name.trim().is_empty() {
        errors.push("Clinic name is required".to_string());
    }
    if settings.opening_time >= settings.closing_time {
        errors.push("Opening time must be before closing time".to_string());
    }
    if settings.booking_interval_minutes <= 0 {
        errors.push("Booking interval must be greater than zero".to_string());
    }
    if settings.working_days.iter().any(|d| !(0..=6).contains(d)) {
        errors.push("Working days must be between 0 (Sunday) and 6 (Saturday)".to_string());
    }
    if let Some(email) = settings.contact_email.as_deref() {
        if !email.trim().is_empty() && !is_valid_email(email) {
            errors.push("Invalid contact e-mail address".to_string());
        }
    }
    errors
}

pub fn validate_block(block: &ScheduleBlock) -> Vec<String> {
    let mut errors = Vec::new();
    if block.ends_at <= block.starts_at {
        errors.push("End time must be after start time".to_string());
    }
    errors
}
