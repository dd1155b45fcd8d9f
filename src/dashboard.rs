use chrono::{Datelike, NaiveDate};

use crate::models::{AppointmentDetails, AppointmentStatus};

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_clients: i64,
    pub active_services: i64,
    pub scheduled_today: i64,
    pub scheduled_upcoming: i64,
    pub completed: i64,
    pub cancelled: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySummary {
    /// Sum of completed appointment prices.
    pub revenue: f64,
    pub total: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub average_ticket: f64,
}

impl MonthlySummary {
    pub fn from_appointments(appointments: &[AppointmentDetails]) -> Self {
        let mut summary = MonthlySummary {
            total: appointments.len(),
            ..MonthlySummary::default()
        };

        for appointment in appointments {
            match appointment.status {
                AppointmentStatus::Completed => {
                    summary.completed += 1;
                    summary.revenue += appointment.service_price;
                }
                AppointmentStatus::Cancelled => summary.cancelled += 1,
                _ => {}
            }
        }

        if summary.completed > 0 {
            summary.average_ticket = summary.revenue / summary.completed as f64;
        }
        summary
    }
}

/// First and last day of the month containing `date`.
pub fn month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month.and_then(|d| d.pred_opt()).unwrap_or(first);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;

    fn appointment(status: AppointmentStatus, price: f64) -> AppointmentDetails {
        AppointmentDetails {
            id: 1,
            client_id: 1,
            service_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            status,
            notes: None,
            client_name: "Ana".into(),
            client_email: "ana@example.com".into(),
            client_phone: "555".into(),
            service_title: "Peeling".into(),
            service_price: price,
            service_duration: 60,
        }
    }

    #[test]
    fn revenue_counts_only_completed_appointments() {
        let appointments = vec![
            appointment(AppointmentStatus::Completed, 150.0),
            appointment(AppointmentStatus::Completed, 250.0),
            appointment(AppointmentStatus::Cancelled, 300.0),
            appointment(AppointmentStatus::Scheduled, 80.0),
            appointment(AppointmentStatus::NoShow, 80.0),
        ];

        let summary = MonthlySummary::from_appointments(&appointments);

        assert_eq!(
            summary,
            MonthlySummary {
                revenue: 400.0,
                total: 5,
                completed: 2,
                cancelled: 1,
                average_ticket: 200.0,
            }
        );
    }

    #[test]
    fn empty_month_has_zero_average() {
        assert_eq!(MonthlySummary::from_appointments(&[]), MonthlySummary::default());
    }

    #[test]
    fn month_range_handles_december_and_leap_years() {
        let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(month_range(d(2024, 2, 14)), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(month_range(d(2023, 12, 31)), (d(2023, 12, 1), d(2023, 12, 31)));
    }
}
