use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveTime};

use super::AvailabilityCheck;
use crate::models::ClinicSettings;

/// Every bookable start time of `date`, before asking about availability.
///
/// Empty on days the clinic does not open. Times run from opening time in
/// steps of the booking interval and stay strictly before closing time.
pub fn candidate_slots(settings: &ClinicSettings, date: NaiveDate) -> Vec<NaiveTime> {
    if !settings.is_working_day(date) {
        return Vec::new();
    }

    time_grid(settings)
}

/// Opening time, then every interval after it, while before closing time.
/// Stops rather than wrapping past midnight.
pub(crate) fn time_grid(settings: &ClinicSettings) -> Vec<NaiveTime> {
    if settings.booking_interval_minutes <= 0 {
        return Vec::new();
    }

    let step = Duration::minutes(settings.booking_interval_minutes as i64);
    let mut slots = Vec::new();
    let mut time = settings.opening_time;

    while time < settings.closing_time {
        slots.push(time);
        let (next, wrapped) = time.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        time = next;
    }

    slots
}

/// Candidate slots the checker accepts for `service_id`, in order.
pub async fn available_slots<C>(
    checker: &C,
    settings: &ClinicSettings,
    date: NaiveDate,
    service_id: i32,
) -> Result<Vec<NaiveTime>>
where
    C: AvailabilityCheck + Sync + ?Sized,
{
    let mut available = Vec::new();

    for time in candidate_slots(settings, date) {
        if checker.is_available(date, time, service_id, None).await? {
            available.push(time);
        }
    }

    tracing::debug!(%date, service_id, count = available.len(), "available slots computed");
    Ok(available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    // 2024-06-03 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn settings(open: NaiveTime, close: NaiveTime, interval: i32) -> ClinicSettings {
        ClinicSettings {
            opening_time: open,
            closing_time: close,
            booking_interval_minutes: interval,
            ..ClinicSettings::default()
        }
    }

    #[test]
    fn slots_step_from_opening_until_before_closing() {
        let slots = candidate_slots(&settings(t(9, 0), t(11, 0), 30), monday());
        assert_eq!(slots, vec![t(9, 0), t(9, 30), t(10, 0), t(10, 30)]);
    }

    #[test]
    fn closing_time_not_on_the_grid_still_bounds_the_slots() {
        let slots = candidate_slots(&settings(t(9, 0), t(10, 10), 45), monday());
        assert_eq!(slots, vec![t(9, 0), t(9, 45)]);
    }

    #[test]
    fn non_working_day_has_no_slots() {
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert!(candidate_slots(&settings(t(9, 0), t(18, 0), 30), sunday).is_empty());
    }

    #[test]
    fn zero_interval_yields_nothing() {
        assert!(candidate_slots(&settings(t(9, 0), t(18, 0), 0), monday()).is_empty());
    }

    #[test]
    fn closing_before_opening_yields_nothing() {
        assert!(candidate_slots(&settings(t(18, 0), t(9, 0), 30), monday()).is_empty());
    }

    #[test]
    fn late_closing_does_not_wrap_past_midnight() {
        let slots = candidate_slots(&settings(t(23, 0), t(23, 59), 40), monday());
        assert_eq!(slots, vec![t(23, 0), t(23, 40)]);
    }

    struct BusyAt {
        busy: Vec<NaiveTime>,
        calls: Mutex<Vec<(NaiveTime, i32)>>,
    }

    #[async_trait]
    impl AvailabilityCheck for BusyAt {
        async fn is_available(
            &self,
            _date: NaiveDate,
            time: NaiveTime,
            service_id: i32,
            exclude: Option<i32>,
        ) -> Result<bool> {
            assert!(exclude.is_none());
            self.calls.lock().unwrap().push((time, service_id));
            Ok(!self.busy.contains(&time))
        }
    }

    #[tokio::test]
    async fn available_slots_keeps_only_accepted_candidates() {
        let checker = BusyAt {
            busy: vec![t(9, 30), t(10, 30)],
            calls: Mutex::new(Vec::new()),
        };
        let slots = available_slots(&checker, &settings(t(9, 0), t(11, 0), 30), monday(), 4)
            .await
            .unwrap();

        assert_eq!(slots, vec![t(9, 0), t(10, 0)]);
        let calls = checker.calls.lock().unwrap();
        assert_eq!(calls.len(), 4);
        assert!(calls.iter().all(|(_, service)| *service == 4));
    }

    #[tokio::test]
    async fn closed_day_never_asks_the_checker() {
        let checker = BusyAt {
            busy: Vec::new(),
            calls: Mutex::new(Vec::new()),
        };
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let slots = available_slots(&checker, &settings(t(9, 0), t(18, 0), 30), sunday, 1)
            .await
            .unwrap();

        assert!(slots.is_empty());
        assert!(checker.calls.lock().unwrap().is_empty());
    }

    struct Failing;

    #[async_trait]
    impl AvailabilityCheck for Failing {
        async fn is_available(&self, _: NaiveDate, _: NaiveTime, _: i32, _: Option<i32>) -> Result<bool> {
            anyhow::bail!("connection reset")
        }
    }

    #[tokio::test]
    async fn checker_errors_propagate() {
        let result = available_slots(&Failing, &settings(t(9, 0), t(10, 0), 30), monday(), 1).await;
        assert!(result.is_err());
    }
}
