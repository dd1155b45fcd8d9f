use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A span of time in which no appointment can be booked.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct ScheduleBlock {
    pub id: i32,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub reason: Option<String>,
    pub created_by: Option<i32>,
}

impl ScheduleBlock {
    /// Start inclusive, end exclusive.
    pub fn covers(&self, date: NaiveDate, time: NaiveTime) -> bool {
        let at = date.and_time(time);
        self.starts_at <= at && at < self.ends_at
    }

    pub fn touches_day(&self, date: NaiveDate) -> bool {
        let day_start = date.and_time(NaiveTime::MIN);
        match date.succ_opt() {
            Some(next) => self.starts_at < next.and_time(NaiveTime::MIN) && self.ends_at > day_start,
            None => self.ends_at > day_start,
        }
    }

    pub fn reason_label(&self) -> &str {
        self.reason.as_deref().filter(|r| !r.trim().is_empty()).unwrap_or("Blocked")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(start: (u32, u32, u32), end: (u32, u32, u32)) -> ScheduleBlock {
        let at = |(d, h, m): (u32, u32, u32)| {
            NaiveDate::from_ymd_opt(2024, 5, d).unwrap().and_hms_opt(h, m, 0).unwrap()
        };
        ScheduleBlock {
            id: 1,
            starts_at: at(start),
            ends_at: at(end),
            reason: Some("Team meeting".into()),
            created_by: None,
        }
    }

    #[test]
    fn covers_is_start_inclusive_end_exclusive() {
        let b = block((10, 15, 0), (10, 17, 0));
        let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert!(b.covers(day, NaiveTime::from_hms_opt(15, 0, 0).unwrap()));
        assert!(b.covers(day, NaiveTime::from_hms_opt(16, 30, 0).unwrap()));
        assert!(!b.covers(day, NaiveTime::from_hms_opt(17, 0, 0).unwrap()));
        assert!(!b.covers(day, NaiveTime::from_hms_opt(14, 59, 0).unwrap()));
    }

    #[test]
    fn multi_day_block_touches_every_day_in_range() {
        let b = block((10, 12, 0), (12, 9, 0));
        for d in 10..=12 {
            assert!(b.touches_day(NaiveDate::from_ymd_opt(2024, 5, d).unwrap()));
        }
        assert!(!b.touches_day(NaiveDate::from_ymd_opt(2024, 5, 13).unwrap()));
        assert!(!b.touches_day(NaiveDate::from_ymd_opt(2024, 5, 9).unwrap()));
    }
}
