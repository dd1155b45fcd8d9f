use chrono::{Datelike, NaiveDate, NaiveTime};

/// The single clinic configuration row.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct ClinicSettings {
    pub id: i32,
    pub clinic_name: String,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    /// 0 = Sunday through 6 = Saturday.
    pub working_days: Vec<i32>,
    pub booking_interval_minutes: i32,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub whatsapp: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
}

pub const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

impl Default for ClinicSettings {
    fn default() -> Self {
        Self {
            id: 0,
            clinic_name: "Esthetic Clinic".to_string(),
            opening_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            closing_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            working_days: vec![1, 2, 3, 4, 5, 6],
            booking_interval_minutes: 30,
            contact_email: None,
            contact_phone: None,
            whatsapp: None,
            instagram: None,
            facebook: None,
            address: None,
            logo_url: None,
        }
    }
}

impl ClinicSettings {
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday().num_days_from_sunday() as i32;
        self.working_days.contains(&weekday)
    }

    pub fn toggle_working_day(&mut self, day: i32) {
        if !(0..=6).contains(&day) {
            return;
        }
        if let Some(pos) = self.working_days.iter().position(|d| *d == day) {
            self.working_days.remove(pos);
        } else {
            self.working_days.push(day);
            self.working_days.sort_unstable();
        }
    }

    pub fn working_days_label(&self) -> String {
        let names: Vec<&str> = self
            .working_days
            .iter()
            .filter_map(|d| WEEKDAY_NAMES.get(*d as usize).copied())
            .collect();
        if names.is_empty() {
            "closed every day".to_string()
        } else {
            names.join(", ")
        }
    }

    pub fn hours_label(&self) -> String {
        format!(
            "{} - {}",
            self.opening_time.format("%H:%M"),
            self.closing_time.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_day_uses_sunday_zero() {
        let settings = ClinicSettings::default();
        // 2024-06-02 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert!(!settings.is_working_day(sunday));
        assert!(settings.is_working_day(sunday.succ_opt().unwrap()));
    }

    #[test]
    fn toggling_keeps_days_sorted_and_ignores_out_of_range() {
        let mut settings = ClinicSettings::default();
        settings.toggle_working_day(0);
        assert_eq!(settings.working_days, vec![0, 1, 2, 3, 4, 5, 6]);
        settings.toggle_working_day(3);
        assert_eq!(settings.working_days, vec![0, 1, 2, 4, 5, 6]);
        settings.toggle_working_day(9);
        assert_eq!(settings.working_days, vec![0, 1, 2, 4, 5, 6]);
        assert_eq!(settings.working_days_label(), "Sun, Mon, Tue, Thu, Fri, Sat");
    }
}
