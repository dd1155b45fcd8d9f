use chrono::{Datelike, Duration, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// A date typed part by part (`YYYY`, `MM`, `DD`) or stepped a day at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct DateInput {
    pub date: NaiveDate,
    pub editing: bool,
    pub part: DatePart,
    buffer: String,
    /// Earliest date the input accepts.
    min: Option<NaiveDate>,
}

impl DateInput {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            part: DatePart::Day,
            buffer: String::new(),
            min: None,
        }
    }

    pub fn not_before(mut self, min: NaiveDate) -> Self {
        self.min = Some(min);
        self.date = self.date.max(min);
        self
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        self.part = DatePart::Day;
        self.buffer.clear();
    }

    pub fn set(&mut self, date: NaiveDate) -> bool {
        let date = match self.min {
            Some(min) => date.max(min),
            None => date,
        };
        let changed = date != self.date;
        self.date = date;
        changed
    }

    pub fn shift_days(&mut self, days: i64) -> bool {
        match self.date.checked_add_signed(Duration::days(days)) {
            Some(date) => self.set(date),
            None => false,
        }
    }

    fn next_part(&mut self) {
        self.part = match self.part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.buffer.clear();
    }

    fn previous_part(&mut self) {
        self.part = match self.part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.buffer.clear();
    }

    /// Typing while editing. Returns whether the date changed.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        if !self.editing {
            return false;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                let width = if self.part == DatePart::Year { 4 } else { 2 };
                if self.buffer.len() < width {
                    return false;
                }
                let typed = std::mem::take(&mut self.buffer);
                let (year, month, day) = (self.date.year(), self.date.month(), self.date.day());
                let candidate = match self.part {
                    DatePart::Year => typed
                        .parse::<i32>()
                        .ok()
                        .filter(|y| (1900..=2100).contains(y))
                        .and_then(|y| NaiveDate::from_ymd_opt(y, month, day.min(days_in_month(y, month)))),
                    DatePart::Month => typed
                        .parse::<u32>()
                        .ok()
                        .and_then(|m| NaiveDate::from_ymd_opt(year, m, day.min(days_in_month(year, m)))),
                    DatePart::Day => typed
                        .parse::<u32>()
                        .ok()
                        .and_then(|d| NaiveDate::from_ymd_opt(year, month, d)),
                };
                match candidate {
                    Some(date) => self.set(date),
                    None => false,
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                false
            }
            KeyCode::Right | KeyCode::Tab => {
                self.next_part();
                false
            }
            KeyCode::Left | KeyCode::BackTab => {
                self.previous_part();
                false
            }
            _ => false,
        }
    }

    pub fn display(&self) -> String {
        let date = self.date.format("%Y-%m-%d").to_string();
        if !self.editing {
            return format!("{} ({})", date, self.date.format("%a"));
        }

        let marker = if self.buffer.is_empty() {
            match self.part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        } else {
            format!("[{}]", self.buffer)
        };
        let (year, month, day) = (
            self.date.format("%Y").to_string(),
            self.date.format("%m").to_string(),
            self.date.format("%d").to_string(),
        );
        match self.part {
            DatePart::Year => format!("{}{}-{}-{}", year, marker, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, marker, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, marker),
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).map(|d| d.day()).unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn type_digits(input: &mut DateInput, digits: &str) {
        for c in digits.chars() {
            input.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_day_month_and_year() {
        let mut input = DateInput::new(d(2024, 6, 3));
        input.toggle_editing();

        type_digits(&mut input, "15");
        assert_eq!(input.date, d(2024, 6, 15));

        input.handle_key(KeyCode::Left);
        type_digits(&mut input, "02");
        assert_eq!(input.date, d(2024, 2, 15));

        input.handle_key(KeyCode::Left);
        type_digits(&mut input, "2025");
        assert_eq!(input.date, d(2025, 2, 15));
    }

    #[test]
    fn month_change_clamps_the_day() {
        let mut input = DateInput::new(d(2024, 1, 31));
        input.toggle_editing();
        input.handle_key(KeyCode::Left);
        type_digits(&mut input, "02");
        assert_eq!(input.date, d(2024, 2, 29));
    }

    #[test]
    fn invalid_day_is_ignored() {
        let mut input = DateInput::new(d(2024, 4, 10));
        input.toggle_editing();
        type_digits(&mut input, "31");
        assert_eq!(input.date, d(2024, 4, 10));
    }

    #[test]
    fn keys_are_ignored_unless_editing() {
        let mut input = DateInput::new(d(2024, 4, 10));
        assert!(!input.handle_key(KeyCode::Char('1')));
        assert_eq!(input.display(), "2024-04-10 (Wed)");
    }

    #[test]
    fn minimum_date_is_enforced() {
        let today = d(2024, 6, 3);
        let mut input = DateInput::new(d(2024, 6, 1)).not_before(today);
        assert_eq!(input.date, today);
        assert!(!input.shift_days(-1));
        assert!(input.shift_days(1));
        assert_eq!(input.date, d(2024, 6, 4));
    }

    #[test]
    fn display_marks_the_part_being_typed() {
        let mut input = DateInput::new(d(2024, 6, 3));
        input.toggle_editing();
        assert_eq!(input.display(), "2024-06-03[DD]");
        input.handle_key(KeyCode::Char('1'));
        assert_eq!(input.display(), "2024-06-03[1]");
    }
}
