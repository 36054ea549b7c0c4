use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Segmented date input: year, month and day are typed one part at a time and
/// only in-range values are committed to the stored date.
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    part: DatePart,
    buffer: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            part: DatePart::Year,
            buffer: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.part = DatePart::Year;
            self.buffer.clear();
        }
    }

    pub fn next_part(&mut self) {
        self.part = match self.part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.buffer.clear();
    }

    pub fn previous_part(&mut self) {
        self.part = match self.part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.buffer.clear();
    }

    /// Returns true when the stored date changed.
    pub fn handle_input(&mut self, key: KeyCode) -> bool {
        if !self.editing {
            return false;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                self.try_commit()
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                false
            }
            KeyCode::Right => {
                self.next_part();
                false
            }
            KeyCode::Left => {
                self.previous_part();
                false
            }
            _ => false,
        }
    }

    /// Commit the buffer once a part is fully typed. Out-of-range parts and
    /// impossible calendar dates (e.g. February 30th) are discarded.
    fn try_commit(&mut self) -> bool {
        let complete = match self.part {
            DatePart::Year => self.buffer.len() == 4,
            DatePart::Month | DatePart::Day => self.buffer.len() == 2,
        };
        if !complete {
            return false;
        }

        let committed = match self.part {
            DatePart::Year => self
                .buffer
                .parse::<i32>()
                .ok()
                .filter(|year| (1900..=2100).contains(year))
                .and_then(|year| NaiveDate::from_ymd_opt(year, self.date.month(), self.date.day())),
            DatePart::Month => self
                .buffer
                .parse::<u32>()
                .ok()
                .and_then(|month| NaiveDate::from_ymd_opt(self.date.year(), month, self.date.day())),
            DatePart::Day => self
                .buffer
                .parse::<u32>()
                .ok()
                .and_then(|day| NaiveDate::from_ymd_opt(self.date.year(), self.date.month(), day)),
        };
        self.buffer.clear();

        match committed {
            Some(date) => {
                self.date = date;
                true
            }
            None => false,
        }
    }

    /// The committed value in the form's wire format.
    pub fn value_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// The value with an edit marker on the active part while editing.
    pub fn display_string(&self) -> String {
        if !self.editing {
            return self.value_string();
        }

        let pending = if self.buffer.is_empty() {
            match self.part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        } else {
            format!("[{}]", self.buffer)
        };

        let (year, month, day) = (self.date.year(), self.date.month(), self.date.day());
        match self.part {
            DatePart::Year => format!("{}{}-{:02}-{:02}", year, pending, month, day),
            DatePart::Month => format!("{}-{:02}{}-{:02}", year, month, pending, day),
            DatePart::Day => format!("{}-{:02}-{:02}{}", year, month, day, pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DateInputState {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        state.toggle_editing();
        state
    }

    fn type_digits(state: &mut DateInputState, digits: &str) -> bool {
        digits
            .chars()
            .map(|c| state.handle_input(KeyCode::Char(c)))
            .last()
            .unwrap_or(false)
    }

    #[test]
    fn typing_a_full_year_commits_it() {
        let mut state = state();
        assert!(type_digits(&mut state, "2023"));
        assert_eq!(state.value_string(), "2023-03-15");
    }

    #[test]
    fn out_of_range_month_is_discarded() {
        let mut state = state();
        state.next_part();
        assert!(!type_digits(&mut state, "13"));
        assert_eq!(state.value_string(), "2024-03-15");
    }

    #[test]
    fn impossible_calendar_date_is_discarded() {
        let mut state = state();
        state.next_part();
        assert!(type_digits(&mut state, "02"));
        state.next_part();
        assert!(!type_digits(&mut state, "30"));
        assert_eq!(state.value_string(), "2024-02-15");
    }

    #[test]
    fn display_marks_the_active_part() {
        let state = state();
        assert_eq!(state.display_string(), "2024[YYYY]-03-15");
    }

    #[test]
    fn input_is_ignored_when_not_editing() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert!(!type_digits(&mut state, "1999"));
        assert_eq!(state.value_string(), "2024-03-15");
    }
}
