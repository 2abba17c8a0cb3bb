//! The month view used to pick the selected date

use chrono::{Datelike, NaiveDate};

/// Weekday headers, the week starts on Monday
pub const WEEKDAYS: [&str; 7] = ["Lun", "Mar", "Mer", "Jeu", "Ven", "Sam", "Dim"];

const MONTH_NAMES: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin",
    "juillet", "août", "septembre", "octobre", "novembre", "décembre",
];

/// A cell of the month grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayCell {
    /// Padding before the first day of the month
    Blank,
    Day(u32),
}

/// A month grid, with an optional highlighted day.
///
/// Dates are plain calendar days: there is no time-of-day nor timezone to compensate for,
/// so the date reported for a click is exactly the day that has been clicked.
#[derive(Clone, Debug, PartialEq)]
pub struct DateSelector {
    /// First day of the displayed month
    visible_month: NaiveDate,
    selected_day: Option<u32>,
    mounted: bool,
}

impl DateSelector {
    /// Display the given month. Returns `None` for an invalid month
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let visible_month = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { visible_month, selected_day: None, mounted: false })
    }

    /// Display the month that contains `today`
    pub fn containing(today: NaiveDate) -> Self {
        Self {
            visible_month: first_of_month(today),
            selected_day: None,
            mounted: false,
        }
    }

    pub fn year(&self) -> i32                { self.visible_month.year()  }
    pub fn month(&self) -> u32               { self.visible_month.month() }
    pub fn selected_day(&self) -> Option<u32> { self.selected_day          }

    /// Called once, when the selector is first shown.
    ///
    /// If the displayed month is the current one, today is highlighted and returned so that it can be reported upward.
    /// Later calls return `None` and leave the highlight alone.
    pub fn mount(&mut self, today: NaiveDate) -> Option<NaiveDate> {
        if self.mounted {
            log::debug!("Date selector is already mounted");
            return None;
        }
        self.mounted = true;
        if today.year() == self.year() && today.month() == self.month() {
            self.selected_day = Some(today.day());
            Some(today)
        } else {
            None
        }
    }

    /// Number of days of the displayed month
    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    /// Number of blank cells before day 1
    pub fn leading_blanks(&self) -> u32 {
        self.visible_month.weekday().num_days_from_monday()
    }

    /// The grid, row by row (7 cells per row), without trailing padding
    pub fn cells(&self) -> Vec<DayCell> {
        let blanks = (0..self.leading_blanks()).map(|_| DayCell::Blank);
        let days = (1..=self.days_in_month()).map(DayCell::Day);
        blanks.chain(days).collect()
    }

    pub fn previous_month(&mut self) {
        let (year, month) = match self.month() {
            1 => (self.year() - 1, 12),
            m => (self.year(), m - 1),
        };
        self.show(year, month);
    }

    pub fn next_month(&mut self) {
        let (year, month) = match self.month() {
            12 => (self.year() + 1, 1),
            m => (self.year(), m + 1),
        };
        self.show(year, month);
    }

    fn show(&mut self, year: i32, month: u32) {
        match NaiveDate::from_ymd_opt(year, month, 1) {
            Some(first) => self.visible_month = first,
            None => log::warn!("Month {}-{} is out of the supported range", year, month),
        }
        self.selected_day = None;
    }

    /// Highlight a day of the displayed month and returns its date.
    ///
    /// Returns `None` (and changes nothing) if the month has no such day
    pub fn click_day(&mut self, day: u32) -> Option<NaiveDate> {
        let date = match NaiveDate::from_ymd_opt(self.year(), self.month(), day) {
            Some(d) => d,
            None => {
                log::warn!("There is no day {} in {}", day, self.title());
                return None;
            }
        };
        self.selected_day = Some(day);
        Some(date)
    }

    /// The month title, e.g. `mars 2024`
    pub fn title(&self) -> String {
        let name = MONTH_NAMES[self.month0()];
        format!("{} {}", name, self.year())
    }

    fn month0(&self) -> usize {
        self.visible_month.month0() as usize
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Number of days in a month, leap years included
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month_start = match month {
        12 => NaiveDate::from_ymd_opt(year + 1, 1, 1),
        m => NaiveDate::from_ymd_opt(year, m + 1, 1),
    };
    let last_day = next_month_start.and_then(|d| d.pred_opt());
    match last_day {
        Some(d) => d.day(),
        None => 31,
    }
}
