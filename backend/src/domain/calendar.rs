//! Hebrew calendar logic for the congregation tracker.
//!
//! This module owns the conversion kernel between the Hebrew calendar and
//! Gregorian dates, plus the date operations the rest of the domain builds
//! on: age calculation, day arithmetic, birthday projection, validation and
//! display formatting. The UI only renders; every date rule lives here.

use chrono::{Datelike, Local, NaiveDate};
use shared::HebrewDate;
use thiserror::Error;

use super::{gematria, sedra};

pub const NISAN: u32 = 1;
pub const IYAR: u32 = 2;
pub const SIVAN: u32 = 3;
pub const TAMMUZ: u32 = 4;
pub const AV: u32 = 5;
pub const ELUL: u32 = 6;
pub const TISHREI: u32 = 7;
pub const CHESHVAN: u32 = 8;
pub const KISLEV: u32 = 9;
pub const TEVET: u32 = 10;
pub const SHVAT: u32 = 11;
pub const ADAR_I: u32 = 12;
pub const ADAR_II: u32 = 13;

/// Fixed day number (days since 0001-01-01 CE, that day being 1) of the day
/// before 1 Tishrei of Hebrew year 1. `chrono`'s `num_days_from_ce` uses the
/// same day numbering, which makes the two calendars interoperate exactly.
const EPOCH: i64 = -1_373_428;

/// A date that does not exist in the Hebrew calendar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid Hebrew date: year {year}, month {month}, day {day}")]
    InvalidDate { year: i32, month: u32, day: u32 },
}

/// True for the 13-month years of the 19-year cycle.
pub(crate) fn is_leap_year(year: i32) -> bool {
    (7 * i64::from(year) + 1).rem_euclid(19) < 7
}

pub(crate) fn months_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        13
    } else {
        12
    }
}

/// Days from the calendar epoch to 1 Tishrei of `year`, with the molad
/// postponement rules applied.
fn elapsed_days(year: i32) -> i64 {
    let prev = i64::from(year) - 1;
    let months_elapsed =
        235 * prev.div_euclid(19) + 12 * prev.rem_euclid(19) + (prev.rem_euclid(19) * 7 + 1) / 19;
    let parts_elapsed = 204 + 793 * (months_elapsed % 1080);
    let hours_elapsed =
        5 + 12 * months_elapsed + 793 * (months_elapsed / 1080) + parts_elapsed / 1080;
    let conjunction_day = 1 + 29 * months_elapsed + hours_elapsed / 24;
    let conjunction_parts = 1080 * (hours_elapsed % 24) + parts_elapsed % 1080;

    let mut day = conjunction_day;
    if conjunction_parts >= 19440
        || (conjunction_day % 7 == 2 && conjunction_parts >= 9924 && !is_leap_year(year))
        || (conjunction_day % 7 == 1 && conjunction_parts >= 16789 && is_leap_year(year - 1))
    {
        day += 1;
    }
    // Rosh Hashana never falls on Sunday, Wednesday or Friday.
    if matches!(day % 7, 0 | 3 | 5) {
        day += 1;
    }
    day
}

fn new_year(year: i32) -> i64 {
    EPOCH + elapsed_days(year)
}

/// Length of the Hebrew year in days: 353-355, or 383-385 in leap years.
pub(crate) fn year_length(year: i32) -> i64 {
    elapsed_days(year + 1) - elapsed_days(year)
}

fn long_cheshvan(year: i32) -> bool {
    year_length(year) % 10 == 5
}

fn short_kislev(year: i32) -> bool {
    year_length(year) % 10 == 3
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        IYAR | TAMMUZ | ELUL | TEVET | ADAR_II => 29,
        ADAR_I if !is_leap_year(year) => 29,
        CHESHVAN if !long_cheshvan(year) => 29,
        KISLEV if short_kislev(year) => 29,
        _ => 30,
    }
}

/// Fixed day number of a Hebrew date. Total: an out-of-range month is
/// clamped to the year's last month and an overflowing day rolls into the
/// following month, so permissively-built dates still convert.
pub(crate) fn fixed_from_hebrew(date: &HebrewDate) -> i64 {
    let months = months_in_year(date.year);
    let month = date.month.clamp(NISAN, months);

    // The civil year runs Tishrei..Elul, so months Nisan..Elul sort after
    // the whole Tishrei-onward block of the same numbered year.
    let mut days = elapsed_days(date.year);
    if month < TISHREI {
        for m in TISHREI..=months {
            days += i64::from(days_in_month(date.year, m));
        }
        for m in NISAN..month {
            days += i64::from(days_in_month(date.year, m));
        }
    } else {
        for m in TISHREI..month {
            days += i64::from(days_in_month(date.year, m));
        }
    }

    EPOCH + days + i64::from(date.day) - 1
}

pub(crate) fn hebrew_from_fixed(fixed: i64) -> HebrewDate {
    // Mean-year estimate, then settle on the year containing `fixed`.
    let mut year = (((fixed - EPOCH) * 98_496).div_euclid(35_975_351) as i32).max(1);
    while year > 1 && new_year(year) > fixed {
        year -= 1;
    }
    while new_year(year + 1) <= fixed {
        year += 1;
    }

    let nisan_first = fixed_from_hebrew(&HebrewDate::new(year, NISAN, 1));
    let mut month = if fixed < nisan_first { TISHREI } else { NISAN };
    while fixed > fixed_from_hebrew(&HebrewDate::new(year, month, days_in_month(year, month))) {
        month += 1;
    }
    let day = (fixed - fixed_from_hebrew(&HebrewDate::new(year, month, 1)) + 1) as u32;

    HebrewDate::new(year, month, day)
}

/// All Hebrew calendar operations used by the domain services.
///
/// The service is stateless; "today" comes from the system clock, and every
/// operation that depends on it has an `_on` variant taking the reference
/// date explicitly.
#[derive(Clone, Default)]
pub struct HebrewCalendarService;

impl HebrewCalendarService {
    pub fn new() -> Self {
        Self
    }

    /// Current Hebrew date per the system clock.
    pub fn today(&self) -> HebrewDate {
        self.from_gregorian(Local::now().date_naive())
    }

    pub fn from_gregorian(&self, date: NaiveDate) -> HebrewDate {
        hebrew_from_fixed(i64::from(date.num_days_from_ce()))
    }

    pub fn to_gregorian(&self, date: &HebrewDate) -> NaiveDate {
        NaiveDate::from_num_days_from_ce_opt(fixed_from_hebrew(date) as i32).unwrap_or_default()
    }

    pub fn is_leap_year(&self, year: i32) -> bool {
        is_leap_year(year)
    }

    pub fn months_in_year(&self, year: i32) -> u32 {
        months_in_year(year)
    }

    pub fn days_in_month(&self, year: i32, month: u32) -> u32 {
        days_in_month(year, month)
    }

    /// Length of the Hebrew year in days.
    pub fn year_length(&self, year: i32) -> i64 {
        year_length(year)
    }

    /// Advance by a number of calendar days, rolling over months and years
    /// (leap months included) through the conversion kernel.
    pub fn add_days(&self, date: &HebrewDate, days: i64) -> HebrewDate {
        hebrew_from_fixed(fixed_from_hebrew(date) + days)
    }

    pub fn subtract_days(&self, date: &HebrewDate, days: i64) -> HebrewDate {
        self.add_days(date, -days)
    }

    /// Age in whole Hebrew years at `today`.
    ///
    /// The birthday-not-yet-reached adjustment compares (month, day) pairs
    /// numerically, not by calendar-day distance; around leap months that is
    /// an approximation, and it is the comparison the whole system uses.
    pub fn age_on(&self, birth: &HebrewDate, today: &HebrewDate) -> i32 {
        let mut age = today.year - birth.year;
        if (today.month, today.day) < (birth.month, birth.day) {
            age -= 1;
        }
        age
    }

    pub fn calculate_age(&self, birth: &HebrewDate) -> i32 {
        self.age_on(birth, &self.today())
    }

    pub fn is_older_than(&self, birth: &HebrewDate, years: i32) -> bool {
        self.calculate_age(birth) >= years
    }

    /// Next Gregorian occurrence of a Hebrew birthday on or after `today`:
    /// the birth (month, day) in the current Hebrew year, or in the next
    /// year when this year's occurrence has already passed.
    pub fn next_birthday_occurrence_from(&self, birth: &HebrewDate, today: NaiveDate) -> NaiveDate {
        let current_year = self.from_gregorian(today).year;
        let mut occurrence =
            self.to_gregorian(&HebrewDate::new(current_year, birth.month, birth.day));
        if occurrence < today {
            occurrence =
                self.to_gregorian(&HebrewDate::new(current_year + 1, birth.month, birth.day));
        }
        occurrence
    }

    /// Advisory check; constructors stay permissive and conversion clamps.
    pub fn validate(&self, date: &HebrewDate) -> Result<(), CalendarError> {
        let invalid = date.month < NISAN
            || date.month > months_in_year(date.year)
            || date.day < 1
            || date.day > days_in_month(date.year, date.month);
        if invalid {
            return Err(CalendarError::InvalidDate {
                year: date.year,
                month: date.month,
                day: date.day,
            });
        }
        Ok(())
    }

    pub fn is_valid(&self, date: &HebrewDate) -> bool {
        self.validate(date).is_ok()
    }

    /// Torah portion of the week containing this date: the reading of the
    /// Saturday on or after its Gregorian equivalent. Empty string when that
    /// Saturday carries a festival reading instead; never an error.
    pub fn parasha(&self, date: &HebrewDate) -> String {
        sedra::parasha_for(self.to_gregorian(date)).unwrap_or_default()
    }

    /// Render as "<day> <month> <year>" in Hebrew numerals, the display and
    /// sort form used throughout the application.
    pub fn format_hebrew_date(&self, date: &HebrewDate) -> String {
        format!(
            "{} {} {}",
            gematria::gematria(date.day),
            gematria::month_name(date.month),
            gematria::gematria(date.year.max(0) as u32),
        )
    }

    /// Plain "d/m/yyyy" rendering of a Gregorian date.
    pub fn format_gregorian(&self, date: NaiveDate) -> String {
        format!("{}/{}/{}", date.day(), date.month(), date.year())
    }
}
