//! Weekly Torah-portion schedule.
//!
//! The reading cycle runs from the Shabbat after Simchat Torah to the next
//! one. Within a cycle the portions are read in order, skipping Shabbatot
//! that carry a festival reading, and enough adjacent pairs are combined for
//! the remaining portions to land exactly on the open Shabbatot. Which pairs
//! combine follows from the year's shape (leap or common, its length, the
//! weekday of Rosh Hashana); the diaspora festival calendar is used, as the
//! congregation's existing reports do.

use chrono::{Datelike, NaiveDate};
use shared::HebrewDate;

use super::calendar;

/// The 53 portions read on regular Shabbatot, Bereshit through Ha'azinu.
/// Vezot Haberakhah is read on Simchat Torah and never takes a Shabbat.
const PORTIONS: [&str; 53] = [
    "בראשית",
    "נח",
    "לך לך",
    "וירא",
    "חיי שרה",
    "תולדות",
    "ויצא",
    "וישלח",
    "וישב",
    "מקץ",
    "ויגש",
    "ויחי",
    "שמות",
    "וארא",
    "בא",
    "בשלח",
    "יתרו",
    "משפטים",
    "תרומה",
    "תצוה",
    "כי תשא",
    "ויקהל",
    "פקודי",
    "ויקרא",
    "צו",
    "שמיני",
    "תזריע",
    "מצורע",
    "אחרי מות",
    "קדושים",
    "אמור",
    "בהר",
    "בחוקותי",
    "במדבר",
    "נשא",
    "בהעלותך",
    "שלח לך",
    "קרח",
    "חוקת",
    "בלק",
    "פינחס",
    "מטות",
    "מסעי",
    "דברים",
    "ואתחנן",
    "עקב",
    "ראה",
    "שופטים",
    "כי תצא",
    "כי תבוא",
    "ניצבים",
    "וילך",
    "האזינו",
];

// First portions of the pairs that may be read combined.
const VAYAKHEL: usize = 21;
const TAZRIA: usize = 26;
const ACHAREI: usize = 28;
const BEHAR: usize = 31;
const CHUKAT: usize = 38;
const MATOT: usize = 41;
const NITZAVIM: usize = 50;

// Weekdays as fixed-day remainders: 0 is Sunday, 6 is Saturday.
const THURSDAY: i64 = 4;
const SATURDAY: i64 = 6;

fn day_of_week(fixed: i64) -> i64 {
    fixed.rem_euclid(7)
}

fn saturday_on_or_after(fixed: i64) -> i64 {
    fixed + (SATURDAY - day_of_week(fixed)).rem_euclid(7)
}

fn rosh_hashana_weekday(year: i32) -> i64 {
    day_of_week(calendar::fixed_from_hebrew(&HebrewDate::new(
        year,
        calendar::TISHREI,
        1,
    )))
}

/// First Shabbat of the reading cycle: the Saturday strictly after Simchat
/// Torah (23 Tishrei outside Israel).
fn bereshit_shabbat(year: i32) -> i64 {
    let simchat_torah =
        calendar::fixed_from_hebrew(&HebrewDate::new(year, calendar::TISHREI, 23));
    saturday_on_or_after(simchat_torah + 1)
}

/// Shabbatot that carry a festival reading instead of the weekly portion.
fn is_festival(date: &HebrewDate) -> bool {
    match (date.month, date.day) {
        (calendar::NISAN, 15..=22) => true, // Pesach
        (calendar::SIVAN, 6..=7) => true,   // Shavuot
        (calendar::TISHREI, 1..=2) => true, // Rosh Hashana
        (calendar::TISHREI, 10) => true,    // Yom Kippur
        (calendar::TISHREI, 15..=23) => true, // Sukkot through Simchat Torah
        _ => false,
    }
}

/// The readings of one cycle, in order, with the year's combined pairs
/// merged into single entries.
fn cycle_portions(year: i32) -> Vec<String> {
    let leap = calendar::is_leap_year(year);
    let rosh_hashana = rosh_hashana_weekday(year);
    // The one common-year shape with separate Vayakhel and Pekudei.
    let complete_thursday = calendar::year_length(year) == 355 && rosh_hashana == THURSDAY;
    // Outside Israel the second day of Shavuot can swallow a Shabbat.
    let shavuot_shabbat = day_of_week(calendar::fixed_from_hebrew(&HebrewDate::new(
        year,
        calendar::SIVAN,
        7,
    ))) == SATURDAY;
    let next_rosh_hashana = rosh_hashana_weekday(year + 1);

    let mut combined = Vec::new();
    if !leap && !complete_thursday {
        combined.push(VAYAKHEL);
    }
    if !leap {
        combined.extend([TAZRIA, ACHAREI, BEHAR]);
    }
    if shavuot_shabbat {
        combined.push(CHUKAT);
    }
    if !(leap && rosh_hashana == THURSDAY) {
        combined.push(MATOT);
    }
    if next_rosh_hashana == THURSDAY || next_rosh_hashana == SATURDAY {
        combined.push(NITZAVIM);
    }

    let mut portions = Vec::new();
    let mut index = 0;
    while index < PORTIONS.len() {
        if combined.contains(&index) {
            portions.push(format!("{}־{}", PORTIONS[index], PORTIONS[index + 1]));
            index += 2;
        } else {
            portions.push(PORTIONS[index].to_string());
            index += 1;
        }
    }
    portions
}

/// Every Shabbat of the cycle starting after Simchat Torah of `year`, paired
/// with its portion. Festival Shabbatot are not present.
fn cycle_readings(year: i32) -> Vec<(i64, String)> {
    let start = bereshit_shabbat(year);
    let end = bereshit_shabbat(year + 1);

    let mut open_shabbatot = Vec::new();
    let mut shabbat = start;
    while shabbat < end {
        if !is_festival(&calendar::hebrew_from_fixed(shabbat)) {
            open_shabbatot.push(shabbat);
        }
        shabbat += 7;
    }

    let portions = cycle_portions(year);
    if portions.len() != open_shabbatot.len() {
        log::warn!(
            "reading cycle {}: {} portions for {} open shabbatot",
            year,
            portions.len(),
            open_shabbatot.len()
        );
    }
    open_shabbatot.into_iter().zip(portions).collect()
}

/// Portion of the week containing `date`: the reading of the Saturday on or
/// after it. `None` when that Saturday carries a festival reading.
pub fn parasha_for(date: NaiveDate) -> Option<String> {
    let saturday = saturday_on_or_after(i64::from(date.num_days_from_ce()));
    let hebrew = calendar::hebrew_from_fixed(saturday);
    let cycle_year = if saturday < bereshit_shabbat(hebrew.year) {
        hebrew.year - 1
    } else {
        hebrew.year
    };
    cycle_readings(cycle_year)
        .into_iter()
        .find(|(shabbat, _)| *shabbat == saturday)
        .map(|(_, portion)| portion)
}
