//! Brazilian national holiday calendar.
//!
//! Fixed-date holidays plus the Easter-derived movable feasts (Carnival,
//! Good Friday, Corpus Christi). Carnival Monday and Tuesday are included,
//! matching how Brazilian banks and statements treat them.

use crate::domain::ports::HolidayCalendar;
use chrono::{Datelike, Days, NaiveDate};

pub struct BrazilianHolidays;

/// Fixed national holidays as (month, day).
const FIXED: &[(u32, u32)] = &[
    (1, 1),   // Confraternização Universal
    (4, 21),  // Tiradentes
    (5, 1),   // Dia do Trabalho
    (9, 7),   // Independência
    (10, 12), // Nossa Senhora Aparecida
    (11, 2),  // Finados
    (11, 15), // Proclamação da República
    (12, 25), // Natal
];

/// Gregorian Easter Sunday (Meeus/Jones/Butcher algorithm).
fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

impl HolidayCalendar for BrazilianHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        if FIXED.contains(&(date.month(), date.day())) {
            return true;
        }

        let Some(easter) = easter_sunday(date.year()) else {
            return false;
        };

        // Carnival Monday/Tuesday, Good Friday, Corpus Christi.
        easter.checked_sub_days(Days::new(48)) == Some(date)
            || easter.checked_sub_days(Days::new(47)) == Some(date)
            || easter.checked_sub_days(Days::new(2)) == Some(date)
            || easter.checked_add_days(Days::new(60)) == Some(date)
    }
}
