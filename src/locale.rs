//! Brazilian Portuguese date and time formatting.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Weekday};

const MONTHS_SHORT: [&str; 12] = [
    "jan.", "fev.", "mar.", "abr.", "mai.", "jun.", "jul.", "ago.", "set.", "out.", "nov.", "dez.",
];

fn weekday_short(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "seg.",
        Weekday::Tue => "ter.",
        Weekday::Wed => "qua.",
        Weekday::Thu => "qui.",
        Weekday::Fri => "sex.",
        Weekday::Sat => "sáb.",
        Weekday::Sun => "dom.",
    }
}

/// "5 de jan."
pub fn day_month<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    format!("{} de {}", at.day(), MONTHS_SHORT[at.month0() as usize])
}

/// "seg., 5 de jan."
pub fn weekday_day_month<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    format!("{}, {}", weekday_short(at.weekday()), day_month(at))
}

/// "14:05"
pub fn hour_minute<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    format!("{:02}:{:02}", at.hour(), at.minute())
}
