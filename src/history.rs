use crate::locale;
use crate::models::{MoodCategory, MoodRecord};
use chrono::{Local, TimeZone};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub pending: bool,
    pub mood: MoodCategory,
    pub emoji: &'static str,
    pub label: &'static str,
    pub note: Option<String>,
    pub date: String,
    pub timestamp: i64,
    /// "seg., 5 de jan. às 14:30"
    pub display: String,
}

pub fn present(records: &[MoodRecord]) -> Vec<HistoryEntry> {
    present_in(&Local, records)
}

/// Keeps the collection's newest-first order.
pub fn present_in<Tz: TimeZone>(tz: &Tz, records: &[MoodRecord]) -> Vec<HistoryEntry> {
    records.iter().map(|record| entry_in(tz, record)).collect()
}

pub fn entry_in<Tz: TimeZone>(tz: &Tz, record: &MoodRecord) -> HistoryEntry {
    let local = record.occurred_at.with_timezone(tz);
    HistoryEntry {
        id: record.id.as_str().to_string(),
        pending: record.id.is_pending(),
        mood: record.category,
        emoji: record.category.emoji(),
        label: record.category.label(),
        note: record.note.clone(),
        date: record.date(),
        timestamp: record.timestamp_millis(),
        display: format!(
            "{} às {}",
            locale::weekday_day_month(&local),
            locale::hour_minute(&local)
        ),
    }
}
