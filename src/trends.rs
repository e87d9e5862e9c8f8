use crate::locale;
use crate::models::{MoodCategory, MoodRecord};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendWindow {
    #[default]
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "30days")]
    ThirtyDays,
}

impl TrendWindow {
    pub fn days(self) -> i64 {
        match self {
            Self::SevenDays => 7,
            Self::ThirtyDays => 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: String,
    pub value: u8,
    pub mood: MoodCategory,
    pub mood_label: &'static str,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBucket {
    pub mood: MoodCategory,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendReport {
    pub series: Vec<SeriesPoint>,
    pub distribution: Vec<DistributionBucket>,
}

pub fn aggregate(records: &[MoodRecord], window: TrendWindow) -> TrendReport {
    aggregate_at(Utc::now(), &Local, records, window)
}

/// Pure over its inputs; `tz` only affects the display dates.
pub fn aggregate_at<Tz: TimeZone>(
    now: DateTime<Utc>,
    tz: &Tz,
    records: &[MoodRecord],
    window: TrendWindow,
) -> TrendReport {
    if records.is_empty() {
        return TrendReport::default();
    }

    let cutoff = now - Duration::days(window.days());
    let mut in_window: Vec<&MoodRecord> = records
        .iter()
        .filter(|record| record.occurred_at > cutoff)
        .collect();
    in_window.sort_by_key(|record| record.occurred_at);

    let series = in_window
        .iter()
        .map(|record| SeriesPoint {
            date: locale::day_month(&record.occurred_at.with_timezone(tz)),
            value: record.category.ordinal(),
            mood: record.category,
            mood_label: record.category.label(),
            note: record.note.clone(),
        })
        .collect();

    let distribution = MoodCategory::KNOWN
        .iter()
        .map(|&mood| DistributionBucket {
            mood,
            label: mood.label(),
            count: in_window.iter().filter(|record| record.category == mood).count(),
        })
        .collect();

    TrendReport {
        series,
        distribution,
    }
}
