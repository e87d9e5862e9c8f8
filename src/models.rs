use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodCategory {
    Happy,
    Neutral,
    Sad,
    Angry,
    Anxious,
    /// Display fallback for values the store holds that we don't recognise.
    #[serde(other)]
    Unknown,
}

impl MoodCategory {
    pub const KNOWN: [MoodCategory; 5] = [
        MoodCategory::Happy,
        MoodCategory::Neutral,
        MoodCategory::Sad,
        MoodCategory::Angry,
        MoodCategory::Anxious,
    ];

    /// Lenient parse used on data coming back from the store.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "happy" => Self::Happy,
            "neutral" => Self::Neutral,
            "sad" => Self::Sad,
            "angry" => Self::Angry,
            "anxious" => Self::Anxious,
            _ => Self::Unknown,
        }
    }

    /// Strict parse for user input: only the five known categories.
    pub fn parse_known(raw: &str) -> Option<Self> {
        match Self::from_raw(raw) {
            Self::Unknown => None,
            known => Some(known),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Neutral => "neutral",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Anxious => "anxious",
            Self::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Happy => "Feliz",
            Self::Neutral => "Neutro",
            Self::Sad => "Triste",
            Self::Angry => "Irritado",
            Self::Anxious => "Ansioso",
            Self::Unknown => "Desconhecido",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Neutral => "😐",
            Self::Sad => "😢",
            Self::Angry => "😡",
            Self::Anxious => "😰",
            Self::Unknown => "❓",
        }
    }

    /// Position on the chart's 0..=5 scale.
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Happy => 5,
            Self::Neutral => 3,
            Self::Sad => 2,
            Self::Angry | Self::Anxious => 1,
            Self::Unknown => 0,
        }
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total over every string: unknown input maps to 0.
pub fn mood_to_value(raw: &str) -> u8 {
    MoodCategory::from_raw(raw).ordinal()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RecordId {
    Pending { temp_id: String },
    Confirmed { id: String },
}

impl RecordId {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending { temp_id } => temp_id,
            Self::Confirmed { id } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodRecord {
    pub id: RecordId,
    pub owner_id: String,
    pub category: MoodCategory,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl MoodRecord {
    pub fn date(&self) -> String {
        self.occurred_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.occurred_at.timestamp_millis()
    }
}

/// Trims the note and treats an empty result as absent.
pub fn normalize_note(note: &str) -> Option<String> {
    let trimmed = note.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Newest-first list of the session's mood records.
#[derive(Debug, Clone, Default)]
pub struct MoodCollection {
    records: Vec<MoodRecord>,
}

impl MoodCollection {
    pub fn new(records: Vec<MoodRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MoodRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn prepend(&mut self, record: MoodRecord) {
        self.records.insert(0, record);
    }

    /// Promotes the pending entry to its durable id in place. When a reload
    /// already brought in the durable copy, the pending entry is dropped.
    pub fn confirm(&mut self, temp_id: &str, id: String) -> bool {
        let already_loaded = self
            .records
            .iter()
            .any(|record| matches!(&record.id, RecordId::Confirmed { id: existing } if *existing == id));
        if already_loaded {
            return self.rollback(temp_id);
        }

        let Some(record) = self.records.iter_mut().find(|record| {
            matches!(&record.id, RecordId::Pending { temp_id: pending } if pending == temp_id)
        }) else {
            return false;
        };
        record.id = RecordId::Confirmed { id };
        true
    }

    pub fn rollback(&mut self, temp_id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|record| {
            !matches!(&record.id, RecordId::Pending { temp_id: pending } if pending == temp_id)
        });
        self.records.len() != before
    }
}

/// Document shape as read back from the record store. Every field but the id
/// is optional because the store does not validate what it holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredMood {
    pub id: String,
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Document shape written by the recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMood {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub mood: MoodCategory,
    pub note: String,
    pub date: String,
    pub timestamp: i64,
}

impl NewMood {
    pub fn from_record(record: &MoodRecord) -> Self {
        Self {
            user_id: record.owner_id.clone(),
            mood: record.category,
            note: record.note.clone().unwrap_or_default(),
            date: record.date(),
            timestamp: record.timestamp_millis(),
        }
    }

    pub fn into_stored(self, id: String) -> StoredMood {
        StoredMood {
            id,
            user_id: Some(self.user_id),
            mood: Some(self.mood.as_str().to_string()),
            note: Some(self.note),
            date: Some(self.date),
            timestamp: Some(self.timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
}

impl Identity {
    pub fn display_name(&self) -> String {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| "Usuário".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveMoodRequest {
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub state: &'static str,
    pub user: Option<UserResponse>,
    pub loading: bool,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: String,
}
