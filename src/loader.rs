use crate::models::{MoodCategory, MoodRecord, RecordId, StoredMood, normalize_note};
use crate::store::{MoodQuery, RecordStore};
use crate::toasts::Toasts;
use chrono::{DateTime, Utc};
use tracing::info;

/// Fetches the most recent moods for `owner_id`, newest first. Failures are
/// reported as a notification and yield an empty history.
pub async fn fetch_history<S: RecordStore>(
    store: &S,
    owner_id: &str,
    toasts: &Toasts,
) -> Vec<MoodRecord> {
    if owner_id.trim().is_empty() {
        return Vec::new();
    }

    match store.query(&MoodQuery::recent_for(owner_id)).await {
        Ok(docs) => {
            let now = Utc::now();
            let records: Vec<MoodRecord> = docs
                .into_iter()
                .map(|doc| from_stored(doc, owner_id, now))
                .collect();
            info!(%owner_id, count = records.len(), "loaded mood history");
            records
        }
        Err(err) => {
            toasts.error("Erro", "Falha ao carregar seu histórico de humor.", &err);
            Vec::new()
        }
    }
}

/// Builds a well-formed record from whatever the store returned.
pub fn from_stored(doc: StoredMood, owner_id: &str, now: DateTime<Utc>) -> MoodRecord {
    let category = match doc.mood.as_deref().map(str::trim) {
        None | Some("") => MoodCategory::Neutral,
        Some(raw) => MoodCategory::from_raw(raw),
    };

    let occurred_at = doc
        .date
        .as_deref()
        .and_then(|date| DateTime::parse_from_rfc3339(date).ok())
        .map(|date| date.with_timezone(&Utc))
        .or_else(|| doc.timestamp.and_then(DateTime::from_timestamp_millis))
        .unwrap_or(now);

    MoodRecord {
        id: RecordId::Confirmed { id: doc.id },
        owner_id: doc
            .user_id
            .filter(|user_id| !user_id.is_empty())
            .unwrap_or_else(|| owner_id.to_string()),
        category,
        note: doc.note.as_deref().and_then(normalize_note),
        occurred_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewMood;
    use crate::store::StoreError;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct ScriptedStore {
        result: Mutex<Option<Result<Vec<StoredMood>, StoreError>>>,
        seen: Mutex<Vec<MoodQuery>>,
    }

    impl ScriptedStore {
        fn new(result: Result<Vec<StoredMood>, StoreError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl RecordStore for ScriptedStore {
        async fn query(&self, query: &MoodQuery) -> Result<Vec<StoredMood>, StoreError> {
            self.seen.lock().unwrap().push(query.clone());
            self.result.lock().unwrap().take().unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn insert(&self, _mood: NewMood) -> Result<String, StoreError> {
            unreachable!("loader never inserts")
        }
    }

    #[tokio::test]
    async fn issues_history_query_for_owner() {
        let store = ScriptedStore::new(Ok(vec![StoredMood {
            id: "doc-1".to_string(),
            user_id: Some("ana".to_string()),
            mood: Some("sad".to_string()),
            note: Some(" chuva ".to_string()),
            date: Some("2026-01-05T12:00:00.000Z".to_string()),
            timestamp: Some(1_767_614_400_000),
        }]));
        let toasts = Toasts::new();

        let records = fetch_history(&store, "ana", &toasts).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category, MoodCategory::Sad);
        assert_eq!(records[0].note.as_deref(), Some("chuva"));
        assert_eq!(store.seen.lock().unwrap()[0], MoodQuery::recent_for("ana"));
        assert!(toasts.drain().is_empty());
    }

    #[tokio::test]
    async fn fetch_error_yields_empty_list_and_one_notification() {
        let store = ScriptedStore::new(Err(StoreError::Unavailable("offline".to_string())));
        let toasts = Toasts::new();

        let records = fetch_history(&store, "ana", &toasts).await;
        assert!(records.is_empty());
        let drained = toasts.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].description, "Falha ao carregar seu histórico de humor.");
    }

    #[tokio::test]
    async fn empty_owner_issues_no_query() {
        let store = ScriptedStore::new(Ok(Vec::new()));
        let records = fetch_history(&store, "  ", &Toasts::new()).await;
        assert!(records.is_empty());
        assert!(store.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_fields_are_defaulted() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let record = from_stored(
            StoredMood {
                id: "doc-9".to_string(),
                ..StoredMood::default()
            },
            "ana",
            now,
        );
        assert_eq!(record.id, RecordId::Confirmed { id: "doc-9".to_string() });
        assert_eq!(record.owner_id, "ana");
        assert_eq!(record.category, MoodCategory::Neutral);
        assert_eq!(record.note, None);
        assert_eq!(record.occurred_at, now);
    }

    #[test]
    fn timestamp_used_when_date_unparseable() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let stamp = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap();
        let record = from_stored(
            StoredMood {
                id: "doc-9".to_string(),
                mood: Some("bored".to_string()),
                date: Some("not a date".to_string()),
                timestamp: Some(stamp.timestamp_millis()),
                ..StoredMood::default()
            },
            "ana",
            now,
        );
        assert_eq!(record.occurred_at, stamp);
        assert_eq!(record.category, MoodCategory::Unknown);
    }
}
