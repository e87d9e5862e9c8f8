use crate::models::{MoodCategory, MoodRecord, NewMood, RecordId, normalize_note};
use crate::session::SessionContext;
use crate::store::{RecordStore, StoreError};
use crate::toasts::Toasts;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tracing::{debug, info};

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// The entry form's input: selected category plus free-text note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoodDraft {
    pub category: Option<MoodCategory>,
    pub note: String,
}

/// An optimistic entry waiting for the store's answer.
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub temp_id: String,
    pub record: MoodRecord,
    pub document: NewMood,
}

pub fn temp_id(at: DateTime<Utc>) -> String {
    let seq = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("pending-{}-{seq}", at.timestamp_millis())
}

/// Optimistic half of a save. The draft is reset whatever happens next.
pub async fn begin(
    context: &SessionContext,
    toasts: &Toasts,
    draft: &mut MoodDraft,
    occurred_at: DateTime<Utc>,
) -> Option<PendingSave> {
    let MoodDraft { category, note } = std::mem::take(draft);
    let category = category?;

    if context.owner_id().trim().is_empty() {
        toasts.error(
            "Erro",
            "Você precisa estar logado para salvar seu humor.",
            &"save attempted without an owner",
        );
        return None;
    }

    let temp_id = temp_id(occurred_at);
    let record = MoodRecord {
        id: RecordId::Pending {
            temp_id: temp_id.clone(),
        },
        owner_id: context.owner_id().to_string(),
        category,
        note: normalize_note(&note),
        occurred_at,
    };
    let document = NewMood::from_record(&record);

    if !context.prepend(record.clone()).await {
        debug!(%temp_id, "session closed before optimistic insert");
        return None;
    }
    toasts.info("Salvando...", "Seu humor está sendo registrado.");

    Some(PendingSave {
        temp_id,
        record,
        document,
    })
}

/// Reconciliation half: promote on success, roll back on failure.
pub async fn finish(
    context: &SessionContext,
    toasts: &Toasts,
    pending: &PendingSave,
    result: Result<String, StoreError>,
) {
    match result {
        Ok(id) => {
            info!(temp_id = %pending.temp_id, %id, "mood saved");
            if !context.confirm(&pending.temp_id, id).await {
                debug!(temp_id = %pending.temp_id, "no live pending entry to confirm");
            }
            toasts.info("Humor salvo", "Seu humor foi registrado com sucesso.");
        }
        Err(err) => {
            context.rollback(&pending.temp_id).await;
            toasts.error(
                "Erro",
                "Falha ao salvar seu humor. Por favor, tente novamente.",
                &err,
            );
        }
    }
}

pub async fn save<S: RecordStore>(
    context: &SessionContext,
    store: &S,
    toasts: &Toasts,
    draft: &mut MoodDraft,
    occurred_at: DateTime<Utc>,
) {
    let Some(pending) = begin(context, toasts, draft, occurred_at).await else {
        return;
    };
    let result = store.insert(pending.document.clone()).await;
    finish(context, toasts, &pending, result).await;
}

/// Runs the remote write in the background after [`begin`] has already made
/// the entry visible.
pub fn spawn_remote_write<S: RecordStore>(
    context: Arc<SessionContext>,
    store: Arc<S>,
    toasts: Arc<Toasts>,
    pending: PendingSave,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = store.insert(pending.document.clone()).await;
        finish(&context, &toasts, &pending, result).await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoredMood;
    use crate::store::MoodQuery;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    /// Insert blocks until the test releases it with an outcome.
    struct GatedStore {
        gate: Mutex<Option<oneshot::Receiver<Result<String, StoreError>>>>,
        inserted: Mutex<Vec<NewMood>>,
    }

    impl GatedStore {
        fn new() -> (Self, oneshot::Sender<Result<String, StoreError>>) {
            let (tx, rx) = oneshot::channel();
            let store = Self {
                gate: Mutex::new(Some(rx)),
                inserted: Mutex::new(Vec::new()),
            };
            (store, tx)
        }
    }

    impl RecordStore for GatedStore {
        async fn query(&self, _query: &MoodQuery) -> Result<Vec<StoredMood>, StoreError> {
            Ok(Vec::new())
        }

        async fn insert(&self, mood: NewMood) -> Result<String, StoreError> {
            self.inserted.lock().unwrap().push(mood);
            let gate = self.gate.lock().unwrap().take();
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(StoreError::Unavailable("gate dropped".to_string()))),
                None => Ok("doc-extra".to_string()),
            }
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap()
    }

    fn confirmed(id: &str) -> MoodRecord {
        MoodRecord {
            id: RecordId::Confirmed { id: id.to_string() },
            owner_id: "ana".to_string(),
            category: MoodCategory::Neutral,
            note: None,
            occurred_at: now() - chrono::Duration::days(1),
        }
    }

    async fn seeded_context() -> Arc<SessionContext> {
        let context = Arc::new(SessionContext::new("ana"));
        assert!(context.prepend(confirmed("old-1")).await);
        context
    }

    fn happy_draft(note: &str) -> MoodDraft {
        MoodDraft {
            category: Some(MoodCategory::Happy),
            note: note.to_string(),
        }
    }

    #[tokio::test]
    async fn pending_entry_is_visible_before_confirmation() {
        let context = seeded_context().await;
        let (store, release) = GatedStore::new();
        let store = Arc::new(store);
        let toasts = Arc::new(Toasts::new());

        let mut draft = happy_draft("  dia ótimo ");
        let pending = begin(&context, &toasts, &mut draft, now()).await.unwrap();
        assert_eq!(draft, MoodDraft::default());

        let handle = spawn_remote_write(
            Arc::clone(&context),
            Arc::clone(&store),
            Arc::clone(&toasts),
            pending.clone(),
        );

        let records = context.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_str(), pending.temp_id);
        assert!(records[0].id.is_pending());
        assert_eq!(records[0].note.as_deref(), Some("dia ótimo"));

        release.send(Ok("doc-42".to_string())).unwrap();
        handle.await.unwrap();

        let records = context.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, RecordId::Confirmed { id: "doc-42".to_string() });
        assert_eq!(records[1].id.as_str(), "old-1");

        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted[0].user_id, "ana");
        assert_eq!(inserted[0].timestamp, now().timestamp_millis());
    }

    #[tokio::test]
    async fn failed_insert_restores_previous_collection() {
        let context = seeded_context().await;
        let before = context.records().await;
        let (store, release) = GatedStore::new();
        let toasts = Toasts::new();
        release
            .send(Err(StoreError::Unavailable("offline".to_string())))
            .unwrap();

        let mut draft = happy_draft("");
        save(&context, &store, &toasts, &mut draft, now()).await;

        assert_eq!(context.records().await, before);
        assert_eq!(draft, MoodDraft::default());
        let drained = toasts.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(
            drained[1].description,
            "Falha ao salvar seu humor. Por favor, tente novamente."
        );
    }

    #[tokio::test]
    async fn missing_category_is_a_silent_no_op() {
        let context = seeded_context().await;
        let (store, _release) = GatedStore::new();
        let toasts = Toasts::new();

        let mut draft = MoodDraft {
            category: None,
            note: "sem seleção".to_string(),
        };
        save(&context, &store, &toasts, &mut draft, now()).await;

        assert_eq!(context.records().await.len(), 1);
        assert!(store.inserted.lock().unwrap().is_empty());
        assert!(toasts.drain().is_empty());
        assert_eq!(draft, MoodDraft::default());
    }

    #[tokio::test]
    async fn concurrent_saves_reconcile_by_temp_id() {
        let context = seeded_context().await;
        let toasts = Toasts::new();

        let first = begin(&context, &toasts, &mut happy_draft("a"), now()).await.unwrap();
        let second = begin(&context, &toasts, &mut happy_draft("b"), now()).await.unwrap();
        assert_ne!(first.temp_id, second.temp_id);

        finish(&context, &toasts, &second, Err(StoreError::Unavailable("x".into()))).await;
        finish(&context, &toasts, &first, Ok("doc-a".to_string())).await;

        let records = context.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, RecordId::Confirmed { id: "doc-a".to_string() });
        assert_eq!(records[0].note.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn history_load_between_insert_and_confirmation_keeps_one_copy() {
        use crate::store::JsonFileStore;

        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("moods.json")).await;
        let context = SessionContext::new("ana");
        let toasts = Toasts::new();

        let pending = begin(&context, &toasts, &mut happy_draft("a"), now())
            .await
            .unwrap();
        let result = store.insert(pending.document.clone()).await;
        let id = result.as_ref().unwrap().clone();

        context.load(&store, &toasts).await;
        assert_eq!(context.records().await.len(), 2);

        finish(&context, &toasts, &pending, result).await;
        let records = context.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, RecordId::Confirmed { id });
        assert!(toasts.drain().iter().any(|toast| toast.title == "Humor salvo"));
    }

    #[tokio::test]
    async fn late_confirmation_after_session_close_is_ignored() {
        let context = seeded_context().await;
        let toasts = Toasts::new();
        let pending = begin(&context, &toasts, &mut happy_draft(""), now())
            .await
            .unwrap();

        context.close().await;
        finish(&context, &toasts, &pending, Ok("doc-late".to_string())).await;
        assert!(context.records().await.is_empty());
        assert!(begin(&context, &toasts, &mut happy_draft(""), now()).await.is_none());
    }
}
