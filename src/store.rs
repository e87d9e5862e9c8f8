use crate::models::{NewMood, StoredMood};
use crate::storage::{load_json, persist_json};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    TimestampAsc,
    TimestampDesc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodQuery {
    pub user_id: String,
    pub order: Order,
    pub limit: usize,
}

impl MoodQuery {
    /// The history query: newest first, capped at [`HISTORY_LIMIT`].
    pub fn recent_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            order: Order::TimestampDesc,
            limit: HISTORY_LIMIT,
        }
    }
}

/// Document database holding mood entries.
pub trait RecordStore: Send + Sync + 'static {
    fn query(
        &self,
        query: &MoodQuery,
    ) -> impl Future<Output = Result<Vec<StoredMood>, StoreError>> + Send;

    /// Returns the store-assigned id.
    fn insert(&self, mood: NewMood) -> impl Future<Output = Result<String, StoreError>> + Send;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    moods: Vec<StoredMood>,
}

pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data: StoreData = load_json(&path).await;
        info!(path = %path.display(), documents = data.moods.len(), "opened mood store");
        Self {
            path,
            data: Mutex::new(data),
        }
    }
}

impl RecordStore for JsonFileStore {
    async fn query(&self, query: &MoodQuery) -> Result<Vec<StoredMood>, StoreError> {
        let data = self.data.lock().await;
        let mut matches: Vec<StoredMood> = data
            .moods
            .iter()
            .filter(|doc| doc.user_id.as_deref() == Some(query.user_id.as_str()))
            .cloned()
            .collect();

        // Documents without a timestamp sort after every timestamped one.
        matches.sort_by(|a, b| match (a.timestamp, b.timestamp) {
            (Some(a), Some(b)) => match query.order {
                Order::TimestampAsc => a.cmp(&b),
                Order::TimestampDesc => b.cmp(&a),
            },
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        matches.truncate(query.limit);

        debug!(user_id = %query.user_id, returned = matches.len(), "mood query");
        Ok(matches)
    }

    async fn insert(&self, mood: NewMood) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut data = self.data.lock().await;
        data.moods.push(mood.into_stored(id.clone()));

        if let Err(err) = persist_json(&self.path, &*data).await {
            data.moods.pop();
            return Err(err.into());
        }

        Ok(id)
    }
}
