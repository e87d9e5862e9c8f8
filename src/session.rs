//! Session state machine and the session-scoped record context.
//!
//! The controller only learns about sign-in and sign-out through the
//! provider's `watch` stream (see [`SessionController::run`]). Each
//! authenticated identity gets a fresh [`SessionContext`] that owns the
//! in-memory mood collection; it is closed when the identity goes away so late
//! store responses cannot touch a newer session.

use crate::identity::{AuthAction, AuthError, IdentityProvider, MIN_PASSWORD_LEN};
use crate::loader;
use crate::models::{Identity, MoodCollection, MoodRecord};
use crate::store::RecordStore;
use crate::toasts::Toasts;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unknown,
    Anonymous,
    Authenticating,
    Authenticated(Identity),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated(_) => "authenticated",
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct ContextData {
    records: MoodCollection,
    loading: bool,
    open: bool,
}

/// State owned by one authenticated session.
#[derive(Debug)]
pub struct SessionContext {
    owner_id: String,
    data: Mutex<ContextData>,
}

impl SessionContext {
    /// A context for a real owner starts out loading: its history fetch is
    /// scheduled in the same step that establishes the session.
    pub fn new(owner_id: impl Into<String>) -> Self {
        let owner_id = owner_id.into();
        let loading = !owner_id.trim().is_empty();
        Self {
            owner_id,
            data: Mutex::new(ContextData {
                records: MoodCollection::default(),
                loading,
                open: true,
            }),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub async fn is_loading(&self) -> bool {
        self.data.lock().await.loading
    }

    pub async fn is_open(&self) -> bool {
        self.data.lock().await.open
    }

    pub async fn records(&self) -> Vec<MoodRecord> {
        self.data.lock().await.records.records().to_vec()
    }

    /// Fetches the owner's history and replaces the collection with it.
    pub async fn load<S: RecordStore>(&self, store: &S, toasts: &Toasts) {
        if self.owner_id.trim().is_empty() {
            let mut data = self.data.lock().await;
            data.records = MoodCollection::default();
            data.loading = false;
            return;
        }

        self.data.lock().await.loading = true;
        let records = loader::fetch_history(store, &self.owner_id, toasts).await;

        let mut data = self.data.lock().await;
        data.loading = false;
        if data.open {
            // Entries saved while the fetch was in flight stay at the head.
            let fetched_ids: HashSet<&str> = records.iter().map(|record| record.id.as_str()).collect();
            let mut merged: Vec<MoodRecord> = data
                .records
                .records()
                .iter()
                .filter(|record| !fetched_ids.contains(record.id.as_str()))
                .cloned()
                .collect();
            merged.extend(records.iter().cloned());
            data.records = MoodCollection::new(merged);
        } else {
            debug!(owner_id = %self.owner_id, "discarding history for closed session");
        }
    }

    pub(crate) async fn prepend(&self, record: MoodRecord) -> bool {
        let mut data = self.data.lock().await;
        if !data.open {
            return false;
        }
        data.records.prepend(record);
        true
    }

    pub(crate) async fn confirm(&self, temp_id: &str, id: String) -> bool {
        let mut data = self.data.lock().await;
        data.open && data.records.confirm(temp_id, id)
    }

    pub(crate) async fn rollback(&self, temp_id: &str) -> bool {
        let mut data = self.data.lock().await;
        data.open && data.records.rollback(temp_id)
    }

    pub(crate) async fn close(&self) {
        let mut data = self.data.lock().await;
        data.open = false;
        data.records = MoodCollection::default();
        data.loading = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("email must contain '@'")]
    InvalidEmail,
    #[error("password must have at least 6 characters")]
    ShortPassword,
}

impl ValidationError {
    pub fn title(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "Email inválido",
            Self::ShortPassword => "Senha inválida",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "Por favor, insira um endereço de email válido.",
            Self::ShortPassword => "A senha deve ter pelo menos 6 caracteres.",
        }
    }
}

pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    if !email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::ShortPassword);
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Provider(#[from] AuthError),
}

struct ControllerState {
    state: SessionState,
    context: Option<Arc<SessionContext>>,
}

pub struct SessionController<I, S> {
    provider: Arc<I>,
    store: Arc<S>,
    toasts: Arc<Toasts>,
    inner: Mutex<ControllerState>,
}

impl<I: IdentityProvider, S: RecordStore> SessionController<I, S> {
    pub fn new(provider: Arc<I>, store: Arc<S>, toasts: Arc<Toasts>) -> Self {
        Self {
            provider,
            store,
            toasts,
            inner: Mutex::new(ControllerState {
                state: SessionState::Unknown,
                context: None,
            }),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn toasts(&self) -> &Arc<Toasts> {
        &self.toasts
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    pub async fn context(&self) -> Option<Arc<SessionContext>> {
        self.inner.lock().await.context.clone()
    }

    /// Consumes the provider's current-user stream until the provider goes
    /// away. Aborting the returned task unsubscribes.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.run().await })
    }

    pub async fn run(self: Arc<Self>) {
        let mut events = self.provider.subscribe();
        loop {
            let current = events.borrow_and_update().clone();
            if let Some(context) = self.apply_notification(current).await {
                let store = Arc::clone(&self.store);
                let toasts = Arc::clone(&self.toasts);
                tokio::spawn(async move { context.load(store.as_ref(), &toasts).await });
            }
            if events.changed().await.is_err() {
                debug!("identity provider closed its notification stream");
                break;
            }
        }
    }

    /// Applies one provider notification. Returns the new session context
    /// when the notification established a session that still needs loading.
    pub async fn apply_notification(&self, identity: Option<Identity>) -> Option<Arc<SessionContext>> {
        let mut inner = self.inner.lock().await;
        let previous = inner.context.take();

        let established = match identity {
            Some(identity) => {
                let same_identity = matches!(
                    &inner.state,
                    SessionState::Authenticated(current) if current.uid == identity.uid
                );
                if same_identity && previous.is_some() {
                    inner.state = SessionState::Authenticated(identity);
                    inner.context = previous;
                    return None;
                }
                info!(uid = %identity.uid, "session established");
                let context = Arc::new(SessionContext::new(identity.uid.clone()));
                inner.state = SessionState::Authenticated(identity);
                inner.context = Some(Arc::clone(&context));
                Some(context)
            }
            None => {
                if matches!(inner.state, SessionState::Authenticated(_)) {
                    info!("session ended");
                }
                inner.state = SessionState::Anonymous;
                None
            }
        };
        drop(inner);

        if let Some(previous) = previous {
            previous.close().await;
        }
        established
    }

    /// Validates and submits credentials. Success is only reflected in the
    /// session state once the provider's notification arrives.
    pub async fn submit_credentials(
        &self,
        action: AuthAction,
        email: &str,
        password: &str,
    ) -> Result<(), CredentialsError> {
        if let Err(err) = validate_credentials(email, password) {
            self.toasts.error(err.title(), err.description(), &err);
            return Err(err.into());
        }

        {
            let mut inner = self.inner.lock().await;
            if inner.state == SessionState::Anonymous {
                inner.state = SessionState::Authenticating;
            }
        }

        let result = match action {
            AuthAction::SignIn => self.provider.sign_in(email, password).await,
            AuthAction::SignUp => self.provider.sign_up(email, password).await,
        };

        match result {
            Ok(_) => {
                self.toasts.info(action.success_title(), "Bem-vindo ao Mood Do Dia!");
                Ok(())
            }
            Err(err) => {
                {
                    let mut inner = self.inner.lock().await;
                    if inner.state == SessionState::Authenticating {
                        inner.state = SessionState::Anonymous;
                    }
                }
                self.toasts
                    .error(action.failure_title(), action.failure_message(&err), &err);
                Err(err.into())
            }
        }
    }

    /// On failure the session is left exactly as it was.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        match self.provider.sign_out().await {
            Ok(()) => {
                self.toasts
                    .info("Desconectado", "Você saiu da sua conta com sucesso.");
                Ok(())
            }
            Err(err) => {
                self.toasts.error(
                    "Erro",
                    "Falha ao sair. Por favor, tente novamente.",
                    &err,
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewMood, StoredMood};
    use crate::store::{MoodQuery, StoreError};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::watch;

    #[derive(Default)]
    struct CountingStore {
        queries: AtomicUsize,
        docs: Vec<StoredMood>,
    }

    impl RecordStore for CountingStore {
        async fn query(&self, _query: &MoodQuery) -> Result<Vec<StoredMood>, StoreError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.docs.clone())
        }

        async fn insert(&self, _mood: NewMood) -> Result<String, StoreError> {
            Ok("doc-1".to_string())
        }
    }

    struct FakeProvider {
        current: watch::Sender<Option<Identity>>,
        fail_sign_out: AtomicBool,
    }

    impl FakeProvider {
        fn new() -> Self {
            let (current, _) = watch::channel(None);
            Self {
                current,
                fail_sign_out: AtomicBool::new(false),
            }
        }
    }

    fn identity(uid: &str) -> Identity {
        Identity {
            uid: uid.to_string(),
            email: Some(format!("{uid}@exemplo.com")),
        }
    }

    impl IdentityProvider for FakeProvider {
        async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
            if password != "segredo1" {
                return Err(AuthError::WrongPassword);
            }
            let uid = email.split('@').next().unwrap_or_default();
            let identity = identity(uid);
            self.current.send_replace(Some(identity.clone()));
            Ok(identity)
        }

        async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
            self.sign_in(email, password).await
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            if self.fail_sign_out.load(Ordering::SeqCst) {
                return Err(AuthError::Unavailable("offline".to_string()));
            }
            self.current.send_replace(None);
            Ok(())
        }

        fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
            self.current.subscribe()
        }
    }

    fn controller() -> Arc<SessionController<FakeProvider, CountingStore>> {
        Arc::new(SessionController::new(
            Arc::new(FakeProvider::new()),
            Arc::new(CountingStore::default()),
            Arc::new(Toasts::new()),
        ))
    }

    async fn wait_for_state(
        controller: &SessionController<FakeProvider, CountingStore>,
        expected: &str,
    ) -> SessionState {
        for _ in 0..100 {
            let state = controller.state().await;
            if state.name() == expected {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("controller never reached {expected}");
    }

    #[test]
    fn validation_rejects_malformed_credentials() {
        assert_eq!(
            validate_credentials("sem-arroba", "segredo1"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_credentials("ana@exemplo.com", "12345"),
            Err(ValidationError::ShortPassword)
        );
        assert!(validate_credentials("ana@exemplo.com", "123456").is_ok());
    }

    #[tokio::test]
    async fn starts_unknown_then_follows_first_notification() {
        let controller = controller();
        assert_eq!(controller.state().await, SessionState::Unknown);

        let task = controller.spawn();
        wait_for_state(&controller, "anonymous").await;
        assert!(controller.context().await.is_none());
        task.abort();
    }

    #[tokio::test]
    async fn sign_in_waits_for_notification_and_loads_once() {
        let controller = controller();
        let task = controller.spawn();
        wait_for_state(&controller, "anonymous").await;

        controller
            .submit_credentials(AuthAction::SignIn, "ana@exemplo.com", "segredo1")
            .await
            .unwrap();
        let state = wait_for_state(&controller, "authenticated").await;
        assert_eq!(state.identity().unwrap().uid, "ana");

        let context = controller.context().await.unwrap();
        assert_eq!(context.owner_id(), "ana");
        for _ in 0..100 {
            if controller.store().queries.load(Ordering::SeqCst) == 1 && !context.is_loading().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(controller.store().queries.load(Ordering::SeqCst), 1);

        // Re-announcing the same identity keeps the session and does not refetch.
        assert!(controller.apply_notification(Some(identity("ana"))).await.is_none());
        assert_eq!(controller.store().queries.load(Ordering::SeqCst), 1);
        task.abort();
    }

    #[tokio::test]
    async fn validation_failure_skips_provider() {
        let controller = controller();
        controller.apply_notification(None).await;

        let result = controller
            .submit_credentials(AuthAction::SignIn, "sem-arroba", "segredo1")
            .await;
        assert!(matches!(
            result,
            Err(CredentialsError::Validation(ValidationError::InvalidEmail))
        ));
        assert_eq!(controller.state().await, SessionState::Anonymous);
        assert!(controller.provider.current.borrow().is_none());
        let toasts = controller.toasts().drain();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].title, "Email inválido");
    }

    #[tokio::test]
    async fn provider_failure_returns_to_anonymous() {
        let controller = controller();
        controller.apply_notification(None).await;

        let result = controller
            .submit_credentials(AuthAction::SignIn, "ana@exemplo.com", "errada!")
            .await;
        assert!(matches!(
            result,
            Err(CredentialsError::Provider(AuthError::WrongPassword))
        ));
        assert_eq!(controller.state().await, SessionState::Anonymous);
        let toasts = controller.toasts().drain();
        assert_eq!(toasts[0].description, "Senha incorreta. Tente novamente.");
    }

    #[tokio::test]
    async fn sign_out_failure_keeps_session_and_notifies_once() {
        let controller = controller();
        let context = controller
            .apply_notification(Some(identity("ana")))
            .await
            .unwrap();
        controller.toasts().drain();
        controller.provider.fail_sign_out.store(true, Ordering::SeqCst);

        assert!(controller.sign_out().await.is_err());
        assert_eq!(controller.state().await.identity(), Some(&identity("ana")));
        assert!(context.is_open().await);
        assert_eq!(controller.toasts().drain().len(), 1);
    }

    #[tokio::test]
    async fn sign_out_notification_tears_down_context() {
        let controller = controller();
        let task = controller.spawn();
        controller
            .submit_credentials(AuthAction::SignIn, "ana@exemplo.com", "segredo1")
            .await
            .unwrap();
        wait_for_state(&controller, "authenticated").await;
        let context = controller.context().await.unwrap();

        controller.sign_out().await.unwrap();
        wait_for_state(&controller, "anonymous").await;
        assert!(controller.context().await.is_none());
        assert!(!context.is_open().await);
        task.abort();
    }

    #[tokio::test]
    async fn loader_with_empty_owner_skips_query() {
        let store = CountingStore::default();
        let toasts = Toasts::new();
        let context = SessionContext::new("");
        context.load(&store, &toasts).await;
        assert!(!context.is_loading().await);
        assert!(context.records().await.is_empty());
        assert_eq!(store.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn entries_saved_during_load_survive_it() {
        use crate::models::{MoodCategory, RecordId};
        use chrono::Utc;

        let store = CountingStore {
            docs: vec![StoredMood {
                id: "doc-1".to_string(),
                user_id: Some("ana".to_string()),
                mood: Some("sad".to_string()),
                ..StoredMood::default()
            }],
            ..CountingStore::default()
        };
        let context = SessionContext::new("ana");
        assert!(context.is_loading().await);
        context
            .prepend(MoodRecord {
                id: RecordId::Pending {
                    temp_id: "pending-1-0".to_string(),
                },
                owner_id: "ana".to_string(),
                category: MoodCategory::Happy,
                note: None,
                occurred_at: Utc::now(),
            })
            .await;

        context.load(&store, &Toasts::new()).await;
        let records = context.records().await;
        assert!(!context.is_loading().await);
        assert_eq!(records.len(), 2);
        assert!(records[0].id.is_pending());
        assert_eq!(records[1].id.as_str(), "doc-1");
    }

    #[tokio::test]
    async fn identity_switch_replaces_context() {
        let controller = controller();
        let first = controller.apply_notification(Some(identity("ana"))).await.unwrap();
        let second = controller.apply_notification(Some(identity("bia"))).await.unwrap();
        assert!(!first.is_open().await);
        assert!(second.is_open().await);
        assert_eq!(second.owner_id(), "bia");
    }
}
