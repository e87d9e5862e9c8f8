//! Credential-based identity provider.
//!
//! [`IdentityProvider`] is the seam the session controller talks to; the
//! "current user changed" stream is a `watch` channel whose value is the
//! signed-in identity (or `None`). [`LocalIdentityProvider`] keeps accounts in
//! a JSON file with argon2 password hashes.

use crate::models::Identity;
use crate::storage::{load_json, persist_json};
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;
const MAX_FAILED_ATTEMPTS: u32 = 5;
const ATTEMPT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no account for this email")]
    UserNotFound,
    #[error("wrong password")]
    WrongPassword,
    #[error("too many failed attempts")]
    TooManyRequests,
    #[error("email already in use")]
    EmailAlreadyInUse,
    #[error("invalid email")]
    InvalidEmail,
    #[error("password too weak")]
    WeakPassword,
    #[error("account storage failed: {0}")]
    Storage(#[from] std::io::Error),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    SignIn,
    SignUp,
}

impl AuthAction {
    pub fn failure_title(self) -> &'static str {
        match self {
            Self::SignIn => "Falha no login",
            Self::SignUp => "Falha no cadastro",
        }
    }

    pub fn success_title(self) -> &'static str {
        match self {
            Self::SignIn => "Login realizado com sucesso",
            Self::SignUp => "Conta criada",
        }
    }

    /// Localized description for a provider failure.
    pub fn failure_message(self, err: &AuthError) -> &'static str {
        match err {
            AuthError::UserNotFound => "Usuário não encontrado. Verifique seu email.",
            AuthError::WrongPassword => "Senha incorreta. Tente novamente.",
            AuthError::TooManyRequests => "Muitas tentativas. Tente novamente mais tarde.",
            AuthError::EmailAlreadyInUse => "Este email já está em uso. Tente fazer login.",
            AuthError::InvalidEmail => "Email inválido. Verifique o formato.",
            AuthError::WeakPassword => "Senha muito fraca. Use uma senha mais forte.",
            _ => match self {
                Self::SignIn => "Falha no login. Verifique suas credenciais.",
                Self::SignUp => "Falha ao criar conta. Tente novamente.",
            },
        }
    }
}

pub trait IdentityProvider: Send + Sync + 'static {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    /// Creates the account and signs it in.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Stream of current-user changes. The value present at subscription time
    /// is the first notification.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    uid: String,
    email: String,
    password_hash: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountsData {
    accounts: Vec<Account>,
}

struct AttemptEntry {
    failures: u32,
    window_start: Instant,
}

/// Counts failed sign-ins per email inside a fixed window.
struct AttemptLimiter {
    window: Duration,
    entries: Mutex<HashMap<String, AttemptEntry>>,
}

impl Default for AttemptLimiter {
    fn default() -> Self {
        Self::new(ATTEMPT_WINDOW)
    }
}

impl AttemptLimiter {
    fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    async fn is_blocked(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if now.duration_since(entry.window_start) >= self.window => {
                entries.remove(key);
                false
            }
            Some(entry) => entry.failures >= MAX_FAILED_ATTEMPTS,
            None => false,
        }
    }

    /// Also drops every entry whose window has passed, so the map only
    /// holds emails that failed recently.
    async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, entry| now.duration_since(entry.window_start) < self.window);
        let entry = entries.entry(key.to_string()).or_insert(AttemptEntry {
            failures: 0,
            window_start: now,
        });
        entry.failures += 1;
    }

    async fn clear(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.entries.lock().await.len()
    }
}

pub struct LocalIdentityProvider {
    path: PathBuf,
    accounts: Mutex<AccountsData>,
    hasher: Argon2<'static>,
    limiter: AttemptLimiter,
    current: watch::Sender<Option<Identity>>,
}

impl LocalIdentityProvider {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_hasher(path, Argon2::default()).await
    }

    pub async fn with_hasher(path: impl Into<PathBuf>, hasher: Argon2<'static>) -> Self {
        let path = path.into();
        let accounts: AccountsData = load_json(&path).await;
        info!(path = %path.display(), accounts = accounts.accounts.len(), "opened account store");
        let (current, _) = watch::channel(None);
        Self {
            path,
            accounts: Mutex::new(accounts),
            hasher,
            limiter: AttemptLimiter::default(),
            current,
        }
    }

    fn publish(&self, identity: Option<Identity>) {
        self.current.send_replace(identity);
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            hasher
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| AuthError::Hashing(err.to_string()))
        })
        .await
        .map_err(|err| AuthError::Hashing(err.to_string()))?
    }

    async fn email_taken(&self, email: &str) -> bool {
        let data = self.accounts.lock().await;
        data.accounts.iter().any(|account| account.email == email)
    }

    async fn verify_password(&self, password: &str, phc: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let phc = phc.to_string();
        tokio::task::spawn_blocking(move || -> Result<bool, AuthError> {
            let parsed = PasswordHash::new(&phc).map_err(|err| AuthError::Hashing(err.to_string()))?;
            Ok(hasher.verify_password(password.as_bytes(), &parsed).is_ok())
        })
        .await
        .map_err(|err| AuthError::Hashing(err.to_string()))?
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if valid { Ok(email) } else { Err(AuthError::InvalidEmail) }
}

impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email)?;
        if self.limiter.is_blocked(&email).await {
            warn!(%email, "sign-in blocked after repeated failures");
            return Err(AuthError::TooManyRequests);
        }

        let account = {
            let data = self.accounts.lock().await;
            data.accounts.iter().find(|account| account.email == email).cloned()
        };
        let Some(account) = account else {
            self.limiter.record_failure(&email).await;
            return Err(AuthError::UserNotFound);
        };

        if !self.verify_password(password, &account.password_hash).await? {
            self.limiter.record_failure(&email).await;
            return Err(AuthError::WrongPassword);
        }

        self.limiter.clear(&email).await;
        let identity = Identity {
            uid: account.uid,
            email: Some(account.email),
        };
        info!(uid = %identity.uid, "signed in");
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        if self.email_taken(&email).await {
            return Err(AuthError::EmailAlreadyInUse);
        }
        let password_hash = self.hash_password(password).await?;

        let mut data = self.accounts.lock().await;
        // Another sign-up may have claimed the email while hashing.
        if data.accounts.iter().any(|account| account.email == email) {
            return Err(AuthError::EmailAlreadyInUse);
        }
        let account = Account {
            uid: Uuid::new_v4().simple().to_string(),
            email,
            password_hash,
        };
        data.accounts.push(account.clone());
        if let Err(err) = persist_json(&self.path, &*data).await {
            data.accounts.pop();
            return Err(err.into());
        }
        drop(data);

        let identity = Identity {
            uid: account.uid,
            email: Some(account.email),
        };
        info!(uid = %identity.uid, "account created");
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.current.borrow().is_some() {
            info!("signed out");
        }
        self.publish(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }
}
