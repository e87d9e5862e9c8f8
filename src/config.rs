use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Mood documents (`APP_DATA_PATH`).
    pub data_path: PathBuf,
    /// Accounts of the local identity provider (`APP_ACCOUNTS_PATH`).
    pub accounts_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: lookup("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            data_path: lookup("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/moods.json")),
            accounts_path: lookup("APP_ACCOUNTS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/accounts.json")),
        }
    }
}
