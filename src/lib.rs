pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod identity;
pub mod loader;
pub mod locale;
pub mod models;
pub mod recorder;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod toasts;
pub mod trends;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
