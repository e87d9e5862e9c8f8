use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/session", get(handlers::get_session))
        .route("/api/auth/sign-in", post(handlers::sign_in))
        .route("/api/auth/sign-up", post(handlers::sign_up))
        .route("/api/auth/sign-out", post(handlers::sign_out))
        .route("/api/moods", get(handlers::list_moods).post(handlers::save_mood))
        .route("/api/trends", get(handlers::get_trends))
        .route("/api/toasts", get(handlers::get_toasts))
        .with_state(state)
}
