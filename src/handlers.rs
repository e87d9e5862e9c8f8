use crate::errors::AppError;
use crate::history::{self, HistoryEntry};
use crate::identity::AuthAction;
use crate::models::{
    CredentialsRequest, MoodCategory, SaveMoodRequest, SessionResponse, UserResponse,
};
use crate::recorder::{self, MoodDraft};
use crate::session::SessionContext;
use crate::state::AppState;
use crate::toasts::Toast;
use crate::trends::{self, TrendReport, TrendWindow};
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct MoodsResponse {
    pub loading: bool,
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    #[serde(default)]
    pub window: TrendWindow,
}

pub async fn index() -> Html<String> {
    Html(render_index())
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session = state.controller.state().await;
    let loading = match state.controller.context().await {
        Some(context) => context.is_loading().await,
        None => false,
    };

    Json(SessionResponse {
        state: session.name(),
        user: session.identity().map(|identity| UserResponse {
            uid: identity.uid.clone(),
            email: identity.email.clone(),
            display_name: identity.display_name(),
        }),
        loading,
    })
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<StatusCode, AppError> {
    submit(&state, AuthAction::SignIn, payload).await
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<StatusCode, AppError> {
    submit(&state, AuthAction::SignUp, payload).await
}

async fn submit(
    state: &AppState,
    action: AuthAction,
    payload: CredentialsRequest,
) -> Result<StatusCode, AppError> {
    state
        .controller
        .submit_credentials(action, payload.email.trim(), &payload.password)
        .await?;
    // The session itself changes once the provider's notification lands.
    Ok(StatusCode::ACCEPTED)
}

pub async fn sign_out(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.controller.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_moods(State(state): State<AppState>) -> Result<Json<MoodsResponse>, AppError> {
    let context = current_context(&state).await?;
    let records = context.records().await;
    Ok(Json(MoodsResponse {
        loading: context.is_loading().await,
        entries: history::present(&records),
    }))
}

pub async fn save_mood(
    State(state): State<AppState>,
    Json(payload): Json<SaveMoodRequest>,
) -> Result<Response, AppError> {
    let context = current_context(&state).await?;

    let category = match payload.mood.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            MoodCategory::parse_known(raw)
                .ok_or_else(|| AppError::bad_request(format!("unknown mood '{raw}'")))?,
        ),
    };
    let mut draft = MoodDraft {
        category,
        note: payload.note,
    };

    let controller = &state.controller;
    let Some(pending) =
        recorder::begin(&context, controller.toasts(), &mut draft, Utc::now()).await
    else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let entry = history::entry_in(&Local, &pending.record);
    recorder::spawn_remote_write(
        context,
        Arc::clone(controller.store()),
        Arc::clone(controller.toasts()),
        pending,
    );

    Ok((StatusCode::ACCEPTED, Json(entry)).into_response())
}

pub async fn get_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<TrendReport>, AppError> {
    let context = current_context(&state).await?;
    let records = context.records().await;
    Ok(Json(trends::aggregate(&records, query.window)))
}

pub async fn get_toasts(State(state): State<AppState>) -> Json<Vec<Toast>> {
    Json(state.controller.toasts().drain())
}

async fn current_context(state: &AppState) -> Result<Arc<SessionContext>, AppError> {
    state
        .controller
        .context()
        .await
        .ok_or_else(AppError::unauthorized)
}
