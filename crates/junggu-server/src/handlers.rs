//! Session route handlers.
//!
//! Every handler locks its session for the whole request, so actions on one
//! session run one at a time while different sessions proceed in parallel.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use junggu_core::{FilterSelection, FilterToggle, PlaceRecord, SessionId, Transcript};
use junggu_runtime::{ChatState, ReplyKind, SessionContext};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::errors::ApiError;
use crate::render::RenderModel;
use crate::server::AppState;

/// `POST /sessions` response.
#[derive(Debug, Serialize)]
pub struct CreatedSession {
    /// New session ID.
    pub session_id: SessionId,
}

/// Snapshot of one session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// Session ID.
    pub session_id: SessionId,
    /// Current filter selection.
    pub selection: FilterSelection,
    /// Anchor, filtered places, then chat additions.
    pub visible: Vec<PlaceRecord>,
    /// Chat transcript.
    pub transcript: Transcript,
    /// Chat state.
    pub state: ChatState,
}

impl SessionView {
    fn of(ctx: &SessionContext, state: &AppState) -> Self {
        Self {
            session_id: ctx.id().clone(),
            selection: ctx.selection(),
            visible: ctx.visible(&state.store),
            transcript: ctx.transcript().clone(),
            state: ctx.chat_state(),
        }
    }
}

/// `POST /sessions/{id}/chat` body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Message text.
    pub text: String,
}

/// `POST /sessions/{id}/chat` response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// How the turn ended.
    pub outcome: ReplyKind,
    /// Places this turn added to the map.
    pub added_places: Vec<PlaceRecord>,
    /// Full transcript after the turn.
    pub transcript: Transcript,
}

/// `POST /sessions`
#[instrument(skip_all)]
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreatedSession>), ApiError> {
    let session_id = state.sessions.create_session()?;
    info!(session_id = %session_id, "session started");
    Ok((StatusCode::CREATED, Json(CreatedSession { session_id })))
}

/// `GET /sessions/{id}`
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.sessions.get(&SessionId::from_string(id))?;
    let ctx = session.lock().await;
    Ok(Json(SessionView::of(&ctx, &state)))
}

/// `DELETE /sessions/{id}`
#[instrument(skip(state))]
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sessions.end_session(&SessionId::from_string(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /sessions/{id}/filter`
#[instrument(skip(state, body))]
pub async fn toggle_filter(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<FilterToggle>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.sessions.get(&SessionId::from_string(id))?;
    let Json(toggle) = body?;
    let mut ctx = session.lock().await;
    let _ = ctx.toggle(toggle);
    Ok(Json(SessionView::of(&ctx, &state)))
}

/// `POST /sessions/{id}/chat`
#[instrument(skip(state, body))]
pub async fn chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session = state.sessions.get(&SessionId::from_string(id))?;
    let Json(body) = body?;
    debug!(text_len = body.text.len(), "chat message received");
    let mut ctx = session.lock().await;
    let outcome = ctx.submit(&body.text, state.provider.as_ref()).await;
    Ok(Json(ChatResponse {
        outcome: outcome.kind,
        added_places: outcome.added_places,
        transcript: ctx.transcript().clone(),
    }))
}

/// `GET /sessions/{id}/render`
pub async fn render(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RenderModel>, ApiError> {
    let session = state.sessions.get(&SessionId::from_string(id))?;
    let ctx = session.lock().await;
    Ok(Json(RenderModel::from_visible(ctx.visible(&state.store))))
}
