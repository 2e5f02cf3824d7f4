//! HTTP handlers for the chat endpoint.
//!
//! Thin glue: deserialize, run the session manager, map the two turn-fatal
//! errors onto status codes. A parse failure is the user's problem (422,
//! phrased as a clarification request); a generation failure is ours (502).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{SessionError, SessionManager, TurnError};
use crate::domain::foundation::SessionId;
use crate::domain::trip::TurnOutcome;

/// Shared handler state.
#[derive(Clone)]
pub struct ChatHandlers {
    pub sessions: Arc<SessionManager>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Omit to start a new session.
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: Option<String>,
    pub outcome: TurnOutcome,
    pub search_relaxed: bool,
    pub relaxation_note: Option<String>,
    pub candidate_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

fn error_response(status: StatusCode, code: &str, message: String) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            code: code.to_string(),
            message,
        }),
    )
}

pub async fn chat(
    State(handlers): State<ChatHandlers>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorBody>)> {
    let session_id = match request.session_id.as_deref() {
        None => None,
        Some(raw) => Some(raw.parse::<SessionId>().map_err(|_| {
            error_response(
                StatusCode::BAD_REQUEST,
                "INVALID_SESSION_ID",
                format!("'{raw}' is not a valid session id"),
            )
        })?),
    };

    match handlers
        .sessions
        .handle_message(session_id, &request.message)
        .await
    {
        Ok(reply) => Ok(Json(ChatResponse {
            session_id: reply.session_id.to_string(),
            reply: reply.report.reply,
            outcome: reply.report.outcome,
            search_relaxed: reply.report.search_relaxed,
            relaxation_note: reply.report.relaxation_note,
            candidate_count: reply.report.candidate_count,
        })),
        Err(SessionError::Turn(err)) => {
            let code = err.code().to_string();
            match err {
                TurnError::ParseFailure(_) => Err(error_response(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    &code,
                    format!(
                        "I couldn't understand that request ({err}). Could you rephrase it \
                         with a destination and dates?"
                    ),
                )),
                TurnError::GenerationFailure(_) => Err(error_response(
                    StatusCode::BAD_GATEWAY,
                    &code,
                    err.to_string(),
                )),
            }
        }
    }
}

pub async fn health() -> &'static str {
    "ok"
}
