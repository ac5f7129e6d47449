//! Synchronous endpoints for the follow-up operations. Same validation and
//! upsert semantics as the queued jobs; the caller waits for the result.

use axum::{extract::State, Form, Json};

use crate::auth::{require_access, Access, CurrentUser, CREATE_CHAT};
use crate::errors::AppError;
use crate::forms::RawForm;
use crate::models::record::{FormatRow, SummaryRow};
use crate::state::AppState;

use super::format::{format, FormatRequest};
use super::summarize::{summarize, SummaryRequest};

/// POST /api/v1/summaries
///
/// Form: `content_type`, `instance_id`, `text`, `words`.
pub async fn handle_summarize(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Json<SummaryRow>, AppError> {
    require_access(state.store.as_ref(), user, Access::Permission(CREATE_CHAT)).await?;

    let request = SummaryRequest::from_form(user.id, &RawForm::new(pairs))?;
    let row = summarize(state.store.as_ref(), state.llm.as_ref(), &request).await?;
    Ok(Json(row))
}

/// POST /api/v1/formats
///
/// Form: `content_type`, `sub_field`, `instance_id`, `text`.
pub async fn handle_format(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Json<FormatRow>, AppError> {
    require_access(state.store.as_ref(), user, Access::Permission(CREATE_CHAT)).await?;

    let request = FormatRequest::from_form(user.id, &RawForm::new(pairs))?;
    let row = format(state.store.as_ref(), state.llm.as_ref(), &request).await?;
    Ok(Json(row))
}
