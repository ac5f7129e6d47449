//! Axum route handlers for the content API.
//!
//! Creation endpoints take urlencoded forms and answer `303 See Other` to the
//! new record's detail route. List and detail endpoints return JSON.

use axum::{
    extract::{Multipart, Path, State},
    response::Redirect,
    Form, Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::auth::{require_access, CurrentUser};
use crate::errors::AppError;
use crate::forms::RawForm;
use crate::generation::kinds::assignment::{create_assignment, Assignment};
use crate::generation::kinds::rubric::upload_rubric;
use crate::generation::kinds::submission::{create_submission, Submission};
use crate::generation::kinds::supporting_text::{create_supporting_text, SupportingText};
use crate::generation::kinds::Rubric;
use crate::generation::{generate_and_persist, Artifact, ContentType, GenerationRequest};
use crate::models::record::{group_by_date, ContentKind, DateGroup, FormatRow, RecordRow, SummaryRow};
use crate::state::AppState;

/// Multipart field carrying an uploaded rubric document.
const PDF_FIELD: &str = "pdf";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub groups: Vec<DateGroup>,
    pub summaries: Vec<SummaryRow>,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub record: RecordRow,
    pub summary: Option<SummaryRow>,
    pub formats: Vec<FormatRow>,
    /// Supporting texts of a lesson plan, submissions of an assignment.
    pub children: Vec<RecordRow>,
}

#[derive(Debug, Serialize)]
pub struct PublicListResponse {
    pub groups: Vec<DateGroup>,
}

// ────────────────────────────────────────────────────────────────────────────
// Generic handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/{kind}
///
/// Validates the form, then runs the generate-and-persist pipeline.
pub async fn handle_create<A: Artifact>(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    require_access(state.store.as_ref(), user, A::ACCESS).await?;

    let artifact = A::from_form(&RawForm::new(pairs))?;
    let request = GenerationRequest::for_artifact(user.id, &artifact)?;
    let record = generate_and_persist(&state, request).await?;

    Ok(Redirect::to(&A::KIND.detail_path(record.id, None)))
}

/// GET /api/v1/{kind}
///
/// The user's records grouped by creation date, newest first, with their summaries.
pub async fn handle_list<T: ContentType>(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ListResponse>, AppError> {
    require_access(state.store.as_ref(), user, T::ACCESS).await?;

    let records = state.store.list_records(T::KIND, user.id).await?;
    let summaries = state.store.list_summaries(T::KIND, user.id).await?;

    Ok(Json(ListResponse {
        groups: group_by_date(records),
        summaries,
    }))
}

/// GET /api/v1/{kind}/:id
pub async fn handle_detail<T: ContentType>(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DetailResponse>, AppError> {
    require_access(state.store.as_ref(), user, T::ACCESS).await?;

    let record = owned_record(&state, T::KIND, user.id, id).await?;
    let children = match T::CHILD {
        Some(child) => state.store.list_children(child, user.id, id).await?,
        None => Vec::new(),
    };

    detail(&state, T::KIND, record, children).await
}

// ────────────────────────────────────────────────────────────────────────────
// Rubrics
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/rubrics/upload
///
/// Multipart: text fields plus either a `pdf` file or `cell-R-C` table fields.
pub async fn handle_upload_rubric(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    require_access(state.store.as_ref(), user, Rubric::ACCESS).await?;

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut document: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == PDF_FIELD {
            let data = field.bytes().await?;
            // Browsers send an empty part when no file was chosen.
            if !data.is_empty() {
                document = Some(data);
            }
        } else {
            let value = field.text().await?;
            pairs.push((name, value));
        }
    }

    let record = upload_rubric(&state, user.id, &RawForm::new(pairs), document).await?;
    Ok(Redirect::to(&ContentKind::Rubric.detail_path(record.id, None)))
}

/// GET /api/v1/rubrics/public
///
/// Rubrics any user has shared. No authentication required.
pub async fn handle_list_public_rubrics(
    State(state): State<AppState>,
) -> Result<Json<PublicListResponse>, AppError> {
    let records = state.store.list_public(ContentKind::Rubric).await?;
    Ok(Json(PublicListResponse {
        groups: group_by_date(records),
    }))
}

/// GET /api/v1/rubrics/public/:id
pub async fn handle_get_public_rubric(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecordRow>, AppError> {
    state
        .store
        .get_public_record(ContentKind::Rubric, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("public rubric {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Assignments and submissions
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assignments
///
/// Stores an assignment against a rubric the user can see. No generation.
pub async fn handle_create_assignment(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    require_access(state.store.as_ref(), user, Assignment::ACCESS).await?;

    let assignment = Assignment::from_form(&RawForm::new(pairs))?;
    let record = create_assignment(state.store.as_ref(), user.id, assignment).await?;

    Ok(Redirect::to(&ContentKind::Assignment.detail_path(record.id, None)))
}

/// POST /api/v1/assignments/:id/submissions
pub async fn handle_create_submission(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(assignment_id): Path<Uuid>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    require_access(state.store.as_ref(), user, Submission::ACCESS).await?;

    let submission = Submission::from_form(&RawForm::new(pairs))?;
    let record = create_submission(&state, user.id, assignment_id, submission).await?;

    Ok(Redirect::to(
        &ContentKind::Submission.detail_path(record.id, Some(assignment_id)),
    ))
}

/// GET /api/v1/assignments/:id/submissions
pub async fn handle_list_submissions(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(assignment_id): Path<Uuid>,
) -> Result<Json<ListResponse>, AppError> {
    require_access(state.store.as_ref(), user, Submission::ACCESS).await?;

    owned_record(&state, ContentKind::Assignment, user.id, assignment_id).await?;
    let records = state
        .store
        .list_children(ContentKind::Submission, user.id, assignment_id)
        .await?;

    Ok(Json(ListResponse {
        groups: group_by_date(records),
        summaries: Vec::new(),
    }))
}

/// GET /api/v1/assignments/:id/submissions/:submission_id
pub async fn handle_get_submission(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((assignment_id, submission_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DetailResponse>, AppError> {
    require_access(state.store.as_ref(), user, Submission::ACCESS).await?;
    child_detail(&state, ContentKind::Submission, user.id, assignment_id, submission_id).await
}

// ────────────────────────────────────────────────────────────────────────────
// Supporting texts
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/lesson-plans/:id/supporting-texts
pub async fn handle_create_supporting_text(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(lesson_plan_id): Path<Uuid>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    require_access(state.store.as_ref(), user, SupportingText::ACCESS).await?;

    let supporting_text = SupportingText::from_form(&RawForm::new(pairs))?;
    let record = create_supporting_text(&state, user.id, lesson_plan_id, supporting_text).await?;

    Ok(Redirect::to(
        &ContentKind::SupportingText.detail_path(record.id, Some(lesson_plan_id)),
    ))
}

/// GET /api/v1/lesson-plans/:id/supporting-texts/:text_id
pub async fn handle_get_supporting_text(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((lesson_plan_id, text_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DetailResponse>, AppError> {
    require_access(state.store.as_ref(), user, SupportingText::ACCESS).await?;
    child_detail(&state, ContentKind::SupportingText, user.id, lesson_plan_id, text_id).await
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn owned_record(
    state: &AppState,
    kind: ContentKind,
    user_id: Uuid,
    id: Uuid,
) -> Result<RecordRow, AppError> {
    state
        .store
        .get_record(kind, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{kind} {id} not found")))
}

async fn child_detail(
    state: &AppState,
    kind: ContentKind,
    user_id: Uuid,
    parent_id: Uuid,
    id: Uuid,
) -> Result<Json<DetailResponse>, AppError> {
    let record = owned_record(state, kind, user_id, id).await?;
    if record.parent_id != Some(parent_id) {
        warn!("{kind} {id} requested under foreign parent {parent_id}");
        return Err(AppError::NotFound(format!("{kind} {id} not found")));
    }
    detail(state, kind, record, Vec::new()).await
}

async fn detail(
    state: &AppState,
    kind: ContentKind,
    record: RecordRow,
    children: Vec<RecordRow>,
) -> Result<Json<DetailResponse>, AppError> {
    let summary = state.store.get_summary(kind, record.id).await?;
    let formats = state.store.get_formats(kind, record.id).await?;
    Ok(Json(DetailResponse {
        record,
        summary,
        formats,
        children,
    }))
}

