pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::dispatch::handlers as follow_ups;
use crate::generation::handlers::{
    handle_create, handle_create_assignment, handle_create_submission,
    handle_create_supporting_text, handle_detail, handle_get_public_rubric,
    handle_get_submission, handle_get_supporting_text, handle_list, handle_list_public_rubrics,
    handle_list_submissions, handle_upload_rubric,
};
use crate::generation::kinds::{
    Assignment, Dok, Feedback, LessonPlan, Newsletter, Rubric, UnitPlan,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Lesson plans and their supporting texts
        .route(
            "/api/v1/lesson-plans",
            get(handle_list::<LessonPlan>).post(handle_create::<LessonPlan>),
        )
        .route("/api/v1/lesson-plans/:id", get(handle_detail::<LessonPlan>))
        .route(
            "/api/v1/lesson-plans/:id/supporting-texts",
            post(handle_create_supporting_text),
        )
        .route(
            "/api/v1/lesson-plans/:id/supporting-texts/:text_id",
            get(handle_get_supporting_text),
        )
        // Unit plans
        .route(
            "/api/v1/unit-plans",
            get(handle_list::<UnitPlan>).post(handle_create::<UnitPlan>),
        )
        .route("/api/v1/unit-plans/:id", get(handle_detail::<UnitPlan>))
        // Rubrics
        .route(
            "/api/v1/rubrics",
            get(handle_list::<Rubric>).post(handle_create::<Rubric>),
        )
        .route(
            "/api/v1/rubrics/upload",
            post(handle_upload_rubric).layer(upload_limit),
        )
        .route("/api/v1/rubrics/public", get(handle_list_public_rubrics))
        .route("/api/v1/rubrics/public/:id", get(handle_get_public_rubric))
        .route("/api/v1/rubrics/:id", get(handle_detail::<Rubric>))
        // DOK questions
        .route(
            "/api/v1/doks",
            get(handle_list::<Dok>).post(handle_create::<Dok>),
        )
        .route("/api/v1/doks/:id", get(handle_detail::<Dok>))
        // Newsletters
        .route(
            "/api/v1/newsletters",
            get(handle_list::<Newsletter>).post(handle_create::<Newsletter>),
        )
        .route("/api/v1/newsletters/:id", get(handle_detail::<Newsletter>))
        // Feedback
        .route(
            "/api/v1/feedback",
            get(handle_list::<Feedback>).post(handle_create::<Feedback>),
        )
        .route("/api/v1/feedback/:id", get(handle_detail::<Feedback>))
        // Assignments and submissions
        .route(
            "/api/v1/assignments",
            get(handle_list::<Assignment>).post(handle_create_assignment),
        )
        .route("/api/v1/assignments/:id", get(handle_detail::<Assignment>))
        .route(
            "/api/v1/assignments/:id/submissions",
            get(handle_list_submissions).post(handle_create_submission),
        )
        .route(
            "/api/v1/assignments/:id/submissions/:submission_id",
            get(handle_get_submission),
        )
        // Follow-ups
        .route("/api/v1/summaries", post(follow_ups::handle_summarize))
        .route("/api/v1/formats", post(follow_ups::handle_format))
        .with_state(state)
}
