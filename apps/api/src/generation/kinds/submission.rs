use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Access;
use crate::errors::AppError;
use crate::forms::{FormRejection, RawForm, Validator};
use crate::generation::prompts::{
    SUBMISSION_ACK_REQUIREMENTS, SUBMISSION_ACK_RUBRIC, SUBMISSION_AWAITING, SUBMISSION_FORMAT,
    SUBMISSION_REQUIREMENTS, SUBMISSION_RUBRIC, SUBMISSION_SYSTEM,
};
use crate::generation::{generate_and_persist, ContentType, GenerationRequest};
use crate::models::record::{ContentKind, RecordRow};
use crate::prompt::{assemble, ChatMessage, Fragment};
use crate::state::AppState;

use super::assignment::Assignment;

/// Feedback is graded against the rubric, so sampling stays deterministic.
const SUBMISSION_TEMPERATURE: f32 = 0.0;

/// A student's response to an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub student_response: String,
}

impl ContentType for Submission {
    const KIND: ContentKind = ContentKind::Submission;
    const ACCESS: Access = Access::ValidSubscription;
}

impl Submission {
    pub fn from_form(form: &RawForm) -> Result<Self, FormRejection> {
        let mut v = Validator::new(form);
        let student_response = v.text("student_response", 10, None);
        v.finish(|| Submission { student_response })
    }

    /// The requirement and rubric primer, then the student's response.
    pub fn messages(&self, assignment: &Assignment, rubric_output: &str) -> Vec<ChatMessage> {
        assemble(
            SUBMISSION_SYSTEM,
            &[("grade_level", assignment.grade_level.as_str())],
            &[
                Fragment::user_with(SUBMISSION_REQUIREMENTS, &assignment.requirements),
                Fragment::assistant(SUBMISSION_ACK_REQUIREMENTS),
                Fragment::user_with(SUBMISSION_RUBRIC, rubric_output),
                Fragment::assistant(SUBMISSION_ACK_RUBRIC),
                Fragment::user(SUBMISSION_FORMAT),
                Fragment::assistant(SUBMISSION_AWAITING),
                Fragment::user_with("{value}", &self.student_response),
            ],
        )
    }
}

/// Generates feedback on a submission to one of the user's assignments.
pub async fn create_submission(
    state: &AppState,
    user_id: Uuid,
    assignment_id: Uuid,
    submission: Submission,
) -> Result<RecordRow, AppError> {
    let assignment_row = state
        .store
        .get_record(ContentKind::Assignment, user_id, assignment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("assignment {assignment_id} not found")))?;
    let assignment = Assignment::from_record(&assignment_row)?;

    let rubric = state
        .store
        .get_visible_record(ContentKind::Rubric, user_id, assignment.rubric_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("rubric {} not found", assignment.rubric_id)))?;

    let request = GenerationRequest {
        kind: ContentKind::Submission,
        user_id,
        parent_id: Some(assignment_id),
        inputs: serde_json::to_value(&submission).map_err(anyhow::Error::from)?,
        is_public: false,
        messages: submission.messages(&assignment, &rubric.output),
        temperature: SUBMISSION_TEMPERATURE,
        follow_ups: Vec::new(),
    };
    generate_and_persist(state, request).await
}
