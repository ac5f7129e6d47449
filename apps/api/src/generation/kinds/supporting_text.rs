use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Access;
use crate::errors::AppError;
use crate::forms::{FormRejection, RawForm, Validator};
use crate::generation::prompts::{
    SUPPORTING_TEXT_COMPLEXITY, SUPPORTING_TEXT_CONTEXT, SUPPORTING_TEXT_LENGTH,
    SUPPORTING_TEXT_OBJECTIVE, SUPPORTING_TEXT_STANDARDS, SUPPORTING_TEXT_SYSTEM,
};
use crate::generation::{
    generate_and_persist, markdown_system, ContentType, GenerationRequest, DEFAULT_TEMPERATURE,
};
use crate::models::record::{ContentKind, RecordRow};
use crate::prompt::{assemble, ChatMessage, Fragment};
use crate::state::AppState;

use super::lesson_plan::LessonPlan;

/// A reading text written to support one of the user's lesson plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportingText {
    /// "above", "below" or "on" the lesson plan's grade level.
    pub above_or_below: String,
    pub number_of_levels: Option<i64>,
    /// Target length in words.
    pub text_length: i64,
}

impl ContentType for SupportingText {
    const KIND: ContentKind = ContentKind::SupportingText;
    const ACCESS: Access = Access::Authenticated;
}

impl SupportingText {
    pub fn from_form(form: &RawForm) -> Result<Self, FormRejection> {
        let mut v = Validator::new(form);
        let above_or_below = v.one_of("above_or_below", &["above", "below", "on"]);
        let number_of_levels = v.optional_number("number_of_levels", 0, 5);
        let text_length = v.number("text_length", 10, 2500);
        v.finish(|| SupportingText {
            above_or_below: above_or_below.to_string(),
            number_of_levels,
            text_length,
        })
    }

    /// "2 above", or just "above" when no level count was given.
    fn complexity(&self) -> String {
        match self.number_of_levels {
            Some(levels) if levels > 0 => format!("{levels} {}", self.above_or_below),
            _ => self.above_or_below.clone(),
        }
    }

    pub fn messages(&self, lesson_plan: &LessonPlan) -> Vec<ChatMessage> {
        let complexity = self.complexity();
        let length = self.text_length.to_string();
        assemble(
            &markdown_system(SUPPORTING_TEXT_SYSTEM),
            &[("grade_level", lesson_plan.grade_level.as_str())],
            &[
                Fragment::user_with(SUPPORTING_TEXT_OBJECTIVE, &lesson_plan.objective),
                Fragment::user_if(
                    SUPPORTING_TEXT_CONTEXT,
                    lesson_plan.additional_context.as_deref(),
                ),
                Fragment::user_if(SUPPORTING_TEXT_STANDARDS, lesson_plan.standards.as_deref()),
                Fragment::user_with(SUPPORTING_TEXT_COMPLEXITY, &complexity),
                Fragment::user_with(SUPPORTING_TEXT_LENGTH, &length),
            ],
        )
    }
}

/// Generates a supporting text for a lesson plan the user owns.
pub async fn create_supporting_text(
    state: &AppState,
    user_id: Uuid,
    lesson_plan_id: Uuid,
    supporting_text: SupportingText,
) -> Result<RecordRow, AppError> {
    let lesson_plan_row = state
        .store
        .get_record(ContentKind::LessonPlan, user_id, lesson_plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("lesson plan {lesson_plan_id} not found")))?;
    let lesson_plan: LessonPlan = serde_json::from_value(lesson_plan_row.inputs.clone())
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("lesson plan {lesson_plan_id} inputs: {e}"))
        })?;

    let request = GenerationRequest {
        kind: ContentKind::SupportingText,
        user_id,
        parent_id: Some(lesson_plan_id),
        inputs: serde_json::to_value(&supporting_text).map_err(anyhow::Error::from)?,
        is_public: false,
        messages: supporting_text.messages(&lesson_plan),
        temperature: DEFAULT_TEMPERATURE,
        follow_ups: Vec::new(),
    };
    generate_and_persist(state, request).await
}
