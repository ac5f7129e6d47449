use serde::{Deserialize, Serialize};

use crate::auth::{Access, CREATE_CHAT};
use crate::forms::{FormRejection, RawForm, Validator};
use crate::generation::prompts::{
    LESSON_PLAN_CONTEXT, LESSON_PLAN_OBJECTIVE, LESSON_PLAN_STANDARDS, LESSON_PLAN_SYSTEM,
};
use crate::generation::{markdown_system, Artifact, ContentType, FollowUp};
use crate::models::record::ContentKind;
use crate::prompt::{assemble, ChatMessage, Fragment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonPlan {
    pub objective: String,
    pub standards: Option<String>,
    pub additional_context: Option<String>,
    pub grade_level: String,
}

impl ContentType for LessonPlan {
    const KIND: ContentKind = ContentKind::LessonPlan;
    const ACCESS: Access = Access::Permission(CREATE_CHAT);
    const CHILD: Option<ContentKind> = Some(ContentKind::SupportingText);
}

impl Artifact for LessonPlan {
    fn from_form(form: &RawForm) -> Result<Self, FormRejection> {
        let mut v = Validator::new(form);
        let objective = v.text("objective", 3, None);
        let standards = v.optional_text("standards", 3, Some(255));
        let additional_context = v.optional_text("additional_context", 3, Some(2500));
        let grade_level = v.text("grade_level", 3, Some(255));
        v.finish(|| LessonPlan {
            objective,
            standards,
            additional_context,
            grade_level,
        })
    }

    fn messages(&self) -> Vec<ChatMessage> {
        assemble(
            &markdown_system(LESSON_PLAN_SYSTEM),
            &[("grade_level", self.grade_level.as_str())],
            &[
                Fragment::user_with(LESSON_PLAN_OBJECTIVE, &self.objective),
                Fragment::user_if(LESSON_PLAN_CONTEXT, self.additional_context.as_deref()),
                Fragment::user_if(LESSON_PLAN_STANDARDS, self.standards.as_deref()),
            ],
        )
    }

    fn follow_ups(&self) -> Vec<FollowUp> {
        vec![FollowUp::SummarizeOutput { words: 10 }]
    }
}
