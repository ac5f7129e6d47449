use serde::{Deserialize, Serialize};

use crate::auth::{Access, CREATE_CHAT};
use crate::forms::{FormRejection, RawForm, Validator};
use crate::generation::prompts::{
    UNIT_PLAN_CONTEXT, UNIT_PLAN_LENGTH, UNIT_PLAN_STANDARDS, UNIT_PLAN_SYSTEM, UNIT_PLAN_TOPICS,
};
use crate::generation::{markdown_system, Artifact, ContentType, FollowUp};
use crate::models::record::ContentKind;
use crate::prompt::{assemble, ChatMessage, Fragment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPlan {
    pub topics: String,
    pub standards: Option<String>,
    pub additional_context: Option<String>,
    pub grade_level: String,
    pub length_of_unit: String,
}

impl ContentType for UnitPlan {
    const KIND: ContentKind = ContentKind::UnitPlan;
    const ACCESS: Access = Access::Permission(CREATE_CHAT);
}

impl Artifact for UnitPlan {
    fn from_form(form: &RawForm) -> Result<Self, FormRejection> {
        let mut v = Validator::new(form);
        let topics = v.text("topics", 3, None);
        let standards = v.optional_text("standards", 3, Some(255));
        let additional_context = v.optional_text("additional_context", 3, Some(2500));
        let grade_level = v.text("grade_level", 3, Some(255));
        let length_of_unit = v.text("length_of_unit", 3, Some(255));
        v.finish(|| UnitPlan {
            topics,
            standards,
            additional_context,
            grade_level,
            length_of_unit,
        })
    }

    fn messages(&self) -> Vec<ChatMessage> {
        assemble(
            &markdown_system(UNIT_PLAN_SYSTEM),
            &[("grade_level", self.grade_level.as_str())],
            &[
                Fragment::user_with(UNIT_PLAN_TOPICS, &self.topics),
                Fragment::user_if(UNIT_PLAN_CONTEXT, self.additional_context.as_deref()),
                Fragment::user_if(UNIT_PLAN_STANDARDS, self.standards.as_deref()),
                Fragment::user_with(UNIT_PLAN_LENGTH, &self.length_of_unit),
            ],
        )
    }

    fn follow_ups(&self) -> Vec<FollowUp> {
        vec![FollowUp::SummarizeOutput { words: 10 }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::kinds::form;

    #[test]
    fn test_length_of_unit_comes_last() {
        let plan = UnitPlan::from_form(&form(&[
            ("topics", "fractions and decimals"),
            ("standards", "CCSS 4.NF"),
            ("grade_level", "4th"),
            ("length_of_unit", "three weeks"),
        ]))
        .unwrap();

        let messages = plan.messages();
        assert_eq!(messages.len(), 4);
        assert!(messages[1].content.ends_with("cover the following: fractions and decimals."));
        assert_eq!(
            messages[2].content,
            "The unit plan should be aligned to the following standards: CCSS 4.NF."
        );
        assert_eq!(
            messages[3].content,
            "The unit plan should cover the following length of time: three weeks."
        );
    }

    #[test]
    fn test_length_of_unit_is_required() {
        let rejection = UnitPlan::from_form(&form(&[
            ("topics", "fractions"),
            ("grade_level", "4th"),
        ]))
        .unwrap_err();
        assert_eq!(rejection.fields["length_of_unit"], vec!["Required"]);
    }
}
