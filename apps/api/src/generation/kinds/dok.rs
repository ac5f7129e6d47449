use serde::{Deserialize, Serialize};

use crate::auth::Access;
use crate::forms::{FormRejection, RawForm, Validator};
use crate::generation::prompts::{DOK_ANSWER_KEY, DOK_STANDARDS, DOK_SYSTEM};
use crate::generation::{markdown_system, Artifact, ContentType};
use crate::models::record::ContentKind;
use crate::prompt::{assemble, ChatMessage, Fragment};

/// Depth of Knowledge question set with an answer key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dok {
    pub standards: String,
    pub grade_level: String,
}

impl ContentType for Dok {
    const KIND: ContentKind = ContentKind::Dok;
    const ACCESS: Access = Access::ValidSubscription;
}

impl Artifact for Dok {
    fn from_form(form: &RawForm) -> Result<Self, FormRejection> {
        let mut v = Validator::new(form);
        let standards = v.text("standards", 3, Some(2500));
        let grade_level = v.text("grade_level", 3, Some(255));
        v.finish(|| Dok {
            standards,
            grade_level,
        })
    }

    fn messages(&self) -> Vec<ChatMessage> {
        assemble(
            &markdown_system(DOK_SYSTEM),
            &[("grade_level", self.grade_level.as_str())],
            &[
                Fragment::user_with(DOK_STANDARDS, &self.standards),
                Fragment::user(DOK_ANSWER_KEY),
            ],
        )
    }
}
