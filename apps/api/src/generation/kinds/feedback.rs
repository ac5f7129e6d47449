use serde::{Deserialize, Serialize};

use crate::auth::{Access, CREATE_CHAT};
use crate::forms::{FormRejection, RawForm, Validator};
use crate::generation::{Artifact, ContentType, FollowUp};
use crate::models::record::{ContentKind, SubField};
use crate::prompt::{assemble, ChatMessage, Fragment};

/// Free-form writing feedback: the teacher supplies the assistant's role,
/// the rubric and the requirements, and the student's response is graded
/// against them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub assistant_role: String,
    pub rubric: String,
    pub requirements: String,
    pub student_response: String,
}

impl ContentType for Feedback {
    const KIND: ContentKind = ContentKind::Feedback;
    const ACCESS: Access = Access::Permission(CREATE_CHAT);
}

impl Artifact for Feedback {
    fn from_form(form: &RawForm) -> Result<Self, FormRejection> {
        let mut v = Validator::new(form);
        let assistant_role = v.text("assistant_role", 3, Some(2500));
        let rubric = v.text("rubric", 3, None);
        let requirements = v.text("requirements", 3, None);
        let student_response = v.text("student_response", 10, None);
        v.finish(|| Feedback {
            assistant_role,
            rubric,
            requirements,
            student_response,
        })
    }

    fn messages(&self) -> Vec<ChatMessage> {
        let system = [
            self.assistant_role.as_str(),
            self.rubric.as_str(),
            self.requirements.as_str(),
        ]
        .join("\n");
        assemble(
            &system,
            &[],
            &[Fragment::user_with("{value}", &self.student_response)],
        )
    }

    fn follow_ups(&self) -> Vec<FollowUp> {
        vec![
            FollowUp::Summarize {
                text: self.requirements.clone(),
                words: 20,
            },
            FollowUp::Format {
                sub_field: SubField::StudentResponse,
                text: self.student_response.clone(),
            },
            FollowUp::Format {
                sub_field: SubField::Rubric,
                text: self.rubric.clone(),
            },
            FollowUp::Format {
                sub_field: SubField::Requirements,
                text: self.requirements.clone(),
            },
        ]
    }
}
