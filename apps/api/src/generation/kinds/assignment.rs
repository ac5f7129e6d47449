use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::Access;
use crate::errors::AppError;
use crate::forms::{FormRejection, RawForm, Validator};
use crate::generation::ContentType;
use crate::models::record::{ContentKind, NewRecord, RecordRow};
use crate::store::ContentStore;

/// An assignment built on a rubric. Stored as-is; students' submissions are
/// generated against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub rubric_id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub grade_level: String,
    pub assistant_role: Option<String>,
}

impl ContentType for Assignment {
    const KIND: ContentKind = ContentKind::Assignment;
    const ACCESS: Access = Access::ValidSubscription;
    const CHILD: Option<ContentKind> = Some(ContentKind::Submission);
}

impl Assignment {
    pub fn from_form(form: &RawForm) -> Result<Self, FormRejection> {
        let mut v = Validator::new(form);
        let rubric_id = v.uuid("rubric_id");
        let title = v.text("title", 3, Some(255));
        let description = v.text("description", 3, Some(2500));
        let requirements = v.text("requirements", 3, None);
        let grade_level = v.text("grade_level", 3, Some(255));
        let assistant_role = v.optional_text("assistant_role", 3, Some(2500));
        v.finish(|| Assignment {
            rubric_id,
            title,
            description,
            requirements,
            grade_level,
            assistant_role,
        })
    }

    pub fn from_record(record: &RecordRow) -> Result<Self, AppError> {
        serde_json::from_value(record.inputs.clone())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("assignment {} inputs: {e}", record.id)))
    }
}

/// Stores the assignment once its rubric is confirmed visible to the user
/// (owned, or public).
pub async fn create_assignment(
    store: &dyn ContentStore,
    user_id: Uuid,
    assignment: Assignment,
) -> Result<RecordRow, AppError> {
    if store
        .get_visible_record(ContentKind::Rubric, user_id, assignment.rubric_id)
        .await?
        .is_none()
    {
        return Err(FormRejection::single("rubric_id", "Rubric not found").into());
    }

    let record = store
        .create_record(NewRecord {
            kind: ContentKind::Assignment,
            user_id,
            parent_id: None,
            inputs: serde_json::to_value(&assignment).map_err(anyhow::Error::from)?,
            output: String::new(),
            is_public: false,
        })
        .await?;
    info!("Created assignment {} for user {user_id}", record.id);
    Ok(record)
}
