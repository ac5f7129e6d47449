use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::Access;
use crate::dispatch::{Job, SummaryRequest};
use crate::errors::AppError;
use crate::extract::{table_from_cells, table_to_markdown};
use crate::forms::{FormRejection, RawForm, Validator};
use crate::generation::prompts::{
    RUBRIC_CUSTOMIZATION, RUBRIC_DESCRIPTION, RUBRIC_OBJECTIVE, RUBRIC_POINT_SCALE, RUBRIC_SYSTEM,
    RUBRIC_TITLE,
};
use crate::generation::{markdown_system, Artifact, ContentType, FollowUp};
use crate::models::record::{ContentKind, NewRecord, RecordRow};
use crate::prompt::{assemble, ChatMessage, Fragment};
use crate::state::AppState;

const MAX_POINT_SCALE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub title: String,
    pub objective: String,
    pub description: String,
    pub grade_level: String,
    pub point_scale: i64,
    pub customization: Option<String>,
    pub public: bool,
}

impl ContentType for Rubric {
    const KIND: ContentKind = ContentKind::Rubric;
    const ACCESS: Access = Access::ValidSubscription;
}

impl Artifact for Rubric {
    fn from_form(form: &RawForm) -> Result<Self, FormRejection> {
        let mut v = Validator::new(form);
        let title = v.text("title", 3, None);
        let objective = v.text("objective", 3, Some(255));
        let description = v.text("description", 3, Some(2500));
        let grade_level = v.text("grade_level", 3, Some(255));
        let point_scale = v.number("point_scale", 1, MAX_POINT_SCALE);
        let customization = v.optional_text("customization", 1, Some(2500));
        let public = public_flag(&mut v, form);
        v.finish(|| Rubric {
            title,
            objective,
            description,
            grade_level,
            point_scale,
            customization,
            public,
        })
    }

    fn messages(&self) -> Vec<ChatMessage> {
        let point_scale = self.point_scale.to_string();
        assemble(
            &markdown_system(RUBRIC_SYSTEM),
            &[("grade_level", self.grade_level.as_str())],
            &[
                Fragment::user_with(RUBRIC_TITLE, &self.title),
                Fragment::user_with(RUBRIC_DESCRIPTION, &self.description),
                Fragment::user_with(RUBRIC_OBJECTIVE, &self.objective),
                Fragment::user_with(RUBRIC_POINT_SCALE, &point_scale),
                Fragment::user_if(RUBRIC_CUSTOMIZATION, self.customization.as_deref()),
            ],
        )
    }

    fn follow_ups(&self) -> Vec<FollowUp> {
        vec![FollowUp::SummarizeOutput { words: 10 }]
    }

    fn is_public(&self) -> bool {
        self.public
    }
}

/// Optional `public` yes/no field; absent means private.
pub fn public_flag(v: &mut Validator<'_>, form: &RawForm) -> bool {
    match form.get("public") {
        Some(raw) if !raw.trim().is_empty() => v.one_of("public", &["yes", "no"]) == "yes",
        _ => false,
    }
}

/// A finished rubric supplied by the teacher instead of generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricUpload {
    pub title: String,
    pub objective: String,
    pub description: Option<String>,
    pub grade_level: String,
    pub public: bool,
}

impl RubricUpload {
    pub fn from_form(form: &RawForm) -> Result<Self, FormRejection> {
        let mut v = Validator::new(form);
        let title = v.text("title", 3, None);
        let objective = v.text("objective", 3, Some(255));
        let description = v.optional_text("description", 3, Some(2500));
        let grade_level = v.text("grade_level", 3, Some(255));
        let public = public_flag(&mut v, form);
        v.finish(|| RubricUpload {
            title,
            objective,
            description,
            grade_level,
            public,
        })
    }
}

/// Stores an uploaded rubric. The PDF wins when both a document and table
/// cells were sent. No generation happens; the extracted Markdown is the output.
pub async fn upload_rubric(
    state: &AppState,
    user_id: Uuid,
    form: &RawForm,
    document: Option<Bytes>,
) -> Result<RecordRow, AppError> {
    let upload = RubricUpload::from_form(form)?;

    let output = match document {
        Some(document) => state.extractor.extract(document).await?,
        None => {
            let table = table_from_cells(form.pairs())?;
            table_to_markdown(&table).ok_or_else(|| {
                FormRejection::single("pdf", "Upload a PDF or fill in the rubric table")
            })?
        }
    };

    let record = state
        .store
        .create_record(NewRecord {
            kind: ContentKind::Rubric,
            user_id,
            parent_id: None,
            inputs: serde_json::to_value(&upload).map_err(anyhow::Error::from)?,
            output,
            is_public: upload.public,
        })
        .await?;
    info!("Stored uploaded rubric {} for user {user_id}", record.id);

    state.dispatcher.enqueue(Job::Summarize(SummaryRequest {
        kind: ContentKind::Rubric,
        instance_id: record.id,
        user_id,
        text: record.output.clone(),
        words: 10,
    }));

    Ok(record)
}
