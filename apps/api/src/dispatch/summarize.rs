use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::forms::{FormRejection, RawForm, Validator};
use crate::llm_client::prompts::{SUMMARY_LENGTH, SUMMARY_SYSTEM};
use crate::llm_client::TextGenerator;
use crate::models::record::{ContentKind, SummaryRow};
use crate::prompt::{assemble, ChatMessage, Fragment};
use crate::store::{ContentStore, SummaryUpsert};

pub const MIN_TEXT_CHARS: usize = 20;
pub const MAX_TEXT_CHARS: usize = 100_000;
pub const MIN_WORDS: i64 = 10;
pub const MAX_WORDS: i64 = 1000;

const SUMMARY_TEMPERATURE: f32 = 0.1;

/// Summarize `text` into roughly `words` words and store it against the
/// `(kind, instance_id)` record.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub kind: ContentKind,
    pub instance_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub words: u32,
}

impl SummaryRequest {
    /// Form fields: `content_type`, `instance_id`, `text`, `words`.
    pub fn from_form(user_id: Uuid, form: &RawForm) -> Result<Self, FormRejection> {
        let mut v = Validator::new(form);
        let kind = v.parse::<ContentKind>("content_type");
        let instance_id = v.uuid("instance_id");
        let text = v.text("text", MIN_TEXT_CHARS, Some(MAX_TEXT_CHARS));
        let words = v.number("words", MIN_WORDS, MAX_WORDS);
        let (instance_id, text, words) = v.finish(|| (instance_id, text, words))?;

        Ok(Self {
            kind: kind.ok_or_else(|| FormRejection::single("content_type", "Required"))?,
            instance_id,
            user_id,
            text,
            words: words as u32,
        })
    }

    /// Same bounds as the form, for jobs built by the pipeline.
    pub fn check(&self) -> Result<(), FormRejection> {
        let len = self.text.chars().count();
        if !(MIN_TEXT_CHARS..=MAX_TEXT_CHARS).contains(&len) {
            return Err(FormRejection::single(
                "text",
                format!("Must be between {MIN_TEXT_CHARS} and {MAX_TEXT_CHARS} characters"),
            ));
        }
        if !(MIN_WORDS..=MAX_WORDS).contains(&i64::from(self.words)) {
            return Err(FormRejection::single(
                "words",
                format!("Must be between {MIN_WORDS} and {MAX_WORDS}"),
            ));
        }
        Ok(())
    }
}

pub fn summary_messages(text: &str, words: u32) -> Vec<ChatMessage> {
    let words = words.to_string();
    assemble(
        SUMMARY_SYSTEM,
        &[],
        &[
            Fragment::user_with("{value}", text),
            Fragment::user_with(SUMMARY_LENGTH, &words),
        ],
    )
}

/// Generates the summary and upserts it. The instance must belong to the user.
pub async fn summarize(
    store: &dyn ContentStore,
    llm: &dyn TextGenerator,
    request: &SummaryRequest,
) -> Result<SummaryRow, AppError> {
    request.check()?;

    if store
        .get_record(request.kind, request.user_id, request.instance_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(format!(
            "{} {} not found",
            request.kind, request.instance_id
        )));
    }

    let messages = summary_messages(&request.text, request.words);
    let generation = llm
        .generate(&messages, SUMMARY_TEMPERATURE)
        .await
        .map_err(|source| AppError::Generation {
            record_id: Some(request.instance_id),
            source,
        })?;

    let row = store
        .upsert_summary(SummaryUpsert {
            user_id: request.user_id,
            kind: request.kind,
            instance_id: request.instance_id,
            summary: generation.text.trim().to_string(),
        })
        .await?;

    info!("Summary stored for {} {}", request.kind, request.instance_id);
    Ok(row)
}
