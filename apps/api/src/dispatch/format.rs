use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::forms::{FormRejection, RawForm, Validator};
use crate::llm_client::prompts::FORMAT_SYSTEM;
use crate::llm_client::TextGenerator;
use crate::models::record::{ContentKind, FormatRow, SubField};
use crate::prompt::{assemble, ChatMessage, Fragment};
use crate::store::{ContentStore, FormatUpsert};

use super::summarize::{MAX_TEXT_CHARS, MIN_TEXT_CHARS};

const FORMAT_TEMPERATURE: f32 = 0.0;

/// Render one raw input field of a record as Markdown.
#[derive(Debug, Clone)]
pub struct FormatRequest {
    pub kind: ContentKind,
    pub sub_field: SubField,
    pub instance_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
}

impl FormatRequest {
    /// Form fields: `content_type`, `sub_field`, `instance_id`, `text`.
    pub fn from_form(user_id: Uuid, form: &RawForm) -> Result<Self, FormRejection> {
        let mut v = Validator::new(form);
        let kind = v.parse::<ContentKind>("content_type");
        let sub_field = v.parse::<SubField>("sub_field");
        let instance_id = v.uuid("instance_id");
        let text = v.text("text", MIN_TEXT_CHARS, Some(MAX_TEXT_CHARS));
        let (instance_id, text) = v.finish(|| (instance_id, text))?;

        Ok(Self {
            kind: kind.ok_or_else(|| FormRejection::single("content_type", "Required"))?,
            sub_field: sub_field.ok_or_else(|| FormRejection::single("sub_field", "Required"))?,
            instance_id,
            user_id,
            text,
        })
    }

    pub fn check(&self) -> Result<(), FormRejection> {
        let len = self.text.chars().count();
        if !(MIN_TEXT_CHARS..=MAX_TEXT_CHARS).contains(&len) {
            return Err(FormRejection::single(
                "text",
                format!("Must be between {MIN_TEXT_CHARS} and {MAX_TEXT_CHARS} characters"),
            ));
        }
        Ok(())
    }
}

/// Hex SHA-256 of the raw text; identical text always hashes the same.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

pub fn format_messages(text: &str) -> Vec<ChatMessage> {
    assemble(FORMAT_SYSTEM, &[], &[Fragment::user_with("{value}", text)])
}

/// Formats the text and upserts the result. A prior format of the same kind
/// and sub-field whose raw text hashed identically is reused without a
/// generation call.
pub async fn format(
    store: &dyn ContentStore,
    llm: &dyn TextGenerator,
    request: &FormatRequest,
) -> Result<FormatRow, AppError> {
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

    let input_hash = content_hash(&request.text);
    let cached = store
        .find_format_by_hash(request.user_id, request.kind, request.sub_field, &input_hash)
        .await?;

    let output = match cached {
        Some(prior) => {
            info!(
                "Reusing {} format {} for {} {}",
                request.sub_field, prior.id, request.kind, request.instance_id
            );
            prior.output
        }
        None => {
            let messages = format_messages(&request.text);
            llm.generate(&messages, FORMAT_TEMPERATURE)
                .await
                .map_err(|source| AppError::Generation {
                    record_id: Some(request.instance_id),
                    source,
                })?
                .text
        }
    };

    let row = store
        .upsert_format(FormatUpsert {
            user_id: request.user_id,
            kind: request.kind,
            sub_field: request.sub_field,
            instance_id: request.instance_id,
            input_hash,
            output,
        })
        .await?;

    info!(
        "{} format stored for {} {}",
        request.sub_field, request.kind, request.instance_id
    );
    Ok(row)
}
