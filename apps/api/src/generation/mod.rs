//! Generation: turns a validated form into a persisted teaching artifact.
//!
//! Flow: access check → validate → create record (empty output) → assemble
//!       prompt → generate → update output → enqueue follow-ups → redirect.
//!
//! Every kind plugs into the same pipeline through the `Artifact` trait; the
//! per-kind modules under `kinds` only declare fields, prompt fragments and
//! follow-ups.

use serde::Serialize;

use crate::auth::Access;
use crate::forms::{FormRejection, RawForm};
use crate::llm_client::prompts::MARKDOWN_REPLY;
use crate::models::record::ContentKind;
use crate::prompt::ChatMessage;

pub mod handlers;
pub mod kinds;
pub mod pipeline;
pub mod prompts;

pub use pipeline::{generate_and_persist, FollowUp, GenerationRequest};

/// Temperature used by every kind unless it overrides `Artifact::TEMPERATURE`.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// A stored content kind that can be listed and viewed.
pub trait ContentType {
    const KIND: ContentKind;
    const ACCESS: Access;
    /// Kind of the records nested under this one, shown on its detail view.
    const CHILD: Option<ContentKind> = None;
}

/// A content kind generated from a single form.
///
/// The implementing type is the validated input; it is serialized as the
/// record's `inputs`.
pub trait Artifact: ContentType + Serialize + Sized + Send + Sync + 'static {
    const TEMPERATURE: f32 = DEFAULT_TEMPERATURE;

    fn from_form(form: &RawForm) -> Result<Self, FormRejection>;

    fn messages(&self) -> Vec<ChatMessage>;

    fn follow_ups(&self) -> Vec<FollowUp> {
        Vec::new()
    }

    fn is_public(&self) -> bool {
        false
    }
}

/// A system template with the Markdown reply instruction appended.
pub fn markdown_system(template: &str) -> String {
    format!("{template} {MARKDOWN_REPLY}")
}
