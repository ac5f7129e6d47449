//! The generate-and-persist pipeline shared by every generated kind.
//!
//! The record is always created before the provider is called, so a failed
//! or timed-out generation leaves exactly one record with an empty output.
//! Follow-up jobs are enqueued only once the output update has succeeded.

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dispatch::{FormatRequest, Job, SummaryRequest};
use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::models::record::{ContentKind, NewRecord, RecordRow, SubField};
use crate::prompt::ChatMessage;
use crate::state::AppState;

use super::Artifact;

/// Post-processing requested by a kind, resolved against the saved record.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowUp {
    /// Summarize the generated output.
    SummarizeOutput { words: u32 },
    /// Summarize one of the inputs.
    Summarize { text: String, words: u32 },
    /// Render one of the inputs as Markdown.
    Format { sub_field: SubField, text: String },
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub kind: ContentKind,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub inputs: Value,
    pub is_public: bool,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub follow_ups: Vec<FollowUp>,
}

impl GenerationRequest {
    pub fn for_artifact<A: Artifact>(user_id: Uuid, artifact: &A) -> Result<Self, AppError> {
        Ok(Self {
            kind: A::KIND,
            user_id,
            parent_id: None,
            inputs: serde_json::to_value(artifact).map_err(anyhow::Error::from)?,
            is_public: artifact.is_public(),
            messages: artifact.messages(),
            temperature: A::TEMPERATURE,
            follow_ups: artifact.follow_ups(),
        })
    }
}

/// Creates the record, generates its output and saves it.
///
/// Returns the updated record. On provider failure the empty record is left
/// in place and its id travels with the error.
pub async fn generate_and_persist(
    state: &AppState,
    request: GenerationRequest,
) -> Result<RecordRow, AppError> {
    let GenerationRequest {
        kind,
        user_id,
        parent_id,
        inputs,
        is_public,
        messages,
        temperature,
        follow_ups,
    } = request;

    let record = state
        .store
        .create_record(NewRecord {
            kind,
            user_id,
            parent_id,
            inputs,
            output: String::new(),
            is_public,
        })
        .await?;
    info!("Created {kind} {} for user {user_id}", record.id);

    debug!("Generating {kind} {} from {} messages", record.id, messages.len());
    let generation = state
        .llm
        .generate(&messages, temperature)
        .await
        .and_then(|generation| {
            if generation.text.trim().is_empty() {
                Err(LlmError::EmptyContent)
            } else {
                Ok(generation)
            }
        })
        .map_err(|source| AppError::Generation {
            record_id: Some(record.id),
            source,
        })?;
    debug!(
        "Generated {kind} {} ({} input / {} output tokens)",
        record.id, generation.input_tokens, generation.output_tokens
    );

    let record = state
        .store
        .update_output(kind, user_id, record.id, &generation.text)
        .await?;
    info!("Saved output for {kind} {}", record.id);

    for job in follow_up_jobs(kind, &record, follow_ups) {
        state.dispatcher.enqueue(job);
    }

    Ok(record)
}

fn follow_up_jobs(kind: ContentKind, record: &RecordRow, follow_ups: Vec<FollowUp>) -> Vec<Job> {
    follow_ups
        .into_iter()
        .map(|follow_up| match follow_up {
            FollowUp::SummarizeOutput { words } => Job::Summarize(SummaryRequest {
                kind,
                instance_id: record.id,
                user_id: record.user_id,
                text: record.output.clone(),
                words,
            }),
            FollowUp::Summarize { text, words } => Job::Summarize(SummaryRequest {
                kind,
                instance_id: record.id,
                user_id: record.user_id,
                text,
                words,
            }),
            FollowUp::Format { sub_field, text } => Job::Format(FormatRequest {
                kind,
                sub_field,
                instance_id: record.id,
                user_id: record.user_id,
                text,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::{ScriptedGenerator, TestApp};
    use serde_json::json;

    fn request(user_id: Uuid, follow_ups: Vec<FollowUp>) -> GenerationRequest {
        GenerationRequest {
            kind: ContentKind::LessonPlan,
            user_id,
            parent_id: None,
            inputs: json!({ "objective": "teach photosynthesis" }),
            is_public: false,
            messages: vec![
                ChatMessage::system("You are a 5th teacher."),
                ChatMessage::user("Write a lesson plan."),
            ],
            temperature: 0.1,
            follow_ups,
        }
    }

    #[tokio::test]
    async fn test_output_is_saved_and_follow_ups_queued() {
        let mut app = TestApp::new(ScriptedGenerator::new(["# Photosynthesis lesson"]));
        let user_id = app.user_id();

        let record = generate_and_persist(
            &app.state,
            request(user_id, vec![FollowUp::SummarizeOutput { words: 10 }]),
        )
        .await
        .unwrap();

        assert_eq!(record.output, "# Photosynthesis lesson");
        let stored = app.store.records_of(ContentKind::LessonPlan);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].output, "# Photosynthesis lesson");

        let jobs = app.queued_jobs();
        assert_eq!(jobs.len(), 1);
        match &jobs[0] {
            Job::Summarize(job) => {
                assert_eq!(job.instance_id, record.id);
                assert_eq!(job.text, "# Photosynthesis lesson");
                assert_eq!(job.words, 10);
            }
            other => panic!("unexpected job {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_keeps_empty_record_and_queues_nothing() {
        let mut app = TestApp::new(ScriptedGenerator::failing(LlmError::Api {
            status: 529,
            message: "Overloaded".to_string(),
        }));
        let user_id = app.user_id();

        let err = generate_and_persist(
            &app.state,
            request(user_id, vec![FollowUp::SummarizeOutput { words: 10 }]),
        )
        .await
        .unwrap_err();

        let stored = app.store.records_of(ContentKind::LessonPlan);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].output, "");
        match err {
            AppError::Generation { record_id, .. } => assert_eq!(record_id, Some(stored[0].id)),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(app.queued_jobs().is_empty());
    }

    #[tokio::test]
    async fn test_blank_output_is_a_failure() {
        let mut app = TestApp::new(ScriptedGenerator::new(["  \n "]));
        let user_id = app.user_id();

        let err = generate_and_persist(&app.state, request(user_id, Vec::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Generation {
                source: LlmError::EmptyContent,
                ..
            }
        ));
        assert_eq!(app.store.records_of(ContentKind::LessonPlan)[0].output, "");
        assert!(app.queued_jobs().is_empty());
    }

    #[tokio::test]
    async fn test_timeout_keeps_record() {
        let app = TestApp::new(ScriptedGenerator::failing(LlmError::Timeout(
            Duration::from_secs(90),
        )));
        let user_id = app.user_id();

        let err = generate_and_persist(&app.state, request(user_id, Vec::new()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Generation {
                source: LlmError::Timeout(_),
                ..
            }
        ));
        assert_eq!(app.store.records_of(ContentKind::LessonPlan).len(), 1);
    }

    #[tokio::test]
    async fn test_input_follow_ups_target_the_new_record() {
        let mut app = TestApp::new(ScriptedGenerator::new(["Nice work."]));
        let user_id = app.user_id();
        let mut req = request(
            user_id,
            vec![
                FollowUp::Summarize {
                    text: "Write five paragraphs about a hero.".to_string(),
                    words: 20,
                },
                FollowUp::Format {
                    sub_field: SubField::Rubric,
                    text: "Thesis: 4 points".to_string(),
                },
            ],
        );
        req.kind = ContentKind::Feedback;

        let record = generate_and_persist(&app.state, req).await.unwrap();
        let jobs = app.queued_jobs();

        assert_eq!(jobs.len(), 2);
        assert!(matches!(&jobs[0], Job::Summarize(j) if j.kind == ContentKind::Feedback && j.words == 20));
        assert!(matches!(&jobs[1], Job::Format(j) if j.instance_id == record.id && j.sub_field == SubField::Rubric));
    }

    #[tokio::test]
    async fn test_prompt_and_temperature_reach_provider() {
        let app = TestApp::new(ScriptedGenerator::new(["ok"]));
        let user_id = app.user_id();
        let mut req = request(user_id, Vec::new());
        req.temperature = 0.0;

        generate_and_persist(&app.state, req).await.unwrap();

        let (messages, temperature) = app.llm.call(0);
        assert_eq!(messages.len(), 2);
        assert_eq!(temperature, 0.0);
    }
}
