//! Test doubles shared by workflow and router tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::auth::CREATE_CHAT;
use crate::config::Config;
use crate::dispatch::{Dispatcher, Job};
use crate::errors::AppError;
use crate::extract::{DocumentExtractor, ExtractError};
use crate::llm_client::{Generation, LlmError, TextGenerator};
use crate::models::user::UserAccess;
use crate::prompt::ChatMessage;
use crate::state::AppState;
use crate::store::memory::MemoryStore;

/// Replays queued responses in order and records every call it receives.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<(Vec<ChatMessage>, f32)>>,
}

impl ScriptedGenerator {
    pub fn new<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: LlmError) -> Self {
        let generator = Self::default();
        generator.responses.lock().unwrap().push_back(Err(error));
        generator
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Messages and temperature of the `n`th call.
    pub fn call(&self, n: usize) -> (Vec<ChatMessage>, f32) {
        self.calls.lock().unwrap()[n].clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<Generation, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), temperature));
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(Generation {
                text,
                input_tokens: 0,
                output_tokens: 0,
            }),
            Some(Err(e)) => Err(e),
            None => Err(LlmError::Api {
                status: 500,
                message: "no scripted response left".to_string(),
            }),
        }
    }
}

/// Returns the same text for every document.
pub struct FixedExtractor(pub String);

#[async_trait]
impl DocumentExtractor for FixedExtractor {
    async fn extract(&self, document: Bytes) -> Result<String, AppError> {
        if document.is_empty() {
            return Err(ExtractError::EmptyDocument.into());
        }
        Ok(self.0.clone())
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/chalk_test".to_string(),
        database_max_connections: 1,
        anthropic_api_key: "test-key".to_string(),
        llm_api_url: "http://localhost:0/v1/messages".to_string(),
        llm_model: "test-model".to_string(),
        llm_max_tokens: 1024,
        llm_timeout: Duration::from_secs(5),
        dispatch_queue_capacity: 16,
        dispatch_concurrency: 1,
        max_upload_bytes: 1024 * 1024,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// A user with the chat permission and an active subscription.
pub fn full_access_user() -> UserAccess {
    UserAccess {
        id: Uuid::new_v4(),
        permissions: vec![CREATE_CHAT.to_string()],
        subscription_status: Some("active".to_string()),
        subscription_period_end: Some(Utc::now() + ChronoDuration::days(30)),
    }
}

/// A known user with neither the chat permission nor a subscription.
pub fn basic_user() -> UserAccess {
    UserAccess {
        id: Uuid::new_v4(),
        permissions: Vec::new(),
        subscription_status: None,
        subscription_period_end: None,
    }
}

/// App state over in-memory doubles. Follow-up jobs land in `jobs` instead
/// of running.
pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub llm: Arc<ScriptedGenerator>,
    pub jobs: mpsc::Receiver<Job>,
    pub user: UserAccess,
}

impl TestApp {
    pub fn new(llm: ScriptedGenerator) -> Self {
        Self::with_user(llm, full_access_user())
    }

    pub fn with_user(llm: ScriptedGenerator, user: UserAccess) -> Self {
        let store = Arc::new(MemoryStore::with_user(user.clone()));
        let llm = Arc::new(llm);
        let (dispatcher, jobs) = Dispatcher::detached(16);
        let state = AppState {
            store: store.clone(),
            llm: llm.clone(),
            dispatcher,
            extractor: Arc::new(FixedExtractor(
                "Criteria | Points\n--- | ---\nThesis | 4".to_string(),
            )),
            config: test_config(),
        };
        Self {
            state,
            store,
            llm,
            jobs,
            user,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Every job queued so far.
    pub fn queued_jobs(&mut self) -> Vec<Job> {
        let mut jobs = Vec::new();
        while let Ok(job) = self.jobs.try_recv() {
            jobs.push(job);
        }
        jobs
    }
}
