use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::extract::DocumentExtractor;
use crate::llm_client::TextGenerator;
use crate::store::ContentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    /// Constructed once at startup. Tests swap in a scripted generator.
    pub llm: Arc<dyn TextGenerator>,
    /// Follow-up queue (summaries and formats).
    pub dispatcher: Dispatcher,
    /// Used only by rubric upload.
    pub extractor: Arc<dyn DocumentExtractor>,
    pub config: Config,
}
