//! Secondary dispatch: follow-up work that runs after a record's output is
//! saved, without holding up the response.
//!
//! The generation pipeline enqueues `Job`s on a bounded in-process queue. A
//! single worker task pulls them off and runs up to `concurrency` jobs at a
//! time. Enqueueing never blocks; when the queue is full or the worker is
//! gone the job is logged and dropped, and the primary record is unaffected.

pub mod format;
pub mod handlers;
pub mod summarize;

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::store::ContentStore;

pub use format::FormatRequest;
pub use summarize::SummaryRequest;

#[derive(Debug, Clone)]
pub enum Job {
    Summarize(SummaryRequest),
    Format(FormatRequest),
}

impl Job {
    fn describe(&self) -> String {
        match self {
            Job::Summarize(r) => format!("summary of {} {}", r.kind, r.instance_id),
            Job::Format(r) => format!("{} format of {} {}", r.sub_field, r.kind, r.instance_id),
        }
    }
}

/// Handle to the follow-up queue. Cheap to clone; the worker stops once
/// every clone is dropped and the queue has drained.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<Job>,
}

impl Dispatcher {
    /// Starts the worker and returns the queue handle plus the worker's join handle.
    pub fn spawn(
        store: Arc<dyn ContentStore>,
        llm: Arc<dyn TextGenerator>,
        capacity: usize,
        concurrency: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(rx, store, llm, concurrency.max(1)));
        (Self { tx }, worker)
    }

    /// A dispatcher with no worker attached. Tests read the queued jobs directly.
    #[cfg(test)]
    pub fn detached(capacity: usize) -> (Self, mpsc::Receiver<Job>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// False once the worker has exited and jobs can no longer be queued.
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queues `job` without waiting. Returns false if it was dropped.
    pub fn enqueue(&self, job: Job) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                warn!("Dispatch queue full, dropping {}", job.describe());
                false
            }
            Err(TrySendError::Closed(job)) => {
                warn!("Dispatch worker stopped, dropping {}", job.describe());
                false
            }
        }
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<Job>,
    store: Arc<dyn ContentStore>,
    llm: Arc<dyn TextGenerator>,
    concurrency: usize,
) {
    let permits = Arc::new(Semaphore::new(concurrency));
    let mut running = JoinSet::new();

    info!("Dispatch worker started (concurrency: {concurrency})");

    while let Some(job) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let store = store.clone();
        let llm = llm.clone();

        running.spawn(async move {
            let _permit = permit;
            let label = job.describe();
            match run_job(store.as_ref(), llm.as_ref(), job).await {
                Ok(()) => debug!("Completed {label}"),
                Err(e) => warn!("Follow-up job failed ({label}): {e}"),
            }
        });

        // Reap finished tasks so the set does not grow with the queue.
        while let Some(result) = running.try_join_next() {
            log_panic(result);
        }
    }

    while let Some(result) = running.join_next().await {
        log_panic(result);
    }

    info!("Dispatch worker stopped");
}

fn log_panic(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        warn!("Follow-up task aborted: {e}");
    }
}

/// Runs one job to completion.
pub async fn run_job(
    store: &dyn ContentStore,
    llm: &dyn TextGenerator,
    job: Job,
) -> Result<(), AppError> {
    match job {
        Job::Summarize(request) => {
            summarize::summarize(store, llm, &request).await?;
        }
        Job::Format(request) => {
            format::format(store, llm, &request).await?;
        }
    }
    Ok(())
}
