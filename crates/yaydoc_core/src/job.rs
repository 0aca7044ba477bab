//! crates/yaydoc_core/src/job.rs
//!
//! Orchestrates one generation job: validate the request, allocate an id,
//! build the generator arguments, run the generator and wait for its exit.

use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;

use crate::arguments::build_arguments;
use crate::domain::{CompletedJob, ExitOutcome, GenerationJob, GenerationRequest, GeneratorEvent};
use crate::ports::{
    DocumentGenerator, GenerationEventSink, JobIdAllocator, PortError, PortResult,
};
use crate::validation::validate_request;

/// Runs generation jobs using injected components.
///
/// Holds no per-job state, so one runner is shared by all concurrent requests.
#[derive(Clone)]
pub struct JobRunner {
    allocator: Arc<dyn JobIdAllocator>,
    generator: Arc<dyn DocumentGenerator>,
    events: Arc<dyn GenerationEventSink>,
}

impl JobRunner {
    pub fn new(
        allocator: Arc<dyn JobIdAllocator>,
        generator: Arc<dyn DocumentGenerator>,
        events: Arc<dyn GenerationEventSink>,
    ) -> Self {
        Self {
            allocator,
            generator,
            events,
        }
    }

    /// Runs a job to completion.
    ///
    /// Resolves once the generator has exited. Any exit other than code 0,
    /// including a timeout, becomes `PortError::GenerationFailed`.
    pub async fn run(&self, request: GenerationRequest) -> PortResult<CompletedJob> {
        validate_request(&request)?;

        let job = GenerationJob {
            id: self.allocator.allocate(),
            request,
            started_at: Utc::now(),
        };
        let args = build_arguments(&job.request, &job.id);

        let mut events = self.generator.invoke(&args).await?;
        let mut outcome = None;
        while let Some(event) = events.next().await {
            self.events.record(&job.id, &event);
            if let GeneratorEvent::Exited(exit) = event {
                outcome = Some(exit);
                break;
            }
        }

        let outcome = outcome.unwrap_or_else(|| {
            ExitOutcome::Lost("event stream ended before the process exited".to_string())
        });
        if !outcome.is_success() {
            return Err(PortError::GenerationFailed {
                job_id: job.id,
                outcome,
            });
        }

        Ok(CompletedJob {
            id: job.id,
            email: job.request.email,
            started_at: job.started_at,
            finished_at: Utc::now(),
        })
    }
}
