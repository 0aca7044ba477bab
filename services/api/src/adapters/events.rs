//! services/api/src/adapters/events.rs
//!
//! Implements the `GenerationEventSink` port by emitting `tracing` events.

use tracing::{info, warn};
use yaydoc_core::domain::{GeneratorEvent, JobId};
use yaydoc_core::ports::GenerationEventSink;

/// Logs generator output for operators. Nothing here reaches the caller.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl GenerationEventSink for TracingEventSink {
    fn record(&self, job_id: &JobId, event: &GeneratorEvent) {
        match event {
            GeneratorEvent::Stdout(line) => {
                info!(job_id = %job_id, stream = "stdout", "{}", line)
            }
            GeneratorEvent::Stderr(line) => {
                warn!(job_id = %job_id, stream = "stderr", "{}", line)
            }
            GeneratorEvent::Exited(outcome) if outcome.is_success() => {
                info!(job_id = %job_id, "Generation script {}", outcome)
            }
            GeneratorEvent::Exited(outcome) => {
                warn!(job_id = %job_id, "Generation script {}", outcome)
            }
        }
    }
}
