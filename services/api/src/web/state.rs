//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::{FsArtifactStore, ProcessGenerator, TracingEventSink, UuidJobIdAllocator};
use crate::config::Config;
use std::sync::Arc;
use yaydoc_core::job::JobRunner;
use yaydoc_core::ports::ArtifactStore;

/// The shared application state, created once at startup and passed to all handlers.
///
/// Jobs themselves are never stored here; each request owns its own job.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jobs: JobRunner,
    pub artifacts: Arc<dyn ArtifactStore>,
}

impl AppState {
    /// Wires the production adapters from configuration.
    pub fn from_config(config: Arc<Config>) -> Self {
        let generator = ProcessGenerator::new(
            config.generator_program.clone(),
            config.generation_timeout,
        )
        .with_leading_args(config.generator_args.clone())
        .with_working_dir(config.generator_workdir.clone());

        let jobs = JobRunner::new(
            Arc::new(UuidJobIdAllocator),
            Arc::new(generator),
            Arc::new(TracingEventSink),
        );
        let artifacts = Arc::new(FsArtifactStore::new(config.artifact_root.clone()));

        Self {
            config,
            jobs,
            artifacts,
        }
    }
}
