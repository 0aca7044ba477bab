//! crates/yaydoc_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the generation core.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! core independent of process spawning, logging backends and the filesystem.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

use crate::domain::{ArgumentList, ArtifactPath, ExitOutcome, GeneratorEvent, JobId};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Rejected path segment: {0}")]
    PathTraversal(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Generation job {job_id} failed: {outcome}")]
    GenerationFailed { job_id: JobId, outcome: ExitOutcome },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Events emitted by a running generator, terminated by `GeneratorEvent::Exited`.
pub type GeneratorEvents = Pin<Box<dyn Stream<Item = GeneratorEvent> + Send>>;

/// The raw bytes of a stored artifact, read in chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// An artifact opened for download.
pub struct Artifact {
    pub path: ArtifactPath,
    pub size: u64,
    pub content: ByteStream,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

pub trait JobIdAllocator: Send + Sync {
    /// Produces a fresh identifier. Never blocks, never fails.
    fn allocate(&self) -> JobId;
}

#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    /// Launches the external generator with the given arguments.
    ///
    /// Fails only when the process cannot be started; everything after that,
    /// including a non-zero exit, is reported through the event stream.
    async fn invoke(&self, args: &ArgumentList) -> PortResult<GeneratorEvents>;
}

/// Receives generator diagnostics for operator visibility.
pub trait GenerationEventSink: Send + Sync {
    fn record(&self, job_id: &JobId, event: &GeneratorEvent);
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Resolves a download request's raw path parameters to an artifact path.
    fn locate(&self, email: &str, raw_id: &str) -> PortResult<ArtifactPath>;

    /// Opens the artifact for streaming, or `NotFound` if nothing is there.
    async fn open(&self, path: &ArtifactPath) -> PortResult<Artifact>;
}
