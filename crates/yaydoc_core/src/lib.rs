pub mod arguments;
pub mod artifact;
pub mod domain;
pub mod job;
pub mod ports;
pub mod validation;

pub use arguments::build_arguments;
pub use artifact::{ArtifactLocator, ARTIFACT_EXTENSION};
pub use domain::{
    ArgumentList, ArtifactPath, CompletedJob, ExitOutcome, GenerationJob, GenerationRequest,
    GeneratorEvent, InvalidJobId, JobId,
};
pub use job::JobRunner;
pub use ports::{
    Artifact, ArtifactStore, ByteStream, DocumentGenerator, GenerationEventSink, GeneratorEvents,
    JobIdAllocator, PortError, PortResult,
};
