pub mod artifacts;
pub mod events;
pub mod generator;
pub mod ids;

pub use artifacts::FsArtifactStore;
pub use events::TracingEventSink;
pub use generator::ProcessGenerator;
pub use ids::UuidJobIdAllocator;
