//! services/api/src/adapters/artifacts.rs
//!
//! Filesystem-backed `ArtifactStore`: serves archives the generator wrote
//! under the artifact root.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;
use yaydoc_core::artifact::ArtifactLocator;
use yaydoc_core::domain::ArtifactPath;
use yaydoc_core::ports::{Artifact, ArtifactStore, PortError, PortResult};

#[derive(Clone, Debug)]
pub struct FsArtifactStore {
    locator: ArtifactLocator,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            locator: ArtifactLocator::new(root),
        }
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    fn locate(&self, email: &str, raw_id: &str) -> PortResult<ArtifactPath> {
        self.locator.locate(email, raw_id)
    }

    async fn open(&self, path: &ArtifactPath) -> PortResult<Artifact> {
        let not_found = || PortError::NotFound(format!("no artifact at {}", path.as_path().display()));

        let file = match File::open(path.as_path()).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => {
                return Err(PortError::Unexpected(format!(
                    "failed to open artifact: {}",
                    e
                )))
            }
        };
        let metadata = file
            .metadata()
            .await
            .map_err(|e| PortError::Unexpected(format!("failed to stat artifact: {}", e)))?;
        // A directory with the archive's name is not a finished artifact.
        if !metadata.is_file() {
            return Err(not_found());
        }

        debug!(path = %path.as_path().display(), size = metadata.len(), "Serving artifact");
        Ok(Artifact {
            path: path.clone(),
            size: metadata.len(),
            content: Box::pin(ReaderStream::new(file)),
        })
    }
}
