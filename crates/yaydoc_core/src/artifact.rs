//! crates/yaydoc_core/src/artifact.rs
//!
//! Derives where a job's archive lives. Resolution is pure path composition;
//! reading the file is left to an `ArtifactStore` adapter.

use std::path::PathBuf;

use crate::domain::{ArtifactPath, JobId};
use crate::ports::{PortError, PortResult};
use crate::validation::validate_path_segment;

/// Extension of the archive the generator writes.
pub const ARTIFACT_EXTENSION: &str = "zip";

#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    root: PathBuf,
}

impl ArtifactLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/<email>/<id>.zip`, provided `email` is a safe path segment.
    pub fn resolve(&self, email: &str, id: &JobId) -> PortResult<ArtifactPath> {
        validate_path_segment("email", email)?;
        let path = self
            .root
            .join(email)
            .join(format!("{}.{}", id, ARTIFACT_EXTENSION));
        Ok(ArtifactPath::new(path))
    }

    /// Resolves untrusted download parameters.
    ///
    /// Unsafe segments are `PathTraversal`; a safe id that is not a job id
    /// cannot have an artifact and is `NotFound`.
    pub fn locate(&self, email: &str, raw_id: &str) -> PortResult<ArtifactPath> {
        validate_path_segment("email", email)?;
        validate_path_segment("unique id", raw_id)?;
        let id: JobId = raw_id
            .parse()
            .map_err(|_| PortError::NotFound(format!("no artifact for job `{}`", raw_id)))?;
        self.resolve(email, &id)
    }
}
