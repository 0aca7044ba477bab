//! crates/yaydoc_core/src/domain.rs
//!
//! Defines the pure, core data structures for documentation generation jobs.
//! These structs are independent of any process runtime, filesystem or web framework.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// A documentation-generation request as submitted by a caller.
///
/// All fields are caller-supplied and untrusted until validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub email: String,
    pub author: String,
    pub git_url: String,
    pub doc_theme: String,
    pub doc_path: String,
    pub project_name: String,
    pub version: String,
}

/// The unique identifier of one generation job.
///
/// Backed by a random 128-bit UUID. It doubles as a capability token in the
/// download URL, so it is never derived from a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

/// Text that is not a hyphenated job id.
#[derive(Debug, thiserror::Error)]
#[error("`{0}` is not a hyphenated job id")]
pub struct InvalidJobId(String);

/// Length of the hyphenated form; simple, braced and URN forms differ.
const HYPHENATED_LEN: usize = 36;

impl JobId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Hyphenated lowercase, the same text the generator receives via `-u`.
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for JobId {
    type Err = InvalidJobId;

    /// Accepts only the hyphenated form, in either case, so one job has one URL.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HYPHENATED_LEN {
            return Err(InvalidJobId(s.to_string()));
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidJobId(s.to_string()))
    }
}

/// The runtime association of a request with its allocated id.
///
/// Owned by the handler that created it; nothing keeps it after the response.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub id: JobId,
    pub request: GenerationRequest,
    pub started_at: DateTime<Utc>,
}

/// A job whose generator exited successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    pub id: JobId,
    pub email: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// The ordered argument vector handed to the external generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentList(Vec<String>);

impl ArgumentList {
    pub fn new(args: Vec<String>) -> Self {
        Self(args)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Filesystem location of a job's archive: `<root>/<email>/<job id>.zip`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactPath(PathBuf);

impl ArtifactPath {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// The file name offered to the client, e.g. `<job id>.zip`.
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|name| name.to_str())
    }
}

impl AsRef<Path> for ArtifactPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// How a generator process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The process exited on its own with this code.
    Code(i32),
    /// The process was terminated by a signal.
    Signalled,
    /// The process exceeded its time limit and was killed.
    TimedOut(Duration),
    /// The exit status could not be observed.
    Lost(String),
}

impl ExitOutcome {
    /// Exit code 0 is the only success signal.
    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Code(0))
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Code(code) => write!(f, "exited with code {}", code),
            ExitOutcome::Signalled => write!(f, "terminated by signal"),
            ExitOutcome::TimedOut(limit) => {
                write!(f, "timed out after {}s", limit.as_secs_f64())
            }
            ExitOutcome::Lost(reason) => write!(f, "exit status lost: {}", reason),
        }
    }
}

/// A single observation of a running generator.
///
/// Output lines from the two channels arrive in no particular order relative
/// to each other; `Exited` is always the final event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorEvent {
    Stdout(String),
    Stderr(String),
    Exited(ExitOutcome),
}
