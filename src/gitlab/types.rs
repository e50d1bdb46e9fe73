use serde::Deserialize;
use std::fmt;

/// Execution status reported by GitLab for jobs and pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Failed,
    Canceled,
    Manual,
    Running,
    Pending,
    /// Any status this tool takes no action on (created, skipped, ...).
    #[serde(other)]
    Other,
}

impl Status {
    pub fn is_success(self) -> bool {
        self == Status::Success
    }

    /// Only these statuses are eligible for automatic retry; anything else
    /// is either already in flight or not actionable.
    pub fn is_retryable(self) -> bool {
        matches!(self, Status::Failed | Status::Canceled | Status::Manual)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Success => "success",
            Status::Failed => "failed",
            Status::Canceled => "canceled",
            Status::Manual => "manual",
            Status::Running => "running",
            Status::Pending => "pending",
            Status::Other => "other",
        })
    }
}

/// The authenticated GitLab user, used to scope the project listing.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u64,
}

/// A project tracked by the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

/// A single job execution within a pipeline.
///
/// Snapshots are read-only; a retry creates a new job server-side rather
/// than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    /// Git reference the job ran against (e.g., "main")
    #[serde(rename = "ref")]
    pub ref_: String,
    pub status: Status,
}

/// The aggregate pipeline run for a branch/commit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    #[serde(rename = "ref")]
    pub ref_: String,
    pub status: Status,
}
