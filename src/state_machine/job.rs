use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a transcription job as reported by the external service.
///
/// Serialized in the service's wire form (`QUEUED`, `IN_PROGRESS`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    /// `Completed` and `Failed` end polling; nothing is observed afterwards.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "QUEUED"),
            JobStatus::InProgress => write!(f, "IN_PROGRESS"),
            JobStatus::Completed => write!(f, "COMPLETED"),
            JobStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// One observation of a job, as returned by a single status poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub transcript_location: Option<String>,
    pub failure_reason: Option<String>,
}

impl JobSnapshot {
    pub fn in_progress() -> Self {
        Self {
            status: JobStatus::InProgress,
            transcript_location: None,
            failure_reason: None,
        }
    }

    pub fn completed(location: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Completed,
            transcript_location: Some(location.into()),
            failure_reason: None,
        }
    }

    pub fn failed(reason: Option<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            transcript_location: None,
            failure_reason: reason,
        }
    }
}

/// Fixed polling cadence and attempt budget for awaiting a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait between two consecutive polls.
    pub poll_interval: Duration,
    /// Maximum number of status polls before giving up locally.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

impl PollPolicy {
    /// Upper bound on the time spent waiting: `max_attempts * poll_interval`.
    pub fn ceiling(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }
}

/// Local view of one external transcription job.
///
/// Only the invocation that submitted the job holds it; the service state is
/// observed through polling and never set locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionJob {
    pub id: String,
    pub media_location: String,
    pub status: JobStatus,
    pub status_history: Vec<JobStatus>,
    pub attempts: u32,
    pub transcript_location: Option<String>,
    pub failure_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TranscriptionJob {
    pub fn new(media_location: String) -> Self {
        let now = Utc::now();
        Self {
            id: format!("transcribe-{}", Uuid::new_v4()),
            media_location,
            status: JobStatus::Queued,
            status_history: Vec::new(),
            attempts: 0,
            transcript_location: None,
            failure_reason: None,
            submitted_at: now,
            updated_at: now,
        }
    }
}

/// How a job lifecycle ended from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutcome {
    Transcribed,
    Failed(String),
    TimedOut,
    Cancelled,
    Error(String),
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Transcribed => write!(f, "transcribed"),
            JobOutcome::Failed(reason) => write!(f, "failed: {reason}"),
            JobOutcome::TimedOut => write!(f, "timed out"),
            JobOutcome::Cancelled => write!(f, "cancelled"),
            JobOutcome::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// Structured audit record produced when a job lifecycle ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub job_id: String,
    pub media_location: String,
    pub outcome: JobOutcome,
    pub statuses: Vec<JobStatus>,
    pub attempts: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl JobReport {
    pub fn from_job(job: &TranscriptionJob, outcome: JobOutcome) -> Self {
        let now = Utc::now();
        let duration = now - job.submitted_at;

        Self {
            job_id: job.id.clone(),
            media_location: job.media_location.clone(),
            outcome,
            statuses: job.status_history.clone(),
            attempts: job.attempts,
            started_at: job.submitted_at,
            completed_at: now,
            duration_ms: duration.num_milliseconds(),
        }
    }
}
