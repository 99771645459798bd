use std::time::Duration;

use super::error::TranscriptionError;
use crate::state_machine::JobSnapshot;

/// Starts a transcription job on the external service.
pub trait JobStarter {
    async fn start(
        &self,
        job_id: &str,
        media_location: &str,
        media_format: &str,
        language_code: &str,
    ) -> Result<(), TranscriptionError>;
}

/// Observes and removes transcription jobs.
pub trait JobPoller {
    async fn get_status(&self, job_id: &str) -> Result<JobSnapshot, TranscriptionError>;

    /// Callers treat failures here as non-fatal.
    async fn delete(&self, job_id: &str) -> Result<(), TranscriptionError>;
}

/// Downloads the raw transcript payload of a completed job.
pub trait TranscriptFetcher {
    async fn fetch(&self, location: &str) -> Result<String, TranscriptionError>;
}

/// Source of the waits between polls.
pub trait Clock {
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock sleeping through the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
