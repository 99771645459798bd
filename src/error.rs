use thiserror::Error;

use crate::runner::JobFailure;
use crate::state_machine::JobReport;
use crate::store::StoreError;
use crate::trigger::KeyError;

/// Everything that can stop one uploaded answer from being scored.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("invalid object key: {0}")]
    Key(#[from] KeyError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Transcription(#[from] JobFailure),
}

impl ScoreError {
    /// Audit record of the transcription job, when one had been submitted.
    pub fn job_report(&self) -> Option<&JobReport> {
        match self {
            ScoreError::Transcription(failure) => failure.report.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::{JobOutcome, TranscriptionJob};
    use crate::transcribe::TranscriptionError;

    #[test]
    fn wraps_module_errors() {
        let err: ScoreError = KeyError::InvalidUserId("x".into()).into();
        assert_eq!(err.to_string(), "invalid object key: invalid user_id `x`");

        let err: ScoreError = StoreError::NotFound(3).into();
        assert_eq!(err.to_string(), "store error: problem 3 not found");

        let err: ScoreError = JobFailure::from(TranscriptionError::EmptyResult).into();
        assert_eq!(err.to_string(), "no transcripts found in result");
        assert!(err.job_report().is_none());
    }

    #[test]
    fn exposes_report_of_submitted_job() {
        let job = TranscriptionJob::new("s3://b/k.mp3".into());
        let failure = JobFailure {
            error: TranscriptionError::TimedOut { attempts: 2 },
            report: Some(JobReport::from_job(&job, JobOutcome::TimedOut)),
        };
        let err = ScoreError::from(failure);

        assert_eq!(err.to_string(), "transcription job timed out after 2 polls");
        assert_eq!(err.job_report().map(|r| r.job_id.as_str()), Some(job.id.as_str()));
        assert!(ScoreError::from(StoreError::NotFound(1)).job_report().is_none());
    }
}
