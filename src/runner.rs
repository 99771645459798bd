use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::state_machine::{JobOutcome, JobReport, PollPolicy, StateMachine, TranscriptionJob, Transition};
use crate::transcribe::{Clock, JobPoller, JobStarter, TokioClock, TranscriptFetcher, TranscriptionError, parse_transcript};

/// Media parameters sent with every submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSettings {
    pub media_format: String,
    pub language_code: String,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            media_format: "mp3".to_string(),
            language_code: "en-US".to_string(),
        }
    }
}

/// Transcript text together with the audit record of the job that produced it.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub report: JobReport,
}

/// A transcription that did not produce text.
///
/// `report` is present once the job was accepted by the service, so the id of
/// a job left running (timed out, cancelled) is never lost.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct JobFailure {
    pub error: TranscriptionError,
    pub report: Option<JobReport>,
}

impl From<TranscriptionError> for JobFailure {
    fn from(error: TranscriptionError) -> Self {
        Self { error, report: None }
    }
}

/// Drives one transcription job at a time from submission to a terminal outcome.
pub struct JobRunner<S, P, F, C = TokioClock> {
    starter: S,
    poller: P,
    fetcher: F,
    clock: C,
    policy: PollPolicy,
    media: MediaSettings,
}

impl<S, P, F> JobRunner<S, P, F, TokioClock>
where
    S: JobStarter,
    P: JobPoller,
    F: TranscriptFetcher,
{
    pub fn new(starter: S, poller: P, fetcher: F) -> Self {
        Self {
            starter,
            poller,
            fetcher,
            clock: TokioClock,
            policy: PollPolicy::default(),
            media: MediaSettings::default(),
        }
    }
}

impl<S, P, F, C> JobRunner<S, P, F, C>
where
    S: JobStarter,
    P: JobPoller,
    F: TranscriptFetcher,
    C: Clock,
{
    /// Replace the clock used between polls.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> JobRunner<S, P, F, C2> {
        JobRunner {
            starter: self.starter,
            poller: self.poller,
            fetcher: self.fetcher,
            clock,
            policy: self.policy,
            media: self.media,
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_media(mut self, media: MediaSettings) -> Self {
        self.media = media;
        self
    }

    /// Start a job for the audio at `media_location` under a fresh unique id.
    pub async fn submit(&self, media_location: &str) -> Result<TranscriptionJob, TranscriptionError> {
        let job = TranscriptionJob::new(media_location.to_string());
        self.starter
            .start(
                &job.id,
                media_location,
                &self.media.media_format,
                &self.media.language_code,
            )
            .await?;
        info!(job_id = %job.id, media = media_location, "started transcription job");
        Ok(job)
    }

    /// Poll `job` every `policy.poll_interval` until it reaches a terminal
    /// status, the attempt budget runs out, or `cancel` fires.
    ///
    /// A timed-out job is left alone on the service; completed and failed
    /// jobs are deleted on a best-effort basis.
    pub async fn await_transcript(
        &self,
        job: &mut TranscriptionJob,
        policy: &PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<String, TranscriptionError> {
        if policy.max_attempts == 0 {
            return Err(TranscriptionError::TimedOut { attempts: 0 });
        }

        loop {
            let snapshot = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TranscriptionError::Cancelled),
                polled = self.poller.get_status(&job.id) => polled?,
            };
            debug!(
                job_id = %job.id,
                status = %snapshot.status,
                attempt = job.attempts + 1,
                "polled transcription job"
            );

            match StateMachine::observe(job, snapshot, policy) {
                Transition::Wait => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(TranscriptionError::Cancelled),
                        _ = self.clock.sleep(policy.poll_interval) => {}
                    }
                }
                Transition::Collect { location } => {
                    let payload = self.fetcher.fetch(&location).await?;
                    let text = parse_transcript(&payload)?;
                    self.cleanup(&job.id).await;
                    return Ok(text);
                }
                Transition::Missing => {
                    return Err(TranscriptionError::TranscriptMissing {
                        job_id: job.id.clone(),
                    });
                }
                Transition::Fail { reason } => {
                    self.cleanup(&job.id).await;
                    return Err(TranscriptionError::JobFailed { reason });
                }
                Transition::TimedOut => {
                    warn!(job_id = %job.id, attempts = job.attempts, "transcription job timed out, leaving it on the service");
                    return Err(TranscriptionError::TimedOut {
                        attempts: job.attempts,
                    });
                }
            }
        }
    }

    /// Submit and await with the runner's own policy.
    pub async fn transcribe(
        &self,
        media_location: &str,
        cancel: &CancellationToken,
    ) -> Result<Transcription, JobFailure> {
        let mut job = self.submit(media_location).await?;
        match self.await_transcript(&mut job, &self.policy, cancel).await {
            Ok(text) => {
                let report = JobReport::from_job(&job, JobOutcome::Transcribed);
                info!(job_id = %job.id, attempts = job.attempts, "transcription completed");
                Ok(Transcription { text, report })
            }
            Err(error) => {
                warn!(job_id = %job.id, attempts = job.attempts, error = %error, "transcription did not complete");
                let report = JobReport::from_job(&job, JobOutcome::from(&error));
                Err(JobFailure {
                    error,
                    report: Some(report),
                })
            }
        }
    }

    async fn cleanup(&self, job_id: &str) {
        if let Err(e) = self.poller.delete(job_id).await {
            warn!(job_id, error = %e, "failed to delete transcription job");
        }
    }
}

impl From<&TranscriptionError> for JobOutcome {
    fn from(err: &TranscriptionError) -> Self {
        match err {
            TranscriptionError::JobFailed { reason } => JobOutcome::Failed(reason.clone()),
            TranscriptionError::TimedOut { .. } => JobOutcome::TimedOut,
            TranscriptionError::Cancelled => JobOutcome::Cancelled,
            other => JobOutcome::Error(other.to_string()),
        }
    }
}
