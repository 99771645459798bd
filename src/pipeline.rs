//! Scores uploaded answers end to end: key → reference text → transcript →
//! score → stored result.
//!
//! Records of one event are processed strictly one after another. A failing
//! record is logged and skipped; it never aborts the rest of the batch.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::ScoreError;
use crate::runner::{JobFailure, JobRunner, Transcription};
use crate::scoring::ScoreResult;
use crate::store::{ReferenceTextSource, ResultSink};
use crate::transcribe::{Clock, JobPoller, JobStarter, TranscriptFetcher, TranscriptionError};
use crate::trigger::{AnswerKey, StorageEvent, StorageEventRecord};

/// Turns an audio location into transcript text.
pub trait Transcriber {
    async fn transcribe(
        &self,
        media_location: &str,
        cancel: &CancellationToken,
    ) -> Result<Transcription, JobFailure>;
}

impl<S, P, F, C> Transcriber for JobRunner<S, P, F, C>
where
    S: JobStarter,
    P: JobPoller,
    F: TranscriptFetcher,
    C: Clock,
{
    async fn transcribe(
        &self,
        media_location: &str,
        cancel: &CancellationToken,
    ) -> Result<Transcription, JobFailure> {
        JobRunner::transcribe(self, media_location, cancel).await
    }
}

/// A fully processed answer.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredAnswer {
    pub key: AnswerKey,
    pub source_location: String,
    pub job_id: String,
    pub polls: u32,
    pub result: ScoreResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Scored(ScoredAnswer),
    /// `job_id` and `polls` are set when the failure came after submission;
    /// a timed-out job is still running under that id.
    Skipped {
        source_location: String,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        job_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        polls: Option<u32>,
    },
}

impl ItemOutcome {
    pub fn is_scored(&self) -> bool {
        matches!(self, ItemOutcome::Scored(_))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub items: Vec<ItemOutcome>,
}

impl BatchSummary {
    pub fn scored(&self) -> usize {
        self.items.iter().filter(|i| i.is_scored()).count()
    }

    pub fn skipped(&self) -> usize {
        self.items.len() - self.scored()
    }
}

pub struct Pipeline<'a, T, R, K> {
    transcriber: &'a T,
    references: &'a R,
    sink: &'a K,
}

impl<'a, T, R, K> Pipeline<'a, T, R, K>
where
    T: Transcriber,
    R: ReferenceTextSource,
    K: ResultSink,
{
    pub fn new(transcriber: &'a T, references: &'a R, sink: &'a K) -> Self {
        Self {
            transcriber,
            references,
            sink,
        }
    }

    /// Score the single object described by `record`.
    pub async fn process_record(
        &self,
        record: &StorageEventRecord,
        cancel: &CancellationToken,
    ) -> Result<ScoredAnswer, ScoreError> {
        let source_location = record.source_location();
        info!(source = %source_location, "processing file");

        let key = AnswerKey::parse(record.key())?;
        info!(problem_id = key.problem_id, user_id = key.user_id, "extracted ids");

        let reference = self.references.get_text(key.problem_id)?;

        let Transcription { text, report } = self.transcriber.transcribe(&source_location, cancel).await?;
        info!(job_id = %report.job_id, transcript = %text, "transcribed audio");

        let result = ScoreResult::compute(&reference, &text);
        info!(score = result.score, distance = result.distance, "calculated score");

        self.sink.save(
            key.user_id,
            key.problem_id,
            &result.transcribed_text,
            result.score,
            &source_location,
        )?;
        info!(source = %source_location, "result saved");

        Ok(ScoredAnswer {
            key,
            source_location,
            job_id: report.job_id,
            polls: report.attempts,
            result,
        })
    }

    /// Process every record of `event` in order.
    ///
    /// Once `cancel` fires no further job is submitted; the remaining records
    /// are reported as skipped.
    pub async fn process_event(&self, event: &StorageEvent, cancel: &CancellationToken) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for record in &event.records {
            if cancel.is_cancelled() {
                summary.items.push(ItemOutcome::Skipped {
                    source_location: record.source_location(),
                    error: TranscriptionError::Cancelled.to_string(),
                    job_id: None,
                    polls: None,
                });
                continue;
            }

            match self.process_record(record, cancel).await {
                Ok(scored) => summary.items.push(ItemOutcome::Scored(scored)),
                Err(e) => {
                    let report = e.job_report();
                    let job_id = report.map(|r| r.job_id.clone());
                    warn!(
                        source = %record.source_location(),
                        job_id = job_id.as_deref().unwrap_or("-"),
                        error = %e,
                        "skipping record"
                    );
                    summary.items.push(ItemOutcome::Skipped {
                        source_location: record.source_location(),
                        error: e.to_string(),
                        job_id,
                        polls: report.map(|r| r.attempts),
                    });
                }
            }
        }

        info!(
            scored = summary.scored(),
            skipped = summary.skipped(),
            "batch finished"
        );
        summary
    }
}
