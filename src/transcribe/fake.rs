//! In-memory stand-ins for the transcription service and the clock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::backend::{Clock, JobPoller, JobStarter, TranscriptFetcher};
use super::error::TranscriptionError;
use crate::state_machine::JobSnapshot;

#[derive(Default)]
struct FakeState {
    reject_start: Option<String>,
    statuses: VecDeque<Result<JobSnapshot, String>>,
    payload: Option<Result<String, String>>,
    fail_delete: bool,
    started: Vec<(String, String)>,
    polls: usize,
    deletes: Vec<String>,
    fetches: Vec<String>,
}

/// Scripted service: hands out queued status observations in order and keeps
/// returning `IN_PROGRESS` once the script runs out.
#[derive(Clone, Default)]
pub struct FakeService {
    state: Arc<Mutex<FakeState>>,
}

impl FakeService {
    pub fn with_statuses(statuses: Vec<JobSnapshot>) -> Self {
        let service = Self::default();
        service.state.lock().unwrap().statuses = statuses.into_iter().map(Ok).collect();
        service
    }

    pub fn push_poll_error(&self, message: &str) {
        self.state
            .lock()
            .unwrap()
            .statuses
            .push_back(Err(message.to_string()));
    }

    pub fn set_payload(&self, payload: &str) {
        self.state.lock().unwrap().payload = Some(Ok(payload.to_string()));
    }

    pub fn set_fetch_error(&self, message: &str) {
        self.state.lock().unwrap().payload = Some(Err(message.to_string()));
    }

    pub fn reject_start(&self, message: &str) {
        self.state.lock().unwrap().reject_start = Some(message.to_string());
    }

    pub fn fail_delete(&self) {
        self.state.lock().unwrap().fail_delete = true;
    }

    pub fn started(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().started.clone()
    }

    pub fn polls(&self) -> usize {
        self.state.lock().unwrap().polls
    }

    pub fn deletes(&self) -> Vec<String> {
        self.state.lock().unwrap().deletes.clone()
    }

    pub fn fetches(&self) -> Vec<String> {
        self.state.lock().unwrap().fetches.clone()
    }
}

impl JobStarter for FakeService {
    async fn start(
        &self,
        job_id: &str,
        media_location: &str,
        _media_format: &str,
        _language_code: &str,
    ) -> Result<(), TranscriptionError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.reject_start {
            return Err(TranscriptionError::Submission(message.clone()));
        }
        state
            .started
            .push((job_id.to_string(), media_location.to_string()));
        Ok(())
    }
}

impl JobPoller for FakeService {
    async fn get_status(&self, _job_id: &str) -> Result<JobSnapshot, TranscriptionError> {
        let mut state = self.state.lock().unwrap();
        state.polls += 1;
        match state.statuses.pop_front() {
            Some(Ok(snapshot)) => Ok(snapshot),
            Some(Err(message)) => Err(TranscriptionError::Poll(message)),
            None => Ok(JobSnapshot::in_progress()),
        }
    }

    async fn delete(&self, job_id: &str) -> Result<(), TranscriptionError> {
        let mut state = self.state.lock().unwrap();
        state.deletes.push(job_id.to_string());
        if state.fail_delete {
            return Err(TranscriptionError::Cleanup("delete refused".into()));
        }
        Ok(())
    }
}

impl TranscriptFetcher for FakeService {
    async fn fetch(&self, location: &str) -> Result<String, TranscriptionError> {
        let mut state = self.state.lock().unwrap();
        state.fetches.push(location.to_string());
        match &state.payload {
            Some(Ok(payload)) => Ok(payload.clone()),
            Some(Err(message)) => Err(TranscriptionError::Fetch(message.clone())),
            None => Err(TranscriptionError::Fetch("no payload scripted".into())),
        }
    }
}

/// Clock that records requested sleeps and returns immediately, or never
/// returns when built with [`RecordingClock::hanging`].
#[derive(Clone, Default)]
pub struct RecordingClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
    hang: bool,
}

impl RecordingClock {
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Default::default()
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        if self.hang {
            std::future::pending::<()>().await;
        }
    }
}

pub fn transcript_payload(text: &str) -> String {
    serde_json::json!({
        "jobName": "fake",
        "results": {"transcripts": [{"transcript": text}]}
    })
    .to_string()
}
