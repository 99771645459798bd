use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::backend::{JobPoller, JobStarter, TranscriptFetcher};
use super::error::TranscriptionError;
use super::types::{ApiErrorBody, GetTranscriptionJobResponse, JobNameRequest, Media, StartTranscriptionJobRequest};
use crate::state_machine::JobSnapshot;

pub const DEFAULT_ENDPOINT: &str = "https://transcribe.us-east-1.amazonaws.com";

const TARGET_PREFIX: &str = "Transcribe";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// HTTP client for the transcription service's JSON protocol.
///
/// Requests go to a configurable endpoint; signing, when required, is done by
/// whatever sits in front of it.
#[derive(Debug, Clone)]
pub struct TranscribeClient {
    client: Client,
    endpoint: String,
}

impl TranscribeClient {
    pub fn new(endpoint: String, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// POST one action and return the response body, or a readable error message.
    async fn call(&self, action: &str, body: &impl Serialize) -> Result<String, String> {
        let payload = serde_json::to_vec(body).map_err(|e| format!("failed to encode request: {e}"))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-amz-target", format!("{TARGET_PREFIX}.{action}"))
            .header("content-type", AMZ_JSON)
            .body(payload)
            .send()
            .await
            .map_err(|e| format!("network error: {e}"))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("network error: {e}"))?;

        if !status.is_success() {
            return Err(api_error_message(status, &text));
        }
        Ok(text)
    }
}

fn api_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            kind: Some(kind),
            message: Some(message),
        }) => format!("API error (status {}): {kind}: {message}", status.as_u16()),
        Ok(ApiErrorBody {
            message: Some(message), ..
        }) => format!("API error (status {}): {message}", status.as_u16()),
        _ => format!("API error (status {}): {body}", status.as_u16()),
    }
}

impl JobStarter for TranscribeClient {
    async fn start(
        &self,
        job_id: &str,
        media_location: &str,
        media_format: &str,
        language_code: &str,
    ) -> Result<(), TranscriptionError> {
        let req = StartTranscriptionJobRequest {
            transcription_job_name: job_id.to_string(),
            media: Media {
                media_file_uri: media_location.to_string(),
            },
            media_format: media_format.to_string(),
            language_code: language_code.to_string(),
        };
        self.call("StartTranscriptionJob", &req)
            .await
            .map(|_| ())
            .map_err(TranscriptionError::Submission)
    }
}

impl JobPoller for TranscribeClient {
    async fn get_status(&self, job_id: &str) -> Result<JobSnapshot, TranscriptionError> {
        let req = JobNameRequest {
            transcription_job_name: job_id.to_string(),
        };
        let body = self
            .call("GetTranscriptionJob", &req)
            .await
            .map_err(TranscriptionError::Poll)?;
        let resp: GetTranscriptionJobResponse = serde_json::from_str(&body)
            .map_err(|e| TranscriptionError::Poll(format!("failed to parse response: {e}")))?;
        Ok(resp.transcription_job.into())
    }

    async fn delete(&self, job_id: &str) -> Result<(), TranscriptionError> {
        let req = JobNameRequest {
            transcription_job_name: job_id.to_string(),
        };
        self.call("DeleteTranscriptionJob", &req)
            .await
            .map(|_| ())
            .map_err(TranscriptionError::Cleanup)
    }
}

/// Downloads transcript documents from the (pre-signed) URI of a completed job.
#[derive(Debug, Clone)]
pub struct HttpTranscriptFetcher {
    client: Client,
}

impl HttpTranscriptFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl TranscriptFetcher for HttpTranscriptFetcher {
    async fn fetch(&self, location: &str) -> Result<String, TranscriptionError> {
        let response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| TranscriptionError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscriptionError::Fetch(format!(
                "status code: {}",
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| TranscriptionError::Fetch(e.to_string()))
    }
}
