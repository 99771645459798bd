//! Wire types for the transcription service and its transcript payloads.
//!
//! Requests and responses follow the service's JSON 1.1 protocol, where
//! field names are PascalCase. Transcript payloads are plain snake_case JSON.

use serde::{Deserialize, Serialize};

use super::error::TranscriptionError;
use crate::state_machine::{JobSnapshot, JobStatus};

/// Body of `StartTranscriptionJob`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartTranscriptionJobRequest {
    pub transcription_job_name: String,
    pub media: Media,
    pub media_format: String,
    pub language_code: String,
}

/// Location of the audio to transcribe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Media {
    pub media_file_uri: String,
}

/// Body of `GetTranscriptionJob` and `DeleteTranscriptionJob`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobNameRequest {
    pub transcription_job_name: String,
}

/// Response of `GetTranscriptionJob`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetTranscriptionJobResponse {
    pub transcription_job: TranscriptionJobDescription,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscriptionJobDescription {
    pub transcription_job_name: String,
    pub transcription_job_status: JobStatus,
    #[serde(default)]
    pub transcript: Option<TranscriptLocation>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscriptLocation {
    #[serde(default)]
    pub transcript_file_uri: Option<String>,
}

impl From<TranscriptionJobDescription> for JobSnapshot {
    fn from(job: TranscriptionJobDescription) -> Self {
        JobSnapshot {
            status: job.transcription_job_status,
            transcript_location: job.transcript.and_then(|t| t.transcript_file_uri),
            failure_reason: job.failure_reason,
        }
    }
}

/// Error body returned with non-2xx responses, e.g.
/// `{"__type": "BadRequestException", "Message": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "__type", default)]
    pub kind: Option<String>,
    #[serde(rename = "Message", alias = "message", default)]
    pub message: Option<String>,
}

/// Transcript document produced by a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptPayload {
    pub results: TranscriptResults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResults {
    pub transcripts: Vec<TranscriptEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub transcript: String,
}

/// Extract the authoritative (first) transcript from a raw payload.
pub fn parse_transcript(payload: &str) -> Result<String, TranscriptionError> {
    let parsed: TranscriptPayload = serde_json::from_str(payload)
        .map_err(|e| TranscriptionError::Fetch(format!("failed to decode transcript JSON: {e}")))?;

    parsed
        .results
        .transcripts
        .into_iter()
        .next()
        .map(|entry| entry.transcript)
        .ok_or(TranscriptionError::EmptyResult)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_request_uses_pascal_case() {
        let req = StartTranscriptionJobRequest {
            transcription_job_name: "transcribe-1".into(),
            media: Media {
                media_file_uri: "s3://bucket/a.mp3".into(),
            },
            media_format: "mp3".into(),
            language_code: "en-US".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["TranscriptionJobName"], "transcribe-1");
        assert_eq!(json["Media"]["MediaFileUri"], "s3://bucket/a.mp3");
        assert_eq!(json["MediaFormat"], "mp3");
        assert_eq!(json["LanguageCode"], "en-US");
    }

    #[test]
    fn completed_response_maps_to_snapshot() {
        let api_json = r#"{
            "TranscriptionJob": {
                "TranscriptionJobName": "transcribe-1",
                "TranscriptionJobStatus": "COMPLETED",
                "Transcript": {"TranscriptFileUri": "https://example.com/t.json"},
                "LanguageCode": "en-US"
            }
        }"#;
        let resp: GetTranscriptionJobResponse = serde_json::from_str(api_json).unwrap();
        let snapshot = JobSnapshot::from(resp.transcription_job);
        assert_eq!(snapshot, JobSnapshot::completed("https://example.com/t.json"));
    }

    #[test]
    fn failed_response_keeps_reason() {
        let api_json = r#"{
            "TranscriptionJob": {
                "TranscriptionJobName": "transcribe-1",
                "TranscriptionJobStatus": "FAILED",
                "FailureReason": "Unsupported media format"
            }
        }"#;
        let resp: GetTranscriptionJobResponse = serde_json::from_str(api_json).unwrap();
        let snapshot = JobSnapshot::from(resp.transcription_job);
        assert_eq!(snapshot.status, JobStatus::Failed);
        assert_eq!(snapshot.failure_reason.as_deref(), Some("Unsupported media format"));
        assert!(snapshot.transcript_location.is_none());
    }

    #[test]
    fn parse_transcript_takes_first_entry() {
        let payload = r#"{
            "jobName": "transcribe-1",
            "results": {
                "transcripts": [{"transcript": "hello world"}, {"transcript": "ignored"}],
                "items": []
            }
        }"#;
        assert_eq!(parse_transcript(payload).unwrap(), "hello world");
    }

    #[test]
    fn parse_transcript_empty_list() {
        let payload = r#"{"results": {"transcripts": []}}"#;
        assert!(matches!(parse_transcript(payload), Err(TranscriptionError::EmptyResult)));
    }

    #[test]
    fn parse_transcript_malformed() {
        assert!(matches!(parse_transcript("<html>"), Err(TranscriptionError::Fetch(_))));
        assert!(matches!(
            parse_transcript(r#"{"results": {}}"#),
            Err(TranscriptionError::Fetch(_))
        ));
    }

    #[test]
    fn api_error_body_accepts_both_message_casings() {
        let upper: ApiErrorBody =
            serde_json::from_str(r#"{"__type": "LimitExceededException", "Message": "quota"}"#).unwrap();
        assert_eq!(upper.kind.as_deref(), Some("LimitExceededException"));
        assert_eq!(upper.message.as_deref(), Some("quota"));

        let lower: ApiErrorBody = serde_json::from_str(r#"{"message": "denied"}"#).unwrap();
        assert_eq!(lower.message.as_deref(), Some("denied"));
    }
}
