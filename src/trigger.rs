//! Storage events that trigger scoring, and the object-key grammar that
//! identifies the problem and the user behind an uploaded answer.
//!
//! Keys look like `problems/{problem_id}/users/{user_id}/{name}.mp3`,
//! optionally below a common prefix.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extension every answer recording must carry.
pub const AUDIO_EXTENSION: &str = ".mp3";

/// Object-creation notification holding one record per uploaded object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageEventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEventRecord {
    pub s3: StorageEntity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEntity {
    pub bucket: Bucket,
    pub object: StoredObject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl StorageEventRecord {
    pub fn new(bucket: &str, key: &str) -> Self {
        Self {
            s3: StorageEntity {
                bucket: Bucket {
                    name: bucket.to_string(),
                },
                object: StoredObject {
                    key: key.to_string(),
                    size: None,
                },
            },
        }
    }

    pub fn bucket(&self) -> &str {
        &self.s3.bucket.name
    }

    pub fn key(&self) -> &str {
        &self.s3.object.key
    }

    /// `s3://bucket/key`, the media location handed to the transcription job.
    pub fn source_location(&self) -> String {
        format!("s3://{}/{}", self.bucket(), self.key())
    }
}

/// Reasons an object key does not follow the answer-upload layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("no `problems/<id>/users/<id>/` segment in key: {0}")]
    MissingLayout(String),

    #[error("invalid problem_id `{0}`")]
    InvalidProblemId(String),

    #[error("invalid user_id `{0}`")]
    InvalidUserId(String),

    #[error("missing file name after user segment in key: {0}")]
    MissingFileName(String),

    #[error("expected a `.mp3` file, got `{0}`")]
    WrongExtension(String),
}

/// Identifiers encoded in an answer's object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKey {
    pub problem_id: i64,
    pub user_id: i64,
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "problem {} / user {}", self.problem_id, self.user_id)
    }
}

impl AnswerKey {
    pub fn parse(key: &str) -> Result<Self, KeyError> {
        let segments: Vec<&str> = key.split('/').collect();

        let start = segments
            .windows(4)
            .position(|w| w[0] == "problems" && w[2] == "users")
            .ok_or_else(|| KeyError::MissingLayout(key.to_string()))?;

        let problem_id = parse_id(segments[start + 1])
            .ok_or_else(|| KeyError::InvalidProblemId(segments[start + 1].to_string()))?;
        let user_id = parse_id(segments[start + 3])
            .ok_or_else(|| KeyError::InvalidUserId(segments[start + 3].to_string()))?;

        let file = segments[start + 4..].join("/");
        if file.is_empty() {
            return Err(KeyError::MissingFileName(key.to_string()));
        }
        if !file.ends_with(AUDIO_EXTENSION) {
            return Err(KeyError::WrongExtension(file));
        }

        Ok(Self { problem_id, user_id })
    }
}

// ASCII digits only, no sign.
fn parse_id(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_key() {
        let key = AnswerKey::parse("problems/42/users/7/answer.mp3").unwrap();
        assert_eq!(key, AnswerKey { problem_id: 42, user_id: 7 });
    }

    #[test]
    fn accepts_prefix_and_nested_file() {
        let key = AnswerKey::parse("uploads/problems/1/users/2/2024/try-3.mp3").unwrap();
        assert_eq!(key.problem_id, 1);
        assert_eq!(key.user_id, 2);
    }

    #[test]
    fn rejects_missing_layout() {
        assert!(matches!(
            AnswerKey::parse("answers/42/7/answer.mp3"),
            Err(KeyError::MissingLayout(_))
        ));
        assert!(matches!(AnswerKey::parse("problems/42/users"), Err(KeyError::MissingLayout(_))));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert_eq!(
            AnswerKey::parse("problems/abc/users/7/a.mp3"),
            Err(KeyError::InvalidProblemId("abc".into()))
        );
        assert_eq!(
            AnswerKey::parse("problems/1/users/-7/a.mp3"),
            Err(KeyError::InvalidUserId("-7".into()))
        );
        assert_eq!(
            AnswerKey::parse("problems/99999999999999999999/users/7/a.mp3"),
            Err(KeyError::InvalidProblemId("99999999999999999999".into()))
        );
    }

    #[test]
    fn rejects_missing_file_and_wrong_extension() {
        assert!(matches!(
            AnswerKey::parse("problems/1/users/2/"),
            Err(KeyError::MissingFileName(_))
        ));
        assert_eq!(
            AnswerKey::parse("problems/1/users/2/answer.wav"),
            Err(KeyError::WrongExtension("answer.wav".into()))
        );
    }

    #[test]
    fn deserializes_storage_event() {
        let json = r#"{
            "Records": [
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": {"name": "answers"},
                        "object": {"key": "problems/3/users/9/a.mp3", "size": 1024}
                    }
                }
            ]
        }"#;
        let event: StorageEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.records.len(), 1);
        let record = &event.records[0];
        assert_eq!(record.bucket(), "answers");
        assert_eq!(record.source_location(), "s3://answers/problems/3/users/9/a.mp3");
        assert_eq!(record.s3.object.size, Some(1024));
    }
}
