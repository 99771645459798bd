pub mod backend;
pub mod client;
pub mod error;
#[cfg(test)]
pub mod fake;
pub mod types;

pub use backend::{Clock, JobPoller, JobStarter, TokioClock, TranscriptFetcher};
pub use client::{DEFAULT_ENDPOINT, HttpTranscriptFetcher, TranscribeClient};
pub use error::TranscriptionError;
pub use types::parse_transcript;
