mod job;
mod state;

pub use job::{JobOutcome, JobReport, JobSnapshot, JobStatus, PollPolicy, TranscriptionJob};
pub use state::{StateMachine, Transition};
