use chrono::Utc;

use super::job::{JobSnapshot, JobStatus, PollPolicy, TranscriptionJob};

/// What the poll loop does after observing a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Still queued or running and attempts remain: sleep, then poll again.
    Wait,
    /// Completed with a transcript location: fetch it.
    Collect { location: String },
    /// Completed without a transcript location (malformed response).
    Missing,
    /// The service reported the job as failed.
    Fail { reason: String },
    /// Attempt budget exhausted without a terminal status.
    TimedOut,
}

/// Drives a `TranscriptionJob` from one poll observation to the next step.
pub struct StateMachine;

impl StateMachine {
    /// Record `snapshot` on `job` and compute the next transition.
    ///
    /// - `Queued`/`InProgress` waits while `job.attempts < policy.max_attempts`,
    ///   otherwise the job is declared timed out locally.
    /// - `Completed` collects the transcript, or reports it missing.
    /// - `Failed` carries the service reason, empty when none was given.
    ///
    /// Once a terminal status has been recorded, further snapshots are
    /// ignored and the same terminal transition is returned.
    pub fn observe(job: &mut TranscriptionJob, snapshot: JobSnapshot, policy: &PollPolicy) -> Transition {
        if !job.status.is_terminal() {
            job.attempts += 1;
            job.status = snapshot.status;
            job.status_history.push(snapshot.status);
            job.updated_at = Utc::now();
            match snapshot.status {
                JobStatus::Completed => job.transcript_location = snapshot.transcript_location,
                JobStatus::Failed => job.failure_reason = snapshot.failure_reason,
                JobStatus::Queued | JobStatus::InProgress => {}
            }
        }

        match job.status {
            JobStatus::Completed => match &job.transcript_location {
                Some(location) => Transition::Collect {
                    location: location.clone(),
                },
                None => Transition::Missing,
            },
            JobStatus::Failed => Transition::Fail {
                reason: job.failure_reason.clone().unwrap_or_default(),
            },
            JobStatus::Queued | JobStatus::InProgress => {
                if job.attempts >= policy.max_attempts {
                    Transition::TimedOut
                } else {
                    Transition::Wait
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_job() -> TranscriptionJob {
        TranscriptionJob::new("s3://bucket/problems/1/users/2/answer.mp3".into())
    }

    fn policy(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            max_attempts,
            ..Default::default()
        }
    }

    #[test]
    fn in_progress_then_completed() {
        let mut job = make_job();
        let p = policy(60);

        assert_eq!(StateMachine::observe(&mut job, JobSnapshot::in_progress(), &p), Transition::Wait);
        assert_eq!(job.status, JobStatus::InProgress);

        let t = StateMachine::observe(&mut job, JobSnapshot::completed("https://t/1.json"), &p);
        assert_eq!(
            t,
            Transition::Collect {
                location: "https://t/1.json".into()
            }
        );
        assert_eq!(job.attempts, 2);
        assert_eq!(job.status_history, vec![JobStatus::InProgress, JobStatus::Completed]);
    }

    #[test]
    fn queued_is_not_terminal() {
        let mut job = make_job();
        let snapshot = JobSnapshot {
            status: JobStatus::Queued,
            transcript_location: None,
            failure_reason: None,
        };
        assert_eq!(StateMachine::observe(&mut job, snapshot, &policy(2)), Transition::Wait);
    }

    #[test]
    fn completed_without_location_is_missing() {
        let mut job = make_job();
        let snapshot = JobSnapshot {
            status: JobStatus::Completed,
            transcript_location: None,
            failure_reason: None,
        };
        assert_eq!(StateMachine::observe(&mut job, snapshot, &policy(60)), Transition::Missing);
    }

    #[test]
    fn failed_carries_reason_or_empty() {
        let mut job = make_job();
        let t = StateMachine::observe(&mut job, JobSnapshot::failed(Some("low confidence".into())), &policy(60));
        assert_eq!(
            t,
            Transition::Fail {
                reason: "low confidence".into()
            }
        );

        let mut job = make_job();
        let t = StateMachine::observe(&mut job, JobSnapshot::failed(None), &policy(60));
        assert_eq!(t, Transition::Fail { reason: String::new() });
    }

    #[test]
    fn budget_exhaustion_times_out() {
        let mut job = make_job();
        let p = policy(3);

        assert_eq!(StateMachine::observe(&mut job, JobSnapshot::in_progress(), &p), Transition::Wait);
        assert_eq!(StateMachine::observe(&mut job, JobSnapshot::in_progress(), &p), Transition::Wait);
        assert_eq!(StateMachine::observe(&mut job, JobSnapshot::in_progress(), &p), Transition::TimedOut);
        assert_eq!(job.attempts, 3);
    }

    #[test]
    fn terminal_status_is_sticky() {
        let mut job = make_job();
        let p = policy(60);
        StateMachine::observe(&mut job, JobSnapshot::failed(Some("bad media".into())), &p);

        // A late snapshot must not move the job out of its terminal status.
        let t = StateMachine::observe(&mut job, JobSnapshot::completed("https://t/late.json"), &p);
        assert_eq!(
            t,
            Transition::Fail {
                reason: "bad media".into()
            }
        );
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.attempts, 1);
        assert!(job.transcript_location.is_none());
    }
}
